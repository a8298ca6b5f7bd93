//! License validation orchestration for the Keybound SDK.
//!
//! [`LicenseValidator`] wires the license core to its collaborators (the
//! sealed [`StateStore`](keybound_store::StateStore), a
//! [`ValidationTransport`], an injected clock, and the environment probe)
//! and runs the offline-first resolution protocol:
//!
//! 1. A fresh cached record answers immediately, no network.
//! 2. A stale or absent record triggers one validation round-trip per key
//!    (concurrent callers coalesce on the in-flight request).
//! 3. A network failure falls back to the grace policy over the stale
//!    record; past the window the caller gets a restricted state carrying
//!    the original network error.
//!
//! Offline license files take an independent path with no cache or network
//! involvement at all.

mod cache;
mod config;
mod error;
mod probe;
pub mod transport;
mod validator;

#[cfg(feature = "online")]
mod http;

pub use cache::ResponseCache;
pub use config::ValidatorConfig;
pub use error::{ClientError, ClientResult};
pub use probe::{EnvironmentProbe, FixedProbe, SystemProbe};
pub use transport::{TransportError, ValidationRequest, ValidationTransport};
pub use validator::{LicenseValidator, OfflineValidateOptions, ResolveOptions};

#[cfg(feature = "online")]
pub use http::{HttpTransport, HttpTransportConfig};
