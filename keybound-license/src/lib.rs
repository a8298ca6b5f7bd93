//! License state resolution core for the Keybound SDK.
//!
//! This crate turns a license key plus an optional network round-trip into
//! a trustworthy, time-bounded statement of what a caller is entitled to
//! do, and keeps answering correctly when the network is unavailable.
//!
//! # Design Principles
//!
//! - **Offline-first**: a cached entitlement record answers until it goes
//!   stale; the network is only consulted to refresh.
//! - **Bounded grace**: after a network failure, the last known-good state
//!   is honored for a configured window past its staleness point, never
//!   longer. Staleness beyond the window is never validity.
//! - **Fail closed**: every unrecoverable path collapses to a restricted
//!   state that grants nothing.
//! - **Pure decisions**: the resolver performs no I/O; every decision takes
//!   an explicit `now`, so the whole state machine is testable at fixed
//!   instants.

mod entitlement;
mod error;
pub mod offline;
pub mod resolver;
mod state;

pub use entitlement::{EntitlementState, EntitlementStatus};
pub use error::{LicenseError, LicenseResult};
pub use offline::{
    validate_offline, OfflineLicenseData, OfflineOptions, OfflineValidation,
    EXPIRY_SKEW_TOLERANCE_SECS,
};
pub use resolver::{RemoteStatus, ResolverConfig, ValidationResponse};
pub use state::{LicenseState, Provenance};
