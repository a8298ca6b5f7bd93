//! Shared value types for the Keybound SDK.
//!
//! This crate is the dependency root of the workspace: normalized license
//! keys, capability names, and the injected clock used everywhere a
//! component needs "now".

mod capability;
mod clock;
mod key;

pub use capability::{Capability, CapabilitySet};
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{KeyError, LicenseKey};
