//! Entitlement gating for generation endpoints.

pub mod metering;
pub mod policy;

pub use metering::{record_usage, run_metered, Produced};
pub use policy::{AdmissionPolicy, Decision, DenialReason, DEFAULT_FREE_USAGE_LIMIT};
