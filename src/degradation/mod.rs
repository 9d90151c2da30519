//! Graceful degradation - fallback execution, capability health tracking
//! and resource pressure monitoring

mod executor;
mod ledger;
mod monitor;

pub use executor::FallbackExecutor;
pub use ledger::{
    DegradationEntry, DegradationLedger, HealthStatus, SystemHealth,
    DEFAULT_RESPONSE_TIME_THRESHOLD_MS,
};
pub use monitor::{ResourceMonitor, ResourceThresholds, ResourceUsage};
