//! Hardware profile collection
//!
//! Produces an immutable snapshot of CPU, RAM, GPU and external-tool facts
//! consumed by the selection engine.

mod detector;
mod report;

pub use detector::{DependencyStatus, HardwareProfile, DEFAULT_PROBED_TOOLS};
pub use report::{generate_report, EnvironmentReport};
