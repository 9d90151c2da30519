// Model Arbiter - hardware-aware model selection with graceful degradation
//
// Two subsystems with real decision logic:
// - Selection: inventory known model variants, score them against detected
//   hardware and dependencies, rank candidates, derive a fallback hierarchy
// - Degradation: wrap primary/fallback operation pairs, substitute the
//   fallback on failure, keep a live capability health ledger
//
// Everything else (inference backends, artifact downloads, storage, UI)
// lives outside this crate; callers supply closures and consume rankings.

// Core modules
pub mod catalog;
pub mod degradation;
pub mod hardware;
pub mod orchestrator;
pub mod selection;

pub use catalog::{CatalogConfig, HardwareClass, ModelSpec, Quantization, ResourceCatalog, BASELINE_ID};
pub use degradation::{
    DegradationEntry, DegradationLedger, FallbackExecutor, HealthStatus, ResourceMonitor,
    ResourceThresholds, ResourceUsage, SystemHealth,
};
pub use hardware::{generate_report, EnvironmentReport, HardwareProfile};
pub use orchestrator::Orchestrator;
pub use selection::{
    ModelCandidate, SelectionCriteria, SelectionEngine, SelectionRecord, SelectionStrategy,
};
