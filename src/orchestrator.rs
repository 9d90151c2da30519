//! Orchestrator - composes the ranked hierarchy with fallback execution

use anyhow::{anyhow, Result};
use log::{info, warn};
use std::sync::Arc;

use crate::degradation::{DegradationLedger, FallbackExecutor};
use crate::hardware::HardwareProfile;
use crate::selection::SelectionEngine;

/// Façade that realizes "try the best resource, then the next, then the
/// guaranteed baseline".
///
/// The orchestrator owns no backends: callers supply a single attempt
/// closure that maps a resource id to a result, and primary/fallback
/// closure pairs for named capabilities. Capability names must be stable
/// across calls (always `"content_generation"`, never varying per call) -
/// they are the ledger keys.
pub struct Orchestrator {
    engine: SelectionEngine,
    executor: FallbackExecutor,
}

impl Orchestrator {
    pub fn new(engine: SelectionEngine, ledger: Arc<DegradationLedger>) -> Self {
        Self {
            engine,
            executor: FallbackExecutor::new(ledger),
        }
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SelectionEngine {
        &mut self.engine
    }

    pub fn ledger(&self) -> &Arc<DegradationLedger> {
        self.executor.ledger()
    }

    pub fn executor(&self) -> &FallbackExecutor {
        &self.executor
    }

    /// Walk the fallback hierarchy for the given profile, attempting each
    /// resource id in order until one succeeds.
    ///
    /// Every attempt is recorded against `capability`. A success after at
    /// least one failure raises the capability's fallback flag. When every
    /// id - including the baseline - fails, the last error surfaces.
    pub fn run_with_hierarchy<T>(
        &self,
        capability: &str,
        profile: &HardwareProfile,
        mut attempt: impl FnMut(&str) -> Result<T>,
    ) -> Result<T> {
        let hierarchy = self.engine.fallback_hierarchy(profile);
        let mut last_err: Option<anyhow::Error> = None;

        for (idx, id) in hierarchy.iter().enumerate() {
            match self.executor.execute(capability, || attempt(id)) {
                Ok(value) => {
                    let used_fallback = idx > 0;
                    self.ledger().set_fallback_active(capability, used_fallback);
                    if used_fallback {
                        info!(
                            "'{}' served by fallback resource '{}' (position {})",
                            capability, id, idx
                        );
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!("'{}' resource '{}' failed: {:#}", capability, id, e);
                    last_err = Some(e);
                }
            }
        }

        // The hierarchy is never empty, so last_err is always set here
        Err(last_err.unwrap_or_else(|| anyhow!("'{}': no resources attempted", capability)))
    }

    /// Execute a caller-supplied primary/fallback pair for a named
    /// capability. See [`FallbackExecutor::execute_with_fallback`].
    pub fn execute_with_fallback<T>(
        &self,
        capability: &str,
        primary: impl FnOnce() -> Result<T>,
        fallback: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        self.executor.execute_with_fallback(capability, primary, fallback)
    }
}
