//! Fallback executor - wraps primary/fallback operation pairs

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Instant;

use super::ledger::DegradationLedger;

/// Executes a primary operation and transparently substitutes its fallback
/// on failure, recording every outcome in the [`DegradationLedger`].
///
/// Neither path is given a timeout here: timeout policy is resource-specific,
/// so callers pass closures that already enforce their own deadlines. If a
/// closure never returns, neither does the executor.
#[derive(Clone)]
pub struct FallbackExecutor {
    ledger: Arc<DegradationLedger>,
}

impl FallbackExecutor {
    pub fn new(ledger: Arc<DegradationLedger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<DegradationLedger> {
        &self.ledger
    }

    /// Run `primary`; on failure run `fallback` and return its result.
    ///
    /// A primary failure is captured here and never propagates. The
    /// capability records one failure (the primary) and one success (the
    /// fallback served the request), and the fallback flag is raised so
    /// callers can query `is_feature_degraded`. Only when the fallback
    /// itself fails does an error surface - at that point there is nothing
    /// left to substitute.
    pub fn execute_with_fallback<T>(
        &self,
        capability: &str,
        primary: impl FnOnce() -> Result<T>,
        fallback: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        match primary() {
            Ok(value) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;
                self.ledger.record_success(capability, elapsed_ms);
                self.ledger.set_fallback_active(capability, false);
                debug!("'{}' primary succeeded in {:.1}ms", capability, elapsed_ms);
                Ok(value)
            }
            Err(primary_err) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;
                self.ledger
                    .record_failure(capability, elapsed_ms, &format!("{:#}", primary_err));
                warn!(
                    "'{}' primary failed ({:#}), trying fallback",
                    capability, primary_err
                );

                let fb_start = Instant::now();
                match fallback() {
                    Ok(value) => {
                        let fb_ms = fb_start.elapsed().as_secs_f64() * 1_000.0;
                        self.ledger.record_success(capability, fb_ms);
                        self.ledger.set_fallback_active(capability, true);
                        Ok(value)
                    }
                    Err(fallback_err) => Err(fallback_err).with_context(|| {
                        format!(
                            "'{}' exhausted: fallback failed after primary error ({:#})",
                            capability, primary_err
                        )
                    }),
                }
            }
        }
    }

    /// Run a single operation and record its outcome, without a fallback.
    /// Used when walking a hierarchy where the next step is chosen outside.
    pub fn execute<T>(&self, capability: &str, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let result = op();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;
        match &result {
            Ok(_) => self.ledger.record_success(capability, elapsed_ms),
            Err(e) => self
                .ledger
                .record_failure(capability, elapsed_ms, &format!("{:#}", e)),
        }
        result
    }
}
