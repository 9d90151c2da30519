//! Degradation ledger - process-wide capability health table

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::warn;
use serde::{Deserialize, Serialize};

/// Minimum recorded operations before the status rule applies.
/// Below this the prior status holds, to avoid flapping on cold start.
const MIN_SAMPLES_FOR_STATUS: u64 = 10;

/// Error rate above which a capability is considered failed
const FAILED_ERROR_RATE: f64 = 0.5;
/// Error rate above which a capability is considered degraded
const DEGRADED_ERROR_RATE: f64 = 0.2;

/// Default rolling-latency threshold for the degraded status
pub const DEFAULT_RESPONSE_TIME_THRESHOLD_MS: f64 = 5_000.0;

/// Overage (percentage points above threshold) beyond which a resource
/// pressure entry escalates from degraded to failed
const PRESSURE_FAILED_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Failed,
}

/// Health record for one named capability, created lazily on first use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEntry {
    pub status: HealthStatus,
    pub error_count: u64,
    pub success_count: u64,
    pub avg_response_time_ms: f64,
    pub last_error: Option<String>,
    pub last_check: DateTime<Utc>,
    /// Whether the most recent execution went through the fallback path
    pub fallback_active: bool,
}

impl DegradationEntry {
    fn new() -> Self {
        Self {
            status: HealthStatus::Healthy,
            error_count: 0,
            success_count: 0,
            avg_response_time_ms: 0.0,
            last_error: None,
            last_check: Utc::now(),
            fallback_active: false,
        }
    }

    fn total(&self) -> u64 {
        self.error_count + self.success_count
    }
}

/// Aggregated health view across all capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    /// Worst status across all entries
    pub overall: HealthStatus,
    /// Currently failed capability names, sorted
    pub failed: Vec<String>,
    /// Currently degraded capability names, sorted
    pub degraded: Vec<String>,
    pub healthy_count: usize,
}

/// Thread-safe table mapping capability name to health status.
///
/// Writes to different capabilities never block each other beyond shard
/// granularity; writes to the same capability are serialized by the map's
/// per-key entry access, so the read-modify-decide update is atomic per
/// capability. Reads take snapshot copies.
pub struct DegradationLedger {
    entries: DashMap<String, DegradationEntry>,
    response_time_threshold_ms: f64,
}

impl Default for DegradationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationLedger {
    pub fn new() -> Self {
        Self::with_response_threshold(DEFAULT_RESPONSE_TIME_THRESHOLD_MS)
    }

    pub fn with_response_threshold(threshold_ms: f64) -> Self {
        Self {
            entries: DashMap::new(),
            response_time_threshold_ms: threshold_ms,
        }
    }

    /// Record a successful operation against a capability
    pub fn record_success(&self, capability: &str, duration_ms: f64) {
        self.record(capability, true, duration_ms, None);
    }

    /// Record a failed operation against a capability
    pub fn record_failure(&self, capability: &str, duration_ms: f64, error: &str) {
        self.record(capability, false, duration_ms, Some(error.to_string()));
    }

    fn record(&self, capability: &str, success: bool, duration_ms: f64, error: Option<String>) {
        let mut entry = self
            .entries
            .entry(capability.to_string())
            .or_insert_with(DegradationEntry::new);

        if success {
            entry.success_count += 1;
        } else {
            entry.error_count += 1;
            entry.last_error = error;
        }
        entry.last_check = Utc::now();

        // Rolling average over all recorded operations
        let total = entry.total();
        entry.avg_response_time_ms =
            (entry.avg_response_time_ms * (total - 1) as f64 + duration_ms) / total as f64;

        if total >= MIN_SAMPLES_FOR_STATUS {
            entry.status = Self::compute_status(
                entry.error_count,
                entry.success_count,
                entry.avg_response_time_ms,
                self.response_time_threshold_ms,
            );
        }
    }

    /// Pure status function of the rolling counters
    fn compute_status(
        error_count: u64,
        success_count: u64,
        avg_response_time_ms: f64,
        threshold_ms: f64,
    ) -> HealthStatus {
        let error_rate = error_count as f64 / (error_count + success_count) as f64;
        if error_rate > FAILED_ERROR_RATE {
            HealthStatus::Failed
        } else if error_rate > DEGRADED_ERROR_RATE || avg_response_time_ms > threshold_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    /// Flag or clear the fallback path for a capability
    pub fn set_fallback_active(&self, capability: &str, active: bool) {
        let mut entry = self
            .entries
            .entry(capability.to_string())
            .or_insert_with(DegradationEntry::new);
        entry.fallback_active = active;
    }

    /// Whether the most recent execution of a capability used its fallback
    pub fn is_feature_degraded(&self, capability: &str) -> bool {
        self.entries
            .get(capability)
            .map(|e| e.fallback_active)
            .unwrap_or(false)
    }

    /// Record resource pressure for a synthetic capability
    /// (`system_cpu`, `system_memory`, `system_disk`).
    ///
    /// Severity is proportional to how far usage sits over the threshold.
    pub fn record_pressure(
        &self,
        capability: &str,
        usage_pct: f32,
        threshold_pct: f32,
        message: &str,
    ) {
        let mut entry = self
            .entries
            .entry(capability.to_string())
            .or_insert_with(DegradationEntry::new);

        entry.status = if usage_pct > threshold_pct + PRESSURE_FAILED_MARGIN {
            HealthStatus::Failed
        } else if usage_pct > threshold_pct {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };
        if entry.status != HealthStatus::Healthy {
            entry.last_error = Some(message.to_string());
            warn!("Resource pressure on {}: {}", capability, message);
        }
        entry.last_check = Utc::now();
    }

    /// Snapshot of one capability's entry
    pub fn get(&self, capability: &str) -> Option<DegradationEntry> {
        self.entries.get(capability).map(|e| e.clone())
    }

    /// Names of all tracked capabilities, sorted
    pub fn capabilities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Aggregated health across all entries: overall = worst status.
    ///
    /// Output is fully sorted, so repeated calls with no intervening writes
    /// return identical structures.
    pub fn system_health(&self) -> SystemHealth {
        let mut failed = Vec::new();
        let mut degraded = Vec::new();
        let mut healthy_count = 0;

        for entry in self.entries.iter() {
            match entry.status {
                HealthStatus::Failed => failed.push(entry.key().clone()),
                HealthStatus::Degraded => degraded.push(entry.key().clone()),
                HealthStatus::Healthy => healthy_count += 1,
            }
        }
        failed.sort();
        degraded.sort();

        let overall = if !failed.is_empty() {
            HealthStatus::Failed
        } else if !degraded.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        SystemHealth {
            overall,
            failed,
            degraded,
            healthy_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_entry_created_lazily() {
        let ledger = DegradationLedger::new();
        assert!(ledger.get("content_generation").is_none());

        ledger.record_success("content_generation", 100.0);
        let entry = ledger.get("content_generation").unwrap();
        assert_eq!(entry.success_count, 1);
        assert_eq!(entry.error_count, 0);
        assert_eq!(entry.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_status_holds_below_sample_threshold() {
        let ledger = DegradationLedger::new();
        // 3 operations, all failures: error rate 1.0, but too few samples
        for _ in 0..3 {
            ledger.record_failure("tts", 50.0, "engine crashed");
        }
        let entry = ledger.get("tts").unwrap();
        assert_eq!(entry.status, HealthStatus::Healthy);
        assert_eq!(entry.error_count, 3);
    }

    #[test]
    fn test_status_degraded_at_forty_percent_errors() {
        // 6 successes + 4 failures (rate 0.4) is degraded, not failed
        let ledger = DegradationLedger::new();
        for _ in 0..6 {
            ledger.record_success("gen", 100.0);
        }
        for _ in 0..4 {
            ledger.record_failure("gen", 100.0, "timeout");
        }
        let entry = ledger.get("gen").unwrap();
        assert_eq!(entry.total(), 10);
        assert_eq!(entry.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_status_failed_above_half_errors() {
        let ledger = DegradationLedger::new();
        for _ in 0..4 {
            ledger.record_success("gen", 100.0);
        }
        for _ in 0..6 {
            ledger.record_failure("gen", 100.0, "timeout");
        }
        assert_eq!(ledger.get("gen").unwrap().status, HealthStatus::Failed);
    }

    #[test]
    fn test_slow_responses_degrade() {
        let ledger = DegradationLedger::with_response_threshold(1_000.0);
        for _ in 0..10 {
            ledger.record_success("slow_api", 2_500.0);
        }
        let entry = ledger.get("slow_api").unwrap();
        assert_eq!(entry.error_count, 0);
        assert_eq!(entry.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_rolling_average_latency() {
        let ledger = DegradationLedger::new();
        ledger.record_success("avg", 100.0);
        ledger.record_success("avg", 300.0);
        let entry = ledger.get("avg").unwrap();
        assert!((entry.avg_response_time_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pressure_severity_proportional() {
        let ledger = DegradationLedger::new();

        ledger.record_pressure("system_cpu", 85.0, 80.0, "High CPU usage: 85.0%");
        assert_eq!(ledger.get("system_cpu").unwrap().status, HealthStatus::Degraded);

        ledger.record_pressure("system_memory", 97.0, 85.0, "High memory usage: 97.0%");
        assert_eq!(ledger.get("system_memory").unwrap().status, HealthStatus::Failed);

        // Back under threshold clears the pressure entry
        ledger.record_pressure("system_cpu", 40.0, 80.0, "");
        assert_eq!(ledger.get("system_cpu").unwrap().status, HealthStatus::Healthy);
    }

    #[test]
    fn test_system_health_aggregation_and_idempotence() {
        let ledger = DegradationLedger::new();
        for _ in 0..10 {
            ledger.record_success("ok_one", 10.0);
        }
        for _ in 0..10 {
            ledger.record_failure("broken", 10.0, "down");
        }
        for _ in 0..7 {
            ledger.record_success("shaky", 10.0);
        }
        for _ in 0..3 {
            ledger.record_failure("shaky", 10.0, "flaky");
        }

        let health = ledger.system_health();
        assert_eq!(health.overall, HealthStatus::Failed);
        assert_eq!(health.failed, vec!["broken".to_string()]);
        assert_eq!(health.degraded, vec!["shaky".to_string()]);
        assert_eq!(health.healthy_count, 1);

        // Idempotent reads with no intervening writes
        assert_eq!(ledger.system_health(), health);
    }

    #[test]
    fn test_fallback_flag_tracking() {
        let ledger = DegradationLedger::new();
        assert!(!ledger.is_feature_degraded("content_generation"));

        ledger.set_fallback_active("content_generation", true);
        assert!(ledger.is_feature_degraded("content_generation"));

        ledger.set_fallback_active("content_generation", false);
        assert!(!ledger.is_feature_degraded("content_generation"));
    }

    #[test]
    fn test_concurrent_writes_to_same_capability() {
        let ledger = Arc::new(DegradationLedger::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    if i % 2 == 0 {
                        ledger.record_success("shared", 10.0);
                    } else {
                        ledger.record_failure("shared", 10.0, "err");
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let entry = ledger.get("shared").unwrap();
        assert_eq!(entry.total(), 800);
        assert_eq!(entry.success_count, 400);
        assert_eq!(entry.error_count, 400);
        assert_eq!(entry.status, HealthStatus::Degraded);
    }
}
