//! Resource monitor - periodic sampler writing pressure entries

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use sysinfo::{Disks, System};

use super::ledger::DegradationLedger;

const MIB: f64 = 1_048_576.0;
const GIB: f64 = 1_073_741_824.0;

/// Fixed breach thresholds, in percent
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceThresholds {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
}

impl Default for ResourceThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 85.0,
            disk_percent: 90.0,
        }
    }
}

/// One live resource usage snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub memory_used_mb: f64,
    pub memory_available_mb: f64,
    pub disk_usage_percent: f32,
    pub disk_free_gb: f64,
}

/// Samples CPU, memory and disk against [`ResourceThresholds`] and records
/// breaches as pressure entries for the synthetic capabilities
/// `system_cpu`, `system_memory` and `system_disk`.
///
/// Callers query these entries through the ledger exactly like any other
/// capability, answering "is the system itself under pressure".
pub struct ResourceMonitor {
    ledger: Arc<DegradationLedger>,
    thresholds: ResourceThresholds,
    interval: Duration,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ResourceMonitor {
    pub fn new(ledger: Arc<DegradationLedger>) -> Self {
        Self::with_config(ledger, ResourceThresholds::default(), Duration::from_secs(60))
    }

    pub fn with_config(
        ledger: Arc<DegradationLedger>,
        thresholds: ResourceThresholds,
        interval: Duration,
    ) -> Self {
        Self {
            ledger,
            thresholds,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Capture one usage snapshot.
    ///
    /// Blocks briefly: CPU usage needs two refreshes separated by the
    /// sysinfo minimum update interval.
    pub fn sample() -> ResourceUsage {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();

        let total_mem = sys.total_memory().max(1);
        let used_mem = sys.used_memory();
        let memory_percent = (used_mem as f64 / total_mem as f64 * 100.0) as f32;

        let disks = Disks::new_with_refreshed_list();
        let (disk_total, disk_free) = disks
            .iter()
            .fold((0u64, 0u64), |(t, f), d| (t + d.total_space(), f + d.available_space()));
        let disk_usage_percent = if disk_total > 0 {
            ((disk_total - disk_free) as f64 / disk_total as f64 * 100.0) as f32
        } else {
            0.0
        };

        ResourceUsage {
            timestamp: Utc::now(),
            cpu_percent: sys.global_cpu_usage(),
            memory_percent,
            memory_used_mb: used_mem as f64 / MIB,
            memory_available_mb: sys.available_memory() as f64 / MIB,
            disk_usage_percent,
            disk_free_gb: disk_free as f64 / GIB,
        }
    }

    /// Compare a snapshot against the thresholds and record pressure
    pub fn check(&self, usage: &ResourceUsage) {
        check_thresholds(&self.ledger, &self.thresholds, usage);
    }

    /// Start the background sampling thread. No-op when already running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let ledger = Arc::clone(&self.ledger);
        let thresholds = self.thresholds;
        let interval = self.interval;
        let running = Arc::clone(&self.running);

        self.handle = Some(std::thread::spawn(move || {
            info!("Resource monitoring started (interval {:?})", interval);
            while running.load(Ordering::SeqCst) {
                let usage = Self::sample();
                debug!(
                    "Sampled resources: cpu {:.1}%, mem {:.1}%, disk {:.1}%",
                    usage.cpu_percent, usage.memory_percent, usage.disk_usage_percent
                );
                check_thresholds(&ledger, &thresholds, &usage);

                // Sleep in short steps so stop() takes effect promptly
                let mut slept = Duration::ZERO;
                while slept < interval && running.load(Ordering::SeqCst) {
                    let step = Duration::from_millis(250).min(interval - slept);
                    std::thread::sleep(step);
                    slept += step;
                }
            }
            info!("Resource monitoring stopped");
        }));
    }

    /// Stop the background thread and wait for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Resource monitor thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn check_thresholds(
    ledger: &DegradationLedger,
    thresholds: &ResourceThresholds,
    usage: &ResourceUsage,
) {
    ledger.record_pressure(
        "system_cpu",
        usage.cpu_percent,
        thresholds.cpu_percent,
        &format!("High CPU usage: {:.1}%", usage.cpu_percent),
    );
    ledger.record_pressure(
        "system_memory",
        usage.memory_percent,
        thresholds.memory_percent,
        &format!("High memory usage: {:.1}%", usage.memory_percent),
    );
    ledger.record_pressure(
        "system_disk",
        usage.disk_usage_percent,
        thresholds.disk_percent,
        &format!("Low disk space: {:.1}GB free", usage.disk_free_gb),
    );
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
