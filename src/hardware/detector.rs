//! Hardware and dependency detection

use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use sysinfo::System;

static CACHED_PROFILE: OnceCell<HardwareProfile> = OnceCell::new();

/// Bytes per GiB
const GIB: f64 = 1_073_741_824.0;

/// External tools probed by default.
///
/// These cover the inference and audio backends the surrounding application
/// may route work to; absence of a tool only lowers soft compatibility
/// scores, it never hard-fails a selection.
pub const DEFAULT_PROBED_TOOLS: &[&str] =
    &["ffmpeg", "espeak-ng", "ollama", "llama-server", "nvidia-smi"];

/// Availability of a named external dependency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Snapshot of host hardware and dependency facts.
///
/// Immutable once captured. Detection is cheap enough to run per selection,
/// but callers may cache the profile for the lifetime of a request batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub has_gpu: bool,
    pub gpu_count: usize,
    /// Total VRAM in GB when detectable, `None` otherwise
    pub total_vram_gb: Option<f64>,
    pub total_ram_gb: f64,
    pub available_ram_gb: f64,
    pub cpu_cores: usize,
    /// Availability of named external tools/libraries
    pub dependencies: HashMap<String, DependencyStatus>,
}

impl HardwareProfile {
    /// Capture a snapshot of the current host, probing the default tool set
    pub fn detect() -> Self {
        Self::detect_with_tools(DEFAULT_PROBED_TOOLS)
    }

    /// Capture a snapshot probing a caller-supplied tool set
    pub fn detect_with_tools(tools: &[&str]) -> Self {
        let cpu_cores = detect_cpu_cores();
        let (total_ram_gb, available_ram_gb) = detect_memory_gb();
        let (has_gpu, gpu_count, total_vram_gb) = detect_gpu();
        let dependencies = probe_tools(tools);

        let profile = Self {
            has_gpu,
            gpu_count,
            total_vram_gb,
            total_ram_gb,
            available_ram_gb,
            cpu_cores,
            dependencies,
        };
        info!(
            "Detected hardware profile: {} cores, {:.1}GB RAM available, gpu={}",
            profile.cpu_cores, profile.available_ram_gb, profile.has_gpu
        );
        profile
    }

    /// Detect once and reuse the snapshot for the process lifetime.
    ///
    /// Tool availability and GPU presence do not change while the process
    /// runs; memory figures are frozen at first call, so callers that care
    /// about current available RAM should use [`HardwareProfile::detect`].
    pub fn detect_cached() -> &'static HardwareProfile {
        CACHED_PROFILE.get_or_init(Self::detect)
    }

    /// Whether a named dependency was probed and found available
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies
            .get(name)
            .map(|d| d.available)
            .unwrap_or(false)
    }
}

fn detect_cpu_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn detect_memory_gb() -> (f64, f64) {
    let sys = System::new_all();
    let total = sys.total_memory() as f64 / GIB;
    let available = sys.available_memory() as f64 / GIB;
    debug!("Detected memory: {:.1}GB total, {:.1}GB available", total, available);
    (total.max(1.0), available.max(0.5))
}

/// Detect GPU presence in the order: Metal, CUDA, Vulkan.
///
/// VRAM is reported as `None` when no driver query path is available; the
/// selection engine treats unknown VRAM as failing any stated VRAM minimum.
fn detect_gpu() -> (bool, usize, Option<f64>) {
    #[cfg(target_os = "macos")]
    {
        if std::env::consts::ARCH == "aarch64" {
            // Apple Silicon: unified memory, no discrete VRAM figure
            return (true, 1, None);
        }
    }

    if has_cuda_support() {
        return (true, 1, None);
    }

    if has_vulkan_support() {
        return (true, 1, None);
    }

    (false, 0, None)
}

fn has_cuda_support() -> bool {
    if std::env::var("CUDA_PATH").is_ok() || std::env::var("CUDA_HOME").is_ok() {
        return true;
    }

    // Linux path
    if std::path::Path::new("/usr/local/cuda").exists() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::path::Path::new("C:\\Program Files\\NVIDIA GPU Computing Toolkit").exists()
            || std::path::Path::new("C:\\Windows\\System32\\nvidia-smi.exe").exists()
            || std::path::Path::new("C:\\Windows\\System32\\nvcuda.dll").exists()
        {
            return true;
        }
    }

    false
}

fn has_vulkan_support() -> bool {
    if std::env::var("VULKAN_SDK").is_ok() {
        return true;
    }

    // Linux paths
    if std::path::Path::new("/usr/lib/x86_64-linux-gnu/libvulkan.so").exists()
        || std::path::Path::new("/usr/lib/libvulkan.so").exists()
    {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::path::Path::new("C:\\Windows\\System32\\vulkan-1.dll").exists() {
            return true;
        }
    }

    false
}

/// Probe external tools on PATH
fn probe_tools(tools: &[&str]) -> HashMap<String, DependencyStatus> {
    let mut deps = HashMap::with_capacity(tools.len());
    for name in tools {
        let status = match which::which(name) {
            Ok(path) => {
                debug!("Found tool '{}' at {}", name, path.display());
                DependencyStatus {
                    available: true,
                    version: None,
                    path: Some(path),
                }
            }
            Err(_) => DependencyStatus {
                available: false,
                version: None,
                path: None,
            },
        };
        deps.insert(name.to_string(), status);
    }
    deps
}
