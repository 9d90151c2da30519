//! Resource catalog types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware requirement tier for a model variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareClass {
    /// >=24GB VRAM
    GpuHigh,
    /// 8-16GB VRAM
    GpuMid,
    /// 4-8GB VRAM
    GpuLow,
    /// CPU with sufficient RAM
    CpuOnly,
}

/// Model quantization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    FullPrecision,
    GgmlQ4,
    GgmlQ8,
    GgufQ4,
    GgufQ8,
    Bnb4Bit,
    Bnb8Bit,
}

impl Quantization {
    /// GGML/GGUF formats run on CPU regardless of the model's nominal tier
    pub fn is_cpu_runnable(&self) -> bool {
        matches!(
            self,
            Quantization::GgmlQ4 | Quantization::GgmlQ8 | Quantization::GgufQ4 | Quantization::GgufQ8
        )
    }
}

/// Static specification for a model or engine variant.
///
/// Populated once at startup from the built-in table (or an override file)
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Unique identifier, also used as the ledger/selection key
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    pub hardware_class: HardwareClass,
    pub quantization: Quantization,
    /// On-disk size in GB
    pub size_gb: f64,
    /// Minimum system RAM in GB
    pub min_ram_gb: u32,
    /// Minimum VRAM in GB, for GPU-tier variants
    pub min_vram_gb: Option<u32>,
    /// Output quality, 1-10 scale
    pub quality_score: u8,
    /// Inference speed, 1-10 scale (higher = faster)
    pub speed_score: u8,
    /// Upstream repository ID
    pub repo_id: String,
    pub description: String,
    pub license: String,
}

impl ModelSpec {
    /// Whether this variant can run without a GPU
    pub fn is_cpu_compatible(&self) -> bool {
        self.hardware_class == HardwareClass::CpuOnly || self.quantization.is_cpu_runnable()
    }

    /// Whether this variant needs a GPU at all
    pub fn requires_gpu(&self) -> bool {
        matches!(
            self.hardware_class,
            HardwareClass::GpuHigh | HardwareClass::GpuMid | HardwareClass::GpuLow
        )
    }

    pub fn is_quantized(&self) -> bool {
        self.quantization != Quantization::FullPrecision
    }

    /// Validate internal consistency of a spec
    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        if self.id.is_empty() {
            return Err(CatalogError::InvalidSpec {
                id: self.id.clone(),
                reason: "empty id".to_string(),
            });
        }
        if self.hardware_class == HardwareClass::CpuOnly && self.min_vram_gb.is_some() {
            return Err(CatalogError::InvalidSpec {
                id: self.id.clone(),
                reason: "cpu_only spec must not declare a VRAM minimum".to_string(),
            });
        }
        if !(1..=10).contains(&self.quality_score) || !(1..=10).contains(&self.speed_score) {
            return Err(CatalogError::InvalidSpec {
                id: self.id.clone(),
                reason: "quality/speed scores must be in 1..=10".to_string(),
            });
        }
        if self.size_gb <= 0.0 {
            return Err(CatalogError::InvalidSpec {
                id: self.id.clone(),
                reason: "size_gb must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Errors raised while building or loading a catalog
#[derive(Debug, Clone)]
pub enum CatalogError {
    DuplicateId(String),
    InvalidSpec { id: String, reason: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateId(id) => write!(f, "Duplicate model id: {}", id),
            CatalogError::InvalidSpec { id, reason } => {
                write!(f, "Invalid model spec '{}': {}", id, reason)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(class: HardwareClass, quant: Quantization) -> ModelSpec {
        ModelSpec {
            id: "test-model".to_string(),
            display_name: "Test Model".to_string(),
            hardware_class: class,
            quantization: quant,
            size_gb: 1.0,
            min_ram_gb: 2,
            min_vram_gb: None,
            quality_score: 5,
            speed_score: 5,
            repo_id: "test/test-model".to_string(),
            description: String::new(),
            license: "MIT".to_string(),
        }
    }

    #[test]
    fn test_cpu_compatibility_derivation() {
        let cpu_only = spec(HardwareClass::CpuOnly, Quantization::FullPrecision);
        assert!(cpu_only.is_cpu_compatible());
        assert!(!cpu_only.requires_gpu());

        let gpu_full = spec(HardwareClass::GpuMid, Quantization::FullPrecision);
        assert!(!gpu_full.is_cpu_compatible());
        assert!(gpu_full.requires_gpu());

        // Quantized GGUF is CPU-runnable even when nominally GPU-tier
        let gpu_gguf = spec(HardwareClass::GpuLow, Quantization::GgufQ4);
        assert!(gpu_gguf.is_cpu_compatible());
    }

    #[test]
    fn test_validate_rejects_cpu_only_with_vram() {
        let mut bad = spec(HardwareClass::CpuOnly, Quantization::GgufQ4);
        bad.min_vram_gb = Some(4);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_scores() {
        let mut bad = spec(HardwareClass::CpuOnly, Quantization::FullPrecision);
        bad.quality_score = 11;
        assert!(bad.validate().is_err());
        bad.quality_score = 5;
        bad.speed_score = 0;
        assert!(bad.validate().is_err());
    }
}
