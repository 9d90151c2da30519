//! Human-readable environment assessment

use serde::{Deserialize, Serialize};

use super::detector::HardwareProfile;

/// Environment assessment derived from a [`HardwareProfile`].
///
/// `errors` name conditions that block local inference outright, `warnings`
/// name conditions that will degrade it, `recommendations` suggest the best
/// path for the detected hardware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentReport {
    pub hardware: HardwareProfile,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Assess a captured profile
pub fn generate_report(profile: &HardwareProfile) -> EnvironmentReport {
    let mut recommendations = Vec::new();
    let mut warnings = Vec::new();
    let errors = Vec::new();

    if profile.total_ram_gb < 8.0 {
        warnings.push(format!(
            "Low RAM detected ({:.1}GB). Recommend at least 8GB for model inference.",
            profile.total_ram_gb
        ));
    }

    if !profile.has_gpu {
        recommendations.push(
            "No GPU detected. Consider using CPU-optimized quantized models (GGUF format)."
                .to_string(),
        );
    } else {
        match profile.total_vram_gb {
            Some(vram) if vram < 8.0 => recommendations.push(format!(
                "Limited VRAM ({:.1}GB). Consider 4-bit quantized models.",
                vram
            )),
            Some(vram) if vram >= 16.0 => recommendations
                .push("Sufficient VRAM for full-precision 7B models.".to_string()),
            Some(_) => {}
            None => warnings.push(
                "GPU detected but VRAM could not be determined. GPU-tier models with a \
                 VRAM minimum will not be selected."
                    .to_string(),
            ),
        }
    }

    for (name, dep) in &profile.dependencies {
        if !dep.available {
            warnings.push(format!(
                "Tool '{}' not found in PATH. Related backends will be unavailable.",
                name
            ));
        }
    }

    EnvironmentReport {
        hardware: profile.clone(),
        recommendations,
        warnings,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn profile(has_gpu: bool, vram: Option<f64>, ram: f64) -> HardwareProfile {
        HardwareProfile {
            has_gpu,
            gpu_count: if has_gpu { 1 } else { 0 },
            total_vram_gb: vram,
            total_ram_gb: ram,
            available_ram_gb: ram * 0.75,
            cpu_cores: 4,
            dependencies: HashMap::new(),
        }
    }

    #[test]
    fn test_no_gpu_recommends_quantized() {
        let report = generate_report(&profile(false, None, 16.0));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("quantized")));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_low_ram_warns() {
        let report = generate_report(&profile(false, None, 4.0));
        assert!(report.warnings.iter().any(|w| w.contains("Low RAM")));
    }

    #[test]
    fn test_high_vram_recommends_full_precision() {
        let report = generate_report(&profile(true, Some(24.0), 64.0));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("full-precision")));
    }

    #[test]
    fn test_unknown_vram_warns() {
        let report = generate_report(&profile(true, None, 32.0));
        assert!(report.warnings.iter().any(|w| w.contains("VRAM")));
    }
}
