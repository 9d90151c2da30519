//! Built-in model table

use super::types::{HardwareClass, ModelSpec, Quantization};

/// Curated list of supported model variants.
///
/// Quality and speed scores are 1-10; sizes and RAM/VRAM minimums come from
/// the published GGUF/fp16 artifacts.
pub(crate) fn builtin_specs() -> Vec<ModelSpec> {
    vec![
        // GPT-2 for testing (lightweight)
        ModelSpec {
            id: "gpt2".to_string(),
            display_name: "GPT-2".to_string(),
            hardware_class: HardwareClass::CpuOnly,
            quantization: Quantization::FullPrecision,
            size_gb: 0.5,
            min_ram_gb: 2,
            min_vram_gb: None,
            quality_score: 4,
            speed_score: 10,
            repo_id: "gpt2".to_string(),
            description: "Lightweight model for testing and development".to_string(),
            license: "MIT".to_string(),
        },
        // TinyLlama 1.1B - chat-tuned lightweight model
        ModelSpec {
            id: "tinyllama-1.1b-chat".to_string(),
            display_name: "TinyLlama 1.1B Chat".to_string(),
            hardware_class: HardwareClass::GpuLow,
            quantization: Quantization::FullPrecision,
            size_gb: 2.2,
            min_ram_gb: 8,
            min_vram_gb: Some(4),
            quality_score: 6,
            speed_score: 9,
            repo_id: "TinyLlama/TinyLlama-1.1B-Chat-v1.0".to_string(),
            description: "Chat-tuned 1.1B model, surprisingly good for its size".to_string(),
            license: "Apache-2.0".to_string(),
        },
        ModelSpec {
            id: "tinyllama-1.1b-chat-gguf-q4".to_string(),
            display_name: "TinyLlama 1.1B Chat (GGUF Q4)".to_string(),
            hardware_class: HardwareClass::CpuOnly,
            quantization: Quantization::GgufQ4,
            size_gb: 0.6,
            min_ram_gb: 2,
            min_vram_gb: None,
            quality_score: 5,
            speed_score: 10,
            repo_id: "TheBloke/TinyLlama-1.1B-Chat-v1.0-GGUF".to_string(),
            description: "Ultra-lightweight quantized TinyLlama".to_string(),
            license: "Apache-2.0".to_string(),
        },
        // StableLM 2 Zephyr 1.6B - chat-focused with empathetic output
        ModelSpec {
            id: "stablelm-2-zephyr-1.6b".to_string(),
            display_name: "StableLM 2 Zephyr 1.6B".to_string(),
            hardware_class: HardwareClass::GpuLow,
            quantization: Quantization::FullPrecision,
            size_gb: 3.2,
            min_ram_gb: 8,
            min_vram_gb: Some(4),
            quality_score: 7,
            speed_score: 8,
            repo_id: "stabilityai/stablelm-2-zephyr-1_6b".to_string(),
            description: "Chat-focused model tuned for instruction following".to_string(),
            license: "Apache-2.0".to_string(),
        },
        ModelSpec {
            id: "stablelm-2-zephyr-1.6b-gguf-q4".to_string(),
            display_name: "StableLM 2 Zephyr 1.6B (GGUF Q4)".to_string(),
            hardware_class: HardwareClass::CpuOnly,
            quantization: Quantization::GgufQ4,
            size_gb: 1.0,
            min_ram_gb: 3,
            min_vram_gb: None,
            quality_score: 6,
            speed_score: 9,
            repo_id: "TheBloke/stablelm-2-zephyr-1_6b-GGUF".to_string(),
            description: "CPU-optimized StableLM Zephyr".to_string(),
            license: "Apache-2.0".to_string(),
        },
        // Phi-2 (2.7B) - strong reasoning for its size
        ModelSpec {
            id: "phi-2".to_string(),
            display_name: "Phi-2".to_string(),
            hardware_class: HardwareClass::GpuLow,
            quantization: Quantization::FullPrecision,
            size_gb: 5.4,
            min_ram_gb: 16,
            min_vram_gb: Some(8),
            quality_score: 8,
            speed_score: 7,
            repo_id: "microsoft/phi-2".to_string(),
            description: "Strong reasoning capabilities for 2.7B parameters".to_string(),
            license: "MIT".to_string(),
        },
        ModelSpec {
            id: "phi-2-gguf-q4".to_string(),
            display_name: "Phi-2 (GGUF Q4)".to_string(),
            hardware_class: HardwareClass::CpuOnly,
            quantization: Quantization::GgufQ4,
            size_gb: 1.7,
            min_ram_gb: 4,
            min_vram_gb: None,
            quality_score: 7,
            speed_score: 8,
            repo_id: "TheBloke/phi-2-GGUF".to_string(),
            description: "CPU-optimized quantized Phi-2, excellent reasoning with low resource usage".to_string(),
            license: "MIT".to_string(),
        },
        // MPT-7B Instruct variants
        ModelSpec {
            id: "mpt-7b-instruct".to_string(),
            display_name: "MPT-7B Instruct".to_string(),
            hardware_class: HardwareClass::GpuMid,
            quantization: Quantization::FullPrecision,
            size_gb: 13.5,
            min_ram_gb: 32,
            min_vram_gb: Some(16),
            quality_score: 8,
            speed_score: 7,
            repo_id: "mosaicml/mpt-7b-instruct".to_string(),
            description: "High-quality instruction-following model".to_string(),
            license: "Apache-2.0".to_string(),
        },
        ModelSpec {
            id: "mpt-7b-instruct-gguf-q4".to_string(),
            display_name: "MPT-7B Instruct (GGUF Q4)".to_string(),
            hardware_class: HardwareClass::CpuOnly,
            quantization: Quantization::GgufQ4,
            size_gb: 4.2,
            min_ram_gb: 8,
            min_vram_gb: None,
            quality_score: 7,
            speed_score: 8,
            repo_id: "TheBloke/mpt-7B-instruct-GGUF".to_string(),
            description: "CPU-optimized quantized MPT-7B".to_string(),
            license: "Apache-2.0".to_string(),
        },
        ModelSpec {
            id: "mpt-7b-instruct-4bit".to_string(),
            display_name: "MPT-7B Instruct (4-bit)".to_string(),
            hardware_class: HardwareClass::GpuLow,
            quantization: Quantization::Bnb4Bit,
            size_gb: 4.5,
            min_ram_gb: 16,
            min_vram_gb: Some(6),
            quality_score: 7,
            speed_score: 8,
            repo_id: "mosaicml/mpt-7b-instruct".to_string(),
            description: "4-bit quantized MPT-7B for lower VRAM".to_string(),
            license: "Apache-2.0".to_string(),
        },
        // Falcon-7B Instruct variants
        ModelSpec {
            id: "falcon-7b-instruct".to_string(),
            display_name: "Falcon-7B Instruct".to_string(),
            hardware_class: HardwareClass::GpuMid,
            quantization: Quantization::FullPrecision,
            size_gb: 14.2,
            min_ram_gb: 32,
            min_vram_gb: Some(16),
            quality_score: 8,
            speed_score: 6,
            repo_id: "tiiuae/falcon-7b-instruct".to_string(),
            description: "Strong general-purpose instruction model".to_string(),
            license: "Apache-2.0".to_string(),
        },
        ModelSpec {
            id: "falcon-7b-instruct-gguf-q4".to_string(),
            display_name: "Falcon-7B Instruct (GGUF Q4)".to_string(),
            hardware_class: HardwareClass::CpuOnly,
            quantization: Quantization::GgufQ4,
            size_gb: 4.1,
            min_ram_gb: 8,
            min_vram_gb: None,
            quality_score: 7,
            speed_score: 7,
            repo_id: "TheBloke/falcon-7b-instruct-GGUF".to_string(),
            description: "CPU-optimized quantized Falcon-7B".to_string(),
            license: "Apache-2.0".to_string(),
        },
    ]
}
