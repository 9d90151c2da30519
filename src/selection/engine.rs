//! Selection engine - scores and ranks catalog entries against a hardware
//! profile

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::catalog::{ModelSpec, ResourceCatalog, BASELINE_ID};
use crate::hardware::HardwareProfile;

/// Model selection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    QualityFirst,
    SpeedFirst,
    MinimalResources,
    Balanced,
}

/// Criteria for one selection call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub strategy: SelectionStrategy,
    /// Drop specs larger than this before scoring
    pub max_size_gb: Option<f64>,
    /// Score bonus for quantized variants
    pub prefer_quantized: bool,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::Balanced,
            max_size_gb: None,
            prefer_quantized: true,
        }
    }
}

/// A feasible catalog entry with selection metadata, produced fresh per call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub spec: ModelSpec,
    /// Soft 0..1 measure of margin above the hard hardware minimums
    pub compatibility_score: f64,
    /// Strategy-weighted composite used for ranking
    pub selection_score: f64,
    pub is_downloaded: bool,
}

/// Diagnostic record of one completed selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub timestamp: DateTime<Utc>,
    pub chosen_id: String,
    pub strategy: SelectionStrategy,
}

// Compatibility score weights. Tunable; only ordering is contractual.
const W_RAM: f64 = 0.4;
const W_GPU: f64 = 0.3;
const W_DEPS: f64 = 0.2;
const W_SIZE: f64 = 0.1;

// Strategy weights for the quality/speed split
const PRIMARY_WEIGHT: f64 = 0.7;
const SECONDARY_WEIGHT: f64 = 0.3;

/// Bonus applied when the caller prefers quantized variants
const QUANTIZED_BONUS: f64 = 1.5;

/// Soft credit for a GPU-tier spec that states no VRAM minimum
const UNKNOWN_VRAM_CREDIT: f64 = 0.66;

/// Tools whose presence raises the dependency component of the
/// compatibility score
const RUNTIME_TOOLS: &[&str] = &["ollama", "llama-server", "ffmpeg"];

/// Bounded selection history length
const HISTORY_CAP: usize = 50;

/// Ranks catalog entries for a hardware profile and derives the fallback
/// hierarchy.
///
/// Pure, synchronous computation over immutable inputs; the only interior
/// state is the bounded diagnostic history.
pub struct SelectionEngine {
    catalog: Arc<ResourceCatalog>,
    downloaded: HashSet<String>,
    history: Mutex<VecDeque<SelectionRecord>>,
}

impl SelectionEngine {
    pub fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self {
            catalog,
            downloaded: HashSet::new(),
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAP)),
        }
    }

    /// Replace the set of locally present model ids
    pub fn set_downloaded<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.downloaded = ids.into_iter().map(Into::into).collect();
    }

    /// Mark a single model as locally present
    pub fn mark_downloaded(&mut self, id: &str) {
        self.downloaded.insert(id.to_string());
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// All feasible candidates, ranked best first.
    ///
    /// Infeasible specs are dropped before scoring and never appear in the
    /// output. Ranking is deterministic: stable sort by selection score
    /// descending, ties broken by downloaded-first, then smaller size, then
    /// catalog insertion order.
    pub fn select_candidates(
        &self,
        profile: &HardwareProfile,
        criteria: &SelectionCriteria,
    ) -> Vec<ModelCandidate> {
        let mut candidates: Vec<ModelCandidate> = self
            .catalog
            .iter()
            .filter(|spec| Self::passes_hard_gate(spec, profile, criteria))
            .map(|spec| {
                let compatibility_score = Self::compatibility_score(spec, profile);
                let is_downloaded = self.downloaded.contains(&spec.id);
                let selection_score =
                    Self::selection_score(spec, criteria, compatibility_score);
                ModelCandidate {
                    spec: spec.clone(),
                    compatibility_score,
                    selection_score,
                    is_downloaded,
                }
            })
            .collect();

        // Stable sort keeps catalog insertion order as the final tie-break
        candidates.sort_by(|a, b| {
            b.selection_score
                .total_cmp(&a.selection_score)
                .then_with(|| b.is_downloaded.cmp(&a.is_downloaded))
                .then_with(|| a.spec.size_gb.total_cmp(&b.spec.size_gb))
        });

        debug!(
            "Ranked {} candidates for strategy {:?}",
            candidates.len(),
            criteria.strategy
        );
        candidates
    }

    /// Best feasible candidate, or `None` when nothing fits the hardware.
    ///
    /// `None` is an expected outcome, not an error; callers fall through to
    /// the baseline.
    pub fn select_best(
        &self,
        profile: &HardwareProfile,
        criteria: &SelectionCriteria,
    ) -> Option<ModelCandidate> {
        let best = self.select_candidates(profile, criteria).into_iter().next();

        if let Some(candidate) = &best {
            info!(
                "Selected model '{}' (score {:.2}, compat {:.2})",
                candidate.spec.id, candidate.selection_score, candidate.compatibility_score
            );
            self.record_selection(&candidate.spec.id, criteria.strategy);
        } else {
            info!("No feasible model for current hardware; callers should use the baseline");
        }
        best
    }

    /// Ordered ids to attempt in sequence, always terminated by the
    /// guaranteed-available baseline. Never empty.
    pub fn fallback_hierarchy(&self, profile: &HardwareProfile) -> Vec<String> {
        let criteria = SelectionCriteria::default();
        let mut ids: Vec<String> = self
            .select_candidates(profile, &criteria)
            .into_iter()
            .map(|c| c.spec.id)
            .collect();

        // The hard gate already excludes GPU-only specs on GPU-less hosts;
        // keep the invariant explicit for hierarchies built elsewhere
        if !profile.has_gpu {
            let catalog = &self.catalog;
            ids.retain(|id| {
                catalog
                    .get(id)
                    .map(|s| !s.requires_gpu() || s.is_cpu_compatible())
                    .unwrap_or(false)
            });
        }

        ids.push(BASELINE_ID.to_string());
        ids
    }

    /// Diagnostic log of recent selections (most recent last)
    pub fn history(&self) -> Vec<SelectionRecord> {
        self.history
            .lock()
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn record_selection(&self, chosen_id: &str, strategy: SelectionStrategy) {
        if let Ok(mut history) = self.history.lock() {
            if history.len() == HISTORY_CAP {
                history.pop_front();
            }
            history.push_back(SelectionRecord {
                timestamp: Utc::now(),
                chosen_id: chosen_id.to_string(),
                strategy,
            });
        }
    }

    /// Hard compatibility gate; precedes scoring.
    ///
    /// Unknown VRAM fails the gate for specs stating a VRAM minimum: the
    /// gate must never admit something that may not run.
    fn passes_hard_gate(
        spec: &ModelSpec,
        profile: &HardwareProfile,
        criteria: &SelectionCriteria,
    ) -> bool {
        if let Some(max_size) = criteria.max_size_gb {
            if spec.size_gb > max_size {
                return false;
            }
        }

        if profile.available_ram_gb < spec.min_ram_gb as f64 {
            return false;
        }

        if spec.requires_gpu() && !spec.is_cpu_compatible() {
            if !profile.has_gpu {
                return false;
            }
            if let Some(min_vram) = spec.min_vram_gb {
                match profile.total_vram_gb {
                    Some(vram) if vram >= min_vram as f64 => {}
                    _ => return false,
                }
            }
        }

        true
    }

    /// Soft 0..1 margin above the hard minimums.
    ///
    /// A spec sitting exactly at the RAM floor scores lower than one with
    /// double the required RAM, even though both pass the gate.
    fn compatibility_score(spec: &ModelSpec, profile: &HardwareProfile) -> f64 {
        let ram_ratio = profile.available_ram_gb / spec.min_ram_gb.max(1) as f64;
        let ram_margin = (ram_ratio - 1.0).clamp(0.0, 1.0);

        let gpu_margin = if !spec.requires_gpu() {
            1.0
        } else {
            match (spec.min_vram_gb, profile.total_vram_gb) {
                (Some(min_vram), Some(vram)) => {
                    (vram / min_vram.max(1) as f64 - 1.0).clamp(0.0, 1.0)
                }
                _ => UNKNOWN_VRAM_CREDIT,
            }
        };

        let available = RUNTIME_TOOLS
            .iter()
            .filter(|t| profile.has_dependency(t))
            .count();
        let deps_fraction = available as f64 / RUNTIME_TOOLS.len() as f64;

        let size_affinity = if spec.size_gb <= 5.0 {
            1.0
        } else if spec.size_gb <= 15.0 {
            0.7
        } else {
            0.3
        };

        (W_RAM * ram_margin + W_GPU * gpu_margin + W_DEPS * deps_fraction + W_SIZE * size_affinity)
            .clamp(0.0, 1.0)
    }

    fn selection_score(
        spec: &ModelSpec,
        criteria: &SelectionCriteria,
        compatibility: f64,
    ) -> f64 {
        let quality = spec.quality_score as f64;
        let speed = spec.speed_score as f64;

        let mut score = match criteria.strategy {
            SelectionStrategy::QualityFirst => quality * PRIMARY_WEIGHT + speed * SECONDARY_WEIGHT,
            SelectionStrategy::SpeedFirst => speed * PRIMARY_WEIGHT + quality * SECONDARY_WEIGHT,
            SelectionStrategy::MinimalResources => {
                // Smaller and cheaper wins; quality does not enter
                10.0 / (1.0 + spec.size_gb) * 0.6 + 10.0 / (1.0 + spec.min_ram_gb as f64) * 0.4
            }
            SelectionStrategy::Balanced => (quality + speed + compatibility * 10.0) / 3.0,
        };

        if criteria.prefer_quantized && spec.is_quantized() {
            score += QUANTIZED_BONUS;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HardwareClass, Quantization};
    use std::collections::HashMap;

    fn profile(has_gpu: bool, vram: Option<f64>, ram: f64) -> HardwareProfile {
        HardwareProfile {
            has_gpu,
            gpu_count: if has_gpu { 1 } else { 0 },
            total_vram_gb: vram,
            total_ram_gb: ram,
            available_ram_gb: ram,
            cpu_cores: 4,
            dependencies: HashMap::new(),
        }
    }

    fn spec(id: &str, class: HardwareClass, size_gb: f64, min_ram: u32, min_vram: Option<u32>) -> ModelSpec {
        ModelSpec {
            id: id.to_string(),
            display_name: id.to_string(),
            hardware_class: class,
            quantization: if class == HardwareClass::CpuOnly {
                Quantization::GgufQ4
            } else {
                Quantization::FullPrecision
            },
            size_gb,
            min_ram_gb: min_ram,
            min_vram_gb: min_vram,
            quality_score: 5,
            speed_score: 5,
            repo_id: format!("test/{}", id),
            description: String::new(),
            license: "MIT".to_string(),
        }
    }

    fn engine(specs: Vec<ModelSpec>) -> SelectionEngine {
        SelectionEngine::new(Arc::new(ResourceCatalog::new(specs).unwrap()))
    }

    #[test]
    fn test_hard_gate_never_violated() {
        let engine = SelectionEngine::new(Arc::new(ResourceCatalog::builtin()));
        let profiles = [
            profile(false, None, 2.0),
            profile(false, None, 8.0),
            profile(true, Some(8.0), 16.0),
            profile(true, None, 64.0),
        ];
        let criteria = SelectionCriteria::default();

        for p in &profiles {
            for c in engine.select_candidates(p, &criteria) {
                assert!(p.available_ram_gb >= c.spec.min_ram_gb as f64);
                if c.spec.requires_gpu() && !c.spec.is_cpu_compatible() {
                    assert!(p.has_gpu);
                    if let Some(min_vram) = c.spec.min_vram_gb {
                        assert!(p.total_vram_gb.unwrap() >= min_vram as f64);
                    }
                }
            }
        }
    }

    #[test]
    fn test_gpu_only_spec_dropped_without_gpu() {
        // No GPU, 4GB RAM, one GPU-only spec and one CPU spec
        let engine = engine(vec![
            spec("gpu-only", HardwareClass::GpuMid, 6.0, 8, Some(8)),
            spec("cpu-small", HardwareClass::CpuOnly, 1.0, 2, None),
        ]);
        let p = profile(false, None, 4.0);
        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::Balanced,
            ..Default::default()
        };

        let candidates = engine.select_candidates(&p, &criteria);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].spec.id, "cpu-small");

        let best = engine.select_best(&p, &criteria).unwrap();
        assert_eq!(best.spec.id, "cpu-small");
    }

    #[test]
    fn test_max_size_filters_before_scoring() {
        // Cap of 2.0GB over entries of 0.6, 1.7 and 4.5GB
        let engine = engine(vec![
            spec("small", HardwareClass::CpuOnly, 0.6, 2, None),
            spec("medium", HardwareClass::CpuOnly, 1.7, 4, None),
            spec("large", HardwareClass::CpuOnly, 4.5, 8, None),
        ]);
        let p = profile(false, None, 16.0);
        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::Balanced,
            max_size_gb: Some(2.0),
            prefer_quantized: false,
        };

        let candidates = engine.select_candidates(&p, &criteria);
        let ids: Vec<&str> = candidates.iter().map(|c| c.spec.id.as_str()).collect();
        assert_eq!(candidates.len(), 2);
        assert!(ids.contains(&"small"));
        assert!(ids.contains(&"medium"));
    }

    #[test]
    fn test_unknown_vram_fails_gate_for_vram_minimum() {
        let engine = engine(vec![spec("gpu-8gb", HardwareClass::GpuMid, 6.0, 8, Some(8))]);
        let p = profile(true, None, 32.0);
        let candidates = engine.select_candidates(&p, &SelectionCriteria::default());
        assert!(candidates.is_empty());
        assert!(engine.select_best(&p, &SelectionCriteria::default()).is_none());
    }

    #[test]
    fn test_ram_headroom_raises_compatibility() {
        let engine = engine(vec![
            spec("at-floor", HardwareClass::CpuOnly, 1.0, 8, None),
            spec("roomy", HardwareClass::CpuOnly, 1.0, 4, None),
        ]);
        let p = profile(false, None, 8.0);
        let candidates = engine.select_candidates(&p, &SelectionCriteria::default());

        let at_floor = candidates.iter().find(|c| c.spec.id == "at-floor").unwrap();
        let roomy = candidates.iter().find(|c| c.spec.id == "roomy").unwrap();
        assert!(roomy.compatibility_score > at_floor.compatibility_score);
    }

    #[test]
    fn test_determinism() {
        let engine = SelectionEngine::new(Arc::new(ResourceCatalog::builtin()));
        let p = profile(false, None, 8.0);
        let criteria = SelectionCriteria::default();

        let first = engine.select_best(&p, &criteria).map(|c| c.spec.id);
        let second = engine.select_best(&p, &criteria).map(|c| c.spec.id);
        assert_eq!(first, second);

        let ranked_a: Vec<String> = engine
            .select_candidates(&p, &criteria)
            .into_iter()
            .map(|c| c.spec.id)
            .collect();
        let ranked_b: Vec<String> = engine
            .select_candidates(&p, &criteria)
            .into_iter()
            .map(|c| c.spec.id)
            .collect();
        assert_eq!(ranked_a, ranked_b);
    }

    #[test]
    fn test_downloaded_breaks_ties() {
        // Identical specs apart from id; scores tie exactly
        let mut engine = engine(vec![
            spec("twin-a", HardwareClass::CpuOnly, 1.0, 2, None),
            spec("twin-b", HardwareClass::CpuOnly, 1.0, 2, None),
        ]);
        let p = profile(false, None, 8.0);

        let ranked = engine.select_candidates(&p, &SelectionCriteria::default());
        // Insertion order decides while neither is downloaded
        assert_eq!(ranked[0].spec.id, "twin-a");

        engine.mark_downloaded("twin-b");
        let ranked = engine.select_candidates(&p, &SelectionCriteria::default());
        assert_eq!(ranked[0].spec.id, "twin-b");
    }

    #[test]
    fn test_smaller_size_breaks_ties_before_insertion_order() {
        let mut big = spec("big-twin", HardwareClass::CpuOnly, 2.0, 2, None);
        let small = spec("small-twin", HardwareClass::CpuOnly, 1.0, 2, None);
        // Force equal scores under QualityFirst by matching quality/speed
        big.quality_score = 6;
        big.speed_score = 6;
        let mut small = small;
        small.quality_score = 6;
        small.speed_score = 6;

        let engine = engine(vec![big, small]);
        let p = profile(false, None, 16.0);
        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::QualityFirst,
            max_size_gb: None,
            prefer_quantized: true,
        };

        let ranked = engine.select_candidates(&p, &criteria);
        assert_eq!(ranked[0].spec.id, "small-twin");
    }

    #[test]
    fn test_minimal_resources_prefers_smaller() {
        let engine = engine(vec![
            spec("heavy", HardwareClass::CpuOnly, 4.0, 8, None),
            spec("light", HardwareClass::CpuOnly, 0.5, 2, None),
        ]);
        let p = profile(false, None, 32.0);
        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::MinimalResources,
            ..Default::default()
        };

        let best = engine.select_best(&p, &criteria).unwrap();
        assert_eq!(best.spec.id, "light");
    }

    #[test]
    fn test_quality_first_ordering() {
        let mut good = spec("good", HardwareClass::CpuOnly, 2.0, 4, None);
        good.quality_score = 8;
        good.speed_score = 4;
        let mut fast = spec("fast", HardwareClass::CpuOnly, 2.0, 4, None);
        fast.quality_score = 4;
        fast.speed_score = 8;

        let engine = engine(vec![good, fast]);
        let p = profile(false, None, 16.0);

        let quality = engine
            .select_best(
                &p,
                &SelectionCriteria {
                    strategy: SelectionStrategy::QualityFirst,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(quality.spec.id, "good");

        let speed = engine
            .select_best(
                &p,
                &SelectionCriteria {
                    strategy: SelectionStrategy::SpeedFirst,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(speed.spec.id, "fast");
    }

    #[test]
    fn test_fallback_hierarchy_never_empty_and_ends_in_baseline() {
        let engine = SelectionEngine::new(Arc::new(ResourceCatalog::builtin()));

        // Minimal host: no GPU, barely any RAM
        let tiny = profile(false, None, 1.0);
        let hierarchy = engine.fallback_hierarchy(&tiny);
        assert!(!hierarchy.is_empty());
        assert_eq!(hierarchy.last().unwrap(), BASELINE_ID);

        // Capable host: GPU-only ids allowed, baseline still terminates
        let big = profile(true, Some(24.0), 64.0);
        let hierarchy = engine.fallback_hierarchy(&big);
        assert_eq!(hierarchy.last().unwrap(), BASELINE_ID);
        assert!(hierarchy.len() > 1);
    }

    #[test]
    fn test_hierarchy_excludes_gpu_only_without_gpu() {
        let engine = SelectionEngine::new(Arc::new(ResourceCatalog::builtin()));
        let p = profile(false, None, 64.0);
        let hierarchy = engine.fallback_hierarchy(&p);
        for id in &hierarchy {
            if id == BASELINE_ID {
                continue;
            }
            let spec = engine.catalog().get(id).unwrap();
            assert!(spec.is_cpu_compatible(), "{} is GPU-only", id);
        }
    }

    #[test]
    fn test_history_records_and_caps() {
        let engine = engine(vec![spec("only", HardwareClass::CpuOnly, 1.0, 2, None)]);
        let p = profile(false, None, 8.0);
        let criteria = SelectionCriteria::default();

        for _ in 0..60 {
            engine.select_best(&p, &criteria);
        }
        let history = engine.history();
        assert_eq!(history.len(), 50);
        assert!(history.iter().all(|r| r.chosen_id == "only"));
    }
}
