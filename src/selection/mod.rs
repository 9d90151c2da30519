//! Model selection - hardware-aware ranking of catalog entries

mod engine;

pub use engine::{
    ModelCandidate, SelectionCriteria, SelectionEngine, SelectionRecord, SelectionStrategy,
};
