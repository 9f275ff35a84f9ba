//! Learning memory: production history, feedback-derived preferences and
//! standing learning instructions.
//!
//! [`HistoryBook`] holds the bookkeeping rules; storage backends wrap it and
//! implement [`HistoryStore`].

pub mod book;
pub mod models;
pub mod preferences;
pub mod r#trait;

mod in_memory;

pub use book::{aggregate_patterns, HistoryBook};
pub use in_memory::InMemoryHistory;
pub use models::{
    AggregatedPatterns, FailurePattern, FailureRecord, Iterations, LearningInstruction,
    LearningSource, LearningSummary, ProductionOutcome, ProductionRecord, SuccessRecord,
    TechniqueScore,
};
pub use preferences::{classify_feedback, PreferenceTag};
pub use r#trait::HistoryStore;
