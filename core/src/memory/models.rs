use serde::{Deserialize, Serialize};

use crate::executor::types::OutputResult;

/// What the coordinator reports once a plan execution completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOutcome {
    pub success: bool,
    pub outputs: Vec<OutputResult>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub project: String,
    /// RFC 3339
    pub timestamp: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub successes: Vec<SuccessRecord>,
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
    #[serde(default)]
    pub preferences_detected: Vec<String>,
    #[serde(default)]
    pub iterations: Iterations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessRecord {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub component: String,
    pub issue: String,
    pub iterations_needed: u32,
    #[serde(default)]
    pub fix_applied: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iterations {
    pub script: u32,
    pub scenes: u32,
    pub total_feedback_rounds: u32,
}

impl Default for Iterations {
    fn default() -> Self {
        Self {
            script: 1,
            scenes: 1,
            total_feedback_rounds: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPatterns {
    #[serde(default)]
    pub effective_techniques: Vec<TechniqueScore>,
    #[serde(default)]
    pub common_failures: Vec<FailurePattern>,
    #[serde(default)]
    pub user_preferences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueScore {
    pub technique: String,
    pub success_rate: f64,
    pub usage_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePattern {
    pub issue: String,
    pub frequency: u32,
    pub common_fix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningSource {
    User,
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningInstruction {
    pub instruction: String,
    pub timestamp: String,
    pub source: LearningSource,
    #[serde(default)]
    pub applied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningSummary {
    pub total_productions: usize,
    pub total_feedback_rounds: u32,
    /// (technique, success rate), best first
    pub top_techniques: Vec<(String, f64)>,
    pub user_preferences: Vec<String>,
    pub recent_learnings: Vec<String>,
}
