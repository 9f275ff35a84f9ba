use serde::{Deserialize, Serialize};

/// What the external task executor reports for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub success: bool,

    /// Path of the produced artifact, when the task writes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    pub fn succeeded(output_path: Option<String>) -> Self {
        Self {
            success: true,
            output_path,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output_path: None,
            error: Some(error.into()),
        }
    }
}

/// Result of one render output (platform × language).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputResult {
    pub id: String,
    pub platform: String,
    pub language: String,
    pub path: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of driving a plan to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    /// False only when the foreground phase failed.
    pub success: bool,
    pub outputs: Vec<OutputResult>,
    pub version: String,

    /// Foreground task id that halted the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
}

impl RenderResult {
    pub fn failed_outputs(&self) -> impl Iterator<Item = &OutputResult> {
        self.outputs.iter().filter(|o| !o.success)
    }

    pub fn succeeded_outputs(&self) -> impl Iterator<Item = &OutputResult> {
        self.outputs.iter().filter(|o| o.success)
    }
}
