use serde::{Deserialize, Serialize};

/// Fallback estimate for tasks whose origin did not supply one.
pub const DEFAULT_TASK_DURATION_SECS: u64 = 60;

/// Closed set of production stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Script,
    Scene,
    Voiceover,
    Render,
    Validate,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Scene => "scene",
            Self::Voiceover => "voiceover",
            Self::Render => "render",
            Self::Validate => "validate",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of production work inside an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    /// Human readable label, only used for logs and plan listings.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_id: Option<String>,

    /// Seconds. `None` means the origin gave no estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u64>,
}

impl AgentTask {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            dependencies: Vec::new(),
            platform: None,
            language: None,
            aspect_ratio: None,
            output_id: None,
            estimated_duration: None,
        }
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_duration(mut self, secs: u64) -> Self {
        self.estimated_duration = Some(secs);
        self
    }

    pub fn effective_duration(&self) -> u64 {
        self.estimated_duration.unwrap_or(DEFAULT_TASK_DURATION_SECS)
    }

    /// Render tasks are the only ones that produce a deliverable.
    pub fn produces_output(&self) -> bool {
        self.output_id.is_some()
    }
}

/// Common task interface for executor graph handling.
pub trait TaskLike: Clone + Send + Sync {
    fn id(&self) -> &str;
    fn dependencies(&self) -> &[String];
}

impl TaskLike for AgentTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}
