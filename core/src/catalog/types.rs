use serde::{Deserialize, Serialize};

/// Aspect ratio used when a platform is unknown to the catalog.
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// The slice of a platform definition the planner needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub aspect_ratio: String,
    pub chunking_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub display_name: String,
    pub aspect_ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_zones: Option<SafeZones>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunking: Option<ChunkingConfig>,
}

impl PlatformConfig {
    pub fn new(display_name: &str, aspect_ratio: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            aspect_ratio: aspect_ratio.to_string(),
            resolution: None,
            duration: None,
            fps: None,
            pacing: None,
            safe_zones: None,
            chunking: None,
        }
    }

    pub fn chunking_enabled(&self) -> bool {
        self.chunking.as_ref().is_some_and(|c| c.enabled)
    }

    pub fn info(&self) -> PlatformInfo {
        PlatformInfo {
            aspect_ratio: self.aspect_ratio.clone(),
            chunking_enabled: self.chunking_enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_seconds: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZones {
    #[serde(default)]
    pub top: Option<f32>,
    #[serde(default)]
    pub bottom: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_seconds: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandConfig {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<BrandVoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<BrandColors>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandVoice {
    pub tone: String,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub forbidden_words: Vec<String>,
    #[serde(default)]
    pub preferred_phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing: Option<StylePacing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub speed_multiplier: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing_override: Option<String>,
    #[serde(default)]
    pub particles: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylePacing {
    pub wpm_adjustment: i32,
    pub transition_speed: String,
}
