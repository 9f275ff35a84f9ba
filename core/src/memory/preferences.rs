use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Discrete preference inferred from feedback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceTag {
    PrefersSlowerPacing,
    PrefersFasterPacing,
    PrefersMinimalText,
    PrefersMoreVisuals,
    PrefersSimplerExplanations,
    PrefersDetailedExplanations,
}

impl PreferenceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrefersSlowerPacing => "prefers_slower_pacing",
            Self::PrefersFasterPacing => "prefers_faster_pacing",
            Self::PrefersMinimalText => "prefers_minimal_text",
            Self::PrefersMoreVisuals => "prefers_more_visuals",
            Self::PrefersSimplerExplanations => "prefers_simpler_explanations",
            Self::PrefersDetailedExplanations => "prefers_detailed_explanations",
        }
    }
}

impl std::fmt::Display for PreferenceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const RULES: &[(&str, PreferenceTag)] = &[
    (r"(?i)slower|slow down", PreferenceTag::PrefersSlowerPacing),
    (r"(?i)faster|speed up", PreferenceTag::PrefersFasterPacing),
    (r"(?i)less text", PreferenceTag::PrefersMinimalText),
    (r"(?i)more visual", PreferenceTag::PrefersMoreVisuals),
    (r"(?i)simpler", PreferenceTag::PrefersSimplerExplanations),
    (r"(?i)more detail", PreferenceTag::PrefersDetailedExplanations),
];

fn compiled_rules() -> &'static [(Regex, PreferenceTag)] {
    static COMPILED: OnceLock<Vec<(Regex, PreferenceTag)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(pattern, tag)| Regex::new(pattern).ok().map(|re| (re, *tag)))
            .collect()
    })
}

/// Map feedback text onto preference tags.
///
/// Case-insensitive and non-exclusive; text matching no rule yields no tags.
pub fn classify_feedback(feedback: &str) -> Vec<PreferenceTag> {
    compiled_rules()
        .iter()
        .filter(|(re, _)| re.is_match(feedback))
        .map(|(_, tag)| *tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn tags(text: &str) -> HashSet<&'static str> {
        classify_feedback(text).iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn test_multiple_tags_fire() {
        assert_eq!(
            tags("Please make it slower and use less text"),
            HashSet::from(["prefers_slower_pacing", "prefers_minimal_text"])
        );
    }

    #[test]
    fn test_no_match_yields_empty() {
        assert!(classify_feedback("looks great").is_empty());
        assert!(classify_feedback("").is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(tags("SPEED UP the intro"), HashSet::from(["prefers_faster_pacing"]));
        assert_eq!(
            tags("More Visuals, More Detail please"),
            HashSet::from(["prefers_more_visuals", "prefers_detailed_explanations"])
        );
        assert_eq!(tags("Simpler words"), HashSet::from(["prefers_simpler_explanations"]));
    }

    #[test]
    fn test_every_rule_compiles() {
        assert_eq!(compiled_rules().len(), RULES.len());
    }

    #[test]
    fn test_tag_serializes_as_snake_case() {
        let json = serde_json::to_string(&PreferenceTag::PrefersMinimalText).unwrap();
        assert_eq!(json, "\"prefers_minimal_text\"");
    }
}
