use std::collections::HashMap;

use chrono::Utc;

use crate::config::MemoryConfig;

use super::models::{
    AggregatedPatterns, FailurePattern, FailureRecord, LearningInstruction, LearningSource,
    LearningSummary, ProductionOutcome, ProductionRecord, SuccessRecord, TechniqueScore,
};
use super::preferences::{classify_feedback, PreferenceTag};

/// In-memory learning state shared by every history backend.
///
/// Backends load it, apply one mutation, then persist whatever the mutation
/// reports as touched.
#[derive(Debug, Clone)]
pub struct HistoryBook {
    history: Vec<ProductionRecord>,
    patterns: AggregatedPatterns,
    learnings: Vec<LearningInstruction>,
    aggregate_every: usize,
    min_preference_count: u32,
}

impl HistoryBook {
    pub fn new(cfg: &MemoryConfig) -> Self {
        Self {
            history: Vec::new(),
            patterns: AggregatedPatterns::default(),
            learnings: Vec::new(),
            aggregate_every: cfg.aggregate_every.max(1),
            min_preference_count: cfg.min_preference_count,
        }
    }

    /// Restore persisted state; history is kept in timestamp order.
    pub fn restore(
        mut self,
        mut history: Vec<ProductionRecord>,
        patterns: AggregatedPatterns,
        learnings: Vec<LearningInstruction>,
    ) -> Self {
        history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        self.history = history;
        self.patterns = patterns;
        self.learnings = learnings;
        self
    }

    pub fn history(&self) -> &[ProductionRecord] {
        &self.history
    }

    pub fn patterns(&self) -> &AggregatedPatterns {
        &self.patterns
    }

    pub fn learnings(&self) -> &[LearningInstruction] {
        &self.learnings
    }

    /// Append a production record. Returns the new record and whether the
    /// aggregated patterns were recomputed.
    pub fn record_production(
        &mut self,
        project_name: &str,
        outcome: &ProductionOutcome,
    ) -> (&ProductionRecord, bool) {
        let record = build_record(project_name, outcome);
        self.history.push(record);

        let reaggregated = self.history.len() % self.aggregate_every == 0;
        if reaggregated {
            self.patterns = aggregate_patterns(&self.history, self.min_preference_count);
        }

        let idx = self.history.len() - 1;
        (&self.history[idx], reaggregated)
    }

    /// Attach feedback to the project's most recent record, if there is one.
    pub fn record_feedback(
        &mut self,
        project_name: &str,
        feedback: &str,
    ) -> (Vec<PreferenceTag>, Option<&ProductionRecord>) {
        let tags = classify_feedback(feedback);

        let Some(record) = self
            .history
            .iter_mut()
            .rev()
            .find(|r| r.project == project_name)
        else {
            return (tags, None);
        };

        record.iterations.total_feedback_rounds += 1;
        record
            .preferences_detected
            .extend(tags.iter().map(|t| t.as_str().to_string()));

        (tags, Some(&*record))
    }

    pub fn add_learning(&mut self, instruction: &str) -> &LearningInstruction {
        self.learnings.push(LearningInstruction {
            instruction: instruction.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            source: LearningSource::User,
            applied: false,
        });
        let idx = self.learnings.len() - 1;
        &self.learnings[idx]
    }

    /// Remove learnings and preferences containing `item` (case-insensitive).
    /// Returns how many entries were dropped.
    pub fn forget(&mut self, item: &str) -> usize {
        let needle = item.to_lowercase();
        let before = self.learnings.len() + self.patterns.user_preferences.len();

        self.learnings
            .retain(|l| !l.instruction.to_lowercase().contains(&needle));
        self.patterns
            .user_preferences
            .retain(|p| !p.to_lowercase().contains(&needle));

        before - self.learnings.len() - self.patterns.user_preferences.len()
    }

    pub fn summary(&self) -> LearningSummary {
        let recent_start = self.learnings.len().saturating_sub(5);
        LearningSummary {
            total_productions: self.history.len(),
            total_feedback_rounds: self
                .history
                .iter()
                .map(|r| r.iterations.total_feedback_rounds)
                .sum(),
            top_techniques: self
                .patterns
                .effective_techniques
                .iter()
                .take(5)
                .map(|t| (t.technique.clone(), t.success_rate))
                .collect(),
            user_preferences: self.patterns.user_preferences.clone(),
            recent_learnings: self.learnings[recent_start..]
                .iter()
                .map(|l| l.instruction.clone())
                .collect(),
        }
    }
}

fn build_record(project_name: &str, outcome: &ProductionOutcome) -> ProductionRecord {
    let mut platforms: Vec<String> = Vec::new();
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for output in &outcome.outputs {
        if !platforms.contains(&output.platform) {
            platforms.push(output.platform.clone());
        }
        let component = format!("render:{}-{}", output.id, output.language);
        if output.success {
            successes.push(SuccessRecord {
                component,
                technique: None,
                description: format!("rendered {}", output.path),
                feedback: None,
            });
        } else {
            failures.push(FailureRecord {
                component,
                issue: output
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
                iterations_needed: 1,
                fix_applied: String::new(),
            });
        }
    }

    ProductionRecord {
        project: project_name.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: outcome.version.clone(),
        source_type: None,
        topic_domain: None,
        duration: None,
        platforms,
        successes,
        failures,
        preferences_detected: Vec::new(),
        iterations: Default::default(),
    }
}

/// Recompute technique scores, common failures and recurring preferences.
///
/// Preferences must appear at least `min_preference_count` times to count;
/// they are ordered by frequency, then name.
pub fn aggregate_patterns(
    history: &[ProductionRecord],
    min_preference_count: u32,
) -> AggregatedPatterns {
    let mut techniques: HashMap<&str, (u32, u32)> = HashMap::new();
    for record in history {
        for success in &record.successes {
            if let Some(technique) = success.technique.as_deref() {
                let entry = techniques.entry(technique).or_default();
                entry.0 += 1;
                entry.1 += 1;
            }
        }
    }
    let mut effective_techniques: Vec<TechniqueScore> = techniques
        .into_iter()
        .map(|(technique, (success, total))| TechniqueScore {
            technique: technique.to_string(),
            success_rate: f64::from(success) / f64::from(total),
            usage_count: total,
        })
        .collect();
    effective_techniques.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| a.technique.cmp(&b.technique))
    });

    let mut failures: HashMap<&str, (u32, &str)> = HashMap::new();
    for failure in history.iter().flat_map(|r| r.failures.iter()) {
        let entry = failures
            .entry(failure.issue.as_str())
            .or_insert((0, failure.fix_applied.as_str()));
        entry.0 += 1;
        if !failure.fix_applied.is_empty() {
            entry.1 = failure.fix_applied.as_str();
        }
    }
    let mut common_failures: Vec<FailurePattern> = failures
        .into_iter()
        .map(|(issue, (frequency, fix))| FailurePattern {
            issue: issue.to_string(),
            frequency,
            common_fix: fix.to_string(),
        })
        .collect();
    common_failures.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.issue.cmp(&b.issue)));

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for pref in history.iter().flat_map(|r| r.preferences_detected.iter()) {
        *counts.entry(pref.as_str()).or_default() += 1;
    }
    let mut recurring: Vec<(&str, u32)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= min_preference_count)
        .collect();
    recurring.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    AggregatedPatterns {
        effective_techniques,
        common_failures,
        user_preferences: recurring.into_iter().map(|(p, _)| p.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::OutputResult;
    use pretty_assertions::assert_eq;

    fn cfg(aggregate_every: usize) -> MemoryConfig {
        MemoryConfig {
            aggregate_every,
            ..MemoryConfig::default()
        }
    }

    fn output(id: &str, success: bool) -> OutputResult {
        OutputResult {
            id: id.to_string(),
            platform: "youtube".to_string(),
            language: "en".to_string(),
            path: format!("output/{id}.mp4"),
            success,
            error: (!success).then(|| "encoder crashed".to_string()),
        }
    }

    fn outcome(outputs: Vec<OutputResult>) -> ProductionOutcome {
        ProductionOutcome {
            success: true,
            outputs,
            version: "v1".to_string(),
        }
    }

    #[test]
    fn test_record_production_splits_successes_and_failures() {
        let mut book = HistoryBook::new(&cfg(5));
        let (record, reaggregated) =
            book.record_production("demo", &outcome(vec![output("main", true), output("alt", false)]));

        assert!(!reaggregated);
        assert_eq!(record.platforms, vec!["youtube".to_string()]);
        assert_eq!(record.successes.len(), 1);
        assert_eq!(record.failures[0].issue, "encoder crashed");
        assert_eq!(record.version, "v1");
    }

    #[test]
    fn test_feedback_attaches_to_latest_project_record() {
        let mut book = HistoryBook::new(&cfg(5));
        book.record_production("demo", &outcome(vec![]));
        book.record_production("other", &outcome(vec![]));

        let (tags, record) = book.record_feedback("demo", "make it slower");
        assert_eq!(tags, vec![PreferenceTag::PrefersSlowerPacing]);
        let record = record.unwrap();
        assert_eq!(record.iterations.total_feedback_rounds, 1);
        assert_eq!(record.preferences_detected, vec!["prefers_slower_pacing"]);
    }

    #[test]
    fn test_feedback_without_history_still_classifies() {
        let mut book = HistoryBook::new(&cfg(5));
        let (tags, record) = book.record_feedback("demo", "less text please");
        assert_eq!(tags, vec![PreferenceTag::PrefersMinimalText]);
        assert!(record.is_none());
    }

    #[test]
    fn test_recurring_preferences_surface_after_aggregation() {
        let mut book = HistoryBook::new(&cfg(2));
        book.record_production("a", &outcome(vec![]));
        book.record_feedback("a", "slower, more visuals");
        let (_, reaggregated) = book.record_production("b", &outcome(vec![]));
        assert!(reaggregated);
        assert!(book.patterns().user_preferences.is_empty());

        book.record_feedback("b", "still needs to slow down");
        book.record_production("c", &outcome(vec![]));
        let (_, reaggregated) = book.record_production("d", &outcome(vec![output("x", false)]));
        assert!(reaggregated);
        assert_eq!(book.patterns().user_preferences, vec!["prefers_slower_pacing"]);
        assert_eq!(book.patterns().common_failures[0].issue, "encoder crashed");
    }

    #[test]
    fn test_technique_scores_sorted_best_first() {
        let mut record = build_record("demo", &outcome(vec![]));
        record.successes.push(SuccessRecord {
            component: "script".into(),
            technique: Some("hooks".into()),
            description: "strong opener".into(),
            feedback: None,
        });
        let patterns = aggregate_patterns(&[record.clone(), record], 2);
        assert_eq!(patterns.effective_techniques.len(), 1);
        assert_eq!(patterns.effective_techniques[0].usage_count, 2);
    }

    #[test]
    fn test_forget_and_summary() {
        let mut book = HistoryBook::new(&cfg(5));
        for i in 0..7 {
            book.add_learning(&format!("tip {i}"));
        }
        book.add_learning("Always use Dark backgrounds");

        assert_eq!(book.forget("dark"), 1);
        let summary = book.summary();
        assert_eq!(summary.recent_learnings.len(), 5);
        assert_eq!(summary.recent_learnings.last().unwrap(), "tip 6");
        assert_eq!(summary.total_productions, 0);
    }
}
