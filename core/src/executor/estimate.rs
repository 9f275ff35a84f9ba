use serde::Serialize;

use super::types::{AgentTask, TaskGroup};

/// Per-part contributions to a plan's wall-clock estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationBreakdown {
    pub foreground: u64,
    /// (group id, slowest task in the group)
    pub groups: Vec<(String, u64)>,
}

impl DurationBreakdown {
    pub fn total(&self) -> u64 {
        self.foreground + self.groups.iter().map(|(_, secs)| secs).sum::<u64>()
    }
}

/// Fold a plan into one wall-clock figure in seconds.
///
/// Foreground tasks are summed. Each background group adds its slowest task,
/// and groups are summed in array order even when their `run_after` sets
/// would let them overlap (`scenes` and `voiceovers`), so the figure is an
/// upper bound rather than a critical-path length.
pub fn estimate_total_duration(foreground: &[AgentTask], groups: &[TaskGroup]) -> u64 {
    duration_breakdown(foreground, groups).total()
}

pub fn duration_breakdown(foreground: &[AgentTask], groups: &[TaskGroup]) -> DurationBreakdown {
    let foreground = foreground.iter().map(AgentTask::effective_duration).sum();
    let groups = groups
        .iter()
        .map(|g| (g.id.clone(), group_duration(g)))
        .collect();

    DurationBreakdown { foreground, groups }
}

/// Slowest task gates the group; an empty group contributes nothing.
pub fn group_duration(group: &TaskGroup) -> u64 {
    group
        .tasks
        .iter()
        .map(AgentTask::effective_duration)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::TaskKind;

    fn task(id: &str, secs: Option<u64>) -> AgentTask {
        let mut t = AgentTask::new(id, id, TaskKind::Scene);
        t.estimated_duration = secs;
        t
    }

    fn group(id: &str, tasks: Vec<AgentTask>) -> TaskGroup {
        let mut g = TaskGroup::new(id, ["script"]);
        g.tasks = tasks;
        g
    }

    #[test]
    fn test_group_takes_max_not_sum() {
        let g = group("scenes", vec![task("a", Some(180)), task("b", Some(90))]);
        assert_eq!(group_duration(&g), 180);
    }

    #[test]
    fn test_empty_group_contributes_zero() {
        let foreground = vec![task("script", Some(120))];
        let groups = vec![group("scenes", vec![]), group("renders", vec![task("r", Some(300))])];
        assert_eq!(estimate_total_duration(&foreground, &groups), 420);
    }

    #[test]
    fn test_missing_estimate_defaults_to_sixty() {
        let foreground = vec![task("script", None), task("outline", None)];
        let groups = vec![group("voiceovers", vec![task("v", None)])];
        assert_eq!(estimate_total_duration(&foreground, &groups), 180);
    }

    #[test]
    fn test_overlapping_groups_still_summed() {
        let foreground = vec![task("script", Some(120))];
        let groups = vec![
            group("scenes", vec![task("scene-16x9", Some(180))]),
            group("voiceovers", vec![task("voiceover-en", Some(60))]),
        ];
        let breakdown = duration_breakdown(&foreground, &groups);
        assert_eq!(breakdown.foreground, 120);
        assert_eq!(
            breakdown.groups,
            vec![("scenes".to_string(), 180), ("voiceovers".to_string(), 60)]
        );
        assert_eq!(breakdown.total(), 360);
    }
}
