use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ExecutorError;
use crate::executor::graph::TaskGraph;

use super::task::AgentTask;

/// Language assumed for outputs that do not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A set of mutually independent tasks that run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub id: String,
    pub tasks: Vec<AgentTask>,
    /// Task or group ids that must fully complete before any task here starts.
    pub run_after: Vec<String>,
}

impl TaskGroup {
    pub fn new<I, S>(id: impl Into<String>, run_after: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            tasks: Vec::new(),
            run_after: run_after.into_iter().map(Into::into).collect(),
        }
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.id.clone()).collect()
    }
}

/// One requested (output, platform, language) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRequest {
    pub id: String,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl OutputRequest {
    pub fn new(id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

/// CLI-level output filters. `only` wins over `lang` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RenderFilter {
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(ids.into_iter().map(Into::into).collect()),
            lang: None,
        }
    }

    pub fn lang(lang: impl Into<String>) -> Self {
        Self {
            only: None,
            lang: Some(lang.into()),
        }
    }
}

/// Fully built task graph for one render request.
///
/// Built fresh per request and never mutated afterwards; the coordinator
/// consumes it once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    project_name: String,
    total_outputs: usize,
    foreground_tasks: Vec<AgentTask>,
    background_groups: Vec<TaskGroup>,
    estimated_total_duration: u64,
}

impl ExecutionPlan {
    pub(crate) fn new(
        project_name: String,
        total_outputs: usize,
        foreground_tasks: Vec<AgentTask>,
        background_groups: Vec<TaskGroup>,
        estimated_total_duration: u64,
    ) -> Self {
        Self {
            project_name,
            total_outputs,
            foreground_tasks,
            background_groups,
            estimated_total_duration,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn total_outputs(&self) -> usize {
        self.total_outputs
    }

    pub fn foreground_tasks(&self) -> &[AgentTask] {
        &self.foreground_tasks
    }

    pub fn background_groups(&self) -> &[TaskGroup] {
        &self.background_groups
    }

    pub fn estimated_total_duration(&self) -> u64 {
        self.estimated_total_duration
    }

    pub fn group(&self, id: &str) -> Option<&TaskGroup> {
        self.background_groups.iter().find(|g| g.id == id)
    }

    /// All tasks in plan order: foreground first, then each group.
    pub fn tasks(&self) -> impl Iterator<Item = &AgentTask> {
        self.foreground_tasks
            .iter()
            .chain(self.background_groups.iter().flat_map(|g| g.tasks.iter()))
    }

    pub fn task(&self, id: &str) -> Option<&AgentTask> {
        self.tasks().find(|t| t.id == id)
    }

    /// Check the structural invariants: unique ids, dependencies and
    /// `run_after` entries only point backwards in the plan, and no task in a
    /// group depends on a sibling.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        let all_ids: HashSet<&str> = self
            .tasks()
            .map(|t| t.id.as_str())
            .chain(self.background_groups.iter().map(|g| g.id.as_str()))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();

        for task in &self.foreground_tasks {
            check_deps(&task.id, &task.dependencies, &seen, &all_ids, None)?;
            if !seen.insert(task.id.as_str()) {
                return Err(ExecutorError::DuplicateTaskId(task.id.clone()));
            }
        }

        for group in &self.background_groups {
            check_deps(&group.id, &group.run_after, &seen, &all_ids, None)?;
            for task in &group.tasks {
                check_deps(&task.id, &task.dependencies, &seen, &all_ids, Some(group))?;
            }
            for task in &group.tasks {
                if !seen.insert(task.id.as_str()) {
                    return Err(ExecutorError::DuplicateTaskId(task.id.clone()));
                }
            }
            if !seen.insert(group.id.as_str()) {
                return Err(ExecutorError::DuplicateTaskId(group.id.clone()));
            }
        }

        let graph = self.task_graph()?;
        graph.validate()
    }

    /// Task graph where group references and `run_after` edges are expanded
    /// into the member tasks they stand for.
    pub fn task_graph(&self) -> Result<TaskGraph<AgentTask>, ExecutorError> {
        let members: HashMap<&str, Vec<String>> = self
            .background_groups
            .iter()
            .map(|g| (g.id.as_str(), g.task_ids()))
            .collect();

        let expand = |ids: &[String], out: &mut Vec<String>| {
            for id in ids {
                match members.get(id.as_str()) {
                    Some(task_ids) => out.extend(task_ids.iter().cloned()),
                    None => out.push(id.clone()),
                }
            }
        };

        let mut tasks = Vec::new();
        for task in &self.foreground_tasks {
            let mut t = task.clone();
            let mut deps = Vec::new();
            expand(&task.dependencies, &mut deps);
            t.dependencies = dedup(deps);
            tasks.push(t);
        }
        for group in &self.background_groups {
            for task in &group.tasks {
                let mut t = task.clone();
                let mut deps = Vec::new();
                expand(&group.run_after, &mut deps);
                expand(&task.dependencies, &mut deps);
                t.dependencies = dedup(deps);
                tasks.push(t);
            }
        }

        TaskGraph::from_tasks(&tasks)
    }
}

fn check_deps(
    owner: &str,
    deps: &[String],
    seen: &HashSet<&str>,
    all_ids: &HashSet<&str>,
    group: Option<&TaskGroup>,
) -> Result<(), ExecutorError> {
    for dep in deps {
        if seen.contains(dep.as_str()) {
            continue;
        }
        if let Some(group) = group {
            if dep == &group.id || group.tasks.iter().any(|t| &t.id == dep) {
                return Err(ExecutorError::IntraGroupDependency {
                    group_id: group.id.clone(),
                    task_id: owner.to_string(),
                    dep: dep.clone(),
                });
            }
        }
        if all_ids.contains(dep.as_str()) {
            return Err(ExecutorError::ForwardReference {
                task_id: owner.to_string(),
                dep: dep.clone(),
            });
        }
        return Err(ExecutorError::DependencyNotFound {
            task_id: owner.to_string(),
            missing_dep: dep.clone(),
        });
    }
    Ok(())
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::TaskKind;

    fn script() -> AgentTask {
        AgentTask::new("script", "Script", TaskKind::Script).with_duration(120)
    }

    fn plan(groups: Vec<TaskGroup>) -> ExecutionPlan {
        ExecutionPlan::new("demo".into(), 1, vec![script()], groups, 0)
    }

    #[test]
    fn test_valid_plan_passes() {
        let mut scenes = TaskGroup::new("scenes", ["script"]);
        scenes
            .tasks
            .push(AgentTask::new("scene-16x9", "Scene", TaskKind::Scene).depends_on(["script"]));
        let mut renders = TaskGroup::new("renders", ["scenes"]);
        renders.tasks.push(
            AgentTask::new("render-main-en", "Render", TaskKind::Render).depends_on(["scene-16x9"]),
        );

        assert!(plan(vec![scenes, renders]).validate().is_ok());
    }

    #[test]
    fn test_forward_reference_rejected() {
        let mut scenes = TaskGroup::new("scenes", ["script"]);
        scenes.tasks.push(
            AgentTask::new("scene-16x9", "Scene", TaskKind::Scene).depends_on(["render-main-en"]),
        );
        let mut renders = TaskGroup::new("renders", ["scenes"]);
        renders
            .tasks
            .push(AgentTask::new("render-main-en", "Render", TaskKind::Render));

        let err = plan(vec![scenes, renders]).validate().unwrap_err();
        assert!(matches!(err, ExecutorError::ForwardReference { .. }));
    }

    #[test]
    fn test_intra_group_dependency_rejected() {
        let mut scenes = TaskGroup::new("scenes", ["script"]);
        scenes
            .tasks
            .push(AgentTask::new("scene-16x9", "Scene", TaskKind::Scene));
        scenes.tasks.push(
            AgentTask::new("scene-9x16", "Scene", TaskKind::Scene).depends_on(["scene-16x9"]),
        );

        let err = plan(vec![scenes]).validate().unwrap_err();
        assert!(matches!(err, ExecutorError::IntraGroupDependency { .. }));
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut scenes = TaskGroup::new("scenes", ["script"]);
        scenes.tasks.push(
            AgentTask::new("scene-16x9", "Scene", TaskKind::Scene).depends_on(["scene-16x9"]),
        );

        let err = plan(vec![scenes]).validate().unwrap_err();
        assert!(matches!(err, ExecutorError::IntraGroupDependency { .. }));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut scenes = TaskGroup::new("scenes", ["outline"]);
        scenes
            .tasks
            .push(AgentTask::new("scene-16x9", "Scene", TaskKind::Scene));

        let err = plan(vec![scenes]).validate().unwrap_err();
        assert!(matches!(err, ExecutorError::DependencyNotFound { .. }));
    }

    #[test]
    fn test_task_graph_expands_group_references() {
        let mut scenes = TaskGroup::new("scenes", ["script"]);
        scenes
            .tasks
            .push(AgentTask::new("scene-16x9", "Scene", TaskKind::Scene));
        scenes
            .tasks
            .push(AgentTask::new("scene-9x16", "Scene", TaskKind::Scene));
        let mut renders = TaskGroup::new("renders", ["scenes"]);
        renders
            .tasks
            .push(AgentTask::new("render-main-en", "Render", TaskKind::Render));

        let graph = plan(vec![scenes, renders]).task_graph().unwrap();
        assert_eq!(
            graph.edges["render-main-en"],
            vec!["scene-16x9".to_string(), "scene-9x16".to_string()]
        );
        assert_eq!(graph.edges["scene-16x9"], vec!["script".to_string()]);
    }
}
