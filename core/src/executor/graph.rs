use std::collections::{HashMap, HashSet};

use crate::error::ExecutorError;
use crate::executor::types::TaskLike;

/// Task dependency graph (DAG)
#[derive(Debug, Clone)]
pub struct TaskGraph<T: TaskLike> {
    /// Task nodes: task_id -> Task
    pub nodes: HashMap<String, T>,

    /// Dependency edges: task_id -> list of dependencies
    pub edges: HashMap<String, Vec<String>>,

    /// Original insertion order; traversal follows it
    insertion_order: Vec<String>,
}

impl<T: TaskLike> TaskGraph<T> {
    /// Construct task graph from task list
    pub fn from_tasks(tasks: &[T]) -> Result<Self, ExecutorError> {
        let mut nodes = HashMap::new();
        let mut edges = HashMap::new();
        let mut insertion_order = Vec::new();

        for task in tasks {
            if nodes.contains_key(task.id()) {
                return Err(ExecutorError::DuplicateTaskId(task.id().to_string()));
            }

            let task_id = task.id().to_string();
            let dependencies = task.dependencies().to_vec();

            nodes.insert(task_id.clone(), task.clone());
            edges.insert(task_id.clone(), dependencies);
            insertion_order.push(task_id);
        }

        Ok(Self {
            nodes,
            edges,
            insertion_order,
        })
    }

    /// Validate dependency relationships
    pub fn validate(&self) -> Result<(), ExecutorError> {
        for task_id in &self.insertion_order {
            for dep in self.edges.get(task_id).into_iter().flatten() {
                if !self.nodes.contains_key(dep) {
                    return Err(ExecutorError::DependencyNotFound {
                        task_id: task_id.clone(),
                        missing_dep: dep.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.detect_cycle() {
            return Err(ExecutorError::CircularDependency(cycle));
        }

        Ok(())
    }

    /// Detect circular dependencies using DFS
    fn detect_cycle(&self) -> Option<String> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for task_id in &self.insertion_order {
            if !visited.contains(task_id) && self.dfs_cycle(task_id, &mut visited, &mut stack) {
                return Some(format_cycle_path(&stack));
            }
        }

        None
    }

    fn dfs_cycle(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> bool {
        visited.insert(node.to_string());
        stack.push(node.to_string());

        if let Some(dependencies) = self.edges.get(node) {
            for dep in dependencies {
                if let Some(pos) = stack.iter().position(|x| x == dep) {
                    stack.push(dep.clone());
                    *stack = stack[pos..].to_vec();
                    return true;
                }

                if !visited.contains(dep) && self.dfs_cycle(dep, visited, stack) {
                    return true;
                }
            }
        }

        stack.pop();
        false
    }
}

fn format_cycle_path(stack: &[String]) -> String {
    stack.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::{AgentTask, TaskKind};

    fn task(id: &str, deps: &[&str]) -> AgentTask {
        AgentTask::new(id, id, TaskKind::Scene).depends_on(deps.iter().copied())
    }

    #[test]
    fn test_valid_plan_shape_passes() {
        let tasks = vec![
            task("script", &[]),
            task("scene-16x9", &["script"]),
            task("voiceover-en", &["script"]),
            task("render-main-en", &["scene-16x9", "voiceover-en"]),
        ];
        let graph = TaskGraph::from_tasks(&tasks).unwrap();
        graph.validate().unwrap();
        assert_eq!(
            graph.edges["render-main-en"],
            vec!["scene-16x9".to_string(), "voiceover-en".to_string()]
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let tasks = vec![task("script", &[]), task("script", &[])];
        let err = TaskGraph::from_tasks(&tasks).unwrap_err();
        assert!(matches!(err, ExecutorError::DuplicateTaskId(id) if id == "script"));
    }

    #[test]
    fn test_cycle_detected() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"])];
        let graph = TaskGraph::from_tasks(&tasks).unwrap();
        let err = graph.validate().unwrap_err();
        match err {
            ExecutorError::CircularDependency(path) => assert_eq!(path, "a -> b -> a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_dependency() {
        let tasks = vec![task("render", &["scene"])];
        let graph = TaskGraph::from_tasks(&tasks).unwrap();
        assert!(matches!(
            graph.validate(),
            Err(ExecutorError::DependencyNotFound { .. })
        ));
    }
}
