use std::future::Future;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use super::types::AgentTask;

/// Execute every task of one group concurrently and wait for all of them.
///
/// # Arguments
///
/// * `tasks` - Tasks of the group (mutually independent)
/// * `max_concurrency` - Maximum number of tasks in flight; `None` launches all
/// * `executor_fn` - Async function executing a single task
///
/// # Returns
///
/// One `(task_id, output)` pair per task, in completion order. A failing task
/// never cancels its siblings; failures are part of `R`.
pub async fn execute_group_parallel<F, Fut, R>(
    tasks: &[AgentTask],
    max_concurrency: Option<usize>,
    executor_fn: F,
) -> Vec<(String, R)>
where
    F: Fn(AgentTask) -> Fut,
    Fut: Future<Output = R>,
{
    let limit = max_concurrency.unwrap_or(tasks.len()).max(1);
    let sem = Arc::new(Semaphore::new(limit));
    let mut futs = FuturesUnordered::new();

    for task in tasks {
        let sem = sem.clone();
        let task_id = task.id.clone();
        let fut = executor_fn(task.clone());

        futs.push(async move {
            // The semaphore is never closed, so acquiring only waits for a slot.
            let _permit = sem.acquire_owned().await.ok();
            (task_id, fut.await)
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(res) = futs.next().await {
        results.push(res);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::TaskKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn tasks(n: usize) -> Vec<AgentTask> {
        (0..n)
            .map(|i| AgentTask::new(format!("scene-{i}"), "scene", TaskKind::Scene))
            .collect()
    }

    #[tokio::test]
    async fn test_all_tasks_settle_even_when_some_fail() {
        let results = execute_group_parallel(&tasks(4), None, |task| async move {
            if task.id == "scene-1" {
                Err(format!("{} failed", task.id))
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results.iter().filter(|(_, r)| r.is_err()).count(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = execute_group_parallel(&tasks(6), Some(2), |_task| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(results.len(), 6);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unbounded_group_runs_tasks_together() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = execute_group_parallel(&tasks(3), None, |_task| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_group() {
        let results = execute_group_parallel(&[], None, |_task| async {}).await;
        assert!(results.is_empty());
    }
}
