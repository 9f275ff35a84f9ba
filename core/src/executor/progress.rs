use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Terminal progress for one plan execution.
///
/// One overall bar counts finished tasks; each running task gets a spinner.
/// A disabled monitor is a no-op so the coordinator can call it unconditionally.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    task_bars: HashMap<String, ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                task_bars: HashMap::new(),
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );
        overall.set_message("planning");

        Self {
            multi,
            overall,
            task_bars: HashMap::new(),
            enabled: true,
        }
    }

    pub fn start_task(&mut self, task_id: &str) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.set_message(task_id.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        self.task_bars.insert(task_id.to_string(), bar);
    }

    pub fn finish_task(&mut self, task_id: &str, success: bool, duration_ms: u64) {
        if !self.enabled {
            return;
        }

        if let Some(bar) = self.task_bars.remove(task_id) {
            let icon = if success { "✅" } else { "❌" };
            bar.finish_with_message(format!("{icon} {task_id} ({duration_ms}ms)"));
        }
        self.overall.inc(1);
    }

    /// Show which phase is running: `foreground` or a group id.
    pub fn set_phase(&self, phase: &str) {
        if self.enabled {
            self.overall.set_message(phase.to_string());
        }
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }
        let msg = if success {
            "✅ render complete"
        } else {
            "❌ render failed"
        };
        self.overall.finish_with_message(msg);
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_is_noop() {
        let mut monitor = ProgressMonitor::new(3, false);
        monitor.set_phase("foreground");
        monitor.start_task("script");
        monitor.finish_task("script", true, 12);
        monitor.finish(true);
        assert!(monitor.task_bars.is_empty());
    }

    #[test]
    fn test_finished_tasks_release_spinners() {
        let mut monitor = ProgressMonitor::new(2, true);
        monitor.start_task("scene-16x9");
        monitor.start_task("voiceover-en");
        monitor.finish_task("scene-16x9", true, 5);
        assert_eq!(monitor.task_bars.len(), 1);
        monitor.finish_task("voiceover-en", false, 7);
        assert!(monitor.task_bars.is_empty());
        monitor.finish(false);
    }
}
