use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use vidplan_core::api::{AgentTask, TaskContext, TaskOutcome, TaskRunnerPlugin};

use super::ArtifactLayout;

/// Lines of stderr kept in a failed outcome.
const STDERR_TAIL_LINES: usize = 20;

/// Runs the external video production tool once per task:
///
/// ```text
/// <tool> [args..] <kind> --project <name> --task-id <id> --version <v>
///        [--platform p] [--language l] [--aspect-ratio r] [--output path]
/// ```
pub struct VideoToolRunner {
    program: String,
    base_args: Vec<String>,
    layout: ArtifactLayout,
}

impl VideoToolRunner {
    pub fn new(program: &str, base_args: Vec<String>, layout: ArtifactLayout) -> Self {
        Self {
            program: shellexpand::tilde(program).to_string(),
            base_args,
            layout,
        }
    }

    pub fn command_args(&self, task: &AgentTask, ctx: &TaskContext) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push(task.kind.as_str().to_string());
        args.extend([
            "--project".to_string(),
            ctx.project_name.clone(),
            "--task-id".to_string(),
            task.id.clone(),
            "--version".to_string(),
            ctx.version.clone(),
        ]);

        let optional = [
            ("--platform", task.platform.as_ref()),
            ("--language", task.language.as_ref()),
            ("--aspect-ratio", task.aspect_ratio.as_ref()),
        ];
        for (flag, value) in optional {
            if let Some(v) = value {
                args.push(flag.to_string());
                args.push(v.clone());
            }
        }

        if let Some(path) = self.layout.artifact_path(task, ctx) {
            args.push("--output".to_string());
            args.push(path.to_string_lossy().to_string());
        }
        args
    }
}

#[async_trait]
impl TaskRunnerPlugin for VideoToolRunner {
    fn name(&self) -> &str {
        "video-tool"
    }

    async fn execute(&self, task: &AgentTask, ctx: &TaskContext) -> Result<TaskOutcome> {
        let args = self.command_args(task, ctx);
        let artifact = self.layout.artifact_path(task, ctx);

        if let Some(parent) = artifact.as_deref().and_then(|p| p.parent()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let project_dir = self.layout.project_dir(ctx);
        if project_dir.is_dir() {
            cmd.current_dir(&project_dir);
        }

        tracing::debug!(
            target: "vidplan.runner",
            program = %self.program,
            args = ?args,
            "spawning video tool"
        );

        let output = cmd
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.program))?;

        if output.status.success() {
            return Ok(TaskOutcome::succeeded(artifact.map(path_string)));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail = tail_lines(&stderr, STDERR_TAIL_LINES);
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let error = if tail.is_empty() {
            format!("{} exited with {code}", self.program)
        } else {
            format!("{} exited with {code}: {tail}", self.program)
        };
        Ok(TaskOutcome::failed(error))
    }
}

fn path_string(p: PathBuf) -> String {
    p.to_string_lossy().to_string()
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vidplan_core::api::TaskKind;

    fn ctx() -> TaskContext {
        TaskContext {
            project_name: "demo".into(),
            version: "v1".into(),
        }
    }

    #[test]
    fn test_render_command_line() {
        let runner = VideoToolRunner::new(
            "explain",
            vec!["--quiet".into()],
            ArtifactLayout::new("/p", "/o"),
        );
        let mut task = AgentTask::new("render-main-en", "Render", TaskKind::Render);
        task.platform = Some("youtube".into());
        task.language = Some("en".into());
        task.aspect_ratio = Some("16:9".into());
        task.output_id = Some("main".into());

        assert_eq!(
            runner.command_args(&task, &ctx()),
            vec![
                "--quiet",
                "render",
                "--project",
                "demo",
                "--task-id",
                "render-main-en",
                "--version",
                "v1",
                "--platform",
                "youtube",
                "--language",
                "en",
                "--aspect-ratio",
                "16:9",
                "--output",
                "/o/demo/v1/main-en.mp4",
            ]
        );
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail_lines("a\n\nb\nc\n", 2), "b\nc");
        assert_eq!(tail_lines("", 3), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_maps_to_outcome() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = ArtifactLayout::new(dir.path().join("p"), dir.path().join("o"));
        let task = AgentTask::new("script", "Script", TaskKind::Script);

        let ok = VideoToolRunner::new("true", vec![], layout.clone());
        let outcome = ok.execute(&task, &ctx()).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.output_path.unwrap().ends_with("script.json"));

        let bad = VideoToolRunner::new("false", vec![], layout);
        let outcome = bad.execute(&task, &ctx()).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("exited with 1"));
    }
}
