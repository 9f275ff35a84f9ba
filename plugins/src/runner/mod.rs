pub mod dry_run;
pub mod video_tool;

use std::path::PathBuf;

use vidplan_core::api::{AgentTask, TaskContext, TaskKind};

pub use dry_run::DryRunRunner;
pub use video_tool::VideoToolRunner;

/// Where each task kind writes its artifact.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    pub projects_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new(projects_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn project_dir(&self, ctx: &TaskContext) -> PathBuf {
        self.projects_dir.join(&ctx.project_name)
    }

    pub fn artifact_path(&self, task: &AgentTask, ctx: &TaskContext) -> Option<PathBuf> {
        let work = self.project_dir(ctx).join("output");
        match task.kind {
            TaskKind::Script => Some(work.join("script.json")),
            TaskKind::Scene => {
                let ratio = task.aspect_ratio.as_deref().unwrap_or("16:9");
                Some(work.join(format!("scenes-{}.json", ratio.replace(':', "x"))))
            }
            TaskKind::Voiceover => {
                let lang = task.language.as_deref().unwrap_or("en");
                Some(work.join(format!("voiceover-{lang}")))
            }
            TaskKind::Render => {
                let id = task.output_id.as_deref().unwrap_or(&task.id);
                let lang = task.language.as_deref().unwrap_or("en");
                Some(
                    self.output_dir
                        .join(&ctx.project_name)
                        .join(&ctx.version)
                        .join(format!("{id}-{lang}.mp4")),
                )
            }
            TaskKind::Validate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TaskContext {
        TaskContext {
            project_name: "demo".into(),
            version: "v7".into(),
        }
    }

    #[test]
    fn test_render_artifact_is_versioned() {
        let layout = ArtifactLayout::new("/p", "/o");
        let mut task = AgentTask::new("render-main-es", "Render", TaskKind::Render);
        task.output_id = Some("main".into());
        task.language = Some("es".into());

        assert_eq!(
            layout.artifact_path(&task, &ctx()),
            Some(PathBuf::from("/o/demo/v7/main-es.mp4"))
        );
    }

    #[test]
    fn test_scene_artifact_uses_ratio_slug() {
        let layout = ArtifactLayout::new("/p", "/o");
        let mut task = AgentTask::new("scene-9x16", "Scene", TaskKind::Scene);
        task.aspect_ratio = Some("9:16".into());

        assert_eq!(
            layout.artifact_path(&task, &ctx()),
            Some(PathBuf::from("/p/demo/output/scenes-9x16.json"))
        );
    }
}
