use std::collections::HashSet;

use crate::catalog::{PlatformResolver, DEFAULT_ASPECT_RATIO};

use super::estimate::estimate_total_duration;
use super::types::{AgentTask, ExecutionPlan, OutputRequest, RenderFilter, TaskGroup, TaskKind};

pub const SCRIPT_TASK_ID: &str = "script";
pub const SCENES_GROUP_ID: &str = "scenes";
pub const VOICEOVERS_GROUP_ID: &str = "voiceovers";
pub const RENDERS_GROUP_ID: &str = "renders";

pub const SCRIPT_DURATION_SECS: u64 = 120;
pub const SCENE_DURATION_SECS: u64 = 180;
pub const VOICEOVER_DURATION_SECS: u64 = 60;
pub const RENDER_DURATION_SECS: u64 = 300;

/// Keep the outputs a render request asked for.
///
/// `only` is evaluated first and exclusively; `lang` applies only when `only`
/// is absent. An empty result is valid.
pub fn filter_outputs(outputs: &[OutputRequest], filter: &RenderFilter) -> Vec<OutputRequest> {
    if let Some(only) = &filter.only {
        return outputs
            .iter()
            .filter(|o| only.iter().any(|id| id == &o.id))
            .cloned()
            .collect();
    }

    if let Some(lang) = &filter.lang {
        return outputs
            .iter()
            .filter(|o| o.language_or_default() == lang)
            .cloned()
            .collect();
    }

    outputs.to_vec()
}

pub fn scene_task_id(aspect_ratio: &str) -> String {
    format!("scene-{}", aspect_ratio.replace(':', "x"))
}

pub fn voiceover_task_id(language: &str) -> String {
    format!("voiceover-{language}")
}

pub fn render_task_id(output_id: &str, language: &str) -> String {
    format!("render-{output_id}-{language}")
}

/// Builds execution plans from requested outputs.
pub struct TaskPlanner<'a> {
    resolver: &'a dyn PlatformResolver,
}

impl<'a> TaskPlanner<'a> {
    pub fn new(resolver: &'a dyn PlatformResolver) -> Self {
        Self { resolver }
    }

    /// Aspect ratio for a platform; unknown platforms fall back to 16:9.
    pub fn aspect_ratio_for(&self, platform: &str) -> String {
        match self.resolver.resolve_platform(platform) {
            Some(info) => info.aspect_ratio,
            None => {
                tracing::debug!(platform = %platform, "unknown platform, using default aspect ratio");
                DEFAULT_ASPECT_RATIO.to_string()
            }
        }
    }

    /// Distinct aspect ratios in first-seen order.
    pub fn required_aspect_ratios(&self, outputs: &[OutputRequest]) -> Vec<String> {
        ordered_distinct(outputs.iter().map(|o| self.aspect_ratio_for(&o.platform)))
    }

    /// Distinct languages in first-seen order.
    pub fn required_languages(&self, outputs: &[OutputRequest]) -> Vec<String> {
        ordered_distinct(outputs.iter().map(|o| o.language_or_default().to_string()))
    }

    /// Full render plan: script, then scenes and voiceovers, then renders.
    #[tracing::instrument(name = "planner.plan_render", skip(self, outputs, filter))]
    pub fn plan_render(
        &self,
        project_name: &str,
        outputs: &[OutputRequest],
        filter: &RenderFilter,
    ) -> ExecutionPlan {
        let outputs = filter_outputs(outputs, filter);

        let foreground = vec![script_task()];
        let scenes = self.scene_group(&outputs);
        let voiceovers = self.voiceover_group(&outputs);

        let mut renders = TaskGroup::new(RENDERS_GROUP_ID, [SCENES_GROUP_ID, VOICEOVERS_GROUP_ID]);
        for output in &outputs {
            let aspect_ratio = self.aspect_ratio_for(&output.platform);
            let language = output.language_or_default();

            let mut task = AgentTask::new(
                render_task_id(&output.id, language),
                format!("Render {} ({})", output.platform, language),
                TaskKind::Render,
            )
            .depends_on([scene_task_id(&aspect_ratio), voiceover_task_id(language)])
            .with_duration(RENDER_DURATION_SECS);
            task.platform = Some(output.platform.clone());
            task.language = Some(language.to_string());
            task.aspect_ratio = Some(aspect_ratio);
            task.output_id = Some(output.id.clone());
            renders.tasks.push(task);
        }

        let groups = vec![scenes, voiceovers, renders];
        let plan = self.finish(project_name, outputs.len(), foreground, groups);
        tracing::debug!(
            outputs = plan.total_outputs(),
            groups = plan.background_groups().len(),
            estimated_secs = plan.estimated_total_duration(),
            "render plan built"
        );
        plan
    }

    /// Script generation only.
    pub fn plan_script(&self, project_name: &str) -> ExecutionPlan {
        self.finish(project_name, 0, vec![script_task()], Vec::new())
    }

    /// Script plus one scene task per required aspect ratio.
    pub fn plan_scenes(&self, project_name: &str, outputs: &[OutputRequest]) -> ExecutionPlan {
        let scenes = self.scene_group(outputs);
        self.finish(project_name, 0, vec![script_task()], vec![scenes])
    }

    fn scene_group(&self, outputs: &[OutputRequest]) -> TaskGroup {
        let mut group = TaskGroup::new(SCENES_GROUP_ID, [SCRIPT_TASK_ID]);
        for aspect_ratio in self.required_aspect_ratios(outputs) {
            let mut task = AgentTask::new(
                scene_task_id(&aspect_ratio),
                format!("Scene Generation ({aspect_ratio})"),
                TaskKind::Scene,
            )
            .depends_on([SCRIPT_TASK_ID])
            .with_duration(SCENE_DURATION_SECS);
            task.aspect_ratio = Some(aspect_ratio);
            group.tasks.push(task);
        }
        group
    }

    fn voiceover_group(&self, outputs: &[OutputRequest]) -> TaskGroup {
        let mut group = TaskGroup::new(VOICEOVERS_GROUP_ID, [SCRIPT_TASK_ID]);
        for language in self.required_languages(outputs) {
            let mut task = AgentTask::new(
                voiceover_task_id(&language),
                format!("Voiceover ({language})"),
                TaskKind::Voiceover,
            )
            .depends_on([SCRIPT_TASK_ID])
            .with_duration(VOICEOVER_DURATION_SECS);
            task.language = Some(language);
            group.tasks.push(task);
        }
        group
    }

    fn finish(
        &self,
        project_name: &str,
        total_outputs: usize,
        foreground: Vec<AgentTask>,
        groups: Vec<TaskGroup>,
    ) -> ExecutionPlan {
        let estimate = estimate_total_duration(&foreground, &groups);
        ExecutionPlan::new(
            project_name.to_string(),
            total_outputs,
            foreground,
            groups,
            estimate,
        )
    }
}

fn script_task() -> AgentTask {
    AgentTask::new(SCRIPT_TASK_ID, "Script Generation", TaskKind::Script)
        .with_duration(SCRIPT_DURATION_SECS)
}

/// Drops repeats, keeping first-seen order.
pub(crate) fn ordered_distinct(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
