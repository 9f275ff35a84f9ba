use std::sync::Arc;

use tempfile::TempDir;
use vidplan_cli::commands::cli::{
    FeedbackArgs, FilterArgs, FormatArgs, LearnArgs, NewArgs, OutputFormat, PlanArgs, RenderArgs,
    StageArgs,
};
use vidplan_cli::commands::{memory, production};
use vidplan_core::api::{AppConfig, AppContext, CliError, ServicesFactory};
use vidplan_plugins::PluginServicesFactory;

fn context(dir: &TempDir) -> AppContext {
    let mut cfg = AppConfig::default();
    let root = dir.path();
    cfg.paths.data_dir = Some(root.to_string_lossy().to_string());
    cfg.paths.config_dir = root.join("catalog").to_string_lossy().to_string();
    cfg.paths.projects_dir = root.join("projects").to_string_lossy().to_string();
    cfg.paths.output_dir = root.join("output").to_string_lossy().to_string();
    cfg.executor.progress = false;
    AppContext::new(cfg, Some(Arc::new(PluginServicesFactory)))
}

fn new_project(ctx: &AppContext, name: &str) {
    let args = NewArgs {
        name: name.to_string(),
        platforms: vec!["youtube".into(), "tiktok".into()],
        languages: vec![],
        brand: None,
        style: None,
    };
    assert_eq!(production::handle_new(args, ctx).unwrap(), 0);
}

fn no_filter() -> FilterArgs {
    FilterArgs {
        only: None,
        lang: None,
    }
}

#[tokio::test]
async fn dry_run_render_records_a_production() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    new_project(&ctx, "intro");

    let code = production::handle_render(
        RenderArgs {
            project: "intro".into(),
            filter: no_filter(),
            version: Some("v1".into()),
            dry_run: true,
        },
        &ctx,
        true,
    )
    .await
    .unwrap();
    assert_eq!(code, 0);

    let services = PluginServicesFactory.build_services(ctx.cfg()).await.unwrap();
    let summary = services.history.unwrap().summary().await.unwrap();
    assert_eq!(summary.total_productions, 1);
}

#[tokio::test]
async fn plan_and_stages_for_existing_project() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    new_project(&ctx, "intro");

    let plan = PlanArgs {
        project: "intro".into(),
        filter: no_filter(),
        format: OutputFormat::Json,
    };
    assert_eq!(production::handle_plan(plan, &ctx).unwrap(), 0);

    let stage = || StageArgs {
        project: "intro".into(),
        dry_run: true,
    };
    assert_eq!(production::handle_script(stage(), &ctx, true).await.unwrap(), 0);
    assert_eq!(production::handle_scenes(stage(), &ctx, true).await.unwrap(), 0);
    assert_eq!(
        production::handle_platforms(FormatArgs { format: OutputFormat::Text }, &ctx).unwrap(),
        0
    );
}

#[tokio::test]
async fn missing_project_maps_to_io_exit_code() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    let err = production::handle_plan(
        PlanArgs {
            project: "ghost".into(),
            filter: no_filter(),
            format: OutputFormat::Text,
        },
        &ctx,
    )
    .unwrap_err();

    assert!(matches!(err, CliError::Project(_)));
    assert_eq!(err.exit_code(), 20);
}

#[tokio::test]
async fn feedback_and_learning_round_trip() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    new_project(&ctx, "intro");
    production::handle_render(
        RenderArgs {
            project: "intro".into(),
            filter: FilterArgs {
                only: Some(vec!["main".into()]),
                lang: None,
            },
            version: None,
            dry_run: true,
        },
        &ctx,
        true,
    )
    .await
    .unwrap();

    let code = memory::handle_feedback(
        FeedbackArgs {
            project: "intro".into(),
            text: "slow down and use less text".into(),
        },
        &ctx,
    )
    .await
    .unwrap();
    assert_eq!(code, 0);
    memory::handle_learn(
        LearnArgs {
            instruction: "open with a question".into(),
        },
        &ctx,
    )
    .await
    .unwrap();
    assert_eq!(
        memory::handle_summary(FormatArgs { format: OutputFormat::Json }, &ctx)
            .await
            .unwrap(),
        0
    );

    let services = PluginServicesFactory.build_services(ctx.cfg()).await.unwrap();
    let summary = services.history.unwrap().summary().await.unwrap();
    assert_eq!(summary.total_feedback_rounds, 1);
    assert_eq!(summary.recent_learnings, vec!["open with a question".to_string()]);
}
