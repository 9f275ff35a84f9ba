//! Project, planning and render commands.
use tracing::Instrument;
use uuid::Uuid;
use vidplan_core::api as core_api;
use vidplan_core::api::{
    duration_breakdown, CliError, ExecutionOpts, ExecutionPlan, NewProjectOptions, RenderFilter,
    RenderResult,
};

use super::cli::{FilterArgs, FormatArgs, NewArgs, OutputFormat, PlanArgs, RenderArgs, StageArgs};
use super::print_json;

pub fn handle_new(args: NewArgs, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    let cfg = ctx.cfg();
    if let Some(brand) = args.brand.as_deref() {
        if ctx.catalog().brand(brand).is_none() {
            tracing::warn!(brand, "brand not found in catalog");
        }
    }
    if let Some(style) = args.style.as_deref() {
        if ctx.catalog().style(style).is_none() {
            tracing::warn!(style, "style not found in catalog");
        }
    }

    let options = NewProjectOptions {
        platforms: args.platforms,
        languages: args.languages,
        brand: args.brand,
        style: args.style,
    };
    let project = core_api::create_project(&args.name, &options, ctx.catalog(), &cfg.defaults)?;
    let path = ctx.projects().create(&project)?;

    println!("Created project {} at {}", project.id, path.display());
    for output in &project.outputs {
        println!("  output {:<12} platform {}", output.id, output.platform);
    }
    println!("  languages: {}", project.languages.join(", "));
    Ok(0)
}

pub fn handle_plan(args: PlanArgs, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    let plan = build_render_plan(&args.project, &args.filter, ctx)?;
    match args.format {
        OutputFormat::Json => print_json(&plan)?,
        OutputFormat::Text => print_plan(&plan),
    }
    Ok(0)
}

pub async fn handle_render(
    args: RenderArgs,
    ctx: &core_api::AppContext,
    quiet: bool,
) -> Result<i32, CliError> {
    let plan = build_render_plan(&args.project, &args.filter, ctx)?;
    let ctx = with_dry_run(ctx, args.dry_run);
    let opts = execution_opts(&ctx, quiet).with_version(args.version);

    print_plan_header(&plan);

    let run_id = Uuid::new_v4();
    let result = async {
        let services = ctx.build_services().await?;
        let result = services.coordinator(opts).execute(&plan).await?;
        Ok::<_, CliError>(result)
    }
    .instrument(tracing::info_span!("render", %run_id, project = %args.project))
    .await?;
    print_result(&result);

    Ok(if result.success { 0 } else { 1 })
}

pub async fn handle_script(
    args: StageArgs,
    ctx: &core_api::AppContext,
    quiet: bool,
) -> Result<i32, CliError> {
    let project = ctx.projects().load(&args.project)?;
    let plan = ctx.planner().plan_script(&project.id);
    run_stage(plan, ctx, args.dry_run, quiet).await
}

pub async fn handle_scenes(
    args: StageArgs,
    ctx: &core_api::AppContext,
    quiet: bool,
) -> Result<i32, CliError> {
    let project = ctx.projects().load(&args.project)?;
    let planner = ctx.planner();
    let requests = project.output_requests();
    println!(
        "Required aspect ratios: {}",
        planner.required_aspect_ratios(&requests).join(", ")
    );
    let plan = planner.plan_scenes(&project.id, &requests);
    run_stage(plan, ctx, args.dry_run, quiet).await
}

pub fn handle_platforms(args: FormatArgs, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    match args.format {
        OutputFormat::Json => {
            let platforms: std::collections::BTreeMap<_, _> = ctx.catalog().platforms().collect();
            print_json(&platforms)?;
        }
        OutputFormat::Text => {
            for (name, platform) in ctx.catalog().platforms() {
                println!(
                    "{:<12} {:<6} chunking={}  {}",
                    name,
                    platform.aspect_ratio,
                    if platform.chunking_enabled() { "auto" } else { "none" },
                    platform.display_name
                );
            }
        }
    }
    Ok(0)
}

/// Script / scene runs: no outputs, nothing recorded in history.
async fn run_stage(
    plan: ExecutionPlan,
    ctx: &core_api::AppContext,
    dry_run: bool,
    quiet: bool,
) -> Result<i32, CliError> {
    let ctx = with_dry_run(ctx, dry_run);
    let services = ctx.build_services().await?;
    let coordinator = core_api::Coordinator::new(services.runner, execution_opts(&ctx, quiet));
    let result = coordinator.execute(&plan).await?;

    match &result.failed_stage {
        Some(stage) => {
            eprintln!("Stage {stage} failed");
            Ok(1)
        }
        None => {
            println!("Done ({} tasks, version {})", plan.tasks().count(), result.version);
            Ok(0)
        }
    }
}

fn build_render_plan(
    project_name: &str,
    filter: &FilterArgs,
    ctx: &core_api::AppContext,
) -> Result<ExecutionPlan, CliError> {
    let project = ctx.projects().load(project_name)?;
    let filter = RenderFilter {
        only: filter.only.clone(),
        lang: filter.lang.clone(),
    };
    let plan = ctx
        .planner()
        .plan_render(&project.id, &project.output_requests(), &filter);
    plan.validate()?;
    Ok(plan)
}

fn with_dry_run(ctx: &core_api::AppContext, dry_run: bool) -> core_api::AppContext {
    if !dry_run {
        return ctx.clone();
    }
    let mut cfg = ctx.cfg().clone();
    cfg.executor.dry_run = true;
    ctx.with_config(cfg)
}

fn execution_opts(ctx: &core_api::AppContext, quiet: bool) -> ExecutionOpts {
    let mut opts = ExecutionOpts::from_config(&ctx.cfg().executor);
    opts.progress_bar = opts.progress_bar && !quiet && atty::is(atty::Stream::Stderr);
    opts
}

fn print_plan_header(plan: &ExecutionPlan) {
    println!("Execution plan for {}:", plan.project_name());
    println!("  Total outputs: {}", plan.total_outputs());
    println!("  Foreground tasks: {}", plan.foreground_tasks().len());
    println!("  Background groups: {}", plan.background_groups().len());
}

fn print_plan(plan: &ExecutionPlan) {
    print_plan_header(plan);
    println!();
    println!("[FOREGROUND]");
    for task in plan.foreground_tasks() {
        println!("  {:<22} {}s", task.id, task.effective_duration());
    }
    for group in plan.background_groups() {
        println!(
            "[PARALLEL {}] after {}",
            group.id,
            group.run_after.join(", ")
        );
        for task in &group.tasks {
            println!(
                "  {:<22} {}s  <- {}",
                task.id,
                task.effective_duration(),
                task.dependencies.join(", ")
            );
        }
    }

    let breakdown = duration_breakdown(plan.foreground_tasks(), plan.background_groups());
    println!();
    println!("Estimated duration: {}s", plan.estimated_total_duration());
    println!("  foreground: {}s", breakdown.foreground);
    for (group, secs) in &breakdown.groups {
        println!("  {group}: {secs}s");
    }
}

fn print_result(result: &RenderResult) {
    if let Some(stage) = &result.failed_stage {
        eprintln!("Render failed at foreground stage: {stage}");
        return;
    }
    println!("Render {} complete:", result.version);
    for output in &result.outputs {
        if output.success {
            println!("  ✅ {} ({}, {}) -> {}", output.id, output.platform, output.language, output.path);
        } else {
            println!(
                "  ❌ {} ({}, {}): {}",
                output.id,
                output.platform,
                output.language,
                output.error.as_deref().unwrap_or("failed")
            );
        }
    }
    let failed = result.failed_outputs().count();
    if failed > 0 {
        println!("{failed} of {} outputs failed", result.outputs.len());
    }
}
