//! Learning-memory commands.
use std::sync::Arc;

use serde_json::json;
use vidplan_core::api as core_api;
use vidplan_core::api::{CliError, HistoryStore};

use super::cli::{FeedbackArgs, FormatArgs, LearnArgs, OutputFormat};
use super::print_json;

async fn history(ctx: &core_api::AppContext) -> Result<Arc<dyn HistoryStore>, CliError> {
    let services = ctx.build_services().await?;
    services
        .history
        .ok_or_else(|| CliError::Command("memory is disabled in config".to_string()))
}

pub async fn handle_feedback(args: FeedbackArgs, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    if !ctx.projects().exists(&args.project) {
        return Err(core_api::ProjectError::NotFound(args.project).into());
    }
    let store = history(ctx).await?;
    let tags = store.record_feedback(&args.project, &args.text).await?;

    if tags.is_empty() {
        println!("Feedback recorded for {} (no preferences detected)", args.project);
    } else {
        let names: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
        println!("Feedback recorded for {}: {}", args.project, names.join(", "));
    }
    Ok(0)
}

pub async fn handle_learn(args: LearnArgs, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    let instruction = args.instruction.trim();
    if instruction.is_empty() {
        return Err(CliError::Command("learning instruction is empty".to_string()));
    }
    history(ctx).await?.add_learning(instruction).await?;
    println!("Learned: {instruction}");
    Ok(0)
}

pub async fn handle_summary(args: FormatArgs, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    let summary = history(ctx).await?.summary().await?;

    match args.format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => {
            println!("Productions: {}", summary.total_productions);
            println!("Feedback rounds: {}", summary.total_feedback_rounds);
            if !summary.top_techniques.is_empty() {
                println!("Top techniques:");
                for (technique, rate) in &summary.top_techniques {
                    println!("  {technique:<24} {:.0}%", rate * 100.0);
                }
            }
            if !summary.user_preferences.is_empty() {
                println!("Preferences: {}", summary.user_preferences.join(", "));
            }
            if !summary.recent_learnings.is_empty() {
                println!("Recent learnings:");
                for learning in &summary.recent_learnings {
                    println!("  - {learning}");
                }
            }
        }
    }
    Ok(0)
}

pub async fn handle_preferences(
    args: FormatArgs,
    ctx: &core_api::AppContext,
) -> Result<i32, CliError> {
    let patterns = history(ctx).await?.patterns().await?;

    match args.format {
        OutputFormat::Json => print_json(&json!({
            "user_preferences": patterns.user_preferences,
            "common_failures": patterns.common_failures,
        }))?,
        OutputFormat::Text => {
            if patterns.user_preferences.is_empty() {
                println!("No recurring preferences yet");
            }
            for pref in &patterns.user_preferences {
                println!("{pref}");
            }
        }
    }
    Ok(0)
}

pub async fn handle_forget(item: String, ctx: &core_api::AppContext) -> Result<i32, CliError> {
    history(ctx).await?.forget(&item).await?;
    println!("Forgot entries mentioning {item:?}");
    Ok(0)
}
