use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vidplan_cli::commands::cli::{self, Commands, MemoryCommands};
use vidplan_cli::commands::{memory, production};
use vidplan_core::api::{AppContext, CliError, LoggingConfig};
use vidplan_plugins::PluginServicesFactory;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = match args.config.as_deref() {
        Some(path) => vidplan_core::config::load_from_path(Path::new(path))?,
        None => vidplan_core::config::load_default()?,
    };
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(PluginServicesFactory)));
    dispatch(args.command, &ctx, args.quiet).await
}

// 0: success
// 1: foreground stage failed
// 11: config error
// 20: io / project files
// 30: invalid plan
// 50: internal/uncategorized
async fn dispatch(cmd: Commands, ctx: &AppContext, quiet: bool) -> Result<i32, CliError> {
    match cmd {
        Commands::New(args) => production::handle_new(args, ctx),
        Commands::Render(args) => production::handle_render(args, ctx, quiet).await,
        Commands::Plan(args) => production::handle_plan(args, ctx),
        Commands::Script(args) => production::handle_script(args, ctx, quiet).await,
        Commands::Scenes(args) => production::handle_scenes(args, ctx, quiet).await,
        Commands::Feedback(args) => memory::handle_feedback(args, ctx).await,
        Commands::Learn(args) => memory::handle_learn(args, ctx).await,
        Commands::Memory(sub) => match sub {
            MemoryCommands::Summary(args) => memory::handle_summary(args, ctx).await,
            MemoryCommands::Preferences(args) => memory::handle_preferences(args, ctx).await,
            MemoryCommands::Forget { item } => memory::handle_forget(item, ctx).await,
        },
        Commands::Platforms(args) => production::handle_platforms(args, ctx),
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("vidplan"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let appender = tracing_appender::rolling::daily(dir, "vidplan.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
