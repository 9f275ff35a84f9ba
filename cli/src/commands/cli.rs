use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "vidplan", version, about = "Plan and run multi-platform explainer video productions")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Load this config file instead of the default search path.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Hide progress bars.
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct NewArgs {
    pub name: String,

    /// Target platform; repeat for several. Defaults to youtube.
    #[arg(long = "platform", action = clap::ArgAction::Append)]
    pub platforms: Vec<String>,

    /// Narration language; repeat for several. Defaults to en.
    #[arg(long = "language", action = clap::ArgAction::Append)]
    pub languages: Vec<String>,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub style: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FilterArgs {
    /// Render only these output ids (comma separated). Overrides --lang.
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<String>>,

    /// Render only outputs in this language.
    #[arg(long)]
    pub lang: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RenderArgs {
    pub project: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Version tag for the produced outputs (default: v<unix-millis>).
    #[arg(long)]
    pub version: Option<String>,

    /// Simulate every task instead of invoking the video tool.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    pub project: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct StageArgs {
    pub project: String,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FeedbackArgs {
    pub project: String,

    /// Free-text feedback, e.g. "make it slower".
    pub text: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LearnArgs {
    /// Standing instruction applied to future productions.
    pub instruction: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FormatArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum MemoryCommands {
    /// Productions, feedback rounds, top techniques and recent learnings.
    Summary(FormatArgs),
    /// Recurring preferences detected from feedback.
    Preferences(FormatArgs),
    /// Drop learnings and preferences mentioning ITEM.
    Forget { item: String },
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project definition.
    New(NewArgs),
    /// Run the full pipeline: script, scenes, voiceovers, renders.
    Render(RenderArgs),
    /// Show the execution plan without running it.
    Plan(PlanArgs),
    /// Generate the script only.
    Script(StageArgs),
    /// Generate the script and scenes for every required aspect ratio.
    Scenes(StageArgs),
    /// Record feedback on the latest production.
    Feedback(FeedbackArgs),
    /// Store a standing learning instruction.
    Learn(LearnArgs),
    #[command(subcommand)]
    Memory(MemoryCommands),
    /// List known platforms.
    Platforms(FormatArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_filters_parse() {
        let args = Args::try_parse_from([
            "vidplan", "render", "demo", "--only", "main,tiktok", "--lang", "es", "--version", "v3",
        ])
        .unwrap();
        let Commands::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(
            render.filter.only,
            Some(vec!["main".to_string(), "tiktok".to_string()])
        );
        assert_eq!(render.filter.lang.as_deref(), Some("es"));
        assert_eq!(render.version.as_deref(), Some("v3"));
        assert!(!render.dry_run);
    }

    #[test]
    fn test_new_collects_repeated_flags() {
        let args = Args::try_parse_from([
            "vidplan",
            "new",
            "intro",
            "--platform",
            "youtube",
            "--platform",
            "tiktok",
            "--language",
            "fr",
        ])
        .unwrap();
        let Commands::New(new) = args.command else {
            panic!("expected new");
        };
        assert_eq!(new.platforms, vec!["youtube", "tiktok"]);
        assert_eq!(new.languages, vec!["fr"]);
    }

    #[test]
    fn test_memory_forget() {
        let args = Args::try_parse_from(["vidplan", "memory", "forget", "dark"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Memory(MemoryCommands::Forget { ref item }) if item == "dark"
        ));
    }
}
