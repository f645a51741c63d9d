//! CLI argument parsing

use crate::commands::{self, ContextArgs, CountArgs, ListArgs, ShowArgs};
use crate::output::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// entaudit - read the change history of audited entities
#[derive(Parser, Debug)]
#[command(name = "entaudit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Database URL (sqlite://... or postgres://...)
    #[arg(long, env = "ENTAUDIT_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Entity mapping file
    #[arg(
        long,
        env = "ENTAUDIT_MAPPING",
        default_value = "entaudit.toml",
        global = true
    )]
    pub mapping: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List auditable entity types and their audit tables
    Entities,

    /// Show one page of an entity's audit history
    List(ListArgs),

    /// Count audit entries of an entity
    Count(CountArgs),

    /// Show one audit entry by its row id
    Show(ShowArgs),

    /// Show entries sharing a context tag
    Context(ContextArgs),
}

impl Cli {
    /// Requested log verbosity
    pub fn verbosity(&self) -> u8 {
        self.global.verbose
    }

    /// Execute the CLI command
    pub async fn execute(self) -> anyhow::Result<()> {
        let reader = commands::open_reader(&self.global).await?;
        let format = self.global.format;
        match self.command {
            Commands::Entities => commands::entities(&reader, format),
            Commands::List(args) => commands::list(&reader, args, format).await,
            Commands::Count(args) => commands::count(&reader, args, format).await,
            Commands::Show(args) => commands::show(&reader, args, format).await,
            Commands::Context(args) => commands::context(&reader, args, format).await,
        }
    }
}
