use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod console;
mod context;

use commands::{auth, generate, history, settings, theme};
use context::AppContext;

const DEFAULT_FILTER: &str =
    "copycoder=info,copycoder_core=info,copycoder_application=info,copycoder_infrastructure=info";

#[derive(Parser)]
#[command(name = "copycoder")]
#[command(about = "CopyCoder CLI - turn UI mockups into implementation specifications", long_about = None)]
struct Cli {
    /// Directory holding config.toml and stored state (env: COPYCODER_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an implementation specification from mockup images
    Generate(generate::GenerateArgs),
    /// Show or change generation settings
    Settings(settings::SettingsArgs),
    /// Show or change the colour theme
    Theme {
        #[command(subcommand)]
        action: Option<theme::ThemeAction>,
    },
    /// Show or clear generated prompts
    History {
        #[command(subcommand)]
        action: Option<history::HistoryAction>,
    },
    /// Log in
    Login {
        #[command(subcommand)]
        method: auth::LoginMethodCommand,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(DEFAULT_FILTER.replace("=info", "=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = AppContext::bootstrap(cli.config_dir).await?;

    match cli.command {
        Commands::Generate(args) => generate::run(&ctx, args).await?,
        Commands::Settings(args) => settings::run(&ctx, args).await?,
        Commands::Theme { action } => theme::run(&ctx, action).await?,
        Commands::History { action } => history::run(&ctx, action).await?,
        Commands::Login { method } => auth::login(&ctx, method).await?,
        Commands::Logout => auth::logout(&ctx).await?,
        Commands::Whoami => auth::whoami(&ctx).await?,
    }

    Ok(())
}
