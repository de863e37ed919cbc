mod commands;
mod config;
mod display;
mod error;
mod github;
mod mux;

use clap::{Parser, Subcommand};
use commands::{issue::IssueAction, label::LabelAction, stats::StatsAction};
use config::{Context, GlobalArgs};
use error::Result;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gh-tools",
    version,
    about = "Some tools for managing multiple repos of a GitHub organization"
)]
pub struct Cli {
    /// Log API calls and other diagnostics to stderr
    #[arg(long, global = true, overrides_with = "no_debug")]
    debug: bool,

    /// Disable debug logging
    #[arg(long, global = true, overrides_with = "debug")]
    no_debug: bool,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Which organization to operate on [default: napalm-automation]
    #[arg(long, global = true)]
    organization: Option<String>,

    /// GitHub token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repo to skip; repeat to skip several [default: napalm, napalm-salt,
    /// napalm-ansible, napalm-skeleton, iosxr-ez, tooling]
    #[arg(long, short = 'e', global = true)]
    exclude: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manipulate label NAME across repos
    Label {
        /// Label name
        name: String,
        #[command(subcommand)]
        action: LabelAction,
    },
    /// Manipulate issues
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Gather stats
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },
}

impl Cli {
    fn global_args(&self) -> GlobalArgs {
        GlobalArgs {
            json: self.json,
            organization: self.organization.clone(),
            token: self.token.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("gh_tools=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    let ctx = Context::resolve(cli.global_args(), config::load_config()?)?;

    match &cli.command {
        Commands::Label { name, action } => commands::label::run(&ctx, name, action).await,
        Commands::Issue { action } => commands::issue::run(&ctx, action).await,
        Commands::Stats { action } => commands::stats::run(&ctx, action).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug && !cli.no_debug);

    if let Err(e) = run(&cli).await {
        display::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
