mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "peak")]
#[command(about = "Storefront checkout runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every task until it checks out or fails
    Run {
        /// Task CSV file (defaults to `PEAK_TASKS_PATH`)
        #[arg(long)]
        tasks: Option<PathBuf>,
        /// Site table YAML file (defaults to `PEAK_SITES_PATH`)
        #[arg(long)]
        sites: Option<PathBuf>,
        /// Tasks polling at once; 0 runs all tasks together
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// Validate tasks and sites and resolve provinces without buying
    Check {
        #[arg(long)]
        tasks: Option<PathBuf>,
        #[arg(long)]
        sites: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = peak_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run {
            tasks,
            sites,
            max_concurrent,
        } => {
            let paths = run::InputPaths::resolve(&config, tasks, sites);
            run::run_tasks(&config, &paths, max_concurrent).await
        }
        Commands::Check { tasks, sites } => {
            let paths = run::InputPaths::resolve(&config, tasks, sites);
            run::check_tasks(&config, &paths).await
        }
    }
}
