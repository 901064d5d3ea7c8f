mod db;
mod predict;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "trendcast")]
#[command(about = "Fashion trend scoring command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the trend pipeline and print the chosen table as JSON
    Predict {
        /// JSON array of posts; reads from the database when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Number of most recent posts to score
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long, value_enum, default_value_t = View::Rows)]
        view: View,
    },
    /// Print trend popularity over time as JSON
    Popularity {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Comma-separated trend names to keep
        #[arg(long)]
        trends: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    /// One row per post with predicted, forecasted and direction columns
    Rows,
    /// One row per trend with the overall direction
    Overview,
    /// Dashboard summary per trend
    Summary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = trendcast_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Predict { input, limit, view }) => {
            predict::run_predict(&config, input.as_deref(), limit, view).await?;
        }
        Some(Commands::Popularity {
            input,
            trends,
            limit,
        }) => {
            predict::run_popularity(&config, input.as_deref(), trends.as_deref(), limit).await?;
        }
        Some(Commands::Db { command }) => match command {
            DbCommands::Ping => db::run_db_ping(&config).await?,
            DbCommands::Migrate => db::run_db_migrate(&config).await?,
        },
        None => println!("trendcast: run `trendcast --help` for commands"),
    }

    Ok(())
}
