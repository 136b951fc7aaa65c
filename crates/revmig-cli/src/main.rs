use clap::{Parser, Subcommand};
use revmig_core::{parse_rating, WriteMode};
use tracing_subscriber::EnvFilter;

mod clients;
mod migrate;
mod resolve;

#[derive(Debug, Parser)]
#[command(name = "revmig")]
#[command(about = "Migrate accessibility reviews from Airtable into Firestore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Migrate every source row: resolve its place, re-host photos, write documents
    Migrate {
        /// Process only the first N source rows
        #[arg(long)]
        limit: Option<usize>,
        /// Resolve places and log what would be written, without writing
        #[arg(long)]
        dry_run: bool,
        /// Override REVMIG_WRITE_MODE (immediate or batched)
        #[arg(long, value_parser = parse_write_mode)]
        write_mode: Option<WriteMode>,
        /// Override REVMIG_DEFAULT_RATING for rows without a rating
        #[arg(long, value_parser = parse_rating)]
        default_rating: Option<f64>,
    },
    /// Look up a single place by name and address
    Resolve {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
}

fn parse_write_mode(raw: &str) -> Result<WriteMode, String> {
    WriteMode::parse(raw).ok_or_else(|| format!("expected 'immediate' or 'batched', got '{raw}'"))
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            limit,
            dry_run,
            write_mode,
            default_rating,
        } => {
            let args = migrate::MigrateArgs {
                limit,
                dry_run,
                write_mode,
                default_rating,
            };
            let config = revmig_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            migrate::run_migrate(&config, &args).await
        }
        Commands::Resolve { name, address } => {
            let config = revmig_core::load_places_config()?;
            init_tracing(&config.log_level)?;
            resolve::run_resolve(&config, &name, &address).await
        }
    }
}

#[cfg(test)]
mod tests;
