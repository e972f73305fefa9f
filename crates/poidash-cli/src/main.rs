mod export;
mod extract;
mod review;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "poidash-cli")]
#[command(about = "POI review dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and print the POI list from the store
    List,
    /// Print the review table and the map viewport it implies
    Table {
        /// Column to sort by
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Select a POI by id (marks its row and focuses the map on it)
        #[arg(long)]
        select: Option<String>,
    },
    /// Approve a POI
    Approve { id: String },
    /// Reject a POI
    Reject { id: String },
    /// Export the current POI list to a file
    Export {
        #[arg(long, value_enum)]
        format: FormatArg,
        /// Target directory (defaults to `POIDASH_EXPORT_DIR`)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Upload a photo to the store for POI extraction
    Upload {
        /// Image file to upload
        path: PathBuf,
        /// Latitude the photo was taken at
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        /// Longitude the photo was taken at
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },
    /// Extract POI candidates from an image with a vision model
    Extract {
        /// Absolute URL of the image
        url: String,
        #[arg(long, value_enum, default_value = "openai")]
        provider: ProviderArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Name,
    Address,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xlsx,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    Openai,
    Gemini,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = poidash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List => review::run_list(&config).await,
        Commands::Table { sort, desc, select } => {
            review::run_table(&config, sort, desc, select.as_deref()).await
        }
        Commands::Approve { id } => {
            review::run_review(&config, &id, poidash_store::ReviewAction::Approve).await
        }
        Commands::Reject { id } => {
            review::run_review(&config, &id, poidash_store::ReviewAction::Reject).await
        }
        Commands::Export { format, out_dir } => {
            export::run_export(&config, format, out_dir.as_deref()).await
        }
        Commands::Upload { path, lat, lon } => {
            review::run_upload(&config, &path, &lat, &lon).await
        }
        Commands::Extract { url, provider } => extract::run_extract(&config, &url, provider).await,
    }
}
