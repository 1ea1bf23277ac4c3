use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::output;
use notes_index_core::config;
use notes_index_core::config::AppConfig;
use notes_index_core::pipeline::{self, PipelineMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Update { json: false }) {
        Commands::Update { json } => run_pipeline(&cfg, PipelineMode::Update, json).await,
        Commands::Rebuild { json } => run_pipeline(&cfg, PipelineMode::Rebuild, json).await,
        Commands::Scan { json } => run_pipeline(&cfg, PipelineMode::Scan, json).await,
    }
}

#[derive(Parser)]
#[command(name = "notes-index")]
#[command(about = "Maintain the frontmatter index of a notes directory", long_about = None)]
struct Cli {
    /// Path to config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Defaults to `update`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh changed entries, rebuilding the index if that fails
    Update {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Rebuild the index from every note, ignoring the stored one
    Rebuild {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Extract every note without reading or writing the index
    Scan {
        /// Print the extracted index as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn run_pipeline(cfg: &AppConfig, mode: PipelineMode, json: bool) -> Result<()> {
    let out = pipeline::run_with_mode(cfg, mode).await?;
    tracing::info!(
        mode = output::mode_label(out.summary.mode),
        notes = out.summary.notes,
        extracted = out.summary.extracted,
        written = out.summary.written,
        "run complete"
    );
    match (&out.index, json) {
        (Some(index), true) => println!("{}", output::render_index(index)?),
        _ => println!("{}", output::render_summary(&out.summary, json)?),
    }
    Ok(())
}
