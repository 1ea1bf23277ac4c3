use crate::config::AppConfig;
use crate::extractor::FrontmatterReader;
use crate::indexer::{Indexer, RunSummary};
use anyhow::Context;
use storage::{Index, JsonIndexStore};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Incremental pass, falling back to a rebuild.
    Update,
    /// Rebuild from scratch and save.
    Rebuild,
    /// Extract every note; nothing is loaded or saved.
    Scan,
}

pub struct PipelineOutput {
    pub summary: RunSummary,
    /// The in-memory index, only kept for [`PipelineMode::Scan`].
    pub index: Option<Index>,
}

pub fn build_indexer(config: &AppConfig) -> anyhow::Result<Indexer<JsonIndexStore, FrontmatterReader>> {
    let notes_dir = config.notes_dir().context("resolve notes directory")?;
    let index_path = config.index_path().context("resolve index path")?;
    info!(
        notes = %notes_dir.display(),
        index = %index_path.display(),
        "using notes directory"
    );
    Ok(Indexer::new(
        notes_dir,
        JsonIndexStore::new(index_path),
        FrontmatterReader::new(config.extraction.max_attempts),
    ))
}

pub async fn run_with_mode(config: &AppConfig, mode: PipelineMode) -> anyhow::Result<PipelineOutput> {
    let indexer = build_indexer(config)?;
    let output = match mode {
        PipelineMode::Update => PipelineOutput {
            summary: indexer.update().await.context("update index")?,
            index: None,
        },
        PipelineMode::Rebuild => PipelineOutput {
            summary: indexer.rebuild().await.context("rebuild index")?,
            index: None,
        },
        PipelineMode::Scan => {
            let (index, summary) = indexer.scan().await.context("scan notes")?;
            PipelineOutput {
                summary,
                index: Some(index),
            }
        }
    };
    Ok(output)
}
