//! Index maintenance passes.
//!
//! The incremental pass reuses the stored index and re-extracts only notes
//! whose change timestamp moved. The rebuild pass ignores any stored index
//! and re-extracts every note in the directory. [`Indexer::update`] runs the
//! incremental pass and falls back to a rebuild whenever it fails.

use crate::error::{IndexError, IndexResult};
use crate::extractor::NoteReader;
use crate::scanner::{self, Staleness};
use serde::Serialize;
use std::path::PathBuf;
use storage::{Index, IndexStore, StoreError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Incremental,
    Rebuild,
    Scan,
}

/// Result of a completed pass, held in memory until it is saved.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub index: Index,
    /// Notes whose entry was (re-)extracted during the pass.
    pub extracted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub mode: PassKind,
    pub notes: usize,
    pub extracted: usize,
    pub written: bool,
}

impl RunSummary {
    fn new(mode: PassKind, outcome: &PassOutcome, written: bool) -> Self {
        Self {
            mode,
            notes: outcome.index.len(),
            extracted: outcome.extracted,
            written,
        }
    }
}

pub struct Indexer<S, R> {
    notes_dir: PathBuf,
    store: S,
    reader: R,
}

impl<S: IndexStore, R: NoteReader> Indexer<S, R> {
    pub fn new(notes_dir: impl Into<PathBuf>, store: S, reader: R) -> Self {
        Self {
            notes_dir: notes_dir.into(),
            store,
            reader,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Incremental pass with rebuild fallback.
    ///
    /// Saves only if the incremental pass changed at least one entry. Any
    /// failure there, including an unreadable stored index, discards the
    /// pass and runs [`Indexer::rebuild`]; a rebuild failure is returned.
    pub async fn update(&self) -> IndexResult<RunSummary> {
        let outcome = match self.incremental_pass().await {
            Ok(outcome) => outcome,
            Err(IndexError::Store(StoreError::Unreadable { path, reason })) => {
                info!(path = %path.display(), %reason, "no usable index, rebuilding");
                return self.rebuild().await;
            }
            Err(err) => {
                warn!(error = %err, "incremental pass failed, rebuilding index");
                return self.rebuild().await;
            }
        };

        let written = outcome.extracted > 0;
        if written {
            if let Err(err) = self.store.save(&outcome.index).await {
                warn!(error = %err, "saving updated index failed, rebuilding index");
                return self.rebuild().await;
            }
        }
        info!(
            notes = outcome.index.len(),
            extracted = outcome.extracted,
            written,
            "incremental update complete"
        );
        Ok(RunSummary::new(PassKind::Incremental, &outcome, written))
    }

    /// Rebuild pass followed by an unconditional save.
    pub async fn rebuild(&self) -> IndexResult<RunSummary> {
        let outcome = self.rebuild_pass().await?;
        self.store.save(&outcome.index).await?;
        info!(notes = outcome.index.len(), "index rebuilt");
        Ok(RunSummary::new(PassKind::Rebuild, &outcome, true))
    }

    /// Extracts every note without loading or saving anything.
    pub async fn scan(&self) -> IndexResult<(Index, RunSummary)> {
        let outcome = self.rebuild_pass().await?;
        let summary = RunSummary::new(PassKind::Scan, &outcome, false);
        info!(notes = outcome.index.len(), "scan complete");
        Ok((outcome.index, summary))
    }

    /// Re-extracts stale entries of the stored index.
    ///
    /// Only basenames already in the stored index are visited; notes added
    /// or removed since are picked up by the next rebuild. The first error
    /// aborts the pass and nothing is returned for saving.
    pub async fn incremental_pass(&self) -> IndexResult<PassOutcome> {
        let mut index = self.store.load().await?;
        info!(entries = index.len(), "starting incremental pass");

        let mut extracted = 0;
        for (basename, entry) in index.iter_mut() {
            let path = scanner::note_path(&self.notes_dir, basename)?;
            let current = scanner::stat_note(&path).await?;
            match scanner::check(&current, Some(&entry.updated)) {
                Staleness::Unchanged => debug!(note = %basename, "unchanged"),
                Staleness::Changed => {
                    debug!(note = %basename, stored = %entry.updated, %current, "changed");
                    *entry = self.reader.read_note(&path).await?;
                    extracted += 1;
                }
            }
        }

        Ok(PassOutcome { index, extracted })
    }

    /// Builds a fresh index from every entry in the notes directory.
    ///
    /// Every note must extract successfully; there is no partial result.
    pub async fn rebuild_pass(&self) -> IndexResult<PassOutcome> {
        let basenames = scanner::list_notes(&self.notes_dir).await?;
        info!(notes = basenames.len(), dir = %self.notes_dir.display(), "starting rebuild pass");

        let mut index = Index::new();
        for basename in basenames {
            let path = scanner::note_path(&self.notes_dir, &basename)?;
            scanner::stat_note(&path).await?;
            let entry = self.reader.read_note(&path).await?;
            index.insert(basename, entry);
        }

        let extracted = index.len();
        Ok(PassOutcome { index, extracted })
    }
}
