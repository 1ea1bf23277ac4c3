//! Notes directory listing and timestamp based staleness checks.

use crate::error::{IndexError, IndexResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::Metadata as FileMetadata;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Unchanged,
    Changed,
}

/// Compares a note's current change timestamp with the one stored in the index.
pub fn check(current: &str, stored: Option<&str>) -> Staleness {
    match stored {
        Some(stored) if stored == current => Staleness::Unchanged,
        _ => Staleness::Changed,
    }
}

/// Canonical UTC ISO-8601 form of the file's status-change time, with
/// millisecond precision (`2024-01-02T03:04:05.678Z`).
pub fn change_timestamp(meta: &FileMetadata) -> String {
    change_time(meta).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(unix)]
fn change_time(meta: &FileMetadata) -> DateTime<Utc> {
    use std::os::unix::fs::MetadataExt;
    DateTime::<Utc>::from_timestamp(meta.ctime(), meta.ctime_nsec() as u32).unwrap_or_default()
}

// No status-change time off unix; the modification time is the closest signal.
#[cfg(not(unix))]
fn change_time(meta: &FileMetadata) -> DateTime<Utc> {
    meta.modified().map(DateTime::<Utc>::from).unwrap_or_default()
}

/// Stats a note and returns its change timestamp.
///
/// Fails with [`IndexError::NotAFile`] when the entry is a directory or
/// anything other than a regular file.
pub async fn stat_note(path: &Path) -> IndexResult<String> {
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() {
        return Err(IndexError::NotAFile(path.to_path_buf()));
    }
    Ok(change_timestamp(&meta))
}

/// Resolves a basename inside the notes directory. Names that are not a
/// single plain path component are rejected.
pub fn note_path(notes_dir: &Path, basename: &str) -> IndexResult<PathBuf> {
    let mut components = Path::new(basename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(notes_dir.join(basename)),
        _ => Err(IndexError::InvalidName(basename.to_string())),
    }
}

/// Lists every entry name in the notes directory, sorted.
pub async fn list_notes(notes_dir: &Path) -> IndexResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(notes_dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry
            .file_name()
            .into_string()
            .map_err(|raw| IndexError::InvalidName(raw.to_string_lossy().into_owned()))?;
        names.push(name);
    }
    names.sort();
    debug!(dir = %notes_dir.display(), count = names.len(), "listed notes");
    Ok(names)
}
