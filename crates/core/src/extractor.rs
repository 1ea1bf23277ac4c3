//! Frontmatter extraction from note files.
//!
//! A note's frontmatter is the text between its first two `---` lines. Lines
//! are consumed lazily and reading stops at the second delimiter, so the
//! note body is never read.

use crate::error::{ExtractError, IndexError, IndexResult};
use crate::{retry, scanner};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::path::Path;
use storage::{IndexEntry, Metadata};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

pub const DELIMITER: &str = "---";

/// Attempts per note before giving up. An editor may be rewriting the file
/// while it is read; a few immediate retries ride that out.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Produces the index entry for one note.
#[async_trait::async_trait]
pub trait NoteReader: Send + Sync {
    async fn read_note(&self, path: &Path) -> IndexResult<IndexEntry>;
}

/// Reads notes from disk, retrying failed extractions.
#[derive(Debug, Clone)]
pub struct FrontmatterReader {
    max_attempts: u32,
}

impl FrontmatterReader {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl Default for FrontmatterReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[async_trait::async_trait]
impl NoteReader for FrontmatterReader {
    async fn read_note(&self, path: &Path) -> IndexResult<IndexEntry> {
        read_with_retries(path, self.max_attempts, |_| {}).await
    }
}

/// Retry loop around [`read_attempt`]. `before_attempt` runs with the 1-based
/// attempt number right before the note is opened.
async fn read_with_retries<F>(
    path: &Path,
    max_attempts: u32,
    mut before_attempt: F,
) -> IndexResult<IndexEntry>
where
    F: FnMut(u32) + Send,
{
    retry::with_retries(max_attempts, |attempt| {
        before_attempt(attempt);
        read_attempt(path)
    })
    .await
    .map_err(|exhausted| IndexError::RetryExhausted {
        path: path.to_path_buf(),
        attempts: exhausted.attempts,
        source: exhausted.last,
    })
}

/// One extraction attempt. The handle is opened here and dropped on every
/// return path, before the next attempt starts.
async fn read_attempt(path: &Path) -> Result<IndexEntry, ExtractError> {
    let file = File::open(path).await?;
    let updated = scanner::change_timestamp(&file.metadata().await?);
    let metadata = extract_frontmatter(BufReader::new(file)).await?;
    debug!(path = %path.display(), keys = metadata.len(), "extracted frontmatter");
    Ok(IndexEntry::new(updated, metadata))
}

/// Extracts and parses the frontmatter block from `reader`.
pub async fn extract_frontmatter<R>(reader: R) -> Result<Metadata, ExtractError>
where
    R: AsyncBufRead + Unpin,
{
    let lines = frontmatter_lines(reader).await?;
    parse_mapping(&lines.join("\n"))
}

/// Collects content lines up to the second delimiter line.
///
/// Accumulation starts at the first line of the input, so any text before
/// the opening delimiter is part of the block. Lines are trimmed, which
/// flattens block-indented YAML; nested values need flow style
/// (`place: {city: Lisbon}`).
pub async fn frontmatter_lines<R>(reader: R) -> Result<Vec<String>, ExtractError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut content = Vec::new();
    let mut delimiters = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim() == DELIMITER {
            delimiters += 1;
            if delimiters == 2 {
                return Ok(content);
            }
        } else {
            content.push(line.trim().to_string());
        }
    }
    Err(ExtractError::InvalidNotesFile)
}

/// Parses a YAML mapping. An empty block yields an empty mapping.
pub fn parse_mapping(text: &str) -> Result<Metadata, ExtractError> {
    let value: YamlValue =
        serde_yaml::from_str(text).map_err(|e| ExtractError::InvalidYaml(e.to_string()))?;
    match value {
        YamlValue::Null => Ok(Metadata::new()),
        YamlValue::Mapping(map) => to_object(map),
        other => Err(ExtractError::InvalidYaml(format!(
            "expected a mapping, found {}",
            kind(&other)
        ))),
    }
}

fn to_object(map: serde_yaml::Mapping) -> Result<Metadata, ExtractError> {
    map.into_iter()
        .map(|(key, value)| -> Result<_, ExtractError> {
            Ok((key_string(key)?, to_json(value)?))
        })
        .collect()
}

fn key_string(key: YamlValue) -> Result<String, ExtractError> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Tagged(tagged) => key_string(tagged.value),
        other => Err(ExtractError::InvalidYaml(format!(
            "unsupported {} mapping key",
            kind(&other)
        ))),
    }
}

fn to_json(value: YamlValue) -> Result<JsonValue, ExtractError> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => number(&n),
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(seq) => {
            JsonValue::Array(seq.into_iter().map(to_json).collect::<Result<_, _>>()?)
        }
        YamlValue::Mapping(map) => JsonValue::Object(to_object(map)?),
        YamlValue::Tagged(tagged) => to_json(tagged.value)?,
    })
}

// Non-finite floats have no JSON form.
fn number(n: &serde_yaml::Number) -> JsonValue {
    if let Some(i) = n.as_i64() {
        JsonValue::from(i)
    } else if let Some(u) = n.as_u64() {
        JsonValue::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}
