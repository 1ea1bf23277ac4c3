use anyhow::Result;
use notes_index_core::indexer::{PassKind, RunSummary};
use storage::Index;

pub fn mode_label(mode: PassKind) -> &'static str {
    match mode {
        PassKind::Incremental => "incremental",
        PassKind::Rebuild => "rebuild",
        PassKind::Scan => "scan",
    }
}

pub fn render_summary(summary: &RunSummary, json: bool) -> Result<String> {
    if json {
        let mut value = serde_json::to_value(summary)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("status".into(), "ok".into());
        }
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(format!(
        "{}: {} notes, {} extracted, {}",
        mode_label(summary.mode),
        summary.notes,
        summary.extracted,
        if summary.written {
            "index written"
        } else {
            "index unchanged"
        }
    ))
}

/// The scanned index in the same shape it would be persisted in.
pub fn render_index(index: &Index) -> Result<String> {
    Ok(serde_json::to_string_pretty(index)?)
}
