//! Markdown export of chat history

use crate::chat_client::{ChatMessage, Role};
use crate::error::{RagChatError, Result};
use crate::render::format_citations_markdown;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Extension appended to export file names
pub const EXPORT_EXTENSION: &str = "md";

/// Header fields written at the top of an export
#[derive(Debug, Clone)]
pub struct ExportHeader {
    pub exported_at: DateTime<Local>,
    pub model: String,
    /// Resource name of the selected store, if any
    pub store: Option<String>,
}

/// Resolve the export file name
///
/// Blank or missing names become `chat_export_<YYYYmmdd_HHMMSS>`; `.md` is
/// appended unless already present.
pub fn normalize_export_filename(name: Option<&str>, now: DateTime<Local>) -> String {
    let base = match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("chat_export_{}", now.format("%Y%m%d_%H%M%S")),
    };

    let suffix = format!(".{}", EXPORT_EXTENSION);
    if base.ends_with(&suffix) {
        base
    } else {
        base + &suffix
    }
}

/// Render a conversation as Markdown
pub fn render_export(header: &ExportHeader, history: &[ChatMessage]) -> String {
    let mut out = String::from("# Gemini Chat Conversation Export\n\n");
    out.push_str(&format!(
        "**Exported:** {}\n\n",
        header.exported_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("**Model:** {}\n\n", header.model));
    if let Some(store) = &header.store {
        out.push_str(&format!("**File Search Store:** {}\n\n", store));
    }
    out.push_str("---\n\n");

    for message in history {
        let title = match message.role {
            Role::User => "You",
            Role::Model => "Assistant",
        };
        out.push_str(&format!("## {}\n\n", title));
        out.push_str(&message.text());
        out.push_str("\n\n");

        if message.role == Role::Model {
            if let Some(grounding) = &message.grounding {
                out.push_str(&format_citations_markdown(grounding));
            }
        }

        out.push_str("---\n\n");
    }

    out
}

/// Write an export into `dir`, creating it when missing
///
/// # Errors
///
/// Returns [`RagChatError::Export`] when the directory or file cannot be written
pub fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        RagChatError::Export(format!("cannot create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(filename);
    std::fs::write(&path, contents)
        .map_err(|e| RagChatError::Export(format!("cannot write {}: {}", path.display(), e)))?;

    tracing::info!("Exported chat to {}", path.display());
    Ok(path)
}
