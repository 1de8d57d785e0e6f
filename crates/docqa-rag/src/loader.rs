//! Document loader
//!
//! Reads the supported files at the top level of a directory into
//! [`Document`]s. A file that cannot be read or parsed is logged and skipped;
//! only a missing directory is an error.

use chrono::{DateTime, Utc};
use pulldown_cmark::{Event, Parser, TagEnd};
use serde_json::{json, Value};
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

use docqa_core::{Document, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Text,
    Markdown,
    Pdf,
    Json,
}

impl FileKind {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(FileKind::Text),
            "md" => Some(FileKind::Markdown),
            "pdf" => Some(FileKind::Pdf),
            "json" => Some(FileKind::Json),
            _ => None,
        }
    }

    fn mime_type(&self) -> &'static str {
        match self {
            FileKind::Text => "text/plain",
            FileKind::Markdown => "text/markdown",
            FileKind::Pdf => "application/pdf",
            FileKind::Json => "application/json",
        }
    }
}

/// Loads documents from a directory of uploaded files
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Whether a file with this path would be loaded
    pub fn is_supported(path: &Path) -> bool {
        FileKind::from_path(path).is_some()
    }

    /// Load every supported, non-hidden file directly inside `directory`,
    /// ordered by file name.
    pub fn load_documents(&self, directory: &Path) -> Result<Vec<Document>> {
        if !directory.is_dir() {
            return Err(Error::DirectoryNotFound(directory.to_path_buf()));
        }

        let mut documents = Vec::new();

        let entries = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Error reading directory entry in {}: {}", directory.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::is_supported(path) {
                debug!("Skipping unsupported file: {}", path.display());
                continue;
            }

            match self.load_file(path) {
                Ok(document) => documents.push(document),
                Err(e) => error!("Error loading document {}: {}", path.display(), e),
            }
        }

        if documents.is_empty() {
            warn!("No documents could be loaded from {}", directory.display());
        } else {
            info!("Successfully loaded {} documents", documents.len());
        }

        Ok(documents)
    }

    /// Load a single supported file
    pub fn load_file(&self, path: &Path) -> Result<Document> {
        let kind = FileKind::from_path(path).ok_or_else(|| {
            Error::DocumentLoader(format!("Unsupported file type: {}", path.display()))
        })?;

        let bytes = fs::read(path)?;
        let text = match kind {
            FileKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
            FileKind::Markdown => markdown_to_text(&String::from_utf8_lossy(&bytes)),
            FileKind::Pdf => pdf_to_text(&bytes, path)?,
            FileKind::Json => json_to_text(&bytes, path)?,
        };

        Ok(Document {
            id: path.display().to_string(),
            text,
            metadata: file_metadata(path, kind, bytes.len()),
        })
    }
}

/// Dotfiles inside the directory; the directory itself is never hidden
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn file_metadata(path: &Path, kind: FileKind, size: usize) -> Value {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let last_modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(|time| DateTime::<Utc>::from(time).format("%Y-%m-%d").to_string());

    json!({
        "file_path": path.display().to_string(),
        "file_name": file_name,
        "file_type": kind.mime_type(),
        "file_size": size,
        "last_modified_date": last_modified,
    })
}

/// Render markdown to plain text, one block per paragraph
fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                text.push_str("\n\n")
            }
            Event::End(TagEnd::Item) => text.push('\n'),
            _ => {}
        }
    }

    text.trim_end().to_string()
}

/// Extract the text layer of a PDF. The extractor panics on some malformed
/// fonts and encodings, so a panic is turned into an error for this file.
fn pdf_to_text(bytes: &[u8], path: &Path) -> Result<String> {
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }))
    .map_err(|payload| {
        Error::DocumentLoader(format!(
            "PDF parser aborted on {}: {}",
            path.display(),
            panic_message(payload.as_ref())
        ))
    })?;

    let text = extracted.map_err(|e| {
        Error::DocumentLoader(format!("Failed to extract text from PDF {}: {}", path.display(), e))
    })?;

    if text.trim().is_empty() {
        return Err(Error::DocumentLoader(format!(
            "PDF file {} contains no extractable text (may be image-based)",
            path.display()
        )));
    }

    Ok(text)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn json_to_text(bytes: &[u8], path: &Path) -> Result<String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        Error::DocumentLoader(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    let mut lines = Vec::new();
    flatten_json("", &value, &mut lines);
    Ok(lines.join("\n"))
}

/// Flatten a JSON value into `path.to.key: value` lines
fn flatten_json(prefix: &str, value: &Value, lines: &mut Vec<String>) {
    let child = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_json(&child(key), nested, lines);
            }
        }
        Value::Array(items) => {
            for (i, nested) in items.iter().enumerate() {
                flatten_json(&child(&i.to_string()), nested, lines);
            }
        }
        Value::String(s) if prefix.is_empty() => lines.push(s.clone()),
        Value::String(s) => lines.push(format!("{}: {}", prefix, s)),
        other if prefix.is_empty() => lines.push(other.to_string()),
        other => lines.push(format!("{}: {}", prefix, other)),
    }
}
