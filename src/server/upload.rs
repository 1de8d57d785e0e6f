//! Per-request upload directories

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};
use uuid::Uuid;

use docqa_core::Result;

/// Reduce a client-supplied file name to a safe, flat name.
///
/// Keeps the final path component, replaces whitespace with `_`, drops
/// everything outside `[A-Za-z0-9._-]` and strips leading dots and
/// underscores. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches(['.', '_']);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Files saved for one upload request, in a directory of their own
#[derive(Debug)]
pub struct UploadBatch {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl UploadBatch {
    /// Create a fresh directory under `root`
    pub async fn create(root: &Path) -> Result<Self> {
        let dir = root.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).await?;
        debug!("Created upload directory {}", dir.display());

        Ok(Self {
            dir,
            saved: Vec::new(),
        })
    }

    /// Save one file. Unusable names and failed writes are logged and the
    /// file is left out of [`UploadBatch::saved`].
    pub async fn save(&mut self, file_name: &str, data: &[u8]) {
        let Some(name) = sanitize_filename(file_name) else {
            debug!("Skipping upload with unusable file name {:?}", file_name);
            return;
        };

        let path = self.dir.join(name);
        match fs::write(&path, data).await {
            Ok(()) => {
                debug!("Saved file: {}", path.display());
                self.saved.push(path);
            }
            Err(e) => error!("Error saving file {}: {}", path.display(), e),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Remove the saved files and the directory; failures are only logged
    pub async fn cleanup(self) {
        for path in &self.saved {
            match fs::remove_file(path).await {
                Ok(()) => debug!("Cleaned up file: {}", path.display()),
                Err(e) => error!("Error cleaning up file {}: {}", path.display(), e),
            }
        }

        if let Err(e) = fs::remove_dir_all(&self.dir).await {
            error!("Error cleaning up directory {}: {}", self.dir.display(), e);
        }
    }
}
