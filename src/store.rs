//! Locale file storage
//!
//! Every language owns a directory under the locales base directory and every
//! tracked file identifier resolves to `{locales_dir}/{language}/{file}`:
//!
//! ```text
//! locales/
//!   en/translation.json
//!   es/translation.json
//!   fr/translation.json
//! ```
//!
//! Files hold a flat JSON object of phrase key → phrase text. Key order is
//! kept as found on disk so a rewrite only touches the lines that changed.

use crate::PhraseMap;
use crate::error::{SyncError, SyncResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Reads and writes locale files below one base directory
#[derive(Debug, Clone)]
pub struct LocaleStore {
    base_dir: PathBuf,
}

impl LocaleStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding all files of a language
    pub fn language_dir(&self, language: &str) -> PathBuf {
        self.base_dir.join(language)
    }

    /// Path of one locale file
    pub fn locale_path(&self, language: &str, file: &str) -> PathBuf {
        self.language_dir(language).join(file)
    }

    /// Make sure the directory and the file exist, creating `{}` if needed
    ///
    /// Best effort: failures are logged and swallowed, a following
    /// [`LocaleStore::read`] reports anything that is still wrong.
    pub async fn ensure_exists(&self, dir: &Path, path: &Path) {
        if let Err(e) = fs::create_dir_all(dir).await {
            tracing::warn!("Could not create locale directory {:?}: {}", dir, e);
        }

        match fs::try_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = fs::write(path, "{}\n").await {
                    tracing::warn!("Could not create locale file {:?}: {}", path, e);
                } else {
                    tracing::debug!("Created empty locale file {:?}", path);
                }
            }
            Err(e) => tracing::warn!("Could not check locale file {:?}: {}", path, e),
        }
    }

    /// Read a locale file into a phrase map
    ///
    /// # Errors
    /// - `NotFound` if the file does not exist
    /// - `Io` for any other read failure
    /// - `MalformedData` if the content is not a JSON object of strings
    pub async fn read(&self, path: &Path) -> SyncResult<PhraseMap> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SyncError::NotFound(path.to_path_buf())
            } else {
                SyncError::io(path, e)
            }
        })?;

        parse_phrases(&content).map_err(|reason| SyncError::MalformedData {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Replace a locale file with the given phrases
    ///
    /// Content goes to a sibling temporary file first and is renamed over the
    /// target, so readers see either the old or the new document.
    pub async fn write(&self, path: &Path, phrases: &PhraseMap) -> SyncResult<()> {
        let mut content = serde_json::to_string_pretty(phrases).map_err(|e| {
            SyncError::MalformedData {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        content.push('\n');

        let tmp_path = temp_path_for(path);
        if let Err(e) = fs::write(&tmp_path, content).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(SyncError::io(&tmp_path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(SyncError::io(path, e));
        }

        tracing::debug!("Wrote {} phrases to {:?}", phrases.len(), path);
        Ok(())
    }
}

fn parse_phrases(content: &str) -> Result<PhraseMap, String> {
    if content.trim().is_empty() {
        return Ok(PhraseMap::new());
    }
    serde_json::from_str(content).map_err(|e| e.to_string())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
