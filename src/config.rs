//! Run configuration
//!
//! A run is described by a JSON document such as:
//!
//! ```json
//! {
//!     "localesDir": "public/locales",
//!     "sourceLanguage": "en",
//!     "languages": [
//!         { "code": "es", "name": "Español", "symbol": "🇪🇸" },
//!         { "code": "fr", "name": "Français", "symbol": "🇫🇷" }
//!     ],
//!     "files": ["translation.json", "auth.json"],
//!     "batchSize": 100,
//!     "timeoutSecs": 30
//! }
//! ```
//!
//! Every field except `languages` has a default. The configuration is fixed
//! for the whole run; the CLI may override individual fields before
//! [`SyncConfig::validate`] is called.

use crate::error::{SyncError, SyncResult};
use icu_locale::Locale;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIG_FILE: &str = "locale-sync.json";

/// A target language of the run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageDescriptor {
    /// Language code, also the name of the locale subdirectory (e.g. "es")
    pub code: String,
    /// Display name (e.g. "Español")
    #[serde(default)]
    pub name: String,
    /// Display symbol, typically a flag
    #[serde(default)]
    pub symbol: String,
}

impl LanguageDescriptor {
    pub fn new(code: &str, name: &str, symbol: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Base directory holding one subdirectory per language
    pub locales_dir: PathBuf,
    /// Language whose files define which keys exist
    pub source_language: String,
    pub languages: Vec<LanguageDescriptor>,
    /// File identifiers tracked in every language directory
    pub files: Vec<String>,
    /// Maximum number of concurrent translation calls
    pub batch_size: usize,
    /// Per-call translation timeout, in seconds
    pub timeout_secs: u64,
    /// Compute and log diffs without writing or translating
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            locales_dir: PathBuf::from("locales"),
            source_language: "en".to_string(),
            languages: Vec::new(),
            files: vec!["translation.json".to_string()],
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> SyncResult<Self> {
        tracing::debug!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SyncResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| SyncError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Per-call translation timeout
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Languages to reconcile, i.e. every configured language except the source
    pub fn target_languages(&self) -> impl Iterator<Item = &LanguageDescriptor> {
        self.languages
            .iter()
            .filter(move |lang| lang.code != self.source_language)
    }

    /// Check the configuration before any file is touched
    pub fn validate(&self) -> SyncResult<()> {
        if self.languages.is_empty() {
            return Err(SyncError::Config("no target languages configured".to_string()));
        }
        if self.files.is_empty() {
            return Err(SyncError::Config("no locale files configured".to_string()));
        }
        if self.batch_size == 0 {
            return Err(SyncError::Config("batch size must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(SyncError::Config("timeout must be at least 1 second".to_string()));
        }

        validate_language_code(&self.source_language)?;
        for lang in &self.languages {
            validate_language_code(&lang.code)?;
        }
        for file in &self.files {
            validate_file_id(file)?;
        }

        Ok(())
    }
}

fn validate_language_code(code: &str) -> SyncResult<()> {
    code.parse::<Locale>()
        .map(|_| ())
        .map_err(|e| SyncError::Config(format!("invalid language code '{}': {:?}", code, e)))
}

/// File identifiers are plain names resolved inside each language directory
fn validate_file_id(file: &str) -> SyncResult<()> {
    let is_plain = !file.is_empty()
        && file != "."
        && file != ".."
        && !file.contains(['/', '\\']);
    if is_plain {
        Ok(())
    } else {
        Err(SyncError::Config(format!(
            "locale file '{}' must be a plain file name",
            file
        )))
    }
}
