//! Locale synchronization for JSON translation files
//!
//! Keeps every target-language copy of a set of locale files in step with the
//! source language: keys removed from the source are removed everywhere, keys
//! added to the source are machine translated into every target language.
//!
//! # Workflow Example
//!
//! ```ignore
//! use locale_sync::{Orchestrator, SyncConfig};
//! use locale_sync::mt::GoogleTranslateProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::load("locale-sync.json".as_ref())?;
//!     config.validate()?;
//!
//!     let translator = Arc::new(GoogleTranslateProvider::from_env()?);
//!     let report = Orchestrator::new(config, translator).run().await;
//!
//!     println!("added {}, deleted {}", report.total_added(), report.total_deleted());
//!     Ok(())
//! }
//! ```

use indexmap::IndexMap;

pub mod batcher;
pub mod config;
pub mod diff;
pub mod error;
pub mod mt;
pub mod orchestrator;
pub mod store;

#[cfg(test)]
mod integration_tests;

/// Phrase key → phrase text of one locale file, in file order
pub type PhraseMap = IndexMap<String, String>;

// Re-export main types for convenient access
pub use batcher::{BatchOutcome, TranslationBatcher, normalize_translation};
pub use config::{LanguageDescriptor, SyncConfig};
pub use diff::{KeyDiff, reconcile_keys};
pub use error::{SyncError, SyncResult};
pub use orchestrator::{Orchestrator, PairReport, RunReport};
pub use store::LocaleStore;
