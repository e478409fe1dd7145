//! Run driver
//!
//! For each tracked file the source locale is read once, then every target
//! language is reconciled against it:
//!
//! 1. ensure the target directory and file exist
//! 2. read the target phrases
//! 3. diff the key sets
//! 4. drop extraneous keys and write immediately
//! 5. translate missing keys batch by batch and write the merged result
//!
//! Each (file, language) pair owns its own path, so pairs run concurrently
//! and a failure in one never stops the others. [`Orchestrator::run`] only
//! returns once every pair has finished.

use crate::batcher::TranslationBatcher;
use crate::config::{LanguageDescriptor, SyncConfig};
use crate::diff::reconcile_keys;
use crate::error::SyncResult;
use crate::mt::MachineTranslator;
use crate::store::LocaleStore;
use crate::{PhraseMap, SyncError};
use futures::future::join_all;
use std::sync::Arc;

/// What happened to one (file, language) pair
#[derive(Debug)]
pub struct PairReport {
    pub file: String,
    pub language: String,
    /// Keys removed because the source no longer has them
    pub deleted: Vec<String>,
    /// Keys translated and added
    pub added: Vec<String>,
    /// Keys still missing because their translation failed
    pub skipped: Vec<String>,
    /// Dry run only: keys a real run would translate
    pub pending: Vec<String>,
    /// Set when the pair aborted before finishing
    pub error: Option<Arc<SyncError>>,
}

impl PairReport {
    fn new(file: &str, language: &str) -> Self {
        Self {
            file: file.to_string(),
            language: language.to_string(),
            deleted: Vec::new(),
            added: Vec::new(),
            skipped: Vec::new(),
            pending: Vec::new(),
            error: None,
        }
    }

    fn aborted(file: &str, language: &str, error: Arc<SyncError>) -> Self {
        Self {
            error: Some(error),
            ..Self::new(file, language)
        }
    }

    /// Target key set now equals the source key set
    pub fn is_reconciled(&self) -> bool {
        self.error.is_none() && self.skipped.is_empty()
    }
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    pub pairs: Vec<PairReport>,
}

impl RunReport {
    /// No pair aborted and no key was left untranslated
    pub fn is_complete(&self) -> bool {
        self.pairs.iter().all(PairReport::is_reconciled)
    }

    /// Pairs that aborted on a storage or data error
    pub fn failed_pairs(&self) -> impl Iterator<Item = &PairReport> {
        self.pairs.iter().filter(|pair| pair.error.is_some())
    }

    /// (file, language, key) for every key left untranslated
    pub fn skipped_keys(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.pairs.iter().flat_map(|pair| {
            pair.skipped
                .iter()
                .map(move |key| (pair.file.as_str(), pair.language.as_str(), key.as_str()))
        })
    }

    pub fn total_added(&self) -> usize {
        self.pairs.iter().map(|pair| pair.added.len()).sum()
    }

    pub fn total_deleted(&self) -> usize {
        self.pairs.iter().map(|pair| pair.deleted.len()).sum()
    }

    pub fn total_pending(&self) -> usize {
        self.pairs.iter().map(|pair| pair.pending.len()).sum()
    }
}

pub struct Orchestrator {
    config: SyncConfig,
    store: LocaleStore,
    batcher: TranslationBatcher,
    provider: String,
}

impl Orchestrator {
    pub fn new(config: SyncConfig, translator: Arc<dyn MachineTranslator>) -> Self {
        let store = LocaleStore::new(config.locales_dir.clone());
        let provider = translator.provider_name().to_string();
        let batcher =
            TranslationBatcher::new(translator, config.batch_size, config.call_timeout());
        Self {
            config,
            store,
            batcher,
            provider,
        }
    }

    /// Reconcile every configured file for every target language
    pub async fn run(&self) -> RunReport {
        tracing::info!(
            "Syncing {} file(s) from '{}' in {:?} using {}",
            self.config.files.len(),
            self.config.source_language,
            self.store.base_dir(),
            self.provider
        );

        let files = self.config.files.iter().map(|file| self.sync_file(file));
        let pairs = join_all(files).await.into_iter().flatten().collect();

        RunReport { pairs }
    }

    async fn sync_file(&self, file: &str) -> Vec<PairReport> {
        let source_path = self
            .store
            .locale_path(&self.config.source_language, file);

        let source = match self.store.read(&source_path).await {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("Cannot read source locale {:?}: {}", source_path, e);
                let error = Arc::new(e);
                return self
                    .config
                    .target_languages()
                    .map(|lang| PairReport::aborted(file, &lang.code, Arc::clone(&error)))
                    .collect();
            }
        };

        let pairs = self
            .config
            .target_languages()
            .map(|lang| self.sync_pair(file, &source, lang));
        join_all(pairs).await
    }

    async fn sync_pair(
        &self,
        file: &str,
        source: &PhraseMap,
        lang: &LanguageDescriptor,
    ) -> PairReport {
        let mut report = PairReport::new(file, &lang.code);

        if let Err(e) = self.reconcile(file, source, lang, &mut report).await {
            tracing::error!("[{}] {} aborted: {}", lang.code, file, e);
            report.error = Some(Arc::new(e));
        }

        report
    }

    async fn reconcile(
        &self,
        file: &str,
        source: &PhraseMap,
        lang: &LanguageDescriptor,
        report: &mut PairReport,
    ) -> SyncResult<()> {
        let dir = self.store.language_dir(&lang.code);
        let path = self.store.locale_path(&lang.code, file);

        if !self.config.dry_run {
            self.store.ensure_exists(&dir, &path).await;
        }

        let mut target = match self.store.read(&path).await {
            Err(SyncError::NotFound(_)) if self.config.dry_run => PhraseMap::new(),
            other => other?,
        };

        let diff = reconcile_keys(source, &target);
        if diff.is_empty() {
            tracing::debug!("[{}] {} is up to date", lang.code, file);
            return Ok(());
        }

        if self.config.dry_run {
            tracing::info!(
                "[{}] {} {}: would delete {:?}, would translate {:?}",
                lang.code,
                lang.symbol,
                file,
                diff.to_delete,
                diff.to_add
            );
            report.deleted = diff.to_delete;
            report.pending = diff.to_add;
            return Ok(());
        }

        if !diff.to_delete.is_empty() {
            for key in &diff.to_delete {
                target.shift_remove(key);
            }
            self.store.write(&path, &target).await?;
            tracing::info!(
                "[{}] {}: deleted {} key(s) {:?}",
                lang.code,
                file,
                diff.to_delete.len(),
                diff.to_delete
            );
            report.deleted = diff.to_delete;
        }

        if diff.to_add.is_empty() {
            return Ok(());
        }

        let outcome = self
            .batcher
            .resolve_missing(
                &diff.to_add,
                source,
                &mut target,
                &self.config.source_language,
                &lang.code,
            )
            .await;

        if !outcome.translated.is_empty() {
            self.store.write(&path, &target).await?;
        }

        tracing::info!(
            "[{}] {} {} {}: added {}, skipped {}",
            lang.code,
            lang.symbol,
            lang.name,
            file,
            outcome.translated.len(),
            outcome.failed.len()
        );
        report.skipped = outcome.failed_keys();
        report.added = outcome.translated;

        Ok(())
    }
}
