//! Batched machine translation of missing phrases
//!
//! Missing keys are cut into batches of `batch_size`. All calls of one batch
//! are issued together and awaited jointly; the next batch starts only once
//! every call of the previous one has finished. A failing or hanging call
//! only costs its own key, which stays missing and is picked up again by the
//! next run.

use crate::PhraseMap;
use crate::mt::{MachineTranslator, MtError, MtResult};
use futures::future::join_all;
use regex::Regex;
use std::borrow::Cow;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// A right-angle bracket followed by one whitespace character
static TAG_TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s").expect("static regex is valid"));

/// Strip the whitespace translation providers insert after HTML-like tags
///
/// `"<b> Hola</b>"` becomes `"<b>Hola</b>"`. Text without `>` followed by
/// whitespace is returned unchanged.
pub fn normalize_translation(text: &str) -> Cow<'_, str> {
    TAG_TRAILING_SPACE.replace_all(text, ">")
}

/// Result of resolving one set of missing keys
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Keys inserted into the target map
    pub translated: Vec<String>,
    /// Keys left missing and why
    pub failed: Vec<(String, MtError)>,
}

impl BatchOutcome {
    pub fn failed_keys(&self) -> Vec<String> {
        self.failed.iter().map(|(key, _)| key.clone()).collect()
    }
}

pub struct TranslationBatcher {
    translator: Arc<dyn MachineTranslator>,
    batch_size: usize,
    call_timeout: Duration,
}

impl TranslationBatcher {
    pub fn new(
        translator: Arc<dyn MachineTranslator>,
        batch_size: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            translator,
            batch_size: batch_size.max(1),
            call_timeout,
        }
    }

    /// Translate `missing` keys from `source` and merge them into `target`
    ///
    /// Keys are merged in the order given. Keys that fail to translate, and
    /// keys not present in `source`, are left out of `target`.
    pub async fn resolve_missing(
        &self,
        missing: &[String],
        source: &PhraseMap,
        target: &mut PhraseMap,
        source_language: &str,
        target_language: &str,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let batch_count = missing.len().div_ceil(self.batch_size);

        for (index, batch) in missing.chunks(self.batch_size).enumerate() {
            tracing::debug!(
                "[{}] batch {}/{}: translating {} phrases",
                target_language,
                index + 1,
                batch_count,
                batch.len()
            );

            let calls = batch.iter().map(|key| async move {
                let result = match source.get(key) {
                    Some(text) => {
                        self.translate_one(text, source_language, target_language)
                            .await
                    }
                    None => Err(MtError::TranslationError(format!(
                        "key '{}' is not in the source locale",
                        key
                    ))),
                };
                (key, result)
            });

            for (key, result) in join_all(calls).await {
                match result {
                    Ok(translation) => {
                        target.insert(key.clone(), translation);
                        outcome.translated.push(key.clone());
                    }
                    Err(e) => {
                        tracing::warn!(
                            "[{}] skipping '{}', will retry next run: {}",
                            target_language,
                            key,
                            e
                        );
                        outcome.failed.push((key.clone(), e));
                    }
                }
            }
        }

        outcome
    }

    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> MtResult<String> {
        let call = self
            .translator
            .translate(text, source_language, target_language);

        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map(|translated| normalize_translation(&translated).into_owned()),
            Err(_) => Err(MtError::Timeout(self.call_timeout)),
        }
    }
}
