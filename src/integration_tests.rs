//! End-to-end tests for a full sync run
//!
//! Every test builds a locales tree in a temporary directory, runs the
//! orchestrator with the mock translator and inspects the files on disk.

use crate::mt::{MachineTranslator, MockMode, MockTranslator};
use crate::{LanguageDescriptor, Orchestrator, PhraseMap, SyncConfig, SyncError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_locale(root: &Path, language: &str, file: &str, content: &str) {
    let dir = root.join(language);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(file), content).unwrap();
}

fn read_locale(root: &Path, language: &str, file: &str) -> PhraseMap {
    let content = std::fs::read_to_string(root.join(language).join(file)).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn raw_locale(root: &Path, language: &str, file: &str) -> String {
    std::fs::read_to_string(root.join(language).join(file)).unwrap()
}

fn phrases(pairs: &[(&str, &str)]) -> PhraseMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn config(root: &Path, languages: &[&str], files: &[&str]) -> SyncConfig {
    SyncConfig {
        locales_dir: root.to_path_buf(),
        languages: languages
            .iter()
            .map(|code| LanguageDescriptor::new(code, code, ""))
            .collect(),
        files: files.iter().map(|f| f.to_string()).collect(),
        ..SyncConfig::default()
    }
}

fn orchestrator(config: SyncConfig, mock: &MockTranslator) -> Orchestrator {
    let translator: Arc<dyn MachineTranslator> = Arc::new(mock.clone());
    Orchestrator::new(config, translator)
}

#[tokio::test]
async fn test_deletes_stale_and_translates_missing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"hello": "Hello", "bye": "Bye"}"#);
    write_locale(root, "es", "translation.json", r#"{"hello": "Hola", "old": "Viejo"}"#);

    let mut map = HashMap::new();
    map.insert(("Bye".to_string(), "es".to_string()), "Adiós".to_string());
    let mock = MockTranslator::new(MockMode::Mappings(map));

    let report = orchestrator(config(root, &["es"], &["translation.json"]), &mock)
        .run()
        .await;

    assert!(report.is_complete());
    assert_eq!(report.pairs[0].deleted, vec!["old"]);
    assert_eq!(report.pairs[0].added, vec!["bye"]);
    assert_eq!(
        read_locale(root, "es", "translation.json"),
        phrases(&[("hello", "Hola"), ("bye", "Adiós")])
    );
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_missing_target_file_is_created_and_filled() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "auth.json", r#"{"login": "Log in", "logout": "Log out"}"#);

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(config(root, &["fr"], &["auth.json"]), &mock)
        .run()
        .await;

    assert!(report.is_complete());
    assert_eq!(
        raw_locale(root, "fr", "auth.json"),
        "{\n  \"login\": \"Log in_fr\",\n  \"logout\": \"Log out_fr\"\n}\n"
    );
}

#[tokio::test]
async fn test_empty_source_and_target_write_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", "{}");
    write_locale(root, "es", "translation.json", "{}");

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(config(root, &["es"], &["translation.json"]), &mock)
        .run()
        .await;

    assert!(report.is_complete());
    assert_eq!(raw_locale(root, "es", "translation.json"), "{}");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"a": "A", "b": "<b>B</b>"}"#);
    write_locale(root, "de", "translation.json", r#"{"a": "Ah", "gone": "Weg"}"#);

    let mock = MockTranslator::new(MockMode::Suffix);
    let sync = orchestrator(config(root, &["de"], &["translation.json"]), &mock);

    sync.run().await;
    let after_first = raw_locale(root, "de", "translation.json");
    let calls_after_first = mock.call_count();

    let second = sync.run().await;

    assert!(second.is_complete());
    assert_eq!(second.total_added() + second.total_deleted(), 0);
    assert_eq!(raw_locale(root, "de", "translation.json"), after_first);
    assert_eq!(mock.call_count(), calls_after_first);
}

#[tokio::test]
async fn test_failed_translation_is_isolated_and_retried_next_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(
        root,
        "en",
        "translation.json",
        r#"{"one": "One", "two": "Two", "three": "Three"}"#,
    );

    let failing = MockTranslator::new(MockMode::FailOn(HashSet::from(["Two".to_string()])));
    let report = orchestrator(config(root, &["it"], &["translation.json"]), &failing)
        .run()
        .await;

    assert!(!report.is_complete());
    assert_eq!(report.failed_pairs().count(), 0);
    let skipped: Vec<_> = report.skipped_keys().collect();
    assert_eq!(skipped, vec![("translation.json", "it", "two")]);
    assert_eq!(
        read_locale(root, "it", "translation.json"),
        phrases(&[("one", "One_it"), ("three", "Three_it")])
    );

    let healthy = MockTranslator::new(MockMode::Suffix);
    let retry = orchestrator(config(root, &["it"], &["translation.json"]), &healthy)
        .run()
        .await;

    assert!(retry.is_complete());
    assert_eq!(retry.pairs[0].added, vec!["two"]);
    assert_eq!(healthy.call_count(), 1);
    assert_eq!(read_locale(root, "it", "translation.json").len(), 3);
}

#[tokio::test]
async fn test_deletion_is_persisted_even_when_all_additions_fail() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"new": "New"}"#);
    write_locale(root, "es", "translation.json", r#"{"stale": "Viejo"}"#);

    let mock = MockTranslator::new(MockMode::Error("provider down".to_string()));
    let report = orchestrator(config(root, &["es"], &["translation.json"]), &mock)
        .run()
        .await;

    assert_eq!(report.pairs[0].deleted, vec!["stale"]);
    assert_eq!(report.pairs[0].skipped, vec!["new"]);
    assert!(read_locale(root, "es", "translation.json").is_empty());
}

#[tokio::test]
async fn test_malformed_target_aborts_only_its_pair() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"k": "K"}"#);
    write_locale(root, "es", "translation.json", "{ broken");
    write_locale(root, "fr", "translation.json", "{}");

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(config(root, &["es", "fr"], &["translation.json"]), &mock)
        .run()
        .await;

    let failed: Vec<_> = report.failed_pairs().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].language, "es");
    assert!(matches!(
        failed[0].error.as_deref(),
        Some(SyncError::MalformedData { .. })
    ));
    assert_eq!(raw_locale(root, "es", "translation.json"), "{ broken");
    assert_eq!(read_locale(root, "fr", "translation.json"), phrases(&[("k", "K_fr")]));
}

#[tokio::test]
async fn test_unreadable_target_aborts_only_its_pair() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"k": "K"}"#);
    std::fs::write(root.join("es"), "a file, not a language directory").unwrap();

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(config(root, &["es", "fr"], &["translation.json"]), &mock)
        .run()
        .await;

    let failed: Vec<_> = report.failed_pairs().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].language, "es");
    assert!(matches!(failed[0].error.as_deref(), Some(SyncError::Io { .. })));
    assert_eq!(read_locale(root, "fr", "translation.json"), phrases(&[("k", "K_fr")]));
}

#[tokio::test]
async fn test_write_failure_aborts_only_its_pair() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"k": "K"}"#);
    write_locale(root, "es", "translation.json", r#"{"old": "Viejo"}"#);
    std::fs::create_dir(root.join("es").join(".translation.json.tmp")).unwrap();

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(config(root, &["es", "fr"], &["translation.json"]), &mock)
        .run()
        .await;

    let failed: Vec<_> = report.failed_pairs().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].language, "es");
    assert!(matches!(failed[0].error.as_deref(), Some(SyncError::Io { .. })));
    assert_eq!(mock.call_count(), 1);
    assert_eq!(raw_locale(root, "es", "translation.json"), r#"{"old": "Viejo"}"#);
    assert_eq!(read_locale(root, "fr", "translation.json"), phrases(&[("k", "K_fr")]));
}

#[tokio::test]
async fn test_missing_source_file_aborts_that_file_only() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"k": "K"}"#);

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(
        config(root, &["es", "fr"], &["translation.json", "auth.json"]),
        &mock,
    )
    .run()
    .await;

    assert_eq!(report.pairs.len(), 4);
    let failed: Vec<_> = report.failed_pairs().collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|pair| pair.file == "auth.json"));
    assert!(matches!(
        failed[0].error.as_deref(),
        Some(SyncError::NotFound(_))
    ));
    assert_eq!(read_locale(root, "es", "translation.json"), phrases(&[("k", "K_es")]));
    assert_eq!(read_locale(root, "fr", "translation.json"), phrases(&[("k", "K_fr")]));
}

#[tokio::test]
async fn test_source_language_in_language_list_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let source = r#"{"k": "K"}"#;
    write_locale(root, "en", "translation.json", source);

    let mock = MockTranslator::new(MockMode::Suffix);
    let report = orchestrator(config(root, &["en", "es"], &["translation.json"]), &mock)
        .run()
        .await;

    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].language, "es");
    assert_eq!(raw_locale(root, "en", "translation.json"), source);
}

#[tokio::test]
async fn test_unaffected_entries_keep_their_position() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"a": "A", "b": "B", "c": "C", "d": "D"}"#);
    write_locale(root, "es", "translation.json", r#"{"c": "Ce", "x": "X", "a": "Ah"}"#);

    let mock = MockTranslator::new(MockMode::Suffix);
    orchestrator(config(root, &["es"], &["translation.json"]), &mock)
        .run()
        .await;

    let keys: Vec<String> = read_locale(root, "es", "translation.json")
        .into_keys()
        .collect();
    assert_eq!(keys, vec!["c", "a", "b", "d"]);
}

#[tokio::test]
async fn test_translations_are_normalized_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"terms": "Accept <a>terms</a>"}"#);

    let mut map = HashMap::new();
    map.insert(
        ("Accept <a>terms</a>".to_string(), "es".to_string()),
        "Aceptar <a> términos</a>".to_string(),
    );
    let mock = MockTranslator::new(MockMode::Mappings(map));
    orchestrator(config(root, &["es"], &["translation.json"]), &mock)
        .run()
        .await;

    assert_eq!(
        read_locale(root, "es", "translation.json")["terms"],
        "Aceptar <a>términos</a>"
    );
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_locale(root, "en", "translation.json", r#"{"k": "K"}"#);
    write_locale(root, "es", "translation.json", r#"{"old": "Viejo"}"#);

    let mock = MockTranslator::new(MockMode::Suffix);
    let dry = SyncConfig {
        dry_run: true,
        ..config(root, &["es", "fr"], &["translation.json"])
    };
    let report = orchestrator(dry, &mock).run().await;

    assert_eq!(report.failed_pairs().count(), 0);
    assert_eq!(report.total_deleted(), 1);
    assert!(report.is_complete());
    assert_eq!(report.skipped_keys().count(), 0);
    assert_eq!(report.total_pending(), 2);
    assert_eq!(mock.call_count(), 0);
    assert_eq!(raw_locale(root, "es", "translation.json"), r#"{"old": "Viejo"}"#);
    assert!(!root.join("fr").exists());
}

#[tokio::test]
async fn test_many_missing_keys_are_split_into_batches() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let source: PhraseMap = (0..25)
        .map(|i| (format!("key{}", i), format!("Text {}", i)))
        .collect();
    write_locale(
        root,
        "en",
        "translation.json",
        &serde_json::to_string(&source).unwrap(),
    );

    let mock = MockTranslator::with_delay(MockMode::Suffix, 5);
    let small_batches = SyncConfig {
        batch_size: 10,
        ..config(root, &["pt"], &["translation.json"])
    };
    let report = orchestrator(small_batches, &mock).run().await;

    assert!(report.is_complete());
    assert_eq!(report.total_added(), 25);
    assert_eq!(mock.peak_concurrency(), 10);
    assert_eq!(read_locale(root, "pt", "translation.json").len(), 25);
}
