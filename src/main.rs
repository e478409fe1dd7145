use clap::{Arg, ArgAction, Command, value_parser};
use locale_sync::config::DEFAULT_CONFIG_FILE;
use locale_sync::mt::{GoogleTranslateProvider, MachineTranslator, MockMode, MockTranslator};
use locale_sync::{Orchestrator, RunReport, SyncConfig, SyncResult};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("locale-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sync translation files with the source language using machine translation")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to the JSON configuration file")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("locales-dir")
                .long("locales-dir")
                .short('d')
                .help("Base directory with one subdirectory per language")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Source language code"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("Locale file to sync (repeatable, replaces the configured list)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .short('b')
                .help("Maximum number of concurrent translation requests")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .short('t')
                .help("Per-request translation timeout in seconds")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Google Translate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Report changes without writing files or translating")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Exit with an error status when any key is left untranslated")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log batch progress and file writes")
                .action(ArgAction::SetTrue),
        )
}

fn load_config(matches: &clap::ArgMatches) -> SyncResult<SyncConfig> {
    let path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = SyncConfig::load(&path)?;

    if let Some(dir) = matches.get_one::<PathBuf>("locales-dir") {
        config.locales_dir = dir.clone();
    }
    if let Some(source) = matches.get_one::<String>("source") {
        config.source_language = source.clone();
    }
    if let Some(files) = matches.get_many::<String>("file") {
        config.files = files.cloned().collect();
    }
    if let Some(batch_size) = matches.get_one::<usize>("batch-size") {
        config.batch_size = *batch_size;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.timeout_secs = *timeout;
    }
    config.dry_run = matches.get_flag("dry-run");

    config.validate()?;
    Ok(config)
}

fn translator(use_mock: bool, config: &SyncConfig) -> Result<Arc<dyn MachineTranslator>, String> {
    if use_mock {
        return Ok(Arc::new(MockTranslator::new(MockMode::Suffix)));
    }
    let provider = GoogleTranslateProvider::from_env_with_timeout(config.call_timeout())
        .map_err(|e| format!("Failed to initialize translator: {} (or use --mock)", e))?;
    Ok(Arc::new(provider))
}

fn exit_status(report: &RunReport, strict: bool) -> ExitCode {
    for pair in report.failed_pairs() {
        if let Some(error) = &pair.error {
            tracing::error!("{} [{}] not reconciled: {}", pair.file, pair.language, error);
        }
    }

    let skipped: Vec<_> = report.skipped_keys().collect();
    if !skipped.is_empty() {
        tracing::warn!("{} key(s) left untranslated:", skipped.len());
        for (file, language, key) in &skipped {
            tracing::warn!("  {} [{}] {}", file, language, key);
        }
    }

    if report.total_pending() > 0 {
        tracing::info!("Dry run: {} key(s) would be translated", report.total_pending());
    }

    tracing::info!(
        "Done: {} added, {} deleted across {} pair(s)",
        report.total_added(),
        report.total_deleted(),
        report.pairs.len()
    );

    if report.failed_pairs().next().is_some() || (strict && !skipped.is_empty()) {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let matches = cli().get_matches();

    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let translator = match translator(matches.get_flag("mock"), &config) {
        Ok(translator) => translator,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = Orchestrator::new(config, translator).run().await;
    exit_status(&report, matches.get_flag("strict"))
}
