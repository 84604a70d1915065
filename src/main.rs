use c4d_localizer::store::{lock_store, DocumentStore, SharedStore};
use c4d_localizer::translator::{Orchestrator, ProgressObserver, ProgressSnapshot, RunReport};
use c4d_localizer::{cli, config, error, export, loader, review};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, API_KEY_ENV};
use dialoguer::Confirm;
use error::{LocalizerError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Translate {
            inputs,
            output,
            zip,
            all,
            batch_size,
            concurrency,
            provider,
            model,
            yes,
        } => {
            println!("🌐 c4d-localizer - 翻訳\n");

            let mut config = Config::load()?;
            if let Some(provider) = provider {
                config.provider = provider;
                config.model_name = provider.default_model().to_string();
            }
            if let Some(model) = model {
                config.model_name = model;
            }
            if let Some(size) = batch_size {
                config.batch_size = size;
            }
            if let Some(n) = concurrency {
                config.concurrency = n;
            }

            // 1. 読み込み
            println!("[1/3] ファイルを読み込み中...");
            let store = load_store(&inputs)?;
            {
                let mut guard = lock_store(&store);
                if all {
                    let ids: Vec<_> = guard.files().iter().map(|f| f.id).collect();
                    for id in ids {
                        guard.select_all(id, true)?;
                    }
                }
                println!(
                    "✔ {}ファイル / 翻訳対象 {}行\n",
                    guard.len(),
                    guard.total_selected()
                );
            }

            // 2. 翻訳
            println!(
                "[2/3] AI翻訳中... ({} / {})",
                config.provider.display_name(),
                config.model_name
            );
            let report = run_translation(&store, &config).await?;
            print_report(&report);

            // 3. 書き出し
            println!("[3/3] 書き出し中...");
            write_output(&store, &output, zip, yes)?;

            println!("\n✅ 翻訳完了");
        }

        Commands::Stats { inputs } => {
            let store = load_store(&inputs)?;
            let guard = lock_store(&store);

            for file in guard.files() {
                let mark = if file.stats.is_complete() { "✔" } else { " " };
                println!(
                    "{} {}  {}/{}行  ({}文字)",
                    mark, file.path, file.stats.translated, file.stats.total, file.stats.chars
                );
            }
            let stats = guard.global_stats();
            println!("---");
            println!(
                "合計: {}/{}行 翻訳済み  ({}文字)  選択中 {}行",
                stats.translated,
                stats.total,
                stats.chars,
                guard.total_selected()
            );
        }

        Commands::Review { inputs, output } => {
            println!("📝 c4d-localizer - 手動入力\n");

            let store = load_store(&inputs)?;
            let updated = review::run_interactive_review(&store)?;
            println!("✔ {}行を入力しました\n", updated);

            if updated > 0 {
                write_output(&store, &output, false, false)?;
            }
        }

        Commands::Config {
            set_api_key,
            set_provider,
            set_base_url,
            set_model,
            set_concurrency,
            set_batch_size,
            show,
        } => {
            // 環境変数のキーを保存しないよう、ファイルだけを読む
            let path = Config::config_path()?;
            let mut config = Config::load_from(&path)?;
            let mut changed = false;

            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                println!("✔ APIキーを設定しました");
                changed = true;
            }
            if let Some(provider) = set_provider {
                config.provider = provider;
                println!("✔ プロバイダ: {}", provider.display_name());
                changed = true;
            }
            if let Some(url) = set_base_url {
                println!("✔ ベースURL: {}", url);
                config.base_url = url;
                changed = true;
            }
            if let Some(model) = set_model {
                println!("✔ モデル: {}", model);
                config.model_name = model;
                changed = true;
            }
            if let Some(n) = set_concurrency {
                config.concurrency = n;
                changed = true;
            }
            if let Some(n) = set_batch_size {
                config.batch_size = n;
                changed = true;
            }

            if changed {
                config = config.normalized();
                config.save_to(&path)?;
            }

            if show || !changed {
                println!("設定: {}", path.display());
                println!("  プロバイダ: {}", config.provider.display_name());
                println!("  モデル: {}", config.model_name);
                println!("  ベースURL: {}", config.base_url);
                println!("  同時リクエスト数: {}", config.concurrency);
                println!("  バッチサイズ: {}", config.batch_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  再試行回数: {}", config.max_retries);
                println!("  APIキー: {}", config.masked_api_key());
                if std::env::var(API_KEY_ENV).is_ok() {
                    println!("  ({} が設定されているため、実行時はこちらを使用)", API_KEY_ENV);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("c4d_localizer=debug,c4d_localizer_common=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_store(inputs: &[PathBuf]) -> Result<SharedStore> {
    let docs = loader::load_inputs(inputs)?;
    let mut store = DocumentStore::new();
    store.add_files(docs);
    Ok(store.into_shared())
}

async fn run_translation(store: &SharedStore, config: &Config) -> Result<RunReport> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len}行 ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let observer: ProgressObserver = {
        let bar = bar.clone();
        Arc::new(move |snapshot: ProgressSnapshot| {
            bar.set_length(snapshot.total as u64);
            bar.set_position(snapshot.current as u64);
        })
    };

    let orchestrator = Arc::new(Orchestrator::new(Arc::clone(store)).with_observer(observer));

    // Ctrl+C で未着手のバッチを止める
    let watcher = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n中断しています（処理中のバッチを待機）...");
                orchestrator.cancel();
            }
        })
    };

    let result = orchestrator.run(config).await;
    watcher.abort();
    bar.finish_and_clear();
    result
}

fn print_report(report: &RunReport) {
    println!(
        "✔ {}行を翻訳 ({:.1}秒)",
        report.translated(),
        report.elapsed.as_secs_f64()
    );

    let failed = report.failed_batches();
    if failed > 0 {
        eprintln!("⚠ {}バッチが失敗しました（該当行は未翻訳のまま選択されています）", failed);
        for err in report.failures() {
            eprintln!("  - {}", err);
        }
    }
    let unapplied: usize = report.files.iter().map(|f| f.batches_unapplied).sum();
    if unapplied > 0 {
        eprintln!("⚠ {}バッチを反映できませんでした（実行中にファイルが削除されました）", unapplied);
    }
    if report.cancelled {
        eprintln!("⚠ 中断されました");
    }
    println!();
}

fn write_output(store: &SharedStore, output: &Path, zip: bool, yes: bool) -> Result<()> {
    let guard = lock_store(store);
    let docs = guard.files_for_export();

    // 1ファイルだけなら ZIP もディレクトリ構成も作らずに書き出す
    if let [doc] = docs.as_slice() {
        let target = export::single_target(doc, output);
        if target.exists() && !yes && !confirm_overwrite(1)? {
            println!("書き出しを中止しました");
            return Ok(());
        }
        let written = export::write_single(doc, output)?;
        println!("✔ 保存: {}", written.display());
        return Ok(());
    }

    if zip {
        let zip_path = if output.extension().is_some_and(|e| e.eq_ignore_ascii_case("zip")) {
            output.to_path_buf()
        } else {
            output.join(export::DEFAULT_ARCHIVE_NAME)
        };
        export::write_zip(&docs, &zip_path)?;
        println!("✔ ZIPを保存: {}", zip_path.display());
        return Ok(());
    }

    let existing = export::existing_targets(&docs, output);
    if !existing.is_empty() && !yes && !confirm_overwrite(existing.len())? {
        println!("書き出しを中止しました");
        return Ok(());
    }

    let written = export::write_to_dir(&docs, output)?;
    println!("✔ {}ファイルを保存: {}", written.len(), output.display());
    Ok(())
}

fn confirm_overwrite(count: usize) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("{}件の既存ファイルを上書きしますか?", count))
        .default(false)
        .interact()
        .map_err(|e| LocalizerError::Prompt(e.to_string()))
}
