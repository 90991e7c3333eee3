use anyhow::Context;
use camellia_auction::{catalog, cli, config, export, fetcher, input, pipeline, summary};
use clap::Parser;
use cli::{Cli, Commands, MatchOptions};
use config::Config;
use fetcher::{HttpImageSource, ImageFetcher};
use pipeline::ReconcileOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Run { options, images_dir, jobs, no_images } => {
            let config = resolve_config(config, &options, images_dir)?;
            let jobs = if no_images { None } else { Some(jobs.max(1)) };
            run(&options, &config, jobs, cli.verbose).await?;
        }

        Commands::Match { options } => {
            let config = resolve_config(config, &options, None)?;
            run(&options, &config, None, cli.verbose).await?;
        }

        Commands::Config { set_primary_url, set_backup_url, set_catalog, set_images_dir, reset, show } => {
            let mut config = if reset { Config::default() } else { config };
            let changed = reset
                || set_primary_url.is_some()
                || set_backup_url.is_some()
                || set_catalog.is_some()
                || set_images_dir.is_some();

            if let Some(url) = set_primary_url {
                config.primary_base_url = url;
            }
            if let Some(url) = set_backup_url {
                config.backup_base_url = url;
            }
            if let Some(path) = set_catalog {
                config.catalog_path = path;
            }
            if let Some(path) = set_images_dir {
                config.images_dir = path;
            }

            if changed {
                config.save().context("設定を保存できません")?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  優先URL: {}", config.primary_base_url);
                println!("  予備URL: {}", config.backup_base_url);
                println!("  カタログ: {}", config.catalog_path.display());
                println!("  画像フォルダ: {}", config.images_dir.display());
                println!("  閾値: {}", config.threshold);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  画像チェック: {}", if config.verify_images { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "camellia_auction=debug,camellia_auction_common=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// コマンドライン指定で設定を上書き
fn resolve_config(mut config: Config, options: &MatchOptions, images_dir: Option<PathBuf>) -> anyhow::Result<Config> {
    if let Some(path) = &options.catalog {
        config.catalog_path = path.clone();
    }
    if let Some(threshold) = options.threshold {
        config.threshold = threshold;
    }
    if let Some(dir) = images_dir {
        config.images_dir = dir;
    }
    config.validate()?;
    Ok(config)
}

/// `jobs` が None の場合は画像を取得しない
async fn run(options: &MatchOptions, config: &Config, jobs: Option<usize>, verbose: bool) -> anyhow::Result<()> {
    println!("🌸 camellia-auction - 出品リスト照合\n");

    // 1. 出品リスト
    println!("[1/4] 出品リストを読み込み中...");
    let entries = input::read_entries(&options.input)
        .with_context(|| format!("出品リストを読み込めません: {}", options.input.display()))?;
    println!("✔ {}件の出品を検出\n", entries.len());

    // 2. カタログ
    println!("[2/4] 品種カタログを読み込み中...");
    let catalog = catalog::load_catalog(&config.catalog_path)
        .with_context(|| format!("品種カタログを読み込めません: {}", config.catalog_path.display()))?;
    println!("✔ {}品種を読み込み\n", catalog.len());

    // 3. 照合・画像取得
    let reconciliation = match jobs {
        Some(jobs) => {
            println!("[3/4] 照合・画像取得中... (同時実行: {})", jobs);
            let source = HttpImageSource::new(Duration::from_secs(config.timeout_seconds))?;
            let fetcher = ImageFetcher::from_config(source, config);
            fetcher.prepare()?;

            let reconcile_options = ReconcileOptions {
                threshold: config.threshold,
                jobs,
                show_progress: !verbose,
            };
            let reconciliation =
                pipeline::reconcile(&entries, &catalog, Some(Arc::new(fetcher)), &reconcile_options).await;
            println!(
                "✔ 照合 {}件、画像保存 {}件\n",
                reconciliation.matched.len(),
                reconciliation.images_saved()
            );
            reconciliation
        }
        None => {
            println!("[3/4] 照合中...");
            let reconciliation = pipeline::reconcile_without_images(&entries, &catalog, config.threshold);
            println!("✔ 照合 {}件\n", reconciliation.matched.len());
            reconciliation
        }
    };

    // 4. 出力
    println!("[4/4] 結果を保存中... (形式: {})", options.format);
    let written = export::export_reconciliation(&reconciliation, &options.format, &options.output, &options.match_list)?;
    for path in &written {
        println!("✔ 出力: {}", path.display());
    }

    if let Some(report) = &options.report {
        summary::write_json_report(&reconciliation, report)?;
        println!("✔ レポート: {}", report.display());
    }

    println!();
    print!("{}", summary::render_summary(&reconciliation));
    println!("\n✅ 完了");

    Ok(())
}
