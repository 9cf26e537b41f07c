use anyhow::Context;
use clap::Parser;
use salary_scrape::domain::ports::QuerySource;
use salary_scrape::utils::{logger, validation::Validate};
use salary_scrape::{BatchRunner, ChromiumLauncher, CliConfig, CsvQuerySource, CsvStorage, ScrapeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting salary-scrape");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let source = CsvQuerySource::new(&config.input.path, config.input.has_header);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no browser will be launched");
        perform_dry_run(&config, &source).await?;
        return Ok(());
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = CsvStorage::new(&config.output.dir);
    let mut runner = BatchRunner::new(&config, storage).with_monitoring(monitor_enabled);
    let launcher = ChromiumLauncher::new(config.browser.clone());

    match runner.run_with(&launcher, &source).await {
        Ok(report) => {
            if let Some(path) = &config.output.report {
                // 批次已完成，報告寫入失敗只記錄不影響結束碼
                match report.save(path) {
                    Ok(()) => tracing::info!("📁 Run report saved to: {}", path),
                    Err(e) => tracing::error!("❌ Could not write run report to {}: {}", path, e),
                }
            }
            println!(
                "✅ Processed {} queries: {} succeeded, {} failed",
                report.outcomes.len(),
                report.succeeded(),
                report.failed()
            );
            println!("📁 Output saved to: {}", config.output.dir);
        }
        Err(e) => {
            tracing::error!(
                "❌ Run aborted: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn perform_dry_run(config: &ScrapeConfig, source: &CsvQuerySource) -> anyhow::Result<()> {
    let queries = source
        .read_queries()
        .await
        .with_context(|| format!("reading queries from {}", source.describe()))?;

    println!("📋 Run plan:");
    println!("  Target: {}", config.target.url);
    println!("  Input: {} ({} queries)", source.describe(), queries.len());
    println!(
        "  Salary sink: {}/{} ({:?} schema)",
        config.output.dir,
        config.output.salary_sink,
        config.output.salary_schema()
    );
    println!("  Company sink: {}/{}", config.output.dir, config.output.company_sink);
    println!("  Roster expansions: up to {}", config.expansion.max_clicks);
    println!("  Headless: {}", config.browser.headless);
    println!();

    for (index, query) in queries.iter().enumerate() {
        println!("  {:>3}. {}", index + 1, query);
    }

    println!();
    println!("✅ Dry run complete.");
    Ok(())
}
