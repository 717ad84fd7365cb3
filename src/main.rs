use clap::Parser;
use domain_sweep::config::TomlConfig;
use domain_sweep::core::ConfigProvider;
use domain_sweep::utils::error::{ErrorSeverity, SweepError};
use domain_sweep::utils::{logger, validation::Validate};
use domain_sweep::{CliConfig, SweepEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json);

    tracing::info!("🚀 Starting domain-sweep");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let exit_code = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };
            let monitor = cli.monitor || config.monitoring_enabled();
            execute(&config, monitor).await
        }
        None => execute(&cli, cli.monitor).await,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn execute<C: ConfigProvider + Validate>(config: &C, monitor: bool) -> i32 {
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return 1;
    }

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = match SweepEngine::from_config(config) {
        Ok(engine) => engine.with_monitoring(monitor),
        Err(e) => return report_failure(&e),
    };

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Sweep finished: {} probed ({} ok, {} failed), {} skipped in {:?}",
                summary.processed,
                summary.succeeded,
                summary.failed,
                summary.skipped,
                summary.elapsed
            );
            println!("✅ Sweep completed successfully!");
            println!("📁 Output saved to: {}", summary.output_path);
            0
        }
        Err(e) => report_failure(&e),
    }
}

fn report_failure(e: &SweepError) -> i32 {
    tracing::error!(
        "❌ Sweep failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
