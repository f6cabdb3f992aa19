use acsf_migrate::app::{show_progress, StagingOrchestrator};
use acsf_migrate::config::cli::{parse_or_exit, tier_or_exit};
use acsf_migrate::utils::{logger, validation::Validate};
use acsf_migrate::{CliConfig, MigrateError, SiteFactoryClient, SiteFactoryConnector, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: CliConfig = parse_or_exit();
    let tier = tier_or_exit("acsf-migrate", &args.tier);

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Staging Site Factory sites to '{}'", tier);
    tracing::info!("📁 Loading configuration from: {}", args.config);

    match stage(&args, tier).await {
        Ok(report) => {
            tracing::info!(
                "✅ Staged {} sites (task {}); domains assigned for {} sites on {}",
                report.staged_sites,
                report.task_id,
                report.sites_with_domains,
                report.destination_host
            );
            println!("Done staging to '{}' environment.", tier);
        }
        Err(e) => {
            tracing::error!(
                "❌ Staging to '{}' failed: {} (Category: {:?})",
                tier,
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
        }
    }

    Ok(())
}

async fn stage(
    args: &CliConfig,
    tier: acsf_migrate::core::Tier,
) -> Result<acsf_migrate::app::StagingReport, MigrateError> {
    let config = TomlConfig::from_file(&args.config)?;
    config.validate()?;
    let credentials = config.credentials()?;

    let http = reqwest::Client::new();
    let source = SiteFactoryClient::with_client(http.clone(), &credentials)?;
    let connector = SiteFactoryConnector::new(http, credentials.clone());

    let orchestrator = StagingOrchestrator::new(
        &source,
        &connector,
        credentials.factory_host.clone(),
        config.staging_options(),
    );
    orchestrator.run(tier, Some(&show_progress)).await
}
