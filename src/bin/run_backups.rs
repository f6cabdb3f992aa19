use acsf_migrate::app::{BackupOrchestrator, BackupStatus};
use acsf_migrate::config::cli::parse_or_exit;
use acsf_migrate::config::DEFAULT_CONFIG_PATH;
use acsf_migrate::utils::{logger, validation::Validate};
use acsf_migrate::{LogNotifier, SiteFactoryClient, TomlConfig};
use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "run-backups")]
#[command(about = "Back up every Site Factory site and report the outcome")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Queue the backups without waiting for them to finish
    #[arg(long)]
    fast: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Args = parse_or_exit();

    logger::init_cli_logger(args.verbose);
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            return Ok(());
        }
    };

    let mut options = config.backup_options();
    if args.fast {
        options.wait_for_completion = false;
        tracing::info!("🔧 Fast mode: backups are queued, not awaited");
    }

    let source = SiteFactoryClient::new(&config.credentials()?)?;
    let notifier = LogNotifier::new(&config.notification());

    let report = BackupOrchestrator::new(&source, &notifier, options).run().await;
    match &report.status {
        BackupStatus::Succeeded => println!("✅ Backed up {} sites.", report.sites),
        BackupStatus::Started => println!("Backups started."),
        BackupStatus::CompletedWithProblems => {
            println!("⚠️ Backups finished with {} problems:", report.failures.len());
            for failure in &report.failures {
                println!("  {}", failure);
            }
        }
        BackupStatus::Failed(reason) => eprintln!("❌ Something went wrong backing up ACSF: {}", reason),
    }

    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<TomlConfig> {
    let config = TomlConfig::from_file(path)
        .with_context(|| format!("Failed to load config file '{}'", path))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
