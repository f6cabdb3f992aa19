use acsf_migrate::config::cli::parse_or_exit;
use acsf_migrate::config::DEFAULT_CONFIG_PATH;
use acsf_migrate::core::UserDirectory;
use acsf_migrate::user_filter::filter_users;
use acsf_migrate::utils::{logger, validation::Validate};
use acsf_migrate::{SiteFactoryClient, TomlConfig};
use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "list-users")]
#[command(about = "List factory users filtered by role")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Keep only users holding one of these roles (overrides [users].required_roles)
    #[arg(long, value_delimiter = ',')]
    require: Vec<String>,

    /// Drop users holding any of these roles (overrides [users].forbidden_roles)
    #[arg(long, value_delimiter = ',')]
    forbid: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Args = parse_or_exit();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(&args).await {
        tracing::error!("❌ Listing users failed: {:#}", e);
        eprintln!("❌ {:#}", e);
    }
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;
    config.validate().context("Invalid configuration")?;

    let mut roles = config.users();
    if !args.require.is_empty() {
        roles.required_roles = args.require.clone();
    }
    if !args.forbid.is_empty() {
        roles.forbidden_roles = args.forbid.clone();
    }

    let client = SiteFactoryClient::new(&config.credentials()?)?;
    let users = client.list_users().await.context("Failed to list factory users")?;
    let kept = filter_users(&users, &roles.required_roles, &roles.forbidden_roles);
    tracing::info!("👥 Kept {} of {} users", kept.len(), users.len());

    println!("{}", serde_json::to_string_pretty(&kept)?);
    Ok(())
}
