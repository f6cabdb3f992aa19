use crate::domain::model::Tier;
use clap::error::ErrorKind;
use clap::Parser;

/// Parse command-line arguments. Usage errors go to stderr and exit with status 1;
/// `--help` and `--version` keep clap's behaviour.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    }
}

/// Parse the tier argument, or print usage to stderr and exit with status 1.
pub fn tier_or_exit(program: &str, raw: &str) -> Tier {
    match raw.parse::<Tier>() {
        Ok(tier) => tier,
        Err(message) => {
            eprintln!("❌ {}", message);
            eprintln!("Usage: {} <dev|test>", program);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CliConfig;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let cli = CliConfig::try_parse_from(["acsf-migrate", "DEV"]).unwrap();
        assert_eq!(cli.tier, "DEV");
        assert_eq!(cli.config, "acsf-migrate.toml");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_requires_tier() {
        assert!(CliConfig::try_parse_from(["acsf-migrate"]).is_err());
    }
}
