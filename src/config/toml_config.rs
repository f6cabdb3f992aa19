use crate::app::backup::BackupOptions;
use crate::app::staging::StagingOptions;
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::{
    validate_host_name, validate_positive_number, validate_range, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub factory: FactoryConfig,
    pub backup: Option<BackupConfig>,
    pub staging: Option<StagingConfig>,
    pub users: Option<UsersConfig>,
    pub notification: Option<NotificationConfig>,
}

/// Connection to the source factory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub username: Option<String>,
    pub apikey: Option<String>,
    pub factory_host: Option<String>,
    /// Overrides `https://<factory_host>` for the source factory (proxies, tests).
    pub base_url: Option<String>,
    pub page_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    pub concurrency: Option<usize>,
    pub wait_for_completion: Option<bool>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    pub lookup_concurrency: Option<usize>,
    pub assignment_concurrency: Option<usize>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersConfig {
    #[serde(default)]
    pub required_roles: Vec<String>,
    #[serde(default)]
    pub forbidden_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub sender: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Prepended to every notification subject, e.g. "[prod]".
    pub subject_prefix: Option<String>,
}

/// Validated factory credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryCredentials {
    pub username: String,
    pub apikey: String,
    pub factory_host: String,
    pub base_url: String,
    pub page_limit: usize,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MigrateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MigrateError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ACSF_APIKEY})；找不到的保留原樣，交給驗證報錯
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn credentials(&self) -> Result<FactoryCredentials> {
        let factory = &self.factory;
        let username = required_value("factory.username", &factory.username)?;
        let apikey = required_value("factory.apikey", &factory.apikey)?;
        let factory_host = required_value("factory.factory_host", &factory.factory_host)?;
        validate_host_name("factory.factory_host", &factory_host)?;

        let base_url = match &factory.base_url {
            Some(url) => {
                validate_url("factory.base_url", url)?;
                url.trim_end_matches('/').to_string()
            }
            None => format!("https://{}", factory_host),
        };

        let page_limit = factory.page_limit.unwrap_or(100);
        validate_range("factory.page_limit", page_limit, 1, 100)?;

        Ok(FactoryCredentials {
            username,
            apikey,
            factory_host,
            base_url,
            page_limit,
        })
    }

    pub fn backup_options(&self) -> BackupOptions {
        let defaults = BackupOptions::default();
        match &self.backup {
            Some(backup) => BackupOptions {
                concurrency: backup.concurrency.unwrap_or(defaults.concurrency),
                wait_for_completion: backup
                    .wait_for_completion
                    .unwrap_or(defaults.wait_for_completion),
                poll_interval: backup
                    .poll_interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.poll_interval),
            },
            None => defaults,
        }
    }

    pub fn staging_options(&self) -> StagingOptions {
        let defaults = StagingOptions::default();
        match &self.staging {
            Some(staging) => StagingOptions {
                lookup_concurrency: staging
                    .lookup_concurrency
                    .unwrap_or(defaults.lookup_concurrency),
                assignment_concurrency: staging
                    .assignment_concurrency
                    .unwrap_or(defaults.assignment_concurrency),
                poll_interval: staging
                    .poll_interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.poll_interval),
            },
            None => defaults,
        }
    }

    pub fn users(&self) -> UsersConfig {
        self.users.clone().unwrap_or_default()
    }

    pub fn notification(&self) -> NotificationConfig {
        self.notification.clone().unwrap_or_default()
    }
}

fn required_value(field: &str, value: &Option<String>) -> Result<String> {
    let value = validate_required_field(field, value)?.trim();
    if value.is_empty() {
        return Err(MigrateError::MissingConfigError {
            field: field.to_string(),
        });
    }
    if ENV_VAR.is_match(value) {
        return Err(MigrateError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Environment variable is not set".to_string(),
        });
    }
    Ok(value.to_string())
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.credentials()?;

        let backup = self.backup_options();
        validate_positive_number("backup.concurrency", backup.concurrency, 1)?;
        validate_range(
            "backup.poll_interval_ms",
            backup.poll_interval.as_millis(),
            1,
            60_000,
        )?;

        let staging = self.staging_options();
        validate_positive_number("staging.lookup_concurrency", staging.lookup_concurrency, 1)?;
        validate_positive_number(
            "staging.assignment_concurrency",
            staging.assignment_concurrency,
            1,
        )?;
        validate_range(
            "staging.poll_interval_ms",
            staging.poll_interval.as_millis(),
            1,
            60_000,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
[factory]
username = "migrator"
apikey = "secret"
factory_host = "www.demo.acsitefactory.com"

[backup]
concurrency = 2
wait_for_completion = false
poll_interval_ms = 250

[staging]
assignment_concurrency = 5

[users]
required_roles = ["release engineer"]
forbidden_roles = ["blocked"]

[notification]
sender = "acsf@example.com"
recipients = ["ops@example.com"]
subject_prefix = "[demo]"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(FULL_CONFIG).unwrap();
        assert!(config.validate().is_ok());

        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.base_url, "https://www.demo.acsitefactory.com");
        assert_eq!(credentials.page_limit, 100);

        let backup = config.backup_options();
        assert_eq!(backup.concurrency, 2);
        assert!(!backup.wait_for_completion);
        assert_eq!(backup.poll_interval, Duration::from_millis(250));

        let staging = config.staging_options();
        assert_eq!(staging.lookup_concurrency, 3);
        assert_eq!(staging.assignment_concurrency, 5);
        assert_eq!(staging.poll_interval, Duration::from_secs(1));

        assert_eq!(config.users().forbidden_roles, vec!["blocked".to_string()]);
        assert_eq!(config.notification().recipients.len(), 1);
        assert_eq!(config.notification().subject_prefix.as_deref(), Some("[demo]"));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = TomlConfig::from_toml_str(
            r#"
[factory]
username = "u"
apikey = "k"
factory_host = "www.demo.acsitefactory.com"
"#,
        )
        .unwrap();

        let backup = config.backup_options();
        assert_eq!(backup.concurrency, 3);
        assert!(backup.wait_for_completion);
        assert!(config.users().required_roles.is_empty());
    }

    #[test]
    fn test_missing_credentials_are_configuration_errors() {
        let config = TomlConfig::from_toml_str(
            r#"
[factory]
username = "u"
factory_host = "www.demo.acsitefactory.com"
"#,
        )
        .unwrap();

        match config.validate() {
            Err(MigrateError::MissingConfigError { field }) => assert_eq!(field, "factory.apikey"),
            other => panic!("expected missing apikey, got {:?}", other),
        }
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("ACSF_MIGRATE_TEST_KEY", "from-env");
        let config = TomlConfig::from_toml_str(
            r#"
[factory]
username = "u"
apikey = "${ACSF_MIGRATE_TEST_KEY}"
factory_host = "www.demo.acsitefactory.com"
"#,
        )
        .unwrap();
        assert_eq!(config.credentials().unwrap().apikey, "from-env");
    }

    #[test]
    fn test_unset_env_var_is_rejected() {
        let config = TomlConfig::from_toml_str(
            r#"
[factory]
username = "u"
apikey = "${ACSF_MIGRATE_TEST_UNSET_VARIABLE}"
factory_host = "www.demo.acsitefactory.com"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.credentials(),
            Err(MigrateError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let content = FULL_CONFIG.replace("concurrency = 2", "concurrency = 0");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_override() {
        let content = FULL_CONFIG.replace(
            "[backup]",
            "base_url = \"http://127.0.0.1:9000/\"\n\n[backup]",
        );
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(
            config.credentials().unwrap().base_url,
            "http://127.0.0.1:9000"
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acsf-migrate.toml");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let config = TomlConfig::from_file(&path).unwrap();
        assert_eq!(config.factory.username.as_deref(), Some("migrator"));
        assert!(matches!(
            TomlConfig::from_file(dir.path().join("missing.toml")),
            Err(MigrateError::IoError(_))
        ));
    }
}
