use crate::config::toml_config::NotificationConfig;
use crate::core::{Notifier, Result};
use async_trait::async_trait;

/// Writes notifications to the log. Mail delivery is left to whatever
/// collects the log output.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    sender: Option<String>,
    recipients: Vec<String>,
    subject_prefix: Option<String>,
}

impl LogNotifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
            subject_prefix: config
                .subject_prefix
                .as_deref()
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .map(str::to_string),
        }
    }

    pub fn subject_line(&self, subject: &str) -> String {
        match &self.subject_prefix {
            Some(prefix) => format!("{} {}", prefix, subject),
            None => subject.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, message: Option<&str>) -> Result<()> {
        tracing::info!(
            sender = self.sender.as_deref().unwrap_or("-"),
            recipients = %self.recipients.join(","),
            "📣 {}",
            self.subject_line(subject)
        );
        if let Some(body) = message {
            for line in body.lines() {
                tracing::info!("   {}", line);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefix: Option<&str>) -> NotificationConfig {
        NotificationConfig {
            sender: Some("acsf@example.com".to_string()),
            recipients: vec!["ops@example.com".to_string()],
            subject_prefix: prefix.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new(&config(None));
        tokio_test::assert_ok!(notifier.notify("subject", Some("line 1\nline 2")).await);
        tokio_test::assert_ok!(LogNotifier::default().notify("subject", None).await);
    }

    #[test]
    fn test_subject_prefix_is_prepended() {
        let notifier = LogNotifier::new(&config(Some("[prod]")));
        assert_eq!(
            notifier.subject_line("ACSF backups started."),
            "[prod] ACSF backups started."
        );
    }

    #[test]
    fn test_blank_prefix_is_ignored() {
        assert_eq!(LogNotifier::new(&config(Some("  "))).subject_line("x"), "x");
        assert_eq!(LogNotifier::new(&config(None)).subject_line("x"), "x");
    }
}
