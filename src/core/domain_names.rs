//! Host name rewriting between Site Factory tiers.
//!
//! Site host names follow one of these conventions:
//!
//! ```text
//! <site>.domain.com               production front end (UI)
//! <site>-<tier>-acsf.domain.com   tier front end (UI)
//! <site>-cms.domain.com           production CMS
//! <site>-cms-<tier>.domain.com    tier CMS
//! ```
//!
//! Only the first label is rewritten; the rest of the name passes through.

use crate::utils::error::{MigrateError, Result};
use regex::Regex;
use std::sync::LazyLock;

static UI_SITE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)^[a-z][a-z0-9]+(-[a-z][a-z0-9]+-acsf)?$").unwrap());

static CMS_SITE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)^[a-z][a-z0-9]+-cms(-[a-z][a-z0-9]+)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// Public front end, e.g. `www` or `www-prod-acsf`.
    Ui,
    /// Content management back end, e.g. `www-cms` or `www-cms-prod`.
    Cms,
}

/// A host name rewritten for a tier, tagged with the shape it was recognised as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierHostName {
    pub name: String,
    pub kind: HostKind,
}

impl TierHostName {
    pub fn is_ui(&self) -> bool {
        self.kind == HostKind::Ui
    }
}

/// Classify a host label. The UI shape is tested first.
pub fn classify_label(label: &str) -> Option<HostKind> {
    if UI_SITE_LABEL.is_match(label) {
        Some(HostKind::Ui)
    } else if CMS_SITE_LABEL.is_match(label) {
        Some(HostKind::Cms)
    } else {
        None
    }
}

/// Rewrite a site host name for `tier`, keeping the shape classification.
pub fn to_tier_host(host_name: &str, tier: &str) -> Result<TierHostName> {
    let (label, rest) = match host_name.split_once('.') {
        Some((label, rest)) => (label, Some(rest)),
        None => (host_name, None),
    };

    let kind = classify_label(label).ok_or_else(|| MigrateError::FormatError {
        label: label.to_string(),
    })?;

    let mut segments: Vec<&str> = label.split('-').collect();
    match kind {
        HostKind::Ui => {
            // 無論是否已有 -<tier>-acsf 裝飾，都強制寫入第 1、2 段
            segments.resize(3, "");
            segments[1] = tier;
            segments[2] = "acsf";
        }
        HostKind::Cms => {
            segments.resize(3, "");
            segments[2] = tier;
        }
    }

    let label = segments.join("-");
    let name = match rest {
        Some(rest) => format!("{}.{}", label, rest),
        None => label,
    };

    Ok(TierHostName { name, kind })
}

/// Rewrite a site host name for `tier`.
///
/// ```
/// use acsf_migrate::core::domain_names::site_to_tier_specific;
///
/// assert_eq!(
///     site_to_tier_specific("www-cms.example.com", "test").unwrap(),
///     "www-cms-test.example.com"
/// );
/// ```
pub fn site_to_tier_specific(host_name: &str, tier: &str) -> Result<String> {
    to_tier_host(host_name, tier).map(|host| host.name)
}

/// Name of a factory's staging endpoint for `tier`, e.g.
/// `www.demo.acsitefactory.com` becomes `www.dev-demo.acsitefactory.com`.
///
/// Factory hosts follow `www.[tier-]<org>.acsitefactory.com`.
pub fn staging_target_host(factory_host: &str, tier: &str) -> Result<String> {
    let mut segments: Vec<String> = factory_host.split('.').map(str::to_string).collect();
    if segments.len() < 2 || segments[1].is_empty() {
        return Err(MigrateError::FormatError {
            label: factory_host.to_string(),
        });
    }

    segments[1] = format!("{}-{}", tier, segments[1]);
    Ok(segments.join("."))
}
