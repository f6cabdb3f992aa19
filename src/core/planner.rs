use crate::core::domain_names::{to_tier_host, TierHostName};
use crate::domain::model::{DestinationAssignment, SiteDomainRecord};
use crate::utils::error::Result;

/// Build the destination-tier domain assignment for one site.
///
/// Custom domains are rewritten in order. The first becomes primary; a later
/// name that normalizes to the same destination is dropped. UI names hold the
/// primary slot: while the primary is a UI name, later names go to secondary,
/// otherwise the newcomer takes over and the old primary moves to secondary.
/// Only `custom_domains` is consulted.
pub fn plan(record: &SiteDomainRecord, tier: &str) -> Result<DestinationAssignment> {
    let mut primary: Option<TierHostName> = None;
    let mut secondary: Vec<String> = Vec::new();

    for original in record.custom_domains() {
        let candidate = to_tier_host(original, tier)?;

        let Some(current) = primary.as_ref() else {
            primary = Some(candidate);
            continue;
        };

        // www.example.com 與 www-<tier>-acsf.example.com 是同一個站
        if current.name == candidate.name {
            continue;
        }

        if current.is_ui() {
            push_unique(&mut secondary, candidate.name);
        } else if let Some(previous) = primary.replace(candidate) {
            push_unique(&mut secondary, previous.name);
        }
    }

    let primary = primary.map(|host| host.name);
    // 被擠下的舊 primary 可能和新的 primary 同名
    if let Some(name) = &primary {
        secondary.retain(|d| d != name);
    }

    Ok(DestinationAssignment {
        site_id: record.site_id,
        primary,
        secondary,
    })
}

/// Plan every record; the first host name that cannot be mapped aborts the whole plan.
pub fn plan_all(records: &[SiteDomainRecord], tier: &str) -> Result<Vec<DestinationAssignment>> {
    records.iter().map(|record| plan(record, tier)).collect()
}

fn push_unique(list: &mut Vec<String>, name: String) {
    if !list.contains(&name) {
        list.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MigrateError;

    fn record(custom_domains: &[&str]) -> SiteDomainRecord {
        SiteDomainRecord::new(
            123,
            vec!["site1.example.acsitefactory.com".to_string()],
            custom_domains.iter().map(|d| d.to_string()).collect(),
        )
    }

    #[test]
    fn test_sets_site_id_with_no_domains() {
        let actual = plan(&record(&[]), "test").unwrap();
        assert_eq!(
            actual,
            DestinationAssignment {
                site_id: 123,
                primary: None,
                secondary: vec![],
            }
        );
    }

    #[test]
    fn test_single_domain() {
        let actual = plan(&record(&["site1.example.com"]), "test").unwrap();
        assert_eq!(actual.primary.as_deref(), Some("site1-test-acsf.example.com"));
        assert!(actual.secondary.is_empty());
    }

    #[test]
    fn test_equivalent_ui_domains_collapse() {
        let actual = plan(
            &record(&["site1.example.com", "site1-prod-acsf.example.com"]),
            "test",
        )
        .unwrap();
        assert_eq!(actual.primary.as_deref(), Some("site1-test-acsf.example.com"));
        assert!(actual.secondary.is_empty());
    }

    #[test]
    fn test_ui_wins_primary_in_either_order() {
        let expected = DestinationAssignment {
            site_id: 123,
            primary: Some("site1-test-acsf.example.com".to_string()),
            secondary: vec!["site1-cms-test.example.com".to_string()],
        };

        let ui_first = plan(&record(&["site1.example.com", "site1-cms.example.com"]), "test");
        let cms_first = plan(&record(&["site1-cms.example.com", "site1.example.com"]), "test");

        assert_eq!(ui_first.unwrap(), expected);
        assert_eq!(cms_first.unwrap(), expected);
    }

    #[test]
    fn test_secondary_is_deduplicated() {
        let actual = plan(
            &record(&[
                "site1.example.com",
                "other.example.com",
                "other-prod-acsf.example.com",
                "site1-cms.example.com",
                "site1-cms-prod.example.com",
            ]),
            "dev",
        )
        .unwrap();

        assert_eq!(actual.primary.as_deref(), Some("site1-dev-acsf.example.com"));
        assert_eq!(
            actual.secondary,
            vec![
                "other-dev-acsf.example.com".to_string(),
                "site1-cms-dev.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_cms_primary_yields_to_later_cms() {
        let actual = plan(
            &record(&["site1-cms.example.com", "site2-cms.example.com"]),
            "test",
        )
        .unwrap();
        assert_eq!(actual.primary.as_deref(), Some("site2-cms-test.example.com"));
        assert_eq!(actual.secondary, vec!["site1-cms-test.example.com".to_string()]);
    }

    #[test]
    fn test_secondary_never_contains_primary() {
        let actual = plan(
            &record(&[
                "site1-cms.example.com",
                "site2-cms.example.com",
                "site1-cms-prod.example.com",
            ]),
            "test",
        )
        .unwrap();
        let primary = actual.primary.unwrap();
        assert_eq!(primary, "site1-cms-test.example.com");
        assert!(!actual.secondary.contains(&primary));
        assert_eq!(actual.secondary, vec!["site2-cms-test.example.com".to_string()]);
    }

    #[test]
    fn test_bad_domain_aborts_plan_all() {
        let records = vec![
            record(&["site1.example.com"]),
            record(&["www-.example.com"]),
        ];
        assert!(matches!(
            plan_all(&records, "dev"),
            Err(MigrateError::FormatError { .. })
        ));
    }
}
