use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Site Factory 可以 stage 到的環境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Dev,
    Test,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Dev => "dev",
            Tier::Test => "test",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Tier::Dev),
            "test" => Ok(Tier::Test),
            _ => Err(format!("Unknown tier '{}'. Expected one of: dev, test", s)),
        }
    }
}

/// Entry from the sites list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub id: u64,
    pub site: String,
}

/// Response body of any call that starts a WIP task (stage, backup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRef {
    #[serde(deserialize_with = "id_as_string")]
    pub task_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainLists {
    #[serde(default)]
    pub protected_domains: Vec<String>,
    #[serde(default)]
    pub custom_domains: Vec<String>,
}

/// Domains mapped to one site, as returned by `GET /domains/{id}`.
///
/// `custom_domains` keeps the platform's order; the first entry seen has
/// precedence when planning the destination primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDomainRecord {
    #[serde(rename = "node_id")]
    pub site_id: u64,
    #[serde(default)]
    pub domains: DomainLists,
}

impl SiteDomainRecord {
    pub fn new(site_id: u64, protected_domains: Vec<String>, custom_domains: Vec<String>) -> Self {
        Self {
            site_id,
            domains: DomainLists {
                protected_domains,
                custom_domains,
            },
        }
    }

    pub fn custom_domains(&self) -> &[String] {
        &self.domains.custom_domains
    }

    pub fn protected_domains(&self) -> &[String] {
        &self.domains.protected_domains
    }
}

/// Domain set to apply to one site on the destination tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationAssignment {
    pub site_id: u64,
    pub primary: Option<String>,
    pub secondary: Vec<String>,
}

/// Snapshot of a WIP task.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTask {
    pub task_id: String,
    pub name: String,
    pub completed: bool,
    pub status_string: String,
    pub error_message: Option<String>,
}

impl RemoteTask {
    /// 只有 "Completed" 算成功；"status" 欄位的值不保證穩定
    pub fn succeeded(&self) -> bool {
        self.status_string == "Completed"
    }
}

#[derive(Debug, Deserialize)]
struct WipTaskEnvelope {
    wip_task: WipTask,
}

#[derive(Debug, Deserialize)]
struct WipTask {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(deserialize_with = "flag_as_bool")]
    completed: bool,
    #[serde(default)]
    status_string: String,
    #[serde(default)]
    error_message: Option<String>,
}

impl<'de> Deserialize<'de> for RemoteTask {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let envelope = WipTaskEnvelope::deserialize(deserializer)?;
        let task = envelope.wip_task;
        Ok(RemoteTask {
            task_id: task.id,
            name: task.name,
            completed: task.completed,
            status_string: task.status_string,
            error_message: task.error_message.filter(|m| !m.is_empty()),
        })
    }
}

/// Factory user, as returned by the users endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_as_string")]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tfa_status: Option<String>,
    /// role id -> role name; the id carries no meaning for filtering
    #[serde(default, deserialize_with = "roles_map")]
    pub roles: BTreeMap<String, String>,
}

impl User {
    pub fn role_names(&self) -> HashSet<&str> {
        self.roles.values().map(String::as_str).collect()
    }
}

// 平台對 ID 有時回傳數字、有時回傳字串
fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

// 沒有角色時 PHP 會回傳 [] 而不是 {}
fn roles_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(id, name)| name.as_str().map(|n| (id, n.to_string())))
            .collect()),
        serde_json::Value::Array(names) => Ok(names
            .into_iter()
            .enumerate()
            .filter_map(|(i, name)| name.as_str().map(|n| (i.to_string(), n.to_string())))
            .collect()),
        serde_json::Value::Null => Ok(BTreeMap::new()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected roles value {}",
            other
        ))),
    }
}

// completed 可能是 0/1、"0"/"1"、或 bool
fn flag_as_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().map(|v| v != 0.0).unwrap_or(false)),
        serde_json::Value::String(s) => Ok(s.trim().parse::<f64>().map(|v| v != 0.0).unwrap_or(false)),
        serde_json::Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "unexpected completion flag {}",
            other
        ))),
    }
}
