use crate::config::toml_config::FactoryCredentials;
use crate::core::{
    DestinationConnector, DomainRegistry, RemoteTask, Result, SiteDirectory, SiteDomainRecord,
    SiteInfo, StageRequest, StagingService, TaskRef, TaskTracker, User, UserDirectory,
};
use crate::utils::error::MigrateError;
use crate::utils::validation::{validate_host_name, validate_non_empty_string, validate_url};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

const USER_FIELDS: &str = "uid,name,mail,created,access,status,roles,tfa_status";

#[derive(Debug, Deserialize)]
struct SitePage {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    sites: Vec<SiteInfo>,
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    users: Vec<User>,
}

/// REST client for one Site Factory (v1 and v2 APIs, HTTP basic auth).
#[derive(Clone)]
pub struct SiteFactoryClient {
    client: Client,
    base_url: String,
    username: String,
    apikey: String,
    page_limit: usize,
}

impl std::fmt::Debug for SiteFactoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteFactoryClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SiteFactoryClient {
    pub fn new(credentials: &FactoryCredentials) -> Result<Self> {
        Self::with_client(Client::new(), credentials)
    }

    pub fn with_client(client: Client, credentials: &FactoryCredentials) -> Result<Self> {
        validate_non_empty_string("factory.username", &credentials.username)?;
        validate_non_empty_string("factory.apikey", &credentials.apikey)?;
        validate_host_name("factory.factory_host", &credentials.factory_host)?;
        validate_url("factory.base_url", &credentials.base_url)?;

        Ok(Self {
            client,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            username: credentials.username.clone(),
            apikey: credentials.apikey.clone(),
            page_limit: credentials.page_limit.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, version: &str, path: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, version, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.apikey))
    }

    async fn send<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;
        let response = Self::check(operation, response).await?;
        Ok(response.json().await?)
    }

    async fn check(operation: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("{} -> {}", operation, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(MigrateError::RemoteOperationError {
            operation: operation.to_string(),
            status: status.as_u16(),
            message: extract_message(&body),
        })
    }
}

// 平台錯誤通常是 {"message": "..."}，否則原樣回傳
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl SiteDirectory for SiteFactoryClient {
    async fn list_sites(&self) -> Result<Vec<SiteInfo>> {
        let mut sites = Vec::new();
        let mut page = 1usize;
        loop {
            let request = self.client.get(self.url("v1", "sites")).query(&[
                ("limit", self.page_limit.to_string()),
                ("page", page.to_string()),
            ]);
            let batch: SitePage = self.send("list sites", request).await?;
            let fetched = batch.sites.len();
            sites.extend(batch.sites);

            if fetched == 0 || batch.count <= page * self.page_limit {
                break;
            }
            page += 1;
        }
        tracing::debug!("Fetched {} sites in {} pages", sites.len(), page);
        Ok(sites)
    }

    async fn create_backup(&self, site_id: u64, label: &str) -> Result<TaskRef> {
        let request = self
            .client
            .post(self.url("v1", &format!("sites/{}/backup", site_id)))
            .json(&serde_json::json!({ "label": label }));
        self.send(&format!("create backup of site {}", site_id), request)
            .await
    }
}

#[async_trait]
impl TaskTracker for SiteFactoryClient {
    async fn task_status(&self, task_id: &str) -> Result<RemoteTask> {
        let request = self
            .client
            .get(self.url("v1", &format!("wip/task/{}/status", task_id)));
        self.send(&format!("status of task {}", task_id), request)
            .await
    }
}

#[async_trait]
impl DomainRegistry for SiteFactoryClient {
    async fn get_domains(&self, site_id: u64) -> Result<SiteDomainRecord> {
        let request = self
            .client
            .get(self.url("v1", &format!("domains/{}", site_id)));
        self.send(&format!("get domains of site {}", site_id), request)
            .await
    }

    async fn add_domain(&self, site_id: u64, domain_name: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("v1", &format!("domains/{}/add", site_id)))
            .json(&serde_json::json!({ "domain_name": domain_name }));
        let response = self.authorized(request).send().await?;
        Self::check(&format!("add domain {} to site {}", domain_name, site_id), response).await?;
        Ok(())
    }
}

#[async_trait]
impl StagingService for SiteFactoryClient {
    async fn stage(&self, request: &StageRequest) -> Result<TaskRef> {
        let http = self.client.post(self.url("v2", "stage")).json(request);
        self.send(&format!("stage to {}", request.to_env), http)
            .await
    }
}

#[async_trait]
impl UserDirectory for SiteFactoryClient {
    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = Vec::new();
        let mut page = 1usize;
        loop {
            let request = self.client.get(self.url("v1", "users")).query(&[
                ("limit", self.page_limit.to_string()),
                ("fields", USER_FIELDS.to_string()),
                ("page", page.to_string()),
            ]);
            let batch: UserPage = self.send("list users", request).await?;
            let fetched = batch.users.len();
            users.extend(batch.users);

            if fetched == 0 || batch.count <= page * self.page_limit {
                break;
            }
            page += 1;
        }
        Ok(users)
    }
}

/// Opens clients for other endpoints of the same factory, reusing the
/// credentials and connection pool of the source client.
pub struct SiteFactoryConnector {
    client: Client,
    credentials: FactoryCredentials,
}

impl SiteFactoryConnector {
    pub fn new(client: Client, credentials: FactoryCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl DestinationConnector for SiteFactoryConnector {
    fn connect(&self, factory_host: &str) -> Result<Arc<dyn DomainRegistry>> {
        let credentials = FactoryCredentials {
            factory_host: factory_host.to_string(),
            base_url: format!("https://{}", factory_host),
            ..self.credentials.clone()
        };
        let client = SiteFactoryClient::with_client(self.client.clone(), &credentials)?;
        tracing::debug!("Connected to destination {}", client.base_url());
        Ok(Arc::new(client))
    }
}
