//! Open Telekom Cloud REST client
//!
//! One authenticated `reqwest` client shared by every service module. Each
//! service (CSS, EVS, ECS, RDS, CES, IAM, DDS) lives on its own regional
//! endpoint; the builders here produce the per-service URLs and the typed
//! verbs map HTTP failures to [`OtcError`] uniformly: 404 becomes
//! `ResourceNotFound`, any other non-2xx becomes `Api` with the body text.

use crate::error::{OtcError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

const TOKEN_HEADER: &str = "X-Auth-Token";
const CLOUD_DOMAIN: &str = "otc.t-systems.com";

/// Connection settings for one project in one region
#[derive(Debug, Clone)]
pub struct OtcConfig {
    pub token: String,
    pub region: String,
    pub project_id: String,
    pub domain_id: Option<String>,
}

impl OtcConfig {
    /// Create OtcConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("OTC_TOKEN")
            .map_err(|_| OtcError::MissingEnvVar("OTC_TOKEN".to_string()))?;
        let region = std::env::var("OTC_REGION")
            .map_err(|_| OtcError::MissingEnvVar("OTC_REGION".to_string()))?;
        let project_id = std::env::var("OTC_PROJECT_ID")
            .map_err(|_| OtcError::MissingEnvVar("OTC_PROJECT_ID".to_string()))?;
        let domain_id = std::env::var("OTC_DOMAIN_ID").ok();

        Ok(Self {
            token,
            region,
            project_id,
            domain_id,
        })
    }
}

/// Authenticated API client for one project
pub struct OtcClient {
    http: reqwest::Client,
    token: String,
    region: String,
    project_id: String,
    domain_id: Option<String>,
}

impl OtcClient {
    pub fn new(config: OtcConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.token,
            region: config.region,
            project_id: config.project_id,
            domain_id: config.domain_id,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub(crate) fn domain_id(&self) -> Option<&str> {
        self.domain_id.as_deref()
    }

    fn service_url(&self, service: &str, version: &str, path: &str) -> String {
        format!(
            "https://{service}.{}.{CLOUD_DOMAIN}/{version}/{}/{path}",
            self.region, self.project_id
        )
    }

    pub(crate) fn css_url(&self, path: &str) -> String {
        self.service_url("css", "v1.0", path)
    }

    pub(crate) fn evs_url(&self, path: &str) -> String {
        self.service_url("evs", "v3", path)
    }

    // EVS job polling uses the v1 API even though volumes are v3.
    pub(crate) fn evs_job_url(&self, job_id: &str) -> String {
        self.service_url("evs", "v1", &format!("jobs/{job_id}"))
    }

    pub(crate) fn ecs_url(&self, path: &str) -> String {
        self.service_url("ecs", "v2.1", path)
    }

    pub(crate) fn rds_url(&self, path: &str) -> String {
        self.service_url("rds", "v3", path)
    }

    pub(crate) fn ces_url(&self, path: &str) -> String {
        self.service_url("ces", "V1.0", path)
    }

    pub(crate) fn dds_url(&self, path: &str) -> String {
        self.service_url("dds", "v3", path)
    }

    // Identity is domain-scoped, not project-scoped.
    pub(crate) fn iam_url(&self, path: &str) -> String {
        format!("https://iam.{}.{CLOUD_DOMAIN}/v3/{path}", self.region)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        Self::decode(url, response).await
    }

    pub(crate) async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(url, response).await
    }

    pub(crate) async fn put<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .put(url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(url, response).await
    }

    // For endpoints that answer 2xx with an empty body.
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let response = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        Self::check(url, response).await.map(|_| ())
    }

    pub(crate) async fn put_empty<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let response = self
            .http
            .put(url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        Self::check(url, response).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .http
            .delete(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;
        Self::check(url, response).await.map(|_| ())
    }

    async fn check(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OtcError::ResourceNotFound(url.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OtcError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T> {
        let response = Self::check(url, response).await?;
        Ok(response.json().await?)
    }
}
