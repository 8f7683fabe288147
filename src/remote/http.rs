//! reqwest-backed collection client for the CRM REST API.
//!
//! One [`HttpClient`] serves every entity kind. Routes are
//! `{api_url}/{collection}` and `{api_url}/{collection}/{id}`; the bearer
//! token is read from the injected [`Credentials`] on each request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::config::Config;
use crate::entity::Entity;
use crate::error::{LeadflowError, Result};

use super::analytics::{DashboardStats, LeadAnalytics, PropertyAnalytics};
use super::error::{classify_status, decode_error, extract_detail, transport_error};
use super::{CollectionClient, Fields, ListPage, ListQuery, Operation};

const DASHBOARD_FALLBACK: &str = "Failed to fetch dashboard stats";
const LEAD_ANALYTICS_FALLBACK: &str = "Failed to fetch lead analytics";
const PROPERTY_ANALYTICS_FALLBACK: &str = "Failed to fetch property analytics";

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a client for `base_url`. `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, credentials: Credentials, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(LeadflowError::Config(format!(
                "api_url '{}' cannot be used as a base URL",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LeadflowError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self> {
        Self::new(&config.api_url(), credentials, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LeadflowError::Config(format!("invalid api_url '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach credentials, send once, and turn non-success statuses into
    /// classified errors.
    async fn execute(&self, request: RequestBuilder, fallback: String) -> Result<Response> {
        let request = match self.credentials.authorization() {
            Some(header) => request.header(AUTHORIZATION, header.as_header_value()?),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, fallback.clone()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify_status(status, extract_detail(&body), fallback);
        tracing::warn!(status = status.as_u16(), error = %error, "request rejected");
        Err(error)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, fallback: String) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&e, fallback.clone()))?;
        serde_json::from_slice(&bytes).map_err(|e| decode_error(&e, fallback))
    }

    async fn analytics<T: DeserializeOwned>(&self, report: &str, fallback: &str) -> Result<T> {
        let url = self.endpoint(&["analytics", report])?;
        debug!(%url, "fetching analytics");
        let response = self
            .execute(self.client.get(url), fallback.to_string())
            .await?;
        Self::read_json(response, fallback.to_string()).await
    }

    /// `GET /analytics/dashboard`
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.analytics("dashboard", DASHBOARD_FALLBACK).await
    }

    /// `GET /analytics/leads`
    pub async fn lead_analytics(&self) -> Result<LeadAnalytics> {
        self.analytics("leads", LEAD_ANALYTICS_FALLBACK).await
    }

    /// `GET /analytics/properties`
    pub async fn property_analytics(&self) -> Result<PropertyAnalytics> {
        self.analytics("properties", PROPERTY_ANALYTICS_FALLBACK).await
    }
}

#[async_trait]
impl<E: Entity> CollectionClient<E> for HttpClient {
    async fn list(&self, query: &ListQuery) -> Result<ListPage<E>> {
        let kind = E::KIND;
        let fallback = Operation::List.fallback_message(kind);
        let url = self.endpoint(&[kind.collection()])?;
        debug!(%kind, page = query.page, limit = query.limit, "listing collection");

        let request = self.client.get(url).query(&query.to_pairs(kind));
        let response = self.execute(request, fallback.clone()).await?;
        let body = Self::read_json(response, fallback.clone()).await?;
        let page = ListPage::from_response(body).map_err(|e| decode_error(&e, fallback))?;

        debug!(%kind, items = page.items.len(), total = page.total, "list resolved");
        Ok(page)
    }

    async fn create(&self, fields: &Fields) -> Result<E> {
        let kind = E::KIND;
        let fallback = Operation::Create.fallback_message(kind);
        let url = self.endpoint(&[kind.collection()])?;
        debug!(%kind, "creating record");

        let response = self
            .execute(self.client.post(url).json(fields), fallback.clone())
            .await?;
        Self::read_json(response, fallback).await
    }

    async fn update(&self, id: &str, fields: &Fields) -> Result<E> {
        let kind = E::KIND;
        let fallback = Operation::Update.fallback_message(kind);
        let url = self.endpoint(&[kind.collection(), id])?;
        debug!(%kind, id, "updating record");

        let response = self
            .execute(self.client.put(url).json(fields), fallback.clone())
            .await?;
        Self::read_json(response, fallback).await
    }

    async fn delete(&self, id: &str) -> Result<String> {
        let kind = E::KIND;
        let fallback = Operation::Delete.fallback_message(kind);
        let url = self.endpoint(&[kind.collection(), id])?;
        debug!(%kind, id, "deleting record");

        self.execute(self.client.delete(url), fallback).await?;
        Ok(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = HttpClient::new("http://localhost:8000/api", Credentials::new(), None).unwrap();
        let url = client.endpoint(&["leads"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/leads");

        let client = HttpClient::new("http://localhost:8000/api/", Credentials::new(), None).unwrap();
        let url = client.endpoint(&["tasks", "t-1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/tasks/t-1");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = HttpClient::new("http://localhost:8000/api", Credentials::new(), None).unwrap();
        let url = client.endpoint(&["leads", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/leads/a%2Fb%20c");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpClient::new("not a url", Credentials::new(), None).is_err());
        assert!(matches!(
            HttpClient::new("mailto:someone@example.com", Credentials::new(), None),
            Err(LeadflowError::Config(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let client = HttpClient::new(
            "http://localhost:8000/api",
            Credentials::with_token("secret-token"),
            None,
        )
        .unwrap();
        assert!(!format!("{:?}", client).contains("secret-token"));
    }
}
