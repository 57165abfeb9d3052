use std::time::Duration;

use funeral_core_service::config::ErpConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ErpError;

pub const API_KEY_HEADER: &str = "X-Api-Key";

/// HTTP client for the ERP REST API.
#[derive(Debug, Clone)]
pub struct ErpHttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ErpHttpClient {
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ErpError::InvalidBaseUrl(config.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Document ids become path segments and must not alter the route.
    pub(crate) fn segment<'a>(&self, id: &'a str) -> Result<&'a str, ErpError> {
        if id.is_empty() || id.contains(['/', '?', '#', '%']) || id.chars().any(char::is_whitespace) {
            return Err(ErpError::InvalidId(id.to_string()));
        }
        Ok(id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, ErpError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        Err(ErpError::Api { status, message })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ErpError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "ERP GET");
        let response = self.authorize(self.client.get(&url)).send().await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ErpError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "ERP POST");
        let response = self.authorize(self.client.post(&url)).json(body).send().await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    /// POST whose response body is ignored.
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ErpError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "ERP POST");
        let response = self.authorize(self.client.post(&url)).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ErpConfig {
        ErpConfig {
            base_url: base_url.to_string(),
            api_key: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = ErpHttpClient::new(&config("https://erp.example.com/")).unwrap();
        assert_eq!(client.base_url(), "https://erp.example.com");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        assert!(matches!(
            ErpHttpClient::new(&config("erp.example.com")),
            Err(ErpError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_segment_validation() {
        let client = ErpHttpClient::new(&config("http://localhost")).unwrap();
        assert_eq!(client.segment("PO-100").unwrap(), "PO-100");
        assert!(client.segment("").is_err());
        assert!(client.segment("../admin").is_err());
        assert!(client.segment("PO 1").is_err());
        assert!(client.segment("a?b=c").is_err());
    }
}
