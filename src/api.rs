//! REST clients for the TechFinance backends.
//!
//! Two upstreams: the primary ERP API (10s timeout) and the sales-forecast
//! service (30s timeout, it runs a model per request). Bearer auth on every
//! call. Non-2xx responses are drained for their body text and logged here,
//! the only layer that sees raw statuses. No retries at this layer: a failed
//! call surfaces to the caller and the front-end offers a manual retry.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::Config;

/// Errors from the REST layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// HTTP client pair for the primary and forecast APIs.
pub struct ApiClient {
    http: reqwest::Client,
    forecast_http: reqwest::Client,
    base: Url,
    forecast_base: Url,
    token: String,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()?;
        let forecast_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.forecast_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            forecast_http,
            base: parse_base(&config.api_base_url)?,
            forecast_base: parse_base(&config.forecast_base_url)?,
            token: config.api_token.clone(),
        })
    }

    /// GET from the primary API and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = endpoint(&self.base, path)?;
        let mut request = self.http.get(url).bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let body = read_body(path, request.send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET from the primary API as a raw `serde_json::Value`.
    ///
    /// Used for endpoints whose shape is too loose for a typed row, like the
    /// receivables aging summary.
    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        self.get_json(path, &[]).await
    }

    /// POST a JSON body to the primary API and decode the response into `T`.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = endpoint(&self.base, path)?;
        let request = self.http.post(url).bearer_auth(&self.token).json(body);

        let body = read_body(path, request.send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST to the forecast API. Parameters travel in the query string; the
    /// body is empty, which is what the service expects.
    pub async fn post_forecast<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = endpoint(&self.forecast_base, path)?;
        let mut request = self.forecast_http.post(url).bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let body = read_body(path, request.send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Parse a base URL and guarantee a trailing slash so `Url::join` treats the
/// final segment as a directory.
fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

fn endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Check the status and drain the body. Non-2xx becomes `ApiError::Status`
/// after logging, mirroring what the response layer should surface for each
/// class of failure.
async fn read_body(path: &str, response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => log::error!("Unauthorized (401) on {path}"),
            404 => log::error!("Resource not found (404) on {path}"),
            code if code >= 500 => log::error!("Server error ({code}) on {path}: {body}"),
            code => log::warn!("API error ({code}) on {path}: {body}"),
        }
        return Err(ApiError::Status { status, body });
    }

    Ok(response.text().await?)
}
