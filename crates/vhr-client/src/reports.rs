//! Typed client for the report-generation endpoints.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/api/v1/reports/generate` | Submit a VIN-analysis job |
//! | GET    | `/api/v1/reports/result/{id}` | Query job status / result |
//!
//! Every request carries JSON `Content-Type` and `Accept` headers. Bodies
//! are parsed as JSON when the response content type says so and kept as
//! raw text otherwise. The client itself never retries; submission retry
//! is the orchestrator's policy (see [`crate::retry`]).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use vhr_core::{JobId, JobStatusReport, Vin};

use crate::config::{ConfigError, ReportApiConfig};
use crate::error::ApiError;

/// Path segments shared by both endpoints.
const API_PREFIX: [&str; 3] = ["api", "v1", "reports"];

/// Request body for job submission.
#[derive(Debug, Serialize)]
pub struct GenerateReportRequest<'a> {
    pub vin: &'a str,
}

/// Response body for job submission.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReportResponse {
    pub id: JobId,
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Decode the body into `T`. Text bodies are given one chance to parse
    /// as JSON, for backends that omit the content type.
    pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, ApiError> {
        let result = match self {
            Self::Json(value) => serde_json::from_value(value),
            Self::Text(text) => serde_json::from_str(&text),
        };
        result.map_err(|e| ApiError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

/// Client for the report backend.
#[derive(Debug, Clone)]
pub struct ReportApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ReportApiClient {
    /// Create a new client from configuration.
    pub fn new(config: ReportApiConfig) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ApiError::Config(ConfigError::InvalidToken))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network {
                endpoint: "client_init".into(),
                source: Box::new(e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            timeout,
        })
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit a report-generation job for `vin`.
    ///
    /// Calls `POST {base_url}/api/v1/reports/generate`.
    pub async fn submit_job(&self, vin: &Vin) -> Result<JobId, ApiError> {
        let endpoint = "POST /api/v1/reports/generate";
        let url = self.endpoint_url(&["generate"])?;
        let body = GenerateReportRequest { vin: vin.as_str() };

        let resp: GenerateReportResponse = self
            .send(endpoint, self.http.post(url).json(&body))
            .await?
            .decode(endpoint)?;

        tracing::debug!(vin = %vin, job_id = %resp.id, "report job submitted");
        Ok(resp.id)
    }

    /// Query the status (and, once finished, the result) of a job.
    ///
    /// Calls `GET {base_url}/api/v1/reports/result/{id}`.
    pub async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusReport, ApiError> {
        let endpoint = format!("GET /api/v1/reports/result/{job_id}");
        let url = self.endpoint_url(&["result", job_id.as_str()])?;

        self.send(&endpoint, self.http.get(url))
            .await?
            .decode(&endpoint)
    }

    /// Send a request and classify the outcome.
    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<ResponseBody, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);
        let text = resp
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        if !status.is_success() {
            return Err(http_error(endpoint, status, &text));
        }

        if is_json {
            serde_json::from_str(&text)
                .map(ResponseBody::Json)
                .map_err(|e| ApiError::Deserialization {
                    endpoint: endpoint.to_string(),
                    source: e,
                })
        } else {
            Ok(ResponseBody::Text(text))
        }
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            ApiError::Network {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            }
        }
    }

    fn endpoint_url(&self, tail: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Config(ConfigError::InvalidUrl(
                    "base_url".into(),
                    "URL cannot be a base".into(),
                ))
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(tail);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl crate::ReportBackend for ReportApiClient {
    async fn submit_job(&self, vin: &Vin) -> Result<JobId, ApiError> {
        ReportApiClient::submit_job(self, vin).await
    }

    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusReport, ApiError> {
        ReportApiClient::get_job_status(self, job_id).await
    }
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Build an [`ApiError::Http`] from a non-2xx response body.
///
/// FastAPI-style bodies (`{"detail": ..., "code": ...}`) supply the message
/// and code; anything else falls back to `HTTP <status>: <reason>`.
fn http_error(endpoint: &str, status: reqwest::StatusCode, body: &str) -> ApiError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    let detail = parsed.as_ref().and_then(|v| v.get("detail")).and_then(|d| match d {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(|c| c.as_str())
        .map(str::to_string);

    let message = detail.unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    });

    ApiError::Http {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        code,
        message,
    }
}
