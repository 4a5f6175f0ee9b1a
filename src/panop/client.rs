use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ApiError, TransportError};

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends one request to the management API. Implementations add the bearer
/// credential and JSON content type; they never interpret the status code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport bound to a single host and credential.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String, // e.g. "https://tower.example"
    access_key: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            access_key: config.access_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let mut req = self
            .http
            .request(method.clone(), self.url(path))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.access_key))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.body(body);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.bytes().await?.to_vec();
        debug!(%method, path, %status, bytes = body.len(), "api exchange");

        Ok(RawResponse { status, body })
    }
}

/// Run one exchange and insist on `expected`; returns the response body.
pub(crate) async fn exchange<T>(
    transport: &T,
    op: &'static str,
    method: Method,
    path: &str,
    body: Option<Vec<u8>>,
    expected: StatusCode,
) -> Result<Vec<u8>, ApiError>
where
    T: Transport + ?Sized,
{
    let res = transport
        .send(method, path, body)
        .await
        .map_err(|source| ApiError::Transport { op, source })?;

    if res.status != expected {
        return Err(ApiError::UnexpectedStatus {
            op,
            status: res.status,
            body: String::from_utf8_lossy(&res.body).into_owned(),
        });
    }
    Ok(res.body)
}

pub(crate) fn encode<B: Serialize>(op: &'static str, body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|source| ApiError::Encode { op, source })
}

pub(crate) fn decode<D: DeserializeOwned>(op: &'static str, bytes: &[u8]) -> Result<D, ApiError> {
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode { op, source })
}
