use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use qconnect_config::ServerConfig;
use qconnect_core::RawResponse;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

const FHIR_JSON: &str = "application/fhir+json";

/// Search access to one remote FHIR server
#[async_trait]
pub trait FhirSearch: Send + Sync {
    /// Issue one relative search path, e.g. `/Patient?family=Doe`.
    ///
    /// Any HTTP status is a successful fetch; only transport failures error.
    async fn fetch(&self, path: &str) -> Result<RawResponse>;

    /// Issue all paths concurrently and return results in input order.
    ///
    /// Every request runs to completion; one failure does not cancel others.
    async fn fetch_batch(&self, paths: &[String]) -> Vec<Result<RawResponse>> {
        join_all(paths.iter().map(|path| self.fetch(path))).await
    }
}

pub struct RemoteServerClient {
    http: reqwest::Client,
    base_url: String,
    server_id: String,
}

impl RemoteServerClient {
    /// Build a client for `server`, using `default_timeout` when the server
    /// sets no request timeout of its own.
    pub fn new(server: &ServerConfig, default_timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(&server.base_address)
            .map_err(|e| ClientError::invalid_base_address(&server.base_address, e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::invalid_base_address(
                &server.base_address,
                "scheme must be http or https",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        for (name, value) in &server.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::invalid_header(name, e.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::invalid_header(name, e.to_string()))?;
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(server.request_timeout(default_timeout));
        if server.trust_self_signed {
            warn!(server = %server.id, "certificate validation disabled for this server");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: server.base_address.trim_end_matches('/').to_string(),
            server_id: server.id.clone(),
        })
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl FhirSearch for RemoteServerClient {
    async fn fetch(&self, path: &str) -> Result<RawResponse> {
        let url = self.url(path);
        debug!(server = %self.server_id, path, "issuing FHIR search");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::from_request(path, e))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::from_request(path, e))?;

        debug!(server = %self.server_id, path, status, bytes = body.len(), "FHIR search completed");
        Ok(RawResponse::new(path, status, body))
    }
}
