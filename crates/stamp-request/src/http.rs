//! reqwest-backed stamping backend

use crate::{
    ApiResponse, ContractSealRequest, ContractSealResponse, PerforationSealRequest, RequestError,
    Result, StampingBackend,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for stamping requests
const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        RequestError::Transport(err.to_string())
    }
}

/// Stamping backend reached over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn contract_url(&self, contract_id: i64, suffix: &str) -> String {
        format!("{}/api/contracts/{contract_id}/{suffix}", self.base_url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<ApiResponse<ContractSealResponse>> {
        debug!(url, "POST");
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl StampingBackend for HttpBackend {
    async fn seal_contract(
        &self,
        contract_id: i64,
        request: &ContractSealRequest,
    ) -> Result<ApiResponse<ContractSealResponse>> {
        self.post(&self.contract_url(contract_id, "seal"), request)
            .await
    }

    async fn seal_perforation(
        &self,
        contract_id: i64,
        request: &PerforationSealRequest,
    ) -> Result<ApiResponse<ContractSealResponse>> {
        self.post(&self.contract_url(contract_id, "seal/perforation"), request)
            .await
    }
}
