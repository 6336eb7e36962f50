use std::sync::Arc;

use anyhow::Context;
use folio_extern_contracts::contact_api::{ContactApiError, ContactApiService};
use folio_models::{
    api::{ContactApiErrorResponse, ContactApiResponse},
    contact::SanitizedContactRequest,
};
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct ContactApiServiceImpl {
    config: ContactApiServiceConfig,
    http: HttpClient,
}

#[derive(Debug, Clone)]
pub struct ContactApiServiceConfig {
    submit_endpoint: Arc<Url>,
    health_endpoint: Arc<Url>,
}

impl ContactApiServiceConfig {
    pub fn new(mut base_url: Url) -> anyhow::Result<Self> {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self {
            submit_endpoint: base_url
                .join("api/contact")
                .context("Failed to build contact endpoint URL")?
                .into(),
            health_endpoint: base_url
                .join("health")
                .context("Failed to build health endpoint URL")?
                .into(),
        })
    }

    pub fn submit_endpoint(&self) -> &Url {
        &self.submit_endpoint
    }
}

impl ContactApiServiceImpl {
    pub fn new(config: ContactApiServiceConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

impl ContactApiService for ContactApiServiceImpl {
    #[instrument(skip_all, fields(endpoint = %self.config.submit_endpoint))]
    async fn send(
        &self,
        request: SanitizedContactRequest,
    ) -> Result<ContactApiResponse, ContactApiError> {
        let response = self
            .http
            .post((*self.config.submit_endpoint).clone())
            .json(&request)
            .send()
            .await
            .context("Failed to send contact request")
            .map_err(ContactApiError::Network)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read contact response")
            .map_err(ContactApiError::Network)?;

        if !status.is_success() {
            let response = serde_json::from_slice::<ContactApiErrorResponse>(&body)
                .context("Failed to deserialize contact error response")
                .map_err(ContactApiError::MalformedResponse)?;
            let message = response
                .message
                .filter(|x| !x.trim().is_empty())
                .unwrap_or_else(|| status_message(status));

            warn!(%status, %message, "Contact request was rejected");
            return Err(ContactApiError::Rejected {
                status: status.as_u16(),
                message,
                errors: response.errors.unwrap_or_default(),
            });
        }

        debug!(%status, "Contact request accepted");
        serde_json::from_slice::<ContactApiResponse>(&body)
            .context("Failed to deserialize contact response")
            .map_err(ContactApiError::MalformedResponse)
    }

    #[instrument(skip_all, fields(endpoint = %self.config.health_endpoint))]
    async fn health_check(&self) -> bool {
        let result = self
            .http
            .get((*self.config.health_endpoint).clone())
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "Contact API is unhealthy");
                false
            }
        }
    }
}

fn status_message(status: StatusCode) -> String {
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
}
