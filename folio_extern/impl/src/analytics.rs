use std::sync::Arc;

use anyhow::Context;
use folio_extern_contracts::analytics::AnalyticsService;
use folio_models::analytics::{EventData, PortfolioEvent};
use serde::Serialize;
use tracing::{debug, trace, warn};
use url::Url;

use crate::http::HttpClient;

/// Analytics client for an Umami collector.
///
/// Without a config every event is dropped, the same as if the tracking
/// script never loaded on the site.
#[derive(Debug, Clone)]
pub struct AnalyticsServiceImpl {
    config: Option<Arc<AnalyticsServiceConfig>>,
    http: HttpClient,
}

#[derive(Debug, Clone)]
pub struct AnalyticsServiceConfig {
    pub endpoint: Url,
    pub website_id: String,
    pub hostname: String,
    pub url: String,
    pub language: Option<String>,
}

impl AnalyticsServiceImpl {
    pub fn new(config: Option<AnalyticsServiceConfig>, http: HttpClient) -> Self {
        Self {
            config: config.map(Arc::new),
            http,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn collect(
        &self,
        config: &AnalyticsServiceConfig,
        event: PortfolioEvent,
        data: &EventData,
    ) -> anyhow::Result<()> {
        let request = CollectRequest {
            kind: "event",
            payload: CollectPayload {
                website: &config.website_id,
                hostname: &config.hostname,
                url: &config.url,
                name: event.as_str(),
                data,
                language: config.language.as_deref(),
            },
        };

        self.http
            .post(config.endpoint.clone())
            .json(&request)
            .send()
            .await
            .context("Failed to send analytics event")?
            .error_for_status()
            .context("Analytics collector returned an error")?;

        Ok(())
    }
}

impl AnalyticsService for AnalyticsServiceImpl {
    async fn track_event(&self, event: PortfolioEvent, data: EventData) {
        let Some(config) = &self.config else {
            trace!(%event, "Analytics disabled, dropping event");
            return;
        };

        match self.collect(config, event, &data).await {
            Ok(()) => debug!(%event, "Tracked analytics event"),
            Err(err) => warn!(%event, "Failed to track analytics event: {err:#}"),
        }
    }
}

#[derive(Serialize)]
struct CollectRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: CollectPayload<'a>,
}

#[derive(Serialize)]
struct CollectPayload<'a> {
    website: &'a str,
    hostname: &'a str,
    url: &'a str,
    name: &'a str,
    data: &'a EventData,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}
