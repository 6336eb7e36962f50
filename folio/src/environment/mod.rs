use folio_config::Config;
use folio_core_contact_impl::{ContactFeatureConfig, ContactFeatureServiceImpl};
use folio_extern_impl::{
    analytics::{AnalyticsServiceConfig, AnalyticsServiceImpl},
    contact_api::{ContactApiServiceConfig, ContactApiServiceImpl},
    http::HttpClient,
};
use types::{Analytics, ContactApi, ContactFeature};

pub mod types;

/// Builds the services, sharing one http client between them.
#[derive(Debug, Clone)]
pub struct Provider {
    config: ConfigProvider,
    http: HttpClient,
}

impl Provider {
    pub fn new(config: ConfigProvider) -> anyhow::Result<Self> {
        let http = HttpClient::new(config.http_timeout)?;
        Ok(Self { config, http })
    }

    pub fn contact_api(&self) -> ContactApi {
        ContactApiServiceImpl::new(
            self.config.contact_api_service_config.clone(),
            self.http.clone(),
        )
    }

    pub fn analytics(&self) -> Analytics {
        AnalyticsServiceImpl::new(
            self.config.analytics_service_config.clone(),
            self.http.clone(),
        )
    }

    pub fn contact_feature(&self) -> ContactFeature {
        ContactFeatureServiceImpl::new(
            self.contact_api(),
            self.analytics(),
            self.config.contact_feature_config.clone(),
        )
    }
}

/// Service configs derived from the loaded configuration.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    http_timeout: std::time::Duration,

    // Extern
    contact_api_service_config: ContactApiServiceConfig,
    analytics_service_config: Option<AnalyticsServiceConfig>,

    // Core
    contact_feature_config: ContactFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_timeout = config.contact_api.timeout.into();

        // Extern
        let contact_api_service_config =
            ContactApiServiceConfig::new(config.contact_api.base_url.clone())?;

        let analytics_service_config =
            config
                .analytics
                .as_ref()
                .map(|analytics| AnalyticsServiceConfig {
                    endpoint: analytics.endpoint.clone(),
                    website_id: analytics.website_id.clone(),
                    hostname: analytics.hostname.clone(),
                    url: analytics.url.clone(),
                    language: analytics.language.clone(),
                });

        // Core
        let contact_feature_config = ContactFeatureConfig {
            success_reset_delay: config.contact.success_reset_delay(),
        };

        Ok(Self {
            http_timeout,
            contact_api_service_config,
            analytics_service_config,
            contact_feature_config,
        })
    }
}
