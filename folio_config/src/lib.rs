use std::path::Path;

use anyhow::Context;
use config::{File, FileFormat};
use serde::Deserialize;
use url::Url;

pub use self::duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

pub fn load(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub contact_api: ContactApiConfig,
    pub contact: ContactConfig,
    pub analytics: Option<AnalyticsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ContactApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Zero disables the automatic reset after a successful submission.
    pub success_reset_delay: Duration,
}

impl ContactConfig {
    pub fn success_reset_delay(&self) -> Option<std::time::Duration> {
        Some(*self.success_reset_delay).filter(|x| !x.is_zero())
    }
}

/// Umami collector settings. Tracking is disabled if this section is absent.
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    pub endpoint: Url,
    pub website_id: String,
    pub hostname: String,
    #[serde(default = "default_analytics_url")]
    pub url: String,
    #[serde(default)]
    pub language: Option<String>,
}

fn default_analytics_url() -> String {
    "/contact".into()
}
