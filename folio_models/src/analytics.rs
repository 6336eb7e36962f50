use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Events tracked by the portfolio site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioEvent {
    NavigationClick,
    ThemeToggle,
    LocaleChange,
    ContactFormSubmit,
    ProjectView,
    DownloadCv,
    ExternalLinkClick,
}

impl PortfolioEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NavigationClick => "navigation_click",
            Self::ThemeToggle => "theme_toggle",
            Self::LocaleChange => "locale_change",
            Self::ContactFormSubmit => "contact_form_submit",
            Self::ProjectView => "project_view",
            Self::DownloadCv => "download_cv",
            Self::ExternalLinkClick => "external_link_click",
        }
    }
}

impl fmt::Display for PortfolioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<bool> for EventValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for EventValue {
    fn from(value: usize) -> Self {
        Self::Int(value.try_into().unwrap_or(i64::MAX))
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Flat key/value data attached to a tracked event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(BTreeMap<String, EventValue>);

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<EventValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
