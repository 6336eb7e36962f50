pub mod analytics;
pub mod contact_api;
