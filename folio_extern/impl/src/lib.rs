pub mod analytics;
pub mod contact_api;
pub mod http;
