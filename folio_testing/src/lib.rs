pub mod contact_api;
pub mod umami;
