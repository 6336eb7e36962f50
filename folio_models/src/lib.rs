//! Domain types of the contact submission pipeline.

pub mod analytics;
pub mod api;
pub mod contact;
pub mod form;
mod macros;
pub mod validation;
