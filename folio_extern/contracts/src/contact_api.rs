use std::{collections::BTreeMap, future::Future};

use folio_models::{api::ContactApiResponse, contact::SanitizedContactRequest};
use thiserror::Error;

/// Shown for failures that carry no message meant for the user.
pub const GENERIC_SEND_ERROR: &str = "An unexpected error occurred while sending the contact form";

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactApiService: Send + Sync + 'static {
    /// Submit a contact request. Issues exactly one request, without retries.
    fn send(
        &self,
        request: SanitizedContactRequest,
    ) -> impl Future<Output = Result<ContactApiResponse, ContactApiError>> + Send;

    /// Return whether the contact API is reachable and healthy.
    fn health_check(&self) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Error)]
pub enum ContactApiError {
    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },
    /// The request did not complete (connection failure, timeout).
    #[error("{}", GENERIC_SEND_ERROR)]
    Network(anyhow::Error),
    /// The API answered with a body that could not be decoded.
    #[error("{}", GENERIC_SEND_ERROR)]
    MalformedResponse(anyhow::Error),
}

impl ContactApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

#[cfg(feature = "mock")]
impl MockContactApiService {
    pub fn with_send(
        mut self,
        request: SanitizedContactRequest,
        result: Result<ContactApiResponse, ContactApiError>,
    ) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_health_check(mut self, result: bool) -> Self {
        self.expect_health_check()
            .once()
            .with()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}
