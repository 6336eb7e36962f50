use std::future::Future;

use folio_extern_contracts::contact_api::ContactApiError;
use folio_models::{
    api::ContactApiResponse,
    form::{ContactFormView, FormField},
    validation::ContactValidationError,
};
use thiserror::Error;
use tokio::sync::watch;

/// Drives the contact form: validation, sanitization, transport and the
/// submission state a front-end renders.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Return a snapshot of the contact form.
    fn view(&self) -> ContactFormView;

    /// Subscribe to changes of the contact form.
    fn subscribe(&self) -> watch::Receiver<ContactFormView>;

    /// Update the raw value of a form input.
    fn set_field(&self, field: FormField, value: String);

    /// Validate, sanitize and send the current form.
    ///
    /// Validation errors are stored per field and leave the submission state
    /// untouched. Transport errors are stored as the submission error.
    fn submit(
        &self,
    ) -> impl Future<Output = Result<ContactApiResponse, ContactSubmitError>> + Send;

    /// Return to the idle state, cancelling a pending submission.
    fn reset(&self);

    /// Return whether the contact API is reachable.
    fn health_check(&self) -> impl Future<Output = bool> + Send;

    /// Wait until every analytics event tracked so far has been delivered.
    fn flush(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error(transparent)]
    Validation(#[from] ContactValidationError),
    #[error("A submission is already in progress.")]
    InProgress,
    #[error("The submission has been cancelled.")]
    Cancelled,
    #[error(transparent)]
    Transport(#[from] ContactApiError),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_set_field(mut self, field: FormField, value: String) -> Self {
        self.expect_set_field()
            .once()
            .with(mockall::predicate::eq(field), mockall::predicate::eq(value))
            .return_const(());
        self
    }

    pub fn with_submit(mut self, result: Result<ContactApiResponse, ContactSubmitError>) -> Self {
        self.expect_submit()
            .once()
            .with()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_view(mut self, view: ContactFormView) -> Self {
        self.expect_view().once().with().return_once(move || view);
        self
    }

    pub fn with_flush(mut self) -> Self {
        self.expect_flush()
            .once()
            .with()
            .return_once(|| Box::pin(std::future::ready(())));
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
