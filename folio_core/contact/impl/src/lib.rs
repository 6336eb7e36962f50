use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_extern_contracts::{
    analytics::AnalyticsService,
    contact_api::{ContactApiError, ContactApiService},
};
use folio_models::{
    analytics::{EventData, PortfolioEvent},
    api::ContactApiResponse,
    contact::SanitizedContactRequest,
    form::{ContactFormView, FieldErrors, FormField, SubmissionState},
    validation::validate,
};
use tokio::sync::watch;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<ContactApi, Analytics> {
    contact_api: ContactApi,
    analytics: Analytics,
    config: ContactFeatureConfig,
    hooks: ContactFormHooks,
    state: Arc<State>,
    events: TaskTracker,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Delay after a successful submission until the form is cleared.
    /// `None` keeps the success state until the next reset.
    pub success_reset_delay: Option<Duration>,
}

impl Default for ContactFeatureConfig {
    fn default() -> Self {
        Self {
            success_reset_delay: Some(Duration::from_secs(3)),
        }
    }
}

type SuccessHook = dyn Fn(&ContactApiResponse) + Send + Sync;
type ErrorHook = dyn Fn(&ContactApiError) + Send + Sync;

/// Callbacks invoked after a submission has completed.
#[derive(Clone, Default)]
pub struct ContactFormHooks {
    on_success: Option<Arc<SuccessHook>>,
    on_error: Option<Arc<ErrorHook>>,
}

impl ContactFormHooks {
    pub fn on_success(
        mut self,
        hook: impl Fn(&ContactApiResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&ContactApiError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for ContactFormHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactFormHooks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct State {
    view: watch::Sender<ContactFormView>,
    inflight: Mutex<Inflight>,
}

/// Bookkeeping of the current submission attempt. The generation is bumped
/// by every new attempt and every reset, so outcomes of older attempts can
/// be recognized and dropped.
#[derive(Debug, Default)]
struct Inflight {
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            view: watch::channel(ContactFormView::default()).0,
            inflight: Default::default(),
        }
    }
}

impl State {
    fn inflight(&self) -> MutexGuard<'_, Inflight> {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter the loading state, unless another attempt is already running.
    fn begin(&self) -> Result<(u64, CancellationToken), ContactSubmitError> {
        let mut inflight = self.inflight();

        let started = self.view.send_if_modified(|view| {
            if view.is_loading() {
                return false;
            }
            view.submission = SubmissionState::Loading;
            true
        });
        if !started {
            return Err(ContactSubmitError::InProgress);
        }

        let token = CancellationToken::new();
        inflight.generation += 1;
        inflight.cancel = Some(token.clone());
        Ok((inflight.generation, token))
    }

    /// Apply the outcome of the attempt `generation`. Returns `false` without
    /// touching the view if a newer attempt or a reset happened since.
    fn finish(&self, generation: u64, update: impl FnOnce(&mut ContactFormView)) -> bool {
        let mut inflight = self.inflight();
        if inflight.generation != generation {
            return false;
        }
        inflight.cancel = None;
        self.view.send_modify(update);
        true
    }

    /// Return to idle if the attempt `generation` is still pending. Used when
    /// a submission is dropped before it produced an outcome.
    fn abandon(&self, generation: u64) {
        let mut inflight = self.inflight();
        if inflight.generation != generation {
            return;
        }
        let Some(token) = inflight.cancel.take() else {
            return;
        };
        token.cancel();
        self.view
            .send_modify(|view| view.submission = SubmissionState::Idle);
    }

    fn reset(&self) {
        let mut inflight = self.inflight();
        inflight.generation += 1;
        if let Some(token) = inflight.cancel.take() {
            token.cancel();
        }
        self.view
            .send_modify(|view| view.submission = SubmissionState::Idle);
    }
}

/// Abandons its attempt if dropped before the attempt finished.
struct PendingSubmission<'a> {
    state: &'a State,
    generation: u64,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        self.state.abandon(self.generation);
    }
}

impl<ContactApi, Analytics> ContactFeatureServiceImpl<ContactApi, Analytics> {
    pub fn new(
        contact_api: ContactApi,
        analytics: Analytics,
        config: ContactFeatureConfig,
    ) -> Self {
        Self {
            contact_api,
            analytics,
            config,
            hooks: Default::default(),
            state: Default::default(),
            events: TaskTracker::new(),
        }
    }

    pub fn with_hooks(self, hooks: ContactFormHooks) -> Self {
        Self { hooks, ..self }
    }
}

impl<ContactApi, Analytics> ContactFeatureServiceImpl<ContactApi, Analytics>
where
    Analytics: AnalyticsService + Clone,
{
    fn track(&self, data: EventData) {
        let analytics = self.analytics.clone();
        self.events.spawn(async move {
            analytics
                .track_event(PortfolioEvent::ContactFormSubmit, data)
                .await;
        });
    }

    fn schedule_reset(&self, generation: u64) {
        let Some(delay) = self.config.success_reset_delay else {
            return;
        };

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reset = state.finish(generation, |view| {
                view.form.clear();
                view.field_errors = FieldErrors::default();
                view.submission = SubmissionState::Idle;
            });
            if reset {
                debug!("Cleared contact form after successful submission");
            }
        });
    }
}

impl<ContactApi, Analytics> ContactFeatureService
    for ContactFeatureServiceImpl<ContactApi, Analytics>
where
    ContactApi: ContactApiService,
    Analytics: AnalyticsService + Clone,
{
    fn view(&self) -> ContactFormView {
        self.state.view.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ContactFormView> {
        self.state.view.subscribe()
    }

    fn set_field(&self, field: FormField, value: String) {
        self.state.view.send_modify(|view| view.form.set(field, value));
    }

    async fn submit(&self) -> Result<ContactApiResponse, ContactSubmitError> {
        let form = {
            let view = self.state.view.borrow();
            if view.is_loading() {
                return Err(ContactSubmitError::InProgress);
            }
            view.form.clone()
        };

        let request = match validate(&form.to_raw()) {
            Ok(request) => request,
            Err(err) => {
                debug!(violations = err.errors.len(), "Contact form is invalid");
                let field_errors = FieldErrors::from_errors(&err.errors);
                self.state
                    .view
                    .send_modify(|view| view.field_errors = field_errors);
                return Err(err.into());
            }
        };
        self.state.view.send_if_modified(|view| {
            let had_errors = !view.field_errors.is_empty();
            view.field_errors = FieldErrors::default();
            had_errors
        });

        let request = request.sanitize();
        let (has_company, has_phone) = (request.has_company(), request.has_phone());
        let (generation, cancel) = self.state.begin()?;
        let _pending = PendingSubmission {
            state: &self.state,
            generation,
        };
        self.track(attempt_data(&request));

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Contact submission cancelled");
                return Err(ContactSubmitError::Cancelled);
            }
            result = self.contact_api.send(request) => result,
        };

        match result {
            Ok(response) => {
                if !self.state.finish(generation, |view| {
                    view.submission = SubmissionState::Success;
                }) {
                    return Err(ContactSubmitError::Cancelled);
                }

                info!("Contact form submitted");
                if let Some(hook) = &self.hooks.on_success {
                    hook(&response);
                }
                self.track(
                    EventData::new()
                        .with("status", "success")
                        .with("has_company", has_company)
                        .with("has_phone", has_phone),
                );
                self.schedule_reset(generation);

                Ok(response)
            }
            Err(err) => {
                let message = err.to_string();
                if !self.state.finish(generation, |view| {
                    view.submission = SubmissionState::Error(message);
                }) {
                    return Err(ContactSubmitError::Cancelled);
                }

                warn!(kind = err.kind(), "Failed to submit contact form: {err}");
                if let Some(hook) = &self.hooks.on_error {
                    hook(&err);
                }
                self.track(
                    EventData::new()
                        .with("status", "error")
                        .with("error_type", err.kind()),
                );

                Err(err.into())
            }
        }
    }

    fn reset(&self) {
        self.state.reset();
    }

    async fn health_check(&self) -> bool {
        self.contact_api.health_check().await
    }

    async fn flush(&self) {
        self.events.close();
        self.events.wait().await;
        self.events.reopen();
    }
}

fn attempt_data(request: &SanitizedContactRequest) -> EventData {
    EventData::new()
        .with("has_company", request.has_company())
        .with("has_phone", request.has_phone())
        .with("subject_length", request.subject.chars().count())
        .with("message_length", request.message.chars().count())
}

#[cfg(test)]
mod tests;
