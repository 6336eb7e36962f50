use folio_core_contact_contracts::ContactFeatureService;
use folio_extern_contracts::{
    analytics::AnalyticsService,
    contact_api::{ContactApiError, MockContactApiService},
};
use folio_models::{
    analytics::{EventData, PortfolioEvent},
    api::ContactApiResponse,
    contact::SanitizedContactRequest,
    form::FormField,
};
use tokio::sync::{mpsc, oneshot};

use crate::{ContactFeatureConfig, ContactFeatureServiceImpl};

mod submit;

type Sut = ContactFeatureServiceImpl<MockContactApiService, RecordingAnalytics>;

type Events = mpsc::UnboundedReceiver<(PortfolioEvent, EventData)>;

/// Forwards every tracked event to a channel.
#[derive(Debug, Clone)]
struct RecordingAnalytics(mpsc::UnboundedSender<(PortfolioEvent, EventData)>);

impl AnalyticsService for RecordingAnalytics {
    async fn track_event(&self, event: PortfolioEvent, data: EventData) {
        self.0.send((event, data)).ok();
    }
}

fn make_sut(contact_api: MockContactApiService, config: ContactFeatureConfig) -> (Sut, Events) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sut = Sut::new(contact_api, RecordingAnalytics(tx), config);
    (sut, rx)
}

fn fill_form(sut: &Sut) {
    sut.set_field(FormField::Name, "Max Mustermann".into());
    sut.set_field(FormField::Email, "max@example.com".into());
    sut.set_field(FormField::Subject, "Anfrage".into());
    sut.set_field(
        FormField::Message,
        "Hallo, ich interessiere mich für Ihre Dienste.".into(),
    );
}

fn sanitized_request() -> SanitizedContactRequest {
    SanitizedContactRequest {
        mail: "max@example.com".into(),
        name: "Max Mustermann".into(),
        subject: "Anfrage".into(),
        message: "Hallo, ich interessiere mich für Ihre Dienste.".into(),
        company: None,
        phone: None,
    }
}

fn response() -> ContactApiResponse {
    ContactApiResponse {
        success: true,
        message: "Nachricht erfolgreich gesendet".into(),
        data: None,
    }
}

fn rejected(message: &str) -> ContactApiError {
    ContactApiError::Rejected {
        status: 500,
        message: message.into(),
        errors: Default::default(),
    }
}

type Reply = oneshot::Sender<Result<ContactApiResponse, ContactApiError>>;

/// A contact api whose single request completes once the returned sender
/// is used.
fn controlled_contact_api() -> (MockContactApiService, Reply) {
    let (tx, rx) = oneshot::channel();
    let mut contact_api = MockContactApiService::new();
    contact_api
        .expect_send()
        .once()
        .with(mockall::predicate::eq(sanitized_request()))
        .return_once(move |_| Box::pin(async move { rx.await.unwrap() }));
    (contact_api, tx)
}

/// A contact api whose single request never completes.
fn hanging_contact_api() -> MockContactApiService {
    let mut contact_api = MockContactApiService::new();
    contact_api
        .expect_send()
        .once()
        .return_once(|_| Box::pin(std::future::pending()));
    contact_api
}
