use std::{pin::pin, sync::Arc, time::Duration};

use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_extern_contracts::contact_api::{ContactApiError, MockContactApiService};
use folio_models::form::{FormField, SubmissionState};
use folio_utils::assert_matches;
use futures::poll;
use pretty_assertions::assert_eq;

use super::*;
use crate::ContactFormHooks;

#[tokio::test(start_paused = true)]
async fn ok() {
    // Arrange
    let (contact_api, reply) = controlled_contact_api();
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    fill_form(&sut);

    // Act
    let mut submit = pin!(sut.submit());
    assert!(poll!(submit.as_mut()).is_pending());
    let loading = sut.view();
    reply.send(Ok(response())).unwrap();
    let result = submit.await;

    // Assert
    assert_eq!(result.unwrap(), response());
    assert_eq!(loading.submission, SubmissionState::Loading);

    let view = sut.view();
    assert_eq!(view.submission, SubmissionState::Success);
    assert_eq!(view.form.name, "Max Mustermann");

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert!(sut.view().is_success());

    tokio::time::sleep(Duration::from_millis(2)).await;
    let view = sut.view();
    assert_eq!(view.submission, SubmissionState::Idle);
    assert_eq!(view.form, Default::default());
    assert!(view.field_errors.is_empty());
}

#[tokio::test]
async fn sanitizes_before_sending() {
    // Arrange
    let contact_api = MockContactApiService::new().with_send(
        SanitizedContactRequest {
            subject: "bAnfrage/b".into(),
            company: Some("Muster GmbH".into()),
            ..sanitized_request()
        },
        Ok(response()),
    );
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    fill_form(&sut);
    sut.set_field(FormField::Subject, "<b>Anfrage</b>".into());
    sut.set_field(FormField::Company, "  Muster GmbH ".into());
    sut.set_field(FormField::Phone, "".into());

    // Act
    let result = sut.submit().await;

    // Assert
    result.unwrap();
}

#[tokio::test]
async fn transport_error() {
    // Arrange
    let contact_api = MockContactApiService::new()
        .with_send(sanitized_request(), Err(rejected("Server unreachable")));
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    fill_form(&sut);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::Transport(ContactApiError::Rejected { .. }))
    );
    let view = sut.view();
    assert_eq!(
        view.submission,
        SubmissionState::Error("Server unreachable".into())
    );
    assert_eq!(view.error(), Some("Server unreachable"));
    assert_eq!(view.form.name, "Max Mustermann");
}

#[tokio::test]
async fn invalid_form() {
    // Arrange
    let (sut, _events) = make_sut(MockContactApiService::new(), ContactFeatureConfig::default());
    sut.set_field(FormField::Email, "ungültig".into());
    sut.set_field(FormField::Phone, "12".into());

    // Act
    let result = sut.submit().await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::Validation(_)));

    let view = sut.view();
    assert_eq!(view.submission, SubmissionState::Idle);
    assert_eq!(
        view.field_errors.iter().collect::<Vec<_>>(),
        [
            (FormField::Name, "Name muss mindestens 2 Zeichen lang sein"),
            (FormField::Email, "Ungültige E-Mail-Adresse"),
            (FormField::Subject, "Betreff muss mindestens 3 Zeichen lang sein"),
            (
                FormField::Message,
                "Nachricht muss mindestens 10 Zeichen lang sein"
            ),
            (FormField::Phone, "Ungültige Telefonnummer"),
        ]
    );
}

#[tokio::test]
async fn invalid_form_keeps_previous_error() {
    // Arrange
    let contact_api = MockContactApiService::new()
        .with_send(sanitized_request(), Err(rejected("Server unreachable")));
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    fill_form(&sut);
    sut.submit().await.unwrap_err();
    sut.set_field(FormField::Message, "kurz".into());

    // Act
    let result = sut.submit().await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::Validation(_)));
    let view = sut.view();
    assert_eq!(view.error(), Some("Server unreachable"));
    assert_eq!(
        view.field_errors.get(FormField::Message),
        Some("Nachricht muss mindestens 10 Zeichen lang sein")
    );
}

#[tokio::test]
async fn valid_form_clears_field_errors() {
    // Arrange
    let contact_api = MockContactApiService::new().with_send(sanitized_request(), Ok(response()));
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    sut.submit().await.unwrap_err();
    assert!(!sut.view().field_errors.is_empty());
    fill_form(&sut);

    // Act
    let result = sut.submit().await;

    // Assert
    result.unwrap();
    assert!(sut.view().field_errors.is_empty());
}

#[tokio::test]
async fn in_progress() {
    // Arrange
    let (sut, _events) = make_sut(hanging_contact_api(), ContactFeatureConfig::default());
    fill_form(&sut);
    let mut first = pin!(sut.submit());
    assert!(poll!(first.as_mut()).is_pending());

    // Act
    let result = sut.submit().await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::InProgress));
    assert!(sut.view().is_loading());
    assert!(poll!(first.as_mut()).is_pending());
}

#[tokio::test]
async fn subscribe() {
    // Arrange
    let contact_api = MockContactApiService::new().with_send(sanitized_request(), Ok(response()));
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    let mut rx = sut.subscribe();
    fill_form(&sut);
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();

    // Act
    sut.submit().await.unwrap();

    // Assert
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_success());
}

#[tokio::test(start_paused = true)]
async fn auto_reset_disabled() {
    // Arrange
    let contact_api = MockContactApiService::new().with_send(sanitized_request(), Ok(response()));
    let config = ContactFeatureConfig {
        success_reset_delay: None,
    };
    let (sut, _events) = make_sut(contact_api, config);
    fill_form(&sut);

    // Act
    sut.submit().await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    // Assert
    let view = sut.view();
    assert!(view.is_success());
    assert_eq!(view.form.name, "Max Mustermann");
}

#[tokio::test(start_paused = true)]
async fn auto_reset_skipped_after_new_submission() {
    // Arrange
    let mut contact_api = MockContactApiService::new();
    let mut responses = vec![Err(rejected("boom")), Ok(response())];
    contact_api
        .expect_send()
        .times(2)
        .returning(move |_| Box::pin(std::future::ready(responses.pop().unwrap())));
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    fill_form(&sut);
    sut.submit().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Act
    let result = sut.submit().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Assert
    result.unwrap_err();
    let view = sut.view();
    assert_eq!(view.error(), Some("boom"));
    assert_eq!(view.form.name, "Max Mustermann");
}

#[tokio::test]
async fn hooks() {
    // Arrange
    let mut contact_api = MockContactApiService::new();
    let mut responses = vec![Err(rejected("boom")), Ok(response())];
    contact_api
        .expect_send()
        .times(2)
        .returning(move |_| Box::pin(std::future::ready(responses.pop().unwrap())));

    let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
    let hooks = ContactFormHooks::default()
        .on_success({
            let calls = Arc::clone(&calls);
            move |response: &ContactApiResponse| {
                calls
                    .lock()
                    .unwrap()
                    .push(format!("success: {}", response.message))
            }
        })
        .on_error({
            let calls = Arc::clone(&calls);
            move |err: &ContactApiError| calls.lock().unwrap().push(format!("error: {err}"))
        });

    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());
    let sut = sut.with_hooks(hooks);
    fill_form(&sut);

    // Act
    sut.submit().await.unwrap();
    sut.submit().await.unwrap_err();

    // Assert
    assert_eq!(
        *calls.lock().unwrap(),
        [
            "success: Nachricht erfolgreich gesendet".to_owned(),
            "error: boom".to_owned(),
        ]
    );
}

#[tokio::test]
async fn health_check() {
    // Arrange
    let contact_api = MockContactApiService::new().with_health_check(true);
    let (sut, _events) = make_sut(contact_api, ContactFeatureConfig::default());

    // Act
    let result = sut.health_check().await;

    // Assert
    assert!(result);
}
