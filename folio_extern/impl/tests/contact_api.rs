use std::{collections::BTreeMap, time::Duration};

use folio_extern_contracts::contact_api::{ContactApiError, ContactApiService, GENERIC_SEND_ERROR};
use folio_extern_impl::{
    contact_api::{ContactApiServiceConfig, ContactApiServiceImpl},
    http::{HttpClient, USER_AGENT},
};
use folio_models::{api::ContactApiResponse, contact::SanitizedContactRequest};
use folio_utils::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn ok() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .and(header("user-agent", USER_AGENT.as_str()))
        .and(body_json(json!({
            "mail": "max@example.com",
            "name": "Max Mustermann",
            "subject": "Hallo",
            "message": "Dies ist eine Testnachricht.",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Nachricht gesendet",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.send(request()).await;

    // Assert
    assert_eq!(
        result.unwrap(),
        ContactApiResponse {
            success: true,
            message: "Nachricht gesendet".into(),
            data: None,
        }
    );
}

#[tokio::test]
async fn optional_fields_are_sent() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .and(body_json(json!({
            "mail": "max@example.com",
            "name": "Max Mustermann",
            "subject": "Hallo",
            "message": "Dies ist eine Testnachricht.",
            "company": "Muster GmbH",
            "phone": "+49 123 4567",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {"id": 42},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());
    let request = SanitizedContactRequest {
        company: Some("Muster GmbH".into()),
        phone: Some("+49 123 4567".into()),
        ..request()
    };

    // Act
    let result = sut.send(request).await;

    // Assert
    assert_eq!(result.unwrap().data, Some(json!({"id": 42})));
}

#[tokio::test]
async fn rejected_with_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "boom",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.send(request()).await;

    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_matches!(err, ContactApiError::Rejected { status: 500, .. });
}

#[tokio::test]
async fn rejected_with_field_errors() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Validierungsfehler",
            "errors": {"mail": ["Ungültige E-Mail-Adresse"]},
        })))
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.send(request()).await;

    // Assert
    let ContactApiError::Rejected {
        status,
        message,
        errors,
    } = result.unwrap_err()
    else {
        panic!("expected rejection");
    };
    assert_eq!(status, 400);
    assert_eq!(message, "Validierungsfehler");
    assert_eq!(
        errors,
        BTreeMap::from([("mail".into(), vec!["Ungültige E-Mail-Adresse".into()])])
    );
}

#[tokio::test]
async fn rejected_without_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.send(request()).await;

    // Assert
    assert_eq!(
        result.unwrap_err().to_string(),
        "HTTP 429: Too Many Requests"
    );
}

#[tokio::test]
async fn malformed_response() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.send(request()).await;

    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), GENERIC_SEND_ERROR);
    assert_matches!(err, ContactApiError::MalformedResponse(_));
}

#[tokio::test]
async fn malformed_error_response() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.send(request()).await;

    // Assert
    assert_matches!(result, Err(ContactApiError::MalformedResponse(_)));
}

#[tokio::test]
async fn network_failure() {
    // Arrange
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let sut = make_sut(&format!("http://127.0.0.1:{port}"));

    // Act
    let result = sut.send(request()).await;

    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), GENERIC_SEND_ERROR);
    assert_matches!(err, ContactApiError::Network(_));
}

#[tokio::test]
async fn timeout() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "ok"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ContactApiServiceConfig::new(server.uri().parse().unwrap()).unwrap();
    let http = HttpClient::new(Duration::from_millis(100)).unwrap();
    let sut = ContactApiServiceImpl::new(config, http);

    // Act
    let result = sut.send(request()).await;

    // Assert
    assert_matches!(result, Err(ContactApiError::Network(_)));
}

#[tokio::test]
async fn health_check() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.health_check().await;

    // Assert
    assert!(result);
}

#[tokio::test]
async fn health_check_unhealthy() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sut = make_sut(&server.uri());

    // Act
    let result = sut.health_check().await;

    // Assert
    assert!(!result);
}

fn make_sut(base_url: &str) -> ContactApiServiceImpl {
    let config = ContactApiServiceConfig::new(base_url.parse().unwrap()).unwrap();
    let http = HttpClient::new(Duration::from_secs(10)).unwrap();
    ContactApiServiceImpl::new(config, http)
}

fn request() -> SanitizedContactRequest {
    SanitizedContactRequest {
        mail: "max@example.com".into(),
        name: "Max Mustermann".into(),
        subject: "Hallo".into(),
        message: "Dies ist eine Testnachricht.".into(),
        company: None,
        phone: None,
    }
}
