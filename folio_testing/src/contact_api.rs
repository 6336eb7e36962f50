use std::{
    net::IpAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing, Json, Router};
use folio_models::validation::validate;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

const CONTACT_ROUTE: &str = "/api/contact";
const HEALTH_ROUTE: &str = "/health";

pub async fn start_server(host: IpAddr, port: u16) -> anyhow::Result<()> {
    info!("Starting contact api testing server on {host}:{port}");
    info!("Base url: http://{host}:{port}");
    info!("Requests are validated like the real contact api");
    info!("Requests with a subject starting with \"fail\" are answered with status 500");

    let router = Router::new()
        .route(CONTACT_ROUTE, routing::post(submit))
        .route(HEALTH_ROUTE, routing::get(health))
        .with_state(Default::default());

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router)
        .await
        .context("Failed to start HTTP server")
}

async fn submit(
    State(counter): State<Arc<AtomicU64>>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let request = match validate(&request) {
        Ok(request) => request.sanitize(),
        Err(err) => {
            info!("Rejected invalid contact request: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": "Validierungsfehler",
                    "errors": err.messages_by_field(),
                })),
            );
        }
    };

    if request.subject.starts_with("fail") {
        info!("Failing contact request as requested: {:?}", request.subject);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "Interner Serverfehler",
            })),
        );
    }

    let id = counter.fetch_add(1, Ordering::Relaxed) + 1;
    info!(
        "Received contact request #{id} from {} <{}>: {:?}",
        request.name, request.mail, request.subject
    );

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Nachricht erfolgreich gesendet",
            "data": {"id": id},
        })),
    )
}

async fn health() -> StatusCode {
    StatusCode::OK
}
