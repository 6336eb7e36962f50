use std::net::IpAddr;

use anyhow::Context;
use axum::{http::StatusCode, routing, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::info;

const SEND_ROUTE: &str = "/api/send";

pub async fn start_server(host: IpAddr, port: u16) -> anyhow::Result<()> {
    info!("Starting umami testing server on {host}:{port}");
    info!("Collector endpoint: http://{host}:{port}{SEND_ROUTE}");

    let router = Router::new().route(SEND_ROUTE, routing::post(send));

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router)
        .await
        .context("Failed to start HTTP server")
}

#[derive(Deserialize)]
struct SendRequest {
    #[serde(rename = "type")]
    kind: String,
    payload: SendPayload,
}

#[derive(Deserialize)]
struct SendPayload {
    website: String,
    url: String,
    name: Option<String>,
    #[serde(default)]
    data: Value,
}

async fn send(Json(request): Json<SendRequest>) -> StatusCode {
    let SendPayload {
        website,
        url,
        name,
        data,
    } = request.payload;

    if request.kind != "event" {
        info!("Ignoring {:?} from website {website:?}", request.kind);
        return StatusCode::BAD_REQUEST;
    }

    info!(
        "Event {:?} on {website:?} {url}: {data}",
        name.as_deref().unwrap_or("pageview")
    );
    StatusCode::OK
}
