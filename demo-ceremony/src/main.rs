use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passkey_ceremony::CeremonyOrchestrator;
use passkey_ceremony_axum::{ErrorResponse, IntoResponseError, ceremony_router_with_trace};

#[derive(Debug, Deserialize)]
struct RegisterUserRequest {
    #[serde(default)]
    username: String,
}

/// Creates the identity a registration ceremony attaches its credential to
async fn register_user(
    State(orchestrator): State<Arc<CeremonyOrchestrator>>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<Value>), ErrorResponse> {
    let identity = orchestrator
        .create_identity(&request.username)
        .await
        .into_response_error()?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": identity.id, "username": identity.username })),
    ))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_ceremony=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let orchestrator = Arc::new(passkey_ceremony_axum::init().await?);

    let app = Router::new()
        .route("/auth/register", post(register_user))
        .with_state(orchestrator.clone())
        .merge(ceremony_router_with_trace(orchestrator));

    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
