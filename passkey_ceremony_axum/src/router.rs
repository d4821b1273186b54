//! Router for the WebAuthn ceremony endpoints

use std::sync::Arc;

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use passkey_ceremony::CeremonyOrchestrator;

/// Create a router for the registration and login ceremonies
///
/// The endpoints will be available at:
/// - /webauthn/register/options
/// - /webauthn/register/verification
/// - /webauthn/authenticate/options
/// - /webauthn/authenticate/verification
pub fn ceremony_router(orchestrator: Arc<CeremonyOrchestrator>) -> Router {
    Router::new().nest("/webauthn", super::ceremony::router(orchestrator))
}

/// Same as [`ceremony_router`] with HTTP request tracing
pub fn ceremony_router_with_trace(orchestrator: Arc<CeremonyOrchestrator>) -> Router {
    ceremony_router(orchestrator).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(true),
            )
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}
