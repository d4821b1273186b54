use std::sync::Arc;

use axum::{
    extract::{Json, OriginalUri, State, rejection::JsonRejection},
    routing::{Router, post},
};
use serde::Serialize;

use passkey_ceremony::{
    AssertionChallenge, BeginLoginRequest, BeginRegistrationRequest, CeremonyOrchestrator,
    CreationChallenge, CredentialRecord, FinishLoginRequest, FinishRegistrationRequest,
    VerifiedUser,
};

use crate::error::{ErrorResponse, IntoResponseError};

type Orchestrator = State<Arc<CeremonyOrchestrator>>;

pub(crate) fn router(orchestrator: Arc<CeremonyOrchestrator>) -> Router {
    Router::new()
        .nest("/register", router_register())
        .nest("/authenticate", router_authenticate())
        .with_state(orchestrator)
}

fn router_register() -> Router<Arc<CeremonyOrchestrator>> {
    Router::new()
        .route("/options", post(begin_registration))
        .route("/verification", post(finish_registration))
}

fn router_authenticate() -> Router<Arc<CeremonyOrchestrator>> {
    Router::new()
        .route("/options", post(begin_login))
        .route("/verification", post(finish_login))
}

#[derive(Debug, Serialize)]
pub(crate) struct RegistrationResponse {
    credential: CredentialRecord,
    payload: FinishRegistrationRequest,
    message: &'static str,
    path: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    message: &'static str,
    user: VerifiedUser,
}

pub(crate) async fn begin_registration(
    State(orchestrator): Orchestrator,
    body: Result<Json<BeginRegistrationRequest>, JsonRejection>,
) -> Result<Json<CreationChallenge>, ErrorResponse> {
    let Json(request) = body.into_response_error()?;
    let challenge = orchestrator
        .begin_registration(&request)
        .await
        .into_response_error()?;
    Ok(Json(challenge))
}

pub(crate) async fn finish_registration(
    State(orchestrator): Orchestrator,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<FinishRegistrationRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ErrorResponse> {
    let Json(request) = body.into_response_error()?;
    let credential = orchestrator
        .finish_registration(&request)
        .await
        .into_response_error()?;

    Ok(Json(RegistrationResponse {
        credential,
        payload: request,
        message: "Verification successful",
        path: uri.path().to_string(),
    }))
}

pub(crate) async fn begin_login(
    State(orchestrator): Orchestrator,
    body: Result<Json<BeginLoginRequest>, JsonRejection>,
) -> Result<Json<AssertionChallenge>, ErrorResponse> {
    let Json(request) = body.into_response_error()?;
    let challenge = orchestrator
        .begin_login(&request)
        .await
        .into_response_error()?;
    Ok(Json(challenge))
}

pub(crate) async fn finish_login(
    State(orchestrator): Orchestrator,
    body: Result<Json<FinishLoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ErrorResponse> {
    let Json(request) = body.into_response_error()?;
    let user = orchestrator
        .finish_login(&request)
        .await
        .into_response_error()?;

    Ok(Json(LoginResponse {
        message: "Login verification successful",
        user,
    }))
}
