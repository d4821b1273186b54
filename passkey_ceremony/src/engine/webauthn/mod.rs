mod auth_data;
mod client_data;
mod login;
mod register;

use chrono::{Duration, Utc};

use crate::utils::{base64url_encode, gen_random_string};

use super::errors::EngineError;
use super::types::{
    AssertionChallenge, AuthenticatorResponse, CeremonySession, CeremonyUser, CreationChallenge,
    Credential, EngineConfig, RegisterCredential,
};
use super::ProtocolEngine;

const CHALLENGE_LEN: usize = 32;

/// Native WebAuthn engine supporting ES256 credentials with "none" attestation handling
#[derive(Clone, Debug)]
pub struct WebAuthnEngine {
    config: EngineConfig,
}

impl WebAuthnEngine {
    pub fn new(config: EngineConfig) -> Self {
        tracing::info!(
            "Creating WebAuthn engine for rp_id={}, origin={}",
            config.rp_id,
            config.origin
        );
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn new_session(
        &self,
        user: &CeremonyUser,
        allowed_credentials: Vec<String>,
    ) -> Result<CeremonySession, EngineError> {
        Ok(CeremonySession {
            challenge: gen_random_string(CHALLENGE_LEN)?,
            user_id: base64url_encode(&user.user_handle),
            allowed_credentials,
            user_verification: self.config.user_verification,
            expires: Utc::now() + Duration::milliseconds(i64::from(self.config.timeout_ms)),
        })
    }
}

/// Rejects finish calls arriving after the client-side timeout elapsed
fn check_not_expired(session: &CeremonySession) -> Result<(), EngineError> {
    if session.expires < Utc::now() {
        return Err(EngineError::Verification("Session has expired".into()));
    }
    Ok(())
}

/// Rejects a finish call whose user differs from the one the session was created for
fn check_session_user(user: &CeremonyUser, session: &CeremonySession) -> Result<(), EngineError> {
    if session.user_id != base64url_encode(&user.user_handle) {
        return Err(EngineError::Verification("User handle mismatch".into()));
    }
    Ok(())
}

fn check_credential_type(type_: &str) -> Result<(), EngineError> {
    if type_ != "public-key" {
        return Err(EngineError::Format(format!(
            "Unsupported credential type: {type_}"
        )));
    }
    Ok(())
}

impl ProtocolEngine for WebAuthnEngine {
    fn begin_registration(
        &self,
        user: &CeremonyUser,
    ) -> Result<(CreationChallenge, CeremonySession), EngineError> {
        if user.user_handle.is_empty() {
            return Err(EngineError::Format("User handle must not be empty".into()));
        }
        let session = self.new_session(user, Vec::new())?;
        let challenge = register::creation_options(&self.config, user, &session);
        tracing::debug!("Registration options: {:?}", challenge);
        Ok((challenge, session))
    }

    fn finish_registration(
        &self,
        user: &CeremonyUser,
        session: &CeremonySession,
        credential: &RegisterCredential,
    ) -> Result<Credential, EngineError> {
        register::verify_registration(&self.config, user, session, credential)
    }

    fn begin_login(
        &self,
        user: &CeremonyUser,
    ) -> Result<(AssertionChallenge, CeremonySession), EngineError> {
        if user.credentials.is_empty() {
            return Err(EngineError::Format(
                "User has no credentials to authenticate with".into(),
            ));
        }
        let allowed = user
            .credentials
            .iter()
            .map(|c| base64url_encode(&c.id))
            .collect();
        let session = self.new_session(user, allowed)?;
        let challenge = login::request_options(&self.config, &session);
        tracing::debug!("Authentication options: {:?}", challenge);
        Ok((challenge, session))
    }

    fn finish_login(
        &self,
        user: &CeremonyUser,
        session: &CeremonySession,
        credential: &AuthenticatorResponse,
    ) -> Result<Credential, EngineError> {
        login::verify_login(&self.config, user, session, credential)
    }
}
