use std::sync::Arc;

use crate::credential::{CredentialRecord, CredentialStore, Identity, StoredCredential};
use crate::engine::{
    AssertionChallenge, CeremonySession, CeremonyUser, CreationChallenge, Credential,
    ProtocolEngine,
};
use crate::session_cache::{CeremonyKind, SessionCache};
use crate::utils::{UtilError, base64url_decode, gen_random_bytes};

use super::errors::CeremonyError;
use super::types::{
    BackupEligibilityPolicy, BeginLoginRequest, BeginRegistrationRequest, CeremonyPolicy,
    FinishLoginRequest, FinishRegistrationRequest, VerifiedUser,
};

const USER_HANDLE_LEN: usize = 32;

/// Sequences begin/finish for registration and login around the protocol
/// engine, the credential store and the session cache.
///
/// Holds no per-ceremony state of its own; everything that must survive
/// between begin and finish goes through the session cache.
pub struct CeremonyOrchestrator {
    engine: Arc<dyn ProtocolEngine>,
    credentials: Arc<dyn CredentialStore>,
    sessions: SessionCache,
    policy: CeremonyPolicy,
}

fn store_error(e: impl std::fmt::Display) -> CeremonyError {
    tracing::error!("Credential store error: {}", e);
    CeremonyError::Store(e.to_string())
}

fn decode_error(what: &str, e: UtilError) -> CeremonyError {
    tracing::error!("Failed to decode stored {}: {}", what, e);
    CeremonyError::Decode(format!("Failed to decode stored {what}"))
}

impl CeremonyOrchestrator {
    pub fn new(
        engine: Arc<dyn ProtocolEngine>,
        credentials: Arc<dyn CredentialStore>,
        sessions: SessionCache,
        policy: CeremonyPolicy,
    ) -> Self {
        Self {
            engine,
            credentials,
            sessions,
            policy,
        }
    }

    pub fn policy(&self) -> &CeremonyPolicy {
        &self.policy
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Creates an identity with no credential, ready for registration
    pub async fn create_identity(&self, username: &str) -> Result<Identity, CeremonyError> {
        if username.trim().is_empty() {
            return Err(CeremonyError::InputValidation(
                "Username is required".to_string(),
            ));
        }
        if self
            .credentials
            .get_identity(username)
            .await
            .map_err(store_error)?
            .is_some()
        {
            tracing::debug!("Identity already exists: {}", username);
            return Err(CeremonyError::InputValidation(
                "Username already exists".to_string(),
            ));
        }
        let identity = self
            .credentials
            .create_identity(username)
            .await
            .map_err(store_error)?;
        tracing::info!("Created identity for {}", username);
        Ok(identity)
    }

    async fn load_identity(&self, username: &str) -> Result<Identity, CeremonyError> {
        self.credentials
            .get_identity(username)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                tracing::debug!("Identity not found: {}", username);
                CeremonyError::UserNotFound(username.to_string())
            })
    }

    /// Starts adding a credential to an existing identity
    pub async fn begin_registration(
        &self,
        request: &BeginRegistrationRequest,
    ) -> Result<CreationChallenge, CeremonyError> {
        request.validate()?;
        let username = request.username.as_str();
        let identity = self.load_identity(username).await?;

        let user_handle = match identity.webauthn_user_id.as_deref() {
            Some(handle) if !handle.is_empty() => {
                base64url_decode(handle).map_err(|e| decode_error("user handle", e))?
            }
            _ => {
                tracing::debug!("Generating new user handle for {}", username);
                gen_random_bytes(USER_HANDLE_LEN)
                    .map_err(|e| CeremonyError::Unexpected(e.to_string()))?
            }
        };

        let credentials = match identity.stored_credential() {
            Some(stored) if self.policy.exclude_existing_credentials => {
                vec![decode_credential(&stored)?]
            }
            _ => Vec::new(),
        };

        let user = CeremonyUser {
            user_handle,
            name: username.to_string(),
            display_name: identity
                .webauthn_displayname
                .clone()
                .unwrap_or_else(|| username.to_string()),
            credentials,
        };

        let (challenge, session) = self.engine.begin_registration(&user)?;
        self.sessions
            .put(CeremonyKind::Register, username, &session)
            .await?;

        tracing::info!("Registration started for {}", username);
        Ok(challenge)
    }

    /// Verifies the client's attestation and stores the new credential
    pub async fn finish_registration(
        &self,
        request: &FinishRegistrationRequest,
    ) -> Result<CredentialRecord, CeremonyError> {
        request.validate()?;
        let username = request.username.as_str();

        let session: CeremonySession = self.sessions.get(CeremonyKind::Register, username).await?;

        // The handle issued at begin, not a freshly derived one
        let user_handle =
            base64url_decode(&session.user_id).map_err(|e| decode_error("session user id", e))?;

        self.load_identity(username).await?;

        let user = CeremonyUser {
            user_handle,
            name: username.to_string(),
            display_name: request.displayname.clone(),
            credentials: Vec::new(),
        };

        let credential = self
            .engine
            .finish_registration(&user, &session, &request.credential)
            .inspect_err(|e| tracing::warn!("Registration rejected for {}: {}", username, e))?;

        let record = CredentialRecord::new(&user.user_handle, &request.displayname, &credential);
        let saved = self
            .credentials
            .save_credential(username, &record)
            .await
            .map_err(store_error)?;
        if !saved {
            return Err(CeremonyError::UserNotFound(username.to_string()));
        }

        self.discard_session(CeremonyKind::Register, username).await;

        tracing::info!("Registration finished for {}", username);
        Ok(record)
    }

    /// Starts a login against the identity's enrolled credential
    pub async fn begin_login(
        &self,
        request: &BeginLoginRequest,
    ) -> Result<AssertionChallenge, CeremonyError> {
        request.validate()?;
        let username = request.username.as_str();

        let (identity, stored) = self.load_enrolled(username).await?;
        let user = ceremony_user(&identity, vec![decode_credential(&stored)?])?;

        let (challenge, session) = self.engine.begin_login(&user)?;
        self.sessions
            .put(CeremonyKind::Login, username, &session)
            .await?;

        tracing::info!("Login started for {}", username);
        Ok(challenge)
    }

    /// Verifies the client's assertion and records the new sign count
    pub async fn finish_login(
        &self,
        request: &FinishLoginRequest,
    ) -> Result<VerifiedUser, CeremonyError> {
        request.validate()?;
        let username = request.username.as_str();

        let session: CeremonySession = self.sessions.get(CeremonyKind::Login, username).await?;

        // Fresh read so credential changes since begin are honored
        let (identity, stored) = self.load_enrolled(username).await?;
        let mut credential = decode_credential(&stored)?;
        if self.policy.backup_eligibility == BackupEligibilityPolicy::AssumeEligible {
            credential.backup_eligible = true;
        }
        let user = ceremony_user(&identity, vec![credential])?;

        let verified = self
            .engine
            .finish_login(&user, &session, &request.credential)
            .inspect_err(|e| tracing::warn!("Login rejected for {}: {}", username, e))?;

        check_sign_count(stored.sign_count, verified.sign_count)?;

        let updated = self
            .credentials
            .update_sign_count(username, verified.sign_count)
            .await
            .map_err(store_error)?;
        if !updated {
            return Err(CeremonyError::UserNotFound(username.to_string()));
        }

        self.discard_session(CeremonyKind::Login, username).await;

        tracing::info!("Login finished for {}", username);
        Ok(VerifiedUser {
            id: identity.id.clone(),
            username: identity.username.clone(),
            display_name: identity
                .webauthn_displayname
                .clone()
                .unwrap_or_else(|| identity.username.clone()),
            credential_id: stored.credential_id,
            sign_count: verified.sign_count,
        })
    }

    async fn load_enrolled(
        &self,
        username: &str,
    ) -> Result<(Identity, StoredCredential), CeremonyError> {
        let identity = self.load_identity(username).await?;
        let stored = identity.stored_credential().ok_or_else(|| {
            tracing::debug!("No credential enrolled for {}", username);
            CeremonyError::UserNotFound(format!("{username} has no credential"))
        })?;
        Ok((identity, stored))
    }

    /// The credential write has already happened; a failed delete is logged and
    /// the entry is left to expire.
    async fn discard_session(&self, kind: CeremonyKind, username: &str) {
        if let Err(e) = self.sessions.remove(kind, username).await {
            tracing::warn!(
                "Failed to remove {} session for {} after finish: {}",
                kind,
                username,
                e
            );
        }
    }
}

fn decode_credential(stored: &StoredCredential) -> Result<Credential, CeremonyError> {
    stored.decode().map_err(|e| decode_error("credential", e))
}

fn ceremony_user(
    identity: &Identity,
    credentials: Vec<Credential>,
) -> Result<CeremonyUser, CeremonyError> {
    let handle = identity
        .webauthn_user_id
        .as_deref()
        .ok_or_else(|| CeremonyError::Decode("Stored credential has no user handle".to_string()))?;

    Ok(CeremonyUser {
        user_handle: base64url_decode(handle).map_err(|e| decode_error("user handle", e))?,
        name: identity.username.clone(),
        display_name: identity
            .webauthn_displayname
            .clone()
            .unwrap_or_else(|| identity.username.clone()),
        credentials,
    })
}

/// Rejects a count that did not increase, unless the authenticator keeps no counter
fn check_sign_count(stored: u32, reported: u32) -> Result<(), CeremonyError> {
    if stored == 0 && reported == 0 {
        return Ok(());
    }
    if reported <= stored {
        tracing::warn!(
            "Sign count regression: stored {}, reported {}. Possible cloned authenticator",
            stored,
            reported
        );
        return Err(CeremonyError::Verification(format!(
            "Sign count did not increase (stored {stored}, reported {reported})"
        )));
    }
    Ok(())
}
