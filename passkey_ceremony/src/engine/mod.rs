//! Protocol engine boundary
//!
//! The orchestrator drives ceremonies through [`ProtocolEngine`] and never
//! inspects challenge material or session state itself. [`WebAuthnEngine`] is
//! the native implementation; tests substitute their own.

mod errors;
mod types;
mod webauthn;

pub use errors::EngineError;
pub use types::{
    AssertionChallenge, AuthenticatorAssertionResponse, AuthenticatorAttestationResponse,
    AuthenticatorResponse, AuthenticatorSelection, CeremonySession, CeremonyUser,
    CreationChallenge, Credential, CredentialDescriptor, EngineConfig, PubKeyCredParam,
    PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions, RegisterCredential,
    RelyingParty, UserEntity, UserVerification,
};
pub use webauthn::WebAuthnEngine;

/// Begin/finish function pairs for registration and login.
///
/// Implementations are pure with respect to storage: all persistence happens in
/// the orchestrator. Calls are CPU-bound and may run on the async executor.
pub trait ProtocolEngine: Send + Sync + 'static {
    /// Produces creation options for `user` plus the state to hand back at finish.
    /// Credentials listed in `user.credentials` are excluded from re-registration.
    fn begin_registration(
        &self,
        user: &CeremonyUser,
    ) -> Result<(CreationChallenge, CeremonySession), EngineError>;

    /// Verifies the client's attestation against `session` and returns the new credential.
    fn finish_registration(
        &self,
        user: &CeremonyUser,
        session: &CeremonySession,
        credential: &RegisterCredential,
    ) -> Result<Credential, EngineError>;

    /// Produces request options allowing exactly `user.credentials`.
    fn begin_login(
        &self,
        user: &CeremonyUser,
    ) -> Result<(AssertionChallenge, CeremonySession), EngineError>;

    /// Verifies the client's assertion and returns the credential with the
    /// authenticator-reported sign count.
    fn finish_login(
        &self,
        user: &CeremonyUser,
        session: &CeremonySession,
        credential: &AuthenticatorResponse,
    ) -> Result<Credential, EngineError>;
}
