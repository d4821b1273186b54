use passkey_ceremony::{
    BeginLoginRequest, BeginRegistrationRequest, CeremonyOrchestrator, ErrorKind,
    FinishLoginRequest, FinishRegistrationRequest,
};

use crate::common::{MockAuthenticator, TEST_ORIGIN, memory_orchestrator, sqlite_orchestrator};

async fn enroll(orchestrator: &CeremonyOrchestrator, username: &str) -> MockAuthenticator {
    orchestrator
        .create_identity(username)
        .await
        .expect("identity should be created");

    let challenge = orchestrator
        .begin_registration(&BeginRegistrationRequest {
            username: username.to_string(),
        })
        .await
        .expect("registration should begin");

    let authenticator = MockAuthenticator::new(format!("credential-{username}").as_bytes());
    let record = orchestrator
        .finish_registration(&FinishRegistrationRequest {
            username: username.to_string(),
            displayname: format!("{username} display"),
            credential: authenticator.register(&challenge, TEST_ORIGIN),
        })
        .await
        .expect("registration should finish");

    assert_eq!(record.credential_id, authenticator.credential_id());
    authenticator
}

async fn login(
    orchestrator: &CeremonyOrchestrator,
    username: &str,
    authenticator: &MockAuthenticator,
    origin: &str,
) -> Result<passkey_ceremony::VerifiedUser, passkey_ceremony::CeremonyError> {
    let challenge = orchestrator
        .begin_login(&BeginLoginRequest {
            username: username.to_string(),
        })
        .await?;

    orchestrator
        .finish_login(&FinishLoginRequest {
            username: username.to_string(),
            credential: authenticator.authenticate(&challenge, origin),
        })
        .await
}

#[tokio::test]
async fn test_register_then_login_with_sqlite() {
    // Given an identity enrolled against a SQLite credential table
    let orchestrator = sqlite_orchestrator().await;
    let mut authenticator = enroll(&orchestrator, "carol").await;

    // When logging in twice with an increasing counter
    authenticator.counter = 1;
    let first = login(&orchestrator, "carol", &authenticator, TEST_ORIGIN)
        .await
        .expect("first login should succeed");
    authenticator.counter = 2;
    let second = login(&orchestrator, "carol", &authenticator, TEST_ORIGIN)
        .await
        .expect("second login should succeed");

    // Then each login reports the persisted count
    assert_eq!(first.username, "carol");
    assert_eq!(first.display_name, "carol display");
    assert_eq!(first.sign_count, 1);
    assert_eq!(second.sign_count, 2);
}

#[tokio::test]
async fn test_replayed_counter_is_rejected() {
    // Given a login that recorded counter 5
    let orchestrator = memory_orchestrator().await;
    let mut authenticator = enroll(&orchestrator, "dave").await;
    authenticator.counter = 5;
    login(&orchestrator, "dave", &authenticator, TEST_ORIGIN)
        .await
        .expect("login should succeed");

    // When the authenticator reports the same counter again
    let result = login(&orchestrator, "dave", &authenticator, TEST_ORIGIN).await;

    // Then verification fails
    let err = result.expect_err("replayed counter must fail");
    assert_eq!(err.kind(), ErrorKind::ProtocolVerificationFailure);
}

#[tokio::test]
async fn test_wrong_origin_is_verification_failure() {
    let orchestrator = memory_orchestrator().await;
    let mut authenticator = enroll(&orchestrator, "erin").await;
    authenticator.counter = 1;

    let result = login(&orchestrator, "erin", &authenticator, "https://evil.example").await;

    let err = result.expect_err("foreign origin must fail");
    assert_eq!(err.kind(), ErrorKind::ProtocolVerificationFailure);
}

#[tokio::test]
async fn test_finished_session_cannot_be_reused() {
    // Given a completed login
    let orchestrator = memory_orchestrator().await;
    let mut authenticator = enroll(&orchestrator, "frank").await;
    let challenge = orchestrator
        .begin_login(&BeginLoginRequest {
            username: "frank".to_string(),
        })
        .await
        .unwrap();
    authenticator.counter = 1;
    let request = FinishLoginRequest {
        username: "frank".to_string(),
        credential: authenticator.authenticate(&challenge, TEST_ORIGIN),
    };
    orchestrator.finish_login(&request).await.unwrap();

    // When the same assertion is submitted again
    let result = orchestrator.finish_login(&request).await;

    // Then the session is gone
    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_second_registration_excludes_enrolled_credential() {
    // Given an enrolled identity
    let orchestrator = memory_orchestrator().await;
    let authenticator = enroll(&orchestrator, "grace").await;

    // When starting another registration
    let challenge = orchestrator
        .begin_registration(&BeginRegistrationRequest {
            username: "grace".to_string(),
        })
        .await
        .unwrap();

    // Then the existing credential is listed for exclusion
    let excluded: Vec<_> = challenge
        .public_key
        .exclude_credentials
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(excluded, vec![authenticator.credential_id().as_str()]);
}
