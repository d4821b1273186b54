pub mod mock_authenticator;
pub mod test_setup;

pub use mock_authenticator::MockAuthenticator;
pub use test_setup::{TEST_ORIGIN, memory_orchestrator, sqlite_orchestrator};
