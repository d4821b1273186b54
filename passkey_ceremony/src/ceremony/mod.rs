//! Ceremony orchestration: begin/finish for registration and login

mod errors;
mod orchestrator;
mod types;

pub use errors::{CeremonyError, ErrorKind};
pub use orchestrator::CeremonyOrchestrator;
pub use types::{
    BackupEligibilityPolicy, BeginLoginRequest, BeginRegistrationRequest, CeremonyPolicy,
    FinishLoginRequest, FinishRegistrationRequest, VerifiedUser,
};
