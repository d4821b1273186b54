use std::fmt;

/// Which ceremony a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeremonyKind {
    Register,
    Login,
}

impl CeremonyKind {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Register => "webauthn_session",
            Self::Login => "webauthn_login_session",
        }
    }
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::Login => write!(f, "login"),
        }
    }
}

/// Cache key for the live session of one (kind, username) pair.
///
/// The only place cache keys are formatted, so begin and finish always agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(kind: CeremonyKind, username: &str) -> Self {
        Self(format!("{}:{}", kind.prefix(), username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
