mod ceremony;
mod error;
mod router;

pub use error::{ErrorResponse, IntoResponseError};
pub use router::{ceremony_router, ceremony_router_with_trace};

// Re-export the initialization function from passkey_ceremony crate
pub use passkey_ceremony::init;
