//! Ceremony session state kept between begin and finish

mod cache;
mod key;

pub use cache::SessionCache;
pub use key::{CeremonyKind, SessionKey};
