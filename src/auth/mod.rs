pub mod claims;
pub mod extractors;
pub mod identity;

pub use extractors::AuthUser;
pub use identity::{Anonymous, Identity, SessionIdentity};
