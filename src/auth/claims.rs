use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload minted by the external identity provider. Only `sub` matters
/// to this service; it is the stable per-user key everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}
