//! Auth domain - inbound bearer token verification
//!
//! Tokens are RS256-signed by the identity provider. The key set is fetched
//! from its JWKS endpoint and cached; role checks look at both realm roles and
//! the roles granted to this service's client id.

pub mod errors;
pub mod jwks;
pub mod jwt;

pub use errors::AuthError;
pub use jwks::JwksCache;
pub use jwt::{AccessClaims, RoleSet, TokenVerifier};
