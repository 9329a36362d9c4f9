mod claims;
mod client;
pub mod error;
pub mod jwks;
pub mod service;

pub use error::{ConfigError, JwksError};
pub use service::SignedJwtVerifier;
