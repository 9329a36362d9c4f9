//! Domain layer for the authorizer.

pub mod local_client;
pub mod service;

pub use local_client::AuthorizerLocalClient;
pub use service::Service;
