#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `appsync-auth` application wiring: configuration, logging, verifier
//! selection, the local gateway and the provisioning commands.

pub mod config;
pub mod provisioning;
pub mod server;
pub mod telemetry;
pub mod verifiers;

pub use config::{AppConfig, LogFormat, LoggingConfig, VerifierConfig};
