#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! API Gateway
//!
//! Local stand-in for the managed GraphQL gateway: extracts the
//! `Authorization` header, asks the authorizer (with a decision cache and a
//! timeout), and on allow executes the query with the granted
//! `ResolverContext`.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod module;
pub mod web;

pub use cache::DecisionCache;
pub use config::{ApiGatewayConfig, AuthorizerErrorPolicy};
pub use graphql::{ConstantResolver, FieldResolver, ResolverRegistry};
pub use module::ApiGateway;
