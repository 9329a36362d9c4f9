//! GraphQL endpoint.
//!
//! Only top-level `Query` fields are executed: each selected field is looked
//! up in the [`ResolverRegistry`] and resolved with the request's
//! `ResolverContext`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use authorizer_sdk::ResolverContext;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use cynic_parser::common::OperationType;
use cynic_parser::executable::Selection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphqlError;

pub const TEST_QUERY_FIELD: &str = "testQuery";
pub const TEST_QUERY_GREETING: &str = "Hello from AppSync!";

const QUERY_TYPE_NAME: &str = "Query";

/// Resolves one top-level query field.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(&self, context: &ResolverContext) -> Result<Value, String>;
}

/// Returns the same value for every caller.
pub struct ConstantResolver(Value);

impl ConstantResolver {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }
}

#[async_trait]
impl FieldResolver for ConstantResolver {
    async fn resolve(&self, _context: &ResolverContext) -> Result<Value, String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GraphqlError::new(message)],
        }
    }
}

/// Top-level field to resolve: response key and field name.
struct PlannedField {
    key: String,
    name: String,
}

/// Query field resolvers.
#[derive(Default)]
pub struct ResolverRegistry {
    query_fields: HashMap<String, Arc<dyn FieldResolver>>,
}

impl ResolverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry serving `testQuery` with the constant greeting.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new().register(TEST_QUERY_FIELD, ConstantResolver::new(TEST_QUERY_GREETING))
    }

    #[must_use]
    pub fn register(mut self, field: impl Into<String>, resolver: impl FieldResolver + 'static) -> Self {
        self.query_fields.insert(field.into(), Arc::new(resolver));
        self
    }

    /// Registered query field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.query_fields.keys().map(String::as_str)
    }

    /// Execute a request.
    #[tracing::instrument(skip_all, fields(operation = request.operation_name.as_deref()))]
    pub async fn execute(&self, request: &GraphqlRequest, context: &ResolverContext) -> GraphqlResponse {
        let planned = match self.plan(request) {
            Ok(planned) => planned,
            Err(message) => {
                tracing::debug!(%message, "Query rejected");
                return GraphqlResponse::error(message);
            }
        };

        let mut data = Map::new();
        let mut errors = Vec::new();
        for field in planned {
            let value = if field.name == "__typename" {
                Value::String(QUERY_TYPE_NAME.to_owned())
            } else if let Some(resolver) = self.query_fields.get(&field.name) {
                match resolver.resolve(context).await {
                    Ok(value) => value,
                    Err(message) => {
                        errors.push(GraphqlError::new(format!("{}: {message}", field.key)));
                        Value::Null
                    }
                }
            } else {
                continue;
            };
            data.insert(field.key, value);
        }

        GraphqlResponse {
            data: Some(data),
            errors,
        }
    }

    fn plan(&self, request: &GraphqlRequest) -> Result<Vec<PlannedField>, String> {
        let document = cynic_parser::parse_executable_document(&request.query)
            .map_err(|e| format!("Invalid query: {e}"))?;

        if document.fragments().next().is_some() {
            return Err("Fragments are not supported".to_owned());
        }

        let operation = match request.operation_name.as_deref() {
            Some(name) => document
                .operations()
                .find(|op| op.name() == Some(name))
                .ok_or_else(|| format!("Unknown operation named '{name}'"))?,
            None => {
                let mut operations = document.operations();
                let first = operations
                    .next()
                    .ok_or_else(|| "Document contains no operation".to_owned())?;
                if operations.next().is_some() {
                    return Err("Must provide operation name if query contains multiple operations".to_owned());
                }
                first
            }
        };

        if !matches!(operation.operation_type(), OperationType::Query) {
            return Err(format!(
                "Operation type {:?} is not supported",
                operation.operation_type()
            ));
        }

        operation
            .selection_set()
            .map(|selection| {
                let Selection::Field(field) = selection else {
                    return Err("Fragments are not supported".to_owned());
                };
                let name = field.name();
                if name != "__typename" && !self.query_fields.contains_key(name) {
                    return Err(format!(
                        "Validation error of type FieldUndefined: Field '{name}' in type '{QUERY_TYPE_NAME}' is undefined"
                    ));
                }
                if field.selection_set().next().is_some() {
                    return Err(format!(
                        "Validation error of type SubSelectionNotAllowed: Sub selection not allowed on leaf field '{name}'"
                    ));
                }
                Ok(PlannedField {
                    key: field.alias().unwrap_or(name).to_owned(),
                    name: name.to_owned(),
                })
            })
            .collect()
    }
}

/// `POST <graphql_path>`
///
/// An unreadable body is answered with the rejection's status and an
/// `errors` envelope.
pub async fn graphql_handler(
    State(registry): State<Arc<ResolverRegistry>>,
    Extension(context): Extension<ResolverContext>,
    request: Result<Json<GraphqlRequest>, JsonRejection>,
) -> Response {
    match request {
        Ok(Json(request)) => Json(registry.execute(&request, &context).await).into_response(),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Malformed GraphQL request");
            (
                rejection.status(),
                Json(GraphqlResponse::error(rejection.body_text())),
            )
                .into_response()
        }
    }
}
