//! Subscription request extraction.
//!
//! A client starts a subscription with a JSON payload of the form
//! `{ "query": string, "operationName"?: string, "variables"?: object }`.
//! A malformed payload is answered with a single diagnostic and never reaches
//! the validator.

use serde_json::{Map, Value};
use sgql_core::Diagnostic;

/// A well-formed subscription request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
}

impl SubscriptionRequest {
    /// Extracts a request from a decoded payload.
    ///
    /// `null` counts as absent for the optional members.
    pub fn from_payload(payload: &Value) -> Result<Self, Diagnostic> {
        let Value::Object(members) = payload else {
            return Err(Diagnostic::new("Invalid format in WebSocket payload"));
        };

        let query = match members.get("query") {
            Some(Value::String(query)) if !query.trim().is_empty() => query.clone(),
            _ => return Err(Diagnostic::new("Query not found")),
        };

        let variables = match members.get("variables") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(variables)) => variables.clone(),
            Some(_) => return Err(invalid_parameter("variables")),
        };

        let operation_name = match members.get("operationName") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => return Err(invalid_parameter("operationName")),
        };

        Ok(Self {
            query,
            operation_name,
            variables,
        })
    }

    /// Extracts a request from payload text.
    pub fn from_text(text: &str) -> Result<Self, Diagnostic> {
        let payload: Value = serde_json::from_str(text)
            .map_err(|_| Diagnostic::new("Invalid format in WebSocket payload"))?;
        Self::from_payload(&payload)
    }
}

fn invalid_parameter(name: &str) -> Diagnostic {
    Diagnostic::new(format!("Invalid format in request parameter: {name}"))
}
