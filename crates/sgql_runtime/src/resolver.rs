//! Resolver seam.
//!
//! A subscription resolver turns the operation's root field into a stream of
//! values. The stream is pulled one value at a time and dropped when the
//! subscription ends or is cancelled.

use async_trait::async_trait;
use futures::stream::BoxStream;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Values produced for a root field. An `Err` element ends the stream.
pub type ValueStream = BoxStream<'static, Result<Value, ResolverError>>;

/// Resolver error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolverError {
    #[error("{0}")]
    Message(String),

    #[error("No resolver registered for field \"{0}\"")]
    NotFound(String),
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// The single root field a subscription selects, with materialised arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RootField {
    pub name: String,
    pub response_key: String,
    pub arguments: Map<String, Value>,
    pub operation_name: Option<String>,
}

impl RootField {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            response_key: name.clone(),
            name,
            arguments: Map::new(),
            operation_name: None,
        }
    }

    #[must_use]
    pub fn with_response_key(mut self, key: impl Into<String>) -> Self {
        self.response_key = key.into();
        self
    }

    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }
}

/// Produces the value stream for a root field.
#[async_trait]
pub trait SubscriptionResolver: Send + Sync {
    async fn subscribe(&self, field: &RootField) -> Result<ValueStream, ResolverError>;
}

/// Resolvers keyed by root field name.
#[derive(Default, Clone)]
pub struct ResolverRegistry {
    resolvers: FxHashMap<String, Arc<dyn SubscriptionResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolver for a root field, replacing any previous one.
    #[must_use]
    pub fn register(
        mut self,
        field: impl Into<String>,
        resolver: impl SubscriptionResolver + 'static,
    ) -> Self {
        self.resolvers.insert(field.into(), Arc::new(resolver));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Arc<dyn SubscriptionResolver>> {
        self.resolvers.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.resolvers.contains_key(field)
    }
}

#[async_trait]
impl SubscriptionResolver for ResolverRegistry {
    async fn subscribe(&self, field: &RootField) -> Result<ValueStream, ResolverError> {
        match self.resolvers.get(&field.name) {
            Some(resolver) => resolver.subscribe(field).await,
            None => Err(ResolverError::NotFound(field.name.clone())),
        }
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self.resolvers.keys().collect();
        fields.sort();
        f.debug_struct("ResolverRegistry")
            .field("fields", &fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{stream, StreamExt};
    use serde_json::json;

    struct Counter;

    #[async_trait]
    impl SubscriptionResolver for Counter {
        async fn subscribe(&self, field: &RootField) -> Result<ValueStream, ResolverError> {
            let to = field.arguments.get("to").and_then(Value::as_i64).unwrap_or(0);
            Ok(stream::iter((1..=to).map(|n| Ok(json!(n)))).boxed())
        }
    }

    #[tokio::test]
    async fn test_registry_dispatches_by_field_name() {
        let registry = ResolverRegistry::new().register("count", Counter);
        assert!(registry.contains("count"));

        let field = RootField::new("count").with_argument("to", json!(3));
        let values: Vec<_> = registry.subscribe(&field).await.unwrap().collect().await;
        assert_eq!(values, [Ok(json!(1)), Ok(json!(2)), Ok(json!(3))]);
    }

    #[tokio::test]
    async fn test_registry_reports_missing_resolver() {
        let registry = ResolverRegistry::new();
        let err = registry
            .subscribe(&RootField::new("ticks"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "No resolver registered for field \"ticks\"");
    }
}
