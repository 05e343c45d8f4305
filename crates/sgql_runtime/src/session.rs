//! Subscription sessions.
//!
//! A session handles one subscribe request end to end: payload extraction,
//! parsing, validation, root field preparation and dispatch. Any failure
//! before dispatch is answered with a single `error` frame. Without a
//! negotiated sub-protocol the connection is closed after the terminal frame.

use crate::connection::{close_gracefully, ChannelConnection, Connection, Outbound};
use crate::connection::{NORMAL_CLOSURE, NORMAL_CLOSURE_REASON};
use crate::dispatcher::{root_field, DispatchError, DispatchOutcome, Dispatcher};
use crate::framer::{Framer, SubProtocol};
use crate::payload::SubscriptionRequest;
use crate::resolver::{RootField, SubscriptionResolver};
use crate::response::{KeyedShaper, ResultShaper};
use serde_json::Value;
use sgql_core::Diagnostic;
use sgql_semantic::{validate, Schema};
use sgql_syntax::{select_operation, Document, FragmentTable, OperationType};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Turns query text into a document.
pub trait QueryParser: Send + Sync {
    fn parse(&self, query: &str) -> Result<Document, Vec<Diagnostic>>;
}

impl<F> QueryParser for F
where
    F: Fn(&str) -> Result<Document, Vec<Diagnostic>> + Send + Sync,
{
    fn parse(&self, query: &str) -> Result<Document, Vec<Diagnostic>> {
        self(query)
    }
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Negotiated sub-protocol, if any.
    pub protocol: Option<SubProtocol>,
    /// Capacity of the outbound channel of channel connections.
    pub channel_capacity: usize,
    /// Close code used after the terminal frame in raw mode.
    pub close_code: u16,
    /// Close reason used after the terminal frame in raw mode.
    pub close_reason: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            protocol: None,
            channel_capacity: 16,
            close_code: NORMAL_CLOSURE,
            close_reason: NORMAL_CLOSURE_REASON.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sub-protocol from a `Sec-WebSocket-Protocol` header value.
    pub fn with_protocol_header(mut self, header: Option<&str>) -> Self {
        self.protocol = SubProtocol::from_header(header);
        self
    }

    pub fn with_protocol(mut self, protocol: Option<SubProtocol>) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_close(mut self, code: u16, reason: impl Into<String>) -> Self {
        self.close_code = code;
        self.close_reason = reason.into();
        self
    }
}

/// Handles subscribe requests against one schema.
pub struct SubscriptionSession {
    schema: Arc<Schema>,
    parser: Arc<dyn QueryParser>,
    resolver: Arc<dyn SubscriptionResolver>,
    shaper: Arc<dyn ResultShaper>,
    config: SessionConfig,
}

impl SubscriptionSession {
    pub fn new(
        schema: Arc<Schema>,
        parser: Arc<dyn QueryParser>,
        resolver: Arc<dyn SubscriptionResolver>,
    ) -> Self {
        Self {
            schema,
            parser,
            resolver,
            shaper: Arc::new(KeyedShaper),
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_shaper(mut self, shaper: Arc<dyn ResultShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Opens a channel connection sized by the configuration.
    pub fn open_channel(&self) -> (Arc<ChannelConnection>, mpsc::Receiver<Outbound>) {
        let (connection, receiver) = ChannelConnection::channel(self.config.channel_capacity);
        (Arc::new(connection), receiver)
    }

    /// Handles one subscribe request until its terminal frame or cancellation.
    ///
    /// `id` is the client's operation id, echoed in enveloped frames.
    pub async fn run(
        &self,
        connection: Arc<dyn Connection>,
        id: Option<&str>,
        payload: &Value,
        cancel: CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut framer = Framer::new(self.config.protocol);
        if let Some(id) = id {
            framer = framer.with_id(id);
        }
        let dispatcher = Dispatcher::new(Arc::clone(&connection), Arc::clone(&self.resolver), framer)
            .with_shaper(Arc::clone(&self.shaper))
            .with_cancellation(cancel);

        let outcome = match self.prepare(payload) {
            Ok(field) => {
                info!(
                    field = %field.name,
                    operation = field.operation_name.as_deref(),
                    "subscription accepted"
                );
                dispatcher.dispatch(&field).await?
            }
            Err(errors) => dispatcher.reject(errors).await?,
        };

        if self.config.protocol.is_none() && outcome.is_terminal() {
            close_gracefully(
                connection.as_ref(),
                self.config.close_code,
                &self.config.close_reason,
            )
            .await;
        }
        Ok(outcome)
    }

    fn prepare(&self, payload: &Value) -> Result<RootField, Vec<Diagnostic>> {
        let request = SubscriptionRequest::from_payload(payload).map_err(|error| vec![error])?;
        let mut document = self.parser.parse(&request.query)?;

        let (_, fragment_errors) = FragmentTable::build(&document);
        let mut errors = fragment_errors.into_vec();
        errors.extend(validate(&self.schema, &mut document));
        if !errors.is_empty() {
            debug!(errors = errors.len(), "subscription document is invalid");
            return Err(errors);
        }

        let operation = select_operation(&document, request.operation_name.as_deref())
            .map_err(|error| vec![error])?;
        if operation.operation != OperationType::Subscription {
            return Err(vec![Diagnostic::at(
                format!(
                    "Operation type \"{}\" is not supported over this connection.",
                    operation.operation
                ),
                operation.pos,
            )]);
        }

        let fragments = FragmentTable::new(&document);
        root_field(operation, &fragments, &request.variables).map_err(|error| vec![error])
    }
}

impl std::fmt::Debug for SubscriptionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.protocol, None);
        assert_eq!(config.close_code, 1000);
        assert_eq!(config.close_reason, "Normal Closure");
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new()
            .with_protocol_header(Some("graphql-transport-ws"))
            .with_channel_capacity(2)
            .with_close(4400, "Bye");
        assert_eq!(config.protocol, Some(SubProtocol::GraphqlTransportWs));
        assert_eq!(config.channel_capacity, 2);
        assert_eq!(config.close_code, 4400);
        assert_eq!(config.close_reason, "Bye");

        let config = config.with_protocol(None);
        assert_eq!(config.protocol, None);
    }
}
