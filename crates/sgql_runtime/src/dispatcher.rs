//! Subscription dispatch.
//!
//! One dispatch drives one subscription: it asks the resolver for a value
//! stream, shapes each value into a response and sends it as a `next` frame.
//! The stream ending sends `complete`; a stream error sends `error`. Both are
//! terminal and the stream is never pulled again.
//!
//! Every await races the cancellation token and the connection's close
//! signal, so a peer that goes away releases the stream at the next pull.

use crate::arguments;
use crate::connection::{Connection, TransportError};
use crate::framer::{Event, Framer};
use crate::resolver::{RootField, SubscriptionResolver};
use crate::response::{KeyedShaper, ResultShaper};
use futures::StreamExt;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use sgql_core::Diagnostic;
use sgql_syntax::{FieldSelection, FragmentTable, OperationDefinition, Selection};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The stream ended and `complete` was sent.
    Completed,
    /// The stream failed and `error` was sent.
    Errored,
    /// The subscription was cancelled or the peer left. Nothing more was sent.
    Cancelled,
    /// The resolver could not produce a stream and `error` was sent.
    SetupFailed,
    /// The request was rejected before dispatch and `error` was sent.
    Rejected,
}

impl DispatchOutcome {
    /// Returns true if a terminal frame was sent.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Dispatch error.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Drives subscriptions over one connection.
pub struct Dispatcher {
    connection: Arc<dyn Connection>,
    resolver: Arc<dyn SubscriptionResolver>,
    shaper: Arc<dyn ResultShaper>,
    framer: Framer,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        connection: Arc<dyn Connection>,
        resolver: Arc<dyn SubscriptionResolver>,
        framer: Framer,
    ) -> Self {
        Self {
            connection,
            resolver,
            shaper: Arc::new(KeyedShaper),
            framer,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_shaper(mut self, shaper: Arc<dyn ResultShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a handle that cancels this dispatcher's subscriptions.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Encodes and sends one event. Events without a wire message are skipped.
    pub async fn send_event(&self, event: &Event) -> Result<(), DispatchError> {
        if let Some(text) = self.framer.frame(event)? {
            trace!(kind = %event.kind(), "sending frame");
            self.connection.send(text).await?;
        }
        Ok(())
    }

    /// Answers a request that failed before dispatch with one `error` frame.
    pub async fn reject(&self, errors: Vec<Diagnostic>) -> Result<DispatchOutcome, DispatchError> {
        debug!(errors = errors.len(), "rejecting subscription");
        self.send_event(&Event::Error(errors)).await?;
        Ok(DispatchOutcome::Rejected)
    }

    /// Runs a subscription to its end.
    pub async fn dispatch(&self, field: &RootField) -> Result<DispatchOutcome, DispatchError> {
        let setup = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Ok(self.cancelled(field)),
            () = self.connection.closed() => return Ok(self.cancelled(field)),
            setup = self.resolver.subscribe(field) => setup,
        };

        let mut stream = match setup {
            Ok(stream) => stream,
            Err(error) => {
                warn!(field = %field.name, %error, "subscription setup failed");
                self.send_event(&Event::error(error.to_string())).await?;
                return Ok(DispatchOutcome::SetupFailed);
            }
        };
        debug!(field = %field.name, "subscription started");

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Ok(self.cancelled(field)),
                () = self.connection.closed() => return Ok(self.cancelled(field)),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(value)) => {
                    let response = self.shaper.shape(field, value);
                    if response.is_empty() {
                        trace!(field = %field.name, "skipping empty response");
                        continue;
                    }
                    self.send_event(&Event::Next(response)).await?;
                }
                Some(Err(error)) => {
                    debug!(field = %field.name, %error, "subscription stream failed");
                    self.send_event(&Event::error(error.to_string())).await?;
                    return Ok(DispatchOutcome::Errored);
                }
                None => {
                    debug!(field = %field.name, "subscription stream ended");
                    self.send_event(&Event::Complete).await?;
                    return Ok(DispatchOutcome::Completed);
                }
            }
        }
    }

    fn cancelled(&self, field: &RootField) -> DispatchOutcome {
        debug!(field = %field.name, "subscription cancelled");
        DispatchOutcome::Cancelled
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("framer", &self.framer)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Finds the single root field of a subscription and materialises its
/// arguments.
///
/// Fragments are expanded. Fields sharing a response key count once.
pub fn root_field(
    operation: &OperationDefinition,
    fragments: &FragmentTable<'_>,
    variables: &Map<String, Value>,
) -> Result<RootField, Diagnostic> {
    let mut fields = Vec::new();
    collect_fields(
        &operation.selection_set.selections,
        fragments,
        &mut FxHashSet::default(),
        &mut fields,
    );

    let Some(first) = fields.first() else {
        return Err(single_field_error(operation));
    };
    if fields
        .iter()
        .any(|field| field.response_key() != first.response_key())
    {
        return Err(single_field_error(operation));
    }

    Ok(RootField {
        name: first.name.value.clone(),
        response_key: first.response_key().to_string(),
        arguments: arguments::materialize(&first.arguments, variables, &operation.variables),
        operation_name: operation.name.as_ref().map(|name| name.value.clone()),
    })
}

fn collect_fields<'a>(
    selections: &'a [Selection],
    fragments: &FragmentTable<'a>,
    visited: &mut FxHashSet<&'a str>,
    fields: &mut Vec<&'a FieldSelection>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => fields.push(field),
            Selection::InlineFragment(inline) => {
                collect_fields(&inline.selection_set.selections, fragments, visited, fields);
            }
            Selection::FragmentSpread(spread) => {
                if !visited.insert(spread.name.as_str()) {
                    continue;
                }
                if let Some(fragment) = fragments.get(spread.name.as_str()) {
                    collect_fields(&fragment.selection_set.selections, fragments, visited, fields);
                }
            }
        }
    }
}

fn single_field_error(operation: &OperationDefinition) -> Diagnostic {
    let message = match &operation.name {
        Some(name) => format!(
            "Subscription \"{}\" must select only one top level field.",
            name.value
        ),
        None => "Anonymous Subscription must select only one top level field.".to_string(),
    };
    Diagnostic::at(message, operation.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sgql_core::Pos;
    use sgql_syntax::builder::*;
    use sgql_syntax::Document;

    fn operation(document: &Document) -> &OperationDefinition {
        document.operations().next().unwrap()
    }

    #[test]
    fn test_single_root_field() {
        let document = document([
            subscription([spread("onMessage").into()])
                .named("OnMessage")
                .variable("room", Some(string("lobby")))
                .into(),
            fragment(
                "onMessage",
                "Subscription",
                [field("newMessage")
                    .alias("message")
                    .arg("room", variable("room"))
                    .select([field("body").into()])
                    .into()],
            )
            .into(),
        ]);
        let fragments = FragmentTable::new(&document);

        let field = root_field(operation(&document), &fragments, &Map::new()).unwrap();
        assert_eq!(field.name, "newMessage");
        assert_eq!(field.response_key, "message");
        assert_eq!(field.arguments["room"], json!("lobby"));
        assert_eq!(field.operation_name.as_deref(), Some("OnMessage"));
    }

    #[test]
    fn test_repeated_response_key_counts_once() {
        let document = document([subscription([
            field("newMessage").select([field("body").into()]).into(),
            inline(None, [field("newMessage").select([field("id").into()]).into()]).into(),
        ])
        .into()]);
        let fragments = FragmentTable::new(&document);
        assert!(root_field(operation(&document), &fragments, &Map::new()).is_ok());
    }

    #[test]
    fn test_multiple_root_fields() {
        let named = document([subscription([field("a").into(), field("b").into()])
            .named("Both")
            .at(1, 1)
            .into()]);
        let err = root_field(operation(&named), &FragmentTable::new(&named), &Map::new())
            .unwrap_err();
        assert_eq!(
            err.message,
            "Subscription \"Both\" must select only one top level field."
        );
        assert_eq!(err.locations, [Pos::new(1, 1)]);

        let anonymous = document([subscription([field("a").into(), field("b").alias("c").into()]).into()]);
        let err = root_field(operation(&anonymous), &FragmentTable::new(&anonymous), &Map::new())
            .unwrap_err();
        assert_eq!(
            err.message,
            "Anonymous Subscription must select only one top level field."
        );
    }

    #[test]
    fn test_outcome_terminality() {
        assert!(DispatchOutcome::Completed.is_terminal());
        assert!(DispatchOutcome::Rejected.is_terminal());
        assert!(!DispatchOutcome::Cancelled.is_terminal());
    }
}
