//! Duplex connection seam.
//!
//! The runtime only needs to send text frames and close the connection.
//! Implementations must serialize writes: frames of one subscription are
//! sent in order and never interleave with a close.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Close code for a normal closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close reason sent with `NORMAL_CLOSURE`.
pub const NORMAL_CLOSURE_REASON: &str = "Normal Closure";

/// Transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("send failed: {0}")]
    Send(String),

    #[error("close failed: {0}")]
    Close(String),
}

#[async_trait]
pub trait Connection: Send + Sync {
    /// Sends one text frame.
    async fn send(&self, text: String) -> Result<(), TransportError>;

    /// Closes the connection with a status code and reason.
    async fn close(&self, code: u16, reason: &str) -> Result<(), TransportError>;

    /// Resolves once the peer has gone away. Never resolves by default.
    async fn closed(&self) {
        std::future::pending::<()>().await;
    }
}

/// Closes a connection, logging and swallowing any failure.
pub async fn close_gracefully(connection: &dyn Connection, code: u16, reason: &str) {
    match connection.close(code, reason).await {
        Ok(()) => debug!(code, reason, "connection closed"),
        Err(error) => warn!(code, %error, "failed to close connection"),
    }
}

/// A message written to a channel connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

/// Connection backed by a bounded tokio channel.
///
/// The receiving half is the socket writer. Sends wait for capacity, so a
/// slow peer applies back-pressure to the subscription.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    sender: mpsc::Sender<Outbound>,
}

impl ChannelConnection {
    /// Creates a connection and the receiver its frames arrive on.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Checks if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Cancels `token` when the receiver is dropped.
    pub fn cancel_on_close(&self, token: CancellationToken) -> JoinHandle<()> {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = sender.closed() => token.cancel(),
                () = token.cancelled() => {}
            }
        })
    }

    async fn push(&self, message: Outbound) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(message).await
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    async fn send(&self, text: String) -> Result<(), TransportError> {
        self.push(Outbound::Text(text))
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&self, code: u16, reason: &str) -> Result<(), TransportError> {
        self.push(Outbound::Close {
            code,
            reason: reason.to_string(),
        })
        .await
        .map_err(|err| TransportError::Close(err.to_string()))
    }

    async fn closed(&self) {
        self.sender.closed().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let (connection, mut receiver) = ChannelConnection::channel(4);
        connection.send("a".into()).await.unwrap();
        connection.send("b".into()).await.unwrap();
        connection.close(NORMAL_CLOSURE, NORMAL_CLOSURE_REASON).await.unwrap();

        assert_eq!(receiver.recv().await, Some(Outbound::Text("a".into())));
        assert_eq!(receiver.recv().await, Some(Outbound::Text("b".into())));
        assert_eq!(
            receiver.recv().await,
            Some(Outbound::Close {
                code: 1000,
                reason: "Normal Closure".into()
            })
        );
    }

    #[tokio::test]
    async fn test_send_after_peer_left() {
        let (connection, receiver) = ChannelConnection::channel(1);
        drop(receiver);

        assert!(connection.is_closed());
        assert!(matches!(
            connection.send("a".into()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_close_failure_is_swallowed() {
        let (connection, receiver) = ChannelConnection::channel(1);
        drop(receiver);

        assert!(connection.close(NORMAL_CLOSURE, "bye").await.is_err());
        close_gracefully(&connection, NORMAL_CLOSURE, "bye").await;
    }

    #[tokio::test]
    async fn test_cancel_on_close() {
        let (connection, receiver) = ChannelConnection::channel(1);
        let token = CancellationToken::new();
        let watcher = connection.cancel_on_close(token.clone());

        drop(receiver);
        watcher.await.unwrap();
        assert!(token.is_cancelled());
    }
}
