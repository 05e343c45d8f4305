//! Subscription runtime for sgql.
//!
//! This crate provides:
//! - `payload`: Extraction of subscription requests from client payloads
//! - `response`: Response envelopes and the result-shaping seam
//! - `resolver`: The seam producing value streams for root fields
//! - `arguments`: Conversion of argument literals to JSON
//! - `connection`: The duplex connection seam and a channel-backed implementation
//! - `framer`: Mapping of events to wire frames per sub-protocol
//! - `dispatcher`: Driving one subscription's value stream into frames
//! - `session`: Request handling from payload to terminal frame

pub mod arguments;
pub mod connection;
pub mod dispatcher;
pub mod framer;
pub mod payload;
pub mod resolver;
pub mod response;
pub mod session;

pub use connection::{
    close_gracefully, ChannelConnection, Connection, Outbound, TransportError, NORMAL_CLOSURE,
    NORMAL_CLOSURE_REASON,
};
pub use dispatcher::{root_field, DispatchError, DispatchOutcome, Dispatcher};
pub use framer::{Event, FrameKind, Framer, SubProtocol};
pub use payload::SubscriptionRequest;
pub use resolver::{ResolverError, ResolverRegistry, RootField, SubscriptionResolver, ValueStream};
pub use response::{KeyedShaper, Response, ResultShaper};
pub use session::{QueryParser, SessionConfig, SubscriptionSession};
