//! Message framing.
//!
//! Without a negotiated sub-protocol every frame is the bare JSON payload and
//! `complete` produces no message at all. With a sub-protocol every frame is
//! wrapped as `{"type", "id"?, "payload"?}`.
//!
//! Under `graphql-transport-ws` results go out as `data` frames, so both
//! `next` and `error` are sent as `data` there and the error list is wrapped
//! as `{"errors": [...]}`. Clients of that protocol depend on this mapping.
//! Under `graphql-ws` frame types are sent unchanged and an error payload is
//! the bare list.

use crate::response::Response;
use serde::Serialize;
use sgql_core::Diagnostic;
use std::fmt;

/// Negotiated WebSocket sub-protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubProtocol {
    /// The `graphql-ws` protocol.
    GraphqlWs,
    /// The `graphql-transport-ws` protocol. Results are sent as `data`.
    GraphqlTransportWs,
}

/// Frame types as sent under `graphql-transport-ws`.
const TRANSPORT_FRAME_KINDS: [(FrameKind, FrameKind); 3] = [
    (FrameKind::Next, FrameKind::Data),
    (FrameKind::Error, FrameKind::Data),
    (FrameKind::Complete, FrameKind::Complete),
];

impl SubProtocol {
    pub const fn name(self) -> &'static str {
        match self {
            Self::GraphqlWs => "graphql-ws",
            Self::GraphqlTransportWs => "graphql-transport-ws",
        }
    }

    /// Parses a `Sec-WebSocket-Protocol` value.
    ///
    /// The first recognized protocol in a comma-separated list wins. Anything
    /// else means raw frames.
    pub fn from_header(header: Option<&str>) -> Option<Self> {
        header?.split(',').find_map(|name| match name.trim() {
            "graphql-ws" => Some(Self::GraphqlWs),
            "graphql-transport-ws" => Some(Self::GraphqlTransportWs),
            _ => None,
        })
    }

    /// Frame type used on the wire for an event.
    pub fn wire_kind(self, kind: FrameKind) -> FrameKind {
        match self {
            Self::GraphqlTransportWs => TRANSPORT_FRAME_KINDS
                .iter()
                .find(|(from, _)| *from == kind)
                .map_or(kind, |(_, to)| *to),
            Self::GraphqlWs => kind,
        }
    }
}

impl fmt::Display for SubProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Next,
    Error,
    Complete,
    Data,
}

impl FrameKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Error => "error",
            Self::Complete => "complete",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event of one subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Next(Response),
    Error(Vec<Diagnostic>),
    Complete,
}

impl Event {
    /// An error event with a single message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(vec![Diagnostic::new(message)])
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Next(_) => FrameKind::Next,
            Self::Error(_) => FrameKind::Error,
            Self::Complete => FrameKind::Complete,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Payload<'a> {
    Response(&'a Response),
    Errors { errors: &'a [Diagnostic] },
    ErrorList(&'a [Diagnostic]),
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Payload<'a>>,
}

/// Encodes events of one subscription.
#[derive(Debug, Clone, Default)]
pub struct Framer {
    protocol: Option<SubProtocol>,
    id: Option<String>,
}

impl Framer {
    pub fn new(protocol: Option<SubProtocol>) -> Self {
        Self { protocol, id: None }
    }

    /// Sets the operation id echoed in enveloped frames.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn protocol(&self) -> Option<SubProtocol> {
        self.protocol
    }

    /// Encodes an event. Returns `None` when the event has no wire message.
    pub fn frame(&self, event: &Event) -> Result<Option<String>, serde_json::Error> {
        let payload = match event {
            Event::Next(response) => Some(Payload::Response(response)),
            Event::Error(errors) => Some(match self.protocol {
                Some(SubProtocol::GraphqlWs) => Payload::ErrorList(errors),
                _ => Payload::Errors { errors },
            }),
            Event::Complete => None,
        };

        match self.protocol {
            None => payload
                .map(|payload| serde_json::to_string(&payload))
                .transpose(),
            Some(protocol) => {
                let envelope = Envelope {
                    kind: protocol.wire_kind(event.kind()).as_str(),
                    id: self.id.as_deref(),
                    payload,
                };
                serde_json::to_string(&envelope).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sgql_core::Pos;

    fn next() -> Event {
        Event::Next(Response::data(json!({ "count": 1 })))
    }

    #[test]
    fn test_from_header() {
        assert_eq!(SubProtocol::from_header(None), None);
        assert_eq!(SubProtocol::from_header(Some("chat")), None);
        assert_eq!(
            SubProtocol::from_header(Some("graphql-ws")),
            Some(SubProtocol::GraphqlWs)
        );
        assert_eq!(
            SubProtocol::from_header(Some("chat, graphql-transport-ws, graphql-ws")),
            Some(SubProtocol::GraphqlTransportWs)
        );
    }

    #[test]
    fn test_transport_remap_table() {
        let transport = SubProtocol::GraphqlTransportWs;
        assert_eq!(transport.wire_kind(FrameKind::Next), FrameKind::Data);
        assert_eq!(transport.wire_kind(FrameKind::Error), FrameKind::Data);
        assert_eq!(transport.wire_kind(FrameKind::Complete), FrameKind::Complete);

        let ws = SubProtocol::GraphqlWs;
        for kind in [FrameKind::Next, FrameKind::Error, FrameKind::Complete] {
            assert_eq!(ws.wire_kind(kind), kind);
        }
    }

    #[test]
    fn test_raw_frames() {
        let framer = Framer::new(None);
        insta::assert_snapshot!(framer.frame(&next()).unwrap().unwrap(), @r#"{"data":{"count":1}}"#);
        insta::assert_snapshot!(
            framer.frame(&Event::error("boom")).unwrap().unwrap(),
            @r#"{"errors":[{"message":"boom"}]}"#
        );
        assert_eq!(framer.frame(&Event::Complete).unwrap(), None);
    }

    #[test]
    fn test_transport_frames() {
        let framer = Framer::new(SubProtocol::from_header(Some("graphql-transport-ws"))).with_id("1");
        insta::assert_snapshot!(
            framer.frame(&next()).unwrap().unwrap(),
            @r#"{"type":"data","id":"1","payload":{"data":{"count":1}}}"#
        );
        insta::assert_snapshot!(
            framer.frame(&Event::error("boom")).unwrap().unwrap(),
            @r#"{"type":"data","id":"1","payload":{"errors":[{"message":"boom"}]}}"#
        );
        insta::assert_snapshot!(
            framer.frame(&Event::Complete).unwrap().unwrap(),
            @r#"{"type":"complete","id":"1"}"#
        );
    }

    #[test]
    fn test_graphql_ws_frames() {
        let framer = Framer::new(Some(SubProtocol::GraphqlWs)).with_id("7");
        insta::assert_snapshot!(
            framer.frame(&next()).unwrap().unwrap(),
            @r#"{"type":"next","id":"7","payload":{"data":{"count":1}}}"#
        );
        let located = Event::Error(vec![Diagnostic::at("bad", Pos::new(1, 3))]);
        insta::assert_snapshot!(
            framer.frame(&located).unwrap().unwrap(),
            @r#"{"type":"error","id":"7","payload":[{"message":"bad","locations":[{"line":1,"column":3}]}]}"#
        );
    }

    #[test]
    fn test_envelope_without_id() {
        let framer = Framer::new(Some(SubProtocol::GraphqlTransportWs));
        assert_eq!(
            framer.frame(&Event::Complete).unwrap().as_deref(),
            Some(r#"{"type":"complete"}"#)
        );
    }
}
