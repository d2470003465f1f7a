//! Wire-level frames for the event streaming RPC.
//!
//! Clients send one [`RpcRequest`] per call. The server answers a
//! `listEvents` call with an `event` frame per row followed by an `end`
//! frame, or a single `status` frame when the call fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EventSummary;

/// Inbound call envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum RpcRequest {
    /// Stream every stored event.
    ListEvents,
}

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }
}

/// Event as carried on the stream. Authors are not embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<EventSummary> for EventMessage {
    fn from(value: EventSummary) -> Self {
        Self {
            id: value.id.get(),
            title: value.title,
            content: value.content,
            author_id: value.author_id.get(),
            created_at: value.created_at.into(),
            updated_at: value.updated_at.into(),
        }
    }
}

/// RPC status codes reported in `status` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// The call could not be decoded.
    InvalidArgument,
    /// The call failed while fetching or sending rows.
    Internal,
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    Event { event: EventMessage },
    End { count: u64 },
    Status { code: StatusCode, message: String },
}

impl ServerFrame {
    pub fn status(code: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }
}
