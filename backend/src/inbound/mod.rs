//! Inbound adapters translating external requests into domain port calls.
//!
//! REST handlers live under [`http`]; the WebSocket streaming RPC lives under
//! [`ws`].

pub mod http;
pub mod ws;
