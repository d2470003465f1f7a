//! Per-connection RPC session.
//!
//! Keeps WebSocket framing and heartbeats at the edge while deferring event
//! reads to the injected [`EventQuery`] port. The server pings every 5s and
//! considers a connection idle after 10s without client traffic. Tests
//! shorten both intervals.
//!
//! A failed call is terminal: the client receives a `status` frame and the
//! socket closes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use futures_util::StreamExt;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::EventQuery;
use crate::domain::{Error, ErrorCode};
use crate::inbound::ws::messages::{RpcRequest, ServerFrame, StatusCode};

/// Time between heartbeats to the client.
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client.
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

const REDACTED: &str = "Internal server error";

pub(super) async fn handle_rpc_session(
    events: Arc<dyn EventQuery>,
    session: Session,
    stream: MessageStream,
) {
    RpcSession::new(events).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    CallFailed,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct RpcSession {
    events: Arc<dyn EventQuery>,
}

impl RpcSession {
    fn new(events: Arc<dyn EventQuery>) -> Self {
        Self { events }
    }

    async fn run(&self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Text(text) => {
                self.handle_text_message(session, text.as_ref()).await?;
                // Streaming a long feed must not count against the idle timer.
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let request = match serde_json::from_str::<RpcRequest>(text) {
            Ok(request) => request,
            Err(error) => {
                warn!(error = %error, "Rejected malformed RPC payload");
                let frame = ServerFrame::status(StatusCode::InvalidArgument, error.to_string());
                self.send_frame(session, &frame)
                    .await
                    .map_err(SessionError::Network)?;
                return Err(SessionError::InvalidPayload);
            }
        };

        match request {
            RpcRequest::ListEvents => self.list_events(session).await,
        }
    }

    async fn list_events(&self, session: &mut Session) -> Result<(), SessionError> {
        let mut feed = match self.events.stream().await {
            Ok(feed) => feed,
            Err(error) => return self.fail_call(session, &error).await,
        };

        let mut count: u64 = 0;
        while let Some(row) = feed.next().await {
            match row {
                Ok(summary) => {
                    let frame = ServerFrame::Event {
                        event: summary.into(),
                    };
                    self.send_frame(session, &frame)
                        .await
                        .map_err(SessionError::Network)?;
                    count += 1;
                }
                Err(error) => return self.fail_call(session, &error).await,
            }
        }

        debug!(count, "listEvents complete");
        self.send_frame(session, &ServerFrame::End { count })
            .await
            .map_err(SessionError::Network)
    }

    async fn fail_call(&self, session: &mut Session, error: &Error) -> Result<(), SessionError> {
        warn!(
            code = error.code().as_str(),
            message = error.message(),
            "listEvents failed"
        );
        let message = if error.code() == ErrorCode::InternalError {
            REDACTED
        } else {
            error.message()
        };
        self.send_frame(session, &ServerFrame::status(StatusCode::Internal, message))
            .await
            .map_err(SessionError::Network)?;
        Err(SessionError::CallFailed)
    }

    async fn send_frame(&self, session: &mut Session, frame: &ServerFrame) -> Result<(), Closed> {
        match serde_json::to_string(frame) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize RPC frame");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("RPC heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "RPC protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "RPC send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::CallFailed
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::CallFailed => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Error,
                description: Some("call failed".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close RPC session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
