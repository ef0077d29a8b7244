//! Stream session state
//!
//! A session holds the event list and lifecycle state for one run. It is
//! pure state: the network loop in `consumer` drives it through the
//! `on_*` callbacks, which makes the lifecycle testable without a socket.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::event::AgentEvent;

/// Lifecycle of one stream attachment.
///
/// A single enumeration instead of independent connected/running flags,
/// so the two can never disagree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    /// No run in progress
    Idle,
    /// Connect initiated, socket not open yet
    Connecting,
    /// Socket open, consuming events
    Streaming,
    /// Terminal completion event received
    Completed,
    /// Terminal error event or transport failure
    Errored,
    /// Socket closed without a terminal event
    Disconnected,
}

impl StreamState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Connecting => "connecting",
            StreamState::Streaming => "streaming",
            StreamState::Completed => "completed",
            StreamState::Errored => "errored",
            StreamState::Disconnected => "disconnected",
        }
    }

    /// A run is in progress (launch accepted, no terminal event yet)
    pub fn is_running(&self) -> bool {
        matches!(self, StreamState::Connecting | StreamState::Streaming)
    }

    /// The socket is open
    pub fn is_connected(&self) -> bool {
        matches!(self, StreamState::Streaming)
    }

    /// Completed and Errored are sticky: a later close callback must not
    /// overwrite them with Disconnected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Completed | StreamState::Errored)
    }
}

/// Result of feeding one raw frame to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Parsed and appended
    Appended,
    /// Parsed, appended, and the run is over; close the socket
    AppendedTerminal,
    /// Failed to parse; logged and dropped
    Skipped,
}

/// Accumulated state for one stream attachment.
pub struct StreamSession {
    run_id: Option<String>,
    state: StreamState,
    events: Vec<AgentEvent>,
    last_error: Option<String>,
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            run_id: None,
            state: StreamState::Idle,
            events: Vec::new(),
            last_error: None,
        }
    }

    /// Record the run and mark the connection attempt
    pub fn begin(&mut self, run_id: impl Into<String>) {
        self.run_id = Some(run_id.into());
        self.state = StreamState::Connecting;
        self.last_error = None;
    }

    /// Socket opened
    pub fn on_open(&mut self) {
        self.state = StreamState::Streaming;
        debug!("Stream open for run {:?}", self.run_id);
    }

    /// Feed one raw text frame.
    ///
    /// Malformed frames are logged and dropped; consumption continues.
    /// A terminal event flips the state and tells the caller to close.
    pub fn on_message(&mut self, raw: &str) -> MessageOutcome {
        let event: AgentEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping undecodable stream frame: {}", e);
                return MessageOutcome::Skipped;
            }
        };

        let terminal = event.is_terminal();
        match &event {
            AgentEvent::AgentComplete { .. } => {
                self.state = StreamState::Completed;
            }
            AgentEvent::AgentError { error_message, .. } => {
                self.state = StreamState::Errored;
                self.last_error = Some(error_message.clone());
            }
            _ => {}
        }

        self.events.push(event);

        if terminal {
            MessageOutcome::AppendedTerminal
        } else {
            MessageOutcome::Appended
        }
    }

    /// Transport-level failure: terminal for the current run
    pub fn on_transport_error(&mut self, message: impl Into<String>) {
        if self.state.is_terminal() {
            // Already torn down by a terminal event; nothing left to report
            debug!("Transport error after terminal state, ignoring");
            return;
        }
        self.state = StreamState::Errored;
        self.last_error = Some(message.into());
    }

    /// Socket closed (peer-initiated or our own after a terminal event)
    pub fn on_close(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = StreamState::Disconnected;
    }

    /// Drop accumulated events and forget the run id.
    /// Does not touch the connection state.
    pub fn clear(&mut self) {
        self.events.clear();
        self.run_id = None;
        self.last_error = None;
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
