//! Agent stream event records
//!
//! Events arrive over the stream as JSON objects tagged by `event_type`.
//! Unrecognized tags fall through to `Unknown` rather than failing the
//! whole frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tagged message pushed over the agent stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The agent run has started
    AgentStart {
        run_id: String,
        timestamp: Option<DateTime<Utc>>,
        input_text: Option<String>,
        message: Option<String>,
    },

    /// The agent invoked a tool
    ToolCall {
        run_id: String,
        timestamp: Option<DateTime<Utc>>,
        tool_name: Option<String>,
        #[serde(default)]
        tool_args: serde_json::Value,
        message: Option<String>,
    },

    /// A tool produced output
    ToolOutput {
        run_id: String,
        timestamp: Option<DateTime<Utc>>,
        tool_name: Option<String>,
        #[serde(default)]
        output: serde_json::Value,
        message: Option<String>,
    },

    /// Text output from the model
    LlmOutput {
        run_id: String,
        timestamp: Option<DateTime<Utc>>,
        content: String,
        #[serde(default)]
        is_complete: bool,
        message: Option<String>,
    },

    /// The run finished successfully (terminal)
    AgentComplete {
        run_id: String,
        timestamp: Option<DateTime<Utc>>,
        final_output: String,
        message: Option<String>,
    },

    /// The run failed (terminal)
    AgentError {
        run_id: String,
        timestamp: Option<DateTime<Utc>>,
        error_message: String,
        error_type: Option<String>,
        message: Option<String>,
    },

    /// Server acknowledgement sent right after the socket opens
    ConnectionEstablished {
        run_id: Option<String>,
        message: Option<String>,
    },

    /// Any tag we don't recognize
    #[serde(other)]
    Unknown,
}

impl AgentEvent {
    /// Terminal events end the run; the consumer closes the socket
    /// without waiting for the peer.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::AgentComplete { .. } | AgentEvent::AgentError { .. }
        )
    }

    /// Run identifier carried by the event, if any
    pub fn run_id(&self) -> Option<&str> {
        match self {
            AgentEvent::AgentStart { run_id, .. }
            | AgentEvent::ToolCall { run_id, .. }
            | AgentEvent::ToolOutput { run_id, .. }
            | AgentEvent::LlmOutput { run_id, .. }
            | AgentEvent::AgentComplete { run_id, .. }
            | AgentEvent::AgentError { run_id, .. } => Some(run_id),
            AgentEvent::ConnectionEstablished { run_id, .. } => run_id.as_deref(),
            AgentEvent::Unknown => None,
        }
    }
}
