//! Agent event stream module
//! One WebSocket attachment per run: events in, ordered list out

pub mod consumer;
pub mod event;
pub mod session;

pub use consumer::{StreamConsumer, StreamError};
pub use event::AgentEvent;
pub use session::{MessageOutcome, StreamSession, StreamState};
