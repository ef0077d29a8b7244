//! WebSocket stream consumer
//!
//! Connects to `/agent/stream/{run_id}` and drives a `StreamSession`
//! from the incoming frames. One attachment per run: no reconnect, no
//! backoff. The socket is released unconditionally when the loop ends.

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};
use url::Url;

use super::event::AgentEvent;
use super::session::{MessageOutcome, StreamSession};

/// Errors from launching or consuming a stream
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Consumes one agent event stream per run identifier.
pub struct StreamConsumer {
    base_url: Url,
}

impl StreamConsumer {
    /// Build a consumer for the given server base address (http or https)
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StreamError::InvalidAddress(format!("{}: {}", base_url, e)))?;
        Ok(Self { base_url })
    }

    /// Stream endpoint for a run, with the scheme upgraded to ws(s)
    pub fn stream_url(&self, run_id: &str) -> Result<Url, StreamError> {
        if run_id.is_empty() {
            return Err(StreamError::InvalidAddress(
                "run id must not be empty".to_string(),
            ));
        }

        let mut url = self.base_url.clone();

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(StreamError::UnsupportedScheme(other.to_string())),
        };
        url.set_scheme(scheme)
            .map_err(|_| StreamError::UnsupportedScheme(scheme.to_string()))?;

        let path = format!(
            "{}/agent/stream/{}",
            url.path().trim_end_matches('/'),
            run_id
        );
        url.set_path(&path);

        Ok(url)
    }

    /// Attach to the stream for `run_id` and consume it to completion.
    ///
    /// Every successfully parsed event is appended to the session and
    /// handed to `on_event` in arrival order. Returns when a terminal
    /// event arrives (we close the socket ourselves), the peer closes,
    /// or the transport fails.
    pub async fn attach<F>(
        &self,
        session: &mut StreamSession,
        run_id: &str,
        mut on_event: F,
    ) -> Result<(), StreamError>
    where
        F: FnMut(&AgentEvent),
    {
        let url = self.stream_url(run_id)?;
        session.begin(run_id);

        info!("Connecting to agent stream: {}", url);

        let (socket, _response) = match connect_async(url.as_str()).await {
            Ok(pair) => pair,
            Err(e) => {
                let msg = e.to_string();
                session.on_transport_error(msg.as_str());
                return Err(StreamError::ConnectFailed(msg));
            }
        };

        session.on_open();

        let (mut writer, mut reader) = socket.split();

        let result = loop {
            let frame = match reader.next().await {
                Some(frame) => frame,
                // Stream exhausted without a close frame
                None => {
                    session.on_close();
                    break Ok(());
                }
            };

            match frame {
                Ok(Message::Text(raw)) => match session.on_message(&raw) {
                    MessageOutcome::Appended => {
                        if let Some(event) = session.events().last() {
                            on_event(event);
                        }
                    }
                    MessageOutcome::AppendedTerminal => {
                        if let Some(event) = session.events().last() {
                            on_event(event);
                        }
                        // Do not wait for the peer to close
                        debug!("Terminal event received, closing stream");
                        let _ = writer.send(Message::Close(None)).await;
                        break Ok(());
                    }
                    MessageOutcome::Skipped => {}
                },
                Ok(Message::Close(_)) => {
                    debug!("Stream closed by server for run {}", run_id);
                    session.on_close();
                    break Ok(());
                }
                Ok(_) => {
                    // Ping/pong/binary frames carry no events
                }
                Err(e) => {
                    let msg = e.to_string();
                    session.on_transport_error(msg.as_str());
                    break Err(StreamError::Transport(msg));
                }
            }
        };

        // Release the socket regardless of how the loop ended
        let _ = writer.close().await;

        result
    }
}
