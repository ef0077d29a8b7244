//! Event formatting
//!
//! Pure mapping from an event record to a decorative symbol, a display
//! label, and a one-line summary. No state of its own.

use crate::stream::{AgentEvent, StreamSession};

const MAX_DETAIL_LEN: usize = 160;

/// Decorative symbol for an event
pub fn symbol(event: &AgentEvent) -> &'static str {
    match event {
        AgentEvent::AgentStart { .. } => "▶",
        AgentEvent::ToolCall { .. } => "⚙",
        AgentEvent::ToolOutput { .. } => "⤷",
        AgentEvent::LlmOutput { .. } => "✎",
        AgentEvent::AgentComplete { .. } => "✔",
        AgentEvent::AgentError { .. } => "✘",
        AgentEvent::ConnectionEstablished { .. } => "⇅",
        AgentEvent::Unknown => "•",
    }
}

/// Human-readable label for an event's tag
pub fn label(event: &AgentEvent) -> &'static str {
    match event {
        AgentEvent::AgentStart { .. } => "run started",
        AgentEvent::ToolCall { .. } => "tool call",
        AgentEvent::ToolOutput { .. } => "tool output",
        AgentEvent::LlmOutput { .. } => "model output",
        AgentEvent::AgentComplete { .. } => "run complete",
        AgentEvent::AgentError { .. } => "run failed",
        AgentEvent::ConnectionEstablished { .. } => "connected",
        AgentEvent::Unknown => "event",
    }
}

/// One formatted line for an event
pub fn format_line(event: &AgentEvent) -> String {
    let detail = match event {
        AgentEvent::AgentStart { input_text, .. } => {
            input_text.clone().unwrap_or_default()
        }
        AgentEvent::ToolCall {
            tool_name,
            tool_args,
            ..
        } => {
            let name = tool_name.as_deref().unwrap_or("unknown");
            if tool_args.is_null() {
                name.to_string()
            } else {
                format!("{} {}", name, tool_args)
            }
        }
        AgentEvent::ToolOutput {
            tool_name, output, ..
        } => {
            let name = tool_name.as_deref().unwrap_or("unknown");
            format!("{} -> {}", name, value_text(output))
        }
        AgentEvent::LlmOutput { content, .. } => content.clone(),
        AgentEvent::AgentComplete { final_output, .. } => final_output.clone(),
        AgentEvent::AgentError {
            error_message,
            error_type,
            ..
        } => match error_type {
            Some(kind) => format!("{}: {}", kind, error_message),
            None => error_message.clone(),
        },
        AgentEvent::ConnectionEstablished { message, .. } => message
            .clone()
            .unwrap_or_else(|| "connected to agent stream".to_string()),
        AgentEvent::Unknown => "unrecognized event".to_string(),
    };

    if detail.is_empty() {
        format!("{} {}", symbol(event), label(event))
    } else {
        format!(
            "{} {}: {}",
            symbol(event),
            label(event),
            truncate(&detail, MAX_DETAIL_LEN)
        )
    }
}

/// One-line status summary for a session
pub fn render_status(session: &StreamSession) -> String {
    let run = session
        .run_id()
        .map(|id| id.chars().take(8).collect::<String>())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "[{}] {} - {} events",
        run,
        session.state().as_str(),
        session.events().len()
    );

    if let Some(err) = session.last_error() {
        line.push_str(&format!(" - {}", err));
    }

    line
}

/// Render the full accumulated list, one line per event
pub fn render_events(session: &StreamSession) -> String {
    session
        .events()
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}…", head)
    }
}
