//! Logging utilities
//!
//! Subscriber initialization and filtered request summaries for debug
//! logs

use crate::models::chat::CompletionRequest;

/// Set to true to include full message contents in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Initialize the logging system
///
/// Reads `RUST_LOG` for the filter and `LOG_FORMAT` for text vs JSON
/// output. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if log_format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    // Ignore the error if a subscriber is already installed (tests)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Truncate a string with a note about original length
fn truncate_content(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} chars truncated)", &s[..end], s.len() - end)
    } else {
        s.to_string()
    }
}

/// Create a filtered summary of a completion request for logging
/// Keeps original structure but truncates verbose content
pub fn create_request_log_summary(request: &CompletionRequest) -> serde_json::Value {
    if VERBOSE_REQUEST_LOGGING {
        serde_json::to_value(request).unwrap_or(serde_json::json!({"error": "serialize failed"}))
    } else {
        let filtered_messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role,
                    "content": truncate_content(&msg.content, 200),
                })
            })
            .collect();

        serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": filtered_messages,
        })
    }
}
