//! AI Completion Gateway Library
//!
//! Serializes every chat completion request in the process through one
//! FIFO queue with inter-request throttling and retry-on-429 handling

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{CredentialResolver, GatewayConfig, Provider, ResolvedCredential};
pub use models::chat::{ChatMessage, CompletionRequest, CompletionResponse, Role};
pub use services::{
    submit_completion, ChatClient, CompletionBackend, CompletionGateway, HttpBackend, Priority,
    SubmitOptions,
};
pub use utils::error::{GatewayError, GatewayResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
