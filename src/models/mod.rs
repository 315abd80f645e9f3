//! Data model module

pub mod chat;

pub use chat::{
    ChatMessage, CompletionChoice, CompletionRequest, CompletionResponse, ResponseFormat, Role,
    Usage,
};
