//! Service module

pub mod client;
pub mod gateway;

pub use client::ChatClient;
pub use gateway::{
    global, submit_completion, CompletionBackend, CompletionGateway, HttpBackend, Priority,
    SubmitOptions,
};
