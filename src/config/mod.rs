//! Configuration module

pub mod credentials;
pub mod settings;

pub use credentials::{CredentialError, CredentialResolver, Provider, ResolvedCredential};
pub use settings::GatewayConfig;
