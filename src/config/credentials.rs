//! Credential resolution
//!
//! Locates the API key for the upstream AI provider, trying the live
//! process environment first and falling back to local dotenv files

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Environment variable selecting the upstream provider
pub const PROVIDER_VAR: &str = "AI_PROVIDER";

/// Environment variable overriding the default model
pub const MODEL_VAR: &str = "AI_MODEL";

/// Developer-maintained override file, checked before the base file
pub const LOCAL_ENV_FILE: &str = ".env.local";

/// Base environment file
pub const BASE_ENV_FILE: &str = ".env";

/// Supported upstream providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Perplexity,
    OpenRouter,
}

impl Provider {
    /// Provider name as used in `AI_PROVIDER`
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Perplexity => "perplexity",
            Provider::OpenRouter => "openrouter",
        }
    }

    /// API base URL
    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::Perplexity => "https://api.perplexity.ai",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Model used when `AI_MODEL` is not set
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Perplexity => "sonar-pro",
            Provider::OpenRouter => "google/gemini-2.0-flash-exp:free",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::Perplexity => "PERPLEXITY_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// Parse a provider name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "perplexity" => Some(Provider::Perplexity),
            "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }
}

/// Credential bundle for one provider, ready to build a client from
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    /// Selected provider
    pub provider: Provider,
    /// Opaque API key
    pub api_key: String,
    /// Model identifier to use by default
    pub model: String,
}

/// Credential resolution errors
///
/// A missing file is not an error (it is an empty source); unreadable
/// and malformed files are surfaced distinctly from "simply absent".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No source yielded an API key
    #[error("AI API key missing for provider '{provider}', set {key} in the environment or .env.local")]
    NotFound { provider: String, key: String },

    /// An environment file exists but could not be read
    #[error("Failed to read environment file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// An environment file contains a line that is not KEY=VALUE
    #[error("Malformed environment file {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Resolves provider credentials from the process environment with
/// fallback to `.env.local` and `.env` in the search directory
///
/// Stateless apart from the values it returns; caching a resolved
/// credential is the gateway's concern, not the resolver's.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    search_dir: PathBuf,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialResolver {
    /// Resolver rooted at the process working directory
    pub fn new() -> Self {
        let search_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { search_dir }
    }

    /// Resolver rooted at an explicit directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dir: dir.into(),
        }
    }

    /// Look up a single variable: process env first, then `.env.local`,
    /// then `.env`
    ///
    /// Empty values in the process environment are skipped, matching
    /// the fallback behavior collaborators rely on.
    pub fn lookup(&self, key: &str) -> Result<Option<String>, CredentialError> {
        if let Ok(value) = env::var(key) {
            if !value.is_empty() {
                return Ok(Some(value));
            }
        }

        for file in [LOCAL_ENV_FILE, BASE_ENV_FILE] {
            let path = self.search_dir.join(file);
            if let Some(value) = lookup_in_file(&path, key)? {
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    /// Explicit provider selection from `AI_PROVIDER`, if any
    ///
    /// Unknown provider names are logged and treated as unset.
    pub fn provider(&self) -> Result<Option<Provider>, CredentialError> {
        match self.lookup(PROVIDER_VAR)? {
            Some(name) => {
                let provider = Provider::from_name(&name);
                if provider.is_none() {
                    warn!("Unknown AI provider '{}', falling back to defaults", name);
                }
                Ok(provider)
            }
            None => Ok(None),
        }
    }

    /// Resolve provider, API key and model in one pass
    ///
    /// When `AI_PROVIDER` is set only that provider's key is
    /// considered; otherwise the primary provider (perplexity) is
    /// tried first and the alternate (openrouter) serves as a legacy
    /// fallback.
    pub fn resolve(&self) -> Result<ResolvedCredential, CredentialError> {
        let candidates = match self.provider()? {
            Some(provider) => vec![provider],
            None => vec![Provider::Perplexity, Provider::OpenRouter],
        };

        for provider in &candidates {
            if let Some(api_key) = self.lookup(provider.env_key())? {
                let model = self
                    .lookup(MODEL_VAR)?
                    .unwrap_or_else(|| provider.default_model().to_string());
                return Ok(ResolvedCredential {
                    provider: *provider,
                    api_key,
                    model,
                });
            }
        }

        let primary = candidates[0];
        Err(CredentialError::NotFound {
            provider: primary.name().to_string(),
            key: primary.env_key().to_string(),
        })
    }
}

/// Scan one dotenv file for a key
///
/// A missing file yields `Ok(None)`; I/O failures and parse failures
/// map to distinct error variants.
fn lookup_in_file(path: &Path, key: &str) -> Result<Option<String>, CredentialError> {
    let iter = match dotenv::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CredentialError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    for item in iter {
        let (k, v) = item.map_err(|e| CredentialError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if k == key {
            return Ok(Some(v));
        }
    }

    Ok(None)
}
