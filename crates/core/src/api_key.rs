//! API key resolution and display helpers.
//!
//! A key entered by the user (persisted in the settings table) takes
//! precedence over the environment fallback.

use std::fmt;

use crate::error::CoreError;

/// Number of trailing characters left visible by [`mask_api_key`].
pub const VISIBLE_SUFFIX_LEN: usize = 4;

/// Where the active key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Stored,
    Environment,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => f.write_str("stored settings"),
            Self::Environment => f.write_str("environment"),
        }
    }
}

/// A usable key together with its origin.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedApiKey {
    pub key: String,
    pub source: ApiKeySource,
}

// Keep the secret out of logs.
impl fmt::Debug for ResolvedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedApiKey")
            .field("key", &mask_api_key(&self.key))
            .field("source", &self.source)
            .finish()
    }
}

/// Trim user input and reject blank keys or keys containing whitespace.
pub fn validate_api_key(raw: &str) -> Result<String, CoreError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(CoreError::Validation("API key must not be empty".to_string()));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "API key must not contain whitespace".to_string(),
        ));
    }
    Ok(key.to_string())
}

/// Pick the stored key if present and non-blank, else the environment key.
pub fn resolve_api_key(stored: Option<&str>, environment: Option<&str>) -> Option<ResolvedApiKey> {
    let usable = |raw: Option<&str>| raw.and_then(|k| validate_api_key(k).ok());

    usable(stored)
        .map(|key| ResolvedApiKey {
            key,
            source: ApiKeySource::Stored,
        })
        .or_else(|| {
            usable(environment).map(|key| ResolvedApiKey {
                key,
                source: ApiKeySource::Environment,
            })
        })
}

/// Render a key as `****abcd`. Keys too short to mask safely show no suffix.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX_LEN * 2 {
        return "****".to_string();
    }
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX_LEN..].iter().collect();
    format!("****{suffix}")
}
