//! Secrets read from the process environment.

use std::fmt;

/// Default variable holding the npm automation token
pub const DEFAULT_TOKEN_VAR: &str = "NPM_TOKEN";

/// An authentication token whose value never appears in Debug or Display output
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a token value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value. Only pass this to child process environments.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(<redacted>)")
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Environment-sourced settings for a release run
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Name of the variable the token was read from
    pub token_var: String,
    /// Publish token, if present and non-empty
    pub token: Option<SecretToken>,
}

impl EnvConfig {
    /// Read the token from `token_var`
    pub fn from_env(token_var: &str) -> Self {
        let token = std::env::var(token_var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(SecretToken::new);
        Self {
            token_var: token_var.to_string(),
            token,
        }
    }

    /// Build from explicit values, for embedding and tests
    pub fn with_token(token_var: &str, token: Option<&str>) -> Self {
        Self {
            token_var: token_var.to_string(),
            token: token
                .filter(|value| !value.trim().is_empty())
                .map(SecretToken::new),
        }
    }
}
