//! API credential handling
//!
//! The token is read from the environment exactly once per command and then
//! moved into the API client. It never appears in logs or `Debug` output.

use std::fmt;

use crate::error::{ExportError, Result};

/// Environment variable holding the Datawrapper API token
pub const TOKEN_ENV_VAR: &str = "DATAWRAPPER_API_TOKEN";

/// A Datawrapper API token
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    /// Build a token from a raw value, rejecting blank strings
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ExportError::Authentication(format!(
                "{} is empty",
                TOKEN_ENV_VAR
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Read the token from `DATAWRAPPER_API_TOKEN`
    pub fn from_env() -> Result<Self> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(value) => Self::new(value),
            Err(_) => Err(ExportError::Authentication(format!(
                "{} environment variable not set",
                TOKEN_ENV_VAR
            ))),
        }
    }

    /// Value for the `Authorization` header
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}
