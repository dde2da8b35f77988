//! Command-line interface module
//!
//! Implements all CLI commands using clap:
//! - config init: Write a default configuration file
//! - list: Print the chart listing
//! - details: Export chart details to a workbook
//! - export: Export chart images
pub mod config;
pub mod details;
pub mod export;
pub mod list;

use tracing::debug;

use crate::api::DatawrapperClient;
use crate::config::{Config, FailurePolicy};
use crate::credentials::ApiToken;
use crate::error::Result;

/// Read the token and build the client
///
/// This is the only place the token is read; a missing token fails here,
/// before any request is made or any file is written.
pub(crate) fn connect(config: &Config) -> Result<DatawrapperClient> {
    let token = ApiToken::from_env()?;
    debug!("Connecting to {}", config.api.base_url);
    DatawrapperClient::new(&config.api, token)
}

/// `--fail-fast` overrides the configured policy
pub(crate) fn failure_policy(config: &Config, fail_fast: bool) -> FailurePolicy {
    if fail_fast {
        FailurePolicy::Abort
    } else {
        config.on_error
    }
}
