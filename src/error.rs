use thiserror::Error;

/// dwexport error types
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Export of chart {chart_id} failed: {message}")]
    Export { chart_id: String, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),
}

impl ExportError {
    /// Errors that end a run regardless of the configured failure policy.
    ///
    /// A bad or under-scoped token fails every chart the same way, so there
    /// is nothing to gain from moving on to the next one.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExportError::Authentication(_) | ExportError::Authorization(_)
        )
    }
}

/// Result type for dwexport operations
pub type Result<T> = std::result::Result<T, ExportError>;
