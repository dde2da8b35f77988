//! Datawrapper API module
//!
//! `ChartApi` is the seam the exporters work against. `DatawrapperClient`
//! implements it over blocking HTTP; tests substitute an in-memory fake.

mod client;
mod wire;

pub use client::DatawrapperClient;

use crate::error::{ExportError, Result};
use crate::models::{ChartMetadata, ChartSummary, ExportRequest, Folder};

/// Operations the exporters need from Datawrapper
pub trait ChartApi {
    /// `GET /folders/{id}`
    fn get_folder(&self, folder_id: u64) -> Result<Folder>;

    /// All charts, optionally restricted to one folder. Pagination is
    /// handled by the implementation.
    fn list_charts(&self, folder_id: Option<u64>) -> Result<Vec<ChartSummary>>;

    /// `GET /charts/{id}`
    fn get_chart(&self, chart_id: &str) -> Result<ChartMetadata>;

    /// Responsive iframe embed code
    fn get_embed_code(&self, chart_id: &str) -> Result<String>;

    /// `POST /charts/{id}/publish`
    fn publish_chart(&self, chart_id: &str) -> Result<()>;

    /// Rendered image bytes
    fn export_chart(&self, request: &ExportRequest) -> Result<Vec<u8>>;
}

/// Which kind of endpoint produced a failing status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint<'a> {
    Metadata,
    /// Export or publish of the given chart
    Render(&'a str),
}

/// Map a non-success HTTP status to the error taxonomy
pub(crate) fn status_error(
    status: u16,
    body: &str,
    resource: &str,
    endpoint: Endpoint<'_>,
) -> ExportError {
    let detail = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    };

    match status {
        401 => ExportError::Authentication(format!(
            "token rejected while requesting {} ({})",
            resource, detail
        )),
        403 => ExportError::Authorization(format!(
            "token lacks the scope required for {} ({})",
            resource, detail
        )),
        404 => ExportError::NotFound {
            resource: resource.to_string(),
        },
        _ => match endpoint {
            Endpoint::Render(chart_id) => ExportError::Export {
                chart_id: chart_id.to_string(),
                message: detail,
            },
            Endpoint::Metadata => ExportError::Api {
                status,
                message: format!("{} ({})", resource, detail),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_auth() {
        assert!(matches!(
            status_error(401, "", "chart list", Endpoint::Metadata),
            ExportError::Authentication(_)
        ));
        assert!(matches!(
            status_error(403, "insufficient scope", "chart abc12", Endpoint::Render("abc12")),
            ExportError::Authorization(_)
        ));
    }

    #[test]
    fn test_status_mapping_not_found() {
        let err = status_error(404, "", "folder 7", Endpoint::Metadata);
        assert_eq!(err.to_string(), "Not found: folder 7");
    }

    #[test]
    fn test_status_mapping_server_errors() {
        match status_error(500, "render failed", "chart abc12", Endpoint::Render("abc12")) {
            ExportError::Export { chart_id, message } => {
                assert_eq!(chart_id, "abc12");
                assert_eq!(message, "HTTP 500: render failed");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            status_error(502, "", "chart list", Endpoint::Metadata),
            ExportError::Api { status: 502, .. }
        ));
    }
}
