//! Blocking HTTP client for the Datawrapper v3 API.
//!
//! Every request carries the bearer token; responses are mapped onto the
//! crate error taxonomy by [`status_error`].

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::wire::{parse_timestamp, ChartPage, ChartRecord, EmbedCodes, FolderRecord};
use super::{status_error, ChartApi, Endpoint};
use crate::config::Api;
use crate::credentials::ApiToken;
use crate::error::{ExportError, Result};
use crate::models::{ChartMetadata, ChartSummary, ExportRequest, Folder};

/// HTTP client for the Datawrapper API
pub struct DatawrapperClient {
    base_url: String,
    token: ApiToken,
    page_size: usize,
    client: Client,
}

impl DatawrapperClient {
    /// Create a client owning the token for the rest of the run
    pub fn new(settings: &Api, token: ApiToken) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("dwexport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token,
            page_size: settings.page_size,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, self.token.bearer())
    }

    /// Send a request, turning timeouts and failing statuses into errors
    fn send(
        &self,
        builder: RequestBuilder,
        resource: &str,
        endpoint: Endpoint<'_>,
    ) -> Result<Response> {
        let response = self
            .authorized(builder)
            .send()
            .map_err(|e| transport_error(e, resource))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(status_error(status.as_u16(), &body, resource, endpoint))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.send(
            self.client.get(&url).query(query),
            resource,
            Endpoint::Metadata,
        )?;
        let body = response.text().map_err(|e| transport_error(e, resource))?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn transport_error(e: reqwest::Error, resource: &str) -> ExportError {
    if e.is_timeout() {
        ExportError::Timeout(resource.to_string())
    } else {
        ExportError::Http(e)
    }
}

impl ChartApi for DatawrapperClient {
    fn get_folder(&self, folder_id: u64) -> Result<Folder> {
        let record: FolderRecord = self.get_json(
            &format!("/folders/{}", folder_id),
            &[],
            &format!("folder {}", folder_id),
        )?;
        Ok(record.into())
    }

    fn list_charts(&self, folder_id: Option<u64>) -> Result<Vec<ChartSummary>> {
        let mut charts = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut query = vec![
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ];
            if let Some(id) = folder_id {
                query.push(("folderId", id.to_string()));
            }

            let page: ChartPage = self.get_json("/charts", &query, "chart list")?;
            let fetched = page.list.len();
            charts.extend(page.list.iter().map(ChartRecord::summary));
            offset += fetched;

            debug!(
                "Fetched {} charts (offset {}, total {:?})",
                fetched, offset, page.total
            );

            let done = match page.total {
                Some(total) => offset >= total,
                None => fetched < self.page_size,
            };
            if fetched == 0 || done {
                break;
            }
        }

        Ok(charts)
    }

    fn get_chart(&self, chart_id: &str) -> Result<ChartMetadata> {
        let raw: Value = self.get_json(
            &format!("/charts/{}", chart_id),
            &[],
            &format!("chart {}", chart_id),
        )?;
        let record: ChartRecord = serde_json::from_value(raw.clone())?;

        Ok(ChartMetadata {
            summary: record.summary(),
            published_at: parse_timestamp(record.published_at.as_deref()),
            public_version: record.public_version,
            raw,
        })
    }

    fn get_embed_code(&self, chart_id: &str) -> Result<String> {
        let resource = format!("embed codes of chart {}", chart_id);
        let codes: EmbedCodes =
            self.get_json(&format!("/charts/{}/embed-codes", chart_id), &[], &resource)?;

        codes.responsive().ok_or(ExportError::NotFound { resource })
    }

    fn publish_chart(&self, chart_id: &str) -> Result<()> {
        let url = self.url(&format!("/charts/{}/publish", chart_id));
        debug!("POST {}", url);

        self.send(
            self.client.post(&url),
            &format!("publishing chart {}", chart_id),
            Endpoint::Render(chart_id),
        )?;
        Ok(())
    }

    fn export_chart(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let url = self.url(&format!(
            "/charts/{}/export/{}",
            request.chart_id,
            request.format()
        ));
        debug!(
            "GET {} {:?} (published first: {})",
            url,
            request.query_params(),
            request.publish
        );

        let resource = format!("chart {}", request.chart_id);
        let response = self.send(
            self.client.get(&url).query(&request.query_params()),
            &resource,
            Endpoint::Render(&request.chart_id),
        )?;

        let bytes = response
            .bytes()
            .map_err(|e| transport_error(e, &resource))?;
        if bytes.is_empty() {
            return Err(ExportError::Export {
                chart_id: request.chart_id.clone(),
                message: "empty response body".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}
