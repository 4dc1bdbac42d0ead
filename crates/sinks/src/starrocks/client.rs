//! Stream load client
//!
//! Uploads one staging file per request to
//! `{url}/api/{database}/{table}/_stream_load` with HTTP PUT.
//!
//! # Request
//!
//! | Header | Value |
//! |--------|-------|
//! | `Expect` | `100-continue` |
//! | `label` | `{database}_{table}_{secs}_{micros}_{seq}` |
//! | `column_separator` | configured separator (`\xNN` for control characters) |
//! | `columns` | table fields, then derived columns |
//! | `max_filter_ratio` | configured ratio |
//! | `enclose` / `escape` | quoting used by the staging writer |
//! | `skip_header` | `1` when staging files carry a header line |
//!
//! # Redirects
//!
//! The front end answers with `307 Temporary Redirect` to a back end node.
//! Redirects are followed here rather than by the HTTP client so credentials
//! are re-sent to the back end.
//!
//! # Failures
//!
//! There is no retry. Anything other than the accepted outcomes (see
//! `response`) is returned as a `StreamLoadError` and the raw response is
//! logged.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use chainload_config::StreamLoadConfig;
use chainload_protocol::RecordType;
use chrono::Utc;
use reqwest::header::{EXPECT, LOCATION};
use reqwest::{StatusCode, redirect};

use super::error::StreamLoadError;
use super::response::{LoadOutcome, StreamLoadResponse};
use super::writer::{ENCLOSE, ESCAPE};

/// One load request: a closed staging file and where it goes
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    pub record_type: &'a RecordType,
    pub table: &'a str,
    /// Value of the `columns` header
    pub columns: &'a str,
    pub path: &'a Path,
    /// Rows the writer put into the file
    pub rows: u64,
}

/// Accepted outcome of a load
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub label: String,
    pub outcome: LoadOutcome,
    pub response: StreamLoadResponse,
}

/// Something that can bulk-load a staging file
///
/// Implementations must not retry: an `Err` is fatal for the pipeline.
#[async_trait]
pub trait StreamLoader: Send + Sync {
    async fn load(&self, request: LoadRequest<'_>) -> Result<LoadReport, StreamLoadError>;
}

/// HTTP stream load client
pub struct StreamLoadClient {
    config: StreamLoadConfig,
    http: reqwest::Client,
    sequence: AtomicU64,
}

impl StreamLoadClient {
    /// Create a client from the stream load config
    pub fn new(config: &StreamLoadConfig) -> Result<Self, StreamLoadError> {
        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|e| StreamLoadError::Client(e.to_string()))?;

        Ok(Self {
            config: config.clone(),
            http,
            sequence: AtomicU64::new(0),
        })
    }

    /// Generate a unique label for a load into `table`
    pub fn next_label(&self, table: &str) -> String {
        let now = Utc::now();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{}_{}_{:06}_{}",
            self.config.database,
            table,
            now.timestamp(),
            now.timestamp_subsec_micros(),
            seq
        )
    }

    async fn load_file(
        &self,
        request: &LoadRequest<'_>,
        label: &str,
    ) -> Result<LoadReport, StreamLoadError> {
        let body = tokio::fs::read(request.path)
            .await
            .map_err(|e| StreamLoadError::ReadStaging {
                path: request.path.display().to_string(),
                source: e,
            })?;
        let body = Bytes::from(body);
        let size = body.len();

        let (status, text) = self.send(request, label, body).await?;

        let report = interpret_response(request.table, label, status, &text)?;
        tracing::debug!(table = %request.table, label = %label, bytes = size, "stream load accepted");
        Ok(report)
    }

    /// PUT the body, following redirects with credentials
    async fn send(
        &self,
        request: &LoadRequest<'_>,
        label: &str,
        body: Bytes,
    ) -> Result<(StatusCode, String), StreamLoadError> {
        let table = request.table;
        let mut url = self.config.load_url(table);

        for _ in 0..=self.config.max_redirects {
            let response = self
                .build_request(&url, request, label, body.clone())
                .send()
                .await
                .map_err(|e| self.transport_error(table, e))?;

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| response.url().join(loc).ok());

                let Some(next) = location else {
                    return Err(StreamLoadError::InvalidResponse {
                        table: table.to_string(),
                        status: status.as_u16(),
                        body: "redirect without a valid Location header".into(),
                    });
                };

                tracing::debug!(table = %table, from = %url, to = %next, "following stream load redirect");
                url = next.to_string();
                continue;
            }

            let text = response
                .text()
                .await
                .map_err(|e| self.transport_error(table, e))?;
            return Ok((status, text));
        }

        Err(StreamLoadError::TooManyRedirects {
            table: table.to_string(),
            max: self.config.max_redirects,
        })
    }

    fn build_request(
        &self,
        url: &str,
        request: &LoadRequest<'_>,
        label: &str,
        body: Bytes,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .put(url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .header(EXPECT, "100-continue")
            .header("label", label)
            .header(
                "column_separator",
                separator_header(self.config.column_separator),
            )
            .header("columns", request.columns)
            .header("max_filter_ratio", self.config.max_filter_ratio.to_string())
            .header("enclose", char::from(ENCLOSE).to_string())
            .header("escape", char::from(ESCAPE).to_string());

        if self.config.include_header {
            builder = builder.header("skip_header", "1");
        }

        builder.body(body)
    }

    fn transport_error(&self, table: &str, source: reqwest::Error) -> StreamLoadError {
        if source.is_timeout() {
            StreamLoadError::Timeout {
                table: table.to_string(),
                timeout: self.config.timeout,
            }
        } else {
            StreamLoadError::Http {
                table: table.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl StreamLoader for StreamLoadClient {
    async fn load(&self, request: LoadRequest<'_>) -> Result<LoadReport, StreamLoadError> {
        let label = self.next_label(request.table);
        let started = Instant::now();

        tracing::info!(
            table = %request.table,
            label = %label,
            rows = request.rows,
            path = %request.path.display(),
            "starting stream load"
        );

        let result =
            match tokio::time::timeout(self.config.timeout, self.load_file(&request, &label)).await
            {
                Ok(result) => result,
                Err(_) => Err(StreamLoadError::Timeout {
                    table: request.table.to_string(),
                    timeout: self.config.timeout,
                }),
            };

        match &result {
            Ok(report) => tracing::info!(
                table = %request.table,
                label = %label,
                outcome = report.outcome.as_str(),
                loaded = report.response.number_loaded_rows,
                filtered = report.response.number_filtered_rows,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stream load finished"
            ),
            Err(e) => tracing::error!(
                table = %request.table,
                label = %label,
                error = %e,
                "stream load failed"
            ),
        }

        result
    }
}

/// Interpret a load response
///
/// Accepted outcomes become a `LoadReport`; everything else is a fatal
/// error carrying the raw body, which is logged in full.
pub fn interpret_response(
    table: &str,
    label: &str,
    status: StatusCode,
    body: &str,
) -> Result<LoadReport, StreamLoadError> {
    let response = match StreamLoadResponse::parse(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(table = %table, label = %label, http_status = status.as_u16(), response = %body, error = %e, "unparseable stream load response");
            return Err(StreamLoadError::InvalidResponse {
                table: table.to_string(),
                status: status.as_u16(),
                body: body.to_string(),
            });
        }
    };

    match response.outcome() {
        Some(outcome) => {
            if outcome == LoadOutcome::PublishTimeout {
                tracing::warn!(table = %table, label = %label, "stream load committed but publish timed out");
            }
            if let Some(url) = response.error_url.as_deref()
                && response.number_filtered_rows > 0
            {
                tracing::warn!(table = %table, label = %label, filtered = response.number_filtered_rows, error_url = %url, "stream load filtered rows");
            }
            Ok(LoadReport {
                label: label.to_string(),
                outcome,
                response,
            })
        }
        None => {
            tracing::error!(table = %table, label = %label, response = %body, "stream load rejected");
            Err(StreamLoadError::Rejected {
                table: table.to_string(),
                label: label.to_string(),
                status: response.status,
                message: response.message,
                body: body.to_string(),
            })
        }
    }
}

/// Render the separator for the `column_separator` header
///
/// Printable characters are sent as-is, control characters in the `\xNN`
/// form the load service understands.
pub fn separator_header(separator: char) -> String {
    if separator.is_ascii_graphic() || separator == ' ' {
        separator.to_string()
    } else {
        format!("\\x{:02x}", separator as u32)
    }
}
