//! The copy orchestrator: [`CopyService`] and its request/outcome types.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::endpoint::{Endpoint, Role, SourceSpec, Target};
use crate::error::{Error, Result};
use crate::options::CopyOptions;
use crate::pipeline::{ProgressCallback, ProgressEvent, ProgressMeter, ProgressSnapshot, pump};
use crate::resolve::resolve;
use crate::stream::{open_destination, open_source};

/// Parameters for one copy operation.
///
/// Deserializes from the JSON shape
/// `{"id": ..., "source": {...}, "destination": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyRequest {
    /// Opaque correlation id, used for log and progress events. The service
    /// does not enforce uniqueness.
    pub id: String,
    /// Where bytes come from, with optional size/mime overrides
    pub source: SourceSpec,
    /// Where bytes go
    pub destination: Endpoint,
}

impl CopyRequest {
    /// Create a request.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<SourceSpec>,
        destination: Endpoint,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            destination,
        }
    }
}

/// Result of a successful copy.
#[derive(Debug, Clone, Serialize)]
pub struct CopyOutcome {
    /// Destination-specific completion payload: `Null` for filesystem
    /// writes, the parsed JSON body for HTTP destinations answering
    /// `application/json`, the raw body as a string otherwise.
    pub data: Value,
    /// Final progress snapshot; `transferred` equals the resolved size.
    pub stat: ProgressSnapshot,
}

/// Copies a byte stream between filesystem and HTTP endpoints.
///
/// One service can run any number of copies; concurrent [`copy`] calls are
/// independent (each owns its stream, sink, and progress accumulator). The
/// underlying HTTP client is shared and reused across calls.
///
/// There is no built-in timeout or cancellation: callers wanting a bounded
/// duration should wrap the call, e.g. with `tokio::time::timeout`.
///
/// [`copy`]: CopyService::copy
///
/// # Example
///
/// ```no_run
/// use pipecopy::{CopyRequest, CopyService, Endpoint};
///
/// # async fn example() -> pipecopy::Result<()> {
/// let service = CopyService::default();
/// let outcome = service
///     .copy(CopyRequest::new(
///         "copy-1",
///         Endpoint::http_with_method("https://example.com/logo.png", "GET"),
///         Endpoint::filesystem("logo.png"),
///     ))
///     .await?;
/// println!("copied {} bytes", outcome.stat.transferred);
/// # Ok(())
/// # }
/// ```
pub struct CopyService {
    client: Client,
    options: CopyOptions,
    progress: Option<ProgressCallback>,
}

impl CopyService {
    /// Create a service with the given options and a default HTTP client.
    #[must_use]
    pub fn new(options: CopyOptions) -> Self {
        Self {
            client: Client::new(),
            options,
            progress: None,
        }
    }

    /// Replace the HTTP client, e.g. one with custom TLS or proxy settings.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Attach a progress callback.
    ///
    /// Invoked at most once per update period during an active transfer,
    /// plus once with the final snapshot on success.
    #[must_use]
    pub fn with_progress(
        mut self,
        callback: impl Fn(ProgressEvent) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Copy the request's source to its destination.
    ///
    /// Steps: validate both endpoints, resolve source metadata (probing
    /// only for what is missing), open the source stream and destination
    /// sink, then drive the progress-instrumented pipeline to completion.
    /// Every failure before the pipeline returns without any transfer I/O.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] of class Validation, Resolution, or Transport;
    /// see [`Error::class`](crate::Error::class). Nothing is retried and a
    /// partially written destination is left as-is.
    pub async fn copy(&self, request: CopyRequest) -> Result<CopyOutcome> {
        if request.id.is_empty() {
            return Err(Error::EmptyId);
        }
        let source = request.source.endpoint.validate(Role::Source)?;
        let destination = request.destination.validate(Role::Destination)?;

        // MIME only matters when the destination frames its write with a
        // content type, i.e. HTTP destinations.
        let needs_mime =
            matches!(destination, Target::Http { .. }) && request.source.mime.is_none();
        let resolved = resolve(
            &self.client,
            &request.id,
            &source,
            request.source.size,
            request.source.mime.clone(),
            needs_mime,
        )
        .await?;

        let stream = open_source(&self.client, &source).await?;
        let sink = open_destination(&self.client, &destination, &resolved).await?;

        debug!(id = %request.id, size = resolved.size, "copying started");
        let meter = ProgressMeter::new(resolved.size, self.options.progress_update_period);
        let (data, stat) = pump(&request.id, stream, sink, meter, self.progress.as_ref()).await?;
        debug!(id = %request.id, transferred = stat.transferred, "copying finished");

        Ok(CopyOutcome { data, stat })
    }
}

impl Default for CopyService {
    fn default() -> Self {
        Self::new(CopyOptions::default())
    }
}
