//! # pipecopy
//!
//! Stream copy between filesystem and HTTP endpoints, with metadata
//! resolution and progress reporting.
//!
//! ## Core Features
//!
//! - **Uniform endpoints**: sources and destinations are a tagged
//!   [`Endpoint`] union (a local file path, or an HTTP URL with method and
//!   headers), validated once into a well-formed form before any I/O
//! - **Metadata resolution**: missing content size and MIME type are
//!   discovered before the transfer (one HTTP HEAD probe, or a file stat);
//!   caller-supplied values always win and skip the probe
//! - **Progress instrumentation**: a counting stage between reader and
//!   writer pushes periodic [`ProgressSnapshot`]s to a caller-supplied
//!   callback without altering bytes
//! - **Backpressure preserved**: an explicit bounded read/write loop; the
//!   destination's consumption rate governs how fast the source is drained
//! - **Truncation detection**: a source that ends before its declared
//!   length fails the transfer instead of silently completing
//! - **Classified errors**: every failure is Validation, Resolution, or
//!   Transport (see [`Error::class`]), surfaced exactly once
//!
//! ## Quick Start
//!
//! ```no_run
//! use pipecopy::{CopyRequest, CopyService, Endpoint};
//!
//! # async fn example() -> pipecopy::Result<()> {
//! let service = CopyService::default();
//!
//! // Local file to local file
//! let outcome = service
//!     .copy(CopyRequest::new(
//!         "backup-report",
//!         Endpoint::filesystem("report.pdf"),
//!         Endpoint::filesystem("backup/report.pdf"),
//!     ))
//!     .await?;
//! println!("copied {} bytes", outcome.stat.transferred);
//! # Ok(())
//! # }
//! ```
//!
//! ### HTTP source with progress
//!
//! ```no_run
//! use std::time::Duration;
//! use pipecopy::{CopyOptions, CopyRequest, CopyService, Endpoint};
//!
//! # async fn example() -> pipecopy::Result<()> {
//! let options = CopyOptions::default()
//!     .with_progress_update_period(Duration::from_millis(500));
//! let service = CopyService::new(options)
//!     .with_progress(|event| println!("{}: {:.1}%", event.id, event.stat.percentage));
//!
//! service
//!     .copy(CopyRequest::new(
//!         "fetch-image",
//!         Endpoint::http_with_method("https://example.com/image.png", "GET"),
//!         Endpoint::filesystem("image.png"),
//!     ))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Skipping the probe
//!
//! ```no_run
//! use pipecopy::{CopyRequest, CopyService, Endpoint, SourceSpec};
//!
//! # async fn example() -> pipecopy::Result<()> {
//! // Size and MIME supplied up front: no HEAD request is issued.
//! let source = SourceSpec::new(Endpoint::http_with_method(
//!         "https://example.com/archive.tar",
//!         "GET",
//!     ))
//!     .with_size(1_048_576)
//!     .with_mime("application/x-tar");
//!
//! CopyService::default()
//!     .copy(CopyRequest::new(
//!         "mirror-archive",
//!         source,
//!         Endpoint::http("https://storage.example.com/archive.tar"),
//!     ))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Semantics
//!
//! - A copy either completes fully and returns [`CopyOutcome`], or fails;
//!   partially written destination content is left as-is (no rollback)
//! - Nothing is retried; the first error wins
//! - No timeout or cancellation is built in; wrap the call with
//!   `tokio::time::timeout` for a bounded duration
//! - MIME for filesystem sources is never derived; when an HTTP destination
//!   would want one, the copy proceeds without it (logged at warn level)
//!
//! Logging goes through [`tracing`]; without a subscriber installed it is
//! a no-op.

mod endpoint;
mod error;
mod options;
mod pipeline;
mod resolve;
mod service;
mod stream;

pub use endpoint::{Endpoint, Role, SourceSpec};
pub use error::{Error, ErrorClass, Result};
pub use options::CopyOptions;
pub use pipeline::{ProgressCallback, ProgressEvent, ProgressSnapshot};
pub use service::{CopyOutcome, CopyRequest, CopyService};
