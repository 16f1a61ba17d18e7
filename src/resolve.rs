//! Source metadata resolution.
//!
//! Caller-supplied values always win. When something is missing, an HTTP
//! source gets at most one HEAD probe per copy (covering both size and
//! MIME), and a filesystem source gets a stat call. MIME is never derived
//! for filesystem sources; when a destination wants one, that is a logged
//! degradation, not a failure. An undetermined size is fatal: the pipeline
//! needs the length up front for progress tracking and content-length
//! framing.

use reqwest::Client;
use reqwest::Method;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::endpoint::Target;
use crate::error::{Error, Result};

/// Source metadata after resolution. Immutable; replaces the unresolved
/// `size`/`mime` overrides rather than mutating a descriptor in place.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) size: u64,
    pub(crate) mime: Option<String>,
}

pub(crate) async fn resolve(
    client: &Client,
    id: &str,
    source: &Target,
    mut size: Option<u64>,
    mut mime: Option<String>,
    needs_mime: bool,
) -> Result<ResolvedSource> {
    match source {
        Target::Http { url, headers, .. } => {
            if size.is_none() || (mime.is_none() && needs_mime) {
                debug!(id, url = %url, "HEAD probe for missing metadata");
                let response = client
                    .request(Method::HEAD, url.clone())
                    .headers(headers.clone())
                    .send()
                    .await
                    .map_err(|source| Error::Probe {
                        url: url.clone(),
                        source,
                    })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::ProbeStatus {
                        url: url.clone(),
                        status,
                    });
                }
                let head = response.headers();
                if size.is_none() {
                    size = head
                        .get(CONTENT_LENGTH)
                        .and_then(|value| value.to_str().ok())
                        .and_then(|value| value.parse().ok());
                }
                if mime.is_none() {
                    mime = head
                        .get(CONTENT_TYPE)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned);
                }
                debug!(id, url = %url, ?size, ?mime, "HEAD probe answered");
            }
        }
        Target::Filesystem { path } => {
            if size.is_none() {
                let meta = tokio::fs::metadata(path)
                    .await
                    .map_err(|source| Error::Stat {
                        path: path.clone(),
                        source,
                    })?;
                size = Some(meta.len());
                debug!(id, path = %path.display(), size = meta.len(), "stat source file");
            }
            if mime.is_none() && needs_mime {
                // Degraded, not fatal: the transfer proceeds without a
                // content type.
                warn!(id, path = %path.display(), "cannot determine mime for filesystem source");
            }
        }
    }

    let Some(size) = size else {
        return Err(Error::MissingSize);
    };
    Ok(ResolvedSource { size, mime })
}
