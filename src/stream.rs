//! Stream factory: readable byte streams for sources, writable sinks for
//! destinations.
//!
//! Both endpoint kinds are normalized to the same shapes so the pipeline
//! never branches on transport: sources become a [`ByteStream`] of
//! [`Bytes`] chunks, destinations become a [`Sink`] with `write`/`finish`.
//!
//! The HTTP sink bridges the pipeline's write loop into a streaming request
//! body through a bounded channel, so the remote endpoint's consumption
//! rate backpressures the loop.

use std::io;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Body, Client};
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use url::Url;

use crate::endpoint::Target;
use crate::error::{Error, Result};
use crate::resolve::ResolvedSource;

/// Chunks in flight between the pump loop and a spawned HTTP request body.
/// Small on purpose: the remote endpoint's consumption rate should govern
/// how fast the source is drained.
const HTTP_SINK_DEPTH: usize = 8;

/// A readable source stream of byte chunks.
pub(crate) type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Open a readable byte stream for a validated source endpoint.
pub(crate) async fn open_source(client: &Client, target: &Target) -> Result<ByteStream> {
    match target {
        Target::Filesystem { path } => {
            let file = File::open(path).await.map_err(|source| Error::OpenSource {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "opened source file");
            Ok(Box::pin(ReaderStream::new(file)))
        }
        Target::Http {
            url,
            method,
            headers,
        } => {
            let response = client
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .send()
                .await
                .map_err(|source| Error::Request {
                    url: url.clone(),
                    source,
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Status {
                    url: url.clone(),
                    status,
                });
            }
            debug!(url = %url, %status, "opened source request");
            Ok(Box::pin(response.bytes_stream().map_err(io::Error::other)))
        }
    }
}

/// A writable destination sink.
///
/// Created by [`open_destination`]; fed chunk-by-chunk by the pipeline,
/// then consumed by [`Sink::finish`] which returns the destination's
/// completion payload.
pub(crate) enum Sink {
    File {
        file: BufWriter<File>,
        path: PathBuf,
    },
    Http {
        tx: mpsc::Sender<io::Result<Bytes>>,
        task: JoinHandle<Result<Value>>,
    },
}

/// Open a writable sink for a validated destination endpoint.
///
/// HTTP destinations get `content-type` (when the source MIME is known) and
/// `content-length` defaulted from the resolved source metadata; headers
/// supplied on the endpoint override the defaults.
pub(crate) async fn open_destination(
    client: &Client,
    target: &Target,
    resolved: &ResolvedSource,
) -> Result<Sink> {
    match target {
        Target::Filesystem { path } => {
            let file = File::create(path)
                .await
                .map_err(|source| Error::CreateDestination {
                    path: path.clone(),
                    source,
                })?;
            debug!(path = %path.display(), "created destination file");
            Ok(Sink::File {
                file: BufWriter::new(file),
                path: path.clone(),
            })
        }
        Target::Http {
            url,
            method,
            headers,
        } => {
            let merged = merge_write_headers(headers, resolved);
            let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(HTTP_SINK_DEPTH);
            let request = client
                .request(method.clone(), url.clone())
                .headers(merged)
                .body(Body::wrap_stream(ReceiverStream::new(rx)));
            let url = url.clone();
            debug!(url = %url, method = %method, "opened destination request");
            let task = tokio::spawn(async move { complete_write(url, request).await });
            Ok(Sink::Http { tx, task })
        }
    }
}

/// Default write headers from resolved metadata, caller headers winning.
fn merge_write_headers(headers: &HeaderMap, resolved: &ResolvedSource) -> HeaderMap {
    let mut merged = HeaderMap::new();
    if let Some(mime) = &resolved.mime {
        match HeaderValue::from_str(mime) {
            Ok(value) => {
                merged.insert(CONTENT_TYPE, value);
            }
            Err(_) => warn!(mime, "resolved mime is not a valid header value, omitting"),
        }
    }
    merged.insert(CONTENT_LENGTH, HeaderValue::from(resolved.size));
    for (name, value) in headers {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Await the destination's response and shape its completion payload: JSON
/// bodies are parsed into a structured value, anything else passes through
/// as a string.
async fn complete_write(url: Url, request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await.map_err(|source| Error::Request {
        url: url.clone(),
        source,
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status { url, status });
    }
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    let body = response
        .text()
        .await
        .map_err(|source| Error::ResponseBody {
            url: url.clone(),
            source,
        })?;
    if is_json {
        serde_json::from_str(&body).map_err(|source| Error::InvalidJson { url, source })
    } else {
        Ok(Value::String(body))
    }
}

impl Sink {
    /// Forward one chunk. Awaiting the write is what propagates the
    /// destination's backpressure to the pump loop.
    pub(crate) async fn write(&mut self, chunk: Bytes) -> Result<()> {
        match self {
            Self::File { file, path } => {
                file.write_all(&chunk).await.map_err(|source| Error::Write {
                    path: path.clone(),
                    source,
                })
            }
            Self::Http { tx, task } => {
                if tx.send(Ok(chunk)).await.is_err() {
                    // Receiver dropped: the request already finished. Surface
                    // its failure instead of a bare channel error.
                    return Err(match (&mut *task).await {
                        Ok(Err(error)) => error,
                        Ok(Ok(_)) | Err(_) => Error::Channel,
                    });
                }
                Ok(())
            }
        }
    }

    /// Signal end of stream and return the destination's completion payload:
    /// `Null` for files, the (possibly JSON-parsed) response body for HTTP.
    pub(crate) async fn finish(self) -> Result<Value> {
        match self {
            Self::File { mut file, path } => {
                file.flush().await.map_err(|source| Error::Write {
                    path: path.clone(),
                    source,
                })?;
                debug!(path = %path.display(), "destination file flushed");
                Ok(Value::Null)
            }
            Self::Http { tx, task } => {
                drop(tx);
                match task.await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Channel),
                }
            }
        }
    }
}
