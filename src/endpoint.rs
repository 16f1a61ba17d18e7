//! Endpoint descriptors and validation.
//!
//! An [`Endpoint`] describes one side of a copy: a local file or a remote
//! HTTP resource. Endpoints deserialize from an internally tagged JSON
//! shape (`{"kind": "filesystem", ...}` / `{"kind": "http", ...}`), so
//! unknown kinds are rejected at the boundary naming the allowed set.
//!
//! [`Endpoint::validate`] performs the semantic checks (non-empty path,
//! parseable URL, method present for sources) once, up front, and returns a
//! canonical [`Target`] that every later stage can trust without
//! re-validation.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default request method for HTTP destinations when none is supplied.
const DEFAULT_WRITE_METHOD: Method = Method::PUT;

/// Which side of the copy an endpoint describes.
///
/// Validation rules differ by role: an HTTP source requires an explicit
/// request method, while an HTTP destination defaults to `PUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The endpoint bytes are read from.
    Source,
    /// The endpoint bytes are written to.
    Destination,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// A source or destination of a copy operation.
///
/// # Example
///
/// ```
/// use pipecopy::Endpoint;
///
/// let file = Endpoint::filesystem("data/report.pdf");
/// let remote = Endpoint::http_with_method("https://example.com/report.pdf", "GET");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Endpoint {
    /// A local file, read or written sequentially.
    Filesystem {
        /// File path
        path: PathBuf,
    },
    /// A remote HTTP resource.
    Http {
        /// Request URL
        url: String,
        /// Request method. Required for sources; destinations default to `PUT`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        /// Extra request headers
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        headers: HashMap<String, String>,
    },
}

impl Endpoint {
    /// Create a filesystem endpoint.
    pub fn filesystem(path: impl Into<PathBuf>) -> Self {
        Self::Filesystem { path: path.into() }
    }

    /// Create an HTTP endpoint without an explicit method.
    ///
    /// Valid as a destination (defaults to `PUT`); a source built this way
    /// fails validation with [`Error::MissingMethod`].
    pub fn http(url: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            method: None,
            headers: HashMap::new(),
        }
    }

    /// Create an HTTP endpoint with an explicit method.
    pub fn http_with_method(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            method: Some(method.into()),
            headers: HashMap::new(),
        }
    }

    /// Add a request header. No-op for filesystem endpoints.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Http { headers, .. } = &mut self {
            headers.insert(name.into(), value.into());
        }
        self
    }

    /// Validate this endpoint for the given role and return the canonical
    /// [`Target`].
    ///
    /// Pure: performs no I/O. All later stages consume the returned target
    /// without re-checking it.
    ///
    /// # Errors
    ///
    /// Returns a validation-class [`Error`] if the path is empty, the URL is
    /// empty, unparseable, or non-HTTP, the method is missing (sources) or
    /// malformed, or a header name/value is malformed.
    pub fn validate(&self, role: Role) -> Result<Target> {
        match self {
            Self::Filesystem { path } => {
                if path.as_os_str().is_empty() {
                    return Err(Error::EmptyPath { role });
                }
                Ok(Target::Filesystem { path: path.clone() })
            }
            Self::Http {
                url,
                method,
                headers,
            } => {
                if url.is_empty() {
                    return Err(Error::EmptyUrl { role });
                }
                let url = Url::parse(url).map_err(|source| Error::InvalidUrl {
                    role,
                    url: url.clone(),
                    source,
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(Error::UnsupportedScheme {
                        role,
                        scheme: url.scheme().to_owned(),
                    });
                }
                let method = parse_method(method.as_deref(), role)?;
                let headers = parse_headers(headers)?;
                Ok(Target::Http {
                    url,
                    method,
                    headers,
                })
            }
        }
    }
}

fn parse_method(method: Option<&str>, role: Role) -> Result<Method> {
    match method {
        Some(raw) if !raw.is_empty() => Method::from_bytes(raw.to_uppercase().as_bytes())
            .map_err(|_| Error::InvalidMethod {
                method: raw.to_owned(),
            }),
        _ if role == Role::Destination => Ok(DEFAULT_WRITE_METHOD),
        _ => Err(Error::MissingMethod),
    }
}

fn parse_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::InvalidHeader {
            name: name.clone(),
        })?;
        let value = HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader {
            name: name.clone(),
        })?;
        map.insert(header, value);
    }
    Ok(map)
}

/// A validated endpoint: parsed URL, canonical method, typed headers.
///
/// Produced only by [`Endpoint::validate`]; guaranteed well-formed.
#[derive(Debug, Clone)]
pub(crate) enum Target {
    Filesystem {
        path: PathBuf,
    },
    Http {
        url: Url,
        method: Method,
        headers: HeaderMap,
    },
}

/// A source endpoint plus optional metadata overrides.
///
/// When `size` or `mime` are supplied, the resolver skips discovery for
/// that field. `From<Endpoint>` builds a spec with no overrides.
///
/// # Example
///
/// ```
/// use pipecopy::{Endpoint, SourceSpec};
///
/// let spec = SourceSpec::new(Endpoint::http_with_method("https://example.com/a.png", "GET"))
///     .with_size(5000)
///     .with_mime("image/png");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    /// The source endpoint
    #[serde(flatten)]
    pub endpoint: Endpoint,
    /// Content size in bytes, if already known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Content MIME type, if already known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl SourceSpec {
    /// Create a spec with no metadata overrides.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            size: None,
            mime: None,
        }
    }

    /// Declare the content size, skipping size discovery.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Declare the content MIME type, skipping MIME discovery.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

impl From<Endpoint> for SourceSpec {
    fn from(endpoint: Endpoint) -> Self {
        Self::new(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filesystem() {
        let target = Endpoint::filesystem("data/file.bin")
            .validate(Role::Source)
            .unwrap();
        assert!(matches!(target, Target::Filesystem { .. }));
    }

    #[test]
    fn test_validate_empty_path() {
        let result = Endpoint::filesystem("").validate(Role::Destination);
        assert!(matches!(
            result,
            Err(Error::EmptyPath {
                role: Role::Destination
            })
        ));
    }

    #[test]
    fn test_validate_http_source() {
        let target = Endpoint::http_with_method("http://example.com/a", "get")
            .with_header("x-token", "abc")
            .validate(Role::Source)
            .unwrap();
        let Target::Http {
            method, headers, ..
        } = target
        else {
            panic!("expected http target");
        };
        // Methods are normalized to upper case
        assert_eq!(method, Method::GET);
        assert_eq!(headers.get("x-token").map(|v| v.to_str().unwrap()), Some("abc"));
    }

    #[test]
    fn test_validate_http_source_requires_method() {
        let result = Endpoint::http("http://example.com/a").validate(Role::Source);
        assert!(matches!(result, Err(Error::MissingMethod)));
    }

    #[test]
    fn test_validate_http_destination_defaults_to_put() {
        let target = Endpoint::http("http://example.com/a")
            .validate(Role::Destination)
            .unwrap();
        let Target::Http { method, .. } = target else {
            panic!("expected http target");
        };
        assert_eq!(method, Method::PUT);
    }

    #[test]
    fn test_validate_empty_url() {
        let result = Endpoint::http("").validate(Role::Source);
        assert!(matches!(result, Err(Error::EmptyUrl { role: Role::Source })));
    }

    #[test]
    fn test_validate_invalid_url() {
        let result = Endpoint::http_with_method("not a url", "GET").validate(Role::Source);
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn test_validate_unsupported_scheme() {
        let result = Endpoint::http_with_method("ftp://example.com/a", "GET").validate(Role::Source);
        assert!(matches!(
            result,
            Err(Error::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_validate_invalid_method() {
        let result =
            Endpoint::http_with_method("http://example.com/a", "GE T").validate(Role::Source);
        assert!(matches!(result, Err(Error::InvalidMethod { .. })));
    }

    #[test]
    fn test_validate_invalid_header_name() {
        let result = Endpoint::http_with_method("http://example.com/a", "GET")
            .with_header("bad header", "v")
            .validate(Role::Source);
        assert!(matches!(result, Err(Error::InvalidHeader { .. })));
    }

    #[test]
    fn test_deserialize_tagged_kind() {
        let endpoint: Endpoint = serde_json::from_str(
            r#"{"kind": "http", "url": "http://example.com/a", "method": "GET"}"#,
        )
        .unwrap();
        assert!(matches!(endpoint, Endpoint::Http { .. }));

        let endpoint: Endpoint =
            serde_json::from_str(r#"{"kind": "filesystem", "path": "/tmp/a"}"#).unwrap();
        assert!(matches!(endpoint, Endpoint::Filesystem { .. }));
    }

    #[test]
    fn test_deserialize_unknown_kind_names_allowed_set() {
        let result = serde_json::from_str::<Endpoint>(r#"{"kind": "ftp", "url": "x"}"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("filesystem"));
        assert!(message.contains("http"));
    }

    #[test]
    fn test_source_spec_flattens() {
        let spec: SourceSpec = serde_json::from_str(
            r#"{"kind": "filesystem", "path": "/tmp/a", "size": 1024, "mime": "text/plain"}"#,
        )
        .unwrap();
        assert!(matches!(spec.endpoint, Endpoint::Filesystem { .. }));
        assert_eq!(spec.size, Some(1024));
        assert_eq!(spec.mime.as_deref(), Some("text/plain"));
    }
}
