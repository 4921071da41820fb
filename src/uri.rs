//! URI value type and its wire form.
//!
//! [`UriComponents`] is what travels between host and worker. [`Uri`] is the
//! local representation. [`Uri::revive`] copies the wire form as is, while
//! [`Uri::parse`] and [`Uri::from_parts`] normalise and validate.
//!
//! # Example
//!
//! ```
//! use procwire_urls::uri::{Uri, UriComponents};
//!
//! let uri = Uri::parse("https://example.com/callback?code=42").unwrap();
//! assert_eq!(uri.authority(), "example.com");
//! assert_eq!(uri.query(), "code=42");
//!
//! let revived = Uri::revive(uri.to_components());
//! assert_eq!(revived, uri);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures when building a [`Uri`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    /// Scheme does not match `^\w[\w\d+.-]*$`.
    #[error("Scheme contains illegal characters: {0:?}")]
    IllegalScheme(String),

    /// Authority present but path is relative.
    #[error("With an authority, the path must be empty or begin with a slash")]
    RelativePathWithAuthority,

    /// No authority but path starts with `//`.
    #[error("Without an authority, the path cannot begin with two slashes")]
    DoubleSlashWithoutAuthority,
}

/// Serialized form of a URI as sent over the host channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriComponents {
    /// URI scheme (`https`, `vscode`, ...).
    #[serde(default)]
    pub scheme: String,
    /// Authority (host, optional userinfo and port).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    /// Path component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Query string without the leading `?`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Fragment without the leading `#`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl UriComponents {
    /// Create components with only a scheme set.
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Self::default()
        }
    }

    /// Set the authority.
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Set the path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the query.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the fragment.
    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

/// A URI value.
///
/// All components are stored decoded. Missing components are empty strings.
/// Values built by [`Uri::parse`] or [`Uri::from_parts`] are validated; values
/// revived from the host are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    scheme: String,
    authority: String,
    path: String,
    query: String,
    fragment: String,
}

impl Uri {
    /// Build a URI from decoded parts, applying the standard fixups.
    ///
    /// - an empty scheme becomes `file`
    /// - `http`, `https` and `file` paths are made absolute
    pub fn from_parts(
        scheme: impl Into<String>,
        authority: impl Into<String>,
        path: impl Into<String>,
        query: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Result<Self, UriError> {
        let mut scheme = scheme.into();
        if scheme.is_empty() {
            scheme = "file".to_string();
        }
        let path = resolve_reference(&scheme, path.into());

        let uri = Self {
            scheme,
            authority: authority.into(),
            path,
            query: query.into(),
            fragment: fragment.into(),
        };
        uri.validate()?;
        Ok(uri)
    }

    /// Reconstruct a URI from its wire form.
    ///
    /// Lossless: every component is copied unchanged and missing ones become
    /// empty. No fixups or validation are applied.
    pub fn revive(components: UriComponents) -> Self {
        Self {
            scheme: components.scheme,
            authority: components.authority.unwrap_or_default(),
            path: components.path.unwrap_or_default(),
            query: components.query.unwrap_or_default(),
            fragment: components.fragment.unwrap_or_default(),
        }
    }

    /// Parse a URI string.
    ///
    /// Splits into `scheme:[//authority]path[?query][#fragment]` and
    /// percent-decodes every component.
    pub fn parse(value: &str) -> Result<Self, UriError> {
        let (scheme, rest) = match value.find([':', '/', '?', '#']) {
            Some(idx) if idx > 0 && value.as_bytes()[idx] == b':' => {
                (&value[..idx], &value[idx + 1..])
            }
            _ => ("", value),
        };

        let (authority, rest) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find(['/', '?', '#']).unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
            None => ("", rest),
        };

        let (rest, fragment) = match rest.split_once('#') {
            Some((head, fragment)) => (head, fragment),
            None => (rest, ""),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        Self::from_parts(
            scheme,
            percent_decode(authority),
            percent_decode(path),
            percent_decode(query),
            percent_decode(fragment),
        )
    }

    /// Get the scheme.
    #[inline]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the authority.
    #[inline]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Get the path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the query.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Get the fragment.
    #[inline]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Return a copy with a different path.
    pub fn with_path(&self, path: impl Into<String>) -> Result<Self, UriError> {
        Self::from_parts(
            self.scheme.clone(),
            self.authority.clone(),
            path,
            self.query.clone(),
            self.fragment.clone(),
        )
    }

    /// Convert to the wire form. Empty components are omitted.
    pub fn to_components(&self) -> UriComponents {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        UriComponents {
            scheme: self.scheme.clone(),
            authority: non_empty(&self.authority),
            path: non_empty(&self.path),
            query: non_empty(&self.query),
            fragment: non_empty(&self.fragment),
        }
    }

    fn validate(&self) -> Result<(), UriError> {
        if !is_valid_scheme(&self.scheme) {
            return Err(UriError::IllegalScheme(self.scheme.clone()));
        }

        if self.path.is_empty() {
            return Ok(());
        }

        if !self.authority.is_empty() {
            if !self.path.starts_with('/') {
                return Err(UriError::RelativePathWithAuthority);
            }
        } else if self.path.starts_with("//") {
            return Err(UriError::DoubleSlashWithoutAuthority);
        }

        Ok(())
    }
}

impl From<&Uri> for UriComponents {
    fn from(uri: &Uri) -> Self {
        uri.to_components()
    }
}

impl From<UriComponents> for Uri {
    fn from(components: UriComponents) -> Self {
        Uri::revive(components)
    }
}

/// Formats without percent-encoding. The host part of the authority is
/// lowercased; userinfo and port are kept as is.
impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;

        if !self.authority.is_empty() || self.scheme == "file" {
            f.write_str("//")?;
        }

        f.write_str(&lowercase_host(&self.authority))?;
        f.write_str(&self.path)?;

        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

/// Lowercase the host part of an authority, keeping userinfo and port.
pub(crate) fn lowercase_host(authority: &str) -> String {
    let (userinfo, hostport) = match authority.rsplit_once('@') {
        Some((userinfo, hostport)) => (Some(userinfo), hostport),
        None => (None, authority),
    };
    let (host, port) = split_port(hostport);

    let mut out = String::with_capacity(authority.len());
    if let Some(userinfo) = userinfo {
        out.push_str(userinfo);
        out.push('@');
    }
    out.push_str(&host.to_lowercase());
    if let Some(port) = port {
        out.push(':');
        out.push_str(port);
    }
    out
}

/// Split `host:port`, leaving IPv6 literals intact.
fn split_port(hostport: &str) -> (&str, Option<&str>) {
    match hostport.rfind(':') {
        Some(idx) if !hostport[idx..].contains(']') => {
            (&hostport[..idx], Some(&hostport[idx + 1..]))
        }
        _ => (hostport, None),
    }
}

fn resolve_reference(scheme: &str, path: String) -> String {
    match scheme {
        "http" | "https" | "file" => {
            if path.is_empty() {
                "/".to_string()
            } else if !path.starts_with('/') {
                format!("/{}", path)
            } else {
                path
            }
        }
        _ => path,
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-'))
}

/// Decode `%XX` escapes. Malformed escapes are kept verbatim; a result that
/// is not valid UTF-8 falls back to the raw input.
fn percent_decode(value: &str) -> String {
    if !value.contains('%') {
        return value.to_string();
    }

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]));
            if let (Some(hi), Some(lo)) = hex {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
