//! Trusted-domain evaluation.
//!
//! The host pushes a list of domain patterns; [`DomainTrust`] decides whether a
//! URI falls under one of them. [`DomainPatternTrust`] is the default matcher.
//!
//! Pattern forms:
//!
//! - `*` trusts every URI
//! - `example.com`, `example.com/docs` match on authority and path prefix, any scheme
//! - `https://example.com/docs` additionally requires the scheme to match
//! - `*.example.com` matches any subdomain (and `example.com` itself)
//!
//! Localhost (`localhost[:port]`, `127.0.0.1[:port]`) is always trusted.

use crate::uri::{lowercase_host, Uri};

/// Authorities whose paths are compared case-insensitively.
const CASE_INSENSITIVE_AUTHORITIES: &[&str] = &["github.com"];

/// Decides whether a URI is trusted under a list of domain patterns.
pub trait DomainTrust: Send + Sync + 'static {
    /// Evaluate one URI against the current pattern list.
    fn is_trusted(&self, uri: &Uri, trusted_domains: &[String]) -> bool;
}

impl<F> DomainTrust for F
where
    F: Fn(&Uri, &[String]) -> bool + Send + Sync + 'static,
{
    fn is_trusted(&self, uri: &Uri, trusted_domains: &[String]) -> bool {
        self(uri, trusted_domains)
    }
}

/// Default pattern matcher, see module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainPatternTrust;

impl DomainTrust for DomainPatternTrust {
    fn is_trusted(&self, uri: &Uri, trusted_domains: &[String]) -> bool {
        is_url_domain_trusted(uri, trusted_domains)
    }
}

/// Check a URI against trusted-domain patterns.
pub fn is_url_domain_trusted(uri: &Uri, trusted_domains: &[String]) -> bool {
    let uri = normalize(uri);

    if is_localhost_authority(uri.authority()) {
        return true;
    }

    for pattern in trusted_domains {
        if pattern == "*" {
            return true;
        }

        let rule = if pattern.starts_with("http://") || pattern.starts_with("https://") {
            match Uri::parse(pattern) {
                Ok(rule) if rule.scheme() == uri.scheme() => rule,
                _ => continue,
            }
        } else {
            match Uri::parse(&format!("https://{}", pattern)) {
                Ok(rule) => rule,
                Err(_) => continue,
            }
        };
        let rule = normalize(&rule);

        if uri.authority() == rule.authority() {
            if path_matches(uri.path(), rule.path()) {
                return true;
            }
            continue;
        }

        if pattern.contains('*')
            && authority_matches(uri.authority(), rule.authority())
            && path_matches(uri.path(), rule.path())
        {
            return true;
        }
    }

    false
}

/// `localhost[:port]` (any case) or `127.0.0.1[:port]`.
pub fn is_localhost_authority(authority: &str) -> bool {
    fn host_with_optional_port(authority: &str, host: &str, ignore_case: bool) -> bool {
        if authority.len() < host.len() || !authority.is_char_boundary(host.len()) {
            return false;
        }
        let (head, tail) = authority.split_at(host.len());
        let head_matches = if ignore_case {
            head.eq_ignore_ascii_case(host)
        } else {
            head == host
        };
        if !head_matches {
            return false;
        }
        match tail.strip_prefix(':') {
            None => tail.is_empty(),
            Some(port) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    host_with_optional_port(authority, "localhost", true)
        || host_with_optional_port(authority, "127.0.0.1", false)
}

/// Lowercase the host, and the path for case-insensitive authorities.
fn normalize(uri: &Uri) -> Uri {
    let authority = lowercase_host(uri.authority());
    let path = if CASE_INSENSITIVE_AUTHORITIES.contains(&authority.as_str()) {
        uri.path().to_lowercase()
    } else {
        uri.path().to_string()
    };

    Uri::from_parts(uri.scheme(), authority, path, uri.query(), uri.fragment())
        .unwrap_or_else(|_| uri.clone())
}

/// Compare dot-separated labels right to left. `*` matches one label; a
/// leading `*` in the rule also absorbs any extra labels of the candidate.
fn authority_matches(authority: &str, rule_authority: &str) -> bool {
    let mut labels: Vec<&str> = authority.split('.').rev().collect();
    let rule_labels: Vec<&str> = rule_authority.split('.').rev().collect();

    if rule_labels.len() < labels.len() && rule_labels.last() == Some(&"*") {
        labels.truncate(rule_labels.len());
    }

    labels.iter().enumerate().all(|(i, label)| match rule_labels.get(i) {
        Some(&"*") => true,
        Some(rule_label) => rule_label == label,
        None => false,
    })
}

fn path_matches(open: &str, rule: &str) -> bool {
    if rule == "/" {
        return true;
    }
    let rule = rule.strip_suffix('/').unwrap_or(rule);
    open.starts_with(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trusted(uri: &str, domains: &[&str]) -> bool {
        let uri = Uri::parse(uri).unwrap();
        let domains: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        is_url_domain_trusted(&uri, &domains)
    }

    #[test]
    fn test_empty_list_trusts_nothing() {
        assert!(!trusted("https://example.com", &[]));
    }

    #[test]
    fn test_star_trusts_everything() {
        assert!(trusted("https://anything.org/x", &["*"]));
        assert!(trusted("http://other.net", &["example.com", "*"]));
    }

    #[test]
    fn test_localhost_always_trusted() {
        assert!(trusted("http://localhost:3000/app", &[]));
        assert!(trusted("http://LOCALHOST/", &[]));
        assert!(trusted("http://127.0.0.1:8080", &[]));
        assert!(!trusted("http://localhost.evil.com", &[]));
        assert!(!trusted("http://127.0.0.2", &[]));
    }

    #[test]
    fn test_plain_domain_matches_any_scheme() {
        assert!(trusted("https://example.com/a", &["example.com"]));
        assert!(trusted("http://example.com/a", &["example.com"]));
        assert!(!trusted("https://example.org/a", &["example.com"]));
    }

    #[test]
    fn test_scheme_pattern_requires_same_scheme() {
        assert!(trusted("https://example.com", &["https://example.com"]));
        assert!(!trusted("http://example.com", &["https://example.com"]));
    }

    #[test]
    fn test_path_prefix() {
        let rule = ["https://example.com/docs/"];
        assert!(trusted("https://example.com/docs/intro", &rule));
        assert!(trusted("https://example.com/docs", &rule));
        assert!(!trusted("https://example.com/blog", &rule));
    }

    #[test]
    fn test_host_is_case_insensitive() {
        assert!(trusted("https://EXAMPLE.com/", &["example.com"]));
        assert!(trusted("https://example.com/", &["https://Example.COM"]));
    }

    #[test]
    fn test_github_paths_are_case_insensitive() {
        let rule = ["https://github.com/Microsoft"];
        assert!(trusted("https://github.com/microsoft/repo", &rule));
        assert!(trusted("https://GitHub.com/MICROSOFT/repo", &rule));
        assert!(!trusted("https://example.com/Microsoft", &["https://example.com/microsoft"]));
    }

    #[test]
    fn test_wildcard_subdomains() {
        let rule = ["*.example.com"];
        assert!(trusted("https://a.example.com", &rule));
        assert!(trusted("https://a.b.example.com", &rule));
        assert!(trusted("https://example.com", &rule));
        assert!(!trusted("https://example.org", &rule));
        assert!(!trusted("https://badexample.com", &rule));
    }

    #[test]
    fn test_inner_wildcard_matches_single_label() {
        let rule = ["api.*.example.com"];
        assert!(trusted("https://api.eu.example.com", &rule));
        assert!(!trusted("https://api.eu.west.example.com", &rule));
    }

    #[test]
    fn test_wildcard_with_path() {
        let rule = ["https://*.example.com/public"];
        assert!(trusted("https://cdn.example.com/public/a.js", &rule));
        assert!(!trusted("https://cdn.example.com/private", &rule));
    }

    #[test]
    fn test_closure_as_domain_trust() {
        let only_https = |uri: &Uri, _: &[String]| uri.scheme() == "https";
        let uri = Uri::parse("https://x.y").unwrap();
        assert!(only_https.is_trusted(&uri, &[]));
    }
}
