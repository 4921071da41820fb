//! Registry builder.
//!
//! The [`UrlsBuilder`] provides a fluent API for wiring the registry to its
//! collaborators. Everything except the host has a default:
//!
//! - error sink: [`TracingErrorSink`]
//! - trust evaluator: [`DomainPatternTrust`]
//! - trusted domains: empty
//!
//! # Example
//!
//! ```ignore
//! use procwire_urls::{channel, UrlsBuilder, UrlsConfig};
//!
//! let config = UrlsConfig::from_json_str(r#"{"trustedDomains": ["*.example.com"]}"#)?;
//! let (host, endpoint) = channel(config.channel_config());
//!
//! let registry = UrlsBuilder::new(Arc::new(host))
//!     .config(&config)
//!     .error_sink(|err| eprintln!("uri handler failed: {err}"))
//!     .build();
//! ```

use std::sync::Arc;

use crate::config::UrlsConfig;
use crate::handler::{ErrorSink, TracingErrorSink, UriHandlerRegistry};
use crate::host::MainThreadUrls;
use crate::trust::{DomainPatternTrust, DomainTrust};

/// Builder for configuring and creating a [`UriHandlerRegistry`].
pub struct UrlsBuilder {
    host: Arc<dyn MainThreadUrls>,
    error_sink: Arc<dyn ErrorSink>,
    trust: Arc<dyn DomainTrust>,
    trusted_domains: Vec<String>,
}

impl UrlsBuilder {
    /// Create a new builder for the given host.
    pub fn new(host: Arc<dyn MainThreadUrls>) -> Self {
        Self {
            host,
            error_sink: Arc::new(TracingErrorSink),
            trust: Arc::new(DomainPatternTrust),
            trusted_domains: Vec::new(),
        }
    }

    /// Apply a loaded configuration.
    ///
    /// Replaces the initial trusted domains.
    pub fn config(mut self, config: &UrlsConfig) -> Self {
        self.trusted_domains = config.trusted_domains.clone();
        self
    }

    /// Set where handler failures are reported.
    pub fn error_sink(mut self, sink: impl ErrorSink) -> Self {
        self.error_sink = Arc::new(sink);
        self
    }

    /// Set the trusted-domain evaluator.
    pub fn domain_trust(mut self, trust: impl DomainTrust) -> Self {
        self.trust = Arc::new(trust);
        self
    }

    /// Set the initial trusted domains.
    ///
    /// The host normally pushes the list later via `$updateTrustedDomains`.
    pub fn trusted_domains(mut self, trusted_domains: Vec<String>) -> Self {
        self.trusted_domains = trusted_domains;
        self
    }

    /// Build the registry.
    pub fn build(self) -> UriHandlerRegistry {
        UriHandlerRegistry::from_parts(
            self.host,
            self.error_sink,
            self.trust,
            self.trusted_domains,
        )
    }
}
