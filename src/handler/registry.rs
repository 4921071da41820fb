//! URI handler registry.
//!
//! At most one handler per extension. Every registration gets a handle from a
//! counter owned by the registry; the counter only moves forward, so handles
//! are never reused while the registry lives. The host addresses incoming
//! URIs to a handle, and the registry routes them to the handler.
//!
//! # Example
//!
//! ```ignore
//! let registry = UriHandlerRegistry::builder(host).build();
//!
//! let reg = registry.register(&extension, |uri: Uri| {
//!     println!("got {uri}");
//!     Ok(())
//! })?;
//! assert_eq!(reg.handle(), 0);
//!
//! registry.handle_external_uri(0, uri.to_components()).await?;
//! reg.dispose();
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::sink::ErrorSink;
use crate::builder::UrlsBuilder;
use crate::error::{BoxError, Result, UrlsError};
use crate::extension::{ExtensionDescription, ExtensionIdentifier, ExtensionIdentifierSet};
use crate::host::MainThreadUrls;
use crate::trust::DomainTrust;
use crate::uri::{Uri, UriComponents};

/// Opaque identifier of one live registration.
pub type HandlerHandle = u64;

/// Result type for handler functions.
pub type HandlerResult = std::result::Result<(), BoxError>;

/// Trait for URI handlers.
pub trait UriHandler: Send + Sync + 'static {
    /// Handle a URI addressed to this extension.
    fn handle_uri(&self, uri: Uri) -> HandlerResult;
}

impl<F> UriHandler for F
where
    F: Fn(Uri) -> HandlerResult + Send + Sync + 'static,
{
    fn handle_uri(&self, uri: Uri) -> HandlerResult {
        self(uri)
    }
}

/// Mutable registry state. Both maps change together.
struct State {
    /// Next handle to assign.
    next_handle: HandlerHandle,
    /// Extensions with a live handler.
    extensions: ExtensionIdentifierSet,
    /// Handlers by handle.
    handlers: HashMap<HandlerHandle, Arc<dyn UriHandler>>,
    /// Current trusted-domain patterns, replaced wholesale.
    trusted_domains: Arc<[String]>,
}

struct Inner {
    state: Mutex<State>,
    host: Arc<dyn MainThreadUrls>,
    error_sink: Arc<dyn ErrorSink>,
    trust: Arc<dyn DomainTrust>,
}

impl Inner {
    fn unregister(&self, handle: HandlerHandle, extension_id: &ExtensionIdentifier) {
        {
            let mut state = self.state.lock();
            state.extensions.delete(extension_id);
            state.handlers.remove(&handle);
        }

        tracing::debug!(handle, extension = %extension_id, "Unregistered URI handler");
        self.host.unregister_uri_handler(handle);
    }
}

/// Registry of URI handlers for one host connection.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct UriHandlerRegistry {
    inner: Arc<Inner>,
}

impl UriHandlerRegistry {
    /// Start building a registry that talks to `host`.
    pub fn builder(host: Arc<dyn MainThreadUrls>) -> UrlsBuilder {
        UrlsBuilder::new(host)
    }

    /// Create a registry with default sink, trust evaluator and no trusted
    /// domains.
    pub fn new(host: Arc<dyn MainThreadUrls>) -> Self {
        UrlsBuilder::new(host).build()
    }

    pub(crate) fn from_parts(
        host: Arc<dyn MainThreadUrls>,
        error_sink: Arc<dyn ErrorSink>,
        trust: Arc<dyn DomainTrust>,
        trusted_domains: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    next_handle: 0,
                    extensions: ExtensionIdentifierSet::new(),
                    handlers: HashMap::new(),
                    trusted_domains: trusted_domains.into(),
                }),
                host,
                error_sink,
                trust,
            }),
        }
    }

    /// Register a closure as the URI handler of an extension.
    ///
    /// See [`register_handler`](Self::register_handler).
    pub fn register<F>(
        &self,
        extension: &ExtensionDescription,
        handler: F,
    ) -> Result<UriHandlerRegistration>
    where
        F: Fn(Uri) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(extension, handler)
    }

    /// Register the URI handler of an extension.
    ///
    /// Fails with [`UrlsError::DuplicateRegistration`] while the extension
    /// already has a live handler. On success the host is notified and the
    /// returned registration must be disposed to unregister.
    pub fn register_handler<H: UriHandler>(
        &self,
        extension: &ExtensionDescription,
        handler: H,
    ) -> Result<UriHandlerRegistration> {
        let extension_id = extension.identifier.clone();

        let handle = {
            let mut state = self.inner.state.lock();
            if state.extensions.has(&extension_id) {
                return Err(UrlsError::DuplicateRegistration(
                    extension_id.value().to_string(),
                ));
            }

            let handle = state.next_handle;
            state.next_handle += 1;
            state.extensions.add(&extension_id);
            state.handlers.insert(handle, Arc::new(handler));
            handle
        };

        tracing::debug!(handle, extension = %extension_id, "Registered URI handler");
        self.inner
            .host
            .register_uri_handler(handle, &extension_id, extension.label());

        Ok(UriHandlerRegistration {
            handle,
            extension_id,
            inner: Arc::downgrade(&self.inner),
        })
    }

    /// Deliver a URI from the host to the handler behind `handle`.
    ///
    /// Always completes with `Ok(())`. An unknown handle is ignored: the
    /// registration may have been disposed while the host was dispatching.
    /// The handler sees the components exactly as the host sent them.
    /// Handler errors and handler panics go to the error sink.
    pub async fn handle_external_uri(
        &self,
        handle: HandlerHandle,
        uri: UriComponents,
    ) -> Result<()> {
        self.dispatch(handle, uri);
        Ok(())
    }

    fn dispatch(&self, handle: HandlerHandle, uri: UriComponents) {
        // Clone out so the handler runs unlocked and may re-enter the registry
        let handler = self.inner.state.lock().handlers.get(&handle).cloned();
        let Some(handler) = handler else {
            tracing::debug!(handle, "No URI handler for handle, ignoring");
            return;
        };

        let uri = Uri::revive(uri);

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle_uri(uri))) {
            Ok(Ok(())) => {
                tracing::trace!(handle, "URI handled");
            }
            Ok(Err(source)) => {
                self.inner
                    .error_sink
                    .on_unexpected_error(UrlsError::Handler { handle, source });
            }
            Err(payload) => {
                self.inner
                    .error_sink
                    .on_unexpected_error(UrlsError::HandlerPanicked {
                        handle,
                        message: panic_message(payload.as_ref()),
                    });
            }
        }
    }

    /// Ask the host for a URI that opens this application.
    pub async fn create_app_uri(&self, uri: &Uri) -> Result<Uri> {
        let components = self.inner.host.create_app_uri(uri.to_components()).await?;
        Ok(Uri::revive(components))
    }

    /// Replace the trusted-domain list. Affects later trust queries only.
    pub fn update_trusted_domains(&self, trusted_domains: Vec<String>) {
        tracing::debug!(count = trusted_domains.len(), "Updated trusted domains");
        self.inner.state.lock().trusted_domains = trusted_domains.into();
    }

    /// Check each URI against the current trusted domains.
    ///
    /// One result per input, in input order.
    pub fn is_trusted_external_uris(&self, uris: &[Uri]) -> Vec<bool> {
        let trusted_domains = self.inner.state.lock().trusted_domains.clone();
        uris.iter()
            .map(|uri| self.inner.trust.is_trusted(uri, &trusted_domains))
            .collect()
    }

    /// Ask the host to resolve URIs to externally reachable strings.
    pub async fn extract_external_uris(&self, uris: &[Uri]) -> Result<Vec<String>> {
        let components = uris.iter().map(Uri::to_components).collect();
        self.inner.host.extract_external_uris(components).await
    }

    /// Whether the extension currently has a live handler.
    pub fn is_registered(&self, extension_id: &ExtensionIdentifier) -> bool {
        self.inner.state.lock().extensions.has(extension_id)
    }

    /// Number of live handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.state.lock().handlers.len()
    }

    /// Snapshot of the current trusted-domain list.
    pub fn trusted_domains(&self) -> Vec<String> {
        self.inner.state.lock().trusted_domains.to_vec()
    }
}

impl fmt::Debug for UriHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("UriHandlerRegistry")
            .field("next_handle", &state.next_handle)
            .field("handlers", &state.handlers.len())
            .field("trusted_domains", &state.trusted_domains)
            .finish()
    }
}

/// Live registration returned by [`UriHandlerRegistry::register`].
///
/// Dropping it does not unregister; call [`dispose`](Self::dispose).
#[must_use = "the handler stays registered until `dispose` is called"]
pub struct UriHandlerRegistration {
    handle: HandlerHandle,
    extension_id: ExtensionIdentifier,
    inner: Weak<Inner>,
}

impl UriHandlerRegistration {
    /// Handle assigned to this registration.
    #[inline]
    pub fn handle(&self) -> HandlerHandle {
        self.handle
    }

    /// Extension that owns this registration.
    #[inline]
    pub fn extension_id(&self) -> &ExtensionIdentifier {
        &self.extension_id
    }

    /// Remove the handler and notify the host.
    ///
    /// No-op if the registry is already gone.
    pub fn dispose(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.unregister(self.handle, &self.extension_id);
        }
    }
}

impl fmt::Debug for UriHandlerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriHandlerRegistration")
            .field("handle", &self.handle)
            .field("extension_id", &self.extension_id)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
