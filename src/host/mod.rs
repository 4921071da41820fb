//! Host module - the peer on the other side of the message channel.
//!
//! Provides:
//! - [`MainThreadUrls`] - what the worker may ask of the host
//! - [`ChannelHost`] / [`HostEndpoint`] - an mpsc-backed implementation
//!
//! The registry only talks to the host through [`MainThreadUrls`], so any
//! transport can sit behind it.

mod channel;

pub use channel::{
    channel, ChannelConfig, ChannelHost, HostEndpoint, HostMessage, HostReply,
    DEFAULT_CALL_TIMEOUT,
};

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::extension::ExtensionIdentifier;
use crate::handler::HandlerHandle;
use crate::uri::UriComponents;

/// Boxed future for host calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Calls the worker makes on the host.
///
/// `register_uri_handler` and `unregister_uri_handler` are notifications:
/// they must not block and have no result. The other two are calls whose
/// failures are returned to the caller unchanged.
pub trait MainThreadUrls: Send + Sync + 'static {
    /// Announce a new handler.
    fn register_uri_handler(
        &self,
        handle: HandlerHandle,
        extension_id: &ExtensionIdentifier,
        display_name: &str,
    );

    /// Withdraw a handler.
    fn unregister_uri_handler(&self, handle: HandlerHandle);

    /// Ask the host for a URI that opens this application.
    fn create_app_uri(&self, uri: UriComponents) -> BoxFuture<'static, Result<UriComponents>>;

    /// Ask the host to resolve URIs to externally reachable strings.
    fn extract_external_uris(
        &self,
        uris: Vec<UriComponents>,
    ) -> BoxFuture<'static, Result<Vec<String>>>;
}
