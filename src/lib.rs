//! # procwire-urls
//!
//! URI handler registry for extension-host workers.
//!
//! Extensions register one URI handler each. The host process owns the
//! operating-system side (protocol registration, opening links) and forwards
//! incoming URIs to the worker by handle; this crate keeps the handle
//! bookkeeping, routes those URIs to the right handler, and forwards the
//! worker's own URI requests back to the host.
//!
//! ## Architecture
//!
//! - **Inbound**: [`UrlsDispatcher`] decodes host calls and drives the
//!   [`UriHandlerRegistry`]
//! - **Outbound**: the registry talks to the host through [`MainThreadUrls`];
//!   [`ChannelHost`] implements it over an mpsc channel
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use procwire_urls::{channel, ChannelConfig, ExtensionDescription, UrlsBuilder};
//!
//! #[tokio::main]
//! async fn main() -> procwire_urls::Result<()> {
//!     let (host, endpoint) = channel(ChannelConfig::default());
//!     let registry = UrlsBuilder::new(Arc::new(host)).build();
//!
//!     let registration = registry.register(
//!         &ExtensionDescription::new("foo.bar", "bar"),
//!         |uri| {
//!             println!("opened {uri}");
//!             Ok(())
//!         },
//!     )?;
//!
//!     // ... forward `endpoint` messages to the host process ...
//!
//!     registration.dispose();
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod extension;
pub mod handler;
pub mod host;
pub mod trust;
pub mod uri;

mod builder;
mod config;

pub use builder::UrlsBuilder;
pub use config::UrlsConfig;
pub use dispatch::UrlsDispatcher;
pub use error::{Result, UrlsError};
pub use extension::{ExtensionDescription, ExtensionIdentifier};
pub use handler::{ErrorSink, HandlerHandle, UriHandler, UriHandlerRegistration, UriHandlerRegistry};
pub use host::{channel, ChannelConfig, ChannelHost, HostEndpoint, HostMessage, MainThreadUrls};
pub use trust::{DomainPatternTrust, DomainTrust};
pub use uri::{Uri, UriComponents};
