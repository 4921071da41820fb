//! Handler module - URI handler registration and dispatch.
//!
//! Provides:
//! - [`UriHandler`] - what an extension registers
//! - [`UriHandlerRegistry`] - handle bookkeeping, dispatch, host calls
//! - [`UriHandlerRegistration`] - the disposer returned by `register`
//! - [`ErrorSink`] - where handler failures are reported
//!
//! # Example
//!
//! ```ignore
//! use procwire_urls::extension::ExtensionDescription;
//! use procwire_urls::handler::UriHandlerRegistry;
//!
//! let registry = UriHandlerRegistry::builder(host).build();
//!
//! let registration = registry.register(
//!     &ExtensionDescription::new("foo.bar", "bar"),
//!     |uri| {
//!         tracing::info!(%uri, "opened");
//!         Ok(())
//!     },
//! )?;
//!
//! // later
//! registration.dispose();
//! ```

mod registry;
mod sink;

pub use registry::{
    HandlerHandle, HandlerResult, UriHandler, UriHandlerRegistration, UriHandlerRegistry,
};
pub use sink::{ErrorSink, TracingErrorSink};
