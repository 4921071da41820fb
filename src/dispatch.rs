//! Inbound call dispatch.
//!
//! The host calls two methods on the worker:
//!
//! | Method | Params |
//! |---|---|
//! | `$handleExternalUri` | `{ handle, uri }` |
//! | `$updateTrustedDomains` | `{ trustedDomains }` |
//!
//! Params are MsgPack maps. Whatever transport receives the call hands the
//! method name and raw params to [`UrlsDispatcher::dispatch`].

use serde::{Deserialize, Serialize};

use crate::codec::MsgPackCodec;
use crate::error::{Result, UrlsError};
use crate::handler::{HandlerHandle, UriHandlerRegistry};
use crate::uri::UriComponents;

/// Method name for external URI delivery.
pub const HANDLE_EXTERNAL_URI: &str = "$handleExternalUri";

/// Method name for trusted-domain updates.
pub const UPDATE_TRUSTED_DOMAINS: &str = "$updateTrustedDomains";

/// Params of `$handleExternalUri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleExternalUriParams {
    pub handle: HandlerHandle,
    pub uri: UriComponents,
}

/// Params of `$updateTrustedDomains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrustedDomainsParams {
    pub trusted_domains: Vec<String>,
}

/// Routes host calls to a [`UriHandlerRegistry`].
#[derive(Debug, Clone)]
pub struct UrlsDispatcher {
    registry: UriHandlerRegistry,
}

impl UrlsDispatcher {
    /// Create a dispatcher for the given registry.
    pub fn new(registry: UriHandlerRegistry) -> Self {
        Self { registry }
    }

    /// Methods this dispatcher answers.
    pub fn methods() -> &'static [&'static str] {
        &[HANDLE_EXTERNAL_URI, UPDATE_TRUSTED_DOMAINS]
    }

    /// The registry calls are routed to.
    pub fn registry(&self) -> &UriHandlerRegistry {
        &self.registry
    }

    /// Decode `payload` and invoke `method`.
    pub async fn dispatch(&self, method: &str, payload: &[u8]) -> Result<()> {
        match method {
            HANDLE_EXTERNAL_URI => {
                let params: HandleExternalUriParams = MsgPackCodec::decode(payload)?;
                self.registry
                    .handle_external_uri(params.handle, params.uri)
                    .await
            }
            UPDATE_TRUSTED_DOMAINS => {
                let params: UpdateTrustedDomainsParams = MsgPackCodec::decode(payload)?;
                self.registry.update_trusted_domains(params.trusted_domains);
                Ok(())
            }
            other => {
                tracing::warn!(method = other, "Unknown URL service method");
                Err(UrlsError::UnknownMethod(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionDescription;
    use crate::host::{channel, ChannelConfig};
    use crate::uri::Uri;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn dispatcher() -> UrlsDispatcher {
        let (host, _endpoint) = channel(ChannelConfig::default());
        UrlsDispatcher::new(UriHandlerRegistry::new(Arc::new(host)))
    }

    #[tokio::test]
    async fn test_handle_external_uri() {
        let dispatcher = dispatcher();
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();

        let _reg = dispatcher
            .registry()
            .register(&ExtensionDescription::new("foo.bar", "bar"), move |uri: Uri| {
                *slot.lock() = Some(uri);
                Ok(())
            })
            .unwrap();

        let payload = MsgPackCodec::encode(&HandleExternalUriParams {
            handle: 0,
            uri: UriComponents::new("vscode")
                .authority("foo.bar")
                .path("/did-auth")
                .query("token=abc"),
        })
        .unwrap();
        dispatcher.dispatch(HANDLE_EXTERNAL_URI, &payload).await.unwrap();

        let uri = seen.lock().take().unwrap();
        assert_eq!(uri.to_string(), "vscode://foo.bar/did-auth?token=abc");
    }

    #[tokio::test]
    async fn test_update_trusted_domains() {
        let dispatcher = dispatcher();

        let payload = MsgPackCodec::encode(&UpdateTrustedDomainsParams {
            trusted_domains: vec!["example.com".to_string()],
        })
        .unwrap();
        dispatcher
            .dispatch(UPDATE_TRUSTED_DOMAINS, &payload)
            .await
            .unwrap();

        assert_eq!(dispatcher.registry().trusted_domains(), vec!["example.com"]);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let err = dispatcher().dispatch("$nope", &[]).await.unwrap_err();
        assert!(matches!(err, UrlsError::UnknownMethod(ref m) if m == "$nope"));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let err = dispatcher()
            .dispatch(HANDLE_EXTERNAL_URI, b"\xc1")
            .await
            .unwrap_err();
        assert!(matches!(err, UrlsError::MsgPackDecode(_)));
    }

    #[test]
    fn test_methods() {
        assert_eq!(
            UrlsDispatcher::methods(),
            &["$handleExternalUri", "$updateTrustedDomains"]
        );
    }
}
