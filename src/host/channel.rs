//! Channel-backed host peer.
//!
//! [`ChannelHost`] turns every [`MainThreadUrls`] call into a [`HostMessage`]
//! on an mpsc channel. Whatever owns the [`HostEndpoint`] (a transport, a
//! test, an in-process host) answers calls through the attached [`HostReply`].
//!
//! # Architecture
//!
//! ```text
//! Registry ─► ChannelHost ─► mpsc::UnboundedSender<HostMessage> ─► HostEndpoint
//!                 ▲                                                    │
//!                 └──────────── oneshot reply (calls only) ◄───────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use procwire_urls::host::{channel, ChannelConfig, HostMessage};
//!
//! let (host, mut endpoint) = channel(ChannelConfig::default());
//!
//! tokio::spawn(async move {
//!     while let Some(msg) = endpoint.recv().await {
//!         if let HostMessage::CreateAppUri { uri, reply } = msg {
//!             reply.ok(uri);
//!         }
//!     }
//! });
//! ```

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::{BoxFuture, MainThreadUrls};
use crate::codec::MsgPackCodec;
use crate::error::{Result, UrlsError};
use crate::extension::ExtensionIdentifier;
use crate::handler::HandlerHandle;
use crate::uri::UriComponents;

/// Default time to wait for the host to answer a call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the host channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Timeout for `create_app_uri` and `extract_external_uris`.
    pub call_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// One-shot answer slot for a host call.
#[derive(Debug)]
pub struct HostReply<T> {
    tx: oneshot::Sender<std::result::Result<T, String>>,
}

impl<T> HostReply<T> {
    /// Answer the call successfully.
    pub fn ok(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Fail the call with a message.
    pub fn err(self, message: impl Into<String>) {
        let _ = self.tx.send(Err(message.into()));
    }

    /// Answer with a result.
    pub fn send(self, result: std::result::Result<T, String>) {
        let _ = self.tx.send(result);
    }
}

/// A message from the worker to the host.
#[derive(Debug)]
pub enum HostMessage {
    /// `$registerUriHandler` notification.
    RegisterUriHandler {
        handle: HandlerHandle,
        extension_id: String,
        display_name: String,
    },
    /// `$unregisterUriHandler` notification.
    UnregisterUriHandler { handle: HandlerHandle },
    /// `$createAppUri` call.
    CreateAppUri {
        uri: UriComponents,
        reply: HostReply<UriComponents>,
    },
    /// `$extractExternalUris` call.
    ExtractExternalUris {
        uris: Vec<UriComponents>,
        reply: HostReply<Vec<String>>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterParams<'a> {
    handle: HandlerHandle,
    extension_id: &'a str,
    display_name: &'a str,
}

#[derive(Serialize)]
struct UnregisterParams {
    handle: HandlerHandle,
}

#[derive(Serialize)]
struct CreateAppUriParams<'a> {
    uri: &'a UriComponents,
}

#[derive(Serialize)]
struct ExtractParams<'a> {
    uris: &'a [UriComponents],
}

impl HostMessage {
    /// Method name on the host side.
    pub fn method(&self) -> &'static str {
        match self {
            Self::RegisterUriHandler { .. } => "$registerUriHandler",
            Self::UnregisterUriHandler { .. } => "$unregisterUriHandler",
            Self::CreateAppUri { .. } => "$createAppUri",
            Self::ExtractExternalUris { .. } => "$extractExternalUris",
        }
    }

    /// Whether the host is expected to answer.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Self::CreateAppUri { .. } | Self::ExtractExternalUris { .. }
        )
    }

    /// Encode the parameters as MsgPack for a transport to forward.
    pub fn encode_params(&self) -> Result<Vec<u8>> {
        match self {
            Self::RegisterUriHandler {
                handle,
                extension_id,
                display_name,
            } => MsgPackCodec::encode(&RegisterParams {
                handle: *handle,
                extension_id,
                display_name,
            }),
            Self::UnregisterUriHandler { handle } => {
                MsgPackCodec::encode(&UnregisterParams { handle: *handle })
            }
            Self::CreateAppUri { uri, .. } => MsgPackCodec::encode(&CreateAppUriParams { uri }),
            Self::ExtractExternalUris { uris, .. } => {
                MsgPackCodec::encode(&ExtractParams { uris })
            }
        }
    }
}

/// [`MainThreadUrls`] implementation that forwards to a [`HostEndpoint`].
///
/// Cheaply cloneable.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostMessage>,
    call_timeout: Duration,
}

/// Receiving side of a [`ChannelHost`].
#[derive(Debug)]
pub struct HostEndpoint {
    rx: mpsc::UnboundedReceiver<HostMessage>,
}

/// Create a connected host/endpoint pair.
pub fn channel(config: ChannelConfig) -> (ChannelHost, HostEndpoint) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ChannelHost {
            tx,
            call_timeout: config.call_timeout,
        },
        HostEndpoint { rx },
    )
}

impl ChannelHost {
    /// Whether the endpoint has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Configured call timeout.
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    fn notify(&self, message: HostMessage) {
        let method = message.method();
        if self.tx.send(message).is_err() {
            tracing::warn!(method, "Host channel closed, dropping notification");
        }
    }

    fn call<T, F>(&self, build: F) -> BoxFuture<'static, Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(HostReply<T>) -> HostMessage,
    {
        let (tx, rx) = oneshot::channel();
        let sent = self.tx.send(build(HostReply { tx })).is_ok();
        let timeout = self.call_timeout;

        Box::pin(async move {
            if !sent {
                return Err(UrlsError::ConnectionClosed);
            }

            match tokio::time::timeout(timeout, rx).await {
                Err(_) => Err(UrlsError::CallTimeout),
                Ok(Err(_)) => Err(UrlsError::ConnectionClosed),
                Ok(Ok(Err(message))) => Err(UrlsError::Remote(message)),
                Ok(Ok(Ok(value))) => Ok(value),
            }
        })
    }
}

impl MainThreadUrls for ChannelHost {
    fn register_uri_handler(
        &self,
        handle: HandlerHandle,
        extension_id: &ExtensionIdentifier,
        display_name: &str,
    ) {
        self.notify(HostMessage::RegisterUriHandler {
            handle,
            extension_id: extension_id.value().to_string(),
            display_name: display_name.to_string(),
        });
    }

    fn unregister_uri_handler(&self, handle: HandlerHandle) {
        self.notify(HostMessage::UnregisterUriHandler { handle });
    }

    fn create_app_uri(&self, uri: UriComponents) -> BoxFuture<'static, Result<UriComponents>> {
        self.call(|reply| HostMessage::CreateAppUri { uri, reply })
    }

    fn extract_external_uris(
        &self,
        uris: Vec<UriComponents>,
    ) -> BoxFuture<'static, Result<Vec<String>>> {
        self.call(|reply| HostMessage::ExtractExternalUris { uris, reply })
    }
}

impl HostEndpoint {
    /// Receive the next message. Returns `None` once every [`ChannelHost`]
    /// clone has been dropped.
    pub async fn recv(&mut self) -> Option<HostMessage> {
        self.rx.recv().await
    }

    /// Receive a message if one is already queued.
    pub fn try_recv(&mut self) -> Option<HostMessage> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct DecodedRegister {
        handle: u64,
        extension_id: String,
        display_name: String,
    }

    #[test]
    fn test_notifications_are_queued_in_order() {
        let (host, mut endpoint) = channel(ChannelConfig::default());

        host.register_uri_handler(0, &"foo.bar".into(), "Foo");
        host.unregister_uri_handler(0);

        match endpoint.try_recv() {
            Some(HostMessage::RegisterUriHandler {
                handle,
                extension_id,
                display_name,
            }) => {
                assert_eq!(handle, 0);
                assert_eq!(extension_id, "foo.bar");
                assert_eq!(display_name, "Foo");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(matches!(
            endpoint.try_recv(),
            Some(HostMessage::UnregisterUriHandler { handle: 0 })
        ));
        assert!(endpoint.try_recv().is_none());
    }

    #[test]
    fn test_notification_on_closed_channel_does_not_panic() {
        let (host, endpoint) = channel(ChannelConfig::default());
        drop(endpoint);

        assert!(host.is_closed());
        host.unregister_uri_handler(3);
    }

    #[tokio::test]
    async fn test_call_returns_host_answer() {
        let (host, mut endpoint) = channel(ChannelConfig::default());

        tokio::spawn(async move {
            if let Some(HostMessage::ExtractExternalUris { uris, reply }) = endpoint.recv().await {
                reply.ok(uris.iter().map(|u| u.scheme.clone()).collect());
            }
        });

        let result = host
            .extract_external_uris(vec![UriComponents::new("http"), UriComponents::new("https")])
            .await
            .unwrap();
        assert_eq!(result, vec!["http", "https"]);
    }

    #[tokio::test]
    async fn test_call_propagates_remote_error() {
        let (host, mut endpoint) = channel(ChannelConfig::default());

        tokio::spawn(async move {
            if let Some(HostMessage::CreateAppUri { reply, .. }) = endpoint.recv().await {
                reply.err("no app uri");
            }
        });

        let err = host
            .create_app_uri(UriComponents::new("vscode"))
            .await
            .unwrap_err();
        assert!(matches!(err, UrlsError::Remote(ref m) if m == "no app uri"));
    }

    #[tokio::test]
    async fn test_call_on_closed_channel() {
        let (host, endpoint) = channel(ChannelConfig::default());
        drop(endpoint);

        let err = host
            .create_app_uri(UriComponents::new("vscode"))
            .await
            .unwrap_err();
        assert!(matches!(err, UrlsError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_call_with_dropped_reply() {
        let (host, mut endpoint) = channel(ChannelConfig::default());

        tokio::spawn(async move {
            // Drop the message (and its reply slot) without answering
            let _ = endpoint.recv().await;
        });

        let err = host.extract_external_uris(vec![]).await.unwrap_err();
        assert!(matches!(err, UrlsError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_reply_send_forwards_result() {
        let (host, mut endpoint) = channel(ChannelConfig::default());

        tokio::spawn(async move {
            while let Some(msg) = endpoint.recv().await {
                if let HostMessage::ExtractExternalUris { uris, reply } = msg {
                    let result = if uris.is_empty() {
                        Err("nothing to extract".to_string())
                    } else {
                        Ok(vec!["https://tunnel.dev/".to_string()])
                    };
                    reply.send(result);
                }
            }
        });

        let ok = host
            .extract_external_uris(vec![UriComponents::new("http")])
            .await
            .unwrap();
        assert_eq!(ok, vec!["https://tunnel.dev/"]);

        let err = host.extract_external_uris(vec![]).await.unwrap_err();
        assert!(matches!(err, UrlsError::Remote(ref m) if m == "nothing to extract"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout() {
        let (host, _endpoint) = channel(ChannelConfig {
            call_timeout: Duration::from_millis(50),
        });
        assert_eq!(host.call_timeout(), Duration::from_millis(50));

        let err = host
            .create_app_uri(UriComponents::new("vscode"))
            .await
            .unwrap_err();
        assert!(matches!(err, UrlsError::CallTimeout));
    }

    #[test]
    fn test_encode_params_uses_named_fields() {
        let msg = HostMessage::RegisterUriHandler {
            handle: 7,
            extension_id: "foo.bar".to_string(),
            display_name: "Foo".to_string(),
        };
        assert_eq!(msg.method(), "$registerUriHandler");
        assert!(!msg.expects_reply());

        let bytes = msg.encode_params().unwrap();
        let decoded: DecodedRegister = MsgPackCodec::decode(&bytes).unwrap();
        assert_eq!(
            decoded,
            DecodedRegister {
                handle: 7,
                extension_id: "foo.bar".to_string(),
                display_name: "Foo".to_string(),
            }
        );
    }
}
