//! URI Worker - in-process walk through the URI handler registry.
//!
//! This example demonstrates:
//! - Building a registry from a JSON configuration
//! - Registering a URI handler for an extension
//! - Delivering a host call through the dispatcher
//! - Answering host calls from the endpoint side
//!
//! The host side is simulated by a task that logs every outbound message
//! with its MsgPack size. Run with:
//!
//! ```text
//! RUST_LOG=debug cargo run --example uri_worker
//! ```

use std::sync::Arc;

use procwire_urls::codec::MsgPackCodec;
use procwire_urls::dispatch::{HandleExternalUriParams, HANDLE_EXTERNAL_URI};
use procwire_urls::{
    channel, ExtensionDescription, HostMessage, Uri, UriComponents, UrlsBuilder, UrlsConfig,
    UrlsDispatcher,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = UrlsConfig::from_json_str(
        r#"{"trustedDomains": ["*.github.com"], "callTimeoutMs": 2000}"#,
    )?;
    let (host, mut endpoint) = channel(config.channel_config());

    // Simulated host process
    let host_task = tokio::spawn(async move {
        while let Some(msg) = endpoint.recv().await {
            let size = msg.encode_params().map(|b| b.len()).unwrap_or(0);
            tracing::info!(method = msg.method(), bytes = size, "host <- worker");

            match msg {
                HostMessage::CreateAppUri { uri, reply } => {
                    reply.ok(UriComponents::new("code-oss").path(format!(
                        "/{}",
                        uri.authority.unwrap_or_default()
                    )));
                }
                HostMessage::ExtractExternalUris { uris, reply } => {
                    reply.ok(uris.into_iter().map(|u| u.scheme).collect());
                }
                _ => {}
            }
        }
    });

    let registry = UrlsBuilder::new(Arc::new(host)).config(&config).build();
    let dispatcher = UrlsDispatcher::new(registry.clone());

    let registration = registry.register(
        &ExtensionDescription::new("foo.bar", "bar").with_display_name("Foo Bar"),
        |uri| {
            tracing::info!(%uri, "foo.bar opened");
            Ok(())
        },
    )?;

    // The host delivers a URI it received from the operating system
    let payload = MsgPackCodec::encode(&HandleExternalUriParams {
        handle: registration.handle(),
        uri: UriComponents::new("code-oss")
            .authority("foo.bar")
            .path("/did-auth")
            .query("code=42"),
    })?;
    dispatcher.dispatch(HANDLE_EXTERNAL_URI, &payload).await?;

    let app_uri = registry
        .create_app_uri(&Uri::parse("code-oss://foo.bar")?)
        .await?;
    tracing::info!(%app_uri, "app uri");

    let checks = registry.is_trusted_external_uris(&[
        Uri::parse("https://api.github.com/repos")?,
        Uri::parse("https://example.org")?,
    ]);
    tracing::info!(?checks, "trust");

    registration.dispose();
    drop(dispatcher);
    drop(registry);
    host_task.await?;

    Ok(())
}
