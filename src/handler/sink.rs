//! Unexpected-error reporting.

use crate::error::UrlsError;

/// Receives errors that must not reach the dispatch caller.
///
/// Fire-and-forget: implementations should not block.
pub trait ErrorSink: Send + Sync + 'static {
    /// Report one error.
    fn on_unexpected_error(&self, error: UrlsError);
}

impl<F> ErrorSink for F
where
    F: Fn(UrlsError) + Send + Sync + 'static,
{
    fn on_unexpected_error(&self, error: UrlsError) {
        self(error)
    }
}

/// Default sink: logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn on_unexpected_error(&self, error: UrlsError) {
        tracing::error!(error = %error, "Unexpected error in URI handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let sink = move |_err: UrlsError| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        sink.on_unexpected_error(UrlsError::ConnectionClosed);
        sink.on_unexpected_error(UrlsError::CallTimeout);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        TracingErrorSink.on_unexpected_error(UrlsError::Remote("boom".to_string()));
    }
}
