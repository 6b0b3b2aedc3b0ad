//! Logging capability handed to handlers through [`crate::HandlerContext`].

/// Sink for the informational lines a handler emits.
pub trait HandlerLogger: Send + Sync {
    fn info(&self, message: &str);
}

/// Discards every message. The default for a [`crate::HandlerContext`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl HandlerLogger for NoopLogger {
    fn info(&self, _message: &str) {}
}

/// Forwards messages to `tracing` at INFO level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl HandlerLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "avax_mapping::handler", "{message}");
    }
}
