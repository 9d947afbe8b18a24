//! Fire-and-forget operational alerts.

/// A sink for operational alerts.
///
/// `send` must never block the caller and must never fail. Implementations
/// drop the message when they cannot accept it.
pub trait AlertSink: Send + Sync + std::fmt::Debug + 'static {
    /// Enqueue a message for delivery.
    fn send(&self, message: String);
}

/// Alert sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlertSink;

impl AlertSink for NoopAlertSink {
    fn send(&self, message: String) {
        tracing::trace!(len = message.len(), "Alert discarded (no sink configured)");
    }
}
