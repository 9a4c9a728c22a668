//! Notification collaborator: the display surface for transient messages.

/// Display surface the gateway reports request lifecycle events to.
///
/// The gateway owns the reference counting behind the loading indicator;
/// implementors only render. `loading_started` fires when the first tracked
/// request begins, `loading_finished` when the last one settles.
pub trait Notifier: Send + Sync {
    /// The global loading indicator becomes visible.
    fn loading_started(&self);

    /// The global loading indicator is hidden again.
    fn loading_finished(&self);

    /// Show a transient user-facing error message.
    fn error(&self, message: &str);
}

/// Notifier that forwards everything to the `tracing` subscriber.
///
/// The default for headless use; interactive shells supply their own
/// implementation wired to a toast/spinner surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn loading_started(&self) {
        tracing::debug!("loading indicator shown");
    }

    fn loading_finished(&self) {
        tracing::debug!("loading indicator hidden");
    }

    fn error(&self, message: &str) {
        tracing::warn!(notice = %message, "user-facing error notification");
    }
}


#[cfg(test)]
pub(crate) mod test_support {
    use super::Notifier;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every notification for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        shown: AtomicUsize,
        hidden: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub(crate) fn shown(&self) -> usize {
            self.shown.load(Ordering::SeqCst)
        }

        pub(crate) fn hidden(&self) -> usize {
            self.hidden.load(Ordering::SeqCst)
        }

        pub(crate) fn errors(&self) -> Vec<String> {
            self.errors.lock().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn loading_started(&self) {
            self.shown.fetch_add(1, Ordering::SeqCst);
        }

        fn loading_finished(&self) {
            self.hidden.fetch_add(1, Ordering::SeqCst);
        }

        fn error(&self, message: &str) {
            self.errors.lock().push(message.to_owned());
        }
    }
}
