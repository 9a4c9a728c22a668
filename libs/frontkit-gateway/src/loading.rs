use std::sync::Arc;

use parking_lot::Mutex;

use crate::notify::Notifier;

/// Reference-counted lifecycle of the global loading indicator.
///
/// The notifier is told to show the indicator on the 0→1 transition and to
/// hide it when the count returns to zero. The count is clamped so it never
/// stays below zero.
pub(crate) struct LoadingTracker {
    inner: Arc<LoadingState>,
}

struct LoadingState {
    count: Mutex<i64>,
    notifier: Arc<dyn Notifier>,
}

/// Scoped hold on the loading indicator; releases exactly once on drop.
pub(crate) struct LoadingGuard {
    state: Arc<LoadingState>,
}

impl LoadingTracker {
    pub(crate) fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(LoadingState {
                count: Mutex::new(0),
                notifier,
            }),
        }
    }

    pub(crate) fn acquire(&self) -> LoadingGuard {
        let became_visible = {
            let mut count = self.inner.count.lock();
            *count += 1;
            *count == 1
        };
        // Notify outside the critical section.
        if became_visible {
            self.inner.notifier.loading_started();
        }
        LoadingGuard {
            state: Arc::clone(&self.inner),
        }
    }

    pub(crate) fn count(&self) -> i64 {
        *self.inner.count.lock()
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let hidden = {
            let mut count = self.state.count.lock();
            *count -= 1;
            if *count <= 0 {
                *count = 0;
                true
            } else {
                false
            }
        };
        if hidden {
            self.state.notifier.loading_finished();
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::notify::test_support::RecordingNotifier;

    #[test]
    fn overlapping_holds_show_and_hide_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tracker = LoadingTracker::new(notifier.clone());

        let first = tracker.acquire();
        let second = tracker.acquire();
        assert_eq!(tracker.count(), 2);
        assert_eq!(notifier.shown(), 1);
        assert_eq!(notifier.hidden(), 0);

        drop(first);
        assert_eq!(notifier.hidden(), 0);

        drop(second);
        assert_eq!(tracker.count(), 0);
        assert_eq!(notifier.hidden(), 1);
    }

    #[test]
    fn sequential_holds_pair_show_with_hide() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tracker = LoadingTracker::new(notifier.clone());

        drop(tracker.acquire());
        drop(tracker.acquire());

        assert_eq!(notifier.shown(), 2);
        assert_eq!(notifier.hidden(), 2);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn count_never_stays_negative() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tracker = LoadingTracker::new(notifier);

        drop(tracker.acquire());
        assert_eq!(tracker.count(), 0);
        drop(tracker.acquire());
        assert_eq!(tracker.count(), 0);
    }
}
