use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::common::DetectedImage;

/// Per-user, append-only record of the scenes each user has been described.
///
/// The lock is only held for single map operations and never across an
/// `.await`. Reading the last entry and appending a new one are separate
/// operations, so two concurrent requests for the same user may interleave
/// between them; callers that need strict ordering per user must not issue
/// overlapping requests for that user.
#[derive(Default)]
pub struct History {
    entries: Mutex<HashMap<String, Vec<Arc<DetectedImage>>>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Arc<DetectedImage>>>> {
        // Every critical section is a single map call, a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn last(&self, user: &str) -> Option<Arc<DetectedImage>> {
        self.lock().get(user).and_then(|entries| entries.last().cloned())
    }

    pub fn append(&self, user: &str, image: Arc<DetectedImage>) {
        self.lock().entry(user.to_string()).or_default().push(image);
    }

    /// Drop everything recorded for `user`. Returns whether anything was there.
    pub fn remove(&self, user: &str) -> bool {
        self.lock().remove(user).is_some()
    }

    pub fn len(&self, user: &str) -> usize {
        self.lock().get(user).map(Vec::len).unwrap_or(0)
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.lock();
        HistoryStats {
            tracked_users: entries.len(),
            total_entries: entries.values().map(Vec::len).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub tracked_users: usize,
    pub total_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn entry() -> Arc<DetectedImage> {
        Arc::new(DetectedImage::new(
            Arc::new(DynamicImage::new_rgb8(1, 1)),
            RgbImage::new(1, 1),
            vec![],
        ))
    }

    #[test]
    fn last_returns_most_recent_append() {
        let history = History::new();
        assert!(history.last("u").is_none());

        let first = entry();
        let second = entry();
        history.append("u", first);
        history.append("u", second.clone());
        assert!(Arc::ptr_eq(&history.last("u").unwrap(), &second));
        assert_eq!(history.len("u"), 2);
    }

    #[test]
    fn users_are_isolated() {
        let history = History::new();
        history.append("a", entry());
        assert_eq!(history.len("b"), 0);
        assert!(history.remove("a"));
        assert!(!history.remove("a"));
        assert!(!history.remove("b"));
    }

    #[test]
    fn stats_sum_across_users() {
        let history = History::new();
        history.append("a", entry());
        history.append("a", entry());
        history.append("b", entry());
        assert_eq!(
            history.stats(),
            HistoryStats {
                tracked_users: 2,
                total_entries: 3
            }
        );
    }
}
