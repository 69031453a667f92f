use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one in-flight fetch for a UI target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out tokens for one target; only the newest is current, so a slow
/// response can be dropped once a later request was issued.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_supersedes_older() {
        let tracker = RequestTracker::new();
        let first = tracker.issue();
        assert!(tracker.is_current(first));

        let second = tracker.issue();
        assert!(second > first);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }
}
