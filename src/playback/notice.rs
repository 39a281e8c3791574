use std::time::{Duration, Instant};

/// How long a notice stays on screen
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// A transient message shown to the user, e.g. "Could not load cello".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, now: Instant, lifetime: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: now + lifetime,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one notice; a newer one replaces the older.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn raise(&mut self, message: impl Into<String>, now: Instant, lifetime: Duration) {
        self.current = Some(Notice::new(message, now, lifetime));
    }

    /// Drop the notice once it has expired.
    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_clears_itself() {
        let start = Instant::now();
        let mut board = NoticeBoard::default();
        board.raise("audio failed", start, NOTICE_DURATION);

        board.expire(start + Duration::from_secs(2));
        assert_eq!(board.current().map(|n| n.message.as_str()), Some("audio failed"));

        board.expire(start + Duration::from_secs(3));
        assert!(board.current().is_none());
    }

    #[test]
    fn newer_notice_replaces_older() {
        let start = Instant::now();
        let mut board = NoticeBoard::default();
        board.raise("first", start, NOTICE_DURATION);
        board.raise("second", start + Duration::from_secs(1), NOTICE_DURATION);

        board.expire(start + Duration::from_secs(3));
        assert_eq!(board.current().unwrap().message, "second");
    }
}
