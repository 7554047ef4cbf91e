//! Single-slot, auto-expiring user notice.

use std::time::Duration;
use tokio::time::Instant;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

/// Holds at most one visible message at a time.
///
/// Showing a new message replaces the pending one and restarts the expiry
/// clock; there is no queue. Expiry is a deadline checked on read, which
/// plays well with the once-a-second render loop and with paused-clock tests.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Replace any pending message with `text`.
    pub fn show(&mut self, text: impl Into<String>) {
        self.current = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// The current message, if it has not expired yet.
    pub fn current(&mut self) -> Option<&str> {
        if let Some(notice) = &self.current
            && Instant::now() >= notice.expires_at
        {
            self.current = None;
        }
        self.current.as_ref().map(|n| n.text.as_str())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(NOTICE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires_after_ttl() {
        let mut board = NoticeBoard::default();
        board.show("retry failed");
        assert_eq!(board.current(), Some("retry failed"));

        tokio::time::advance(Duration::from_millis(2600)).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notice_replaces_and_restarts_clock() {
        let mut board = NoticeBoard::default();
        board.show("first");

        tokio::time::advance(Duration::from_millis(2000)).await;
        board.show("second");

        // Past the first deadline, within the second's.
        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(board.current(), Some("second"));

        tokio::time::advance(Duration::from_millis(2000)).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_pending_notice() {
        let mut board = NoticeBoard::default();
        board.show("cancelled");
        board.clear();
        assert_eq!(board.current(), None);
    }
}
