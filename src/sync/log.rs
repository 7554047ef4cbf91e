//! Append-only event log with a monotonic fetch cursor.

use crate::api::AgentEvent;

/// Locally observed slice of a task's event log.
///
/// The cursor is the highest event id appended so far (0 = nothing seen) and
/// is what each poll sends as `since_id`. Entries are kept in the order the
/// server returned them; batches arrive in ascending id order and are never
/// re-sorted here.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<AgentEvent>,
    cursor: i64,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    #[must_use]
    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append a fetched batch in the order received.
    ///
    /// Entries with id at or below the cursor are skipped, so replaying a
    /// batch (a late response from an abandoned round) cannot duplicate
    /// events. An empty batch leaves the cursor unchanged. Returns the number
    /// of entries actually appended.
    pub fn append_batch(&mut self, batch: Vec<AgentEvent>) -> usize {
        let mut appended = 0;
        for event in batch {
            if event.id <= self.cursor {
                continue;
            }
            self.cursor = event.id;
            self.events.push(event);
            appended += 1;
        }
        appended
    }

    /// Drop all events and reset the cursor to 0. Used on retry.
    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EventKind;

    fn event(id: i64) -> AgentEvent {
        AgentEvent {
            id,
            event_type: EventKind::Thinking,
            content: String::new(),
            tool_name: None,
            tool_args_json: None,
            tool_result_preview: None,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_cursor_advances_to_last_id_in_batch() {
        let mut log = EventLog::new();
        assert_eq!(log.cursor(), 0);

        log.append_batch(vec![event(1), event(2), event(5)]);
        assert_eq!(log.cursor(), 5);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_empty_batch_leaves_cursor_unchanged() {
        let mut log = EventLog::new();
        log.append_batch(vec![event(3)]);
        log.append_batch(Vec::new());
        assert_eq!(log.cursor(), 3);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_replayed_batch_does_not_duplicate() {
        let mut log = EventLog::new();
        log.append_batch(vec![event(1), event(2)]);

        // Same batch delivered again, e.g. a late response from a stale round.
        let appended = log.append_batch(vec![event(1), event(2)]);
        assert_eq!(appended, 0);
        assert_eq!(log.len(), 2);
        assert_eq!(log.cursor(), 2);
    }

    #[test]
    fn test_clear_resets_cursor_and_events() {
        let mut log = EventLog::new();
        log.append_batch(vec![event(1), event(2), event(3)]);
        log.clear();
        assert_eq!(log.cursor(), 0);
        assert!(log.is_empty());
    }
}
