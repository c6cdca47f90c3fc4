//! Bounded in-memory activity log served at `/api/log`.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;

/// Longest `detail` kept per entry, in characters.
pub const MAX_DETAIL_CHARS: usize = 120;

/// Outcome recorded with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// Completed normally.
    Ok,
    /// Completed with nothing useful (e.g. no search results).
    Warn,
    /// Failed.
    Error,
}

/// One log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
    /// Endpoint or step name.
    pub action: String,
    /// Short description, capped at [`MAX_DETAIL_CHARS`].
    pub detail: String,
    /// Outcome.
    pub status: ActivityStatus,
}

/// Ring buffer of recent activity, newest first.
#[derive(Debug)]
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl ActivityLog {
    /// Create a log keeping at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record an entry, evicting the oldest when full.
    pub fn record(&self, action: &str, detail: &str, status: ActivityStatus) {
        let entry = ActivityEntry {
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
            action: action.to_owned(),
            detail: detail.chars().take(MAX_DETAIL_CHARS).collect(),
            status,
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Copy of the current entries, newest first.
    pub fn snapshot(&self) -> Vec<ActivityEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let log = ActivityLog::new(10);
        log.record("search", "first", ActivityStatus::Ok);
        log.record("ask", "second", ActivityStatus::Warn);
        let entries = log.snapshot();
        assert_eq!(entries[0].detail, "second");
        assert_eq!(entries[1].detail, "first");
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let log = ActivityLog::new(3);
        for i in 0..5 {
            log.record("hit", &format!("entry {i}"), ActivityStatus::Ok);
        }
        let details: Vec<_> = log.snapshot().into_iter().map(|e| e.detail).collect();
        assert_eq!(details, ["entry 4", "entry 3", "entry 2"]);
    }

    #[test]
    fn detail_is_capped_in_characters() {
        let log = ActivityLog::new(1);
        log.record("browse", &"€".repeat(200), ActivityStatus::Error);
        let entry = &log.snapshot()[0];
        assert_eq!(entry.detail.chars().count(), MAX_DETAIL_CHARS);
    }

    #[test]
    fn entries_serialize_with_lowercase_status() {
        let log = ActivityLog::new(1);
        log.record("intel", "price:bitcoin", ActivityStatus::Error);
        let json = serde_json::to_value(log.snapshot()).unwrap_or_default();
        assert_eq!(json[0]["status"], "error");
        assert_eq!(json[0]["action"], "intel");
        let time = json[0]["time"].as_str().unwrap_or_default();
        assert_eq!(time.len(), 8);
        assert_eq!(time.as_bytes()[2], b':');
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(ActivityLog::new(0).capacity(), 1);
    }
}
