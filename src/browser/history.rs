use std::collections::VecDeque;
use std::path::PathBuf;

pub const DEFAULT_HISTORY_DEPTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub row: usize,
    pub path: PathBuf,
}

/// Bounded back/forward log of visited directories.
///
/// `cursor` indexes the current entry. Saving while the cursor is behind the
/// tail drops the forward entries first, then evicts from the front once the
/// log is over capacity.
#[derive(Debug)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_DEPTH)
    }
}

impl HistoryLog {
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn save(&mut self, row: usize, path: PathBuf) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(HistoryEntry { row, path });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn previous(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn next(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    #[allow(dead_code)]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[allow(dead_code)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(log: &HistoryLog) -> Vec<String> {
        log.entries.iter().map(|e| e.path.display().to_string()).collect()
    }

    #[test]
    fn test_empty_log_has_no_neighbours() {
        let mut log = HistoryLog::with_capacity(3);
        assert!(log.previous().is_none());
        assert!(log.next().is_none());
        assert!(log.current().is_none());
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut log = HistoryLog::with_capacity(3);
        for (row, path) in ["/a", "/b", "/c", "/d"].iter().enumerate() {
            log.save(row, PathBuf::from(path));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(paths(&log), vec!["/b", "/c", "/d"]);

        assert_eq!(log.previous().map(|e| e.row), Some(2));
        assert_eq!(log.previous().map(|e| e.row), Some(1));
        // "/b" is now the oldest position
        assert!(log.previous().is_none());
        assert_eq!(log.current().map(|e| e.path.clone()), Some(PathBuf::from("/b")));
    }

    #[test]
    fn test_next_walks_forward_to_tail() {
        let mut log = HistoryLog::with_capacity(5);
        log.save(1, PathBuf::from("/a"));
        log.save(2, PathBuf::from("/b"));
        log.previous();

        let next = log.next().cloned();
        assert_eq!(next, Some(HistoryEntry { row: 2, path: PathBuf::from("/b") }));
        assert!(log.next().is_none());
    }

    #[test]
    fn test_save_truncates_forward_entries() {
        let mut log = HistoryLog::with_capacity(5);
        log.save(1, PathBuf::from("/a"));
        log.save(1, PathBuf::from("/b"));
        log.save(1, PathBuf::from("/c"));
        log.previous();
        log.previous();

        log.save(4, PathBuf::from("/x"));
        assert_eq!(paths(&log), vec!["/a", "/x"]);
        assert!(log.next().is_none());
        assert_eq!(log.previous().map(|e| e.path.clone()), Some(PathBuf::from("/a")));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = HistoryLog::with_capacity(0);
        log.save(1, PathBuf::from("/a"));
        log.save(1, PathBuf::from("/b"));
        assert_eq!(log.capacity(), 1);
        assert_eq!(paths(&log), vec!["/b"]);
    }
}
