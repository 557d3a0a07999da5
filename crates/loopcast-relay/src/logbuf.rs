//! Bounded ring buffer of recent relay process output lines.
//!
//! Drain tasks push from their own tasks while status queries read the tail,
//! so the buffer lives behind a plain mutex shared via `Arc`. When full, the
//! oldest lines are dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        LogBuffer {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity: capacity.max(1),
        }
    }

    /// Append a line, evicting the oldest when at capacity.
    pub fn push(&self, line: impl Into<String>) {
        let mut buf = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(line.into());
    }

    /// Most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let buf = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let skip = buf.len().saturating_sub(n);
        buf.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_returns_most_recent_lines_in_order() {
        let logs = LogBuffer::new(10);
        for i in 0..5 {
            logs.push(format!("line {}", i));
        }

        assert_eq!(logs.tail(3), vec!["line 2", "line 3", "line 4"]);
        assert_eq!(logs.tail(100).len(), 5);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let logs = LogBuffer::new(3);
        for i in 0..6 {
            logs.push(format!("line {}", i));
        }

        assert_eq!(logs.len(), 3);
        assert_eq!(logs.tail(3), vec!["line 3", "line 4", "line 5"]);
    }

    #[test]
    fn test_shared_across_clones() {
        let logs = LogBuffer::new(8);
        let writer = logs.clone();
        writer.push("from clone");
        assert_eq!(logs.tail(1), vec!["from clone"]);
    }
}
