use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const MAX_LOGS: usize = 200;

/// Shared, bounded log of `[LEVEL] message` lines.
///
/// Every component gets a clone of the same handle; the terminal front-end
/// renders the tail in its console.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    lines: Arc<Mutex<VecDeque<String>>>,
    mirror_stderr: bool,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stderr_mirror(mut self, enabled: bool) -> Self {
        self.mirror_stderr = enabled;
        self
    }

    pub fn push(&self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.mirror_stderr {
            eprintln!("{msg}");
        }
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        lines.push_back(msg);
        while lines.len() > MAX_LOGS {
            lines.pop_front();
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.push(format!("[INFO] {}", msg.as_ref()));
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.push(format!("[WARN] {}", msg.as_ref()));
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.push(format!("[ERROR] {}", msg.as_ref()));
    }

    /// Most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let Ok(lines) = self.lines.lock() else {
            return Vec::new();
        };
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .map(|l| l.iter().any(|line| line.contains(needle)))
            .unwrap_or(false)
    }
}
