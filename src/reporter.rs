//! User-facing progress reporting
//!
//! Every component receives an `Arc<dyn Reporter>`; implementations must be safe to
//! call from concurrent workers.

use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;

pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>);
}

/// Colored console output; one line is written at a time
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    lock: Mutex<()>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, line: String, to_stderr: bool) {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if to_stderr {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        } else {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        }
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        self.emit(format!("{} {}", " INFO ".bold().bright_cyan(), message), false);
    }

    fn warn(&self, message: &str) {
        self.emit(format!("{} {}", " WARN ".bold().yellow(), message), false);
    }

    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>) {
        let mut line = format!("{} {}", " ERROR ".bold().red(), message);
        if let Some(cause) = cause {
            line.push_str(&format!("\n        {}", cause.to_string().red()));
        }
        self.emit(line, true);
    }
}

/// Forwards reports to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>) {
        match cause {
            Some(cause) => tracing::error!(error = %cause, "{}", message),
            None => tracing::error!("{}", message),
        }
    }
}

/// Severity of a recorded report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Keeps every report in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: String) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message));
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages recorded at one level, in order
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message.to_string());
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message.to_string());
    }

    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>) {
        let message = match cause {
            Some(cause) => format!("{}: {}", message, cause),
            None => message.to_string(),
        };
        self.push(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_reporter_concurrent_writes() {
        let reporter = Arc::new(MemoryReporter::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let r = Arc::clone(&reporter);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        r.info(&format!("worker {} line {}", i, j));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(reporter.messages(Level::Info).len(), 200);
    }

    #[test]
    fn test_memory_reporter_levels() {
        let reporter = MemoryReporter::new();
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        reporter.warn("skipped a.jpg");
        reporter.error("move failed", Some(&cause));

        assert_eq!(reporter.messages(Level::Warn), vec!["skipped a.jpg"]);
        assert_eq!(reporter.messages(Level::Error), vec!["move failed: disk full"]);
    }
}
