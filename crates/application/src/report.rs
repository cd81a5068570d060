//! Collecting reporter.
//!
//! `TestReport` gathers every failure of one test case. The test fails when the
//! report is finished, or when it is dropped with failures nobody looked at.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use wirecheck_domain::{Failure, Severity};

use crate::ports::Reporter;

/// Reporter that accumulates failures for the current test case.
#[derive(Debug, Default)]
pub struct TestReport {
    failures: Mutex<Vec<Failure>>,
    checked: AtomicBool,
}

impl TestReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty report ready to hand to a recorder.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of every failure recorded so far.
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        self.failures.lock().clone()
    }

    /// Messages of the non-fatal failures recorded so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    /// Messages of the fatal failures recorded so far.
    #[must_use]
    pub fn fatals(&self) -> Vec<String> {
        self.messages(Severity::Fatal)
    }

    /// Whether anything has been recorded.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        !self.failures.lock().is_empty()
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Whether no failure has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Removes and returns every failure recorded so far.
    ///
    /// Useful when a test expects failures and asserts on them itself.
    pub fn take(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.lock())
    }

    /// Ends the test case, panicking with the full listing if anything failed.
    ///
    /// # Panics
    ///
    /// Panics when at least one failure was recorded.
    #[allow(clippy::panic)]
    pub fn finish(&self) {
        self.checked.store(true, Ordering::SeqCst);
        let failures = self.failures.lock();
        if !failures.is_empty() {
            panic!("{}", summarize(&failures));
        }
    }

    fn messages(&self, severity: Severity) -> Vec<String> {
        self.failures
            .lock()
            .iter()
            .filter(|f| f.severity == severity)
            .map(|f| f.message.clone())
            .collect()
    }

    fn push(&self, failure: Failure) {
        self.failures.lock().push(failure);
    }
}

impl Reporter for TestReport {
    fn fatal(&self, message: &str) {
        self.push(Failure::fatal(message));
    }

    fn error(&self, message: &str) {
        self.push(Failure::error(message));
    }
}

impl Drop for TestReport {
    #[allow(clippy::panic)]
    fn drop(&mut self) {
        if self.checked.load(Ordering::SeqCst) || std::thread::panicking() {
            return;
        }
        let failures = self.failures.get_mut();
        if !failures.is_empty() {
            panic!("{}", summarize(failures));
        }
    }
}

fn summarize(failures: &[Failure]) -> String {
    let mut out = format!("{} test failure(s):", failures.len());
    for failure in failures {
        out.push_str("\n  ");
        out.push_str(&failure.to_string());
    }
    out
}
