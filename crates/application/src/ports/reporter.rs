//! Reporter port

/// Port for the test framework's failure reporting.
///
/// `fatal` is called right before an operation returns an error that ends the
/// test. `error` records a failure and lets the test continue.
pub trait Reporter: Send + Sync {
    /// Records a failure that stops the current test.
    fn fatal(&self, message: &str);

    /// Records a failure; the test keeps running.
    fn error(&self, message: &str);
}
