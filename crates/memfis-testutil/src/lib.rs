//! Test utilities for memfis.
//!
//! [`check_fs`] exercises any [`memfis::Filesystem`] against the handle
//! contract and reports the outcome as a [`TestSummary`];
//! [`check_memfs`] adds the checks that only a [`memfis::MemFs`] file
//! handle supports (positional reads, `write_to`).

mod check;

pub use check::{check_fs, check_memfs};

use std::fmt;

/// The result of running a single check.
#[derive(Debug, Clone)]
pub enum TestResult {
    /// Check passed.
    Pass,
    /// Check failed with expected vs actual mismatch.
    Fail { expected: String, actual: String },
    /// Check was skipped.
    Skip { reason: String },
    /// An operation failed that should have succeeded.
    Error { message: String },
}

impl TestResult {
    pub(crate) fn mismatch(expected: impl fmt::Debug, actual: impl fmt::Debug) -> Self {
        TestResult::Fail {
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    pub(crate) fn error(message: impl fmt::Display) -> Self {
        TestResult::Error {
            message: message.to_string(),
        }
    }
}

/// Summary of running multiple checks.
#[derive(Debug, Default)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub failures: Vec<TestFailure>,
}

/// A single failed check with the path it ran against.
#[derive(Debug, Clone)]
pub struct TestFailure {
    pub name: String,
    pub path: String,
    pub result: TestResult,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, path: impl Into<String>, result: TestResult) {
        match &result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail { .. } => {
                self.failed += 1;
                self.push_failure(name.into(), path.into(), result);
            }
            TestResult::Skip { .. } => {
                self.skipped += 1;
            }
            TestResult::Error { .. } => {
                self.errors += 1;
                self.push_failure(name.into(), path.into(), result);
            }
        }
    }

    fn push_failure(&mut self, name: String, path: String, result: TestResult) {
        tracing::debug!(check = %name, %path, ?result, "check failed");
        self.failures.push(TestFailure { name, path, result });
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: TestSummary) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.failures.extend(other.failures);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", "═".repeat(60))?;
        writeln!(f, "Check Summary: {} total", self.total())?;
        writeln!(
            f,
            "  ✓ {} passed  ✗ {} failed  ⊘ {} skipped  ⚠ {} errors",
            self.passed, self.failed, self.skipped, self.errors
        )?;

        if !self.failures.is_empty() {
            writeln!(f, "\nFailures:")?;
            for failure in &self.failures {
                writeln!(f, "\n  {} ({})", failure.name, failure.path)?;
                match &failure.result {
                    TestResult::Fail { expected, actual } => {
                        writeln!(f, "    expected: {}", expected)?;
                        writeln!(f, "    actual:   {}", actual)?;
                    }
                    TestResult::Error { message } => {
                        writeln!(f, "    error: {}", message)?;
                    }
                    _ => {}
                }
            }
        }
        writeln!(f, "{}", "═".repeat(60))?;
        Ok(())
    }
}
