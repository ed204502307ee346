//! In-kernel self-test support.
//!
//! Tests are plain `fn() -> TestResult` functions. The assertion macros log
//! through klog and return `TestResult::Fail` early, so a failing check never
//! panics the kernel.

mod assertions;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    Skipped,
}

impl TestResult {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail)
    }
}

/// Pass/total counters for one suite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: u32,
    pub passed: u32,
    pub skipped: u32,
}

impl SuiteSummary {
    pub fn record(&mut self, result: TestResult) {
        self.total += 1;
        match result {
            TestResult::Pass => self.passed += 1,
            TestResult::Skipped => self.skipped += 1,
            TestResult::Fail => {}
        }
    }

    #[inline]
    pub fn failed(&self) -> u32 {
        self.total - self.passed - self.skipped
    }

    #[inline]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

pub fn run_single_test<F>(name: &str, test: F) -> TestResult
where
    F: FnOnce() -> TestResult,
{
    let result = test();
    match result {
        TestResult::Pass => crate::klog_debug!("TEST PASS: {}", name),
        TestResult::Skipped => crate::klog_info!("TEST SKIP: {}", name),
        TestResult::Fail => crate::klog_info!("TEST FAIL: {}", name),
    }
    result
}

#[macro_export]
macro_rules! pass {
    () => {
        $crate::testing::TestResult::Pass
    };
}

#[macro_export]
macro_rules! fail {
    () => {
        $crate::testing::TestResult::Fail
    };
    ($msg:expr) => {{
        $crate::klog_info!("TEST FAIL: {}", $msg);
        $crate::testing::TestResult::Fail
    }};
    ($fmt:expr, $($arg:tt)*) => {{
        $crate::klog_info!(concat!("TEST FAIL: ", $fmt), $($arg)*);
        $crate::testing::TestResult::Fail
    }};
}

#[macro_export]
macro_rules! run_test {
    ($summary:expr, $test_fn:expr) => {{
        let result = $crate::testing::run_single_test(stringify!($test_fn), || $test_fn());
        $summary.record(result);
        result
    }};
}

/// Run a list of test functions and log the suite's totals.
#[macro_export]
macro_rules! run_suite {
    ($suite_name:expr, [$($test_fn:path),* $(,)?]) => {{
        let mut summary = $crate::testing::SuiteSummary::default();
        $(
            $crate::run_test!(summary, $test_fn);
        )*
        $crate::klog_info!(
            "SUITE {}: {}/{} passed, {} skipped",
            $suite_name,
            summary.passed,
            summary.total,
            summary.skipped
        );
        summary
    }};
}
