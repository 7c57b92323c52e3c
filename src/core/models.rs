//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the engine:
//! the failure taxonomy, registered and resolved test cases, and the result
//! types reported for each test case, spec and run.
//!
//! 此模块定义了整个引擎中使用的核心数据结构：失败分类、已注册和已解析的测试用例，
//! 以及为每个测试用例、spec 和运行报告的结果类型。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::{PartialTestCaseConfig, TestCaseConfig};
use crate::core::description::Description;

/// A failure signal raised by a test body, a hook, or the engine itself.
/// 由测试主体、钩子或引擎本身引发的失败信号。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Failure {
    /// The body raised an assertion failure or panicked.
    /// 测试主体引发了断言失败或 panic。
    #[error("{message}")]
    Assertion { message: String },
    /// One invocation of a batch failed.
    #[error("invocation #{index} failed: {source}")]
    Invocation {
        index: usize,
        #[source]
        source: Box<Failure>,
    },
    /// The invocation batch did not finish before its deadline.
    /// 调用批次未在截止时间之前完成。
    #[error("timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A before-all or after-all hook failed.
    #[error("{hook} hook failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: Box<Failure>,
    },
}

impl Failure {
    pub fn assertion(message: impl Into<String>) -> Self {
        Failure::Assertion {
            message: message.into(),
        }
    }

    /// Strips `Invocation` and `Hook` wrappers.
    pub fn root(&self) -> &Failure {
        match self {
            Failure::Invocation { source, .. } | Failure::Hook { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self.root(), Failure::Assertion { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Failure::Timeout { .. })
    }

    /// Index of the failing invocation, when the failure came out of a batch.
    pub fn invocation(&self) -> Option<usize> {
        match self {
            Failure::Invocation { index, .. } => Some(*index),
            Failure::Hook { source, .. } => source.invocation(),
            _ => None,
        }
    }

    pub(crate) fn reason(&self) -> FailureReason {
        match self.root() {
            Failure::Timeout { .. } => FailureReason::Timeout,
            Failure::Configuration(_) => FailureReason::Configuration,
            _ => FailureReason::Assertion,
        }
    }
}

/// Result of running a body, hook, extension or chain.
pub type Outcome = Result<(), Failure>;

/// Raises an assertion failure unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> Outcome {
    if condition {
        Ok(())
    } else {
        Err(Failure::assertion(message))
    }
}

/// Runs `f`. A panic becomes an assertion failure carrying the panic message,
/// so `assert!` works inside bodies, hooks and extensions alike.
pub(crate) fn catch_panic(f: impl FnOnce() -> Outcome) -> Outcome {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Failure::assertion(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

/// The executable part of a test case. It is shared by every invocation,
/// possibly from several worker threads at once.
pub type TestBody = Arc<dyn Fn() -> Outcome + Send + Sync>;

/// A before-all or after-all callable.
pub type Hook = Arc<dyn Fn() -> Outcome + Send + Sync>;

/// A test case as registered by a spec: identity, body and the fields the
/// author explicitly configured.
/// 由 spec 注册的测试用例：标识、主体以及作者显式配置的字段。
#[derive(Clone)]
pub struct RegisteredTest {
    pub description: Description,
    pub body: TestBody,
    pub overrides: PartialTestCaseConfig,
}

impl RegisteredTest {
    pub fn new(description: Description, body: TestBody) -> Self {
        Self {
            description,
            body,
            overrides: PartialTestCaseConfig::default(),
        }
    }

    /// Replaces the override with `config`. Only the fields set on `config`
    /// take precedence over the spec default.
    pub fn config(&mut self, config: PartialTestCaseConfig) -> &mut Self {
        self.overrides = config;
        self
    }

    /// Merges `overrides` onto `default` to produce the runnable test case.
    pub fn resolve(&self, default: &TestCaseConfig) -> TestCase {
        TestCase {
            description: self.description.clone(),
            body: self.body.clone(),
            config: default.merge(&self.overrides),
        }
    }
}

impl fmt::Debug for RegisteredTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTest")
            .field("description", &self.description)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

/// A test case with its effective configuration, ready to run. This is the
/// context test-case extensions receive.
#[derive(Clone)]
pub struct TestCase {
    pub description: Description,
    pub body: TestBody,
    pub config: TestCaseConfig,
}

impl TestCase {
    pub fn new(
        description: Description,
        config: TestCaseConfig,
        body: impl Fn() -> Outcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            description,
            body: Arc::new(body),
            config,
        }
    }

    pub fn name(&self) -> &str {
        self.description.name()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("description", &self.description)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Terminal state of a test case.
/// 测试用例的终止状态。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TestStatus::Passed => "Passed",
            TestStatus::Failed => "Failed",
            TestStatus::TimedOut => "Timed Out",
            TestStatus::Skipped => "Skipped",
        };
        f.write_str(label)
    }
}

/// Enumerates the possible reasons for a test case failure.
/// 枚举测试用例失败的可能原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum FailureReason {
    /// An invocation raised a failure signal.
    Assertion,
    /// The invocation batch exceeded its timeout.
    Timeout,
    /// The resolved configuration was invalid; the body never ran.
    Configuration,
    /// A before-all hook failed, so the test never ran.
    Aborted,
}

/// What went wrong, with enough context to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub reason: FailureReason,
    /// 0-based index of the failing invocation, if one was observed.
    pub invocation: Option<usize>,
    pub message: String,
}

impl FailureDetail {
    pub fn from_failure(failure: &Failure) -> Self {
        Self {
            reason: failure.reason(),
            invocation: failure.invocation(),
            message: failure.to_string(),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::Aborted,
            invocation: None,
            message: message.into(),
        }
    }
}

/// The subset of the effective configuration that shaped an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub invocations: usize,
    pub threads: usize,
    pub timeout: Option<Duration>,
}

impl From<&TestCaseConfig> for ConfigSnapshot {
    fn from(config: &TestCaseConfig) -> Self {
        Self {
            invocations: config.invocations,
            threads: config.threads,
            timeout: config.timeout,
        }
    }
}

impl fmt::Display for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invocations={}, threads={}, timeout={}",
            self.invocations,
            self.threads,
            self.timeout
                .map(|t| format!("{t:?}"))
                .unwrap_or_else(|| "none".to_string())
        )
    }
}

/// Represents the final result of a single test case.
/// 表示单个测试用例的最终结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub description: Description,
    pub status: TestStatus,
    pub failure: Option<FailureDetail>,
    pub duration: Duration,
    pub config: ConfigSnapshot,
}

impl TestResult {
    pub fn passed(case: &TestCase, duration: Duration) -> Self {
        Self {
            description: case.description.clone(),
            status: TestStatus::Passed,
            failure: None,
            duration,
            config: ConfigSnapshot::from(&case.config),
        }
    }

    pub fn skipped(case: &TestCase) -> Self {
        Self {
            description: case.description.clone(),
            status: TestStatus::Skipped,
            failure: None,
            duration: Duration::ZERO,
            config: ConfigSnapshot::from(&case.config),
        }
    }

    pub fn failed(case: &TestCase, failure: &Failure, duration: Duration) -> Self {
        let status = if failure.is_timeout() {
            TestStatus::TimedOut
        } else {
            TestStatus::Failed
        };
        Self {
            description: case.description.clone(),
            status,
            failure: Some(FailureDetail::from_failure(failure)),
            duration,
            config: ConfigSnapshot::from(&case.config),
        }
    }

    pub fn aborted(case: &TestCase, message: impl Into<String>) -> Self {
        Self {
            description: case.description.clone(),
            status: TestStatus::Failed,
            failure: Some(FailureDetail::aborted(message)),
            duration: Duration::ZERO,
            config: ConfigSnapshot::from(&case.config),
        }
    }

    pub fn name(&self) -> &str {
        self.description.name()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::TimedOut)
    }

    pub fn is_timeout(&self) -> bool {
        self.status == TestStatus::TimedOut
    }
}

/// Results of one spec, in declaration order.
/// 一个 spec 的结果，按声明顺序排列。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecReport {
    pub description: Description,
    pub results: Vec<TestResult>,
    /// A spec-level failure: a hook or a spec extension raised.
    pub failure: Option<String>,
    pub duration: Duration,
}

impl SpecReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && !self.results.iter().any(TestResult::is_failure)
    }

    pub fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Aggregate of every spec executed by one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub specs: Vec<SpecReport>,
    /// Failure of a project-level hook.
    pub failure: Option<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.specs.iter().all(SpecReport::is_success)
    }

    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        self.specs.iter().flat_map(|spec| spec.results.iter())
    }

    pub fn count(&self, status: TestStatus) -> usize {
        self.specs.iter().map(|spec| spec.count(status)).sum()
    }
}
