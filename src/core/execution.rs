//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module runs a single resolved test case: it wraps an invocation batch
//! in the test-case extension chain, schedules `invocations` calls of the body
//! on at most `threads` workers, and enforces the batch timeout.
//!
//! 此模块运行单个已解析的测试用例：用测试用例扩展链包装一个调用批次，
//! 在最多 `threads` 个工作线程上调度 `invocations` 次主体调用，并强制执行批次超时。

use futures::{StreamExt, stream};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::extension::{TestCaseExtension, run_chain};
use crate::core::models::{
    ConfigSnapshot, Failure, Outcome, TestBody, TestCase, TestResult, catch_panic,
};

/// Runs test cases one at a time. Each test case's invocations may run in
/// parallel on the blocking pool of the runtime behind `handle`.
///
/// `run` blocks the calling thread, so it must not be called from inside an
/// async task of that runtime.
///
/// 一次运行一个测试用例。`run` 会阻塞调用线程，因此不能在该运行时的异步任务中调用。
#[derive(Clone)]
pub struct TestCaseRunner {
    handle: Handle,
    extensions: Vec<Arc<TestCaseExtension>>,
    fail_fast: bool,
}

impl TestCaseRunner {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            extensions: Vec::new(),
            fail_fast: true,
        }
    }

    /// Extensions wrapped around every test case, outside the test case's own.
    pub fn with_extensions(mut self, extensions: Vec<Arc<TestCaseExtension>>) -> Self {
        self.extensions = extensions;
        self
    }

    /// When set, no new invocation starts once one has failed.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Drives `case` to a terminal state.
    ///
    /// Disabled cases are skipped without touching any extension. Invalid
    /// configurations fail before anything runs. A timeout always wins over
    /// whatever the chain returns, since an extension must not turn an
    /// unfinished batch into a pass.
    pub fn run(&self, case: &TestCase) -> TestResult {
        let name = case.description.full_name();

        if !case.config.enabled {
            info!(test = %name, "test disabled, skipping");
            return TestResult::skipped(case);
        }

        if let Err(failure) = case.config.validate() {
            warn!(test = %name, error = %failure, "test not run");
            return TestResult::failed(case, &failure, Duration::ZERO);
        }

        let chain: Vec<Arc<TestCaseExtension>> = self
            .extensions
            .iter()
            .chain(case.config.extensions.iter())
            .cloned()
            .collect();

        debug!(test = %name, config = %ConfigSnapshot::from(&case.config), "running test");
        let start = Instant::now();
        let mut timed_out: Option<Failure> = None;

        // A panicking extension fails this test only.
        let outcome = catch_panic(|| {
            run_chain(&chain, case, &mut || {
                let outcome = self.run_batch(case);
                if let Err(failure) = &outcome {
                    if failure.is_timeout() {
                        timed_out = Some(failure.clone());
                    }
                }
                outcome
            })
        });
        let duration = start.elapsed();

        let result = match (timed_out, outcome) {
            (Some(timeout), _) => TestResult::failed(case, &timeout, duration),
            (None, Ok(())) => TestResult::passed(case, duration),
            (None, Err(failure)) => TestResult::failed(case, &failure, duration),
        };

        match &result.failure {
            None => info!(test = %name, ?duration, "test passed"),
            Some(detail) => warn!(
                test = %name,
                status = %result.status,
                config = %result.config,
                error = %detail.message,
                "test did not pass"
            ),
        }
        result
    }

    /// Runs the invocation batch of `case` once, outside of any extension.
    pub fn run_batch(&self, case: &TestCase) -> Outcome {
        self.handle.block_on(invoke_batch(
            case.body.clone(),
            ConfigSnapshot::from(&case.config),
            self.fail_fast,
        ))
    }
}

/// Calls `body` `config.invocations` times with at most `config.threads`
/// calls in flight, bounded as a whole by `config.timeout`.
///
/// On timeout no further invocation is started; invocations already running
/// are abandoned and their outcome is ignored.
///
/// 在超时时不再启动新的调用；已在运行的调用被放弃，其结果被忽略。
pub async fn invoke_batch(body: TestBody, config: ConfigSnapshot, fail_fast: bool) -> Outcome {
    let stop = CancellationToken::new();
    let batch = run_invocations(body, config, fail_fast, stop.clone());

    match config.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, batch).await {
            Ok(outcome) => outcome,
            Err(_) => {
                stop.cancel();
                warn!(?timeout, "invocation batch timed out");
                Err(Failure::Timeout { timeout })
            }
        },
        None => batch.await,
    }
}

async fn run_invocations(
    body: TestBody,
    config: ConfigSnapshot,
    fail_fast: bool,
    stop: CancellationToken,
) -> Outcome {
    let mut in_flight = stream::iter(0..config.invocations)
        .map(|index| {
            let body = body.clone();
            let stop = stop.clone();
            async move {
                let outcome = tokio::task::spawn_blocking(move || {
                    // Queued behind a failure or a timeout.
                    if stop.is_cancelled() {
                        return Ok(());
                    }
                    invoke(&body)
                })
                .await
                .unwrap_or_else(|e| Err(Failure::assertion(format!("invocation worker failed: {e}"))));
                (index, outcome)
            }
        })
        .buffer_unordered(config.threads);

    let mut first_failure: Option<Failure> = None;
    while let Some((index, outcome)) = in_flight.next().await {
        let Err(source) = outcome else {
            continue;
        };
        debug!(invocation = index, error = %source, "invocation failed");
        if first_failure.is_none() {
            first_failure = Some(Failure::Invocation {
                index,
                source: Box::new(source),
            });
        }
        if fail_fast {
            stop.cancel();
            break;
        }
    }

    match first_failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

/// One call of the body. A panic counts as an assertion failure.
fn invoke(body: &TestBody) -> Outcome {
    catch_panic(|| body())
}
