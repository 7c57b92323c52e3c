//! # Engine Module / 引擎模块
//!
//! The engine owns the worker runtime and the project configuration. It fires
//! the project-level hooks once around a whole run and executes specs, up to
//! `jobs` of them at a time. Each spec is independent: a spec that fails or
//! aborts never affects its siblings.
//!
//! 引擎拥有工作运行时和项目配置。它在整个运行前后各触发一次项目级钩子，并最多同时执行 `jobs` 个 spec。

use anyhow::{Context, Result};
use chrono::Utc;
use futures::{StreamExt, stream};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, error, info, warn};

use crate::core::{
    ProjectConfig, RunReport, Spec, SpecReport, SpecRunner, TestCaseRunner, lifecycle::Lifecycle,
};

pub struct Engine {
    handle: Handle,
    /// Taken on drop so the runtime can be shut down without waiting.
    runtime: Option<Runtime>,
    project: ProjectConfig,
    lifecycle: Lifecycle,
}

impl Engine {
    pub fn new(project: ProjectConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("specrun-worker")
            .max_blocking_threads(project.settings.blocking_pool_size())
            .build()
            .context("Failed to start the worker runtime")?;
        let lifecycle = Lifecycle::new(project.before_all.clone(), project.after_all.clone());

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            project,
            lifecycle,
        })
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    pub fn test_case_runner(&self) -> TestCaseRunner {
        TestCaseRunner::new(self.handle.clone())
            .with_extensions(self.project.test_case_extensions.clone())
            .with_fail_fast(self.project.settings.fail_fast)
    }

    pub fn spec_runner(&self) -> SpecRunner {
        SpecRunner::new(self.test_case_runner(), self.project.default_test_config())
            .with_extensions(self.project.spec_extensions.clone())
    }

    /// Runs a single spec. Project-level hooks are not involved.
    pub fn run_spec(&self, spec: &Spec) -> SpecReport {
        self.spec_runner().run(spec)
    }

    /// Runs `specs` between the project before-all and after-all hooks.
    ///
    /// Reports come back in the order the specs were given, whatever order
    /// they finished in.
    pub fn run(&self, specs: Vec<Spec>) -> RunReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let runner = self.spec_runner();
        info!(specs = specs.len(), jobs = self.project.settings.jobs, "starting run");

        if let Err(failure) = self.lifecycle.start() {
            error!(error = %failure, "project before-all failed, aborting every spec");
            let reason = failure.to_string();
            return RunReport {
                started_at,
                duration: start.elapsed(),
                specs: specs.iter().map(|spec| runner.abort(spec, &reason)).collect(),
                failure: Some(reason),
            };
        }

        self.warn_capped_threads(&runner, &specs);
        let reports = if self.project.settings.jobs <= 1 {
            specs.iter().map(|spec| runner.run(spec)).collect()
        } else {
            self.run_concurrently(runner, specs)
        };

        let failure = self.lifecycle.finish().err().map(|failure| {
            warn!(error = %failure, "project after-all failed");
            failure.to_string()
        });

        let report = RunReport {
            started_at,
            duration: start.elapsed(),
            specs: reports,
            failure,
        };
        info!(success = report.is_success(), duration = ?report.duration, "run finished");
        report
    }

    fn run_concurrently(&self, runner: SpecRunner, specs: Vec<Spec>) -> Vec<SpecReport> {
        let jobs = self.project.settings.jobs;
        let mut reports: Vec<(usize, SpecReport)> = self.handle.block_on(async {
            stream::iter(specs.into_iter().map(Arc::new).enumerate())
                .map(|(index, spec)| {
                    let runner = runner.clone();
                    async move {
                        // Spec runners block on the runtime, so they live on the
                        // blocking pool, which reserves one thread per job.
                        let task = {
                            let (runner, spec) = (runner.clone(), spec.clone());
                            tokio::task::spawn_blocking(move || runner.run(&spec))
                        };
                        let report = task.await.unwrap_or_else(|e| {
                            let message = format!("spec runner crashed: {e}");
                            error!(spec = %spec.description(), %message);
                            runner.abort(&spec, &message)
                        });
                        (index, report)
                    }
                })
                .buffer_unordered(jobs)
                .collect()
                .await
        });
        reports.sort_by_key(|(index, _)| *index);
        reports.into_iter().map(|(_, report)| report).collect()
    }

    fn warn_capped_threads(&self, runner: &SpecRunner, specs: &[Spec]) {
        let settings = &self.project.settings;
        let widest = widest_batch(runner, specs);
        if settings.caps_threads(widest) {
            warn!(
                threads = widest,
                max_blocking_threads = settings.max_blocking_threads,
                "some tests ask for more threads than the invocation pool holds"
            );
        } else {
            debug!(threads = widest, "invocation pool is wide enough");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Invocations abandoned by a timeout may still be running; do not wait for them.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// The largest `threads` any enabled test of `specs` resolves to.
fn widest_batch(runner: &SpecRunner, specs: &[Spec]) -> usize {
    specs
        .iter()
        .flat_map(|spec| {
            let default = runner.spec_default(spec);
            spec.tests()
                .iter()
                .map(move |registered| registered.resolve(&default).config)
                .filter(|config| config.enabled)
                .map(|config| config.threads)
                .collect::<Vec<_>>()
        })
        .max()
        .unwrap_or(0)
}
