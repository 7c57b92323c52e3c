//! # Spec Runner Module / Spec 运行器模块
//!
//! Runs every test case of a spec, in declaration order, as one unit wrapped
//! by the spec-scope extension chain. Before-all and after-all hooks fire once
//! per spec instance.
//!
//! 按声明顺序运行 spec 的所有测试用例，并将其作为一个整体由 spec 级扩展链包装。

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::core::config::TestCaseConfig;
use crate::core::execution::TestCaseRunner;
use crate::core::extension::{SpecExtension, run_chain};
use crate::core::models::{Outcome, SpecReport, TestResult, catch_panic};
use crate::core::spec::Spec;

#[derive(Clone)]
pub struct SpecRunner {
    tests: TestCaseRunner,
    extensions: Vec<Arc<SpecExtension>>,
    default_config: TestCaseConfig,
}

impl SpecRunner {
    /// `default_config` is the project-wide default every spec default is
    /// merged onto.
    pub fn new(tests: TestCaseRunner, default_config: TestCaseConfig) -> Self {
        Self {
            tests,
            extensions: Vec::new(),
            default_config,
        }
    }

    /// Spec extensions wrapped around every spec, outside the spec's own.
    pub fn with_extensions(mut self, extensions: Vec<Arc<SpecExtension>>) -> Self {
        self.extensions = extensions;
        self
    }

    /// The default a test case of `spec` inherits when it overrides nothing.
    pub fn spec_default(&self, spec: &Spec) -> TestCaseConfig {
        self.default_config.merge(spec.default_config())
    }

    pub fn run(&self, spec: &Spec) -> SpecReport {
        info!(spec = %spec.description(), tests = spec.tests().len(), "running spec");
        let start = Instant::now();
        let default = self.spec_default(spec);

        let chain: Vec<Arc<SpecExtension>> = self
            .extensions
            .iter()
            .chain(spec.extensions().iter())
            .cloned()
            .collect();

        let mut results: Vec<TestResult> = Vec::new();
        let outcome = catch_panic(|| {
            run_chain(&chain, spec, &mut || {
                results.clear();
                self.run_tests(spec, &default, &mut results)
            })
        });

        // Tests never reached: held back by a spec extension, or cut off by
        // a spec-level failure.
        for registered in &spec.tests()[results.len()..] {
            let case = registered.resolve(&default);
            results.push(match &outcome {
                Ok(()) => TestResult::skipped(&case),
                Err(failure) => TestResult::aborted(&case, failure.to_string()),
            });
        }

        let report = SpecReport {
            description: spec.description().clone(),
            results,
            failure: outcome.err().map(|failure| failure.to_string()),
            duration: start.elapsed(),
        };
        match &report.failure {
            Some(failure) => error!(spec = %spec.description(), %failure, "spec failed"),
            None => info!(
                spec = %spec.description(),
                success = report.is_success(),
                duration = ?report.duration,
                "spec finished"
            ),
        }
        report
    }

    /// Reports every test case of `spec` as aborted without running anything.
    pub fn abort(&self, spec: &Spec, reason: &str) -> SpecReport {
        let default = self.spec_default(spec);
        SpecReport {
            description: spec.description().clone(),
            results: spec
                .tests()
                .iter()
                .map(|registered| TestResult::aborted(&registered.resolve(&default), reason))
                .collect(),
            failure: Some(reason.to_string()),
            duration: Default::default(),
        }
    }

    fn run_tests(
        &self,
        spec: &Spec,
        default: &TestCaseConfig,
        results: &mut Vec<TestResult>,
    ) -> Outcome {
        if let Err(failure) = spec.lifecycle().start() {
            let reason = failure.to_string();
            results.extend(
                spec.tests()
                    .iter()
                    .map(|registered| TestResult::aborted(&registered.resolve(default), &reason)),
            );
            return Err(failure);
        }

        for registered in spec.tests() {
            let case = registered.resolve(default);
            results.push(self.tests.run(&case));
        }

        spec.lifecycle().finish()
    }
}
