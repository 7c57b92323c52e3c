//! # specrun
//!
//! A test-execution engine. Given a spec (a named group of test cases) and a
//! project configuration, it runs every test case a configured number of
//! times on a bounded worker pool, under a batch timeout, behind two nested
//! chains of extensions: one around the whole spec and one around each test
//! case.
//!
//! 一个测试执行引擎。给定 spec（具名测试用例组）和项目配置，它在有界工作池上按配置次数运行每个测试用例，
//! 受批次超时约束，并经过两层嵌套扩展链：一层包裹整个 spec，一层包裹每个测试用例。
//!
//! ## Modules / 模块
//!
//! - `core` - Descriptions, configuration, extensions, test case and spec runners
//! - `engine` - Multi-spec driver owning the worker runtime and project hooks
//! - `infra` - Logging and configuration file loading
//! - `reporting` - Console summaries and JSON reports
//! - `cli` - Command-line interface
//! - `selfcheck` - Specs the engine runs against itself
//!
//! ```
//! use specrun::core::{ensure, PartialTestCaseConfig, ProjectConfig, Spec, TestStatus};
//! use specrun::engine::Engine;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let seen = calls.clone();
//!
//! let mut spec = Spec::builder("Counter");
//! spec.test("runs four times", move || {
//!     seen.fetch_add(1, Ordering::SeqCst);
//!     ensure(true, "unreachable")
//! })
//! .config(PartialTestCaseConfig::new().invocations(4).threads(2));
//!
//! let engine = Engine::new(ProjectConfig::new()).unwrap();
//! let report = engine.run_spec(&spec.build());
//!
//! assert_eq!(report.results[0].status, TestStatus::Passed);
//! assert_eq!(calls.load(Ordering::SeqCst), 4);
//! ```

pub mod cli;
pub mod core;
pub mod engine;
pub mod infra;
pub mod reporting;
pub mod selfcheck;

// Re-export commonly used items
pub use crate::core::models;
pub use crate::core::config;
pub use crate::core::execution;
pub use engine::Engine;
