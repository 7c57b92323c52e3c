//! # Core Module / 核心模块
//!
//! This module contains the core of the engine: descriptions, the
//! configuration model, extension chains, and the test case and spec runners.
//!
//! 此模块包含引擎的核心：描述、配置模型、扩展链，以及测试用例和 spec 运行器。

pub mod config;
pub mod description;
pub mod execution;
pub mod extension;
pub mod lifecycle;
pub mod models;
pub mod project;
pub mod spec;
pub mod spec_runner;

// Re-exports
pub use config::{PartialTestCaseConfig, Tag, TestCaseConfig};
pub use description::Description;
pub use execution::TestCaseRunner;
pub use extension::{
    Extension, Proceed, SpecExtension, TestCaseExtension, spec_extension, test_case_extension,
};
pub use models::{
    Failure, FailureReason, Outcome, RunReport, SpecReport, TestCase, TestResult, TestStatus,
    ensure,
};
pub use project::{EngineSettings, ProjectConfig, ProjectFile};
pub use spec::{Spec, SpecBuilder};
pub use spec_runner::SpecRunner;
