//! # Project Configuration Module / 项目配置模块
//!
//! Project-wide defaults, extensions and hooks. A `ProjectConfig` is built
//! once at start-up and handed to the [`Engine`](crate::engine::Engine);
//! nothing looks it up globally.
//!
//! 项目范围的默认值、扩展和钩子。`ProjectConfig` 在启动时构建一次并传递给引擎，不存在全局查找。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::config::{PartialTestCaseConfig, TestCaseConfig};
use crate::core::extension::{SpecExtension, TestCaseExtension};
use crate::core::models::{Hook, Outcome};

/// Engine knobs that do not belong to any single test case.
/// 不属于任何单个测试用例的引擎参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// How many specs may run at the same time.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Upper bound of the worker pool that hosts invocations.
    #[serde(default = "default_max_blocking_threads")]
    pub max_blocking_threads: usize,
    /// Stop starting invocations of a test once one has failed.
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,
}

fn default_jobs() -> usize {
    1
}

fn default_max_blocking_threads() -> usize {
    512
}

fn default_fail_fast() -> bool {
    true
}

impl EngineSettings {
    /// Size of the runtime's blocking pool. Every concurrently running spec
    /// parks one thread while it waits for its invocations, so those threads
    /// come on top of `max_blocking_threads`.
    pub fn blocking_pool_size(&self) -> usize {
        let spec_threads = if self.jobs > 1 { self.jobs } else { 0 };
        self.max_blocking_threads.max(1) + spec_threads
    }

    /// Whether a test asking for `threads` workers would get fewer than that
    /// from the invocation pool.
    pub fn caps_threads(&self, threads: usize) -> bool {
        threads > self.max_blocking_threads.max(1)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            max_blocking_threads: default_max_blocking_threads(),
            fail_fast: default_fail_fast(),
        }
    }
}

/// The on-disk part of a project configuration, read from TOML.
///
/// ```toml
/// [defaults]
/// invocations = 1
/// timeout_ms = 5000
///
/// [engine]
/// jobs = 2
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub defaults: PartialTestCaseConfig,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Clone, Default)]
pub struct ProjectConfig {
    /// Merged onto the built-in defaults to give the project default.
    pub defaults: PartialTestCaseConfig,
    pub spec_extensions: Vec<Arc<SpecExtension>>,
    pub test_case_extensions: Vec<Arc<TestCaseExtension>>,
    pub before_all: Vec<Hook>,
    pub after_all: Vec<Hook>,
    pub settings: EngineSettings,
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: ProjectFile) -> Self {
        Self {
            defaults: file.defaults,
            settings: file.engine,
            ..Self::default()
        }
    }

    pub fn with_defaults(mut self, defaults: PartialTestCaseConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_spec_extension(mut self, extension: Arc<SpecExtension>) -> Self {
        self.spec_extensions.push(extension);
        self
    }

    pub fn with_test_case_extension(mut self, extension: Arc<TestCaseExtension>) -> Self {
        self.test_case_extensions.push(extension);
        self
    }

    pub fn with_before_all(mut self, hook: impl Fn() -> Outcome + Send + Sync + 'static) -> Self {
        self.before_all.push(Arc::new(hook));
        self
    }

    pub fn with_after_all(mut self, hook: impl Fn() -> Outcome + Send + Sync + 'static) -> Self {
        self.after_all.push(Arc::new(hook));
        self
    }

    /// Built-in defaults with the project's `defaults` merged on top.
    pub fn default_test_config(&self) -> TestCaseConfig {
        TestCaseConfig::default().merge(&self.defaults)
    }
}

impl fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("defaults", &self.defaults)
            .field("spec_extensions", &self.spec_extensions.len())
            .field("test_case_extensions", &self.test_case_extensions.len())
            .field("before_all", &self.before_all.len())
            .field("after_all", &self.after_all.len())
            .field("settings", &self.settings)
            .finish()
    }
}
