//! # Spec Module / Spec 模块
//!
//! A spec is a named group of test cases sharing a default configuration,
//! spec-scope extensions and before-all / after-all hooks. Specs are put
//! together with [`SpecBuilder`]; the order of registration is the order of
//! execution.
//!
//! spec 是一组具名测试用例，共享默认配置、spec 级扩展以及 before-all / after-all 钩子。

use std::fmt;
use std::sync::Arc;

use crate::core::config::PartialTestCaseConfig;
use crate::core::description::Description;
use crate::core::extension::{Extension, SpecExtension};
use crate::core::lifecycle::Lifecycle;
use crate::core::models::{Hook, Outcome, RegisteredTest};

/// A group of registered test cases. This is the context spec extensions receive.
pub struct Spec {
    description: Description,
    default_config: PartialTestCaseConfig,
    extensions: Vec<Arc<SpecExtension>>,
    tests: Vec<RegisteredTest>,
    lifecycle: Lifecycle,
}

impl Spec {
    pub fn builder(name: impl Into<String>) -> SpecBuilder {
        SpecBuilder::new(name)
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn name(&self) -> &str {
        self.description.name()
    }

    /// The spec's default, as written. It is merged onto the project default
    /// before any test case override is applied.
    pub fn default_config(&self) -> &PartialTestCaseConfig {
        &self.default_config
    }

    pub fn extensions(&self) -> &[Arc<SpecExtension>] {
        &self.extensions
    }

    pub fn tests(&self) -> &[RegisteredTest] {
        &self.tests
    }

    pub(crate) fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("description", &self.description)
            .field("default_config", &self.default_config)
            .field("extensions", &self.extensions.len())
            .field("tests", &self.tests)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Spec`].
///
/// ```
/// use specrun::core::{ensure, PartialTestCaseConfig, Spec};
///
/// let mut builder = Spec::builder("Strings");
/// builder.context("length", |scope| {
///     scope
///         .test("counts bytes", || ensure("sammy".len() == 5, "length mismatch"))
///         .config(PartialTestCaseConfig::new().invocations(3));
/// });
/// let spec = builder.build();
/// assert_eq!(spec.tests()[0].description.id(), "Strings/length/counts bytes");
/// ```
pub struct SpecBuilder {
    scope: Description,
    default_config: PartialTestCaseConfig,
    extensions: Vec<Arc<SpecExtension>>,
    tests: Vec<RegisteredTest>,
    before_all: Vec<Hook>,
    after_all: Vec<Hook>,
}

impl SpecBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scope: Description::root(name),
            default_config: PartialTestCaseConfig::default(),
            extensions: Vec::new(),
            tests: Vec::new(),
            before_all: Vec::new(),
            after_all: Vec::new(),
        }
    }

    pub fn default_config(&mut self, config: PartialTestCaseConfig) -> &mut Self {
        self.default_config = config;
        self
    }

    pub fn extension(&mut self, extension: impl Extension<Spec> + 'static) -> &mut Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    pub fn extension_arc(&mut self, extension: Arc<SpecExtension>) -> &mut Self {
        self.extensions.push(extension);
        self
    }

    pub fn before_all(&mut self, hook: impl Fn() -> Outcome + Send + Sync + 'static) -> &mut Self {
        self.before_all.push(Arc::new(hook));
        self
    }

    pub fn after_all(&mut self, hook: impl Fn() -> Outcome + Send + Sync + 'static) -> &mut Self {
        self.after_all.push(Arc::new(hook));
        self
    }

    /// Registers everything `f` declares one level deeper.
    pub fn context(&mut self, name: impl Into<String>, f: impl FnOnce(&mut Self)) -> &mut Self {
        let child = self.scope.append(name);
        let parent = std::mem::replace(&mut self.scope, child);
        f(self);
        self.scope = parent;
        self
    }

    /// Registers a test case in the current scope and returns it so a
    /// `.config(...)` override can be attached.
    pub fn test(
        &mut self,
        name: impl Into<String>,
        body: impl Fn() -> Outcome + Send + Sync + 'static,
    ) -> &mut RegisteredTest {
        let description = self.scope.append(name);
        self.tests.push(RegisteredTest::new(description, Arc::new(body)));
        let last = self.tests.len() - 1;
        &mut self.tests[last]
    }

    pub fn build(self) -> Spec {
        Spec {
            description: self.scope,
            default_config: self.default_config,
            extensions: self.extensions,
            tests: self.tests,
            lifecycle: Lifecycle::new(self.before_all, self.after_all),
        }
    }
}
