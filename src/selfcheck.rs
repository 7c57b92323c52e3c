//! # Self-Check Suites / 自检套件
//!
//! Specs in which the engine verifies its own contract: invocation counts,
//! disabled tests, threads versus timeout, configuration inheritance,
//! interceptor ordering, extension overrides and once-only hooks. The
//! `specrun run` command executes them.
//!
//! 引擎用于验证自身约定的 spec：调用次数、禁用测试、线程与超时、配置继承、拦截器顺序、扩展覆盖以及只执行一次的钩子。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::{
    Description, Failure, Outcome, PartialTestCaseConfig, ProjectConfig, Proceed, Spec, Tag,
    TestCase, ensure, models::RegisteredTest, spec_extension, test_case_extension,
};

/// Interceptor order observed by the ordering checks.
pub const EXPECTED_ORDER: &str = "A1.B1.C1.D1.E1.F1.test call.F2.E2.D2.C2.";

/// Text logs keyed by scope id, so concurrent specs and tests never share one.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<HashMap<String, String>>,
}

impl Journal {
    pub fn append(&self, key: &str, text: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(key.to_string()).or_default().push_str(text);
    }

    pub fn read(&self, key: &str) -> String {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned().unwrap_or_default()
    }
}

/// Counters and logs shared by the project configuration and the suites.
#[derive(Default)]
pub struct ProjectState {
    pub before_all: AtomicUsize,
    pub after_all: AtomicUsize,
    /// Spec-scope interceptor log, keyed by spec id.
    pub spec_log: Journal,
}

/// The project configuration and specs of a self-check run.
pub struct SelfCheck {
    pub project: ProjectConfig,
    pub specs: Vec<Spec>,
    pub state: Arc<ProjectState>,
}

/// Adds the self-check hooks and extensions to `project` and builds the suites.
pub fn build(project: ProjectConfig) -> SelfCheck {
    let state = Arc::new(ProjectState::default());

    let project = project
        .with_before_all(counting(state.clone(), |s| &s.before_all))
        .with_after_all(counting(state.clone(), |s| &s.after_all))
        .with_spec_extension(logging_spec_extension(&state, "A"))
        .with_spec_extension(logging_spec_extension(&state, "B"));

    let specs = vec![
        config_spec(&project, &state),
        lifecycle_spec(&state),
    ];

    SelfCheck {
        project,
        specs,
        state,
    }
}

fn counting(
    state: Arc<ProjectState>,
    counter: fn(&ProjectState) -> &AtomicUsize,
) -> impl Fn() -> Outcome + Send + Sync + 'static {
    move || {
        counter(&state).fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn logging_spec_extension(state: &Arc<ProjectState>, name: &'static str) -> Arc<crate::core::SpecExtension> {
    let state = state.clone();
    spec_extension(move |spec: &Spec, proceed: Proceed<'_>| {
        let key = spec.description().id();
        state.spec_log.append(&key, &format!("{name}1."));
        let outcome = proceed();
        state.spec_log.append(&key, &format!("{name}2."));
        outcome
    })
}

fn logging_case_extension(
    journal: &Arc<Journal>,
    name: &'static str,
) -> Arc<crate::core::TestCaseExtension> {
    let journal = journal.clone();
    test_case_extension(move |case: &TestCase, proceed: Proceed<'_>| {
        let key = case.description.id();
        journal.append(&key, &format!("{name}1."));
        let outcome = proceed();
        journal.append(&key, &format!("{name}2."));
        outcome
    })
}

fn config_spec(project: &ProjectConfig, state: &Arc<ProjectState>) -> Spec {
    let case_log = Arc::new(Journal::default());
    let invocations = Arc::new(AtomicUsize::new(0));
    let default_invocations = Arc::new(AtomicUsize::new(0));
    let threads = Arc::new(AtomicUsize::new(0));

    let extension_e = logging_case_extension(&case_log, "E");
    let extension_f = logging_case_extension(&case_log, "F");
    let swallow = test_case_extension(|_: &TestCase, proceed: Proceed<'_>| match proceed() {
        Err(failure) if failure.is_assertion() => Ok(()),
        other => other,
    });

    let spec_defaults = PartialTestCaseConfig::new()
        .invocations(3)
        .tags(["A"])
        .extensions(vec![extension_e.clone(), extension_f.clone()]);
    let spec_default = project.default_test_config().merge(&spec_defaults);

    let mut builder = Spec::builder("ConfigTest");
    builder.default_config(spec_defaults);

    // Checked once every other spec extension has unwound its after-code.
    let verification = {
        let state = state.clone();
        spec_extension(move |spec: &Spec, proceed: Proceed<'_>| {
            proceed()?;
            let log = state.spec_log.read(&spec.description().id());
            ensure(
                log == EXPECTED_ORDER,
                format!("interceptor order was {log:?}, expected {EXPECTED_ORDER:?}"),
            )
        })
    };
    let counters = {
        let (invocations, default_invocations, threads) =
            (invocations.clone(), default_invocations.clone(), threads.clone());
        spec_extension(move |_: &Spec, proceed: Proceed<'_>| {
            proceed()?;
            expect_count("invocation parameter", &invocations, 5)?;
            expect_count("default config", &default_invocations, 3)?;
            expect_count("threads parameter", &threads, 100)
        })
    };
    builder
        .extension_arc(verification)
        .extension_arc(logging_spec_extension(state, "C"))
        .extension_arc(logging_spec_extension(state, "D"))
        .extension_arc(counters);

    builder.context("TestCase config", |scope| {
        let counter = invocations.clone();
        scope
            .test("support invocation parameter", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .config(PartialTestCaseConfig::new().invocations(5));

        scope
            .test("support ignored", || Err(Failure::assertion("shouldn't run")))
            .config(PartialTestCaseConfig::new().enabled(false));

        // 100 invocations sleeping 1s each on 100 threads take about 1s in
        // total, an order of magnitude below the timeout.
        let counter = threads.clone();
        scope
            .test("support threads parameter", move || {
                std::thread::sleep(Duration::from_secs(1));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .config(
                PartialTestCaseConfig::new()
                    .timeout(Duration::from_secs(10))
                    .threads(100)
                    .invocations(100),
            );

        let counter = default_invocations.clone();
        scope.test("use default config", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let default = spec_default.clone();
        scope.test("override only actually set values", move || {
            let resolved = sample_test()
                .config(PartialTestCaseConfig::new().invocations(2).threads(4))
                .resolve(&default);
            ensure(resolved.config.invocations == 2, "invocations not overridden")?;
            ensure(resolved.config.threads == 4, "threads not overridden")?;
            ensure(resolved.config.tags == tags_a(), "tags not inherited")
        });

        let default = spec_default.clone();
        scope
            .test("use default config, if no test case config is given", move || {
                let resolved = sample_test().resolve(&default);
                ensure(resolved.config.invocations == 3, "invocations not inherited")?;
                ensure(resolved.config.threads == 1, "threads not inherited")?;
                ensure(resolved.config.tags == tags_a(), "tags not inherited")
            })
            .config(PartialTestCaseConfig::new().invocations(1));

        let order_verification = {
            let (case_log, state) = (case_log.clone(), state.clone());
            test_case_extension(move |case: &TestCase, proceed: Proceed<'_>| {
                proceed()?;
                let spec_key = case.description.parents()[0].clone();
                state
                    .spec_log
                    .append(&spec_key, &case_log.read(&case.description.id()));
                Ok(())
            })
        };
        let log = case_log.clone();
        let key = scope_id(&scope_description(), "should call interceptors in order of definition");
        scope
            .test("should call interceptors in order of definition", move || {
                log.append(&key, "test call.");
                Ok(())
            })
            .config(PartialTestCaseConfig::new().invocations(1).extensions(vec![
                order_verification,
                extension_e.clone(),
                extension_f.clone(),
            ]));

        let log = case_log.clone();
        let key = scope_id(&scope_description(), "should override interceptors");
        scope
            .test("should override interceptors", move || {
                let seen = log.read(&key);
                ensure(seen.is_empty(), format!("expected no interceptor output, got {seen:?}"))
            })
            .config(PartialTestCaseConfig::new().extensions(Vec::new()));

        scope
            .test("extensions may swallow failures", || {
                Err(Failure::assertion("swallowed by the enclosing extension"))
            })
            .config(PartialTestCaseConfig::new().invocations(1).extensions(vec![swallow]));

        let project_state = state.clone();
        scope.test("only run beforeAll once", move || {
            expect_count("project before-all", &project_state.before_all, 1)
        });

        // The project has not finished, so after-all cannot have fired yet.
        let project_state = state.clone();
        scope.test("only run afterAll once", move || {
            expect_count("project after-all", &project_state.after_all, 0)
        });
    });

    builder.build()
}

fn lifecycle_spec(state: &Arc<ProjectState>) -> Spec {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));

    let mut builder = Spec::builder("LifecycleTest");
    {
        let before = before.clone();
        builder.before_all(move || {
            before.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let after = after.clone();
        builder.after_all(move || {
            after.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    for name in ["first test", "second test", "third test"] {
        let (before, after, state) = (before.clone(), after.clone(), state.clone());
        builder
            .test(name, move || {
                expect_count("spec before-all", &before, 1)?;
                expect_count("spec after-all", &after, 0)?;
                expect_count("project before-all", &state.before_all, 1)?;
                expect_count("project after-all", &state.after_all, 0)
            })
            .config(PartialTestCaseConfig::new().invocations(2).threads(2));
    }

    builder.build()
}

fn expect_count(what: &str, counter: &AtomicUsize, expected: usize) -> Outcome {
    let actual = counter.load(Ordering::SeqCst);
    ensure(
        actual == expected,
        format!("{what}: expected {expected}, got {actual}"),
    )
}

fn tags_a() -> std::collections::BTreeSet<Tag> {
    [Tag::new("A")].into_iter().collect()
}

fn sample_test() -> RegisteredTest {
    RegisteredTest::new(Description::root("some test case"), Arc::new(|| -> Outcome { Ok(()) }))
}

fn scope_description() -> Description {
    Description::root("ConfigTest").append("TestCase config")
}

fn scope_id(scope: &Description, name: &str) -> String {
    scope.append(name).id()
}
