// Shared test helpers for integration tests
#![allow(dead_code)]

use specrun::core::{
    Description, Outcome, PartialTestCaseConfig, Proceed, ProjectConfig, TestCase,
    TestCaseConfig, TestCaseExtension, test_case_extension,
};
use specrun::engine::Engine;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn engine() -> Engine {
    Engine::new(ProjectConfig::new()).expect("Failed to create engine")
}

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn push(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// A body that bumps `counter` on every invocation.
pub fn counting_body(counter: &Arc<AtomicUsize>) -> impl Fn() -> Outcome + Send + Sync + 'static {
    let counter = counter.clone();
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A test-case extension that logs `<name>-before` and `<name>-after`.
pub fn recording(name: &'static str, log: &Log) -> Arc<TestCaseExtension> {
    let log = log.clone();
    test_case_extension(move |_: &TestCase, proceed: Proceed<'_>| {
        push(&log, format!("{name}-before"));
        let outcome = proceed();
        push(&log, format!("{name}-after"));
        outcome
    })
}

/// A test case with the built-in defaults merged with `config`.
pub fn test_case(
    name: &str,
    config: PartialTestCaseConfig,
    body: impl Fn() -> Outcome + Send + Sync + 'static,
) -> TestCase {
    TestCase::new(
        Description::new(["integration"], name),
        TestCaseConfig::default().merge(&config),
        body,
    )
}

/// Helper function to write a project file into `temp_dir`
pub fn write_project_file(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
