//! # Extension Chain Module / 扩展链模块
//!
//! Extensions wrap a unit of work. The same single-method shape is used at two
//! scopes: around a whole spec and around each test case. A chain of
//! extensions is composed into one nested call where the first declared
//! extension is the outermost.
//!
//! 扩展包装一个工作单元。同一种单方法形态用于两个作用域：整个 spec 和每个测试用例。
//! 扩展链被组合成一个嵌套调用，最先声明的扩展位于最外层。

use std::sync::Arc;

use crate::core::models::{Outcome, TestCase};
use crate::core::spec::Spec;

/// The "continue" action handed to an extension. Calling it runs every inner
/// extension and finally the wrapped work. It may be called zero, one or
/// several times.
pub type Proceed<'a> = &'a mut dyn FnMut() -> Outcome;

/// Intercepts a unit of work identified by a context of type `C`.
///
/// An implementation can run code before and after `proceed`, skip `proceed`
/// entirely to short-circuit, or inspect and swallow the `Err` it returns.
///
/// Closures of the shape `Fn(&C, Proceed<'_>) -> Outcome` implement this trait.
pub trait Extension<C: ?Sized>: Send + Sync {
    fn intercept(&self, ctx: &C, proceed: Proceed<'_>) -> Outcome;
}

impl<C, F> Extension<C> for F
where
    C: ?Sized,
    F: Fn(&C, Proceed<'_>) -> Outcome + Send + Sync,
{
    fn intercept(&self, ctx: &C, proceed: Proceed<'_>) -> Outcome {
        self(ctx, proceed)
    }
}

/// Wraps the execution of a whole spec.
pub type SpecExtension = dyn Extension<Spec>;
/// Wraps the invocation batch of a single test case.
pub type TestCaseExtension = dyn Extension<TestCase>;

/// Wraps a closure as a spec extension.
pub fn spec_extension<F>(f: F) -> Arc<SpecExtension>
where
    F: Fn(&Spec, Proceed<'_>) -> Outcome + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure as a test-case extension.
pub fn test_case_extension<F>(f: F) -> Arc<TestCaseExtension>
where
    F: Fn(&TestCase, Proceed<'_>) -> Outcome + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A boxed, composed chain ready to be invoked.
pub type Chain<'a> = Box<dyn FnMut() -> Outcome + 'a>;

/// Composes `extensions` around `inner`.
///
/// Built right to left: the list is walked in reverse so that the first
/// declared extension ends up outermost. Invoking the returned chain runs
/// `extensions[0]`'s before-code first and its after-code last.
///
/// 从右向左构建：反向遍历列表，使最先声明的扩展位于最外层。
pub fn compose<'a, C: ?Sized>(
    extensions: &'a [Arc<dyn Extension<C>>],
    ctx: &'a C,
    inner: Chain<'a>,
) -> Chain<'a> {
    extensions.iter().rev().fold(inner, |mut next, extension| {
        let wrapped: Chain<'a> = Box::new(move || extension.intercept(ctx, &mut next));
        wrapped
    })
}

/// Builds the chain and runs it once.
pub fn run_chain<C: ?Sized>(
    extensions: &[Arc<dyn Extension<C>>],
    ctx: &C,
    inner: &mut dyn FnMut() -> Outcome,
) -> Outcome {
    let mut chain = compose(extensions, ctx, Box::new(|| inner()));
    chain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Failure;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(name: &'static str, log: &Log) -> Arc<dyn Extension<str>> {
        let log = log.clone();
        Arc::new(move |_: &str, proceed: Proceed<'_>| {
            log.lock().unwrap().push(format!("{name}-before"));
            let outcome = proceed();
            log.lock().unwrap().push(format!("{name}-after"));
            outcome
        })
    }

    #[test]
    fn first_declared_extension_is_outermost() {
        let log: Log = Arc::default();
        let chain = vec![recording("A", &log), recording("B", &log), recording("C", &log)];

        let body_log = log.clone();
        run_chain(&chain, "ctx", &mut || {
            body_log.lock().unwrap().push("body".to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            [
                "A-before", "B-before", "C-before", "body", "C-after", "B-after", "A-after"
            ]
        );
    }

    #[test]
    fn empty_chain_runs_inner_directly() {
        let mut calls = 0;
        let chain: Vec<Arc<dyn Extension<str>>> = Vec::new();
        run_chain(&chain, "ctx", &mut || {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn short_circuit_skips_inner_but_outer_after_still_runs() {
        let log: Log = Arc::default();
        let blocker: Arc<dyn Extension<str>> = Arc::new(|_: &str, _: Proceed<'_>| -> Outcome { Ok(()) });
        let chain = vec![recording("A", &log), blocker, recording("C", &log)];

        let mut body_ran = false;
        run_chain(&chain, "ctx", &mut || {
            body_ran = true;
            Ok(())
        })
        .unwrap();

        assert!(!body_ran);
        assert_eq!(*log.lock().unwrap(), ["A-before", "A-after"]);
    }

    #[test]
    fn extension_can_swallow_failure() {
        let swallow: Arc<dyn Extension<str>> = Arc::new(|_: &str, proceed: Proceed<'_>| {
            match proceed() {
                Err(Failure::Assertion { .. }) => Ok(()),
                other => other,
            }
        });
        let outcome = run_chain(&[swallow], "ctx", &mut || Err(Failure::assertion("boom")));
        assert!(outcome.is_ok());
    }

    #[test]
    fn extension_can_proceed_more_than_once() {
        let retry: Arc<dyn Extension<str>> = Arc::new(|_: &str, proceed: Proceed<'_>| {
            proceed().or_else(|_| proceed())
        });
        let mut attempts = 0;
        let outcome = run_chain(&[retry], "ctx", &mut || {
            attempts += 1;
            if attempts == 1 {
                Err(Failure::assertion("first attempt"))
            } else {
                Ok(())
            }
        });
        assert!(outcome.is_ok());
        assert_eq!(attempts, 2);
    }
}
