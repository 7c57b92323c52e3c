//! # Lifecycle Module / 生命周期模块
//!
//! Runs before-all and after-all hooks exactly once per owner, no matter how
//! many times or from how many threads they are requested. Every spec owns its
//! own `Lifecycle`, so hooks of one spec never fire on behalf of another.
//!
//! 无论被请求多少次、来自多少线程，before-all 和 after-all 钩子对每个所有者只运行一次。

use std::sync::OnceLock;
use tracing::debug;

use crate::core::models::{Failure, Hook, Outcome, catch_panic};

/// Observable state of a lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Started,
    Finished,
}

pub struct Lifecycle {
    before_all: Vec<Hook>,
    after_all: Vec<Hook>,
    started: OnceLock<Outcome>,
    finished: OnceLock<Outcome>,
}

impl Lifecycle {
    pub fn new(before_all: Vec<Hook>, after_all: Vec<Hook>) -> Self {
        Self {
            before_all,
            after_all,
            started: OnceLock::new(),
            finished: OnceLock::new(),
        }
    }

    /// Runs the before-all hooks on the first call. Later calls return the
    /// first call's outcome without running anything.
    pub fn start(&self) -> Outcome {
        self.started
            .get_or_init(|| run_hooks("before-all", &self.before_all))
            .clone()
    }

    /// Runs the after-all hooks on the first call, same as [`Lifecycle::start`].
    pub fn finish(&self) -> Outcome {
        self.finished
            .get_or_init(|| run_hooks("after-all", &self.after_all))
            .clone()
    }

    pub fn phase(&self) -> Phase {
        if self.finished.get().is_some() {
            Phase::Finished
        } else if self.started.get().is_some() {
            Phase::Started
        } else {
            Phase::NotStarted
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

// Hooks run in declaration order; the first failure stops the rest. A
// panicking hook fails like one that returned an error.
fn run_hooks(hook: &'static str, hooks: &[Hook]) -> Outcome {
    debug!(hook, count = hooks.len(), "running lifecycle hooks");
    for run in hooks {
        catch_panic(|| run()).map_err(|source| Failure::Hook {
            hook,
            source: Box::new(source),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Hook {
        let counter = counter.clone();
        Arc::new(move || -> Outcome {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn hooks_fire_once_across_threads() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let lifecycle = Lifecycle::new(vec![counting(&before)], vec![counting(&after)]);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| lifecycle.start().unwrap());
            }
        });
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(lifecycle.phase(), Phase::Started);

        lifecycle.finish().unwrap();
        lifecycle.finish().unwrap();
        assert_eq!(after.load(Ordering::SeqCst), 1);
        assert_eq!(lifecycle.phase(), Phase::Finished);
    }

    #[test]
    fn failed_hook_is_remembered() {
        let failing: Hook = Arc::new(|| -> Outcome { Err(Failure::assertion("no database")) });
        let lifecycle = Lifecycle::new(vec![failing], Vec::new());

        let first = lifecycle.start().unwrap_err();
        let second = lifecycle.start().unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, Failure::Hook { hook: "before-all", .. }));
        assert!(first.is_assertion());
    }

    #[test]
    fn panicking_hook_becomes_hook_failure() {
        let after = Arc::new(AtomicUsize::new(0));
        let panicking: Hook = Arc::new(|| -> Outcome { panic!("db unavailable") });
        let lifecycle = Lifecycle::new(Vec::new(), vec![panicking, counting(&after)]);

        let failure = lifecycle.finish().unwrap_err();

        assert!(matches!(failure, Failure::Hook { hook: "after-all", .. }));
        assert!(failure.to_string().contains("db unavailable"));
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(lifecycle.phase(), Phase::Finished);
    }
}
