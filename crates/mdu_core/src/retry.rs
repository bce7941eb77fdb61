//! Bounded retry for waiting on an external condition
//!
//! The only "wait" primitive in the system: an attempt runs immediately, and
//! while it keeps failing it is retried on a fixed interval until the attempt
//! budget runs out. Exactly one [`RetryOutcome`] is reported per retry.
//!
//! ```rust
//! use std::rc::Rc;
//! use mdu_core::retry::{BoundedRetry, RetryOutcome, RetryPolicy};
//! use mdu_core::timers::Timers;
//!
//! let timers = Rc::new(Timers::new());
//! let policy = RetryPolicy { interval_ms: 500, max_attempts: 3 };
//! let handle = BoundedRetry::start(&timers, policy, |_attempt| false, |_outcome| {});
//!
//! timers.advance_by(10_000);
//! assert_eq!(handle.outcome(), Some(RetryOutcome::TimedOut { attempts: 3 }));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::timers::{TaskId, Timers};

/// Interval and attempt budget for a bounded retry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between a failed attempt and the next one
    pub interval_ms: u64,
    /// Total attempts, including the immediate first one (at least 1)
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            max_attempts: 20,
        }
    }
}

/// How a bounded retry finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryOutcome {
    /// An attempt succeeded
    Ready { attempts: u32 },
    /// Every attempt failed
    TimedOut { attempts: u32 },
    /// Cancelled through its handle before succeeding
    Cancelled { attempts: u32 },
}

impl RetryOutcome {
    pub fn attempts(&self) -> u32 {
        match *self {
            RetryOutcome::Ready { attempts }
            | RetryOutcome::TimedOut { attempts }
            | RetryOutcome::Cancelled { attempts } => attempts,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, RetryOutcome::Ready { .. })
    }
}

type AttemptFn = Box<dyn FnMut(u32) -> bool>;
type DoneFn = Box<dyn FnOnce(RetryOutcome)>;

struct RetryState {
    policy: RetryPolicy,
    timers: Weak<Timers>,
    attempts: Cell<u32>,
    pending: Cell<Option<TaskId>>,
    outcome: Cell<Option<RetryOutcome>>,
    attempt: RefCell<AttemptFn>,
    on_done: RefCell<Option<DoneFn>>,
}

impl RetryState {
    fn finish(&self, outcome: RetryOutcome) {
        if self.outcome.get().is_some() {
            return;
        }
        self.outcome.set(Some(outcome));
        if let Some(on_done) = self.on_done.borrow_mut().take() {
            on_done(outcome);
        }
    }
}

/// Entry point for starting bounded retries
pub struct BoundedRetry;

impl BoundedRetry {
    /// Run `attempt` now and keep retrying per `policy` until it returns true.
    ///
    /// `attempt` receives the 1-based attempt number. `on_done` is called
    /// exactly once with the outcome.
    pub fn start<A, D>(
        timers: &Rc<Timers>,
        policy: RetryPolicy,
        attempt: A,
        on_done: D,
    ) -> RetryHandle
    where
        A: FnMut(u32) -> bool + 'static,
        D: FnOnce(RetryOutcome) + 'static,
    {
        let state = Rc::new(RetryState {
            policy: RetryPolicy {
                max_attempts: policy.max_attempts.max(1),
                ..policy
            },
            timers: Rc::downgrade(timers),
            attempts: Cell::new(0),
            pending: Cell::new(None),
            outcome: Cell::new(None),
            attempt: RefCell::new(Box::new(attempt)),
            on_done: RefCell::new(Some(Box::new(on_done))),
        });

        run_attempt(&state);
        RetryHandle { state }
    }
}

fn run_attempt(state: &Rc<RetryState>) {
    state.pending.set(None);
    if state.outcome.get().is_some() {
        return;
    }

    let n = state.attempts.get() + 1;
    state.attempts.set(n);
    let ready = {
        let mut attempt = state.attempt.borrow_mut();
        (*attempt)(n)
    };

    // The attempt may have cancelled the retry through its handle.
    if state.outcome.get().is_some() {
        return;
    }

    if ready {
        tracing::debug!("BoundedRetry - ready after {} attempt(s)", n);
        state.finish(RetryOutcome::Ready { attempts: n });
        return;
    }

    if n >= state.policy.max_attempts {
        tracing::debug!(
            "BoundedRetry - gave up after {} attempt(s) at {}ms intervals",
            n,
            state.policy.interval_ms
        );
        state.finish(RetryOutcome::TimedOut { attempts: n });
        return;
    }

    let Some(timers) = state.timers.upgrade() else {
        state.finish(RetryOutcome::Cancelled { attempts: n });
        return;
    };
    let next = Rc::clone(state);
    let id = timers.schedule(state.policy.interval_ms, move || run_attempt(&next));
    state.pending.set(Some(id));
}

/// Handle to a running (or finished) bounded retry
#[derive(Clone)]
pub struct RetryHandle {
    state: Rc<RetryState>,
}

impl RetryHandle {
    /// Outcome, once the retry has finished
    pub fn outcome(&self) -> Option<RetryOutcome> {
        self.state.outcome.get()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Attempts made so far
    pub fn attempts(&self) -> u32 {
        self.state.attempts.get()
    }

    /// Stop retrying. No-op once finished.
    pub fn cancel(&self) {
        if self.is_finished() {
            return;
        }
        if let (Some(id), Some(timers)) = (self.state.pending.take(), self.state.timers.upgrade()) {
            timers.cancel(id);
        }
        tracing::debug!(
            "BoundedRetry - cancelled after {} attempt(s)",
            self.state.attempts.get()
        );
        self.state.finish(RetryOutcome::Cancelled {
            attempts: self.state.attempts.get(),
        });
    }
}

impl std::fmt::Debug for RetryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryHandle")
            .field("attempts", &self.attempts())
            .field("outcome", &self.outcome())
            .finish()
    }
}
