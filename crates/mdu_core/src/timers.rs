//! One-shot deferred callbacks on a host-driven clock
//!
//! The page event loop owns the clock: it calls [`Timers::advance_to`] with
//! the current time in milliseconds (the same way the overlay manager is
//! driven by `update(current_time_ms)`), and every task whose due time has
//! been reached runs in (due time, schedule order).
//!
//! Tasks never run while the queue is borrowed, so a task may schedule or
//! cancel other tasks, including rescheduling itself.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifier for a scheduled one-shot task
    pub struct TaskId;
}

/// Timers shared between the page controller and the widgets it owns
pub type SharedTimers = Rc<Timers>;

struct ScheduledTask {
    due_ms: u64,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct TimersInner {
    now_ms: u64,
    next_seq: u64,
    tasks: SlotMap<TaskId, ScheduledTask>,
}

impl TimersInner {
    fn take_next_due(&mut self, until_ms: u64) -> Option<(u64, Box<dyn FnOnce()>)> {
        let next = self
            .tasks
            .iter()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(id, _)| id)?;
        let scheduled = self.tasks.remove(next)?;
        Some((scheduled.due_ms, scheduled.task))
    }
}

/// Deferred one-shot task queue
#[derive(Default)]
pub struct Timers {
    inner: RefCell<TimersInner>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds
    pub fn now(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Run `task` once, `delay_ms` after the current clock value.
    pub fn schedule<F>(&self, delay_ms: u64, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let due_ms = inner.now_ms.saturating_add(delay_ms);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let id = inner.tasks.insert(ScheduledTask {
            due_ms,
            seq,
            task: Box::new(task),
        });
        tracing::trace!("Timers::schedule - task {:?} due at {}ms", id, due_ms);
        id
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner.borrow_mut().tasks.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner.borrow().tasks.contains_key(id)
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Advance the clock to `now_ms`, running every task that becomes due.
    ///
    /// The clock never moves backwards. While a task runs, `now()` reports
    /// that task's due time, so work it schedules is timed relative to it.
    /// Returns the number of tasks run.
    pub fn advance_to(&self, now_ms: u64) -> usize {
        let target = now_ms.max(self.now());
        let mut ran = 0;

        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let next = inner.take_next_due(target);
                if let Some((due_ms, _)) = &next {
                    inner.now_ms = inner.now_ms.max(*due_ms);
                }
                next
            };

            match next {
                Some((_, task)) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }

        self.inner.borrow_mut().now_ms = target;
        ran
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance_by(&self, delta_ms: u64) -> usize {
        self.advance_to(self.now().saturating_add(delta_ms))
    }
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timers")
            .field("now_ms", &inner.now_ms)
            .field("pending", &inner.tasks.len())
            .finish()
    }
}
