//! Sistema MDU Core
//!
//! Foundational primitives shared by the overlay coordinator and the
//! dropdown components:
//!
//! - **Geometry**: points, sizes and rectangles used for hit testing
//! - **Identifiers**: bound control and overlay identities
//! - **State Machines**: the `StateTransitions` contract for small FSMs
//! - **Hooks**: ordered observer lists the host registers with
//! - **Timers**: one-shot deferred callbacks on a host-driven clock
//! - **Bounded Retry**: finite, cancellable polling for external readiness
//!
//! Everything here is single-threaded. Handlers run to completion on the
//! page's event loop, so shared state uses `Rc`/`RefCell` rather than locks.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use mdu_core::timers::Timers;
//!
//! let timers = Rc::new(Timers::new());
//! let fired = Rc::new(std::cell::Cell::new(false));
//! let flag = Rc::clone(&fired);
//! timers.schedule(100, move || flag.set(true));
//!
//! timers.advance_to(99);
//! assert!(!fired.get());
//! timers.advance_to(100);
//! assert!(fired.get());
//! ```

pub mod error;
pub mod geometry;
pub mod hooks;
pub mod id;
pub mod retry;
pub mod state;
pub mod timers;

pub use error::{MduError, Result};
pub use geometry::{Point, Rect, Size};
pub use hooks::{HookId, HookList};
pub use id::{ControlId, OverlayId};
pub use retry::{BoundedRetry, RetryHandle, RetryOutcome, RetryPolicy};
pub use state::StateTransitions;
pub use timers::{SharedTimers, TaskId, Timers};
