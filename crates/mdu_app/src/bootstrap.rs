//! Widget bootstrap
//!
//! Host data (projects, supervisors, teams, cities) arrives asynchronously, so
//! the configured controls may still be empty when the page starts. The
//! bootstrap tries to wrap every configured control immediately, then retries
//! on a fixed interval until each control is settled or the attempt budget
//! runs out. On timeout the remaining controls simply stay native.

use std::cell::RefCell;
use std::rc::Rc;

use mdu_cn::{DropdownConfig, WidgetRegistry};
use mdu_core::id::ControlId;
use mdu_core::retry::{BoundedRetry, RetryHandle, RetryOutcome, RetryPolicy};
use mdu_core::timers::SharedTimers;

use crate::page::PageDocument;

/// Try to settle one control. True once nothing is left to wait for.
fn settle(
    registry: &WidgetRegistry,
    document: &dyn PageDocument,
    id: &ControlId,
    config: &DropdownConfig,
) -> bool {
    if registry.contains(id) {
        return true;
    }
    let Some(control) = document.control(id) else {
        tracing::debug!("bootstrap - {} is not on this page", id);
        return true;
    };
    if !control.is_multiple() {
        tracing::warn!("bootstrap - {} is not a multi-value select, leaving it native", id);
        return true;
    }
    if control.real_option_count() == 0 {
        tracing::trace!("bootstrap - {} has no options yet", id);
        return false;
    }
    let Some(target) = document.render_target(id) else {
        tracing::warn!("bootstrap - no render target for {}", id);
        return true;
    };
    registry.init(control, target, config.clone()).is_some()
}

/// Wrap `controls` as soon as they are populated.
///
/// Controls absent from the document are skipped rather than waited for.
pub fn start(
    registry: Rc<WidgetRegistry>,
    document: Rc<dyn PageDocument>,
    controls: Vec<(ControlId, DropdownConfig)>,
    policy: RetryPolicy,
    timers: &SharedTimers,
) -> RetryHandle {
    let pending = Rc::new(RefCell::new(controls));
    let remaining = Rc::clone(&pending);

    BoundedRetry::start(
        timers,
        policy,
        move |attempt| {
            let mut pending = pending.borrow_mut();
            pending.retain(|(id, config)| !settle(&registry, &*document, id, config));
            tracing::trace!(
                "bootstrap - attempt {}: {} control(s) still pending",
                attempt,
                pending.len()
            );
            pending.is_empty()
        },
        move |outcome| match outcome {
            RetryOutcome::Ready { attempts } => {
                tracing::info!("bootstrap - widgets ready after {} attempt(s)", attempts);
            }
            RetryOutcome::TimedOut { attempts } => {
                let ids: Vec<ControlId> =
                    remaining.borrow().iter().map(|(id, _)| id.clone()).collect();
                tracing::warn!(
                    "bootstrap - gave up after {} attempt(s); {:?} left as native controls",
                    attempts,
                    ids
                );
            }
            RetryOutcome::Cancelled { attempts } => {
                tracing::debug!("bootstrap - cancelled after {} attempt(s)", attempts);
            }
        },
    )
}
