//! Display capabilities a host provides for each dropdown
//!
//! The widget never touches a real display surface. It describes what to
//! show through this trait, and the host renders it (DOM nodes in a browser,
//! a recording in tests).

use std::cell::RefCell;
use std::rc::Rc;

use mdu_core::geometry::Rect;
use mdu_layout::overlay::{OverlaySurface, Presentation};

use super::summary::SummaryItem;

/// One row of the open option list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

/// Rendering surface for a single checkbox dropdown
pub trait RenderTarget {
    /// Replace the closed-state summary (placeholder or tags)
    fn render_closed_summary(&mut self, items: &[SummaryItem]);

    /// Replace the open option list
    fn render_option_list(&mut self, options: &[OptionView]);

    /// Show or hide the option list panel
    fn set_expanded(&mut self, expanded: bool);

    /// Apply (or strip, with `None`) elevated stacking presentation
    fn set_elevated(&mut self, presentation: Option<&Presentation>);

    /// Hide the wrapped native control from direct interaction.
    ///
    /// The control must stay in the document.
    fn hide_native_control(&mut self);

    /// Move input focus to the search field
    fn focus_search(&mut self);

    /// Rendered bounds of the whole widget (trigger plus open panel)
    fn bounds(&self) -> Rect;
}

/// Render target shared between a widget and its host
pub type SharedRenderTarget = Rc<RefCell<dyn RenderTarget>>;

/// Presents a widget's render target to the overlay coordinator
pub(crate) struct TargetSurface {
    target: SharedRenderTarget,
}

impl TargetSurface {
    pub(crate) fn shared(target: SharedRenderTarget) -> Rc<RefCell<TargetSurface>> {
        Rc::new(RefCell::new(TargetSurface { target }))
    }
}

impl OverlaySurface for TargetSurface {
    fn bounds(&self) -> Rect {
        self.target.borrow().bounds()
    }

    fn apply_presentation(&mut self, presentation: Option<&Presentation>) {
        self.target.borrow_mut().set_elevated(presentation);
    }
}
