//! Headless host document
//!
//! In-memory implementations of the host contracts: native controls
//! ([`MemorySelect`]), per-widget render targets that record what they were
//! asked to show, and surfaces for native multi-selects opened directly.
//! Used by the test suite and by hosts without a real display surface.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use mdu_cn::{OptionView, RenderTarget, SharedRenderTarget, SummaryItem};
use mdu_core::geometry::Rect;
use mdu_core::id::ControlId;
use mdu_layout::native::{BoundControl, MemorySelect};
use mdu_layout::overlay::{OverlaySurface, Presentation};

use crate::page::PageDocument;

/// Height of the open option panel below a widget's trigger
const PANEL_HEIGHT: f32 = 240.0;

// =============================================================================
// RecordingTarget
// =============================================================================

/// Render target that keeps the last thing each call rendered
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    /// Trigger bounds in page coordinates
    pub trigger: Rect,
    pub summary: Vec<SummaryItem>,
    pub options: Vec<OptionView>,
    pub expanded: bool,
    pub elevation: Option<Presentation>,
    pub native_hidden: bool,
    pub focus_count: usize,
}

impl RecordingTarget {
    pub fn new(trigger: Rect) -> Self {
        Self {
            trigger,
            ..Self::default()
        }
    }

    /// Display text of the closed-state summary
    pub fn summary_text(&self) -> Vec<String> {
        self.summary.iter().map(SummaryItem::text).collect()
    }

    /// Values currently listed in the open panel
    pub fn listed_values(&self) -> Vec<String> {
        self.options.iter().map(|o| o.value.clone()).collect()
    }

    pub fn z_index(&self) -> Option<u32> {
        self.elevation.map(|p| p.z_index)
    }
}

impl RenderTarget for RecordingTarget {
    fn render_closed_summary(&mut self, items: &[SummaryItem]) {
        self.summary = items.to_vec();
    }

    fn render_option_list(&mut self, options: &[OptionView]) {
        self.options = options.to_vec();
    }

    fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    fn set_elevated(&mut self, presentation: Option<&Presentation>) {
        self.elevation = presentation.copied();
    }

    fn hide_native_control(&mut self) {
        self.native_hidden = true;
    }

    fn focus_search(&mut self) {
        self.focus_count += 1;
    }

    fn bounds(&self) -> Rect {
        if !self.expanded {
            return self.trigger;
        }
        let panel = Rect::new(
            self.trigger.x(),
            self.trigger.bottom(),
            self.trigger.width(),
            PANEL_HEIGHT,
        );
        self.trigger.union(&panel)
    }
}

// =============================================================================
// NativeSurface
// =============================================================================

/// A native multi-select used directly, without a widget
#[derive(Clone, Debug, Default)]
pub struct NativeSurface {
    pub control: Rect,
    pub presentation: Option<Presentation>,
}

impl NativeSurface {
    pub fn new(control: Rect) -> Self {
        Self {
            control,
            presentation: None,
        }
    }
}

impl OverlaySurface for NativeSurface {
    fn bounds(&self) -> Rect {
        match self.presentation.and_then(|p| p.expanded_height) {
            Some(height) => Rect::new(
                self.control.x(),
                self.control.y(),
                self.control.width(),
                self.control.height().max(height),
            ),
            None => self.control,
        }
    }

    fn apply_presentation(&mut self, presentation: Option<&Presentation>) {
        self.presentation = presentation.copied();
    }
}

// =============================================================================
// HeadlessDocument
// =============================================================================

/// One control placed in a [`HeadlessDocument`]
#[derive(Clone)]
pub struct HeadlessControl {
    pub select: Rc<RefCell<MemorySelect>>,
    pub control: BoundControl,
    pub target: Rc<RefCell<RecordingTarget>>,
    pub native: Rc<RefCell<NativeSurface>>,
}

/// In-memory page holding native controls by id
#[derive(Default)]
pub struct HeadlessDocument {
    controls: RefCell<IndexMap<ControlId, HeadlessControl>>,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a control at `bounds`, replacing any control with the same id
    pub fn add_control(
        &self,
        id: impl Into<ControlId>,
        select: MemorySelect,
        bounds: Rect,
    ) -> HeadlessControl {
        let id = id.into();
        let select = select.into_shared();
        let entry = HeadlessControl {
            control: BoundControl::new(id.clone(), select.clone()),
            select,
            target: Rc::new(RefCell::new(RecordingTarget::new(bounds))),
            native: Rc::new(RefCell::new(NativeSurface::new(bounds))),
        };
        self.controls.borrow_mut().insert(id, entry.clone());
        entry
    }

    pub fn get(&self, id: &ControlId) -> Option<HeadlessControl> {
        self.controls.borrow().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<ControlId> {
        self.controls.borrow().keys().cloned().collect()
    }
}

impl PageDocument for HeadlessDocument {
    fn control(&self, id: &ControlId) -> Option<BoundControl> {
        self.controls.borrow().get(id).map(|c| c.control.clone())
    }

    fn render_target(&self, id: &ControlId) -> Option<SharedRenderTarget> {
        self.controls
            .borrow()
            .get(id)
            .map(|c| c.target.clone() as SharedRenderTarget)
    }
}
