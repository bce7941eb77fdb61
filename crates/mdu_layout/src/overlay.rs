//! Overlay Coordinator - stacking and mutual exclusion for open dropdowns
//!
//! Tracks every overlay currently open on the page (checkbox dropdowns and
//! native multi-selects opened directly), elevates the active one above all
//! other content, and keeps at most one open at a time.
//!
//! # Architecture
//!
//! - **OverlayCoordinator**: one per page session, owned by the page
//!   controller and handed to widgets (no global lookup)
//! - **Stack Levels**: handed out from a monotonic counter that is never
//!   reset, so the most recently opened overlay is always on top
//! - **FSM-driven State**: each overlay is `Closed` or `Open`; presentation
//!   changes are applied synchronously inside the transition
//! - **Single Close Path**: click-outside, escape, forced close and eviction by
//!   a newly opened overlay all go through the coordinator, which then invokes
//!   the overlay's own close callback
//!
//! # Example
//!
//! ```ignore
//! let coordinator = overlay_coordinator(CoordinatorConfig::default());
//!
//! coordinator.request_open(id, OverlayKind::SelectionWidget, surface, Some(on_close));
//!
//! // From the page's global click listener:
//! coordinator.handle_click(point);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use mdu_core::geometry::{Point, Rect, Size};
use mdu_core::id::OverlayId;
use mdu_core::state::StateTransitions;
use smallvec::SmallVec;

// =============================================================================
// Overlay Event Types
// =============================================================================

/// Custom event types for the overlay state machine
pub mod overlay_events {
    /// Open the overlay (Closed -> Open)
    pub const OPEN: u32 = 20001;
    /// The overlay closed itself (Open -> Closed)
    pub const CLOSE: u32 = 20002;
    /// A click landed outside every open overlay
    pub const OUTSIDE_CLICK: u32 = 20004;
    /// Escape key pressed
    pub const ESCAPE: u32 = 20005;
    /// Administrative close of everything
    pub const FORCE_CLOSE: u32 = 20006;
    /// Another overlay opened
    pub const EVICTED: u32 = 20007;
}

// =============================================================================
// OverlayKind
// =============================================================================

/// What kind of control an overlay belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// A native multi-select used directly; its own option list must be
    /// positioned absolutely and expanded so page layout cannot clip it
    NativeMultiSelect,
    /// A checkbox dropdown widget
    SelectionWidget,
}

// =============================================================================
// OverlayState - FSM for overlay lifecycle
// =============================================================================

/// State machine for overlay lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    /// Overlay is not visible
    #[default]
    Closed,
    /// Overlay is visible and elevated
    Open,
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        matches!(self, OverlayState::Open)
    }
}

impl StateTransitions for OverlayState {
    fn on_event(&self, event: u32) -> Option<Self> {
        use overlay_events::*;
        use OverlayState::*;

        match (self, event) {
            (Closed, OPEN) => Some(Open),
            (Open, CLOSE) | (Open, OUTSIDE_CLICK) | (Open, ESCAPE) | (Open, FORCE_CLOSE)
            | (Open, EVICTED) => Some(Closed),
            _ => None,
        }
    }
}

// =============================================================================
// Presentation
// =============================================================================

/// Stacking order value; higher renders on top
pub type StackLevel = u32;

/// Elevated presentation applied to an open overlay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Presentation {
    /// Stack level (z-index) for the overlay
    pub z_index: StackLevel,
    /// Whether the overlay is taken out of page flow
    pub absolute: bool,
    /// Height the overlay's list is expanded to, if forced
    pub expanded_height: Option<f32>,
}

/// Rendered surface of an overlay as seen by the coordinator
pub trait OverlaySurface {
    /// Current rendered bounds (trigger and open content together)
    fn bounds(&self) -> Rect;

    /// Apply elevated presentation, or strip it with `None`
    fn apply_presentation(&mut self, presentation: Option<&Presentation>);
}

/// Surface shared between its owner and the coordinator
pub type SharedSurface = Rc<RefCell<dyn OverlaySurface>>;

/// Callback invoked when the coordinator closes an overlay on its own
/// (click outside, escape, eviction, forced close)
pub type OnCloseCallback = Rc<dyn Fn()>;

// =============================================================================
// CoordinatorConfig
// =============================================================================

/// Configuration for the overlay coordinator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinatorConfig {
    /// First stack level handed out
    pub base_stack_level: StackLevel,
    /// Height native multi-selects are expanded to while open
    pub native_expanded_height: f32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            base_stack_level: 1000,
            native_expanded_height: 200.0,
        }
    }
}

// =============================================================================
// OpenOverlay
// =============================================================================

/// An overlay currently tracked as open
struct OpenOverlay {
    kind: OverlayKind,
    level: StackLevel,
    state: OverlayState,
    surface: SharedSurface,
    on_close: Option<OnCloseCallback>,
}

impl OpenOverlay {
    /// Transition to closed and strip presentation; returns the close callback
    fn close(mut self, id: &OverlayId, event: u32) -> Option<OnCloseCallback> {
        if let Some(next) = self.state.on_event(event) {
            self.state = next;
        }
        tracing::debug!(
            "OverlayCoordinator - {:?} overlay {} is now {:?} (level {}, event {})",
            self.kind,
            id,
            self.state,
            self.level,
            event
        );
        self.surface.borrow_mut().apply_presentation(None);
        self.on_close
    }
}

/// Close callbacks collected while the coordinator is borrowed
pub type PendingCallbacks = SmallVec<[OnCloseCallback; 4]>;

// =============================================================================
// OverlayCoordinatorInner
// =============================================================================

/// Inner state of the overlay coordinator
pub struct OverlayCoordinatorInner {
    /// Open overlays in open order
    overlays: IndexMap<OverlayId, OpenOverlay>,
    /// Next stack level; monotonic for the page session
    next_level: StackLevel,
    /// Viewport dimensions (logical pixels)
    viewport: Size,
    config: CoordinatorConfig,
}

impl OverlayCoordinatorInner {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            overlays: IndexMap::new(),
            next_level: config.base_stack_level,
            viewport: Size::ZERO,
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Stack level the next opened overlay will receive
    pub fn next_stack_level(&self) -> StackLevel {
        self.next_level
    }

    pub fn is_open(&self, id: &OverlayId) -> bool {
        self.overlays.contains_key(id)
    }

    pub fn open_count(&self) -> usize {
        self.overlays.len()
    }

    /// Open overlay ids in open order
    pub fn open_ids(&self) -> Vec<OverlayId> {
        self.overlays.keys().cloned().collect()
    }

    pub fn stack_level(&self, id: &OverlayId) -> Option<StackLevel> {
        self.overlays.get(id).map(|o| o.level)
    }

    pub fn kind_of(&self, id: &OverlayId) -> Option<OverlayKind> {
        self.overlays.get(id).map(|o| o.kind)
    }

    /// Overlay with the highest stack level
    pub fn top(&self) -> Option<OverlayId> {
        self.overlays
            .iter()
            .max_by_key(|(_, o)| o.level)
            .map(|(id, _)| id.clone())
    }

    fn take_level(&mut self) -> StackLevel {
        let level = self.next_level;
        self.next_level = self.next_level.saturating_add(1);
        level
    }

    fn presentation_for(&self, kind: OverlayKind, level: StackLevel, bounds: Rect) -> Presentation {
        match kind {
            OverlayKind::SelectionWidget => Presentation {
                z_index: level,
                absolute: false,
                expanded_height: None,
            },
            OverlayKind::NativeMultiSelect => {
                let wanted = self.config.native_expanded_height;
                // Keep the expanded list inside the viewport below the control.
                let height = if self.viewport.height > 0.0 {
                    wanted.min((self.viewport.height - bounds.y()).max(0.0))
                } else {
                    wanted
                };
                Presentation {
                    z_index: level,
                    absolute: true,
                    expanded_height: Some(height),
                }
            }
        }
    }

    fn elevate(&self, overlay: &OpenOverlay) {
        let bounds = overlay.surface.borrow().bounds();
        let presentation = self.presentation_for(overlay.kind, overlay.level, bounds);
        overlay
            .surface
            .borrow_mut()
            .apply_presentation(Some(&presentation));
    }

    /// Open `id` on top and close every other overlay.
    ///
    /// Returns the close callbacks of the evicted overlays; the caller runs
    /// them once this borrow is released.
    pub fn open_exclusive(
        &mut self,
        id: OverlayId,
        kind: OverlayKind,
        surface: SharedSurface,
        on_close: Option<OnCloseCallback>,
    ) -> PendingCallbacks {
        // Reopening an already open overlay brings it to the front.
        self.overlays.shift_remove(&id);

        let level = self.take_level();
        let mut overlay = OpenOverlay {
            kind,
            level,
            state: OverlayState::Closed,
            surface,
            on_close,
        };
        if let Some(next) = overlay.state.on_event(overlay_events::OPEN) {
            overlay.state = next;
        }
        self.elevate(&overlay);

        tracing::debug!(
            "OverlayCoordinator::request_open - {:?} overlay {} at level {}",
            kind,
            id,
            level
        );

        let evicted: Vec<(OverlayId, OpenOverlay)> = self.overlays.drain(..).collect();
        self.overlays.insert(id, overlay);

        evicted
            .into_iter()
            .filter_map(|(other, o)| o.close(&other, overlay_events::EVICTED))
            .collect()
    }

    /// Stop tracking `id` without invoking its close callback.
    pub fn remove(&mut self, id: &OverlayId) -> bool {
        match self.overlays.shift_remove(id) {
            Some(overlay) => {
                // The overlay closed itself; its callback is not run.
                let _ = overlay.close(id, overlay_events::CLOSE);
                true
            }
            None => false,
        }
    }

    /// Whether `point` lies inside any open overlay's bounds
    pub fn contains_point(&self, point: Point) -> bool {
        self.overlays
            .values()
            .any(|o| o.surface.borrow().bounds().contains(point))
    }

    /// Close everything unless `point` is inside an open overlay.
    pub fn close_if_outside(&mut self, point: Point) -> PendingCallbacks {
        if self.overlays.is_empty() || self.contains_point(point) {
            return PendingCallbacks::new();
        }
        tracing::debug!(
            "OverlayCoordinator::handle_click - click at ({}, {}) outside {} overlay(s)",
            point.x,
            point.y,
            self.overlays.len()
        );
        self.close_all_with(overlay_events::OUTSIDE_CLICK)
    }

    /// Close the overlay with the highest stack level
    pub fn close_top(&mut self) -> Option<PendingCallbacks> {
        let top = self.top()?;
        let overlay = self.overlays.shift_remove(&top)?;
        Some(overlay.close(&top, overlay_events::ESCAPE).into_iter().collect())
    }

    pub fn close_all_with(&mut self, event: u32) -> PendingCallbacks {
        let closing: Vec<(OverlayId, OpenOverlay)> = self.overlays.drain(..).collect();
        closing
            .into_iter()
            .filter_map(|(id, o)| o.close(&id, event))
            .collect()
    }

    /// Re-apply presentation to every open overlay (viewport changed)
    pub fn reapply(&self) {
        for overlay in self.overlays.values() {
            self.elevate(overlay);
        }
    }
}

impl Default for OverlayCoordinatorInner {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl std::fmt::Debug for OverlayCoordinatorInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayCoordinatorInner")
            .field("open", &self.open_ids())
            .field("next_level", &self.next_level)
            .field("viewport", &self.viewport)
            .finish()
    }
}

// =============================================================================
// OverlayCoordinator
// =============================================================================

/// Shared overlay coordinator, one per page session
pub type OverlayCoordinator = Rc<RefCell<OverlayCoordinatorInner>>;

/// Create a new overlay coordinator
pub fn overlay_coordinator(config: CoordinatorConfig) -> OverlayCoordinator {
    Rc::new(RefCell::new(OverlayCoordinatorInner::new(config)))
}

fn run_callbacks(callbacks: PendingCallbacks) -> usize {
    let count = callbacks.len();
    for callback in callbacks {
        callback();
    }
    count
}

/// Extension trait for the shared coordinator
///
/// Every method releases the coordinator borrow before running close
/// callbacks, so callbacks may query or call back into the coordinator.
pub trait OverlayCoordinatorExt {
    /// Open an overlay on top of everything and close every other one
    fn request_open(
        &self,
        id: OverlayId,
        kind: OverlayKind,
        surface: SharedSurface,
        on_close: Option<OnCloseCallback>,
    );
    /// The overlay closed itself; stop tracking it and strip its elevation
    fn notify_closed(&self, id: &OverlayId) -> bool;
    /// Global click observer; returns true if anything was closed
    fn handle_click(&self, point: Point) -> bool;
    /// Viewport resize observer
    fn handle_resize(&self, viewport: Size);
    /// Close the topmost overlay; returns true if one was open
    fn handle_escape(&self) -> bool;
    /// Close every open overlay regardless of input state
    fn force_close_all(&self) -> usize;
    /// Check if a specific overlay is open
    fn is_open(&self, id: &OverlayId) -> bool;
    /// Open overlay ids in open order
    fn open_ids(&self) -> Vec<OverlayId>;
    /// Stack level of an open overlay
    fn stack_level(&self, id: &OverlayId) -> Option<StackLevel>;
    /// Overlay with the highest stack level
    fn top(&self) -> Option<OverlayId>;
}

impl OverlayCoordinatorExt for OverlayCoordinator {
    fn request_open(
        &self,
        id: OverlayId,
        kind: OverlayKind,
        surface: SharedSurface,
        on_close: Option<OnCloseCallback>,
    ) {
        let evicted = self.borrow_mut().open_exclusive(id, kind, surface, on_close);
        run_callbacks(evicted);
    }

    fn notify_closed(&self, id: &OverlayId) -> bool {
        let removed = self.borrow_mut().remove(id);
        if removed {
            tracing::debug!("OverlayCoordinator::notify_closed - {}", id);
        }
        removed
    }

    fn handle_click(&self, point: Point) -> bool {
        let closed = self.borrow_mut().close_if_outside(point);
        run_callbacks(closed) > 0
    }

    fn handle_resize(&self, viewport: Size) {
        let mut inner = self.borrow_mut();
        inner.set_viewport(viewport);
        inner.reapply();
    }

    fn handle_escape(&self) -> bool {
        let closed = self.borrow_mut().close_top();
        match closed {
            Some(callbacks) => {
                run_callbacks(callbacks);
                true
            }
            None => false,
        }
    }

    fn force_close_all(&self) -> usize {
        let (count, callbacks) = {
            let mut inner = self.borrow_mut();
            let count = inner.open_count();
            (count, inner.close_all_with(overlay_events::FORCE_CLOSE))
        };
        if count > 0 {
            tracing::debug!("OverlayCoordinator::force_close_all - closed {}", count);
        }
        run_callbacks(callbacks);
        count
    }

    fn is_open(&self, id: &OverlayId) -> bool {
        self.borrow().is_open(id)
    }

    fn open_ids(&self) -> Vec<OverlayId> {
        self.borrow().open_ids()
    }

    fn stack_level(&self, id: &OverlayId) -> Option<StackLevel> {
        self.borrow().stack_level(id)
    }

    fn top(&self) -> Option<OverlayId> {
        self.borrow().top()
    }
}

// =============================================================================
// Tests
// =============================================================================
