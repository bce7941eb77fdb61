//! Sistema MDU Layout
//!
//! Overlay coordination and the bound native control contract.
//!
//! - [`overlay`]: the process-wide `OverlayCoordinator` that hands out stack
//!   levels, keeps at most one overlay open, and dismisses overlays on clicks
//!   outside their bounds
//! - [`native`]: the native multi-value selection control a widget mirrors

pub mod native;
pub mod overlay;

pub use native::{BoundControl, ChangeEvent, MemorySelect, NativeOption, NativeSelect};
pub use overlay::{
    overlay_coordinator, overlay_events, CoordinatorConfig, OnCloseCallback, OverlayCoordinator,
    OverlayCoordinatorExt, OverlayCoordinatorInner, OverlayKind, OverlayState, OverlaySurface,
    PendingCallbacks, Presentation, SharedSurface, StackLevel,
};
