//! # Sistema MDU Components (mdu_cn)
//!
//! Components built on `mdu_layout` primitives.
//!
//! - **CheckboxDropdown**: converts a native multi-value select into a
//!   searchable, taggable checkbox dropdown that keeps the native control's
//!   selection in sync
//! - **WidgetRegistry**: one widget per control, idempotent initialization
//!
//! ## Example
//!
//! ```ignore
//! use mdu_cn::prelude::*;
//!
//! let registry = WidgetRegistry::new(coordinator, timers);
//! let dropdown = registry.init(control, target, DropdownConfig::new("Todos os projetos"));
//!
//! if let Some(dropdown) = dropdown {
//!     dropdown.open();
//!     dropdown.set_option_selected("proj-01", true);
//! }
//! ```

pub mod components;
pub mod error;
pub mod registry;

pub use components::*;
pub use error::{Result, WidgetError};
pub use registry::WidgetRegistry;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::components::checkbox_dropdown::{
        CheckboxDropdown, DropdownConfig, DropdownExt, DropdownHandle, DropdownOption,
        Propagation, WidgetEvent,
    };
    pub use crate::components::render_target::{OptionView, RenderTarget, SharedRenderTarget};
    pub use crate::components::summary::SummaryItem;
    pub use crate::registry::WidgetRegistry;
    pub use mdu_layout::{BoundControl, OverlayCoordinator, OverlayCoordinatorExt};
}
