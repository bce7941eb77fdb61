//! Components built on mdu_layout primitives
//!
//! - `checkbox_dropdown`: the widget and its operations
//! - `render_target`: the display capabilities a host provides per widget
//! - `summary`: the closed-state tag/placeholder policy

pub mod checkbox_dropdown;
pub mod render_target;
pub mod summary;

pub use checkbox_dropdown::{
    CheckboxDropdown, DropdownConfig, DropdownExt, DropdownHandle, DropdownOption, Propagation,
    WidgetEvent,
};
pub use render_target::{OptionView, RenderTarget, SharedRenderTarget};
pub use summary::{summarize, SummaryItem};
