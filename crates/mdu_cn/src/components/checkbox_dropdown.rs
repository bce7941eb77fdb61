//! Checkbox Dropdown - searchable multi-select replacement for a native control
//!
//! Wraps one native multi-value select. The native control is hidden but
//! stays in the document, and every selection change is written back to it
//! and announced through its change listeners, so host code reading
//! the native control directly keeps working.
//!
//! Opening goes through the [`OverlayCoordinator`], which elevates the widget
//! and closes every other open overlay. When the coordinator closes the widget
//! on its own (click outside, escape, another overlay opening) it calls back
//! into the widget through a weak reference.
//!
//! # Example
//!
//! ```ignore
//! use mdu_cn::prelude::*;
//!
//! let dropdown = CheckboxDropdown::initialize(
//!     control,
//!     target,
//!     DropdownConfig::new("Todas as cidades").max_visible_tags(3),
//!     coordinator.clone(),
//!     timers.clone(),
//! )?;
//!
//! dropdown.open();
//! dropdown.filter("porto");
//! dropdown.set_option_selected("poa", true);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mdu_core::id::{ControlId, OverlayId};
use mdu_core::timers::{SharedTimers, TaskId};
use mdu_layout::native::{BoundControl, NativeOption};
use mdu_layout::overlay::{
    OnCloseCallback, OverlayCoordinator, OverlayCoordinatorExt, OverlayKind, SharedSurface,
};
use rustc_hash::{FxHashMap, FxHashSet};

use super::render_target::{OptionView, SharedRenderTarget, TargetSurface};
use super::summary::summarize;
use crate::error::{Result, WidgetError};

/// One option captured from the native control at construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownOption {
    /// Unique within its widget
    pub value: String,
    pub label: String,
    pub initially_selected: bool,
}

impl DropdownOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            initially_selected: false,
        }
    }

    pub fn initially_selected(mut self, selected: bool) -> Self {
        self.initially_selected = selected;
        self
    }

    /// Case-insensitive label match; `needle` must already be lowercase
    pub fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
    }
}

/// Per-widget configuration, fixed at construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownConfig {
    pub placeholder: String,
    pub max_visible_tags: usize,
    pub search_enabled: bool,
    /// Settle delay before the search field takes focus after opening
    pub focus_delay_ms: u64,
}

impl DropdownConfig {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Self::default()
        }
    }

    pub fn max_visible_tags(mut self, max: usize) -> Self {
        self.max_visible_tags = max;
        self
    }

    pub fn search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    pub fn focus_delay_ms(mut self, delay_ms: u64) -> Self {
        self.focus_delay_ms = delay_ms;
        self
    }
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            placeholder: "Selecione...".to_string(),
            max_visible_tags: 2,
            search_enabled: true,
            focus_delay_ms: 100,
        }
    }
}

/// Input delivered to a widget by the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Click on the closed-state trigger
    TriggerClicked,
    /// A checkbox in the option list changed
    OptionToggled { value: String, checked: bool },
    /// Inline remove affordance of a tag
    TagRemoveClicked(String),
    /// Search field contents changed
    SearchInput(String),
    /// The widget's own clear action
    ClearClicked,
    /// Escape pressed while the widget had focus
    Escape,
}

/// Whether a handled event continues to the widget's enclosing parts
///
/// `Stop` keeps a tag click off the trigger toggle and a focused Escape off
/// page-level key handling. Click-outside always sees the click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

// =============================================================================
// CheckboxDropdown
// =============================================================================

/// Widget state for one bound native control
pub struct CheckboxDropdown {
    control: BoundControl,
    overlay_id: OverlayId,
    target: SharedRenderTarget,
    surface: SharedSurface,
    config: DropdownConfig,
    /// Source order, fixed after construction
    options: Vec<DropdownOption>,
    /// Indices into `options` matching the search term
    visible: Vec<usize>,
    selected: FxHashSet<String>,
    is_open: bool,
    search_term: String,
    focus_task: Option<TaskId>,
    coordinator: OverlayCoordinator,
    timers: SharedTimers,
    self_ref: Weak<RefCell<CheckboxDropdown>>,
}

/// Shared handle to a widget; operations live on [`DropdownExt`]
pub type DropdownHandle = Rc<RefCell<CheckboxDropdown>>;

impl CheckboxDropdown {
    /// Wrap `control`, capturing its current options and selection.
    ///
    /// Placeholder entries (empty value) are skipped and duplicate values keep
    /// their first occurrence's position and label. Fails if the control is not a multi-value
    /// select or has no real options yet.
    pub fn initialize(
        control: BoundControl,
        target: SharedRenderTarget,
        config: DropdownConfig,
        coordinator: OverlayCoordinator,
        timers: SharedTimers,
    ) -> Result<DropdownHandle> {
        if !control.is_multiple() {
            return Err(WidgetError::NotMultiple {
                control: control.id().clone(),
            });
        }

        // Duplicates fold into their first entry, selected if any copy is.
        let mut first: FxHashMap<String, usize> = FxHashMap::default();
        let mut options: Vec<DropdownOption> = Vec::new();
        for native in control.options().into_iter().filter(NativeOption::is_real) {
            match first.get(&native.value).copied() {
                Some(index) => options[index].initially_selected |= native.selected,
                None => {
                    first.insert(native.value.clone(), options.len());
                    options.push(
                        DropdownOption::new(native.value, native.label)
                            .initially_selected(native.selected),
                    );
                }
            }
        }

        if options.is_empty() {
            return Err(WidgetError::Underpopulated {
                control: control.id().clone(),
            });
        }

        let selected: FxHashSet<String> = options
            .iter()
            .filter(|o| o.initially_selected)
            .map(|o| o.value.clone())
            .collect();

        tracing::debug!(
            "CheckboxDropdown::initialize - {} with {} options ({} selected)",
            control.id(),
            options.len(),
            selected.len()
        );

        let surface: SharedSurface = TargetSurface::shared(Rc::clone(&target));
        let visible = (0..options.len()).collect();
        let handle = Rc::new_cyclic(|weak| {
            RefCell::new(CheckboxDropdown {
                overlay_id: OverlayId::from(control.id()),
                control,
                target,
                surface,
                config,
                options,
                visible,
                selected,
                is_open: false,
                search_term: String::new(),
                focus_task: None,
                coordinator,
                timers,
                self_ref: weak.clone(),
            })
        });

        {
            let widget = handle.borrow();
            let mut target = widget.target.borrow_mut();
            target.hide_native_control();
            target.set_expanded(false);
            drop(target);
            widget.render_summary();
        }

        Ok(handle)
    }

    pub fn id(&self) -> &ControlId {
        self.control.id()
    }

    pub fn control(&self) -> &BoundControl {
        &self.control
    }

    pub fn config(&self) -> &DropdownConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    /// Options passing the current search term, in source order
    pub fn visible_options(&self) -> Vec<&DropdownOption> {
        self.visible.iter().map(|&i| &self.options[i]).collect()
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.contains(value)
    }

    /// Selected options in source order
    pub fn selected_options(&self) -> Vec<&DropdownOption> {
        self.options
            .iter()
            .filter(|o| self.selected.contains(&o.value))
            .collect()
    }

    pub fn selected_values(&self) -> Vec<String> {
        self.selected_options()
            .into_iter()
            .map(|o| o.value.clone())
            .collect()
    }

    fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    fn render_summary(&self) {
        let selected = self.selected_options();
        let items = summarize(&selected, &self.config.placeholder, self.config.max_visible_tags);
        self.target.borrow_mut().render_closed_summary(&items);
    }

    fn render_options(&self) {
        let views: Vec<OptionView> = self
            .visible_options()
            .into_iter()
            .map(|o| OptionView {
                value: o.value.clone(),
                label: o.label.clone(),
                checked: self.selected.contains(&o.value),
            })
            .collect();
        self.target.borrow_mut().render_option_list(&views);
    }

    /// Write the selection onto every native option; placeholders are cleared
    fn sync_native(&self) {
        for option in self.control.options() {
            let selected = option.is_real() && self.selected.contains(&option.value);
            if option.selected != selected {
                self.control.set_selected(&option.value, selected);
            }
        }
    }

    fn apply_filter(&mut self, term: &str) {
        self.search_term = term.to_string();
        let needle = term.trim().to_lowercase();
        self.visible = if needle.is_empty() {
            (0..self.options.len()).collect()
        } else {
            self.options
                .iter()
                .enumerate()
                .filter(|(_, o)| o.matches(&needle))
                .map(|(i, _)| i)
                .collect()
        };
    }

    /// Update one option; false for values this widget does not own
    fn apply_selection(&mut self, value: &str, selected: bool) -> bool {
        if !self.has_option(value) {
            tracing::trace!(
                "CheckboxDropdown::set_option_selected - {} ignoring unknown value {:?}",
                self.id(),
                value
            );
            return false;
        }
        if selected {
            self.selected.insert(value.to_string());
        } else {
            self.selected.remove(value);
        }
        tracing::trace!(
            "CheckboxDropdown::set_option_selected - {} {:?} = {}",
            self.id(),
            value,
            selected
        );
        self.sync_native();
        self.render_summary();
        self.render_options();
        true
    }

    fn apply_clear(&mut self) {
        self.selected.clear();
        self.sync_native();
        self.render_summary();
        self.render_options();
    }

    /// Local close bookkeeping shared by `close` and coordinator dismissal
    fn dismiss(&mut self) {
        self.is_open = false;
        self.apply_filter("");
        if let Some(task) = self.focus_task.take() {
            self.timers.cancel(task);
        }
        self.target.borrow_mut().set_expanded(false);
        tracing::debug!("CheckboxDropdown - {} closed", self.id());
    }

    /// Runs when the coordinator closed this widget; a busy widget is
    /// dismissed on the next clock advance instead.
    fn close_callback(&self) -> OnCloseCallback {
        let weak = self.self_ref.clone();
        let timers = Rc::clone(&self.timers);
        Rc::new(move || {
            if dismiss_closed(&weak) {
                return;
            }
            tracing::debug!("CheckboxDropdown - widget busy, deferring close");
            let weak = weak.clone();
            timers.schedule(0, move || {
                if !dismiss_closed(&weak) {
                    tracing::warn!("CheckboxDropdown - deferred close found widget busy");
                }
            });
        })
    }

    fn schedule_focus(&mut self) {
        if !self.config.search_enabled {
            return;
        }
        let weak = self.self_ref.clone();
        let task = self.timers.schedule(self.config.focus_delay_ms, move || {
            let Some(widget) = weak.upgrade() else {
                return;
            };
            if let Ok(mut widget) = widget.try_borrow_mut() {
                widget.focus_task = None;
                if widget.is_open {
                    widget.target.borrow_mut().focus_search();
                }
            };
        });
        self.focus_task = Some(task);
    }
}

/// Sync a widget with a close made by the coordinator. False while the widget
/// is borrowed.
fn dismiss_closed(weak: &Weak<RefCell<CheckboxDropdown>>) -> bool {
    let Some(widget) = weak.upgrade() else {
        return true;
    };
    let Ok(mut widget) = widget.try_borrow_mut() else {
        return false;
    };
    // Reopened since the coordinator closed it
    if widget.is_open && !widget.coordinator.is_open(&widget.overlay_id) {
        widget.dismiss();
    }
    true
}

impl std::fmt::Debug for CheckboxDropdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckboxDropdown")
            .field("control", self.id())
            .field("options", &self.options.len())
            .field("selected", &self.selected_values())
            .field("is_open", &self.is_open)
            .field("search_term", &self.search_term)
            .finish()
    }
}

// =============================================================================
// DropdownExt
// =============================================================================

/// Operations on a shared widget handle
///
/// The widget borrow is released before the coordinator is called and before
/// change listeners run, so both may call back into this widget.
pub trait DropdownExt {
    fn id(&self) -> ControlId;
    /// Open the option list; no-op if already open
    fn open(&self);
    /// Close the option list and reset the search; no-op if already closed
    fn close(&self);
    fn toggle(&self);
    /// Select or deselect one option. Returns false for unknown values.
    fn set_option_selected(&self, value: &str, selected: bool) -> bool;
    /// Deselect from a tag's remove affordance
    fn remove_tag(&self, value: &str) -> bool;
    /// Filter visible options by case-insensitive label substring
    fn filter(&self, term: &str);
    /// Deselect everything
    fn clear(&self);
    /// Route a page input event to the widget
    fn handle_event(&self, event: WidgetEvent) -> Propagation;
    fn is_open(&self) -> bool;
    fn selected_values(&self) -> Vec<String>;
    fn visible_options(&self) -> Vec<DropdownOption>;
    fn search_term(&self) -> String;
}

impl DropdownExt for DropdownHandle {
    fn id(&self) -> ControlId {
        self.borrow().id().clone()
    }

    fn open(&self) {
        let (coordinator, id, surface, on_close) = {
            let mut widget = self.borrow_mut();
            if widget.is_open {
                return;
            }
            widget.is_open = true;
            (
                widget.coordinator.clone(),
                widget.overlay_id.clone(),
                Rc::clone(&widget.surface),
                widget.close_callback(),
            )
        };

        coordinator.request_open(id, OverlayKind::SelectionWidget, surface, Some(on_close));

        let mut widget = self.borrow_mut();
        widget.target.borrow_mut().set_expanded(true);
        widget.render_options();
        widget.schedule_focus();
        tracing::debug!("CheckboxDropdown::open - {}", widget.id());
    }

    fn close(&self) {
        let (coordinator, id) = {
            let mut widget = self.borrow_mut();
            if !widget.is_open {
                return;
            }
            widget.dismiss();
            (widget.coordinator.clone(), widget.overlay_id.clone())
        };
        coordinator.notify_closed(&id);
    }

    fn toggle(&self) {
        if DropdownExt::is_open(self) {
            self.close();
        } else {
            self.open();
        }
    }

    fn set_option_selected(&self, value: &str, selected: bool) -> bool {
        let control = {
            let mut widget = self.borrow_mut();
            if !widget.apply_selection(value, selected) {
                return false;
            }
            widget.control.clone()
        };
        control.dispatch_change();
        true
    }

    fn remove_tag(&self, value: &str) -> bool {
        self.set_option_selected(value, false)
    }

    fn filter(&self, term: &str) {
        let mut widget = self.borrow_mut();
        widget.apply_filter(term);
        widget.render_options();
    }

    fn clear(&self) {
        let control = {
            let mut widget = self.borrow_mut();
            widget.apply_clear();
            widget.control.clone()
        };
        control.dispatch_change();
    }

    fn handle_event(&self, event: WidgetEvent) -> Propagation {
        match event {
            WidgetEvent::TriggerClicked => {
                self.toggle();
                Propagation::Continue
            }
            WidgetEvent::OptionToggled { value, checked } => {
                self.set_option_selected(&value, checked);
                Propagation::Continue
            }
            WidgetEvent::TagRemoveClicked(value) => {
                // The tag sits on the trigger; the click must not toggle it.
                self.remove_tag(&value);
                Propagation::Stop
            }
            WidgetEvent::SearchInput(term) => {
                if self.borrow().config.search_enabled {
                    self.filter(&term);
                }
                Propagation::Continue
            }
            WidgetEvent::ClearClicked => {
                self.clear();
                Propagation::Continue
            }
            WidgetEvent::Escape => {
                self.close();
                Propagation::Stop
            }
        }
    }

    fn is_open(&self) -> bool {
        self.borrow().is_open
    }

    fn selected_values(&self) -> Vec<String> {
        self.borrow().selected_values()
    }

    fn visible_options(&self) -> Vec<DropdownOption> {
        self.borrow()
            .visible_options()
            .into_iter()
            .cloned()
            .collect()
    }

    fn search_term(&self) -> String {
        self.borrow().search_term.clone()
    }
}
