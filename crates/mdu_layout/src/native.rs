//! Native multi-value selection controls
//!
//! A [`NativeSelect`] is the host's own form control (a `<select multiple>`
//! in a browser). Widgets never remove it: host form logic keeps reading it
//! directly, so every widget mutation is written back through this contract
//! and followed by a change notification.

use std::cell::RefCell;
use std::rc::Rc;

use mdu_core::hooks::{HookId, HookList};
use mdu_core::id::ControlId;

/// One entry of a native control's option list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl NativeOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Placeholder entries ("Selecione...") carry an empty value and are not
    /// real options.
    pub fn is_real(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// Host-side multi-value selection control
pub trait NativeSelect {
    /// Whether the control accepts more than one selected option
    fn is_multiple(&self) -> bool;

    /// Current option list in source order
    fn options(&self) -> Vec<NativeOption>;

    /// Set the selected flag of every option carrying `value`.
    /// Returns false if no option has it.
    fn set_selected(&mut self, value: &str, selected: bool) -> bool;
}

/// Notification equivalent to a native `change` event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub control: ControlId,
    /// Selected values in option order
    pub selected: Vec<String>,
}

/// A native control bound to the page under a stable identity.
///
/// Change listeners live beside the control rather than inside it, so a
/// listener can freely read or write the control while being notified.
#[derive(Clone)]
pub struct BoundControl {
    id: ControlId,
    select: Rc<RefCell<dyn NativeSelect>>,
    change: Rc<HookList<ChangeEvent>>,
}

impl BoundControl {
    pub fn new(id: impl Into<ControlId>, select: Rc<RefCell<dyn NativeSelect>>) -> Self {
        Self {
            id: id.into(),
            select,
            change: Rc::new(HookList::new()),
        }
    }

    pub fn id(&self) -> &ControlId {
        &self.id
    }

    pub fn is_multiple(&self) -> bool {
        self.select.borrow().is_multiple()
    }

    pub fn options(&self) -> Vec<NativeOption> {
        self.select.borrow().options()
    }

    /// Number of non-placeholder options
    pub fn real_option_count(&self) -> usize {
        self.select
            .borrow()
            .options()
            .iter()
            .filter(|o| o.is_real())
            .count()
    }

    pub fn set_selected(&self, value: &str, selected: bool) -> bool {
        self.select.borrow_mut().set_selected(value, selected)
    }

    pub fn selected_values(&self) -> Vec<String> {
        self.select
            .borrow()
            .options()
            .into_iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect()
    }

    /// Register a host listener for change notifications
    pub fn on_change<F>(&self, listener: F) -> HookId
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.change.register(listener)
    }

    pub fn remove_change_listener(&self, id: HookId) -> bool {
        self.change.unregister(id)
    }

    /// Notify every change listener with the control's current selection.
    pub fn dispatch_change(&self) {
        let event = ChangeEvent {
            control: self.id.clone(),
            selected: self.selected_values(),
        };
        tracing::trace!(
            "BoundControl::dispatch_change - {} now has {} selected",
            self.id,
            event.selected.len()
        );
        self.change.emit(&event);
    }
}

impl std::fmt::Debug for BoundControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundControl")
            .field("id", &self.id)
            .field("listeners", &self.change.len())
            .finish()
    }
}

/// In-memory native control for headless hosts and tests
#[derive(Clone, Debug, Default)]
pub struct MemorySelect {
    multiple: bool,
    options: Vec<NativeOption>,
}

impl MemorySelect {
    /// An empty `multiple` control
    pub fn multiple() -> Self {
        Self {
            multiple: true,
            options: Vec::new(),
        }
    }

    /// An empty single-value control
    pub fn single() -> Self {
        Self::default()
    }

    /// Builder-style option append
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(NativeOption::new(value, label));
        self
    }

    /// Builder-style append of an initially selected option
    pub fn selected_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options
            .push(NativeOption::new(value, label).selected(true));
        self
    }

    /// Append an option after construction (asynchronous population)
    pub fn push_option(&mut self, option: NativeOption) {
        self.options.push(option);
    }

    pub fn clear_options(&mut self) {
        self.options.clear();
    }

    pub fn into_shared(self) -> Rc<RefCell<MemorySelect>> {
        Rc::new(RefCell::new(self))
    }
}

impl NativeSelect for MemorySelect {
    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn options(&self) -> Vec<NativeOption> {
        self.options.clone()
    }

    fn set_selected(&mut self, value: &str, selected: bool) -> bool {
        if !self.options.iter().any(|o| o.value == value) {
            return false;
        }
        if selected && !self.multiple {
            // Single-value controls hold at most one selected entry
            let index = self.options.iter().position(|o| o.value == value);
            for (i, option) in self.options.iter_mut().enumerate() {
                option.selected = Some(i) == index;
            }
            return true;
        }
        for option in self.options.iter_mut().filter(|o| o.value == value) {
            option.selected = selected;
        }
        true
    }
}
