//! Widget registry - one checkbox dropdown per bound control
//!
//! Owned by the page session together with the coordinator and timers it
//! hands to every widget. Initialization is idempotent: a control that is
//! already wrapped returns its existing widget, so hosts can retry after
//! asynchronous data population without double-binding.

use std::cell::RefCell;

use indexmap::IndexMap;
use mdu_core::id::ControlId;
use mdu_core::timers::SharedTimers;
use mdu_layout::native::BoundControl;
use mdu_layout::overlay::OverlayCoordinator;

use crate::components::checkbox_dropdown::{
    CheckboxDropdown, DropdownConfig, DropdownExt, DropdownHandle,
};
use crate::components::render_target::SharedRenderTarget;
use crate::error::Result;

pub struct WidgetRegistry {
    widgets: RefCell<IndexMap<ControlId, DropdownHandle>>,
    coordinator: OverlayCoordinator,
    timers: SharedTimers,
}

impl WidgetRegistry {
    pub fn new(coordinator: OverlayCoordinator, timers: SharedTimers) -> Self {
        Self {
            widgets: RefCell::new(IndexMap::new()),
            coordinator,
            timers,
        }
    }

    pub fn coordinator(&self) -> &OverlayCoordinator {
        &self.coordinator
    }

    pub fn timers(&self) -> &SharedTimers {
        &self.timers
    }

    /// Wrap `control` unless it already is, reporting why it could not be.
    pub fn try_init(
        &self,
        control: BoundControl,
        target: SharedRenderTarget,
        config: DropdownConfig,
    ) -> Result<DropdownHandle> {
        if let Some(existing) = self.get(control.id()) {
            tracing::trace!("WidgetRegistry::init - {} already wrapped", control.id());
            return Ok(existing);
        }

        let id = control.id().clone();
        let handle = CheckboxDropdown::initialize(
            control,
            target,
            config,
            self.coordinator.clone(),
            self.timers.clone(),
        )?;
        self.widgets.borrow_mut().insert(id, handle.clone());
        Ok(handle)
    }

    /// Wrap `control` unless it already is.
    ///
    /// Returns `None` (after logging) when the control cannot be wrapped yet;
    /// the native control stays usable and the host may retry later.
    pub fn init(
        &self,
        control: BoundControl,
        target: SharedRenderTarget,
        config: DropdownConfig,
    ) -> Option<DropdownHandle> {
        let id = control.id().clone();
        match self.try_init(control, target, config) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!("WidgetRegistry::init - skipping {}: {}", id, err);
                None
            }
        }
    }

    pub fn get(&self, id: &ControlId) -> Option<DropdownHandle> {
        self.widgets.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &ControlId) -> bool {
        self.widgets.borrow().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.borrow().is_empty()
    }

    /// Wrapped control ids in initialization order
    pub fn ids(&self) -> Vec<ControlId> {
        self.widgets.borrow().keys().cloned().collect()
    }

    fn handles(&self) -> Vec<DropdownHandle> {
        self.widgets.borrow().values().cloned().collect()
    }

    /// Deselect everything in every widget, without knowing their ids
    pub fn clear_all(&self) {
        let handles = self.handles();
        tracing::debug!("WidgetRegistry::clear_all - {} widget(s)", handles.len());
        for handle in handles {
            handle.clear();
        }
    }

    /// Close every open widget through its own close path
    pub fn close_all(&self) {
        for handle in self.handles() {
            handle.close();
        }
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("widgets", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::components::render_target::{OptionView, RenderTarget};
    use crate::components::summary::SummaryItem;
    use mdu_core::geometry::Rect;
    use mdu_core::timers::Timers;
    use mdu_layout::native::MemorySelect;
    use mdu_layout::overlay::{overlay_coordinator, CoordinatorConfig, Presentation};

    struct NullTarget;

    impl RenderTarget for NullTarget {
        fn render_closed_summary(&mut self, _items: &[SummaryItem]) {}
        fn render_option_list(&mut self, _options: &[OptionView]) {}
        fn set_expanded(&mut self, _expanded: bool) {}
        fn set_elevated(&mut self, _presentation: Option<&Presentation>) {}
        fn hide_native_control(&mut self) {}
        fn focus_search(&mut self) {}
        fn bounds(&self) -> Rect {
            Rect::ZERO
        }
    }

    fn target() -> SharedRenderTarget {
        Rc::new(RefCell::new(NullTarget))
    }

    fn registry() -> WidgetRegistry {
        WidgetRegistry::new(
            overlay_coordinator(CoordinatorConfig::default()),
            Rc::new(Timers::new()),
        )
    }

    #[test]
    fn test_init_is_idempotent() {
        let registry = registry();
        let select = MemorySelect::multiple().option("a", "A").into_shared();
        let control = BoundControl::new("filtroEquipe", select);

        let first = registry.init(control.clone(), target(), DropdownConfig::default()).unwrap();
        let second = registry.init(control, target(), DropdownConfig::default()).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&"filtroEquipe".into()));
    }

    #[test]
    fn test_underpopulated_control_is_skipped_then_retried() {
        let registry = registry();
        let select = MemorySelect::multiple().option("", "Carregando...").into_shared();
        let control = BoundControl::new("filtroCidade", select.clone());

        assert!(registry.init(control.clone(), target(), DropdownConfig::default()).is_none());
        assert_eq!(
            registry.try_init(control.clone(), target(), DropdownConfig::default()).unwrap_err(),
            crate::error::WidgetError::Underpopulated { control: "filtroCidade".into() }
        );
        assert!(registry.is_empty());

        select
            .borrow_mut()
            .push_option(mdu_layout::native::NativeOption::new("poa", "Porto Alegre"));
        assert!(registry.init(control, target(), DropdownConfig::default()).is_some());
        assert_eq!(registry.ids(), vec![ControlId::from("filtroCidade")]);
    }

    #[test]
    fn test_clear_all_and_close_all() {
        let registry = registry();
        let a = BoundControl::new(
            "a",
            MemorySelect::multiple().selected_option("1", "Um").into_shared(),
        );
        let b = BoundControl::new(
            "b",
            MemorySelect::multiple().selected_option("2", "Dois").into_shared(),
        );
        registry.init(a.clone(), target(), DropdownConfig::default());
        let widget_b = registry.init(b.clone(), target(), DropdownConfig::default()).unwrap();
        widget_b.open();

        registry.clear_all();
        assert!(a.selected_values().is_empty());
        assert!(b.selected_values().is_empty());

        registry.close_all();
        assert!(!widget_b.is_open());
        assert!(registry.coordinator().borrow().open_ids().is_empty());
    }
}
