//! Page session context
//!
//! [`PageContext`] owns the per-page singletons (overlay coordinator, widget
//! registry, clock) and hands them to widgets explicitly. The host forwards
//! its input events through [`PageContext::dispatch`] and drives deferred
//! work with [`PageContext::advance_to`].

use std::rc::Rc;

use mdu_cn::{
    DropdownConfig, DropdownExt, DropdownHandle, SharedRenderTarget, WidgetEvent, WidgetRegistry,
};
use mdu_core::error::MduError;
use mdu_core::geometry::{Point, Size};
use mdu_core::hooks::{HookId, HookList};
use mdu_core::id::{ControlId, OverlayId};
use mdu_core::retry::RetryHandle;
use mdu_core::timers::{SharedTimers, Timers};
use mdu_layout::native::BoundControl;
use mdu_layout::overlay::{
    overlay_coordinator, OverlayCoordinator, OverlayCoordinatorExt, OverlayKind, SharedSurface,
    StackLevel,
};

use crate::bootstrap;
use crate::config::{ControlConfig, MduConfig};

/// Where the host looks up native controls and their render targets
pub trait PageDocument {
    fn control(&self, id: &ControlId) -> Option<BoundControl>;
    fn render_target(&self, id: &ControlId) -> Option<SharedRenderTarget>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Char(char),
}

/// The part of a widget a click landed on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickTarget {
    pub control: ControlId,
    pub event: WidgetEvent,
}

/// Input forwarded from the host
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    /// A click anywhere on the page, optionally on part of a widget
    Click {
        point: Point,
        target: Option<ClickTarget>,
    },
    /// Non-click input inside a widget (search typing, focused Escape)
    Input { control: ControlId, event: WidgetEvent },
    /// A key press with no widget focused
    KeyDown(Key),
    Resize(Size),
}

pub struct PageContext {
    config: MduConfig,
    coordinator: OverlayCoordinator,
    timers: SharedTimers,
    registry: Rc<WidgetRegistry>,
    clear_hooks: HookList<()>,
}

impl PageContext {
    pub fn new(config: MduConfig) -> Self {
        let coordinator = overlay_coordinator(config.coordinator_config());
        let timers = Rc::new(Timers::new());
        let registry = Rc::new(WidgetRegistry::new(coordinator.clone(), timers.clone()));
        Self {
            config,
            coordinator,
            timers,
            registry,
            clear_hooks: HookList::new(),
        }
    }

    pub fn config(&self) -> &MduConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &OverlayCoordinator {
        &self.coordinator
    }

    pub fn timers(&self) -> &SharedTimers {
        &self.timers
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn widget(&self, id: &ControlId) -> Option<DropdownHandle> {
        self.registry.get(id)
    }

    /// Wrap every configured control, retrying until they are populated.
    pub fn bootstrap(&self, document: Rc<dyn PageDocument>) -> RetryHandle {
        bootstrap::start(
            Rc::clone(&self.registry),
            document,
            self.config.control_configs(),
            self.config.retry_policy(),
            &self.timers,
        )
    }

    /// Wrap one control immediately, reporting why it could not be
    pub fn init_control(
        &self,
        document: &dyn PageDocument,
        id: &ControlId,
    ) -> mdu_core::Result<DropdownHandle> {
        let config = match self.config.controls.iter().find(|c| c.id.trim() == id.as_str()) {
            Some(control) => self.config.dropdown_config(control),
            None => self.config.dropdown_config(&ControlConfig {
                id: id.to_string(),
                placeholder: DropdownConfig::default().placeholder,
            }),
        };
        let native = document
            .control(id)
            .ok_or_else(|| MduError::ControlNotFound(id.clone()))?;
        let target = document
            .render_target(id)
            .ok_or_else(|| MduError::ControlNotFound(id.clone()))?;
        Ok(self.registry.try_init(native, target, config)?)
    }

    /// Route one host input event.
    ///
    /// Widget events are handled first. Every click then reaches the
    /// click-outside observer, which leaves the overlay it landed in open.
    pub fn dispatch(&self, event: PageEvent) {
        match event {
            PageEvent::Click { point, target } => {
                if let Some(ClickTarget { control, event }) = target {
                    self.deliver(&control, event);
                }
                self.coordinator.handle_click(point);
            }
            PageEvent::Input { control, event } => {
                self.deliver(&control, event);
            }
            PageEvent::KeyDown(Key::Escape) => {
                self.coordinator.handle_escape();
            }
            PageEvent::KeyDown(_) => {}
            PageEvent::Resize(size) => self.coordinator.handle_resize(size),
        }
    }

    fn deliver(&self, control: &ControlId, event: WidgetEvent) {
        match self.registry.get(control) {
            Some(widget) => {
                widget.handle_event(event);
            }
            None => tracing::trace!("PageContext::dispatch - {} is not a widget", control),
        }
    }

    /// Open a native multi-select directly, closing every other overlay
    pub fn open_native(&self, id: impl Into<ControlId>, surface: SharedSurface) {
        let id: ControlId = id.into();
        self.coordinator.request_open(
            OverlayId::from(id),
            OverlayKind::NativeMultiSelect,
            surface,
            None,
        );
    }

    /// The native multi-select closed itself (blur, selection made)
    pub fn close_native(&self, id: &ControlId) -> bool {
        self.coordinator.notify_closed(&OverlayId::from(id))
    }

    /// Register host behaviour for the page's "clear all filters" action
    pub fn on_clear_filters<F>(&self, hook: F) -> HookId
    where
        F: Fn() + 'static,
    {
        self.clear_hooks.register(move |_: &()| hook())
    }

    pub fn remove_clear_hook(&self, id: HookId) -> bool {
        self.clear_hooks.unregister(id)
    }

    /// Run host clear hooks in registration order, then clear every widget
    pub fn clear_all_filters(&self) {
        self.clear_hooks.emit(&());
        self.registry.clear_all();
    }

    /// Recovery path: close every overlay regardless of input state
    pub fn force_close_all(&self) -> usize {
        self.coordinator.force_close_all()
    }

    /// Advance the page clock, running due deferred work
    pub fn advance_to(&self, now_ms: u64) -> usize {
        self.timers.advance_to(now_ms)
    }

    pub fn advance_by(&self, delta_ms: u64) -> usize {
        self.timers.advance_by(delta_ms)
    }

    pub fn open_overlay_ids(&self) -> Vec<OverlayId> {
        self.coordinator.open_ids()
    }

    pub fn top_overlay(&self) -> Option<OverlayId> {
        self.coordinator.top()
    }

    pub fn stack_level(&self, id: &ControlId) -> Option<StackLevel> {
        self.coordinator.stack_level(&OverlayId::from(id))
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new(MduConfig::default())
    }
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("widgets", &self.registry.ids())
            .field("open", &self.open_overlay_ids())
            .field("now_ms", &self.timers.now())
            .finish()
    }
}
