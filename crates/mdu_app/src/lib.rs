//! Sistema MDU page controller
//!
//! Wires the dropdown widgets into a page session: configuration, logging,
//! widget bootstrap with bounded retry, and routing of host input events to
//! widgets and to the overlay coordinator.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use mdu_app::prelude::*;
//!
//! let config = MduConfig::load(Path::new("mdu.toml"))?;
//! init_tracing(&config.log_filter);
//!
//! let page = PageContext::new(config);
//! let document: Rc<dyn PageDocument> = Rc::new(host_document);
//! page.bootstrap(document);
//!
//! // From the host event loop:
//! page.dispatch(PageEvent::Click { point, target: None });
//! page.advance_to(now_ms);
//! ```

mod bootstrap;
mod config;
mod error;
pub mod headless;
mod logging;
mod page;

#[cfg(test)]
mod tests;

pub use config::{BootstrapConfig, ControlConfig, DropdownDefaults, MduConfig, OverlayConfig};
pub use error::{ConfigError, Result};
pub use headless::{HeadlessControl, HeadlessDocument, NativeSurface, RecordingTarget};
pub use logging::init_tracing;
pub use page::{ClickTarget, Key, PageContext, PageDocument, PageEvent};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::MduConfig;
    pub use crate::error::{ConfigError, Result};
    pub use crate::logging::init_tracing;
    pub use crate::page::{ClickTarget, Key, PageContext, PageDocument, PageEvent};

    pub use mdu_cn::prelude::*;
    pub use mdu_core::{ControlId, OverlayId, Point, Rect, RetryOutcome, Size};
}
