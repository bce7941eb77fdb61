//! Control and overlay identities

use std::fmt;
use std::rc::Rc;

/// Identity of a native multi-value selection control on the page.
///
/// Cheap to clone; compared by content so the host can refer to the same
/// control with a fresh string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(Rc<str>);

impl ControlId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ControlId({:?})", &*self.0)
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControlId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ControlId {
    fn from(id: String) -> Self {
        Self(Rc::from(id))
    }
}

/// Identity of an overlay tracked by the coordinator.
///
/// A widget's overlay shares its bound control's identity, as does a native
/// multi-select opened directly. A control is never both at once because the
/// widget hides the native control it wraps.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(ControlId);

impl OverlayId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(ControlId::new(id))
    }

    pub fn control(&self) -> &ControlId {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayId({:?})", self.0.as_str())
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<ControlId> for OverlayId {
    fn from(id: ControlId) -> Self {
        Self(id)
    }
}

impl From<&ControlId> for OverlayId {
    fn from(id: &ControlId) -> Self {
        Self(id.clone())
    }
}

impl From<&str> for OverlayId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
