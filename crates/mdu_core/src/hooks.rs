//! Ordered observer lists
//!
//! Hosts extend widget behavior by registering hooks instead of wrapping or
//! reassigning each other's functions. Hooks run in registration order.
//!
//! ```rust
//! use mdu_core::hooks::HookList;
//!
//! let hooks: HookList<str> = HookList::new();
//! let id = hooks.register(|value| println!("changed: {value}"));
//! hooks.emit("filtroProjeto");
//! hooks.unregister(id);
//! assert!(hooks.is_empty());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`HookList::register`], used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

type Hook<A> = Rc<dyn Fn(&A)>;

/// An ordered list of callbacks sharing one argument type
pub struct HookList<A: ?Sized> {
    hooks: RefCell<Vec<(HookId, Hook<A>)>>,
    next_id: Cell<u64>,
}

impl<A: ?Sized> HookList<A> {
    pub fn new() -> Self {
        Self {
            hooks: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Append a hook; it runs after every hook registered before it.
    pub fn register<F>(&self, hook: F) -> HookId
    where
        F: Fn(&A) + 'static,
    {
        let id = HookId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.hooks.borrow_mut().push((id, Rc::new(hook)));
        id
    }

    /// Returns false if the hook was not registered.
    pub fn unregister(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }

    /// Run every hook in registration order.
    ///
    /// The list is snapshotted first, so hooks may register or unregister
    /// hooks while running; changes apply from the next `emit`.
    pub fn emit(&self, arg: &A) {
        let snapshot: Vec<Hook<A>> = self
            .hooks
            .borrow()
            .iter()
            .map(|(_, hook)| Rc::clone(hook))
            .collect();
        for hook in snapshot {
            hook(arg);
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.borrow().is_empty()
    }
}

impl<A: ?Sized> Default for HookList<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> std::fmt::Debug for HookList<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookList")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hooks: HookList<u32> = HookList::new();

        let first = Rc::clone(&log);
        hooks.register(move |v| first.borrow_mut().push(format!("host:{v}")));
        let second = Rc::clone(&log);
        hooks.register(move |v| second.borrow_mut().push(format!("widgets:{v}")));

        hooks.emit(&7);
        assert_eq!(*log.borrow(), vec!["host:7", "widgets:7"]);
    }

    #[test]
    fn test_unregister() {
        let hooks: HookList<()> = HookList::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = hooks.register(move |_| c.set(c.get() + 1));

        hooks.emit(&());
        assert!(hooks.unregister(id));
        assert!(!hooks.unregister(id));
        hooks.emit(&());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_register_during_emit_applies_next_time() {
        let hooks: Rc<HookList<()>> = Rc::new(HookList::new());
        let count = Rc::new(Cell::new(0));

        let inner_hooks = Rc::clone(&hooks);
        let c = Rc::clone(&count);
        hooks.register(move |_| {
            let c = Rc::clone(&c);
            inner_hooks.register(move |_| c.set(c.get() + 1));
        });

        hooks.emit(&());
        assert_eq!(count.get(), 0);
        assert_eq!(hooks.len(), 2);
    }
}
