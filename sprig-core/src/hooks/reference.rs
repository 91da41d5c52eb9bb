//! Mutable references that persist across renders.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use super::claim_slot;

/// A mutable box owned by a fiber. Writing to it never re-renders.
pub struct HookRef<T>(Rc<RefCell<T>>);

impl<T> HookRef<T> {
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    /// Whether both handles point at the same box.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> HookRef<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for HookRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for HookRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookRef").field(&self.0.borrow()).finish()
    }
}

/// A box holding `initial` on the first render; every later render returns
/// the same box.
pub fn use_ref<T: 'static>(initial: T) -> HookRef<T> {
    let (_, slot) = claim_slot("use_ref", move || RefCell::new(initial));
    HookRef(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{h, Component, Node};
    use crate::runtime::render_component;

    #[test]
    fn same_box_across_renders() {
        let refs: Rc<RefCell<Vec<HookRef<i32>>>> = Rc::default();
        let refs_c = refs.clone();
        let holder = Component::new("Holder", move |_| {
            let value = use_ref(0);
            refs_c.borrow_mut().push(value.clone());
            Ok(Node::text(value.get().to_string()))
        });
        let element = h(&holder, None, vec![]);

        render_component(&element, None).unwrap();
        refs.borrow()[0].set(42);
        let output = render_component(&element, None).unwrap();

        assert!(refs.borrow()[0].ptr_eq(&refs.borrow()[1]));
        assert_eq!(output.as_text().unwrap().content(), "42");
    }

    #[test]
    fn writes_do_not_render() {
        let renders = Rc::new(std::cell::Cell::new(0));
        let renders_c = renders.clone();
        let stash: Rc<RefCell<Option<HookRef<String>>>> = Rc::default();
        let stash_c = stash.clone();
        let quiet = Component::new("Quiet", move |_| {
            renders_c.set(renders_c.get() + 1);
            *stash_c.borrow_mut() = Some(use_ref(String::new()));
            Ok(Node::Empty)
        });
        render_component(&h(&quiet, None, vec![]), None).unwrap();

        let held = stash.borrow().clone().unwrap();
        held.borrow_mut().push_str("typed");
        assert_eq!(held.replace("reset".into()), "typed");
        assert_eq!(renders.get(), 1);
    }
}
