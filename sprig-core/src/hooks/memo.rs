//! Memoised values and callbacks.

use std::rc::Rc;

use tracing::trace;

use super::existing_slot;

struct MemoSlot<T, D> {
    value: Rc<T>,
    deps: D,
}

/// A value recomputed only when `deps` differs from the previous render's.
///
/// While the dependencies are unchanged the same `Rc` is returned, so
/// identity can be compared with [`Rc::ptr_eq`].
pub fn use_memo<T, D>(factory: impl FnOnce() -> T, deps: D) -> Rc<T>
where
    T: 'static,
    D: PartialEq + 'static,
{
    let (fiber, index, slot) = existing_slot::<MemoSlot<T, D>>("use_memo");

    match slot {
        Some(slot) if slot.deps == deps => Rc::clone(&slot.value),
        Some(_) => {
            trace!(index, component = %fiber.name(), "memo dependencies changed");
            let value = Rc::new(factory());
            fiber.replace_hook(index, Rc::new(MemoSlot { value: Rc::clone(&value), deps }));
            value
        }
        None => {
            let value = Rc::new(factory());
            fiber.push_hook(index, Rc::new(MemoSlot { value: Rc::clone(&value), deps }));
            value
        }
    }
}

/// A callback whose identity changes only when `deps` changes.
///
/// Sugar for `use_memo(move || f, deps)`.
pub fn use_callback<F, D>(f: F, deps: D) -> Rc<F>
where
    F: 'static,
    D: PartialEq + 'static,
{
    use_memo(move || f, deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{h, Component, Node};
    use crate::runtime::render_component;
    use std::cell::{Cell, RefCell};

    #[test]
    fn recomputes_only_when_deps_change() {
        let dep = Rc::new(Cell::new(1));
        let calls = Rc::new(Cell::new(0));
        let seen: Rc<RefCell<Vec<Rc<i32>>>> = Rc::default();

        let (dep_c, calls_c, seen_c) = (dep.clone(), calls.clone(), seen.clone());
        let doubled = Component::new("Doubled", move |_| {
            let value = dep_c.get();
            let calls = calls_c.clone();
            let result = use_memo(
                move || {
                    calls.set(calls.get() + 1);
                    value * 2
                },
                (value,),
            );
            seen_c.borrow_mut().push(result.clone());
            Ok(Node::text(result.to_string()))
        });
        let element = h(&doubled, None, vec![]);

        render_component(&element, None).unwrap();
        render_component(&element, None).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&seen.borrow()[0], &seen.borrow()[1]));

        dep.set(4);
        render_component(&element, None).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(*seen.borrow()[2], 8);
        assert!(!Rc::ptr_eq(&seen.borrow()[1], &seen.borrow()[2]));
    }

    #[test]
    fn empty_deps_compute_once() {
        let calls = Rc::new(Cell::new(0));
        let calls_c = calls.clone();
        let once = Component::new("Once", move |_| {
            let calls = calls_c.clone();
            let value = use_memo(
                move || {
                    calls.set(calls.get() + 1);
                    "computed"
                },
                (),
            );
            Ok(Node::text(*value))
        });
        let element = h(&once, None, vec![]);
        for _ in 0..4 {
            render_component(&element, None).unwrap();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn callback_identity_follows_deps() {
        let dep = Rc::new(Cell::new("a"));
        let seen: Rc<RefCell<Vec<Rc<Box<dyn Fn() -> &'static str>>>>> = Rc::default();

        let (dep_c, seen_c) = (dep.clone(), seen.clone());
        let clicker = Component::new("Clicker", move |_| {
            let label = dep_c.get();
            let callback: Box<dyn Fn() -> &'static str> = Box::new(move || label);
            let callback = use_callback(callback, label);
            seen_c.borrow_mut().push(callback);
            Ok(Node::Empty)
        });
        let element = h(&clicker, None, vec![]);

        render_component(&element, None).unwrap();
        render_component(&element, None).unwrap();
        dep.set("b");
        render_component(&element, None).unwrap();

        let seen = seen.borrow();
        assert!(Rc::ptr_eq(&seen[0], &seen[1]));
        assert!(!Rc::ptr_eq(&seen[1], &seen[2]));
        assert_eq!((seen[2])(), "b");
    }
}
