//! State and reducer hooks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::claim_slot;
use crate::error::{Error, Result};
use crate::runtime::{render_in_progress, rerender, WeakFiber};

struct StateSlot<T> {
    value: RefCell<T>,
}

/// Updater returned by [`use_state`].
pub struct Setter<T> {
    fiber: WeakFiber,
    slot: Rc<StateSlot<T>>,
}

impl<T: Clone + 'static> Setter<T> {
    /// Store `value` and re-render.
    pub fn set(&self, value: T) -> Result<()> {
        if render_in_progress() {
            return Err(Error::UpdateDuringRender);
        }
        *self.slot.value.borrow_mut() = value;
        rerender(&self.fiber)
    }

    /// Compute the next value from the current one, store it and re-render.
    ///
    /// `f` sees a snapshot, so it may read or set this state itself.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<()> {
        let current = self.get();
        let next = f(&current);
        self.set(next)
    }

    /// The value currently stored, which may be newer than the value the
    /// rendering body received.
    pub fn get(&self) -> T {
        self.slot.value.borrow().clone()
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            fiber: self.fiber.clone(),
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").finish_non_exhaustive()
    }
}

/// A stateful value and its updater.
///
/// `initial` is used on the first render only.
///
/// ```rust,ignore
/// let (count, set_count) = use_state(0);
/// let on_click = EventHandler::new(move |_| {
///     let _ = set_count.update(|count| count + 1);
/// });
/// ```
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, Setter<T>) {
    use_state_with(move || initial)
}

/// Like [`use_state`], computing the initial value lazily on the first render.
pub fn use_state_with<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, Setter<T>) {
    let (fiber, slot) = claim_slot("use_state", || StateSlot {
        value: RefCell::new(init()),
    });
    let value = slot.value.borrow().clone();
    (
        value,
        Setter {
            fiber: fiber.downgrade(),
            slot,
        },
    )
}

type Reducer<T, A> = Rc<dyn Fn(&T, A) -> T>;

struct ReducerSlot<T, A> {
    value: RefCell<T>,
    reducer: RefCell<Reducer<T, A>>,
}

/// Dispatcher returned by [`use_reducer`].
pub struct Dispatch<T, A> {
    fiber: WeakFiber,
    slot: Rc<ReducerSlot<T, A>>,
}

impl<T: Clone + 'static, A: 'static> Dispatch<T, A> {
    /// Run the reducer on `(current, action)`, store the result and re-render.
    pub fn dispatch(&self, action: A) -> Result<()> {
        if render_in_progress() {
            return Err(Error::UpdateDuringRender);
        }
        let reducer = self.slot.reducer.borrow().clone();
        let current = self.slot.value.borrow().clone();
        let next = reducer(&current, action);
        *self.slot.value.borrow_mut() = next;
        rerender(&self.fiber)
    }
}

impl<T, A> Clone for Dispatch<T, A> {
    fn clone(&self) -> Self {
        Self {
            fiber: self.fiber.clone(),
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T, A> fmt::Debug for Dispatch<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}

/// Reducer-driven state.
///
/// The reducer from the most recent render is the one dispatch uses.
pub fn use_reducer<T, A, R>(reducer: R, initial: T) -> (T, Dispatch<T, A>)
where
    T: Clone + 'static,
    A: 'static,
    R: Fn(&T, A) -> T + 'static,
{
    reducer_hook(reducer, move || initial)
}

/// Reducer-driven state whose initial value is `init(arg)`.
///
/// `init` runs exactly once for the lifetime of the fiber.
pub fn use_reducer_with_init<T, A, I, R>(
    reducer: R,
    arg: I,
    init: impl FnOnce(I) -> T,
) -> (T, Dispatch<T, A>)
where
    T: Clone + 'static,
    A: 'static,
    R: Fn(&T, A) -> T + 'static,
{
    reducer_hook(reducer, move || init(arg))
}

fn reducer_hook<T, A, R>(reducer: R, init: impl FnOnce() -> T) -> (T, Dispatch<T, A>)
where
    T: Clone + 'static,
    A: 'static,
    R: Fn(&T, A) -> T + 'static,
{
    let reducer: Reducer<T, A> = Rc::new(reducer);
    let (fiber, slot) = claim_slot("use_reducer", || ReducerSlot {
        value: RefCell::new(init()),
        reducer: RefCell::new(reducer.clone()),
    });
    *slot.reducer.borrow_mut() = reducer;

    let value = slot.value.borrow().clone();
    (
        value,
        Dispatch {
            fiber: fiber.downgrade(),
            slot,
        },
    )
}
