//! Hooks
//!
//! Ordered-slot state primitives for component bodies.
//!
//! # Rules
//!
//! Hooks may only be called while a component renders; calling one anywhere
//! else panics. The N-th hook call of a component body always reads slot N
//! of its fiber, so every render of a component must call the same hooks in
//! the same order. A hook that finds another hook's state in its slot panics
//! rather than misreading it.
//!
//! # Available Hooks
//!
//! - [`use_state`], [`use_state_with`]: a value plus a [`Setter`]
//! - [`use_reducer`], [`use_reducer_with_init`]: reducer-driven state plus a [`Dispatch`]
//! - [`use_ref`]: a mutable box that survives renders without triggering them
//! - [`use_memo`]: a value recomputed only when its dependencies change
//! - [`use_callback`]: a function whose identity changes only with its dependencies
//! - [`use_effect`]: a side effect run after the host tree is patched, when
//!   its dependencies change
//!
//! # Dependencies
//!
//! Dependency sequences are any `PartialEq` value, usually a tuple:
//! `(count, name.clone())` compares element-wise, `()` never changes.
//!
//! # Updates
//!
//! Setters and dispatchers write the slot, then synchronously re-render the
//! component and patch its host subtree before returning. Every call
//! re-renders, even when the value did not change.

mod effect;
mod memo;
mod reference;
mod state;

use std::any::Any;
use std::rc::Rc;

use tracing::trace;

use crate::runtime::{Fiber, RenderContext};

pub use effect::use_effect;
pub use memo::{use_callback, use_memo};
pub use reference::{use_ref, HookRef};
pub use state::{use_reducer, use_reducer_with_init, use_state, use_state_with, Dispatch, Setter};

/// Claim the next slot of the rendering fiber.
///
/// Returns the slot's state, creating it with `init` on the fiber's first
/// render. `init` runs with no fiber borrow held.
fn claim_slot<S: Any>(hook: &'static str, init: impl FnOnce() -> S) -> (Fiber, Rc<S>) {
    let (fiber, index) = RenderContext::next_slot(hook);

    match fiber.hook(index) {
        Some(slot) => {
            let slot = downcast_slot(hook, index, slot);
            (fiber, slot)
        }
        None => {
            trace!(hook, index, component = %fiber.name(), "initialising hook slot");
            let slot = Rc::new(init());
            fiber.push_hook(index, slot.clone());
            (fiber, slot)
        }
    }
}

/// Read the slot without creating it; `None` on the first render.
fn existing_slot<S: Any>(hook: &'static str) -> (Fiber, usize, Option<Rc<S>>) {
    let (fiber, index) = RenderContext::next_slot(hook);
    let slot = fiber.hook(index).map(|slot| downcast_slot(hook, index, slot));
    (fiber, index, slot)
}

fn downcast_slot<S: Any>(hook: &'static str, index: usize, slot: Rc<dyn Any>) -> Rc<S> {
    match slot.downcast::<S>() {
        Ok(slot) => slot,
        Err(_) => panic!(
            "`{hook}` found state of a different hook in slot {index}; \
             hooks must be called in the same order on every render"
        ),
    }
}
