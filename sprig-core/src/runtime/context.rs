//! Render Context
//!
//! The render context tracks which component is currently rendering and
//! how many hooks it has called so far. Hooks read it to find their slot.
//!
//! # Implementation
//!
//! We use a thread-local stack of frames. Entering a component render pushes
//! a frame (the fiber plus a hook cursor starting at 0) and returns a guard;
//! dropping the guard pops the frame. The guard drops on every exit path,
//! early `Err` returns and panics included, so a failing component never
//! leaves its fiber active.
//!
//! This design supports nested renders (a component that synchronously
//! renders another component): the inner frame sits on top of the outer one
//! and the outer cursor is untouched.
//!
//! A second counter tracks render *scopes*: top-level operations (mount,
//! reconcile, state update) that may run several component renders. Effects
//! queued during a scope run once the outermost scope finishes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::trace;

use super::fiber::{Fiber, FiberId};
use crate::error::Result;

thread_local! {
    static FRAME_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
    static SCOPE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PENDING_EFFECTS: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::new(VecDeque::new());
}

/// An entry in the render context stack.
struct Frame {
    fiber: Fiber,
    /// Index of the next hook slot.
    cursor: usize,
}

/// Guard that pops the frame when dropped.
pub struct RenderContext {
    fiber_id: FiberId,
}

impl RenderContext {
    /// Make `fiber` the active render target with its hook cursor at 0.
    ///
    /// The frame is popped when the returned guard is dropped.
    pub(crate) fn enter(fiber: &Fiber) -> Self {
        let fiber_id = fiber.id();
        FRAME_STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                fiber: fiber.clone(),
                cursor: 0,
            });
        });
        Self { fiber_id }
    }

    /// Check if a component render is active.
    pub fn is_active() -> bool {
        FRAME_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The fiber currently rendering, if any.
    pub fn current_fiber() -> Option<Fiber> {
        FRAME_STACK.with(|stack| stack.borrow().last().map(|frame| frame.fiber.clone()))
    }

    /// The hook cursor of the active frame, if any.
    pub fn cursor() -> Option<usize> {
        FRAME_STACK.with(|stack| stack.borrow().last().map(|frame| frame.cursor))
    }

    /// Claim the next hook slot of the active frame.
    ///
    /// # Panics
    ///
    /// Panics when no component is rendering: hooks may only be called from
    /// a component body.
    pub(crate) fn next_slot(hook: &'static str) -> (Fiber, usize) {
        FRAME_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let Some(frame) = stack.last_mut() else {
                panic!("`{hook}` called outside of a component render");
            };
            let index = frame.cursor;
            frame.cursor += 1;
            (frame.fiber.clone(), index)
        })
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        FRAME_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            // Verify we're popping the right frame.
            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.fiber.id(),
                    self.fiber_id,
                    "RenderContext mismatch: expected {:?}, got {:?}",
                    self.fiber_id,
                    frame.fiber.id()
                );
            }
        });
    }
}

/// Guard for one render scope.
struct ScopeGuard;

impl ScopeGuard {
    fn enter() -> Self {
        SCOPE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Whether a render scope is running on this thread.
pub fn render_in_progress() -> bool {
    SCOPE_DEPTH.with(|depth| depth.get() > 0)
}

/// Run `work` as a render scope.
///
/// When the outermost scope succeeds, queued effects run in order; when it
/// fails they are discarded.
pub(crate) fn run_scoped<R>(work: impl FnOnce() -> Result<R>) -> Result<R> {
    let result = {
        let _scope = ScopeGuard::enter();
        work()
    };

    if !render_in_progress() {
        if result.is_ok() {
            flush_effects();
        } else {
            PENDING_EFFECTS.with(|queue| queue.borrow_mut().clear());
        }
    }
    result
}

/// Queue an effect to run after the current scope completes.
pub(crate) fn queue_effect(effect: Box<dyn FnOnce()>) {
    PENDING_EFFECTS.with(|queue| queue.borrow_mut().push_back(effect));
}

fn flush_effects() {
    // Effects may queue more work (a state update inside an effect renders
    // and flushes on its own), so pop one at a time without holding the borrow.
    while let Some(effect) = PENDING_EFFECTS.with(|queue| queue.borrow_mut().pop_front()) {
        trace!("running effect");
        effect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{h, Component, Node};
    use crate::runtime::get_or_create_fiber;
    use std::rc::Rc;

    fn fiber() -> (crate::element::Element, Fiber) {
        let element = h(&Component::new("Sample", |_| Ok(Node::Empty)), None, vec![]);
        let fiber = get_or_create_fiber(&element, None);
        (element, fiber)
    }

    #[test]
    fn context_tracks_fiber() {
        let (_element, fiber) = fiber();

        assert!(!RenderContext::is_active());
        assert!(RenderContext::current_fiber().is_none());

        {
            let _ctx = RenderContext::enter(&fiber);

            assert!(RenderContext::is_active());
            assert_eq!(RenderContext::current_fiber(), Some(fiber.clone()));
            assert_eq!(RenderContext::cursor(), Some(0));
        }

        // Context should be cleaned up after drop
        assert!(!RenderContext::is_active());
        assert!(RenderContext::current_fiber().is_none());
    }

    #[test]
    fn slots_advance_cursor() {
        let (_element, fiber) = fiber();
        let _ctx = RenderContext::enter(&fiber);

        assert_eq!(RenderContext::next_slot("test").1, 0);
        assert_eq!(RenderContext::next_slot("test").1, 1);
        assert_eq!(RenderContext::cursor(), Some(2));
    }

    #[test]
    fn nested_contexts() {
        let (_outer_element, outer) = fiber();
        let (_inner_element, inner) = fiber();

        {
            let _outer_ctx = RenderContext::enter(&outer);
            RenderContext::next_slot("test");

            {
                let _inner_ctx = RenderContext::enter(&inner);
                assert_eq!(RenderContext::current_fiber(), Some(inner.clone()));
                assert_eq!(RenderContext::cursor(), Some(0));
            }

            // After inner context drops, outer should be current
            assert_eq!(RenderContext::current_fiber(), Some(outer.clone()));
            assert_eq!(RenderContext::cursor(), Some(1));
        }

        assert!(RenderContext::current_fiber().is_none());
    }

    #[test]
    fn context_restored_after_panic() {
        let (_element, fiber) = fiber();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ctx = RenderContext::enter(&fiber);
            panic!("component exploded");
        }));

        assert!(result.is_err());
        assert!(!RenderContext::is_active());
    }

    #[test]
    #[should_panic(expected = "`use_state` called outside of a component render")]
    fn slot_outside_render_panics() {
        RenderContext::next_slot("use_state");
    }

    #[test]
    fn effects_run_after_outermost_scope() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_clone = log.clone();
        run_scoped(|| {
            let inner_log = log_clone.clone();
            queue_effect(Box::new(move || inner_log.borrow_mut().push("effect")));
            run_scoped(|| {
                assert!(render_in_progress());
                Ok(())
            })?;
            // Nested scope finishing does not flush.
            log_clone.borrow_mut().push("body");
            Ok(())
        })
        .unwrap();

        assert_eq!(*log.borrow(), vec!["body", "effect"]);
        assert!(!render_in_progress());
    }

    #[test]
    fn failed_scope_discards_effects() {
        let ran = Rc::new(Cell::new(false));
        let ran_clone = ran.clone();
        let result: Result<()> = run_scoped(|| {
            queue_effect(Box::new(move || ran_clone.set(true)));
            Err(crate::Error::component("Sample", "boom"))
        });

        assert!(result.is_err());
        run_scoped(|| Ok(())).unwrap();
        assert!(!ran.get());
    }
}
