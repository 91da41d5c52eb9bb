//! Component Runtime
//!
//! Everything that happens while a component renders: the fiber store that
//! keeps per-occurrence state alive between renders, the render context
//! that tells hooks which fiber and slot they belong to, and component
//! invocation itself.
//!
//! # Concepts
//!
//! ## Fibers
//!
//! A fiber is created the first time a component element renders and is
//! reused for as long as that occurrence stays in the tree. It stores the
//! hook slots, where the output was mounted, and the last output.
//!
//! ## Render Context
//!
//! A thread-local stack with one frame per component render in flight.
//! Hooks claim slots from the top frame in call order, which is why hooks
//! must be called unconditionally and in the same order on every render.
//!
//! ## Render Scopes
//!
//! Top-level operations (initial mount, reconcile, state update) run inside
//! a render scope. State updates are refused while a scope is running, and
//! effects queued inside a scope run when the outermost scope ends.

mod component;
mod context;
mod fiber;

pub use component::render_component;
pub use context::{render_in_progress, RenderContext};
pub use fiber::{get_or_create_fiber, Fiber, FiberId, MountPoint};

pub(crate) use component::{invoke, rerender};
pub(crate) use context::{queue_effect, run_scoped};
pub(crate) use fiber::WeakFiber;
