//! Sprig Core
//!
//! This crate provides the core of the Sprig retained-mode UI engine.
//! It implements:
//!
//! - An element tree builder (intrinsic tags, function components, text)
//! - A fiber store holding per-component state between renders
//! - Hooks (state, reducer, ref, memo, callback, effect)
//! - A render pass that mounts trees into a host
//! - A reconciler that patches the host from one tree to the next
//!
//! The host tree itself sits behind the [`HostAdapter`] trait; an in-memory
//! implementation, [`MemoryDocument`], ships with the crate.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `element`: Element descriptions and the `h` builder
//! - `runtime`: Fibers, the render context and component invocation
//! - `hooks`: Ordered-slot state primitives for component bodies
//! - `render`: Initial mount
//! - `reconcile`: Tree diffing and host patching
//! - `host`: The host adapter boundary and the in-memory document
//!
//! Everything is single-threaded and synchronous: a render, a reconcile or
//! a state update has finished patching the host when the call returns.
//!
//! # Example
//!
//! ```rust,ignore
//! use sprig_core::{attrs, h, use_state, Component, EventHandler, Host, MemoryDocument, Root};
//!
//! let counter = Component::new("Counter", |_| {
//!     let (count, set_count) = use_state(0);
//!     let on_click = EventHandler::new(move |_| {
//!         let _ = set_count.update(|count| count + 1);
//!     });
//!     Ok(h("button", attrs([("onClick", on_click)]), vec![count.into()]).into())
//! });
//!
//! let doc = Rc::new(RefCell::new(MemoryDocument::new()));
//! let container = doc.borrow_mut().create_root();
//! let mut root = Root::new(Host::new(doc.clone()), container);
//! root.render(h(&counter, None, vec![]))?;
//!
//! let button = doc.borrow().find_by_tag(container, "button").unwrap();
//! MemoryDocument::click(&doc, button)?;
//! assert_eq!(doc.borrow().inner_html(container)?, "<button>1</button>");
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod hooks;
pub mod host;
pub mod reconcile;
pub mod render;
pub mod root;
pub mod runtime;

pub use config::Config;
pub use element::{
    attrs, h, text, AttrValue, Attributes, Child, Component, Element, ElementKind, EventHandler,
    Key, Node, Props, Text,
};
pub use error::{Error, HostError, Result};
pub use hooks::{
    use_callback, use_effect, use_memo, use_reducer, use_reducer_with_init, use_ref, use_state,
    use_state_with, Dispatch, HookRef, Setter,
};
pub use host::{Event, Host, HostAdapter, HostNodeId, MemoryDocument, Snapshot};
pub use reconcile::{reconcile_at, update, Operation};
pub use render::render;
pub use root::Root;
pub use runtime::{get_or_create_fiber, render_component, Fiber, FiberId, MountPoint};
