//! Host Adapter
//!
//! The render pass and the reconciler never touch a concrete host tree.
//! Every mutation goes through the [`HostAdapter`] trait: create element and
//! text nodes, place and remove them, set and remove attributes, and
//! register and unregister event listeners.
//!
//! # Sharing
//!
//! State updaters must be able to re-render long after the initial mount,
//! so the adapter lives behind a shared [`Host`] handle that fibers keep a
//! clone of. The handle borrows the adapter for exactly one call at a time
//! and never while user code (a component body or an event handler) runs.
//!
//! # Node Identity
//!
//! Host nodes are identified by [`HostNodeId`], an opaque handle issued by
//! the adapter. Ids are process-unique so an id from one adapter can never
//! alias a node of another.

mod memory;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::config::Config;
use crate::element::EventHandler;
use crate::error::{HostError, Result};

pub use memory::{MemoryDocument, Snapshot};

/// Opaque handle to a node in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HostNodeId(u64);

impl HostNodeId {
    /// Allocate a new unique id.
    ///
    /// Adapters call this when they create a node.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for HostNodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An event delivered to an [`EventHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name, e.g. `click`.
    pub name: String,

    /// The host node the event was dispatched on.
    pub target: HostNodeId,
}

/// Mutation primitives of a host tree.
///
/// Positional operations count children of the given parent, including
/// text nodes. `insert_child` with an index at or past the end appends.
pub trait HostAdapter {
    /// Create a detached element node for an intrinsic tag.
    fn create_element(&mut self, tag: &str) -> Result<HostNodeId, HostError>;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> Result<HostNodeId, HostError>;

    /// Replace the content of a text node.
    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError>;

    /// Insert `child` into `parent` before the child currently at `index`.
    fn insert_child(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        index: usize,
    ) -> Result<(), HostError>;

    /// Insert `child` into `parent` right before `anchor`, or last when
    /// `anchor` is `None`. `anchor` must be a child of `parent`.
    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        anchor: Option<HostNodeId>,
    ) -> Result<(), HostError>;

    /// Detach a node (and its subtree) from its parent.
    fn remove_node(&mut self, node: HostNodeId) -> Result<(), HostError>;

    /// Detach the child of `parent` at `index`.
    fn remove_child_at(&mut self, parent: HostNodeId, index: usize) -> Result<(), HostError>;

    /// Set a plain attribute.
    fn set_attribute(&mut self, node: HostNodeId, name: &str, value: &str)
        -> Result<(), HostError>;

    /// Remove a plain attribute. Removing an absent attribute is not an error.
    fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError>;

    /// Register a listener for `event`.
    fn add_event_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError>;

    /// Unregister a listener previously registered with the same handler.
    fn remove_event_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;
}

/// Shared handle to a host adapter plus the engine configuration.
#[derive(Clone)]
pub struct Host {
    adapter: Rc<RefCell<dyn HostAdapter>>,
    config: Rc<Config>,
}

impl Host {
    /// Wrap an adapter with the default configuration.
    pub fn new<A: HostAdapter + 'static>(adapter: Rc<RefCell<A>>) -> Self {
        Self::with_config(adapter, Config::default())
    }

    /// Wrap an adapter with a custom configuration.
    pub fn with_config<A: HostAdapter + 'static>(adapter: Rc<RefCell<A>>, config: Config) -> Self {
        Self {
            adapter,
            config: Rc::new(config),
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether two handles drive the same adapter.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.adapter, &other.adapter)
    }

    fn call<R>(&self, op: impl FnOnce(&mut dyn HostAdapter) -> Result<R, HostError>) -> Result<R> {
        let mut adapter = self.adapter.borrow_mut();
        Ok(op(&mut *adapter)?)
    }

    pub(crate) fn create_element(&self, tag: &str) -> Result<HostNodeId> {
        self.call(|a| a.create_element(tag))
    }

    pub(crate) fn create_text(&self, text: &str) -> Result<HostNodeId> {
        self.call(|a| a.create_text(text))
    }

    pub(crate) fn set_text(&self, node: HostNodeId, text: &str) -> Result<()> {
        self.call(|a| a.set_text(node, text))
    }

    pub(crate) fn append_child(&self, parent: HostNodeId, child: HostNodeId) -> Result<()> {
        self.call(|a| a.append_child(parent, child))
    }

    pub(crate) fn insert_child(
        &self,
        parent: HostNodeId,
        child: HostNodeId,
        index: usize,
    ) -> Result<()> {
        self.call(|a| a.insert_child(parent, child, index))
    }

    pub(crate) fn insert_before(
        &self,
        parent: HostNodeId,
        child: HostNodeId,
        anchor: Option<HostNodeId>,
    ) -> Result<()> {
        self.call(|a| a.insert_before(parent, child, anchor))
    }

    pub(crate) fn remove_node(&self, node: HostNodeId) -> Result<()> {
        self.call(|a| a.remove_node(node))
    }

    pub(crate) fn remove_child_at(&self, parent: HostNodeId, index: usize) -> Result<()> {
        self.call(|a| a.remove_child_at(parent, index))
    }

    pub(crate) fn set_attribute(&self, node: HostNodeId, name: &str, value: &str) -> Result<()> {
        self.call(|a| a.set_attribute(node, name, value))
    }

    pub(crate) fn remove_attribute(&self, node: HostNodeId, name: &str) -> Result<()> {
        self.call(|a| a.remove_attribute(node, name))
    }

    pub(crate) fn add_event_listener(
        &self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<()> {
        self.call(|a| a.add_event_listener(node, event, handler.clone()))
    }

    pub(crate) fn remove_event_listener(
        &self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<()> {
        self.call(|a| a.remove_event_listener(node, event, handler))
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
