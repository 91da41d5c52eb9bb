//! Element Tree
//!
//! Immutable descriptions of the UI: intrinsic elements, component
//! invocations and text leaves, plus the builder that produces them.
//!
//! Elements are cheap to clone (reference-counted) and never change after
//! construction, apart from the host and fiber back-references the render
//! pass attaches to them.

mod attr;
mod builder;
mod node;

pub use attr::{attrs, AttrValue, Attributes, EventHandler, Props};
pub use builder::{h, text, Child};
pub use node::{Component, Element, ElementKind, Key, Node, Text};

pub(crate) use node::WeakElement;
