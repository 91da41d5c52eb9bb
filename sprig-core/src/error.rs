//! Error types.
//!
//! Failures surface synchronously to whoever started the render: the caller
//! of [`render`](crate::render()), [`update`](crate::update()), or a state
//! updater. Nothing is retried and nothing is rolled back, so a failure in
//! the middle of a patch leaves the host tree partially updated.
//!
//! Programming errors (a hook called outside a component render, hooks
//! called in a different order between renders) are not represented here;
//! they panic.

use thiserror::Error;

use crate::host::HostNodeId;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A failure raised by a [`HostAdapter`](crate::host::HostAdapter).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The adapter has no node with this id (never created, or removed).
    #[error("unknown host node {0}")]
    UnknownNode(HostNodeId),

    /// An element-only operation was applied to a text node.
    #[error("host node {0} is not an element")]
    NotAnElement(HostNodeId),

    /// A positional child operation used an index past the end.
    #[error("child index {index} out of bounds for host node {parent} with {len} children")]
    IndexOutOfBounds {
        parent: HostNodeId,
        index: usize,
        len: usize,
    },

    /// A node used as an insertion anchor is not a child of the parent.
    #[error("host node {node} is not a child of host node {parent}")]
    NotAChild { parent: HostNodeId, node: HostNodeId },

    /// The attribute name is not acceptable to the host.
    #[error("invalid attribute name {0:?}")]
    InvalidAttribute(String),

    /// Any other adapter-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Errors produced by rendering and reconciliation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The host adapter rejected an operation.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A component body reported a failure.
    #[error("component `{component}` failed: {message}")]
    Component { component: String, message: String },

    /// An element that should have been mounted has no host node.
    #[error("element `{kind}` has no host node; it was never mounted")]
    Unmounted { kind: String },

    /// A state updater was invoked while a render pass was running.
    #[error("state update requested while a render is in progress")]
    UpdateDuringRender,
}

impl Error {
    /// Build a component fault with the component's name.
    pub fn component(component: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Component {
            component: component.into(),
            message: message.to_string(),
        }
    }
}
