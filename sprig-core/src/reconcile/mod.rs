//! Reconciler
//!
//! Brings a mounted host subtree from the tree it was rendered from to a
//! newly rendered tree, one position at a time.
//!
//! # Operations
//!
//! | prev    | next                 | operation |
//! |---------|----------------------|-----------|
//! | empty   | present              | [`Operation::Mount`] |
//! | present | empty                | [`Operation::Unmount`] |
//! | present | present, same type   | [`Operation::Update`] |
//! | present | present, other type  | [`Operation::Replace`] |
//!
//! Two text leaves are always the same type. Two elements are the same type
//! when they have the same kind and the same key. Reconciling a node with
//! itself (the same handle) does nothing.
//!
//! # Updates
//!
//! Updating an intrinsic element patches its attributes (see [`props`]) and
//! then reconciles its children position by position, up to the longer of
//! the two child lists. Updating a component element moves its fiber from
//! the old element to the new one, renders it, and reconciles the old
//! output against the new. If that fails the fiber goes back to the old
//! element.
//!
//! Children are matched by position only; keys decide whether a position
//! is patched or replaced, never where a child moves to.
//!
//! # Placement
//!
//! Host nodes are placed relative to the host nodes actually mounted, not
//! by description index: a child that rendered nothing takes no host slot.
//! A fresh node goes in front of the first host node mounted by a later
//! sibling, or last when no later sibling has one. A replacement goes in
//! front of the host node it replaces.

pub(crate) mod props;

use tracing::{debug, trace};

use crate::element::{Element, ElementKind, Node, Text, WeakElement};
use crate::error::{Error, Result};
use crate::host::{Host, HostNodeId};
use crate::render::mount;
use crate::runtime::{get_or_create_fiber, invoke, run_scoped, Fiber, MountPoint};

/// What reconciling one position does to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Nothing to do.
    None,
    /// Render the next node fresh.
    Mount,
    /// Detach the previous node.
    Unmount,
    /// Patch the previous host node in place.
    Update,
    /// Unmount the previous node, then mount the next one in its place.
    Replace,
}

impl Operation {
    /// Classify the change from `prev` to `next`.
    pub fn between(prev: &Node, next: &Node) -> Self {
        match (prev, next) {
            (Node::Empty, Node::Empty) => Self::None,
            (Node::Empty, _) => Self::Mount,
            (_, Node::Empty) => Self::Unmount,
            _ if prev.ptr_eq(next) => Self::None,
            (Node::Text(_), Node::Text(_)) => Self::Update,
            (Node::Element(a), Node::Element(b)) if a.same_type(b) => Self::Update,
            _ => Self::Replace,
        }
    }
}

/// Reconcile the first child position of `container` from `prev` to `next`.
///
/// This is the entry point for a caller driving its own top-level
/// re-render: `prev` must be the tree last rendered into `container`.
pub fn update(host: &Host, container: HostNodeId, prev: &Node, next: &Node) -> Result<()> {
    reconcile_at(host, container, prev, next, 0)
}

/// Reconcile child position `index` of `container` from `prev` to `next`.
///
/// A replacement takes the place of the host node it replaces; a node
/// mounted where nothing was mounted before goes after the container's
/// existing children. `index` locates a text leaf that lost its host
/// reference.
pub fn reconcile_at(
    host: &Host,
    container: HostNodeId,
    prev: &Node,
    next: &Node,
    index: usize,
) -> Result<()> {
    run_scoped(|| reconcile(host, container, &WeakElement::default(), prev, next, index, None))
}

/// Reconcile one child position.
///
/// `parent` is the intrinsic element whose children hold the position
/// (empty at the top level). `anchor` is the first host node mounted by a
/// later sibling; new host nodes go in front of it, or last without one.
pub(crate) fn reconcile(
    host: &Host,
    container: HostNodeId,
    parent: &WeakElement,
    prev: &Node,
    next: &Node,
    index: usize,
    anchor: Option<HostNodeId>,
) -> Result<()> {
    let operation = Operation::between(prev, next);
    if operation == Operation::None {
        rebind(next, parent, index);
        return Ok(());
    }

    if let (Node::Element(prev), Node::Element(next)) = (prev, next) {
        next.set_host(prev.host());
    }

    match operation {
        Operation::None => Ok(()),
        Operation::Mount => {
            debug!(node = next.describe(), %container, index, "mount");
            mount(host, next, container, parent, index, anchor)
        }
        Operation::Unmount => {
            debug!(node = prev.describe(), %container, index, "unmount");
            unmount(host, prev, container, index)
        }
        Operation::Update => patch(host, container, parent, prev, next, index, anchor),
        Operation::Replace => {
            debug!(
                prev = prev.describe(),
                next = next.describe(),
                %container,
                index,
                "replace"
            );
            match prev.mounted_host() {
                Some(current) => {
                    mount(host, next, container, parent, index, Some(current))?;
                    unmount(host, prev, container, index)
                }
                None => {
                    unmount(host, prev, container, index)?;
                    mount(host, next, container, parent, index, anchor)
                }
            }
        }
    }
}

/// Record a new parent for a reused component element and the components
/// it rendered in its place.
fn rebind(node: &Node, parent: &WeakElement, position: usize) {
    let Node::Element(element) = node else {
        return;
    };
    if let Some(fiber) = element.fiber() {
        fiber.rebind(parent, position);
        rebind(&fiber.last_output(), parent, position);
    }
}

fn patch(
    host: &Host,
    container: HostNodeId,
    parent: &WeakElement,
    prev: &Node,
    next: &Node,
    index: usize,
    anchor: Option<HostNodeId>,
) -> Result<()> {
    match (prev, next) {
        (Node::Text(prev), Node::Text(next)) => patch_text(host, container, prev, next, index),
        (Node::Element(prev), Node::Element(next)) => match next.kind() {
            ElementKind::Tag(_) => patch_element(host, prev, next),
            ElementKind::Component(_) => {
                patch_component(host, container, parent, prev, next, index, anchor)
            }
        },
        _ => Ok(()),
    }
}

fn patch_text(
    host: &Host,
    container: HostNodeId,
    prev: &Text,
    next: &Text,
    index: usize,
) -> Result<()> {
    next.set_host(prev.host());
    if prev.content() == next.content() {
        return Ok(());
    }

    trace!(%container, index, text = next.content(), "patch text");
    match prev.host() {
        Some(id) => host.set_text(id, next.content()),
        None => {
            host.remove_child_at(container, index)?;
            let id = host.create_text(next.content())?;
            next.set_host(Some(id));
            host.insert_child(container, id, index)
        }
    }
}

fn patch_element(host: &Host, prev: &Element, next: &Element) -> Result<()> {
    let id = next.host().ok_or_else(|| Error::Unmounted {
        kind: next.kind().name().to_string(),
    })?;
    props::patch(host, id, prev.attributes(), next.attributes())?;

    let empty = Node::Empty;
    let parent = next.downgrade();
    let (before, after) = (prev.children(), next.children());
    for index in 0..before.len().max(after.len()) {
        let prev_child = before.get(index).unwrap_or(&empty);
        let next_child = after.get(index).unwrap_or(&empty);
        let anchor = before.get(index + 1..).and_then(first_mounted);
        reconcile(host, id, &parent, prev_child, next_child, index, anchor)?;
    }
    Ok(())
}

/// First host node mounted by any of `nodes`, in order.
pub(crate) fn first_mounted(nodes: &[Node]) -> Option<HostNodeId> {
    nodes.iter().find_map(Node::mounted_host)
}

/// Re-render a component element in place of `prev`.
///
/// The fiber stays with `prev` until the new output is patched in, so a
/// render that fails leaves `prev` able to render again.
fn patch_component(
    host: &Host,
    container: HostNodeId,
    parent: &WeakElement,
    prev: &Element,
    next: &Element,
    index: usize,
    anchor: Option<HostNodeId>,
) -> Result<()> {
    let fiber = prev.fiber();
    let saved_mount = fiber.as_ref().and_then(Fiber::mount);
    let previous = fiber.as_ref().map(Fiber::last_output).unwrap_or_default();
    next.set_fiber(fiber.clone());

    let mount_point = MountPoint::within(host, container, parent, index);
    let result = invoke(next, Some(mount_point)).and_then(|output| {
        reconcile(host, container, parent, &previous, &output, index, anchor)?;
        Ok(output)
    });

    match result {
        Ok(output) => {
            prev.set_fiber(None);
            next.set_host(output.host());
            Ok(())
        }
        Err(err) => {
            next.set_fiber(None);
            next.set_host(None);
            if fiber.is_some() {
                get_or_create_fiber(prev, saved_mount);
            }
            Err(err)
        }
    }
}

/// Detach `node` and everything below it from the host.
pub(crate) fn unmount(host: &Host, node: &Node, container: HostNodeId, index: usize) -> Result<()> {
    match node {
        Node::Empty => Ok(()),
        Node::Text(text) => {
            match text.host() {
                Some(id) => host.remove_node(id)?,
                None => host.remove_child_at(container, index)?,
            }
            text.set_host(None);
            Ok(())
        }
        Node::Element(element) => match element.kind() {
            ElementKind::Component(_) => {
                let output = retire(element);
                unmount(host, &output, container, index)
            }
            ElementKind::Tag(_) => {
                let id = element.host().ok_or_else(|| Error::Unmounted {
                    kind: element.kind().name().to_string(),
                })?;
                host.remove_node(id)?;
                release(node);
                Ok(())
            }
        },
    }
}

/// Detach a component element from its fiber, retiring the fiber.
///
/// Returns the fiber's last output, which is still mounted.
fn retire(element: &Element) -> Node {
    element.set_host(None);
    match element.take_fiber() {
        Some(fiber) => {
            let output = fiber.last_output();
            fiber.retire();
            output
        }
        None => Node::Empty,
    }
}

/// Forget host references and retire fibers below a subtree whose host
/// nodes are already gone.
fn release(node: &Node) {
    match node {
        Node::Empty => {}
        Node::Text(text) => text.set_host(None),
        Node::Element(element) => match element.kind() {
            ElementKind::Component(_) => release(&retire(element)),
            ElementKind::Tag(_) => {
                element.set_host(None);
                for child in element.children() {
                    release(child);
                }
            }
        },
    }
}
