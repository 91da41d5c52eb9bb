//! Render pass: mount a description tree into a host container.
//!
//! Every host node created here is recorded on the node that describes it
//! (text leaves included), which is what lets the reconciler find the host
//! node to patch later. Component elements contribute no host node of their
//! own: their output is mounted in their place, and the component element
//! takes the host reference of that output.

use tracing::{debug, trace};

use crate::element::{ElementKind, Node, WeakElement};
use crate::error::Result;
use crate::host::{Host, HostNodeId};
use crate::reconcile::props;
use crate::runtime::{invoke, run_scoped, MountPoint};

/// Mount `node` as the last child of `container`.
///
/// Effects queued by components in the tree run after the whole tree is in
/// the host. On error the host may hold a partially mounted tree.
pub fn render(host: &Host, node: &Node, container: HostNodeId) -> Result<()> {
    debug!(node = node.describe(), %container, "render");
    run_scoped(|| mount(host, node, container, &WeakElement::default(), 0, None))
}

/// Mount `node` into `container`, in front of `anchor` or last when there is
/// no anchor.
///
/// `parent` and `position` say where the node sits in the description tree:
/// the intrinsic element whose children hold it (empty at the top level)
/// and its index there. Components remember both so a state update can find
/// the next mounted sibling again.
pub(crate) fn mount(
    host: &Host,
    node: &Node,
    container: HostNodeId,
    parent: &WeakElement,
    position: usize,
    anchor: Option<HostNodeId>,
) -> Result<()> {
    match node {
        Node::Empty => Ok(()),
        Node::Text(text) => {
            let id = host.create_text(text.content())?;
            text.set_host(Some(id));
            host.insert_before(container, id, anchor)
        }
        Node::Element(element) => match element.kind() {
            ElementKind::Component(_) => {
                let mount_point = MountPoint::within(host, container, parent, position);
                let output = invoke(element, Some(mount_point))?;
                mount(host, &output, container, parent, position, anchor)?;
                element.set_host(output.host());
                Ok(())
            }
            ElementKind::Tag(tag) => {
                let id = host.create_element(tag)?;
                element.set_host(Some(id));
                props::apply(host, id, element.attributes())?;
                let this = element.downgrade();
                for (index, child) in element.children().iter().enumerate() {
                    mount(host, child, id, &this, index, None)?;
                }
                trace!(tag = %tag, node = %id, "mounted element");
                host.insert_before(container, id, anchor)
            }
        },
    }
}
