//! Top-level render root.

use tracing::debug;

use crate::element::{Node, WeakElement};
use crate::error::Result;
use crate::host::{Host, HostNodeId};
use crate::reconcile::{reconcile, unmount};
use crate::render::mount;
use crate::runtime::run_scoped;

/// Owns the tree rendered into one host container.
///
/// The first [`render`](Root::render) mounts after whatever the container
/// already holds; every later one reconciles
/// against the previous tree, so component state survives re-renders of
/// the root.
///
/// ```rust,ignore
/// let doc = Rc::new(RefCell::new(MemoryDocument::new()));
/// let container = doc.borrow_mut().create_root();
/// let mut root = Root::new(Host::new(doc.clone()), container);
///
/// root.render(h("h1", None, vec!["Hello".into()]))?;
/// root.render(h("h1", None, vec!["Hello again".into()]))?;
/// ```
#[derive(Debug)]
pub struct Root {
    host: Host,
    container: HostNodeId,
    current: Node,
}

impl Root {
    pub fn new(host: Host, container: HostNodeId) -> Self {
        Self {
            host,
            container,
            current: Node::Empty,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn container(&self) -> HostNodeId {
        self.container
    }

    /// The tree most recently rendered.
    pub fn current(&self) -> &Node {
        &self.current
    }

    /// Render `node` into the container.
    ///
    /// On error the previous tree stays current, though the host may have
    /// been partially patched.
    pub fn render(&mut self, node: impl Into<Node>) -> Result<()> {
        let next = node.into();
        let (host, container) = (&self.host, self.container);

        if self.current.is_empty() {
            debug!(%container, node = next.describe(), "initial root render");
            run_scoped(|| mount(host, &next, container, &WeakElement::default(), 0, None))?;
        } else {
            debug!(%container, node = next.describe(), "root re-render");
            let prev = &self.current;
            let top = WeakElement::default();
            run_scoped(|| reconcile(host, container, &top, prev, &next, 0, None))?;
        }

        self.current = next;
        Ok(())
    }

    /// Remove the current tree from the container.
    pub fn unmount(&mut self) -> Result<()> {
        let prev = std::mem::take(&mut self.current);
        debug!(container = %self.container, node = prev.describe(), "unmount root");
        let (host, container) = (&self.host, self.container);
        run_scoped(|| unmount(host, &prev, container, 0))
    }
}
