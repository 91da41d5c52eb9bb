//! Fiber Store
//!
//! A [`Fiber`] is the persistent record behind one occurrence of a
//! component in the tree. It outlives any single render: hook slots, the
//! place the component was mounted, and the output of its last render all
//! live here so a state update can re-render and patch without the caller
//! supplying anything.
//!
//! # Ownership
//!
//! The component element owns its fiber; the fiber only holds a weak
//! reference back to the element. Once the element is unmounted or dropped
//! the fiber is retired and state updates aimed at it are ignored.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use tracing::trace;

use crate::element::{Element, Node, WeakElement};
use crate::host::{Host, HostNodeId};

/// Unique identifier for a fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId(u64);

impl FiberId {
    /// Generate a new unique fiber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for FiberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a component's output was last mounted.
#[derive(Debug, Clone)]
pub struct MountPoint {
    /// Host the output lives in.
    pub host: Host,
    /// Container the output was rendered into.
    pub container: HostNodeId,
    /// Index of the component among its parent element's children.
    ///
    /// This counts description nodes, not host nodes: a sibling that
    /// rendered nothing still takes a position.
    pub position: usize,
    /// The intrinsic element whose children hold this position. Empty at
    /// the top level of a container.
    pub(crate) parent: WeakElement,
}

impl MountPoint {
    /// A top-level mount point.
    pub fn new(host: Host, container: HostNodeId, position: usize) -> Self {
        Self {
            host,
            container,
            position,
            parent: WeakElement::default(),
        }
    }

    pub(crate) fn within(
        host: &Host,
        container: HostNodeId,
        parent: &WeakElement,
        position: usize,
    ) -> Self {
        Self {
            host: host.clone(),
            container,
            position,
            parent: parent.clone(),
        }
    }

    /// The first host node mounted by a later sibling, which is where new
    /// output for this position goes in front of. `None` means append.
    pub(crate) fn next_sibling_host(&self) -> Option<HostNodeId> {
        let parent = self.parent.upgrade()?;
        let later = parent.children().get(self.position + 1..)?;
        later.iter().find_map(Node::mounted_host)
    }
}

/// A hook slot. Each hook kind stores its own state type behind it.
pub(crate) type HookSlot = Rc<dyn Any>;

struct FiberState {
    id: FiberId,
    name: Rc<str>,
    hooks: SmallVec<[HookSlot; 4]>,
    owner: WeakElement,
    mount: Option<MountPoint>,
    last_output: Node,
    render_count: usize,
    retired: bool,
}

/// Persistent per-occurrence component record.
///
/// Cloning shares the record.
#[derive(Clone)]
pub struct Fiber(Rc<RefCell<FiberState>>);

impl Fiber {
    fn new(owner: &Element) -> Self {
        let name = owner.kind().name();
        Self(Rc::new(RefCell::new(FiberState {
            id: FiberId::new(),
            name: Rc::from(name),
            hooks: SmallVec::new(),
            owner: owner.downgrade(),
            mount: None,
            last_output: Node::Empty,
            render_count: 0,
            retired: false,
        })))
    }

    pub fn id(&self) -> FiberId {
        self.0.borrow().id
    }

    /// Name of the component this fiber renders.
    pub fn name(&self) -> Rc<str> {
        self.0.borrow().name.clone()
    }

    /// Number of hook slots allocated so far.
    pub fn hook_count(&self) -> usize {
        self.0.borrow().hooks.len()
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> usize {
        self.0.borrow().render_count
    }

    /// Output of the most recent successful render.
    pub fn last_output(&self) -> Node {
        self.0.borrow().last_output.clone()
    }

    /// The element currently associated with this fiber, if still alive.
    pub fn owner(&self) -> Option<Element> {
        self.0.borrow().owner.upgrade()
    }

    /// Where the output was last mounted.
    pub fn mount(&self) -> Option<MountPoint> {
        self.0.borrow().mount.clone()
    }

    /// Whether the owning element was unmounted.
    pub fn is_retired(&self) -> bool {
        self.0.borrow().retired
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakFiber {
        WeakFiber(Rc::downgrade(&self.0))
    }

    pub(crate) fn hook(&self, index: usize) -> Option<HookSlot> {
        self.0.borrow().hooks.get(index).cloned()
    }

    pub(crate) fn push_hook(&self, index: usize, slot: HookSlot) {
        let mut state = self.0.borrow_mut();
        debug_assert_eq!(index, state.hooks.len(), "hook slots are allocated in call order");
        state.hooks.push(slot);
    }

    pub(crate) fn replace_hook(&self, index: usize, slot: HookSlot) {
        self.0.borrow_mut().hooks[index] = slot;
    }

    /// Point the mount at a new parent element, keeping the container.
    pub(crate) fn rebind(&self, parent: &WeakElement, position: usize) {
        if let Some(mount) = self.0.borrow_mut().mount.as_mut() {
            mount.parent = parent.clone();
            mount.position = position;
        }
    }

    pub(crate) fn finish_render(&self, output: Node) {
        let mut state = self.0.borrow_mut();
        state.last_output = output;
        state.render_count += 1;
    }

    /// Detach from the tree: drop hooks, output, owner and mount point.
    pub(crate) fn retire(&self) {
        let mut state = self.0.borrow_mut();
        trace!(fiber = state.id.raw(), component = %state.name, "retiring fiber");
        state.hooks.clear();
        state.last_output = Node::Empty;
        state.owner = WeakElement::default();
        state.mount = None;
        state.retired = true;
    }
}

impl PartialEq for Fiber {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Fiber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("Fiber")
            .field("id", &state.id)
            .field("name", &state.name)
            .field("hooks", &state.hooks.len())
            .field("render_count", &state.render_count)
            .field("retired", &state.retired)
            .finish()
    }
}

/// Non-owning fiber handle held by state updaters.
#[derive(Clone)]
pub(crate) struct WeakFiber(Weak<RefCell<FiberState>>);

impl WeakFiber {
    pub(crate) fn upgrade(&self) -> Option<Fiber> {
        self.0.upgrade().map(Fiber)
    }
}

/// Return the fiber attached to `element`, creating one on first render.
///
/// An existing fiber has its owner refreshed to `element`. The mount point
/// is replaced when one is given and kept otherwise, so a detached render
/// of a mounted component does not cut it off from its host.
pub fn get_or_create_fiber(element: &Element, mount: Option<MountPoint>) -> Fiber {
    let fiber = match element.fiber() {
        Some(fiber) => fiber,
        None => {
            let fiber = Fiber::new(element);
            trace!(fiber = fiber.id().raw(), component = element.kind().name(), "created fiber");
            element.set_fiber(Some(fiber.clone()));
            fiber
        }
    };

    {
        let mut state = fiber.0.borrow_mut();
        state.owner = element.downgrade();
        state.retired = false;
        if mount.is_some() {
            state.mount = mount;
        }
    }
    fiber
}
