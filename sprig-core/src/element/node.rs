//! Element Nodes
//!
//! The immutable description of a UI tree. A [`Node`] is empty, a text
//! leaf, or an [`Element`]: an intrinsic tag or a component invocation with
//! attributes and children.
//!
//! # Identity
//!
//! [`Element`] and [`Text`] are reference-counted handles. Cloning shares the
//! node, and [`Node::ptr_eq`] tells whether two positions hold the very same
//! node, which lets the reconciler skip an unchanged subtree outright.
//!
//! # Back-references
//!
//! Two fields are written after construction: the host node the element
//! (or text leaf) produced once mounted, and for component elements the
//! [`Fiber`] holding its hook state. They are attach points for the render
//! pass and the reconciler and take no part in equality.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::attr::{number_text, AttrValue, Attributes, Props};
use crate::error::Result;
use crate::host::HostNodeId;
use crate::runtime::Fiber;

type RenderFn = dyn for<'a> Fn(Props<'a>) -> Result<Node>;

/// A function component.
///
/// Two components are the same kind when they wrap the same function
/// allocation, so create a component once and reuse the handle.
///
/// ```rust,ignore
/// let greeting = Component::new("Greeting", |props| {
///     Ok(h("p", None, vec![props.str("name").unwrap_or("you").into()]).into())
/// });
/// ```
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    /// Wrap a render function under a display name.
    pub fn new<F>(name: &str, render: F) -> Self
    where
        F: for<'a> Fn(Props<'a>) -> Result<Node> + 'static,
    {
        Self {
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    /// Display name, used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, props: Props<'_>) -> Result<Node> {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

/// What an element stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// An intrinsic host tag such as `div`.
    Tag(String),
    /// A function component.
    Component(Component),
}

impl ElementKind {
    /// Tag or component name.
    pub fn name(&self) -> &str {
        match self {
            Self::Tag(tag) => tag,
            Self::Component(component) => component.name(),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl From<Component> for ElementKind {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<&Component> for ElementKind {
    fn from(component: &Component) -> Self {
        Self::Component(component.clone())
    }
}

/// Identity hint extracted from the `key` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl Key {
    pub(crate) fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Str(value) => Some(Self::Str(value.clone())),
            AttrValue::Int(value) => Some(Self::Int(*value)),
            AttrValue::Float(value) => Some(Self::Str(number_text(*value))),
            AttrValue::Bool(value) => Some(Self::Str(value.to_string())),
            AttrValue::Handler(_) => None,
        }
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self::Str(key.to_string())
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Self::Int(key)
    }
}

pub(crate) struct ElementData {
    kind: ElementKind,
    attributes: Option<Attributes>,
    children: Vec<Node>,
    key: Option<Key>,
    host: Cell<Option<HostNodeId>>,
    fiber: RefCell<Option<Fiber>>,
}

/// An intrinsic or component element.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

impl Element {
    pub(crate) fn from_parts(
        kind: ElementKind,
        attributes: Option<Attributes>,
        children: Vec<Node>,
        key: Option<Key>,
    ) -> Self {
        Self(Rc::new(ElementData {
            kind,
            attributes,
            children,
            key,
            host: Cell::new(None),
            fiber: RefCell::new(None),
        }))
    }

    pub fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    /// The tag, for intrinsic elements.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            ElementKind::Tag(tag) => Some(tag),
            ElementKind::Component(_) => None,
        }
    }

    /// The component, for component elements.
    pub fn component(&self) -> Option<&Component> {
        match &self.0.kind {
            ElementKind::Tag(_) => None,
            ElementKind::Component(component) => Some(component),
        }
    }

    /// Attributes, without `key`. `None` when built with no mapping at all.
    pub fn attributes(&self) -> Option<&Attributes> {
        self.0.attributes.as_ref()
    }

    /// Attributes as handed to a component function.
    pub fn props(&self) -> Props<'_> {
        Props::new(self.0.attributes.as_ref())
    }

    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.0.key.as_ref()
    }

    /// The host node produced when this element was mounted.
    ///
    /// For a component element this is the host node of its rendered output.
    pub fn host(&self) -> Option<HostNodeId> {
        self.0.host.get()
    }

    /// The fiber attached to a component element.
    pub fn fiber(&self) -> Option<Fiber> {
        self.0.fiber.borrow().clone()
    }

    /// Whether two handles are the same element.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Same kind and same key: the reconciler may patch one into the other.
    pub fn same_type(&self, other: &Self) -> bool {
        self.0.kind == other.0.kind && self.0.key == other.0.key
    }

    pub(crate) fn set_host(&self, host: Option<HostNodeId>) {
        self.0.host.set(host);
    }

    pub(crate) fn set_fiber(&self, fiber: Option<Fiber>) {
        *self.0.fiber.borrow_mut() = fiber;
    }

    pub(crate) fn take_fiber(&self) -> Option<Fiber> {
        self.0.fiber.borrow_mut().take()
    }

    pub(crate) fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.kind == other.0.kind
                && self.0.key == other.0.key
                && self.0.attributes == other.0.attributes
                && self.0.children == other.0.children)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Element");
        out.field("kind", &self.0.kind);
        if let Some(key) = &self.0.key {
            out.field("key", key);
        }
        out.field("attributes", &self.0.attributes)
            .field("children", &self.0.children)
            .finish()
    }
}

/// Non-owning handle to an element, held by its fiber.
#[derive(Clone, Default)]
pub(crate) struct WeakElement(Weak<ElementData>);

impl WeakElement {
    pub(crate) fn upgrade(&self) -> Option<Element> {
        self.0.upgrade().map(Element)
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(element) => write!(f, "WeakElement({})", element.kind().name()),
            None => f.write_str("WeakElement(<dropped>)"),
        }
    }
}

struct TextData {
    content: String,
    host: Cell<Option<HostNodeId>>,
}

/// A text leaf.
#[derive(Clone)]
pub struct Text(Rc<TextData>);

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self(Rc::new(TextData {
            content: content.into(),
            host: Cell::new(None),
        }))
    }

    pub fn content(&self) -> &str {
        &self.0.content
    }

    /// The host text node, once mounted.
    pub fn host(&self) -> Option<HostNodeId> {
        self.0.host.get()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn set_host(&self, host: Option<HostNodeId>) {
        self.0.host.set(host);
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.0.content == other.0.content
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0.content, f)
    }
}

/// One position of a tree: nothing, a text leaf, or an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Node {
    #[default]
    Empty,
    Text(Text),
    Element(Element),
}

impl Node {
    /// A text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(Text::new(content))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Host node produced by this position, if mounted.
    pub fn host(&self) -> Option<HostNodeId> {
        match self {
            Self::Empty => None,
            Self::Text(text) => text.host(),
            Self::Element(element) => element.host(),
        }
    }

    /// Host node currently mounted for this position.
    ///
    /// Unlike [`Node::host`] this follows a component through its fiber to
    /// the output it last rendered, so it stays right after the component
    /// re-renders on its own.
    pub(crate) fn mounted_host(&self) -> Option<HostNodeId> {
        match self {
            Self::Element(element) if element.component().is_some() => element
                .fiber()
                .and_then(|fiber| fiber.last_output().mounted_host()),
            _ => self.host(),
        }
    }

    /// Whether both positions hold the very same node.
    ///
    /// Two empty positions count as the same.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Text(a), Self::Text(b)) => a.ptr_eq(b),
            (Self::Element(a), Self::Element(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Short description for logs.
    pub(crate) fn describe(&self) -> &str {
        match self {
            Self::Empty => "<empty>",
            Self::Text(_) => "#text",
            Self::Element(element) => element.kind().name(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(node: Option<T>) -> Self {
        node.map_or(Self::Empty, Into::into)
    }
}
