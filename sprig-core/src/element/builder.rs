//! Element tree builder.
//!
//! [`h`] turns a kind, an attribute mapping and a list of children into an
//! [`Element`]. Children are given as [`Child`] values, which may nest:
//!
//! - groups are flattened recursively into one sequence,
//! - absent values and booleans are dropped,
//! - everything else (including `0` and `""`) becomes a node or a text leaf.
//!
//! A `key` attribute is moved out of the mapping into [`Element::key`].

use super::attr::{number_text, Attributes};
use super::node::{Element, ElementKind, Key, Node, Text};

/// One entry of a children list, before flattening.
#[derive(Debug, Clone)]
pub enum Child {
    Node(Node),
    Text(String),
    /// Dropped from the sequence.
    Absent,
    /// Dropped from the sequence.
    Bool(bool),
    /// Flattened into the surrounding sequence.
    Group(Vec<Child>),
}

/// Build an element.
///
/// ```rust,ignore
/// let list = h("ul", None, vec![
///     h("li", attrs([("key", "a")]), vec!["A".into()]).into(),
///     vec!["b", "c"].into(),
/// ]);
/// ```
pub fn h(
    kind: impl Into<ElementKind>,
    attributes: Option<Attributes>,
    children: Vec<Child>,
) -> Element {
    let (attributes, key) = match attributes {
        Some(mut attributes) => {
            let key = attributes
                .shift_remove("key")
                .and_then(|value| Key::from_attr(&value));
            (Some(attributes), key)
        }
        None => (None, None),
    };

    let mut flat = Vec::with_capacity(children.len());
    flatten(children, &mut flat);

    Element::from_parts(kind.into(), attributes, flat, key)
}

/// A text leaf node.
pub fn text(content: impl Into<String>) -> Node {
    Node::text(content)
}

fn flatten(children: Vec<Child>, out: &mut Vec<Node>) {
    for child in children {
        match child {
            Child::Group(group) => flatten(group, out),
            Child::Absent | Child::Bool(_) | Child::Node(Node::Empty) => {}
            Child::Node(node) => out.push(node),
            Child::Text(content) => out.push(Node::Text(Text::new(content))),
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Self::Node(Node::Element(element))
    }
}

impl From<Text> for Child {
    fn from(text: Text) -> Self {
        Self::Node(Node::Text(text))
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Text(number_text(value))
    }
}

macro_rules! integer_children {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

integer_children!(i32, i64, u32, u64, usize);

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(group: Vec<T>) -> Self {
        Self::Group(group.into_iter().map(Into::into).collect())
    }
}
