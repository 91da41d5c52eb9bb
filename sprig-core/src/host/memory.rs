//! In-memory Document
//!
//! A complete [`HostAdapter`] backed by an arena of element and text nodes.
//! It is the host used by headless rendering and by the test-suite: the
//! tree can be serialized to markup with [`MemoryDocument::inner_html`],
//! captured as a serializable [`Snapshot`], and driven with synthetic
//! events through [`MemoryDocument::dispatch`].
//!
//! Removed subtrees are pruned from the arena, so a removed id is unknown
//! afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use super::{Event, HostAdapter, HostNodeId};
use crate::element::EventHandler;
use crate::error::HostError;

/// Tags serialized without a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug)]
enum Content {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
        listeners: Vec<(String, EventHandler)>,
        children: Vec<HostNodeId>,
    },
    Text(String),
}

#[derive(Debug)]
struct Entry {
    parent: Option<HostNodeId>,
    content: Content,
}

/// Serializable view of a host subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Snapshot {
    /// An element with its attributes in insertion order.
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
        children: Vec<Snapshot>,
    },
    /// A text node.
    Text { text: String },
}

/// Arena-backed host tree.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: HashMap<HostNodeId, Entry>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached `div` to use as a render container.
    pub fn create_root(&mut self) -> HostNodeId {
        self.insert(Content::Element {
            tag: "div".to_string(),
            attributes: IndexMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` is a live node of this document.
    pub fn contains(&self, node: HostNodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// The parent of `node`, if attached.
    pub fn parent(&self, node: HostNodeId) -> Option<HostNodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    /// Children of an element, in order.
    pub fn children(&self, node: HostNodeId) -> Result<&[HostNodeId], HostError> {
        match &self.entry(node)?.content {
            Content::Element { children, .. } => Ok(children),
            Content::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    /// Tag of an element node.
    pub fn tag(&self, node: HostNodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.content {
            Content::Element { tag, .. } => Some(tag),
            Content::Text(_) => None,
        }
    }

    /// Attributes of an element node, in insertion order.
    pub fn attributes(&self, node: HostNodeId) -> Option<&IndexMap<String, String>> {
        match &self.nodes.get(&node)?.content {
            Content::Element { attributes, .. } => Some(attributes),
            Content::Text(_) => None,
        }
    }

    /// A single attribute value.
    pub fn attribute(&self, node: HostNodeId, name: &str) -> Option<&str> {
        self.attributes(node)?.get(name).map(String::as_str)
    }

    /// Number of listeners registered for `event` on `node`.
    pub fn listener_count(&self, node: HostNodeId, event: &str) -> usize {
        match self.nodes.get(&node).map(|entry| &entry.content) {
            Some(Content::Element { listeners, .. }) => {
                listeners.iter().filter(|(name, _)| name == event).count()
            }
            _ => 0,
        }
    }

    /// Concatenated text of a subtree.
    pub fn text_content(&self, node: HostNodeId) -> Result<String, HostError> {
        let mut out = String::new();
        self.collect_text(node, &mut out)?;
        Ok(out)
    }

    /// First element with `tag` in document order below `root`, excluding `root`.
    pub fn find_by_tag(&self, root: HostNodeId, tag: &str) -> Option<HostNodeId> {
        let children = self.children(root).ok()?;
        children.iter().find_map(|&child| {
            if self.tag(child) == Some(tag) {
                Some(child)
            } else {
                self.find_by_tag(child, tag)
            }
        })
    }

    /// Markup of the children of `node`.
    pub fn inner_html(&self, node: HostNodeId) -> Result<String, HostError> {
        let mut out = String::new();
        for &child in self.children(node)? {
            self.write_html(child, &mut out)?;
        }
        Ok(out)
    }

    /// Markup of `node` itself.
    pub fn outer_html(&self, node: HostNodeId) -> Result<String, HostError> {
        let mut out = String::new();
        self.write_html(node, &mut out)?;
        Ok(out)
    }

    /// Capture a subtree.
    pub fn snapshot(&self, node: HostNodeId) -> Result<Snapshot, HostError> {
        match &self.entry(node)?.content {
            Content::Text(text) => Ok(Snapshot::Text { text: text.clone() }),
            Content::Element {
                tag,
                attributes,
                children,
                ..
            } => Ok(Snapshot::Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                children: children
                    .iter()
                    .map(|&child| self.snapshot(child))
                    .collect::<Result<_, _>>()?,
            }),
        }
    }

    /// Deliver an event to every listener registered for it on `target`.
    ///
    /// The listener list is cloned and the document borrow released before
    /// any handler runs, so handlers may update state and re-render into
    /// this same document. Returns the number of handlers invoked.
    pub fn dispatch(
        doc: &Rc<RefCell<Self>>,
        target: HostNodeId,
        event: &str,
    ) -> Result<usize, HostError> {
        let handlers: Vec<EventHandler> = {
            let doc = doc.borrow();
            match &doc.entry(target)?.content {
                Content::Element { listeners, .. } => listeners
                    .iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, handler)| handler.clone())
                    .collect(),
                Content::Text(_) => return Err(HostError::NotAnElement(target)),
            }
        };

        let event = Event {
            name: event.to_string(),
            target,
        };
        for handler in &handlers {
            handler.call(&event);
        }
        Ok(handlers.len())
    }

    /// Shorthand for dispatching `click`.
    pub fn click(doc: &Rc<RefCell<Self>>, target: HostNodeId) -> Result<usize, HostError> {
        Self::dispatch(doc, target, "click")
    }

    fn insert(&mut self, content: Content) -> HostNodeId {
        let id = HostNodeId::new();
        self.nodes.insert(id, Entry { parent: None, content });
        id
    }

    fn entry(&self, node: HostNodeId) -> Result<&Entry, HostError> {
        self.nodes.get(&node).ok_or(HostError::UnknownNode(node))
    }

    fn entry_mut(&mut self, node: HostNodeId) -> Result<&mut Entry, HostError> {
        self.nodes.get_mut(&node).ok_or(HostError::UnknownNode(node))
    }

    fn children_mut(&mut self, node: HostNodeId) -> Result<&mut Vec<HostNodeId>, HostError> {
        match &mut self.entry_mut(node)?.content {
            Content::Element { children, .. } => Ok(children),
            Content::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    fn detach(&mut self, node: HostNodeId) -> Result<(), HostError> {
        if let Some(parent) = self.entry(node)?.parent {
            self.children_mut(parent)?.retain(|&child| child != node);
            self.entry_mut(node)?.parent = None;
        }
        Ok(())
    }

    fn prune(&mut self, node: HostNodeId) {
        if let Some(entry) = self.nodes.remove(&node) {
            if let Content::Element { children, .. } = entry.content {
                for child in children {
                    self.prune(child);
                }
            }
        }
    }

    fn check_attribute_name(name: &str) -> Result<(), HostError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(HostError::InvalidAttribute(name.to_string()));
        }
        Ok(())
    }

    fn collect_text(&self, node: HostNodeId, out: &mut String) -> Result<(), HostError> {
        match &self.entry(node)?.content {
            Content::Text(text) => out.push_str(text),
            Content::Element { children, .. } => {
                for &child in children {
                    self.collect_text(child, out)?;
                }
            }
        }
        Ok(())
    }

    fn write_html(&self, node: HostNodeId, out: &mut String) -> Result<(), HostError> {
        match &self.entry(node)?.content {
            Content::Text(text) => out.push_str(&escape(text, false)),
            Content::Element {
                tag,
                attributes,
                children,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return Ok(());
                }
                for &child in children {
                    self.write_html(child, out)?;
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
        Ok(())
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

impl HostAdapter for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> Result<HostNodeId, HostError> {
        Ok(self.insert(Content::Element {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
        }))
    }

    fn create_text(&mut self, text: &str) -> Result<HostNodeId, HostError> {
        Ok(self.insert(Content::Text(text.to_string())))
    }

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError> {
        match &mut self.entry_mut(node)?.content {
            Content::Text(content) => {
                *content = text.to_string();
                Ok(())
            }
            Content::Element { .. } => Err(HostError::Other(format!(
                "host node {node} is not a text node"
            ))),
        }
    }

    fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError> {
        let len = self.children(parent)?.len();
        self.insert_child(parent, child, len)
    }

    fn insert_child(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        index: usize,
    ) -> Result<(), HostError> {
        self.entry(child)?;
        self.children(parent)?;
        self.detach(child)?;

        let children = self.children_mut(parent)?;
        let index = index.min(children.len());
        children.insert(index, child);
        self.entry_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        anchor: Option<HostNodeId>,
    ) -> Result<(), HostError> {
        let Some(anchor) = anchor else {
            return self.append_child(parent, child);
        };
        self.entry(child)?;
        if anchor == child || !self.children(parent)?.contains(&anchor) {
            return Err(HostError::NotAChild {
                parent,
                node: anchor,
            });
        }
        self.detach(child)?;

        let children = self.children_mut(parent)?;
        let index = children
            .iter()
            .position(|&existing| existing == anchor)
            .unwrap_or(children.len());
        children.insert(index, child);
        self.entry_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_node(&mut self, node: HostNodeId) -> Result<(), HostError> {
        self.detach(node)?;
        self.prune(node);
        Ok(())
    }

    fn remove_child_at(&mut self, parent: HostNodeId, index: usize) -> Result<(), HostError> {
        let children = self.children(parent)?;
        let child = *children.get(index).ok_or(HostError::IndexOutOfBounds {
            parent,
            index,
            len: children.len(),
        })?;
        self.remove_node(child)
    }

    fn set_attribute(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        Self::check_attribute_name(name)?;
        match &mut self.entry_mut(node)?.content {
            Content::Element { attributes, .. } => {
                attributes.insert(name.to_string(), value.to_string());
                Ok(())
            }
            Content::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError> {
        match &mut self.entry_mut(node)?.content {
            Content::Element { attributes, .. } => {
                attributes.shift_remove(name);
                Ok(())
            }
            Content::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    fn add_event_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        match &mut self.entry_mut(node)?.content {
            Content::Element { listeners, .. } => {
                // Same handler twice for one event is a single registration.
                if !listeners.iter().any(|(name, h)| name == event && h == &handler) {
                    listeners.push((event.to_string(), handler));
                }
                Ok(())
            }
            Content::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    fn remove_event_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        match &mut self.entry_mut(node)?.content {
            Content::Element { listeners, .. } => {
                listeners.retain(|(name, h)| !(name == event && h == handler));
                Ok(())
            }
            Content::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }
}
