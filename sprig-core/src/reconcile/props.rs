//! Attribute application and patching.
//!
//! Attributes fall into three groups:
//!
//! - event attributes (`onClick` holding an [`EventHandler`]): registered
//!   as listeners for the lowercased remainder (`click`)
//! - the class attribute (`className`): written to the host's `class`
//! - everything else: written under its own name in host text form
//!
//! Names and prefixes come from the host's [`Config`](crate::Config).

use tracing::trace;

use crate::element::{AttrValue, Attributes};
use crate::error::Result;
use crate::host::{Host, HostNodeId};

/// Apply every attribute of a freshly created host element.
pub(crate) fn apply(host: &Host, node: HostNodeId, attributes: Option<&Attributes>) -> Result<()> {
    for (name, value) in attributes.into_iter().flatten() {
        set(host, node, name, value)?;
    }
    Ok(())
}

/// Bring the host element from `prev`'s attributes to `next`'s.
///
/// Attributes gone from `next` are removed first. An attribute whose value
/// is unchanged is left alone; a handler counts as unchanged when it is the
/// same allocation.
pub(crate) fn patch(
    host: &Host,
    node: HostNodeId,
    prev: Option<&Attributes>,
    next: Option<&Attributes>,
) -> Result<()> {
    for (name, old) in prev.into_iter().flatten() {
        if !next.is_some_and(|next| next.contains_key(name)) {
            remove(host, node, name, old)?;
        }
    }

    for (name, new) in next.into_iter().flatten() {
        match prev.and_then(|prev| prev.get(name)) {
            Some(old) if old == new => {}
            Some(old) => {
                // A listener is not overwritten by setting another one.
                if old.as_handler().is_some() || new.as_handler().is_some() {
                    remove(host, node, name, old)?;
                }
                set(host, node, name, new)?;
            }
            None => set(host, node, name, new)?,
        }
    }
    Ok(())
}

fn set(host: &Host, node: HostNodeId, name: &str, value: &AttrValue) -> Result<()> {
    let config = host.config();
    match value {
        AttrValue::Handler(handler) => match config.event_name(name) {
            Some(event) => {
                trace!(%node, event = %event, "add listener");
                host.add_event_listener(node, &event, handler)
            }
            None => {
                trace!(%node, attribute = name, "handler on a non-event attribute skipped");
                Ok(())
            }
        },
        value => {
            let Some(text) = value.to_host_string() else {
                return Ok(());
            };
            let name = config.host_attribute(name);
            trace!(%node, attribute = name, value = %text, "set attribute");
            host.set_attribute(node, name, &text)
        }
    }
}

fn remove(host: &Host, node: HostNodeId, name: &str, value: &AttrValue) -> Result<()> {
    let config = host.config();
    match value {
        AttrValue::Handler(handler) => match config.event_name(name) {
            Some(event) => {
                trace!(%node, event = %event, "remove listener");
                host.remove_event_listener(node, &event, handler)
            }
            None => Ok(()),
        },
        _ => {
            let name = config.host_attribute(name);
            trace!(%node, attribute = name, "remove attribute");
            host.remove_attribute(node, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::element::{attrs, EventHandler};
    use crate::host::{HostAdapter, MemoryDocument};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn element(config: Config) -> (Rc<RefCell<MemoryDocument>>, Host, HostNodeId) {
        let doc = Rc::new(RefCell::new(MemoryDocument::new()));
        let node = doc.borrow_mut().create_element("div").unwrap();
        let host = Host::with_config(doc.clone(), config);
        (doc, host, node)
    }

    fn counter() -> (EventHandler, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        (EventHandler::new(move |_| count_c.set(count_c.get() + 1)), count)
    }

    #[test]
    fn replaces_attributes_exactly() {
        let (doc, host, node) = element(Config::default());
        let prev = attrs([("id", "old"), ("className", "foo")]);
        let next = attrs([("id", "new"), ("className", "bar")]);
        apply(&host, node, prev.as_ref()).unwrap();
        patch(&host, node, prev.as_ref(), next.as_ref()).unwrap();

        let doc = doc.borrow();
        let attributes: Vec<_> = doc
            .attributes(node)
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(attributes, vec![("id", "new"), ("class", "bar")]);
    }

    #[test]
    fn removes_missing_attributes() {
        let (doc, host, node) = element(Config::default());
        let prev = attrs([("title", "t"), ("className", "c")]);
        apply(&host, node, prev.as_ref()).unwrap();
        patch(&host, node, prev.as_ref(), None).unwrap();
        assert!(doc.borrow().attributes(node).unwrap().is_empty());
    }

    #[test]
    fn converts_values_to_host_text() {
        let (doc, host, node) = element(Config::default());
        let values = attrs([
            ("tabindex", AttrValue::from(3_i64)),
            ("hidden", false.into()),
            ("step", 0.5.into()),
        ]);
        apply(&host, node, values.as_ref()).unwrap();

        let doc = doc.borrow();
        assert_eq!(doc.attribute(node, "tabindex"), Some("3"));
        assert_eq!(doc.attribute(node, "hidden"), Some("false"));
        assert_eq!(doc.attribute(node, "step"), Some("0.5"));
    }

    #[test]
    fn swaps_handlers() {
        let (doc, host, node) = element(Config::default());
        let (first, first_count) = counter();
        let (second, second_count) = counter();
        let prev = attrs([("onClick", first)]);
        let next = attrs([("onClick", second)]);
        apply(&host, node, prev.as_ref()).unwrap();
        patch(&host, node, prev.as_ref(), next.as_ref()).unwrap();

        assert_eq!(doc.borrow().listener_count(node, "click"), 1);
        MemoryDocument::click(&doc, node).unwrap();
        assert_eq!(first_count.get(), 0);
        assert_eq!(second_count.get(), 1);
    }

    #[test]
    fn same_handler_is_not_touched() {
        /// Counts listener registrations on top of a memory document.
        type HostResult<T> = std::result::Result<T, crate::HostError>;

        struct Counting {
            inner: MemoryDocument,
            added: usize,
            removed: usize,
        }

        impl HostAdapter for Counting {
            fn create_element(&mut self, tag: &str) -> HostResult<HostNodeId> {
                self.inner.create_element(tag)
            }
            fn create_text(&mut self, text: &str) -> HostResult<HostNodeId> {
                self.inner.create_text(text)
            }
            fn set_text(&mut self, node: HostNodeId, text: &str) -> HostResult<()> {
                self.inner.set_text(node, text)
            }
            fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> HostResult<()> {
                self.inner.append_child(parent, child)
            }
            fn insert_child(
                &mut self,
                parent: HostNodeId,
                child: HostNodeId,
                index: usize,
            ) -> HostResult<()> {
                self.inner.insert_child(parent, child, index)
            }
            fn insert_before(
                &mut self,
                parent: HostNodeId,
                child: HostNodeId,
                anchor: Option<HostNodeId>,
            ) -> HostResult<()> {
                self.inner.insert_before(parent, child, anchor)
            }
            fn remove_node(&mut self, node: HostNodeId) -> HostResult<()> {
                self.inner.remove_node(node)
            }
            fn remove_child_at(&mut self, parent: HostNodeId, index: usize) -> HostResult<()> {
                self.inner.remove_child_at(parent, index)
            }
            fn set_attribute(
                &mut self,
                node: HostNodeId,
                name: &str,
                value: &str,
            ) -> HostResult<()> {
                self.inner.set_attribute(node, name, value)
            }
            fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> HostResult<()> {
                self.inner.remove_attribute(node, name)
            }
            fn add_event_listener(
                &mut self,
                node: HostNodeId,
                event: &str,
                handler: EventHandler,
            ) -> HostResult<()> {
                self.added += 1;
                self.inner.add_event_listener(node, event, handler)
            }
            fn remove_event_listener(
                &mut self,
                node: HostNodeId,
                event: &str,
                handler: &EventHandler,
            ) -> HostResult<()> {
                self.removed += 1;
                self.inner.remove_event_listener(node, event, handler)
            }
        }

        let counting = Rc::new(RefCell::new(Counting {
            inner: MemoryDocument::new(),
            added: 0,
            removed: 0,
        }));
        let node = counting.borrow_mut().inner.create_element("button").unwrap();
        let host = Host::new(counting.clone());
        let (handler, _) = counter();

        let prev = attrs([("onClick", handler.clone())]);
        let next = attrs([("onClick", handler)]);
        apply(&host, node, prev.as_ref()).unwrap();
        patch(&host, node, prev.as_ref(), next.as_ref()).unwrap();

        assert_eq!(counting.borrow().added, 1);
        assert_eq!(counting.borrow().removed, 0);
    }

    #[test]
    fn removes_listener_when_handler_dropped() {
        let (doc, host, node) = element(Config::default());
        let (handler, count) = counter();
        let prev = attrs([("onMouseOver", handler)]);
        apply(&host, node, prev.as_ref()).unwrap();
        assert_eq!(doc.borrow().listener_count(node, "mouseover"), 1);

        let next = attrs::<_, &str, AttrValue>([]);
        patch(&host, node, prev.as_ref(), next.as_ref()).unwrap();
        assert_eq!(doc.borrow().listener_count(node, "mouseover"), 0);
        MemoryDocument::dispatch(&doc, node, "mouseover").unwrap();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn honours_configured_names() {
        let config = Config::default()
            .with_event_prefix("on:")
            .with_class_attribute("class", "class");
        let (doc, host, node) = element(config);
        let (handler, count) = counter();
        let values = attrs([
            ("on:click", AttrValue::from(handler)),
            ("class", "x".into()),
            ("onClick", "plain".into()),
        ]);
        apply(&host, node, values.as_ref()).unwrap();

        MemoryDocument::click(&doc, node).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(doc.borrow().attribute(node, "class"), Some("x"));
        assert_eq!(doc.borrow().attribute(node, "onClick"), Some("plain"));
    }
}
