//! Attribute values and event handlers.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::host::Event;

/// Ordered attribute mapping of an element.
pub type Attributes = IndexMap<String, AttrValue>;

/// A listener attached through an event attribute such as `onClick`.
///
/// Handlers compare by identity: two handlers are equal only when they
/// share the same allocation. Re-supplying the same handler across renders
/// therefore leaves the host registration untouched.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    /// Wrap a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self(Rc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    /// Whether both handles share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shares the allocation, so a callback from
/// [`use_callback`](crate::hooks::use_callback) keeps its identity.
impl<F> From<Rc<F>> for EventHandler
where
    F: Fn(&Event) + 'static,
{
    fn from(handler: Rc<F>) -> Self {
        Self(handler)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
}

impl AttrValue {
    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The handler, if this value is an event handler.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Text written to the host for a plain attribute.
    ///
    /// Handlers have no text form.
    pub fn to_host_string(&self) -> Option<String> {
        match self {
            Self::Str(value) => Some(value.clone()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(number_text(*value)),
            Self::Bool(value) => Some(value.to_string()),
            Self::Handler(_) => None,
        }
    }
}

/// Text form of a number, matching what a document host prints.
pub(crate) fn number_text(value: f64) -> String {
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        value.to_string()
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for AttrValue {
    fn from(handler: EventHandler) -> Self {
        Self::Handler(handler)
    }
}

/// Build an attribute mapping from name/value pairs.
///
/// ```rust,ignore
/// let attributes = attrs([("id", AttrValue::from("app")), ("tabindex", 0_i64.into())]);
/// ```
pub fn attrs<I, K, V>(pairs: I) -> Option<Attributes>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttrValue>,
{
    Some(
        pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect(),
    )
}

/// The attributes handed to a component function.
///
/// Distinguishes an element built with no attributes at all from one built
/// with an empty mapping.
#[derive(Debug, Clone, Copy)]
pub struct Props<'a>(Option<&'a Attributes>);

impl<'a> Props<'a> {
    pub(crate) fn new(attributes: Option<&'a Attributes>) -> Self {
        Self(attributes)
    }

    /// The underlying mapping, if the element had one.
    pub fn attributes(&self) -> Option<&'a Attributes> {
        self.0
    }

    /// Whether the element was built without attributes.
    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.map_or(0, IndexMap::len)
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&'a AttrValue> {
        self.0?.get(name)
    }

    /// Look up a string attribute.
    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.get(name)?.as_str()
    }

    /// Look up an integer attribute.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    /// Look up an event handler attribute.
    pub fn handler(&self, name: &str) -> Option<&'a EventHandler> {
        self.get(name)?.as_handler()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_compare_by_identity() {
        let a = EventHandler::new(|_| {});
        let b = EventHandler::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);

        let shared = Rc::new(|_: &Event| {});
        assert_eq!(EventHandler::from(shared.clone()), EventHandler::from(shared));
    }

    #[test]
    fn host_strings() {
        assert_eq!(AttrValue::from("x").to_host_string().as_deref(), Some("x"));
        assert_eq!(AttrValue::from(7).to_host_string().as_deref(), Some("7"));
        assert_eq!(AttrValue::from(4.5).to_host_string().as_deref(), Some("4.5"));
        assert_eq!(AttrValue::from(3.0).to_host_string().as_deref(), Some("3"));
        assert_eq!(AttrValue::from(true).to_host_string().as_deref(), Some("true"));
        assert_eq!(
            AttrValue::from(EventHandler::new(|_| {})).to_host_string(),
            None
        );
    }

    #[test]
    fn props_lookup() {
        let attributes = attrs([("message", AttrValue::from("hi")), ("count", 2_i64.into())]);
        let props = Props::new(attributes.as_ref());
        assert_eq!(props.str("message"), Some("hi"));
        assert_eq!(props.int("count"), Some(2));
        assert_eq!(props.len(), 2);
        assert!(!props.is_absent());

        let absent = Props::new(None);
        assert!(absent.is_absent());
        assert!(absent.is_empty());
        assert_eq!(absent.get("message"), None);
    }
}
