//! Engine configuration.
//!
//! The attribute naming conventions the render pass and reconciler use to
//! map logical attributes onto the host. The defaults follow the familiar
//! DOM conventions: `onClick` registers a `click` listener and `className`
//! becomes the `class` attribute.

/// Naming conventions for attributes that do not map one-to-one to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prefix that marks an attribute holding an event handler.
    pub event_prefix: String,

    /// Logical attribute name for the element's class list.
    pub class_name_attribute: String,

    /// Host attribute name the class list is written to.
    pub host_class_attribute: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_prefix: "on".to_string(),
            class_name_attribute: "className".to_string(),
            host_class_attribute: "class".to_string(),
        }
    }
}

impl Config {
    /// Use a different event-handler prefix.
    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    /// Use a different logical/host pair for the class attribute.
    pub fn with_class_attribute(
        mut self,
        logical: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        self.class_name_attribute = logical.into();
        self.host_class_attribute = host.into();
        self
    }

    /// The event name for an attribute name, if it carries the event prefix.
    ///
    /// The remainder after the prefix is lowercased: `onMouseOver` becomes
    /// `mouseover`. A bare prefix (`on`) is not an event attribute.
    pub fn event_name(&self, attribute: &str) -> Option<String> {
        attribute
            .strip_prefix(self.event_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .map(str::to_lowercase)
    }

    /// The host attribute name for a logical attribute name.
    pub fn host_attribute<'a>(&'a self, attribute: &'a str) -> &'a str {
        if attribute == self.class_name_attribute {
            &self.host_class_attribute
        } else {
            attribute
        }
    }
}
