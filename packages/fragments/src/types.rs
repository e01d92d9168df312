//! Core data types shared by the event source, the path tracker and handlers.

use std::fmt;

use serde::{Serialize, Serializer};

/// A namespace-qualified element or attribute name.
///
/// The empty namespace string means the name is not in any namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: String,
    local: String,
}

/// One segment of a path specification.
pub type ElementSpec = QName;

impl QName {
    /// Create a name in the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a name without a namespace.
    #[must_use]
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(String::new(), local)
    }

    /// Namespace URI, empty when unqualified.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Whether this name carries a namespace URI.
    #[must_use]
    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }

    /// Compare against a namespace/local-name pair without allocating.
    #[must_use]
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }
}

/// Clark notation: `{uri}local`, or just `local` without a namespace.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

impl Serialize for QName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An attribute with its unescaped value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A start-element event: the element name plus its attributes.
///
/// Namespace declarations are consumed by the reader and never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    pub name: QName,
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Look up an attribute value by namespace and local name.
    #[must_use]
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }
}
