use std::fmt;

use serde::{Deserialize, Serialize};

use crate::namespace;

/// Local name given to text-run keys.
pub const TEXT_NAME: &str = "#text";

/// Structural classification of a content entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// An XML attribute.
    Attribute,
    /// A schema-declared child element.
    Element,
    /// An element admitted by an `xs:any` wildcard.
    WildcardAny,
    /// A run of character data in mixed content.
    Text,
}

impl FeatureKind {
    /// Returns `true` for kinds that may belong to an exclusive group.
    ///
    /// Text runs and wildcard elements are mixed content and never take part
    /// in choice exclusivity.
    pub fn is_exclusive_candidate(self) -> bool {
        matches!(self, Self::Attribute | Self::Element)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute => write!(f, "attribute"),
            Self::Element => write!(f, "element"),
            Self::WildcardAny => write!(f, "any"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Immutable identity of a content entry: namespace, local name and kind.
///
/// Two keys are equal iff all three fields match. Group membership is not
/// recorded on the key; it is decided by the schema descriptor that owns the
/// group table.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureKey {
    #[serde(default)]
    namespace: String,
    name: String,
    kind: FeatureKind,
}

impl FeatureKey {
    /// Create a key from its three components.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    /// A schema-declared element key.
    pub fn element(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, FeatureKind::Element)
    }

    /// An attribute key. Most WFS attributes are unqualified.
    pub fn attribute(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, FeatureKind::Attribute)
    }

    /// A key for an element admitted by a wildcard.
    pub fn wildcard(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, FeatureKind::WildcardAny)
    }

    /// The key shared by every text run.
    pub fn text() -> Self {
        Self::new(namespace::NONE, TEXT_NAME, FeatureKind::Text)
    }

    /// A WFS 2.0 element key.
    pub fn wfs(name: impl Into<String>) -> Self {
        Self::element(namespace::WFS, name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Returns `true` if this key may be a member of an exclusive group.
    pub fn is_exclusive_candidate(&self) -> bool {
        self.kind.is_exclusive_candidate()
    }

    /// Returns `true` for text runs and wildcard elements.
    pub fn is_mixed(&self) -> bool {
        !self.is_exclusive_candidate()
    }

    /// Returns `true` if the key names the given element or attribute,
    /// ignoring the kind.
    pub fn is_named(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }
}

impl fmt::Debug for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureKey({self}, {})", self.kind)
    }
}

/// Clark notation: `{namespace}name`, or the bare name when unqualified.
impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.name)
        }
    }
}
