use std::fmt;

use serde::{Deserialize, Serialize};
use wfs_schema::ValueType;
use wfs_types::{FeatureKey, NodeId, Scalar};

/// Reference to an owned child object held by an entry.
///
/// The container name travels with the id so that group membership can be
/// checked without consulting the owning tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: NodeId,
    pub container: String,
}

impl ChildRef {
    pub fn new(id: NodeId, container: impl Into<String>) -> Self {
        Self {
            id,
            container: container.into(),
        }
    }
}

/// The payload of one content entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Scalar(Scalar),
    Text(String),
    /// An exclusively owned child object.
    Child(ChildRef),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn child(id: NodeId, container: impl Into<String>) -> Self {
        Self::Child(ChildRef::new(id, container))
    }

    /// Short label for error messages: `text`, the scalar kind, or the
    /// child's container type.
    pub fn kind_label(&self) -> String {
        match self {
            Self::Scalar(scalar) => scalar.kind_label().to_string(),
            Self::Text(_) => "text".to_string(),
            Self::Child(child) => child.container.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_child(&self) -> Option<&ChildRef> {
        match self {
            Self::Child(child) => Some(child),
            _ => None,
        }
    }

    /// Returns `true` if a member declared with `value_type` may hold this
    /// value.
    pub fn conforms_to(&self, value_type: &ValueType) -> bool {
        match self {
            Self::Scalar(scalar) => value_type.accepts_scalar(scalar),
            Self::Text(_) => value_type.accepts_text(),
            Self::Child(child) => value_type.accepts_child(&child.container),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Child(child) => write!(f, "{}#{}", child.container, child.id.short_id()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<ChildRef> for Value {
    fn from(child: ChildRef) -> Self {
        Self::Child(child)
    }
}

/// One logical property over a declared group.
///
/// Non-repeatable groups have the single ordinal `0`. Repeatable groups have
/// one independent slot per ordinal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub group: String,
    #[serde(default)]
    pub ordinal: u32,
}

impl SlotRef {
    /// The only slot of a non-repeatable group.
    pub fn single(group: impl Into<String>) -> Self {
        Self::nth(group, 0)
    }

    pub fn nth(group: impl Into<String>, ordinal: u32) -> Self {
        Self {
            group: group.into(),
            ordinal,
        }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.group, self.ordinal)
    }
}

/// One element of a content list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: FeatureKey,
    /// The group slot this entry occupies; `None` for raw entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotRef>,
    pub value: Value,
}

impl Entry {
    /// An entry that occupies no group slot.
    pub fn raw(key: FeatureKey, value: Value) -> Self {
        Self { key, slot: None, value }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::raw(FeatureKey::text(), Value::text(text))
    }

    pub fn occupies(&self, slot: &SlotRef) -> bool {
        self.slot.as_ref() == Some(slot)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.slot.as_ref().is_some_and(|s| s.group == group)
    }

    pub fn child(&self) -> Option<&ChildRef> {
        self.value.as_child()
    }
}
