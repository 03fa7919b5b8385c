//! Per-container schema declarations.

use std::fmt;

use serde::{Deserialize, Serialize};
use wfs_types::{FeatureKey, Scalar, ScalarType};

use crate::error::{SchemaError, SchemaResult};

/// Content model of a complex type, after the XML Schema `kind` annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentModel {
    /// Attributes only.
    Empty,
    /// A simple-typed body plus attributes.
    Simple,
    /// Child elements only.
    ElementOnly,
    /// Child elements interleaved with character data.
    Mixed,
}

impl ContentModel {
    pub fn is_mixed(self) -> bool {
        matches!(self, Self::Mixed)
    }
}

/// The kind of value a group member accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Character data.
    Text,
    /// A simple-typed value.
    Scalar(ScalarType),
    /// An owned child object of the named container type.
    Child(String),
    /// Anything: text, scalars, or a child of any container type.
    Any,
}

impl ValueType {
    pub fn accepts_text(&self) -> bool {
        matches!(self, Self::Text | Self::Any)
    }

    pub fn accepts_scalar(&self, value: &Scalar) -> bool {
        match self {
            Self::Scalar(ty) => ty.admits(value),
            Self::Any => true,
            Self::Text | Self::Child(_) => false,
        }
    }

    pub fn accepts_child(&self, container: &str) -> bool {
        match self {
            Self::Child(expected) => expected == container,
            Self::Any => true,
            Self::Text | Self::Scalar(_) => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Scalar(ty) => write!(f, "{ty}"),
            Self::Child(container) => write!(f, "{container}"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// One alternative of a choice or substitution group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub key: FeatureKey,
    pub value: ValueType,
}

impl MemberDecl {
    pub fn new(key: FeatureKey, value: ValueType) -> Self {
        Self { key, value }
    }
}

/// A set of mutually exclusive element alternatives.
///
/// A non-repeatable group is a single property: at most one of its members
/// is present. A repeatable group (`maxOccurs="unbounded"` on the choice) is
/// a sequence of independent slots, each holding at most one member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDecl {
    pub name: String,
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub repeatable: bool,
}

impl GroupDecl {
    /// A single-slot group.
    pub fn choice(name: impl Into<String>, members: Vec<MemberDecl>) -> Self {
        Self {
            name: name.into(),
            members,
            repeatable: false,
        }
    }

    /// A group with any number of independent slots.
    pub fn repeatable(name: impl Into<String>, members: Vec<MemberDecl>) -> Self {
        Self {
            name: name.into(),
            members,
            repeatable: true,
        }
    }

    /// A single-slot group with exactly one member, named after it.
    pub fn singleton(key: FeatureKey, value: ValueType) -> Self {
        Self::choice(key.name().to_string(), vec![MemberDecl::new(key, value)])
    }

    pub fn contains(&self, key: &FeatureKey) -> bool {
        self.members.iter().any(|m| &m.key == key)
    }

    pub fn member(&self, key: &FeatureKey) -> Option<&MemberDecl> {
        self.members.iter().find(|m| &m.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.members.iter().map(|m| &m.key)
    }
}

/// An attribute declaration with its type and optional default literal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDecl {
    pub key: FeatureKey,
    #[serde(rename = "type")]
    pub value_type: ScalarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Whether the attribute tracks explicit presence (see `Unsettable`).
    #[serde(default)]
    pub unsettable: bool,
}

impl AttributeDecl {
    /// A plain optional attribute without a default.
    pub fn optional(name: &str, value_type: ScalarType) -> Self {
        Self {
            key: FeatureKey::attribute("", name),
            value_type,
            default: None,
            unsettable: false,
        }
    }

    /// An unsettable attribute, optionally with a default literal.
    pub fn unsettable(name: &str, value_type: ScalarType, default: Option<&str>) -> Self {
        Self {
            key: FeatureKey::attribute("", name),
            value_type,
            default: default.map(str::to_string),
            unsettable: true,
        }
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Parse the default literal, if any, against the declared type.
    pub fn default_value(&self) -> Result<Option<Scalar>, wfs_types::TypeError> {
        self.default
            .as_deref()
            .map(|literal| self.value_type.parse_literal(literal))
            .transpose()
    }
}

/// Schema of one complex type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSchema {
    pub name: String,
    pub content: ContentModel,
    #[serde(default)]
    pub groups: Vec<GroupDecl>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

impl ContainerSchema {
    pub fn new(name: impl Into<String>, content: ContentModel) -> Self {
        Self {
            name: name.into(),
            content,
            groups: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: GroupDecl) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> SchemaResult<&GroupDecl> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| SchemaError::UnknownGroup {
                container: self.name.clone(),
                group: name.to_string(),
            })
    }

    /// The group that `key` is a member of, if any.
    pub fn group_of(&self, key: &FeatureKey) -> Option<&GroupDecl> {
        self.groups.iter().find(|g| g.contains(key))
    }

    /// Returns `true` if `key` belongs to a registered exclusive group.
    pub fn is_grouped(&self, key: &FeatureKey) -> bool {
        self.group_of(key).is_some()
    }

    /// Look up an attribute by local name.
    pub fn attribute(&self, name: &str) -> SchemaResult<&AttributeDecl> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| SchemaError::UnknownAttribute {
                container: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    /// The parsed default of an attribute, or `None` if it declares none.
    pub fn attribute_default(&self, name: &str) -> SchemaResult<Option<Scalar>> {
        let decl = self.attribute(name)?;
        decl.default_value().map_err(|source| SchemaError::BadDefault {
            container: self.name.clone(),
            attribute: name.to_string(),
            source,
        })
    }
}
