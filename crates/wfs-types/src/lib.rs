//! Foundation types for the WFS 2.0 content model.
//!
//! This crate provides the identity and value types shared by every other
//! crate in the workspace: the keys that classify content entries, the scalar
//! values stored in them, the tri-state slot used for defaulted attributes,
//! and the identifiers of model nodes.
//!
//! # Key Types
//!
//! - [`FeatureKey`] -- Immutable (namespace, name, kind) identity of a content entry
//! - [`FeatureKind`] -- Attribute / element / wildcard / text classification
//! - [`QName`] -- Qualified XML name carried by `typeName`-style attributes
//! - [`Scalar`] / [`ScalarType`] -- Simple-typed attribute and element values
//! - [`AllSomeType`] -- The WFS `ALL`/`SOME` lock enumeration
//! - [`Unsettable`] -- Attribute slot tracking default / set / cleared provenance
//! - [`NodeId`] -- Identifier of a node in a model tree

pub mod all_some;
pub mod error;
pub mod key;
pub mod namespace;
pub mod node;
pub mod qname;
pub mod scalar;
pub mod unsettable;

pub use all_some::AllSomeType;
pub use error::TypeError;
pub use key::{FeatureKey, FeatureKind};
pub use node::NodeId;
pub use qname::QName;
pub use scalar::{Scalar, ScalarType};
pub use unsettable::{SlotState, Unsettable};
