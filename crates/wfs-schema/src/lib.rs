//! Schema descriptors for the WFS 2.0 content model.
//!
//! A [`SchemaDescriptor`] tells the content model, per container type, which
//! feature keys exist, which of them form mutually exclusive choice groups,
//! and which attributes carry schema defaults. Descriptors are immutable
//! values passed explicitly to the model; there is no global registry.
//!
//! The built-in WFS 2.0 descriptor is available from
//! [`SchemaDescriptor::wfs20`]. Descriptors can also be loaded from TOML.
//!
//! # Key Types
//!
//! - [`SchemaDescriptor`] -- The full set of container schemas
//! - [`ContainerSchema`] -- One complex type: content model, groups, attributes
//! - [`GroupDecl`] -- A choice or substitution group
//! - [`MemberDecl`] -- One alternative of a group and the value it accepts
//! - [`AttributeDecl`] -- An attribute with its type and default literal

pub mod container;
pub mod descriptor;
pub mod error;
mod validate;
pub mod wfs20;

pub use container::{AttributeDecl, ContainerSchema, ContentModel, GroupDecl, MemberDecl, ValueType};
pub use descriptor::SchemaDescriptor;
pub use error::{SchemaError, SchemaResult};
