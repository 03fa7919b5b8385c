//! Typed handles over tree nodes.
//!
//! Each handle is a `NodeId` newtype tied to one container type. Handles are
//! `Copy` and hold no borrow; every accessor takes the tree explicitly.
//! Accessors on a node of another container type fail with
//! [`ModelError::WrongContainer`].

mod actions;
mod document_root;
mod generic;
mod lock;
mod native;
mod transaction;
mod value_list;

pub use actions::{Delete, Insert, Replace, Update};
pub use document_root::{DocumentRoot, RootElement};
pub use generic::AnyNode;
pub use lock::{GetFeatureWithLock, LockFeature, LockRequest};
pub use native::Native;
pub use transaction::{Transaction, TransactionAction};
pub use value_list::ValueList;

use wfs_content::{ContentError, Value};
use wfs_types::{NodeId, Scalar, SlotState};

use crate::data::NodeData;
use crate::error::{ModelError, ModelResult};
use crate::tree::ModelTree;

/// A typed view of one container type.
pub trait Container: Copy + Sized {
    /// Schema name of the container type.
    const TYPE_NAME: &'static str;

    /// Wrap an id without checking its container type.
    fn wrap(id: NodeId) -> Self;

    fn id(&self) -> NodeId;

    /// Create a fresh, unowned node of this type.
    fn create(tree: &mut ModelTree) -> ModelResult<Self> {
        Ok(Self::wrap(tree.create(Self::TYPE_NAME)?))
    }

    /// Wrap `id` after checking its container type.
    fn cast(tree: &ModelTree, id: NodeId) -> ModelResult<Self> {
        let found = tree.node(id)?.container();
        if found != Self::TYPE_NAME {
            return Err(ModelError::WrongContainer {
                node: id,
                expected: Self::TYPE_NAME.to_string(),
                found: found.to_string(),
            });
        }
        Ok(Self::wrap(id))
    }

    /// The child value that makes a parent entry own this node.
    fn as_value(&self) -> Value {
        Value::child(self.id(), Self::TYPE_NAME)
    }
}

/// Narrow a stored value to a typed handle.
pub(crate) fn narrow<T: Container>(value: &Value) -> ModelResult<T> {
    match value.as_child() {
        Some(child) if child.container == T::TYPE_NAME => Ok(T::wrap(child.id)),
        _ => Err(ContentError::TypeMismatch {
            expected: T::TYPE_NAME.to_string(),
            found: value.kind_label(),
        }
        .into()),
    }
}

pub(crate) fn wrong_container<T: Container>(id: NodeId, data: &NodeData) -> ModelError {
    ModelError::WrongContainer {
        node: id,
        expected: T::TYPE_NAME.to_string(),
        found: data.container_name().to_string(),
    }
}

/// Check `value` against the declared type of attribute `name` of `T`.
pub(crate) fn check_attribute<T: Container>(tree: &ModelTree, name: &str, value: &Scalar) -> ModelResult<()> {
    let decl = tree.schema().container(T::TYPE_NAME)?.attribute(name)?;
    if !decl.value_type.admits(value) {
        return Err(ContentError::TypeMismatch {
            expected: decl.value_type.to_string(),
            found: value.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Presence of a plain optional attribute after assignment.
pub(crate) fn presence<T>(value: &Option<T>) -> SlotState {
    if value.is_some() {
        SlotState::Set
    } else {
        SlotState::Cleared
    }
}
