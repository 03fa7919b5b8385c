use wfs_content::{ContentError, SlotRef, Value};
use wfs_schema::wfs20;
use wfs_types::{AllSomeType, NodeId, SlotState};

use super::{narrow, presence, wrong_container, Container, Delete, Insert, Native, Replace, Update};
use crate::data::{NodeData, TransactionData};
use crate::error::ModelResult;
use crate::tree::ModelTree;

/// A `wfs:Transaction` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transaction(NodeId);

impl Container for Transaction {
    const TYPE_NAME: &'static str = wfs20::TRANSACTION_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

/// One member of the `AbstractTransactionAction` substitution group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionAction {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Replace(Replace),
    Native(Native),
}

impl TransactionAction {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Insert(a) => a.id(),
            Self::Update(a) => a.id(),
            Self::Delete(a) => a.id(),
            Self::Replace(a) => a.id(),
            Self::Native(a) => a.id(),
        }
    }

    /// Element name of the action, e.g. `Insert`.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "Insert",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
            Self::Replace(_) => "Replace",
            Self::Native(_) => "Native",
        }
    }

    pub fn as_value(&self) -> Value {
        match self {
            Self::Insert(a) => a.as_value(),
            Self::Update(a) => a.as_value(),
            Self::Delete(a) => a.as_value(),
            Self::Replace(a) => a.as_value(),
            Self::Native(a) => a.as_value(),
        }
    }

    /// Narrow a stored value to whichever action it holds.
    pub fn from_value(value: &Value) -> ModelResult<Self> {
        let container = value.as_child().map(|c| c.container.as_str());
        Ok(match container {
            Some(wfs20::INSERT_TYPE) => Self::Insert(narrow(value)?),
            Some(wfs20::UPDATE_TYPE) => Self::Update(narrow(value)?),
            Some(wfs20::DELETE_TYPE) => Self::Delete(narrow(value)?),
            Some(wfs20::REPLACE_TYPE) => Self::Replace(narrow(value)?),
            Some(wfs20::NATIVE_TYPE) => Self::Native(narrow(value)?),
            _ => {
                return Err(ContentError::TypeMismatch {
                    expected: wfs20::ABSTRACT_TRANSACTION_ACTION.to_string(),
                    found: value.kind_label(),
                }
                .into())
            }
        })
    }
}

impl From<Insert> for TransactionAction {
    fn from(a: Insert) -> Self {
        Self::Insert(a)
    }
}

impl From<Update> for TransactionAction {
    fn from(a: Update) -> Self {
        Self::Update(a)
    }
}

impl From<Delete> for TransactionAction {
    fn from(a: Delete) -> Self {
        Self::Delete(a)
    }
}

impl From<Replace> for TransactionAction {
    fn from(a: Replace) -> Self {
        Self::Replace(a)
    }
}

impl From<Native> for TransactionAction {
    fn from(a: Native) -> Self {
        Self::Native(a)
    }
}

fn action_slot(ordinal: u32) -> SlotRef {
    SlotRef::nth(wfs20::ABSTRACT_TRANSACTION_ACTION, ordinal)
}

impl Transaction {
    fn data<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t TransactionData> {
        match tree.data(self.0)? {
            NodeData::Transaction(data) => Ok(data),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    fn update(
        &self,
        tree: &mut ModelTree,
        name: &'static str,
        apply: impl FnOnce(&mut TransactionData) -> SlotState,
    ) -> ModelResult<()> {
        tree.update_attribute(self.0, name, Self::TYPE_NAME, |data| match data {
            NodeData::Transaction(t) => Some(apply(t)),
            _ => None,
        })
    }

    // ---------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------

    /// The action in slot `ordinal`, if any.
    pub fn action(&self, tree: &ModelTree, ordinal: u32) -> ModelResult<Option<TransactionAction>> {
        tree.content(self.0)?
            .get_slot(&action_slot(ordinal))?
            .map(TransactionAction::from_value)
            .transpose()
    }

    /// Replace the action in slot `ordinal`. An evicted action is released.
    pub fn set_action(
        &self,
        tree: &mut ModelTree,
        ordinal: u32,
        action: Option<TransactionAction>,
    ) -> ModelResult<()> {
        tree.set_slot(self.0, action_slot(ordinal), action.map(|a| a.as_value()))
    }

    /// Add an action in a fresh slot. Returns its ordinal.
    pub fn push_action(&self, tree: &mut ModelTree, action: impl Into<TransactionAction>) -> ModelResult<u32> {
        let slot = tree.push_slot(self.0, wfs20::ABSTRACT_TRANSACTION_ACTION, action.into().as_value())?;
        Ok(slot.ordinal)
    }

    /// Every action in document order.
    pub fn actions(&self, tree: &ModelTree) -> ModelResult<Vec<TransactionAction>> {
        tree.content(self.0)?
            .occupants(wfs20::ABSTRACT_TRANSACTION_ACTION)?
            .into_iter()
            .map(|entry| TransactionAction::from_value(&entry.value))
            .collect()
    }

    // ---------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------

    pub fn lock_id<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.lock_id.as_deref())
    }

    pub fn set_lock_id(&self, tree: &mut ModelTree, lock_id: Option<String>) -> ModelResult<()> {
        self.update(tree, "lockId", |t| {
            t.lock_id = lock_id;
            presence(&t.lock_id)
        })
    }

    pub fn release_action(&self, tree: &ModelTree) -> ModelResult<AllSomeType> {
        Ok(*self.data(tree)?.release_action.get())
    }

    pub fn is_release_action_set(&self, tree: &ModelTree) -> ModelResult<bool> {
        Ok(self.data(tree)?.release_action.is_set())
    }

    pub fn set_release_action(&self, tree: &mut ModelTree, action: AllSomeType) -> ModelResult<()> {
        self.update(tree, "releaseAction", |t| {
            t.release_action.set(action);
            t.release_action.state()
        })
    }

    pub fn unset_release_action(&self, tree: &mut ModelTree) -> ModelResult<()> {
        self.update(tree, "releaseAction", |t| {
            t.release_action.unset();
            t.release_action.state()
        })
    }

    pub fn srs_name<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.srs_name.as_deref())
    }

    pub fn set_srs_name(&self, tree: &mut ModelTree, srs_name: Option<String>) -> ModelResult<()> {
        self.update(tree, "srsName", |t| {
            t.srs_name = srs_name;
            presence(&t.srs_name)
        })
    }

    pub fn handle<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.request.handle.as_deref())
    }

    pub fn set_handle(&self, tree: &mut ModelTree, handle: Option<String>) -> ModelResult<()> {
        self.update(tree, "handle", |t| {
            t.request.handle = handle;
            presence(&t.request.handle)
        })
    }

    pub fn service<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t str> {
        Ok(self.data(tree)?.request.service.get())
    }

    pub fn version<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t str> {
        Ok(self.data(tree)?.request.version.get())
    }

    pub fn set_version(&self, tree: &mut ModelTree, version: impl Into<String>) -> ModelResult<()> {
        let version = version.into();
        self.update(tree, "version", |t| {
            t.request.version.set(version);
            t.request.version.state()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn release_action_tracks_provenance() {
        let mut tree = ModelTree::default();
        let tx = Transaction::create(&mut tree).unwrap();
        assert_eq!(tx.release_action(&tree).unwrap(), AllSomeType::All);
        assert!(!tx.is_release_action_set(&tree).unwrap());

        tx.set_release_action(&mut tree, AllSomeType::Some).unwrap();
        assert_eq!(tx.release_action(&tree).unwrap(), AllSomeType::Some);
        assert!(tx.is_release_action_set(&tree).unwrap());

        tx.unset_release_action(&mut tree).unwrap();
        assert_eq!(tx.release_action(&tree).unwrap(), AllSomeType::All);
        assert!(!tx.is_release_action_set(&tree).unwrap());
    }

    #[test]
    fn actions_follow_document_order() {
        let mut tree = ModelTree::default();
        let tx = Transaction::create(&mut tree).unwrap();
        let insert = Insert::create(&mut tree).unwrap();
        let native = Native::create(&mut tree).unwrap();
        assert_eq!(tx.push_action(&mut tree, insert).unwrap(), 0);
        assert_eq!(tx.push_action(&mut tree, native).unwrap(), 1);

        let actions = tx.actions(&tree).unwrap();
        assert_eq!(actions, [TransactionAction::Insert(insert), TransactionAction::Native(native)]);
        assert_eq!(tx.action(&tree, 1).unwrap(), Some(TransactionAction::Native(native)));
        assert_eq!(tx.action(&tree, 2).unwrap(), None);
    }

    #[test]
    fn request_attributes_default_from_schema() {
        let mut tree = ModelTree::default();
        let tx = Transaction::create(&mut tree).unwrap();
        assert_eq!(tx.service(&tree).unwrap(), "WFS");
        assert_eq!(tx.version(&tree).unwrap(), "2.0.0");
        tx.set_lock_id(&mut tree, Some("lock-1".into())).unwrap();
        assert_eq!(tx.lock_id(&tree).unwrap(), Some("lock-1"));
    }

    #[test]
    fn cast_checks_container() {
        let mut tree = ModelTree::default();
        let delete = Delete::create(&mut tree).unwrap();
        assert!(matches!(
            Transaction::cast(&tree, delete.id()),
            Err(ModelError::WrongContainer { .. })
        ));
        let bogus = Transaction::wrap(delete.id());
        assert!(matches!(bogus.release_action(&tree), Err(ModelError::WrongContainer { .. })));
    }
}
