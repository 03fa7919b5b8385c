//! `wfs:LockFeature` and `wfs:GetFeatureWithLock`.
//!
//! Both hold a repeatable `AbstractQueryExpression` group and share the
//! `expiry` and `lockAction` attributes.

use wfs_content::SlotRef;
use wfs_schema::wfs20;
use wfs_types::{AllSomeType, FeatureKey, NodeId, Scalar, SlotState};

use super::{check_attribute, narrow, presence, wrong_container, AnyNode, Container};
use crate::data::{LockData, NodeData};
use crate::error::ModelResult;
use crate::tree::ModelTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LockFeature(NodeId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GetFeatureWithLock(NodeId);

impl Container for LockFeature {
    const TYPE_NAME: &'static str = wfs20::LOCK_FEATURE_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

impl Container for GetFeatureWithLock {
    const TYPE_NAME: &'static str = wfs20::GET_FEATURE_WITH_LOCK_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

fn lock_data<'t, T: Container>(tree: &'t ModelTree, id: NodeId) -> ModelResult<&'t LockData> {
    match tree.data(id)? {
        NodeData::LockFeature(data) if T::TYPE_NAME == wfs20::LOCK_FEATURE_TYPE => Ok(&data.lock),
        NodeData::GetFeatureWithLock(data) if T::TYPE_NAME == wfs20::GET_FEATURE_WITH_LOCK_TYPE => Ok(data),
        other => Err(wrong_container::<T>(id, other)),
    }
}

fn update_lock<T: Container>(
    tree: &mut ModelTree,
    id: NodeId,
    name: &'static str,
    apply: impl FnOnce(&mut LockData) -> SlotState,
) -> ModelResult<()> {
    tree.update_attribute(id, name, T::TYPE_NAME, |data| match data {
        NodeData::LockFeature(l) if T::TYPE_NAME == wfs20::LOCK_FEATURE_TYPE => Some(apply(&mut l.lock)),
        NodeData::GetFeatureWithLock(l) if T::TYPE_NAME == wfs20::GET_FEATURE_WITH_LOCK_TYPE => Some(apply(l)),
        _ => None,
    })
}

/// Accessors shared by the locking requests.
pub trait LockRequest: Container {
    /// Add a `wfs:Query` or `wfs:StoredQuery` in a fresh slot.
    fn push_query_expression(&self, tree: &mut ModelTree, key: FeatureKey, query: AnyNode) -> ModelResult<u32> {
        let slot = tree.push_slot_keyed(self.id(), wfs20::ABSTRACT_QUERY_EXPRESSION, key, query.as_value())?;
        Ok(slot.ordinal)
    }

    fn query_expression(&self, tree: &ModelTree, ordinal: u32) -> ModelResult<Option<AnyNode>> {
        tree.content(self.id())?
            .get_slot(&SlotRef::nth(wfs20::ABSTRACT_QUERY_EXPRESSION, ordinal))?
            .map(narrow::<AnyNode>)
            .transpose()
    }

    /// Query expressions in document order, with the element each is held
    /// under.
    fn query_expressions(&self, tree: &ModelTree) -> ModelResult<Vec<(FeatureKey, AnyNode)>> {
        tree.content(self.id())?
            .occupants(wfs20::ABSTRACT_QUERY_EXPRESSION)?
            .into_iter()
            .map(|entry| Ok((entry.key.clone(), narrow::<AnyNode>(&entry.value)?)))
            .collect()
    }

    /// Lock duration in seconds.
    fn expiry(&self, tree: &ModelTree) -> ModelResult<i64> {
        Ok(*lock_data::<Self>(tree, self.id())?.expiry.get())
    }

    fn is_expiry_set(&self, tree: &ModelTree) -> ModelResult<bool> {
        Ok(lock_data::<Self>(tree, self.id())?.expiry.is_set())
    }

    /// Fails with `TypeMismatch` unless `seconds` is positive.
    fn set_expiry(&self, tree: &mut ModelTree, seconds: i64) -> ModelResult<()> {
        check_attribute::<Self>(tree, "expiry", &Scalar::Integer(seconds))?;
        update_lock::<Self>(tree, self.id(), "expiry", |l| {
            l.expiry.set(seconds);
            l.expiry.state()
        })
    }

    fn unset_expiry(&self, tree: &mut ModelTree) -> ModelResult<()> {
        update_lock::<Self>(tree, self.id(), "expiry", |l| {
            l.expiry.unset();
            l.expiry.state()
        })
    }

    fn lock_action(&self, tree: &ModelTree) -> ModelResult<AllSomeType> {
        Ok(*lock_data::<Self>(tree, self.id())?.lock_action.get())
    }

    fn is_lock_action_set(&self, tree: &ModelTree) -> ModelResult<bool> {
        Ok(lock_data::<Self>(tree, self.id())?.lock_action.is_set())
    }

    fn set_lock_action(&self, tree: &mut ModelTree, action: AllSomeType) -> ModelResult<()> {
        update_lock::<Self>(tree, self.id(), "lockAction", |l| {
            l.lock_action.set(action);
            l.lock_action.state()
        })
    }

    fn unset_lock_action(&self, tree: &mut ModelTree) -> ModelResult<()> {
        update_lock::<Self>(tree, self.id(), "lockAction", |l| {
            l.lock_action.unset();
            l.lock_action.state()
        })
    }

    fn handle<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(lock_data::<Self>(tree, self.id())?.request.handle.as_deref())
    }

    fn set_handle(&self, tree: &mut ModelTree, handle: Option<String>) -> ModelResult<()> {
        update_lock::<Self>(tree, self.id(), "handle", |l| {
            l.request.handle = handle;
            presence(&l.request.handle)
        })
    }
}

impl LockRequest for LockFeature {}

impl LockRequest for GetFeatureWithLock {}

impl LockFeature {
    pub fn lock_id<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        match tree.data(self.0)? {
            NodeData::LockFeature(data) => Ok(data.lock_id.as_deref()),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    pub fn set_lock_id(&self, tree: &mut ModelTree, lock_id: Option<String>) -> ModelResult<()> {
        tree.update_attribute(self.0, "lockId", Self::TYPE_NAME, |data| match data {
            NodeData::LockFeature(l) => {
                l.lock_id = lock_id;
                Some(presence(&l.lock_id))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use wfs_content::ContentError;

    #[test]
    fn expiry_and_lock_action_defaults() {
        let mut tree = ModelTree::default();
        let lock = LockFeature::create(&mut tree).unwrap();
        assert_eq!(lock.expiry(&tree).unwrap(), 300);
        assert_eq!(lock.lock_action(&tree).unwrap(), AllSomeType::All);
        assert!(!lock.is_expiry_set(&tree).unwrap());

        lock.set_expiry(&mut tree, 60).unwrap();
        lock.set_lock_action(&mut tree, AllSomeType::Some).unwrap();
        assert_eq!(lock.expiry(&tree).unwrap(), 60);
        assert!(lock.is_lock_action_set(&tree).unwrap());

        lock.unset_expiry(&mut tree).unwrap();
        lock.unset_lock_action(&mut tree).unwrap();
        assert_eq!(lock.expiry(&tree).unwrap(), 300);
        assert_eq!(lock.lock_action(&tree).unwrap(), AllSomeType::All);
    }

    #[test]
    fn expiry_must_be_positive() {
        let mut tree = ModelTree::default();
        let lock = LockFeature::create(&mut tree).unwrap();
        lock.set_expiry(&mut tree, 120).unwrap();

        for bad in [0, -5] {
            let err = lock.set_expiry(&mut tree, bad).unwrap_err();
            assert!(matches!(
                err,
                ModelError::Content(ContentError::TypeMismatch { ref expected, .. }) if expected == "positiveInteger"
            ));
        }
        assert_eq!(lock.expiry(&tree).unwrap(), 120);

        let get = GetFeatureWithLock::create(&mut tree).unwrap();
        assert!(get.set_expiry(&mut tree, -1).is_err());
        assert!(!get.is_expiry_set(&tree).unwrap());
    }

    #[test]
    fn query_expressions_keep_their_element_names() {
        let mut tree = ModelTree::default();
        let get = GetFeatureWithLock::create(&mut tree).unwrap();
        let query = AnyNode::create(&mut tree).unwrap();
        let stored = AnyNode::create(&mut tree).unwrap();
        assert_eq!(get.push_query_expression(&mut tree, FeatureKey::wfs("Query"), query).unwrap(), 0);
        assert_eq!(
            get.push_query_expression(&mut tree, FeatureKey::wfs("StoredQuery"), stored)
                .unwrap(),
            1
        );

        let expressions = get.query_expressions(&tree).unwrap();
        assert_eq!(expressions[0], (FeatureKey::wfs("Query"), query));
        assert_eq!(expressions[1].0.name(), "StoredQuery");
        assert_eq!(get.query_expression(&tree, 1).unwrap(), Some(stored));
    }

    #[test]
    fn foreign_key_is_rejected() {
        let mut tree = ModelTree::default();
        let lock = LockFeature::create(&mut tree).unwrap();
        let query = AnyNode::create(&mut tree).unwrap();
        let err = lock
            .push_query_expression(&mut tree, FeatureKey::wfs("Filter"), query)
            .unwrap_err();
        assert!(matches!(err, ModelError::Content(ContentError::UnknownKey { .. })));
        assert!(tree.owner(query.id()).unwrap().is_none());
    }

    #[test]
    fn lock_id_belongs_to_lock_feature() {
        let mut tree = ModelTree::default();
        let lock = LockFeature::create(&mut tree).unwrap();
        lock.set_lock_id(&mut tree, Some("L1".into())).unwrap();
        assert_eq!(lock.lock_id(&tree).unwrap(), Some("L1"));

        let get = GetFeatureWithLock::create(&mut tree).unwrap();
        assert!(matches!(
            LockFeature::wrap(get.id()).lock_id(&tree),
            Err(ModelError::WrongContainer { .. })
        ));
        assert!(matches!(
            LockFeature::wrap(get.id()).expiry(&tree),
            Err(ModelError::WrongContainer { .. })
        ));
    }
}
