//! The four feature-manipulating transaction actions.

use wfs_content::SlotRef;
use wfs_schema::wfs20;
use wfs_types::{FeatureKey, FeatureKind, NodeId, QName, SlotState};

use super::{narrow, presence, wrong_container, AnyNode, Container};
use crate::data::{DeleteData, FeatureActionData, NodeData, UpdateData};
use crate::error::ModelResult;
use crate::tree::ModelTree;

/// `wfs:Insert`: one or more new feature instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Insert(NodeId);

/// `wfs:Update`: property replacements applied to the features a filter
/// selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Update(NodeId);

/// `wfs:Delete`: removes the features a filter selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Delete(NodeId);

/// `wfs:Replace`: substitutes a feature for the features a filter selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Replace(NodeId);

impl Container for Insert {
    const TYPE_NAME: &'static str = wfs20::INSERT_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

impl Container for Update {
    const TYPE_NAME: &'static str = wfs20::UPDATE_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

impl Container for Delete {
    const TYPE_NAME: &'static str = wfs20::DELETE_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

impl Container for Replace {
    const TYPE_NAME: &'static str = wfs20::REPLACE_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

fn filter_slot() -> SlotRef {
    SlotRef::single(wfs20::FILTER)
}

fn filter(tree: &ModelTree, id: NodeId) -> ModelResult<Option<AnyNode>> {
    tree.content(id)?
        .get_slot(&filter_slot())?
        .map(narrow::<AnyNode>)
        .transpose()
}

fn set_filter(tree: &mut ModelTree, id: NodeId, filter: Option<AnyNode>) -> ModelResult<()> {
    tree.set_slot(id, filter_slot(), filter.map(|f| f.as_value()))
}

/// Feature instances held as wildcard children, in document order.
fn features(tree: &ModelTree, id: NodeId) -> ModelResult<Vec<(FeatureKey, NodeId)>> {
    Ok(tree
        .content(id)?
        .wildcards()
        .filter_map(|e| e.child().map(|c| (e.key.clone(), c.id)))
        .collect())
}

fn add_feature(tree: &mut ModelTree, id: NodeId, name: QName, feature: AnyNode) -> ModelResult<()> {
    let key = FeatureKey::new(name.namespace, name.local, FeatureKind::WildcardAny);
    tree.append(id, key, feature.as_value()).map(|_| ())
}

// ---------------------------------------------------------------
// Insert / Replace
// ---------------------------------------------------------------

fn feature_action<'t, T: Container>(tree: &'t ModelTree, id: NodeId) -> ModelResult<&'t FeatureActionData> {
    match tree.data(id)? {
        NodeData::Insert(data) if T::TYPE_NAME == wfs20::INSERT_TYPE => Ok(data),
        NodeData::Replace(data) if T::TYPE_NAME == wfs20::REPLACE_TYPE => Ok(data),
        other => Err(wrong_container::<T>(id, other)),
    }
}

fn update_feature_action<T: Container>(
    tree: &mut ModelTree,
    id: NodeId,
    name: &'static str,
    apply: impl FnOnce(&mut FeatureActionData) -> SlotState,
) -> ModelResult<()> {
    tree.update_attribute(id, name, T::TYPE_NAME, |data| match data {
        NodeData::Insert(a) if T::TYPE_NAME == wfs20::INSERT_TYPE => Some(apply(a)),
        NodeData::Replace(a) if T::TYPE_NAME == wfs20::REPLACE_TYPE => Some(apply(a)),
        _ => None,
    })
}

impl Insert {
    /// Add a feature instance, keyed by its element name.
    pub fn add_feature(&self, tree: &mut ModelTree, name: QName, feature: AnyNode) -> ModelResult<()> {
        add_feature(tree, self.0, name, feature)
    }

    pub fn features(&self, tree: &ModelTree) -> ModelResult<Vec<(FeatureKey, NodeId)>> {
        features(tree, self.0)
    }

    pub fn input_format<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t str> {
        Ok(feature_action::<Self>(tree, self.0)?.input_format.get())
    }

    pub fn is_input_format_set(&self, tree: &ModelTree) -> ModelResult<bool> {
        Ok(feature_action::<Self>(tree, self.0)?.input_format.is_set())
    }

    pub fn set_input_format(&self, tree: &mut ModelTree, format: impl Into<String>) -> ModelResult<()> {
        let format = format.into();
        update_feature_action::<Self>(tree, self.0, "inputFormat", |a| {
            a.input_format.set(format);
            a.input_format.state()
        })
    }

    pub fn unset_input_format(&self, tree: &mut ModelTree) -> ModelResult<()> {
        update_feature_action::<Self>(tree, self.0, "inputFormat", |a| {
            a.input_format.unset();
            a.input_format.state()
        })
    }

    pub fn handle<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(feature_action::<Self>(tree, self.0)?.handle.as_deref())
    }

    pub fn set_handle(&self, tree: &mut ModelTree, handle: Option<String>) -> ModelResult<()> {
        update_feature_action::<Self>(tree, self.0, "handle", |a| {
            a.handle = handle;
            presence(&a.handle)
        })
    }

    pub fn srs_name<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(feature_action::<Self>(tree, self.0)?.srs_name.as_deref())
    }

    pub fn set_srs_name(&self, tree: &mut ModelTree, srs_name: Option<String>) -> ModelResult<()> {
        update_feature_action::<Self>(tree, self.0, "srsName", |a| {
            a.srs_name = srs_name;
            presence(&a.srs_name)
        })
    }
}

impl Replace {
    /// Set the replacement feature instance.
    pub fn add_feature(&self, tree: &mut ModelTree, name: QName, feature: AnyNode) -> ModelResult<()> {
        add_feature(tree, self.0, name, feature)
    }

    pub fn features(&self, tree: &ModelTree) -> ModelResult<Vec<(FeatureKey, NodeId)>> {
        features(tree, self.0)
    }

    pub fn filter(&self, tree: &ModelTree) -> ModelResult<Option<AnyNode>> {
        filter(tree, self.0)
    }

    pub fn set_filter(&self, tree: &mut ModelTree, filter: Option<AnyNode>) -> ModelResult<()> {
        set_filter(tree, self.0, filter)
    }

    pub fn input_format<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t str> {
        Ok(feature_action::<Self>(tree, self.0)?.input_format.get())
    }

    pub fn set_input_format(&self, tree: &mut ModelTree, format: impl Into<String>) -> ModelResult<()> {
        let format = format.into();
        update_feature_action::<Self>(tree, self.0, "inputFormat", |a| {
            a.input_format.set(format);
            a.input_format.state()
        })
    }

    pub fn unset_input_format(&self, tree: &mut ModelTree) -> ModelResult<()> {
        update_feature_action::<Self>(tree, self.0, "inputFormat", |a| {
            a.input_format.unset();
            a.input_format.state()
        })
    }

    pub fn handle<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(feature_action::<Self>(tree, self.0)?.handle.as_deref())
    }

    pub fn set_handle(&self, tree: &mut ModelTree, handle: Option<String>) -> ModelResult<()> {
        update_feature_action::<Self>(tree, self.0, "handle", |a| {
            a.handle = handle;
            presence(&a.handle)
        })
    }

    pub fn srs_name<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(feature_action::<Self>(tree, self.0)?.srs_name.as_deref())
    }

    pub fn set_srs_name(&self, tree: &mut ModelTree, srs_name: Option<String>) -> ModelResult<()> {
        update_feature_action::<Self>(tree, self.0, "srsName", |a| {
            a.srs_name = srs_name;
            presence(&a.srs_name)
        })
    }
}

// ---------------------------------------------------------------
// Update
// ---------------------------------------------------------------

impl Update {
    fn data<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t UpdateData> {
        match tree.data(self.0)? {
            NodeData::Update(data) => Ok(data),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    fn update(
        &self,
        tree: &mut ModelTree,
        name: &'static str,
        apply: impl FnOnce(&mut UpdateData) -> SlotState,
    ) -> ModelResult<()> {
        tree.update_attribute(self.0, name, Self::TYPE_NAME, |data| match data {
            NodeData::Update(u) => Some(apply(u)),
            _ => None,
        })
    }

    /// Add a `wfs:Property` replacement in a fresh slot.
    pub fn push_property(&self, tree: &mut ModelTree, property: AnyNode) -> ModelResult<u32> {
        Ok(tree.push_slot(self.0, wfs20::PROPERTY, property.as_value())?.ordinal)
    }

    pub fn properties(&self, tree: &ModelTree) -> ModelResult<Vec<AnyNode>> {
        tree.content(self.0)?
            .occupants(wfs20::PROPERTY)?
            .into_iter()
            .map(|e| narrow::<AnyNode>(&e.value))
            .collect()
    }

    pub fn filter(&self, tree: &ModelTree) -> ModelResult<Option<AnyNode>> {
        filter(tree, self.0)
    }

    pub fn set_filter(&self, tree: &mut ModelTree, filter: Option<AnyNode>) -> ModelResult<()> {
        set_filter(tree, self.0, filter)
    }

    pub fn type_name<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t QName>> {
        Ok(self.data(tree)?.type_name.as_ref())
    }

    pub fn set_type_name(&self, tree: &mut ModelTree, type_name: Option<QName>) -> ModelResult<()> {
        self.update(tree, "typeName", |u| {
            u.type_name = type_name;
            presence(&u.type_name)
        })
    }

    pub fn input_format<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t str> {
        Ok(self.data(tree)?.input_format.get())
    }

    pub fn set_input_format(&self, tree: &mut ModelTree, format: impl Into<String>) -> ModelResult<()> {
        let format = format.into();
        self.update(tree, "inputFormat", |u| {
            u.input_format.set(format);
            u.input_format.state()
        })
    }

    pub fn unset_input_format(&self, tree: &mut ModelTree) -> ModelResult<()> {
        self.update(tree, "inputFormat", |u| {
            u.input_format.unset();
            u.input_format.state()
        })
    }

    pub fn handle<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.handle.as_deref())
    }

    pub fn set_handle(&self, tree: &mut ModelTree, handle: Option<String>) -> ModelResult<()> {
        self.update(tree, "handle", |u| {
            u.handle = handle;
            presence(&u.handle)
        })
    }

    /// Reference system of geometry values in the property replacements.
    pub fn srs_name<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.srs_name.as_deref())
    }

    pub fn set_srs_name(&self, tree: &mut ModelTree, srs_name: Option<String>) -> ModelResult<()> {
        self.update(tree, "srsName", |u| {
            u.srs_name = srs_name;
            presence(&u.srs_name)
        })
    }
}

// ---------------------------------------------------------------
// Delete
// ---------------------------------------------------------------

impl Delete {
    fn data<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t DeleteData> {
        match tree.data(self.0)? {
            NodeData::Delete(data) => Ok(data),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    fn update(
        &self,
        tree: &mut ModelTree,
        name: &'static str,
        apply: impl FnOnce(&mut DeleteData) -> SlotState,
    ) -> ModelResult<()> {
        tree.update_attribute(self.0, name, Self::TYPE_NAME, |data| match data {
            NodeData::Delete(d) => Some(apply(d)),
            _ => None,
        })
    }

    pub fn filter(&self, tree: &ModelTree) -> ModelResult<Option<AnyNode>> {
        filter(tree, self.0)
    }

    pub fn set_filter(&self, tree: &mut ModelTree, filter: Option<AnyNode>) -> ModelResult<()> {
        set_filter(tree, self.0, filter)
    }

    pub fn type_name<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t QName>> {
        Ok(self.data(tree)?.type_name.as_ref())
    }

    pub fn set_type_name(&self, tree: &mut ModelTree, type_name: Option<QName>) -> ModelResult<()> {
        self.update(tree, "typeName", |d| {
            d.type_name = type_name;
            presence(&d.type_name)
        })
    }

    pub fn handle<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.handle.as_deref())
    }

    pub fn set_handle(&self, tree: &mut ModelTree, handle: Option<String>) -> ModelResult<()> {
        self.update(tree, "handle", |d| {
            d.handle = handle;
            presence(&d.handle)
        })
    }
}
