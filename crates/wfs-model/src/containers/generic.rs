use indexmap::IndexMap;
use wfs_schema::wfs20;
use wfs_types::{FeatureKey, NodeId, SlotState};

use super::{wrong_container, Container};
use crate::data::{GenericData, NodeData};
use crate::error::ModelResult;
use crate::tree::ModelTree;

/// An element of `AnyType`: filters, property updates, stored queries,
/// feature instances and anything else admitted by a wildcard.
///
/// Content is mixed and unconstrained; attributes are kept as literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnyNode(NodeId);

impl Container for AnyNode {
    const TYPE_NAME: &'static str = wfs20::ANY_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

impl AnyNode {
    fn data<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t GenericData> {
        match tree.data(self.0)? {
            NodeData::Generic(data) if data.container == Self::TYPE_NAME => Ok(data),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    pub fn attributes<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t IndexMap<String, String>> {
        Ok(&self.data(tree)?.attributes)
    }

    pub fn attribute<'t>(&self, tree: &'t ModelTree, name: &str) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.attributes.get(name).map(String::as_str))
    }

    /// Set or remove an attribute literal. Insertion order is preserved.
    pub fn set_attribute(
        &self,
        tree: &mut ModelTree,
        name: &'static str,
        value: Option<String>,
    ) -> ModelResult<()> {
        tree.update_attribute(self.0, name, Self::TYPE_NAME, |data| match data {
            NodeData::Generic(g) => Some(match value {
                Some(value) => {
                    g.attributes.insert(name.to_string(), value);
                    SlotState::Set
                }
                None => {
                    g.attributes.shift_remove(name);
                    SlotState::Cleared
                }
            }),
            _ => None,
        })
    }

    pub fn append_text(&self, tree: &mut ModelTree, text: impl Into<String>) -> ModelResult<()> {
        tree.append_text(self.0, text).map(|_| ())
    }

    /// Append a nested element owning `child`.
    pub fn append_element(&self, tree: &mut ModelTree, key: FeatureKey, child: AnyNode) -> ModelResult<()> {
        tree.append(self.0, key, child.as_value()).map(|_| ())
    }

    /// Concatenated character data.
    pub fn text(&self, tree: &ModelTree) -> ModelResult<String> {
        Ok(tree.content(self.0)?.texts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_insertion_order() {
        let mut tree = ModelTree::default();
        let node = AnyNode::create(&mut tree).unwrap();
        node.set_attribute(&mut tree, "valueReference", Some("roads:width".into()))
            .unwrap();
        node.set_attribute(&mut tree, "action", Some("replace".into())).unwrap();
        let names: Vec<&String> = node.attributes(&tree).unwrap().keys().collect();
        assert_eq!(names, ["valueReference", "action"]);

        node.set_attribute(&mut tree, "valueReference", None).unwrap();
        assert_eq!(node.attribute(&tree, "valueReference").unwrap(), None);
        assert_eq!(node.attribute(&tree, "action").unwrap(), Some("replace"));
    }

    #[test]
    fn nested_elements_and_text() {
        let mut tree = ModelTree::default();
        let filter = AnyNode::create(&mut tree).unwrap();
        let id = AnyNode::create(&mut tree).unwrap();
        filter
            .append_element(&mut tree, FeatureKey::wildcard(wfs_types::namespace::FES, "ResourceId"), id)
            .unwrap();
        id.set_attribute(&mut tree, "rid", Some("road.12".into())).unwrap();
        id.append_text(&mut tree, "x").unwrap();

        assert_eq!(tree.children(filter.id()).unwrap(), vec![id.id()]);
        assert_eq!(id.text(&tree).unwrap(), "x");
    }
}
