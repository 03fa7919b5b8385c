use wfs_content::{SlotRef, Value};
use wfs_schema::wfs20;
use wfs_types::NodeId;

use super::{narrow, Container};
use crate::error::ModelResult;
use crate::tree::ModelTree;

/// `wfs:ValueList`: one or more `wfs:Value` elements, each holding text or
/// an arbitrary element.
///
/// An empty list is representable; the `1..*` cardinality is a document
/// concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueList(NodeId);

impl Container for ValueList {
    const TYPE_NAME: &'static str = wfs20::VALUE_LIST_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

fn value_slot(ordinal: u32) -> SlotRef {
    SlotRef::nth(wfs20::VALUE, ordinal)
}

impl ValueList {
    /// Add a value in a fresh slot. Returns its ordinal.
    pub fn push_value(&self, tree: &mut ModelTree, value: impl Into<Value>) -> ModelResult<u32> {
        Ok(tree.push_slot(self.0, wfs20::VALUE, value.into())?.ordinal)
    }

    pub fn value<'t>(&self, tree: &'t ModelTree, ordinal: u32) -> ModelResult<Option<&'t Value>> {
        Ok(tree.content(self.0)?.get_slot(&value_slot(ordinal))?)
    }

    pub fn set_value(&self, tree: &mut ModelTree, ordinal: u32, value: Option<Value>) -> ModelResult<()> {
        tree.set_slot(self.0, value_slot(ordinal), value)
    }

    /// The value in slot `ordinal` as an element. Text values are a type
    /// mismatch.
    pub fn value_as_child<T: Container>(&self, tree: &ModelTree, ordinal: u32) -> ModelResult<Option<T>> {
        self.value(tree, ordinal)?.map(narrow::<T>).transpose()
    }

    /// Every value in document order.
    pub fn values<'t>(&self, tree: &'t ModelTree) -> ModelResult<Vec<&'t Value>> {
        Ok(tree
            .content(self.0)?
            .occupants(wfs20::VALUE)?
            .into_iter()
            .map(|entry| &entry.value)
            .collect())
    }

    pub fn len(&self, tree: &ModelTree) -> ModelResult<usize> {
        Ok(tree.content(self.0)?.occupants(wfs20::VALUE)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::AnyNode;
    use crate::error::ModelError;
    use wfs_content::ContentError;

    #[test]
    fn values_mix_text_and_elements() {
        let mut tree = ModelTree::default();
        let list = ValueList::create(&mut tree).unwrap();
        let point = AnyNode::create(&mut tree).unwrap();
        assert_eq!(list.push_value(&mut tree, Value::text("12")).unwrap(), 0);
        assert_eq!(list.push_value(&mut tree, point.as_value()).unwrap(), 1);

        assert_eq!(list.len(&tree).unwrap(), 2);
        assert_eq!(list.value(&tree, 0).unwrap().and_then(Value::as_text), Some("12"));
        assert_eq!(list.value_as_child::<AnyNode>(&tree, 1).unwrap(), Some(point));
        assert_eq!(list.value_as_child::<AnyNode>(&tree, 5).unwrap(), None);
    }

    #[test]
    fn text_value_is_not_a_child() {
        let mut tree = ModelTree::default();
        let list = ValueList::create(&mut tree).unwrap();
        list.push_value(&mut tree, Value::text("12")).unwrap();
        let err = list.value_as_child::<AnyNode>(&tree, 0).unwrap_err();
        assert!(matches!(err, ModelError::Content(ContentError::TypeMismatch { .. })));
    }

    #[test]
    fn set_value_moves_value_to_end() {
        let mut tree = ModelTree::default();
        let list = ValueList::create(&mut tree).unwrap();
        list.push_value(&mut tree, Value::text("a")).unwrap();
        list.push_value(&mut tree, Value::text("b")).unwrap();
        list.set_value(&mut tree, 0, Some(Value::text("c"))).unwrap();

        let texts: Vec<&str> = list
            .values(&tree)
            .unwrap()
            .into_iter()
            .filter_map(Value::as_text)
            .collect();
        assert_eq!(texts, ["b", "c"]);

        list.set_value(&mut tree, 1, None).unwrap();
        assert_eq!(list.len(&tree).unwrap(), 1);
    }
}
