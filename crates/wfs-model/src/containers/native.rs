use wfs_content::{Entry, Value};
use wfs_schema::wfs20;
use wfs_types::{FeatureKey, NodeId, SlotState};

use super::{presence, wrong_container, Container};
use crate::data::{NativeData, NodeData};
use crate::error::ModelResult;
use crate::tree::ModelTree;

/// `wfs:Native`: vendor-specific content, free text and foreign elements
/// interleaved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Native(NodeId);

impl Container for Native {
    const TYPE_NAME: &'static str = wfs20::NATIVE_TYPE;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

impl Native {
    fn data<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t NativeData> {
        match tree.data(self.0)? {
            NodeData::Native(data) => Ok(data),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    fn update(
        &self,
        tree: &mut ModelTree,
        name: &'static str,
        apply: impl FnOnce(&mut NativeData) -> SlotState,
    ) -> ModelResult<()> {
        tree.update_attribute(self.0, name, Self::TYPE_NAME, |data| match data {
            NodeData::Native(n) => Some(apply(n)),
            _ => None,
        })
    }

    pub fn append_text(&self, tree: &mut ModelTree, text: impl Into<String>) -> ModelResult<()> {
        tree.append_text(self.0, text).map(|_| ())
    }

    /// Append a foreign element or literal under a wildcard key.
    pub fn append_any(&self, tree: &mut ModelTree, key: FeatureKey, value: Value) -> ModelResult<()> {
        tree.append(self.0, key, value).map(|_| ())
    }

    /// Content in document order, text and elements interleaved.
    pub fn entries<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t [Entry]> {
        Ok(tree.content(self.0)?.entries())
    }

    pub fn text(&self, tree: &ModelTree) -> ModelResult<String> {
        Ok(tree.content(self.0)?.texts())
    }

    /// Remove all content, releasing any owned elements.
    pub fn clear(&self, tree: &mut ModelTree) -> ModelResult<usize> {
        tree.remove_all(self.0, |_| true)
    }

    pub fn vendor_id<'t>(&self, tree: &'t ModelTree) -> ModelResult<Option<&'t str>> {
        Ok(self.data(tree)?.vendor_id.as_deref())
    }

    pub fn set_vendor_id(&self, tree: &mut ModelTree, vendor_id: Option<String>) -> ModelResult<()> {
        self.update(tree, "vendorId", |n| {
            n.vendor_id = vendor_id;
            presence(&n.vendor_id)
        })
    }

    /// Reads as `false` until assigned.
    pub fn safe_to_ignore(&self, tree: &ModelTree) -> ModelResult<bool> {
        Ok(*self.data(tree)?.safe_to_ignore.get())
    }

    pub fn is_safe_to_ignore_set(&self, tree: &ModelTree) -> ModelResult<bool> {
        Ok(self.data(tree)?.safe_to_ignore.is_set())
    }

    pub fn set_safe_to_ignore(&self, tree: &mut ModelTree, safe: bool) -> ModelResult<()> {
        self.update(tree, "safeToIgnore", |n| {
            n.safe_to_ignore.set(safe);
            n.safe_to_ignore.state()
        })
    }

    pub fn unset_safe_to_ignore(&self, tree: &mut ModelTree) -> ModelResult<()> {
        self.update(tree, "safeToIgnore", |n| {
            n.safe_to_ignore.unset();
            n.safe_to_ignore.state()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfs_types::Scalar;

    #[test]
    fn text_and_elements_interleave() {
        let mut tree = ModelTree::default();
        let native = Native::create(&mut tree).unwrap();
        native.append_text(&mut tree, "ALTER SESSION ").unwrap();
        native
            .append_any(&mut tree, FeatureKey::wildcard("urn:vendor", "Flag"), Value::Scalar(Scalar::Bool(true)))
            .unwrap();
        native.append_text(&mut tree, "COMMIT").unwrap();

        let kinds: Vec<String> = native
            .entries(&tree)
            .unwrap()
            .iter()
            .map(|e| e.value.kind_label())
            .collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(native.text(&tree).unwrap(), "ALTER SESSION COMMIT");

        assert_eq!(native.clear(&mut tree).unwrap(), 3);
        assert!(native.entries(&tree).unwrap().is_empty());
    }

    #[test]
    fn safe_to_ignore_has_no_default() {
        let mut tree = ModelTree::default();
        let native = Native::create(&mut tree).unwrap();
        assert!(!native.safe_to_ignore(&tree).unwrap());
        assert!(!native.is_safe_to_ignore_set(&tree).unwrap());

        native.set_safe_to_ignore(&mut tree, false).unwrap();
        assert!(native.is_safe_to_ignore_set(&tree).unwrap());
        native.unset_safe_to_ignore(&mut tree).unwrap();
        assert!(!native.is_safe_to_ignore_set(&tree).unwrap());

        native.set_vendor_id(&mut tree, Some("acme".into())).unwrap();
        assert_eq!(native.vendor_id(&tree).unwrap(), Some("acme"));
    }
}
