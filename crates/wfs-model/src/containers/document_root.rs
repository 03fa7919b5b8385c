use indexmap::IndexMap;
use wfs_content::{ContentError, Entry, SlotRef, Value};
use wfs_schema::wfs20;
use wfs_types::{namespace, FeatureKey, NodeId, SlotState};

use super::{
    narrow, wrong_container, AnyNode, Container, Delete, GetFeatureWithLock, Insert, LockFeature, Native, Replace,
    Transaction, TransactionAction, Update, ValueList,
};
use crate::data::{DocumentRootData, NodeData};
use crate::error::ModelResult;
use crate::tree::ModelTree;

/// The document node: holds the single root element plus the namespace
/// bindings and schema locations declared on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentRoot(NodeId);

impl Container for DocumentRoot {
    const TYPE_NAME: &'static str = wfs20::DOCUMENT_ROOT;

    fn wrap(id: NodeId) -> Self {
        Self(id)
    }

    fn id(&self) -> NodeId {
        self.0
    }
}

/// The element occupying the root-element slot of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootElement {
    Transaction(Transaction),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Replace(Replace),
    Native(Native),
    ValueList(ValueList),
    LockFeature(LockFeature),
    GetFeatureWithLock(GetFeatureWithLock),
    Value(AnyNode),
    /// A global element without a typed container, e.g. `GetFeature`.
    Untyped { name: &'static str, node: AnyNode },
}

impl RootElement {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Transaction(e) => e.id(),
            Self::Insert(e) => e.id(),
            Self::Update(e) => e.id(),
            Self::Delete(e) => e.id(),
            Self::Replace(e) => e.id(),
            Self::Native(e) => e.id(),
            Self::ValueList(e) => e.id(),
            Self::LockFeature(e) => e.id(),
            Self::GetFeatureWithLock(e) => e.id(),
            Self::Value(e) => e.id(),
            Self::Untyped { node, .. } => node.id(),
        }
    }

    /// Element name in the WFS namespace.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "Transaction",
            Self::Insert(_) => "Insert",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
            Self::Replace(_) => "Replace",
            Self::Native(_) => "Native",
            Self::ValueList(_) => "ValueList",
            Self::LockFeature(_) => "LockFeature",
            Self::GetFeatureWithLock(_) => "GetFeatureWithLock",
            Self::Value(_) => wfs20::VALUE,
            Self::Untyped { name, .. } => *name,
        }
    }

    pub fn as_value(&self) -> Value {
        match self {
            Self::Transaction(e) => e.as_value(),
            Self::Insert(e) => e.as_value(),
            Self::Update(e) => e.as_value(),
            Self::Delete(e) => e.as_value(),
            Self::Replace(e) => e.as_value(),
            Self::Native(e) => e.as_value(),
            Self::ValueList(e) => e.as_value(),
            Self::LockFeature(e) => e.as_value(),
            Self::GetFeatureWithLock(e) => e.as_value(),
            Self::Value(e) => e.as_value(),
            Self::Untyped { node, .. } => node.as_value(),
        }
    }

    /// The transaction action this root element is, if any.
    pub fn as_transaction_action(&self) -> Option<TransactionAction> {
        match *self {
            Self::Insert(a) => Some(a.into()),
            Self::Update(a) => Some(a.into()),
            Self::Delete(a) => Some(a.into()),
            Self::Replace(a) => Some(a.into()),
            Self::Native(a) => Some(a.into()),
            _ => None,
        }
    }

    /// An untyped root element. `name` must be one of the global elements
    /// without a typed container.
    pub fn untyped(name: &str, node: AnyNode) -> Option<Self> {
        untyped_name(name).map(|name| Self::Untyped { name, node })
    }

    fn from_entry(entry: &Entry) -> ModelResult<Self> {
        let value = &entry.value;
        if let Some(name) = untyped_name(entry.key.name()) {
            return Ok(Self::Untyped {
                name,
                node: narrow(value)?,
            });
        }
        Ok(match entry.key.name() {
            "Transaction" => Self::Transaction(narrow(value)?),
            "Insert" => Self::Insert(narrow(value)?),
            "Update" => Self::Update(narrow(value)?),
            "Delete" => Self::Delete(narrow(value)?),
            "Replace" => Self::Replace(narrow(value)?),
            "Native" => Self::Native(narrow(value)?),
            "ValueList" => Self::ValueList(narrow(value)?),
            "LockFeature" => Self::LockFeature(narrow(value)?),
            "GetFeatureWithLock" => Self::GetFeatureWithLock(narrow(value)?),
            wfs20::VALUE => Self::Value(narrow(value)?),
            _ => {
                return Err(ContentError::UnknownKey {
                    group: wfs20::ROOT_ELEMENT.to_string(),
                    key: entry.key.clone(),
                }
                .into())
            }
        })
    }
}

fn untyped_name(name: &str) -> Option<&'static str> {
    wfs20::UNTYPED_GLOBAL_ELEMENTS.iter().copied().find(|n| *n == name)
}

fn root_slot() -> SlotRef {
    SlotRef::single(wfs20::ROOT_ELEMENT)
}

impl DocumentRoot {
    fn data<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t DocumentRootData> {
        match tree.data(self.0)? {
            NodeData::DocumentRoot(data) => Ok(data),
            other => Err(wrong_container::<Self>(self.0, other)),
        }
    }

    fn update(
        &self,
        tree: &mut ModelTree,
        name: &'static str,
        apply: impl FnOnce(&mut DocumentRootData) -> SlotState,
    ) -> ModelResult<()> {
        tree.update_attribute(self.0, name, Self::TYPE_NAME, |data| match data {
            NodeData::DocumentRoot(d) => Some(apply(d)),
            _ => None,
        })
    }

    // ---------------------------------------------------------------
    // Root element
    // ---------------------------------------------------------------

    pub fn root_element(&self, tree: &ModelTree) -> ModelResult<Option<RootElement>> {
        tree.content(self.0)?
            .slot_entry(&root_slot())?
            .map(RootElement::from_entry)
            .transpose()
    }

    /// Replace the root element. Any previous root element is released.
    pub fn set_root_element(&self, tree: &mut ModelTree, element: Option<RootElement>) -> ModelResult<()> {
        match element {
            Some(element) => tree.set_slot_keyed(
                self.0,
                root_slot(),
                FeatureKey::wfs(element.element_name()),
                element.as_value(),
            ),
            None => tree.clear_slot(self.0, &root_slot()),
        }
    }

    /// The root element when it is one of the transaction actions.
    pub fn abstract_transaction_action(&self, tree: &ModelTree) -> ModelResult<Option<TransactionAction>> {
        Ok(self
            .root_element(tree)?
            .and_then(|element| element.as_transaction_action()))
    }

    /// The occupant of the root slot when it is held under `name`.
    fn element<T: Container>(&self, tree: &ModelTree, name: &str) -> ModelResult<Option<T>> {
        match tree.content(self.0)?.slot_entry(&root_slot())? {
            Some(entry) if entry.key.is_named(namespace::WFS, name) => narrow::<T>(&entry.value).map(Some),
            _ => Ok(None),
        }
    }

    /// Setting evicts whatever root element was present. Clearing only
    /// affects an occupant held under `name`.
    fn set_element<T: Container>(&self, tree: &mut ModelTree, name: &str, element: Option<T>) -> ModelResult<()> {
        match element {
            Some(element) => tree.set_slot_keyed(self.0, root_slot(), FeatureKey::wfs(name), element.as_value()),
            None => {
                let held = tree
                    .content(self.0)?
                    .slot_entry(&root_slot())?
                    .is_some_and(|entry| entry.key.is_named(namespace::WFS, name));
                if held {
                    tree.clear_slot(self.0, &root_slot())?;
                }
                Ok(())
            }
        }
    }

    pub fn transaction(&self, tree: &ModelTree) -> ModelResult<Option<Transaction>> {
        self.element(tree, "Transaction")
    }

    pub fn set_transaction(&self, tree: &mut ModelTree, element: Option<Transaction>) -> ModelResult<()> {
        self.set_element(tree, "Transaction", element)
    }

    pub fn insert(&self, tree: &ModelTree) -> ModelResult<Option<Insert>> {
        self.element(tree, "Insert")
    }

    pub fn set_insert(&self, tree: &mut ModelTree, element: Option<Insert>) -> ModelResult<()> {
        self.set_element(tree, "Insert", element)
    }

    pub fn update_element(&self, tree: &ModelTree) -> ModelResult<Option<Update>> {
        self.element(tree, "Update")
    }

    pub fn set_update_element(&self, tree: &mut ModelTree, element: Option<Update>) -> ModelResult<()> {
        self.set_element(tree, "Update", element)
    }

    pub fn delete(&self, tree: &ModelTree) -> ModelResult<Option<Delete>> {
        self.element(tree, "Delete")
    }

    pub fn set_delete(&self, tree: &mut ModelTree, element: Option<Delete>) -> ModelResult<()> {
        self.set_element(tree, "Delete", element)
    }

    pub fn replace(&self, tree: &ModelTree) -> ModelResult<Option<Replace>> {
        self.element(tree, "Replace")
    }

    pub fn set_replace(&self, tree: &mut ModelTree, element: Option<Replace>) -> ModelResult<()> {
        self.set_element(tree, "Replace", element)
    }

    pub fn native(&self, tree: &ModelTree) -> ModelResult<Option<Native>> {
        self.element(tree, "Native")
    }

    pub fn set_native(&self, tree: &mut ModelTree, element: Option<Native>) -> ModelResult<()> {
        self.set_element(tree, "Native", element)
    }

    pub fn value_list(&self, tree: &ModelTree) -> ModelResult<Option<ValueList>> {
        self.element(tree, "ValueList")
    }

    pub fn set_value_list(&self, tree: &mut ModelTree, element: Option<ValueList>) -> ModelResult<()> {
        self.set_element(tree, "ValueList", element)
    }

    pub fn lock_feature(&self, tree: &ModelTree) -> ModelResult<Option<LockFeature>> {
        self.element(tree, "LockFeature")
    }

    pub fn set_lock_feature(&self, tree: &mut ModelTree, element: Option<LockFeature>) -> ModelResult<()> {
        self.set_element(tree, "LockFeature", element)
    }

    pub fn get_feature_with_lock(&self, tree: &ModelTree) -> ModelResult<Option<GetFeatureWithLock>> {
        self.element(tree, "GetFeatureWithLock")
    }

    pub fn set_get_feature_with_lock(
        &self,
        tree: &mut ModelTree,
        element: Option<GetFeatureWithLock>,
    ) -> ModelResult<()> {
        self.set_element(tree, "GetFeatureWithLock", element)
    }

    /// The `wfs:Value` root element. Fails with a type mismatch when the
    /// value is held as text.
    pub fn value(&self, tree: &ModelTree) -> ModelResult<Option<AnyNode>> {
        self.element(tree, wfs20::VALUE)
    }

    pub fn set_value(&self, tree: &mut ModelTree, element: Option<AnyNode>) -> ModelResult<()> {
        self.set_element(tree, wfs20::VALUE, element)
    }

    /// The root element held under `name` when it is one of the untyped
    /// global elements (`GetFeature`, `FeatureCollection`, ...).
    pub fn untyped_element(&self, tree: &ModelTree, name: &str) -> ModelResult<Option<AnyNode>> {
        self.element(tree, name)
    }

    /// Set or clear an untyped root element. Names outside the root-element
    /// group fail with `UnknownKey`.
    pub fn set_untyped_element(&self, tree: &mut ModelTree, name: &str, element: Option<AnyNode>) -> ModelResult<()> {
        self.set_element(tree, name, element)
    }

    // ---------------------------------------------------------------
    // Mixed content
    // ---------------------------------------------------------------

    pub fn append_text(&self, tree: &mut ModelTree, text: impl Into<String>) -> ModelResult<()> {
        tree.append_text(self.0, text).map(|_| ())
    }

    pub fn text(&self, tree: &ModelTree) -> ModelResult<String> {
        Ok(tree.content(self.0)?.texts())
    }

    // ---------------------------------------------------------------
    // Namespace bindings
    // ---------------------------------------------------------------

    pub fn prefixes<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t IndexMap<String, String>> {
        Ok(&self.data(tree)?.prefixes)
    }

    /// Bind or unbind an `xmlns` prefix. Rebinding keeps the original position.
    pub fn set_prefix(&self, tree: &mut ModelTree, prefix: &str, uri: Option<String>) -> ModelResult<()> {
        self.update(tree, "xmlns", |d| edit_map(&mut d.prefixes, prefix, uri))
    }

    pub fn schema_locations<'t>(&self, tree: &'t ModelTree) -> ModelResult<&'t IndexMap<String, String>> {
        Ok(&self.data(tree)?.schema_locations)
    }

    pub fn set_schema_location(
        &self,
        tree: &mut ModelTree,
        namespace: &str,
        location: Option<String>,
    ) -> ModelResult<()> {
        self.update(tree, "xsi:schemaLocation", |d| {
            edit_map(&mut d.schema_locations, namespace, location)
        })
    }
}

fn edit_map(map: &mut IndexMap<String, String>, key: &str, value: Option<String>) -> SlotState {
    match value {
        Some(value) => {
            map.insert(key.to_string(), value);
            SlotState::Set
        }
        None => {
            map.shift_remove(key);
            if map.is_empty() {
                SlotState::Cleared
            } else {
                SlotState::Set
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn one_root_element_at_a_time() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        let tx = Transaction::create(&mut tree).unwrap();
        let list = ValueList::create(&mut tree).unwrap();

        doc.set_transaction(&mut tree, Some(tx)).unwrap();
        assert_eq!(doc.transaction(&tree).unwrap(), Some(tx));

        doc.set_value_list(&mut tree, Some(list)).unwrap();
        assert_eq!(doc.transaction(&tree).unwrap(), None);
        assert_eq!(doc.root_element(&tree).unwrap(), Some(RootElement::ValueList(list)));
        assert!(tree.node(tx.id()).unwrap().is_orphan());
    }

    #[test]
    fn clearing_another_element_keeps_the_root() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        let lock = LockFeature::create(&mut tree).unwrap();
        doc.set_lock_feature(&mut tree, Some(lock)).unwrap();

        doc.set_transaction(&mut tree, None).unwrap();
        assert_eq!(doc.lock_feature(&tree).unwrap(), Some(lock));

        doc.set_lock_feature(&mut tree, None).unwrap();
        assert_eq!(doc.root_element(&tree).unwrap(), None);
    }

    #[test]
    fn action_roots_surface_as_transaction_actions() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        let delete = Delete::create(&mut tree).unwrap();
        doc.set_root_element(&mut tree, Some(RootElement::Delete(delete))).unwrap();
        assert_eq!(
            doc.abstract_transaction_action(&tree).unwrap(),
            Some(TransactionAction::Delete(delete))
        );

        let tx = Transaction::create(&mut tree).unwrap();
        doc.set_transaction(&mut tree, Some(tx)).unwrap();
        assert_eq!(doc.abstract_transaction_action(&tree).unwrap(), None);
    }

    #[test]
    fn untyped_global_elements_are_root_elements() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        let get_feature = AnyNode::create(&mut tree).unwrap();
        tree.set_slot_keyed(
            doc.id(),
            root_slot(),
            FeatureKey::wfs("GetFeature"),
            get_feature.as_value(),
        )
        .unwrap();
        assert_eq!(
            doc.root_element(&tree).unwrap(),
            Some(RootElement::Untyped {
                name: "GetFeature",
                node: get_feature,
            })
        );
        assert_eq!(doc.untyped_element(&tree, "GetFeature").unwrap(), Some(get_feature));
        assert_eq!(doc.untyped_element(&tree, "Tuple").unwrap(), None);

        let collection = AnyNode::create(&mut tree).unwrap();
        let element = RootElement::untyped("FeatureCollection", collection).unwrap();
        doc.set_root_element(&mut tree, Some(element)).unwrap();
        assert_eq!(doc.root_element(&tree).unwrap().unwrap().element_name(), "FeatureCollection");
        assert!(tree.node(get_feature.id()).unwrap().is_orphan());

        assert!(RootElement::untyped("Transaction", collection).is_none());
    }

    #[test]
    fn unknown_root_name_is_rejected() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        let node = AnyNode::create(&mut tree).unwrap();
        let err = doc.set_untyped_element(&mut tree, "NoSuchElement", Some(node)).unwrap_err();
        assert!(matches!(err, ModelError::Content(ContentError::UnknownKey { .. })));
        assert_eq!(doc.root_element(&tree).unwrap(), None);
    }

    #[test]
    fn text_value_does_not_narrow() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        tree.set_slot_keyed(doc.id(), root_slot(), FeatureKey::wfs(wfs20::VALUE), Value::text("42"))
            .unwrap();
        assert!(matches!(
            doc.value(&tree),
            Err(ModelError::Content(ContentError::TypeMismatch { .. }))
        ));
        assert_eq!(doc.transaction(&tree).unwrap(), None);
    }

    #[test]
    fn mixed_text_interleaves_with_root() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        let tx = Transaction::create(&mut tree).unwrap();
        doc.append_text(&mut tree, "\n").unwrap();
        doc.set_transaction(&mut tree, Some(tx)).unwrap();
        doc.append_text(&mut tree, "\n").unwrap();

        assert_eq!(tree.content(doc.id()).unwrap().len(), 3);
        assert_eq!(doc.text(&tree).unwrap(), "\n\n");
    }

    #[test]
    fn prefixes_keep_declaration_order() {
        let mut tree = ModelTree::default();
        let doc = DocumentRoot::create(&mut tree).unwrap();
        doc.set_prefix(&mut tree, "wfs", Some(namespace::WFS.into())).unwrap();
        doc.set_prefix(&mut tree, "fes", Some(namespace::FES.into())).unwrap();
        doc.set_prefix(&mut tree, "wfs", Some("urn:other".into())).unwrap();

        let prefixes: Vec<(&String, &String)> = doc.prefixes(&tree).unwrap().iter().collect();
        assert_eq!(prefixes[0].0, "wfs");
        assert_eq!(prefixes[0].1, "urn:other");
        assert_eq!(prefixes[1].0, "fes");

        doc.set_schema_location(&mut tree, namespace::WFS, Some("wfs.xsd".into()))
            .unwrap();
        doc.set_schema_location(&mut tree, namespace::WFS, None).unwrap();
        assert!(doc.schema_locations(&tree).unwrap().is_empty());
    }
}
