use std::fmt;
use std::sync::Arc;

use tracing::debug;
use wfs_schema::ContainerSchema;
use wfs_types::{FeatureKey, FeatureKind};

use crate::entry::{ChildRef, Entry, Value};
use crate::error::{ContentError, ContentResult};
use crate::notify::{Change, ChangeListener, ListenerId, ListenerSet};

/// An insertion-ordered sequence of content entries for one container.
///
/// Raw operations live here. Group slots are read and written through the
/// view operations in [`crate::view`], which keep each slot to at most one
/// occupant.
pub struct ContentList {
    schema: Arc<ContainerSchema>,
    entries: Vec<Entry>,
    listeners: ListenerSet<Change>,
}

impl ContentList {
    /// An empty list governed by `schema`.
    pub fn new(schema: Arc<ContainerSchema>) -> Self {
        Self {
            schema,
            entries: Vec::new(),
            listeners: ListenerSet::new(),
        }
    }

    pub fn schema(&self) -> &Arc<ContainerSchema> {
        &self.schema
    }

    // ---------------------------------------------------------------
    // Raw mutation
    // ---------------------------------------------------------------

    /// Append an entry outside any group slot. Returns its index.
    ///
    /// Keys that belong to a declared group must go through a slot setter;
    /// appending one here fails with [`ContentError::GroupedKey`].
    pub fn append(&mut self, key: FeatureKey, value: Value) -> ContentResult<usize> {
        self.check_append(&key, &value)?;
        let index = self.entries.len();
        self.entries.push(Entry::raw(key.clone(), value));
        self.listeners.emit(&Change::Appended { index, key });
        Ok(index)
    }

    /// The checks [`append`](Self::append) runs, without mutating.
    pub fn check_append(&self, key: &FeatureKey, value: &Value) -> ContentResult<()> {
        if key.is_exclusive_candidate() {
            if let Some(group) = self.schema.group_of(key) {
                return Err(ContentError::GroupedKey {
                    key: key.clone(),
                    group: group.name.clone(),
                });
            }
        }
        if key.kind() == FeatureKind::Text && value.as_text().is_none() {
            return Err(ContentError::TypeMismatch {
                expected: "text".to_string(),
                found: value.kind_label(),
            });
        }
        Ok(())
    }

    /// Append a run of character data.
    pub fn append_text(&mut self, text: impl Into<String>) -> usize {
        let index = self.entries.len();
        self.entries.push(Entry::text(text));
        self.listeners.emit(&Change::Appended {
            index,
            key: FeatureKey::text(),
        });
        index
    }

    /// Remove every entry matching `predicate`, keeping survivors in order.
    /// Returns the number removed.
    pub fn remove_all(&mut self, predicate: impl FnMut(&Entry) -> bool) -> usize {
        self.drain_matching(predicate).len()
    }

    /// Remove and return every entry matching `predicate`, in document order.
    pub fn drain_matching(&mut self, predicate: impl FnMut(&Entry) -> bool) -> Vec<Entry> {
        let removed = self.extract(predicate);
        if !removed.is_empty() {
            debug!(
                container = %self.schema.name,
                count = removed.len(),
                remaining = self.entries.len(),
                "removed content entries"
            );
            self.listeners.emit(&Change::Removed { count: removed.len() });
        }
        removed
    }

    /// Remove every entry. Returns them in document order.
    pub fn clear(&mut self) -> Vec<Entry> {
        self.drain_matching(|_| true)
    }

    /// Partition without notifying. Both halves keep their relative order.
    pub(crate) fn extract(&mut self, mut predicate: impl FnMut(&Entry) -> bool) -> Vec<Entry> {
        let (removed, kept): (Vec<Entry>, Vec<Entry>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| predicate(e));
        self.entries = kept;
        removed
    }

    pub(crate) fn push_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn notify(&mut self, change: Change) {
        self.listeners.emit(&change);
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// The first entry matching `predicate`, in document order.
    pub fn find_first(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Option<&Entry> {
        self.entries.iter().find(|e| predicate(e))
    }

    /// The first entry with exactly this key.
    pub fn find_key(&self, key: &FeatureKey) -> Option<&Entry> {
        self.find_first(|e| &e.key == key)
    }

    pub fn position(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Option<usize> {
        self.entries.iter().position(|e| predicate(e))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All text runs concatenated in document order.
    pub fn texts(&self) -> String {
        self.entries.iter().filter_map(|e| e.value.as_text()).collect()
    }

    /// Entries admitted by a wildcard.
    pub fn wildcards(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.key.kind() == FeatureKind::WildcardAny)
    }

    /// Every owned child, in document order.
    pub fn children(&self) -> impl Iterator<Item = &ChildRef> {
        self.entries.iter().filter_map(Entry::child)
    }

    // ---------------------------------------------------------------
    // Notification
    // ---------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl ChangeListener<Change> + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl<'a> IntoIterator for &'a ContentList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Clones carry the entries but not the listeners.
impl Clone for ContentList {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            entries: self.entries.clone(),
            listeners: ListenerSet::new(),
        }
    }
}

impl PartialEq for ContentList {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.entries == other.entries
    }
}

impl fmt::Debug for ContentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentList")
            .field("container", &self.schema.name)
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use proptest::prelude::*;
    use wfs_schema::{ContentModel, GroupDecl, MemberDecl, ValueType};
    use wfs_types::{NodeId, Scalar};

    use super::*;

    fn native() -> ContentList {
        ContentList::new(Arc::new(ContainerSchema::new("NativeType", ContentModel::Mixed)))
    }

    fn grouped() -> ContentList {
        ContentList::new(Arc::new(
            ContainerSchema::new("DeleteType", ContentModel::ElementOnly).with_group(
                GroupDecl::choice(
                    "Filter",
                    vec![MemberDecl::new(FeatureKey::wfs("Filter"), ValueType::Any)],
                ),
            ),
        ))
    }

    fn road() -> FeatureKey {
        FeatureKey::wildcard("urn:roads", "Road")
    }

    #[test]
    fn append_preserves_document_order() {
        let mut list = native();
        list.append_text("a");
        list.append(road(), Value::child(NodeId::new(), "AnyType")).unwrap();
        list.append_text("b");

        let kinds: Vec<FeatureKind> = list.iter().map(|e| e.key.kind()).collect();
        assert_eq!(kinds, [FeatureKind::Text, FeatureKind::WildcardAny, FeatureKind::Text]);
        assert_eq!(list.texts(), "ab");
        assert_eq!(list.wildcards().count(), 1);
        assert_eq!(list.children().count(), 1);
    }

    #[test]
    fn grouped_key_rejects_raw_append() {
        let mut list = grouped();
        let err = list.append(FeatureKey::wfs("Filter"), Value::text("x")).unwrap_err();
        assert!(matches!(err, ContentError::GroupedKey { ref group, .. } if group == "Filter"));
        assert!(list.is_empty());
    }

    #[test]
    fn ungrouped_element_appends() {
        let mut list = grouped();
        let index = list
            .append(FeatureKey::wfs("Title"), Value::Scalar(Scalar::from("roads")))
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(list.find_key(&FeatureKey::wfs("Title")).unwrap().value, Value::Scalar(Scalar::from("roads")));
    }

    #[test]
    fn text_key_requires_text_value() {
        let mut list = native();
        let err = list.append(FeatureKey::text(), Value::Scalar(Scalar::Bool(true))).unwrap_err();
        assert!(matches!(err, ContentError::TypeMismatch { .. }));
    }

    #[test]
    fn find_first_returns_earliest_match() {
        let mut list = native();
        list.append_text("first");
        list.append_text("second");
        let entry = list.find_first(|e| e.key.kind() == FeatureKind::Text).unwrap();
        assert_eq!(entry.value.as_text(), Some("first"));
        assert!(list.find_first(|e| e.key == road()).is_none());
    }

    #[test]
    fn drain_returns_removed_children() {
        let mut list = native();
        let child = NodeId::new();
        list.append_text("x");
        list.append(road(), Value::child(child, "AnyType")).unwrap();
        let removed = list.drain_matching(|e| e.child().is_some());
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].child().unwrap().id, child);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn listeners_see_each_mutation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = native();
        {
            let seen = Arc::clone(&seen);
            list.subscribe(move |c: &Change| seen.lock().unwrap().push(c.clone()));
        }
        list.append_text("a");
        list.append_text("b");
        list.remove_all(|_| true);
        list.remove_all(|_| true);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], Change::Removed { count: 2 });
    }

    #[test]
    fn clone_drops_listeners() {
        let mut list = native();
        list.subscribe(|_: &Change| {});
        list.append_text("a");
        let copy = list.clone();
        assert_eq!(copy, list);
        assert_eq!(copy.listeners.len(), 0);
    }

    proptest! {
        #[test]
        fn remove_all_keeps_survivor_order(texts in prop::collection::vec("[a-c]{1,3}", 0..24)) {
            let mut list = native();
            for text in &texts {
                list.append_text(text.clone());
            }
            let removed = list.remove_all(|e| e.value.as_text().is_some_and(|t| t.starts_with('a')));

            let expected: Vec<&str> =
                texts.iter().map(String::as_str).filter(|t| !t.starts_with('a')).collect();
            let actual: Vec<&str> = list.iter().filter_map(|e| e.value.as_text()).collect();
            prop_assert_eq!(removed, texts.len() - expected.len());
            prop_assert_eq!(actual, expected);
        }
    }
}
