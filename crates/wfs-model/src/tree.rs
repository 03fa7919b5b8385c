//! The containment tree.
//!
//! [`ModelTree`] stores nodes in a [`HashMap`] keyed by [`NodeId`]. Each node
//! owns a [`ContentList`]; entries holding [`Value::Child`] own the
//! referenced node. The owned node records its owner as an index
//! back-reference, never as a pointer.
//!
//! # Invariants
//!
//! - A node has at most one owner, and exactly one entry references it.
//! - Ownership is acyclic.
//! - Every mutation validates before it changes anything.
//!
//! Nodes released by entry removal stay in the arena, parentless, until
//! [`ModelTree::collect_orphans`] destroys them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use wfs_content::{Change, ChangeListener, ContentList, Entry, ListenerId, ListenerSet, SlotRef, Value};
use wfs_schema::SchemaDescriptor;
use wfs_types::{FeatureKey, NodeId, SlotState};

use crate::data::NodeData;
use crate::error::{ModelError, ModelResult};

/// Where an owned node is held in its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner {
    pub parent: NodeId,
    pub key: FeatureKey,
    /// The group slot of the holding entry, if it occupies one.
    pub slot: Option<SlotRef>,
}

/// Where a value is placed in a parent's content list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A group slot; the member key is chosen from the value.
    Slot(SlotRef),
    /// A group slot with an explicit member key.
    Keyed(SlotRef, FeatureKey),
    /// A raw entry appended at the end.
    Raw(FeatureKey),
}

/// A tree mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    Created { node: NodeId, container: String },
    Content { node: NodeId, change: Change },
    Attribute { node: NodeId, name: &'static str, state: SlotState },
    Attached { child: NodeId, parent: NodeId },
    Detached { child: NodeId, parent: NodeId },
    Destroyed { node: NodeId },
}

/// One node of the tree.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    data: NodeData,
    content: ContentList,
    owner: Option<Owner>,
    released: bool,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn content(&self) -> &ContentList {
        &self.content
    }

    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    pub fn container(&self) -> &str {
        self.data.container_name()
    }

    /// Returns `true` for parentless nodes released by entry removal.
    pub fn is_orphan(&self) -> bool {
        self.released && self.owner.is_none()
    }
}

/// An arena of content-model nodes governed by one schema descriptor.
pub struct ModelTree {
    schema: Arc<SchemaDescriptor>,
    nodes: HashMap<NodeId, Node>,
    listeners: ListenerSet<TreeEvent>,
}

impl Default for ModelTree {
    fn default() -> Self {
        Self::new(Arc::new(SchemaDescriptor::wfs20()))
    }
}

impl std::fmt::Debug for ModelTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelTree")
            .field("schema", &self.schema.name)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl ModelTree {
    pub fn new(schema: Arc<SchemaDescriptor>) -> Self {
        Self {
            schema,
            nodes: HashMap::new(),
            listeners: ListenerSet::new(),
        }
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> ModelResult<&Node> {
        self.nodes.get(&id).ok_or(ModelError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> ModelResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(ModelError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn data(&self, id: NodeId) -> ModelResult<&NodeData> {
        Ok(&self.node(id)?.data)
    }

    pub fn content(&self, id: NodeId) -> ModelResult<&ContentList> {
        Ok(&self.node(id)?.content)
    }

    pub fn owner(&self, id: NodeId) -> ModelResult<Option<&Owner>> {
        Ok(self.node(id)?.owner.as_ref())
    }

    /// Owned children of `id`, in document order.
    pub fn children(&self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        Ok(self.node(id)?.content.children().map(|c| c.id).collect())
    }

    /// Nodes with no owner that were not released, i.e. document roots and
    /// detached subtrees.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.owner.is_none() && !n.released)
            .map(|n| n.id)
            .collect()
    }

    /// Returns `true` if `ancestor` owns `id`, directly or transitively.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|n| n.owner.as_ref());
        while let Some(owner) = current {
            if owner.parent == ancestor {
                return true;
            }
            current = self.nodes.get(&owner.parent).and_then(|n| n.owner.as_ref());
        }
        false
    }

    // ---------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------

    /// Create an unowned node of the named container type.
    pub fn create(&mut self, container: &str) -> ModelResult<NodeId> {
        let schema = Arc::clone(self.schema.container(container)?);
        let data = NodeData::for_container(&schema)?;
        Ok(self.insert_node(data, ContentList::new(schema)))
    }

    /// Create an unowned node with a given payload.
    pub fn create_with(&mut self, data: NodeData) -> ModelResult<NodeId> {
        let schema = Arc::clone(self.schema.container(data.container_name())?);
        Ok(self.insert_node(data, ContentList::new(schema)))
    }

    fn insert_node(&mut self, data: NodeData, content: ContentList) -> NodeId {
        let id = NodeId::new();
        let container = data.container_name().to_string();
        debug!(node = %id.short_id(), container = %container, "created node");
        self.nodes.insert(
            id,
            Node {
                id,
                data,
                content,
                owner: None,
                released: false,
            },
        );
        self.emit(TreeEvent::Created { node: id, container });
        id
    }

    // ---------------------------------------------------------------
    // Content mutation
    // ---------------------------------------------------------------

    /// Append a raw entry. A child value takes ownership of its node.
    pub fn append(&mut self, parent: NodeId, key: FeatureKey, value: Value) -> ModelResult<usize> {
        self.place(parent, Placement::Raw(key), value)?;
        Ok(self.node(parent)?.content.len() - 1)
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> ModelResult<usize> {
        self.append(parent, FeatureKey::text(), Value::text(text))
    }

    /// Replace the occupant of a group slot. Children held by evicted entries
    /// are released.
    pub fn set_slot(&mut self, parent: NodeId, slot: SlotRef, value: Option<Value>) -> ModelResult<()> {
        match value {
            Some(value) => self.place(parent, Placement::Slot(slot), value),
            None => self.clear_slot(parent, &slot),
        }
    }

    pub fn set_slot_keyed(
        &mut self,
        parent: NodeId,
        slot: SlotRef,
        key: FeatureKey,
        value: Value,
    ) -> ModelResult<()> {
        self.place(parent, Placement::Keyed(slot, key), value)
    }

    pub fn clear_slot(&mut self, parent: NodeId, slot: &SlotRef) -> ModelResult<()> {
        let evicted = self.node_mut(parent)?.content.clear_slot(slot)?;
        if !evicted.is_empty() {
            self.emit(TreeEvent::Content {
                node: parent,
                change: Change::SlotCleared {
                    slot: slot.clone(),
                    evicted: evicted.len(),
                },
            });
        }
        self.release(parent, &evicted);
        Ok(())
    }

    /// Occupy the next free slot of a group.
    pub fn push_slot(&mut self, parent: NodeId, group: &str, value: Value) -> ModelResult<SlotRef> {
        let slot = SlotRef::nth(group, self.content(parent)?.next_free_ordinal(group)?);
        self.place(parent, Placement::Slot(slot.clone()), value)?;
        Ok(slot)
    }

    /// Like [`push_slot`](Self::push_slot) with an explicit member key.
    pub fn push_slot_keyed(
        &mut self,
        parent: NodeId,
        group: &str,
        key: FeatureKey,
        value: Value,
    ) -> ModelResult<SlotRef> {
        let slot = SlotRef::nth(group, self.content(parent)?.next_free_ordinal(group)?);
        self.place(parent, Placement::Keyed(slot.clone(), key), value)?;
        Ok(slot)
    }

    /// Remove every entry of `parent` matching `predicate`, releasing owned
    /// children. Returns the number removed.
    pub fn remove_all(&mut self, parent: NodeId, predicate: impl FnMut(&Entry) -> bool) -> ModelResult<usize> {
        let removed = self.node_mut(parent)?.content.drain_matching(predicate);
        if !removed.is_empty() {
            self.emit(TreeEvent::Content {
                node: parent,
                change: Change::Removed { count: removed.len() },
            });
        }
        self.release(parent, &removed);
        Ok(removed.len())
    }

    /// Attach an unowned node under `parent`.
    pub fn attach(&mut self, parent: NodeId, placement: Placement, child: NodeId) -> ModelResult<()> {
        let value = Value::child(child, self.node(child)?.container());
        self.place(parent, placement, value)
    }

    /// Move `child` under `new_parent`, detaching it from any prior owner
    /// first. Nothing changes if the new placement is rejected.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId, placement: Placement) -> ModelResult<()> {
        let value = Value::child(child, self.node(child)?.container());
        self.check_cycle(child, new_parent)?;
        self.check_placement(new_parent, &placement, &value)?;
        if let Some(slot) = placement_slot(&placement) {
            let content = self.content(new_parent)?;
            if let Some(entry) = content.slot_entry(slot)? {
                let same_key = match &placement {
                    Placement::Keyed(_, key) => entry.key == *key,
                    _ => entry.key == content.resolve_slot_key(slot, &value)?,
                };
                if same_key && entry.child().is_some_and(|occupant| occupant.id == child) {
                    return Ok(());
                }
            }
        }

        self.detach(child)?;
        self.place(new_parent, placement, value)
    }

    /// Remove `child` from its owner's content. The child stays alive as an
    /// unowned root. Detaching an unowned node is a no-op.
    pub fn detach(&mut self, child: NodeId) -> ModelResult<()> {
        let Some(owner) = self.node(child)?.owner.clone() else {
            return Ok(());
        };
        let removed = self
            .node_mut(owner.parent)?
            .content
            .drain_matching(|e| e.child().is_some_and(|c| c.id == child));
        let node = self.node_mut(child)?;
        node.owner = None;
        node.released = false;
        debug!(child = %child.short_id(), parent = %owner.parent.short_id(), "detached node");
        if !removed.is_empty() {
            self.emit(TreeEvent::Content {
                node: owner.parent,
                change: Change::Removed { count: removed.len() },
            });
        }
        self.emit(TreeEvent::Detached {
            child,
            parent: owner.parent,
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Destruction
    // ---------------------------------------------------------------

    /// Destroy `id` and every node it owns. An owned node is detached from
    /// its owner first. Returns the number of nodes destroyed.
    pub fn destroy(&mut self, id: NodeId) -> ModelResult<usize> {
        if let Some(owner) = &self.node(id)?.owner {
            warn!(
                node = %id.short_id(),
                parent = %owner.parent.short_id(),
                "destroying a node that still has an owner"
            );
            self.detach(id)?;
        }

        let mut pending = vec![id];
        let mut destroyed = 0;
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.content.children().map(|c| c.id));
                destroyed += 1;
                self.emit(TreeEvent::Destroyed { node: next });
            }
        }
        debug!(node = %id.short_id(), destroyed, "destroyed subtree");
        Ok(destroyed)
    }

    /// Destroy every orphan and its subtree. Returns the number of nodes
    /// destroyed.
    pub fn collect_orphans(&mut self) -> usize {
        let orphans: Vec<NodeId> = self.nodes.values().filter(|n| n.is_orphan()).map(|n| n.id).collect();
        let mut destroyed = 0;
        for orphan in orphans {
            destroyed += self.destroy(orphan).unwrap_or(0);
        }
        if destroyed > 0 {
            debug!(destroyed, "collected orphans");
        }
        destroyed
    }

    // ---------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------

    /// Apply `update` to the payload of `id` and report the resulting state
    /// of attribute `name`. `update` returns `None` when the payload is not
    /// of the expected container type.
    pub(crate) fn update_attribute(
        &mut self,
        id: NodeId,
        name: &'static str,
        expected: &str,
        update: impl FnOnce(&mut NodeData) -> Option<SlotState>,
    ) -> ModelResult<()> {
        let node = self.node_mut(id)?;
        let found = node.container().to_string();
        let state = update(&mut node.data).ok_or_else(|| ModelError::WrongContainer {
            node: id,
            expected: expected.to_string(),
            found,
        })?;
        debug!(node = %id.short_id(), attribute = name, ?state, "updated attribute");
        self.emit(TreeEvent::Attribute { node: id, name, state });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Notification
    // ---------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl ChangeListener<TreeEvent> + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&mut self, event: TreeEvent) {
        self.listeners.emit(&event);
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn check_cycle(&self, child: NodeId, parent: NodeId) -> ModelResult<()> {
        if child == parent || self.is_ancestor(child, parent) {
            return Err(ModelError::CycleDetected { child, parent });
        }
        Ok(())
    }

    fn check_placement(&self, parent: NodeId, placement: &Placement, value: &Value) -> ModelResult<()> {
        let content = self.content(parent)?;
        match placement {
            Placement::Slot(slot) => {
                content.resolve_slot_key(slot, value)?;
            }
            Placement::Keyed(slot, key) => content.check_slot_keyed(slot, key, value)?,
            Placement::Raw(key) => content.check_append(key, value)?,
        }
        Ok(())
    }

    /// Validate a child value: the node exists, is unowned, has the
    /// container type the value claims, and would not form a cycle.
    fn check_child(&self, parent: NodeId, value: &Value) -> ModelResult<()> {
        let Some(child) = value.as_child() else {
            return Ok(());
        };
        let node = self.node(child.id)?;
        if let Some(owner) = &node.owner {
            return Err(ModelError::OwnershipViolation {
                child: child.id,
                owner: owner.parent,
            });
        }
        if node.container() != child.container {
            return Err(ModelError::WrongContainer {
                node: child.id,
                expected: child.container.clone(),
                found: node.container().to_string(),
            });
        }
        self.check_cycle(child.id, parent)
    }

    fn place(&mut self, parent: NodeId, placement: Placement, value: Value) -> ModelResult<()> {
        self.check_child(parent, &value)?;
        self.check_placement(parent, &placement, &value)?;

        let child = value.as_child().map(|c| c.id);
        let content = &mut self.node_mut(parent)?.content;
        let (key, slot, evicted, change) = match placement {
            Placement::Raw(key) => {
                let index = content.append(key.clone(), value)?;
                let change = Change::Appended { index, key: key.clone() };
                (key, None, Vec::new(), change)
            }
            Placement::Slot(slot) => {
                let key = content.resolve_slot_key(&slot, &value)?;
                let evicted = content.set_slot_keyed(&slot, key.clone(), value)?;
                let change = Change::SlotSet {
                    slot: slot.clone(),
                    key: key.clone(),
                    evicted: evicted.len(),
                };
                (key, Some(slot), evicted, change)
            }
            Placement::Keyed(slot, key) => {
                let evicted = content.set_slot_keyed(&slot, key.clone(), value)?;
                let change = Change::SlotSet {
                    slot: slot.clone(),
                    key: key.clone(),
                    evicted: evicted.len(),
                };
                (key, Some(slot), evicted, change)
            }
        };
        self.emit(TreeEvent::Content { node: parent, change });
        self.release(parent, &evicted);

        if let Some(child) = child {
            let node = self.node_mut(child)?;
            node.owner = Some(Owner { parent, key, slot });
            node.released = false;
            debug!(child = %child.short_id(), parent = %parent.short_id(), "attached node");
            self.emit(TreeEvent::Attached { child, parent });
        }
        Ok(())
    }

    /// Mark the children of removed entries as orphans.
    fn release(&mut self, parent: NodeId, removed: &[Entry]) {
        for child in removed.iter().filter_map(Entry::child) {
            if let Some(node) = self.nodes.get_mut(&child.id) {
                node.owner = None;
                node.released = true;
                debug!(child = %child.id.short_id(), parent = %parent.short_id(), "released node");
                self.listeners.emit(&TreeEvent::Detached {
                    child: child.id,
                    parent,
                });
            }
        }
    }
}

fn placement_slot(placement: &Placement) -> Option<&SlotRef> {
    match placement {
        Placement::Slot(slot) | Placement::Keyed(slot, _) => Some(slot),
        Placement::Raw(_) => None,
    }
}
