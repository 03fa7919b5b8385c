//! Owner-free snapshots of a subtree.
//!
//! A snapshot nests children inside the entries that own them, so it carries
//! no node ids and can be serialized, compared and restored into any tree
//! governed by a compatible descriptor. The JSON form is for debugging; it is
//! not the XML wire format.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wfs_content::{SlotRef, Value};
use wfs_types::{FeatureKey, NodeId, Scalar};

use crate::data::NodeData;
use crate::error::ModelResult;
use crate::tree::{ModelTree, Placement};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub data: NodeData,
    #[serde(default)]
    pub content: Vec<EntrySnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub key: FeatureKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotRef>,
    pub value: ValueSnapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ValueSnapshot {
    Scalar(Scalar),
    Text(String),
    Child(Box<NodeSnapshot>),
}

impl NodeSnapshot {
    /// Number of nodes in the snapshot, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .content
            .iter()
            .map(|entry| match &entry.value {
                ValueSnapshot::Child(child) => child.node_count(),
                ValueSnapshot::Scalar(_) | ValueSnapshot::Text(_) => 0,
            })
            .sum::<usize>()
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ModelTree {
    /// Capture `root` and everything it owns.
    pub fn snapshot(&self, root: NodeId) -> ModelResult<NodeSnapshot> {
        let node = self.node(root)?;
        let content = node
            .content()
            .iter()
            .map(|entry| -> ModelResult<EntrySnapshot> {
                let value = match &entry.value {
                    Value::Scalar(scalar) => ValueSnapshot::Scalar(scalar.clone()),
                    Value::Text(text) => ValueSnapshot::Text(text.clone()),
                    Value::Child(child) => ValueSnapshot::Child(Box::new(self.snapshot(child.id)?)),
                };
                Ok(EntrySnapshot {
                    key: entry.key.clone(),
                    slot: entry.slot.clone(),
                    value,
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(NodeSnapshot {
            data: node.data().clone(),
            content,
        })
    }

    /// Rebuild a snapshot as a new unowned subtree. Returns its root.
    ///
    /// Entries are replayed in document order: slotted entries through the
    /// group setters, the rest as raw appends. On error the partially built
    /// subtree is destroyed.
    pub fn restore(&mut self, snapshot: &NodeSnapshot) -> ModelResult<NodeId> {
        let root = self.create_with(snapshot.data.clone())?;
        if let Err(e) = self.restore_content(root, snapshot) {
            self.destroy(root)?;
            return Err(e);
        }
        debug!(root = %root.short_id(), nodes = snapshot.node_count(), "restored snapshot");
        Ok(root)
    }

    fn restore_content(&mut self, parent: NodeId, snapshot: &NodeSnapshot) -> ModelResult<()> {
        for entry in &snapshot.content {
            let value = match &entry.value {
                ValueSnapshot::Scalar(scalar) => Value::Scalar(scalar.clone()),
                ValueSnapshot::Text(text) => Value::Text(text.clone()),
                ValueSnapshot::Child(child) => {
                    let id = self.restore(child)?;
                    Value::child(id, child.data.container_name())
                }
            };
            let placement = match &entry.slot {
                Some(slot) => Placement::Keyed(slot.clone(), entry.key.clone()),
                None => Placement::Raw(entry.key.clone()),
            };
            let child = value.as_child().map(|c| c.id);
            if let Err(e) = self.place_restored(parent, placement, value) {
                if let Some(child) = child {
                    self.destroy(child)?;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn place_restored(&mut self, parent: NodeId, placement: Placement, value: Value) -> ModelResult<()> {
        match placement {
            Placement::Raw(key) => self.append(parent, key, value).map(|_| ()),
            Placement::Keyed(slot, key) => self.set_slot_keyed(parent, slot, key, value),
            Placement::Slot(slot) => self.set_slot(parent, slot, Some(value)),
        }
    }
}
