//! Derived single-value views over group slots.
//!
//! A slot is read with `find_first(occupies slot)` and written by removing
//! every occupant of the slot and appending the new entry at the end. A
//! slot therefore never holds more than one entry, and writing one slot never
//! touches the entries of another, sibling slots of a repeatable group
//! included.

use tracing::debug;
use wfs_schema::GroupDecl;
use wfs_types::FeatureKey;

use crate::entry::{Entry, SlotRef, Value};
use crate::error::{ContentError, ContentResult};
use crate::list::ContentList;
use crate::notify::Change;

impl ContentList {
    /// Look up a declared group of this container.
    pub fn group(&self, name: &str) -> ContentResult<&GroupDecl> {
        self.schema().group(name).map_err(|_| ContentError::UnknownGroup {
            container: self.schema().name.clone(),
            group: name.to_string(),
        })
    }

    fn check_slot(&self, slot: &SlotRef) -> ContentResult<&GroupDecl> {
        let group = self.group(&slot.group)?;
        if !group.repeatable && slot.ordinal != 0 {
            return Err(ContentError::SlotOutOfRange {
                group: slot.group.clone(),
                ordinal: slot.ordinal,
            });
        }
        Ok(group)
    }

    /// The member key a slot setter would use for `value`: the first member
    /// whose declared type accepts it. Validates without mutating.
    pub fn resolve_slot_key(&self, slot: &SlotRef, value: &Value) -> ContentResult<FeatureKey> {
        let group = self.check_slot(slot)?;
        group
            .members
            .iter()
            .find(|m| value.conforms_to(&m.value))
            .map(|m| m.key.clone())
            .ok_or_else(|| ContentError::TypeMismatch {
                expected: group
                    .members
                    .iter()
                    .map(|m| m.value.to_string())
                    .collect::<Vec<_>>()
                    .join(" | "),
                found: value.kind_label(),
            })
    }

    /// The checks [`set_slot_keyed`](Self::set_slot_keyed) runs, without
    /// mutating.
    pub fn check_slot_keyed(&self, slot: &SlotRef, key: &FeatureKey, value: &Value) -> ContentResult<()> {
        let group = self.check_slot(slot)?;
        let member = group.member(key).ok_or_else(|| ContentError::UnknownKey {
            group: group.name.clone(),
            key: key.clone(),
        })?;
        if !value.conforms_to(&member.value) {
            return Err(ContentError::TypeMismatch {
                expected: member.value.to_string(),
                found: value.kind_label(),
            });
        }
        Ok(())
    }

    /// The entry occupying `slot`, if any.
    pub fn slot_entry(&self, slot: &SlotRef) -> ContentResult<Option<&Entry>> {
        self.check_slot(slot)?;
        Ok(self.find_first(|e| e.occupies(slot)))
    }

    /// The value occupying `slot`, if any.
    pub fn get_slot(&self, slot: &SlotRef) -> ContentResult<Option<&Value>> {
        Ok(self.slot_entry(slot)?.map(|e| &e.value))
    }

    /// Replace the occupant of `slot`. `None` clears it.
    ///
    /// The new occupant is appended at the end of the list. Returns the
    /// evicted entries so that owned children can be released.
    pub fn set_slot(&mut self, slot: &SlotRef, value: Option<Value>) -> ContentResult<Vec<Entry>> {
        match value {
            Some(value) => {
                let key = self.resolve_slot_key(slot, &value)?;
                Ok(self.occupy(slot, key, value))
            }
            None => self.clear_slot(slot),
        }
    }

    /// Like [`set_slot`](Self::set_slot), with the member key chosen by the
    /// caller. The key must be a member of the group that accepts `value`.
    pub fn set_slot_keyed(
        &mut self,
        slot: &SlotRef,
        key: FeatureKey,
        value: Value,
    ) -> ContentResult<Vec<Entry>> {
        self.check_slot_keyed(slot, &key, &value)?;
        Ok(self.occupy(slot, key, value))
    }

    /// Empty `slot`. Returns the evicted entries.
    pub fn clear_slot(&mut self, slot: &SlotRef) -> ContentResult<Vec<Entry>> {
        self.check_slot(slot)?;
        let evicted = self.extract(|e| e.occupies(slot));
        if !evicted.is_empty() {
            debug!(
                container = %self.schema().name,
                slot = %slot,
                evicted = evicted.len(),
                "cleared group slot"
            );
            self.notify(Change::SlotCleared {
                slot: slot.clone(),
                evicted: evicted.len(),
            });
        }
        Ok(evicted)
    }

    fn occupy(&mut self, slot: &SlotRef, key: FeatureKey, value: Value) -> Vec<Entry> {
        let evicted = self.extract(|e| e.occupies(slot));
        debug!(
            container = %self.schema().name,
            slot = %slot,
            key = %key,
            evicted = evicted.len(),
            "set group slot"
        );
        self.push_entry(Entry {
            key: key.clone(),
            slot: Some(slot.clone()),
            value,
        });
        self.notify(Change::SlotSet {
            slot: slot.clone(),
            key,
            evicted: evicted.len(),
        });
        evicted
    }

    /// Every entry occupying a slot of `group`, in document order.
    pub fn occupants(&self, group: &str) -> ContentResult<Vec<&Entry>> {
        self.group(group)?;
        Ok(self.iter().filter(|e| e.in_group(group)).collect())
    }

    /// The lowest ordinal above every occupied slot of `group`. Fails with
    /// [`ContentError::SlotOutOfRange`] once slot `u32::MAX` is occupied.
    pub fn next_free_ordinal(&self, group: &str) -> ContentResult<u32> {
        self.group(group)?;
        let highest = self
            .iter()
            .filter_map(|e| e.slot.as_ref())
            .filter(|s| s.group == group)
            .map(|s| s.ordinal)
            .max();
        match highest {
            None => Ok(0),
            Some(ordinal) => ordinal.checked_add(1).ok_or_else(|| ContentError::SlotOutOfRange {
                group: group.to_string(),
                ordinal,
            }),
        }
    }

    /// Occupy a fresh slot of `group`. Non-repeatable groups accept a push
    /// only while vacant.
    pub fn push_slot(&mut self, group: &str, value: Value) -> ContentResult<SlotRef> {
        let slot = SlotRef::nth(group, self.next_free_ordinal(group)?);
        self.set_slot(&slot, Some(value))?;
        Ok(slot)
    }

    /// A read-only view of one group.
    pub fn view<'a>(&'a self, group: &str) -> ContentResult<GroupView<'a>> {
        let decl = self.group(group)?;
        Ok(GroupView { list: self, group: decl })
    }

    /// A mutable view of one group.
    pub fn view_mut<'a>(&'a mut self, group: &str) -> ContentResult<GroupViewMut<'a>> {
        self.group(group)?;
        Ok(GroupViewMut {
            list: self,
            group: group.to_string(),
        })
    }
}

/// Read-only single-value access to the slots of one group.
#[derive(Clone, Copy, Debug)]
pub struct GroupView<'a> {
    list: &'a ContentList,
    group: &'a GroupDecl,
}

impl<'a> GroupView<'a> {
    pub fn decl(&self) -> &'a GroupDecl {
        self.group
    }

    /// The value in slot `ordinal`, if occupied.
    pub fn get(&self, ordinal: u32) -> ContentResult<Option<&'a Value>> {
        let list: &'a ContentList = self.list;
        list.get_slot(&SlotRef::nth(self.group.name.as_str(), ordinal))
    }

    /// The member key occupying slot `ordinal`.
    pub fn key(&self, ordinal: u32) -> ContentResult<Option<&'a FeatureKey>> {
        let list: &'a ContentList = self.list;
        Ok(list
            .slot_entry(&SlotRef::nth(self.group.name.as_str(), ordinal))?
            .map(|e| &e.key))
    }

    pub fn is_occupied(&self, ordinal: u32) -> bool {
        matches!(self.get(ordinal), Ok(Some(_)))
    }

    /// Every occupant of the group, in document order.
    pub fn occupants(&self) -> impl Iterator<Item = &'a Entry> + 'a {
        let (list, group): (&'a ContentList, &'a GroupDecl) = (self.list, self.group);
        list.iter().filter(move |e| e.in_group(&group.name))
    }
}

/// Mutable single-value access to the slots of one group.
#[derive(Debug)]
pub struct GroupViewMut<'a> {
    list: &'a mut ContentList,
    group: String,
}

impl GroupViewMut<'_> {
    fn slot(&self, ordinal: u32) -> SlotRef {
        SlotRef::nth(self.group.as_str(), ordinal)
    }

    pub fn get(&self, ordinal: u32) -> ContentResult<Option<&Value>> {
        self.list.get_slot(&self.slot(ordinal))
    }

    pub fn set(&mut self, ordinal: u32, value: Option<Value>) -> ContentResult<Vec<Entry>> {
        let slot = self.slot(ordinal);
        self.list.set_slot(&slot, value)
    }

    pub fn set_keyed(&mut self, ordinal: u32, key: FeatureKey, value: Value) -> ContentResult<Vec<Entry>> {
        let slot = self.slot(ordinal);
        self.list.set_slot_keyed(&slot, key, value)
    }

    pub fn clear(&mut self, ordinal: u32) -> ContentResult<Vec<Entry>> {
        let slot = self.slot(ordinal);
        self.list.clear_slot(&slot)
    }

    pub fn push(&mut self, value: Value) -> ContentResult<SlotRef> {
        self.list.push_slot(&self.group, value)
    }
}
