//! Optional change notification.
//!
//! Listeners are called inline, in subscription order, after a mutation has
//! completed. Nothing in the content model depends on a listener being
//! registered.

use std::fmt;

use wfs_types::FeatureKey;

use crate::entry::SlotRef;

/// A mutation of a content list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// A raw entry was appended at `index`.
    Appended { index: usize, key: FeatureKey },
    /// `count` entries were removed by a bulk removal.
    Removed { count: usize },
    /// A group slot received a new occupant, evicting `evicted` entries.
    SlotSet { slot: SlotRef, key: FeatureKey, evicted: usize },
    /// A group slot was emptied.
    SlotCleared { slot: SlotRef, evicted: usize },
}

/// Receiver of change events.
pub trait ChangeListener<E>: Send {
    fn on_change(&mut self, event: &E);
}

impl<E, F> ChangeListener<E> for F
where
    F: FnMut(&E) + Send,
{
    fn on_change(&mut self, event: &E) {
        self(event)
    }
}

/// Handle returned by [`ListenerSet::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An ordered set of listeners for events of type `E`.
pub struct ListenerSet<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn ChangeListener<E>>)>,
}

impl<E> ListenerSet<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl ChangeListener<E> + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener.on_change(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
