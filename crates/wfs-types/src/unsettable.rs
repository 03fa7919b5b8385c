//! Tri-state slot for attributes that carry a schema default.
//!
//! `Option<T>` cannot tell "never touched" apart from "explicitly reset to the
//! default", yet a serializer needs both to reproduce the source document:
//! only an attribute that was present in the input (or assigned since) is
//! written back out.
//!
//! ```text
//!            set(v)              unset()
//!  Default ─────────▶ Set(v) ─────────────▶ Cleared
//!                       ▲                      │
//!                       └──────── set(v) ──────┘
//! ```

use serde::{Deserialize, Serialize};

/// Observable provenance of an [`Unsettable`] slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotState {
    /// Never assigned; reads as the schema default.
    Default,
    /// Explicitly assigned, possibly to a value equal to the default.
    Set,
    /// Assigned once, then unset; reads as the schema default again.
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Presence<T> {
    Default,
    Set(T),
    Cleared,
}

/// A scalar property with a schema default and explicit-presence tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsettable<T> {
    default: T,
    presence: Presence<T>,
}

impl<T> Unsettable<T> {
    /// A fresh slot in the default state.
    pub fn new(default: T) -> Self {
        Self {
            default,
            presence: Presence::Default,
        }
    }

    /// The current value: the assigned value if set, otherwise the default.
    pub fn get(&self) -> &T {
        match &self.presence {
            Presence::Set(value) => value,
            Presence::Default | Presence::Cleared => &self.default,
        }
    }

    /// The assigned value, or `None` when the slot reads as its default.
    pub fn explicit(&self) -> Option<&T> {
        match &self.presence {
            Presence::Set(value) => Some(value),
            Presence::Default | Presence::Cleared => None,
        }
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Assign a value and mark the slot as explicitly set.
    pub fn set(&mut self, value: T) {
        self.presence = Presence::Set(value);
    }

    /// Reset to the default. A slot that was never set stays in `Default`.
    pub fn unset(&mut self) {
        if matches!(self.presence, Presence::Set(_)) {
            self.presence = Presence::Cleared;
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self.presence, Presence::Set(_))
    }

    pub fn state(&self) -> SlotState {
        match self.presence {
            Presence::Default => SlotState::Default,
            Presence::Set(_) => SlotState::Set,
            Presence::Cleared => SlotState::Cleared,
        }
    }
}

impl<T: Clone> Unsettable<T> {
    /// Owned copy of the current value.
    pub fn value(&self) -> T {
        self.get().clone()
    }
}

impl<T: Default> Default for Unsettable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
