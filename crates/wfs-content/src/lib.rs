//! Ordered heterogeneous content for the WFS 2.0 content model.
//!
//! A [`ContentList`] is the backing store of an XML "mixed" or "group"
//! property: an insertion-ordered sequence of [`Entry`] values, each tagged
//! with the [`FeatureKey`](wfs_types::FeatureKey) that classifies it. Choice
//! and substitution groups are presented as single-valued properties by the
//! group view operations, which keep at most one entry per group slot.
//!
//! # Invariants
//!
//! - **Choice exclusivity**: each declared group slot holds at most one entry.
//! - **Order preservation**: no operation reorders surviving entries.
//! - **Unconstrained mixed content**: text runs and wildcard elements repeat
//!   and interleave freely.
//!
//! # Key Types
//!
//! - [`ContentList`] -- The ordered entry sequence
//! - [`Entry`] / [`Value`] / [`ChildRef`] -- One slot of content
//! - [`SlotRef`] -- A group name plus ordinal
//! - [`GroupView`] / [`GroupViewMut`] -- Single-valued views over one group
//! - [`ListenerSet`] / [`ChangeListener`] -- Optional change notification

pub mod entry;
pub mod error;
pub mod list;
pub mod notify;
pub mod view;

pub use entry::{ChildRef, Entry, SlotRef, Value};
pub use error::{ContentError, ContentResult};
pub use list::ContentList;
pub use notify::{Change, ChangeListener, ListenerId, ListenerSet};
pub use view::{GroupView, GroupViewMut};
