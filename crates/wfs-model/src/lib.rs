//! Containment tree and typed containers for WFS 2.0 request documents.
//!
//! A [`ModelTree`] holds every node of a document in an arena. Each node has
//! a [`NodeData`] payload for its attributes and a
//! [`ContentList`](wfs_content::ContentList) for its ordered content. Child
//! nodes are owned by exactly one entry of their parent's content.
//!
//! The typed handles in [`containers`] ([`Transaction`], [`DocumentRoot`],
//! [`ValueList`], ...) present groups as single-valued properties and
//! attributes as plain or unsettable fields.
//!
//! # Example
//!
//! ```
//! use wfs_model::{Container, Delete, Insert, ModelTree, Transaction};
//!
//! let mut tree = ModelTree::default();
//! let tx = Transaction::create(&mut tree).unwrap();
//! let insert = Insert::create(&mut tree).unwrap();
//! let delete = Delete::create(&mut tree).unwrap();
//! tx.push_action(&mut tree, insert).unwrap();
//! tx.push_action(&mut tree, delete).unwrap();
//! assert_eq!(tx.actions(&tree).unwrap().len(), 2);
//! ```

pub mod containers;
pub mod data;
pub mod error;
pub mod snapshot;
pub mod tree;

pub use containers::{
    AnyNode, Container, Delete, DocumentRoot, GetFeatureWithLock, Insert, LockFeature, LockRequest, Native,
    Replace, RootElement, Transaction, TransactionAction, Update, ValueList,
};
pub use data::{AttributeRow, NodeData};
pub use error::{ModelError, ModelResult};
pub use snapshot::{EntrySnapshot, NodeSnapshot, ValueSnapshot};
pub use tree::{ModelTree, Node, Owner, Placement, TreeEvent};
