//! relcat: a relational-catalog engine.
//!
//! Tracks typed references between schema objects, drives order-preserving
//! CASCADE/RESTRICT deletion over the resulting graph, and runs the index
//! creation/reindex pipeline that produces and consumes those references.

pub mod db;
pub mod error;

pub use relcat_primitives::{Cid, FileNode, Oid, RowId, SubId};

pub use db::datastore::Datastore;
pub use db::depend::{
    delete_what_depends_on, perform_deletion, record_dependency, record_multiple_dependencies, DepType, DropMode,
    ObjectAddress, ObjectAddressSet, ObjectClass,
};
pub use db::expr::{record_dependency_on_expr, record_dependency_on_single_rel_expr};
pub use db::index::{create_index, index_drop, reindex_index, reindex_relation};
pub use error::CatalogError;
