//! The index lifecycle: creation with its dependency registration, drop,
//! rebuild, and the access-method boundary.

pub mod am;
pub mod build;
pub mod reindex;

pub use build::{create_index, index_build, index_drop, index_is_usable, index_metadata, index_scan};
pub use reindex::{reindex_index, reindex_relation};

use crate::db::catalog::system_tables::ConstraintKind;
use crate::db::expr::Expr;
use relcat_primitives::{Oid, SubId};

/// Everything the index pipeline needs to know about the index being built.
#[derive(Clone, Debug, Default)]
pub struct IndexInfo {
    /// One entry per index column; zero marks an expressional column whose
    /// definition comes from `expressions` in order.
    pub key_attrs: Vec<SubId>,
    pub expressions: Vec<Expr>,
    /// Predicate in explicit-AND form; empty means a total index.
    pub predicate: Vec<Expr>,
    pub is_unique: bool,
    pub is_primary: bool,
}

impl IndexInfo {
    pub fn num_attrs(&self) -> usize {
        self.key_attrs.len()
    }

    pub fn over_columns(cols: &[u32]) -> Self {
        Self {
            key_attrs: cols.iter().map(|c| SubId(*c)).collect(),
            ..Self::default()
        }
    }

    pub fn num_expression_columns(&self) -> usize {
        self.key_attrs.iter().filter(|a| a.is_whole()).count()
    }
}

/// Caller switches for [`create_index`].
#[derive(Clone, Debug, Default)]
pub struct IndexFlags {
    /// When set, the index backs a constraint of this kind and dependency
    /// registration follows the internal-ownership pattern.
    pub constraint: Option<ConstraintKind>,
    /// Leave the index empty; the caller promises to fill it.
    pub skip_build: bool,
    /// Bootstrap mode: defer the build and allow system catalogs.
    pub is_bootstrap: bool,
    /// Request a shared index. Only valid during bootstrap.
    pub shared: bool,
    /// Allow indexing a system catalog outside bootstrap.
    pub allow_system: bool,
    /// Use this oid for the index relation instead of allocating one.
    pub pre_assigned_oid: Option<Oid>,
}
