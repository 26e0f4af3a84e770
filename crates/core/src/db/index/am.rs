//! The access-method boundary.
//!
//! The engine consumes a small per-AM contract: capability numbers and the
//! build procedures. Access methods are a code-level registry keyed by oid;
//! one btree implementation is provided.

use super::IndexInfo;
use crate::db::catalog::system_tables::BTREE_AM_OID;
use crate::db::datastore::mut_tx::{attr_index, MutTx};
use crate::db::datastore::{IndexFile, Result};
use crate::db::expr::eval::{eval_expr, eval_predicate};
use crate::error::IndexError;
use relcat_primitives::Oid;

pub trait IndexAm: Sync {
    fn name(&self) -> &'static str;

    /// Number of search strategies the AM supports.
    fn strategies(&self) -> u16;

    /// Number of support procedures per operator class.
    fn support_procs(&self) -> u16;

    /// Scan the heap and produce the index contents.
    fn build(&self, tx: &MutTx, heap_oid: Oid, index_oid: Oid, info: &IndexInfo) -> Result<IndexFile>;

    /// An empty index, for skip-build and unlogged-style cases.
    fn build_empty(&self) -> IndexFile {
        IndexFile::default()
    }
}

pub struct BTreeAm;

impl IndexAm for BTreeAm {
    fn name(&self) -> &'static str {
        "btree"
    }

    fn strategies(&self) -> u16 {
        5
    }

    fn support_procs(&self) -> u16 {
        1
    }

    fn build(&self, tx: &MutTx, heap_oid: Oid, index_oid: Oid, info: &IndexInfo) -> Result<IndexFile> {
        log::trace!("INDEX BUILDING: {index_oid} on {heap_oid}");
        let mut file = IndexFile::default();
        for row_ref in tx.iter(heap_oid)? {
            let row = row_ref.row();
            if !eval_predicate(tx, heap_oid, row, &info.predicate)? {
                continue;
            }
            let mut key = Vec::with_capacity(info.num_attrs());
            let mut expressions = info.expressions.iter();
            for attr in &info.key_attrs {
                if attr.is_whole() {
                    // Expression column; the arity was validated at creation.
                    let expr = expressions
                        .next()
                        .expect("expression column without a stored expression");
                    key.push(eval_expr(tx, heap_oid, row, expr)?);
                } else {
                    key.push(row.field(attr_index(*attr)).map_err(crate::error::CatalogError::from)?.clone());
                }
            }
            key.shrink_to_fit();
            file.insert(key, row_ref.id());
        }
        log::trace!("INDEX BUILT: {index_oid}, {} entries", file.len());
        Ok(file)
    }
}

static BTREE: BTreeAm = BTreeAm;

pub fn am_by_oid(am_oid: Oid) -> Option<&'static dyn IndexAm> {
    match am_oid {
        BTREE_AM_OID => Some(&BTREE),
        _ => None,
    }
}

pub fn am_by_oid_required(am_oid: Oid) -> Result<&'static dyn IndexAm> {
    am_by_oid(am_oid).ok_or_else(|| IndexError::AmNotFound(am_oid).into())
}
