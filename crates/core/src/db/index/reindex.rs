//! Rebuilding existing indexes.
//!
//! Reindex never touches dependency edges: it gives the index a fresh
//! physical file, swaps the class row in place and re-runs the AM build.
//! While a rebuild is in flight the transaction carries the heap/index pair
//! so catalog lookups keep away from the target index.

use super::am::am_by_oid_required;
use super::build::{index_build, index_metadata, indexes_on, info_from_metadata};
use crate::db::catalog::heap;
use crate::db::catalog::system_tables::{StOpclassFields, StOpclassRow, ST_OPCLASS_ID};
use crate::db::datastore::mut_tx::{find_by_col_eq, MutTx, ReindexProgress};
use crate::db::datastore::value::Value;
use crate::db::datastore::{LockMode, Result};
use crate::db::index::build::index_is_usable;
use crate::error::IndexError;
use relcat_primitives::Oid;
use std::collections::BTreeSet;

fn am_oid_of_index(tx: &MutTx, first_opclass: Oid) -> Result<Oid> {
    // The access method is recoverable through any of the index's operator
    // classes.
    let row_ref = find_by_col_eq(tx, ST_OPCLASS_ID, StOpclassFields::Oid.col_idx(), Value::from(first_opclass))?
        .ok_or(IndexError::OpclassNotFound(first_opclass))?;
    Ok(StOpclassRow::try_from(row_ref)?.am_oid)
}

/// Rebuild one index in place.
pub fn reindex_index(tx: &mut MutTx, index_oid: Oid) -> Result<()> {
    log::trace!("INDEX REINDEXING: {index_oid}");
    let meta = index_metadata(tx, index_oid)?;
    heap::open_relation(tx, meta.heap_oid, LockMode::Share)?;
    tx.lock_relation(index_oid, LockMode::AccessExclusive);

    let info = info_from_metadata(&meta)?;
    let am = am_by_oid_required(am_oid_of_index(tx, meta.class_oids[0])?)?;

    let previous = tx.reindex_progress;
    tx.reindex_progress = Some(ReindexProgress {
        heap: meta.heap_oid,
        index: index_oid,
    });
    let result = (|| {
        // Fresh file; the class row is overwritten where it lives because
        // the ordinary update path would try to maintain the very indexes
        // being rebuilt.
        let old_node = heap::get_class_row(tx, index_oid)?.rel_filenode;
        let new_node = tx.allocate_filenode();
        tx.create_file(new_node);
        heap::overwrite_class_row_in_place(tx, index_oid, |c| c.rel_filenode = new_node)?;
        tx.schedule_unlink(old_node);

        index_build(tx, meta.heap_oid, index_oid, &info, am)
    })();
    tx.reindex_progress = previous;
    result?;

    log::trace!("INDEX REINDEXED: {index_oid}");
    Ok(())
}

/// Rebuild every index of a relation. Returns whether any index was
/// rebuilt. For catalog relations the set of usable indexes is restricted
/// to those already rebuilt in this pass.
pub fn reindex_relation(tx: &mut MutTx, rel_oid: Oid) -> Result<bool> {
    let class_row = heap::open_relation(tx, rel_oid, LockMode::Share)?;
    let index_oids = indexes_on(tx, rel_oid)?;

    let is_catalog = class_row.rel_namespace == crate::db::catalog::system_tables::NAMESPACE_SYSTEM_OID;
    let previous_usable = if is_catalog {
        tx.usable_catalog_indexes.replace(BTreeSet::new())
    } else {
        None
    };

    let mut result = Ok(());
    for index_oid in &index_oids {
        result = reindex_index(tx, *index_oid);
        if result.is_err() {
            break;
        }
        if let Some(usable) = &mut tx.usable_catalog_indexes {
            usable.insert(*index_oid);
        }
    }
    if is_catalog {
        tx.usable_catalog_indexes = previous_usable;
    }
    result?;
    Ok(!index_oids.is_empty())
}
