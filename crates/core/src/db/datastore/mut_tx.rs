//! The mutable transaction.
//!
//! `MutTx` holds the write lock on the committed state for its whole
//! lifetime; there is at most one mutable transaction at a time. All reads
//! go through the committed-plus-current-command snapshot: a write made by
//! command `c` is observed by scans only once the command counter has been
//! bumped past `c`. That ordering is load-bearing for the deletion engine,
//! which relies on severed dependency edges becoming invisible before it
//! cascades across the same rows again.

use super::committed_state::{CommittedState, IndexFile};
use super::locks::{LockMode, LockTable};
use super::schema::TableSchema;
use super::tx_state::{TxRow, TxState};
use super::value::{Row, RowRef, Value};
use super::{Result, SharedWriteGuard};
use crate::error::StoreError;
use relcat_primitives::{Cid, FileNode, Oid, RowId, SubId};
use std::collections::btree_map;
use std::collections::BTreeSet;

/// The heap/index pair currently being rebuilt, if any. Catalog lookups
/// consult this to avoid reading the index under reconstruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReindexProgress {
    pub heap: Oid,
    pub index: Oid,
}

pub struct MutTx {
    pub(super) tx_state: TxState,
    pub(super) committed_state_write_lock: SharedWriteGuard<CommittedState>,
    pub(super) cur_cid: Cid,
    pub(super) locks: LockTable,

    /// Namespaces visible without qualification, in search order.
    pub(crate) search_path: Vec<Oid>,

    /// See [`ReindexProgress`].
    pub(crate) reindex_progress: Option<ReindexProgress>,

    /// When reindexing catalog relations, only indexes already rebuilt in
    /// this pass are usable. `None` outside such a pass.
    pub(crate) usable_catalog_indexes: Option<BTreeSet<Oid>>,

    /// Indexes registered for a deferred build during bootstrap.
    pub(crate) deferred_index_builds: Vec<Oid>,
}

impl MutTx {
    pub(super) fn new(committed_state_write_lock: SharedWriteGuard<CommittedState>, search_path: Vec<Oid>) -> Self {
        Self {
            tx_state: TxState::default(),
            committed_state_write_lock,
            cur_cid: Cid::ZERO,
            locks: LockTable::default(),
            search_path,
            reindex_progress: None,
            usable_catalog_indexes: None,
            deferred_index_builds: Vec::new(),
        }
    }

    /// Make every write of the commands run so far visible to subsequent
    /// scans. DDL entry points bump once at their end; the deletion engine
    /// additionally bumps between severing edges and cascading so that the
    /// severed edges cannot be re-observed.
    pub fn bump_command_counter(&mut self) {
        self.cur_cid = self.cur_cid.next();
    }

    pub fn current_command(&self) -> Cid {
        self.cur_cid
    }

    fn schema_for(&self, table_id: Oid) -> Result<&TableSchema> {
        if let Some(schema) = self.tx_state.created_tables.get(&table_id) {
            return Ok(schema);
        }
        self.committed_state_write_lock
            .get_table(table_id)
            .map(|t| &t.schema)
            .ok_or_else(|| StoreError::TableNotFound(table_id).into())
    }

    pub fn table_exists(&self, table_id: Oid) -> bool {
        self.tx_state.created_tables.contains_key(&table_id)
            || self.committed_state_write_lock.get_table(table_id).is_some()
    }

    pub fn insert(&mut self, table_id: Oid, row: Row) -> Result<RowId> {
        let schema = self.schema_for(table_id)?;
        if !schema.row_matches(&row) {
            return Err(StoreError::RowShape {
                table: schema.table_name.clone(),
            }
            .into());
        }
        let row_id = self.committed_state_write_lock.allocate_row_id();
        let ins_cid = self.cur_cid;
        self.tx_state.get_insert_table_mut(table_id).rows.insert(
            row_id,
            TxRow {
                row,
                ins_cid,
                del_cid: None,
            },
        );
        Ok(row_id)
    }

    /// Delete a row by its handle. Returns whether a live row was deleted.
    pub fn delete(&mut self, table_id: Oid, row_id: RowId) -> bool {
        let cur_cid = self.cur_cid;
        if let Some(tx_table) = self.tx_state.insert_tables.get_mut(&table_id) {
            if let Some(tx_row) = tx_table.rows.get_mut(&row_id) {
                if tx_row.del_cid.is_none() {
                    tx_row.del_cid = Some(cur_cid);
                    return true;
                }
                return false;
            }
        }
        let committed_has_row = self
            .committed_state_write_lock
            .get_table(table_id)
            .is_some_and(|t| t.rows.contains_key(&row_id));
        if !committed_has_row {
            return false;
        }
        let delete_table = self.tx_state.get_delete_table_mut(table_id);
        if delete_table.contains_key(&row_id) {
            return false;
        }
        delete_table.insert(row_id, cur_cid);
        true
    }

    /// Fetch a single row if it is visible at the current command.
    pub fn get(&self, table_id: Oid, row_id: RowId) -> Option<RowRef<'_>> {
        if let Some(tx_row) = self
            .tx_state
            .insert_tables
            .get(&table_id)
            .and_then(|t| t.rows.get(&row_id))
        {
            return tx_row
                .visible_at(self.cur_cid)
                .then(|| RowRef::new(row_id, &tx_row.row));
        }
        if self.tx_state.is_deleted(table_id, row_id, self.cur_cid) {
            return None;
        }
        self.committed_state_write_lock
            .get_table(table_id)?
            .rows
            .get(&row_id)
            .map(|row| RowRef::new(row_id, row))
    }

    /// Sequential scan of every visible row, committed rows first, then this
    /// transaction's own (already-flushed) insertions.
    pub fn iter(&self, table_id: Oid) -> Result<Iter<'_>> {
        if !self.table_exists(table_id) {
            return Err(StoreError::TableNotFound(table_id).into());
        }
        Ok(Iter::new(self, table_id))
    }

    /// Scan filtered on one column equal to `value`. There are no physical
    /// indexes over catalog storage itself; this is a filtered sequential
    /// scan.
    pub fn iter_by_col_eq(&self, table_id: Oid, col_idx: usize, value: Value) -> Result<IterByColEq<'_>> {
        Ok(IterByColEq {
            iter: self.iter(table_id)?,
            col_idx,
            value,
        })
    }

    /// Overwrite a row where it lives, without going through delete+insert
    /// and without command-counter tagging. Reserved for reindex, which must
    /// update the class row of a heap whose own indexes are mid-rebuild.
    pub fn update_row_in_place(&mut self, table_id: Oid, row_id: RowId, new_row: Row) -> Result<()> {
        let schema = self.schema_for(table_id)?;
        if !schema.row_matches(&new_row) {
            return Err(StoreError::RowShape {
                table: schema.table_name.clone(),
            }
            .into());
        }
        if let Some(tx_row) = self
            .tx_state
            .insert_tables
            .get_mut(&table_id)
            .and_then(|t| t.rows.get_mut(&row_id))
        {
            tx_row.row = new_row;
            return Ok(());
        }
        let table = self
            .committed_state_write_lock
            .tables
            .get_mut(&table_id)
            .ok_or(StoreError::TableNotFound(table_id))?;
        match table.rows.get_mut(&row_id) {
            Some(row) => {
                *row = new_row;
                Ok(())
            }
            None => Err(StoreError::RowNotFound { table_id, row_id }.into()),
        }
    }

    pub fn lock_relation(&mut self, relation: Oid, mode: LockMode) {
        self.locks.acquire(relation, mode);
    }

    pub fn held_lock(&self, relation: Oid) -> Option<LockMode> {
        self.locks.held_mode(relation)
    }

    pub fn allocate_oid(&mut self) -> Oid {
        self.committed_state_write_lock.allocate_oid()
    }

    pub fn allocate_filenode(&mut self) -> FileNode {
        self.committed_state_write_lock.allocate_filenode()
    }

    /// Create the physical storage of a new relation.
    pub fn create_physical_table(&mut self, schema: TableSchema) {
        self.tx_state.created_tables.insert(schema.table_id, schema);
    }

    /// Drop a relation's physical storage at commit.
    pub fn drop_physical_table(&mut self, table_id: Oid) {
        self.tx_state.created_tables.remove(&table_id);
        self.tx_state.dropped_tables.push(table_id);
    }

    /// Create an empty physical file for an index.
    pub fn create_file(&mut self, node: FileNode) {
        self.tx_state.created_files.insert(node, IndexFile::default());
    }

    pub fn get_file(&self, node: FileNode) -> Option<&IndexFile> {
        self.tx_state
            .created_files
            .get(&node)
            .or_else(|| self.committed_state_write_lock.files.get(&node))
    }

    /// Mutable access to a file; a committed file is copied into the
    /// transaction first so an abort leaves it untouched.
    pub fn get_file_mut(&mut self, node: FileNode) -> Result<&mut IndexFile> {
        if let btree_map::Entry::Vacant(e) = self.tx_state.created_files.entry(node) {
            let committed = self
                .committed_state_write_lock
                .files
                .get(&node)
                .cloned()
                .ok_or(StoreError::FileNotFound(node))?;
            e.insert(committed);
        }
        Ok(self.tx_state.created_files.get_mut(&node).unwrap())
    }

    /// Schedule a physical file for removal; the actual unlink happens at
    /// commit, and a rollback leaves the file alone.
    pub fn schedule_unlink(&mut self, node: FileNode) {
        self.tx_state.created_files.remove(&node);
        self.tx_state.dropped_files.push(node);
    }

    pub fn commit(mut self) {
        let tx_state = std::mem::take(&mut self.tx_state);
        self.committed_state_write_lock.merge(tx_state);
    }

    pub fn rollback(self) {
        // Dropping the tx state drops every pending write; deferred unlinks
        // were never applied.
    }
}

enum ScanStage<'a> {
    Committed {
        iter: btree_map::Iter<'a, RowId, Row>,
    },
    TxInserts {
        iter: btree_map::Iter<'a, RowId, TxRow>,
    },
    Done,
}

pub struct Iter<'a> {
    tx: &'a MutTx,
    table_id: Oid,
    stage: ScanStage<'a>,
}

impl<'a> Iter<'a> {
    fn new(tx: &'a MutTx, table_id: Oid) -> Self {
        let stage = match tx.committed_state_write_lock.get_table(table_id) {
            Some(table) => ScanStage::Committed {
                iter: table.rows.iter(),
            },
            None => Self::tx_stage(tx, table_id),
        };
        Self { tx, table_id, stage }
    }

    fn tx_stage(tx: &'a MutTx, table_id: Oid) -> ScanStage<'a> {
        match tx.tx_state.insert_tables.get(&table_id) {
            Some(tx_table) => ScanStage::TxInserts {
                iter: tx_table.rows.iter(),
            },
            None => ScanStage::Done,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = RowRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.stage {
                ScanStage::Committed { iter } => {
                    for (row_id, row) in iter.by_ref() {
                        if self.tx.tx_state.is_deleted(self.table_id, *row_id, self.tx.cur_cid) {
                            continue;
                        }
                        return Some(RowRef::new(*row_id, row));
                    }
                }
                ScanStage::TxInserts { iter } => {
                    for (row_id, tx_row) in iter.by_ref() {
                        if tx_row.visible_at(self.tx.cur_cid) {
                            return Some(RowRef::new(*row_id, &tx_row.row));
                        }
                    }
                    return None;
                }
                ScanStage::Done => return None,
            }
            self.stage = Self::tx_stage(self.tx, self.table_id);
        }
    }
}

pub struct IterByColEq<'a> {
    iter: Iter<'a>,
    col_idx: usize,
    value: Value,
}

impl<'a> Iterator for IterByColEq<'a> {
    type Item = RowRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .by_ref()
            .find(|row_ref| row_ref.row().field(self.col_idx) == Ok(&self.value))
    }
}

/// Convenience for catalog code: delete every visible row whose `col_idx`
/// equals `value`, returning how many were deleted.
pub fn delete_by_col_eq(tx: &mut MutTx, table_id: Oid, col_idx: usize, value: Value) -> Result<u32> {
    let row_ids: Vec<RowId> = tx
        .iter_by_col_eq(table_id, col_idx, value)?
        .map(|r| r.id())
        .collect();
    let mut deleted = 0;
    for row_id in row_ids {
        if tx.delete(table_id, row_id) {
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// Smaller convenience: the first visible row matching `col_idx == value`.
pub fn find_by_col_eq<'a>(tx: &'a MutTx, table_id: Oid, col_idx: usize, value: Value) -> Result<Option<RowRef<'a>>> {
    Ok(tx.iter_by_col_eq(table_id, col_idx, value)?.next())
}

/// Column position helper: positional element index of a 1-based column.
pub fn attr_index(sub: SubId) -> usize {
    debug_assert!(!sub.is_whole());
    sub.idx() - 1
}
