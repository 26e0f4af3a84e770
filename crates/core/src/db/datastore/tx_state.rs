//! Uncommitted transaction state.
//!
//! `TxState` tracks every modification made by the open transaction as an
//! overlay on the committed state: rows inserted (tagged with the inserting
//! command id), committed rows deleted (tagged with the deleting command id),
//! relations and physical files created, and files scheduled for unlink at
//! commit.
//!
//! A row is never moved between the two sides. Deleting a row this
//! transaction inserted marks the insert-table entry instead of touching the
//! delete tables, so the cumulative effect of insert-then-delete is nothing.

use super::schema::TableSchema;
use super::value::Row;
use relcat_primitives::{Cid, FileNode, Oid, RowId};
use std::collections::BTreeMap;

/// A row inserted by this transaction, with the command that inserted it and
/// (if it was later deleted again) the command that deleted it.
#[derive(Debug)]
pub(super) struct TxRow {
    pub row: Row,
    pub ins_cid: Cid,
    pub del_cid: Option<Cid>,
}

#[derive(Default, Debug)]
pub(super) struct TxTable {
    pub rows: BTreeMap<RowId, TxRow>,
}

#[derive(Default)]
pub(super) struct TxState {
    /// Rows inserted this transaction, per table.
    pub insert_tables: BTreeMap<Oid, TxTable>,

    /// Committed rows deleted this transaction: row id to deleting command.
    pub delete_tables: BTreeMap<Oid, BTreeMap<RowId, Cid>>,

    /// Relations whose physical storage was created this transaction. The
    /// schema seeds the committed table at merge time.
    pub created_tables: BTreeMap<Oid, TableSchema>,

    /// Relations whose physical storage goes away at commit.
    pub dropped_tables: Vec<Oid>,

    /// Index files created this transaction, keyed by file node.
    pub created_files: BTreeMap<FileNode, super::committed_state::IndexFile>,

    /// Deferred unlinks: files removed at commit, untouched on rollback.
    pub dropped_files: Vec<FileNode>,
}

impl TxState {
    pub(super) fn get_insert_table_mut(&mut self, table_id: Oid) -> &mut TxTable {
        self.insert_tables.entry(table_id).or_default()
    }

    pub(super) fn get_delete_table_mut(&mut self, table_id: Oid) -> &mut BTreeMap<RowId, Cid> {
        self.delete_tables.entry(table_id).or_default()
    }

    pub(super) fn is_deleted(&self, table_id: Oid, row_id: RowId, cur_cid: Cid) -> bool {
        self.delete_tables
            .get(&table_id)
            .and_then(|dt| dt.get(&row_id))
            .is_some_and(|del_cid| *del_cid < cur_cid)
    }
}

impl TxRow {
    /// Whether the row is visible to a scan running at `cur_cid`: inserted by
    /// an earlier command and not yet deleted by one.
    pub(super) fn visible_at(&self, cur_cid: Cid) -> bool {
        self.ins_cid < cur_cid && !self.del_cid.is_some_and(|del| del < cur_cid)
    }
}
