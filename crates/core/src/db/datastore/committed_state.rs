//! Committed database state.
//!
//! Holds every table's rows as of the last committed transaction, the
//! physical files backing built indexes, and the allocators for row ids,
//! oids and file nodes. Mutated only by [`super::mut_tx::MutTx::commit`]
//! (and by bootstrap, which runs before any transaction exists).

use super::schema::TableSchema;
use super::tx_state::TxState;
use super::value::{Row, Value};
use crate::error::StoreError;
use relcat_primitives::{FileNode, Oid, RowId};
use std::collections::{BTreeMap, BTreeSet};

/// The built contents of one index: composite key to heap row handle.
/// "File" in the sense of the storage contract; creation is immediate,
/// unlink is deferred to commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexFile {
    pub entries: BTreeSet<(Vec<Value>, RowId)>,
}

impl IndexFile {
    pub fn insert(&mut self, key: Vec<Value>, row_id: RowId) {
        self.entries.insert((key, row_id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row handles whose key equals `key` exactly.
    pub fn lookup(&self, key: &[Value]) -> impl Iterator<Item = RowId> + '_ {
        let key = key.to_vec();
        self.entries
            .range((key.clone(), RowId::ZERO)..=(key, RowId(u64::MAX)))
            .map(|(_, row_id)| *row_id)
    }
}

#[derive(Debug)]
pub(super) struct Table {
    pub schema: TableSchema,
    pub rows: BTreeMap<RowId, Row>,
}

impl Table {
    pub(super) fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
pub struct CommittedState {
    pub(super) tables: BTreeMap<Oid, Table>,
    pub(super) files: BTreeMap<FileNode, IndexFile>,
    pub(super) next_row_id: u64,
    pub(super) next_oid: u32,
    pub(super) next_filenode: u32,
}

impl CommittedState {
    pub(super) fn get_table(&self, table_id: Oid) -> Option<&Table> {
        self.tables.get(&table_id)
    }

    /// Create a table's physical storage directly in the committed state.
    /// Bootstrap-only; everything after bootstrap goes through a transaction.
    pub(crate) fn create_table(&mut self, schema: TableSchema) {
        let table_id = schema.table_id;
        self.tables.insert(table_id, Table::new(schema));
    }

    /// Insert a row directly into the committed state. Bootstrap-only.
    pub(crate) fn insert_raw(&mut self, table_id: Oid, row: Row) -> Result<RowId, StoreError> {
        let row_id = self.allocate_row_id();
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(StoreError::TableNotFound(table_id))?;
        if !table.schema.row_matches(&row) {
            return Err(StoreError::RowShape {
                table: table.schema.table_name.clone(),
            });
        }
        table.rows.insert(row_id, row);
        Ok(row_id)
    }

    pub(super) fn allocate_row_id(&mut self) -> RowId {
        self.next_row_id += 1;
        RowId(self.next_row_id)
    }

    pub(super) fn allocate_oid(&mut self) -> Oid {
        self.next_oid += 1;
        Oid(self.next_oid)
    }

    /// Reserve everything below `floor` for bootstrap-assigned oids.
    pub fn set_oid_floor(&mut self, floor: Oid) {
        self.next_oid = self.next_oid.max(floor.0);
    }

    pub(super) fn allocate_filenode(&mut self) -> FileNode {
        self.next_filenode += 1;
        FileNode(self.next_filenode)
    }

    /// Fold a finished transaction into the committed state. Inserts that
    /// were deleted again within the transaction are skipped; deferred
    /// unlinks are applied last.
    pub(super) fn merge(&mut self, tx_state: TxState) {
        for schema in tx_state.created_tables.into_values() {
            self.create_table(schema);
        }

        for (table_id, deletes) in tx_state.delete_tables {
            if let Some(table) = self.tables.get_mut(&table_id) {
                for row_id in deletes.into_keys() {
                    table.rows.remove(&row_id);
                }
            }
        }

        for (table_id, tx_table) in tx_state.insert_tables {
            if let Some(table) = self.tables.get_mut(&table_id) {
                for (row_id, tx_row) in tx_table.rows {
                    if tx_row.del_cid.is_none() {
                        table.rows.insert(row_id, tx_row.row);
                    }
                }
            }
        }

        for table_id in tx_state.dropped_tables {
            self.tables.remove(&table_id);
        }

        for (node, file) in tx_state.created_files {
            self.files.insert(node, file);
        }
        for node in tx_state.dropped_files {
            self.files.remove(&node);
        }
    }
}
