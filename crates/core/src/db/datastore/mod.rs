pub mod committed_state;
mod locks;
pub mod mut_tx;
pub mod schema;
mod tx_state;
pub mod value;

pub use committed_state::IndexFile;
pub use locks::LockMode;
pub use mut_tx::{MutTx, ReindexProgress};

use committed_state::CommittedState;
use parking_lot::{lock_api::ArcRwLockWriteGuard, RawRwLock, RwLock};
use std::sync::Arc;

pub type Result<T> = core::result::Result<T, crate::error::CatalogError>;

type SharedWriteGuard<T> = ArcRwLockWriteGuard<RawRwLock, T>;

/// The catalog store. One mutable transaction at a time; the transaction
/// owns the write lock on the committed state for its whole duration.
#[derive(Clone, Default)]
pub struct Datastore {
    committed_state: Arc<RwLock<CommittedState>>,
}

impl Datastore {
    /// A fresh store with the system tables in place and the built-in
    /// objects (namespaces, types, language, operators, operator classes)
    /// seeded and pinned. See [`crate::db::catalog::bootstrap`].
    pub fn bootstrap() -> Result<Self> {
        let datastore = Self::default();
        {
            let mut committed = datastore.committed_state.write_arc();
            crate::db::catalog::bootstrap::bootstrap_system_tables(&mut committed)?;
        }
        Ok(datastore)
    }

    pub fn begin_mut_tx(&self) -> MutTx {
        let committed = self.committed_state.write_arc();
        MutTx::new(committed, vec![crate::db::catalog::system_tables::NAMESPACE_PUBLIC_OID])
    }
}

#[cfg(test)]
mod tests {
    use super::mut_tx::{delete_by_col_eq, find_by_col_eq};
    use super::schema::{ColumnSchema, TableSchema};
    use super::value::{Value, ValueKind};
    use super::*;
    use crate::error::ResultTest;
    use crate::row;
    use relcat_primitives::Oid;

    fn store_with_table() -> ResultTest<(Datastore, Oid)> {
        let datastore = Datastore::bootstrap()?;
        let table_id = Oid(900);
        let mut tx = datastore.begin_mut_tx();
        tx.create_physical_table(TableSchema::new(
            table_id,
            "scratch",
            vec![
                ColumnSchema::new("id", ValueKind::U32),
                ColumnSchema::new("name", ValueKind::String),
            ],
        ));
        tx.commit();
        Ok((datastore, table_id))
    }

    #[test]
    fn writes_invisible_until_counter_bump() -> ResultTest<()> {
        let (datastore, table_id) = store_with_table()?;
        let mut tx = datastore.begin_mut_tx();
        let row_id = tx.insert(table_id, row![1u32, "a"])?;

        // Same command: the insert is not yet visible.
        assert_eq!(tx.iter(table_id)?.count(), 0);
        assert!(tx.get(table_id, row_id).is_none());

        tx.bump_command_counter();
        assert_eq!(tx.iter(table_id)?.count(), 1);
        assert!(tx.get(table_id, row_id).is_some());
        Ok(())
    }

    #[test]
    fn deletes_invisible_until_counter_bump() -> ResultTest<()> {
        let (datastore, table_id) = store_with_table()?;
        let mut tx = datastore.begin_mut_tx();
        let row_id = tx.insert(table_id, row![1u32, "a"])?;
        tx.bump_command_counter();
        tx.commit();

        let mut tx = datastore.begin_mut_tx();
        assert!(tx.delete(table_id, row_id));
        // The deleting command still sees the row.
        assert_eq!(tx.iter(table_id)?.count(), 1);
        tx.bump_command_counter();
        assert_eq!(tx.iter(table_id)?.count(), 0);
        // Double delete reports nothing deleted.
        assert!(!tx.delete(table_id, row_id));
        tx.commit();

        let tx = datastore.begin_mut_tx();
        assert_eq!(tx.iter(table_id)?.count(), 0);
        Ok(())
    }

    #[test]
    fn insert_then_delete_vanishes_at_commit() -> ResultTest<()> {
        let (datastore, table_id) = store_with_table()?;
        let mut tx = datastore.begin_mut_tx();
        let row_id = tx.insert(table_id, row![5u32, "gone"])?;
        tx.bump_command_counter();
        assert!(tx.delete(table_id, row_id));
        tx.commit();

        let tx = datastore.begin_mut_tx();
        assert_eq!(tx.iter(table_id)?.count(), 0);
        Ok(())
    }

    #[test]
    fn rollback_discards_everything() -> ResultTest<()> {
        let (datastore, table_id) = store_with_table()?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(table_id, row![1u32, "a"])?;
        tx.bump_command_counter();
        tx.rollback();

        let tx = datastore.begin_mut_tx();
        assert_eq!(tx.iter(table_id)?.count(), 0);
        Ok(())
    }

    #[test]
    fn col_eq_scan_and_delete() -> ResultTest<()> {
        let (datastore, table_id) = store_with_table()?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(table_id, row![1u32, "a"])?;
        tx.insert(table_id, row![2u32, "b"])?;
        tx.insert(table_id, row![2u32, "c"])?;
        tx.bump_command_counter();

        let found = find_by_col_eq(&tx, table_id, 0, Value::U32(2))?.unwrap();
        assert_eq!(found.row().str_at(1)?, "b");

        assert_eq!(delete_by_col_eq(&mut tx, table_id, 0, Value::U32(2))?, 2);
        tx.bump_command_counter();
        assert_eq!(tx.iter(table_id)?.count(), 1);
        Ok(())
    }

    #[test]
    fn files_are_created_and_unlinked_at_commit() -> ResultTest<()> {
        let (datastore, _) = store_with_table()?;
        let mut tx = datastore.begin_mut_tx();
        let node = tx.allocate_filenode();
        tx.create_file(node);
        tx.get_file_mut(node)?.insert(vec![Value::U32(1)], 1u64.into());
        tx.commit();

        let mut tx = datastore.begin_mut_tx();
        assert_eq!(tx.get_file(node).unwrap().len(), 1);
        tx.schedule_unlink(node);
        // Deferred: still present until commit.
        tx.rollback();
        let mut tx = datastore.begin_mut_tx();
        assert!(tx.get_file(node).is_some());
        tx.schedule_unlink(node);
        tx.commit();

        let tx = datastore.begin_mut_tx();
        assert!(tx.get_file(node).is_none());
        Ok(())
    }
}
