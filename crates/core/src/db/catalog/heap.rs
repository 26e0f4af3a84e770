//! Relation-level catalog operations: creating and dropping heaps, column
//! removal, rename, statistics cleanup and the TOAST sidecar contract.

use super::system_tables::{
    RelKind, StAttributeFields, StAttributeRow, StClassFields, StClassRow, StStatisticFields, ST_ATTRIBUTE_ID,
    ST_CLASS_ID, ST_STATISTIC_ID, NAMESPACE_SYSTEM_OID, TYPE_BOOL_OID, TYPE_BYTEA_OID, TYPE_INT4_OID, TYPE_INT8_OID,
    TYPE_OID_OID, TYPE_TEXT_OID,
};
use crate::db::datastore::mut_tx::{delete_by_col_eq, find_by_col_eq, MutTx};
use crate::db::datastore::schema::{ColumnSchema, TableSchema};
use crate::db::datastore::value::{Value, ValueKind};
use crate::db::datastore::{LockMode, Result};
use crate::db::depend::{record_dependency, DepType, ObjectAddress, ObjectClass};
use crate::error::CatalogError;
use relcat_primitives::{FileNode, Oid, RowId, SubId};

/// How a column's type is stored by the table store. Unknown (user-defined)
/// types are stored opaquely.
fn value_kind_for_type(type_oid: Oid) -> ValueKind {
    match type_oid {
        TYPE_BOOL_OID => ValueKind::Bool,
        TYPE_INT4_OID | TYPE_INT8_OID => ValueKind::I64,
        TYPE_TEXT_OID => ValueKind::String,
        TYPE_OID_OID => ValueKind::U32,
        TYPE_BYTEA_OID => ValueKind::Bytes,
        _ => ValueKind::Bytes,
    }
}

fn is_varlen_type(type_oid: Oid) -> bool {
    !matches!(
        type_oid,
        TYPE_BOOL_OID | TYPE_INT4_OID | TYPE_INT8_OID | TYPE_OID_OID
    )
}

pub(crate) fn class_row_handle(tx: &MutTx, oid: Oid) -> Result<Option<(RowId, StClassRow)>> {
    match find_by_col_eq(tx, ST_CLASS_ID, StClassFields::Oid.col_idx(), Value::from(oid))? {
        Some(row_ref) => Ok(Some((row_ref.id(), StClassRow::try_from(row_ref)?))),
        None => Ok(None),
    }
}

pub fn get_class_row(tx: &MutTx, oid: Oid) -> Result<StClassRow> {
    class_row_handle(tx, oid)?
        .map(|(_, row)| row)
        .ok_or(CatalogError::UndefinedObject {
            kind: "relation",
            name: oid.to_string(),
        })
}

/// Lock a relation and return its class row.
pub fn open_relation(tx: &mut MutTx, oid: Oid, mode: LockMode) -> Result<StClassRow> {
    let class_row = get_class_row(tx, oid)?;
    tx.lock_relation(oid, mode);
    Ok(class_row)
}

/// Locks are held until end of transaction; closing is bookkeeping only.
pub fn close_relation(_tx: &mut MutTx, _oid: Oid) {}

pub fn relation_name_in_use(tx: &MutTx, name: &str, namespace: Oid) -> Result<bool> {
    for row_ref in tx.iter_by_col_eq(ST_CLASS_ID, StClassFields::RelName.col_idx(), Value::from(name))? {
        let row = StClassRow::try_from(row_ref)?;
        if row.rel_namespace == namespace {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn attribute_rows(tx: &MutTx, rel_oid: Oid) -> Result<Vec<StAttributeRow>> {
    let mut rows: Vec<StAttributeRow> = tx
        .iter_by_col_eq(ST_ATTRIBUTE_ID, StAttributeFields::RelOid.col_idx(), Value::from(rel_oid))?
        .map(StAttributeRow::try_from)
        .collect::<Result<_>>()?;
    rows.sort_by_key(|a| a.col_pos);
    Ok(rows)
}

pub fn get_attribute_row(tx: &MutTx, rel_oid: Oid, col: SubId) -> Result<Option<StAttributeRow>> {
    Ok(attribute_rows(tx, rel_oid)?
        .into_iter()
        .find(|a| a.col_pos == col))
}

/// Create a relation: its class row, attribute rows (with their type edges),
/// physical storage when the kind has any, and the namespace dependency.
pub fn heap_create(
    tx: &mut MutTx,
    name: &str,
    namespace: Oid,
    kind: RelKind,
    columns: &[(&str, Oid)],
) -> Result<Oid> {
    log::trace!("RELATION CREATING: {name}");

    if relation_name_in_use(tx, name, namespace)? {
        return Err(CatalogError::DuplicateObject {
            kind: "relation",
            name: name.into(),
        });
    }

    let rel_oid = tx.allocate_oid();
    let has_storage = matches!(kind, RelKind::Relation | RelKind::Toast | RelKind::Sequence);
    let filenode = if has_storage { tx.allocate_filenode() } else { FileNode::ZERO };

    let class_row = StClassRow {
        oid: rel_oid,
        rel_name: name.into(),
        rel_namespace: namespace,
        rel_kind: kind,
        rel_has_index: false,
        rel_has_pkey: false,
        rel_filenode: filenode,
        rel_pages: 0,
        rel_tuples: 0,
    };
    tx.insert(ST_CLASS_ID, class_row.into())?;

    let mut schema_columns = Vec::with_capacity(columns.len());
    for (i, (col_name, type_oid)) in columns.iter().enumerate() {
        let col_pos = SubId(i as u32 + 1);
        let attr_row = StAttributeRow {
            rel_oid,
            col_pos,
            col_name: (*col_name).into(),
            type_oid: *type_oid,
            is_dropped: false,
        };
        tx.insert(ST_ATTRIBUTE_ID, attr_row.into())?;
        record_dependency(
            tx,
            &ObjectAddress::column(rel_oid, col_pos),
            &ObjectAddress::new(ObjectClass::Type.class_id(), *type_oid, SubId::ZERO),
            DepType::Normal,
        )?;
        schema_columns.push(ColumnSchema::new(col_name, value_kind_for_type(*type_oid)));
    }

    if has_storage {
        tx.create_physical_table(TableSchema::new(rel_oid, name, schema_columns));
    }

    record_dependency(
        tx,
        &ObjectAddress::relation(rel_oid),
        &ObjectAddress::new(ObjectClass::Schema.class_id(), namespace, SubId::ZERO),
        DepType::Normal,
    )?;

    tx.bump_command_counter();
    log::trace!("RELATION CREATED: {name}, oid: {rel_oid}");
    Ok(rel_oid)
}

/// Drop a heap: physical storage and every catalog row that is the
/// relation's own. Dependent objects are the deletion engine's business,
/// never this function's.
pub fn heap_drop(tx: &mut MutTx, rel_oid: Oid) -> Result<()> {
    log::trace!("RELATION DROPPING: {rel_oid}");
    let class_row = open_relation(tx, rel_oid, LockMode::AccessExclusive)?;

    if class_row.rel_filenode != FileNode::ZERO {
        tx.schedule_unlink(class_row.rel_filenode);
        tx.drop_physical_table(rel_oid);
    }

    delete_by_col_eq(
        tx,
        ST_ATTRIBUTE_ID,
        StAttributeFields::RelOid.col_idx(),
        Value::from(rel_oid),
    )?;
    remove_statistics(tx, rel_oid, SubId::ZERO)?;
    delete_by_col_eq(tx, ST_CLASS_ID, StClassFields::Oid.col_idx(), Value::from(rel_oid))?;

    log::trace!("RELATION DROPPED: {rel_oid}");
    Ok(())
}

/// Remove a single column: the attribute row is kept as a dropped stub so
/// column positions stay stable.
pub fn remove_attribute(tx: &mut MutTx, rel_oid: Oid, col: SubId) -> Result<()> {
    let row_ref = tx
        .iter_by_col_eq(ST_ATTRIBUTE_ID, StAttributeFields::RelOid.col_idx(), Value::from(rel_oid))?
        .find(|row_ref| row_ref.row().sub_at(StAttributeFields::ColPos.col_idx()) == Ok(col));
    let Some(row_ref) = row_ref else {
        return Err(CatalogError::Internal(format!(
            "no attribute row for column {col} of relation {rel_oid}"
        )));
    };
    let mut attr_row = StAttributeRow::try_from(row_ref)?;
    let row_id = row_ref.id();
    attr_row.is_dropped = true;
    attr_row.col_name = format!("........dropped.{}", col).into_boxed_str();
    tx.delete(ST_ATTRIBUTE_ID, row_id);
    tx.insert(ST_ATTRIBUTE_ID, attr_row.into())?;
    remove_statistics(tx, rel_oid, col)?;
    Ok(())
}

/// Rename a relation, keeping its oid and storage.
pub fn rename_relation(tx: &mut MutTx, rel_oid: Oid, new_name: &str) -> Result<()> {
    let (row_id, mut class_row) = class_row_handle(tx, rel_oid)?.ok_or(CatalogError::UndefinedObject {
        kind: "relation",
        name: rel_oid.to_string(),
    })?;
    if relation_name_in_use(tx, new_name, class_row.rel_namespace)? {
        return Err(CatalogError::DuplicateObject {
            kind: "relation",
            name: new_name.into(),
        });
    }
    tx.delete(ST_CLASS_ID, row_id);
    class_row.rel_name = new_name.into();
    tx.insert(ST_CLASS_ID, class_row.into())?;
    tx.bump_command_counter();
    Ok(())
}

/// Drop statistics rows for a column, or for the whole relation when `col`
/// is zero.
pub fn remove_statistics(tx: &mut MutTx, rel_oid: Oid, col: SubId) -> Result<()> {
    let row_ids: Vec<RowId> = tx
        .iter_by_col_eq(ST_STATISTIC_ID, StStatisticFields::RelOid.col_idx(), Value::from(rel_oid))?
        .filter(|row_ref| {
            col.is_whole() || row_ref.row().sub_at(StStatisticFields::ColPos.col_idx()) == Ok(col)
        })
        .map(|row_ref| row_ref.id())
        .collect();
    for row_id in row_ids {
        tx.delete(ST_STATISTIC_ID, row_id);
    }
    Ok(())
}

/// Update a class row through the normal delete+insert path.
pub fn update_class_row(tx: &mut MutTx, rel_oid: Oid, mutate: impl FnOnce(&mut StClassRow)) -> Result<()> {
    let (row_id, mut class_row) = class_row_handle(tx, rel_oid)?.ok_or(CatalogError::UndefinedObject {
        kind: "relation",
        name: rel_oid.to_string(),
    })?;
    tx.delete(ST_CLASS_ID, row_id);
    mutate(&mut class_row);
    tx.insert(ST_CLASS_ID, class_row.into())?;
    Ok(())
}

/// Overwrite a class row where it lives. Reindex-only: the normal update
/// path would try to maintain the very indexes being rebuilt.
pub fn overwrite_class_row_in_place(
    tx: &mut MutTx,
    rel_oid: Oid,
    mutate: impl FnOnce(&mut StClassRow),
) -> Result<()> {
    let (row_id, mut class_row) = class_row_handle(tx, rel_oid)?.ok_or(CatalogError::UndefinedObject {
        kind: "relation",
        name: rel_oid.to_string(),
    })?;
    mutate(&mut class_row);
    tx.update_row_in_place(ST_CLASS_ID, row_id, class_row.into())
}

/// Whether any column of the relation is of a type wide enough to need
/// out-of-line storage.
pub fn needs_toast_table(tx: &MutTx, rel_oid: Oid) -> Result<bool> {
    Ok(attribute_rows(tx, rel_oid)?
        .iter()
        .any(|a| !a.is_dropped && is_varlen_type(a.type_oid)))
}

/// Create the TOAST sidecar for a relation and tie it to its parent with an
/// internal dependency, so the sidecar goes away with the parent and cannot
/// be dropped on its own. Chunk storage mechanics live elsewhere.
pub fn create_toast_table(tx: &mut MutTx, rel_oid: Oid) -> Result<Oid> {
    let toast_name = format!("toast_{rel_oid}");
    let toast_oid = heap_create(
        tx,
        &toast_name,
        NAMESPACE_SYSTEM_OID,
        RelKind::Toast,
        &[
            ("chunk_id", TYPE_OID_OID),
            ("chunk_seq", TYPE_INT4_OID),
            ("chunk_data", TYPE_BYTEA_OID),
        ],
    )?;
    record_dependency(
        tx,
        &ObjectAddress::relation(toast_oid),
        &ObjectAddress::relation(rel_oid),
        DepType::Internal,
    )?;
    tx.bump_command_counter();
    Ok(toast_oid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::system_tables::NAMESPACE_PUBLIC_OID;
    use crate::db::datastore::Datastore;
    use crate::error::ResultTest;

    fn create_users_table(tx: &mut MutTx) -> Result<Oid> {
        heap_create(
            tx,
            "users",
            NAMESPACE_PUBLIC_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID), ("name", TYPE_TEXT_OID)],
        )
    }

    #[test]
    fn create_then_read_back() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = create_users_table(&mut tx)?;

        let class_row = get_class_row(&tx, rel_oid)?;
        assert_eq!(&*class_row.rel_name, "users");
        assert_eq!(class_row.rel_kind, RelKind::Relation);
        assert!(class_row.rel_filenode != FileNode::ZERO);

        let attrs = attribute_rows(&tx, rel_oid)?;
        assert_eq!(attrs.len(), 2);
        assert_eq!(&*attrs[0].col_name, "id");
        assert_eq!(attrs[1].col_pos, SubId(2));
        Ok(())
    }

    #[test]
    fn duplicate_names_rejected_per_namespace() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        create_users_table(&mut tx)?;
        let err = create_users_table(&mut tx).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateObject { .. }));
        // Same name in another namespace is fine.
        assert!(heap_create(
            &mut tx,
            "users",
            NAMESPACE_SYSTEM_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID)],
        )
        .is_ok());
        Ok(())
    }

    #[test]
    fn drop_removes_rows_and_storage() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = create_users_table(&mut tx)?;
        heap_drop(&mut tx, rel_oid)?;
        tx.bump_command_counter();
        assert!(get_class_row(&tx, rel_oid).is_err());
        assert!(attribute_rows(&tx, rel_oid)?.is_empty());
        Ok(())
    }

    #[test]
    fn remove_attribute_leaves_dropped_stub() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = create_users_table(&mut tx)?;
        remove_attribute(&mut tx, rel_oid, SubId(2))?;
        tx.bump_command_counter();

        let attrs = attribute_rows(&tx, rel_oid)?;
        assert_eq!(attrs.len(), 2);
        assert!(attrs[1].is_dropped);
        Ok(())
    }

    #[test]
    fn rename_checks_for_collisions() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = create_users_table(&mut tx)?;
        heap_create(
            &mut tx,
            "accounts",
            NAMESPACE_PUBLIC_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID)],
        )?;
        assert!(rename_relation(&mut tx, rel_oid, "accounts").is_err());
        rename_relation(&mut tx, rel_oid, "members")?;
        assert_eq!(&*get_class_row(&tx, rel_oid)?.rel_name, "members");
        Ok(())
    }

    #[test]
    fn toast_sidecar_for_wide_rows() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = create_users_table(&mut tx)?;
        assert!(needs_toast_table(&tx, rel_oid)?);

        let toast_oid = create_toast_table(&mut tx, rel_oid)?;
        let toast_row = get_class_row(&tx, toast_oid)?;
        assert_eq!(toast_row.rel_kind, RelKind::Toast);

        let narrow = heap_create(
            &mut tx,
            "narrow",
            NAMESPACE_PUBLIC_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID)],
        )?;
        assert!(!needs_toast_table(&tx, narrow)?);
        Ok(())
    }
}
