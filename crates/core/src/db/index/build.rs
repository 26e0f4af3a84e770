//! Index creation and removal.
//!
//! `create_index` is the canonical dependency producer: besides the catalog
//! rows it registers exactly the edges that make later drops behave: the
//! internal tie to a backing constraint, auto edges onto simple key columns,
//! normal edges onto operator classes, and walker-derived edges for
//! expressions and predicate. `index_drop` is only ever reached through the
//! deletion engine's per-class dispatch.

use super::am::{am_by_oid_required, IndexAm};
use super::{IndexFlags, IndexInfo};
use crate::db::catalog::heap;
use crate::db::catalog::system_tables::{
    RelKind, StAttributeRow, StClassRow, StConstraintRow, StIndexFields, StIndexRow, StOpclassRow, StTypeFields,
    ST_ATTRIBUTE_ID, ST_CLASS_ID, ST_INDEX_ID, ST_OPCLASS_ID, ST_TYPE_ID, NAMESPACE_SYSTEM_OID,
};
use crate::db::datastore::mut_tx::{delete_by_col_eq, find_by_col_eq, MutTx};
use crate::db::datastore::value::Value;
use crate::db::datastore::{LockMode, Result};
use crate::db::expr::{eval, record_dependency_on_single_rel_expr, tree};
use crate::db::depend::{record_dependency, DepType, ObjectAddress, ObjectClass};
use crate::error::{CatalogError, IndexError};
use relcat_primitives::{Oid, RowId, SubId};

fn opclass_row(tx: &MutTx, opclass_oid: Oid) -> Result<StOpclassRow> {
    find_by_col_eq(tx, ST_OPCLASS_ID, 0, Value::from(opclass_oid))?
        .map(StOpclassRow::try_from)
        .transpose()?
        .ok_or_else(|| IndexError::OpclassNotFound(opclass_oid).into())
}

fn type_exists(tx: &MutTx, type_oid: Oid) -> Result<bool> {
    Ok(find_by_col_eq(tx, ST_TYPE_ID, StTypeFields::Oid.col_idx(), Value::from(type_oid))?.is_some())
}

/// The st_index row for `index_oid`.
pub fn index_metadata(tx: &MutTx, index_oid: Oid) -> Result<StIndexRow> {
    find_by_col_eq(tx, ST_INDEX_ID, StIndexFields::IndexOid.col_idx(), Value::from(index_oid))?
        .map(StIndexRow::try_from)
        .transpose()?
        .ok_or_else(|| IndexError::IndexNotFound(index_oid).into())
}

/// All index oids on a heap, in creation order.
pub fn indexes_on(tx: &MutTx, heap_oid: Oid) -> Result<Vec<Oid>> {
    tx.iter_by_col_eq(ST_INDEX_ID, StIndexFields::HeapOid.col_idx(), Value::from(heap_oid))?
        .map(|row_ref| Ok(StIndexRow::try_from(row_ref)?.index_oid))
        .collect()
}

/// Create an index on `heap_oid` and register its dependencies.
pub fn create_index(
    tx: &mut MutTx,
    heap_oid: Oid,
    index_name: &str,
    info: &IndexInfo,
    am_oid: Oid,
    class_oids: &[Oid],
    flags: &IndexFlags,
) -> Result<Oid> {
    log::trace!("INDEX CREATING: {index_name} on {heap_oid}");

    // Writers of other rows may continue; schema changes may not.
    let heap_row = heap::open_relation(tx, heap_oid, LockMode::Share)?;

    if info.key_attrs.is_empty() {
        return Err(IndexError::ZeroColumnIndex.into());
    }
    let expr_columns = info.num_expression_columns();
    if info.expressions.len() < expr_columns {
        return Err(IndexError::TooFewExpressions {
            expected: expr_columns,
            found: info.expressions.len(),
        }
        .into());
    }
    if class_oids.len() != info.key_attrs.len() {
        return Err(IndexError::OpclassMismatch {
            expected: info.key_attrs.len(),
            found: class_oids.len(),
        }
        .into());
    }
    if heap_row.rel_namespace == NAMESPACE_SYSTEM_OID && !flags.is_bootstrap && !flags.allow_system {
        return Err(IndexError::SystemCatalog(heap_row.rel_name.clone()).into());
    }
    if flags.shared && !flags.is_bootstrap {
        return Err(IndexError::SharedAfterBootstrap.into());
    }
    if heap::relation_name_in_use(tx, index_name, heap_row.rel_namespace)? {
        return Err(CatalogError::DuplicateObject {
            kind: "relation",
            name: index_name.into(),
        });
    }
    let am = am_by_oid_required(am_oid)?;

    // Build the index tuple descriptor: copy plain columns from the heap,
    // synthesize expression columns from their result type, and let the
    // operator class override the stored key type.
    let mut index_columns: Vec<(Box<str>, Oid)> = Vec::with_capacity(info.num_attrs());
    let mut expressions = info.expressions.iter();
    for (i, key_attr) in info.key_attrs.iter().enumerate() {
        let (col_name, mut type_oid) = if key_attr.is_whole() {
            let expr = expressions.next().expect("arity checked above");
            let type_oid = eval::result_type(tx, heap_oid, expr)?;
            if !type_exists(tx, type_oid)? {
                return Err(IndexError::UndefinedType(type_oid).into());
            }
            (format!("expr_{}", i + 1).into_boxed_str(), type_oid)
        } else {
            let attr = heap::get_attribute_row(tx, heap_oid, *key_attr)?.ok_or(IndexError::ColumnOutOfRange {
                relation: heap_oid,
                column: *key_attr,
            })?;
            (attr.col_name, attr.type_oid)
        };
        let opclass = opclass_row(tx, class_oids[i])?;
        if opclass.key_type.is_valid() && opclass.key_type != type_oid {
            type_oid = opclass.key_type;
        }
        index_columns.push((col_name, type_oid));
    }

    let index_oid = match flags.pre_assigned_oid {
        Some(oid) => oid,
        None => tx.allocate_oid(),
    };

    // The relation row and its physical file.
    let filenode = tx.allocate_filenode();
    let class_row = StClassRow {
        oid: index_oid,
        rel_name: index_name.into(),
        rel_namespace: heap_row.rel_namespace,
        rel_kind: RelKind::Index,
        rel_has_index: false,
        rel_has_pkey: false,
        rel_filenode: filenode,
        rel_pages: 0,
        rel_tuples: 0,
    };
    tx.insert(ST_CLASS_ID, class_row.into())?;
    tx.create_file(filenode);

    // Nobody else may look at the new index until it is ready.
    tx.lock_relation(index_oid, LockMode::AccessExclusive);

    for (i, (col_name, type_oid)) in index_columns.iter().enumerate() {
        let attr_row = StAttributeRow {
            rel_oid: index_oid,
            col_pos: SubId(i as u32 + 1),
            col_name: col_name.clone(),
            type_oid: *type_oid,
            is_dropped: false,
        };
        tx.insert(ST_ATTRIBUTE_ID, attr_row.into())?;
    }

    let index_row = StIndexRow {
        index_oid,
        heap_oid,
        num_atts: info.num_attrs() as u32,
        key_cols: info.key_attrs.clone(),
        class_oids: class_oids.to_vec(),
        is_unique: info.is_unique,
        is_primary: info.is_primary,
        is_clustered: false,
        predicate: if info.predicate.is_empty() {
            None
        } else {
            Some(tree::to_bytes(&info.predicate).map_err(CatalogError::from)?)
        },
        expressions: if info.expressions.is_empty() {
            None
        } else {
            Some(tree::to_bytes(&info.expressions).map_err(CatalogError::from)?)
        },
    };
    tx.insert(ST_INDEX_ID, index_row.into())?;

    register_index_dependencies(tx, index_oid, heap_oid, index_name, info, class_oids, flags)?;

    // Make the new catalog rows visible before building.
    tx.bump_command_counter();

    if flags.is_bootstrap {
        tx.deferred_index_builds.push(index_oid);
    } else if flags.skip_build {
        // The caller promises to fill the index; leave the AM's notion of
        // empty and only flip the heap flags.
        *tx.get_file_mut(filenode)? = am.build_empty();
        heap::update_class_row(tx, heap_oid, |c| {
            c.rel_has_index = true;
            if info.is_primary {
                c.rel_has_pkey = true;
            }
        })?;
        tx.bump_command_counter();
    } else {
        index_build(tx, heap_oid, index_oid, info, am)?;
        tx.bump_command_counter();
    }

    log::trace!("INDEX CREATED: {index_name}, oid: {index_oid}");
    Ok(index_oid)
}

/// Step 10: the edges. A constraint-backed index hangs off its constraint
/// through an internal edge; a bare index pins itself onto its simple key
/// columns (or the heap as a whole if every column is an expression). Every
/// operator class gets a normal edge, and the walker contributes the edges
/// of expressions and predicate.
fn register_index_dependencies(
    tx: &mut MutTx,
    index_oid: Oid,
    heap_oid: Oid,
    index_name: &str,
    info: &IndexInfo,
    class_oids: &[Oid],
    flags: &IndexFlags,
) -> Result<()> {
    let index_addr = ObjectAddress::relation(index_oid);
    let simple_columns: Vec<SubId> = info.key_attrs.iter().copied().filter(|a| !a.is_whole()).collect();

    if let Some(constraint_kind) = flags.constraint {
        let constraint_oid = tx.allocate_oid();
        let constraint_row = StConstraintRow {
            oid: constraint_oid,
            name: index_name.into(),
            rel_oid: heap_oid,
            kind: constraint_kind,
            key_cols: simple_columns.clone(),
        };
        tx.insert(crate::db::catalog::system_tables::ST_CONSTRAINT_ID, constraint_row.into())?;
        let constraint_addr =
            ObjectAddress::new(ObjectClass::Constraint.class_id(), constraint_oid, SubId::ZERO);
        record_dependency(tx, &index_addr, &constraint_addr, DepType::Internal)?;
        record_dependency(tx, &constraint_addr, &ObjectAddress::relation(heap_oid), DepType::Normal)?;
        for col in &simple_columns {
            record_dependency(
                tx,
                &constraint_addr,
                &ObjectAddress::column(heap_oid, *col),
                DepType::Normal,
            )?;
        }
    } else if simple_columns.is_empty() {
        record_dependency(tx, &index_addr, &ObjectAddress::relation(heap_oid), DepType::Auto)?;
    } else {
        for col in &simple_columns {
            record_dependency(tx, &index_addr, &ObjectAddress::column(heap_oid, *col), DepType::Auto)?;
        }
    }

    for opclass_oid in class_oids {
        record_dependency(
            tx,
            &index_addr,
            &ObjectAddress::new(ObjectClass::OperatorClass.class_id(), *opclass_oid, SubId::ZERO),
            DepType::Normal,
        )?;
    }

    for expr in &info.expressions {
        record_dependency_on_single_rel_expr(tx, &index_addr, expr, heap_oid, DepType::Normal, DepType::Auto)?;
    }
    for clause in &info.predicate {
        record_dependency_on_single_rel_expr(tx, &index_addr, clause, heap_oid, DepType::Normal, DepType::Auto)?;
    }
    Ok(())
}

/// Run the AM build procedure and flip the heap's index-presence flags.
pub fn index_build(
    tx: &mut MutTx,
    heap_oid: Oid,
    index_oid: Oid,
    info: &IndexInfo,
    am: &'static dyn IndexAm,
) -> Result<()> {
    let file = am.build(tx, heap_oid, index_oid, info)?;
    let filenode = heap::get_class_row(tx, index_oid)?.rel_filenode;
    *tx.get_file_mut(filenode)? = file;
    heap::update_class_row(tx, heap_oid, |c| {
        c.rel_has_index = true;
        if info.is_primary {
            c.rel_has_pkey = true;
        }
    })?;
    Ok(())
}

/// Build every index registered for a deferred (bootstrap) build.
pub fn build_deferred_indexes(tx: &mut MutTx) -> Result<()> {
    let deferred = std::mem::take(&mut tx.deferred_index_builds);
    for index_oid in deferred {
        let meta = index_metadata(tx, index_oid)?;
        let info = info_from_metadata(&meta)?;
        let am_oid = opclass_row(tx, meta.class_oids[0])?.am_oid;
        let am = am_by_oid_required(am_oid)?;
        index_build(tx, meta.heap_oid, index_oid, &info, am)?;
        tx.bump_command_counter();
    }
    Ok(())
}

/// Reconstitute an [`IndexInfo`] from the stored metadata row.
pub fn info_from_metadata(meta: &StIndexRow) -> Result<IndexInfo> {
    Ok(IndexInfo {
        key_attrs: meta.key_cols.clone(),
        expressions: match &meta.expressions {
            Some(bytes) => tree::from_bytes(bytes).map_err(CatalogError::from)?,
            None => Vec::new(),
        },
        predicate: match &meta.predicate {
            Some(bytes) => tree::from_bytes(bytes).map_err(CatalogError::from)?,
            None => Vec::new(),
        },
        is_unique: meta.is_unique,
        is_primary: meta.is_primary,
    })
}

/// The per-class deleter for indexes. Driven only through the deletion
/// engine; dependency edges are the engine's business.
pub fn index_drop(tx: &mut MutTx, index_oid: Oid) -> Result<()> {
    log::trace!("INDEX DROPPING: {index_oid}");
    let meta = index_metadata(tx, index_oid)?;

    tx.lock_relation(meta.heap_oid, LockMode::AccessExclusive);
    tx.lock_relation(index_oid, LockMode::AccessExclusive);

    let class_row = heap::get_class_row(tx, index_oid)?;
    if class_row.rel_kind != RelKind::Index {
        return Err(IndexError::NotAnIndex(class_row.rel_name).into());
    }

    // The unlink happens at commit.
    tx.schedule_unlink(class_row.rel_filenode);

    // Expression indexes may have statistics of their own.
    heap::remove_statistics(tx, index_oid, SubId::ZERO)?;

    delete_by_col_eq(tx, ST_INDEX_ID, StIndexFields::IndexOid.col_idx(), Value::from(index_oid))?;
    delete_by_col_eq(tx, ST_ATTRIBUTE_ID, 0, Value::from(index_oid))?;
    delete_by_col_eq(tx, ST_CLASS_ID, 0, Value::from(index_oid))?;

    // Other sessions would be told to refresh their index lists here. The
    // heap's rel_has_index flag is left alone; the next vacuum corrects it.
    log::trace!("INDEX DROPPED: {index_oid}");
    Ok(())
}

/// Whether catalog lookups may use this index right now. False for the
/// index currently being rebuilt, and during a catalog reindex pass for any
/// index not yet rebuilt.
pub fn index_is_usable(tx: &MutTx, index_oid: Oid) -> bool {
    if tx.reindex_progress.is_some_and(|p| p.index == index_oid) {
        return false;
    }
    if let Some(usable) = &tx.usable_catalog_indexes {
        return usable.contains(&index_oid);
    }
    true
}

/// Exact-key index probe. Falls back on an error rather than a wrong answer
/// when the index is mid-rebuild.
pub fn index_scan(tx: &MutTx, index_oid: Oid, key: &[Value]) -> Result<Vec<RowId>> {
    if !index_is_usable(tx, index_oid) {
        return Err(IndexError::Unusable(index_oid).into());
    }
    let class_row = heap::get_class_row(tx, index_oid)?;
    let file = tx
        .get_file(class_row.rel_filenode)
        .ok_or(crate::error::StoreError::FileNotFound(class_row.rel_filenode))?;
    Ok(file.lookup(key).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::heap::{attribute_rows, get_class_row, heap_create};
    use crate::db::catalog::system_tables::{
        StConstraintFields, ConstraintKind, NAMESPACE_PUBLIC_OID, OPCLASS_INT4_OPS_OID, BTREE_AM_OID,
        ST_CONSTRAINT_ID, TYPE_BOOL_OID, TYPE_INT4_OID, TYPE_TEXT_OID,
    };
    use crate::db::datastore::Datastore;
    use crate::db::depend::registry::scan_by_depender;
    use crate::db::depend::DepType;
    use crate::db::expr::Expr;
    use crate::db::index::{IndexFlags, IndexInfo};
    use crate::error::ResultTest;
    use crate::row;

    fn setup_table(columns: &[(&str, Oid)]) -> ResultTest<(Datastore, Oid)> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let heap_oid = heap_create(&mut tx, "readings", NAMESPACE_PUBLIC_OID,
            crate::db::catalog::system_tables::RelKind::Relation, columns)?;
        tx.commit();
        Ok((datastore, heap_oid))
    }

    fn default_index(tx: &mut MutTx, heap_oid: Oid, name: &str) -> Result<Oid> {
        create_index(
            tx,
            heap_oid,
            name,
            &IndexInfo::over_columns(&[1]),
            crate::db::catalog::system_tables::BTREE_AM_OID,
            &[OPCLASS_INT4_OPS_OID],
            &IndexFlags::default(),
        )
    }

    #[test]
    fn bare_index_records_auto_column_edges() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        let index_oid = default_index(&mut tx, heap_oid, "readings_v_idx")?;

        let edges = scan_by_depender(&tx, &ObjectAddress::relation(index_oid))?;
        let auto_edges: Vec<_> = edges.iter().filter(|e| e.dep_type == DepType::Auto).collect();
        assert_eq!(auto_edges.len(), 1);
        assert_eq!(auto_edges[0].referent, ObjectAddress::column(heap_oid, SubId(1)));
        assert!(edges.iter().any(|e| e.dep_type == DepType::Normal
            && e.referent == ObjectAddress::new(ObjectClass::OperatorClass.class_id(), OPCLASS_INT4_OPS_OID, SubId::ZERO)));

        // The heap is flagged, the index's tuple descriptor mirrors the heap
        // column.
        assert!(get_class_row(&tx, heap_oid)?.rel_has_index);
        let attrs = attribute_rows(&tx, index_oid)?;
        assert_eq!(attrs.len(), 1);
        assert_eq!(&*attrs[0].col_name, "v");
        assert_eq!(attrs[0].type_oid, TYPE_INT4_OID);
        Ok(())
    }

    #[test]
    fn build_fills_the_file_from_heap_rows() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(heap_oid, row![3i64])?;
        tx.insert(heap_oid, row![8i64])?;
        tx.bump_command_counter();
        let index_oid = default_index(&mut tx, heap_oid, "readings_v_idx")?;

        let hits = index_scan(&tx, index_oid, &[Value::I64(8)])?;
        assert_eq!(hits.len(), 1);
        assert!(index_scan(&tx, index_oid, &[Value::I64(99)])?.is_empty());
        Ok(())
    }

    #[test]
    fn expression_only_index_pins_whole_heap() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(heap_oid, row![5i64])?;
        tx.bump_command_counter();
        let index_oid = create_index(
            &mut tx,
            heap_oid,
            "readings_expr_idx",
            &IndexInfo {
                key_attrs: vec![SubId::ZERO],
                expressions: vec![Expr::op(
                    crate::db::catalog::system_tables::OPERATOR_INT4_GT_OID,
                    vec![Expr::var(1, 1), Expr::const_int4(4)],
                )],
                ..IndexInfo::default()
            },
            BTREE_AM_OID,
            &[OPCLASS_INT4_OPS_OID],
            &IndexFlags::default(),
        )?;

        let edges = scan_by_depender(&tx, &ObjectAddress::relation(index_oid))?;
        // No simple columns: one auto edge onto the heap as a whole, plus
        // the walker's auto edge onto the referenced column.
        assert!(edges
            .iter()
            .any(|e| e.dep_type == DepType::Auto && e.referent == ObjectAddress::relation(heap_oid)));
        assert!(edges
            .iter()
            .any(|e| e.dep_type == DepType::Auto && e.referent == ObjectAddress::column(heap_oid, SubId(1))));
        // The operator came through the walker as a normal edge.
        assert!(edges.iter().any(|e| e.dep_type == DepType::Normal
            && e.referent.class_id == ObjectClass::Operator.class_id()));

        // The expression's computed value (5 > 4) landed in the file, and
        // the synthesized column carries the expression's result type.
        let hits = index_scan(&tx, index_oid, &[Value::Bool(true)])?;
        assert_eq!(hits.len(), 1);
        assert_eq!(attribute_rows(&tx, index_oid)?[0].type_oid, TYPE_BOOL_OID);
        Ok(())
    }

    #[test]
    fn partial_index_skips_unqualified_rows() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(heap_oid, row![1i64])?;
        tx.insert(heap_oid, row![10i64])?;
        tx.bump_command_counter();
        let index_oid = create_index(
            &mut tx,
            heap_oid,
            "readings_big_idx",
            &IndexInfo {
                predicate: vec![Expr::op(
                    crate::db::catalog::system_tables::OPERATOR_INT4_GT_OID,
                    vec![Expr::var(1, 1), Expr::const_int4(5)],
                )],
                ..IndexInfo::over_columns(&[1])
            },
            BTREE_AM_OID,
            &[OPCLASS_INT4_OPS_OID],
            &IndexFlags::default(),
        )?;

        let meta = index_metadata(&tx, index_oid)?;
        assert!(meta.predicate.is_some());
        assert!(index_scan(&tx, index_oid, &[Value::I64(1)])?.is_empty());
        assert_eq!(index_scan(&tx, index_oid, &[Value::I64(10)])?.len(), 1);
        Ok(())
    }

    #[test]
    fn constraint_index_follows_the_internal_pattern() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        let index_oid = create_index(
            &mut tx,
            heap_oid,
            "readings_pkey",
            &IndexInfo {
                is_unique: true,
                is_primary: true,
                ..IndexInfo::over_columns(&[1])
            },
            BTREE_AM_OID,
            &[OPCLASS_INT4_OPS_OID],
            &IndexFlags {
                constraint: Some(ConstraintKind::Primary),
                ..IndexFlags::default()
            },
        )?;

        let edges = scan_by_depender(&tx, &ObjectAddress::relation(index_oid))?;
        // The index is internal to its constraint and never auto-tied to
        // heap columns.
        let internal: Vec<_> = edges.iter().filter(|e| e.dep_type == DepType::Internal).collect();
        assert_eq!(internal.len(), 1);
        assert!(!edges.iter().any(|e| e.dep_type == DepType::Auto));

        let constraint_oid = internal[0].referent.object_id;
        let constraint_row = find_by_col_eq(&tx, ST_CONSTRAINT_ID, StConstraintFields::Oid.col_idx(),
            Value::from(constraint_oid))?
            .map(crate::db::catalog::system_tables::StConstraintRow::try_from)
            .transpose()?
            .unwrap();
        assert_eq!(constraint_row.kind, ConstraintKind::Primary);
        assert_eq!(constraint_row.key_cols, vec![SubId(1)]);

        let constraint_edges = scan_by_depender(&tx, &internal[0].referent)?;
        assert!(constraint_edges
            .iter()
            .any(|e| e.dep_type == DepType::Normal && e.referent == ObjectAddress::relation(heap_oid)));
        assert!(constraint_edges
            .iter()
            .any(|e| e.dep_type == DepType::Normal && e.referent == ObjectAddress::column(heap_oid, SubId(1))));

        assert!(get_class_row(&tx, heap_oid)?.rel_has_pkey);
        Ok(())
    }

    #[test]
    fn creation_preconditions_are_enforced() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID), ("label", TYPE_TEXT_OID)])?;
        let mut tx = datastore.begin_mut_tx();

        let err = create_index(&mut tx, heap_oid, "no_cols", &IndexInfo::default(), BTREE_AM_OID, &[],
            &IndexFlags::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Index(IndexError::ZeroColumnIndex)));

        let err = create_index(&mut tx, heap_oid, "short_exprs",
            &IndexInfo { key_attrs: vec![SubId::ZERO], ..IndexInfo::default() },
            BTREE_AM_OID, &[OPCLASS_INT4_OPS_OID], &IndexFlags::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Index(IndexError::TooFewExpressions { .. })));

        let err = create_index(&mut tx, heap_oid, "class_mismatch", &IndexInfo::over_columns(&[1]),
            BTREE_AM_OID, &[], &IndexFlags::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Index(IndexError::OpclassMismatch { .. })));

        let err = create_index(&mut tx, heap_oid, "bad_col", &IndexInfo::over_columns(&[9]),
            BTREE_AM_OID, &[OPCLASS_INT4_OPS_OID], &IndexFlags::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Index(IndexError::ColumnOutOfRange { .. })));

        let err = create_index(&mut tx, heap_oid, "shared_late", &IndexInfo::over_columns(&[1]),
            BTREE_AM_OID, &[OPCLASS_INT4_OPS_OID],
            &IndexFlags { shared: true, ..IndexFlags::default() }).unwrap_err();
        assert!(matches!(err, CatalogError::Index(IndexError::SharedAfterBootstrap)));

        // A name collision with the heap itself.
        let err = default_index(&mut tx, heap_oid, "readings").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateObject { .. }));

        // System catalogs refuse user indexes unless explicitly allowed.
        let err = default_index(&mut tx, crate::db::catalog::system_tables::ST_CLASS_ID, "st_class_oid_idx")
            .unwrap_err();
        assert!(matches!(err, CatalogError::Index(IndexError::SystemCatalog(_))));
        Ok(())
    }

    #[test]
    fn skip_build_leaves_an_empty_file() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(heap_oid, row![3i64])?;
        tx.bump_command_counter();
        let index_oid = create_index(&mut tx, heap_oid, "readings_v_idx", &IndexInfo::over_columns(&[1]),
            BTREE_AM_OID, &[OPCLASS_INT4_OPS_OID],
            &IndexFlags { skip_build: true, ..IndexFlags::default() })?;

        assert!(index_scan(&tx, index_oid, &[Value::I64(3)])?.is_empty());
        assert!(get_class_row(&tx, heap_oid)?.rel_has_index);
        Ok(())
    }

    #[test]
    fn bootstrap_indexes_build_deferred() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        tx.insert(heap_oid, row![6i64])?;
        tx.bump_command_counter();
        let index_oid = create_index(&mut tx, heap_oid, "readings_v_idx", &IndexInfo::over_columns(&[1]),
            BTREE_AM_OID, &[OPCLASS_INT4_OPS_OID],
            &IndexFlags { is_bootstrap: true, ..IndexFlags::default() })?;

        // Nothing built yet.
        assert!(index_scan(&tx, index_oid, &[Value::I64(6)])?.is_empty());
        build_deferred_indexes(&mut tx)?;
        assert_eq!(index_scan(&tx, index_oid, &[Value::I64(6)])?.len(), 1);
        Ok(())
    }

    #[test]
    fn pre_assigned_oids_pass_through() -> ResultTest<()> {
        let (datastore, heap_oid) = setup_table(&[("v", TYPE_INT4_OID)])?;
        let mut tx = datastore.begin_mut_tx();
        let wanted = Oid(7777);
        let index_oid = create_index(&mut tx, heap_oid, "readings_v_idx", &IndexInfo::over_columns(&[1]),
            BTREE_AM_OID, &[OPCLASS_INT4_OPS_OID],
            &IndexFlags { pre_assigned_oid: Some(wanted), ..IndexFlags::default() })?;
        assert_eq!(index_oid, wanted);
        Ok(())
    }
}
