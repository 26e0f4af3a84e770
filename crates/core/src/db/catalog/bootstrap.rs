//! Bootstrapping a fresh store.
//!
//! Runs before any transaction exists and writes the committed state
//! directly: the system tables, their own class/attribute rows, the built-in
//! namespaces, types, language, comparison functions and operators, the
//! btree operator classes, and a pin edge for every one of them so nothing
//! seeded here can ever be dropped.

use super::system_tables::*;
use crate::db::datastore::committed_state::CommittedState;
use crate::db::datastore::value::ValueKind;
use crate::db::datastore::Result;
use crate::db::depend::{DepType, ObjectAddress, ObjectClass};
use relcat_primitives::{FileNode, Oid, SubId};

/// The built-in type backing a store-level column kind, for the system
/// tables' own attribute rows.
fn type_for_kind(kind: ValueKind) -> Oid {
    match kind {
        ValueKind::Bool => TYPE_BOOL_OID,
        ValueKind::U8 => TYPE_INT4_OID,
        ValueKind::U32 => TYPE_OID_OID,
        ValueKind::U64 | ValueKind::I64 => TYPE_INT8_OID,
        ValueKind::String => TYPE_TEXT_OID,
        ValueKind::Bytes | ValueKind::Array => TYPE_BYTEA_OID,
    }
}

fn pin(committed: &mut CommittedState, addr: ObjectAddress) -> Result<()> {
    let row = StDependRow {
        dep_class: Oid::ZERO,
        dep_oid: Oid::ZERO,
        dep_sub: SubId::ZERO,
        ref_class: addr.class_id,
        ref_oid: addr.object_id,
        ref_sub: addr.sub_id,
        dep_type: DepType::Pin,
    };
    committed.insert_raw(ST_DEPEND_ID, row.into())?;
    Ok(())
}

pub fn bootstrap_system_tables(committed: &mut CommittedState) -> Result<()> {
    log::trace!("DATABASE BOOTSTRAPPING: system tables");

    // The tables themselves, then rows about the tables in the tables.
    for schema in system_tables() {
        committed.create_table(schema);
    }

    for schema in system_tables() {
        let class_row = StClassRow {
            oid: schema.table_id,
            rel_name: schema.table_name.clone(),
            rel_namespace: NAMESPACE_SYSTEM_OID,
            rel_kind: RelKind::Relation,
            rel_has_index: false,
            rel_has_pkey: false,
            rel_filenode: FileNode::ZERO,
            rel_pages: 0,
            rel_tuples: 0,
        };
        committed.insert_raw(ST_CLASS_ID, class_row.into())?;
        for (i, column) in schema.columns.iter().enumerate() {
            let attr_row = StAttributeRow {
                rel_oid: schema.table_id,
                col_pos: SubId(i as u32 + 1),
                col_name: column.col_name.clone(),
                type_oid: type_for_kind(column.col_type),
                is_dropped: false,
            };
            committed.insert_raw(ST_ATTRIBUTE_ID, attr_row.into())?;
        }
        pin(committed, ObjectAddress::relation(schema.table_id))?;
    }

    for (oid, name) in [(NAMESPACE_SYSTEM_OID, "system"), (NAMESPACE_PUBLIC_OID, "public")] {
        committed.insert_raw(ST_NAMESPACE_ID, StNamespaceRow { oid, name: name.into() }.into())?;
        pin(committed, ObjectAddress::new(ObjectClass::Schema.class_id(), oid, SubId::ZERO))?;
    }

    for (oid, name) in [
        (TYPE_BOOL_OID, "bool"),
        (TYPE_INT4_OID, "int4"),
        (TYPE_INT8_OID, "int8"),
        (TYPE_TEXT_OID, "text"),
        (TYPE_OID_OID, "oid"),
        (TYPE_BYTEA_OID, "bytea"),
    ] {
        let row = StTypeRow {
            oid,
            name: name.into(),
            namespace: NAMESPACE_SYSTEM_OID,
        };
        committed.insert_raw(ST_TYPE_ID, row.into())?;
        pin(committed, ObjectAddress::new(ObjectClass::Type.class_id(), oid, SubId::ZERO))?;
    }

    committed.insert_raw(
        ST_LANGUAGE_ID,
        StLanguageRow {
            oid: LANGUAGE_INTERNAL_OID,
            name: "internal".into(),
        }
        .into(),
    )?;
    pin(
        committed,
        ObjectAddress::new(ObjectClass::Language.class_id(), LANGUAGE_INTERNAL_OID, SubId::ZERO),
    )?;

    for (oid, name, args, ret) in [
        (PROC_INT4_EQ_OID, "int4eq", [TYPE_INT4_OID; 2], TYPE_BOOL_OID),
        (PROC_INT4_LT_OID, "int4lt", [TYPE_INT4_OID; 2], TYPE_BOOL_OID),
        (PROC_INT4_GT_OID, "int4gt", [TYPE_INT4_OID; 2], TYPE_BOOL_OID),
        (PROC_TEXT_EQ_OID, "texteq", [TYPE_TEXT_OID; 2], TYPE_BOOL_OID),
    ] {
        let row = StProcRow {
            oid,
            name: name.into(),
            namespace: NAMESPACE_SYSTEM_OID,
            arg_types: args.to_vec(),
            ret_type: ret,
        };
        committed.insert_raw(ST_PROC_ID, row.into())?;
        pin(committed, ObjectAddress::new(ObjectClass::Function.class_id(), oid, SubId::ZERO))?;
    }

    for (oid, name, operand, proc_oid) in [
        (OPERATOR_INT4_EQ_OID, "=", TYPE_INT4_OID, PROC_INT4_EQ_OID),
        (OPERATOR_INT4_LT_OID, "<", TYPE_INT4_OID, PROC_INT4_LT_OID),
        (OPERATOR_INT4_GT_OID, ">", TYPE_INT4_OID, PROC_INT4_GT_OID),
        (OPERATOR_TEXT_EQ_OID, "=", TYPE_TEXT_OID, PROC_TEXT_EQ_OID),
    ] {
        let row = StOperatorRow {
            oid,
            name: name.into(),
            left_type: operand,
            right_type: operand,
            result_type: TYPE_BOOL_OID,
            proc_oid,
        };
        committed.insert_raw(ST_OPERATOR_ID, row.into())?;
        pin(committed, ObjectAddress::new(ObjectClass::Operator.class_id(), oid, SubId::ZERO))?;
    }

    for (oid, name, input) in [
        (OPCLASS_INT4_OPS_OID, "int4_ops", TYPE_INT4_OID),
        (OPCLASS_TEXT_OPS_OID, "text_ops", TYPE_TEXT_OID),
    ] {
        let row = StOpclassRow {
            oid,
            name: name.into(),
            namespace: NAMESPACE_SYSTEM_OID,
            am_oid: BTREE_AM_OID,
            input_type: input,
            key_type: Oid::ZERO,
        };
        committed.insert_raw(ST_OPCLASS_ID, row.into())?;
        pin(
            committed,
            ObjectAddress::new(ObjectClass::OperatorClass.class_id(), oid, SubId::ZERO),
        )?;
    }

    // User objects allocate above the reserved range.
    committed.set_oid_floor(FIRST_NORMAL_OID);

    log::trace!("DATABASE BOOTSTRAPPING: done");
    Ok(())
}
