//! Creators for the scalar object classes.
//!
//! Every creating command follows the same contract: the catalog row and all
//! of its dependency edges appear together, in one transaction, and the
//! command counter is bumped at the end so the new object is visible to
//! whatever runs next.

use super::heap::heap_create;
use super::system_tables::{
    ConstraintKind, RelKind, StCastRow, StConstraintRow, StConversionRow, StLanguageRow, StNamespaceFields,
    StNamespaceRow, StOperatorRow, StOpclassRow, StProcRow, StRewriteRow, StTriggerRow, StTypeRow, StAttrdefRow,
    ST_ATTRDEF_ID, ST_CAST_ID, ST_CONSTRAINT_ID, ST_CONVERSION_ID, ST_LANGUAGE_ID, ST_NAMESPACE_ID, ST_OPCLASS_ID,
    ST_OPERATOR_ID, ST_PROC_ID, ST_REWRITE_ID, ST_TRIGGER_ID, ST_TYPE_ID,
};
use crate::db::datastore::mut_tx::MutTx;
use crate::db::datastore::value::Value;
use crate::db::datastore::Result;
use crate::db::depend::{record_dependency, DepType, ObjectAddress, ObjectClass};
use crate::db::expr::{
    record_dependency_on_query, record_dependency_on_single_rel_expr, tree, Expr, Query,
};
use crate::db::index::am;
use crate::error::CatalogError;
use relcat_primitives::{Oid, SubId};

fn class_addr(class: ObjectClass, oid: Oid) -> ObjectAddress {
    ObjectAddress::new(class.class_id(), oid, SubId::ZERO)
}

fn namespace_addr(namespace: Oid) -> ObjectAddress {
    class_addr(ObjectClass::Schema, namespace)
}

fn type_addr(type_oid: Oid) -> ObjectAddress {
    class_addr(ObjectClass::Type, type_oid)
}

pub fn create_namespace(tx: &mut MutTx, name: &str) -> Result<Oid> {
    log::trace!("NAMESPACE CREATING: {name}");
    let taken = tx
        .iter_by_col_eq(ST_NAMESPACE_ID, StNamespaceFields::Name.col_idx(), Value::from(name))?
        .next()
        .is_some();
    if taken {
        return Err(CatalogError::DuplicateObject {
            kind: "schema",
            name: name.into(),
        });
    }
    let oid = tx.allocate_oid();
    tx.insert(ST_NAMESPACE_ID, StNamespaceRow { oid, name: name.into() }.into())?;
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_type(tx: &mut MutTx, name: &str, namespace: Oid) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StTypeRow {
        oid,
        name: name.into(),
        namespace,
    };
    tx.insert(ST_TYPE_ID, row.into())?;
    record_dependency(tx, &type_addr(oid), &namespace_addr(namespace), DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_language(tx: &mut MutTx, name: &str) -> Result<Oid> {
    let oid = tx.allocate_oid();
    tx.insert(ST_LANGUAGE_ID, StLanguageRow { oid, name: name.into() }.into())?;
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_function(
    tx: &mut MutTx,
    name: &str,
    namespace: Oid,
    arg_types: &[Oid],
    ret_type: Oid,
    language: Oid,
) -> Result<Oid> {
    log::trace!("FUNCTION CREATING: {name}");
    let language_exists = tx
        .iter_by_col_eq(ST_LANGUAGE_ID, 0, Value::from(language))?
        .next()
        .is_some();
    if !language_exists {
        return Err(CatalogError::UndefinedObject {
            kind: "language",
            name: language.to_string(),
        });
    }
    let oid = tx.allocate_oid();
    let row = StProcRow {
        oid,
        name: name.into(),
        namespace,
        arg_types: arg_types.to_vec(),
        ret_type,
    };
    tx.insert(ST_PROC_ID, row.into())?;
    let func = class_addr(ObjectClass::Function, oid);
    record_dependency(tx, &func, &namespace_addr(namespace), DepType::Normal)?;
    record_dependency(tx, &func, &class_addr(ObjectClass::Language, language), DepType::Normal)?;
    record_dependency(tx, &func, &type_addr(ret_type), DepType::Normal)?;
    for arg in arg_types {
        record_dependency(tx, &func, &type_addr(*arg), DepType::Normal)?;
    }
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_operator(
    tx: &mut MutTx,
    name: &str,
    left_type: Oid,
    right_type: Oid,
    result_type: Oid,
    proc_oid: Oid,
) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StOperatorRow {
        oid,
        name: name.into(),
        left_type,
        right_type,
        result_type,
        proc_oid,
    };
    tx.insert(ST_OPERATOR_ID, row.into())?;
    let operator = class_addr(ObjectClass::Operator, oid);
    for operand in [left_type, right_type] {
        if operand.is_valid() {
            record_dependency(tx, &operator, &type_addr(operand), DepType::Normal)?;
        }
    }
    record_dependency(tx, &operator, &type_addr(result_type), DepType::Normal)?;
    record_dependency(tx, &operator, &class_addr(ObjectClass::Function, proc_oid), DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_opclass(
    tx: &mut MutTx,
    name: &str,
    namespace: Oid,
    am_oid: Oid,
    input_type: Oid,
    key_type: Oid,
) -> Result<Oid> {
    am::am_by_oid_required(am_oid)?;
    let oid = tx.allocate_oid();
    let row = StOpclassRow {
        oid,
        name: name.into(),
        namespace,
        am_oid,
        input_type,
        key_type,
    };
    tx.insert(ST_OPCLASS_ID, row.into())?;
    let opclass = class_addr(ObjectClass::OperatorClass, oid);
    record_dependency(tx, &opclass, &namespace_addr(namespace), DepType::Normal)?;
    record_dependency(tx, &opclass, &type_addr(input_type), DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_cast(tx: &mut MutTx, source_type: Oid, target_type: Oid, func_oid: Oid) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StCastRow {
        oid,
        source_type,
        target_type,
        func_oid,
    };
    tx.insert(ST_CAST_ID, row.into())?;
    let cast = class_addr(ObjectClass::Cast, oid);
    record_dependency(tx, &cast, &type_addr(source_type), DepType::Normal)?;
    record_dependency(tx, &cast, &type_addr(target_type), DepType::Normal)?;
    record_dependency(tx, &cast, &class_addr(ObjectClass::Function, func_oid), DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}

pub fn create_conversion(tx: &mut MutTx, name: &str, namespace: Oid) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StConversionRow {
        oid,
        name: name.into(),
        namespace,
    };
    tx.insert(ST_CONVERSION_ID, row.into())?;
    record_dependency(
        tx,
        &class_addr(ObjectClass::Conversion, oid),
        &namespace_addr(namespace),
        DepType::Normal,
    )?;
    tx.bump_command_counter();
    Ok(oid)
}

/// A standalone CHECK constraint. The expression contributes its referenced
/// objects as edges of the constraint.
pub fn create_check_constraint(tx: &mut MutTx, name: &str, rel_oid: Oid, expr: &Expr) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StConstraintRow {
        oid,
        name: name.into(),
        rel_oid,
        kind: ConstraintKind::Check,
        key_cols: Vec::new(),
    };
    tx.insert(ST_CONSTRAINT_ID, row.into())?;
    let constraint = class_addr(ObjectClass::Constraint, oid);
    record_dependency(tx, &constraint, &ObjectAddress::relation(rel_oid), DepType::Normal)?;
    record_dependency_on_single_rel_expr(tx, &constraint, expr, rel_oid, DepType::Normal, DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}

/// A column default. The default is an automatic side-object of its column;
/// whatever else the expression mentions it uses normally.
pub fn create_column_default(tx: &mut MutTx, rel_oid: Oid, col: SubId, expr: &Expr) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StAttrdefRow {
        oid,
        rel_oid,
        col_pos: col,
        expr: tree::to_bytes(expr).map_err(CatalogError::from)?,
    };
    tx.insert(ST_ATTRDEF_ID, row.into())?;
    let default = class_addr(ObjectClass::ColumnDefault, oid);
    record_dependency(tx, &default, &ObjectAddress::column(rel_oid, col), DepType::Auto)?;
    record_dependency_on_single_rel_expr(tx, &default, expr, rel_oid, DepType::Normal, DepType::Auto)?;
    tx.bump_command_counter();
    Ok(oid)
}

/// A rewrite rule. The rule is part of its relation's implementation; the
/// objects its query references are what the relation's behavior depends
/// on.
pub fn create_rewrite_rule(tx: &mut MutTx, name: &str, rel_oid: Oid, query: &Query) -> Result<Oid> {
    log::trace!("RULE CREATING: {name} on {rel_oid}");
    let oid = tx.allocate_oid();
    let row = StRewriteRow {
        oid,
        name: name.into(),
        rel_oid,
        query: tree::to_bytes(query).map_err(CatalogError::from)?,
    };
    tx.insert(ST_REWRITE_ID, row.into())?;
    let rule = class_addr(ObjectClass::RewriteRule, oid);
    record_dependency(tx, &rule, &ObjectAddress::relation(rel_oid), DepType::Internal)?;
    record_dependency_on_query(tx, &rule, query, DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}

/// A view: a storage-less relation plus its defining rule.
pub fn create_view(
    tx: &mut MutTx,
    name: &str,
    namespace: Oid,
    columns: &[(&str, Oid)],
    query: &Query,
) -> Result<Oid> {
    let view_oid = heap_create(tx, name, namespace, RelKind::View, columns)?;
    create_rewrite_rule(tx, "_RETURN", view_oid, query)?;
    Ok(view_oid)
}

/// A trigger: an automatic side-object of its relation that uses its
/// function.
pub fn create_trigger(tx: &mut MutTx, name: &str, rel_oid: Oid, func_oid: Oid) -> Result<Oid> {
    let oid = tx.allocate_oid();
    let row = StTriggerRow {
        oid,
        name: name.into(),
        rel_oid,
        func_oid,
    };
    tx.insert(ST_TRIGGER_ID, row.into())?;
    let trigger = class_addr(ObjectClass::Trigger, oid);
    record_dependency(tx, &trigger, &ObjectAddress::relation(rel_oid), DepType::Auto)?;
    record_dependency(tx, &trigger, &class_addr(ObjectClass::Function, func_oid), DepType::Normal)?;
    tx.bump_command_counter();
    Ok(oid)
}
