//! Human-readable object descriptions for cascade notices and errors:
//! `table public.foo`, `index foo_pkey`, `function foo(int4)`,
//! `constraint my_ck on public.foo`, `default for table foo column bar`, …
//!
//! Names are schema-qualified only when the namespace is not on the
//! transaction's search path.

use super::heap::{attribute_rows, get_class_row};
use super::system_tables::{
    StAttrdefRow, StCastRow, StConstraintRow, StConversionRow, StLanguageRow, StNamespaceRow, StOpclassRow,
    StOperatorRow, StProcRow, StRewriteRow, StTriggerRow, StTypeRow, ST_ATTRDEF_ID, ST_CAST_ID, ST_CONSTRAINT_ID,
    ST_CONVERSION_ID, ST_LANGUAGE_ID, ST_NAMESPACE_ID, ST_OPCLASS_ID, ST_OPERATOR_ID, ST_PROC_ID, ST_REWRITE_ID,
    ST_TRIGGER_ID, ST_TYPE_ID,
};
use crate::db::datastore::mut_tx::{find_by_col_eq, MutTx};
use crate::db::datastore::value::{RowRef, Value};
use crate::db::datastore::Result;
use crate::db::depend::{ObjectAddress, ObjectClass};
use crate::db::index::am;
use crate::error::CatalogError;
use relcat_primitives::{Oid, SubId};

fn catalog_row<T>(tx: &MutTx, class_id: Oid, oid: Oid, kind: &'static str) -> Result<T>
where
    T: for<'a> TryFrom<RowRef<'a>, Error = CatalogError>,
{
    match find_by_col_eq(tx, class_id, 0, Value::from(oid))? {
        Some(row_ref) => T::try_from(row_ref),
        None => Err(CatalogError::UndefinedObject {
            kind,
            name: oid.to_string(),
        }),
    }
}

fn namespace_name(tx: &MutTx, oid: Oid) -> Result<String> {
    let row: StNamespaceRow = catalog_row(tx, ST_NAMESPACE_ID, oid, "schema")?;
    Ok(row.name.into())
}

pub fn type_name(tx: &MutTx, oid: Oid) -> Result<String> {
    let row: StTypeRow = catalog_row(tx, ST_TYPE_ID, oid, "type")?;
    Ok(row.name.into())
}

/// `name` qualified with its namespace unless that namespace is on the
/// search path.
fn qualified_name(tx: &MutTx, namespace: Oid, name: &str) -> Result<String> {
    if tx.search_path.contains(&namespace) {
        Ok(name.to_owned())
    } else {
        Ok(format!("{}.{}", namespace_name(tx, namespace)?, name))
    }
}

fn relation_name(tx: &MutTx, rel_oid: Oid) -> Result<String> {
    let class_row = get_class_row(tx, rel_oid)?;
    qualified_name(tx, class_row.rel_namespace, &class_row.rel_name)
}

fn relation_description(tx: &MutTx, rel_oid: Oid, sub_id: SubId) -> Result<String> {
    let class_row = get_class_row(tx, rel_oid)?;
    let name = qualified_name(tx, class_row.rel_namespace, &class_row.rel_name)?;
    let whole = format!("{} {}", class_row.rel_kind.describe_word(), name);
    if sub_id.is_whole() {
        return Ok(whole);
    }
    let col_name = attribute_rows(tx, rel_oid)?
        .into_iter()
        .find(|a| a.col_pos == sub_id)
        .map(|a| a.col_name.into())
        .unwrap_or_else(|| sub_id.to_string());
    Ok(format!("column {col_name} of {whole}"))
}

fn arg_type_list(tx: &MutTx, arg_types: &[Oid]) -> Result<String> {
    let names: Vec<String> = arg_types
        .iter()
        .map(|t| type_name(tx, *t))
        .collect::<Result<_>>()?;
    Ok(names.join(", "))
}

fn operand_name(tx: &MutTx, type_oid: Oid) -> Result<String> {
    if type_oid.is_valid() {
        type_name(tx, type_oid)
    } else {
        Ok("none".to_owned())
    }
}

/// The description of any droppable object, dispatched on its class tag.
pub fn object_description(tx: &MutTx, addr: &ObjectAddress) -> Result<String> {
    let class = ObjectClass::of(addr.class_id)
        .ok_or(crate::error::DependError::UnknownClass(addr.class_id))?;
    match class {
        ObjectClass::Relation => relation_description(tx, addr.object_id, addr.sub_id),
        ObjectClass::Function => {
            let row: StProcRow = catalog_row(tx, ST_PROC_ID, addr.object_id, "function")?;
            Ok(format!("function {}({})", row.name, arg_type_list(tx, &row.arg_types)?))
        }
        ObjectClass::Type => {
            let row: StTypeRow = catalog_row(tx, ST_TYPE_ID, addr.object_id, "type")?;
            Ok(format!("type {}", row.name))
        }
        ObjectClass::Cast => {
            let row: StCastRow = catalog_row(tx, ST_CAST_ID, addr.object_id, "cast")?;
            Ok(format!(
                "cast from {} to {}",
                type_name(tx, row.source_type)?,
                type_name(tx, row.target_type)?
            ))
        }
        ObjectClass::Constraint => {
            let row: StConstraintRow = catalog_row(tx, ST_CONSTRAINT_ID, addr.object_id, "constraint")?;
            Ok(format!(
                "constraint {} on {}",
                row.name,
                relation_name(tx, row.rel_oid)?
            ))
        }
        ObjectClass::Conversion => {
            let row: StConversionRow = catalog_row(tx, ST_CONVERSION_ID, addr.object_id, "conversion")?;
            Ok(format!("conversion {}", row.name))
        }
        ObjectClass::ColumnDefault => {
            let row: StAttrdefRow = catalog_row(tx, ST_ATTRDEF_ID, addr.object_id, "default value")?;
            let col_name = attribute_rows(tx, row.rel_oid)?
                .into_iter()
                .find(|a| a.col_pos == row.col_pos)
                .map(|a| a.col_name.into())
                .unwrap_or_else(|| row.col_pos.to_string());
            Ok(format!(
                "default for table {} column {}",
                relation_name(tx, row.rel_oid)?,
                col_name
            ))
        }
        ObjectClass::Language => {
            let row: StLanguageRow = catalog_row(tx, ST_LANGUAGE_ID, addr.object_id, "language")?;
            Ok(format!("language {}", row.name))
        }
        ObjectClass::Operator => {
            let row: StOperatorRow = catalog_row(tx, ST_OPERATOR_ID, addr.object_id, "operator")?;
            Ok(format!(
                "operator {}({}, {})",
                row.name,
                operand_name(tx, row.left_type)?,
                operand_name(tx, row.right_type)?
            ))
        }
        ObjectClass::OperatorClass => {
            let row: StOpclassRow = catalog_row(tx, ST_OPCLASS_ID, addr.object_id, "operator class")?;
            let am_name = am::am_by_oid(row.am_oid).map(|am| am.name()).unwrap_or("?");
            Ok(format!("operator class {} for {}", row.name, am_name))
        }
        ObjectClass::RewriteRule => {
            let row: StRewriteRow = catalog_row(tx, ST_REWRITE_ID, addr.object_id, "rule")?;
            Ok(format!(
                "rule {} on {}",
                row.name,
                relation_description(tx, row.rel_oid, SubId::ZERO)?
            ))
        }
        ObjectClass::Trigger => {
            let row: StTriggerRow = catalog_row(tx, ST_TRIGGER_ID, addr.object_id, "trigger")?;
            Ok(format!(
                "trigger {} on {}",
                row.name,
                relation_description(tx, row.rel_oid, SubId::ZERO)?
            ))
        }
        ObjectClass::Schema => {
            let row: StNamespaceRow = catalog_row(tx, ST_NAMESPACE_ID, addr.object_id, "schema")?;
            Ok(format!("schema {}", row.name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::heap::heap_create;
    use crate::db::catalog::system_tables::{
        RelKind, NAMESPACE_PUBLIC_OID, NAMESPACE_SYSTEM_OID, TYPE_INT4_OID,
    };
    use crate::db::datastore::Datastore;
    use crate::error::ResultTest;

    #[test]
    fn relations_qualify_only_off_search_path() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let public_rel = heap_create(
            &mut tx,
            "orders",
            NAMESPACE_PUBLIC_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID)],
        )?;
        let system_rel = heap_create(
            &mut tx,
            "internal_orders",
            NAMESPACE_SYSTEM_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID)],
        )?;

        assert_eq!(
            object_description(&tx, &ObjectAddress::relation(public_rel))?,
            "table orders"
        );
        assert_eq!(
            object_description(&tx, &ObjectAddress::relation(system_rel))?,
            "table system.internal_orders"
        );
        assert_eq!(
            object_description(&tx, &ObjectAddress::column(public_rel, SubId(1)))?,
            "column id of table orders"
        );
        Ok(())
    }

    #[test]
    fn builtin_operator_description() -> ResultTest<()> {
        use crate::db::catalog::system_tables::OPERATOR_INT4_EQ_OID;
        let datastore = Datastore::bootstrap()?;
        let tx = datastore.begin_mut_tx();
        let addr = ObjectAddress::new(ObjectClass::Operator.class_id(), OPERATOR_INT4_EQ_OID, SubId::ZERO);
        assert_eq!(object_description(&tx, &addr)?, "operator =(int4, int4)");
        Ok(())
    }

    #[test]
    fn builtin_opclass_description() -> ResultTest<()> {
        use crate::db::catalog::system_tables::OPCLASS_INT4_OPS_OID;
        let datastore = Datastore::bootstrap()?;
        let tx = datastore.begin_mut_tx();
        let addr = ObjectAddress::new(
            ObjectClass::OperatorClass.class_id(),
            OPCLASS_INT4_OPS_OID,
            SubId::ZERO,
        );
        assert_eq!(object_description(&tx, &addr)?, "operator class int4_ops for btree");
        Ok(())
    }
}
