//! Minimal single-relation expression evaluation.
//!
//! The index build pipeline needs to compute expression-column values and
//! test predicates against heap rows. Only the built-in comparison
//! operators and functions are evaluable; anything else reports
//! `CannotEvaluate` rather than guessing.

use super::tree::{BoolOp, Expr};
use crate::db::catalog::heap::get_attribute_row;
use crate::db::catalog::system_tables::{
    StOperatorRow, StProcRow, ST_OPERATOR_ID, ST_PROC_ID, OPERATOR_INT4_EQ_OID, OPERATOR_INT4_GT_OID,
    OPERATOR_INT4_LT_OID, OPERATOR_TEXT_EQ_OID, PROC_INT4_EQ_OID, PROC_INT4_GT_OID, PROC_INT4_LT_OID,
    PROC_TEXT_EQ_OID, TYPE_BOOL_OID,
};
use crate::db::datastore::mut_tx::{attr_index, find_by_col_eq, MutTx};
use crate::db::datastore::value::{Row, Value};
use crate::db::datastore::Result;
use crate::error::{CatalogError, ExprError};
use relcat_primitives::Oid;

fn compare(op_oid: Oid, left: Value, right: Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let verdict = match op_oid {
        OPERATOR_INT4_EQ_OID | OPERATOR_TEXT_EQ_OID => left == right,
        OPERATOR_INT4_LT_OID => left < right,
        OPERATOR_INT4_GT_OID => left > right,
        _ => return Err(ExprError::CannotEvaluate("non-built-in operator").into()),
    };
    Ok(Value::Bool(verdict))
}

fn proc_to_operator(func_oid: Oid) -> Option<Oid> {
    Some(match func_oid {
        PROC_INT4_EQ_OID => OPERATOR_INT4_EQ_OID,
        PROC_INT4_LT_OID => OPERATOR_INT4_LT_OID,
        PROC_INT4_GT_OID => OPERATOR_INT4_GT_OID,
        PROC_TEXT_EQ_OID => OPERATOR_TEXT_EQ_OID,
        _ => return None,
    })
}

/// Evaluate `expr` against one row of `rel_oid`.
pub fn eval_expr(tx: &MutTx, rel_oid: Oid, row: &Row, expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Const { value, .. } => Ok(value.clone()),
        Expr::Var {
            varattno,
            varlevelsup: 0,
            ..
        } if !varattno.is_whole() => Ok(row.field(attr_index(*varattno)).map_err(CatalogError::from)?.clone()),
        Expr::Var { .. } => Err(ExprError::CannotEvaluate("unresolvable variable").into()),
        Expr::Op { op_oid, args } if args.len() == 2 => {
            let left = eval_expr(tx, rel_oid, row, &args[0])?;
            let right = eval_expr(tx, rel_oid, row, &args[1])?;
            compare(*op_oid, left, right)
        }
        Expr::Func { func_oid, args } if args.len() == 2 => {
            let Some(op_oid) = proc_to_operator(*func_oid) else {
                return Err(ExprError::CannotEvaluate("non-built-in function").into());
            };
            let left = eval_expr(tx, rel_oid, row, &args[0])?;
            let right = eval_expr(tx, rel_oid, row, &args[1])?;
            compare(op_oid, left, right)
        }
        Expr::Bool { op, args } => {
            let mut saw_null = false;
            match op {
                BoolOp::And => {
                    for arg in args {
                        match eval_expr(tx, rel_oid, row, arg)? {
                            Value::Bool(false) => return Ok(Value::Bool(false)),
                            Value::Bool(true) => {}
                            _ => saw_null = true,
                        }
                    }
                    Ok(if saw_null { Value::Null } else { Value::Bool(true) })
                }
                BoolOp::Or => {
                    for arg in args {
                        match eval_expr(tx, rel_oid, row, arg)? {
                            Value::Bool(true) => return Ok(Value::Bool(true)),
                            Value::Bool(false) => {}
                            _ => saw_null = true,
                        }
                    }
                    Ok(if saw_null { Value::Null } else { Value::Bool(false) })
                }
                BoolOp::Not => match eval_expr(tx, rel_oid, row, &args[0])? {
                    Value::Bool(b) => Ok(Value::Bool(!b)),
                    _ => Ok(Value::Null),
                },
            }
        }
        _ => Err(ExprError::CannotEvaluate("unsupported node").into()),
    }
}

/// Evaluate an explicit-AND predicate list: the row qualifies only if every
/// clause comes out true (null disqualifies).
pub fn eval_predicate(tx: &MutTx, rel_oid: Oid, row: &Row, predicate: &[Expr]) -> Result<bool> {
    for clause in predicate {
        match eval_expr(tx, rel_oid, row, clause)? {
            Value::Bool(true) => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

/// The result type of an expression evaluated against `rel_oid`, looked up
/// through the catalogs.
pub fn result_type(tx: &MutTx, rel_oid: Oid, expr: &Expr) -> Result<Oid> {
    match expr {
        Expr::Const { type_oid, .. } => Ok(*type_oid),
        Expr::Var { varattno, .. } => {
            if varattno.is_whole() {
                return Err(ExprError::CannotEvaluate("whole-row variable has no scalar type").into());
            }
            match get_attribute_row(tx, rel_oid, *varattno)? {
                Some(attr) => Ok(attr.type_oid),
                None => Err(ExprError::InvalidVarAttNo {
                    relation: rel_oid,
                    attno: *varattno,
                }
                .into()),
            }
        }
        Expr::Op { op_oid, .. } => {
            let row_ref = find_by_col_eq(tx, ST_OPERATOR_ID, 0, Value::from(*op_oid))?.ok_or(
                CatalogError::UndefinedObject {
                    kind: "operator",
                    name: op_oid.to_string(),
                },
            )?;
            Ok(StOperatorRow::try_from(row_ref)?.result_type)
        }
        Expr::Func { func_oid, .. } | Expr::Aggregate { agg_oid: func_oid, .. } => {
            let row_ref = find_by_col_eq(tx, ST_PROC_ID, 0, Value::from(*func_oid))?.ok_or(
                CatalogError::UndefinedObject {
                    kind: "function",
                    name: func_oid.to_string(),
                },
            )?;
            Ok(StProcRow::try_from(row_ref)?.ret_type)
        }
        Expr::NullIf { args, .. } => result_type(tx, rel_oid, &args[0]),
        Expr::Distinct { .. } | Expr::ScalarArrayOp { .. } | Expr::Bool { .. } | Expr::SubLink { .. } => {
            Ok(TYPE_BOOL_OID)
        }
        Expr::SubPlan { .. } => Err(ExprError::UnsupportedConstruct("already-planned subplan").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::heap::heap_create;
    use crate::db::catalog::system_tables::{RelKind, NAMESPACE_PUBLIC_OID, TYPE_INT4_OID, TYPE_TEXT_OID};
    use crate::db::datastore::Datastore;
    use crate::error::ResultTest;
    use crate::row;

    fn setup() -> ResultTest<(Datastore, Oid)> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = heap_create(
            &mut tx,
            "points",
            NAMESPACE_PUBLIC_OID,
            RelKind::Relation,
            &[("x", TYPE_INT4_OID), ("label", TYPE_TEXT_OID)],
        )?;
        tx.commit();
        Ok((datastore, rel_oid))
    }

    #[test]
    fn comparisons_and_vars() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let row = row![7i64, "seven"];
        let gt = Expr::op(
            crate::db::catalog::system_tables::OPERATOR_INT4_GT_OID,
            vec![Expr::var(1, 1), Expr::const_int4(5)],
        );
        assert_eq!(eval_expr(&tx, rel_oid, &row, &gt)?, Value::Bool(true));
        assert!(eval_predicate(&tx, rel_oid, &row, &[gt.clone()])?);

        let other = row![3i64, "three"];
        assert!(!eval_predicate(&tx, rel_oid, &other, &[gt])?);
        Ok(())
    }

    #[test]
    fn null_disqualifies_predicates() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let row = Row::new(vec![Value::Null, Value::String("x".into())]);
        let gt = Expr::op(
            crate::db::catalog::system_tables::OPERATOR_INT4_GT_OID,
            vec![Expr::var(1, 1), Expr::const_int4(5)],
        );
        assert_eq!(eval_expr(&tx, rel_oid, &row, &gt)?, Value::Null);
        assert!(!eval_predicate(&tx, rel_oid, &row, &[gt])?);
        Ok(())
    }

    #[test]
    fn result_types_resolve_through_catalogs() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        assert_eq!(result_type(&tx, rel_oid, &Expr::var(1, 1))?, TYPE_INT4_OID);
        assert_eq!(result_type(&tx, rel_oid, &Expr::var(1, 2))?, TYPE_TEXT_OID);
        let eq = Expr::op(
            crate::db::catalog::system_tables::OPERATOR_INT4_EQ_OID,
            vec![Expr::var(1, 1), Expr::const_int4(5)],
        );
        assert_eq!(result_type(&tx, rel_oid, &eq)?, TYPE_BOOL_OID);
        Ok(())
    }
}
