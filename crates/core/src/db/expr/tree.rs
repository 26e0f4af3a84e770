//! Serialized expression and query trees.
//!
//! These are the pre-planner trees the catalog stores for index
//! expressions/predicates, column defaults and view rules. The node set is
//! closed; the walker matches it exhaustively.

use crate::db::datastore::value::Value;
use crate::error::ExprError;
use relcat_primitives::{Oid, SubId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal of a given type.
    Const { type_oid: Oid, value: Value },
    /// A variable reference, resolved through the range-table stack:
    /// `varlevelsup` query levels out, entry `varno` (1-based), column
    /// `varattno` (0 addresses the whole row).
    Var {
        varno: u32,
        varattno: SubId,
        varlevelsup: u32,
    },
    /// Function call.
    Func { func_oid: Oid, args: Vec<Expr> },
    /// Operator invocation.
    Op { op_oid: Oid, args: Vec<Expr> },
    /// `IS DISTINCT FROM`, carried by an equality operator.
    Distinct { op_oid: Oid, args: Vec<Expr> },
    /// `NULLIF`, carried by an equality operator.
    NullIf { op_oid: Oid, args: Vec<Expr> },
    /// `scalar op ANY/ALL (array)`.
    ScalarArrayOp {
        op_oid: Oid,
        use_or: bool,
        args: Vec<Expr>,
    },
    /// Aggregate invocation; the aggregate is a function-class object.
    Aggregate { agg_oid: Oid, args: Vec<Expr> },
    /// AND/OR/NOT.
    Bool { op: BoolOp, args: Vec<Expr> },
    /// A sublink carrying the row-comparison operators and the subquery.
    SubLink {
        op_oids: Vec<Oid>,
        subselect: Box<Query>,
    },
    /// An already-planned subplan. Never valid in catalog-stored trees.
    SubPlan { plan_id: u32 },
}

impl Expr {
    pub fn var(varno: u32, varattno: u32) -> Expr {
        Expr::Var {
            varno,
            varattno: SubId(varattno),
            varlevelsup: 0,
        }
    }

    pub fn const_int4(value: i64) -> Expr {
        Expr::Const {
            type_oid: crate::db::catalog::system_tables::TYPE_INT4_OID,
            value: Value::I64(value),
        }
    }

    pub fn op(op_oid: Oid, args: Vec<Expr>) -> Expr {
        Expr::Op { op_oid, args }
    }

    pub fn func(func_oid: Oid, args: Vec<Expr>) -> Expr {
        Expr::Func { func_oid, args }
    }
}

/// One entry of a query's range table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RangeTableEntry {
    /// A plain relation.
    Relation { oid: Oid },
    /// A join; variables pointing at it resolve through the alias list.
    Join { alias_vars: Vec<Expr> },
    /// A subquery in the range table.
    Subquery { query: Box<Query> },
    /// A function in the range table.
    Function { expr: Box<Expr> },
}

/// A (simplified) query tree: a range table and the expressions hung off it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub range_table: Vec<RangeTableEntry>,
    pub target_list: Vec<Expr>,
    pub quals: Option<Expr>,
}

impl Query {
    pub fn selecting(range_table: Vec<RangeTableEntry>, target_list: Vec<Expr>) -> Self {
        Self {
            range_table,
            target_list,
            quals: None,
        }
    }
}

/// Serialize a stored tree (expression list, predicate, query) for a catalog
/// bytes column.
pub fn to_bytes<T: Serialize>(node: &T) -> Result<Vec<u8>, ExprError> {
    Ok(serde_json::to_vec(node)?)
}

pub fn from_bytes<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, ExprError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Flatten an expression into explicit-AND form: a top-level AND is split
/// into its operands, anything else is a single-element list. Predicates are
/// stored this way.
pub fn make_and_list(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Bool {
            op: BoolOp::And,
            args,
        } => args.into_iter().flat_map(make_and_list).collect(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::system_tables::OPERATOR_INT4_GT_OID;

    #[test]
    fn trees_round_trip_through_bytes() {
        let expr = Expr::op(
            OPERATOR_INT4_GT_OID,
            vec![Expr::var(1, 2), Expr::const_int4(10)],
        );
        let bytes = to_bytes(&expr).unwrap();
        let back: Expr = from_bytes(&bytes).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn and_lists_flatten_nested_ands() {
        let a = Expr::var(1, 1);
        let b = Expr::var(1, 2);
        let c = Expr::var(1, 3);
        let expr = Expr::Bool {
            op: BoolOp::And,
            args: vec![
                a.clone(),
                Expr::Bool {
                    op: BoolOp::And,
                    args: vec![b.clone(), c.clone()],
                },
            ],
        };
        assert_eq!(make_and_list(expr), vec![a, b, c]);
        let single = Expr::var(1, 1);
        assert_eq!(make_and_list(single.clone()), vec![single]);
    }
}
