//! The expression reference walker.
//!
//! Walks a pre-planner expression or query tree and collects every catalog
//! object it references (relations, columns, functions, operators) so the
//! caller can register those as dependency edges of a new index, rule,
//! constraint or default.
//!
//! Variable references resolve through a stack of range tables, one per
//! query scope: the stack top is `varlevelsup = 0`, each level below lifts
//! one scope outward. Query nodes push their own range table around their
//! sub-walk; join variables recurse into the join's alias list at the
//! join's own level.

use super::tree::{Expr, Query, RangeTableEntry};
use crate::db::catalog::heap::get_attribute_row;
use crate::db::catalog::system_tables::ST_CLASS_ID;
use crate::db::datastore::mut_tx::MutTx;
use crate::db::datastore::Result;
use crate::db::depend::{
    record_multiple_dependencies, DepType, ObjectAddress, ObjectAddressSet, ObjectClass,
};
use crate::error::ExprError;
use relcat_primitives::{Oid, SubId};

struct ReferenceWalker<'a, 'tx> {
    tx: &'tx MutTx,
    rtables: Vec<&'a [RangeTableEntry]>,
    refs: ObjectAddressSet,
}

impl<'a, 'tx> ReferenceWalker<'a, 'tx> {
    fn new(tx: &'tx MutTx) -> Self {
        Self {
            tx,
            rtables: Vec::new(),
            refs: ObjectAddressSet::new(),
        }
    }

    fn walk_expr(&mut self, expr: &'a Expr) -> Result<()> {
        match expr {
            Expr::Const { .. } => Ok(()),
            Expr::Var {
                varno,
                varattno,
                varlevelsup,
            } => self.visit_var(*varno, *varattno, *varlevelsup),
            Expr::Func { func_oid, args } => {
                self.refs
                    .add_by_class_tag(ObjectClass::Function, *func_oid, SubId::ZERO);
                self.walk_all(args)
            }
            Expr::Op { op_oid, args }
            | Expr::Distinct { op_oid, args }
            | Expr::NullIf { op_oid, args } => {
                self.refs
                    .add_by_class_tag(ObjectClass::Operator, *op_oid, SubId::ZERO);
                self.walk_all(args)
            }
            Expr::ScalarArrayOp { op_oid, args, .. } => {
                self.refs
                    .add_by_class_tag(ObjectClass::Operator, *op_oid, SubId::ZERO);
                self.walk_all(args)
            }
            Expr::Aggregate { agg_oid, args } => {
                self.refs
                    .add_by_class_tag(ObjectClass::Function, *agg_oid, SubId::ZERO);
                self.walk_all(args)
            }
            Expr::Bool { args, .. } => self.walk_all(args),
            Expr::SubLink { op_oids, subselect } => {
                for op_oid in op_oids {
                    self.refs
                        .add_by_class_tag(ObjectClass::Operator, *op_oid, SubId::ZERO);
                }
                self.walk_query(subselect)
            }
            // This walker only consumes pre-planner trees.
            Expr::SubPlan { .. } => Err(ExprError::UnsupportedConstruct("already-planned subplan").into()),
        }
    }

    fn walk_all(&mut self, exprs: &'a [Expr]) -> Result<()> {
        exprs.iter().try_for_each(|e| self.walk_expr(e))
    }

    fn visit_var(&mut self, varno: u32, varattno: SubId, varlevelsup: u32) -> Result<()> {
        let depth = self.rtables.len();
        let Some(level_idx) = depth.checked_sub(1 + varlevelsup as usize) else {
            return Err(ExprError::InvalidVarLevelsUp {
                levels: varlevelsup,
                depth,
            }
            .into());
        };
        // Copy the slice reference out so the stack can be reshaped below.
        let rtable = self.rtables[level_idx];
        let rte = match varno.checked_sub(1).and_then(|i| rtable.get(i as usize)) {
            Some(rte) => rte,
            None => return Err(ExprError::InvalidVarNo(varno).into()),
        };
        match rte {
            RangeTableEntry::Relation { oid } => {
                if !varattno.is_whole() && get_attribute_row(self.tx, *oid, varattno)?.is_none() {
                    return Err(ExprError::InvalidVarAttNo {
                        relation: *oid,
                        attno: varattno,
                    }
                    .into());
                }
                self.refs.add(ObjectAddress::column(*oid, varattno));
                Ok(())
            }
            RangeTableEntry::Join { alias_vars } => {
                // Recurse into the alias list at the join's own level: the
                // levels above it are set aside so the join's scope becomes
                // the stack top, and restored afterwards.
                let saved = self.rtables.split_off(level_idx + 1);
                let result = if varattno.is_whole() {
                    self.walk_all(alias_vars)
                } else {
                    match alias_vars.get(varattno.idx() - 1) {
                        Some(alias) => self.walk_expr(alias),
                        None => Err(ExprError::InvalidVarAttNo {
                            relation: Oid::ZERO,
                            attno: varattno,
                        }
                        .into()),
                    }
                };
                self.rtables.extend(saved);
                result
            }
            // The walk of the owning query recurses into these for us.
            RangeTableEntry::Subquery { .. } | RangeTableEntry::Function { .. } => Ok(()),
        }
    }

    fn walk_query(&mut self, query: &'a Query) -> Result<()> {
        // Every plain relation in the range table is referenced as a whole,
        // whether or not any variable points at it.
        for rte in &query.range_table {
            if let RangeTableEntry::Relation { oid } = rte {
                self.refs.add(ObjectAddress::relation(*oid));
            }
        }
        self.rtables.push(&query.range_table);
        // Join alias lists are skipped here; they are visited through the
        // variables that reference them.
        for rte in &query.range_table {
            match rte {
                RangeTableEntry::Subquery { query } => self.walk_query(query)?,
                RangeTableEntry::Function { expr } => self.walk_expr(expr)?,
                RangeTableEntry::Relation { .. } | RangeTableEntry::Join { .. } => {}
            }
        }
        for target in &query.target_list {
            self.walk_expr(target)?;
        }
        if let Some(quals) = &query.quals {
            self.walk_expr(quals)?;
        }
        self.rtables.pop();
        Ok(())
    }
}

/// Collect the objects referenced by `expr`, resolving variables against
/// `rtable` as the outermost scope. The result is not yet deduplicated.
pub fn find_expr_references(tx: &MutTx, expr: &Expr, rtable: &[RangeTableEntry]) -> Result<ObjectAddressSet> {
    let mut walker = ReferenceWalker::new(tx);
    walker.rtables.push(rtable);
    walker.walk_expr(expr)?;
    Ok(walker.refs)
}

/// Collect the objects referenced by a whole query tree.
pub fn find_query_references(tx: &MutTx, query: &Query) -> Result<ObjectAddressSet> {
    let mut walker = ReferenceWalker::new(tx);
    walker.walk_query(query)?;
    Ok(walker.refs)
}

/// Register one edge from `depender` to every object `expr` references.
pub fn record_dependency_on_expr(
    tx: &mut MutTx,
    depender: &ObjectAddress,
    expr: &Expr,
    rtable: &[RangeTableEntry],
    behavior: DepType,
) -> Result<()> {
    let mut refs = find_expr_references(tx, expr, rtable)?;
    refs.dedupe();
    record_multiple_dependencies(tx, depender, &refs, behavior)
}

/// Like [`record_dependency_on_expr`] for a full query tree (view rules).
pub fn record_dependency_on_query(
    tx: &mut MutTx,
    depender: &ObjectAddress,
    query: &Query,
    behavior: DepType,
) -> Result<()> {
    let mut refs = find_query_references(tx, query)?;
    refs.dedupe();
    record_multiple_dependencies(tx, depender, &refs, behavior)
}

/// The single-relation entry point: variables resolve against a synthesized
/// one-entry range table for `rel_oid`. After deduplication the collected
/// references are split: those on `rel_oid` itself are recorded with
/// `self_behavior`, everything else with `behavior`.
pub fn record_dependency_on_single_rel_expr(
    tx: &mut MutTx,
    depender: &ObjectAddress,
    expr: &Expr,
    rel_oid: Oid,
    behavior: DepType,
    self_behavior: DepType,
) -> Result<()> {
    let rtable = [RangeTableEntry::Relation { oid: rel_oid }];
    let mut refs = find_expr_references(tx, expr, &rtable)?;
    refs.dedupe();

    let mut self_refs = ObjectAddressSet::new();
    let mut other_refs = ObjectAddressSet::new();
    for addr in &refs {
        if addr.class_id == ST_CLASS_ID && addr.object_id == rel_oid {
            self_refs.add(*addr);
        } else {
            other_refs.add(*addr);
        }
    }
    record_multiple_dependencies(tx, depender, &self_refs, self_behavior)?;
    record_multiple_dependencies(tx, depender, &other_refs, behavior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog::heap::heap_create;
    use crate::db::catalog::system_tables::{
        RelKind, NAMESPACE_PUBLIC_OID, OPERATOR_INT4_EQ_OID, OPERATOR_INT4_GT_OID, PROC_INT4_EQ_OID, ST_OPERATOR_ID,
        ST_PROC_ID, TYPE_INT4_OID, TYPE_TEXT_OID,
    };
    use crate::db::datastore::Datastore;
    use crate::error::{CatalogError, ExprError, ResultTest};

    fn setup() -> ResultTest<(Datastore, Oid)> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let rel_oid = heap_create(
            &mut tx,
            "events",
            NAMESPACE_PUBLIC_OID,
            RelKind::Relation,
            &[("id", TYPE_INT4_OID), ("payload", TYPE_TEXT_OID)],
        )?;
        tx.commit();
        Ok((datastore, rel_oid))
    }

    #[test]
    fn vars_operators_functions_are_collected() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let rtable = [RangeTableEntry::Relation { oid: rel_oid }];
        let expr = Expr::op(
            OPERATOR_INT4_GT_OID,
            vec![
                Expr::func(PROC_INT4_EQ_OID, vec![Expr::var(1, 1), Expr::var(1, 1)]),
                Expr::const_int4(0),
            ],
        );
        let mut refs = find_expr_references(&tx, &expr, &rtable)?;
        refs.dedupe();
        let entries: Vec<_> = refs.iter().copied().collect();
        assert!(entries.contains(&ObjectAddress::column(rel_oid, SubId(1))));
        assert!(entries.contains(&ObjectAddress::new(ST_OPERATOR_ID, OPERATOR_INT4_GT_OID, SubId::ZERO)));
        assert!(entries.contains(&ObjectAddress::new(ST_PROC_ID, PROC_INT4_EQ_OID, SubId::ZERO)));
        // The duplicated column reference appears exactly once.
        assert_eq!(entries.len(), 3);
        Ok(())
    }

    #[test]
    fn query_emits_whole_relation_references() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        // No variable references the relation; the whole-relation edge is
        // still emitted.
        let query = Query::selecting(
            vec![RangeTableEntry::Relation { oid: rel_oid }],
            vec![Expr::const_int4(1)],
        );
        let refs = find_query_references(&tx, &query)?;
        assert!(refs.contains_or_parent(&ObjectAddress::relation(rel_oid)));
        Ok(())
    }

    #[test]
    fn join_vars_resolve_through_alias_list() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let query = Query::selecting(
            vec![
                RangeTableEntry::Relation { oid: rel_oid },
                RangeTableEntry::Join {
                    alias_vars: vec![Expr::var(1, 2)],
                },
            ],
            // Variable over the join's first alias column.
            vec![Expr::var(2, 1)],
        );
        let mut refs = find_query_references(&tx, &query)?;
        refs.dedupe();
        assert!(refs.contains_or_parent(&ObjectAddress::column(rel_oid, SubId(2))));
        Ok(())
    }

    #[test]
    fn outer_vars_lift_through_subquery_levels() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let inner = Query {
            range_table: vec![],
            target_list: vec![Expr::Var {
                varno: 1,
                varattno: SubId(1),
                varlevelsup: 1,
            }],
            quals: None,
        };
        let outer = Query::selecting(
            vec![RangeTableEntry::Relation { oid: rel_oid }],
            vec![Expr::SubLink {
                op_oids: vec![OPERATOR_INT4_EQ_OID],
                subselect: Box::new(inner),
            }],
        );
        let refs = find_query_references(&tx, &outer)?;
        assert!(refs.contains_or_parent(&ObjectAddress::column(rel_oid, SubId(1))));
        assert!(refs.contains_or_parent(&ObjectAddress::new(
            ST_OPERATOR_ID,
            OPERATOR_INT4_EQ_OID,
            SubId::ZERO
        )));
        Ok(())
    }

    #[test]
    fn stack_underrun_and_bad_positions_fail() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let rtable = [RangeTableEntry::Relation { oid: rel_oid }];

        let too_far_out = Expr::Var {
            varno: 1,
            varattno: SubId(1),
            varlevelsup: 3,
        };
        let err = find_expr_references(&tx, &too_far_out, &rtable).unwrap_err();
        assert!(matches!(err, CatalogError::Expr(ExprError::InvalidVarLevelsUp { .. })));

        let bad_varno = Expr::var(9, 1);
        let err = find_expr_references(&tx, &bad_varno, &rtable).unwrap_err();
        assert!(matches!(err, CatalogError::Expr(ExprError::InvalidVarNo(9))));

        let bad_attno = Expr::var(1, 42);
        let err = find_expr_references(&tx, &bad_attno, &rtable).unwrap_err();
        assert!(matches!(err, CatalogError::Expr(ExprError::InvalidVarAttNo { .. })));
        Ok(())
    }

    #[test]
    fn planned_subplans_are_rejected() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let tx = datastore.begin_mut_tx();
        let rtable = [RangeTableEntry::Relation { oid: rel_oid }];
        let err = find_expr_references(&tx, &Expr::SubPlan { plan_id: 1 }, &rtable).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Expr(ExprError::UnsupportedConstruct(_))
        ));
        Ok(())
    }

    #[test]
    fn single_rel_split_separates_self_references() -> ResultTest<()> {
        let (datastore, rel_oid) = setup()?;
        let mut tx = datastore.begin_mut_tx();
        let depender = ObjectAddress::relation(Oid(5000));
        // A self column reference plus an operator reference.
        let expr = Expr::op(
            OPERATOR_INT4_EQ_OID,
            vec![Expr::var(1, 1), Expr::const_int4(1)],
        );
        record_dependency_on_single_rel_expr(&mut tx, &depender, &expr, rel_oid, DepType::Normal, DepType::Auto)?;
        tx.bump_command_counter();

        let edges = crate::db::depend::registry::scan_by_depender(&tx, &depender)?;
        let self_edge = edges
            .iter()
            .find(|e| e.referent == ObjectAddress::column(rel_oid, SubId(1)))
            .unwrap();
        assert_eq!(self_edge.dep_type, DepType::Auto);
        let op_edge = edges
            .iter()
            .find(|e| e.referent == ObjectAddress::new(ST_OPERATOR_ID, OPERATOR_INT4_EQ_OID, SubId::ZERO))
            .unwrap();
        assert_eq!(op_edge.dep_type, DepType::Normal);
        Ok(())
    }
}
