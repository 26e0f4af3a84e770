//! The persistent edge store over `st_depend`.
//!
//! Edges are plain catalog rows; scans observe the transaction's
//! committed-plus-current-command snapshot, which is what lets the deletion
//! engine sever an edge and have later scans not re-observe it.

use super::object_address::{ObjectAddress, ObjectAddressSet};
use super::DepType;
use crate::db::catalog::system_tables::{StDependFields, StDependRow, ST_DEPEND_ID};
use crate::db::datastore::mut_tx::MutTx;
use crate::db::datastore::value::Value;
use crate::db::datastore::Result;
use relcat_primitives::{Oid, RowId, SubId};

/// One edge as returned by a scan, with the storage handle needed to delete
/// it again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependEdge {
    pub row_id: RowId,
    pub depender: ObjectAddress,
    pub referent: ObjectAddress,
    pub dep_type: DepType,
}

/// Record a single `depender → referent` edge.
pub fn record_dependency(
    tx: &mut MutTx,
    depender: &ObjectAddress,
    referent: &ObjectAddress,
    dep_type: DepType,
) -> Result<()> {
    log::trace!("DEPENDENCY RECORDING: {depender} -> {referent} ({dep_type:?})");
    let row = StDependRow {
        dep_class: depender.class_id,
        dep_oid: depender.object_id,
        dep_sub: depender.sub_id,
        ref_class: referent.class_id,
        ref_oid: referent.object_id,
        ref_sub: referent.sub_id,
        dep_type,
    };
    tx.insert(ST_DEPEND_ID, row.into())?;
    Ok(())
}

/// Record one edge per referent in `referents`. Callers are expected to have
/// run [`ObjectAddressSet::dedupe`] first.
pub fn record_multiple_dependencies(
    tx: &mut MutTx,
    depender: &ObjectAddress,
    referents: &ObjectAddressSet,
    dep_type: DepType,
) -> Result<()> {
    for referent in referents {
        record_dependency(tx, depender, referent, dep_type)?;
    }
    Ok(())
}

/// Record that `referent` is required by the database itself. Pin rows carry
/// zeroed depender fields by convention.
pub fn record_pin(tx: &mut MutTx, referent: &ObjectAddress) -> Result<()> {
    let row = StDependRow {
        dep_class: Oid::ZERO,
        dep_oid: Oid::ZERO,
        dep_sub: SubId::ZERO,
        ref_class: referent.class_id,
        ref_oid: referent.object_id,
        ref_sub: referent.sub_id,
        dep_type: DepType::Pin,
    };
    tx.insert(ST_DEPEND_ID, row.into())?;
    Ok(())
}

fn edge_from(row_id: RowId, row: StDependRow) -> DependEdge {
    DependEdge {
        row_id,
        depender: ObjectAddress::new(row.dep_class, row.dep_oid, row.dep_sub),
        referent: ObjectAddress::new(row.ref_class, row.ref_oid, row.ref_sub),
        dep_type: row.dep_type,
    }
}

/// Every edge whose referent endpoint is `addr`. A whole-object address
/// (`sub_id == 0`) widens the match to all sub-objects of the object.
pub fn scan_by_referent(tx: &MutTx, addr: &ObjectAddress) -> Result<Vec<DependEdge>> {
    let mut edges = Vec::new();
    for row_ref in tx.iter_by_col_eq(
        ST_DEPEND_ID,
        StDependFields::RefOid.col_idx(),
        Value::from(addr.object_id),
    )? {
        let row = StDependRow::try_from(row_ref)?;
        if row.ref_class != addr.class_id {
            continue;
        }
        if !addr.sub_id.is_whole() && row.ref_sub != addr.sub_id {
            continue;
        }
        edges.push(edge_from(row_ref.id(), row));
    }
    Ok(edges)
}

/// Every edge whose depender endpoint is `addr`, widened like
/// [`scan_by_referent`].
pub fn scan_by_depender(tx: &MutTx, addr: &ObjectAddress) -> Result<Vec<DependEdge>> {
    let mut edges = Vec::new();
    for row_ref in tx.iter_by_col_eq(
        ST_DEPEND_ID,
        StDependFields::DepOid.col_idx(),
        Value::from(addr.object_id),
    )? {
        let row = StDependRow::try_from(row_ref)?;
        if row.dep_class != addr.class_id {
            continue;
        }
        if !addr.sub_id.is_whole() && row.dep_sub != addr.sub_id {
            continue;
        }
        edges.push(edge_from(row_ref.id(), row));
    }
    Ok(edges)
}

/// Remove one edge by its storage handle. Returns whether a live edge row
/// was deleted.
pub fn delete_edge(tx: &mut MutTx, row_id: RowId) -> bool {
    tx.delete(ST_DEPEND_ID, row_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::datastore::Datastore;
    use crate::db::depend::ObjectClass;
    use crate::error::ResultTest;
    use itertools::Itertools;

    fn rel(oid: u32) -> ObjectAddress {
        ObjectAddress::relation(Oid(oid))
    }

    fn column(oid: u32, sub: u32) -> ObjectAddress {
        ObjectAddress::column(Oid(oid), SubId(sub))
    }

    #[test]
    fn record_and_scan_both_directions() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        record_dependency(&mut tx, &rel(2001), &column(2000, 1), DepType::Auto)?;
        record_dependency(&mut tx, &rel(2002), &rel(2000), DepType::Normal)?;
        tx.bump_command_counter();

        let by_referent = scan_by_referent(&tx, &rel(2000))?;
        assert_eq!(by_referent.len(), 2);

        // Narrow scan on the column only.
        let by_column = scan_by_referent(&tx, &column(2000, 1))?;
        assert_eq!(by_column.len(), 1);
        assert_eq!(by_column[0].depender, rel(2001));

        let by_depender = scan_by_depender(&tx, &rel(2001))?;
        assert_eq!(by_depender.len(), 1);
        assert_eq!(by_depender[0].referent, column(2000, 1));
        Ok(())
    }

    #[test]
    fn deleted_edges_stay_visible_until_bump() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        record_dependency(&mut tx, &rel(2001), &rel(2000), DepType::Normal)?;
        tx.bump_command_counter();

        let edges = scan_by_referent(&tx, &rel(2000))?;
        assert_eq!(edges.len(), 1);
        assert!(delete_edge(&mut tx, edges[0].row_id));

        // The severing command still observes the edge; the next one must not.
        assert_eq!(scan_by_referent(&tx, &rel(2000))?.len(), 1);
        tx.bump_command_counter();
        assert_eq!(scan_by_referent(&tx, &rel(2000))?.len(), 0);
        Ok(())
    }

    #[test]
    fn pin_rows_carry_zeroed_dependers() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        record_pin(&mut tx, &rel(2050))?;
        tx.bump_command_counter();

        let edges = scan_by_referent(&tx, &rel(2050))?;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].dep_type, DepType::Pin);
        assert_eq!(edges[0].depender, ObjectAddress::new(Oid::ZERO, Oid::ZERO, SubId::ZERO));
        Ok(())
    }

    #[test]
    fn multiple_edge_types_between_the_same_pair() -> ResultTest<()> {
        let datastore = Datastore::bootstrap()?;
        let mut tx = datastore.begin_mut_tx();
        let depender = ObjectAddress::new(ObjectClass::Trigger.class_id(), Oid(2101), SubId::ZERO);
        record_dependency(&mut tx, &depender, &rel(2100), DepType::Normal)?;
        record_dependency(&mut tx, &depender, &rel(2100), DepType::Auto)?;
        tx.bump_command_counter();

        let kinds: Vec<DepType> = scan_by_referent(&tx, &rel(2100))?
            .into_iter()
            .map(|e| e.dep_type)
            .sorted()
            .collect();
        assert_eq!(kinds, vec![DepType::Normal, DepType::Auto]);
        Ok(())
    }
}
