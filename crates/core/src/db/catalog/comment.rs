//! Comments attached to catalog objects.
//!
//! Comments are not dependency objects; the deletion engine cleans them up
//! itself right after the per-class deleter runs, so individual deleters
//! never have to remember to.

use super::system_tables::{StDescriptionFields, StDescriptionRow, ST_DESCRIPTION_ID};
use crate::db::datastore::mut_tx::MutTx;
use crate::db::datastore::value::Value;
use crate::db::datastore::Result;
use crate::db::depend::ObjectAddress;
use relcat_primitives::RowId;

/// Set or replace the comment on an object. An empty comment deletes.
pub fn set_comment(tx: &mut MutTx, addr: &ObjectAddress, text: &str) -> Result<()> {
    delete_exact(tx, addr)?;
    if !text.is_empty() {
        let row = StDescriptionRow {
            class_oid: addr.class_id,
            obj_oid: addr.object_id,
            sub: addr.sub_id,
            description: text.into(),
        };
        tx.insert(ST_DESCRIPTION_ID, row.into())?;
    }
    Ok(())
}

pub fn get_comment(tx: &MutTx, addr: &ObjectAddress) -> Result<Option<String>> {
    for row_ref in tx.iter_by_col_eq(
        ST_DESCRIPTION_ID,
        StDescriptionFields::ObjOid.col_idx(),
        Value::from(addr.object_id),
    )? {
        let row = StDescriptionRow::try_from(row_ref)?;
        if row.class_oid == addr.class_id && row.sub == addr.sub_id {
            return Ok(Some(row.description.into()));
        }
    }
    Ok(None)
}

/// Delete the comments on an object. A whole-object address also removes the
/// comments on every sub-object, so dropping a table takes its column
/// comments with it.
pub fn delete_comments(tx: &mut MutTx, addr: &ObjectAddress) -> Result<()> {
    let row_ids: Vec<RowId> = tx
        .iter_by_col_eq(
            ST_DESCRIPTION_ID,
            StDescriptionFields::ObjOid.col_idx(),
            Value::from(addr.object_id),
        )?
        .filter_map(|row_ref| {
            let row = StDescriptionRow::try_from(row_ref).ok()?;
            let matches =
                row.class_oid == addr.class_id && (addr.sub_id.is_whole() || row.sub == addr.sub_id);
            matches.then(|| row_ref.id())
        })
        .collect();
    for row_id in row_ids {
        tx.delete(ST_DESCRIPTION_ID, row_id);
    }
    Ok(())
}

fn delete_exact(tx: &mut MutTx, addr: &ObjectAddress) -> Result<()> {
    let row_ids: Vec<RowId> = tx
        .iter_by_col_eq(
            ST_DESCRIPTION_ID,
            StDescriptionFields::ObjOid.col_idx(),
            Value::from(addr.object_id),
        )?
        .filter_map(|row_ref| {
            let row = StDescriptionRow::try_from(row_ref).ok()?;
            (row.class_oid == addr.class_id && row.sub == addr.sub_id).then(|| row_ref.id())
        })
        .collect();
    for row_id in row_ids {
        tx.delete(ST_DESCRIPTION_ID, row_id);
    }
    Ok(())
}
