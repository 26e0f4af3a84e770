//! The deletion engine.
//!
//! `perform_deletion` removes an object and everything that must go with it,
//! in an order that respects the dependency graph, under CASCADE or RESTRICT
//! semantics. It runs in two phases:
//!
//! - **Phase A** computes `ok_to_delete`, the closure of objects reachable
//!   from the root through auto/internal edges. Its only purpose is to make
//!   the outcome independent of edge enumeration order: an object reached
//!   later through a normal edge may still be silently deletable because a
//!   parallel auto/internal path exists.
//! - **Phase B** recursively deletes. For each object it first severs the
//!   object's outgoing edges (resolving internal ownership, which may
//!   redirect the deletion to the owning object), bumps the command counter
//!   so the severed edges cannot be re-observed (that ordering is the sole
//!   cycle-breaking mechanism), then cascades across incoming edges, and
//!   finally runs the per-class deleter.
//!
//! RESTRICT does not stop at the first violation; it keeps traversing so
//! every violation is reported, then fails the whole request. The enclosing
//! transaction rolls back, nullifying the partial deletions.

use super::object_address::{ObjectAddress, ObjectAddressSet, ObjectClass};
use super::registry;
use super::DepType;
use crate::db::catalog::describe::object_description;
use crate::db::catalog::system_tables::{RelKind, SystemTable, ST_DEPEND_ID};
use crate::db::catalog::{comment, heap};
use crate::db::datastore::mut_tx::{delete_by_col_eq, MutTx};
use crate::db::datastore::value::Value;
use crate::db::datastore::{LockMode, Result};
use crate::db::index;
use crate::error::{CatalogError, DependError};
use relcat_primitives::Oid;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DropMode {
    Restrict,
    Cascade,
}

/// How loudly cascade announcements are made. `delete_what_depends_on`
/// demotes them to debug chatter when the caller asks for silence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ReportLevel {
    Debug,
    Notice,
}

fn report(level: ReportLevel, message: std::fmt::Arguments<'_>) {
    match level {
        ReportLevel::Debug => log::debug!("{message}"),
        ReportLevel::Notice => log::info!("{message}"),
    }
}

/// Delete `object` and everything that must go with it.
pub fn perform_deletion(tx: &mut MutTx, object: &ObjectAddress, mode: DropMode) -> Result<()> {
    // The description must be captured before anything is deleted.
    let description = object_description(tx, object)?;
    log::trace!("DELETION STARTING: {description}");

    tx.lock_relation(ST_DEPEND_ID, LockMode::RowExclusive);

    let mut ok_to_delete = ObjectAddressSet::new();
    find_auto_deletable(tx, object, &mut ok_to_delete)?;

    if !recursive_deletion(tx, object, mode, ReportLevel::Notice, None, &ok_to_delete)? {
        return Err(DependError::DependentObjectsExist { object: description }.into());
    }

    log::trace!("DELETION DONE: {description}");
    Ok(())
}

/// Delete everything that depends on `object`, but not `object` itself.
/// Used when emptying a schema before dropping the schema.
pub fn delete_what_depends_on(tx: &mut MutTx, object: &ObjectAddress, show_notices: bool) -> Result<()> {
    let description = object_description(tx, object)?;
    log::trace!("DELETION (dependents only) STARTING: {description}");

    tx.lock_relation(ST_DEPEND_ID, LockMode::RowExclusive);

    let mut ok_to_delete = ObjectAddressSet::new();
    find_auto_deletable(tx, object, &mut ok_to_delete)?;

    let msg_level = if show_notices {
        ReportLevel::Notice
    } else {
        ReportLevel::Debug
    };

    for edge in registry::scan_by_referent(tx, object)? {
        if edge.dep_type == DepType::Pin {
            return Err(DependError::RequiredBySystem { object: description }.into());
        }
        // Skip edges a prior iteration's cascade already severed.
        if tx.get(ST_DEPEND_ID, edge.row_id).is_none() {
            continue;
        }
        let depender_description = object_description(tx, &edge.depender)?;
        if ok_to_delete.contains_or_parent(&edge.depender) {
            log::debug!("drop auto-cascades to {depender_description}");
        } else {
            report(msg_level, format_args!("drop cascades to {depender_description}"));
        }
        if !recursive_deletion(tx, &edge.depender, DropMode::Cascade, msg_level, Some(object), &ok_to_delete)? {
            return Err(CatalogError::Internal(
                "cascaded deletion reported a violation in CASCADE mode".into(),
            ));
        }
    }
    tx.bump_command_counter();

    log::trace!("DELETION (dependents only) DONE: {description}");
    Ok(())
}

/// Phase A: fold `addr` and everything reachable from it through auto or
/// internal edges (referent → depender direction) into `ok_to_delete`. The
/// membership check doubles as the cycle cut.
fn find_auto_deletable(tx: &MutTx, addr: &ObjectAddress, ok_to_delete: &mut ObjectAddressSet) -> Result<()> {
    if ok_to_delete.contains_or_parent(addr) {
        return Ok(());
    }
    ok_to_delete.add(*addr);

    for edge in registry::scan_by_referent(tx, addr)? {
        match edge.dep_type {
            DepType::Normal => {}
            DepType::Auto | DepType::Internal => find_auto_deletable(tx, &edge.depender, ok_to_delete)?,
            DepType::Pin => {
                return Err(DependError::RequiredBySystem {
                    object: object_description(tx, addr)?,
                }
                .into())
            }
        }
    }
    Ok(())
}

/// Phase B. Returns `false` when a RESTRICT violation was found; traversal
/// continues regardless so every violation gets reported once.
fn recursive_deletion(
    tx: &mut MutTx,
    obj: &ObjectAddress,
    mode: DropMode,
    msg_level: ReportLevel,
    calling_object: Option<&ObjectAddress>,
    ok_to_delete: &ObjectAddressSet,
) -> Result<bool> {
    let mut ok = true;
    let obj_description = object_description(tx, obj)?;

    // Step 1: sever our outgoing edges, sorting out internal ownership.
    let mut owning_object: Option<ObjectAddress> = None;
    for edge in registry::scan_by_depender(tx, obj)? {
        match edge.dep_type {
            DepType::Normal | DepType::Auto => {
                registry::delete_edge(tx, edge.row_id);
            }
            DepType::Internal => {
                match calling_object {
                    None => {
                        // The root of the whole request is the implementation
                        // half of a compound object; tell the user what to
                        // drop instead.
                        return Err(DependError::OwnedObject {
                            object: obj_description,
                            owner: object_description(tx, &edge.referent)?,
                        }
                        .into());
                    }
                    Some(calling) if edge.referent.contains(calling) => {
                        // We got here from the owning object; proceed.
                        registry::delete_edge(tx, edge.row_id);
                    }
                    Some(_) => {
                        // Reached from a third party: redirect to the owner.
                        // The edge stays; the owner's deletion comes back
                        // through it and finishes the job.
                        if owning_object.is_some() {
                            return Err(DependError::MultipleOwners {
                                object: obj_description,
                            }
                            .into());
                        }
                        owning_object = Some(edge.referent);
                    }
                }
            }
            DepType::Pin => {
                return Err(DependError::PinWithDepender {
                    object: obj_description,
                }
                .into())
            }
        }
    }
    // Severed edges must not be re-observed by the scans below.
    tx.bump_command_counter();

    // Step 1.5: hand the deletion over to the owning object.
    if let Some(owner) = owning_object {
        let owner_description = object_description(tx, &owner)?;
        if ok_to_delete.contains_or_parent(&owner) {
            log::debug!("drop auto-cascades to {owner_description}");
        } else if mode == DropMode::Restrict {
            report(msg_level, format_args!("{owner_description} depends on {obj_description}"));
            ok = false;
        } else {
            report(msg_level, format_args!("drop cascades to {owner_description}"));
        }
        let owner_ok = recursive_deletion(tx, &owner, mode, msg_level, Some(obj), ok_to_delete)?;
        return Ok(ok && owner_ok);
    }

    // Step 2: cascade to everything that depends on us. RESTRICT keeps
    // recursing after a violation so all of them are enumerated.
    for edge in registry::scan_by_referent(tx, obj)? {
        // A nested deletion may have severed this edge after we fetched it;
        // once the counter moved past the severing command the edge is dead
        // and must not be revisited. This is what cuts cycles.
        if tx.get(ST_DEPEND_ID, edge.row_id).is_none() {
            continue;
        }
        match edge.dep_type {
            DepType::Normal => {
                let depender_description = object_description(tx, &edge.depender)?;
                if ok_to_delete.contains_or_parent(&edge.depender) {
                    log::debug!("drop auto-cascades to {depender_description}");
                } else if mode == DropMode::Restrict {
                    report(
                        msg_level,
                        format_args!("{depender_description} depends on {obj_description}"),
                    );
                    ok = false;
                } else {
                    report(msg_level, format_args!("drop cascades to {depender_description}"));
                }
            }
            DepType::Auto | DepType::Internal => {
                log::debug!("drop auto-cascades to {}", object_description(tx, &edge.depender)?);
            }
            DepType::Pin => {
                return Err(DependError::RequiredBySystem {
                    object: obj_description,
                }
                .into())
            }
        }
        if !recursive_deletion(tx, &edge.depender, mode, msg_level, Some(obj), ok_to_delete)? {
            ok = false;
        }
    }

    // Step 3: the object itself, then its comments. Comments are cleaned up
    // here so the per-class deleters never have to remember it.
    delete_one_object(tx, obj)?;
    comment::delete_comments(tx, obj)?;

    // Step 4: flush, so later scans see the removals.
    tx.bump_command_counter();

    Ok(ok)
}

/// The per-class deleter dispatch. Each deleter removes only its own
/// catalog rows; dependents were already handled by the traversal above.
fn delete_one_object(tx: &mut MutTx, obj: &ObjectAddress) -> Result<()> {
    let class = ObjectClass::of(obj.class_id).ok_or(DependError::UnknownClass(obj.class_id))?;
    match class {
        ObjectClass::Relation => {
            if !obj.sub_id.is_whole() {
                return heap::remove_attribute(tx, obj.object_id, obj.sub_id);
            }
            let class_row = heap::get_class_row(tx, obj.object_id)?;
            match class_row.rel_kind {
                RelKind::Index => index::index_drop(tx, obj.object_id),
                _ => heap::heap_drop(tx, obj.object_id),
            }
        }
        ObjectClass::Function
        | ObjectClass::Type
        | ObjectClass::Cast
        | ObjectClass::Constraint
        | ObjectClass::Conversion
        | ObjectClass::ColumnDefault
        | ObjectClass::Language
        | ObjectClass::Operator
        | ObjectClass::OperatorClass
        | ObjectClass::RewriteRule
        | ObjectClass::Trigger
        | ObjectClass::Schema => remove_catalog_row(tx, obj.class_id, obj.object_id),
    }
}

/// Remove a scalar object's single catalog row by oid.
fn remove_catalog_row(tx: &mut MutTx, class_id: Oid, oid: Oid) -> Result<()> {
    // Every scalar object catalog keys its rows by an oid in column 0.
    let deleted = delete_by_col_eq(tx, class_id, 0, Value::from(oid))?;
    if deleted == 0 {
        let catalog = SystemTable::of(class_id)
            .map(|t| t.to_string())
            .unwrap_or_else(|| class_id.to_string());
        return Err(CatalogError::Internal(format!(
            "no row for object {oid} in {catalog}"
        )));
    }
    Ok(())
}
