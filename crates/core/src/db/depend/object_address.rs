//! Object addresses and the working set used during graph traversals.

use crate::db::catalog::system_tables::{
    ST_ATTRDEF_ID, ST_CAST_ID, ST_CLASS_ID, ST_CONSTRAINT_ID, ST_CONVERSION_ID, ST_LANGUAGE_ID, ST_NAMESPACE_ID,
    ST_OPCLASS_ID, ST_OPERATOR_ID, ST_PROC_ID, ST_REWRITE_ID, ST_TRIGGER_ID, ST_TYPE_ID,
};
use once_cell::sync::Lazy;
use relcat_primitives::{Oid, SubId};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a catalog object or sub-object: the catalog table that owns
/// it, its oid, and, for relation columns, the 1-based column position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectAddress {
    pub class_id: Oid,
    pub object_id: Oid,
    pub sub_id: SubId,
}

impl ObjectAddress {
    pub const fn new(class_id: Oid, object_id: Oid, sub_id: SubId) -> Self {
        Self {
            class_id,
            object_id,
            sub_id,
        }
    }

    /// Address of a whole relation.
    pub const fn relation(oid: Oid) -> Self {
        Self::new(ST_CLASS_ID, oid, SubId::ZERO)
    }

    /// Address of one column of a relation.
    pub const fn column(oid: Oid, col: SubId) -> Self {
        Self::new(ST_CLASS_ID, oid, col)
    }

    /// Whether `self` equals `other` or subsumes it as the whole-object
    /// address of the same object.
    pub fn contains(&self, other: &ObjectAddress) -> bool {
        self.class_id == other.class_id
            && self.object_id == other.object_id
            && (self.sub_id == other.sub_id || self.sub_id.is_whole())
    }

    pub fn is_whole_object(&self) -> bool {
        self.sub_id.is_whole()
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.class_id, self.object_id, self.sub_id)
    }
}

/// The closed set of object classes the engine can delete. Every class id
/// maps to exactly one tag; dispatch on the tag is an exhaustive `match`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    Relation,
    Function,
    Type,
    Cast,
    Constraint,
    Conversion,
    ColumnDefault,
    Language,
    Operator,
    OperatorClass,
    RewriteRule,
    Trigger,
    Schema,
}

pub const ALL_OBJECT_CLASSES: [ObjectClass; 13] = [
    ObjectClass::Relation,
    ObjectClass::Function,
    ObjectClass::Type,
    ObjectClass::Cast,
    ObjectClass::Constraint,
    ObjectClass::Conversion,
    ObjectClass::ColumnDefault,
    ObjectClass::Language,
    ObjectClass::Operator,
    ObjectClass::OperatorClass,
    ObjectClass::RewriteRule,
    ObjectClass::Trigger,
    ObjectClass::Schema,
];

/// The reverse class-id → tag map, built once per process.
static CLASS_BY_ID: Lazy<BTreeMap<Oid, ObjectClass>> = Lazy::new(|| {
    ALL_OBJECT_CLASSES
        .iter()
        .map(|class| (class.class_id(), *class))
        .collect()
});

impl ObjectClass {
    pub fn class_id(self) -> Oid {
        match self {
            ObjectClass::Relation => ST_CLASS_ID,
            ObjectClass::Function => ST_PROC_ID,
            ObjectClass::Type => ST_TYPE_ID,
            ObjectClass::Cast => ST_CAST_ID,
            ObjectClass::Constraint => ST_CONSTRAINT_ID,
            ObjectClass::Conversion => ST_CONVERSION_ID,
            ObjectClass::ColumnDefault => ST_ATTRDEF_ID,
            ObjectClass::Language => ST_LANGUAGE_ID,
            ObjectClass::Operator => ST_OPERATOR_ID,
            ObjectClass::OperatorClass => ST_OPCLASS_ID,
            ObjectClass::RewriteRule => ST_REWRITE_ID,
            ObjectClass::Trigger => ST_TRIGGER_ID,
            ObjectClass::Schema => ST_NAMESPACE_ID,
        }
    }

    pub fn of(class_id: Oid) -> Option<ObjectClass> {
        CLASS_BY_ID.get(&class_id).copied()
    }

    pub fn of_address(addr: &ObjectAddress) -> Option<ObjectClass> {
        Self::of(addr.class_id)
    }
}

/// An expansible working set of object addresses.
///
/// Duplicate-tolerant on `add`; [`ObjectAddressSet::dedupe`] sorts and
/// compacts so that no entry contains another. Lookups are linear; the set
/// stays small in practice and a scan beats maintaining a side index.
#[derive(Clone, Debug, Default)]
pub struct ObjectAddressSet {
    entries: Vec<ObjectAddress>,
}

impl ObjectAddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, addr: ObjectAddress) {
        self.entries.push(addr);
    }

    pub fn add_by_class_tag(&mut self, class: ObjectClass, object_id: Oid, sub_id: SubId) {
        self.add(ObjectAddress::new(class.class_id(), object_id, sub_id));
    }

    /// Whether any stored address equals `addr` or contains it.
    pub fn contains_or_parent(&self, addr: &ObjectAddress) -> bool {
        self.entries.iter().any(|stored| stored.contains(addr))
    }

    /// Sort and compact. Identical triples collapse; a whole-object entry
    /// followed by a column entry of the same object is replaced by the
    /// column entry (the column reference subsumes the table reference).
    /// Distinct column entries of the same object are all kept.
    pub fn dedupe(&mut self) {
        // Stable sort; sub id 0 sorts first within an object.
        self.entries
            .sort_by_key(|a| (a.class_id, a.object_id, a.sub_id));

        let mut compacted: Vec<ObjectAddress> = Vec::with_capacity(self.entries.len());
        for this in self.entries.drain(..) {
            if let Some(prior) = compacted.last_mut() {
                if prior.class_id == this.class_id && prior.object_id == this.object_id {
                    if prior.sub_id == this.sub_id {
                        continue;
                    }
                    if prior.sub_id.is_whole() {
                        prior.sub_id = this.sub_id;
                        continue;
                    }
                }
            }
            compacted.push(this);
        }
        self.entries = compacted;
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectAddress> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObjectAddressSet {
    type Item = &'a ObjectAddress;
    type IntoIter = std::slice::Iter<'a, ObjectAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(oid: u32) -> ObjectAddress {
        ObjectAddress::relation(Oid(oid))
    }

    fn column(oid: u32, sub: u32) -> ObjectAddress {
        ObjectAddress::column(Oid(oid), SubId(sub))
    }

    #[test]
    fn whole_object_contains_columns() {
        assert!(rel(7).contains(&column(7, 3)));
        assert!(rel(7).contains(&rel(7)));
        assert!(!column(7, 3).contains(&rel(7)));
        assert!(!column(7, 3).contains(&column(7, 4)));
        assert!(!rel(7).contains(&rel(8)));
    }

    #[test]
    fn class_map_is_total_and_invertible() {
        for class in ALL_OBJECT_CLASSES {
            assert_eq!(ObjectClass::of(class.class_id()), Some(class));
        }
        assert_eq!(ObjectClass::of(Oid(9999)), None);
    }

    #[test]
    fn contains_or_parent_consults_whole_entries() {
        let mut set = ObjectAddressSet::new();
        set.add(rel(7));
        assert!(set.contains_or_parent(&column(7, 2)));
        assert!(set.contains_or_parent(&rel(7)));
        assert!(!set.contains_or_parent(&rel(8)));
    }

    #[test]
    fn dedupe_drops_identical_entries() {
        let mut set = ObjectAddressSet::new();
        set.add(column(7, 2));
        set.add(column(7, 2));
        set.add(rel(8));
        set.dedupe();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn dedupe_replaces_whole_with_partial() {
        let mut set = ObjectAddressSet::new();
        set.add(column(7, 2));
        set.add(rel(7));
        set.add(column(7, 3));
        set.dedupe();
        let entries: Vec<_> = set.iter().copied().collect();
        assert_eq!(entries, vec![column(7, 2), column(7, 3)]);
        // No entry contains another after compaction.
        for a in &entries {
            for b in &entries {
                if a != b {
                    assert!(!a.contains(b));
                }
            }
        }
    }

    #[test]
    fn dedupe_keeps_distinct_objects_apart() {
        let mut set = ObjectAddressSet::new();
        set.add(rel(9));
        set.add(rel(7));
        set.add(column(9, 1));
        set.dedupe();
        let entries: Vec<_> = set.iter().copied().collect();
        assert_eq!(entries, vec![rel(7), column(9, 1)]);
    }
}
