//! Identifier newtypes used throughout the catalog engine.
//!
//! Everything a catalog row can point at is identified by an [`Oid`];
//! sub-objects of a relation (its columns) are discriminated by a [`SubId`].
//! The remaining ids are storage-level: [`RowId`] is the handle of a stored
//! row, [`Cid`] is a transaction-local command counter value, and
//! [`FileNode`] names a physical file backing an index.

use core::fmt;

macro_rules! system_id {
    ($(#[$attr:meta])* $name:ident, $prim:ty) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub $prim);

        impl $name {
            pub const ZERO: Self = Self(0);

            #[inline]
            pub const fn new(value: $prim) -> Self {
                Self(value)
            }

            #[inline]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl From<$prim> for $name {
            fn from(value: $prim) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $prim {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

system_id!(
    /// Identifier of a catalog object: a relation, function, type, operator,
    /// constraint, … Catalog tables themselves have fixed, well-known oids,
    /// which double as the *class id* of the objects they store.
    Oid,
    u32
);

system_id!(
    /// Sub-object discriminator within a relation. Columns are numbered from
    /// 1; the value 0 addresses the relation as a whole. For every class of
    /// object other than relations the sub id must be 0.
    SubId,
    u32
);

system_id!(
    /// Storage handle of a row within a table. Assigned monotonically by the
    /// store; doubles as a stable scan order.
    RowId,
    u64
);

system_id!(
    /// Command counter value within a transaction. A write made by command
    /// `c` becomes visible to scans once the current command id is greater
    /// than `c`.
    Cid,
    u32
);

system_id!(
    /// Identifier of the physical file backing an index. Reindex swaps a
    /// relation onto a fresh file node and unlinks the old one at commit.
    FileNode,
    u32
);

impl Oid {
    /// Whether this oid refers to an actual object. Oid 0 is reserved as
    /// "invalid" and never allocated.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl SubId {
    /// Whether this sub id addresses the whole object rather than a column.
    #[inline]
    pub fn is_whole(self) -> bool {
        self.0 == 0
    }
}

impl Cid {
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
