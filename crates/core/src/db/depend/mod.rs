//! Typed object dependencies and the cascaded-drop machinery.

pub mod deletion;
pub mod object_address;
pub mod registry;

pub use deletion::{delete_what_depends_on, perform_deletion, DropMode};
pub use object_address::{ObjectAddress, ObjectAddressSet, ObjectClass};
pub use registry::{record_dependency, record_multiple_dependencies};

use crate::error::DependError;

/// The kind of a dependency edge, persisted as a one-byte tag.
///
/// - `Normal`: the depender uses the referent. Dropping the referent either
///   cascades (CASCADE) or fails (RESTRICT, unless the depender is reachable
///   from the drop root through auto/internal edges anyway).
/// - `Auto`: the depender is an automatic side-object of the referent and is
///   silently dropped with it in either mode.
/// - `Internal`: the depender is part of the referent's implementation.
///   Dropping the depender on its own is refused; deletion is redirected to
///   the owning referent, which comes back through the same edge.
/// - `Pin`: the referent is required by the database itself and can never be
///   dropped. Pin rows carry zeroed depender fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DepType {
    Normal,
    Auto,
    Internal,
    Pin,
}

impl DepType {
    pub fn as_u8(self) -> u8 {
        match self {
            DepType::Normal => b'n',
            DepType::Auto => b'a',
            DepType::Internal => b'i',
            DepType::Pin => b'p',
        }
    }
}

impl TryFrom<u8> for DepType {
    type Error = DependError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            b'n' => DepType::Normal,
            b'a' => DepType::Auto,
            b'i' => DepType::Internal,
            b'p' => DepType::Pin,
            other => return Err(DependError::UnknownDepType(other)),
        })
    }
}
