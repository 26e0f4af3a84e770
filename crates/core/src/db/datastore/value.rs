//! Row values for the catalog store.
//!
//! Catalog rows are flat tuples of [`Value`]s. The variant set is the small
//! closed universe the system tables need; serialized expression trees travel
//! as [`Value::Bytes`].

use derive_more::From;
use relcat_primitives::{Oid, RowId, SubId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single column value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, From)]
pub enum Value {
    #[from(ignore)]
    Null,
    Bool(bool),
    U8(u8),
    U32(u32),
    U64(u64),
    I64(i64),
    String(Box<str>),
    Bytes(Box<[u8]>),
    Array(Vec<Value>),
}

/// Type tag for a column in a table schema.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    U8,
    U32,
    U64,
    I64,
    String,
    Bytes,
    Array,
}

impl Value {
    pub fn kind_matches(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (Value::Null, _)
                | (Value::Bool(_), ValueKind::Bool)
                | (Value::U8(_), ValueKind::U8)
                | (Value::U32(_), ValueKind::U32)
                | (Value::U64(_), ValueKind::U64)
                | (Value::I64(_), ValueKind::I64)
                | (Value::String(_), ValueKind::String)
                | (Value::Bytes(_), ValueKind::Bytes)
                | (Value::Array(_), ValueKind::Array)
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}
impl From<Oid> for Value {
    fn from(v: Oid) -> Self {
        Value::U32(v.0)
    }
}
impl From<SubId> for Value {
    fn from(v: SubId) -> Self {
        Value::U32(v.0)
    }
}
impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v.into())
    }
}

/// Reading a field out of a row at the wrong type or position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid read of field {field} as {expected}")]
pub struct InvalidFieldError {
    pub field: usize,
    pub expected: &'static str,
}

/// A stored row: one value per column, positional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    pub elements: Vec<Value>,
}

impl Row {
    pub fn new(elements: Vec<Value>) -> Self {
        Self { elements }
    }

    pub fn field(&self, idx: usize) -> Result<&Value, InvalidFieldError> {
        self.elements.get(idx).ok_or(InvalidFieldError {
            field: idx,
            expected: "value",
        })
    }

    pub fn bool_at(&self, idx: usize) -> Result<bool, InvalidFieldError> {
        match self.field(idx)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "bool",
            }),
        }
    }

    pub fn u8_at(&self, idx: usize) -> Result<u8, InvalidFieldError> {
        match self.field(idx)? {
            Value::U8(v) => Ok(*v),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "u8",
            }),
        }
    }

    pub fn u32_at(&self, idx: usize) -> Result<u32, InvalidFieldError> {
        match self.field(idx)? {
            Value::U32(v) => Ok(*v),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "u32",
            }),
        }
    }

    pub fn u64_at(&self, idx: usize) -> Result<u64, InvalidFieldError> {
        match self.field(idx)? {
            Value::U64(v) => Ok(*v),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "u64",
            }),
        }
    }

    pub fn oid_at(&self, idx: usize) -> Result<Oid, InvalidFieldError> {
        self.u32_at(idx).map(Oid)
    }

    pub fn sub_at(&self, idx: usize) -> Result<SubId, InvalidFieldError> {
        self.u32_at(idx).map(SubId)
    }

    pub fn str_at(&self, idx: usize) -> Result<&str, InvalidFieldError> {
        match self.field(idx)? {
            Value::String(v) => Ok(v),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "string",
            }),
        }
    }

    pub fn bytes_at(&self, idx: usize) -> Result<&[u8], InvalidFieldError> {
        match self.field(idx)? {
            Value::Bytes(v) => Ok(v),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "bytes",
            }),
        }
    }

    /// Bytes column that may be NULL.
    pub fn bytes_opt_at(&self, idx: usize) -> Result<Option<&[u8]>, InvalidFieldError> {
        match self.field(idx)? {
            Value::Null => Ok(None),
            Value::Bytes(v) => Ok(Some(v)),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "bytes or null",
            }),
        }
    }

    /// An array column of oids (stored as `U32` elements).
    pub fn oid_array_at(&self, idx: usize) -> Result<Vec<Oid>, InvalidFieldError> {
        match self.field(idx)? {
            Value::Array(vs) => vs
                .iter()
                .map(|v| match v {
                    Value::U32(x) => Ok(Oid(*x)),
                    _ => Err(InvalidFieldError {
                        field: idx,
                        expected: "array of u32",
                    }),
                })
                .collect(),
            _ => Err(InvalidFieldError {
                field: idx,
                expected: "array",
            }),
        }
    }

    /// An array column of column positions.
    pub fn sub_array_at(&self, idx: usize) -> Result<Vec<SubId>, InvalidFieldError> {
        Ok(self.oid_array_at(idx)?.into_iter().map(|o| SubId(o.0)).collect())
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Row::new(iter.into_iter().collect())
    }
}

/// Shorthand for building a [`Row`] out of `Into<Value>` elements.
#[macro_export]
macro_rules! row {
    ($($e:expr),* $(,)?) => {
        $crate::db::datastore::value::Row::new(vec![$($crate::db::datastore::value::Value::from($e)),*])
    };
}

/// A borrowed view of a stored row together with its storage handle.
#[derive(Copy, Clone, Debug)]
pub struct RowRef<'a> {
    id: RowId,
    row: &'a Row,
}

impl<'a> RowRef<'a> {
    pub(crate) fn new(id: RowId, row: &'a Row) -> Self {
        Self { id, row }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn row(&self) -> &'a Row {
        self.row
    }
}

pub(crate) fn oid_array(oids: &[Oid]) -> Value {
    Value::Array(oids.iter().map(|o| Value::U32(o.0)).collect())
}

pub(crate) fn sub_array(subs: &[SubId]) -> Value {
    Value::Array(subs.iter().map(|s| Value::U32(s.0)).collect())
}
