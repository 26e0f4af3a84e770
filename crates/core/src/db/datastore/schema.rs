//! Light table schemas for the store.
//!
//! The store only needs column names and type tags to validate writes and to
//! describe itself; everything richer (indexes, constraints, defaults) lives
//! in the catalog tables proper.

use super::value::{Row, ValueKind};
use relcat_primitives::Oid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    pub col_name: Box<str>,
    pub col_type: ValueKind,
}

impl ColumnSchema {
    pub fn new(col_name: &str, col_type: ValueKind) -> Self {
        Self {
            col_name: col_name.into(),
            col_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub table_id: Oid,
    pub table_name: Box<str>,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(table_id: Oid, table_name: &str, columns: Vec<ColumnSchema>) -> Self {
        Self {
            table_id,
            table_name: table_name.into(),
            columns,
        }
    }

    /// Arity plus per-column kind check. NULL is admissible in any column.
    pub fn row_matches(&self, row: &Row) -> bool {
        row.elements.len() == self.columns.len()
            && row
                .elements
                .iter()
                .zip(&self.columns)
                .all(|(v, c)| v.kind_matches(c.col_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::datastore::value::Value;
    use crate::row;

    fn two_col_schema() -> TableSchema {
        TableSchema::new(
            Oid(9),
            "t",
            vec![
                ColumnSchema::new("id", ValueKind::U32),
                ColumnSchema::new("name", ValueKind::String),
            ],
        )
    }

    #[test]
    fn row_shape_is_checked() {
        let schema = two_col_schema();
        assert!(schema.row_matches(&row![1u32, "x"]));
        assert!(!schema.row_matches(&row![1u32]));
        assert!(!schema.row_matches(&row!["x", 1u32]));
    }

    #[test]
    fn null_is_admissible() {
        let schema = two_col_schema();
        assert!(schema.row_matches(&Row::new(vec![Value::U32(1), Value::Null])));
    }
}
