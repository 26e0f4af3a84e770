//! Expression trees, the reference walker that feeds the dependency
//! registry, and the small evaluator the index build uses.

pub mod eval;
pub mod tree;
pub mod walker;

pub use tree::{BoolOp, Expr, Query, RangeTableEntry};
pub use walker::{
    find_expr_references, find_query_references, record_dependency_on_expr, record_dependency_on_query,
    record_dependency_on_single_rel_expr,
};
