use crate::db::datastore::value::InvalidFieldError;
use enum_as_inner::EnumAsInner;
use relcat_primitives::{FileNode, Oid, RowId, SubId};
use thiserror::Error;

#[derive(Error, Debug, EnumAsInner)]
pub enum CatalogError {
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
    #[error("DependError: {0}")]
    Depend(#[from] DependError),
    #[error("IndexError: {0}")]
    Index(#[from] IndexError),
    #[error("ExprError: {0}")]
    Expr(#[from] ExprError),
    #[error("{kind} \"{name}\" does not exist")]
    UndefinedObject { kind: &'static str, name: String },
    #[error("{kind} \"{name}\" already exists")]
    DuplicateObject { kind: &'static str, name: String },
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("table with id `{0}` not found")]
    TableNotFound(Oid),
    #[error("row has invalid shape for table `{table}`")]
    RowShape { table: Box<str> },
    #[error("row `{row_id}` not found in table `{table_id}`")]
    RowNotFound { table_id: Oid, row_id: RowId },
    #[error("physical file `{0}` not found")]
    FileNotFound(FileNode),
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldError),
}

/// Failures surfaced by the deletion engine. The first three are the
/// user-visible flavors of "dependent objects still exist"; the rest are
/// states the engine treats as impossible.
#[derive(Error, Debug, PartialEq, Eq, EnumAsInner)]
pub enum DependError {
    #[error("cannot drop {object} because other objects depend on it")]
    DependentObjectsExist { object: String },
    #[error("cannot drop {object} because it is required by the database system")]
    RequiredBySystem { object: String },
    #[error("cannot drop {object} because {owner} requires it; you can drop {owner} instead")]
    OwnedObject { object: String, owner: String },
    #[error("unrecognized dependency type `{0}` in catalog entry")]
    UnknownDepType(u8),
    #[error("{object} is owned by multiple objects via internal dependencies")]
    MultipleOwners { object: String },
    #[error("incorrect use of PIN dependency with {object}")]
    PinWithDepender { object: String },
    #[error("unrecognized object class id `{0}`")]
    UnknownClass(Oid),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("must specify at least one column")]
    ZeroColumnIndex,
    #[error("too few expressions supplied: {found} for {expected} expression columns")]
    TooFewExpressions { expected: usize, found: usize },
    #[error("{found} operator classes specified for {expected} index columns")]
    OpclassMismatch { expected: usize, found: usize },
    #[error("permission denied: `{0}` is a system catalog")]
    SystemCatalog(Box<str>),
    #[error("shared indexes cannot be created after bootstrap")]
    SharedAfterBootstrap,
    #[error("column `{column}` of relation `{relation}` does not exist")]
    ColumnOutOfRange { relation: Oid, column: SubId },
    #[error("access method with id `{0}` not found")]
    AmNotFound(Oid),
    #[error("operator class with id `{0}` not found")]
    OpclassNotFound(Oid),
    #[error("index with id `{0}` not found")]
    IndexNotFound(Oid),
    #[error("`{0}` is not an index")]
    NotAnIndex(Box<str>),
    #[error("type with id `{0}` does not exist")]
    UndefinedType(Oid),
    #[error("index `{0}` is not usable while it is being rebuilt")]
    Unusable(Oid),
}

#[derive(Error, Debug)]
pub enum ExprError {
    #[error("invalid varlevelsup {levels} at range table depth {depth}")]
    InvalidVarLevelsUp { levels: u32, depth: usize },
    #[error("invalid varno {0}")]
    InvalidVarNo(u32),
    #[error("column {attno} of relation `{relation}` does not exist")]
    InvalidVarAttNo { relation: Oid, attno: SubId },
    #[error("unsupported construct in expression: {0}")]
    UnsupportedConstruct(&'static str),
    #[error("cannot evaluate expression node: {0}")]
    CannotEvaluate(&'static str),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl From<InvalidFieldError> for CatalogError {
    fn from(err: InvalidFieldError) -> Self {
        StoreError::from(err).into()
    }
}

/// Shorthand result type for tests.
pub type ResultTest<T = ()> = anyhow::Result<T>;
