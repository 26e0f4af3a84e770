//! Schema definitions and row types for the system tables, which store all
//! catalog metadata: relations and their columns, the scalar object classes
//! (types, functions, operators, …), the dependency registry, index
//! metadata, comments and statistics.
//!
//! When defining a new system table, remember to:
//! - Define constants for its oid and name.
//! - Add it to [`system_tables`].
//! - Use [`st_fields_enum`] to define its column enum.
//! - Define a function that returns its schema.
//! - Define a Rust struct which holds its rows, implement `From<...>` for
//!   [`Row`] and `TryFrom<RowRef<'_>>` for that struct.

use crate::db::datastore::schema::{ColumnSchema, TableSchema};
use crate::db::datastore::value::{oid_array, sub_array, Row, RowRef, Value, ValueKind};
use crate::db::depend::DepType;
use crate::error::CatalogError;
use relcat_primitives::{FileNode, Oid, SubId};
use strum::Display;

/// The static oid of the table that defines relations
pub const ST_CLASS_ID: Oid = Oid(1);
/// The static oid of the table that defines columns
pub const ST_ATTRIBUTE_ID: Oid = Oid(2);
/// The static oid of the table that defines schemas (namespaces)
pub const ST_NAMESPACE_ID: Oid = Oid(3);
/// The static oid of the table that defines data types
pub const ST_TYPE_ID: Oid = Oid(4);
/// The static oid of the table that defines functions
pub const ST_PROC_ID: Oid = Oid(5);
/// The static oid of the table that defines procedural languages
pub const ST_LANGUAGE_ID: Oid = Oid(6);
/// The static oid of the table that defines operators
pub const ST_OPERATOR_ID: Oid = Oid(7);
/// The static oid of the table that defines operator classes
pub const ST_OPCLASS_ID: Oid = Oid(8);
/// The static oid of the table that defines casts
pub const ST_CAST_ID: Oid = Oid(9);
/// The static oid of the table that defines encoding conversions
pub const ST_CONVERSION_ID: Oid = Oid(10);
/// The static oid of the table that defines constraints
pub const ST_CONSTRAINT_ID: Oid = Oid(11);
/// The static oid of the table that defines column defaults
pub const ST_ATTRDEF_ID: Oid = Oid(12);
/// The static oid of the table that defines rewrite rules
pub const ST_REWRITE_ID: Oid = Oid(13);
/// The static oid of the table that defines triggers
pub const ST_TRIGGER_ID: Oid = Oid(14);
/// The static oid of the table that records dependency edges
pub const ST_DEPEND_ID: Oid = Oid(15);
/// The static oid of the table that records index metadata
pub const ST_INDEX_ID: Oid = Oid(16);
/// The static oid of the table that records comments on objects
pub const ST_DESCRIPTION_ID: Oid = Oid(17);
/// The static oid of the table that records per-column statistics
pub const ST_STATISTIC_ID: Oid = Oid(18);

pub const ST_CLASS_NAME: &str = "st_class";
pub const ST_ATTRIBUTE_NAME: &str = "st_attribute";
pub const ST_NAMESPACE_NAME: &str = "st_namespace";
pub const ST_TYPE_NAME: &str = "st_type";
pub const ST_PROC_NAME: &str = "st_proc";
pub const ST_LANGUAGE_NAME: &str = "st_language";
pub const ST_OPERATOR_NAME: &str = "st_operator";
pub const ST_OPCLASS_NAME: &str = "st_opclass";
pub const ST_CAST_NAME: &str = "st_cast";
pub const ST_CONVERSION_NAME: &str = "st_conversion";
pub const ST_CONSTRAINT_NAME: &str = "st_constraint";
pub const ST_ATTRDEF_NAME: &str = "st_attrdef";
pub const ST_REWRITE_NAME: &str = "st_rewrite";
pub const ST_TRIGGER_NAME: &str = "st_trigger";
pub const ST_DEPEND_NAME: &str = "st_depend";
pub const ST_INDEX_NAME: &str = "st_index";
pub const ST_DESCRIPTION_NAME: &str = "st_description";
pub const ST_STATISTIC_NAME: &str = "st_statistic";

// Built-in objects seeded (and pinned) at bootstrap.
pub const NAMESPACE_SYSTEM_OID: Oid = Oid(30);
pub const NAMESPACE_PUBLIC_OID: Oid = Oid(31);
pub const TYPE_BOOL_OID: Oid = Oid(40);
pub const TYPE_INT4_OID: Oid = Oid(41);
pub const TYPE_INT8_OID: Oid = Oid(42);
pub const TYPE_TEXT_OID: Oid = Oid(43);
pub const TYPE_OID_OID: Oid = Oid(44);
pub const TYPE_BYTEA_OID: Oid = Oid(45);
pub const LANGUAGE_INTERNAL_OID: Oid = Oid(50);
pub const PROC_INT4_EQ_OID: Oid = Oid(60);
pub const PROC_INT4_LT_OID: Oid = Oid(61);
pub const PROC_INT4_GT_OID: Oid = Oid(62);
pub const PROC_TEXT_EQ_OID: Oid = Oid(63);
pub const OPERATOR_INT4_EQ_OID: Oid = Oid(70);
pub const OPERATOR_INT4_LT_OID: Oid = Oid(71);
pub const OPERATOR_INT4_GT_OID: Oid = Oid(72);
pub const OPERATOR_TEXT_EQ_OID: Oid = Oid(73);
pub const BTREE_AM_OID: Oid = Oid(80);
pub const OPCLASS_INT4_OPS_OID: Oid = Oid(90);
pub const OPCLASS_TEXT_OPS_OID: Oid = Oid(91);

/// Oids below this are reserved for objects created at bootstrap.
pub const FIRST_NORMAL_OID: Oid = Oid(1000);

// This helps to keep the correct order when bootstrapping.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Display)]
pub enum SystemTable {
    st_class,
    st_attribute,
    st_namespace,
    st_type,
    st_proc,
    st_language,
    st_operator,
    st_opclass,
    st_cast,
    st_conversion,
    st_constraint,
    st_attrdef,
    st_rewrite,
    st_trigger,
    st_depend,
    st_index,
    st_description,
    st_statistic,
}

impl SystemTable {
    pub fn of(oid: Oid) -> Option<SystemTable> {
        Some(match oid {
            ST_CLASS_ID => SystemTable::st_class,
            ST_ATTRIBUTE_ID => SystemTable::st_attribute,
            ST_NAMESPACE_ID => SystemTable::st_namespace,
            ST_TYPE_ID => SystemTable::st_type,
            ST_PROC_ID => SystemTable::st_proc,
            ST_LANGUAGE_ID => SystemTable::st_language,
            ST_OPERATOR_ID => SystemTable::st_operator,
            ST_OPCLASS_ID => SystemTable::st_opclass,
            ST_CAST_ID => SystemTable::st_cast,
            ST_CONVERSION_ID => SystemTable::st_conversion,
            ST_CONSTRAINT_ID => SystemTable::st_constraint,
            ST_ATTRDEF_ID => SystemTable::st_attrdef,
            ST_REWRITE_ID => SystemTable::st_rewrite,
            ST_TRIGGER_ID => SystemTable::st_trigger,
            ST_DEPEND_ID => SystemTable::st_depend,
            ST_INDEX_ID => SystemTable::st_index,
            ST_DESCRIPTION_ID => SystemTable::st_description,
            ST_STATISTIC_ID => SystemTable::st_statistic,
            _ => return None,
        })
    }
}

pub fn system_tables() -> [TableSchema; 18] {
    [
        st_class_schema(),
        st_attribute_schema(),
        st_namespace_schema(),
        st_type_schema(),
        st_proc_schema(),
        st_language_schema(),
        st_operator_schema(),
        st_opclass_schema(),
        st_cast_schema(),
        st_conversion_schema(),
        st_constraint_schema(),
        st_attrdef_schema(),
        st_rewrite_schema(),
        st_trigger_schema(),
        st_depend_schema(),
        st_index_schema(),
        st_description_schema(),
        st_statistic_schema(),
    ]
}

macro_rules! st_fields_enum {
    ($(#[$attr:meta])* enum $ty_name:ident { $($name:expr, $var:ident = $discr:expr,)* }) => {
        #[derive(Copy, Clone, Debug)]
        $(#[$attr])*
        pub enum $ty_name {
            $($var = $discr,)*
        }

        impl $ty_name {
            #[inline]
            pub fn col_idx(self) -> usize {
                self as usize
            }

            #[inline]
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$var => $name,)*
                }
            }
        }
    }
}

// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StClassFields {
    "oid", Oid = 0,
    "rel_name", RelName = 1,
    "rel_namespace", RelNamespace = 2,
    "rel_kind", RelKind = 3,
    "rel_has_index", RelHasIndex = 4,
    "rel_has_pkey", RelHasPkey = 5,
    "rel_filenode", RelFilenode = 6,
    "rel_pages", RelPages = 7,
    "rel_tuples", RelTuples = 8,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StAttributeFields {
    "rel_oid", RelOid = 0,
    "col_pos", ColPos = 1,
    "col_name", ColName = 2,
    "type_oid", TypeOid = 3,
    "is_dropped", IsDropped = 4,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StNamespaceFields {
    "oid", Oid = 0,
    "name", Name = 1,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StTypeFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "namespace", Namespace = 2,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StProcFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "namespace", Namespace = 2,
    "arg_types", ArgTypes = 3,
    "ret_type", RetType = 4,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StLanguageFields {
    "oid", Oid = 0,
    "name", Name = 1,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StOperatorFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "left_type", LeftType = 2,
    "right_type", RightType = 3,
    "result_type", ResultType = 4,
    "proc_oid", ProcOid = 5,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StOpclassFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "namespace", Namespace = 2,
    "am_oid", AmOid = 3,
    "input_type", InputType = 4,
    "key_type", KeyType = 5,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StCastFields {
    "oid", Oid = 0,
    "source_type", SourceType = 1,
    "target_type", TargetType = 2,
    "func_oid", FuncOid = 3,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StConversionFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "namespace", Namespace = 2,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StConstraintFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "rel_oid", RelOid = 2,
    "kind", Kind = 3,
    "key_cols", KeyCols = 4,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StAttrdefFields {
    "oid", Oid = 0,
    "rel_oid", RelOid = 1,
    "col_pos", ColPos = 2,
    "expr", Expr = 3,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StRewriteFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "rel_oid", RelOid = 2,
    "query", Query = 3,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StTriggerFields {
    "oid", Oid = 0,
    "name", Name = 1,
    "rel_oid", RelOid = 2,
    "func_oid", FuncOid = 3,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StDependFields {
    "dep_class", DepClass = 0,
    "dep_oid", DepOid = 1,
    "dep_sub", DepSub = 2,
    "ref_class", RefClass = 3,
    "ref_oid", RefOid = 4,
    "ref_sub", RefSub = 5,
    "dep_type", DepTypeCol = 6,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StIndexFields {
    "index_oid", IndexOid = 0,
    "heap_oid", HeapOid = 1,
    "num_atts", NumAtts = 2,
    "key_cols", KeyCols = 3,
    "class_oids", ClassOids = 4,
    "is_unique", IsUnique = 5,
    "is_primary", IsPrimary = 6,
    "is_clustered", IsClustered = 7,
    "predicate", Predicate = 8,
    "expressions", Expressions = 9,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StDescriptionFields {
    "class_oid", ClassOid = 0,
    "obj_oid", ObjOid = 1,
    "sub", Sub = 2,
    "description", Description = 3,
});
// WARNING: For a stable catalog, don't change the field names and discriminants.
st_fields_enum!(enum StStatisticFields {
    "rel_oid", RelOid = 0,
    "col_pos", ColPos = 1,
    "n_distinct", NDistinct = 2,
});

fn col(field_name: &str, kind: ValueKind) -> ColumnSchema {
    ColumnSchema::new(field_name, kind)
}

/// System table [ST_CLASS_NAME]
///
/// | oid | rel_name | rel_namespace | rel_kind | rel_has_index | rel_has_pkey | rel_filenode | rel_pages | rel_tuples |
/// |-----|----------|---------------|----------|---------------|--------------|--------------|-----------|------------|
/// | 77  | "orders" | 31            | 'r'      | true          | false        | 5            | 0         | 0          |
fn st_class_schema() -> TableSchema {
    TableSchema::new(
        ST_CLASS_ID,
        ST_CLASS_NAME,
        vec![
            col(StClassFields::Oid.name(), ValueKind::U32),
            col(StClassFields::RelName.name(), ValueKind::String),
            col(StClassFields::RelNamespace.name(), ValueKind::U32),
            col(StClassFields::RelKind.name(), ValueKind::U8),
            col(StClassFields::RelHasIndex.name(), ValueKind::Bool),
            col(StClassFields::RelHasPkey.name(), ValueKind::Bool),
            col(StClassFields::RelFilenode.name(), ValueKind::U32),
            col(StClassFields::RelPages.name(), ValueKind::U32),
            col(StClassFields::RelTuples.name(), ValueKind::U64),
        ],
    )
}

fn st_attribute_schema() -> TableSchema {
    TableSchema::new(
        ST_ATTRIBUTE_ID,
        ST_ATTRIBUTE_NAME,
        vec![
            col(StAttributeFields::RelOid.name(), ValueKind::U32),
            col(StAttributeFields::ColPos.name(), ValueKind::U32),
            col(StAttributeFields::ColName.name(), ValueKind::String),
            col(StAttributeFields::TypeOid.name(), ValueKind::U32),
            col(StAttributeFields::IsDropped.name(), ValueKind::Bool),
        ],
    )
}

fn st_namespace_schema() -> TableSchema {
    TableSchema::new(
        ST_NAMESPACE_ID,
        ST_NAMESPACE_NAME,
        vec![
            col(StNamespaceFields::Oid.name(), ValueKind::U32),
            col(StNamespaceFields::Name.name(), ValueKind::String),
        ],
    )
}

fn st_type_schema() -> TableSchema {
    TableSchema::new(
        ST_TYPE_ID,
        ST_TYPE_NAME,
        vec![
            col(StTypeFields::Oid.name(), ValueKind::U32),
            col(StTypeFields::Name.name(), ValueKind::String),
            col(StTypeFields::Namespace.name(), ValueKind::U32),
        ],
    )
}

fn st_proc_schema() -> TableSchema {
    TableSchema::new(
        ST_PROC_ID,
        ST_PROC_NAME,
        vec![
            col(StProcFields::Oid.name(), ValueKind::U32),
            col(StProcFields::Name.name(), ValueKind::String),
            col(StProcFields::Namespace.name(), ValueKind::U32),
            col(StProcFields::ArgTypes.name(), ValueKind::Array),
            col(StProcFields::RetType.name(), ValueKind::U32),
        ],
    )
}

fn st_language_schema() -> TableSchema {
    TableSchema::new(
        ST_LANGUAGE_ID,
        ST_LANGUAGE_NAME,
        vec![
            col(StLanguageFields::Oid.name(), ValueKind::U32),
            col(StLanguageFields::Name.name(), ValueKind::String),
        ],
    )
}

fn st_operator_schema() -> TableSchema {
    TableSchema::new(
        ST_OPERATOR_ID,
        ST_OPERATOR_NAME,
        vec![
            col(StOperatorFields::Oid.name(), ValueKind::U32),
            col(StOperatorFields::Name.name(), ValueKind::String),
            col(StOperatorFields::LeftType.name(), ValueKind::U32),
            col(StOperatorFields::RightType.name(), ValueKind::U32),
            col(StOperatorFields::ResultType.name(), ValueKind::U32),
            col(StOperatorFields::ProcOid.name(), ValueKind::U32),
        ],
    )
}

fn st_opclass_schema() -> TableSchema {
    TableSchema::new(
        ST_OPCLASS_ID,
        ST_OPCLASS_NAME,
        vec![
            col(StOpclassFields::Oid.name(), ValueKind::U32),
            col(StOpclassFields::Name.name(), ValueKind::String),
            col(StOpclassFields::Namespace.name(), ValueKind::U32),
            col(StOpclassFields::AmOid.name(), ValueKind::U32),
            col(StOpclassFields::InputType.name(), ValueKind::U32),
            col(StOpclassFields::KeyType.name(), ValueKind::U32),
        ],
    )
}

fn st_cast_schema() -> TableSchema {
    TableSchema::new(
        ST_CAST_ID,
        ST_CAST_NAME,
        vec![
            col(StCastFields::Oid.name(), ValueKind::U32),
            col(StCastFields::SourceType.name(), ValueKind::U32),
            col(StCastFields::TargetType.name(), ValueKind::U32),
            col(StCastFields::FuncOid.name(), ValueKind::U32),
        ],
    )
}

fn st_conversion_schema() -> TableSchema {
    TableSchema::new(
        ST_CONVERSION_ID,
        ST_CONVERSION_NAME,
        vec![
            col(StConversionFields::Oid.name(), ValueKind::U32),
            col(StConversionFields::Name.name(), ValueKind::String),
            col(StConversionFields::Namespace.name(), ValueKind::U32),
        ],
    )
}

fn st_constraint_schema() -> TableSchema {
    TableSchema::new(
        ST_CONSTRAINT_ID,
        ST_CONSTRAINT_NAME,
        vec![
            col(StConstraintFields::Oid.name(), ValueKind::U32),
            col(StConstraintFields::Name.name(), ValueKind::String),
            col(StConstraintFields::RelOid.name(), ValueKind::U32),
            col(StConstraintFields::Kind.name(), ValueKind::U8),
            col(StConstraintFields::KeyCols.name(), ValueKind::Array),
        ],
    )
}

fn st_attrdef_schema() -> TableSchema {
    TableSchema::new(
        ST_ATTRDEF_ID,
        ST_ATTRDEF_NAME,
        vec![
            col(StAttrdefFields::Oid.name(), ValueKind::U32),
            col(StAttrdefFields::RelOid.name(), ValueKind::U32),
            col(StAttrdefFields::ColPos.name(), ValueKind::U32),
            col(StAttrdefFields::Expr.name(), ValueKind::Bytes),
        ],
    )
}

fn st_rewrite_schema() -> TableSchema {
    TableSchema::new(
        ST_REWRITE_ID,
        ST_REWRITE_NAME,
        vec![
            col(StRewriteFields::Oid.name(), ValueKind::U32),
            col(StRewriteFields::Name.name(), ValueKind::String),
            col(StRewriteFields::RelOid.name(), ValueKind::U32),
            col(StRewriteFields::Query.name(), ValueKind::Bytes),
        ],
    )
}

fn st_trigger_schema() -> TableSchema {
    TableSchema::new(
        ST_TRIGGER_ID,
        ST_TRIGGER_NAME,
        vec![
            col(StTriggerFields::Oid.name(), ValueKind::U32),
            col(StTriggerFields::Name.name(), ValueKind::String),
            col(StTriggerFields::RelOid.name(), ValueKind::U32),
            col(StTriggerFields::FuncOid.name(), ValueKind::U32),
        ],
    )
}

/// System table [ST_DEPEND_NAME]
///
/// | dep_class | dep_oid | dep_sub | ref_class | ref_oid | ref_sub | dep_type |
/// |-----------|---------|---------|-----------|---------|---------|----------|
/// | 1         | 1201    | 0       | 1         | 1200    | 2       | 'a'      |
///
/// PIN rows carry zeroes in all three depender fields.
fn st_depend_schema() -> TableSchema {
    TableSchema::new(
        ST_DEPEND_ID,
        ST_DEPEND_NAME,
        vec![
            col(StDependFields::DepClass.name(), ValueKind::U32),
            col(StDependFields::DepOid.name(), ValueKind::U32),
            col(StDependFields::DepSub.name(), ValueKind::U32),
            col(StDependFields::RefClass.name(), ValueKind::U32),
            col(StDependFields::RefOid.name(), ValueKind::U32),
            col(StDependFields::RefSub.name(), ValueKind::U32),
            col(StDependFields::DepTypeCol.name(), ValueKind::U8),
        ],
    )
}

/// System table [ST_INDEX_NAME]
///
/// A zero in `key_cols` marks an expression column; the expression list and
/// the (explicit-AND) predicate are stored serialized.
fn st_index_schema() -> TableSchema {
    TableSchema::new(
        ST_INDEX_ID,
        ST_INDEX_NAME,
        vec![
            col(StIndexFields::IndexOid.name(), ValueKind::U32),
            col(StIndexFields::HeapOid.name(), ValueKind::U32),
            col(StIndexFields::NumAtts.name(), ValueKind::U32),
            col(StIndexFields::KeyCols.name(), ValueKind::Array),
            col(StIndexFields::ClassOids.name(), ValueKind::Array),
            col(StIndexFields::IsUnique.name(), ValueKind::Bool),
            col(StIndexFields::IsPrimary.name(), ValueKind::Bool),
            col(StIndexFields::IsClustered.name(), ValueKind::Bool),
            col(StIndexFields::Predicate.name(), ValueKind::Bytes),
            col(StIndexFields::Expressions.name(), ValueKind::Bytes),
        ],
    )
}

fn st_description_schema() -> TableSchema {
    TableSchema::new(
        ST_DESCRIPTION_ID,
        ST_DESCRIPTION_NAME,
        vec![
            col(StDescriptionFields::ClassOid.name(), ValueKind::U32),
            col(StDescriptionFields::ObjOid.name(), ValueKind::U32),
            col(StDescriptionFields::Sub.name(), ValueKind::U32),
            col(StDescriptionFields::Description.name(), ValueKind::String),
        ],
    )
}

fn st_statistic_schema() -> TableSchema {
    TableSchema::new(
        ST_STATISTIC_ID,
        ST_STATISTIC_NAME,
        vec![
            col(StStatisticFields::RelOid.name(), ValueKind::U32),
            col(StStatisticFields::ColPos.name(), ValueKind::U32),
            col(StStatisticFields::NDistinct.name(), ValueKind::U32),
        ],
    )
}

/// What a relation is. Stored as a one-byte tag in `st_class.rel_kind`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RelKind {
    Relation,
    Index,
    Sequence,
    View,
    Toast,
    Composite,
    Special,
}

impl RelKind {
    pub fn as_u8(self) -> u8 {
        match self {
            RelKind::Relation => b'r',
            RelKind::Index => b'i',
            RelKind::Sequence => b'S',
            RelKind::View => b'v',
            RelKind::Toast => b't',
            RelKind::Composite => b'c',
            RelKind::Special => b's',
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            b'r' => RelKind::Relation,
            b'i' => RelKind::Index,
            b'S' => RelKind::Sequence,
            b'v' => RelKind::View,
            b't' => RelKind::Toast,
            b'c' => RelKind::Composite,
            b's' => RelKind::Special,
            _ => return None,
        })
    }

    /// The noun used when describing a relation of this kind.
    pub fn describe_word(self) -> &'static str {
        match self {
            RelKind::Relation => "table",
            RelKind::Index => "index",
            RelKind::Sequence => "sequence",
            RelKind::View => "view",
            RelKind::Toast => "toast table",
            RelKind::Composite => "composite type",
            RelKind::Special => "special relation",
        }
    }
}

/// Constraint kinds, stored as a one-byte tag in `st_constraint.kind`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Primary,
    Unique,
    Exclusion,
    Check,
    Foreign,
}

impl ConstraintKind {
    pub fn as_u8(self) -> u8 {
        match self {
            ConstraintKind::Primary => b'p',
            ConstraintKind::Unique => b'u',
            ConstraintKind::Exclusion => b'x',
            ConstraintKind::Check => b'c',
            ConstraintKind::Foreign => b'f',
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            b'p' => ConstraintKind::Primary,
            b'u' => ConstraintKind::Unique,
            b'x' => ConstraintKind::Exclusion,
            b'c' => ConstraintKind::Check,
            b'f' => ConstraintKind::Foreign,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StClassRow {
    pub oid: Oid,
    pub rel_name: Box<str>,
    pub rel_namespace: Oid,
    pub rel_kind: RelKind,
    pub rel_has_index: bool,
    pub rel_has_pkey: bool,
    pub rel_filenode: FileNode,
    pub rel_pages: u32,
    pub rel_tuples: u64,
}

impl From<StClassRow> for Row {
    fn from(x: StClassRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.rel_name.into(),
            x.rel_namespace.into(),
            Value::U8(x.rel_kind.as_u8()),
            x.rel_has_index.into(),
            x.rel_has_pkey.into(),
            Value::U32(x.rel_filenode.0),
            x.rel_pages.into(),
            x.rel_tuples.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StClassRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        let kind_tag = row.u8_at(StClassFields::RelKind.col_idx())?;
        Ok(Self {
            oid: row.oid_at(StClassFields::Oid.col_idx())?,
            rel_name: row.str_at(StClassFields::RelName.col_idx())?.into(),
            rel_namespace: row.oid_at(StClassFields::RelNamespace.col_idx())?,
            rel_kind: RelKind::from_u8(kind_tag)
                .ok_or_else(|| CatalogError::Internal(format!("unrecognized relation kind `{kind_tag}`")))?,
            rel_has_index: row.bool_at(StClassFields::RelHasIndex.col_idx())?,
            rel_has_pkey: row.bool_at(StClassFields::RelHasPkey.col_idx())?,
            rel_filenode: FileNode(row.u32_at(StClassFields::RelFilenode.col_idx())?),
            rel_pages: row.u32_at(StClassFields::RelPages.col_idx())?,
            rel_tuples: row.u64_at(StClassFields::RelTuples.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StAttributeRow {
    pub rel_oid: Oid,
    pub col_pos: SubId,
    pub col_name: Box<str>,
    pub type_oid: Oid,
    pub is_dropped: bool,
}

impl From<StAttributeRow> for Row {
    fn from(x: StAttributeRow) -> Self {
        Row::new(vec![
            x.rel_oid.into(),
            x.col_pos.into(),
            x.col_name.into(),
            x.type_oid.into(),
            x.is_dropped.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StAttributeRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            rel_oid: row.oid_at(StAttributeFields::RelOid.col_idx())?,
            col_pos: row.sub_at(StAttributeFields::ColPos.col_idx())?,
            col_name: row.str_at(StAttributeFields::ColName.col_idx())?.into(),
            type_oid: row.oid_at(StAttributeFields::TypeOid.col_idx())?,
            is_dropped: row.bool_at(StAttributeFields::IsDropped.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StNamespaceRow {
    pub oid: Oid,
    pub name: Box<str>,
}

impl From<StNamespaceRow> for Row {
    fn from(x: StNamespaceRow) -> Self {
        Row::new(vec![x.oid.into(), x.name.into()])
    }
}

impl TryFrom<RowRef<'_>> for StNamespaceRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StNamespaceFields::Oid.col_idx())?,
            name: row.str_at(StNamespaceFields::Name.col_idx())?.into(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StTypeRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub namespace: Oid,
}

impl From<StTypeRow> for Row {
    fn from(x: StTypeRow) -> Self {
        Row::new(vec![x.oid.into(), x.name.into(), x.namespace.into()])
    }
}

impl TryFrom<RowRef<'_>> for StTypeRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StTypeFields::Oid.col_idx())?,
            name: row.str_at(StTypeFields::Name.col_idx())?.into(),
            namespace: row.oid_at(StTypeFields::Namespace.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StProcRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub namespace: Oid,
    pub arg_types: Vec<Oid>,
    pub ret_type: Oid,
}

impl From<StProcRow> for Row {
    fn from(x: StProcRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.name.into(),
            x.namespace.into(),
            oid_array(&x.arg_types),
            x.ret_type.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StProcRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StProcFields::Oid.col_idx())?,
            name: row.str_at(StProcFields::Name.col_idx())?.into(),
            namespace: row.oid_at(StProcFields::Namespace.col_idx())?,
            arg_types: row.oid_array_at(StProcFields::ArgTypes.col_idx())?,
            ret_type: row.oid_at(StProcFields::RetType.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StLanguageRow {
    pub oid: Oid,
    pub name: Box<str>,
}

impl From<StLanguageRow> for Row {
    fn from(x: StLanguageRow) -> Self {
        Row::new(vec![x.oid.into(), x.name.into()])
    }
}

impl TryFrom<RowRef<'_>> for StLanguageRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StLanguageFields::Oid.col_idx())?,
            name: row.str_at(StLanguageFields::Name.col_idx())?.into(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StOperatorRow {
    pub oid: Oid,
    pub name: Box<str>,
    /// `Oid::ZERO` for a prefix operator.
    pub left_type: Oid,
    pub right_type: Oid,
    pub result_type: Oid,
    pub proc_oid: Oid,
}

impl From<StOperatorRow> for Row {
    fn from(x: StOperatorRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.name.into(),
            x.left_type.into(),
            x.right_type.into(),
            x.result_type.into(),
            x.proc_oid.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StOperatorRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StOperatorFields::Oid.col_idx())?,
            name: row.str_at(StOperatorFields::Name.col_idx())?.into(),
            left_type: row.oid_at(StOperatorFields::LeftType.col_idx())?,
            right_type: row.oid_at(StOperatorFields::RightType.col_idx())?,
            result_type: row.oid_at(StOperatorFields::ResultType.col_idx())?,
            proc_oid: row.oid_at(StOperatorFields::ProcOid.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StOpclassRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub namespace: Oid,
    pub am_oid: Oid,
    pub input_type: Oid,
    /// `Oid::ZERO` when the index key is stored as the input type.
    pub key_type: Oid,
}

impl From<StOpclassRow> for Row {
    fn from(x: StOpclassRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.name.into(),
            x.namespace.into(),
            x.am_oid.into(),
            x.input_type.into(),
            x.key_type.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StOpclassRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StOpclassFields::Oid.col_idx())?,
            name: row.str_at(StOpclassFields::Name.col_idx())?.into(),
            namespace: row.oid_at(StOpclassFields::Namespace.col_idx())?,
            am_oid: row.oid_at(StOpclassFields::AmOid.col_idx())?,
            input_type: row.oid_at(StOpclassFields::InputType.col_idx())?,
            key_type: row.oid_at(StOpclassFields::KeyType.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StCastRow {
    pub oid: Oid,
    pub source_type: Oid,
    pub target_type: Oid,
    pub func_oid: Oid,
}

impl From<StCastRow> for Row {
    fn from(x: StCastRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.source_type.into(),
            x.target_type.into(),
            x.func_oid.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StCastRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StCastFields::Oid.col_idx())?,
            source_type: row.oid_at(StCastFields::SourceType.col_idx())?,
            target_type: row.oid_at(StCastFields::TargetType.col_idx())?,
            func_oid: row.oid_at(StCastFields::FuncOid.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StConversionRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub namespace: Oid,
}

impl From<StConversionRow> for Row {
    fn from(x: StConversionRow) -> Self {
        Row::new(vec![x.oid.into(), x.name.into(), x.namespace.into()])
    }
}

impl TryFrom<RowRef<'_>> for StConversionRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StConversionFields::Oid.col_idx())?,
            name: row.str_at(StConversionFields::Name.col_idx())?.into(),
            namespace: row.oid_at(StConversionFields::Namespace.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StConstraintRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub rel_oid: Oid,
    pub kind: ConstraintKind,
    pub key_cols: Vec<SubId>,
}

impl From<StConstraintRow> for Row {
    fn from(x: StConstraintRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.name.into(),
            x.rel_oid.into(),
            Value::U8(x.kind.as_u8()),
            sub_array(&x.key_cols),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StConstraintRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        let kind_tag = row.u8_at(StConstraintFields::Kind.col_idx())?;
        Ok(Self {
            oid: row.oid_at(StConstraintFields::Oid.col_idx())?,
            name: row.str_at(StConstraintFields::Name.col_idx())?.into(),
            rel_oid: row.oid_at(StConstraintFields::RelOid.col_idx())?,
            kind: ConstraintKind::from_u8(kind_tag)
                .ok_or_else(|| CatalogError::Internal(format!("unrecognized constraint kind `{kind_tag}`")))?,
            key_cols: row.sub_array_at(StConstraintFields::KeyCols.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StAttrdefRow {
    pub oid: Oid,
    pub rel_oid: Oid,
    pub col_pos: SubId,
    pub expr: Vec<u8>,
}

impl From<StAttrdefRow> for Row {
    fn from(x: StAttrdefRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.rel_oid.into(),
            x.col_pos.into(),
            x.expr.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StAttrdefRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StAttrdefFields::Oid.col_idx())?,
            rel_oid: row.oid_at(StAttrdefFields::RelOid.col_idx())?,
            col_pos: row.sub_at(StAttrdefFields::ColPos.col_idx())?,
            expr: row.bytes_at(StAttrdefFields::Expr.col_idx())?.to_vec(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StRewriteRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub rel_oid: Oid,
    pub query: Vec<u8>,
}

impl From<StRewriteRow> for Row {
    fn from(x: StRewriteRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.name.into(),
            x.rel_oid.into(),
            x.query.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StRewriteRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StRewriteFields::Oid.col_idx())?,
            name: row.str_at(StRewriteFields::Name.col_idx())?.into(),
            rel_oid: row.oid_at(StRewriteFields::RelOid.col_idx())?,
            query: row.bytes_at(StRewriteFields::Query.col_idx())?.to_vec(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StTriggerRow {
    pub oid: Oid,
    pub name: Box<str>,
    pub rel_oid: Oid,
    pub func_oid: Oid,
}

impl From<StTriggerRow> for Row {
    fn from(x: StTriggerRow) -> Self {
        Row::new(vec![
            x.oid.into(),
            x.name.into(),
            x.rel_oid.into(),
            x.func_oid.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StTriggerRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            oid: row.oid_at(StTriggerFields::Oid.col_idx())?,
            name: row.str_at(StTriggerFields::Name.col_idx())?.into(),
            rel_oid: row.oid_at(StTriggerFields::RelOid.col_idx())?,
            func_oid: row.oid_at(StTriggerFields::FuncOid.col_idx())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StDependRow {
    pub dep_class: Oid,
    pub dep_oid: Oid,
    pub dep_sub: SubId,
    pub ref_class: Oid,
    pub ref_oid: Oid,
    pub ref_sub: SubId,
    pub dep_type: DepType,
}

impl From<StDependRow> for Row {
    fn from(x: StDependRow) -> Self {
        Row::new(vec![
            x.dep_class.into(),
            x.dep_oid.into(),
            x.dep_sub.into(),
            x.ref_class.into(),
            x.ref_oid.into(),
            x.ref_sub.into(),
            Value::U8(x.dep_type.as_u8()),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StDependRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            dep_class: row.oid_at(StDependFields::DepClass.col_idx())?,
            dep_oid: row.oid_at(StDependFields::DepOid.col_idx())?,
            dep_sub: row.sub_at(StDependFields::DepSub.col_idx())?,
            ref_class: row.oid_at(StDependFields::RefClass.col_idx())?,
            ref_oid: row.oid_at(StDependFields::RefOid.col_idx())?,
            ref_sub: row.sub_at(StDependFields::RefSub.col_idx())?,
            dep_type: DepType::try_from(row.u8_at(StDependFields::DepTypeCol.col_idx())?)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StIndexRow {
    pub index_oid: Oid,
    pub heap_oid: Oid,
    pub num_atts: u32,
    /// One entry per index column; zero marks an expression column.
    pub key_cols: Vec<SubId>,
    pub class_oids: Vec<Oid>,
    pub is_unique: bool,
    pub is_primary: bool,
    pub is_clustered: bool,
    pub predicate: Option<Vec<u8>>,
    pub expressions: Option<Vec<u8>>,
}

fn bytes_or_null(bytes: Option<Vec<u8>>) -> Value {
    match bytes {
        Some(b) => Value::Bytes(b.into()),
        None => Value::Null,
    }
}

impl From<StIndexRow> for Row {
    fn from(x: StIndexRow) -> Self {
        Row::new(vec![
            x.index_oid.into(),
            x.heap_oid.into(),
            x.num_atts.into(),
            sub_array(&x.key_cols),
            oid_array(&x.class_oids),
            x.is_unique.into(),
            x.is_primary.into(),
            x.is_clustered.into(),
            bytes_or_null(x.predicate),
            bytes_or_null(x.expressions),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StIndexRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            index_oid: row.oid_at(StIndexFields::IndexOid.col_idx())?,
            heap_oid: row.oid_at(StIndexFields::HeapOid.col_idx())?,
            num_atts: row.u32_at(StIndexFields::NumAtts.col_idx())?,
            key_cols: row.sub_array_at(StIndexFields::KeyCols.col_idx())?,
            class_oids: row.oid_array_at(StIndexFields::ClassOids.col_idx())?,
            is_unique: row.bool_at(StIndexFields::IsUnique.col_idx())?,
            is_primary: row.bool_at(StIndexFields::IsPrimary.col_idx())?,
            is_clustered: row.bool_at(StIndexFields::IsClustered.col_idx())?,
            predicate: row
                .bytes_opt_at(StIndexFields::Predicate.col_idx())?
                .map(|b| b.to_vec()),
            expressions: row
                .bytes_opt_at(StIndexFields::Expressions.col_idx())?
                .map(|b| b.to_vec()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StDescriptionRow {
    pub class_oid: Oid,
    pub obj_oid: Oid,
    pub sub: SubId,
    pub description: Box<str>,
}

impl From<StDescriptionRow> for Row {
    fn from(x: StDescriptionRow) -> Self {
        Row::new(vec![
            x.class_oid.into(),
            x.obj_oid.into(),
            x.sub.into(),
            x.description.into(),
        ])
    }
}

impl TryFrom<RowRef<'_>> for StDescriptionRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            class_oid: row.oid_at(StDescriptionFields::ClassOid.col_idx())?,
            obj_oid: row.oid_at(StDescriptionFields::ObjOid.col_idx())?,
            sub: row.sub_at(StDescriptionFields::Sub.col_idx())?,
            description: row.str_at(StDescriptionFields::Description.col_idx())?.into(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StStatisticRow {
    pub rel_oid: Oid,
    pub col_pos: SubId,
    pub n_distinct: u32,
}

impl From<StStatisticRow> for Row {
    fn from(x: StStatisticRow) -> Self {
        Row::new(vec![x.rel_oid.into(), x.col_pos.into(), x.n_distinct.into()])
    }
}

impl TryFrom<RowRef<'_>> for StStatisticRow {
    type Error = CatalogError;

    fn try_from(row_ref: RowRef<'_>) -> Result<Self, Self::Error> {
        let row = row_ref.row();
        Ok(Self {
            rel_oid: row.oid_at(StStatisticFields::RelOid.col_idx())?,
            col_pos: row.sub_at(StStatisticFields::ColPos.col_idx())?,
            n_distinct: row.u32_at(StStatisticFields::NDistinct.col_idx())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_oids_are_dense_and_ordered() {
        let schemas = system_tables();
        for (i, schema) in schemas.iter().enumerate() {
            assert_eq!(schema.table_id, Oid(i as u32 + 1), "{}", schema.table_name);
        }
    }

    #[test]
    fn class_row_round_trips() {
        let class_row = StClassRow {
            oid: Oid(1200),
            rel_name: "orders".into(),
            rel_namespace: NAMESPACE_PUBLIC_OID,
            rel_kind: RelKind::Relation,
            rel_has_index: false,
            rel_has_pkey: false,
            rel_filenode: FileNode(5),
            rel_pages: 0,
            rel_tuples: 0,
        };
        let row = Row::from(class_row.clone());
        let back = StClassRow::try_from(RowRef::new(relcat_primitives::RowId(1), &row)).unwrap();
        assert_eq!(back, class_row);
    }

    #[test]
    fn depend_row_round_trips() {
        let edge = StDependRow {
            dep_class: ST_CLASS_ID,
            dep_oid: Oid(1201),
            dep_sub: SubId::ZERO,
            ref_class: ST_CLASS_ID,
            ref_oid: Oid(1200),
            ref_sub: SubId(2),
            dep_type: DepType::Auto,
        };
        let row = Row::from(edge.clone());
        let back = StDependRow::try_from(RowRef::new(relcat_primitives::RowId(1), &row)).unwrap();
        assert_eq!(back, edge);
    }

    #[test]
    fn rel_kind_tags_are_stable() {
        for kind in [
            RelKind::Relation,
            RelKind::Index,
            RelKind::Sequence,
            RelKind::View,
            RelKind::Toast,
            RelKind::Composite,
            RelKind::Special,
        ] {
            assert_eq!(RelKind::from_u8(kind.as_u8()), Some(kind));
        }
        assert_eq!(RelKind::from_u8(b'?'), None);
    }

    #[test]
    fn index_row_null_columns() {
        let index_row = StIndexRow {
            index_oid: Oid(1300),
            heap_oid: Oid(1200),
            num_atts: 1,
            key_cols: vec![SubId(1)],
            class_oids: vec![OPCLASS_INT4_OPS_OID],
            is_unique: false,
            is_primary: false,
            is_clustered: false,
            predicate: None,
            expressions: None,
        };
        let row = Row::from(index_row.clone());
        let back = StIndexRow::try_from(RowRef::new(relcat_primitives::RowId(1), &row)).unwrap();
        assert_eq!(back, index_row);
    }
}
