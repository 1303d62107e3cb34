//! Catalog of canonical dataset columns.

mod schema;

pub use schema::{
    columns, ColumnCatalog, ColumnDef, DerivedLevel, LevelBins, SemanticType, LEVEL_LABELS,
};
