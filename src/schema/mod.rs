//! Event schema types (nouns)
//!
//! The column registry and warehouse settings the compiler is parameterised by.

mod column;
mod registry;
mod settings;
mod types;

pub use column::{ColumnDef, ComputedColumn, SourceTable};
pub use registry::{SchemaRegistry, DEFAULT_TIMESTAMP_FIELD};
pub use settings::{CompilerSettings, DEFAULT_ROW_LIMIT};
pub use types::{DataType, ParseDataTypeError};
