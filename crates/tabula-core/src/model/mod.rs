//! Runtime table metadata.
//!
//! Backends describe their tables with these types; the binder reads them
//! to decide which accessors to install.
pub mod column;
pub mod table;

pub use column::{ColumnKind, ColumnModel};
pub use table::{TableModel, TableModelError};
