//! Storage collaborator boundary.
//!
//! The object layer never stores anything itself. Tables, rows and cursors
//! are consumed through the traits in this module; `memory` ships a
//! reference implementation.
#[cfg(feature = "memory")]
pub mod memory;
mod source;

pub use source::IterSource;

use crate::{model::ColumnModel, params::ValueMap, value::Value};
use std::{fmt, rc::Rc, sync::Arc};
use thiserror::Error as ThisError;

///
/// RowHandle
/// Owned reference to one backend row (persisted or potential).
///

pub type RowHandle = Rc<dyn RowRef>;

///
/// TableHandle
/// Shared reference to a backend table.
///

pub type TableHandle = Arc<dyn TableRef>;

///
/// BackendError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BackendError {
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("column '{column}' of table '{table}' cannot store {found}")]
    TypeMismatch {
        table: String,
        column: String,
        found: &'static str,
    },

    #[error("table '{table}' expects {expected} key values, found {found}")]
    KeyArity {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("table '{table}' insert is missing key column '{column}'")]
    MissingKey { table: String, column: String },

    #[error("table '{table}' already holds key {key}")]
    DuplicateKey { table: String, key: String },

    #[error("key column '{column}' of table '{table}' cannot be updated")]
    KeyUpdate { table: String, column: String },

    #[error("row of table '{table}' is no longer stored")]
    NotLive { table: String },

    #[error("potential row of table '{table}' does not support {operation}")]
    Potential {
        table: String,
        operation: &'static str,
    },

    #[error("storage failure: {0}")]
    Storage(String),
}

///
/// TableRef
///
/// A table as exposed by the storage backend.
///

pub trait TableRef: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Ordered column descriptors.
    fn columns(&self) -> &[ColumnModel];

    fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Primary-key column names, in key order.
    fn primary_key(&self) -> &[String];

    /// Look a row up by primary key. `Ok(None)` when nothing matches.
    fn lookup(&self, key: &[Value]) -> Result<Option<RowHandle>, BackendError>;

    /// Unconditionally insert a new row.
    fn insert(&self, values: &ValueMap) -> Result<RowHandle, BackendError>;

    /// Build a transient row that is not persisted.
    fn potential(&self, values: &ValueMap) -> Result<RowHandle, BackendError>;
}

///
/// RowRef
///

pub trait RowRef: fmt::Debug {
    /// Name of the table this row originates from.
    fn table_name(&self) -> &str;

    fn get(&self, column: &str) -> Result<Value, BackendError>;

    fn update(&self, values: &ValueMap) -> Result<(), BackendError>;

    fn delete(&self) -> Result<(), BackendError>;

    /// Whether the row is still stored.
    fn is_live(&self) -> bool;

    fn is_potential(&self) -> bool {
        false
    }
}

///
/// RowSource
/// Pull-based, single pass row iterator.
///

pub trait RowSource {
    fn next_row(&mut self) -> Result<Option<RowHandle>, BackendError>;
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn next_row(&mut self) -> Result<Option<RowHandle>, BackendError> {
        (**self).next_row()
    }
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn next_row(&mut self) -> Result<Option<RowHandle>, BackendError> {
        (**self).next_row()
    }
}
