//! Keyword-style parameter bags for binding and object construction.
//!
//! Every malformed-argument condition in the crate is reported as a
//! [`ParameterError`], so callers have a single failure shape to match on.
mod schema;


pub use schema::{ParamShape, ParamSpec, validate_params};

use crate::{
    backend::{RowHandle, TableHandle},
    model::ColumnKind,
    value::Value,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ValueMap
/// Column name → value, ordered by name.
///

pub type ValueMap = BTreeMap<String, Value>;

///
/// ParameterError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParameterError {
    #[error("missing required parameter '{name}'")]
    MissingParam { name: String },

    #[error("unknown parameter '{name}'")]
    UnknownParam { name: String },

    #[error("parameter '{name}' must be {expected}, found {found}")]
    ShapeMismatch {
        name: String,
        expected: ParamShape,
        found: ParamShape,
    },

    #[error("skip entry {index} must be a column name, found {found}")]
    SkipEntryNotText { index: usize, found: &'static str },

    #[error("skip names unknown column '{column}' of table '{table}'")]
    UnknownSkipColumn { table: String, column: String },

    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("column '{column}' expects {expected}, found {found}")]
    KindMismatch {
        column: String,
        expected: ColumnKind,
        found: &'static str,
    },

    #[error("primary key column '{column}' cannot be null")]
    NullPrimaryKey { column: String },

    #[error("object row belongs to table '{found}', expected '{expected}'")]
    ForeignRow { expected: String, found: String },

    #[error("class '{class}' declares accessor '{column}' but table '{table}' does not provide it")]
    UndeclaredAccessor {
        class: String,
        table: String,
        column: String,
    },

    #[error("class '{class}' has no accessor '{name}'")]
    NoAccessor { class: String, name: String },
}

///
/// Param
/// One loosely-typed parameter value.
///

#[derive(Clone, Debug)]
pub enum Param {
    Value(Value),
    List(Vec<Value>),
    Row(RowHandle),
    Table(TableHandle),
}

impl Param {
    #[must_use]
    pub const fn shape(&self) -> ParamShape {
        match self {
            Self::Value(_) => ParamShape::Value,
            Self::List(_) => ParamShape::List,
            Self::Row(_) => ParamShape::Row,
            Self::Table(_) => ParamShape::Table,
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_row(&self) -> Option<&RowHandle> {
        match self {
            Self::Row(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_table(&self) -> Option<&TableHandle> {
        match self {
            Self::Table(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<Vec<Value>> for Param {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<RowHandle> for Param {
    fn from(v: RowHandle) -> Self {
        Self::Row(v)
    }
}

impl From<TableHandle> for Param {
    fn from(v: TableHandle) -> Self {
        Self::Table(v)
    }
}

///
/// Params
/// Named parameter bag, ordered by name.
///

#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: BTreeMap<String, Param>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a scalar value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, Param::Value(value.into()));
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, param: Param) -> Self {
        self.insert(name, param);
        self
    }

    #[must_use]
    pub fn with_list(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.insert(name, Param::List(values));
        self
    }

    #[must_use]
    pub fn with_row(mut self, name: impl Into<String>, row: RowHandle) -> Self {
        self.insert(name, Param::Row(row));
        self
    }

    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, table: TableHandle) -> Self {
        self.insert(name, Param::Table(table));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, param: impl Into<Param>) -> Option<Param> {
        self.entries.insert(name.into(), param.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Param> {
        self.entries.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Param::as_value)
    }

    #[must_use]
    pub fn row(&self, name: &str) -> Option<&RowHandle> {
        self.get(name).and_then(Param::as_row)
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableHandle> {
        self.get(name).and_then(Param::as_table)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<ValueMap> for Params {
    fn from(values: ValueMap) -> Self {
        values
            .into_iter()
            .map(|(k, v)| (k, Param::Value(v)))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Param)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Param)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
