use crate::model::column::{ColumnKind, ColumnModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// TableModelError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TableModelError {
    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}' primary key names unknown column '{column}'")]
    UnknownKeyColumn { table: String, column: String },

    #[error("table '{table}' has no columns")]
    NoColumns { table: String },
}

///
/// TableModel
///
/// Ordered column list plus the primary-key subset.
/// Column order is declaration order and is authoritative for accessors.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableModel {
    name: String,
    columns: Vec<ColumnModel>,
    primary_key: Vec<String>,
}

impl TableModel {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnModel>,
        primary_key: Vec<String>,
    ) -> Result<Self, TableModelError> {
        let name = name.into();

        if columns.is_empty() {
            return Err(TableModelError::NoColumns { table: name });
        }

        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableModelError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }

        if let Some(missing) = primary_key.iter().find(|pk| !seen.contains(pk.as_str())) {
            return Err(TableModelError::UnknownKeyColumn {
                table: name,
                column: missing.clone(),
            });
        }

        Ok(Self {
            name,
            columns,
            primary_key,
        })
    }

    /// Start a builder for a table with the given name.
    pub fn builder(name: impl Into<String>) -> TableModelBuilder {
        TableModelBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnModel] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    #[must_use]
    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == name)
    }
}

///
/// TableModelBuilder
///

#[derive(Debug)]
pub struct TableModelBuilder {
    name: String,
    columns: Vec<ColumnModel>,
    primary_key: Vec<String>,
}

impl TableModelBuilder {
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push(ColumnModel::new(name, kind));
        self
    }

    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(ToString::to_string).collect();
        self
    }

    pub fn build(self) -> Result<TableModel, TableModelError> {
        TableModel::new(self.name, self.columns, self.primary_key)
    }
}
