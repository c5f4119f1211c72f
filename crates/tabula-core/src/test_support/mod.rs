//! Shared fixtures for unit tests.
//!
//! The registry is process-wide and tests run in parallel, so every helper
//! takes the table name from the caller.
use crate::{
    backend::memory::MemoryTable,
    model::{ColumnKind, TableModel},
    params::ValueMap,
    value::Value,
};

/// `(id uint pk, name text, age int)`
pub(crate) fn people_table(name: &str) -> MemoryTable {
    let model = TableModel::builder(name)
        .column("id", ColumnKind::Uint)
        .column("name", ColumnKind::Text)
        .column("age", ColumnKind::Int)
        .primary_key(&["id"])
        .build()
        .expect("people model should build");

    MemoryTable::new(model)
}

/// `(region text pk, code uint pk, label text)`
pub(crate) fn composite_table(name: &str) -> MemoryTable {
    let model = TableModel::builder(name)
        .column("region", ColumnKind::Text)
        .column("code", ColumnKind::Uint)
        .column("label", ColumnKind::Text)
        .primary_key(&["region", "code"])
        .build()
        .expect("composite model should build");

    MemoryTable::new(model)
}

pub(crate) fn values(pairs: &[(&str, Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub(crate) fn person(id: u64, name: &str, age: i64) -> ValueMap {
    values(&[
        ("id", Value::Uint(id)),
        ("name", Value::from(name)),
        ("age", Value::Int(age)),
    ])
}
