//! In-memory reference backend.
//!
//! Rows live in a `BTreeMap` keyed by primary-key values. Row handles read
//! through to the shared store on every access, so a handle always observes
//! the latest committed state of its row.

use crate::{
    backend::{BackendError, RowHandle, RowRef, RowSource, TableHandle, TableRef},
    model::{ColumnKind, ColumnModel, TableModel},
    params::ValueMap,
    value::Value,
};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
    sync::{Arc, Mutex, MutexGuard},
};
use ulid::Ulid;

type Key = Vec<Value>;

///
/// MemoryStore
///

#[derive(Debug, Default)]
struct MemoryStore {
    rows: BTreeMap<Key, ValueMap>,
    // next auto-increment value for a single uint key
    next_uint: u64,
    // hidden row ids for tables without a primary key
    next_row_id: u64,
    inserts: u64,
    lookups: u64,
}

///
/// Shared
/// Table model plus the store it guards.
///

#[derive(Debug)]
struct Shared {
    model: TableModel,
    store: Mutex<MemoryStore>,
}

impl Shared {
    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.store
            .lock()
            .expect("memory store mutex poisoned while acquiring lock")
    }

    fn table(&self) -> String {
        self.model.name().to_string()
    }

    fn check_values(&self, values: &ValueMap) -> Result<(), BackendError> {
        for (name, value) in values {
            let column = self
                .model
                .column(name)
                .ok_or_else(|| BackendError::UnknownColumn {
                    table: self.table(),
                    column: name.clone(),
                })?;

            if !column.accepts(value) {
                return Err(BackendError::TypeMismatch {
                    table: self.table(),
                    column: name.clone(),
                    found: value.label(),
                });
            }
        }

        Ok(())
    }

    // every declared column present, missing ones null
    fn full_row(&self, values: &ValueMap) -> ValueMap {
        self.model
            .columns()
            .iter()
            .map(|column| {
                let value = values.get(&column.name).cloned().unwrap_or(Value::Null);
                (column.name.clone(), value)
            })
            .collect()
    }

    fn generate_key(&self, store: &MemoryStore, column: &str) -> Option<Value> {
        if self.model.primary_key().len() != 1 {
            return None;
        }

        match self.model.column(column)?.kind {
            ColumnKind::Ulid => Some(Value::Ulid(Ulid::new())),
            ColumnKind::Uint => Some(Value::Uint(store.next_uint.max(1))),
            _ => None,
        }
    }

    fn assign_key(&self, store: &mut MemoryStore, row: &mut ValueMap) -> Result<Key, BackendError> {
        let pk = self.model.primary_key();

        if pk.is_empty() {
            store.next_row_id += 1;
            return Ok(vec![Value::Uint(store.next_row_id)]);
        }

        let mut key = Vec::with_capacity(pk.len());
        for column in pk {
            let value = match row.get(column) {
                Some(value) if !value.is_null() => value.clone(),
                _ => {
                    let generated = self.generate_key(store, column).ok_or_else(|| {
                        BackendError::MissingKey {
                            table: self.table(),
                            column: column.clone(),
                        }
                    })?;
                    row.insert(column.clone(), generated.clone());

                    generated
                }
            };
            key.push(value);
        }

        Ok(key)
    }
}

fn format_key(key: &[Value]) -> String {
    let parts: Vec<String> = key.iter().map(|v| format!("{v:?}")).collect();

    format!("({})", parts.join(", "))
}

///
/// MemoryTable
///
/// Cloning shares the underlying store.
///

#[derive(Clone, Debug)]
pub struct MemoryTable {
    shared: Arc<Shared>,
}

impl MemoryTable {
    #[must_use]
    pub fn new(model: TableModel) -> Self {
        Self {
            shared: Arc::new(Shared {
                model,
                store: Mutex::new(MemoryStore::default()),
            }),
        }
    }

    /// Type-erased handle for binding.
    #[must_use]
    pub fn handle(&self) -> TableHandle {
        Arc::new(self.clone())
    }

    #[must_use]
    pub fn model(&self) -> &TableModel {
        &self.shared.model
    }

    /// Open a cursor over a snapshot of the current keys, in key order.
    #[must_use]
    pub fn scan(&self) -> MemoryCursor {
        let keys: Vec<Key> = self.shared.store().rows.keys().cloned().collect();

        MemoryCursor {
            shared: Arc::clone(&self.shared),
            keys: keys.into_iter(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.store().rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful inserts since creation.
    #[must_use]
    pub fn insert_count(&self) -> u64 {
        self.shared.store().inserts
    }

    /// Number of primary-key lookups since creation.
    #[must_use]
    pub fn lookup_count(&self) -> u64 {
        self.shared.store().lookups
    }
}

impl TableRef for MemoryTable {
    fn name(&self) -> &str {
        self.shared.model.name()
    }

    fn columns(&self) -> &[ColumnModel] {
        self.shared.model.columns()
    }

    fn primary_key(&self) -> &[String] {
        self.shared.model.primary_key()
    }

    fn lookup(&self, key: &[Value]) -> Result<Option<RowHandle>, BackendError> {
        let expected = self.shared.model.primary_key().len();
        if key.len() != expected {
            return Err(BackendError::KeyArity {
                table: self.shared.table(),
                expected,
                found: key.len(),
            });
        }

        let mut store = self.shared.store();
        store.lookups += 1;
        if expected == 0 || !store.rows.contains_key(key) {
            return Ok(None);
        }
        drop(store);

        Ok(Some(Rc::new(MemoryRow::persisted(
            Arc::clone(&self.shared),
            key.to_vec(),
        ))))
    }

    fn insert(&self, values: &ValueMap) -> Result<RowHandle, BackendError> {
        self.shared.check_values(values)?;
        let mut row = self.shared.full_row(values);

        let mut store = self.shared.store();
        let key = self.shared.assign_key(&mut store, &mut row)?;
        if store.rows.contains_key(&key) {
            return Err(BackendError::DuplicateKey {
                table: self.shared.table(),
                key: format_key(&key),
            });
        }

        if !self.shared.model.primary_key().is_empty()
            && let [Value::Uint(n)] = key.as_slice()
        {
            store.next_uint = store.next_uint.max(n.saturating_add(1));
        }
        store.rows.insert(key.clone(), row);
        store.inserts += 1;
        drop(store);

        Ok(Rc::new(MemoryRow::persisted(Arc::clone(&self.shared), key)))
    }

    fn potential(&self, values: &ValueMap) -> Result<RowHandle, BackendError> {
        self.shared.check_values(values)?;
        let row = self.shared.full_row(values);

        Ok(Rc::new(MemoryRow::potential(Arc::clone(&self.shared), row)))
    }
}

///
/// RowState
///

#[derive(Debug)]
enum RowState {
    Persisted(Key),
    Potential(RefCell<ValueMap>),
}

///
/// MemoryRow
///

#[derive(Debug)]
pub struct MemoryRow {
    shared: Arc<Shared>,
    state: RowState,
}

impl MemoryRow {
    const fn persisted(shared: Arc<Shared>, key: Key) -> Self {
        Self {
            shared,
            state: RowState::Persisted(key),
        }
    }

    const fn potential(shared: Arc<Shared>, values: ValueMap) -> Self {
        Self {
            shared,
            state: RowState::Potential(RefCell::new(values)),
        }
    }

    fn require_column(&self, column: &str) -> Result<(), BackendError> {
        if self.shared.model.column(column).is_some() {
            Ok(())
        } else {
            Err(BackendError::UnknownColumn {
                table: self.shared.table(),
                column: column.to_string(),
            })
        }
    }

    fn not_live(&self) -> BackendError {
        BackendError::NotLive {
            table: self.shared.table(),
        }
    }
}

impl RowRef for MemoryRow {
    fn table_name(&self) -> &str {
        self.shared.model.name()
    }

    fn get(&self, column: &str) -> Result<Value, BackendError> {
        self.require_column(column)?;

        let value = match &self.state {
            RowState::Persisted(key) => {
                let store = self.shared.store();
                let row = store.rows.get(key).ok_or_else(|| self.not_live())?;

                row.get(column).cloned()
            }
            RowState::Potential(values) => values.borrow().get(column).cloned(),
        };

        Ok(value.unwrap_or(Value::Null))
    }

    fn update(&self, values: &ValueMap) -> Result<(), BackendError> {
        self.shared.check_values(values)?;

        match &self.state {
            RowState::Persisted(key) => {
                if let Some(column) = values.keys().find(|c| self.shared.model.is_key_column(c)) {
                    return Err(BackendError::KeyUpdate {
                        table: self.shared.table(),
                        column: column.clone(),
                    });
                }

                let mut store = self.shared.store();
                let row = store.rows.get_mut(key).ok_or_else(|| self.not_live())?;
                row.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            RowState::Potential(row) => {
                row.borrow_mut()
                    .extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        Ok(())
    }

    fn delete(&self) -> Result<(), BackendError> {
        match &self.state {
            RowState::Persisted(key) => {
                let mut store = self.shared.store();
                store.rows.remove(key).map(|_| ()).ok_or_else(|| self.not_live())
            }
            RowState::Potential(_) => Err(BackendError::Potential {
                table: self.shared.table(),
                operation: "delete",
            }),
        }
    }

    fn is_live(&self) -> bool {
        match &self.state {
            RowState::Persisted(key) => self.shared.store().rows.contains_key(key),
            RowState::Potential(_) => false,
        }
    }

    fn is_potential(&self) -> bool {
        matches!(self.state, RowState::Potential(_))
    }
}

///
/// MemoryCursor
///
/// Walks the keys captured when the cursor was opened. Rows deleted after
/// that point are skipped rather than reported.
///

#[derive(Debug)]
pub struct MemoryCursor {
    shared: Arc<Shared>,
    keys: std::vec::IntoIter<Key>,
}

impl RowSource for MemoryCursor {
    fn next_row(&mut self) -> Result<Option<RowHandle>, BackendError> {
        for key in self.keys.by_ref() {
            if self.shared.store().rows.contains_key(&key) {
                return Ok(Some(Rc::new(MemoryRow::persisted(
                    Arc::clone(&self.shared),
                    key,
                ))));
            }
        }

        Ok(None)
    }
}
