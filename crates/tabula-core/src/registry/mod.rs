//! Capability registry.
//!
//! Process-wide table→class, class→attributes and class→binding maps.
//! Bindings and attributes are only ever added or overwritten. A table entry
//! is dropped only when its class moves to another table. One `RwLock`
//! serializes every read and write.

use crate::{
    bind::Binding,
    config::DuplicateTablePolicy,
    error::{Error, ErrorOrigin},
    traits::{ClassId, TableObject},
};
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

///
/// BindingError
///
/// Configuration faults: something is not bound the way an operation needs.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindingError {
    #[error("class '{class}' is not bound to any table")]
    UnboundClass { class: String },

    #[error("no class is bound to table '{table}'")]
    UnboundTable { table: String },

    #[error("table '{table}' is already bound to '{existing}', refusing '{incoming}'")]
    DuplicateTable {
        table: String,
        existing: String,
        incoming: String,
    },

    #[error("object of class '{found}' cannot be taken as '{expected}'")]
    ClassMismatch { expected: String, found: String },
}

///
/// Registry
///

#[derive(Debug, Default)]
pub struct Registry {
    tables: HashMap<String, ClassId>,
    attributes: HashMap<ClassId, Vec<String>>,
    bindings: HashMap<ClassId, Arc<Binding>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a binding. Returns the class previously bound to the same
    /// table, if it was a different one.
    pub fn register(
        &mut self,
        binding: Arc<Binding>,
        attributes: Vec<String>,
        policy: DuplicateTablePolicy,
    ) -> Result<Option<ClassId>, BindingError> {
        let class = binding.class();
        let table = binding.table_name().to_string();

        let previous = self.tables.get(&table).copied().filter(|c| *c != class);
        if let Some(existing) = previous {
            if policy == DuplicateTablePolicy::Reject {
                return Err(BindingError::DuplicateTable {
                    table,
                    existing: existing.to_string(),
                    incoming: class.to_string(),
                });
            }
            warn!(%table, %existing, incoming = %class, "table rebound to a different class");
        }

        // a class lives on one table at a time
        if let Some(old) = self.bindings.get(&class)
            && old.table_name() != table
            && self.tables.get(old.table_name()) == Some(&class)
        {
            debug!(%class, from = old.table_name(), to = %table, "class moved to another table");
            self.tables.remove(old.table_name());
        }

        self.tables.insert(table, class);
        self.extend_attributes(class, attributes);
        self.bindings.insert(class, binding);

        Ok(previous)
    }

    /// Append attribute names, keeping first-seen order and skipping names
    /// already recorded.
    pub fn extend_attributes(&mut self, class: ClassId, names: impl IntoIterator<Item = String>) {
        let list = self.attributes.entry(class).or_default();
        for name in names {
            if !list.contains(&name) {
                list.push(name);
            }
        }
    }

    #[must_use]
    pub fn table_to_class(&self, table: &str) -> Option<ClassId> {
        self.tables.get(table).copied()
    }

    #[must_use]
    pub fn attributes_of(&self, class: ClassId) -> Vec<String> {
        self.attributes.get(&class).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn binding_of(&self, class: ClassId) -> Option<Arc<Binding>> {
        self.bindings.get(&class).cloned()
    }

    /// Number of tables with a registered class.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

///
/// REGISTRY
/// the process-wide instance
///

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

fn registry_read() -> RwLockReadGuard<'static, Registry> {
    REGISTRY
        .read()
        .expect("registry RwLock poisoned while acquiring read lock")
}

fn registry_write() -> RwLockWriteGuard<'static, Registry> {
    REGISTRY
        .write()
        .expect("registry RwLock poisoned while acquiring write lock")
}

pub(crate) fn register(
    binding: Arc<Binding>,
    attributes: Vec<String>,
    policy: DuplicateTablePolicy,
) -> Result<Option<ClassId>, Error> {
    let class = binding.class();
    let replaced = registry_write()
        .register(binding, attributes, policy)
        .map_err(|err| Error::binding(ErrorOrigin::Registry, err))?;

    debug!(%class, "binding registered");

    Ok(replaced)
}

/// Class registered for `table`, if any.
#[must_use]
pub fn table_to_class(table: &str) -> Option<ClassId> {
    registry_read().table_to_class(table)
}

/// Attribute names recorded for `class`; empty when never bound.
#[must_use]
pub fn attributes_of(class: ClassId) -> Vec<String> {
    registry_read().attributes_of(class)
}

/// Latest binding for `class`.
#[must_use]
pub fn binding_of(class: ClassId) -> Option<Arc<Binding>> {
    registry_read().binding_of(class)
}

/// Latest binding for `class`, or a binding fault.
pub fn require_binding(class: ClassId) -> Result<Arc<Binding>, Error> {
    binding_of(class).ok_or_else(|| {
        Error::binding(
            ErrorOrigin::Registry,
            BindingError::UnboundClass {
                class: class.to_string(),
            },
        )
    })
}

/// Record an attribute of `C` that was produced outside column accessors.
/// `C` must already be bound.
pub fn record_attribute<C: TableObject>(name: impl Into<String>) -> Result<(), Error> {
    let class = C::class_id();
    let mut registry = registry_write();

    if registry.binding_of(class).is_none() {
        return Err(Error::binding(
            ErrorOrigin::Registry,
            BindingError::UnboundClass {
                class: class.to_string(),
            },
        ));
    }
    registry.extend_attributes(class, [name.into()]);

    Ok(())
}
