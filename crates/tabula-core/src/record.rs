use crate::{
    backend::RowHandle,
    bind::{Accessor, Binding},
    error::{Error, ErrorOrigin},
    params::{ParameterError, ValueMap},
    traits::ClassId,
    value::Value,
};
use std::sync::Arc;

///
/// Record
///
/// The wrapped object core: one owned row handle plus the binding it was
/// resolved through. Column reads always go to the row; nothing is cached.
///

#[derive(Debug)]
pub struct Record {
    row: RowHandle,
    binding: Arc<Binding>,
}

impl Record {
    pub(crate) const fn new(row: RowHandle, binding: Arc<Binding>) -> Self {
        Self { row, binding }
    }

    pub(crate) fn into_parts(self) -> (RowHandle, Arc<Binding>) {
        (self.row, self.binding)
    }

    /// Read a column through its installed accessor.
    pub fn get(&self, name: &str) -> Result<Value, Error> {
        self.require_accessor(name)?.read(self.row.as_ref())
    }

    #[must_use]
    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.binding.accessor(name)
    }

    /// Snapshot of every accessor's current value.
    pub fn values(&self) -> Result<ValueMap, Error> {
        self.binding
            .accessors()
            .iter()
            .map(|accessor| Ok((accessor.name().to_string(), accessor.read(self.row.as_ref())?)))
            .collect()
    }

    /// Write columns back to the row. Only columns with accessors are
    /// writable through the record.
    pub fn update(&self, values: &ValueMap) -> Result<(), Error> {
        for name in values.keys() {
            self.require_accessor(name)?;
        }

        self.row.update(values).map_err(Error::from)
    }

    pub fn delete(&self) -> Result<(), Error> {
        self.row.delete().map_err(Error::from)
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.row.is_live()
    }

    #[must_use]
    pub fn is_potential(&self) -> bool {
        self.row.is_potential()
    }

    #[must_use]
    pub const fn row(&self) -> &RowHandle {
        &self.row
    }

    #[must_use]
    pub const fn binding(&self) -> &Arc<Binding> {
        &self.binding
    }

    #[must_use]
    pub fn class(&self) -> ClassId {
        self.binding.class()
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        self.row.table_name()
    }

    fn require_accessor(&self, name: &str) -> Result<&Accessor, Error> {
        self.binding.accessor(name).ok_or_else(|| {
            Error::parameter(
                ErrorOrigin::Record,
                ParameterError::NoAccessor {
                    class: self.binding.class().to_string(),
                    name: name.to_string(),
                },
            )
        })
    }
}
