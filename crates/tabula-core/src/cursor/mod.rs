//! Cursor adapter.
//!
//! Pulls raw rows from a [`RowSource`] one at a time and yields them as
//! wrapped objects of whichever class the registry binds to each row's
//! table.

use crate::{
    OBJECT_PARAM,
    backend::{RowHandle, RowSource},
    bind::Binding,
    error::{Error, ErrorOrigin},
    obs::{self, ObsEvent},
    params::Params,
    record::Record,
    registry::{self, BindingError},
    resolve,
    traits::{ClassId, TableObject},
};
use std::{iter::FusedIterator, marker::PhantomData, rc::Rc, sync::Arc};
use tracing::trace;

/// Wrap `source` so it yields bound objects.
pub const fn wrap_cursor<S: RowSource>(source: S) -> ObjectCursor<S> {
    ObjectCursor::new(source)
}

///
/// ObjectCursor
///
/// Single pass and not restartable. Once the source reports its end the
/// cursor keeps returning `None`.
///
/// Items are [`BoundObject`]s; the class's `init` hook has not run yet and
/// runs on `into_object::<C>()`. Use [`ObjectCursor::typed`] to get
/// initialised objects straight away.
///

#[derive(Debug)]
pub struct ObjectCursor<S> {
    source: S,
    done: bool,
}

impl<S: RowSource> ObjectCursor<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            done: false,
        }
    }

    /// Yield `C` directly; rows of any other class become errors.
    #[must_use]
    pub const fn typed<C: TableObject>(self) -> TypedCursor<S, C> {
        TypedCursor {
            inner: self,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: RowSource> Iterator for ObjectCursor<S> {
    type Item = Result<BoundObject, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.source.next_row() {
            Ok(Some(row)) => Some(bind_row(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => Some(Err(err.into())),
        }
    }
}

impl<S: RowSource> FusedIterator for ObjectCursor<S> {}

fn binding_fault(err: BindingError) -> Error {
    obs::record(ObsEvent::BindingFault {
        origin: ErrorOrigin::Cursor,
    });

    Error::binding(ErrorOrigin::Cursor, err)
}

fn bind_row(row: RowHandle) -> Result<BoundObject, Error> {
    let table = row.table_name().to_string();
    let unbound = || BindingError::UnboundTable {
        table: table.clone(),
    };

    let class = registry::table_to_class(&table).ok_or_else(|| binding_fault(unbound()))?;
    let binding = registry::binding_of(class).ok_or_else(|| {
        binding_fault(BindingError::UnboundClass {
            class: class.to_string(),
        })
    })?;

    // the binding must still point at this row's table
    if binding.table_name() != table {
        return Err(binding_fault(unbound()));
    }

    trace!(%class, %table, "cursor row bound");
    obs::record(ObsEvent::CursorRow {
        class: class.path(),
    });

    Ok(BoundObject {
        record: Record::new(row, binding),
    })
}

///
/// BoundObject
///
/// A row wrapped for the class its table is bound to. The class's `init`
/// hook runs when it is taken as a concrete type.
///

#[derive(Debug)]
pub struct BoundObject {
    record: Record,
}

impl BoundObject {
    #[must_use]
    pub fn class(&self) -> ClassId {
        self.record.class()
    }

    #[must_use]
    pub fn is<C: TableObject>(&self) -> bool {
        self.class() == C::class_id()
    }

    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn binding(&self) -> &Arc<Binding> {
        self.record.binding()
    }

    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Take the object as `C`, running `C::init` with `object` set to the
    /// row.
    pub fn into_object<C: TableObject>(self) -> Result<C, Error> {
        if !self.is::<C>() {
            return Err(Error::binding(
                ErrorOrigin::Cursor,
                BindingError::ClassMismatch {
                    expected: C::PATH.to_string(),
                    found: self.class().to_string(),
                },
            ));
        }

        let (row, binding) = self.record.into_parts();
        let params = Params::new().with_row(OBJECT_PARAM, Rc::clone(&row));

        resolve::wrap::<C>(binding, row, &params)
    }
}

///
/// TypedCursor
///

#[derive(Debug)]
pub struct TypedCursor<S, C> {
    inner: ObjectCursor<S>,
    _marker: PhantomData<fn() -> C>,
}

impl<S: RowSource, C: TableObject> Iterator for TypedCursor<S, C> {
    type Item = Result<C, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|item| item.and_then(BoundObject::into_object::<C>))
    }
}

impl<S: RowSource, C: TableObject> FusedIterator for TypedCursor<S, C> {}
