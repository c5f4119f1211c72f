//! Object resolver.
//!
//! Produces wrapped objects from primary-key values, from an existing row,
//! or from a class-supplied constructor hook, in that order.
mod strategy;

#[cfg(all(test, feature = "memory"))]
mod tests;

pub use strategy::{Outcome, Strategy};

use crate::{
    OBJECT_PARAM,
    backend::{RowHandle, TableHandle},
    bind::Binding,
    error::{Error, ErrorOrigin},
    model::ColumnModel,
    obs::{self, ObsEvent, ResolveOutcome},
    params::{ParamShape, ParamSpec, ParameterError, Params, ValueMap, validate_params},
    record::Record,
    registry::{self, BindingError},
    traits::TableObject,
    value::Value,
};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, instrument, trace};

///
/// Resolve
///
/// Construction and schema passthroughs for every bound [`TableObject`].
///

pub trait Resolve: TableObject {
    /// The class's current binding.
    fn binding() -> Result<Arc<Binding>, Error> {
        current_binding::<Self>()
    }

    /// The bound table reference.
    fn table() -> Result<TableHandle, Error> {
        Ok(Arc::clone(current_binding::<Self>()?.table()))
    }

    fn columns() -> Result<Vec<ColumnModel>, Error> {
        Ok(current_binding::<Self>()?.columns().to_vec())
    }

    fn column(name: &str) -> Result<Option<ColumnModel>, Error> {
        Ok(current_binding::<Self>()?.column(name).cloned())
    }

    /// Resolve an object from `params`. `Ok(None)` when nothing matches.
    fn new(params: &Params) -> Result<Option<Self>, Error> {
        resolve_new::<Self>(params)
    }

    /// Insert one row and wrap it.
    fn create(values: &ValueMap) -> Result<Self, Error> {
        resolve_create::<Self>(values)
    }

    /// Wrap a transient row built from `values` without persisting it.
    fn potential(values: &ValueMap) -> Result<Self, Error> {
        resolve_potential::<Self>(values)
    }
}

impl<C: TableObject> Resolve for C {}

/// Wrap `row` as a `C` and run its `init` hook.
pub(crate) fn wrap<C: TableObject>(
    binding: Arc<Binding>,
    row: RowHandle,
    params: &Params,
) -> Result<C, Error> {
    let mut object = C::from_record(Record::new(row, binding));
    object.init(params)?;

    Ok(object)
}

fn current_binding<C: TableObject>() -> Result<Arc<Binding>, Error> {
    registry::binding_of(C::class_id()).ok_or_else(|| {
        obs::record(ObsEvent::BindingFault {
            origin: ErrorOrigin::Resolver,
        });

        Error::binding(
            ErrorOrigin::Resolver,
            BindingError::UnboundClass {
                class: C::PATH.to_string(),
            },
        )
    })
}

fn reject(err: ParameterError) -> Error {
    obs::record(ObsEvent::ParameterRejected {
        origin: ErrorOrigin::Resolver,
    });

    Error::parameter(ErrorOrigin::Resolver, err)
}

#[instrument(name = "resolve::new", level = "trace", skip_all, fields(class = C::PATH))]
fn resolve_new<C: TableObject>(params: &Params) -> Result<Option<C>, Error> {
    let binding = current_binding::<C>()?;
    check_new_params::<C>(&binding, params).map_err(reject)?;

    for strategy in Strategy::ORDER {
        match strategy.attempt::<C>(&binding, params)? {
            Outcome::Resolved(row) => {
                trace!(?strategy, "row resolved");
                obs::record(ObsEvent::Resolve {
                    class: C::PATH,
                    outcome: strategy.outcome(),
                });

                return wrap::<C>(binding, row, params).map(Some);
            }
            Outcome::Missing => {
                obs::record(ObsEvent::Resolve {
                    class: C::PATH,
                    outcome: ResolveOutcome::PrimaryKeyMiss,
                });

                return Ok(None);
            }
            Outcome::Skipped => {}
        }
    }

    obs::record(ObsEvent::Resolve {
        class: C::PATH,
        outcome: ResolveOutcome::Empty,
    });

    Ok(None)
}

#[instrument(name = "resolve::create", level = "debug", skip_all, fields(class = C::PATH))]
fn resolve_create<C: TableObject>(values: &ValueMap) -> Result<C, Error> {
    let binding = current_binding::<C>()?;
    check_values(&binding, values).map_err(reject)?;

    let row = binding.table().insert(values)?;
    obs::record(ObsEvent::Insert { class: C::PATH });
    debug!(table = binding.table_name(), "row inserted");

    let params = Params::new().with_row(OBJECT_PARAM, Rc::clone(&row));
    wrap::<C>(binding, row, &params)
}

#[instrument(name = "resolve::potential", level = "trace", skip_all, fields(class = C::PATH))]
fn resolve_potential<C: TableObject>(values: &ValueMap) -> Result<C, Error> {
    let binding = current_binding::<C>()?;
    check_values(&binding, values).map_err(reject)?;

    let row = binding.table().potential(values)?;
    obs::record(ObsEvent::Potential { class: C::PATH });

    let params = Params::new().with_row(OBJECT_PARAM, Rc::clone(&row));
    wrap::<C>(binding, row, &params)
}

// ----------------------------------------------------------------------------
// validation
// ----------------------------------------------------------------------------

/// Recognised `new` parameters: every column, `object`, then hook extras.
/// A column named `object` is shadowed by the row parameter.
fn new_param_specs<C: TableObject>(binding: &Binding) -> Vec<ParamSpec> {
    let mut specs: Vec<ParamSpec> = binding
        .columns()
        .iter()
        .filter(|column| column.name != OBJECT_PARAM)
        .map(|column| ParamSpec::optional(column.name.clone(), ParamShape::Value))
        .collect();

    specs.push(ParamSpec::optional(OBJECT_PARAM, ParamShape::Row));
    specs.extend(
        C::extra_params()
            .iter()
            .map(|name| ParamSpec::optional(*name, ParamShape::Any)),
    );

    specs
}

fn check_new_params<C: TableObject>(
    binding: &Binding,
    params: &Params,
) -> Result<(), ParameterError> {
    validate_params(
        &new_param_specs::<C>(binding),
        params,
        binding.allow_unknown_params(),
    )?;

    for column in binding.columns() {
        if let Some(value) = params.value(&column.name) {
            check_column_value(binding, column, value)?;
        }
    }

    if let Some(row) = params.row(OBJECT_PARAM)
        && row.table_name() != binding.table_name()
    {
        return Err(ParameterError::ForeignRow {
            expected: binding.table_name().to_string(),
            found: row.table_name().to_string(),
        });
    }

    Ok(())
}

/// Check a column→value map for `create` and `potential`.
fn check_values(binding: &Binding, values: &ValueMap) -> Result<(), ParameterError> {
    for (name, value) in values {
        let column = binding
            .column(name)
            .ok_or_else(|| ParameterError::UnknownColumn {
                table: binding.table_name().to_string(),
                column: name.clone(),
            })?;

        check_column_value(binding, column, value)?;
    }

    Ok(())
}

fn check_column_value(
    binding: &Binding,
    column: &ColumnModel,
    value: &Value,
) -> Result<(), ParameterError> {
    if !column.accepts(value) {
        return Err(ParameterError::KindMismatch {
            column: column.name.clone(),
            expected: column.kind,
            found: value.label(),
        });
    }

    if value.is_null() && binding.is_key_column(&column.name) {
        return Err(ParameterError::NullPrimaryKey {
            column: column.name.clone(),
        });
    }

    Ok(())
}
