use crate::{
    OBJECT_PARAM, backend::RowHandle, bind::Binding, error::Error, obs::ResolveOutcome,
    params::Params, traits::TableObject, value::Value,
};
use std::rc::Rc;

///
/// Strategy
///
/// One way of finding the row behind a `new` call. Strategies are tried in
/// [`Strategy::ORDER`]; the first decisive outcome wins.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Every primary-key column has a value: look the row up.
    PrimaryKey,
    /// `object` carries a row of the bound table: wrap it.
    Object,
    /// Ask the class's `new_row` hook.
    Hook,
}

///
/// Outcome
///

#[derive(Debug)]
pub enum Outcome {
    Resolved(RowHandle),
    /// Decisive miss; later strategies are not consulted.
    Missing,
    /// Not applicable to these parameters.
    Skipped,
}

impl Strategy {
    pub const ORDER: [Self; 3] = [Self::PrimaryKey, Self::Object, Self::Hook];

    /// Parameters are assumed validated.
    pub fn attempt<C: TableObject>(
        self,
        binding: &Binding,
        params: &Params,
    ) -> Result<Outcome, Error> {
        match self {
            Self::PrimaryKey => {
                let Some(key) = primary_key_values(binding, params) else {
                    return Ok(Outcome::Skipped);
                };

                Ok(match binding.table().lookup(&key)? {
                    Some(row) => Outcome::Resolved(row),
                    None => Outcome::Missing,
                })
            }

            Self::Object => Ok(params
                .row(OBJECT_PARAM)
                .map_or(Outcome::Skipped, |row| Outcome::Resolved(Rc::clone(row)))),

            Self::Hook => Ok(C::new_row(binding, params)?
                .map_or(Outcome::Skipped, Outcome::Resolved)),
        }
    }

    pub(crate) const fn outcome(self) -> ResolveOutcome {
        match self {
            Self::PrimaryKey => ResolveOutcome::PrimaryKeyHit,
            Self::Object => ResolveOutcome::Object,
            Self::Hook => ResolveOutcome::Hook,
        }
    }
}

// key values in key order; None unless every key column is present
fn primary_key_values(binding: &Binding, params: &Params) -> Option<Vec<Value>> {
    let pk = binding.primary_key();
    if pk.is_empty() {
        return None;
    }

    pk.iter()
        .map(|column| params.value(column).cloned())
        .collect()
}
