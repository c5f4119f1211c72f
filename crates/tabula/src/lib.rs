//! ## Crate layout
//! - `core`: bindings, registry, resolver, cursor adapter and the storage
//!   traits they consume.
//! - `derive`: the `TableObject` derive macro.
//!
//! Everything in `core` is also re-exported at the crate root, so the paths
//! emitted by the derive (`::tabula::traits::TableObject`, ...) resolve here.

pub use tabula_core as core;
pub use tabula_core::{
    OBJECT_PARAM, SKIP_PARAM, TABLE_PARAM, backend, bind, config, cursor, error, model, obs,
    params, record, registry, resolve, traits, value,
};
pub use tabula_derive as derive;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use tabula_core::error::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        backend::{RowHandle, RowRef as _, TableHandle, TableRef as _},
        bind::{Binder, Binding},
        cursor::{BoundObject, ObjectCursor, wrap_cursor},
        params::{Param, Params, ValueMap},
        record::Record,
        resolve::Resolve as _,
        traits::{ObjectHooks, TableObject as _},
        value::Value,
    };
    pub use tabula_derive::TableObject;
}
