//! Core runtime for Tabula: table bindings, the capability registry, the
//! object resolver, and the cursor adapter that turns backend rows into
//! typed objects.
#![warn(unreachable_pub)]

extern crate self as tabula;

// public exports are one module level down
pub mod backend;
pub mod bind;
pub mod config;
pub mod cursor;
pub mod error;
pub mod model;
pub mod obs;
pub mod params;
pub mod record;
pub mod registry;
pub mod resolve;
pub mod traits;
pub mod value;

// test
#[cfg(all(test, feature = "memory"))]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Parameter naming an existing row to wrap during object resolution.
pub const OBJECT_PARAM: &str = "object";

/// Binding parameter carrying the table reference.
pub const TABLE_PARAM: &str = "table";

/// Binding parameter carrying the list of columns to leave without accessors.
pub const SKIP_PARAM: &str = "skip";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        backend::{RowHandle, TableHandle},
        bind::{Binder, Binding},
        cursor::ObjectCursor,
        params::{Param, Params, ValueMap},
        record::Record,
        resolve::Resolve,
        traits::{ObjectHooks, Path, TableObject},
        value::Value,
    };
}
