use crate::{backend::RowHandle, bind::Binding, error::Error, params::Params, record::Record};
use derive_more::Display;

// ============================================================================
// CLASS IDENTITY
// ============================================================================

///
/// Path
/// Fully-qualified type path used as the class identity.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// ClassId
///
/// Identity of a consuming class in the capability registry.
/// Two types with the same `PATH` are the same class.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}")]
pub struct ClassId {
    path: &'static str,
}

impl ClassId {
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }

    #[must_use]
    pub const fn of<C: Path>() -> Self {
        Self::new(C::PATH)
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }
}

// ============================================================================
// WRAPPED OBJECTS
// ============================================================================

///
/// TableObject
///
/// A typed value object wrapping exactly one row of a bound table.
/// Usually produced by `#[derive(TableObject)]`.
///

pub trait TableObject: Path + ObjectHooks + Sized + 'static {
    /// Columns with typed accessor methods on the implementing type.
    /// Binding fails unless every one of them receives an accessor.
    const COLUMNS: &'static [&'static str] = &[];

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn into_record(self) -> Record;

    #[must_use]
    fn class_id() -> ClassId {
        ClassId::of::<Self>()
    }
}

///
/// ObjectHooks
///
/// Per-class extension points used by the object resolver.
/// Every hook has a no-op default.
///

pub trait ObjectHooks: Sized {
    /// Extra parameter names `new` accepts besides columns and `object`.
    #[must_use]
    fn extra_params() -> &'static [&'static str] {
        &[]
    }

    /// Produce a row when neither key lookup nor `object` applies.
    fn new_row(_binding: &Binding, _params: &Params) -> Result<Option<RowHandle>, Error> {
        Ok(None)
    }

    /// Runs on every freshly wrapped object before it is returned.
    fn init(&mut self, _params: &Params) -> Result<(), Error> {
        Ok(())
    }
}
