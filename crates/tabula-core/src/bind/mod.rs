//! Schema binder.
//!
//! Turns a table reference plus a skip-set into a [`Binding`] for one
//! consuming class: one [`Accessor`] per non-skipped column, published into
//! the capability registry.
mod extension;


pub use extension::{BindContext, BindExtension, NoExtension};

use crate::{
    SKIP_PARAM, TABLE_PARAM,
    backend::{RowRef, TableHandle},
    config::BinderConfig,
    error::{Error, ErrorOrigin},
    model::{ColumnKind, ColumnModel},
    obs::{self, ObsEvent},
    params::{ParamShape, ParamSpec, ParameterError, Params, validate_params},
    registry,
    traits::{ClassId, TableObject},
    value::Value,
};
use std::{collections::BTreeSet, fmt, sync::Arc};
use tracing::{debug, instrument};

///
/// Accessor
/// Zero-argument read of one column from a record's row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accessor {
    name: String,
    kind: ColumnKind,
    position: usize,
}

impl Accessor {
    fn for_column(column: &ColumnModel, position: usize) -> Self {
        Self {
            name: column.name.clone(),
            kind: column.kind,
            position,
        }
    }

    /// Accessor name; always the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Position of the column in the table's declaration order.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    pub fn read(&self, row: &dyn RowRef) -> Result<Value, Error> {
        row.get(&self.name).map_err(Error::from)
    }
}

///
/// Binding
///
/// Immutable association of one class with one table and its accessors.
///

pub struct Binding {
    class: ClassId,
    table: TableHandle,
    skip: BTreeSet<String>,
    accessors: Vec<Accessor>,
    allow_unknown_params: bool,
}

impl Binding {
    #[must_use]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    /// The bound table reference.
    #[must_use]
    pub const fn table(&self) -> &TableHandle {
        &self.table
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    #[must_use]
    pub const fn skip(&self) -> &BTreeSet<String> {
        &self.skip
    }

    /// Installed accessors, in column order.
    #[must_use]
    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    #[must_use]
    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessor(name).is_some()
    }

    /// Passthrough to the table's column metadata.
    #[must_use]
    pub fn columns(&self) -> &[ColumnModel] {
        self.table.columns()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.table.column(name)
    }

    #[must_use]
    pub fn primary_key(&self) -> &[String] {
        self.table.primary_key()
    }

    #[must_use]
    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key().iter().any(|pk| pk == name)
    }

    #[must_use]
    pub const fn allow_unknown_params(&self) -> bool {
        self.allow_unknown_params
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("class", &self.class)
            .field("table", &self.table.name())
            .field("skip", &self.skip)
            .field("accessors", &self.accessors)
            .finish_non_exhaustive()
    }
}

///
/// Binder
///
/// Validates binding parameters and publishes bindings.
/// `X` extends the parameter schema and may record extra attributes.
///

#[derive(Debug, Default)]
pub struct Binder<X = NoExtension> {
    config: BinderConfig,
    extension: X,
}

impl Binder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X: BindExtension> Binder<X> {
    #[must_use]
    pub fn with_extension(extension: X) -> Self {
        Self {
            config: BinderConfig::default(),
            extension,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Full parameter schema: `table`, `skip`, then extension parameters.
    #[must_use]
    pub fn param_specs(&self) -> Vec<ParamSpec> {
        let mut specs = vec![
            ParamSpec::required(TABLE_PARAM, ParamShape::Table),
            ParamSpec::optional(SKIP_PARAM, ParamShape::List),
        ];
        specs.extend(self.extension.extra_params());

        specs
    }

    /// Bind `C` to a table with an explicit skip list.
    pub fn bind_table<C: TableObject>(
        &self,
        table: TableHandle,
        skip: &[&str],
    ) -> Result<Arc<Binding>, Error> {
        let skip = skip.iter().map(|name| Value::from(*name)).collect();
        let params = Params::new()
            .with_table(TABLE_PARAM, table)
            .with_list(SKIP_PARAM, skip);

        self.bind::<C>(&params)
    }

    /// Bind `C` as described by `params`.
    ///
    /// Nothing is installed or registered unless every check passes.
    #[instrument(name = "binder::bind", level = "debug", skip_all, fields(class = C::PATH))]
    pub fn bind<C: TableObject>(&self, params: &Params) -> Result<Arc<Binding>, Error> {
        let binding = self.build::<C>(params).inspect_err(|err| {
            if err.is_parameter() {
                obs::record(ObsEvent::ParameterRejected {
                    origin: ErrorOrigin::Binder,
                });
            }
        })?;
        let binding = Arc::new(binding);

        let mut ctx = BindContext::new(&binding);
        self.extension.after_bind(&mut ctx, params)?;
        let attributes = ctx.into_attributes();

        let replaced = registry::register(
            Arc::clone(&binding),
            attributes,
            self.config.binding.on_duplicate_table,
        )?;

        obs::record(ObsEvent::Bind {
            class: binding.class().path(),
            accessors: binding.accessors().len(),
            replaced: replaced.is_some(),
        });
        debug!(
            table = binding.table_name(),
            accessors = binding.accessors().len(),
            "class bound"
        );

        Ok(binding)
    }

    fn build<C: TableObject>(&self, params: &Params) -> Result<Binding, Error> {
        let reject = |err| Error::parameter(ErrorOrigin::Binder, err);

        validate_params(&self.param_specs(), params, false).map_err(reject)?;

        let table = params
            .table(TABLE_PARAM)
            .cloned()
            .ok_or_else(|| {
                reject(ParameterError::MissingParam {
                    name: TABLE_PARAM.to_string(),
                })
            })?;
        let skip = self.skip_set(&table, params).map_err(reject)?;

        let accessors: Vec<Accessor> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| !skip.contains(&column.name))
            .map(|(position, column)| Accessor::for_column(column, position))
            .collect();

        // typed accessors declared on the class must all be backed
        if let Some(column) = C::COLUMNS
            .iter()
            .find(|name| !accessors.iter().any(|a| a.name == **name))
        {
            return Err(reject(ParameterError::UndeclaredAccessor {
                class: C::PATH.to_string(),
                table: table.name().to_string(),
                column: (*column).to_string(),
            }));
        }

        Ok(Binding {
            class: C::class_id(),
            table,
            skip,
            accessors,
            allow_unknown_params: self.config.params.allow_unknown,
        })
    }

    fn skip_set(
        &self,
        table: &TableHandle,
        params: &Params,
    ) -> Result<BTreeSet<String>, ParameterError> {
        let Some(param) = params.get(SKIP_PARAM) else {
            return Ok(BTreeSet::new());
        };
        let entries = param.as_list().ok_or(ParameterError::ShapeMismatch {
            name: SKIP_PARAM.to_string(),
            expected: ParamShape::List,
            found: param.shape(),
        })?;

        let mut skip = BTreeSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let name = entry.as_text().ok_or(ParameterError::SkipEntryNotText {
                index,
                found: entry.label(),
            })?;

            if table.column(name).is_none() {
                if !self.config.binding.ignore_unknown_skip {
                    return Err(ParameterError::UnknownSkipColumn {
                        table: table.name().to_string(),
                        column: name.to_string(),
                    });
                }
                debug!(table = table.name(), column = name, "skip names no column");
            }

            skip.insert(name.to_string());
        }

        Ok(skip)
    }
}
