use crate::{bind::Binding, error::Error, params::{ParamSpec, Params}};

///
/// BindExtension
///
/// Hook for binders that need more than `table` and `skip`.
///

pub trait BindExtension {
    /// Parameters accepted on top of the base schema.
    fn extra_params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Runs after accessors are derived and before the binding is
    /// registered. Failing here leaves the registry untouched.
    fn after_bind(&self, _ctx: &mut BindContext<'_>, _params: &Params) -> Result<(), Error> {
        Ok(())
    }
}

///
/// NoExtension
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoExtension;

impl BindExtension for NoExtension {}

///
/// BindContext
///
/// Attribute list under construction for one bind call. Starts with the
/// accessor names in column order.
///

#[derive(Debug)]
pub struct BindContext<'a> {
    binding: &'a Binding,
    attributes: Vec<String>,
}

impl<'a> BindContext<'a> {
    pub(crate) fn new(binding: &'a Binding) -> Self {
        let attributes = binding
            .accessors()
            .iter()
            .map(|a| a.name().to_string())
            .collect();

        Self {
            binding,
            attributes,
        }
    }

    #[must_use]
    pub const fn binding(&self) -> &Binding {
        self.binding
    }

    /// Register an attribute produced outside column accessors.
    pub fn record_attribute(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.attributes.contains(&name) {
            self.attributes.push(name);
        }
    }

    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub(crate) fn into_attributes(self) -> Vec<String> {
        self.attributes
    }
}
