use crate::params::{ParameterError, Params};
use derive_more::Display;

///
/// ParamShape
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ParamShape {
    #[display("a value")]
    Value,
    #[display("a list")]
    List,
    #[display("a row")]
    Row,
    #[display("a table")]
    Table,
    #[display("anything")]
    Any,
}

impl ParamShape {
    #[must_use]
    pub const fn admits(self, found: Self) -> bool {
        matches!(self, Self::Any) || self as u8 == found as u8
    }
}

///
/// ParamSpec
/// Declared name, shape and optionality of one parameter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub shape: ParamShape,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, shape: ParamShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, shape: ParamShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
        }
    }
}

/// Check `params` against `specs`.
///
/// Unknown names fail unless `allow_unknown` is set. Errors are reported in
/// name order so the same bag always yields the same error.
pub fn validate_params(
    specs: &[ParamSpec],
    params: &Params,
    allow_unknown: bool,
) -> Result<(), ParameterError> {
    for (name, param) in params.iter() {
        match specs.iter().find(|spec| spec.name == name) {
            Some(spec) if !spec.shape.admits(param.shape()) => {
                return Err(ParameterError::ShapeMismatch {
                    name: name.to_string(),
                    expected: spec.shape,
                    found: param.shape(),
                });
            }
            Some(_) => {}
            None if allow_unknown => {}
            None => {
                return Err(ParameterError::UnknownParam {
                    name: name.to_string(),
                });
            }
        }
    }

    if let Some(missing) = specs
        .iter()
        .find(|spec| spec.required && !params.contains(&spec.name))
    {
        return Err(ParameterError::MissingParam {
            name: missing.name.clone(),
        });
    }

    Ok(())
}
