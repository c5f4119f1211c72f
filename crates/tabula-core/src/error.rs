use crate::{
    backend::BackendError, config::ConfigError, params::ParameterError, registry::BindingError,
};
use std::{fmt, panic::Location};
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable classification.
/// `location` is the source position where the error was raised.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
    pub location: &'static Location<'static>,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    #[track_caller]
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            location: Location::caller(),
            detail: None,
        }
    }

    /// Construct a parameter error raised by the given component.
    #[track_caller]
    pub fn parameter(origin: ErrorOrigin, err: ParameterError) -> Self {
        Self {
            class: ErrorClass::Parameter,
            origin,
            message: err.to_string(),
            location: Location::caller(),
            detail: Some(ErrorDetail::Parameter(err)),
        }
    }

    /// Construct a binding fault raised by the given component.
    #[track_caller]
    pub fn binding(origin: ErrorOrigin, err: BindingError) -> Self {
        Self {
            class: ErrorClass::Binding,
            origin,
            message: err.to_string(),
            location: Location::caller(),
            detail: Some(ErrorDetail::Binding(err)),
        }
    }

    #[must_use]
    pub const fn is_parameter(&self) -> bool {
        matches!(self.class, ErrorClass::Parameter)
    }

    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(self.class, ErrorClass::Binding)
    }

    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self.class, ErrorClass::Backend)
    }

    /// Borrow the parameter detail, if this is a parameter error.
    #[must_use]
    pub const fn parameter_error(&self) -> Option<&ParameterError> {
        match &self.detail {
            Some(ErrorDetail::Parameter(err)) => Some(err),
            _ => None,
        }
    }

    /// Borrow the binding detail, if this is a binding fault.
    #[must_use]
    pub const fn binding_error(&self) -> Option<&BindingError> {
        match &self.detail {
            Some(ErrorDetail::Binding(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!(
            "{}:{}: {} (at {})",
            self.origin, self.class, self.message, self.location
        )
    }
}

impl From<BackendError> for Error {
    #[track_caller]
    fn from(err: BackendError) -> Self {
        Self {
            class: ErrorClass::Backend,
            origin: ErrorOrigin::Backend,
            message: err.to_string(),
            location: Location::caller(),
            detail: Some(ErrorDetail::Backend(err)),
        }
    }
}

impl From<ConfigError> for Error {
    #[track_caller]
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorDetail
///
/// Structured, class-specific error detail carried by [`Error`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Parameter(ParameterError),

    #[error("{0}")]
    Binding(BindingError),

    #[error("{0}")]
    Backend(BackendError),
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Malformed input from the caller.
    Parameter,
    /// A class or table is not bound the way the operation requires.
    Binding,
    /// The storage backend reported a failure.
    Backend,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Parameter => "parameter",
            Self::Binding => "binding",
            Self::Backend => "backend",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Binder,
    Resolver,
    Registry,
    Cursor,
    Record,
    Backend,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Binder => "binder",
            Self::Resolver => "resolver",
            Self::Registry => "registry",
            Self::Cursor => "cursor",
            Self::Record => "record",
            Self::Backend => "backend",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
