use crate::value::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// ColumnModel
/// One column descriptor: name plus storage kind.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnModel {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnModel {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Whether `value` can be stored in this column.
    #[must_use]
    pub const fn accepts(&self, value: &Value) -> bool {
        self.kind.accepts(value)
    }
}

///
/// ColumnKind
///
/// Storage kind of a column. Aligned with the `Value` variants.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ColumnKind {
    #[display("bool")]
    Bool,
    #[display("int")]
    Int,
    #[display("uint")]
    Uint,
    #[display("float64")]
    Float64,
    #[display("text")]
    Text,
    #[display("blob")]
    Blob,
    #[display("ulid")]
    Ulid,
}

impl ColumnKind {
    /// Null is accepted by every kind; anything else must match exactly.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_))
                | (Self::Uint, Value::Uint(_))
                | (Self::Float64, Value::Float64(_))
                | (Self::Text, Value::Text(_))
                | (Self::Blob, Value::Blob(_))
                | (Self::Ulid, Value::Ulid(_))
        )
    }
}
