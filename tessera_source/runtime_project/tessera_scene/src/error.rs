use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Collider geometry that cannot be built as declared. Never defaulted.
    #[error("invalid collider shape `{shape}`: {reason}")]
    InvalidColliderShape { shape: String, reason: String },

    /// A JSON document that does not match the descriptor schema.
    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },
}

impl SchemaError {
    pub fn collider(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColliderShape {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            what,
            reason: err.to_string(),
        }
    }

    pub fn is_invalid_collider_shape(&self) -> bool {
        matches!(self, Self::InvalidColliderShape { .. })
    }
}
