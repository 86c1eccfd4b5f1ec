use tessera_scene::SchemaError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    /// Descriptor-level failure: unknown tag, missing field, bad buffers, no colliders.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Geometry that passed schema checks but rapier refused to build.
    #[error("invalid collider shape `{shape}`: {reason}")]
    Rejected { shape: &'static str, reason: String },
}

impl BindError {
    pub fn is_invalid_collider_shape(&self) -> bool {
        match self {
            Self::Schema(err) => err.is_invalid_collider_shape(),
            Self::Rejected { .. } => true,
        }
    }
}
