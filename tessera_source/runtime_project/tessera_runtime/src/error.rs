use tessera_io::AssetError;
use tessera_physics::BindError;
use thiserror::Error;

/// Failures while building one scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The scene file itself could not be fetched or does not match the scene schema.
    #[error("scene `{scene}`: {source}")]
    Asset { scene: String, source: AssetError },

    #[error("game object `{object}`: model `{src}` could not be loaded: {source}")]
    UnknownModelAsset {
        object: String,
        src: String,
        source: AssetError,
    },

    #[error("game object `{object}`: {source}")]
    InvalidColliderShape { object: String, source: BindError },

    /// A type template whose children expand back into the same type.
    #[error("game object `{object}`: type `{type_name}` expands into itself")]
    RecursiveType { object: String, type_name: String },
}

impl SceneError {
    /// Errors a single node can raise. Nested ones only drop their subtree.
    pub fn is_node_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownModelAsset { .. }
                | Self::InvalidColliderShape { .. }
                | Self::RecursiveType { .. }
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Manifest and type-definition loads, plus bad base locations at construction.
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("unknown scene `{0}`")]
    UnknownScene(String),

    #[error("a scene load is already in progress")]
    ConcurrentLoad,

    #[error("session is already initialized")]
    AlreadyInitialized,

    #[error("the game manifest declares no scenes")]
    NoScenesDefined,
}
