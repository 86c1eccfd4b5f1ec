use thiserror::Error;

/// Errors raised while resolving, fetching or decoding an asset.
///
/// `Clone` because one in-flight fetch hands the same outcome to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset `{path}` not found under {base}")]
    NotFound { path: String, base: String },

    #[error("failed to parse asset `{path}`: {reason}")]
    Parse { path: String, reason: String },

    #[error("failed to read asset `{path}`: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid asset location: {0}")]
    InvalidConstructorArgument(String),
}

impl AssetError {
    pub fn not_found(path: impl Into<String>, base: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            base: base.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
