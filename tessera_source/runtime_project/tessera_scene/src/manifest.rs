use crate::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level `game.json`: which scenes and game-object types exist and where they live.
/// Declaration order is kept; the first declared scene is the fallback start scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_scene: Option<String>,
    pub scenes: IndexMap<String, String>,
    pub game_object_types: IndexMap<String, String>,
}

impl GameManifest {
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        serde_json::from_value(value).map_err(|err| SchemaError::malformed("game manifest", err))
    }

    pub fn scene_path(&self, name: &str) -> Option<&str> {
        self.scenes.get(name).map(String::as_str)
    }

    /// `initialScene` if set, otherwise the first declared scene.
    pub fn startup_scene(&self) -> Option<&str> {
        self.initial_scene
            .as_deref()
            .or_else(|| self.scenes.keys().next().map(String::as_str))
    }

    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }
}
