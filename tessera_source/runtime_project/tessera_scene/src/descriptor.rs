use crate::{ColliderDescriptor, ColliderShape, SchemaError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tessera_structs::{Transform3D, Vector3};

/// Scene file: `{ background?, gravity?, gameObjects }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Vector3>,
    pub game_objects: Vec<GameObjectDescriptor>,
}

impl SceneDescriptor {
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        serde_json::from_value(value).map_err(|err| SchemaError::malformed("scene", err))
    }

    pub fn gravity(&self) -> Vector3 {
        self.gravity.unwrap_or(Vector3::ZERO)
    }
}

/// A game-object node as authored, either in a scene or as a type template.
///
/// Every field is optional so template and instance can be merged key by key;
/// the accessor methods apply defaults after merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameObjectDescriptor {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lights: Option<Vec<LightDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vector3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rigid_body: Option<RigidBodyDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GameObjectDescriptor>>,
}

/// Instance value if the instance declares the key, template value otherwise.
fn pick<T: Clone>(instance: &Option<T>, template: &Option<T>) -> Option<T> {
    instance.as_ref().or(template.as_ref()).cloned()
}

impl GameObjectDescriptor {
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        serde_json::from_value(value)
            .map_err(|err| SchemaError::malformed("game object descriptor", err))
    }

    /// Shallow merge: each top-level key comes from `self` when present, else from
    /// `template`. Nested values (arrays, maps, rigid bodies) are taken whole, never combined.
    pub fn merged_over(&self, template: &GameObjectDescriptor) -> GameObjectDescriptor {
        GameObjectDescriptor {
            type_name: pick(&self.type_name, &template.type_name),
            name: pick(&self.name, &template.name),
            tags: pick(&self.tags, &template.tags),
            user_data: pick(&self.user_data, &template.user_data),
            models: pick(&self.models, &template.models),
            lights: pick(&self.lights, &template.lights),
            position: pick(&self.position, &template.position),
            scale: pick(&self.scale, &template.scale),
            rotation: pick(&self.rotation, &template.rotation),
            rigid_body: pick(&self.rigid_body, &template.rigid_body),
            children: pick(&self.children, &template.children),
        }
    }

    /// Declared name, else the type name, else `GameObject`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.type_name.as_deref())
            .unwrap_or("GameObject")
    }

    pub fn local_transform(&self) -> Transform3D {
        Transform3D::from_euler(
            self.position.unwrap_or(Vector3::ZERO),
            self.rotation.unwrap_or(Vector3::ZERO),
            self.scale.unwrap_or(Vector3::ONE),
        )
    }

    pub fn tags(&self) -> BTreeSet<String> {
        self.tags.clone().unwrap_or_default()
    }

    pub fn user_data(&self) -> Map<String, Value> {
        self.user_data.clone().unwrap_or_default()
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        self.models.as_deref().unwrap_or_default()
    }

    pub fn lights(&self) -> &[LightDescriptor] {
        self.lights.as_deref().unwrap_or_default()
    }

    pub fn children(&self) -> &[GameObjectDescriptor] {
        self.children.as_deref().unwrap_or_default()
    }
}

/// A model reference. Loading and binding it is the renderer's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDescriptor {
    #[serde(rename = "type")]
    pub kind: LightKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
}

impl LightDescriptor {
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or("#ffffff")
    }

    pub fn intensity(&self) -> f32 {
        self.intensity.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RigidBodyKind {
    Dynamic,
    Fixed,
    KinematicPositionBased,
    KinematicVelocityBased,
}

/// Per-axis enable flags. Each missing axis defaults to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RigidBodyDescriptor {
    pub kind: RigidBodyKind,
    #[serde(default)]
    pub enabled_translations: AxisMask,
    #[serde(default)]
    pub enabled_rotations: AxisMask,
    #[serde(default)]
    pub colliders: Vec<ColliderDescriptor>,
}

impl RigidBodyDescriptor {
    pub fn new(kind: RigidBodyKind) -> Self {
        Self {
            kind,
            enabled_translations: AxisMask::ALL,
            enabled_rotations: AxisMask::ALL,
            colliders: Vec::new(),
        }
    }

    /// Parse every collider shape up front, in declared order.
    /// A body without colliders is an error, never an empty body.
    pub fn collider_shapes(&self) -> Result<Vec<(&ColliderDescriptor, ColliderShape)>, SchemaError> {
        if self.colliders.is_empty() {
            return Err(SchemaError::collider(
                "<none>",
                "a rigid body requires at least one collider",
            ));
        }
        self.colliders
            .iter()
            .map(|collider| collider.shape().map(|shape| (collider, shape)))
            .collect()
    }
}
