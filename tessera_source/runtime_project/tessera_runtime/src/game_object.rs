use crate::GameObjectBehavior;
use serde_json::{Map, Value};
use std::{collections::BTreeSet, fmt, rc::Rc};
use tessera_ids::{ObjectID, SceneID};
use tessera_io::Asset;
use tessera_physics::{BodyHandle, PhysicsBinder};
use tessera_scene::{LightDescriptor, RigidBodyKind};
use tessera_structs::Transform3D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    Constructed,
    Loaded,
    Unloaded,
}

/// Everything about a game object except its behavior and children.
/// Behaviors receive this in their hooks.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub id: ObjectID,
    /// Owning scene. Not an owning reference.
    pub scene: SceneID,
    pub name: String,
    pub type_name: Option<String>,
    pub tags: BTreeSet<String>,
    pub user_data: Map<String, Value>,
    pub local_transform: Transform3D,
    pub world_transform: Transform3D,
    pub models: Vec<Rc<Asset>>,
    pub lights: Vec<LightDescriptor>,
    pub body: Option<BodyHandle>,
    pub body_kind: Option<RigidBodyKind>,
    pub state: ObjectState,
}

impl ObjectData {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

pub struct GameObject {
    data: ObjectData,
    behavior: Box<dyn GameObjectBehavior>,
    children: Vec<GameObject>,
}

impl GameObject {
    pub(crate) fn new(data: ObjectData, behavior: Box<dyn GameObjectBehavior>) -> Self {
        Self {
            data,
            behavior,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectID {
        self.data.id
    }

    pub fn scene(&self) -> SceneID {
        self.data.scene
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn type_name(&self) -> Option<&str> {
        self.data.type_name.as_deref()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.data.has_tag(tag)
    }

    pub fn state(&self) -> ObjectState {
        self.data.state
    }

    pub fn body(&self) -> Option<&BodyHandle> {
        self.data.body.as_ref()
    }

    pub fn world_transform(&self) -> &Transform3D {
        &self.data.world_transform
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }

    pub fn children(&self) -> &[GameObject] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, child: GameObject) {
        self.children.push(child);
    }

    /// Pre-order walk of this object and its descendants.
    pub fn visit<'a>(&'a self, depth: usize, f: &mut dyn FnMut(&'a GameObject, usize)) {
        f(self, depth);
        for child in &self.children {
            child.visit(depth + 1, f);
        }
    }

    pub(crate) fn visit_mut(&mut self, f: &mut dyn FnMut(&mut GameObject)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// This object plus all descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(GameObject::subtree_len).sum::<usize>()
    }

    pub fn find(&self, id: ObjectID) -> Option<&GameObject> {
        if self.data.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: ObjectID) -> Option<&mut GameObject> {
        if self.data.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Detach the descendant `id` (never `self`) from this subtree.
    pub(crate) fn take_descendant(&mut self, id: ObjectID) -> Option<GameObject> {
        if let Some(index) = self.children.iter().position(|c| c.data.id == id) {
            return Some(self.children.remove(index));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.take_descendant(id))
    }

    pub(crate) fn fire_load(&mut self) {
        self.visit_mut(&mut |object: &mut GameObject| {
            object.behavior.on_load(&mut object.data);
            object.data.state = ObjectState::Loaded;
        });
    }

    pub(crate) fn fire_unload(&mut self) {
        self.visit_mut(&mut |object: &mut GameObject| {
            object.behavior.on_unload(&mut object.data);
            object.data.state = ObjectState::Unloaded;
        });
    }

    pub(crate) fn fire_update(&mut self, dt: f32) {
        self.visit_mut(&mut |object: &mut GameObject| object.behavior.update(&mut object.data, dt));
    }

    /// Children first, then self. Returns how many bodies were removed.
    pub(crate) fn release_bodies(&mut self, physics: &mut dyn PhysicsBinder) -> usize {
        let mut released = 0;
        for child in &mut self.children {
            released += child.release_bodies(physics);
        }
        if let Some(handle) = self.data.body.take() {
            if physics.release(&handle) {
                released += 1;
            }
        }
        released
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.data.id)
            .field("name", &self.data.name)
            .field("type_name", &self.data.type_name)
            .field("state", &self.data.state)
            .field("body", &self.data.body)
            .field("children", &self.children)
            .finish()
    }
}
