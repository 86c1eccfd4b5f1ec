use crate::{ObjectData, SceneInfo};
use std::rc::Rc;
use tessera_scene::GameObjectDescriptor;

/// Per-type game-object logic. Every hook is optional.
pub trait GameObjectBehavior {
    /// Fired in pre-order once the whole scene tree, physics bodies included, exists.
    fn on_load(&mut self, _object: &mut ObjectData) {}

    /// Fired in pre-order before the owning scene is detached or the subtree is destroyed.
    fn on_unload(&mut self, _object: &mut ObjectData) {}

    /// Once per session update while playing, after physics poses are written back.
    fn update(&mut self, _object: &mut ObjectData, _dt: f32) {}
}

/// Used for every object whose type has no registered factory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl GameObjectBehavior for DefaultBehavior {}

/// Builds a behavior from the object's effective (template-merged) descriptor.
pub type BehaviorFactory = Rc<dyn Fn(&GameObjectDescriptor) -> Box<dyn GameObjectBehavior>>;

pub trait SceneBehavior {
    /// Fired before any object's `on_load`.
    fn on_load(&mut self, _scene: &SceneInfo) {}

    /// Fired before any object's `on_unload`.
    fn on_unload(&mut self, _scene: &SceneInfo) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSceneBehavior;

impl SceneBehavior for DefaultSceneBehavior {}

pub type SceneBehaviorFactory = Rc<dyn Fn(&SceneInfo) -> Box<dyn SceneBehavior>>;
