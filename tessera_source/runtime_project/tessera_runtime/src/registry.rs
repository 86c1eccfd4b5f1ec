use crate::{BehaviorFactory, DefaultBehavior, GameObjectBehavior};
use ahash::AHashMap;
use indexmap::IndexMap;
use std::rc::Rc;
use tessera_scene::GameObjectDescriptor;

/// Game-object types known to a session: templates from the manifest and behavior factories.
///
/// Built once by `GameSession::init` and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct TypeRegistry {
    templates: IndexMap<String, GameObjectDescriptor>,
    behaviors: AHashMap<String, BehaviorFactory>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_template(&mut self, type_name: String, template: GameObjectDescriptor) {
        self.templates.insert(type_name, template);
    }

    pub(crate) fn insert_behavior(&mut self, type_name: String, factory: BehaviorFactory) {
        self.behaviors.insert(type_name, factory);
    }

    pub fn template(&self, type_name: &str) -> Option<&GameObjectDescriptor> {
        self.templates.get(type_name)
    }

    pub fn has_behavior(&self, type_name: &str) -> bool {
        self.behaviors.contains_key(type_name)
    }

    /// Template type names in manifest order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The descriptor a node is built from: its type template with the node's own keys on top.
    pub fn effective_descriptor(&self, descriptor: &GameObjectDescriptor) -> GameObjectDescriptor {
        match descriptor.type_name.as_deref().and_then(|t| self.template(t)) {
            Some(template) => descriptor.merged_over(template),
            None => descriptor.clone(),
        }
    }

    pub fn create_behavior(&self, effective: &GameObjectDescriptor) -> Box<dyn GameObjectBehavior> {
        match effective
            .type_name
            .as_deref()
            .and_then(|t| self.behaviors.get(t))
        {
            Some(factory) => factory(effective),
            None => Box::new(DefaultBehavior),
        }
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field("behaviors", &self.behaviors.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) fn factory<F>(f: F) -> BehaviorFactory
where
    F: Fn(&GameObjectDescriptor) -> Box<dyn GameObjectBehavior> + 'static,
{
    Rc::new(f)
}
