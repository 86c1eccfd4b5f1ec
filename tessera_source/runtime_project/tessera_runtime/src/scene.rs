use crate::builder::{BuildContext, build_roots};
use crate::{
    DefaultSceneBehavior, GameObject, SceneBehavior, SceneBehaviorFactory, SceneError,
    TypeRegistry,
};
use serde_json::Value;
use std::fmt::{self, Write};
use std::time::{Duration, Instant};
use tessera_ids::{IdSequence, ObjectID, SceneID, SessionID, next_scene_id};
use tessera_io::{AssetError, AssetStore};
use tessera_physics::PhysicsWorld3D;
use tessera_scene::{RigidBodyKind, SceneDescriptor};
use tessera_structs::{Transform3D, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Loading,
    Active,
    Unloaded,
}

/// Identity of a scene as seen by scene behaviors.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfo {
    pub id: SceneID,
    pub name: String,
    pub path: String,
    /// Owning session; cleared when the scene is unloaded.
    pub session: Option<SessionID>,
    pub gravity: Vector3,
}

/// Everything a scene build reads from its session.
pub struct SceneLoader<'a> {
    pub store: &'a AssetStore,
    pub registry: &'a TypeRegistry,
    pub session: SessionID,
    pub timestep: f32,
}

struct SceneLoadStats {
    fetch: Duration,
    build: Duration,
}

impl SceneLoader<'_> {
    /// Fetch and build a scene. The result is fully constructed but not yet active:
    /// no hook has fired.
    pub async fn load(
        &self,
        name: &str,
        path: &str,
        behavior: Option<&SceneBehaviorFactory>,
    ) -> Result<Scene, SceneError> {
        let fetch_start = Instant::now();
        let scene_error = |source: AssetError| SceneError::Asset {
            scene: name.to_string(),
            source,
        };
        let json = self.store.load_json(path).await.map_err(scene_error)?;
        let descriptor = SceneDescriptor::from_json(json).map_err(|err| {
            scene_error(AssetError::Parse {
                path: path.to_string(),
                reason: err.to_string(),
            })
        })?;
        let fetch = fetch_start.elapsed();

        let build_start = Instant::now();
        let id = next_scene_id();
        let info = SceneInfo {
            id,
            name: name.to_string(),
            path: path.to_string(),
            session: Some(self.session),
            gravity: descriptor.gravity(),
        };
        let mut physics = PhysicsWorld3D::new(info.gravity);
        physics.set_timestep(self.timestep);

        let ids = IdSequence::with_generation(id.index());
        let ctx = BuildContext {
            store: self.store,
            registry: self.registry,
            scene: id,
            ids: &ids,
        };
        let roots = build_roots(&ctx, &mut physics, &descriptor.game_objects).await?;

        let behavior: Box<dyn SceneBehavior> = match behavior {
            Some(factory) => factory(&info),
            None => Box::new(DefaultSceneBehavior),
        };
        let scene = Scene {
            info,
            background: descriptor.background,
            roots,
            physics,
            state: SceneState::Loading,
            behavior,
        };
        debug_print_scene_load(
            &scene,
            SceneLoadStats {
                fetch,
                build: build_start.elapsed(),
            },
        );
        Ok(scene)
    }
}

fn debug_print_scene_load(scene: &Scene, stats: SceneLoadStats) {
    log::info!(
        "[scene_load] scene={} path={} objects={} bodies={} fetch_us={:.3} build_us={:.3}",
        scene.name(),
        scene.info.path,
        scene.object_count(),
        scene.body_count(),
        as_us(stats.fetch),
        as_us(stats.build),
    );
}

fn as_us(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000_000.0
}

/// One loaded scene: its object forest and the physics world those objects live in.
pub struct Scene {
    info: SceneInfo,
    background: Option<Value>,
    roots: Vec<GameObject>,
    physics: PhysicsWorld3D,
    state: SceneState,
    behavior: Box<dyn SceneBehavior>,
}

impl Scene {
    pub fn id(&self) -> SceneID {
        self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &SceneInfo {
        &self.info
    }

    pub fn session(&self) -> Option<SessionID> {
        self.info.session
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn gravity(&self) -> Vector3 {
        self.info.gravity
    }

    pub fn background(&self) -> Option<&Value> {
        self.background.as_ref()
    }

    pub fn roots(&self) -> &[GameObject] {
        &self.roots
    }

    pub fn physics(&self) -> &PhysicsWorld3D {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld3D {
        &mut self.physics
    }

    /// Pre-order over every object, with its depth (roots are 0).
    pub fn visit<'a>(&'a self, mut f: impl FnMut(&'a GameObject, usize)) {
        for root in &self.roots {
            root.visit(0, &mut f);
        }
    }

    pub fn object_count(&self) -> usize {
        self.roots.iter().map(GameObject::subtree_len).sum()
    }

    pub fn body_count(&self) -> usize {
        self.physics.body_count()
    }

    pub fn object(&self, id: ObjectID) -> Option<&GameObject> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn object_mut(&mut self, id: ObjectID) -> Option<&mut GameObject> {
        self.roots.iter_mut().find_map(|root| root.find_mut(id))
    }

    /// First object with this name, in pre-order.
    pub fn find_by_name(&self, name: &str) -> Option<&GameObject> {
        let mut found = None;
        self.visit(|object, _| {
            if found.is_none() && object.name() == name {
                found = Some(object);
            }
        });
        found
    }

    /// Every object carrying `tag`, in pre-order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<&GameObject> {
        let mut found = Vec::new();
        self.visit(|object, _| {
            if object.has_tag(tag) {
                found.push(object);
            }
        });
        found
    }

    /// Remove an object and its subtree at runtime.
    ///
    /// Unload hooks fire in pre-order first; bodies are then released children-first.
    pub fn destroy_object(&mut self, id: ObjectID) -> bool {
        let detached = match self.roots.iter().position(|root| root.id() == id) {
            Some(index) => Some(self.roots.remove(index)),
            None => self
                .roots
                .iter_mut()
                .find_map(|root| root.take_descendant(id)),
        };
        let Some(mut detached) = detached else {
            return false;
        };
        detached.fire_unload();
        let released = detached.release_bodies(&mut self.physics);
        log::debug!(
            "destroyed `{}` ({} object(s), {released} body(ies))",
            detached.name(),
            detached.subtree_len()
        );
        true
    }

    /// Post-load: the scene hook, then every object in pre-order.
    pub(crate) fn activate(&mut self) {
        self.behavior.on_load(&self.info);
        for root in &mut self.roots {
            root.fire_load();
        }
        self.state = SceneState::Active;
    }

    /// Pre-unload: the scene hook, then every object in pre-order. Then detach from
    /// the session and tear the physics bodies down.
    pub(crate) fn unload(&mut self) {
        if self.state == SceneState::Unloaded {
            return;
        }
        self.behavior.on_unload(&self.info);
        for root in &mut self.roots {
            root.fire_unload();
        }
        self.info.session = None;
        for root in &mut self.roots {
            root.release_bodies(&mut self.physics);
        }
        self.state = SceneState::Unloaded;
        log::info!("scene `{}` unloaded", self.info.name);
    }

    /// Advance physics by `dt`, copy moving body poses back, then run behavior updates.
    /// Returns the number of physics steps taken.
    pub(crate) fn update(&mut self, dt: f32) -> u32 {
        let steps = self.physics.advance(dt);
        if steps > 0 {
            self.sync_body_poses();
        }
        for root in &mut self.roots {
            root.fire_update(dt);
        }
        steps
    }

    fn sync_body_poses(&mut self) {
        let physics = &self.physics;
        for root in &mut self.roots {
            root.visit_mut(&mut |object: &mut GameObject| {
                let data = object.data_mut();
                let Some(handle) = data.body.as_ref() else {
                    return;
                };
                if data.body_kind == Some(RigidBodyKind::Fixed) {
                    return;
                }
                if let Some(pose) = physics.body_pose(handle.body) {
                    data.world_transform =
                        Transform3D::new(pose.position, pose.rotation, data.world_transform.scale);
                }
            });
        }
    }

    /// Indented `- name [type] (body)` lines, one per object in pre-order.
    pub fn describe_tree(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.name(), self.id());
        self.visit(|object, depth| {
            let indent = "  ".repeat(depth + 1);
            let _ = write!(out, "{indent}- {}", object.name());
            if let Some(type_name) = object.type_name() {
                let _ = write!(out, " [{type_name}]");
            }
            if let Some(kind) = object.data().body_kind {
                let _ = write!(out, " ({kind:?} body)");
            }
            out.push('\n');
        });
        out
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("info", &self.info)
            .field("state", &self.state)
            .field("objects", &self.object_count())
            .field("bodies", &self.body_count())
            .finish()
    }
}
