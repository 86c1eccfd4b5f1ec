use crate::registry::factory;
use crate::{
    CanvasInput, GameObjectBehavior, HeadlessRenderer, InputConfig, InputManager, Renderer, Scene,
    SceneBehavior, SceneBehaviorFactory, SceneInfo, SceneLoader, SessionError, TypeRegistry,
};
use ahash::AHashMap;
use indexmap::IndexMap;
use std::{
    cell::{Cell, Ref, RefCell},
    path::PathBuf,
    rc::Rc,
};
use tessera_ids::{SessionID, next_session_id};
use tessera_io::{AssetError, AssetLocation, AssetResult, AssetStore};
use tessera_project::{DEFAULT_MANIFEST, DEFAULT_TIMESTEP, RuntimeConfig};
use tessera_scene::{GameManifest, GameObjectDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Construction parameters. Exactly one of `base_url` / `base_dir` must be set.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub base_url: Option<String>,
    pub base_dir: Option<PathBuf>,
    pub manifest: String,
    pub timestep: f32,
    pub input: InputConfig,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            base_dir: None,
            manifest: DEFAULT_MANIFEST.to_string(),
            timestep: DEFAULT_TIMESTEP,
            input: InputConfig::default(),
        }
    }
}

impl From<&RuntimeConfig> for SessionOptions {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            base_url: config.base_url().map(str::to_string),
            base_dir: config.base_dir().map(PathBuf::from),
            manifest: config.manifest.clone(),
            timestep: config.timestep,
            input: InputConfig::from(config),
        }
    }
}

/// Clears the scene-load flag when dropped, whichever way the load ends.
struct LoadGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> LoadGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, SessionError> {
        if flag.replace(true) {
            return Err(SessionError::ConcurrentLoad);
        }
        Ok(Self { flag })
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Moves the session back to `Uninitialized` unless the init attempt commits.
struct InitAttempt<'a> {
    state: &'a Cell<SessionState>,
    committed: bool,
}

impl Drop for InitAttempt<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.state.set(SessionState::Uninitialized);
        }
    }
}

/// One running game: asset store, type registry, and at most one active scene.
///
/// Single-threaded. All methods take `&self` so loads can interleave on one task;
/// at most one scene transition runs at a time.
pub struct GameSession {
    id: SessionID,
    store: AssetStore,
    manifest_path: String,
    timestep: f32,
    state: Cell<SessionState>,
    manifest: RefCell<Option<Rc<GameManifest>>>,
    registry: RefCell<Option<Rc<TypeRegistry>>>,
    pending_behaviors: RefCell<IndexMap<String, crate::BehaviorFactory>>,
    scene_behaviors: RefCell<AHashMap<String, SceneBehaviorFactory>>,
    scene: RefCell<Option<Scene>>,
    loading_scene: Cell<bool>,
    playing: Cell<bool>,
    renderer: RefCell<Box<dyn Renderer>>,
    input: Box<dyn InputManager>,
}

impl GameSession {
    /// Fails with `InvalidConstructorArgument` unless exactly one base location is given.
    pub fn new(options: SessionOptions) -> Result<Self, SessionError> {
        let location =
            AssetLocation::from_parts(options.base_url.as_deref(), options.base_dir.as_deref())?;
        let store = AssetStore::from_location(location)?;
        Ok(Self::with_asset_store(store, options))
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, SessionError> {
        Self::new(SessionOptions::from(config))
    }

    /// Use an existing store; the base fields of `options` are ignored.
    pub fn with_asset_store(store: AssetStore, options: SessionOptions) -> Self {
        let renderer = HeadlessRenderer::default();
        let input = CanvasInput::new(renderer.canvas(), options.input);
        let id = next_session_id();
        log::debug!("session {id} over {}", store.describe_base());
        Self {
            id,
            store,
            manifest_path: options.manifest,
            timestep: options.timestep,
            state: Cell::new(SessionState::Uninitialized),
            manifest: RefCell::new(None),
            registry: RefCell::new(None),
            pending_behaviors: RefCell::new(IndexMap::new()),
            scene_behaviors: RefCell::new(AHashMap::new()),
            scene: RefCell::new(None),
            loading_scene: Cell::new(false),
            playing: Cell::new(false),
            renderer: RefCell::new(Box::new(renderer)),
            input: Box::new(input),
        }
    }

    /// Swap the renderer. Input is rebound to the new renderer's canvas.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        let config = self.input.config().clone();
        self.input = Box::new(CanvasInput::new(renderer.canvas(), config));
        self.renderer = RefCell::new(Box::new(renderer));
        self
    }

    pub fn id(&self) -> SessionID {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn input(&self) -> &dyn InputManager {
        self.input.as_ref()
    }

    pub fn renderer(&self) -> Ref<'_, dyn Renderer> {
        Ref::map(self.renderer.borrow(), |renderer| renderer.as_ref())
    }

    pub fn manifest(&self) -> Option<Rc<GameManifest>> {
        self.manifest.borrow().clone()
    }

    pub fn registry(&self) -> Option<Rc<TypeRegistry>> {
        self.registry.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_scene.get()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    pub fn has_active_scene(&self) -> bool {
        self.scene.borrow().is_some()
    }

    pub fn active_scene_name(&self) -> Option<String> {
        self.scene.borrow().as_ref().map(|scene| scene.name().to_string())
    }

    /// Read the active scene, if any.
    pub fn with_scene<R>(&self, f: impl FnOnce(&Scene) -> R) -> Option<R> {
        self.scene.borrow().as_ref().map(f)
    }

    pub fn with_scene_mut<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> Option<R> {
        self.scene.borrow_mut().as_mut().map(f)
    }

    /// Attach a behavior factory to a game-object type name. Only before `init`.
    pub fn register_behavior<F>(&self, type_name: &str, f: F) -> Result<(), SessionError>
    where
        F: Fn(&GameObjectDescriptor) -> Box<dyn GameObjectBehavior> + 'static,
    {
        if self.state.get() != SessionState::Uninitialized {
            return Err(SessionError::AlreadyInitialized);
        }
        self.pending_behaviors
            .borrow_mut()
            .insert(type_name.to_string(), factory(f));
        Ok(())
    }

    /// Attach scene-level hooks to a scene name. Applies from the next load of that scene.
    pub fn register_scene_behavior<F>(&self, scene_name: &str, f: F)
    where
        F: Fn(&SceneInfo) -> Box<dyn SceneBehavior> + 'static,
    {
        self.scene_behaviors
            .borrow_mut()
            .insert(scene_name.to_string(), Rc::new(f));
    }

    /// Load the manifest and every declared type definition, in manifest order.
    /// Any failure leaves the session uninitialized so `init` can be called again.
    pub async fn init(&self) -> Result<(), SessionError> {
        if self.state.get() != SessionState::Uninitialized {
            return Err(SessionError::AlreadyInitialized);
        }
        self.state.set(SessionState::Initializing);
        let mut attempt = InitAttempt {
            state: &self.state,
            committed: false,
        };

        let manifest = self.load_manifest().await?;
        let registry = self.load_registry(&manifest).await?;

        log::info!(
            "session {} ready: {} scene(s), {} type(s)",
            self.id,
            manifest.scenes.len(),
            registry.len()
        );
        *self.manifest.borrow_mut() = Some(Rc::new(manifest));
        *self.registry.borrow_mut() = Some(Rc::new(registry));
        self.state.set(SessionState::Ready);
        attempt.committed = true;
        Ok(())
    }

    async fn load_manifest(&self) -> Result<GameManifest, SessionError> {
        let value = self.store.load_json(&self.manifest_path).await?;
        let manifest = GameManifest::from_json(value)
            .map_err(|err| parse_error(&self.manifest_path, err))?;
        log::info!(
            "manifest `{}` loaded: scenes [{}]",
            self.manifest_path,
            manifest.scene_names().collect::<Vec<_>>().join(", ")
        );
        Ok(manifest)
    }

    async fn load_registry(&self, manifest: &GameManifest) -> Result<TypeRegistry, SessionError> {
        let mut registry = TypeRegistry::new();
        for (type_name, path) in &manifest.game_object_types {
            let value = self.store.load_json(path).await?;
            let template =
                GameObjectDescriptor::from_json(value).map_err(|err| parse_error(path, err))?;
            registry.insert_template(type_name.clone(), template);
            log::debug!("registered game object type `{type_name}` from {path}");
        }
        for (type_name, factory) in self.pending_behaviors.borrow().iter() {
            registry.insert_behavior(type_name.clone(), Rc::clone(factory));
        }
        Ok(registry)
    }

    /// Init on first use. Waits out an init already in flight.
    async fn ensure_init(&self) -> Result<(), SessionError> {
        loop {
            match self.state.get() {
                SessionState::Ready => return Ok(()),
                SessionState::Uninitialized => return self.init().await,
                SessionState::Initializing => tokio::task::yield_now().await,
            }
        }
    }

    fn ready_parts(&self) -> Result<(Rc<GameManifest>, Rc<TypeRegistry>), SessionError> {
        // Both are set together when init commits.
        match (self.manifest(), self.registry()) {
            (Some(manifest), Some(registry)) => Ok((manifest, registry)),
            _ => Err(SessionError::Asset(AssetError::not_found(
                self.manifest_path.clone(),
                self.store.describe_base(),
            ))),
        }
    }

    /// Replace the active scene with `name`.
    ///
    /// The old scene's unload hooks all run before anything of the new scene is built.
    /// On failure no scene is active (the old one stays detached).
    pub async fn load_scene(&self, name: &str) -> Result<(), SessionError> {
        let _guard = LoadGuard::acquire(&self.loading_scene)?;
        self.ensure_init().await?;
        let (manifest, registry) = self.ready_parts()?;
        let path = manifest
            .scene_path(name)
            .ok_or_else(|| SessionError::UnknownScene(name.to_string()))?;

        let previous = self.scene.borrow_mut().take();
        if let Some(mut previous) = previous {
            previous.unload();
        }

        let behavior = self.scene_behaviors.borrow().get(name).cloned();
        let loader = SceneLoader {
            store: &self.store,
            registry: &*registry,
            session: self.id,
            timestep: self.timestep,
        };
        let mut scene = loader.load(name, path, behavior.as_ref()).await?;
        scene.activate();
        *self.scene.borrow_mut() = Some(scene);
        Ok(())
    }

    /// Start the loop, loading the start scene first if none is active.
    pub async fn play(&self) -> Result<(), SessionError> {
        self.ensure_init().await?;
        if !self.has_active_scene() {
            let (manifest, _) = self.ready_parts()?;
            // An `initialScene` means nothing without a scene table to look it up in.
            if manifest.scenes.is_empty() {
                return Err(SessionError::NoScenesDefined);
            }
            let start = manifest
                .startup_scene()
                .ok_or(SessionError::NoScenesDefined)?
                .to_string();
            self.load_scene(&start).await?;
        }
        self.playing.set(true);
        self.renderer.borrow_mut().play();
        Ok(())
    }

    pub fn pause(&self) {
        self.playing.set(false);
        self.renderer.borrow_mut().pause();
    }

    /// One frame: physics, pose write-back, behavior updates, render.
    /// No-op unless playing with an active scene. Returns the physics steps taken.
    pub fn update(&self, dt: f32) -> u32 {
        if !self.playing.get() {
            return 0;
        }
        let mut slot = self.scene.borrow_mut();
        let Some(scene) = slot.as_mut() else {
            return 0;
        };
        let steps = scene.update(dt);
        self.renderer.borrow_mut().render(scene);
        steps
    }

    /// Load any asset through the session's store, sharing its cache and in-flight fetches.
    pub async fn load_asset(&self, path: &str) -> AssetResult {
        self.store.load(path).await
    }
}

fn parse_error(path: &str, err: impl std::fmt::Display) -> AssetError {
    AssetError::Parse {
        path: path.to_string(),
        reason: err.to_string(),
    }
}
