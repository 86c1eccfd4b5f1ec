use crate::Scene;

/// Opaque handle to the surface a renderer draws into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasHandle {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

impl CanvasHandle {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
        }
    }
}

/// The render loop the session drives. Drawing itself is out of scope here.
pub trait Renderer {
    fn canvas(&self) -> CanvasHandle;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Called once per session update while playing.
    fn render(&mut self, _scene: &Scene) {}
}

/// Renderer with no output. Counts frames so callers can see the loop ran.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    canvas: CanvasHandle,
    playing: bool,
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: CanvasHandle::new("headless", width, height),
            playing: false,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl Renderer for HeadlessRenderer {
    fn canvas(&self) -> CanvasHandle {
        self.canvas.clone()
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn render(&mut self, scene: &Scene) {
        self.frames += 1;
        log::trace!("frame {} of `{}`", self.frames, scene.name());
    }
}
