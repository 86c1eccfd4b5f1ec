use crate::CanvasHandle;
use tessera_project::RuntimeConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputConfig {
    pub pointer_lock: bool,
}

impl From<&RuntimeConfig> for InputConfig {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            pointer_lock: config.pointer_lock,
        }
    }
}

/// Input handling bound to a canvas. The session constructs and owns it; device
/// handling lives behind this trait.
pub trait InputManager {
    fn canvas(&self) -> &CanvasHandle;

    fn config(&self) -> &InputConfig;
}

#[derive(Debug, Clone)]
pub struct CanvasInput {
    canvas: CanvasHandle,
    config: InputConfig,
}

impl CanvasInput {
    pub fn new(canvas: CanvasHandle, config: InputConfig) -> Self {
        log::debug!(
            "input bound to canvas `{}` (pointer_lock={})",
            canvas.label,
            config.pointer_lock
        );
        Self { canvas, config }
    }
}

impl InputManager for CanvasInput {
    fn canvas(&self) -> &CanvasHandle {
        &self.canvas
    }

    fn config(&self) -> &InputConfig {
        &self.config
    }
}
