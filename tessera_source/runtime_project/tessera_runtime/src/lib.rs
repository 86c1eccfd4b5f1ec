//! Game runtime: sessions, scenes, and the game-object lifecycle on top of the
//! asset store and the physics world.

pub mod behavior;
mod builder;
pub mod error;
pub mod game_object;
pub mod input;
pub mod registry;
pub mod renderer;
pub mod scene;
pub mod session;

pub use behavior::*;
pub use error::*;
pub use game_object::*;
pub use input::*;
pub use registry::TypeRegistry;
pub use renderer::*;
pub use scene::*;
pub use session::*;
