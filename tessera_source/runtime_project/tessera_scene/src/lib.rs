pub mod collider;
pub mod descriptor;
pub mod error;
pub mod manifest;

pub use collider::*;
pub use descriptor::*;
pub use error::*;
pub use manifest::*;
