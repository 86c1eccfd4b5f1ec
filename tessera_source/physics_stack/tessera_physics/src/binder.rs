use crate::{BindError, PhysicsWorld3D, collider_from_descriptor, transform_to_isometry};
use rapier3d::prelude::*;
use tessera_scene::{RigidBodyDescriptor, RigidBodyKind};
use tessera_structs::Transform3D;

/// Live handles of one bound rigid body. Colliders are in descriptor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyHandle {
    pub body: RigidBodyHandle,
    pub colliders: Vec<ColliderHandle>,
}

/// Turns rigid-body descriptors into live simulation objects and tears them down again.
pub trait PhysicsBinder {
    fn bind(
        &mut self,
        descriptor: &RigidBodyDescriptor,
        world_transform: &Transform3D,
    ) -> Result<BodyHandle, BindError>;

    /// Removes the body and all its colliders. Returns false if the body was already gone.
    fn release(&mut self, handle: &BodyHandle) -> bool;
}

pub fn body_type(kind: RigidBodyKind) -> RigidBodyType {
    match kind {
        RigidBodyKind::Dynamic => RigidBodyType::Dynamic,
        RigidBodyKind::Fixed => RigidBodyType::Fixed,
        RigidBodyKind::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        RigidBodyKind::KinematicVelocityBased => RigidBodyType::KinematicVelocityBased,
    }
}

impl PhysicsBinder for PhysicsWorld3D {
    fn bind(
        &mut self,
        descriptor: &RigidBodyDescriptor,
        world_transform: &Transform3D,
    ) -> Result<BodyHandle, BindError> {
        // Every collider is built before the body goes in, so a bad shape leaves the world untouched.
        let colliders = descriptor
            .collider_shapes()?
            .into_iter()
            .map(|(collider, shape)| collider_from_descriptor(collider, &shape))
            .collect::<Result<Vec<_>, _>>()?;

        let t = descriptor.enabled_translations;
        let r = descriptor.enabled_rotations;
        let body = RigidBodyBuilder::new(body_type(descriptor.kind))
            .position(transform_to_isometry(world_transform))
            .enabled_translations(t.x, t.y, t.z)
            .enabled_rotations(r.x, r.y, r.z)
            .build();
        let body = self.bodies.insert(body);

        let colliders = colliders
            .into_iter()
            .map(|collider| {
                self.colliders
                    .insert_with_parent(collider, body, &mut self.bodies)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "bound {:?} body with {} collider(s)",
            descriptor.kind,
            colliders.len()
        );
        Ok(BodyHandle { body, colliders })
    }

    fn release(&mut self, handle: &BodyHandle) -> bool {
        self.remove_body(handle.body)
    }
}
