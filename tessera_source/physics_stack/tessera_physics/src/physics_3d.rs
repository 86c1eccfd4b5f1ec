//! 3D physics world using Rapier3D

use rapier3d::na::{Quaternion as NaQuaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use tessera_structs::{Quaternion, Transform3D, Vector3};

/// Longest catch-up a single `advance` call will simulate.
const MAX_SUBSTEPS: u32 = 8;

/// Manages the Rapier3D physics world of one scene
pub struct PhysicsWorld3D {
    pub pipeline: PhysicsPipeline,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub islands: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    /// The query pipeline for spatial queries
    pub query_pipeline: QueryPipeline,
    pub ccd_solver: CCDSolver,
    accumulator: f32,
}

impl PhysicsWorld3D {
    pub fn new(gravity: Vector3) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![gravity.x, gravity.y, gravity.z],
            integration_parameters: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            ccd_solver: CCDSolver::new(),
            accumulator: 0.0,
        }
    }

    pub fn gravity(&self) -> Vector3 {
        Vector3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Non-positive or non-finite values are ignored.
    pub fn set_timestep(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.integration_parameters.dt = dt;
        }
    }

    /// Step the physics simulation once by the fixed timestep
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Accumulate `elapsed` seconds and run as many fixed steps as fit.
    /// Returns the number of steps taken.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }
        let dt = self.timestep();
        self.accumulator += elapsed;
        let mut steps = 0;
        while self.accumulator >= dt && steps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= dt;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        steps
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Remove a body together with every collider attached to it
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Current body pose as a unit-scale transform.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Transform3D> {
        self.bodies
            .get(handle)
            .map(|body| isometry_to_transform(body.position()))
    }
}

impl Default for PhysicsWorld3D {
    fn default() -> Self {
        Self::new(Vector3::ZERO)
    }
}

/// Position and rotation only; rapier bodies carry no scale.
pub fn transform_to_isometry(transform: &Transform3D) -> Isometry<Real> {
    let p = transform.position;
    let r = transform.rotation;
    Isometry::from_parts(
        Translation3::new(p.x, p.y, p.z),
        UnitQuaternion::from_quaternion(NaQuaternion::new(r.w, r.x, r.y, r.z)),
    )
}

pub fn isometry_to_transform(iso: &Isometry<Real>) -> Transform3D {
    let t = iso.translation.vector;
    let q = iso.rotation.quaternion();
    Transform3D::new(
        Vector3::new(t.x, t.y, t.z),
        Quaternion::new(q.i, q.j, q.k, q.w),
        Vector3::ONE,
    )
}
