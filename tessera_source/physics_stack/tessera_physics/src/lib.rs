pub mod binder;
pub mod error;
pub mod physics_3d;
pub mod shape;

pub use binder::*;
pub use error::*;
pub use physics_3d::*;
pub use shape::*;

pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::prelude::*;
    use serde_json::json;
    use tessera_scene::RigidBodyDescriptor;
    use tessera_structs::{Transform3D, Vector3};

    fn body(value: serde_json::Value) -> RigidBodyDescriptor {
        serde_json::from_value(value).expect("rigid body descriptor")
    }

    fn at(x: f32, y: f32, z: f32) -> Transform3D {
        Transform3D::from_euler(Vector3::new(x, y, z), Vector3::ZERO, Vector3::ONE)
    }

    #[test]
    fn box_scenario_binds_one_fixed_cuboid() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "fixed",
            "colliders": [{ "type": "cuboid", "hx": 1, "hy": 1, "hz": 1 }]
        }));

        let handle = world.bind(&desc, &at(0.0, 2.0, 0.0)).expect("bind");
        assert_eq!(world.body_count(), 1);
        assert_eq!(handle.colliders.len(), 1);

        let rb = world.body(handle.body).unwrap();
        assert_eq!(rb.body_type(), RigidBodyType::Fixed);
        assert_eq!(rb.translation().y, 2.0);

        let collider = world.collider(handle.colliders[0]).unwrap();
        let cuboid = collider.shape().as_cuboid().expect("cuboid shape");
        assert_eq!(cuboid.half_extents, vector![1.0, 1.0, 1.0]);
        assert_eq!(collider.friction(), 0.5);
        assert_eq!(collider.density(), 1.0);
        assert!(!collider.is_sensor());
        assert_eq!(collider.parent(), Some(handle.body));
    }

    #[test]
    fn kinds_map_to_rapier_body_types() {
        let mut world = PhysicsWorld3D::default();
        for (kind, expected) in [
            ("dynamic", RigidBodyType::Dynamic),
            ("fixed", RigidBodyType::Fixed),
            ("kinematicPositionBased", RigidBodyType::KinematicPositionBased),
            ("kinematicVelocityBased", RigidBodyType::KinematicVelocityBased),
        ] {
            let desc = body(json!({ "kind": kind, "colliders": [{ "type": "ball", "radius": 1 }] }));
            let handle = world.bind(&desc, &Transform3D::IDENTITY).unwrap();
            assert_eq!(world.body(handle.body).unwrap().body_type(), expected);
        }
    }

    #[test]
    fn axis_masks_lock_disabled_axes() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "dynamic",
            "enabledTranslations": { "x": false, "z": false },
            "enabledRotations": { "x": false, "y": false, "z": false },
            "colliders": [{ "type": "ball", "radius": 0.5 }]
        }));
        let handle = world.bind(&desc, &Transform3D::IDENTITY).unwrap();
        let locked = world.body(handle.body).unwrap().locked_axes();

        assert!(locked.contains(LockedAxes::TRANSLATION_LOCKED_X));
        assert!(!locked.contains(LockedAxes::TRANSLATION_LOCKED_Y));
        assert!(locked.contains(LockedAxes::TRANSLATION_LOCKED_Z));
        assert!(locked.contains(LockedAxes::ROTATION_LOCKED));
    }

    #[test]
    fn explicit_properties_and_offsets_are_applied() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "fixed",
            "colliders": [{
                "type": "ball", "radius": 1,
                "friction": 0, "density": 3, "sensor": true,
                "translation": { "y": 1.5 }
            }]
        }));
        let handle = world.bind(&desc, &Transform3D::IDENTITY).unwrap();
        let collider = world.collider(handle.colliders[0]).unwrap();
        assert_eq!(collider.friction(), 0.0);
        assert_eq!(collider.density(), 3.0);
        assert!(collider.is_sensor());
        assert_eq!(collider.translation().y, 1.5);
    }

    #[test]
    fn colliders_attach_in_declared_order() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "dynamic",
            "colliders": [
                { "type": "cuboid", "hx": 1, "hy": 1, "hz": 1 },
                { "type": "ball", "radius": 0.25 },
                { "type": "capsule", "halfHeight": 1, "radius": 0.5 }
            ]
        }));
        let handle = world.bind(&desc, &Transform3D::IDENTITY).unwrap();
        let kinds: Vec<_> = handle
            .colliders
            .iter()
            .map(|&h| world.collider(h).unwrap().shape().shape_type())
            .collect();
        assert_eq!(
            kinds,
            vec![ShapeType::Cuboid, ShapeType::Ball, ShapeType::Capsule]
        );
    }

    #[test]
    fn every_shape_family_builds() {
        let mut world = PhysicsWorld3D::default();
        let tetra = json!([0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]);
        let faces = json!([0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]);
        let colliders = json!([
            { "type": "ball", "radius": 1 },
            { "type": "capsule", "halfHeight": 1, "radius": 0.5 },
            { "type": "cone", "halfHeight": 1, "radius": 0.5 },
            { "type": "cylinder", "halfHeight": 1, "radius": 0.5 },
            { "type": "cuboid", "hx": 1, "hy": 2, "hz": 3 },
            { "type": "roundCone", "halfHeight": 1, "radius": 0.5, "borderRadius": 0.1 },
            { "type": "roundCylinder", "halfHeight": 1, "radius": 0.5, "borderRadius": 0.1 },
            { "type": "roundCuboid", "hx": 1, "hy": 1, "hz": 1, "borderRadius": 0.1 },
            { "type": "triangle", "a": { "x": 0 }, "b": { "x": 1 }, "c": { "y": 1 } },
            { "type": "roundTriangle", "a": { "x": 0 }, "b": { "x": 1 }, "c": { "y": 1 }, "borderRadius": 0.05 },
            { "type": "convexHull", "vertices": tetra },
            { "type": "roundConvexHull", "vertices": tetra, "borderRadius": 0.1 },
            { "type": "convexMesh", "vertices": tetra, "indices": faces },
            { "type": "roundConvexMesh", "vertices": tetra, "indices": faces, "borderRadius": 0.1 },
            { "type": "trimesh", "vertices": [0, 0, 0, 1, 0, 0, 0, 0, 1], "indices": [0, 1, 2] },
            { "type": "polyline", "vertices": [0, 0, 0, 1, 0, 0, 1, 1, 0] },
            { "type": "polyline", "vertices": [0, 0, 0, 1, 0, 0, 1, 1, 0], "indices": [0, 1, 1, 2] },
            { "type": "heightfield", "nrows": 1, "ncols": 1, "heights": [0, 0, 0, 0],
              "scale": { "x": 10, "y": 1, "z": 10 } }
        ]);
        let desc = body(json!({ "kind": "fixed", "colliders": colliders }));
        let handle = world.bind(&desc, &Transform3D::IDENTITY).expect("all shapes build");
        assert_eq!(handle.colliders.len(), 18);
        assert_eq!(world.collider_count(), 18);
    }

    #[test]
    fn empty_collider_list_inserts_nothing() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({ "kind": "dynamic", "colliders": [] }));
        let err = world.bind(&desc, &Transform3D::IDENTITY).unwrap_err();
        assert!(err.is_invalid_collider_shape());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn bad_shape_leaves_world_untouched() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "dynamic",
            "colliders": [
                { "type": "ball", "radius": 1 },
                { "type": "cuboid", "hx": 1, "hy": 1 }
            ]
        }));
        let err = world.bind(&desc, &Transform3D::IDENTITY).unwrap_err();
        assert!(err.is_invalid_collider_shape());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn undersized_hull_is_rejected() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "fixed",
            "colliders": [{ "type": "convexHull", "vertices": [0, 0, 0, 1, 0, 0, 0, 1, 0] }]
        }));
        let err = world.bind(&desc, &Transform3D::IDENTITY).unwrap_err();
        assert!(matches!(err, BindError::Schema(_)));
        assert!(err.to_string().contains("convexHull"), "{err}");
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn release_removes_body_and_colliders() {
        let mut world = PhysicsWorld3D::default();
        let desc = body(json!({
            "kind": "dynamic",
            "colliders": [{ "type": "ball", "radius": 1 }, { "type": "ball", "radius": 2 }]
        }));
        let handle = world.bind(&desc, &Transform3D::IDENTITY).unwrap();
        assert_eq!(world.collider_count(), 2);

        assert!(world.release(&handle));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(!world.release(&handle));
    }

    #[test]
    fn dynamic_body_falls_under_gravity() {
        let mut world = PhysicsWorld3D::new(Vector3::new(0.0, -9.81, 0.0));
        world.set_timestep(1.0 / 60.0);
        let desc = body(json!({ "kind": "dynamic", "colliders": [{ "type": "ball", "radius": 0.5 }] }));
        let handle = world.bind(&desc, &at(0.0, 10.0, 0.0)).unwrap();

        let steps = world.advance(0.5);
        assert_eq!(steps, 8);
        let pose = world.body_pose(handle.body).unwrap();
        assert!(pose.position.y < 10.0, "{:?}", pose.position);
        assert_eq!(pose.scale, Vector3::ONE);
    }

    #[test]
    fn advance_ignores_non_positive_time() {
        let mut world = PhysicsWorld3D::default();
        assert_eq!(world.advance(0.0), 0);
        assert_eq!(world.advance(-1.0), 0);
        world.set_timestep(0.0);
        assert!(world.timestep() > 0.0);
    }

    #[test]
    fn isometry_roundtrip_keeps_rotation() {
        let t = Transform3D::from_euler(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            Vector3::ONE,
        );
        let back = isometry_to_transform(&transform_to_isometry(&t));
        assert!(back.position.abs_diff_eq(t.position, 1e-5));
        let (a, b) = (back.rotation.to_quat(), t.rotation.to_quat());
        assert!(a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5));
    }
}
