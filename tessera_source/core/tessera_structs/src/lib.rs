pub mod quaternion;
pub mod transform_3d;
pub mod vector3;

pub use quaternion::*;
pub use transform_3d::*;
pub use vector3::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn vector3_reads_missing_components_as_zero() {
        let v: Vector3 = serde_json::from_str(r#"{"y": -9.81}"#).expect("valid vector");
        assert_eq!(v, Vector3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn euler_roundtrip_keeps_angles() {
        let euler = Vector3::new(0.3, -0.2, 1.1);
        let back = Quaternion::from_euler(euler).to_euler();
        assert!(back.abs_diff_eq(euler, 1e-5), "got {back}");
    }

    #[test]
    fn child_position_is_relative_to_parent() {
        let parent = Transform3D::from_euler(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, FRAC_PI_2, 0.0),
            Vector3::ONE,
        );
        let child = Transform3D::from_euler(Vector3::new(1.0, 0.0, 0.0), Vector3::ZERO, Vector3::ONE);

        let world = child.under(&parent);
        // +X rotated a quarter turn about +Y points to -Z.
        assert!(
            world.position.abs_diff_eq(Vector3::new(10.0, 0.0, -1.0), 1e-5),
            "got {}",
            world.position
        );
    }

    #[test]
    fn parent_scale_stretches_child_offset() {
        let parent = Transform3D::from_euler(Vector3::ZERO, Vector3::ZERO, Vector3::new(2.0, 2.0, 2.0));
        let child = Transform3D::from_euler(Vector3::new(0.0, 1.5, 0.0), Vector3::ZERO, Vector3::ONE);
        let world = child.under(&parent);
        assert!(world.position.abs_diff_eq(Vector3::new(0.0, 3.0, 0.0), 1e-5));
        assert!(world.scale.abs_diff_eq(Vector3::new(2.0, 2.0, 2.0), 1e-5));
    }

    #[test]
    fn zero_parent_scale_keeps_rotation_finite() {
        let parent = Transform3D::from_euler(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, FRAC_PI_2, 0.0),
            Vector3::ZERO,
        );
        let child = Transform3D::from_euler(Vector3::new(4.0, 0.0, 0.0), Vector3::new(0.5, 0.0, 0.0), Vector3::ONE);

        let world = child.under(&parent);
        assert!(world.rotation.to_quat().is_finite(), "got {}", world.rotation);
        assert!(world.rotation.to_quat().is_normalized());
        assert!(world.position.abs_diff_eq(Vector3::new(1.0, 2.0, 3.0), 1e-5));
        assert_eq!(world.scale, Vector3::ZERO);
    }

    #[test]
    fn identity_parent_leaves_child_unchanged() {
        let child = Transform3D::from_euler(
            Vector3::new(1.0, -2.0, 0.5),
            Vector3::new(0.2, 0.4, -0.6),
            Vector3::new(1.0, 3.0, 0.5),
        );
        let world = child.under(&Transform3D::IDENTITY);
        assert!(world.position.abs_diff_eq(child.position, 1e-6));
        assert!(world.scale.abs_diff_eq(child.scale, 1e-6));
        assert!(world.rotation.to_quat().abs_diff_eq(child.rotation.to_quat(), 1e-6));
    }
}
