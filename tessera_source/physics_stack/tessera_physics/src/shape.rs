use crate::BindError;
use rapier3d::na::DMatrix;
use rapier3d::prelude::*;
use tessera_scene::{ColliderDescriptor, ColliderShape, points};
use tessera_structs::Vector3;

/// Build a collider for one descriptor entry: geometry first, then the shared
/// physical properties and the body-relative offset.
pub fn collider_from_descriptor(
    descriptor: &ColliderDescriptor,
    shape: &ColliderShape,
) -> Result<Collider, BindError> {
    let offset = descriptor.translation();
    Ok(shape_to_collider_builder(shape)?
        .density(descriptor.density())
        .friction(descriptor.friction())
        .sensor(descriptor.sensor())
        .translation(vector![offset.x, offset.y, offset.z])
        .build())
}

/// Convert a validated shape to a rapier builder.
/// Hulls and meshes rapier cannot build (coplanar hull, non-convex mesh) are rejected here.
pub fn shape_to_collider_builder(shape: &ColliderShape) -> Result<ColliderBuilder, BindError> {
    let builder = match shape {
        ColliderShape::Ball { radius } => ColliderBuilder::ball(*radius),
        ColliderShape::Capsule {
            half_height,
            radius,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShape::Cone {
            half_height,
            radius,
        } => ColliderBuilder::cone(*half_height, *radius),
        ColliderShape::Cylinder {
            half_height,
            radius,
        } => ColliderBuilder::cylinder(*half_height, *radius),
        ColliderShape::Cuboid { hx, hy, hz } => ColliderBuilder::cuboid(*hx, *hy, *hz),
        ColliderShape::RoundCone {
            half_height,
            radius,
            border_radius,
        } => ColliderBuilder::round_cone(*half_height, *radius, *border_radius),
        ColliderShape::RoundCylinder {
            half_height,
            radius,
            border_radius,
        } => ColliderBuilder::round_cylinder(*half_height, *radius, *border_radius),
        ColliderShape::RoundCuboid {
            hx,
            hy,
            hz,
            border_radius,
        } => ColliderBuilder::round_cuboid(*hx, *hy, *hz, *border_radius),
        ColliderShape::Triangle { a, b, c } => {
            ColliderBuilder::triangle(to_point(a), to_point(b), to_point(c))
        }
        ColliderShape::RoundTriangle {
            a,
            b,
            c,
            border_radius,
        } => ColliderBuilder::round_triangle(to_point(a), to_point(b), to_point(c), *border_radius),
        ColliderShape::ConvexHull { vertices } => {
            ColliderBuilder::convex_hull(&to_points(vertices))
                .ok_or_else(|| rejected(shape, "points do not span a volume"))?
        }
        ColliderShape::RoundConvexHull {
            vertices,
            border_radius,
        } => ColliderBuilder::round_convex_hull(&to_points(vertices), *border_radius)
            .ok_or_else(|| rejected(shape, "points do not span a volume"))?,
        ColliderShape::ConvexMesh { vertices, indices } => {
            ColliderBuilder::convex_mesh(to_points(vertices), &triangles(indices))
                .ok_or_else(|| rejected(shape, "mesh is not convex"))?
        }
        ColliderShape::RoundConvexMesh {
            vertices,
            indices,
            border_radius,
        } => ColliderBuilder::round_convex_mesh(
            to_points(vertices),
            &triangles(indices),
            *border_radius,
        )
        .ok_or_else(|| rejected(shape, "mesh is not convex"))?,
        ColliderShape::Trimesh { vertices, indices } => {
            ColliderBuilder::trimesh(to_points(vertices), triangles(indices))
                .map_err(|err| rejected(shape, format!("{err:?}")))?
        }
        ColliderShape::Polyline { vertices, indices } => {
            let segments = indices.as_ref().map(|indices| {
                indices
                    .chunks_exact(2)
                    .map(|c| [c[0], c[1]])
                    .collect::<Vec<_>>()
            });
            ColliderBuilder::polyline(to_points(vertices), segments)
        }
        ColliderShape::Heightfield {
            nrows,
            ncols,
            heights,
            scale,
        } => {
            // Column-major, so from_vec matches the authored sample order.
            let samples = DMatrix::from_vec(
                *nrows as usize + 1,
                *ncols as usize + 1,
                heights.clone(),
            );
            ColliderBuilder::heightfield(samples, vector![scale.x, scale.y, scale.z])
        }
    };
    Ok(builder)
}

fn rejected(shape: &ColliderShape, reason: impl Into<String>) -> BindError {
    BindError::Rejected {
        shape: shape.tag(),
        reason: reason.into(),
    }
}

fn to_point(v: &Vector3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

fn to_points(vertices: &[f32]) -> Vec<Point<Real>> {
    points(vertices).map(|[x, y, z]| Point::new(x, y, z)).collect()
}

fn triangles(indices: &[u32]) -> Vec<[u32; 3]> {
    indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}
