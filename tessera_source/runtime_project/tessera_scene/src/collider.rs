use crate::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_structs::Vector3;

pub const DEFAULT_DENSITY: f32 = 1.0;
pub const DEFAULT_FRICTION: f32 = 0.5;

/// One collider entry of a rigid body, as authored.
///
/// The shared physical properties are typed here; everything else (the `type` tag
/// and the shape geometry) stays raw until `shape()` is asked for, so a bad shape
/// fails the node that owns it rather than the whole scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColliderDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vector3>,
    #[serde(flatten)]
    pub geometry: Map<String, Value>,
}

impl ColliderDescriptor {
    /// `density`, or 1.0 when absent. An explicit 0 stays 0.
    pub fn density(&self) -> f32 {
        self.density.unwrap_or(DEFAULT_DENSITY)
    }

    /// `friction`, or 0.5 when absent. An explicit 0 stays 0.
    pub fn friction(&self) -> f32 {
        self.friction.unwrap_or(DEFAULT_FRICTION)
    }

    pub fn sensor(&self) -> bool {
        self.sensor.unwrap_or(false)
    }

    pub fn translation(&self) -> Vector3 {
        self.translation.unwrap_or(Vector3::ZERO)
    }

    /// The declared `type` tag, if any.
    pub fn shape_tag(&self) -> Option<&str> {
        self.geometry.get("type").and_then(Value::as_str)
    }

    /// Parse and validate the shape geometry.
    pub fn shape(&self) -> Result<ColliderShape, SchemaError> {
        let tag = self.shape_tag().unwrap_or("<missing>").to_string();
        if !self.geometry.contains_key("type") {
            return Err(SchemaError::collider(tag, "missing `type` tag"));
        }
        let shape: ColliderShape = serde_json::from_value(Value::Object(self.geometry.clone()))
            .map_err(|err| SchemaError::collider(&tag, err.to_string()))?;
        shape
            .validate()
            .map_err(|reason| SchemaError::collider(tag, reason))?;
        for (name, value) in [("density", self.density), ("friction", self.friction)] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(SchemaError::collider(
                        shape.tag(),
                        format!("`{name}` must be a non-negative number, got {value}"),
                    ));
                }
            }
        }
        Ok(shape)
    }
}

/// Collision geometry, one variant per supported shape.
///
/// Vertex buffers are flat `[x0, y0, z0, x1, ...]`; index buffers are flat triples
/// (pairs for polylines). Heightfield samples are column-major with
/// `(nrows + 1) * (ncols + 1)` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ColliderShape {
    Ball {
        radius: f32,
    },
    Capsule {
        half_height: f32,
        radius: f32,
    },
    Cone {
        half_height: f32,
        radius: f32,
    },
    ConvexHull {
        vertices: Vec<f32>,
    },
    ConvexMesh {
        vertices: Vec<f32>,
        indices: Vec<u32>,
    },
    Cuboid {
        hx: f32,
        hy: f32,
        hz: f32,
    },
    Cylinder {
        half_height: f32,
        radius: f32,
    },
    Polyline {
        vertices: Vec<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indices: Option<Vec<u32>>,
    },
    RoundCone {
        half_height: f32,
        radius: f32,
        border_radius: f32,
    },
    RoundConvexHull {
        vertices: Vec<f32>,
        border_radius: f32,
    },
    RoundConvexMesh {
        vertices: Vec<f32>,
        indices: Vec<u32>,
        border_radius: f32,
    },
    RoundCuboid {
        hx: f32,
        hy: f32,
        hz: f32,
        border_radius: f32,
    },
    RoundCylinder {
        half_height: f32,
        radius: f32,
        border_radius: f32,
    },
    Triangle {
        a: Vector3,
        b: Vector3,
        c: Vector3,
    },
    RoundTriangle {
        a: Vector3,
        b: Vector3,
        c: Vector3,
        border_radius: f32,
    },
    Trimesh {
        vertices: Vec<f32>,
        indices: Vec<u32>,
    },
    Heightfield {
        nrows: u32,
        ncols: u32,
        heights: Vec<f32>,
        scale: Vector3,
    },
}

impl ColliderShape {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ball { .. } => "ball",
            Self::Capsule { .. } => "capsule",
            Self::Cone { .. } => "cone",
            Self::ConvexHull { .. } => "convexHull",
            Self::ConvexMesh { .. } => "convexMesh",
            Self::Cuboid { .. } => "cuboid",
            Self::Cylinder { .. } => "cylinder",
            Self::Polyline { .. } => "polyline",
            Self::RoundCone { .. } => "roundCone",
            Self::RoundConvexHull { .. } => "roundConvexHull",
            Self::RoundConvexMesh { .. } => "roundConvexMesh",
            Self::RoundCuboid { .. } => "roundCuboid",
            Self::RoundCylinder { .. } => "roundCylinder",
            Self::Triangle { .. } => "triangle",
            Self::RoundTriangle { .. } => "roundTriangle",
            Self::Trimesh { .. } => "trimesh",
            Self::Heightfield { .. } => "heightfield",
        }
    }

    /// Geometry sanity checks the physics engine would otherwise panic on or silently accept.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Ball { radius } => positive("radius", *radius),
            Self::Capsule {
                half_height,
                radius,
            }
            | Self::Cone {
                half_height,
                radius,
            }
            | Self::Cylinder {
                half_height,
                radius,
            } => {
                positive("halfHeight", *half_height)?;
                positive("radius", *radius)
            }
            Self::RoundCone {
                half_height,
                radius,
                border_radius,
            }
            | Self::RoundCylinder {
                half_height,
                radius,
                border_radius,
            } => {
                positive("halfHeight", *half_height)?;
                positive("radius", *radius)?;
                non_negative("borderRadius", *border_radius)
            }
            Self::Cuboid { hx, hy, hz } => {
                positive("hx", *hx)?;
                positive("hy", *hy)?;
                positive("hz", *hz)
            }
            Self::RoundCuboid {
                hx,
                hy,
                hz,
                border_radius,
            } => {
                positive("hx", *hx)?;
                positive("hy", *hy)?;
                positive("hz", *hz)?;
                non_negative("borderRadius", *border_radius)
            }
            Self::ConvexHull { vertices } => vertex_buffer(vertices, 4).map(|_| ()),
            Self::RoundConvexHull {
                vertices,
                border_radius,
            } => {
                vertex_buffer(vertices, 4)?;
                non_negative("borderRadius", *border_radius)
            }
            Self::ConvexMesh { vertices, indices } | Self::Trimesh { vertices, indices } => {
                let count = vertex_buffer(vertices, 3)?;
                index_buffer(indices, 3, count)
            }
            Self::RoundConvexMesh {
                vertices,
                indices,
                border_radius,
            } => {
                let count = vertex_buffer(vertices, 3)?;
                index_buffer(indices, 3, count)?;
                non_negative("borderRadius", *border_radius)
            }
            Self::Polyline { vertices, indices } => {
                let count = vertex_buffer(vertices, 2)?;
                match indices {
                    Some(indices) => index_buffer(indices, 2, count),
                    None => Ok(()),
                }
            }
            Self::Triangle { a, b, c } => finite_points(&[*a, *b, *c]),
            Self::RoundTriangle {
                a,
                b,
                c,
                border_radius,
            } => {
                finite_points(&[*a, *b, *c])?;
                non_negative("borderRadius", *border_radius)
            }
            Self::Heightfield {
                nrows,
                ncols,
                heights,
                scale,
            } => {
                if *nrows == 0 || *ncols == 0 {
                    return Err("`nrows` and `ncols` must be greater than 0".to_string());
                }
                let expected = (*nrows as usize + 1) * (*ncols as usize + 1);
                if heights.len() != expected {
                    return Err(format!(
                        "`heights` holds {} samples, expected (nrows + 1) * (ncols + 1) = {expected}",
                        heights.len()
                    ));
                }
                if heights.iter().any(|h| !h.is_finite()) {
                    return Err("`heights` contains a non-finite sample".to_string());
                }
                finite_points(&[*scale])
            }
        }
    }
}

/// Split a flat vertex buffer into points.
pub fn points(vertices: &[f32]) -> impl Iterator<Item = [f32; 3]> + '_ {
    vertices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
}

fn positive(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("`{field}` must be a positive number, got {value}"))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("`{field}` must be a non-negative number, got {value}"))
    }
}

fn vertex_buffer(vertices: &[f32], min_points: usize) -> Result<usize, String> {
    if vertices.len() % 3 != 0 {
        return Err(format!(
            "`vertices` length {} is not a multiple of 3",
            vertices.len()
        ));
    }
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err("`vertices` contains a non-finite coordinate".to_string());
    }
    let count = vertices.len() / 3;
    if count < min_points {
        return Err(format!(
            "`vertices` holds {count} points, at least {min_points} required"
        ));
    }
    Ok(count)
}

fn index_buffer(indices: &[u32], arity: usize, vertex_count: usize) -> Result<(), String> {
    if indices.is_empty() || indices.len() % arity != 0 {
        return Err(format!(
            "`indices` length {} is not a non-zero multiple of {arity}",
            indices.len()
        ));
    }
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(format!(
            "index {bad} is out of range for {vertex_count} vertices"
        ));
    }
    Ok(())
}

fn finite_points(points: &[Vector3]) -> Result<(), String> {
    if points.iter().all(Vector3::is_finite) {
        Ok(())
    } else {
        Err("point coordinates must be finite".to_string())
    }
}
