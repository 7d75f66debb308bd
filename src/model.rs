use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use gltf::{buffer, mesh::Mode};
use itertools::izip;

use crate::math::bounds::Aabb;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounding_box: Aabb,
}

impl ModelPrimitive {
    pub fn new(index: usize, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounding_box = Aabb::from_points(vertices.iter().map(|vertex| vertex.position));

        Self {
            index,
            vertices,
            indices,
            bounding_box,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    /// Converts the triangle primitives of a glTF mesh. Strips and fans are
    /// expanded to lists. Point and line primitives are skipped, so the result
    /// may have no primitives at all.
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: &gltf::Mesh,
        buffers: Buffers,
    ) -> anyhow::Result<Model> {
        let mut model = Model {
            name: name.into(),
            primitives: Vec::new(),
        };

        for primitive in mesh.primitives() {
            let mode = primitive.mode();
            if matches!(
                mode,
                Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip
            ) {
                log::warn!(
                    "Skipping primitive {} of {}: unsupported mode {:?}",
                    primitive.index(),
                    model.name,
                    mode
                );
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions = reader
                .read_positions()
                .ok_or_else(|| {
                    anyhow::anyhow!("Primitive {} has no positions", primitive.index())
                })?
                .map(Vec3::from)
                .collect::<Vec<_>>();

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
                None => (0..positions.len() as u32).collect(),
            };

            if let Some(out_of_range) = indices.iter().find(|&&i| i as usize >= positions.len())
            {
                anyhow::bail!(
                    "Primitive {} references vertex {} but only has {}",
                    primitive.index(),
                    out_of_range,
                    positions.len()
                );
            }

            let indices = triangle_list(mode, indices);

            let normals: Vec<Vec3> = match reader.read_normals() {
                Some(normals) => normals.map(Vec3::from).collect(),
                None => compute_vertex_normals(&positions, &indices),
            };

            let base_color = Vec4::from(
                primitive
                    .material()
                    .pbr_metallic_roughness()
                    .base_color_factor(),
            );
            let colors: Vec<Vec4> = match reader.read_colors(0) {
                Some(colors) => colors
                    .into_rgba_f32()
                    .map(|color| Vec4::from(color) * base_color)
                    .collect(),
                None => vec![base_color; positions.len()],
            };

            let vertices = izip!(positions, normals, colors)
                .map(|(position, normal, color)| Vertex {
                    position,
                    normal,
                    color: color.to_array(),
                })
                .collect::<Vec<Vertex>>();

            model
                .primitives
                .push(ModelPrimitive::new(primitive.index(), vertices, indices));
        }

        Ok(model)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::empty(), |aabb, primitive| {
                aabb.union(primitive.bounding_box)
            })
    }
}

/// Rewrites strip and fan indices as a triangle list with the winding glTF
/// defines for them. Other modes pass through.
fn triangle_list(mode: Mode, indices: Vec<u32>) -> Vec<u32> {
    match mode {
        Mode::TriangleStrip => (0..indices.len().saturating_sub(2))
            .flat_map(|i| {
                if i % 2 == 0 {
                    [indices[i], indices[i + 1], indices[i + 2]]
                } else {
                    [indices[i], indices[i + 2], indices[i + 1]]
                }
            })
            .collect(),
        Mode::TriangleFan => (1..indices.len().saturating_sub(1))
            .flat_map(|i| [indices[i], indices[i + 1], indices[0]])
            .collect(),
        _ => indices,
    }
}

/// Area-weighted smooth normals for meshes exported without them.
fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face_normal = (positions[b] - positions[a]).cross(positions[c] - positions[a]);

        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }

    normals
        .into_iter()
        .map(|normal| normal.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}
