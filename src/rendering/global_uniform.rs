use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::{camera::Camera, lighting::Lighting};

/// Per-frame data shared by every pass. Layout must match `Frame` in the WGSL shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniformState {
    pub view_proj: Mat4,
    pub inverse_view_proj: Mat4,
    pub camera_position: [f32; 4],
    /// rgb: color * intensity
    pub ambient: [f32; 4],
    /// w: intensity
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_color: [f32; 4],
    /// x: inner cone cosine, y: outer cone cosine
    pub spot_cone: [f32; 4],
    /// w: environment intensity
    pub sky: [f32; 4],
    pub horizon: [f32; 4],
    pub ground: [f32; 4],
}

impl FrameUniformState {
    pub fn new(size: PhysicalSize<u32>, camera: &Camera, lighting: &Lighting) -> Self {
        let aspect_ratio = size.width.max(1) as f32 / size.height.max(1) as f32;
        let view_proj = camera.get_vp_matrix(aspect_ratio);

        let ambient = lighting.ambient.color * lighting.ambient.intensity;
        let spot = &lighting.spot;
        let environment = &lighting.environment;

        Self {
            view_proj,
            inverse_view_proj: view_proj.inverse(),
            camera_position: camera.eye.extend(1.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
            spot_position: spot.position.extend(spot.intensity).to_array(),
            spot_direction: spot.direction().extend(0.0).to_array(),
            spot_color: spot.color.extend(0.0).to_array(),
            spot_cone: [spot.inner_cos(), spot.outer_cos(), 0.0, 0.0],
            sky: environment.sky.extend(environment.intensity).to_array(),
            horizon: environment.horizon.extend(0.0).to_array(),
            ground: environment.ground.extend(0.0).to_array(),
        }
    }
}

pub struct FrameUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl FrameUniform {
    pub fn new(device: &wgpu::Device, initial_state: FrameUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame uniform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: FrameUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::lighting::EnvironmentPreset;

    #[test]
    fn layout_matches_wgsl_struct() {
        // 2 mat4x4 + 9 vec4
        assert_eq!(std::mem::size_of::<FrameUniformState>(), 272);
        assert_eq!(std::mem::size_of::<FrameUniformState>() % 16, 0);
    }

    #[test]
    fn inverse_view_proj_round_trips() {
        let state = FrameUniformState::new(
            PhysicalSize::new(1280, 720),
            &Camera::default(),
            &Lighting::new(EnvironmentPreset::City),
        );

        let point = Vec3::new(0.3, -0.2, 1.0);
        let clip = state.view_proj.project_point3(point);
        let back = state.inverse_view_proj.project_point3(clip);
        assert!(back.abs_diff_eq(point, 1e-4));
    }

    #[test]
    fn zero_sized_window_does_not_produce_nan() {
        let state = FrameUniformState::new(
            PhysicalSize::new(0, 0),
            &Camera::default(),
            &Lighting::new(EnvironmentPreset::City),
        );

        assert!(!state.view_proj.is_nan());
    }
}
