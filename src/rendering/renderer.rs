use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    rendering::{
        global_uniform::FrameUniformState,
        imgui_renderer::ImguiRendererState,
        instance::gather_instances,
        passes::{
            background_pass::{BackgroundPass, BackgroundPassTextureViews},
            model_pass::{ModelPass, ModelPassTextureViews},
            pass::Pass,
        },
        render_common::RenderCommon,
        render_model::{render_model_instances, RenderModel},
        texture::DepthTexture,
    },
    scene_graph::Scene,
    viewer::ViewerState,
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,

    background_pass: BackgroundPass,
    model_pass: ModelPass,
    imgui_renderer: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        viewer: &ViewerState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible GPU adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let initial_frame = FrameUniformState::new(size, &viewer.camera, &viewer.lighting);
        let common = Arc::new(RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            initial_frame,
        )?);

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");

        let background_pass = BackgroundPass::create(&device, common.clone())?;
        let model_pass = ModelPass::create(&device, common.clone())?;

        let imgui_renderer =
            ImguiRendererState::new(&device, &queue, common.surface_format(), imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            render_models: Arena::new(),
            background_pass,
            model_pass,
            imgui_renderer,
        })
    }

    /// Uploads scene models that don't have GPU buffers yet.
    pub fn sync_models(&mut self, scene: &mut Scene) {
        for (_id, scene_model) in scene.models.iter_mut() {
            if scene_model.render_model.is_some() {
                continue;
            }

            let render_model = RenderModel::from_model(&self.device, &scene_model.model);
            scene_model.render_model = Some(self.render_models.alloc(render_model));

            log::debug!(
                "Uploaded model {} with {} primitives",
                scene_model.model.name,
                scene_model.model.primitives.len()
            );
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;

        {
            let mut config = self
                .common
                .output_surface_config
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            config.width = new_size.width;
            config.height = new_size.height;
            self.surface.configure(&self.device, &config);
        }

        self.depth_texture.resize(&self.device, new_size);
    }

    pub fn render(
        &mut self,
        viewer: &ViewerState,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.common.frame_uniform.update(
            &self.queue,
            FrameUniformState::new(self.size, &viewer.camera, &viewer.lighting),
        );

        gather_instances(&viewer.scene, &mut self.render_models);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.background_pass.render(
            &BackgroundPassTextureViews {
                color: view.clone(),
            },
            &mut encoder,
            |_| {},
        );

        let device = &self.device;
        let queue = &self.queue;
        let render_models = &mut self.render_models;

        self.model_pass.render(
            &ModelPassTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            |render_pass| {
                for (_id, render_model) in render_models.iter_mut() {
                    if !render_model.instances.should_render() {
                        continue;
                    }

                    render_model_instances(render_pass, device, queue, render_model);
                }
            },
        );

        if let Err(err) = self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{:#}", err);
        }

        self.queue.submit([encoder.finish()]);

        output.present();

        Ok(())
    }
}
