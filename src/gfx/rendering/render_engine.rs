//! WGPU-based rendering engine
//!
//! Owns the surface, device and every GPU resource behind scene handles.
//! Scene code reaches it only through [`ResourceAllocator`]; the app calls
//! [`RenderEngine::render_frame`] once per displayed frame.

use std::{collections::HashMap, sync::Arc};

use bytemuck::Zeroable;
use cgmath::{Matrix4, SquareMatrix};
use wgpu::{util::DeviceExt, Device, TextureFormat};

use crate::{
    error::SceneError,
    gfx::{
        geometry::GeometryData,
        resources::{
            texture_resource::TextureResource, GeometryHandle, GlobalUniform, MaterialDesc, MaterialHandle,
            ResourceAllocator, SurfaceUniform,
        },
        vertex::ParticleVertex,
    },
    scene::{object::RenderPart, Scene},
    wgpu_utils::{uniform_entry, DynamicVertexBuffer, UniformBuffer},
};

use super::{
    billboard::{camera_axes, expand_sprites, VERTICES_PER_SPRITE},
    pipeline_manager::{PipelineConfig, PipelineManager, VertexLayout},
    render_pass_ext::{DrawMesh, GpuMesh},
};

const OPAQUE: &str = "Opaque";
const TRANSPARENT: &str = "Transparent";
const WIREFRAME: &str = "Wireframe";
const PARTICLES: &str = "Particles";

/// Per-part uniform and the bind group exposing it at group 1
struct GpuSurface {
    uniform: UniformBuffer<SurfaceUniform>,
    bind_group: wgpu::BindGroup,
}

struct DrawItem {
    pipeline: &'static str,
    geometry: u64,
    material: u64,
}

/// Counters from the last recorded frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounters {
    pub draw_calls: usize,
    pub particles: usize,
    pub live_meshes: usize,
    pub live_surfaces: usize,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_uniform: UniformBuffer<GlobalUniform>,
    global_bind_group: wgpu::BindGroup,
    surface_layout: wgpu::BindGroupLayout,
    meshes: HashMap<u64, GpuMesh>,
    surfaces: HashMap<u64, GpuSurface>,
    next_handle: u64,
    particle_buffer: DynamicVertexBuffer<ParticleVertex>,
    particle_scratch: Vec<ParticleVertex>,
    wireframe_supported: bool,
    wireframe_warned: bool,
    counters: FrameCounters,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Picks a non-sRGB surface format; the shader encodes gamma itself.
    /// Requests line polygon mode when the adapter offers it so wireframe
    /// rendering can be toggled at runtime.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, SceneError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| SceneError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SceneError::AdapterRequestFailed(e.to_string()))?;

        let wireframe_supported = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features,
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        log::info!(
            "Using adapter '{}' ({:?}), wireframe {}",
            adapter.get_info().name,
            adapter.get_info().backend,
            if wireframe_supported { "available" } else { "unavailable" }
        );

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| SceneError::Surface("surface reports no formats".to_string()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let surface_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let global_uniform: UniformBuffer<GlobalUniform> = UniformBuffer::new_with_data(&device, &GlobalUniform::zeroed());
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_uniform.binding_resource(),
            }],
        });

        let particle_buffer = DynamicVertexBuffer::new(&device, 512 * VERTICES_PER_SPRITE);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());
        pipeline_manager.load_shader("scene", include_str!("shader.wgsl"));
        pipeline_manager.register_bind_group_layout("globals", global_layout.clone());
        pipeline_manager.register_bind_group_layout("surface", surface_layout.clone());

        let mesh_config = PipelineConfig::default_with_shader("scene")
            .with_color_format(format)
            .with_bind_group_layouts(vec![global_layout.clone(), surface_layout.clone()]);

        pipeline_manager.register_pipeline(
            OPAQUE,
            mesh_config
                .clone()
                .with_label("OPAQUE")
                .with_depth(TextureResource::DEPTH_FORMAT, true),
        );
        pipeline_manager.register_pipeline(
            TRANSPARENT,
            mesh_config
                .clone()
                .with_label("TRANSPARENT")
                .with_blend(wgpu::BlendState::ALPHA_BLENDING)
                .with_depth(TextureResource::DEPTH_FORMAT, false),
        );
        if wireframe_supported {
            pipeline_manager.register_pipeline(
                WIREFRAME,
                mesh_config
                    .with_label("WIREFRAME")
                    .with_cull_mode(None)
                    .with_polygon_mode(wgpu::PolygonMode::Line)
                    .with_depth(TextureResource::DEPTH_FORMAT, true),
            );
        }
        pipeline_manager.register_pipeline(
            PARTICLES,
            PipelineConfig::default_with_shader("scene")
                .with_label("PARTICLES")
                .with_entry_points("vs_particle", "fs_particle")
                .with_vertex_layout(VertexLayout::Particle)
                .with_color_format(format)
                .with_bind_group_layouts(vec![global_layout])
                .with_cull_mode(None)
                .with_blend(wgpu::BlendState::ALPHA_BLENDING)
                .with_depth(TextureResource::DEPTH_FORMAT, false),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in &errors {
                log::error!("{}", error);
            }
            return Err(SceneError::Surface(format!("{} pipeline(s) failed to build", errors.len())));
        }
        log::debug!("Pipelines ready: {:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_uniform,
            global_bind_group,
            surface_layout,
            meshes: HashMap::new(),
            surfaces: HashMap::new(),
            next_handle: 1,
            particle_buffer,
            particle_scratch: Vec::new(),
            wireframe_supported,
            wireframe_warned: false,
            counters: FrameCounters::default(),
        })
    }

    /// Uploads this frame's uniforms and returns the draw list, opaque parts first
    fn prepare_draws(&mut self, scene: &Scene) -> Vec<DrawItem> {
        if scene.wireframe() && !self.wireframe_supported && !self.wireframe_warned {
            log::warn!("Wireframe requested but the adapter lacks line polygon mode; drawing filled");
            self.wireframe_warned = true;
        }

        let mut opaque = Vec::new();
        let mut transparent = Vec::new();

        let ground = scene.ground.iter().map(|part| (Matrix4::identity(), part));
        let parts = scene
            .objects
            .iter()
            .flat_map(|object| {
                let object_matrix = object.transform.matrix();
                object.parts().iter().map(move |part| (object_matrix, part))
            })
            .chain(ground);

        for (object_matrix, part) in parts {
            let (Some(geometry), Some(material)) = (part.geometry(), part.material()) else {
                continue;
            };
            let Some(surface) = self.surfaces.get_mut(&material.raw()) else {
                log::warn!("Skipping part with unknown material {}", material.raw());
                continue;
            };
            let world = object_matrix * part.local.matrix();
            surface.uniform.update_content(&self.queue, SurfaceUniform::new(world, &part.surface));

            let item = DrawItem {
                pipeline: self.pipeline_for(part),
                geometry: geometry.raw(),
                material: material.raw(),
            };
            if item.pipeline == TRANSPARENT {
                transparent.push(item);
            } else {
                opaque.push(item);
            }
        }

        opaque.extend(transparent);
        opaque
    }

    fn pipeline_for(&self, part: &RenderPart) -> &'static str {
        if part.surface.is_transparent() {
            TRANSPARENT
        } else if part.surface.wireframe && self.wireframe_supported {
            WIREFRAME
        } else {
            OPAQUE
        }
    }

    /// Records and presents one frame, then lets `ui_callback` draw on top
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<(), SceneError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out; skipping frame");
                return Ok(());
            }
            Err(e) => return Err(SceneError::Surface(e.to_string())),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.global_uniform.update_content(
            &self.queue,
            GlobalUniform::new(&scene.camera, &scene.lights, &scene.environment),
        );

        let draws = self.prepare_draws(scene);

        let (right, up) = camera_axes(&scene.camera.view_matrix());
        expand_sprites(scene.sprites(), right, up, &mut self.particle_scratch);
        self.particle_buffer
            .write(&self.device, &self.queue, &self.particle_scratch);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let background = scene.environment.background;
        let mut draw_calls = 0;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background[0] as f64,
                            g: background[1] as f64,
                            b: background[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.global_bind_group, &[]);

            let mut bound: Option<&'static str> = None;
            for item in &draws {
                let (Some(mesh), Some(surface)) = (self.meshes.get(&item.geometry), self.surfaces.get(&item.material))
                else {
                    continue;
                };
                if bound != Some(item.pipeline) {
                    let Some(pipeline) = self.pipeline_manager.get_pipeline(item.pipeline) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    bound = Some(item.pipeline);
                }
                render_pass.draw_mesh(mesh, &surface.bind_group);
                draw_calls += 1;
            }

            if !self.particle_buffer.is_empty() {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline(PARTICLES) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_vertex_buffer(0, self.particle_buffer.buffer().slice(..));
                    render_pass.draw(0..self.particle_buffer.len() as u32, 0..1);
                    draw_calls += 1;
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        self.counters = FrameCounters {
            draw_calls,
            particles: self.particle_scratch.len() / VERTICES_PER_SPRITE,
            live_meshes: self.meshes.len(),
            live_surfaces: self.surfaces.len(),
        };
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn counters(&self) -> FrameCounters {
        self.counters
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe_supported
    }

    pub fn set_vsync(&mut self, enable: bool) {
        self.config.present_mode = if enable {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self.surface.configure(&self.device, &self.config);
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }
}

impl ResourceAllocator for RenderEngine {
    fn create_geometry(&mut self, data: &GeometryData) -> Result<GeometryHandle, SceneError> {
        if data.indices.is_empty() || data.vertices.is_empty() {
            return Err(SceneError::Allocation {
                kind: "geometry",
                reason: "mesh has no triangles".to_string(),
            });
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.to_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = self.allocate_id();
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
            },
        );
        Ok(GeometryHandle(id))
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, SceneError> {
        let uniform = UniformBuffer::new_with_data(&self.device, &SurfaceUniform::new(Matrix4::identity(), desc));
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Surface Bind Group"),
            layout: &self.surface_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.binding_resource(),
            }],
        });

        let id = self.allocate_id();
        self.surfaces.insert(id, GpuSurface { uniform, bind_group });
        Ok(MaterialHandle(id))
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        match self.meshes.remove(&handle.raw()) {
            Some(mesh) => {
                mesh.vertex_buffer.destroy();
                mesh.index_buffer.destroy();
            }
            None => log::warn!("Release of unknown geometry {}", handle.raw()),
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        match self.surfaces.remove(&handle.raw()) {
            Some(surface) => surface.uniform.buffer().destroy(),
            None => log::warn!("Release of unknown material {}", handle.raw()),
        }
    }
}
