use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::{util::DeviceExt, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration};
use winit::window::Window;

use crate::{
    model::{
        DecodedImage, MeshKind, ModelVertex, ShapeMeshes, Texture, TextureHandle, TextureUpload,
        MAX_TEXTURE_SLOTS,
    },
    scene::{Camera, FrameRecorder},
    shader::{LightingUniform, ObjectUniform},
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_OBJECT_CAPACITY: usize = 64;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    lighting: LightingUniform,
}

impl GlobalsUniform {
    fn new(camera: &Camera, lighting: LightingUniform) -> Self {
        let pos = camera.position;
        Self {
            view_proj: camera.build_view_projection_matrix().to_cols_array_2d(),
            camera_pos: [pos.x, pos.y, pos.z, 1.0],
            lighting,
        }
    }
}

struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct UploadedTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// GPU textures addressed by handle, plus the slot table that maps texture
/// units to handles. Unbound slots sample a 1x1 white texture.
pub struct GpuTextures {
    device: Arc<Device>,
    queue: Arc<Queue>,
    layout: wgpu::BindGroupLayout,
    textures: HashMap<TextureHandle, UploadedTexture>,
    slots: [Option<TextureHandle>; MAX_TEXTURE_SLOTS],
    fallback: UploadedTexture,
    next_handle: u32,
}

impl GpuTextures {
    fn new(device: Arc<Device>, queue: Arc<Queue>) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let white = DecodedImage::from_rgba(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([255, 255, 255, 255]),
        ));
        let fallback = Self::create(&device, &queue, &layout, &white, "White Texture");

        Self {
            device,
            queue,
            layout,
            textures: HashMap::new(),
            slots: [None; MAX_TEXTURE_SLOTS],
            fallback,
            next_handle: 0,
        }
    }

    fn create(
        device: &Device,
        queue: &Queue,
        layout: &wgpu::BindGroupLayout,
        image: &DecodedImage,
        label: &str,
    ) -> UploadedTexture {
        let texture = Texture::from_image(device, queue, image, Some(label));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        UploadedTexture {
            texture,
            bind_group,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn bind_group_for(&self, slot: Option<usize>) -> &wgpu::BindGroup {
        slot.and_then(|slot| self.slots.get(slot).copied().flatten())
            .and_then(|handle| self.textures.get(&handle))
            .map_or(&self.fallback.bind_group, |uploaded| &uploaded.bind_group)
    }
}

impl TextureUpload for GpuTextures {
    fn upload(&mut self, image: &DecodedImage, label: &str) -> TextureHandle {
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        let uploaded = Self::create(&self.device, &self.queue, &self.layout, image, label);
        self.textures.insert(handle, uploaded);
        handle
    }

    fn bind(&mut self, slot: usize, handle: TextureHandle) {
        match self.slots.get_mut(slot) {
            Some(entry) => *entry = Some(handle),
            None => log::warn!("Texture slot {} out of range", slot),
        }
    }

    fn release(&mut self, handle: TextureHandle) {
        if let Some(uploaded) = self.textures.remove(&handle) {
            uploaded.texture.texture.destroy();
        }
        for slot in self.slots.iter_mut() {
            if *slot == Some(handle) {
                *slot = None;
            }
        }
    }
}

pub struct Renderer {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub config: SurfaceConfiguration,
    surface: Surface<'static>,
    render_pipeline: RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_bind_group_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,
    object_capacity: usize,
    object_staging: Vec<u8>,
    textures: GpuTextures,
    meshes: BTreeMap<MeshKind, MeshBuffers>,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("Failed to find appropriate adapter")?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Primary Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("Failed to create device")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        log::debug!("Selected surface format: {:?}", surface_format);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let globals_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let object_size = std::mem::size_of::<ObjectUniform>() as u64;
        let object_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(object_size),
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let object_stride = object_size.div_ceil(alignment) * alignment;
        let (object_buffer, object_bind_group) = create_object_buffer(
            &device,
            &object_bind_group_layout,
            object_stride,
            INITIAL_OBJECT_CAPACITY,
        );

        let textures = GpuTextures::new(device.clone(), queue.clone());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[
                &globals_bind_group_layout,
                &object_bind_group_layout,
                textures.layout(),
            ],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ModelVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Walls share one plane mesh rotated to face opposite ways.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let depth_view = create_depth_view(&device, config.width, config.height);

        Ok(Self {
            device,
            queue,
            config,
            surface,
            render_pipeline,
            globals_buffer,
            globals_bind_group,
            object_bind_group_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            object_staging: Vec::new(),
            textures,
            meshes: BTreeMap::new(),
            depth_view,
        })
    }

    pub fn textures_mut(&mut self) -> &mut GpuTextures {
        &mut self.textures
    }

    /// Creates vertex and index buffers for every generated mesh.
    pub fn upload_meshes(&mut self, shapes: &ShapeMeshes) {
        for (kind, mesh) in shapes.iter() {
            let label = format!("{:?}", kind);
            let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", label)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", label)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                kind,
                MeshBuffers {
                    vertex_buffer,
                    index_buffer,
                },
            );
        }
        log::debug!("Uploaded {} meshes", self.meshes.len());
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            self.depth_view = create_depth_view(&self.device, new_size.width, new_size.height);
        }
    }

    /// Reconfigures the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.resize(winit::dpi::PhysicalSize::new(self.config.width, self.config.height));
    }

    fn ensure_object_capacity(&mut self, count: usize) {
        if count <= self.object_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) = create_object_buffer(
            &self.device,
            &self.object_bind_group_layout,
            self.object_stride,
            capacity,
        );
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_capacity = capacity;
        log::debug!("Grew object uniform buffer to {} entries", capacity);
    }

    fn write_objects(&mut self, frame: &FrameRecorder) {
        let stride = self.object_stride as usize;
        self.object_staging.clear();
        self.object_staging.resize(frame.draws().len() * stride, 0);
        for (index, draw) in frame.draws().iter().enumerate() {
            let bytes = bytemuck::bytes_of(&draw.object);
            let start = index * stride;
            self.object_staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        if !self.object_staging.is_empty() {
            self.queue.write_buffer(&self.object_buffer, 0, &self.object_staging);
        }
    }

    /// Replays a recorded frame onto the window surface.
    pub fn render(
        &mut self,
        frame: &FrameRecorder,
        shapes: &ShapeMeshes,
        camera: &Camera,
    ) -> Result<(), wgpu::SurfaceError> {
        let globals = GlobalsUniform::new(camera, frame.lighting());
        self.queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals]));

        self.ensure_object_capacity(frame.draws().len());
        self.write_objects(frame);

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

            for (index, draw) in frame.draws().iter().enumerate() {
                let kind = draw.primitive.mesh_kind();
                let (Some(buffers), Some(ranges)) =
                    (self.meshes.get(&kind), shapes.index_ranges(draw.primitive))
                else {
                    log::trace!("Skipping draw of unloaded mesh {:?}", kind);
                    continue;
                };

                let offset = (index as u64 * self.object_stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                let slot = draw.object.uses_texture().then(|| draw.object.texture_slot()).flatten();
                render_pass.set_bind_group(2, self.textures.bind_group_for(slot), &[]);
                render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
                render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for range in ranges {
                    render_pass.draw_indexed(range, 0, 0..1);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_object_buffer(
    device: &Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniform Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_depth_view(device: &Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
