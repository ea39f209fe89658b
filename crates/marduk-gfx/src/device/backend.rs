//! wgpu implementation of [`GpuContext`].
//!
//! wgpu has no global binding state, so the stateful calls the batches make
//! are recorded here and replayed at [`WgpuBackend::end_frame`]:
//! - vertex uploads are appended to a per-frame byte arena, so several
//!   flushes of the same batch never overwrite each other before submission
//! - every projection lands in a uniform arena addressed by dynamic offset
//! - each `draw_indexed` captures the current binding state
//! - render-target switches and clears split the frame into render passes
//!
//! Destroyed textures and shaders stay alive until the end of the frame,
//! since draws recorded earlier in the frame may still reference them.

use std::collections::HashMap;
use std::ops::Range;

use glam::Mat4;
use winit::dpi::PhysicalSize;

use crate::paint::{BlendMode, Color};
use crate::render::{
    BufferId, BufferKind, FilterMode, GpuContext, GraphicsError, ShaderId, ShaderKind, TextureId,
};

use super::gpu::{Gpu, SurfaceFrame};
use super::pipeline::{self, Layouts, PROJECTION_SIZE, PipelineKey, Samplers};
use super::surface::SurfaceErrorAction;

/// GPU buffer that grows (power of two) to fit a per-frame arena.
struct ArenaBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl ArenaBuffer {
    const MIN_SIZE: u64 = 64 * 1024;

    fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage,
            buffer: None,
            capacity: 0,
        }
    }

    /// Returns `true` when the buffer was (re)created.
    fn ensure(&mut self, device: &wgpu::Device, size: u64) -> bool {
        if self.buffer.is_some() && size <= self.capacity {
            return false;
        }
        let capacity = size.next_power_of_two().max(Self::MIN_SIZE);
        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: capacity,
            usage: self.usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = capacity;
        log::debug!("{} grown to {capacity} bytes", self.label);
        true
    }
}

struct GpuShader {
    kind: ShaderKind,
    module: wgpu::ShaderModule,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    /// Indexed by filter: nearest, linear.
    bind_groups: [wgpu::BindGroup; 2],
}

impl GpuTexture {
    fn bind_group(&self, filter: FilterMode) -> &wgpu::BindGroup {
        match filter {
            FilterMode::Nearest => &self.bind_groups[0],
            FilterMode::Linear => &self.bind_groups[1],
        }
    }
}

/// Binding state as left by the last stateful call.
#[derive(Default)]
struct Binding {
    shader: Option<ShaderId>,
    blend: BlendMode,
    filter: FilterMode,
    texture: Option<TextureId>,
    /// Uniform arena offset of the current projection, and its value.
    projection: Option<(u32, Mat4)>,
}

struct DrawCmd {
    pipeline: PipelineKey,
    uniform_offset: u32,
    texture: Option<(TextureId, FilterMode)>,
    vertices: Range<u64>,
    indices: BufferId,
    index_count: u32,
}

struct PassCmd {
    /// `None` is the backbuffer.
    target: Option<TextureId>,
    clear: Option<Color>,
    draws: Vec<DrawCmd>,
}

impl PassCmd {
    fn new(target: Option<TextureId>) -> Self {
        Self {
            target,
            clear: None,
            draws: Vec::new(),
        }
    }

    fn is_idle(&self) -> bool {
        self.clear.is_none() && self.draws.is_empty()
    }
}

pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,
    layouts: Layouts,
    samplers: Samplers,
    uniform_align: u64,
    next_id: u32,

    shaders: HashMap<ShaderId, GpuShader>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    textures: HashMap<TextureId, GpuTexture>,
    index_buffers: HashMap<BufferId, wgpu::Buffer>,
    /// Latest arena range written for each vertex buffer this frame.
    vertex_buffers: HashMap<BufferId, Option<Range<u64>>>,
    retired_shaders: Vec<ShaderId>,
    retired_textures: Vec<TextureId>,

    vertex_arena: Vec<u8>,
    vertex_gpu: ArenaBuffer,
    uniform_arena: Vec<u8>,
    uniform_gpu: ArenaBuffer,
    globals: Option<wgpu::BindGroup>,

    binding: Binding,
    passes: Vec<PassCmd>,
    frame: Option<SurfaceFrame>,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let device = gpu.device();
        let layouts = Layouts::new(device);
        let samplers = Samplers::new(device);
        let uniform_align = u64::from(device.limits().min_uniform_buffer_offset_alignment)
            .max(PROJECTION_SIZE);

        Self {
            layouts,
            samplers,
            uniform_align,
            next_id: 1,
            shaders: HashMap::new(),
            pipelines: HashMap::new(),
            textures: HashMap::new(),
            index_buffers: HashMap::new(),
            vertex_buffers: HashMap::new(),
            retired_shaders: Vec::new(),
            retired_textures: Vec::new(),
            vertex_arena: Vec::new(),
            vertex_gpu: ArenaBuffer::new(
                "marduk vertex arena",
                wgpu::BufferUsages::VERTEX,
            ),
            uniform_arena: Vec::new(),
            uniform_gpu: ArenaBuffer::new(
                "marduk uniform arena",
                wgpu::BufferUsages::UNIFORM,
            ),
            globals: None,
            binding: Binding::default(),
            passes: Vec::new(),
            frame: None,
            gpu,
        }
    }

    #[inline]
    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    fn next_raw(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── frame ──────────────────────────────────────────────────────────────

    /// Acquires the backbuffer.
    ///
    /// Returns `Ok(false)` when the frame must be skipped; whatever is recorded
    /// until the next [`end_frame`](Self::end_frame) is then dropped.
    pub fn begin_frame(&mut self) -> Result<bool, GraphicsError> {
        self.reset_frame();

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(false);
        }

        match self.gpu.acquire() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(true)
            }
            Err(err) => {
                let message = err.to_string();
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(GraphicsError::Surface(message)),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(false),
                }
            }
        }
    }

    /// Uploads the arenas, encodes every recorded pass, submits and presents.
    pub fn end_frame(&mut self) -> Result<(), GraphicsError> {
        let Some(frame) = self.frame.take() else {
            self.reset_frame();
            return Ok(());
        };

        self.upload_arenas();
        self.ensure_frame_pipelines();

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("marduk frame encoder"),
            });
        let skipped = self.encode(&mut encoder, &frame.view);

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        self.gpu.present(frame);
        self.reset_frame();

        if skipped > 0 {
            log::error!("{skipped} draw(s) referenced released resources");
            return Err(GraphicsError::UnknownTexture);
        }
        Ok(())
    }

    fn reset_frame(&mut self) {
        self.vertex_arena.clear();
        self.uniform_arena.clear();
        self.vertex_buffers.values_mut().for_each(|r| *r = None);
        self.binding.projection = None;
        self.passes.clear();

        for id in self.retired_textures.drain(..) {
            if let Some(t) = self.textures.remove(&id) {
                t.texture.destroy();
            }
        }
        for id in self.retired_shaders.drain(..) {
            self.shaders.remove(&id);
            self.pipelines.retain(|key, _| key.shader != id);
        }
    }

    fn upload_arenas(&mut self) {
        let device = self.gpu.device();
        let queue = self.gpu.queue();

        if !self.vertex_arena.is_empty() {
            self.vertex_gpu.ensure(device, self.vertex_arena.len() as u64);
            if let Some(buf) = &self.vertex_gpu.buffer {
                queue.write_buffer(buf, 0, &self.vertex_arena);
            }
        }

        if !self.uniform_arena.is_empty() {
            let grown = self.uniform_gpu.ensure(device, self.uniform_arena.len() as u64);
            if let Some(buf) = &self.uniform_gpu.buffer {
                if grown || self.globals.is_none() {
                    self.globals = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("marduk globals bind group"),
                        layout: &self.layouts.globals,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                                buffer: buf,
                                offset: 0,
                                size: wgpu::BufferSize::new(PROJECTION_SIZE),
                            }),
                        }],
                    }));
                }
                queue.write_buffer(buf, 0, &self.uniform_arena);
            }
        }
    }

    fn ensure_frame_pipelines(&mut self) {
        let mut keys: Vec<PipelineKey> = self
            .passes
            .iter()
            .flat_map(|p| p.draws.iter().map(|d| d.pipeline))
            .collect();
        keys.sort_by_key(|k| k.shader);
        for key in keys {
            self.ensure_pipeline(key);
        }
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let Some(shader) = self.shaders.get(&key.shader) else {
            return;
        };
        let pipeline = pipeline::build_pipeline(
            self.gpu.device(),
            &self.layouts,
            &shader.module,
            shader.kind,
            key.blend,
            self.gpu.surface_format(),
        );
        log::debug!("built pipeline for {:?} / {:?}", key.shader, key.blend);
        self.pipelines.insert(key, pipeline);
    }

    /// Records every pass into `encoder`. Returns the number of draws dropped
    /// because a resource they reference is gone.
    fn encode(&self, encoder: &mut wgpu::CommandEncoder, backbuffer: &wgpu::TextureView) -> usize {
        let mut skipped = 0;

        for pass in &self.passes {
            if pass.is_idle() {
                continue;
            }

            let view = match pass.target {
                None => backbuffer,
                Some(id) => match self.textures.get(&id) {
                    Some(t) => &t.view,
                    None => {
                        skipped += pass.draws.len();
                        continue;
                    }
                },
            };

            let load = match pass.clear {
                Some(c) => wgpu::LoadOp::Clear(c.into()),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("marduk pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &pass.draws {
                let (Some(pipeline), Some(globals), Some(vbo), Some(ibo)) = (
                    self.pipelines.get(&draw.pipeline),
                    self.globals.as_ref(),
                    self.vertex_gpu.buffer.as_ref(),
                    self.index_buffers.get(&draw.indices),
                ) else {
                    skipped += 1;
                    continue;
                };

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, globals, &[draw.uniform_offset]);
                if let Some((id, filter)) = draw.texture {
                    let Some(texture) = self.textures.get(&id) else {
                        skipped += 1;
                        continue;
                    };
                    rpass.set_bind_group(1, texture.bind_group(filter), &[]);
                }
                rpass.set_vertex_buffer(0, vbo.slice(draw.vertices.clone()));
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        skipped
    }

    fn current_pass(&mut self) -> &mut PassCmd {
        if self.passes.is_empty() {
            self.passes.push(PassCmd::new(None));
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    fn register_texture(&mut self, texture: wgpu::Texture) -> TextureId {
        let device = self.gpu.device();
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = |filter: FilterMode| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("marduk texture bind group"),
                layout: &self.layouts.texture,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(self.samplers.get(filter)),
                    },
                ],
            })
        };
        let bind_groups = [bind_group(FilterMode::Nearest), bind_group(FilterMode::Linear)];

        let id = TextureId::new(self.next_raw());
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                bind_groups,
            },
        );
        id
    }

    fn check_texture_size(&self, width: u32, height: u32, len: usize) -> Result<(), GraphicsError> {
        let max = self.gpu.device().limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(GraphicsError::InvalidTexture { width, height, len });
        }
        Ok(())
    }
}

impl GpuContext for WgpuBackend<'_> {
    fn create_buffer(&mut self, kind: BufferKind, size: u64, label: &str) -> BufferId {
        let id = BufferId::new(self.next_raw());
        match kind {
            BufferKind::Vertex => {
                self.vertex_buffers.insert(id, None);
            }
            BufferKind::Index => {
                let buffer = self.gpu.device().create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: size.max(4),
                    usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                self.index_buffers.insert(id, buffer);
            }
        }
        id
    }

    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        if let Some(ibo) = self.index_buffers.get(&buffer) {
            self.gpu.queue().write_buffer(ibo, 0, data);
            return;
        }
        let Some(range) = self.vertex_buffers.get_mut(&buffer) else {
            log::error!("write to unknown buffer {buffer:?}");
            return;
        };
        let start = self.vertex_arena.len() as u64;
        self.vertex_arena.extend_from_slice(data);
        *range = Some(start..self.vertex_arena.len() as u64);
    }

    fn create_shader(
        &mut self,
        kind: ShaderKind,
        label: &str,
        wgsl: &str,
    ) -> Result<ShaderId, GraphicsError> {
        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(wgsl.into()),
            });

        let info = pollster::block_on(module.get_compilation_info());
        if let Some(err) = info
            .messages
            .iter()
            .find(|m| m.message_type == wgpu::CompilationMessageType::Error)
        {
            return Err(GraphicsError::ShaderCompile {
                label: label.to_string(),
                message: err.message.clone(),
            });
        }

        let id = ShaderId::new(self.next_raw());
        self.shaders.insert(id, GpuShader { kind, module });
        self.ensure_pipeline(PipelineKey {
            shader: id,
            blend: BlendMode::default(),
        });
        Ok(id)
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.retired_shaders.push(shader);
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, GraphicsError> {
        self.check_texture_size(width, height, rgba.len())?;
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(GraphicsError::InvalidTexture {
                width,
                height,
                len: rgba.len(),
            });
        }

        let format = if self.gpu.surface_format().is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("marduk image"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        Ok(self.register_texture(texture))
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<TextureId, GraphicsError> {
        self.check_texture_size(width, height, 0)?;

        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("marduk render target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.gpu.surface_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        Ok(self.register_texture(texture))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.retired_textures.push(texture);
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.binding.shader = Some(shader);
    }

    fn set_blend_mode(&mut self, blend: BlendMode) {
        self.binding.blend = blend;
    }

    fn set_filter(&mut self, filter: FilterMode) {
        self.binding.filter = filter;
    }

    fn set_projection(&mut self, projection: &Mat4) {
        if matches!(self.binding.projection, Some((_, m)) if m == *projection) {
            return;
        }
        let offset = (self.uniform_arena.len() as u64).next_multiple_of(self.uniform_align);
        self.uniform_arena.resize(offset as usize, 0);
        self.uniform_arena
            .extend_from_slice(bytemuck::cast_slice(&projection.to_cols_array()));
        self.binding.projection = Some((offset as u32, *projection));
    }

    fn bind_texture(&mut self, _unit: u32, texture: TextureId) {
        self.binding.texture = Some(texture);
    }

    fn bind_render_target(&mut self, target: Option<TextureId>) {
        match self.passes.last_mut() {
            Some(pass) if pass.target == target => {}
            Some(pass) if pass.is_idle() => pass.target = target,
            _ => self.passes.push(PassCmd::new(target)),
        }
    }

    fn clear(&mut self, color: Color) {
        let pass = self.current_pass();
        if pass.draws.is_empty() {
            pass.clear = Some(color);
        } else {
            let target = pass.target;
            self.passes.push(PassCmd {
                target,
                clear: Some(color),
                draws: Vec::new(),
            });
        }
    }

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32) {
        let Some(shader) = self.binding.shader else {
            log::error!("draw without a bound shader");
            return;
        };
        let Some(kind) = self.shaders.get(&shader).map(|s| s.kind) else {
            log::error!("draw with unknown shader {shader:?}");
            return;
        };
        let Some((uniform_offset, _)) = self.binding.projection else {
            log::error!("draw without a projection");
            return;
        };
        let Some(Some(range)) = self.vertex_buffers.get(&vertices).cloned() else {
            log::error!("draw from {vertices:?} with no vertex data this frame");
            return;
        };
        let texture = match (kind, self.binding.texture) {
            (ShaderKind::Shape, _) => None,
            (ShaderKind::Image, Some(t)) => Some((t, self.binding.filter)),
            (ShaderKind::Image, None) => {
                log::error!("image draw without a bound texture");
                return;
            }
        };

        let cmd = DrawCmd {
            pipeline: PipelineKey {
                shader,
                blend: self.binding.blend,
            },
            uniform_offset,
            texture,
            vertices: range,
            indices,
            index_count,
        };
        self.current_pass().draws.push(cmd);
    }

    fn surface_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }
}
