//! Recording [`GpuContext`] used by unit tests.

use std::collections::HashMap;

use glam::Mat4;

use crate::paint::{BlendMode, Color};

use super::error::GraphicsError;
use super::gpu::{BufferId, BufferKind, FilterMode, GpuContext, ShaderId, ShaderKind, TextureId};

/// Snapshot of the binding state and vertex data at one `draw_indexed`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawRecord {
    pub shader: Option<ShaderId>,
    pub blend: BlendMode,
    pub filter: FilterMode,
    pub texture: Option<TextureId>,
    pub target: Option<TextureId>,
    pub projection: Option<Mat4>,
    pub vertices: Vec<f32>,
    pub index_count: u32,
}

impl DrawRecord {
    /// Splits the vertex data into fixed-stride records.
    pub fn vertex_chunks(&self, stride: usize) -> Vec<&[f32]> {
        self.vertices.chunks_exact(stride).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GpuCall {
    UseShader(ShaderId),
    Blend(BlendMode),
    Filter(FilterMode),
    Projection(Mat4),
    BindTexture(u32, TextureId),
    BindTarget(Option<TextureId>),
    Clear(Color),
    Draw(DrawRecord),
    DestroyTexture(TextureId),
}

pub(crate) struct RecordingGpu {
    size: (u32, u32),
    next_id: u32,

    buffers: HashMap<BufferId, (BufferKind, Vec<u8>)>,
    shaders: HashMap<ShaderId, ShaderKind>,
    textures: HashMap<TextureId, (u32, u32)>,
    index_uploads: usize,

    shader: Option<ShaderId>,
    blend: BlendMode,
    filter: FilterMode,
    texture: Option<TextureId>,
    target: Option<TextureId>,
    projection: Option<Mat4>,

    /// When set, `create_shader` fails with this message.
    pub fail_shaders: Option<String>,

    pub calls: Vec<GpuCall>,
}

impl RecordingGpu {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            next_id: 1,
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            textures: HashMap::new(),
            index_uploads: 0,
            shader: None,
            blend: BlendMode::default(),
            filter: FilterMode::default(),
            texture: None,
            target: None,
            projection: None,
            fail_shaders: None,
            calls: Vec::new(),
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn draws(&self) -> Vec<&DrawRecord> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::Draw(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn index_uploads(&self) -> usize {
        self.index_uploads
    }

    pub fn shader_kind(&self, id: ShaderId) -> Option<ShaderKind> {
        self.shaders.get(&id).copied()
    }

    pub fn texture_alive(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

fn decode_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

impl GpuContext for RecordingGpu {
    fn create_buffer(&mut self, kind: BufferKind, _size: u64, _label: &str) -> BufferId {
        let id = BufferId::new(self.next());
        self.buffers.insert(id, (kind, Vec::new()));
        id
    }

    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        if let Some((kind, contents)) = self.buffers.get_mut(&buffer) {
            if *kind == BufferKind::Index {
                self.index_uploads += 1;
            }
            contents.clear();
            contents.extend_from_slice(data);
        }
    }

    fn create_shader(
        &mut self,
        kind: ShaderKind,
        label: &str,
        _wgsl: &str,
    ) -> Result<ShaderId, GraphicsError> {
        if let Some(message) = self.fail_shaders.clone() {
            return Err(GraphicsError::ShaderCompile {
                label: label.to_string(),
                message,
            });
        }
        let id = ShaderId::new(self.next());
        self.shaders.insert(id, kind);
        Ok(id)
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        _rgba: &[u8],
    ) -> Result<TextureId, GraphicsError> {
        let id = TextureId::new(self.next());
        self.textures.insert(id, (width, height));
        Ok(id)
    }

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TextureId, GraphicsError> {
        let id = TextureId::new(self.next());
        self.textures.insert(id, (width, height));
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.calls.push(GpuCall::DestroyTexture(texture));
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.shader = Some(shader);
        self.calls.push(GpuCall::UseShader(shader));
    }

    fn set_blend_mode(&mut self, blend: BlendMode) {
        self.blend = blend;
        self.calls.push(GpuCall::Blend(blend));
    }

    fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
        self.calls.push(GpuCall::Filter(filter));
    }

    fn set_projection(&mut self, projection: &Mat4) {
        self.projection = Some(*projection);
        self.calls.push(GpuCall::Projection(*projection));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.texture = Some(texture);
        self.calls.push(GpuCall::BindTexture(unit, texture));
    }

    fn bind_render_target(&mut self, target: Option<TextureId>) {
        self.target = target;
        self.calls.push(GpuCall::BindTarget(target));
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(GpuCall::Clear(color));
    }

    fn draw_indexed(&mut self, vertices: BufferId, _indices: BufferId, index_count: u32) {
        let data = self
            .buffers
            .get(&vertices)
            .map(|(_, bytes)| decode_f32(bytes))
            .unwrap_or_default();

        self.calls.push(GpuCall::Draw(DrawRecord {
            shader: self.shader,
            blend: self.blend,
            filter: self.filter,
            texture: self.texture,
            target: self.target,
            projection: self.projection,
            vertices: data,
            index_count,
        }));
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }
}
