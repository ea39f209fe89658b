//! Bind group layouts, samplers and pipeline construction for the two shader kinds.
//!
//! Bind groups:
//! - group 0: `Globals { projection: mat4x4<f32> }`, dynamic offset (both kinds)
//! - group 1: texture + sampler (image kind only)

use std::num::NonZeroU64;

use crate::paint::BlendMode;
use crate::render::{FilterMode, ImageVertex, ShaderId, ShaderKind, ShapeVertex};

/// Size of one projection matrix in the uniform arena.
pub(crate) const PROJECTION_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// Pipelines are specialised per shader and blend mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    pub shader: ShaderId,
    pub blend: BlendMode,
}

pub(crate) struct Layouts {
    pub globals: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    shape: wgpu::PipelineLayout,
    image: wgpu::PipelineLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marduk globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(PROJECTION_SIZE),
                },
                count: None,
            }],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marduk texture bgl"),
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

        let shape = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marduk shape pipeline layout"),
            bind_group_layouts: &[&globals],
            immediate_size: 0,
        });

        let image = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marduk image pipeline layout"),
            bind_group_layouts: &[&globals, &texture],
            immediate_size: 0,
        });

        Self {
            globals,
            texture,
            shape,
            image,
        }
    }

    fn pipeline_layout(&self, kind: ShaderKind) -> &wgpu::PipelineLayout {
        match kind {
            ShaderKind::Shape => &self.shape,
            ShaderKind::Image => &self.image,
        }
    }
}

/// One sampler per [`FilterMode`], shared by every texture.
pub(crate) struct Samplers {
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,
}

impl Samplers {
    pub fn new(device: &wgpu::Device) -> Self {
        let make = |label: &'static str, filter: wgpu::FilterMode| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        };

        Self {
            nearest: make("marduk nearest sampler", wgpu::FilterMode::Nearest),
            linear: make("marduk linear sampler", wgpu::FilterMode::Linear),
        }
    }

    pub fn get(&self, filter: FilterMode) -> &wgpu::Sampler {
        match filter {
            FilterMode::Nearest => &self.nearest,
            FilterMode::Linear => &self.linear,
        }
    }
}

pub(crate) fn build_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    module: &wgpu::ShaderModule,
    kind: ShaderKind,
    blend: BlendMode,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let buffers = match kind {
        ShaderKind::Shape => [ShapeVertex::layout()],
        ShaderKind::Image => [ImageVertex::layout()],
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(match kind {
            ShaderKind::Shape => "marduk shape pipeline",
            ShaderKind::Image => "marduk image pipeline",
        }),
        layout: Some(layouts.pipeline_layout(kind)),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: blend.to_wgpu(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        // Batches emit both windings (mirrored transforms, flipped quads).
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
