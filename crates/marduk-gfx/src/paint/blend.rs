/// Blend configuration a shader applies when its batch is flushed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    /// Straight-alpha "over" compositing.
    #[default]
    Alpha,
    /// Premultiplied-alpha "over" compositing.
    Premultiplied,
    /// Source added on top of destination, scaled by source alpha.
    Additive,
    /// Destination multiplied by source.
    Multiply,
    /// No blending; source overwrites destination.
    Replace,
}

impl BlendMode {
    /// Returns the wgpu blend state, or `None` for [`BlendMode::Replace`].
    pub fn to_wgpu(self) -> Option<wgpu::BlendState> {
        use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};

        let component = |src_factor, dst_factor| BlendComponent {
            src_factor,
            dst_factor,
            operation: BlendOperation::Add,
        };

        match self {
            BlendMode::Alpha => Some(BlendState {
                color: component(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
                alpha: component(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            }),
            BlendMode::Premultiplied => Some(BlendState {
                color: component(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
                alpha: component(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            }),
            BlendMode::Additive => Some(BlendState {
                color: component(BlendFactor::SrcAlpha, BlendFactor::One),
                alpha: component(BlendFactor::One, BlendFactor::One),
            }),
            BlendMode::Multiply => Some(BlendState {
                color: component(BlendFactor::Dst, BlendFactor::OneMinusSrcAlpha),
                alpha: component(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            }),
            BlendMode::Replace => None,
        }
    }
}
