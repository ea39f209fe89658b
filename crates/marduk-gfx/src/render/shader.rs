use crate::paint::BlendMode;

use super::gpu::{FilterMode, ShaderId, ShaderKind};

/// Compiled shader handle plus the fixed-function state applied with it.
///
/// A shader is tagged with the batch kind it was written for; a batch only
/// accepts shaders of its own kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Shader {
    id: ShaderId,
    kind: ShaderKind,
    blend: BlendMode,
    filter: FilterMode,
}

impl Shader {
    pub(crate) fn new(id: ShaderId, kind: ShaderKind) -> Self {
        Self {
            id,
            kind,
            blend: BlendMode::default(),
            filter: FilterMode::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> ShaderId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    #[inline]
    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    #[inline]
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn with_blend(self, blend: BlendMode) -> Self {
        Self { blend, ..self }
    }

    /// Texture filter applied when an image batch binds its texture.
    pub fn with_filter(self, filter: FilterMode) -> Self {
        Self { filter, ..self }
    }
}
