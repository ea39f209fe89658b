use super::gpu::TextureId;

/// Anything an image batch can sample from.
///
/// Batch compatibility is decided by [`texture_id`](TextureSource::texture_id)
/// alone: two sources with the same id are the same texture.
pub trait TextureSource {
    fn texture_id(&self) -> TextureId;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Uploaded RGBA8 image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    pub(crate) fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }
}

impl TextureSource for Texture {
    fn texture_id(&self) -> TextureId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Off-screen color target. Can be pushed as the current framebuffer and
/// later sampled like a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    id: TextureId,
    width: u32,
    height: u32,
}

impl RenderTarget {
    pub(crate) fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }
}

impl TextureSource for RenderTarget {
    fn texture_id(&self) -> TextureId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
