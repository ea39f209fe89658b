use thiserror::Error;

/// Hard failures surfaced to the caller.
///
/// Stack discipline violations indicate a bug in calling code; resource errors
/// are fatal at initialization. Both propagate up to the frame loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphicsError {
    #[error("transform stack overflow (max depth {max})")]
    TransformOverflow { max: usize },

    #[error("cannot pop the base transform")]
    TransformUnderflow,

    #[error("render target stack overflow (max depth {max})")]
    TargetOverflow { max: usize },

    #[error("render target stack is empty")]
    TargetUnderflow,

    #[error("render target is still on the target stack")]
    TargetInUse,

    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompile { label: String, message: String },

    #[error("texture data is {len} bytes, expected {width}x{height}x4")]
    InvalidTexture { width: u32, height: u32, len: usize },

    #[error("texture handle is not (or no longer) registered")]
    UnknownTexture,

    #[error("surface error: {0}")]
    Surface(String),
}

/// Rejected drawing input.
///
/// These never cross the batch boundary: the batch logs them and emits no
/// geometry, and the frame keeps going.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("radius must be positive (got {0})")]
    NonPositiveRadius(f32),

    #[error("at least 3 segments required (got {0})")]
    TooFewSegments(u32),

    #[error("line width must be positive (got {0})")]
    NonPositiveWidth(f32),

    #[error("at least 3 points required (got {0})")]
    TooFewPoints(usize),

    #[error("line has zero length")]
    DegenerateLine,
}
