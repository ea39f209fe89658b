//! Font baking.
//!
//! The renderer only draws pre-rasterized [`BitmapFont`](crate::render::BitmapFont)s.
//! This module turns a TrueType/OpenType file into one: every requested
//! character is rasterized once with `fontdue` and packed into a single atlas.

mod bake;

pub use bake::{ASCII, BakeError, BakeOptions, bake_font};
