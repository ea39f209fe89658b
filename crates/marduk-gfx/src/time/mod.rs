//! Frame timing.
//!
//! - one [`FrameClock`] per window, ticked once per frame for a clamped `dt`
//! - a [`FixedStep`] turns that `dt` into a whole number of simulation updates

mod fixed_step;
mod frame_clock;

pub use fixed_step::FixedStep;
pub use frame_clock::{FrameClock, FrameTime};
