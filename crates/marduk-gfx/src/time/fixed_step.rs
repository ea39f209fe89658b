/// Fixed-timestep accumulator.
///
/// Frame deltas are banked and paid out in whole `step`s, so simulation code
/// advances by the same amount every update regardless of the frame rate.
/// The remainder is exposed as [`alpha`](Self::alpha) for interpolating
/// between the last two simulated states when drawing.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedStep {
    /// `step` is in seconds. At most `max_steps` updates run per frame; any
    /// backlog beyond that is dropped.
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn from_hz(hz: f32) -> Self {
        Self::new(1.0 / hz.max(1.0), 8)
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Banks `dt` and returns how many updates to run this frame.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!("fixed step fell behind; dropping {:.3}s", self.accumulator);
            self.accumulator %= self.step;
        }
        steps
    }

    /// Fraction of a step banked but not yet simulated, in `[0, 1)`.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
