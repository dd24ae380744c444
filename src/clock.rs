//! Fixed timestep accumulator.
//!
//! Render loops produce uneven frame times. [`FixedTimestep`] banks them and
//! hands out a whole number of equal substeps, so the particle field always
//! integrates with the same `dt` regardless of frame rate.
//!
//! ```
//! use particle_field::FixedTimestep;
//!
//! let mut clock = FixedTimestep::new(1.0 / 60.0);
//! assert_eq!(clock.accumulate(1.0 / 30.0), 2);
//! ```

/// Smallest accepted substep length (seconds).
const MIN_STEP: f32 = 1.0e-4;

/// Converts variable frame time into fixed-size simulation substeps.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    /// Length of one substep in seconds.
    step: f32,
    /// Banked time not yet consumed by a substep.
    accumulator: f32,
    /// Upper bound on substeps per frame; excess time is dropped.
    max_substeps: u32,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
    paused: bool,
    /// Simulated seconds handed out so far.
    elapsed: f64,
    /// Total substeps handed out.
    steps: u64,
}

impl FixedTimestep {
    /// Create an accumulator producing substeps of `step` seconds.
    ///
    /// Steps shorter than 0.1 ms (or non-finite) are raised to 0.1 ms.
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() { step.max(MIN_STEP) } else { MIN_STEP };
        Self {
            step,
            accumulator: 0.0,
            max_substeps: 8,
            time_scale: 1.0,
            paused: false,
            elapsed: 0.0,
            steps: 0,
        }
    }

    /// Cap the number of substeps per frame (at least one).
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    /// Bank `frame_time` seconds and return how many substeps to run now.
    ///
    /// While paused nothing is banked. When the cap is hit the whole-step
    /// backlog is discarded and only the fractional remainder carries over.
    pub fn accumulate(&mut self, frame_time: f32) -> u32 {
        if self.paused || !frame_time.is_finite() {
            return 0;
        }

        self.accumulator += frame_time.max(0.0) * self.time_scale;
        let available = (self.accumulator / self.step).floor() as u32;
        let substeps = available.min(self.max_substeps);

        self.accumulator -= substeps as f32 * self.step;
        if available > substeps {
            log::debug!(
                "Dropping {} substep(s) of backlog (cap {})",
                available - substeps,
                self.max_substeps
            );
            self.accumulator %= self.step;
        }

        self.steps += u64::from(substeps);
        self.elapsed += f64::from(substeps) * f64::from(self.step);
        substeps
    }

    /// Length of one substep in seconds.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Fraction of a substep currently banked, in `[0, 1)`. Useful for
    /// interpolating between the last two simulated states.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Simulated seconds handed out so far.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total substeps handed out.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    /// Drop banked time and counters.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.elapsed = 0.0;
        self.steps = 0;
    }
}
