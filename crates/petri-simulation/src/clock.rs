/// Length of one reference frame in seconds. Energy decay is expressed per
/// reference frame.
pub const REFERENCE_FRAME: f64 = 1.0 / 60.0;
/// A single tick never scales decay by more than this many reference frames.
pub const MAX_FRAME_SCALE: f64 = 5.0;

/// Tracks simulation time: a monotonic tick counter and the host time fed in.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    tick: u64,
    elapsed: f64,
}

impl SimClock {
    /// Create a new clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of `dt` seconds. Returns the new tick
    /// number.
    pub fn advance(&mut self, dt: f64) -> u64 {
        self.tick += 1;
        self.elapsed += dt;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Total host seconds fed to committed ticks.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Back to tick 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Turn a host `dt` into a count of reference frames, clamped to
/// `[0, MAX_FRAME_SCALE]`. Negative and non-finite input counts as 0.
pub fn frame_scale(dt: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    (dt / REFERENCE_FRAME).min(MAX_FRAME_SCALE)
}

/// `dt` with negative and non-finite input mapped to 0.
pub fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}
