use std::time::Instant;

/// Noise-space offsets for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offsets {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

/// Map elapsed milliseconds and per-millisecond rates to noise offsets.
/// Linear in `elapsed_ms`; zero elapsed gives zero offsets.
#[inline]
pub fn offsets(elapsed_ms: f64, evolution_rate: f64, drift_x: f64, drift_y: f64) -> Offsets {
    Offsets {
        dx: elapsed_ms * drift_x,
        dy: elapsed_ms * drift_y,
        dz: elapsed_ms * evolution_rate,
    }
}

/// Animation start time. Offsets are always recomputed from `now - start`,
/// so pausing and resuming continues the motion instead of resetting it.
#[derive(Clone, Copy, Debug)]
pub struct AnimationClock {
    start: Instant,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::start()
    }
}

impl AnimationClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn started_at(start: Instant) -> Self {
        Self { start }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
