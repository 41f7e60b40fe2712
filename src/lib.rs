pub mod clock;
pub mod config;
pub mod field;
pub mod noise;
pub mod render;
pub mod rng;

use std::time::Instant;

use clock::{AnimationClock, Offsets};
use config::{RenderParams, Settings};
use field::CloudField;
use noise::FractalSampler;

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Cloud layer generator for one presentation surface.
///
/// Owns the pixel buffer between frames. `render` hands out a shared borrow of
/// it, so the next frame cannot start while the compositor still reads the
/// previous one.
pub struct CloudEngine {
    params: RenderParams,
    sampler: FractalSampler,
    field: CloudField,
    clock: AnimationClock,
}

impl CloudEngine {
    pub fn new(settings: &Settings) -> Self {
        Self::with_params(settings.render_params())
    }

    pub fn with_params(params: RenderParams) -> Self {
        Self {
            sampler: FractalSampler::new(params.noise_frequency, params.octaves),
            params,
            field: CloudField::default(),
            clock: AnimationClock::start(),
        }
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn field(&self) -> &CloudField {
        &self.field
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Replace the parameters wholesale. The animation clock keeps running so
    /// motion continues from the current elapsed time at the new rates.
    pub fn set_settings(&mut self, settings: &Settings) {
        let params = settings.render_params();
        if params.noise_frequency != self.sampler.frequency() || params.octaves != self.sampler.octaves()
        {
            self.sampler = FractalSampler::new(params.noise_frequency, params.octaves);
        }
        self.params = params;
    }

    /// Surface size notification. Returns true if the buffer was reallocated.
    pub fn on_resize(&mut self, w: usize, h: usize) -> bool {
        let resized = self.field.resize(w, h);
        if resized {
            log::debug!("cloud buffer resized to {w}x{h}");
        }
        resized
    }

    pub fn offsets(&self, elapsed_ms: f64) -> Offsets {
        clock::offsets(
            elapsed_ms,
            self.params.evolution_rate,
            self.params.drift_x,
            self.params.drift_y,
        )
    }

    /// Render the frame for `elapsed_ms` since animation start.
    ///
    /// The result is row-major RGBA8 with straight alpha: white where there is
    /// cloud, `[0, 0, 0, 0]` where there is none. Before the first resize the
    /// returned field is empty.
    pub fn render(&mut self, elapsed_ms: f64) -> &CloudField {
        let off = self.offsets(elapsed_ms);
        render::generate_clouds(
            &mut self.field,
            &self.sampler,
            self.params.pixel_size,
            self.params.threshold,
            off,
        );
        &self.field
    }

    /// Render the frame for the current wall-clock time.
    pub fn render_now(&mut self) -> &CloudField {
        let elapsed = self.clock.elapsed_ms();
        self.render(elapsed)
    }

    /// Same as `render`, with per-phase timings. Read the frame via `field()`.
    pub fn render_timed(&mut self, elapsed_ms: f64) -> Vec<Timing> {
        let mut timings = Vec::new();
        let total_start = Instant::now();

        let t = Instant::now();
        self.render(elapsed_ms);
        timings.push(Timing {
            name: "generate",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        log::debug!(
            "frame t={elapsed_ms:.0}ms {}x{} block={} in {total_ms:.2}ms",
            self.field.w,
            self.field.h,
            self.params.pixel_size
        );
        timings.push(Timing {
            name: "TOTAL",
            ms: total_ms,
        });

        timings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_before_resize_is_empty() {
        let mut engine = CloudEngine::new(&Settings::default());
        assert!(engine.render(1000.0).is_empty());
    }

    #[test]
    fn set_settings_keeps_sampler_when_noise_unchanged() {
        let mut engine = CloudEngine::new(&Settings::default());
        let settings = Settings {
            drift_x: -0.01,
            ..Settings::default()
        };
        engine.set_settings(&settings);
        assert_eq!(engine.params().drift_x, -0.01);
        assert_eq!(engine.offsets(100.0).dx, -1.0);
    }

    #[test]
    fn set_settings_rebuilds_sampler_on_frequency_change() {
        let mut engine = CloudEngine::new(&Settings::default());
        engine.set_settings(&Settings {
            noise_frequency: 0.02,
            octaves: 5,
            ..Settings::default()
        });
        assert_eq!(engine.sampler.frequency(), 0.02);
        assert_eq!(engine.sampler.octaves(), 5);
    }

    #[test]
    fn timed_render_reports_phases() {
        let mut engine = CloudEngine::new(&Settings::default());
        engine.on_resize(16, 8);
        let timings = engine.render_timed(500.0);
        let names: Vec<_> = timings.iter().map(|t| t.name).collect();
        assert_eq!(names, ["generate", "TOTAL"]);
        assert_eq!(engine.field().rgba.len(), 16 * 8 * 4);
    }
}
