use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noise::{DEFAULT_OCTAVES, MAX_OCTAVES};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid sky color {0:?}, expected hex like #55B4E1")]
    InvalidSkyColor(String),
}

/// Opaque background color behind the cloud layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkyColor(pub [u8; 3]);

impl SkyColor {
    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidSkyColor(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn rgba(self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], 255]
    }
}

/// Full wallpaper configuration. Only some fields reach the cloud core:
/// `frames_per_second` belongs to the frame scheduler and `sky_color` to the
/// compositor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Blocks of pixel_size x pixel_size share one color.
    pub pixel_size: u32,
    pub frames_per_second: u32,
    pub sky_color: String,
    /// Noise-space units per millisecond along the time axis.
    pub evolution_rate: f64,
    pub noise_frequency: f64,
    /// Fraction of the noise range treated as clear sky. Higher = sparser.
    pub cloud_density_threshold: f64,
    /// Noise-space units per millisecond; positive drifts east.
    pub drift_x: f64,
    /// Positive drifts south.
    pub drift_y: f64,
    pub octaves: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pixel_size: 4,
            frames_per_second: 4,
            sky_color: "#55B4E1".into(),
            evolution_rate: 0.005,
            noise_frequency: 0.005,
            cloud_density_threshold: 0.50,
            drift_x: 0.003,
            drift_y: 0.0005,
            octaves: DEFAULT_OCTAVES,
        }
    }
}

impl Settings {
    pub fn sky(&self) -> Result<SkyColor, ConfigError> {
        SkyColor::parse(&self.sky_color)
    }

    /// Delay between frames for the scheduler, in milliseconds.
    pub fn frame_interval_ms(&self) -> u64 {
        1000 / u64::from(self.frames_per_second.max(1))
    }

    /// The immutable, clamped view the renderer reads.
    pub fn render_params(&self) -> RenderParams {
        let pixel_size = if self.pixel_size < 1 {
            log::warn!("pixel_size {} clamped to 1", self.pixel_size);
            1
        } else {
            self.pixel_size as usize
        };

        let octaves = if self.octaves < 1 {
            log::warn!("octaves {} clamped to 1", self.octaves);
            1
        } else if self.octaves > MAX_OCTAVES {
            log::warn!("octaves {} clamped to {MAX_OCTAVES}", self.octaves);
            MAX_OCTAVES
        } else {
            self.octaves
        };

        let t = self.cloud_density_threshold;
        let threshold = if t.is_nan() {
            log::warn!("cloud_density_threshold is NaN, treating as clear sky");
            1.0
        } else if !(0.0..=1.0).contains(&t) {
            let c = t.clamp(0.0, 1.0);
            log::warn!("cloud_density_threshold {t} clamped to {c}");
            c
        } else {
            t
        };

        RenderParams {
            pixel_size,
            noise_frequency: self.noise_frequency,
            threshold,
            evolution_rate: self.evolution_rate,
            drift_x: self.drift_x,
            drift_y: self.drift_y,
            octaves,
        }
    }
}

/// Parameters consumed by the cloud core. Built once per settings change and
/// never mutated; a new configuration produces a new value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// Always >= 1.
    pub pixel_size: usize,
    pub noise_frequency: f64,
    /// Always within [0, 1].
    pub threshold: f64,
    pub evolution_rate: f64,
    pub drift_x: f64,
    pub drift_y: f64,
    /// Always within 1..=MAX_OCTAVES.
    pub octaves: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Settings::default().render_params()
    }
}
