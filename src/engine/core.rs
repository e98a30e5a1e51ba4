use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const CONFIG_ENV: &str = "FIXSTEP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "fixstep.ron";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub app_name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub resizable: bool,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Pixels per second along each held direction.
    pub player_speed: f32,
    pub player_start: (f32, f32),
    pub texture_path: String,
    pub font_path: String,
    pub stats_position: (f32, f32),
    pub stats_char_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "SFML Application".to_string(),
            window_width: 640,
            window_height: 480,
            resizable: false,
            tick_rate: 60,
            player_speed: 100.0,
            player_start: (100.0, 100.0),
            texture_path: "Media/Textures/Eagle.png".to_string(),
            font_path: "Media/Sansation.ttf".to_string(),
            stats_position: (5.0, 5.0),
            stats_char_size: 10,
        }
    }
}

impl EngineConfig {
    /// Reads the config named by `FIXSTEP_CONFIG`, or `fixstep.ron` when unset.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_or_default(path)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: "engine", path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            Err(err) => {
                tracing::warn!(target: "engine", path = %path.display(), %err, "failed to read config, using defaults");
                return Self::default();
            }
        };

        match Self::from_ron(&source) {
            Ok(config) => {
                tracing::info!(target: "engine", path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                tracing::warn!(target: "engine", path = %path.display(), %err, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    pub fn fixed_step(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }
}

/// Summary of one real frame as seen by the scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub delta: Duration,
    pub ticks: u32,
}

/// Leftover real time waiting to be consumed in fixed-size steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            accumulator: Duration::ZERO,
        }
    }

    pub fn from_rate(ticks_per_second: u32) -> Self {
        Self::new(Duration::from_secs(1) / ticks_per_second.max(1))
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    pub fn accumulate(&mut self, delta: Duration) {
        self.accumulator += delta;
    }

    pub fn should_step(&mut self) -> bool {
        if !self.step.is_zero() && self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }
}
