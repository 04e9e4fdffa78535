use std::fs;
use std::path::Path;
use std::time::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use crate::recorder::DEFAULT_OUTPUT_FILENAME;
use crate::telemetry::error::GrapherError;
use crate::telemetry::scale::{ScaleMode, ValueRange};
use crate::telemetry::smoothing::validate_factor;
use crate::telemetry::view::GraphStyle;
pub const SETTINGS_FILE: &str = "live_grapher_settings.json";
pub const DEFAULT_BAUD_RATE: u32 = 9600;
const BAUD_RANGE: std::ops::RangeInclusive<u32> = 300..=250_000;
/// Validated pipeline parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub channel_count: usize,
    pub max_samples: usize,
    pub smoothing_factor: f64,
    pub rate_period_ms: u64,
}
impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_count: 13,
            max_samples: 1000,
            smoothing_factor: 0.85,
            rate_period_ms: 1000,
        }
    }
}
impl PipelineConfig {
    pub fn validate(&self) -> Result<(), GrapherError> {
        if self.channel_count == 0 {
            return Err(GrapherError::InvalidChannelCount);
        }
        if self.max_samples == 0 {
            return Err(GrapherError::InvalidMaxSamples);
        }
        if self.rate_period_ms == 0 {
            return Err(GrapherError::InvalidRatePeriod);
        }
        validate_factor(self.smoothing_factor)
    }
    pub fn rate_period(&self) -> Duration {
        Duration::from_millis(self.rate_period_ms)
    }
}
/// Everything the panel remembers between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub pipeline: PipelineConfig,
    pub port_name: String,
    pub baud_rate: u32,
    pub output_filename: String,
    pub scale_mode: ScaleMode,
    pub fixed_min: f64,
    pub fixed_max: f64,
    pub graph_style: GraphStyle,
}
impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            output_filename: DEFAULT_OUTPUT_FILENAME.to_owned(),
            scale_mode: ScaleMode::default(),
            fixed_min: 0.0,
            fixed_max: 1000.0,
            graph_style: GraphStyle::default(),
        }
    }
}
impl PanelSettings {
    pub fn validate(&self) -> Result<(), GrapherError> {
        self.pipeline.validate()?;
        validate_baud_rate(self.baud_rate)
    }
    pub fn fixed_bounds(&self) -> ValueRange {
        ValueRange::new(self.fixed_min, self.fixed_max)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrapherError> {
        let text = fs::read_to_string(path)?;
        let settings: PanelSettings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }
    /// A missing, unreadable or invalid file gives the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!("ignoring settings in {}: {err}", path.display());
                Self::default()
            }
        }
    }
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GrapherError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
pub fn validate_baud_rate(baud: u32) -> Result<(), GrapherError> {
    if BAUD_RANGE.contains(&baud) {
        Ok(())
    } else {
        Err(GrapherError::InvalidBaudRate(baud))
    }
}
