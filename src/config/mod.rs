use crate::algorithms::ScoringMethod;
use crate::augmentation::NoiseKind;
use crate::data::Channel;
use crate::logging::LoggingConfig;
use crate::AlignError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub alignment: AlignmentConfig,
    pub noise: NoiseConfig,
    pub logging: LoggingConfig,
}

/// How the inner disk is compared with the outer ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Nearest-pixel angular profiles on the two circles.
    #[default]
    Point,
    /// Block comparison of annulus sectors against disk wedges.
    Sector,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Point => f.write_str("point"),
            Strategy::Sector => f.write_str("sector"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" | "points" => Ok(Strategy::Point),
            "sector" | "sectors" => Ok(Strategy::Sector),
            other => Err(format!("unknown strategy '{other}', expected point or sector")),
        }
    }
}

/// Everything one alignment run needs. Passed by reference into every
/// component and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub image_path: Option<PathBuf>,
    pub inner_diameter: u32,
    pub outer_diameter: u32,
    /// Samples per circle, and rotation hypotheses for the sector strategy.
    pub num_points: usize,
    pub channel: Channel,
    pub similarity_threshold: f64,
    /// Only used by the sector strategy.
    pub sector_count: usize,
    pub samples_per_degree: usize,
    pub strategy: Strategy,
    pub method: ScoringMethod,
    /// Circle center; `None` uses the image center.
    pub center: Option<(f64, f64)>,
    pub include_score_curve: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            inner_diameter: 261,
            outer_diameter: 297,
            num_points: 360,
            channel: Channel::Gray,
            similarity_threshold: 0.6,
            sector_count: 12,
            samples_per_degree: 2,
            strategy: Strategy::Point,
            method: ScoringMethod::Fft,
            center: None,
            include_score_curve: false,
        }
    }
}

impl AlignmentConfig {
    pub fn builder(inner_diameter: u32, outer_diameter: u32) -> AlignmentConfigBuilder {
        AlignmentConfigBuilder {
            config: AlignmentConfig {
                inner_diameter,
                outer_diameter,
                ..Default::default()
            },
        }
    }

    /// Sampling radius of the inner circle (half the diameter, rounded down).
    pub fn inner_radius(&self) -> f64 {
        (self.inner_diameter / 2) as f64
    }

    pub fn outer_radius(&self) -> f64 {
        (self.outer_diameter / 2) as f64
    }

    /// Shift scorer actually used; the sector strategy has none.
    pub fn scoring_method(&self) -> Option<ScoringMethod> {
        match self.strategy {
            Strategy::Point => Some(self.method),
            Strategy::Sector => None,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.inner_diameter < 2 {
            errors.push("inner_diameter must be at least 2".to_string());
        }
        // Radii round down, so adjacent odd/even diameters share a radius.
        if self.outer_radius() <= self.inner_radius() {
            errors.push("outer radius must be greater than inner radius".to_string());
        }
        if self.num_points == 0 {
            errors.push("num_points must be positive".to_string());
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            errors.push("similarity_threshold must lie within [-1, 1]".to_string());
        }
        if self.samples_per_degree == 0 {
            errors.push("samples_per_degree must be positive".to_string());
        }
        if self.strategy == Strategy::Sector
            && (self.sector_count == 0 || 360 % self.sector_count != 0)
        {
            errors.push(format!("sector_count {} must evenly divide 360", self.sector_count));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Builder producing a validated [`AlignmentConfig`].
#[derive(Debug, Clone)]
pub struct AlignmentConfigBuilder {
    config: AlignmentConfig,
}

impl AlignmentConfigBuilder {
    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.image_path = Some(path.into());
        self
    }

    pub fn num_points(mut self, num_points: usize) -> Self {
        self.config.num_points = num_points;
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.config.channel = channel;
        self
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    pub fn sector_count(mut self, sector_count: usize) -> Self {
        self.config.sector_count = sector_count;
        self
    }

    pub fn samples_per_degree(mut self, samples_per_degree: usize) -> Self {
        self.config.samples_per_degree = samples_per_degree;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn method(mut self, method: ScoringMethod) -> Self {
        self.config.method = method;
        self
    }

    pub fn center(mut self, center: (f64, f64)) -> Self {
        self.config.center = Some(center);
        self
    }

    pub fn include_score_curve(mut self, include: bool) -> Self {
        self.config.include_score_curve = include;
        self
    }

    pub fn build(self) -> crate::Result<AlignmentConfig> {
        match self.config.validate() {
            Ok(()) => Ok(self.config),
            Err(errors) if self.config.strategy == Strategy::Sector
                && errors.iter().all(|e| e.starts_with("sector_count")) =>
            {
                Err(AlignError::InvalidSectorCount(self.config.sector_count))
            }
            Err(errors) => Err(AlignError::InvalidConfig(errors.join("; "))),
        }
    }
}

/// Seeded bounded noise used by robustness sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub seed: u64,
    pub kind: NoiseKind,
    /// Uniform half-widths or gaussian standard deviations, per sweep step.
    pub amplitudes: Vec<f64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            kind: NoiseKind::Uniform,
            amplitudes: vec![0.0, 5.0, 10.0, 20.0, 40.0, 80.0],
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path)?;

        if content.trim_start().starts_with('{') {
            serde_json::from_str(&content).map_err(|e| AlignError::InvalidConfig(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| AlignError::InvalidConfig(e.to_string()))
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| AlignError::InvalidConfig(e.to_string()))?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| AlignError::InvalidConfig(e.to_string()))?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = match self.alignment.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        if self.noise.amplitudes.iter().any(|a| !a.is_finite() || *a < 0.0) {
            errors.push("noise amplitudes must be finite and non-negative".to_string());
        }
        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    Json,
    Toml,
}

/// Load and validate a config file, or fall back to defaults when no path is given.
pub fn load_config_or_default(config_path: Option<&Path>) -> crate::Result<Config> {
    let Some(path) = config_path else {
        return Ok(Config::default());
    };

    let config = Config::load_from_file(path)?;
    config
        .validate()
        .map_err(|errors| AlignError::InvalidConfig(errors.join("; ")))?;
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
