use crate::physics::integrators::build_integrator;
use crate::physics::math::Scalar;
use crate::physics::state::{BodyRecord, RandomBodyRanges};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides, e.g. `ORBITRAIL_PHYSICS__TIME_STEP`
pub const ENV_PREFIX: &str = "ORBITRAIL";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Slowest real-time tick rate; one tick every 1000 seconds
pub const MIN_TICK_RATE_HZ: f64 = 1e-3;

/// Errors raised while loading or validating configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration source could not be read or deserialized
    Load(String),
    /// Runge-Kutta order outside the supported range
    UnsupportedOrder(usize),
    /// Butcher tableau with the wrong shape or non-finite weights
    InvalidTableau(String),
    /// A scalar parameter outside its admissible range
    InvalidParameter { name: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Failed to load configuration: {msg}"),
            ConfigError::UnsupportedOrder(order) => {
                write!(f, "Unsupported Runge-Kutta order {order}, expected 1 to 4")
            }
            ConfigError::InvalidTableau(msg) => write!(f, "Invalid Butcher tableau: {msg}"),
            ConfigError::InvalidParameter { name, reason } => {
                write!(f, "Invalid value for `{name}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<::config::ConfigError> for ConfigError {
    fn from(err: ::config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub trails: TrailsConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub time_step: Scalar,
    pub max_time: Scalar,
    pub gravitational_constant: Scalar,
    /// Number of random bodies; ignored when `bodies` is given
    pub body_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_seed: Option<u64>,
    pub integrator: IntegratorConfig,
    pub random_bodies: RandomBodyRanges,
    /// Explicit initial conditions, one entry per body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bodies: Option<Vec<BodyRecord>>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            max_time: 100.0,
            gravitational_constant: 1.0,
            body_count: 10,
            initial_seed: None,
            integrator: IntegratorConfig::default(),
            random_bodies: RandomBodyRanges::default(),
            bodies: None,
        }
    }
}

fn default_order() -> usize {
    4
}

fn default_max_iterations() -> usize {
    crate::physics::integrators::registry::DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> Scalar {
    crate::physics::integrators::registry::DEFAULT_TOLERANCE
}

/// Integration scheme selection, tagged by `kind`
///
/// ```toml
/// [physics.integrator]
/// kind = "runge_kutta"
/// order = 2
/// b = [[0.0], [0.5]]
/// c = [0.0, 1.0]
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegratorConfig {
    RungeKutta {
        #[serde(default = "default_order")]
        order: usize,
        /// Stage matrix; the standard tableau for `order` is used when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        b: Option<Vec<Vec<Scalar>>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        c: Option<Vec<Scalar>>,
    },
    HuenPredictorCorrector {
        #[serde(default = "default_max_iterations")]
        max_iterations: usize,
        #[serde(default = "default_tolerance")]
        tolerance: Scalar,
    },
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig::RungeKutta {
            order: default_order(),
            b: None,
            c: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrailsConfig {
    /// Visible samples per body
    pub length: usize,
    /// Allocated samples per body
    pub max_length: usize,
}

impl Default for TrailsConfig {
    fn default() -> Self {
        Self {
            length: 500,
            max_length: 2000,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Fixed steps per wall-clock second outside batch mode
    pub tick_rate_hz: f64,
    /// Steps between progress reports; 0 disables them
    pub report_interval_steps: u64,
    pub exit_on_finish: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            report_interval_steps: 1000,
            exit_on_finish: true,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(invalid(
                "time_step",
                format!("must be positive, got {}", self.time_step),
            ));
        }
        if !(self.max_time.is_finite() && self.max_time >= 0.0) {
            return Err(invalid(
                "max_time",
                format!("must be zero or positive, got {}", self.max_time),
            ));
        }
        if !self.gravitational_constant.is_finite() {
            return Err(invalid(
                "gravitational_constant",
                format!("must be finite, got {}", self.gravitational_constant),
            ));
        }

        match &self.bodies {
            Some(bodies) => {
                if bodies.is_empty() {
                    return Err(invalid("bodies", "must list at least one body"));
                }
                if let Some((index, body)) = bodies
                    .iter()
                    .enumerate()
                    .find(|(_, body)| !(body.mass.is_finite() && body.mass > 0.0))
                {
                    return Err(invalid(
                        "bodies",
                        format!("body {index} has non-positive mass {}", body.mass),
                    ));
                }
                let finite = bodies.iter().all(|body| {
                    body.position().is_finite() && body.velocity().is_finite()
                });
                if !finite {
                    return Err(invalid("bodies", "positions and velocities must be finite"));
                }
            }
            None => {
                if self.body_count == 0 {
                    return Err(invalid("body_count", "must be at least 1"));
                }
                self.validate_random_ranges()?;
            }
        }

        build_integrator(&self.integrator).map(|_| ())
    }

    fn validate_random_ranges(&self) -> Result<(), ConfigError> {
        let ranges = &self.random_bodies;
        if !(ranges.mass_min.is_finite() && ranges.mass_min > 0.0) {
            return Err(invalid(
                "random_bodies.mass_min",
                format!("must be positive, got {}", ranges.mass_min),
            ));
        }
        if !(ranges.mass_max.is_finite() && ranges.mass_max >= ranges.mass_min) {
            return Err(invalid(
                "random_bodies.mass_max",
                format!("must be at least mass_min, got {}", ranges.mass_max),
            ));
        }
        if !(ranges.position_extent.is_finite() && ranges.position_extent >= 0.0) {
            return Err(invalid(
                "random_bodies.position_extent",
                "must be zero or positive",
            ));
        }
        if !(ranges.velocity_extent.is_finite() && ranges.velocity_extent >= 0.0) {
            return Err(invalid(
                "random_bodies.velocity_extent",
                "must be zero or positive",
            ));
        }
        Ok(())
    }

    /// Number of bodies this configuration produces
    pub fn effective_body_count(&self) -> usize {
        self.bodies
            .as_ref()
            .map_or(self.body_count, |bodies| bodies.len())
    }
}

impl TrailsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(invalid("trails.max_length", "must be at least 1"));
        }
        if self.length > self.max_length {
            return Err(invalid(
                "trails.length",
                format!(
                    "{} exceeds trails.max_length {}",
                    self.length, self.max_length
                ),
            ));
        }
        Ok(())
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz >= MIN_TICK_RATE_HZ) {
            return Err(invalid(
                "runtime.tick_rate_hz",
                format!(
                    "must be at least {MIN_TICK_RATE_HZ}, got {}",
                    self.tick_rate_hz
                ),
            ));
        }
        Ok(())
    }
}

impl SimulationConfig {
    /// Layer defaults, an optional TOML file and `ORBITRAIL_*` environment variables
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        let layered = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(layered.try_deserialize()?)
    }

    /// Load configuration from a file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(Some(path)) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Per-user configuration file, e.g. `~/.config/orbitrail/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "orbitrail")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load_from_user_config() -> Self {
        match Self::user_config_path() {
            Some(path) => {
                debug!("Looking for user configuration at {}", path.display());
                Self::load_or_default(path)
            }
            None => {
                info!("No home directory found. Using default configuration.");
                Self::default()
            }
        }
    }

    /// Save configuration to a file, creating missing parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn save_to_user_config(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = Self::user_config_path().ok_or("no home directory available")?;
        self.save(&path)?;
        Ok(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.trails.validate()?;
        self.runtime.validate()
    }
}
