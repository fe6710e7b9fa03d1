//! Command line interface for Orbitrail

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::config::{ConfigError, SimulationConfig};
use crate::physics::integrators::registry::IntegratorRegistry;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    ConfigLoad(String),
    /// Invalid integrator name provided
    InvalidIntegrator(String),
    /// Loaded configuration, with overrides applied, failed validation
    InvalidConfig(ConfigError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::InvalidIntegrator(msg) => write!(f, "Invalid integrator: {msg}"),
            CliError::InvalidConfig(err) => write!(f, "Invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Orbitrail - N-body gravity integrator with position trails
#[derive(Parser, Debug, Default)]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of random bodies (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub bodies: Option<usize>,

    /// Gravitational constant (overrides config file)
    #[arg(short = 'g', long, value_name = "VALUE")]
    pub gravity: Option<f64>,

    /// Integrator name (e.g., rk4, midpoint, heun)
    #[arg(short = 'i', long, value_name = "NAME")]
    pub integrator: Option<String>,

    /// Random seed for body generation
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Time step (overrides config file)
    #[arg(long, value_name = "DT")]
    pub dt: Option<f64>,

    /// Simulated time horizon (overrides config file)
    #[arg(long, value_name = "T")]
    pub t_max: Option<f64>,

    /// Visible trail samples per body (overrides config file)
    #[arg(long, value_name = "LENGTH")]
    pub trail_length: Option<usize>,

    /// Step as fast as possible until the horizon, then exit
    #[arg(long)]
    pub batch: bool,

    /// Start paused
    #[arg(short = 'p', long)]
    pub paused: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,

    /// Save the effective configuration as the per-user default and exit
    #[arg(long)]
    pub save_config: bool,
}

/// Handles the --list-integrators flag by printing available integrators and exiting
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::new().with_standard_integrators();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line overrides
///
/// An explicitly named file must load; the per-user file falls back to
/// defaults. The result is validated before it is returned.
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::load(Some(config_path))
            .map_err(|err| CliError::ConfigLoad(err.to_string()))?
    } else {
        SimulationConfig::load_from_user_config()
    };

    apply_overrides(args, &mut config)?;

    config.validate().map_err(CliError::InvalidConfig)?;
    Ok(config)
}

fn apply_overrides(args: &Args, config: &mut SimulationConfig) -> Result<(), CliError> {
    if let Some(body_count) = args.bodies {
        println!("Overriding body count to: {body_count}");
        config.physics.body_count = body_count;
        if config.physics.bodies.take().is_some() {
            println!("Ignoring explicit bodies from configuration");
        }
    }

    if let Some(gravity) = args.gravity {
        println!("Overriding gravitational constant to: {gravity}");
        config.physics.gravitational_constant = gravity;
    }

    if let Some(integrator_name) = &args.integrator {
        let registry = IntegratorRegistry::new().with_standard_integrators();
        config.physics.integrator = registry
            .create(integrator_name)
            .map_err(CliError::InvalidIntegrator)?;
        println!("Using integrator: {integrator_name}");
    }

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.physics.initial_seed = Some(seed);
    }

    if let Some(dt) = args.dt {
        println!("Overriding time step to: {dt}");
        config.physics.time_step = dt;
    }

    if let Some(t_max) = args.t_max {
        println!("Overriding time horizon to: {t_max}");
        config.physics.max_time = t_max;
    }

    if let Some(length) = args.trail_length {
        println!("Overriding trail length to: {length}");
        config.trails.length = length;
        config.trails.max_length = config.trails.max_length.max(length);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntegratorConfig;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "orbitrail",
            "-n",
            "12",
            "-i",
            "heun",
            "--dt",
            "0.5",
            "--t-max",
            "20",
            "--trail-length",
            "64",
            "--batch",
            "--save-config",
        ])
        .unwrap();

        assert_eq!(args.bodies, Some(12));
        assert_eq!(args.integrator.as_deref(), Some("heun"));
        assert_eq!(args.dt, Some(0.5));
        assert_eq!(args.t_max, Some(20.0));
        assert_eq!(args.trail_length, Some(64));
        assert!(args.batch);
        assert!(args.save_config);
        assert!(!args.paused);
    }

    #[test]
    fn test_overrides_apply() {
        let args = Args {
            bodies: Some(7),
            gravity: Some(0.5),
            integrator: Some("rk2".to_string()),
            seed: Some(11),
            dt: Some(0.125),
            t_max: Some(3.0),
            trail_length: Some(5000),
            ..Default::default()
        };

        let mut config = SimulationConfig::default();
        apply_overrides(&args, &mut config).unwrap();

        assert_eq!(config.physics.body_count, 7);
        assert_eq!(config.physics.gravitational_constant, 0.5);
        assert_eq!(config.physics.initial_seed, Some(11));
        assert_eq!(config.physics.time_step, 0.125);
        assert_eq!(config.physics.max_time, 3.0);
        assert_eq!(
            config.physics.integrator,
            IntegratorConfig::RungeKutta {
                order: 2,
                b: None,
                c: None
            }
        );
        assert_eq!(config.trails.length, 5000);
        assert_eq!(config.trails.max_length, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_integrator_rejected() {
        let args = Args {
            integrator: Some("yoshida".to_string()),
            ..Default::default()
        };

        let mut config = SimulationConfig::default();
        let result = apply_overrides(&args, &mut config);
        assert!(matches!(result, Err(CliError::InvalidIntegrator(_))));
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let args = Args {
            config: Some(std::env::temp_dir().join("orbitrail-cli-missing.toml")),
            dt: Some(-1.0),
            ..Default::default()
        };

        let result = load_and_apply_config(&args);
        assert!(matches!(result, Err(CliError::InvalidConfig(_))));
    }
}
