//! Named integrator presets
//!
//! The command line selects integrators by name. Each preset maps a canonical
//! name and its aliases to a complete [`IntegratorConfig`], so the rest of the
//! program only ever deals with configurations.

use crate::config::IntegratorConfig;
use std::collections::HashMap;

/// Default pass budget for the predictor-corrector presets
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Default relative tolerance for the predictor-corrector presets
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Preset {
    canonical: &'static str,
    config: IntegratorConfig,
}

/// Lookup table from integrator names and aliases to configurations
#[derive(Debug, Clone, Default)]
pub struct IntegratorRegistry {
    presets: HashMap<String, Preset>,
}

impl IntegratorRegistry {
    /// Create an empty registry without any presets
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in presets
    ///
    /// Returns self for method chaining.
    pub fn with_standard_integrators(mut self) -> Self {
        let standard_runge_kutta = |order| IntegratorConfig::RungeKutta {
            order,
            b: None,
            c: None,
        };

        self.register("euler", &["rk1", "explicit_euler"], standard_runge_kutta(1));
        self.register("midpoint", &["rk2"], standard_runge_kutta(2));
        self.register("kutta3", &["rk3"], standard_runge_kutta(3));
        self.register("rk4", &["classic_rk4", "runge_kutta"], standard_runge_kutta(4));
        self.register(
            "huen_predictor_corrector",
            &["heun", "huen", "pc"],
            IntegratorConfig::HuenPredictorCorrector {
                max_iterations: DEFAULT_MAX_ITERATIONS,
                tolerance: DEFAULT_TOLERANCE,
            },
        );

        self
    }

    /// Register a preset under `name` and each of `aliases`
    ///
    /// Re-registering a name replaces the previous preset.
    pub fn register(&mut self, name: &'static str, aliases: &[&'static str], config: IntegratorConfig) {
        let preset = Preset {
            canonical: name,
            config,
        };

        for alias in aliases {
            self.presets.insert(alias.to_string(), preset.clone());
        }
        self.presets.insert(name.to_string(), preset);
    }

    pub fn create(&self, name: &str) -> Result<IntegratorConfig, String> {
        self.presets
            .get(name)
            .map(|preset| preset.config.clone())
            .ok_or_else(|| {
                let alias_names: Vec<String> =
                    self.list_aliases().into_iter().map(|(alias, _)| alias).collect();
                format!(
                    "Unknown integrator: '{}'. Available integrators: {}. Aliases: {}",
                    name,
                    self.list_available().join(", "),
                    alias_names.join(", ")
                )
            })
    }

    pub fn list_available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .presets
            .iter()
            .filter(|(key, preset)| key.as_str() == preset.canonical)
            .map(|(key, _)| key.clone())
            .collect();
        names.sort();
        names
    }

    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .presets
            .iter()
            .filter(|(key, preset)| key.as_str() != preset.canonical)
            .map(|(key, preset)| (key.clone(), preset.canonical.to_string()))
            .collect();
        aliases.sort_by(|a, b| a.0.cmp(&b.0));
        aliases
    }
}
