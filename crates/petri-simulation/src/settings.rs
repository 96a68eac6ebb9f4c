use serde::{Deserialize, Serialize};

/// Multipliers describing the environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalFactors {
    /// Scales energy decay.
    pub temperature: f64,
    /// Scales the chance that food spawns.
    pub resources: f64,
    /// Scales energy gained from predation.
    #[serde(alias = "predatorPressure")]
    pub predator_pressure: f64,
}

impl Default for EnvironmentalFactors {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            resources: 1.0,
            predator_pressure: 1.0,
        }
    }
}

/// User-adjustable parameters read at every tick.
///
/// Out-of-range values are clamped by [`Settings::sanitized`] before the
/// engine uses them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Accepted and clamped to `[0, 100]`; no behavior reads it yet.
    #[serde(alias = "strengthThreshold")]
    pub strength_threshold: f64,
    /// Merge speed bonus in percent, `[100, 300]`.
    #[serde(alias = "mergeSpeedBonus")]
    pub merge_speed_bonus: f64,
    /// Food spawn rate, `[0, 20]`.
    #[serde(alias = "foodSpawnRate")]
    pub food_spawn_rate: f64,
    /// Whether food spawns at all.
    #[serde(alias = "foodSpawningEnabled")]
    pub food_spawning_enabled: bool,
    /// Per-mutation probability for offspring, `[0, 0.5]`.
    #[serde(alias = "mutationRate")]
    pub mutation_rate: f64,
    /// Energy above which cells reproduce, `[50, 100]`.
    #[serde(alias = "reproductionThreshold")]
    pub reproduction_threshold: f64,
    /// Global energy decay multiplier, `[0.1, 5]`.
    #[serde(alias = "energyCost")]
    pub energy_cost: f64,
    /// Environment multipliers, each `[0, 2]`.
    #[serde(alias = "environmentalFactors")]
    pub environmental_factors: EnvironmentalFactors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strength_threshold: 60.0,
            merge_speed_bonus: 150.0,
            food_spawn_rate: 5.0,
            food_spawning_enabled: true,
            mutation_rate: 0.1,
            reproduction_threshold: 80.0,
            energy_cost: 1.0,
            environmental_factors: EnvironmentalFactors::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Copy with every field clamped into its valid range. Non-finite values
    /// fall back to the default.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let env = &self.environmental_factors;
        let denv = &d.environmental_factors;
        Self {
            strength_threshold: clamp(self.strength_threshold, 0.0, 100.0, d.strength_threshold),
            merge_speed_bonus: clamp(self.merge_speed_bonus, 100.0, 300.0, d.merge_speed_bonus),
            food_spawn_rate: clamp(self.food_spawn_rate, 0.0, 20.0, d.food_spawn_rate),
            food_spawning_enabled: self.food_spawning_enabled,
            mutation_rate: clamp(self.mutation_rate, 0.0, 0.5, d.mutation_rate),
            reproduction_threshold: clamp(
                self.reproduction_threshold,
                50.0,
                100.0,
                d.reproduction_threshold,
            ),
            energy_cost: clamp(self.energy_cost, 0.1, 5.0, d.energy_cost),
            environmental_factors: EnvironmentalFactors {
                temperature: clamp(env.temperature, 0.0, 2.0, denv.temperature),
                resources: clamp(env.resources, 0.0, 2.0, denv.resources),
                predator_pressure: clamp(env.predator_pressure, 0.0, 2.0, denv.predator_pressure),
            },
        }
    }

    /// Speed multiplier applied to a merge survivor.
    pub fn merge_speed_multiplier(&self) -> f64 {
        self.merge_speed_bonus / 100.0
    }

    /// Probability that one food particle spawns this tick.
    pub fn food_spawn_chance(&self) -> f64 {
        self.food_spawn_rate * self.environmental_factors.resources / 1000.0
    }
}

fn clamp(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
