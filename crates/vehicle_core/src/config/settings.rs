//! # Simulation Settings
//!
//! Server-wide switches read by the collision and part physics code. Loaded
//! once at startup from TOML or RON through the [`Config`] trait and passed
//! by reference into every tick.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// General behaviour switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// When set, vehicles never collide with blocks
    pub noclip_vehicles: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            noclip_vehicles: false,
        }
    }
}

/// Damage tuning for parts that hurt what they touch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageSettings {
    /// Whether wheels may go flat at all
    pub wheel_breakage: bool,
    /// Scale applied to wheel contact damage
    pub wheel_damage_factor: f64,
    /// Vehicle speed below which wheels do not hurt actors
    pub wheel_damage_minimum_velocity: f64,
    /// Use mass alone for wheel damage instead of speed times mass
    pub wheel_damage_ignore_velocity: bool,
    /// Scale applied to propeller strike damage
    pub propeller_damage_factor: f64,
    /// Whether destroyed parts produce destructive explosions
    pub explosions: bool,
}

impl Default for DamageSettings {
    fn default() -> Self {
        Self {
            wheel_breakage: true,
            wheel_damage_factor: 1.0,
            wheel_damage_minimum_velocity: 0.2,
            wheel_damage_ignore_velocity: false,
            propeller_damage_factor: 1.0,
            explosions: true,
        }
    }
}

/// # Simulation Settings
///
/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// General switches
    pub general: GeneralSettings,
    /// Damage tuning
    pub damage: DamageSettings,
}

impl Config for SimSettings {}

impl SimSettings {
    /// Enable or disable vehicle/block collision
    pub fn with_noclip(mut self, noclip: bool) -> Self {
        self.general.noclip_vehicles = noclip;
        self
    }

    /// Enable or disable flat tires
    pub fn with_wheel_breakage(mut self, enabled: bool) -> Self {
        self.damage.wheel_breakage = enabled;
        self
    }

    /// Set wheel damage factor and the speed threshold it starts at
    pub fn with_wheel_damage(mut self, factor: f64, minimum_velocity: f64) -> Self {
        self.damage.wheel_damage_factor = factor;
        self.damage.wheel_damage_minimum_velocity = minimum_velocity;
        self
    }

    /// Make wheel damage depend on mass only
    pub fn with_wheel_damage_ignoring_velocity(mut self, ignore: bool) -> Self {
        self.damage.wheel_damage_ignore_velocity = ignore;
        self
    }

    /// Set propeller strike damage factor
    pub fn with_propeller_damage(mut self, factor: f64) -> Self {
        self.damage.propeller_damage_factor = factor;
        self
    }

    /// Enable or disable destructive explosions
    pub fn with_explosions(mut self, enabled: bool) -> Self {
        self.damage.explosions = enabled;
        self
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let damage = &self.damage;
        if damage.wheel_damage_factor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "wheel_damage_factor must not be negative, got {}",
                damage.wheel_damage_factor
            )));
        }
        if damage.wheel_damage_minimum_velocity < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "wheel_damage_minimum_velocity must not be negative, got {}",
                damage.wheel_damage_minimum_velocity
            )));
        }
        if damage.propeller_damage_factor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "propeller_damage_factor must not be negative, got {}",
                damage.propeller_damage_factor
            )));
        }
        Ok(())
    }

    /// Load from file and validate in one step
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let settings = Self::load_from_file(path)?;
        settings.validate()?;
        Ok(settings)
    }
}
