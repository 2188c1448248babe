//! Simulation tuning.
//!
//! [`SimConfig`] gathers every constant the arena runs on. The defaults
//! reproduce the standard match; any field can be overridden from a RON
//! file, with missing fields falling back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Who pays recoil damage when a projectile connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RecoilRule {
    /// Every shooter takes recoil on every hit.
    #[default]
    Symmetric,
    /// Only the player-controlled tank takes recoil.
    PlayerOnly,
}

/// Tuning for the Boost power-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Window length in milliseconds.
    pub duration_ms: u64,
    /// Attack speed multiplier while active.
    pub attack_speed_multiplier: f32,
    /// Movement speed multiplier while active.
    pub speed_multiplier: f32,
    /// Projectile speed multiplier while active.
    pub bullet_speed_multiplier: f32,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3_000,
            attack_speed_multiplier: 2.0,
            speed_multiplier: 1.5,
            bullet_speed_multiplier: 1.5,
        }
    }
}

/// All simulation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Main tick frequency.
    pub tick_rate_hz: u32,
    /// Passive regeneration period.
    pub regen_interval_ms: u64,
    /// Fraction of missing health restored per regeneration tick.
    pub regen_fraction: f32,
    /// Period of the expired-effect sweep.
    pub effect_sweep_interval_ms: u64,
    /// Delay between death and revival.
    pub revive_delay_ms: u64,
    /// Fraction of the shooter's attack taken back as recoil (truncated).
    pub recoil_fraction: f32,
    /// Who takes recoil.
    pub recoil_rule: RecoilRule,
    /// Chance for each side of a hit to heal immediately.
    pub heal_on_hit_chance: f64,
    /// Fraction of missing health restored by an on-hit heal.
    pub heal_on_hit_fraction: f32,
    /// Lifetime of impact effects spawned by hits.
    pub impact_duration_ms: u64,
    /// Projectile footprint (width, height).
    pub projectile_size: (f32, f32),
    /// Boost power-up tuning.
    pub boost: BoostConfig,
    /// Disperse power-up window length.
    pub disperse_duration_ms: u64,
    /// When true, a projectile damages every opposing tank it overlaps in
    /// the tick it connects; when false it stops at the first.
    pub multi_hit: bool,
    /// Seed for the heal-on-hit rolls.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 64,
            regen_interval_ms: 1_000,
            regen_fraction: 0.1,
            effect_sweep_interval_ms: 5_000,
            revive_delay_ms: 3_000,
            recoil_fraction: 0.15,
            recoil_rule: RecoilRule::Symmetric,
            heal_on_hit_chance: 0.25,
            heal_on_hit_fraction: 0.1,
            impact_duration_ms: 200,
            projectile_size: (100.0, 100.0 / 3.0),
            boost: BoostConfig::default(),
            disperse_duration_ms: 8_000,
            multi_hit: true,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Duration of one tick in microseconds.
    #[must_use]
    pub fn tick_micros(&self) -> u64 {
        1_000_000 / u64::from(self.tick_rate_hz.max(1))
    }

    /// Reject settings the scheduler or the heal rolls cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(GameError::InvalidConfig("tick_rate_hz must be positive".into()));
        }
        if self.regen_interval_ms == 0 || self.effect_sweep_interval_ms == 0 {
            return Err(GameError::InvalidConfig(
                "periodic intervals must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.heal_on_hit_chance) {
            return Err(GameError::InvalidConfig(format!(
                "heal_on_hit_chance {} is not a probability",
                self.heal_on_hit_chance
            )));
        }
        let fractions = [
            ("regen_fraction", self.regen_fraction),
            ("recoil_fraction", self.recoil_fraction),
            ("heal_on_hit_fraction", self.heal_on_hit_fraction),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(GameError::InvalidConfig(format!(
                    "{field} {value} must be between 0 and 1"
                )));
            }
        }
        let (width, height) = self.projectile_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GameError::InvalidConfig(
                "projectile_size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = ron::from_str(&contents).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tick_is_64hz() {
        let config = SimConfig::default();
        assert_eq!(config.tick_micros(), 15_625);
    }

    #[test]
    fn test_partial_ron_override() {
        let config = SimConfig::from_ron_str("(multi_hit: false, recoil_rule: PlayerOnly, seed: 9)")
            .unwrap();
        assert!(!config.multi_hit);
        assert_eq!(config.recoil_rule, RecoilRule::PlayerOnly);
        assert_eq!(config.seed, 9);
        assert_eq!(config.revive_delay_ms, 3_000);
        assert_eq!(config.boost, BoostConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let err = SimConfig::from_ron_str("(regen_interval_ms: 0)").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));

        let config = SimConfig {
            heal_on_hit_chance: 1.5,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_caps_fractions_at_one() {
        let config = SimConfig {
            recoil_fraction: 1.5,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        let config = SimConfig {
            regen_fraction: f32::NAN,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            heal_on_hit_fraction: 1.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_ron_is_parse_error() {
        let err = SimConfig::from_ron_str("(tick_rate_hz: \"fast\")").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }
}
