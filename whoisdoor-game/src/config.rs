//! Tunable engine numbers.
//!
//! Every field defaults to the matching value in [`crate::constants`], so a
//! partial JSON document only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    ARRIVAL_DELAY_MAX_MS, ARRIVAL_DELAY_MS, CHEAT_AGE_STEP, COMPANION_CHANCE, IRONING_MAX,
    IRONING_STEP, MEMORY_SHOP_UNLOCK_AGE, PARENT_AGE_STEP, STARTING_PARENT_AGE, WORK_WAGE,
};

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error)]
pub enum EngineConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("ironing cap must be between 1 and 100 (got {value})")]
    IroningCap { value: u8 },
    #[error("companion chance must be between 0.0 and 1.0 (got {value:.2})")]
    CompanionChance { value: f64 },
    #[error("arrival delay {value_ms} ms exceeds maximum {max_ms} ms")]
    ArrivalDelay { value_ms: u64, max_ms: u64 },
    #[error("invalid engine config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_ironing_step")]
    pub ironing_step: u8,
    #[serde(default = "EngineConfig::default_ironing_max")]
    pub ironing_max: u8,
    #[serde(default = "EngineConfig::default_arrival_delay_ms")]
    pub arrival_delay_ms: u64,
    /// Probability that Deniz comes home with the child.
    #[serde(default = "EngineConfig::default_companion_chance")]
    pub companion_chance: f64,
    #[serde(default = "EngineConfig::default_work_wage")]
    pub work_wage: u64,
    #[serde(default = "EngineConfig::default_starting_parent_age")]
    pub starting_parent_age: u32,
    #[serde(default = "EngineConfig::default_parent_age_step")]
    pub parent_age_step: u32,
    #[serde(default = "EngineConfig::default_cheat_age_step")]
    pub cheat_age_step: u32,
    #[serde(default = "EngineConfig::default_memory_shop_unlock_age")]
    pub memory_shop_unlock_age: u32,
}

impl EngineConfig {
    const fn default_ironing_step() -> u8 {
        IRONING_STEP
    }

    const fn default_ironing_max() -> u8 {
        IRONING_MAX
    }

    const fn default_arrival_delay_ms() -> u64 {
        ARRIVAL_DELAY_MS
    }

    const fn default_companion_chance() -> f64 {
        COMPANION_CHANCE
    }

    const fn default_work_wage() -> u64 {
        WORK_WAGE
    }

    const fn default_starting_parent_age() -> u32 {
        STARTING_PARENT_AGE
    }

    const fn default_parent_age_step() -> u32 {
        PARENT_AGE_STEP
    }

    const fn default_cheat_age_step() -> u32 {
        CHEAT_AGE_STEP
    }

    const fn default_memory_shop_unlock_age() -> u32 {
        MEMORY_SHOP_UNLOCK_AGE
    }

    #[must_use]
    pub const fn arrival_delay(&self) -> Duration {
        Duration::from_millis(self.arrival_delay_ms)
    }

    /// Parse a JSON document and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any value is out of range.
    pub fn from_json(json: &str) -> Result<Self, EngineConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every tunable against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.ironing_step == 0 {
            return Err(EngineConfigError::Zero {
                field: "ironing_step",
            });
        }
        if !(1..=IRONING_MAX).contains(&self.ironing_max) {
            return Err(EngineConfigError::IroningCap {
                value: self.ironing_max,
            });
        }
        if !(0.0..=1.0).contains(&self.companion_chance) {
            return Err(EngineConfigError::CompanionChance {
                value: self.companion_chance,
            });
        }
        if self.parent_age_step == 0 {
            return Err(EngineConfigError::Zero {
                field: "parent_age_step",
            });
        }
        if self.arrival_delay_ms > ARRIVAL_DELAY_MAX_MS {
            return Err(EngineConfigError::ArrivalDelay {
                value_ms: self.arrival_delay_ms,
                max_ms: ARRIVAL_DELAY_MAX_MS,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ironing_step: Self::default_ironing_step(),
            ironing_max: Self::default_ironing_max(),
            arrival_delay_ms: Self::default_arrival_delay_ms(),
            companion_chance: Self::default_companion_chance(),
            work_wage: Self::default_work_wage(),
            starting_parent_age: Self::default_starting_parent_age(),
            parent_age_step: Self::default_parent_age_step(),
            cheat_age_step: Self::default_cheat_age_step(),
            memory_shop_unlock_age: Self::default_memory_shop_unlock_age(),
        }
    }
}
