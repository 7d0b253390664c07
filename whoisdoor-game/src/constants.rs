//! Centralized tuning constants for the Who is Door life simulation.
//!
//! These values define the deterministic math for the day/phase state
//! machine. `EngineConfig::default()` mirrors them one-to-one, so a session
//! built without an explicit config behaves exactly as listed here.

// Logging -------------------------------------------------------------------
pub(crate) const LOG_TARGET: &str = "whoisdoor::engine";

// Session start -------------------------------------------------------------
pub const STARTING_DAY: u32 = 1;
pub const STARTING_PARENT_AGE: u32 = 30;

// Chores --------------------------------------------------------------------
pub const IRONING_STEP: u8 = 34;
pub const IRONING_MAX: u8 = 100;

// Arrival -------------------------------------------------------------------
pub const ARRIVAL_DELAY_MS: u64 = 1_500;
pub const COMPANION_CHANCE: f64 = 0.6;
pub(crate) const ARRIVAL_DELAY_MAX_MS: u64 = 60_000;

// Economy -------------------------------------------------------------------
pub const WORK_WAGE: u64 = 1_000;

// Ageing --------------------------------------------------------------------
pub const PARENT_AGE_STEP: u32 = 5;
pub const CHEAT_AGE_STEP: u32 = 10;
pub const MEMORY_SHOP_UNLOCK_AGE: u32 = 100;

// Day thresholds with special phase handling --------------------------------
pub const GRADUATION_DAY: u32 = 16;
pub const LEGACY_DAY: u32 = 17;

// Bundled string table keys -------------------------------------------------
pub(crate) const I18N_MESSAGE_PREFIX: &str = "message.";
pub(crate) const I18N_STAGE_PREFIX: &str = "stage.";
pub(crate) const I18N_STAGE_OBSERVER_PREFIX: &str = "stage_observer.";
pub(crate) const I18N_PHASE_PREFIX: &str = "phase.";
