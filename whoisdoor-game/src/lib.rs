//! Who is Door Life Engine
//!
//! Platform-agnostic core of the Who is Door life simulation: a parent watches
//! a child move from elementary school to grandchildren, one day at a time.
//! This crate owns the day/phase state machine, its arrival timer, and the
//! bundled strings; rendering lives elsewhere and talks to it through
//! [`EngineCommand`] and [`EngineEvent`].

pub mod capabilities;
pub mod config;
pub mod constants;
#[cfg(feature = "async")]
pub mod driver;
pub mod engine;
pub mod event;
pub mod i18n;
pub mod input;
pub mod memories;
pub mod progression;
pub mod rng;
pub mod session;
pub mod state;

use std::convert::Infallible;

use thiserror::Error;

// Re-export commonly used types
pub use capabilities::{
    ActionSet, available_overlays, can_advance_day, is_valid_action, memory_shop_unlocked,
    valid_actions,
};
pub use config::{EngineConfig, EngineConfigError};
#[cfg(feature = "async")]
pub use driver::{DriverError, SessionHandle};
pub use engine::{EngineCommand, LifeEngine};
pub use event::{Cheat, EngineEvent, EventId, EventKind, UiSurfaceHint};
pub use i18n::I18nError;
pub use input::{HeldKeys, KeyEvent, KeyTracker, detect_command};
pub use memories::{MEMORIES, Memory};
pub use progression::{DAY_RULES, DayRule, PhaseOverride, rule_for_day, scheduled_stage};
pub use rng::CompanionRng;
pub use session::{LifeSession, PendingArrival};
pub use state::{
    Activity, GamePhase, GameState, Language, LifeStage, MessageKey, Overlay, ParseEnumError,
};

/// Source of engine tunables.
/// Hosts provide this: a file, a bundled asset, or a literal config.
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or parsed.
    fn load_engine_config(&self) -> Result<EngineConfig, Self::Error>;
}

impl ConfigLoader for EngineConfig {
    type Error = Infallible;

    fn load_engine_config(&self) -> Result<EngineConfig, Self::Error> {
        Ok(self.clone())
    }
}

#[derive(Debug, Error)]
pub enum SessionError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load engine config")]
    Load(#[source] E),
    #[error(transparent)]
    Config(#[from] EngineConfigError),
}

/// Builds validated sessions from a config source.
pub struct WhoIsDoor<L>
where
    L: ConfigLoader,
{
    loader: L,
}

impl<L> WhoIsDoor<L>
where
    L: ConfigLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    fn load_config(&self) -> Result<EngineConfig, SessionError<L::Error>> {
        let cfg = self
            .loader
            .load_engine_config()
            .map_err(SessionError::Load)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Session with a reproducible companion stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or fails validation.
    pub fn create_session(&self, seed: u64) -> Result<LifeSession, SessionError<L::Error>> {
        Ok(LifeSession::with_seed(self.load_config()?, seed))
    }

    /// Session seeded from OS entropy, as a normal play session is.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or fails validation.
    pub fn create_live_session(&self) -> Result<LifeSession, SessionError<L::Error>> {
        Ok(LifeSession::new(self.load_config()?))
    }

    /// Spawn a live session onto the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or fails validation.
    #[cfg(feature = "async")]
    pub fn spawn_live_session(&self) -> Result<SessionHandle, SessionError<L::Error>> {
        let (handle, _task) = driver::spawn(self.create_live_session()?);
        Ok(handle)
    }
}
