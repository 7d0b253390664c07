//! What the player may do in a given state.
//!
//! The engine applies commands literally; these predicates are what a
//! renderer uses to decide which buttons exist, and what the engine checks
//! before logging a misuse warning.

use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::state::{Activity, GamePhase, GameState, LifeStage, Overlay};

pub type ActionSet = SmallVec<[Activity; 4]>;

/// Activities the current state offers.
#[must_use]
pub fn valid_actions(state: &GameState, cfg: &EngineConfig) -> ActionSet {
    let mut actions = ActionSet::new();
    match state.phase {
        GamePhase::Waiting if !state.ironing_complete(cfg.ironing_max) => {
            actions.push(Activity::Ironing);
        }
        GamePhase::Legacy if state.stage == LifeStage::Job && !state.interaction_done => {
            actions.push(Activity::Working);
        }
        phase if phase.is_child_home() && !state.interaction_done => {
            if state.is_deniz_present {
                actions.push(Activity::PlayingVr);
                actions.push(Activity::Adventure);
            } else {
                actions.push(Activity::PlayingPc);
            }
        }
        _ => {}
    }
    actions
}

#[must_use]
pub fn is_valid_action(state: &GameState, cfg: &EngineConfig, activity: Activity) -> bool {
    valid_actions(state, cfg).contains(&activity)
}

/// The "Next Day" gate.
#[must_use]
pub const fn can_advance_day(state: &GameState) -> bool {
    state.interaction_done || matches!(state.phase, GamePhase::Legacy | GamePhase::Graduation)
}

#[must_use]
pub const fn memory_shop_unlocked(state: &GameState, cfg: &EngineConfig) -> bool {
    state.parent_age >= cfg.memory_shop_unlock_age
}

/// Overlays reachable without cheats from the current phase.
#[must_use]
pub fn available_overlays(state: &GameState, cfg: &EngineConfig) -> SmallVec<[Overlay; 2]> {
    let mut overlays = SmallVec::new();
    if state.phase == GamePhase::Menu {
        overlays.push(Overlay::WatchChild);
        if memory_shop_unlocked(state, cfg) {
            overlays.push(Overlay::Shop);
        }
    } else if state.phase.is_day_chain() || state.is_legacy() {
        overlays.push(Overlay::WatchChild);
    }
    overlays
}

/// Whether the status bar shows the parent's age.
#[must_use]
pub const fn shows_parent_age(state: &GameState) -> bool {
    !state.is_legacy()
}

/// Whether the status bar shows the child's budget.
#[must_use]
pub fn shows_budget(state: &GameState) -> bool {
    state.stage == LifeStage::Job
}
