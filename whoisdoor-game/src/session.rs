use std::time::Instant;

use crate::config::EngineConfig;
use crate::constants::LOG_TARGET;
use crate::engine::{EngineCommand, LifeEngine};
use crate::event::{EngineEvent, EventKind};
use crate::rng::CompanionRng;
use crate::state::{GamePhase, GameState};

/// Arrival armed for a specific day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingArrival {
    pub day: u32,
    pub due: Instant,
}

/// Session wrapper binding the engine, its companion stream, and the
/// arrival timer to one mutable game state.
///
/// Time is passed in by the caller so the timer can be driven by a real
/// clock, a paused tokio clock, or a test.
#[derive(Debug, Clone)]
pub struct LifeSession {
    engine: LifeEngine,
    state: GameState,
    rng: CompanionRng,
    pending: Option<PendingArrival>,
}

impl LifeSession {
    /// Fresh session in the menu with an entropy-seeded companion stream.
    #[must_use]
    pub fn new(cfg: EngineConfig) -> Self {
        Self::from_parts(GameState::default(), cfg, CompanionRng::from_entropy())
    }

    /// Fresh session with a reproducible companion stream.
    #[must_use]
    pub fn with_seed(cfg: EngineConfig, seed: u64) -> Self {
        Self::from_parts(GameState::default(), cfg, CompanionRng::from_user_seed(seed))
    }

    /// Resume from an existing game state. No arrival is armed until the
    /// next dispatch observes the waiting condition.
    #[must_use]
    pub fn from_state(state: GameState, cfg: EngineConfig, seed: u64) -> Self {
        Self::from_parts(state, cfg, CompanionRng::from_user_seed(seed))
    }

    fn from_parts(state: GameState, cfg: EngineConfig, rng: CompanionRng) -> Self {
        Self {
            engine: LifeEngine::new(cfg),
            state,
            rng,
            pending: None,
        }
    }

    /// Apply a command at `now`, re-evaluating the arrival timer afterwards.
    pub fn dispatch(&mut self, command: EngineCommand, now: Instant) -> Vec<EngineEvent> {
        let mut events = self.engine.apply(&mut self.state, command);
        self.sync_arrival(now, &mut events);
        events
    }

    /// Fire the arrival if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(pending) = self.pending else {
            return events;
        };
        if now < pending.due {
            return events;
        }
        self.pending = None;
        if self.awaiting_arrival() && pending.day == self.state.day {
            events = self.engine.trigger_arrival(&mut self.state, &mut self.rng);
        } else {
            log::debug!(target: LOG_TARGET, "stale arrival for day {} dropped", pending.day);
        }
        self.sync_arrival(now, &mut events);
        events
    }

    /// Bring the child home immediately, bypassing the delay.
    pub fn trigger_arrival(&mut self) -> Vec<EngineEvent> {
        self.pending = None;
        self.engine.trigger_arrival(&mut self.state, &mut self.rng)
    }

    fn awaiting_arrival(&self) -> bool {
        self.state.phase == GamePhase::Waiting
            && self.state.ironing_complete(self.engine.config().ironing_max)
    }

    fn sync_arrival(&mut self, now: Instant, events: &mut Vec<EngineEvent>) {
        let day = self.state.day;
        match (self.awaiting_arrival(), self.pending) {
            (true, Some(pending)) if pending.day == day => {}
            (true, _) => {
                let delay = self.engine.config().arrival_delay();
                self.pending = Some(PendingArrival {
                    day,
                    due: now + delay,
                });
                log::trace!(target: LOG_TARGET, "arrival armed for day {day} in {delay:?}");
                let delay_ms = self.engine.config().arrival_delay_ms;
                events.push(self.engine.emit(day, EventKind::ArrivalScheduled { delay_ms }));
            }
            (false, Some(pending)) => {
                self.pending = None;
                log::trace!(target: LOG_TARGET, "arrival for day {} cancelled", pending.day);
                events.push(self.engine.emit(day, EventKind::ArrivalCancelled));
            }
            (false, None) => {}
        }
    }

    #[must_use]
    pub const fn pending_arrival(&self) -> Option<PendingArrival> {
        self.pending
    }

    /// Deadline of the armed arrival, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Companion draws made so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

impl Default for LifeSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Activity, Language, MessageKey};
    use std::time::Duration;

    const IRON: EngineCommand = EngineCommand::PerformActivity {
        activity: Activity::Ironing,
    };

    fn waiting_session(now: Instant) -> LifeSession {
        let mut session = LifeSession::with_seed(EngineConfig::default(), 9);
        session.dispatch(
            EngineCommand::StartGame {
                language: Language::English,
            },
            now,
        );
        session.dispatch(EngineCommand::ChildDeparts, now);
        session
    }

    #[test]
    fn finishing_ironing_arms_but_does_not_fire() {
        let t0 = Instant::now();
        let mut session = waiting_session(t0);
        session.dispatch(IRON, t0);
        session.dispatch(IRON, t0);
        assert!(session.pending_arrival().is_none());
        let events = session.dispatch(IRON, t0);

        assert_eq!(session.state().ironing_progress, 100);
        assert_eq!(session.state().message_key, Some(MessageKey::IroningDone));
        assert_eq!(session.state().phase, GamePhase::Waiting);
        assert_eq!(session.next_deadline(), Some(t0 + Duration::from_millis(1_500)));
        assert!(
            events
                .iter()
                .any(|e| e.kind == EventKind::ArrivalScheduled { delay_ms: 1_500 })
        );
    }

    #[test]
    fn poll_fires_only_once_due() {
        let t0 = Instant::now();
        let mut session = waiting_session(t0);
        for _ in 0..3 {
            session.dispatch(IRON, t0);
        }
        assert!(session.poll(t0 + Duration::from_millis(1_499)).is_empty());
        assert_eq!(session.state().phase, GamePhase::Waiting);

        let events = session.poll(t0 + Duration::from_millis(1_500));
        assert_eq!(session.state().phase, GamePhase::Arrival);
        assert!(
            events
                .iter()
                .any(|e| matches!(e.kind, EventKind::ChildArrived { .. }))
        );
        assert!(session.pending_arrival().is_none());
        assert_eq!(session.draws(), 1);
    }

    #[test]
    fn leaving_waiting_cancels_the_arrival() {
        let t0 = Instant::now();
        let mut session = waiting_session(t0);
        for _ in 0..3 {
            session.dispatch(IRON, t0);
        }
        let events = session.dispatch(EngineCommand::ReturnToMenu, t0);
        assert!(events.iter().any(|e| e.kind == EventKind::ArrivalCancelled));
        assert!(session.poll(t0 + Duration::from_secs(5)).is_empty());
        assert_eq!(session.state().phase, GamePhase::Menu);
    }

    #[test]
    fn extra_ironing_does_not_rearm() {
        let t0 = Instant::now();
        let mut session = waiting_session(t0);
        for _ in 0..3 {
            session.dispatch(IRON, t0);
        }
        let armed = session.pending_arrival();
        let events = session.dispatch(IRON, t0 + Duration::from_millis(500));
        assert_eq!(session.pending_arrival(), armed);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e.kind, EventKind::ArrivalScheduled { .. }))
        );
    }

    #[test]
    fn manual_trigger_consumes_the_timer() {
        let t0 = Instant::now();
        let mut session = waiting_session(t0);
        for _ in 0..3 {
            session.dispatch(IRON, t0);
        }
        session.trigger_arrival();
        assert_eq!(session.state().phase, GamePhase::Arrival);
        assert!(session.poll(t0 + Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn resumed_state_keeps_fields() {
        let state = GameState {
            day: 20,
            parent_age: 125,
            ..GameState::new_game(Language::Turkish)
        };
        let session = LifeSession::from_state(state.clone(), EngineConfig::default(), 3);
        assert_eq!(session.seed(), 3);
        assert_eq!(session.into_state(), state);
    }
}
