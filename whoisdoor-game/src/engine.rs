//! Transition functions over [`GameState`].
//!
//! Every inbound command is applied literally (trusted-caller contract):
//! misuse is logged, never rejected. The only hard rules are the numeric
//! clamps and the abandoned-house pin to `Legacy`.

use serde::{Deserialize, Serialize};

use crate::capabilities::{available_overlays, can_advance_day, is_valid_action};
use crate::config::EngineConfig;
use crate::constants::{I18N_MESSAGE_PREFIX, LOG_TARGET};
use crate::event::{Cheat, EngineEvent, EventKind, EventSink};
use crate::progression::{PhaseOverride, rule_for_day};
use crate::rng::CompanionRng;
use crate::state::{Activity, GamePhase, GameState, Language, MessageKey, Overlay};

/// Everything the presentation layer can ask of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    StartGame { language: Language },
    ChildDeparts,
    PerformActivity { activity: Activity },
    AdvanceDay,
    OpenOverlay { overlay: Overlay },
    CloseOverlay,
    BuyDog,
    /// Escape: back to the menu from anywhere.
    ReturnToMenu,
    Cheat { cheat: Cheat },
}

impl EngineCommand {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StartGame { .. } => "start_game",
            Self::ChildDeparts => "child_departs",
            Self::PerformActivity { .. } => "perform_activity",
            Self::AdvanceDay => "advance_day",
            Self::OpenOverlay { .. } => "open_overlay",
            Self::CloseOverlay => "close_overlay",
            Self::BuyDog => "buy_dog",
            Self::ReturnToMenu => "return_to_menu",
            Self::Cheat { .. } => "cheat",
        }
    }
}

fn message_ui_key(key: MessageKey) -> String {
    format!("{I18N_MESSAGE_PREFIX}{}", key.as_str())
}

/// Stateless rules plus the event sequence counter.
#[derive(Debug, Clone, Default)]
pub struct LifeEngine {
    cfg: EngineConfig,
    next_seq: u64,
}

impl LifeEngine {
    #[must_use]
    pub const fn new(cfg: EngineConfig) -> Self {
        Self { cfg, next_seq: 0 }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Emit a standalone event outside a command transition.
    pub fn emit(&mut self, day: u32, kind: EventKind) -> EngineEvent {
        let mut sink = EventSink::new(&mut self.next_seq);
        sink.push(day, kind);
        sink.finish().remove(0)
    }

    /// Apply one command to `state`.
    pub fn apply(&mut self, state: &mut GameState, command: EngineCommand) -> Vec<EngineEvent> {
        let cfg = &self.cfg;
        let mut sink = EventSink::new(&mut self.next_seq);
        match command {
            EngineCommand::StartGame { language } => start_game(state, cfg, language, &mut sink),
            EngineCommand::ChildDeparts => child_departs(state, &mut sink),
            EngineCommand::PerformActivity { activity } => {
                perform_activity(state, cfg, activity, &mut sink);
            }
            EngineCommand::AdvanceDay => advance_day(state, cfg, &mut sink),
            EngineCommand::OpenOverlay { overlay } => open_overlay(state, cfg, overlay, &mut sink),
            EngineCommand::CloseOverlay => close_overlay(state, &mut sink),
            EngineCommand::BuyDog => buy_dog(state, &mut sink),
            EngineCommand::ReturnToMenu => return_to_menu(state, &mut sink),
            EngineCommand::Cheat { cheat } => apply_cheat(state, cfg, cheat, &mut sink),
        }
        enforce_abandonment(state, &mut sink);
        sink.finish()
    }

    /// Bring the child home, drawing companionship from `rng`.
    pub fn trigger_arrival(
        &mut self,
        state: &mut GameState,
        rng: &mut CompanionRng,
    ) -> Vec<EngineEvent> {
        let mut sink = EventSink::new(&mut self.next_seq);
        let with_deniz = rng.roll_companion(self.cfg.companion_chance);
        state.is_deniz_present = with_deniz;
        let key = if with_deniz {
            MessageKey::ArrivalDeniz
        } else {
            MessageKey::ArrivalSolo
        };
        sink.push_keyed(
            state.day,
            EventKind::ChildArrived { with_deniz },
            message_ui_key(key),
        );
        set_phase(state, GamePhase::Arrival, Some(key), &mut sink);
        enforce_abandonment(state, &mut sink);
        sink.finish()
    }
}

fn set_phase(
    state: &mut GameState,
    to: GamePhase,
    message: Option<MessageKey>,
    sink: &mut EventSink<'_>,
) {
    let from = state.phase;
    state.phase = to;
    if let Some(key) = message {
        state.message_key = Some(key);
    }
    if from != to {
        log::debug!(target: LOG_TARGET, "day {}: phase {from} -> {to}", state.day);
        let event = sink.push(state.day, EventKind::PhaseChanged { from, to });
        if let Some(key) = message {
            event.ui_key = Some(message_ui_key(key));
        }
    }
}

fn ignore(state: &GameState, command: &str, sink: &mut EventSink<'_>) {
    log::debug!(
        target: LOG_TARGET,
        "{command} ignored in phase {}",
        state.phase
    );
    sink.push(
        state.day,
        EventKind::Ignored {
            command: command.to_string(),
        },
    );
}

fn start_game(state: &mut GameState, cfg: &EngineConfig, lang: Language, sink: &mut EventSink<'_>) {
    let from = state.phase;
    *state = GameState {
        parent_age: cfg.starting_parent_age,
        ..GameState::new_game(lang)
    };
    log::debug!(target: LOG_TARGET, "new game started in {lang}");
    sink.push(state.day, EventKind::GameStarted);
    if from != state.phase {
        sink.push_keyed(
            state.day,
            EventKind::PhaseChanged {
                from,
                to: state.phase,
            },
            message_ui_key(MessageKey::Morning),
        );
    }
}

fn child_departs(state: &mut GameState, sink: &mut EventSink<'_>) {
    if state.phase != GamePhase::Morning {
        ignore(state, "child_departs", sink);
        return;
    }
    set_phase(state, GamePhase::Waiting, Some(MessageKey::Waiting), sink);
}

fn perform_activity(
    state: &mut GameState,
    cfg: &EngineConfig,
    activity: Activity,
    sink: &mut EventSink<'_>,
) {
    if !is_valid_action(state, cfg, activity) {
        log::warn!(
            target: LOG_TARGET,
            "{activity} applied outside its valid context (phase {}, stage {})",
            state.phase,
            state.stage
        );
    }
    sink.push(state.day, EventKind::ActivityPerformed { activity });

    match activity {
        Activity::Ironing => {
            let was_complete = state.ironing_complete(cfg.ironing_max);
            state.ironing_progress = state
                .ironing_progress
                .saturating_add(cfg.ironing_step)
                .min(cfg.ironing_max);
            if state.ironing_complete(cfg.ironing_max) {
                state.message_key = Some(MessageKey::IroningDone);
                if !was_complete {
                    sink.push_keyed(
                        state.day,
                        EventKind::IroningComplete,
                        message_ui_key(MessageKey::IroningDone),
                    );
                }
            }
        }
        Activity::Working => {
            state.child_wealth = state.child_wealth.saturating_add(cfg.work_wage);
            state.interaction_done = true;
            state.message_key = Some(MessageKey::Job);
        }
        Activity::PlayingPc | Activity::PlayingVr | Activity::Adventure => {
            let key = match activity {
                Activity::PlayingPc => MessageKey::PcPlaying,
                Activity::PlayingVr => MessageKey::VrPlaying,
                _ => MessageKey::Adventure,
            };
            // The phase stays where it is; only the day gate opens.
            state.interaction_done = true;
            state.message_key = Some(key);
        }
    }
}

fn advance_day(state: &mut GameState, cfg: &EngineConfig, sink: &mut EventSink<'_>) {
    if !can_advance_day(state) {
        log::warn!(
            target: LOG_TARGET,
            "advance_day on day {} before any interaction",
            state.day
        );
    }

    let next_day = state.day.saturating_add(1);
    let next_age = state.parent_age.saturating_add(cfg.parent_age_step);
    let rule = rule_for_day(next_day);

    if rule.is_some_and(|r| r.phase == Some(PhaseOverride::Graduation)) {
        // Day moves to the graduation day itself. Holding it one short would
        // send every later call back into graduation, so legacy could never
        // start.
        state.day = next_day;
        state.parent_age = next_age;
        sink.push(
            state.day,
            EventKind::DayAdvanced {
                day: state.day,
                parent_age: state.parent_age,
            },
        );
        set_phase(state, GamePhase::Graduation, Some(MessageKey::Graduation), sink);
        return;
    }

    let previous_stage = state.stage;
    let next_stage = rule.and_then(|r| r.stage).unwrap_or(previous_stage);
    let enters_legacy =
        rule.is_some_and(|r| r.phase == Some(PhaseOverride::Legacy)) || state.is_house_abandoned;

    state.day = next_day;
    state.parent_age = next_age;
    state.stage = next_stage;
    sink.push(
        state.day,
        EventKind::DayAdvanced {
            day: state.day,
            parent_age: state.parent_age,
        },
    );
    if previous_stage != next_stage {
        log::debug!(
            target: LOG_TARGET,
            "day {}: stage {previous_stage} -> {next_stage}",
            state.day
        );
        let event = sink.push(
            state.day,
            EventKind::StageChanged {
                from: previous_stage,
                to: next_stage,
            },
        );
        if let Some(key) = next_stage.milestone_message() {
            event.ui_key = Some(message_ui_key(key));
        }
    }

    if enters_legacy {
        if !state.is_house_abandoned {
            state.is_house_abandoned = true;
            sink.push(state.day, EventKind::HouseAbandoned);
        }
        state.interaction_done = true;
        set_phase(state, GamePhase::Legacy, Some(MessageKey::LegacyStart), sink);
    } else {
        state.ironing_progress = 0;
        state.interaction_done = false;
        state.is_deniz_present = false;
        set_phase(state, GamePhase::Morning, Some(MessageKey::Morning), sink);
    }
}

fn open_overlay(
    state: &mut GameState,
    cfg: &EngineConfig,
    overlay: Overlay,
    sink: &mut EventSink<'_>,
) {
    if !available_overlays(state, cfg).contains(&overlay) {
        log::warn!(
            target: LOG_TARGET,
            "overlay {:?} opened from phase {}",
            overlay,
            state.phase
        );
    }
    sink.push(state.day, EventKind::OverlayOpened { overlay });
    set_phase(state, overlay.phase(), None, sink);
}

fn close_overlay(state: &mut GameState, sink: &mut EventSink<'_>) {
    match Overlay::from_phase(state.phase) {
        Some(overlay) => set_phase(state, overlay.return_phase(), None, sink),
        None => ignore(state, "close_overlay", sink),
    }
}

fn buy_dog(state: &mut GameState, sink: &mut EventSink<'_>) {
    if !state.has_dog {
        state.has_dog = true;
        sink.push(state.day, EventKind::DogAdopted);
    }
}

fn return_to_menu(state: &mut GameState, sink: &mut EventSink<'_>) {
    if state.phase == GamePhase::Menu {
        ignore(state, "return_to_menu", sink);
        return;
    }
    set_phase(state, GamePhase::Menu, None, sink);
}

fn apply_cheat(state: &mut GameState, cfg: &EngineConfig, cheat: Cheat, sink: &mut EventSink<'_>) {
    log::debug!(target: LOG_TARGET, "cheat {cheat:?}");
    sink.push(state.day, EventKind::CheatApplied { cheat });
    match cheat {
        Cheat::ParentAgeUp => {
            state.parent_age = state.parent_age.saturating_add(cfg.cheat_age_step);
        }
        Cheat::ParentAgeDown => {
            state.parent_age = state.parent_age.saturating_sub(cfg.cheat_age_step);
        }
        Cheat::SecretShop => set_phase(state, GamePhase::SecretShop, None, sink),
        Cheat::CycleStage => {
            let from = state.stage;
            state.stage = from.cycled();
            sink.push(
                state.day,
                EventKind::StageChanged {
                    from,
                    to: state.stage,
                },
            );
        }
        Cheat::ToggleDogSilence => state.is_dog_silenced = !state.is_dog_silenced,
    }
}

/// Pin day-chain phases to `Legacy` once the house is abandoned.
fn enforce_abandonment(state: &mut GameState, sink: &mut EventSink<'_>) {
    if state.is_house_abandoned && state.phase.is_day_chain() {
        set_phase(state, GamePhase::Legacy, Some(MessageKey::LegacyStart), sink);
        state.interaction_done = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LifeStage;

    fn engine() -> LifeEngine {
        LifeEngine::new(EngineConfig::default())
    }

    fn started(lang: Language) -> (LifeEngine, GameState) {
        let mut engine = engine();
        let mut state = GameState::default();
        engine.apply(&mut state, EngineCommand::StartGame { language: lang });
        (engine, state)
    }

    fn at_day(day: u32) -> GameState {
        GameState {
            day,
            stage: crate::progression::scheduled_stage(day),
            interaction_done: true,
            ..GameState::new_game(Language::English)
        }
    }

    #[test]
    fn start_game_resets_everything() {
        let mut engine = engine();
        let mut state = GameState {
            has_dog: true,
            parent_age: 120,
            day: 40,
            is_house_abandoned: true,
            phase: GamePhase::Legacy,
            ..GameState::default()
        };
        let events = engine.apply(
            &mut state,
            EngineCommand::StartGame {
                language: Language::English,
            },
        );
        assert_eq!(state, GameState::new_game(Language::English));
        assert_eq!(events[0].kind, EventKind::GameStarted);
        assert_eq!(
            state.message(),
            "Morning. Child is going to school. Don't wake them."
        );
    }

    #[test]
    fn departure_only_leaves_from_morning() {
        let (mut engine, mut state) = started(Language::Turkish);
        engine.apply(&mut state, EngineCommand::ChildDeparts);
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.message(), "Çocuk okulda. İşlerini yap ve bekle.");

        let events = engine.apply(&mut state, EngineCommand::ChildDeparts);
        assert_eq!(state.phase, GamePhase::Waiting);
        assert!(matches!(events[0].kind, EventKind::Ignored { .. }));

        engine.apply(&mut state, EngineCommand::ReturnToMenu);
        engine.apply(&mut state, EngineCommand::ChildDeparts);
        assert_eq!(state.phase, GamePhase::Menu);
    }

    #[test]
    fn ironing_reaches_cap_in_three_strokes() {
        let (mut engine, mut state) = started(Language::English);
        engine.apply(&mut state, EngineCommand::ChildDeparts);
        let iron = EngineCommand::PerformActivity {
            activity: Activity::Ironing,
        };
        let mut seen = Vec::new();
        for _ in 0..4 {
            engine.apply(&mut state, iron);
            seen.push(state.ironing_progress);
        }
        assert_eq!(seen, vec![34, 68, 100, 100]);
        assert!(!state.interaction_done);
        assert_eq!(state.message(), "Ironing finished, wait for them.");
    }

    #[test]
    fn ironing_complete_event_fires_once() {
        let (mut engine, mut state) = started(Language::English);
        state.phase = GamePhase::Waiting;
        state.ironing_progress = 66;
        let iron = EngineCommand::PerformActivity {
            activity: Activity::Ironing,
        };
        let first = engine.apply(&mut state, iron);
        assert!(first.iter().any(|e| e.kind == EventKind::IroningComplete));
        let second = engine.apply(&mut state, iron);
        assert!(!second.iter().any(|e| e.kind == EventKind::IroningComplete));
    }

    #[test]
    fn companion_activity_keeps_the_arrival_phase() {
        let (mut engine, mut state) = started(Language::English);
        state.phase = GamePhase::Arrival;
        state.is_deniz_present = true;
        let events = engine.apply(
            &mut state,
            EngineCommand::PerformActivity {
                activity: Activity::Adventure,
            },
        );
        assert_eq!(state.phase, GamePhase::Arrival);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e.kind, EventKind::PhaseChanged { .. }))
        );
        assert!(state.interaction_done);
        assert_eq!(state.message(), "They went on an adventure!");
    }

    #[test]
    fn pc_playing_is_accepted_even_with_deniz_present() {
        let (mut engine, mut state) = started(Language::English);
        state.phase = GamePhase::Arrival;
        state.is_deniz_present = true;
        engine.apply(
            &mut state,
            EngineCommand::PerformActivity {
                activity: Activity::PlayingPc,
            },
        );
        assert!(state.interaction_done);
        assert_eq!(state.message(), "Child is playing PC games.");
    }

    #[test]
    fn working_pays_and_opens_the_day() {
        let (mut engine, mut state) = started(Language::English);
        state.phase = GamePhase::Legacy;
        state.stage = LifeStage::Job;
        state.interaction_done = false;
        engine.apply(
            &mut state,
            EngineCommand::PerformActivity {
                activity: Activity::Working,
            },
        );
        assert_eq!(state.child_wealth, 1_000);
        assert!(state.interaction_done);
        assert_eq!(state.message(), "Child went to work, earned money.");
    }

    #[test]
    fn ordinary_day_resets_to_morning() {
        let mut engine = engine();
        let mut state = at_day(2);
        state.phase = GamePhase::Interaction;
        state.ironing_progress = 100;
        state.is_deniz_present = true;
        engine.apply(&mut state, EngineCommand::AdvanceDay);
        assert_eq!(state.day, 3);
        assert_eq!(state.parent_age, 35);
        assert_eq!(state.phase, GamePhase::Morning);
        assert_eq!(state.ironing_progress, 0);
        assert!(!state.interaction_done);
        assert!(!state.is_deniz_present);
    }

    #[test]
    fn thresholds_move_the_stage() {
        let mut engine = engine();
        let mut state = at_day(3);
        let events = engine.apply(&mut state, EngineCommand::AdvanceDay);
        assert_eq!(state.stage, LifeStage::MiddleSchool);
        assert!(events.iter().any(|e| e.kind
            == EventKind::StageChanged {
                from: LifeStage::Elementary,
                to: LifeStage::MiddleSchool
            }));
    }

    #[test]
    fn day_fifteen_graduates_regardless_of_interaction() {
        for done in [false, true] {
            let mut engine = engine();
            let mut state = at_day(15);
            state.interaction_done = done;
            let age = state.parent_age;
            engine.apply(&mut state, EngineCommand::AdvanceDay);
            assert_eq!(state.phase, GamePhase::Graduation);
            assert_eq!(state.stage, LifeStage::University);
            assert_eq!(state.day, 16);
            assert_eq!(state.parent_age, age + 5);
            assert_eq!(state.message(), "Child graduated. Your time is up...");
        }
    }

    #[test]
    fn day_sixteen_enters_legacy_for_good() {
        let mut engine = engine();
        let mut state = at_day(16);
        state.phase = GamePhase::Graduation;
        state.interaction_done = false;
        let events = engine.apply(&mut state, EngineCommand::AdvanceDay);
        assert_eq!(state.phase, GamePhase::Legacy);
        assert!(state.is_house_abandoned);
        assert_eq!(state.stage, LifeStage::Job);
        assert!(state.interaction_done);
        assert!(events.iter().any(|e| e.kind == EventKind::HouseAbandoned));

        for _ in 0..20 {
            engine.apply(&mut state, EngineCommand::AdvanceDay);
            assert_eq!(state.phase, GamePhase::Legacy);
            assert!(state.interaction_done);
        }
        assert_eq!(state.day, 37);
        assert_eq!(state.stage, LifeStage::GrandkidsUni);
    }

    #[test]
    fn abandoned_house_pins_day_chain_phases() {
        let mut engine = engine();
        let mut state = at_day(20);
        state.is_house_abandoned = true;
        state.phase = GamePhase::SecretShop;
        engine.apply(&mut state, EngineCommand::CloseOverlay);
        assert_eq!(state.phase, GamePhase::Legacy);

        engine.apply(&mut state, EngineCommand::ReturnToMenu);
        assert_eq!(state.phase, GamePhase::Menu);
    }

    #[test]
    fn overlays_open_and_close_to_their_return_phase() {
        let mut engine = engine();
        let mut state = GameState::default();
        engine.apply(
            &mut state,
            EngineCommand::OpenOverlay {
                overlay: Overlay::WatchChild,
            },
        );
        assert_eq!(state.phase, GamePhase::WatchChild);
        engine.apply(&mut state, EngineCommand::CloseOverlay);
        assert_eq!(state.phase, GamePhase::Menu);

        engine.apply(
            &mut state,
            EngineCommand::Cheat {
                cheat: Cheat::SecretShop,
            },
        );
        engine.apply(&mut state, EngineCommand::BuyDog);
        engine.apply(&mut state, EngineCommand::CloseOverlay);
        assert_eq!(state.phase, GamePhase::Morning);
        assert!(state.has_dog);

        let events = engine.apply(&mut state, EngineCommand::CloseOverlay);
        assert!(matches!(events[0].kind, EventKind::Ignored { .. }));
    }

    #[test]
    fn age_cheats_step_by_ten_and_floor_at_zero() {
        let mut engine = engine();
        let mut state = GameState {
            parent_age: 5,
            ..GameState::default()
        };
        let down = EngineCommand::Cheat {
            cheat: Cheat::ParentAgeDown,
        };
        engine.apply(&mut state, down);
        assert_eq!(state.parent_age, 0);
        engine.apply(
            &mut state,
            EngineCommand::Cheat {
                cheat: Cheat::ParentAgeUp,
            },
        );
        assert_eq!(state.parent_age, 10);
    }

    #[test]
    fn stage_and_dog_cheats() {
        let mut engine = engine();
        let mut state = GameState {
            stage: LifeStage::GrandkidsUni,
            ..GameState::default()
        };
        engine.apply(
            &mut state,
            EngineCommand::Cheat {
                cheat: Cheat::CycleStage,
            },
        );
        assert_eq!(state.stage, LifeStage::Elementary);
        let toggle = EngineCommand::Cheat {
            cheat: Cheat::ToggleDogSilence,
        };
        engine.apply(&mut state, toggle);
        assert!(state.is_dog_silenced);
        engine.apply(&mut state, toggle);
        assert!(!state.is_dog_silenced);
    }

    #[test]
    fn arrival_sets_companion_and_message() {
        let mut engine = LifeEngine::new(EngineConfig {
            companion_chance: 1.0,
            ..EngineConfig::default()
        });
        let mut state = GameState {
            phase: GamePhase::Waiting,
            ..GameState::new_game(Language::English)
        };
        let mut rng = CompanionRng::from_user_seed(1);
        engine.trigger_arrival(&mut state, &mut rng);
        assert_eq!(state.phase, GamePhase::Arrival);
        assert!(state.is_deniz_present);
        assert_eq!(state.message(), "Child and Deniz arrived!");
    }

    #[test]
    fn commands_serialize_with_a_tag() {
        let json = serde_json::to_string(&EngineCommand::PerformActivity {
            activity: Activity::PlayingVr,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"command":"perform_activity","activity":"PLAYING_VR"}"#
        );
        assert_eq!(EngineCommand::AdvanceDay.label(), "advance_day");
    }
}
