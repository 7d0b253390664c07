use std::time::Instant;

use anyhow::{Result, ensure};
use whoisdoor_game::{
    CompanionRng, EngineCommand, EngineConfig, GamePhase, GameState, KeyEvent, KeyTracker,
    Language, LifeEngine, LifeSession, LifeStage, MEMORIES, MessageKey, Overlay,
    available_overlays, i18n,
};

use super::TestScenario;
use crate::logic::SimulationSummary;
use crate::logic::{PlayPolicy, SimulationPlan};

const FREQUENCY_TRIALS: u32 = 5_000;
const FREQUENCY_TOLERANCE: f64 = 0.04;

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::simulation(
            "Companion Frequency",
            base_plan().with_expectation(companion_frequency_expectation),
        ),
        TestScenario::simulation(
            "Cheat Codes",
            base_plan().with_expectation(cheat_codes_expectation),
        ),
        TestScenario::simulation(
            "Menu and Overlays",
            base_plan().with_expectation(menu_overlays_expectation),
        ),
        TestScenario::simulation(
            "Bundled Strings",
            base_plan().with_expectation(bundled_strings_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(name: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.name == name)
}

fn base_plan() -> SimulationPlan {
    SimulationPlan::new(PlayPolicy::Skipper).with_target_day(1)
}

fn companion_frequency_expectation(summary: &SimulationSummary) -> Result<()> {
    let cfg = EngineConfig::default();
    let mut engine = LifeEngine::new(cfg.clone());
    let mut rng = CompanionRng::from_user_seed(summary.seed);
    let mut with_deniz = 0u32;
    for _ in 0..FREQUENCY_TRIALS {
        let mut state = GameState {
            phase: GamePhase::Waiting,
            ironing_progress: cfg.ironing_max,
            ..GameState::new_game(Language::English)
        };
        engine.trigger_arrival(&mut state, &mut rng);
        with_deniz += u32::from(state.is_deniz_present);
    }
    let ratio = f64::from(with_deniz) / f64::from(FREQUENCY_TRIALS);
    ensure!(
        (ratio - cfg.companion_chance).abs() < FREQUENCY_TOLERANCE,
        "companion ratio {ratio:.3} strays from {:.2}",
        cfg.companion_chance
    );
    Ok(())
}

fn press(keys: &mut KeyTracker, session: &mut LifeSession, key: KeyEvent, now: Instant) {
    if let Some(command) = keys.on_key_down(&key) {
        session.dispatch(command, now);
    }
}

fn release_all(keys: &mut KeyTracker) {
    keys.clear();
}

fn cheat_codes_expectation(summary: &SimulationSummary) -> Result<()> {
    let now = Instant::now();
    let mut session = LifeSession::with_seed(EngineConfig::default(), summary.seed);
    session.dispatch(
        EngineCommand::StartGame {
            language: Language::English,
        },
        now,
    );
    let mut keys = KeyTracker::new();

    for key in ["b", "h", "1"] {
        press(&mut keys, &mut session, KeyEvent::new(key), now);
    }
    release_all(&mut keys);
    ensure!(session.state().parent_age == 40, "B+H+1 should add ten years");

    for _ in 0..6 {
        press(&mut keys, &mut session, KeyEvent::new("Ğ"), now);
        press(&mut keys, &mut session, KeyEvent::new("9"), now);
        release_all(&mut keys);
    }
    ensure!(session.state().parent_age == 0, "age must floor at zero");

    for _ in 0..LifeStage::ALL.len() {
        press(&mut keys, &mut session, KeyEvent::new("t"), now);
        press(&mut keys, &mut session, KeyEvent::new("ü"), now);
        release_all(&mut keys);
    }
    ensure!(
        session.state().stage == LifeStage::Elementary,
        "a full stage cycle should wrap around"
    );

    press(&mut keys, &mut session, KeyEvent::with_shift("M"), now);
    release_all(&mut keys);
    ensure!(
        session.state().phase == GamePhase::SecretShop,
        "Shift+M should open the secret shop"
    );
    session.dispatch(EngineCommand::BuyDog, now);
    press(&mut keys, &mut session, KeyEvent::new("s"), now);
    ensure!(
        session.state().has_dog && session.state().is_dog_silenced,
        "dog should be bought and silenced"
    );
    Ok(())
}

fn menu_overlays_expectation(summary: &SimulationSummary) -> Result<()> {
    let now = Instant::now();
    let cfg = EngineConfig::default();
    let mut session = LifeSession::with_seed(cfg.clone(), summary.seed);
    ensure!(
        available_overlays(session.state(), &cfg).as_slice() == [Overlay::WatchChild],
        "young parents only get the watch screen"
    );

    session.dispatch(
        EngineCommand::StartGame {
            language: Language::English,
        },
        now,
    );
    for _ in 0..14 {
        session.dispatch(EngineCommand::AdvanceDay, now);
    }
    session.dispatch(EngineCommand::ReturnToMenu, now);
    ensure!(
        available_overlays(session.state(), &cfg).contains(&Overlay::Shop),
        "memory shop should unlock at {}",
        cfg.memory_shop_unlock_age
    );

    for overlay in [Overlay::Shop, Overlay::WatchChild] {
        session.dispatch(EngineCommand::OpenOverlay { overlay }, now);
        ensure!(session.state().phase == overlay.phase(), "{overlay:?} did not open");
        session.dispatch(EngineCommand::CloseOverlay, now);
        ensure!(
            session.state().phase == GamePhase::Menu,
            "{overlay:?} should close to the menu"
        );
    }
    ensure!(session.state().day == 15, "menu trips must keep the day");
    Ok(())
}

fn bundled_strings_expectation(_summary: &SimulationSummary) -> Result<()> {
    for lang in [Language::Turkish, Language::English] {
        for key in MessageKey::ALL {
            ensure!(
                i18n::message(lang, key) != key.as_str(),
                "{lang} is missing message {key}"
            );
        }
        for stage in LifeStage::ALL {
            ensure!(
                i18n::stage_label(lang, stage) != stage.as_str(),
                "{lang} is missing stage {stage}"
            );
        }
        for memory in &MEMORIES {
            ensure!(
                !memory.label(lang).starts_with("memories."),
                "{lang} is missing memory {}",
                memory.slug
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::scenario::ScenarioKind;
    use crate::logic::Simulator;

    #[test]
    fn catalog_expectations_hold() {
        let sim = Simulator::new(EngineConfig::default());
        for scenario in catalog_scenarios() {
            let ScenarioKind::Simulation(plan) = &scenario.kind else {
                panic!("{} is not a simulation", scenario.name);
            };
            let summary = sim.run_plan(plan, 42).unwrap();
            for expectation in &plan.expectations {
                expectation(&summary).unwrap_or_else(|e| panic!("{}: {e}", scenario.name));
            }
        }
    }
}
