pub mod catalog;

use anyhow::{Result, ensure};
use whoisdoor_game::{GamePhase, Language, LifeStage, i18n};

use crate::logic::SimulationSummary;
use crate::logic::realtime::RealtimePlan;
use crate::logic::{PlayPolicy, SimulationPlan};
use catalog::find_catalog_scenario;

const REALTIME_DELAY_MS: u64 = 50;

#[derive(Debug, Clone)]
pub enum ScenarioKind {
    /// Virtual-clock playthrough on a `LifeSession`.
    Simulation(SimulationPlan),
    /// Wall-clock run on the tokio driver.
    Realtime(RealtimePlan),
}

impl ScenarioKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Simulation(_) => "simulation",
            Self::Realtime(_) => "realtime",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub kind: ScenarioKind,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Simulation(plan),
        }
    }

    #[must_use]
    pub fn realtime(name: impl Into<String>, plan: RealtimePlan) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Realtime(plan),
        }
    }
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.arrivals() == summary.days.len(),
        "every played day should bring the child home ({} of {})",
        summary.arrivals(),
        summary.days.len()
    );
    ensure!(
        summary.days.iter().all(|d| d.phase == GamePhase::Arrival),
        "every day should end with the child at home"
    );
    ensure!(
        summary.final_state.phase == GamePhase::Morning,
        "next day should open in the morning"
    );
    ensure!(
        !summary.final_state.message().is_empty(),
        "morning message missing"
    );
    Ok(())
}

fn full_life_expectation(summary: &SimulationSummary) -> Result<()> {
    let graduation = summary
        .day(16)
        .map(|d| d.phase)
        .ok_or_else(|| anyhow::anyhow!("day 16 never played"))?;
    ensure!(
        graduation == GamePhase::Graduation,
        "day 16 was {graduation}"
    );
    ensure!(
        summary
            .days
            .iter()
            .filter(|d| d.day >= 17)
            .all(|d| d.phase == GamePhase::Legacy),
        "house left legacy after abandonment"
    );
    let state = &summary.final_state;
    ensure!(state.is_house_abandoned, "house should be abandoned");
    ensure!(
        state.stage == LifeStage::GrandkidsUni,
        "final stage {}",
        state.stage
    );
    let advances = state.day - 1;
    ensure!(
        state.parent_age == 30 + 5 * advances,
        "parent age {} after {advances} days",
        state.parent_age
    );
    Ok(())
}

fn legacy_loop_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.arrivals() == 0, "skipping never irons");
    let state = &summary.final_state;
    ensure!(state.phase == GamePhase::Legacy, "final phase {}", state.phase);
    ensure!(state.interaction_done, "legacy days are always open");
    ensure!(
        summary.days.iter().all(|d| d.day < 17 || d.phase == GamePhase::Legacy),
        "legacy not pinned"
    );
    Ok(())
}

fn turkish_expectation(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(state.language == Language::Turkish, "language drifted");
    let expected = i18n::message(Language::Turkish, whoisdoor_game::MessageKey::Morning);
    ensure!(
        state.message() == expected,
        "expected Turkish morning line, got `{}`",
        state.message()
    );
    Ok(())
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name.to_lowercase().as_str() {
        "smoke" => TestScenario::simulation(
            "Smoke Test",
            SimulationPlan::new(PlayPolicy::Attentive)
                .with_target_day(3)
                .with_expectation(smoke_expectation),
        ),
        "full-life" | "full" => TestScenario::simulation(
            "Full Life Playthrough",
            SimulationPlan::new(PlayPolicy::Attentive)
                .with_target_day(35)
                .with_expectation(full_life_expectation),
        ),
        "legacy-loop" | "legacy" => TestScenario::simulation(
            "Legacy Loop",
            SimulationPlan::new(PlayPolicy::Skipper)
                .with_target_day(40)
                .with_expectation(legacy_loop_expectation),
        ),
        "turkish" => TestScenario::simulation(
            "Turkish Playthrough",
            SimulationPlan::new(PlayPolicy::Attentive)
                .with_language(Language::Turkish)
                .with_target_day(5)
                .with_expectation(turkish_expectation),
        ),
        "realtime-arrival" => TestScenario::realtime(
            "Realtime Arrival",
            RealtimePlan::arrival(REALTIME_DELAY_MS),
        ),
        "realtime-cancel" => TestScenario::realtime(
            "Realtime Cancellation",
            RealtimePlan::cancelled(REALTIME_DELAY_MS),
        ),
        "companion-frequency" | "companion" => find_catalog_scenario("Companion Frequency")?,
        "cheat-codes" | "cheats" => find_catalog_scenario("Cheat Codes")?,
        "menu-overlays" | "overlays" => find_catalog_scenario("Menu and Overlays")?,
        "i18n-bundles" | "i18n" => find_catalog_scenario("Bundled Strings")?,
        _ => return None,
    };
    Some(scenario)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("full-life", "Full Life Playthrough"),
        ("legacy-loop", "Legacy Loop"),
        ("turkish", "Turkish Playthrough"),
        ("realtime-arrival", "Realtime Arrival"),
        ("realtime-cancel", "Realtime Cancellation"),
        ("companion-frequency", "Companion Frequency"),
        ("cheat-codes", "Cheat Codes"),
        ("menu-overlays", "Menu and Overlays"),
        ("i18n-bundles", "Bundled Strings"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, title) in list_scenarios() {
            let scenario = get_scenario(key).unwrap_or_else(|| panic!("{key} missing"));
            assert_eq!(scenario.name, title);
        }
        assert!(get_scenario("SMOKE").is_some());
        assert!(get_scenario("nope").is_none());
    }
}
