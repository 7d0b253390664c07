use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use whoisdoor_game::{
    Activity, EngineCommand, EngineConfig, EngineEvent, EventKind, GamePhase, GameState, Language,
    LifeSession, LifeStage, WhoIsDoor, valid_actions,
};

/// How the simulated player spends each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayPolicy {
    /// Send the child off, do every offered activity, then advance.
    Attentive,
    /// Press "Next Day" straight away, whatever the phase.
    Skipper,
}

impl PlayPolicy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attentive => "attentive",
            Self::Skipper => "skipper",
        }
    }
}

pub type Expectation = fn(&SimulationSummary) -> Result<()>;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub policy: PlayPolicy,
    pub language: Language,
    /// Stop once this day is reached.
    pub target_day: u32,
    pub expectations: Vec<Expectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(policy: PlayPolicy) -> Self {
        Self {
            policy,
            language: Language::English,
            target_day: 3,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_target_day(mut self, day: u32) -> Self {
        self.target_day = day;
        self
    }

    #[must_use]
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

/// End-of-day snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DayRecord {
    pub day: u32,
    pub stage: LifeStage,
    /// Phase the day ended in, before advancing.
    pub phase: GamePhase,
    pub parent_age: u32,
    /// `Some(with_deniz)` when the child came home this day.
    pub arrival: Option<bool>,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub policy: PlayPolicy,
    pub days: Vec<DayRecord>,
    pub events: Vec<EngineEvent>,
    pub final_state: GameState,
}

impl SimulationSummary {
    #[must_use]
    pub fn arrivals(&self) -> usize {
        self.days.iter().filter(|d| d.arrival.is_some()).count()
    }

    #[must_use]
    pub fn companion_arrivals(&self) -> usize {
        self.days.iter().filter(|d| d.arrival == Some(true)).count()
    }

    #[must_use]
    pub fn day(&self, day: u32) -> Option<&DayRecord> {
        self.days.iter().find(|d| d.day == day)
    }
}

/// Drives sessions on a virtual clock that jumps straight to each deadline.
#[derive(Debug, Clone)]
pub struct Simulator {
    cfg: EngineConfig,
}

impl Simulator {
    #[must_use]
    pub const fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Run one playthrough.
    ///
    /// # Errors
    ///
    /// Fails if the configured engine rejects its config.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut session = WhoIsDoor::new(self.cfg.clone()).create_session(seed)?;
        let mut now = Instant::now();
        let mut events = session.dispatch(
            EngineCommand::StartGame {
                language: plan.language,
            },
            now,
        );
        let mut days = Vec::new();

        while session.state().day < plan.target_day {
            let record = match plan.policy {
                PlayPolicy::Attentive => play_attentive_day(&mut session, &mut now, &mut events),
                PlayPolicy::Skipper => snapshot_day(session.state(), None, Vec::new()),
            };
            log::debug!(
                "seed {seed}: day {} ended in {} ({} activities)",
                record.day,
                record.phase,
                record.activities.len()
            );
            days.push(record);
            events.extend(session.dispatch(EngineCommand::AdvanceDay, now));
            now += Duration::from_secs(1);
        }

        Ok(SimulationSummary {
            seed,
            policy: plan.policy,
            days,
            events,
            final_state: session.into_state(),
        })
    }
}

fn snapshot_day(state: &GameState, arrival: Option<bool>, activities: Vec<Activity>) -> DayRecord {
    DayRecord {
        day: state.day,
        stage: state.stage,
        phase: state.phase,
        parent_age: state.parent_age,
        arrival,
        activities,
    }
}

fn play_attentive_day(
    session: &mut LifeSession,
    now: &mut Instant,
    events: &mut Vec<EngineEvent>,
) -> DayRecord {
    if session.state().phase == GamePhase::Morning {
        events.extend(session.dispatch(EngineCommand::ChildDeparts, *now));
    }
    let mut arrival = None;
    let mut activities = Vec::new();
    while let Some(activity) = valid_actions(session.state(), session.config())
        .first()
        .copied()
    {
        activities.push(activity);
        events.extend(session.dispatch(EngineCommand::PerformActivity { activity }, *now));
        if let Some(due) = session.next_deadline() {
            *now = due;
            let fired = session.poll(*now);
            arrival = fired.iter().find_map(|e| match e.kind {
                EventKind::ChildArrived { with_deniz } => Some(with_deniz),
                _ => None,
            });
            events.extend(fired);
        }
    }
    snapshot_day(session.state(), arrival, activities)
}
