//! Day-threshold transition table.
//!
//! Each rule fires when the day being entered equals its `day`. Days with no
//! rule keep the current stage; after the last rule the stage is steady.

use serde::Serialize;

use crate::constants::{GRADUATION_DAY, LEGACY_DAY};
use crate::state::LifeStage;

/// Phase handling attached to a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOverride {
    /// Enter graduation; no stage change and no morning reset on this call.
    Graduation,
    /// Enter observer mode and abandon the house for good.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRule {
    pub day: u32,
    pub stage: Option<LifeStage>,
    pub phase: Option<PhaseOverride>,
}

impl DayRule {
    const fn stage(day: u32, stage: LifeStage) -> Self {
        Self {
            day,
            stage: Some(stage),
            phase: None,
        }
    }
}

pub const DAY_RULES: [DayRule; 11] = [
    DayRule::stage(4, LifeStage::MiddleSchool),
    DayRule::stage(8, LifeStage::HighSchool),
    DayRule::stage(12, LifeStage::University),
    DayRule {
        day: GRADUATION_DAY,
        stage: None,
        phase: Some(PhaseOverride::Graduation),
    },
    DayRule {
        day: LEGACY_DAY,
        stage: Some(LifeStage::Job),
        phase: Some(PhaseOverride::Legacy),
    },
    DayRule::stage(19, LifeStage::Marriage),
    DayRule::stage(21, LifeStage::Hospital),
    DayRule::stage(23, LifeStage::GrandkidsElementary),
    DayRule::stage(26, LifeStage::GrandkidsMiddle),
    DayRule::stage(29, LifeStage::GrandkidsHigh),
    DayRule::stage(32, LifeStage::GrandkidsUni),
];

/// Rule for the day being entered, if that day is a threshold.
#[must_use]
pub fn rule_for_day(day: u32) -> Option<&'static DayRule> {
    DAY_RULES.iter().find(|rule| rule.day == day)
}

/// Stage a fresh game would hold on `day` following the table alone.
#[must_use]
pub fn scheduled_stage(day: u32) -> LifeStage {
    DAY_RULES
        .iter()
        .take_while(|rule| rule.day <= day)
        .filter_map(|rule| rule.stage)
        .last()
        .unwrap_or_default()
}
