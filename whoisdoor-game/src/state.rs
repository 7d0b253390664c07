use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{STARTING_DAY, STARTING_PARENT_AGE};
use crate::i18n;

/// Raised when a wire name does not match any variant of a state enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Slot within a single day's narrative arc, plus the one-off and overlay
/// screens. Drives which actions are valid and what the renderer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    #[default]
    Menu,
    Morning,
    Waiting,
    Arrival,
    Interaction,
    Night,
    Graduation,
    /// Post-death observer mode.
    Legacy,
    Shop,
    SecretShop,
    WatchChild,
}

impl GamePhase {
    pub const ALL: [Self; 11] = [
        Self::Menu,
        Self::Morning,
        Self::Waiting,
        Self::Arrival,
        Self::Interaction,
        Self::Night,
        Self::Graduation,
        Self::Legacy,
        Self::Shop,
        Self::SecretShop,
        Self::WatchChild,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "MENU",
            Self::Morning => "MORNING",
            Self::Waiting => "WAITING",
            Self::Arrival => "ARRIVAL",
            Self::Interaction => "INTERACTION",
            Self::Night => "NIGHT",
            Self::Graduation => "GRADUATION",
            Self::Legacy => "LEGACY",
            Self::Shop => "SHOP",
            Self::SecretShop => "SECRET_SHOP",
            Self::WatchChild => "WATCH_CHILD",
        }
    }

    /// Phases that belong to the day-progression chain. Once the house is
    /// abandoned every one of these collapses into `Legacy`.
    #[must_use]
    pub const fn is_day_chain(self) -> bool {
        matches!(
            self,
            Self::Morning
                | Self::Waiting
                | Self::Arrival
                | Self::Interaction
                | Self::Night
                | Self::Graduation
        )
    }

    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::Shop | Self::SecretShop | Self::WatchChild)
    }

    /// Child is home: companion activities are on offer.
    #[must_use]
    pub const fn is_child_home(self) -> bool {
        matches!(self, Self::Arrival | Self::Interaction)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("phase", s))
    }
}

/// The child's (then grandchild's) long-horizon life stage.
///
/// Declaration order is the cycle order used by the stage-cycle cheat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifeStage {
    #[default]
    Elementary,
    MiddleSchool,
    HighSchool,
    University,
    Job,
    Marriage,
    Hospital,
    GrandkidsElementary,
    GrandkidsMiddle,
    GrandkidsHigh,
    GrandkidsUni,
}

impl LifeStage {
    pub const ALL: [Self; 11] = [
        Self::Elementary,
        Self::MiddleSchool,
        Self::HighSchool,
        Self::University,
        Self::Job,
        Self::Marriage,
        Self::Hospital,
        Self::GrandkidsElementary,
        Self::GrandkidsMiddle,
        Self::GrandkidsHigh,
        Self::GrandkidsUni,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elementary => "ELEMENTARY",
            Self::MiddleSchool => "MIDDLE_SCHOOL",
            Self::HighSchool => "HIGH_SCHOOL",
            Self::University => "UNIVERSITY",
            Self::Job => "JOB",
            Self::Marriage => "MARRIAGE",
            Self::Hospital => "HOSPITAL",
            Self::GrandkidsElementary => "GRANDKIDS_ELEMENTARY",
            Self::GrandkidsMiddle => "GRANDKIDS_MIDDLE",
            Self::GrandkidsHigh => "GRANDKIDS_HIGH",
            Self::GrandkidsUni => "GRANDKIDS_UNI",
        }
    }

    /// Position in declaration order.
    #[must_use]
    pub fn ordinal(self) -> usize {
        Self::ALL
            .iter()
            .position(|stage| *stage == self)
            .unwrap_or_default()
    }

    /// Next stage in declaration order, wrapping from the last to the first.
    #[must_use]
    pub fn cycled(self) -> Self {
        let next = (self.ordinal() + 1) % Self::ALL.len();
        Self::ALL.get(next).copied().unwrap_or_default()
    }

    /// Narrative headline associated with reaching this stage, if any.
    #[must_use]
    pub const fn milestone_message(self) -> Option<MessageKey> {
        match self {
            Self::Job => Some(MessageKey::Job),
            Self::Marriage => Some(MessageKey::Marriage),
            Self::Hospital => Some(MessageKey::Hospital),
            Self::GrandkidsElementary
            | Self::GrandkidsMiddle
            | Self::GrandkidsHigh
            | Self::GrandkidsUni => Some(MessageKey::Grandkids),
            Self::Elementary | Self::MiddleSchool | Self::HighSchool | Self::University => None,
        }
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeStage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("stage", s))
    }
}

/// Active string table. Chosen once at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "TR")]
    Turkish,
    #[serde(rename = "EN")]
    English,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Turkish => "TR",
            Self::English => "EN",
        }
    }

    /// Bundle identifier used by the string table.
    #[must_use]
    pub const fn bundle_code(self) -> &'static str {
        match self {
            Self::Turkish => "tr",
            Self::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TR" => Ok(Self::Turkish),
            "EN" => Ok(Self::English),
            _ => Err(ParseEnumError::new("language", s)),
        }
    }
}

/// Player-facing activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    Ironing,
    Working,
    PlayingPc,
    PlayingVr,
    Adventure,
}

impl Activity {
    pub const ALL: [Self; 5] = [
        Self::Ironing,
        Self::Working,
        Self::PlayingPc,
        Self::PlayingVr,
        Self::Adventure,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ironing => "IRONING",
            Self::Working => "WORKING",
            Self::PlayingPc => "PLAYING_PC",
            Self::PlayingVr => "PLAYING_VR",
            Self::Adventure => "ADVENTURE",
        }
    }

    /// Activities done together with the child once they are home.
    #[must_use]
    pub const fn is_companion_activity(self) -> bool {
        matches!(self, Self::PlayingPc | Self::PlayingVr | Self::Adventure)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|activity| activity.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("activity", s))
    }
}

/// Screens that sit outside the day-progression chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Overlay {
    Shop,
    SecretShop,
    WatchChild,
}

impl Overlay {
    #[must_use]
    pub const fn phase(self) -> GamePhase {
        match self {
            Self::Shop => GamePhase::Shop,
            Self::SecretShop => GamePhase::SecretShop,
            Self::WatchChild => GamePhase::WatchChild,
        }
    }

    /// Phase entered when this overlay is closed.
    #[must_use]
    pub const fn return_phase(self) -> GamePhase {
        match self {
            Self::SecretShop => GamePhase::Morning,
            Self::Shop | Self::WatchChild => GamePhase::Menu,
        }
    }

    #[must_use]
    pub const fn from_phase(phase: GamePhase) -> Option<Self> {
        match phase {
            GamePhase::Shop => Some(Self::Shop),
            GamePhase::SecretShop => Some(Self::SecretShop),
            GamePhase::WatchChild => Some(Self::WatchChild),
            _ => None,
        }
    }
}

/// Narrative lines the engine can put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKey {
    Morning,
    Waiting,
    ArrivalSolo,
    ArrivalDeniz,
    PcPlaying,
    VrPlaying,
    Adventure,
    Graduation,
    LegacyStart,
    Job,
    Marriage,
    Hospital,
    Grandkids,
    IroningDone,
}

impl MessageKey {
    pub const ALL: [Self; 14] = [
        Self::Morning,
        Self::Waiting,
        Self::ArrivalSolo,
        Self::ArrivalDeniz,
        Self::PcPlaying,
        Self::VrPlaying,
        Self::Adventure,
        Self::Graduation,
        Self::LegacyStart,
        Self::Job,
        Self::Marriage,
        Self::Hospital,
        Self::Grandkids,
        Self::IroningDone,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Waiting => "waiting",
            Self::ArrivalSolo => "arrivalSolo",
            Self::ArrivalDeniz => "arrivalDeniz",
            Self::PcPlaying => "pcPlaying",
            Self::VrPlaying => "vrPlaying",
            Self::Adventure => "adventure",
            Self::Graduation => "graduation",
            Self::LegacyStart => "legacyStart",
            Self::Job => "job",
            Self::Marriage => "marriage",
            Self::Hospital => "hospital",
            Self::Grandkids => "grandkids",
            Self::IroningDone => "ironingDone",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single live record of a play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub stage: LifeStage,
    pub day: u32,
    pub language: Language,
    /// Decided once per arrival; only meaningful while the child is home.
    pub is_deniz_present: bool,
    /// 0..=100, reset every morning.
    pub ironing_progress: u8,
    /// "Did something today" gate for advancing the day.
    pub interaction_done: bool,
    /// Current narrative line; rendered against `language` on demand.
    #[serde(default)]
    pub message_key: Option<MessageKey>,
    pub parent_age: u32,
    pub child_wealth: u64,
    pub is_house_abandoned: bool,
    pub has_dog: bool,
    pub is_dog_silenced: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::Menu,
            stage: LifeStage::Elementary,
            day: STARTING_DAY,
            language: Language::Turkish,
            is_deniz_present: false,
            ironing_progress: 0,
            interaction_done: false,
            message_key: None,
            parent_age: STARTING_PARENT_AGE,
            child_wealth: 0,
            is_house_abandoned: false,
            has_dog: false,
            is_dog_silenced: false,
        }
    }
}

impl GameState {
    /// Fresh state for "start new game".
    #[must_use]
    pub fn new_game(language: Language) -> Self {
        Self {
            phase: GamePhase::Morning,
            language,
            message_key: Some(MessageKey::Morning),
            ..Self::default()
        }
    }

    /// Localized narrative line for the current message, empty when none.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message_key
            .map_or("", |key| i18n::message(self.language, key))
    }

    /// Localized stage label for the status bar.
    #[must_use]
    pub fn stage_label(&self) -> &'static str {
        i18n::stage_label(self.language, self.stage)
    }

    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self.phase, GamePhase::Legacy)
    }

    #[must_use]
    pub const fn ironing_complete(&self, cap: u8) -> bool {
        self.ironing_progress >= cap
    }
}
