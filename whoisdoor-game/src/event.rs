//! Structured events emitted by engine transitions.
//!
//! Renderers observe phase changes through these rather than diffing
//! snapshots. Events carry an optional i18n key as a presentation hint; the
//! `kind` remains the mechanical descriptor.

use serde::{Deserialize, Serialize};

use crate::state::{Activity, GamePhase, LifeStage, Overlay};

/// Stable identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// Game day when the event occurred.
    pub day: u32,
    /// Per-session sequence number.
    pub seq: u64,
}

impl EventId {
    #[must_use]
    pub const fn new(day: u32, seq: u64) -> Self {
        Self { day, seq }
    }
}

/// Cheat operations reachable from the key-combination surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cheat {
    ParentAgeUp,
    ParentAgeDown,
    SecretShop,
    CycleStage,
    ToggleDogSilence,
}

/// Mechanical event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    GameStarted,
    PhaseChanged { from: GamePhase, to: GamePhase },
    StageChanged { from: LifeStage, to: LifeStage },
    DayAdvanced { day: u32, parent_age: u32 },
    ActivityPerformed { activity: Activity },
    IroningComplete,
    ArrivalScheduled { delay_ms: u64 },
    ArrivalCancelled,
    ChildArrived { with_deniz: bool },
    HouseAbandoned,
    OverlayOpened { overlay: Overlay },
    DogAdopted,
    CheatApplied { cheat: Cheat },
    /// A command that had no effect in the current phase.
    Ignored { command: String },
}

/// Hint for how the UI should surface an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurfaceHint {
    Narrative,
    Toast,
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub id: EventId,
    #[serde(flatten)]
    pub kind: EventKind,
    pub ui_surface_hint: UiSurfaceHint,
    /// Optional i18n key for presentation-layer rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_key: Option<String>,
}

impl EngineEvent {
    #[must_use]
    pub fn new(id: EventId, kind: EventKind) -> Self {
        let ui_surface_hint = match kind {
            EventKind::Ignored { .. }
            | EventKind::ArrivalScheduled { .. }
            | EventKind::ArrivalCancelled => UiSurfaceHint::Silent,
            EventKind::CheatApplied { .. } | EventKind::DogAdopted => UiSurfaceHint::Toast,
            _ => UiSurfaceHint::Narrative,
        };
        Self {
            id,
            kind,
            ui_surface_hint,
            ui_key: None,
        }
    }

    #[must_use]
    pub fn with_ui_key(mut self, key: impl Into<String>) -> Self {
        self.ui_key = Some(key.into());
        self
    }
}

/// Collects events for one transition, stamping sequential ids.
#[derive(Debug)]
pub(crate) struct EventSink<'a> {
    seq: &'a mut u64,
    events: Vec<EngineEvent>,
}

impl<'a> EventSink<'a> {
    pub(crate) const fn new(seq: &'a mut u64) -> Self {
        Self {
            seq,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, day: u32, kind: EventKind) -> &mut EngineEvent {
        let id = EventId::new(day, *self.seq);
        *self.seq = self.seq.saturating_add(1);
        self.events.push(EngineEvent::new(id, kind));
        let last = self.events.len() - 1;
        &mut self.events[last]
    }

    pub(crate) fn push_keyed(&mut self, day: u32, kind: EventKind, key: impl Into<String>) {
        let event = self.push(day, kind);
        event.ui_key = Some(key.into());
    }

    pub(crate) fn finish(self) -> Vec<EngineEvent> {
        self.events
    }
}
