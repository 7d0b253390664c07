//! Keyboard combinations mapped to engine commands.
//!
//! Keys are tracked lower-cased, so `M` with Shift and `m` are the same held
//! key. A key-down event yields at most one command; the combinations share
//! no keys, so at most one can be completed by any single key.

use std::collections::BTreeSet;

use crate::engine::EngineCommand;
use crate::event::Cheat;

const ESCAPE: &str = "escape";

/// One key-down or key-up as reported by the host (`KeyboardEvent.key`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub shift: bool,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
        }
    }

    #[must_use]
    pub fn with_shift(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: true,
        }
    }

    fn normalized(&self) -> String {
        self.key.to_lowercase()
    }
}

/// Currently held keys, lower-cased.
pub type HeldKeys = BTreeSet<String>;

/// Tracks held keys across events and reports the resulting command.
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    held: HeldKeys,
}

impl KeyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down and return the command it completes, if any.
    pub fn on_key_down(&mut self, event: &KeyEvent) -> Option<EngineCommand> {
        self.held.insert(event.normalized());
        let command = detect_command(&self.held, event);
        if let Some(command) = command {
            log::trace!(
                target: crate::constants::LOG_TARGET,
                "key {:?} -> {}",
                event.key,
                command.label()
            );
        }
        command
    }

    pub fn on_key_up(&mut self, event: &KeyEvent) {
        self.held.remove(&event.normalized());
    }

    /// Drop every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    #[must_use]
    pub const fn held(&self) -> &HeldKeys {
        &self.held
    }
}

const AGE_UP: [&str; 3] = ["b", "h", "1"];
const STAGE_CYCLE: [&str; 2] = ["t", "ü"];
const AGE_DOWN: [&str; 2] = ["ğ", "9"];

/// `key` completes `combo` when it is part of it and the rest is held.
fn completes(held: &HeldKeys, key: &str, combo: &[&str]) -> bool {
    combo.contains(&key) && combo.iter().all(|k| held.contains(*k))
}

/// Map the held set plus the triggering event to a command.
///
/// A combination only fires on a key-down of one of its own keys, so a
/// combination that stays held never answers for unrelated keys. Keys that
/// belong to no combination map to nothing, except `s`.
#[must_use]
pub fn detect_command(held: &HeldKeys, event: &KeyEvent) -> Option<EngineCommand> {
    let key = event.normalized();
    let cheat = |cheat| Some(EngineCommand::Cheat { cheat });

    if key == ESCAPE {
        return Some(EngineCommand::ReturnToMenu);
    }
    if completes(held, &key, &AGE_UP) {
        return cheat(Cheat::ParentAgeUp);
    }
    if event.shift && key == "m" {
        return cheat(Cheat::SecretShop);
    }
    if completes(held, &key, &STAGE_CYCLE) {
        return cheat(Cheat::CycleStage);
    }
    if completes(held, &key, &AGE_DOWN) {
        return cheat(Cheat::ParentAgeDown);
    }
    if key == "s" {
        return cheat(Cheat::ToggleDogSilence);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(tracker: &mut KeyTracker, keys: &[&str]) -> Option<EngineCommand> {
        keys.iter()
            .map(|key| tracker.on_key_down(&KeyEvent::new(*key)))
            .last()
            .flatten()
    }

    #[test]
    fn escape_is_case_insensitive() {
        let mut tracker = KeyTracker::new();
        assert_eq!(
            tracker.on_key_down(&KeyEvent::new("Escape")),
            Some(EngineCommand::ReturnToMenu)
        );
    }

    #[test]
    fn age_up_needs_all_three_keys() {
        let mut tracker = KeyTracker::new();
        assert_eq!(press(&mut tracker, &["b", "h"]), None);
        assert_eq!(
            press(&mut tracker, &["1"]),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ParentAgeUp
            })
        );
    }

    #[test]
    fn shifted_m_opens_secret_shop() {
        let mut tracker = KeyTracker::new();
        assert_eq!(
            tracker.on_key_down(&KeyEvent::with_shift("M")),
            Some(EngineCommand::Cheat {
                cheat: Cheat::SecretShop
            })
        );
        tracker.clear();
        assert_eq!(tracker.on_key_down(&KeyEvent::new("m")), None);
    }

    #[test]
    fn turkish_combinations() {
        let mut tracker = KeyTracker::new();
        assert_eq!(
            press(&mut tracker, &["T", "Ü"]),
            Some(EngineCommand::Cheat {
                cheat: Cheat::CycleStage
            })
        );
        tracker.clear();
        assert_eq!(
            press(&mut tracker, &["Ğ", "9"]),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ParentAgeDown
            })
        );
    }

    #[test]
    fn released_keys_break_the_combination() {
        let mut tracker = KeyTracker::new();
        press(&mut tracker, &["b", "h"]);
        tracker.on_key_up(&KeyEvent::new("H"));
        assert_eq!(press(&mut tracker, &["1"]), None);
        assert_eq!(tracker.held().len(), 2);
    }

    #[test]
    fn s_toggles_dog_even_with_a_combo_held() {
        let mut tracker = KeyTracker::new();
        assert_eq!(
            press(&mut tracker, &["s"]),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ToggleDogSilence
            })
        );
        let mut held = HeldKeys::new();
        held.extend(["b", "h", "1", "s"].map(String::from));
        assert_eq!(
            detect_command(&held, &KeyEvent::new("s")),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ToggleDogSilence
            })
        );
    }

    #[test]
    fn held_combo_does_not_answer_for_other_keys() {
        let mut tracker = KeyTracker::new();
        assert_eq!(
            press(&mut tracker, &["b", "h", "1"]),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ParentAgeUp
            })
        );
        assert_eq!(tracker.on_key_down(&KeyEvent::new("t")), None);
        assert_eq!(
            tracker.on_key_down(&KeyEvent::new("ü")),
            Some(EngineCommand::Cheat {
                cheat: Cheat::CycleStage
            })
        );
        assert_eq!(
            tracker.on_key_down(&KeyEvent::with_shift("M")),
            Some(EngineCommand::Cheat {
                cheat: Cheat::SecretShop
            })
        );
        assert_eq!(tracker.on_key_down(&KeyEvent::new("Ğ")), None);
        assert_eq!(
            tracker.on_key_down(&KeyEvent::new("9")),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ParentAgeDown
            })
        );
        assert_eq!(
            tracker.on_key_down(&KeyEvent::new("1")),
            Some(EngineCommand::Cheat {
                cheat: Cheat::ParentAgeUp
            })
        );
    }
}
