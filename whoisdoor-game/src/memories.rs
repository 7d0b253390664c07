//! Memory Shop catalog shown once the parent reaches old age.

use serde::Serialize;

use crate::i18n;
use crate::state::{Language, LifeStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Memory {
    pub id: u8,
    /// Key under `memories.` in the string bundles.
    pub slug: &'static str,
    /// Stage the memory looks back on.
    pub stage: LifeStage,
    pub icon: &'static str,
}

impl Memory {
    const fn new(id: u8, slug: &'static str, stage: LifeStage, icon: &'static str) -> Self {
        Self {
            id,
            slug,
            stage,
            icon,
        }
    }

    #[must_use]
    pub fn label(&self, lang: Language) -> String {
        i18n::t(lang, &format!("memories.{}.label", self.slug))
    }

    #[must_use]
    pub fn desc(&self, lang: Language) -> String {
        i18n::t(lang, &format!("memories.{}.desc", self.slug))
    }
}

pub const MEMORIES: [Memory; 6] = [
    Memory::new(1, "first_school_day", LifeStage::Elementary, "🎒"),
    Memory::new(2, "middle_school_friends", LifeStage::MiddleSchool, "🛹"),
    Memory::new(3, "high_school_years", LifeStage::HighSchool, "📚"),
    Memory::new(4, "university_graduation", LifeStage::University, "🎓"),
    Memory::new(5, "first_job", LifeStage::Job, "💼"),
    Memory::new(6, "own_family", LifeStage::Marriage, "🏠"),
];

#[must_use]
pub fn memory_by_id(id: u8) -> Option<&'static Memory> {
    MEMORIES.iter().find(|memory| memory.id == id)
}
