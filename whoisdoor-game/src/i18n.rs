//! Bundled two-language string table.
//!
//! Every label the engine or a renderer needs resolves through one lookup,
//! `(key, language) -> string`, backed by the JSON bundles under `i18n/`.
//! Missing entries fall back to English, then to the key itself.

use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{
    I18N_MESSAGE_PREFIX, LOG_TARGET, I18N_PHASE_PREFIX, I18N_STAGE_OBSERVER_PREFIX, I18N_STAGE_PREFIX,
};
use crate::state::{GamePhase, Language, LifeStage, MessageKey};

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("string bundle `{lang}` is not valid JSON: {source}")]
    Parse {
        lang: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

struct Bundles {
    en: Value,
    tr: Value,
}

impl Bundles {
    fn load() -> Self {
        Self {
            en: parse_or_empty("en", include_str!("../i18n/en.json")),
            tr: parse_or_empty("tr", include_str!("../i18n/tr.json")),
        }
    }

    const fn for_language(&self, lang: Language) -> &Value {
        match lang {
            Language::English => &self.en,
            Language::Turkish => &self.tr,
        }
    }
}

/// Parse one bundle.
///
/// # Errors
///
/// Returns [`I18nError::Parse`] when the source is not valid JSON.
pub fn parse_bundle(lang: &'static str, source: &str) -> Result<Value, I18nError> {
    serde_json::from_str(source).map_err(|source| I18nError::Parse { lang, source })
}

fn parse_or_empty(lang: &'static str, source: &str) -> Value {
    parse_bundle(lang, source).unwrap_or_else(|err| {
        log::error!(target: LOG_TARGET, "{err}");
        Value::Object(serde_json::Map::new())
    })
}

fn bundles() -> &'static Bundles {
    static BUNDLES: OnceLock<Bundles> = OnceLock::new();
    BUNDLES.get_or_init(Bundles::load)
}

fn get_nested_value<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(obj, |current, segment| current.get(segment))
        .and_then(Value::as_str)
}

/// Resolve a dotted key in `lang`, falling back to English.
#[must_use]
pub fn lookup(lang: Language, key: &str) -> Option<&'static str> {
    let b = bundles();
    get_nested_value(b.for_language(lang), key).or_else(|| get_nested_value(&b.en, key))
}

/// Resolve a dotted key, returning the key itself when nothing matches.
#[must_use]
pub fn t(lang: Language, key: &str) -> String {
    lookup(lang, key).map_or_else(|| key.to_string(), ToString::to_string)
}

/// Resolve a dotted key and substitute `{name}` placeholders.
#[must_use]
pub fn tr(lang: Language, key: &str, args: &[(&str, &str)]) -> String {
    let mut text = t(lang, key);
    for (name, value) in args {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

#[must_use]
pub fn message(lang: Language, key: MessageKey) -> &'static str {
    lookup(lang, &format!("{I18N_MESSAGE_PREFIX}{}", key.as_str())).unwrap_or(key.as_str())
}

/// Stage wording used on the status bar.
#[must_use]
pub fn stage_label(lang: Language, stage: LifeStage) -> &'static str {
    lookup(lang, &format!("{I18N_STAGE_PREFIX}{}", stage.as_str())).unwrap_or(stage.as_str())
}

/// Stage wording used on the observer screen; stages without a dedicated
/// observer line reuse the status-bar label.
#[must_use]
pub fn stage_observer_label(lang: Language, stage: LifeStage) -> &'static str {
    lookup(
        lang,
        &format!("{I18N_STAGE_OBSERVER_PREFIX}{}", stage.as_str()),
    )
    .unwrap_or_else(|| stage_label(lang, stage))
}

#[must_use]
pub fn phase_label(lang: Language, phase: GamePhase) -> &'static str {
    lookup(lang, &format!("{I18N_PHASE_PREFIX}{}", phase.as_str())).unwrap_or(phase.as_str())
}
