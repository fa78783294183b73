//! Character encoder layer (component D): translates engine-alphabet
//! phoneme tokens into a chosen surface alphabet (or back) through a
//! prefix/suffix-stripping lookup. Grounded on `phonetic_converter.py`'s
//! `*CharacterConverter` classes.
//!
//! The concrete phoneme tables below are a representative, hand-authored
//! Latvian phoneme inventory -- the production `phonetic_converter_dataset.json`
//! this was originally driven by is data, not code, and wasn't present in
//! the corpus this crate was built from. See `DESIGN.md`.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::tokenizer::{tokenize, Charsets};

/// Shared contract for every encoder variant: translate a single
/// engine-alphabet token to the IPA pivot alphabet and back, and
/// optionally split a raw IPA-like stream into tokens.
pub trait PhonemeEncoder {
    fn to_ipa(&self, token: &str) -> Option<String>;
    fn from_ipa(&self, token: &str) -> Option<String>;

    /// Splits a raw phoneme stream into tokens. Only meaningful for
    /// encoders that work directly over an IPA-like stream; other
    /// variants return `None` (`spec.md` §4.5).
    fn tokenize(&self, _stream: &str) -> Option<Vec<String>> {
        None
    }
}

/// The three/four interchangeable surface notations the orchestrator can
/// target. `IPA` is the identity encoder; the others round-trip through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    Ipa,
    Alphabetic,
    AlphaNumeric,
    AlphaNumericSimplified,
}

/// One direction's worth of prefix/suffix/base lookup tables.
struct ModifierTables {
    before: HashMap<String, String>,
    after: HashMap<String, String>,
    result: HashMap<String, String>,
}

/// The canonical, hand-authored phoneme inventory: engine-alphabet token
/// (the rule engine's own `repl` vocabulary) paired with its IPA
/// rendering. Compound entries (long vowels, affricates) are looked up as
/// whole units, exactly as the source data's `result` tables do.
const BASE_PHONEMES: &[(&str, &str)] = &[
    ("p", "p"),
    ("b", "b"),
    ("t", "t"),
    ("d", "d"),
    ("k", "k"),
    ("g", "\u{0261}"),
    ("f", "f"),
    ("v", "v"),
    ("s", "s"),
    ("z", "z"),
    ("S", "\u{0283}"),  // š
    ("Z", "\u{0292}"),  // ž
    ("ts", "\u{02A6}"), // c
    ("dz", "\u{02A3}"), // dz
    ("tS", "\u{02A7}"), // č
    ("dZ", "\u{02A4}"), // dž
    ("m", "m"),
    ("n", "n"),
    ("N", "\u{0272}"), // ņ
    ("l", "l"),
    ("L", "\u{028E}"), // ļ
    ("r", "r"),
    ("j", "j"),
    ("h", "h"),
    ("G", "\u{025F}"), // ģ
    ("K", "c"),        // ķ
    ("a", "\u{0251}"),
    ("e", "e"),
    ("i", "i"),
    ("ix", "\u{0268}"), // reduced/centralized i
    ("o", "o"),
    ("u", "u"),
    ("aa", "\u{0251}\u{02D0}"),
    ("ee", "e\u{02D0}"),
    ("ii", "i\u{02D0}"),
    ("oo", "o\u{02D0}"),
    ("uu", "u\u{02D0}"),
    ("ai", "\u{0251}i"),
    ("au", "\u{0251}u"),
    ("ei", "ei"),
    ("ui", "ui"),
];

/// Prefix modifiers: stress marks.
const PREFIX_MODIFIERS: &[(&str, &str)] = &[
    ("\"", "\u{02C8}"), // primary stress
    ("%", "\u{02CC}"),  // secondary stress
];

/// Suffix modifiers: glottalization / ejective marker. The length mark
/// (`=`) is handled separately since the alphabetic `from_ipa` direction
/// forces it regardless of this table (`spec.md` §4.4 point 3).
const SUFFIX_MODIFIERS: &[(&str, &str)] = &[("q", "\u{02C0}"), ("=", "\u{02D0}")];

fn hex_code(s: &str) -> String {
    s.chars().map(|c| format!("{:04X}", c as u32)).collect()
}

fn build_alphabetic_tables() -> (ModifierTables, ModifierTables) {
    let mut to_ipa = ModifierTables {
        before: HashMap::new(),
        after: HashMap::new(),
        result: HashMap::new(),
    };
    let mut from_ipa = ModifierTables {
        before: HashMap::new(),
        after: HashMap::new(),
        result: HashMap::new(),
    };

    for (token, ipa) in BASE_PHONEMES {
        to_ipa.result.insert(token.to_string(), ipa.to_string());
        from_ipa.result.insert(ipa.to_string(), token.to_string());
    }
    for (token, ipa) in PREFIX_MODIFIERS {
        to_ipa.before.insert(token.to_string(), ipa.to_string());
        from_ipa.before.insert(ipa.to_string(), token.to_string());
    }
    for (token, ipa) in SUFFIX_MODIFIERS {
        to_ipa.after.insert(token.to_string(), ipa.to_string());
        from_ipa.after.insert(ipa.to_string(), token.to_string());
    }

    (to_ipa, from_ipa)
}

/// AlphaNumeric's native alphabet is the concatenation of each IPA
/// codepoint's 4-hex-digit code -- which is exactly why its modifier
/// window is 4 (`spec.md` §6): every unit is 4 characters wide by
/// construction, so slicing the first/last 4 characters off a multi-unit
/// token always lands on a codepoint boundary.
fn build_alphanumeric_tables() -> (ModifierTables, ModifierTables) {
    let mut to_ipa = ModifierTables {
        before: HashMap::new(),
        after: HashMap::new(),
        result: HashMap::new(),
    };
    let mut from_ipa = ModifierTables {
        before: HashMap::new(),
        after: HashMap::new(),
        result: HashMap::new(),
    };

    for (_, ipa) in BASE_PHONEMES {
        let code = hex_code(ipa);
        to_ipa.result.insert(code.clone(), ipa.to_string());
        from_ipa.result.insert(ipa.to_string(), code);
    }
    for (_, ipa) in PREFIX_MODIFIERS {
        let code = hex_code(ipa);
        to_ipa.before.insert(code.clone(), ipa.to_string());
        from_ipa.before.insert(ipa.to_string(), code);
    }
    for (_, ipa) in SUFFIX_MODIFIERS {
        let code = hex_code(ipa);
        to_ipa.after.insert(code.clone(), ipa.to_string());
        from_ipa.after.insert(ipa.to_string(), code);
    }

    (to_ipa, from_ipa)
}

lazy_static! {
    static ref ALPHABETIC_TABLES: (ModifierTables, ModifierTables) = build_alphabetic_tables();
    static ref ALPHANUMERIC_TABLES: (ModifierTables, ModifierTables) = build_alphanumeric_tables();
    static ref IPA_CHARSETS: Charsets = Charsets::ipa();
}

/// Implements the strip/lookup/reattach algorithm from `spec.md` §4.4.
///
/// `zero_strip`: if true, stripping is attempted whenever the token is
/// non-empty (the alphabetic variant); otherwise only when the token is
/// strictly longer than `window` (the alphanumeric variants).
/// `graceful_unknown`: if true, an unmatched base yields `Some("")` with
/// modifiers still reattached (alphabetic); otherwise `None` (alphanumeric).
/// `force_length_mark_suffix`: the alphabetic `from_ipa`-only special case.
#[allow(clippy::too_many_arguments)]
fn convert_token(
    token: &str,
    tables: &ModifierTables,
    window: usize,
    zero_strip: bool,
    graceful_unknown: bool,
    force_length_mark_suffix: bool,
) -> Option<String> {
    let chars: Vec<char> = token.chars().collect();
    let n = chars.len();
    let attempt_strip = if zero_strip { n > 0 } else { n > window };

    let (before_repl, after_repl, base) = if attempt_strip && n >= window {
        let prefix: String = chars[..window].iter().collect();
        let suffix: String = chars[n - window..].iter().collect();
        let mut before_repl = tables.before.get(&prefix).cloned();
        let mut after_repl = tables.after.get(&suffix).cloned();
        if force_length_mark_suffix && n > 2 && chars[n - 1] == '\u{02D0}' {
            after_repl = Some("=".to_string());
        }
        let start = if before_repl.is_some() { window } else { 0 };
        let end = if after_repl.is_some() { n - window } else { n };
        let base: String = if start < end {
            chars[start..end].iter().collect()
        } else {
            String::new()
        };
        (before_repl, after_repl, base)
    } else {
        (None, None, token.to_string())
    };

    match tables.result.get(&base) {
        Some(result) => Some(format!(
            "{}{}{}",
            before_repl.as_deref().unwrap_or(""),
            result,
            after_repl.as_deref().unwrap_or("")
        )),
        None if graceful_unknown => Some(format!(
            "{}{}",
            before_repl.as_deref().unwrap_or(""),
            after_repl.as_deref().unwrap_or("")
        )),
        None => None,
    }
}

impl PhonemeEncoder for EncoderKind {
    fn to_ipa(&self, token: &str) -> Option<String> {
        match self {
            EncoderKind::Ipa => Some(token.to_string()),
            EncoderKind::Alphabetic => {
                convert_token(token, &ALPHABETIC_TABLES.0, 1, true, true, false)
            }
            EncoderKind::AlphaNumeric => {
                convert_token(token, &ALPHANUMERIC_TABLES.0, 4, false, false, false)
            }
            // Only `from_ipa` is meaningful for the simplified variant
            // (the source's own `toIPAchar` is an unimplemented stub).
            EncoderKind::AlphaNumericSimplified => None,
        }
    }

    fn from_ipa(&self, token: &str) -> Option<String> {
        match self {
            EncoderKind::Ipa => Some(token.to_string()),
            EncoderKind::Alphabetic => {
                convert_token(token, &ALPHABETIC_TABLES.1, 1, true, true, true)
            }
            EncoderKind::AlphaNumeric => {
                convert_token(token, &ALPHANUMERIC_TABLES.1, 4, false, false, false)
            }
            EncoderKind::AlphaNumericSimplified => {
                convert_token(token, &ALPHABETIC_TABLES.1, 1, true, true, true)
            }
        }
    }

    fn tokenize(&self, stream: &str) -> Option<Vec<String>> {
        match self {
            EncoderKind::Ipa => Some(tokenize(stream, &IPA_CHARSETS)),
            _ => None,
        }
    }
}
