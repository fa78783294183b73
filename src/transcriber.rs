//! Rule-driven transcriber (component C): sweeps the input left-to-right,
//! picking the first matching rule at each cursor position. Grounded on
//! `phonetic_transcriber.py`'s `rules_transcribe`.

use crate::error::TranscriberError;
use crate::matcher::applies;
use crate::rule::RuleStore;

/// Scans `text` and returns the `_`-delimited engine-internal output.
///
/// Per `spec.md` §4.3: a character with no rules indexed under it is a
/// caller contract violation (`NoRuleForChar`); a character that has
/// rules but none of them apply is a silent, deliberate skip -- the scan
/// just advances one character and keeps going.
pub fn rules_transcribe(store: &RuleStore, text: &str) -> Result<String, TranscriberError> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut p = 0;

    while p < chars.len() {
        let ch = chars[p];
        let rules = store.rules_for(ch);
        if rules.is_empty() {
            return Err(TranscriberError::NoRuleForChar { ch, position: p });
        }

        let matched = rules.iter().find(|rule| applies(store, rule, &chars, p));
        let rule = match matched {
            Some(rule) => rule,
            None => {
                p += 1;
                continue;
            }
        };

        let suppress_sep = rule.repl.starts_with('#');
        if !out.is_empty() && !suppress_sep {
            out.push('_');
        }
        out.push_str(&rule.repl);
        p += rule.text.chars().count();
    }

    Ok(out)
}
