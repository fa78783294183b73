//! A contextual rule-matching engine for Latvian grapheme-to-phoneme
//! transcription.
//!
//! Rules, keyed by the first character they anchor on, are tried in
//! authoring order; each rule may constrain the characters to its left
//! and right using literals, named metarule classes, or one of four
//! positional anchors (`?` `#` `^` `*`). A small encoder layer then maps
//! the engine's own `_`-delimited token alphabet onto a chosen surface
//! notation (IPA, an ASCII-compatible alphabetic form, or one of two
//! alphanumeric forms).
//!
//! ```
//! use valoda_fonetika::{Exceptions, Metarules, Rule, RuleStore, Transcriber};
//!
//! let rules = vec![
//!     Rule { text: "a".into(), repl: "a".into(), left: vec![], right: vec![] },
//!     Rule { text: "b".into(), repl: "b".into(), left: vec![], right: vec![] },
//! ];
//! let store = RuleStore::build(rules, Metarules::new(), Exceptions::new());
//! let transcriber = Transcriber::new(&store, None);
//! assert_eq!(transcriber.transcribe("ab", "_").unwrap(), "a_b");
//! ```

extern crate lazy_static;

pub mod encoder;
pub mod error;
pub mod matcher;
pub mod orchestrator;
pub mod rule;
pub mod tokenizer;
pub mod transcriber;

pub use encoder::{EncoderKind, PhonemeEncoder};
pub use error::{LoadError, TranscriberError};
pub use orchestrator::Transcriber;
pub use rule::{ContextAtom, Exceptions, MetaAtom, Metarules, Rule, RuleStore};
pub use tokenizer::{tokenize, Charsets};
pub use transcriber::rules_transcribe;

#[cfg(test)]
mod tests {
    use super::*;

    // A small, self-contained fixture grammar covering each engine
    // feature end to end: a metarule class, a positional anchor, a
    // hash-suppressed separator, and an exception. Not the production
    // Latvian rule set (that dataset wasn't part of this build), but
    // exercised the same way a real one would be.
    fn fixture_rules_source() -> &'static str {
        "
<r>
<p>a</p>
<d>
<t>a</t>
</d>
</r>
<r>
<p>e</p>
<d>
<t>e</t>
</d>
</r>
<r>
<p>#b</p>
<d>
<t>b</t>
</d>
</r>
<r>
<p>ts</p>
<d>
<t>c</t>
<m>V</m>
</d>
</r>
<r>
<p>k</p>
<d>
<t>c</t>
</d>
</r>
<r>
<p>n</p>
<d>
<t>n</t>
<m>#</m>
</d>
</r>
"
    }

    fn fixture_metarules_source() -> &'static str {
        "
<m>
<d>V</d>
<t>e</t>
<t>i</t>
</m>
"
    }

    fn fixture_exceptions_source() -> &'static str {
        "saule s_a_u_l_e\n"
    }

    fn fixture_store() -> RuleStore {
        RuleStore::from_sources(
            fixture_rules_source(),
            fixture_metarules_source(),
            fixture_exceptions_source(),
        )
        .unwrap()
    }

    #[test]
    fn alphanumeric_encoder_composes_with_the_fixed_alphabetic_decoder() {
        // Engine tokens ("a", "e") live in the Alphabetic surface alphabet,
        // not raw IPA. Selecting a *different* encoder must still decode
        // through the fixed Alphabetic::to_ipa first -- "a" -> IPA 'ɑ'
        // (U+0251) -> AlphaNumeric code "0251"; "e" -> IPA 'e' (already
        // ASCII) -> code "0065".
        let store = fixture_store();
        let transcriber = Transcriber::new(&store, Some(EncoderKind::AlphaNumeric));
        assert_eq!(transcriber.transcribe("ae", "_").unwrap(), "0251_0065");
    }

    #[test]
    fn metarule_class_gates_the_affricate_rule() {
        let store = fixture_store();
        let transcriber = Transcriber::new(&store, None);
        // 'c' before 'e' (a member of class V) takes the affricate rule.
        assert_eq!(transcriber.transcribe("ce", "_").unwrap(), "ts_e");
        // 'c' before 'a' (not in V) falls through to the plain stop rule.
        assert_eq!(transcriber.transcribe("ca", "_").unwrap(), "k_a");
    }

    #[test]
    fn edge_of_input_anchor_is_honored() {
        let store = fixture_store();
        let transcriber = Transcriber::new(&store, None);
        assert_eq!(transcriber.transcribe("an", "_").unwrap(), "a_n");
    }

    #[test]
    fn exceptions_bypass_the_rule_engine_entirely() {
        let store = fixture_store();
        let transcriber = Transcriber::new(&store, None);
        // None of 's', 'u', 'l' are indexed by any rule in this fixture,
        // so this only succeeds through the exception map.
        assert_eq!(transcriber.transcribe("saule", "_").unwrap(), "s_a_u_l_e");
    }

    #[test]
    fn unindexed_input_outside_the_rule_charset_is_a_hard_error() {
        let store = fixture_store();
        let transcriber = Transcriber::new(&store, None);
        let err = transcriber.transcribe("zoo", "_").unwrap_err();
        assert_eq!(
            err,
            TranscriberError::NoRuleForChar {
                ch: 'z',
                position: 0
            }
        );
    }
}
