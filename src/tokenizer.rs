//! Phoneme tokenizer (component E): splits a raw phoneme stream into
//! discrete tokens using a two-state automaton over three character
//! classes. Grounded on `spec.md` §4.5 / `phonetic_converter.py`'s
//! tokenizer, used by encoders that work directly over an IPA-like
//! stream (only the `Ipa` variant of `EncoderKind`, per `SPEC_FULL.md`
//! §4.4).

use std::collections::HashSet;

/// The three character classes the automaton is configured with.
pub struct Charsets {
    /// `charsets[0]`: starting one of these begins a new token.
    base: HashSet<char>,
    /// `charsets[1]`: also terminates the previous token, at a
    /// non-initial position, but does not itself force a two-char token.
    terminator: HashSet<char>,
    /// `charsets[2]`: a single character that unconditionally pulls the
    /// next character into the same token.
    trigger: char,
}

impl Charsets {
    pub fn new(base: HashSet<char>, terminator: HashSet<char>, trigger: char) -> Self {
        Charsets {
            base,
            terminator,
            trigger,
        }
    }

    /// The charset configuration for the `Ipa` encoder: base characters
    /// are the phoneme inventory's IPA letters, the length mark is the
    /// two-character-token trigger, and whitespace is the terminator set.
    pub fn ipa() -> Self {
        let base: HashSet<char> = [
            'p', 'b', 't', 'd', 'k', '\u{0261}', 'f', 'v', 's', 'z', '\u{0283}', '\u{0292}',
            '\u{02A6}', '\u{02A3}', '\u{02A7}', '\u{02A4}', 'm', 'n', '\u{0272}', 'l', '\u{028E}',
            'r', 'j', 'h', '\u{025F}', 'c', '\u{0251}', 'e', 'i', '\u{0268}', 'o', 'u',
        ]
        .into_iter()
        .collect();
        let terminator: HashSet<char> = [' ', '\t', '\n', '_'].into_iter().collect();
        Charsets::new(base, terminator, '\u{02D0}')
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    StartContinue,
    ConsumeOne,
}

/// Splits `stream` into tokens per the automaton in `spec.md` §4.5.
///
/// The final token is deliberately **not** flushed, matching the source's
/// own behavior (`spec.md` §9, open question 1): any content still
/// accumulating in `current` when the loop ends is dropped.
pub fn tokenize(stream: &str, charsets: &Charsets) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut state = State::StartContinue;

    for (i, c) in stream.chars().enumerate() {
        match state {
            State::StartContinue => {
                if (charsets.base.contains(&c) || charsets.terminator.contains(&c)) && i > 0 {
                    tokens.push(std::mem::take(&mut current));
                }
                if charsets.base.contains(&c) || c == charsets.trigger {
                    state = State::ConsumeOne;
                }
                current.push(c);
            }
            State::ConsumeOne => {
                current.push(c);
                state = State::StartContinue;
            }
        }
    }

    tokens
}
