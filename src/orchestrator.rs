//! Orchestrator (component F): word-, text-, and phrase-level
//! transcription built on top of the rule engine and the encoder layer.
//! Grounded on `phonetic_transcriber.py`'s `PhoneticTranscriber` class
//! (`transcribe` / `transcribeText` / `transcribePhrase`).

use crate::encoder::{EncoderKind, PhonemeEncoder};
use crate::error::TranscriberError;
use crate::rule::RuleStore;
use crate::transcriber::rules_transcribe;

/// The fixed phrase-mode alphabet: lowercase Latvian letters plus
/// whitespace. `spec.md` §4.6.
const PHRASE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzēūīāšģķļžčņ";

/// Ties a loaded `RuleStore` to an optional surface encoder and exposes
/// word/text/phrase transcription. Holds only borrows/owned data with no
/// interior mutability, so it is freely `Send + Sync` and shareable.
pub struct Transcriber<'a> {
    store: &'a RuleStore,
    encoder: Option<EncoderKind>,
}

impl<'a> Transcriber<'a> {
    pub fn new(store: &'a RuleStore, encoder: Option<EncoderKind>) -> Self {
        Transcriber { store, encoder }
    }

    /// Transcribes a single word: exception lookup takes strict
    /// precedence over the rule engine (`spec.md` §4.6 point 1).
    pub fn transcribe(&self, word: &str, sep: &str) -> Result<String, TranscriberError> {
        Ok(self.transcribe_tokens(word)?.join(sep))
    }

    /// As `transcribe`, but returns the individual (possibly
    /// encoder-mapped) tokens rather than a joined string.
    ///
    /// Engine `repl` tokens live in the `Alphabetic` surface alphabet, not
    /// raw IPA -- so when an encoder is configured, every token is first
    /// decoded through a *fixed* `EncoderKind::Alphabetic::to_ipa` to
    /// obtain true IPA, then mapped through the caller's chosen encoder's
    /// `from_ipa`. This mirrors `PhoneticConverter.convertTokens`, which
    /// always composes `encoder.fromIPAchar(decoder.toIPAchar(token))` with
    /// the decoder hard-coded to `AlphabeticCharacterConverter()`
    /// regardless of which encoder was requested.
    pub fn transcribe_tokens(&self, word: &str) -> Result<Vec<String>, TranscriberError> {
        let internal = match self.store.exception(word) {
            Some(replacement) => replacement.to_string(),
            None => rules_transcribe(self.store, word)?,
        };

        let tokens = internal.split('_');
        let mapped: Vec<String> = match self.encoder {
            Some(encoder) => tokens
                .map(|token| {
                    let ipa = EncoderKind::Alphabetic.to_ipa(token).unwrap_or_default();
                    encoder.from_ipa(&ipa).unwrap_or_default()
                })
                .collect(),
            None => tokens.map(|token| token.to_string()).collect(),
        };

        Ok(mapped)
    }

    /// Transcribes free text: paragraphs are split on blank-ish newlines,
    /// whitespace within a paragraph is collapsed, and each
    /// whitespace-delimited chunk is partitioned into runs that are
    /// entirely inside or entirely outside the rule charset
    /// (`spec.md` §4.6 point 2).
    pub fn transcribe_text(
        &self,
        text: &str,
        preserve_unknown: bool,
        phoneme_sep: &str,
        unknown_sep: &str,
    ) -> Result<String, TranscriberError> {
        let mut paragraphs = Vec::new();
        for paragraph in split_paragraphs(text) {
            let words = collapse_whitespace_runs(&paragraph);
            let mut chunks = Vec::with_capacity(words.len());
            for word in &words {
                chunks.push(self.transcribe_chunk(word, preserve_unknown, phoneme_sep, unknown_sep)?);
            }
            paragraphs.push(chunks.join(" "));
        }
        Ok(paragraphs.join("\n"))
    }

    fn transcribe_chunk(
        &self,
        chunk: &str,
        preserve_unknown: bool,
        phoneme_sep: &str,
        unknown_sep: &str,
    ) -> Result<String, TranscriberError> {
        let mut pieces = Vec::new();
        for run in partition_runs(chunk, self.store) {
            match run {
                Run::InCharset(text) => {
                    pieces.push(self.transcribe(text, phoneme_sep)?);
                }
                Run::OutOfCharset(text) => {
                    if preserve_unknown {
                        pieces.push(text.to_string());
                    }
                }
            }
        }
        Ok(pieces.join(unknown_sep))
    }

    /// Strict variant: rejects any character outside
    /// `[a-zēūīāšģķļžčņ\s]`, then transcribes word-by-word, joining with
    /// `" . "` to mark word boundaries (`spec.md` §4.6, phrase mode).
    pub fn transcribe_phrase(&self, phrase: &str) -> Result<String, TranscriberError> {
        if let Some(bad) = phrase.chars().find(|c| {
            !c.is_whitespace() && !PHRASE_ALPHABET.contains(*c)
        }) {
            return Err(TranscriberError::UnrecognizedSymbols(bad.to_string()));
        }

        let mut words = Vec::new();
        for word in phrase.split_whitespace() {
            words.push(self.transcribe(word, "_")?);
        }
        Ok(words.join(" . "))
    }
}

/// Collapses every whitespace run in `paragraph` to a single space, then
/// splits on that single space -- mirroring
/// `ws_re.sub(' ', paragraph).split(' ')` exactly, including that (unlike
/// `str::split_whitespace`) leading/trailing whitespace yields a leading
/// or trailing empty chunk rather than being silently dropped.
fn collapse_whitespace_runs(paragraph: &str) -> Vec<String> {
    let mut collapsed = String::with_capacity(paragraph.len());
    let mut prev_was_ws = false;
    for c in paragraph.chars() {
        if c.is_whitespace() {
            if !prev_was_ws {
                collapsed.push(' ');
            }
            prev_was_ws = true;
        } else {
            collapsed.push(c);
            prev_was_ws = false;
        }
    }
    collapsed.split(' ').map(str::to_string).collect()
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            paragraphs.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }
    paragraphs.push(current.trim().to_string());
    paragraphs.into_iter().filter(|p| !p.is_empty()).collect()
}

enum Run<'a> {
    InCharset(&'a str),
    OutOfCharset(&'a str),
}

/// Splits `chunk` into maximal runs that are entirely within the rule
/// charset or entirely outside it.
fn partition_runs<'a>(chunk: &'a str, store: &RuleStore) -> Vec<Run<'a>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_charset: Option<bool> = None;
    let indices: Vec<(usize, char)> = chunk.char_indices().collect();

    for (idx, (byte_pos, ch)) in indices.iter().enumerate() {
        let member = store.contains_char(*ch);
        match in_charset {
            None => in_charset = Some(member),
            Some(current) if current != member => {
                runs.push(make_run(&chunk[start..*byte_pos], current));
                start = *byte_pos;
                in_charset = Some(member);
            }
            _ => {}
        }
        if idx == indices.len() - 1 {
            runs.push(make_run(&chunk[start..], member));
        }
    }

    runs
}

fn make_run(text: &str, in_charset: bool) -> Run<'_> {
    if in_charset {
        Run::InCharset(text)
    } else {
        Run::OutOfCharset(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Exceptions, Metarules, Rule};

    fn rule(text: &str, repl: &str) -> Rule {
        Rule {
            text: text.to_string(),
            repl: repl.to_string(),
            left: vec![],
            right: vec![],
        }
    }

    fn fixture_store() -> RuleStore {
        let mut exceptions = Exceptions::new();
        exceptions.insert("saule".to_string(), "s_a_u_l_e".to_string());
        RuleStore::build(
            vec![rule("a", "a"), rule("b", "b"), rule("c", "ts")],
            Metarules::new(),
            exceptions,
        )
    }

    #[test]
    fn transcribe_falls_back_to_rule_engine() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        assert_eq!(t.transcribe("abc", "_").unwrap(), "a_b_ts");
    }

    #[test]
    fn transcribe_exceptions_take_precedence_over_the_rule_engine() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        // "saule" is not even composed of indexed characters ('s','u','l','e'
        // have no rules), so this only succeeds via the exception map.
        assert_eq!(t.transcribe("saule", "_").unwrap(), "s_a_u_l_e");
    }

    #[test]
    fn transcribe_maps_tokens_through_the_configured_encoder() {
        let store = fixture_store();
        let t = Transcriber::new(&store, Some(EncoderKind::Alphabetic));
        // engine tokens "a"/"b"/"ts" are themselves valid alphabetic
        // tokens, so round-tripping through the encoder is a no-op here.
        assert_eq!(t.transcribe("abc", "_").unwrap(), "a_b_ts");
    }

    #[test]
    fn collapse_whitespace_runs_preserves_leading_and_trailing_empty_chunks() {
        // Mirrors `ws_re.sub(' ', paragraph).split(' ')`: a leading or
        // trailing whitespace run collapses to a single space, which then
        // produces an empty leading/trailing chunk on split -- unlike
        // `str::split_whitespace`, which would silently drop it.
        assert_eq!(
            collapse_whitespace_runs(" ab  cd "),
            vec![
                "".to_string(),
                "ab".to_string(),
                "cd".to_string(),
                "".to_string(),
            ]
        );
    }

    #[test]
    fn transcribe_text_collapses_whitespace_and_joins_paragraphs() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        let text = "ab   c\n\na";
        let out = t
            .transcribe_text(text, true, "_", " ")
            .unwrap();
        assert_eq!(out, "a_b ts\na");
    }

    #[test]
    fn transcribe_text_discards_out_of_charset_runs_when_not_preserving() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        let out = t.transcribe_text("a1b", false, "_", "").unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn transcribe_text_preserves_out_of_charset_runs_when_requested() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        let out = t.transcribe_text("a1b", true, "_", "").unwrap();
        assert_eq!(out, "a1b");
    }

    #[test]
    fn transcribe_phrase_rejects_characters_outside_the_fixed_alphabet() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        let err = t.transcribe_phrase("abc123").unwrap_err();
        assert_eq!(
            err,
            TranscriberError::UnrecognizedSymbols("1".to_string())
        );
    }

    #[test]
    fn transcribe_phrase_joins_words_with_a_dot() {
        let store = fixture_store();
        let t = Transcriber::new(&store, None);
        assert_eq!(t.transcribe_phrase("ab c").unwrap(), "a_b . ts");
    }
}
