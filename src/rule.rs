//! Rule/metarule/exception store (component A): parses the authored,
//! line-oriented tag format into the engine's in-memory form and indexes
//! rules by their anchor character.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::LoadError;

/// Positional anchors and named-class references that can appear on
/// either side of a rule's anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaAtom {
    /// `?` — exactly one character, of any kind.
    AnyOne,
    /// `#` — no characters remain on this side (edge of input).
    EdgeOfInput,
    /// `^` — at least one character remains on this side.
    AtLeastOne,
    /// `*` — anything at all; terminates the walk unconditionally.
    Terminator,
    /// A named metarule class; alternatives are tried in authoring order.
    Class(String),
}

impl MetaAtom {
    fn from_name(name: &str) -> Self {
        match name {
            "?" => MetaAtom::AnyOne,
            "#" => MetaAtom::EdgeOfInput,
            "^" => MetaAtom::AtLeastOne,
            "*" => MetaAtom::Terminator,
            other => MetaAtom::Class(other.to_string()),
        }
    }
}

/// A single context atom: a literal substring to match verbatim, or a
/// metarule reference (positional anchor or named class).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAtom {
    Literal(String),
    Meta(MetaAtom),
}

/// A rewriting rule: match `text` at the cursor, subject to `left`/`right`
/// context, and emit `repl`. `left`/`right` are stored outward from the
/// cursor (see `spec.md` §3 invariant 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub text: String,
    pub repl: String,
    pub left: Vec<ContextAtom>,
    pub right: Vec<ContextAtom>,
}

/// Ordered alternatives per metarule name.
pub type Metarules = HashMap<String, Vec<String>>;

/// Orthographic word -> pre-transcribed, `_`-delimited engine output.
pub type Exceptions = HashMap<String, String>;

/// Immutable, construct-once store of rules, metarules, and exceptions,
/// plus the precomputed first-char index and rule charset.
#[derive(Debug, Clone)]
pub struct RuleStore {
    rules_by_char: HashMap<char, Vec<Rule>>,
    metarules: Metarules,
    exceptions: Exceptions,
    rule_charset: BTreeSet<char>,
}

impl RuleStore {
    /// Builds a store from already-parsed rules, metarules and exceptions,
    /// computing the first-char index and rule charset.
    pub fn build(rules: Vec<Rule>, metarules: Metarules, exceptions: Exceptions) -> Self {
        let mut rules_by_char: HashMap<char, Vec<Rule>> = HashMap::new();
        let mut rule_charset: BTreeSet<char> = BTreeSet::new();

        for rule in &rules {
            rule_charset.extend(rule.text.chars());
            for atom in rule.left.iter().chain(rule.right.iter()) {
                if let ContextAtom::Literal(s) = atom {
                    rule_charset.extend(s.chars());
                }
            }
        }
        for alternatives in metarules.values() {
            for alt in alternatives {
                rule_charset.extend(alt.chars());
            }
        }
        for anchor in ['?', '#', '^', '*'] {
            rule_charset.remove(&anchor);
        }

        for rule in rules {
            let first = rule
                .text
                .chars()
                .next()
                .expect("Rule.text is non-empty by construction");
            rules_by_char.entry(first).or_default().push(rule);
        }

        RuleStore {
            rules_by_char,
            metarules,
            exceptions,
            rule_charset,
        }
    }

    /// Parses a rule file, a metarule file and an exception file (already
    /// read into memory) into a single store. No I/O happens here.
    pub fn from_sources(
        rules_source: &str,
        metarules_source: &str,
        exceptions_source: &str,
    ) -> Result<Self, LoadError> {
        let rules = parse_rules(rules_source)?;
        let metarules = parse_metarules(metarules_source)?;
        let exceptions = parse_exceptions(exceptions_source)?;
        Ok(Self::build(rules, metarules, exceptions))
    }

    /// Convenience wrapper around [`RuleStore::from_sources`] that reads
    /// the three files from disk. The parsing itself is pure; this is the
    /// one place the store touches the filesystem.
    pub fn from_files(
        rules_path: impl AsRef<std::path::Path>,
        metarules_path: impl AsRef<std::path::Path>,
        exceptions_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, LoadError> {
        let rules_source = std::fs::read_to_string(rules_path)?;
        let metarules_source = std::fs::read_to_string(metarules_path)?;
        let exceptions_source = std::fs::read_to_string(exceptions_path)?;
        Self::from_sources(&rules_source, &metarules_source, &exceptions_source)
    }

    pub fn rules_for(&self, ch: char) -> &[Rule] {
        self.rules_by_char
            .get(&ch)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn metarule_alternatives(&self, name: &str) -> Option<&[String]> {
        self.metarules.get(name).map(Vec::as_slice)
    }

    pub fn exception(&self, word: &str) -> Option<&str> {
        self.exceptions.get(word).map(String::as_str)
    }

    pub fn contains_char(&self, ch: char) -> bool {
        self.rule_charset.contains(&ch)
    }

    pub fn rule_charset(&self) -> &BTreeSet<char> {
        &self.rule_charset
    }
}

// --- Tag-tree parsing -------------------------------------------------
//
// The authored format is a whitespace-insignificant, line-oriented subset
// of XML: every non-empty line is `<tag>`, `</tag>`, or `<tag>content</tag>`.
// This mirrors `convert_rules.py`'s `load_rule_file`, but returns `Result`
// instead of asserting, since a library must not panic on bad input.

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Children(Vec<Element>),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    content: Content,
    line: usize,
}

impl Element {
    fn text(&self, parent: &'static str) -> Result<&str, LoadError> {
        match &self.content {
            Content::Text(s) => Ok(s.as_str()),
            Content::Children(children) if children.is_empty() => Ok(""),
            Content::Children(_) => Err(LoadError::MissingElement {
                parent,
                expected: "text",
                line: self.line,
            }),
        }
    }

    fn children(&self) -> &[Element] {
        match &self.content {
            Content::Children(children) => children,
            Content::Text(_) => &[],
        }
    }
}

fn is_tag_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

enum Line<'a> {
    Open(&'a str),
    Close(&'a str),
    Elem(&'a str, &'a str),
}

fn classify_line(line: &str) -> Option<Line<'_>> {
    if let Some(inner) = line.strip_prefix("</").and_then(|s| s.strip_suffix('>')) {
        if is_tag_name(inner) {
            return Some(Line::Close(inner));
        }
        return None;
    }
    let rest = line.strip_prefix('<')?;
    let gt = rest.find('>')?;
    let tag = &rest[..gt];
    if !is_tag_name(tag) {
        return None;
    }
    let after = &rest[gt + 1..];
    if after.is_empty() {
        return Some(Line::Open(tag));
    }
    if !after.ends_with('>') {
        return None;
    }
    let close = format!("</{}>", tag);
    let content = after.strip_suffix(&close)?;
    if content.contains('<') || content.contains('>') {
        return None;
    }
    Some(Line::Elem(tag, content))
}

struct Frame {
    tag: String,
    line: usize,
    children: Vec<Element>,
}

fn parse_tag_tree(source: &str) -> Result<Vec<Element>, LoadError> {
    let mut stack = vec![Frame {
        tag: "root".to_string(),
        line: 0,
        children: Vec::new(),
    }];

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match classify_line(line) {
            Some(Line::Open(tag)) => stack.push(Frame {
                tag: tag.to_string(),
                line: line_no,
                children: Vec::new(),
            }),
            Some(Line::Close(tag)) => {
                let frame = stack.pop().ok_or_else(|| LoadError::UnmatchedTag {
                    tag: tag.to_string(),
                    line: line_no,
                })?;
                if frame.tag != tag {
                    return Err(LoadError::UnmatchedTag {
                        tag: tag.to_string(),
                        line: line_no,
                    });
                }
                let element = Element {
                    tag: frame.tag,
                    content: Content::Children(frame.children),
                    line: frame.line,
                };
                stack
                    .last_mut()
                    .expect("root frame is never popped here")
                    .children
                    .push(element);
            }
            Some(Line::Elem(tag, content)) => {
                let element = Element {
                    tag: tag.to_string(),
                    content: Content::Text(content.to_string()),
                    line: line_no,
                };
                stack
                    .last_mut()
                    .expect("root frame is never popped here")
                    .children
                    .push(element);
            }
            None => return Err(LoadError::UnexpectedContent { line: line_no }),
        }
    }

    if stack.len() != 1 {
        let frame = stack.pop().expect("checked len != 1, so at least one frame");
        return Err(LoadError::UnmatchedTag {
            tag: frame.tag,
            line: frame.line,
        });
    }
    Ok(stack.pop().expect("exactly one frame remains").children)
}

fn context_atom(el: &Element, parent: &'static str) -> Result<ContextAtom, LoadError> {
    let text = el.text(parent)?;
    match el.tag.as_str() {
        "u" => Ok(ContextAtom::Literal(text.to_string())),
        "m" => Ok(ContextAtom::Meta(MetaAtom::from_name(text))),
        _ => Err(LoadError::UnexpectedContent { line: el.line }),
    }
}

/// Parses `<r>` rule elements into [`Rule`]s. Grounded on
/// `convert_rules.py`'s `convert_rules`, including the left-atom reversal.
pub fn parse_rules(source: &str) -> Result<Vec<Rule>, LoadError> {
    let root = parse_tag_tree(source)?;
    let mut rules = Vec::with_capacity(root.len());

    for ruledef in &root {
        if ruledef.tag != "r" {
            return Err(LoadError::UnexpectedContent { line: ruledef.line });
        }
        let mut repl: Option<String> = None;
        let mut body: Option<&Element> = None;

        for child in ruledef.children() {
            match child.tag.as_str() {
                "p" => {
                    if repl.is_some() {
                        return Err(LoadError::DuplicateElement {
                            parent: "r",
                            tag: "p",
                            line: child.line,
                        });
                    }
                    repl = Some(child.text("r")?.to_string());
                }
                "d" => {
                    if body.is_some() {
                        return Err(LoadError::DuplicateElement {
                            parent: "r",
                            tag: "d",
                            line: child.line,
                        });
                    }
                    body = Some(child);
                }
                _ => return Err(LoadError::UnexpectedContent { line: child.line }),
            }
        }

        let repl = repl.ok_or_else(|| LoadError::MissingElement {
            parent: "r",
            expected: "p",
            line: ruledef.line,
        })?;
        let body = body.ok_or_else(|| LoadError::MissingElement {
            parent: "r",
            expected: "d",
            line: ruledef.line,
        })?;

        let mut anchor: Option<String> = None;
        let mut left_in_source_order = Vec::new();
        let mut right = Vec::new();

        for child in body.children() {
            match child.tag.as_str() {
                "t" => {
                    if anchor.is_some() {
                        return Err(LoadError::DuplicateElement {
                            parent: "d",
                            tag: "t",
                            line: child.line,
                        });
                    }
                    let text = child.text("d")?;
                    if text.is_empty() {
                        return Err(LoadError::MissingElement {
                            parent: "d",
                            expected: "non-empty t",
                            line: child.line,
                        });
                    }
                    anchor = Some(text.to_string());
                }
                "u" | "m" => {
                    let atom = context_atom(child, "d")?;
                    if anchor.is_some() {
                        right.push(atom);
                    } else {
                        left_in_source_order.push(atom);
                    }
                }
                _ => return Err(LoadError::UnexpectedContent { line: child.line }),
            }
        }

        let text = anchor.ok_or_else(|| LoadError::MissingElement {
            parent: "d",
            expected: "t",
            line: body.line,
        })?;
        let mut left = left_in_source_order;
        left.reverse();

        rules.push(Rule {
            text,
            repl,
            left,
            right,
        });
    }

    Ok(rules)
}

/// Parses `<m>` metarule elements into a name -> ordered alternatives map.
pub fn parse_metarules(source: &str) -> Result<Metarules, LoadError> {
    let root = parse_tag_tree(source)?;
    let mut metarules = Metarules::new();

    for mr in &root {
        if mr.tag != "m" {
            return Err(LoadError::UnexpectedContent { line: mr.line });
        }
        let mut name: Option<String> = None;
        let mut alternatives = Vec::new();

        for child in mr.children() {
            match child.tag.as_str() {
                "d" => {
                    if name.is_some() {
                        return Err(LoadError::DuplicateElement {
                            parent: "m",
                            tag: "d",
                            line: child.line,
                        });
                    }
                    name = Some(child.text("m")?.to_string());
                }
                "t" => alternatives.push(child.text("m")?.to_string()),
                _ => return Err(LoadError::UnexpectedContent { line: child.line }),
            }
        }

        let name = name.ok_or_else(|| LoadError::MissingElement {
            parent: "m",
            expected: "d",
            line: mr.line,
        })?;
        if alternatives.is_empty() {
            return Err(LoadError::EmptyMetarule {
                name,
                line: mr.line,
            });
        }
        metarules.insert(name, alternatives);
    }

    Ok(metarules)
}

/// Parses the whitespace-separated, two-column exception dictionary.
/// Grounded on `convert_rules.py`'s `load_exceptions_db`.
pub fn parse_exceptions(source: &str) -> Result<Exceptions, LoadError> {
    let mut exceptions = Exceptions::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let key = fields.next();
        let value = fields.next();
        let extra = fields.next();
        match (key, value, extra) {
            (Some(key), Some(value), None) => {
                exceptions.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(LoadError::MalformedExceptionLine { line: idx + 1 });
            }
        }
    }
    Ok(exceptions)
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.text, self.repl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_rule() {
        let source = "\
<r>
<p>a</p>
<d>
<u>x</u>
<t>a</t>
<m>?</m>
</d>
</r>
";
        let rules = parse_rules(source).unwrap();
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.text, "a");
        assert_eq!(rule.repl, "a");
        assert_eq!(rule.left, vec![ContextAtom::Literal("x".to_string())]);
        assert_eq!(rule.right, vec![ContextAtom::Meta(MetaAtom::AnyOne)]);
    }

    #[test]
    fn reverses_left_atoms_to_read_outward_from_cursor() {
        let source = "\
<r>
<p>z</p>
<d>
<u>a</u>
<u>b</u>
<t>c</t>
</d>
</r>
";
        let rules = parse_rules(source).unwrap();
        // Source order before <t> is a, b; outward from the cursor the
        // closer atom (b) must come first.
        assert_eq!(
            rules[0].left,
            vec![
                ContextAtom::Literal("b".to_string()),
                ContextAtom::Literal("a".to_string()),
            ]
        );
    }

    #[test]
    fn resolves_named_metarule_vs_positional_anchor() {
        let source = "\
<r>
<p>x</p>
<d>
<t>q</t>
<m>VOWEL</m>
<m>#</m>
</d>
</r>
";
        let rules = parse_rules(source).unwrap();
        assert_eq!(
            rules[0].right,
            vec![
                ContextAtom::Meta(MetaAtom::Class("VOWEL".to_string())),
                ContextAtom::Meta(MetaAtom::EdgeOfInput),
            ]
        );
    }

    #[test]
    fn unmatched_tag_is_a_load_error() {
        let source = "\
<r>
<p>a</p>
<d>
<t>a</t>
</r>
";
        let err = parse_rules(source).unwrap_err();
        assert!(matches!(err, LoadError::UnmatchedTag { .. }));
    }

    #[test]
    fn rule_missing_anchor_is_a_load_error() {
        let source = "\
<r>
<p>a</p>
<d>
<u>x</u>
</d>
</r>
";
        let err = parse_rules(source).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingElement {
                expected: "t",
                ..
            }
        ));
    }

    #[test]
    fn parses_metarules_in_order() {
        let source = "\
<m>
<d>VOWEL</d>
<t>aa</t>
<t>a</t>
</m>
";
        let metarules = parse_metarules(source).unwrap();
        assert_eq!(
            metarules.get("VOWEL").unwrap(),
            &vec!["aa".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn empty_metarule_is_a_load_error() {
        let source = "\
<m>
<d>EMPTY</d>
</m>
";
        let err = parse_metarules(source).unwrap_err();
        assert!(matches!(err, LoadError::EmptyMetarule { .. }));
    }

    #[test]
    fn parses_exceptions_file() {
        let source = "labrīt labrixt\nsveiki sveiki\n";
        let exceptions = parse_exceptions(source).unwrap();
        assert_eq!(exceptions.get("labrīt").unwrap(), "labrixt");
        assert_eq!(exceptions.len(), 2);
    }

    #[test]
    fn malformed_exception_line_is_a_load_error() {
        let source = "onlyonefield\n";
        let err = parse_exceptions(source).unwrap_err();
        assert!(matches!(err, LoadError::MalformedExceptionLine { line: 1 }));
    }

    #[test]
    fn store_indexes_rules_by_first_char_and_computes_charset() {
        let rules = vec![
            Rule {
                text: "a".to_string(),
                repl: "a".to_string(),
                left: vec![],
                right: vec![ContextAtom::Literal("b".to_string())],
            },
            Rule {
                text: "ab".to_string(),
                repl: "ab".to_string(),
                left: vec![],
                right: vec![],
            },
        ];
        let store = RuleStore::build(rules, Metarules::new(), Exceptions::new());
        assert_eq!(store.rules_for('a').len(), 2);
        assert!(store.rules_for('z').is_empty());
        assert!(store.contains_char('a'));
        assert!(store.contains_char('b'));
        assert!(!store.contains_char('z'));
    }

    #[test]
    fn charset_excludes_positional_anchors() {
        let rules = vec![Rule {
            text: "a".to_string(),
            repl: "a".to_string(),
            left: vec![],
            right: vec![ContextAtom::Meta(MetaAtom::Terminator)],
        }];
        let store = RuleStore::build(rules, Metarules::new(), Exceptions::new());
        assert!(!store.contains_char('*'));
    }
}
