//! Rule matcher (component B): decides whether a single rule applies at a
//! given cursor position, honoring left/right context, literals, metarule
//! classes, and positional anchors. Grounded line-for-line on
//! `phonetic_transcriber.py`'s `test_rule`.

use crate::rule::{ContextAtom, MetaAtom, Rule, RuleStore};

/// True iff `text[p:]` starts with `rule.text` and both the right-context
/// walk (from `p + rule.text.len()`, moving rightward) and the
/// left-context walk (from `p - 1`, moving leftward) succeed.
///
/// `text` is indexed by `char`, not by byte, throughout: Latvian orthography
/// includes multi-byte UTF-8 letters (`ē`, `ū`, `ī`, ...) and every
/// position/length in the spec is a character count. Named metarule
/// classes are resolved against `store`; an unknown class name behaves as
/// a non-match rather than an error (`spec.md` §4.1).
pub fn applies(store: &RuleStore, rule: &Rule, text: &[char], p: usize) -> bool {
    if p >= text.len() {
        return false;
    }
    let anchor: Vec<char> = rule.text.chars().collect();
    if anchor.len() > text.len() - p || text[p..p + anchor.len()] != anchor[..] {
        return false;
    }

    right_walk(store, rule, text, p + anchor.len()) && left_walk(store, rule, text, p as isize - 1)
}

fn ends_with(text: &[char], pattern: &[char]) -> bool {
    pattern.len() <= text.len() && text[text.len() - pattern.len()..] == *pattern
}

/// Advances `q` past one non-classed atom. Returns `Some(true)` if the
/// walk should stop here (a terminator/anchor was consumed), `Some(false)`
/// to keep going, or `None` on failure.
fn step_right(atom: &ContextAtom, text: &[char], q: &mut usize) -> Option<bool> {
    match atom {
        ContextAtom::Literal(s) => {
            let chars: Vec<char> = s.chars().collect();
            if *q + chars.len() > text.len() || text[*q..*q + chars.len()] != chars[..] {
                return None;
            }
            *q += chars.len();
            Some(false)
        }
        ContextAtom::Meta(MetaAtom::AnyOne) => {
            if *q >= text.len() {
                return None;
            }
            *q += 1;
            Some(false)
        }
        ContextAtom::Meta(MetaAtom::EdgeOfInput) => {
            (*q == text.len()).then_some(true)
        }
        ContextAtom::Meta(MetaAtom::AtLeastOne) => (*q < text.len()).then_some(true),
        ContextAtom::Meta(MetaAtom::Terminator) => Some(true),
        ContextAtom::Meta(MetaAtom::Class(_)) => unreachable!("handled by caller"),
    }
}

fn step_left(atom: &ContextAtom, text: &[char], q: &mut isize) -> Option<bool> {
    match atom {
        ContextAtom::Literal(s) => {
            let chars: Vec<char> = s.chars().collect();
            if *q + 1 < chars.len() as isize {
                return None;
            }
            let end = (*q + 1) as usize;
            if !ends_with(&text[..end], &chars) {
                return None;
            }
            *q -= chars.len() as isize;
            Some(false)
        }
        ContextAtom::Meta(MetaAtom::AnyOne) => {
            if *q < 0 {
                return None;
            }
            *q -= 1;
            Some(false)
        }
        ContextAtom::Meta(MetaAtom::EdgeOfInput) => (*q <= -1).then_some(true),
        ContextAtom::Meta(MetaAtom::AtLeastOne) => (*q >= 0).then_some(true),
        ContextAtom::Meta(MetaAtom::Terminator) => Some(true),
        ContextAtom::Meta(MetaAtom::Class(_)) => unreachable!("handled by caller"),
    }
}

fn right_walk(store: &RuleStore, rule: &Rule, text: &[char], mut q: usize) -> bool {
    for atom in &rule.right {
        if let ContextAtom::Meta(MetaAtom::Class(name)) = atom {
            match advance_right_by_class(store, name, text, q) {
                Some(next) => q = next,
                None => return false,
            }
            continue;
        }
        match step_right(atom, text, &mut q) {
            Some(true) => return true,
            Some(false) => continue,
            None => return false,
        }
    }
    true
}

fn left_walk(store: &RuleStore, rule: &Rule, text: &[char], mut q: isize) -> bool {
    for atom in &rule.left {
        if let ContextAtom::Meta(MetaAtom::Class(name)) = atom {
            match advance_left_by_class(store, name, text, q) {
                Some(next) => q = next,
                None => return false,
            }
            continue;
        }
        match step_left(atom, text, &mut q) {
            Some(true) => return true,
            Some(false) => continue,
            None => return false,
        }
    }
    true
}

fn advance_right_by_class(store: &RuleStore, name: &str, text: &[char], q: usize) -> Option<usize> {
    for alt in store.metarule_alternatives(name).unwrap_or(&[]) {
        let chars: Vec<char> = alt.chars().collect();
        if q + chars.len() <= text.len() && text[q..q + chars.len()] == chars[..] {
            return Some(q + chars.len());
        }
    }
    None
}

fn advance_left_by_class(
    store: &RuleStore,
    name: &str,
    text: &[char],
    q: isize,
) -> Option<isize> {
    for alt in store.metarule_alternatives(name).unwrap_or(&[]) {
        let chars: Vec<char> = alt.chars().collect();
        if q + 1 >= chars.len() as isize {
            let end = (q + 1) as usize;
            if ends_with(&text[..end], &chars) {
                return Some(q - chars.len() as isize);
            }
        }
    }
    None
}
