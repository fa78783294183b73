use std::fmt;

/// Errors raised while parsing an authored rule file, metarule file, or
/// exception dictionary into in-memory structures. Fatal: a malformed file
/// cannot be repaired at run time, so loading simply stops and reports
/// where it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A closing tag didn't match the currently open tag (or there was no
    /// open tag to close).
    UnmatchedTag { tag: String, line: usize },
    /// A line didn't parse as `<tag>`, `</tag>`, or `<tag>content</tag>`.
    UnexpectedContent { line: usize },
    /// An element was missing a required child, e.g. an `<r>` with no `<t>`.
    MissingElement {
        parent: &'static str,
        expected: &'static str,
        line: usize,
    },
    /// An element had more than one of a child that must appear exactly once.
    DuplicateElement {
        parent: &'static str,
        tag: &'static str,
        line: usize,
    },
    /// A metarule (`<m>`) had zero `<t>` alternatives.
    EmptyMetarule { name: String, line: usize },
    /// An exception-file line didn't split into exactly two whitespace
    /// separated fields.
    MalformedExceptionLine { line: usize },
    /// The file could not be read from disk.
    Io(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnmatchedTag { tag, line } => {
                write!(f, "unmatched tag </{}> at line {}", tag, line)
            }
            LoadError::UnexpectedContent { line } => {
                write!(f, "unexpected content at line {}", line)
            }
            LoadError::MissingElement {
                parent,
                expected,
                line,
            } => write!(
                f,
                "<{}> is missing required <{}> (line {})",
                parent, expected, line
            ),
            LoadError::DuplicateElement { parent, tag, line } => write!(
                f,
                "<{}> has more than one <{}> (line {})",
                parent, tag, line
            ),
            LoadError::EmptyMetarule { name, line } => write!(
                f,
                "metarule '{}' has no alternatives (line {})",
                name, line
            ),
            LoadError::MalformedExceptionLine { line } => {
                write!(f, "exception entry at line {} is not `key value`", line)
            }
            LoadError::Io(message) => write!(f, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        LoadError::Io(error.to_string())
    }
}

/// Errors raised while transcribing already-loaded data. None of these are
/// retried by the core; the caller decides what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriberError {
    /// The scanner reached a character with no rules indexed under it.
    /// Per the engine's contract the input is assumed restricted to the
    /// rule charset, so this signals a caller contract violation rather
    /// than a malformed word.
    NoRuleForChar { ch: char, position: usize },
    /// Phrase-mode input contained a character outside the fixed alphabet
    /// `[a-zēūīāšģķļžčņ\s]`.
    UnrecognizedSymbols(String),
}

impl fmt::Display for TranscriberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriberError::NoRuleForChar { ch, position } => {
                write!(f, "no rule for char '{}' at position {}", ch, position)
            }
            TranscriberError::UnrecognizedSymbols(text) => {
                write!(f, "unrecognized symbols in '{}'", text)
            }
        }
    }
}

impl std::error::Error for TranscriberError {}
