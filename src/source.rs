//! Evaluation sources
//!
//! An immutable chain describing where a piece of code came from. It is only
//! consulted when frames are attached to a failing evaluation, never by
//! control flow.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Longest excerpt of literal source text shown in a frame.
const EXCERPT_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// Code handed over as a literal string
    String(String),
    /// Code read from a file
    File(PathBuf),
    /// Code read from an entry of an archive
    ArchiveEntry { archive: PathBuf, entry: String },
    /// Code compiled by the script's own `eval`
    Eval,
    /// The body of a named or anonymous script function
    Function(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalSource {
    kind: SourceKind,
    parent: Option<Rc<EvalSource>>,
}

impl EvalSource {
    /// A source given as literal text; frames show a short excerpt of it.
    pub fn string(text: &str) -> Rc<Self> {
        let mut excerpt: String = text
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .take(EXCERPT_LEN)
            .collect();
        if text.chars().count() > EXCERPT_LEN {
            excerpt.push_str("...");
        }
        Rc::new(Self {
            kind: SourceKind::String(excerpt.trim().to_string()),
            parent: None,
        })
    }

    pub fn file(path: impl Into<PathBuf>) -> Rc<Self> {
        Rc::new(Self {
            kind: SourceKind::File(path.into()),
            parent: None,
        })
    }

    pub fn archive_entry(archive: impl Into<PathBuf>, entry: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            kind: SourceKind::ArchiveEntry {
                archive: archive.into(),
                entry: entry.into(),
            },
            parent: None,
        })
    }

    /// A source nested inside `parent` (eval code, function bodies).
    pub fn nested(parent: &Rc<EvalSource>, kind: SourceKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<&Rc<EvalSource>> {
        self.parent.as_ref()
    }

    /// Iterate from this source out to the outermost one.
    pub fn ancestors(&self) -> impl Iterator<Item = &EvalSource> {
        std::iter::successors(Some(self), |source| source.parent.as_deref())
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::String(excerpt) => write!(f, "string \"{}\"", excerpt),
            SourceKind::File(path) => write!(f, "file {}", path.display()),
            SourceKind::ArchiveEntry { archive, entry } => {
                write!(f, "{}!{}", archive.display(), entry)
            }
            SourceKind::Eval => write!(f, "eval"),
            SourceKind::Function(Some(name)) => write!(f, "function {}", name),
            SourceKind::Function(None) => write!(f, "anonymous function"),
        }
    }
}

impl fmt::Display for EvalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for source in self.ancestors() {
            if !first {
                write!(f, " in ")?;
            }
            write!(f, "{}", source.kind)?;
            first = false;
        }
        Ok(())
    }
}
