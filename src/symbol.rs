use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};

/// An anchored regular expression matching exactly one whole input token.
///
/// Equality and hashing are by the *anchored source pattern*, never by
/// `Regex` identity, so two terminals built from the same pattern string
/// compare equal even though `Regex` itself has none of those impls.
#[derive(Clone)]
pub struct AnchoredTerminal {
    source: String,
    regex: Regex,
}

impl AnchoredTerminal {
    /// Build a terminal from a caller-supplied pattern, rewrapping it with
    /// whole-string anchoring: `^(?:pattern)$`. This
    /// is idempotent in effect — wrapping an already-anchored pattern again
    /// matches the same language, only the stored source string differs,
    /// and only the anchored source is ever observed by callers.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let source = format!("^(?:{pattern})$");
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    pub fn is_match(&self, token: &str) -> bool {
        self.regex.is_match(token)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for AnchoredTerminal {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
impl Eq for AnchoredTerminal {}
impl Hash for AnchoredTerminal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}
impl Debug for AnchoredTerminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

/// One element of a production's right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(AnchoredTerminal),
    Nonterminal(String),
}

impl Symbol {
    pub fn nonterminal(name: impl Into<String>) -> Self {
        Symbol::Nonterminal(name.into())
    }

    pub fn terminal(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Symbol::Terminal(AnchoredTerminal::new(pattern)?))
    }
}
