use crate::symbol::Symbol;

/// One element of an explicit, mixed right-hand side passed to
/// [crate::Grammar::add_rule].
#[derive(Debug, Clone)]
pub enum SymbolSpec {
    /// A nonterminal reference by name.
    Name(String),
    /// A terminal regex pattern (anchored at storage time).
    Pattern(String),
}

impl SymbolSpec {
    pub fn name(name: impl Into<String>) -> Self {
        SymbolSpec::Name(name.into())
    }
    pub fn pattern(pattern: impl Into<String>) -> Self {
        SymbolSpec::Pattern(pattern.into())
    }
}

/// One alternative right-hand side for a rule, in one of three forms:
/// a single terminal pattern, a space-separated list of nonterminal
/// names, or an explicit mixed sequence. Rust's static typing makes the
/// caller's intent explicit at the construction site rather than sniffed
/// out of a dynamically typed argument.
#[derive(Debug, Clone)]
pub enum RhsSpec {
    /// A single terminal regex, interpreted as a one-element rhs.
    Terminal(String),
    /// A string split on ASCII spaces into a sequence of nonterminal
    /// names.
    Names(String),
    /// An explicit ordered sequence mixing nonterminal names and terminal
    /// patterns.
    Symbols(Vec<SymbolSpec>),
}

impl RhsSpec {
    pub fn terminal(pattern: impl Into<String>) -> Self {
        RhsSpec::Terminal(pattern.into())
    }
    pub fn names(names: impl Into<String>) -> Self {
        RhsSpec::Names(names.into())
    }
    pub fn symbols(symbols: Vec<SymbolSpec>) -> Self {
        RhsSpec::Symbols(symbols)
    }
    /// An empty right-hand side (an epsilon production).
    pub fn empty() -> Self {
        RhsSpec::Symbols(Vec::new())
    }
}

impl From<&str> for RhsSpec {
    fn from(names: &str) -> Self {
        RhsSpec::Names(names.to_string())
    }
}

impl From<Vec<SymbolSpec>> for RhsSpec {
    fn from(symbols: Vec<SymbolSpec>) -> Self {
        RhsSpec::Symbols(symbols)
    }
}

/// Resolve a [RhsSpec] into the ordered [Symbol] sequence stored by the
/// grammar, compiling and whole-string-anchoring any terminal patterns
/// along the way.
pub fn resolve_rhs(spec: RhsSpec) -> Result<Vec<Symbol>, regex::Error> {
    match spec {
        RhsSpec::Terminal(pattern) => Ok(vec![Symbol::terminal(&pattern)?]),
        RhsSpec::Names(names) => Ok(names
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(Symbol::nonterminal)
            .collect()),
        RhsSpec::Symbols(symbols) => symbols
            .into_iter()
            .map(|s| match s {
                SymbolSpec::Name(name) => Ok(Symbol::nonterminal(name)),
                SymbolSpec::Pattern(pattern) => Symbol::terminal(&pattern),
            })
            .collect(),
    }
}
