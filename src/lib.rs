//! Earley parsing tool (`earley_pt`) is a library to parse a context-free
//! grammar over named nonterminals and regular-expression terminals into
//! one or more parse trees, using the Earley recognition algorithm.
//!
//! # Overview
//!
//! Most parser generators require normalizing a grammar — eliminating left
//! recursion, hoisting epsilon rules — before a table-driven or recursive
//! descent parser can be generated from it. The Earley algorithm needs
//! none of that: it runs directly over whatever context-free grammar the
//! caller declares, handles left recursion and ambiguity natively through
//! a chart of dotted productions, and for an ambiguous grammar returns
//! every distinct parse rather than the first one it finds.
//!
//! # Design
//!
//! A [Grammar] is built by registering named [Production]s — some
//! alternative right-hand side of a nonterminal — whose elements are
//! either nonterminal references or anchored terminal regexes. [parse][Grammar::parse]
//! then runs the recognizer over a state grid (one bucket per input
//! position), predicting, scanning, and completing items until the grid is
//! full, and finally reconstructs every distinct parse tree rooted at the
//! grammar's start symbol.
//!
//! Parsing can run directly over a pre-tokenized sequence, or — when a
//! [Tokenizer] is attached — over a raw string, which the grammar
//! tokenizes first using the same greedy, ordered regex matching the
//! [Tokenizer] type implements standalone.
//!
//! # Example
//!
//! ```
//! use earley_pt::production::{RhsSpec, SymbolSpec};
//! use earley_pt::Grammar;
//! use serde_json::Value;
//!
//! // P -> S; S -> S '+' M | M; M -> M '*' T | T; T -> /-?[0-9]+/
//! let mut grammar = Grammar::new("S");
//! grammar.set_collapse_branches(true);
//! grammar
//!     .add_rule(
//!         "S",
//!         vec![
//!             RhsSpec::symbols(vec![
//!                 SymbolSpec::name("S"),
//!                 SymbolSpec::pattern(r"\+"),
//!                 SymbolSpec::name("M"),
//!             ]),
//!             RhsSpec::names("M"),
//!         ],
//!     )
//!     .unwrap();
//! grammar
//!     .add_rule(
//!         "M",
//!         vec![
//!             RhsSpec::symbols(vec![
//!                 SymbolSpec::name("M"),
//!                 SymbolSpec::pattern(r"\*"),
//!                 SymbolSpec::name("T"),
//!             ]),
//!             RhsSpec::names("T"),
//!         ],
//!     )
//!     .unwrap();
//! grammar
//!     .add_rule("T", vec![RhsSpec::terminal(r"-?[0-9]+")])
//!     .unwrap();
//!
//! let tokens: Vec<Value> = ["15", "+", "-2", "*", "9"]
//!     .into_iter()
//!     .map(|s| Value::String(s.to_string()))
//!     .collect();
//! let trees = grammar.parse(tokens).unwrap();
//! assert_eq!(trees.len(), 1);
//! ```
//!
//! # License
//! `earley_pt` is provided under the MIT license.

mod error;
mod grammar;
mod item;
pub mod production;
mod symbol;
mod tokenizer;
mod tree;
mod util;

pub use error::{ParseError, TokenizeError};
pub use grammar::{Grammar, GrammarOptions, ParseInput};
pub use symbol::Symbol;
pub use tokenizer::{Formatter, Tokenizer};
pub use tree::{Builder, Comparator};
pub use util::{Code, Log, Position};

/// One right-hand-side alternative of a nonterminal: a pair of `lhs` and an ordered sequence of [Symbol]s.
/// Not stored directly by [Grammar] — productions are registered through
/// [Grammar::add_rule] and resolved via [production::RhsSpec] — but
/// read back out through [Grammar::productions] for callers who want to
/// inspect a grammar they didn't themselves construct.
#[derive(Debug, Clone)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}
