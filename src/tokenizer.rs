use std::rc::Rc;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::TokenizeError;
use crate::util::{trace_tokenizer, Code, Log};

/// How a matched token's text is turned into the emitted [Value].
///
/// Represented as a tagged variant rather than a dynamically typed
/// callable, keeping the dispatch explicit at the type-system boundary.
#[derive(Clone)]
pub enum Formatter {
    /// The matched text is emitted verbatim as a JSON string.
    Identity,
    /// A template containing `%N` placeholders, expanded against the
    /// match's capture groups (`%0` is the whole match).
    Template(String),
    /// A callable taking the matched text and the match's captures,
    /// returning the emitted value or `None` to drop the token.
    Callable(Rc<dyn Fn(&str, &Captures<'_>) -> Option<Value>>),
}

impl Formatter {
    fn apply(&self, matched: &str, captures: &Captures<'_>) -> Option<Value> {
        match self {
            Formatter::Identity => Some(Value::String(matched.to_string())),
            Formatter::Template(template) => {
                Some(Value::String(expand_template(template, captures)))
            }
            Formatter::Callable(f) => f(matched, captures),
        }
    }
}

/// Expand `%N` placeholders left-to-right against a match's capture
/// groups; literal text between placeholders is preserved. A `%` not
/// followed by a digit is preserved literally.
/// An out-of-range or non-participating group expands to the empty
/// string; unreferenced groups are simply never visited.
fn expand_template(template: &str, captures: &Captures<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut end = i + 1;
        while let Some(&(j, d)) = chars.peek() {
            if d.is_ascii_digit() {
                end = j + 1;
                chars.next();
            } else {
                break;
            }
        }
        if end == i + 1 {
            out.push('%');
        } else {
            let n: usize = template[i + 1..end].parse().expect("digits only");
            if let Some(m) = captures.get(n) {
                out.push_str(m.as_str());
            }
        }
    }
    out
}

/// One registered token type: an anchored pattern plus its formatter.
struct TokenType {
    /// Original pattern, anchored at the start (but not necessarily the
    /// end) of the remaining input, with a start-anchor prepended if the
    /// caller didn't already supply one.
    pattern: Regex,
    formatter: Formatter,
}

/// Greedy, ordered, first-match-wins tokenizer.
///
/// Registered types are tried in insertion order at each position; the
/// caller is responsible for ordering specific patterns ahead of general
/// ones, since this is not longest-match tokenization.
#[derive(Default)]
pub struct Tokenizer {
    types: Vec<TokenType>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Register a token type. `pattern` is wrapped so it only ever matches
    /// at the start of the remaining input; the caller's original pattern
    /// string is not mutated from their point of view, only the compiled
    /// runtime pattern is anchored.
    pub fn add_type(&mut self, pattern: &str, formatter: Formatter) -> Result<(), regex::Error> {
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^(?:{pattern})")
        };
        let pattern = Regex::new(&anchored)?;
        self.types.push(TokenType { pattern, formatter });
        Ok(())
    }

    /// Tokenize `input`, trying each registered type in insertion order at
    /// every position until one matches. Returns the full emitted token
    /// sequence, or the byte offset of the first position where no type
    /// matched.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Value>, TokenizeError> {
        self.tokenize_traced(input, Log::None)
    }

    pub(crate) fn tokenize_traced(
        &self,
        input: &str,
        log: Log,
    ) -> Result<Vec<Value>, TokenizeError> {
        let code = Code::new(input);
        let mut tokens = Vec::new();
        let mut pos = 0usize;
        'outer: while pos < input.len() {
            let remaining = &input[pos..];
            for token_type in &self.types {
                if let Some(captures) = token_type.pattern.captures(remaining) {
                    let matched = captures.get(0).expect("whole match always present");
                    debug_assert_eq!(matched.start(), 0);
                    let consumed = matched.end();
                    if consumed == 0 {
                        // A zero-width match would never advance the
                        // cursor; treat it as a non-match so tokenization
                        // can still fail rather than loop forever.
                        continue;
                    }
                    let matched_text = matched.as_str();
                    if let Some(value) = token_type.formatter.apply(matched_text, &captures) {
                        trace_tokenizer(log, &code, pos, "scan", &value);
                        tokens.push(value);
                    } else {
                        trace_tokenizer(log, &code, pos, "drop", &matched_text);
                    }
                    pos += consumed;
                    continue 'outer;
                }
            }
            trace_tokenizer(log, &code, pos, "no match", &remaining.chars().next());
            return Err(TokenizeError::new(pos));
        }
        Ok(tokens)
    }
}
