use std::rc::Rc;

use crate::symbol::Symbol;
use crate::tree::Tree;

/// An Earley state: a dotted production together with its origin and the
/// partial parse tree accumulated so far.
///
/// `lhs` and `rhs` are `Rc`-shared with the grammar's own production
/// table: a bucket can hold thousands of items derived from the same
/// handful of productions, and items are duplicated wholesale by the
/// scanner and completer, so sharing avoids an allocation per symbol on
/// every step.
#[derive(Clone)]
pub struct EarleyItem {
    pub lhs: Rc<str>,
    pub rhs: Rc<Vec<Symbol>>,
    pub pos: usize,
    pub ori: usize,
    pub got: Vec<Tree>,
}

impl EarleyItem {
    pub fn new(lhs: Rc<str>, rhs: Rc<Vec<Symbol>>, ori: usize) -> Self {
        Self {
            lhs,
            rhs,
            pos: 0,
            ori,
            got: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pos == self.rhs.len()
    }

    pub fn next_symbol(&self) -> Option<&Symbol> {
        self.rhs.get(self.pos)
    }

    /// The prediction-dedup identity for this item: `(lhs, rhs, pos==0)`.
    /// Only meaningful for freshly predicted items, where `pos` is always
    /// `0`.
    pub fn prediction_key(&self) -> (Rc<str>, Rc<Vec<Symbol>>) {
        (self.lhs.clone(), self.rhs.clone())
    }
}
