use std::rc::Rc;

use serde_json::Value;

/// A callable invoked once per completed nonterminal subtree, bottom-up.
/// Returning `None` rejects the candidate parse the subtree belongs to.
pub type Builder = Rc<dyn Fn(Value) -> Option<Value>>;

/// A predicate used to deduplicate final parse trees. The default is deep
/// structural equality, which falls out of `serde_json::Value`'s own
/// `PartialEq`.
pub type Comparator = Rc<dyn Fn(&Value, &Value) -> bool>;

pub fn default_comparator() -> Comparator {
    Rc::new(|a, b| a == b)
}

/// The intermediate parse-forest representation built up in an Earley
/// item's `got` field.
///
/// `builder_tagged` is a plain flag on the variant rather than an in-band
/// sentinel value, so it is never something a caller could observe.
#[derive(Debug, Clone)]
pub enum Tree {
    /// A token produced by the tokenizer, the scanner, or a null/EOF
    /// production.
    Token(Value),
    /// A completed production's subtree: its producing nonterminal's name
    /// (present when `addCategories` is set), whether it is eligible for
    /// builder rewriting, and its matched children in rhs order.
    Node {
        category: Option<String>,
        builder_tagged: bool,
        children: Vec<Tree>,
    },
}

/// Build the child subtree appended to a waiting item's `got` when a
/// production completes:
///
/// > start with `S.got`; if `expressionBuilder` is configured, prepend the
/// > builder sentinel; if `addCategories`, prepend `S.lhs`; if
/// > `collapseBranches` and the resulting tuple has length 1, replace it
/// > by its single element.
pub fn build_completion_child(
    lhs: &str,
    got: Vec<Tree>,
    add_categories: bool,
    has_builder: bool,
    collapse_branches: bool,
) -> Tree {
    // `extra` counts virtual slots (the category prefix, the builder
    // sentinel) that never appear as real elements of `got`. Collapsing
    // to "the single element" only makes sense when that single element
    // is an actual child — if `extra` alone accounts for the length-1
    // tuple (an epsilon production with a category or builder attached),
    // there is no `got` element to collapse to, so a `Node` with no
    // children is built instead.
    let extra = has_builder as usize + add_categories as usize;
    if collapse_branches && extra == 0 && got.len() == 1 {
        return got.into_iter().next().expect("got.len() == 1 checked above");
    }
    Tree::Node {
        category: add_categories.then(|| lhs.to_string()),
        builder_tagged: has_builder,
        children: got,
    }
}

fn tuple_value(category: Option<String>, children: Vec<Value>) -> Value {
    match category {
        Some(name) => {
            let mut arr = Vec::with_capacity(children.len() + 1);
            arr.push(Value::String(name));
            arr.extend(children);
            Value::Array(arr)
        }
        None => Value::Array(children),
    }
}

/// Recursively rewrite a candidate root tree, applying the configured
/// `expressionBuilder` bottom-up. Returns `None` if the builder rejects
/// any subtree, which discards the whole candidate.
pub fn finalize(tree: Tree, collapse_branches: bool, builder: Option<&Builder>) -> Option<Value> {
    match tree {
        Tree::Token(value) => Some(value),
        Tree::Node {
            category,
            builder_tagged,
            children,
        } => {
            let mut rewritten = Vec::with_capacity(children.len());
            for child in children {
                rewritten.push(finalize(child, collapse_branches, builder)?);
            }
            if builder_tagged {
                let arg = if collapse_branches && rewritten.len() == 1 {
                    rewritten.into_iter().next().unwrap()
                } else {
                    Value::Array(rewritten)
                };
                builder.expect("builder_tagged only set when a builder is configured")(arg)
            } else {
                Some(tuple_value(category, rewritten))
            }
        }
    }
}

/// Deduplicate finalized parse trees with `comparator`, preserving
/// first-occurrence order.
pub fn dedup_by(trees: Vec<Value>, comparator: &Comparator) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(trees.len());
    for tree in trees {
        if !out.iter().any(|kept| comparator(kept, &tree)) {
            out.push(tree);
        }
    }
    out
}
