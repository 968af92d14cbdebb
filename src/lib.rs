//! An Earley parser core with a compiled tree-construction layer.
//!
//! Rules are first turned into reduction handlers by
//! [`compile_tree_builder`]; the resulting [`CompiledGrammar`] drives an
//! [`Earley`] parser, whose `parse` returns one output value per distinct
//! derivation of the start symbol.

use std::collections::BTreeSet;

#[cfg(test)]
macro_rules! assert_matches {
    ($e:expr, $p:pat) => {
        let v = $e;
        if let $p = v { } else {
            panic!("assert fail {:?} does not match pattern {}", v, stringify!($p));
        }
    }
}

pub mod earley;
pub mod grammar;
pub mod node;
pub mod token;
pub mod tree_builder;

mod display;
mod rendering;

pub use earley::{Earley, ParserConf};
pub use grammar::{Alias, Expansion, GrammarAnalyzer, GrammarRule, NonTerm, RuleOptions, RuleSet, Symbol, Term};
pub use node::{Tree, Value};
pub use rendering::Rendered;
pub use token::Token;
pub use tree_builder::{compile_tree_builder, handler, CompiledGrammar, Handler, NoTransform, Transformer, Transforms};

use thiserror::Error;

/// Problems with the rules themselves, found before any input is seen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("rule {origin} is marked for inlining (it starts with an underscore) and cannot have aliases (alias={alias})")]
    AliasOnInlinedRule { origin: NonTerm, alias: String },
    #[error("rule expansion '{expansion}' already exists in rule {origin}")]
    DuplicateExpansion { origin: NonTerm, expansion: String },
    #[error("no handler registered for rule `{0}`")]
    MissingHandler(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("unexpected token {} at position {}, expected one of {}",
            .token.rendered(), .position, .expected.rendered())]
    UnexpectedToken {
        token: Token,
        position: usize,
        expected: BTreeSet<String>,
        stream: Vec<Token>,
    },
    #[error("incomplete parse: could not find a solution to input")]
    Incomplete,
    #[error("unknown start symbol `{0}`")]
    UnknownStart(NonTerm),
}
