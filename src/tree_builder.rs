//! Compiles one reduction function per rule expansion.
//!
//! Each handler receives the values matched by an expansion, in order, and
//! produces the value the whole rule reduces to. The compiler looks at the
//! expansion once, up front, to decide which children get dropped (inline
//! marked terminals), which get spliced (inline marked nonterminals) and
//! which base constructor runs last (a user transform, or a generic tree
//! node). Expansions that need no filtering get the base constructor itself.

use crate::grammar::{Alias, GrammarRule, NonTerm, RuleOptions, RuleSet, Symbol};
use crate::node::{Tree, Value};
use crate::GrammarError;

use linear_map::LinearMap;
use tracing::trace;

use std::sync::Arc;

pub type Handler = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

pub fn handler(f: impl Fn(Vec<Value>) -> Value + Send + Sync + 'static) -> Handler {
    Arc::new(f)
}

/// User-supplied overrides of the default tree construction, looked up by
/// alias or origin name. A missing entry is not an error.
pub trait Transformer {
    fn lookup(&self, name: &str) -> Option<Handler>;
}

/// Builds generic trees for every rule.
pub struct NoTransform;

impl Transformer for NoTransform {
    fn lookup(&self, _name: &str) -> Option<Handler> { None }
}

#[derive(Clone, Default)]
pub struct Transforms(LinearMap<String, Handler>);

impl Transforms {
    pub fn new() -> Self { Transforms::default() }

    pub fn with(mut self, name: impl Into<String>, f: impl Fn(Vec<Value>) -> Value + Send + Sync + 'static) -> Self {
        self.0.insert(name.into(), handler(f));
        self
    }
}

impl Transformer for Transforms {
    fn lookup(&self, name: &str) -> Option<Handler> {
        self.0.get(name).cloned()
    }
}

impl<S: std::hash::BuildHasher> Transformer for std::collections::HashMap<String, Handler, S> {
    fn lookup(&self, name: &str) -> Option<Handler> {
        self.get(name).cloned()
    }
}

/// Identifies the handler of one (origin, expansion) pair.
#[derive(PartialEq, Eq, Clone, Hash, Debug)]
pub struct HandlerKey {
    origin: NonTerm,
    expansion: Vec<String>,
}

impl HandlerKey {
    fn new(origin: &NonTerm, expansion: &[Symbol]) -> Self {
        HandlerKey {
            origin: origin.clone(),
            expansion: expansion.iter().map(|s| s.name().to_string()).collect(),
        }
    }
}

impl std::fmt::Display for HandlerKey {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(w, "{} -> {}", self.origin, self.expansion.join(" "))
    }
}

/// Compiled handlers, keyed by the rendered [`HandlerKey`], in compile order.
#[derive(Clone, Default)]
pub struct Callbacks(LinearMap<String, Handler>);

impl Callbacks {
    pub fn get(&self, key: &str) -> Option<&Handler> { self.0.get(key) }
    pub fn contains(&self, key: &str) -> bool { self.0.contains_key(key) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn keys(&self) -> impl Iterator<Item = &str> { self.0.keys().map(|k| &k[..]) }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        w.debug_set().entries(self.0.keys()).finish()
    }
}

/// The rules the engine runs, each aliased to its key in `callbacks`.
#[derive(Clone, Debug)]
pub struct CompiledGrammar {
    pub rules: Vec<GrammarRule>,
    pub callbacks: Callbacks,
}

fn tree_builder_function(name: String) -> Handler {
    Arc::new(move |children: Vec<Value>| Value::Tree(Tree::new(name.clone(), children)))
}

fn expand1_tree_builder_function(tree_builder: Handler) -> Handler {
    Arc::new(move |mut children: Vec<Value>| {
        if children.len() == 1 {
            children.remove(0)
        } else {
            tree_builder(children)
        }
    })
}

/// Wraps `base` with whatever child filtering `expansion` calls for.
fn rule_handler(expansion: &[Symbol], base: Handler, keep_all_tokens: bool) -> Handler {
    // (position, splice?) for every child that survives
    let to_include: Vec<(usize, bool)> = expansion.iter()
        .enumerate()
        .filter(|(_, sym)| keep_all_tokens || !sym.is_terminal() || !sym.is_inlined())
        .map(|(i, sym)| (i, !sym.is_terminal() && sym.is_inlined()))
        .collect();

    if to_include.len() == expansion.len() && !to_include.iter().any(|&(_, to_expand)| to_expand) {
        return base;
    }

    Arc::new(move |matched: Vec<Value>| {
        let mut matched: Vec<Option<Value>> = matched.into_iter().map(Some).collect();
        let mut children = Vec::with_capacity(matched.len());
        for &(i, to_expand) in &to_include {
            if let Some(value) = matched.get_mut(i).and_then(Option::take) {
                if to_expand {
                    value.splice_into(&mut children);
                } else {
                    children.push(value);
                }
            }
        }
        base(children)
    })
}

/// Compiles a handler for every expansion in `rules`.
///
/// Base constructor resolution per expansion:
///
/// * an `Alias::Handler` is used as-is;
/// * otherwise `alias` (or, without one, `origin`) is looked up in
///   `transformer`;
/// * failing that, a generic `Tree` named after the alias or origin is built,
///   and for unaliased expansions of an `expand1` origin a lone child is
///   returned unwrapped.
pub fn compile_tree_builder(rules: &RuleSet, transformer: &dyn Transformer) -> Result<CompiledGrammar, GrammarError> {
    let mut callbacks: LinearMap<String, Handler> = LinearMap::new();
    let mut new_rules = Vec::new();

    for (origin, def) in rules.iter() {
        let RuleOptions { keep_all_tokens, expand1 } = def.options.unwrap_or_default();

        for expansion in &def.expansions {
            // an empty name is no alias: the origin names the node
            let alias = match &expansion.alias {
                Some(Alias::Name(name)) if name.is_empty() => None,
                alias => alias.as_ref(),
            };
            if let (Some(alias), true) = (alias, origin.is_inlined()) {
                return Err(GrammarError::AliasOnInlinedRule {
                    origin: origin.clone(),
                    alias: match alias {
                        Alias::Name(name) => name.clone(),
                        Alias::Handler(_) => "<handler>".to_string(),
                    },
                });
            }

            let base = match alias {
                Some(Alias::Handler(h)) => h.clone(),
                Some(Alias::Name(name)) => transformer.lookup(name)
                    .unwrap_or_else(|| tree_builder_function(name.clone())),
                None => match transformer.lookup(origin.name()) {
                    Some(f) => f,
                    None => {
                        let f = tree_builder_function(origin.name().to_string());
                        if expand1 { expand1_tree_builder_function(f) } else { f }
                    }
                },
            };

            let handler = rule_handler(&expansion.symbols, base, keep_all_tokens);

            let key = HandlerKey::new(origin, &expansion.symbols).to_string();
            if callbacks.contains_key(&key) {
                return Err(GrammarError::DuplicateExpansion {
                    origin: origin.clone(),
                    expansion: expansion.symbols.iter().map(Symbol::name).collect::<Vec<_>>().join(" "),
                });
            }
            trace!(%key, "compiled rule handler");
            callbacks.insert(key.clone(), handler);

            new_rules.push(GrammarRule::new(origin.clone(), expansion.symbols.clone())
                           .with_alias(Alias::Name(key)));
        }
    }

    Ok(CompiledGrammar { rules: new_rules, callbacks: Callbacks(callbacks) })
}

#[cfg(test)]
#[path = "tests/tree_builder.rs"]
mod tests_for_tree_builder;
