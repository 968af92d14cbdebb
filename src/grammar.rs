use crate::token::Token;
use crate::tree_builder::Handler;

use derive_more::{AsRef, Display};
use linear_map::LinearMap;
use regex::Regex;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

// Symbol names follow the grammar front-end's convention:
//
//   NUMBER, _PLUS, $END   terminals
//   expr, _items          nonterminals
//
// A leading underscore is the inline marker: inlined nonterminals have their
// children spliced into the parent, inlined terminals are filtered out unless
// the rule keeps all tokens.

pub const INLINE_MARKER: char = '_';

pub fn is_terminal(name: &str) -> bool {
    name.starts_with('$')
        || (name.chars().any(char::is_alphabetic) && !name.chars().any(char::is_lowercase))
}

pub fn is_inlined(name: &str) -> bool {
    name.starts_with(INLINE_MARKER)
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug, Display, AsRef)]
pub struct NonTerm(pub(crate) String);

impl NonTerm {
    pub fn name(&self) -> &str { &self.0 }
    pub fn is_inlined(&self) -> bool { is_inlined(&self.0) }
}

impl From<&str> for NonTerm { fn from(a: &str) -> Self { Self(a.into()) } }
impl From<String> for NonTerm { fn from(a: String) -> Self { Self(a) } }

/// How a terminal decides whether it accepts a token.
#[derive(Clone)]
pub enum Matcher {
    /// The token's kind must equal the terminal's name.
    Kind,
    /// The token's value must match the whole pattern.
    Pattern(Regex),
    Predicate(Arc<dyn Fn(&Token) -> bool + Send + Sync>),
}

/// A terminal symbol. Two terminals are the same symbol when their names
/// agree; the matcher does not take part in equality.
#[derive(Clone)]
pub struct Term {
    name: String,
    matcher: Matcher,
}

impl Term {
    pub fn new(name: impl Into<String>) -> Self {
        Term { name: name.into(), matcher: Matcher::Kind }
    }

    pub fn pattern(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Term { name: name.into(), matcher: Matcher::Pattern(anchored) })
    }

    pub fn predicate(name: impl Into<String>, f: impl Fn(&Token) -> bool + Send + Sync + 'static) -> Self {
        Term { name: name.into(), matcher: Matcher::Predicate(Arc::new(f)) }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn matcher(&self) -> &Matcher { &self.matcher }
    pub fn is_inlined(&self) -> bool { is_inlined(&self.name) }

    pub fn matches(&self, token: &Token) -> bool {
        match &self.matcher {
            Matcher::Kind => token.kind == self.name,
            Matcher::Pattern(re) => re.is_match(&token.value),
            Matcher::Predicate(f) => f(token),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Term) -> bool { self.name == other.name }
}

impl Eq for Term {}

impl std::hash::Hash for Term {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.name.hash(state) }
}

impl std::fmt::Debug for Term {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.matcher {
            Matcher::Kind => write!(w, "term[{}]", self.name),
            Matcher::Pattern(ref re) => write!(w, "term[{} /{}/]", self.name, re.as_str()),
            Matcher::Predicate(_) => write!(w, "term[{} <predicate>]", self.name),
        }
    }
}

impl From<&str> for Term { fn from(a: &str) -> Self { Self::new(a) } }

#[derive(PartialEq, Eq, Clone, Hash, Debug)]
pub enum Symbol {
    Term(Term),
    NonTerm(NonTerm),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Term(t) => t.name(),
            Symbol::NonTerm(nt) => nt.name(),
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Symbol::Term(_)) }

    pub fn is_inlined(&self) -> bool { is_inlined(self.name()) }

    pub fn as_nonterm(&self) -> Option<&NonTerm> {
        match self {
            Symbol::NonTerm(nt) => Some(nt),
            Symbol::Term(_) => None,
        }
    }
}

/// Classifies the name with [`is_terminal`].
impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        if is_terminal(name) {
            Symbol::Term(Term::new(name))
        } else {
            Symbol::NonTerm(NonTerm::from(name))
        }
    }
}

impl From<Term> for Symbol { fn from(t: Term) -> Self { Symbol::Term(t) } }
impl From<NonTerm> for Symbol { fn from(nt: NonTerm) -> Self { Symbol::NonTerm(nt) } }

/// Position of a rule in the analyzer's rule list. Chart items refer to
/// rules through this index, so two textually identical productions remain
/// distinct rules.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct RuleId(pub(crate) usize);

/// Selects the handler for one expansion: either a name resolved through a
/// transformer (or the compiled callbacks), or a handler given outright.
#[derive(Clone)]
pub enum Alias {
    Name(String),
    Handler(Handler),
}

impl std::fmt::Debug for Alias {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Alias::Name(name) => write!(w, "Name({:?})", name),
            Alias::Handler(_) => write!(w, "Handler(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GrammarRule {
    /// Assigned by the [`GrammarAnalyzer`] that owns this rule.
    pub(crate) id: RuleId,
    pub(crate) origin: NonTerm,
    pub(crate) expansion: Vec<Symbol>,
    pub(crate) alias: Option<Alias>,
}

impl GrammarRule {
    pub fn new(origin: impl Into<NonTerm>, expansion: Vec<Symbol>) -> Self {
        GrammarRule { id: RuleId(0), origin: origin.into(), expansion, alias: None }
    }

    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn id(&self) -> RuleId { self.id }
    pub fn origin(&self) -> &NonTerm { &self.origin }
    pub fn expansion(&self) -> &[Symbol] { &self.expansion }
    pub fn alias(&self) -> Option<&Alias> { self.alias.as_ref() }
}

/// Per-origin tree construction options.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct RuleOptions {
    /// Keep inline-marked terminals among the children.
    pub keep_all_tokens: bool,
    /// Return a lone child as-is instead of wrapping it in a node.
    pub expand1: bool,
}

/// One alternative of a rule definition, before compilation.
#[derive(Clone, Debug)]
pub struct Expansion {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) alias: Option<Alias>,
}

impl Expansion {
    pub fn new<S: Into<Symbol>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Expansion { symbols: symbols.into_iter().map(Into::into).collect(), alias: None }
    }

    pub fn empty() -> Self {
        Expansion { symbols: vec![], alias: None }
    }

    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(Alias::Name(name.into()));
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.alias = Some(Alias::Handler(handler));
        self
    }

    pub fn symbols(&self) -> &[Symbol] { &self.symbols }
}

#[derive(Clone, Debug, Default)]
pub struct RuleDef {
    pub(crate) expansions: Vec<Expansion>,
    pub(crate) options: Option<RuleOptions>,
}

/// Rule definitions keyed by origin, in definition order.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    pub(crate) defs: LinearMap<NonTerm, RuleDef>,
}

impl RuleSet {
    pub fn new() -> Self { RuleSet::default() }

    /// Adds expansions for `origin`. Defining an origin again appends to its
    /// expansions; options given here replace earlier ones.
    pub fn define(
        &mut self,
        origin: impl Into<NonTerm>,
        expansions: impl IntoIterator<Item = Expansion>,
        options: Option<RuleOptions>,
    ) -> &mut Self {
        let origin = origin.into();
        if let Some(def) = self.defs.get_mut(&origin) {
            def.expansions.extend(expansions);
            if options.is_some() {
                def.options = options;
            }
        } else {
            let expansions = expansions.into_iter().collect();
            self.defs.insert(origin, RuleDef { expansions, options });
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NonTerm, &RuleDef)> {
        self.defs.iter()
    }
}

/// The slice of grammar analysis the chart needs: an ordered rule list and
/// the set of productions to predict for each nonterminal.
#[derive(Debug)]
pub struct GrammarAnalyzer {
    rules: Vec<GrammarRule>,
    rules_by_origin: HashMap<NonTerm, Vec<RuleId>>,
}

impl GrammarAnalyzer {
    /// Takes ownership of `rules`, numbering them by position.
    pub fn new(mut rules: Vec<GrammarRule>) -> Self {
        let mut rules_by_origin: HashMap<NonTerm, Vec<RuleId>> = HashMap::new();
        for (i, rule) in rules.iter_mut().enumerate() {
            rule.id = RuleId(i);
            rules_by_origin.entry(rule.origin.clone()).or_default().push(rule.id);
        }
        GrammarAnalyzer { rules, rules_by_origin }
    }

    pub fn rules(&self) -> &[GrammarRule] { &self.rules }

    pub fn rule(&self, id: RuleId) -> &GrammarRule { &self.rules[id.0] }

    pub fn rules_by_origin(&self, nonterm: &NonTerm) -> &[RuleId] {
        self.rules_by_origin.get(nonterm).map(|v| &v[..]).unwrap_or(&[])
    }

    pub fn origins(&self) -> impl Iterator<Item = &NonTerm> {
        self.rules_by_origin.keys()
    }

    /// Every production that can start a derivation of `nonterm`: its own
    /// rules, then (breadth-first) the rules of each nonterminal reachable
    /// through the first symbol of an expansion.
    pub fn expand_rule<'a>(&'a self, nonterm: &'a NonTerm) -> Vec<RuleId> {
        let mut init_ptrs = Vec::new();
        let mut visited: HashSet<&NonTerm> = HashSet::new();
        let mut queue: VecDeque<&NonTerm> = VecDeque::new();
        visited.insert(nonterm);
        queue.push_back(nonterm);
        while let Some(nt) = queue.pop_front() {
            for &id in self.rules_by_origin(nt) {
                init_ptrs.push(id);
                if let Some(Symbol::NonTerm(first)) = self.rule(id).expansion.first() {
                    if visited.insert(first) {
                        queue.push_back(first);
                    }
                }
            }
        }
        init_ptrs
    }
}

#[cfg(test)]
#[path = "tests/grammar.rs"]
mod tests_for_grammar;
