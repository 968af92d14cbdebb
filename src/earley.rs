//! Earley: gradually build, from left to right, one set of "Earley items" per
//! position in the input.
//!
//! Column `i` holds every partial match that is consistent with the first `i`
//! tokens. Before a token is consumed the column is closed under prediction
//! (expecting a nonterminal adds that nonterminal's productions) and
//! completion (a finished item advances everyone in its start column that was
//! waiting for it). Scanning then moves the items that accept the token into
//! column `i+1`.
//!
//! Completed items are reduced eagerly through their compiled rule handler,
//! so every distinct derivation of the start symbol surfaces as its own
//! output value.

use crate::grammar::{Alias, GrammarAnalyzer, GrammarRule, NonTerm, RuleId, Symbol};
use crate::node::Value;
use crate::rendering::Rendered;
use crate::token::Token;
use crate::tree_builder::{Callbacks, CompiledGrammar, Handler};
use crate::{GrammarError, ParseError};

use tracing::{debug, trace};

use std::collections::{BTreeSet, HashMap};

mod chart;

pub use chart::{Column, Item, NewsList};

/// Everything needed to build a parser: the rules to run, the handlers their
/// aliases refer to, and the default start symbol.
pub struct ParserConf {
    pub rules: Vec<GrammarRule>,
    pub start: NonTerm,
    pub callbacks: Callbacks,
}

impl ParserConf {
    pub fn new(compiled: CompiledGrammar, start: impl Into<NonTerm>) -> Self {
        ParserConf { rules: compiled.rules, start: start.into(), callbacks: compiled.callbacks }
    }
}

/// A compiled Earley parser. Immutable once built, so one instance can serve
/// any number of `parse` calls, from any number of threads.
pub struct Earley {
    analysis: GrammarAnalyzer,
    /// Indexed by `RuleId`.
    postprocess: Vec<Handler>,
    predictions: HashMap<NonTerm, Vec<RuleId>>,
    start: NonTerm,
}

impl Earley {
    pub fn new(conf: ParserConf) -> Result<Self, GrammarError> {
        let ParserConf { rules, start, callbacks } = conf;
        let analysis = GrammarAnalyzer::new(rules);

        let mut postprocess = Vec::with_capacity(analysis.rules().len());
        for rule in analysis.rules() {
            let handler = match &rule.alias {
                Some(Alias::Handler(h)) => h.clone(),
                Some(Alias::Name(key)) => callbacks.get(key)
                    .cloned()
                    .ok_or_else(|| GrammarError::MissingHandler(key.clone()))?,
                None => return Err(GrammarError::MissingHandler(rule.to_string())),
            };
            postprocess.push(handler);
        }

        let predictions = analysis.origins()
            .map(|nt| (nt.clone(), analysis.expand_rule(nt)))
            .collect();

        Ok(Earley { analysis, postprocess, predictions, start })
    }

    pub fn from_compiled(compiled: CompiledGrammar, start: impl Into<NonTerm>) -> Result<Self, GrammarError> {
        Earley::new(ParserConf::new(compiled, start))
    }

    pub fn start(&self) -> &NonTerm { &self.start }

    pub fn rules(&self) -> &[GrammarRule] { self.analysis.rules() }

    /// Parses the whole of `stream` as `start` (or the default start symbol)
    /// and returns the reduced value of every complete derivation, in the
    /// order the chart discovered them.
    #[tracing::instrument(level = "debug", skip_all, fields(tokens = stream.len()))]
    pub fn parse(&self, stream: &[Token], start: Option<&NonTerm>) -> Result<Vec<Value>, ParseError> {
        let start = start.unwrap_or(&self.start);
        if !self.predictions.contains_key(start) {
            return Err(ParseError::UnknownStart(start.clone()));
        }

        let mut chart = EarleyChart::new(self, stream);
        let initial = chart.predict(start, 0);
        chart.table[0].add(initial);

        for (i, token) in stream.iter().enumerate() {
            chart.process_column(i, Some(token))?;
        }
        chart.process_column(stream.len(), None)?;

        let solutions = chart.solutions(start);
        if solutions.is_empty() {
            debug!(%start, "no complete derivation at end of input");
            return Err(ParseError::Incomplete);
        }
        Ok(solutions)
    }
}

// Handlers are opaque, so only the start symbol and the rules show.
impl std::fmt::Debug for Earley {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        let rules: Vec<String> = self.rules().iter().map(|r| r.to_string()).collect();
        w.debug_struct("Earley")
            .field("start", &self.start)
            .field("rules", &rules)
            .finish()
    }
}

/// The state of one `parse` call: the columns built so far over `stream`.
struct EarleyChart<'p> {
    parser: &'p Earley,
    stream: &'p [Token],
    table: Vec<Column<'p>>,
}

impl<'p> EarleyChart<'p> {
    fn new(parser: &'p Earley, stream: &'p [Token]) -> Self {
        EarleyChart { parser, stream, table: vec![Column::new()] }
    }

    fn predict(&self, nonterm: &NonTerm, i: usize) -> Vec<Item<'p>> {
        let parser: &'p Earley = self.parser;
        match parser.predictions.get(nonterm) {
            Some(ids) => ids.iter().map(|&id| Item::new(parser.analysis.rule(id), i)).collect(),
            None => vec![],
        }
    }

    /// Advances every item of `item`'s start column that waits on `item`'s
    /// origin, feeding it `value`.
    fn complete(&self, item: &Item<'p>, value: &Value) -> Vec<Item<'p>> {
        let name = item.origin();
        self.table[item.start].to_predict()
            .iter()
            .filter(|parent| parent.expects_nonterm(name))
            .map(|parent| parent.advance(value.clone()))
            .collect()
    }

    /// Closes column `i` under predict and complete, then scans `token` into
    /// column `i+1`. `None` marks the end of input: closure only.
    fn process_column(&mut self, i: usize, token: Option<&Token>) -> Result<(), ParseError> {
        debug_assert_eq!(i, self.table.len() - 1);
        let mut next_set = Column::new();

        loop {
            let cur_set = &mut self.table[i];

            let mut to_predict: Vec<&'p NonTerm> = Vec::new();
            for item in cur_set.to_predict.get_news() {
                // Pointer 0 means the item came out of a prediction, which
                // already covered everything it could predict.
                if item.ptr == 0 {
                    continue;
                }
                if let Some(Symbol::NonTerm(nt)) = item.expect() {
                    if !to_predict.contains(&nt) {
                        to_predict.push(nt);
                    }
                }
            }
            let to_reduce: Vec<Item<'p>> = cur_set.to_reduce.get_news().to_vec();

            if to_predict.is_empty() && to_reduce.is_empty() {
                break;
            }

            for nonterm in to_predict {
                let items = self.predict(nonterm, i);
                trace!(column = i, %nonterm, count = items.len(), "predict");
                self.table[i].add(items);
            }

            for mut item in to_reduce {
                trace!(column = i, %item, "complete");
                let data = std::mem::take(&mut item.data);
                let value = (self.parser.postprocess[item.rule.id.0])(data);
                let advanced = self.complete(&item, &value);
                let cur_set = &mut self.table[i];
                cur_set.reduced.push(value);
                cur_set.add(advanced);
            }
        }

        let cur_set = &self.table[i];
        if let Some(token) = token {
            for item in cur_set.to_scan() {
                if let Some(Symbol::Term(term)) = item.expect() {
                    if term.matches(token) {
                        trace!(column = i, %item, token = %token.rendered(), "scan");
                        next_set.add([item.advance(Value::Token(token.clone()))]);
                    }
                }
            }

            if next_set.is_empty() {
                let expected: BTreeSet<String> = cur_set.to_scan()
                    .iter()
                    .filter_map(Item::expect)
                    .map(|sym| sym.name().to_string())
                    .collect();
                debug!(position = i, token = %token.rendered(), expected = %expected.rendered(), "unexpected token");
                return Err(ParseError::UnexpectedToken {
                    token: token.clone(),
                    position: i,
                    expected,
                    stream: self.stream.to_vec(),
                });
            }
        }

        debug!(
            column = i,
            predict = cur_set.to_predict().len(),
            scan = cur_set.to_scan().len(),
            reduce = cur_set.to_reduce().len(),
            "column closed"
        );
        self.table.push(next_set);
        Ok(())
    }

    /// Reduced values of the final column's complete `start` items that span
    /// the whole input.
    fn solutions(&self, start: &NonTerm) -> Vec<Value> {
        let last = &self.table[self.stream.len()];
        last.to_reduce()
            .iter()
            .zip(&last.reduced)
            .filter(|(item, _)| item.origin() == start && item.start == 0)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

// As with the other modules, the tests live under `src/tests/` but are
// declared here so they can reach private state.
#[cfg(test)]
#[path = "tests/earley.rs"]
mod tests_for_earley;
