use crate::grammar::{GrammarRule, NonTerm, RuleId, Symbol};
use crate::node::Value;

use std::collections::HashSet;

/// A rule matched up to `ptr`, having started at column `start`. `data`
/// holds one value per matched symbol.
///
/// Items never change once built: `advance` makes a new one.
#[derive(Clone, Debug)]
pub struct Item<'g> {
    pub(crate) rule: &'g GrammarRule,
    pub(crate) ptr: usize,
    pub(crate) start: usize,
    pub(crate) data: Vec<Value>,
}

/// Identity of an item for deduplication. `data` is deliberately left out:
/// only predicted items, which carry no data yet, are deduplicated.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ItemKey {
    id: RuleId,
    ptr: usize,
    start: usize,
}

impl<'g> Item<'g> {
    pub fn new(rule: &'g GrammarRule, start: usize) -> Self {
        Item { rule, ptr: 0, start, data: vec![] }
    }

    /// The symbol after the dot, or `None` once the item is complete.
    pub fn expect(&self) -> Option<&'g Symbol> {
        self.rule.expansion.get(self.ptr)
    }

    pub fn is_complete(&self) -> bool {
        self.ptr == self.rule.expansion.len()
    }

    pub fn advance(&self, value: Value) -> Self {
        let mut data = Vec::with_capacity(self.data.len() + 1);
        data.extend(self.data.iter().cloned());
        data.push(value);
        Item { rule: self.rule, ptr: self.ptr + 1, start: self.start, data }
    }

    pub fn rule(&self) -> &'g GrammarRule { self.rule }
    pub fn origin(&self) -> &'g NonTerm { &self.rule.origin }
    pub fn start(&self) -> usize { self.start }
    pub fn ptr(&self) -> usize { self.ptr }
    pub fn data(&self) -> &[Value] { &self.data }

    /// Whether this item waits on `nonterm`.
    pub(crate) fn expects_nonterm(&self, nonterm: &NonTerm) -> bool {
        self.expect().and_then(Symbol::as_nonterm) == Some(nonterm)
    }

    pub(crate) fn key(&self) -> ItemKey {
        ItemKey { id: self.rule.id, ptr: self.ptr, start: self.start }
    }
}

/// Append-only list that remembers how much of itself has been handed out.
#[derive(Debug)]
pub struct NewsList<T> {
    items: Vec<T>,
    last_iter: usize,
}

impl<T> Default for NewsList<T> {
    fn default() -> Self { NewsList { items: Vec::new(), last_iter: 0 } }
}

impl<T> NewsList<T> {
    pub fn push(&mut self, item: T) { self.items.push(item) }

    /// Everything pushed since the previous call.
    pub fn get_news(&mut self) -> &[T] {
        let i = self.last_iter;
        self.last_iter = self.items.len();
        &self.items[i..]
    }

    pub fn has_news(&self) -> bool { self.last_iter < self.items.len() }

    pub fn all(&self) -> &[T] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

/// The Earley set for one input position, with items sorted by what they are
/// waiting for.
#[derive(Debug, Default)]
pub struct Column<'g> {
    pub(crate) to_predict: NewsList<Item<'g>>,
    pub(crate) to_scan: NewsList<Item<'g>>,
    pub(crate) to_reduce: NewsList<Item<'g>>,
    /// `reduced[k]` is the value `to_reduce[k]` reduced to.
    pub(crate) reduced: Vec<Value>,
    added: HashSet<ItemKey>,
    item_count: usize,
}

impl<'g> Column<'g> {
    pub fn new() -> Self { Column::default() }

    /// Routes each item to its bucket. Only items waiting on a nonterminal
    /// are deduplicated.
    // Deduplicating completed items as well breaks rules with empty
    // expansions, so `to_reduce` takes every item it is given.
    pub fn add(&mut self, items: impl IntoIterator<Item = Item<'g>>) {
        for item in items {
            match item.expect() {
                None => self.to_reduce.push(item),
                Some(Symbol::Term(_)) => self.to_scan.push(item),
                Some(Symbol::NonTerm(_)) => {
                    if !self.added.insert(item.key()) {
                        continue;
                    }
                    self.to_predict.push(item);
                }
            }
            self.item_count += 1;
        }
    }

    pub fn to_predict(&self) -> &[Item<'g>] { self.to_predict.all() }
    pub fn to_scan(&self) -> &[Item<'g>] { self.to_scan.all() }
    pub fn to_reduce(&self) -> &[Item<'g>] { self.to_reduce.all() }

    /// Number of items routed into this column.
    pub fn len(&self) -> usize { self.item_count }
    pub fn is_empty(&self) -> bool { self.item_count == 0 }
}

#[cfg(test)]
#[path = "../tests/chart.rs"]
mod tests_for_chart;
