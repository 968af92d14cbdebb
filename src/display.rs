use crate::earley::Item;
use crate::grammar::{GrammarRule, Symbol};
use crate::node::{Tree, Value};

// const NONTERM_BRACKETS: (char, char) = ('⟨', '⟩');
const NONTERM_BRACKETS: (char, char) = ('(', ')');

fn write_symbols(w: &mut std::fmt::Formatter, symbols: &[Symbol]) -> std::fmt::Result {
    for (i, sym) in symbols.iter().enumerate() {
        if i > 0 {
            write!(w, " ")?;
        }
        write!(w, "{}", sym)?;
    }
    Ok(())
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(w, "{}", self.name())
    }
}

impl std::fmt::Display for GrammarRule {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(w, "{} : ", self.origin)?;
        write_symbols(w, &self.expansion)
    }
}

/// `<(start) origin : matched * pending>`
impl<'g> std::fmt::Display for Item<'g> {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (before, after) = self.rule.expansion.split_at(self.ptr);
        write!(w, "<({}) {} : ", self.start, self.rule.origin)?;
        write_symbols(w, before)?;
        if before.is_empty() {
            write!(w, "*")?;
        } else {
            write!(w, " *")?;
        }
        if !after.is_empty() {
            write!(w, " ")?;
            write_symbols(w, after)?;
        }
        write!(w, ">")
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        let bd = NONTERM_BRACKETS;
        write!(w, "{}{}", self.data, bd.0)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            write!(w, "{}", child)?;
        }
        write!(w, "{}", bd.1)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Token(t) => write!(w, "\"{}\"", t.value()),
            Value::Tree(t) => write!(w, "{}", t),
            Value::Bool(b) => write!(w, "{:?}", b),
            Value::Unit => write!(w, "()"),
            Value::Int(i) => write!(w, "{:?}", i),
            Value::Str(s) => write!(w, "{:?}", s),
        }
    }
}
