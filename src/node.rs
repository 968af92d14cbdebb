use crate::token::Token;

mod tree;

pub use tree::Tree;

/// What rule handlers consume and produce. Scanned terminals enter the chart
/// as `Token`s; the default handlers build `Tree`s; user transforms are free
/// to reduce to scalars instead.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Value {
    Token(Token),
    Tree(Tree),
    Bool(bool),
    Unit,
    Int(i64),
    Str(String),
}

impl Value {
    pub fn as_tree(&self) -> Option<&Tree> {
        if let Value::Tree(t) = self { Some(t) } else { None }
    }

    pub fn as_token(&self) -> Option<&Token> {
        if let Value::Token(t) = self { Some(t) } else { None }
    }

    /// Splices this value into `children` the way an inlined symbol is
    /// spliced into its parent: a tree contributes its children, anything
    /// else contributes itself.
    pub(crate) fn splice_into(self, children: &mut Vec<Value>) {
        match self {
            Value::Tree(t) => children.extend(t.children),
            v => children.push(v),
        }
    }
}

impl From<Token> for Value { fn from(t: Token) -> Value { Value::Token(t) } }
impl From<Tree> for Value { fn from(t: Tree) -> Value { Value::Tree(t) } }
impl From<bool> for Value { fn from(b: bool) -> Value { Value::Bool(b) } }
impl From<()> for Value { fn from((): ()) -> Value { Value::Unit } }
impl From<i64> for Value { fn from(n: i64) -> Value { Value::Int(n) } }
impl From<String> for Value { fn from(s: String) -> Value { Value::Str(s) } }
impl From<&str> for Value { fn from(s: &str) -> Value { Value::Str(s.to_string()) } }
