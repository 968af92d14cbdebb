/// A lexed token, as handed to the parser by whatever tokenizer sits in front
/// of it. Terminals match against `kind` (or, for pattern and predicate
/// terminals, against the whole token).
#[derive(PartialEq, Eq, Clone, Hash, Debug)]
pub struct Token {
    pub(crate) kind: String,
    pub(crate) value: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Token { kind: kind.into(), value: value.into() }
    }

    pub fn kind(&self) -> &str { &self.kind }
    pub fn value(&self) -> &str { &self.value }
}
