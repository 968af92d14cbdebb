use crate::token::Token;

use std::collections::BTreeSet;

/// Compact, human-oriented rendering for diagnostics.
pub trait Rendered {
    fn rendered(&self) -> String;
}

impl Rendered for Token {
    fn rendered(&self) -> String {
        format!("{:?} ({})", self.value, self.kind)
    }
}

impl Rendered for [Token] {
    fn rendered(&self) -> String {
        self.iter()
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Rendered for BTreeSet<String> {
    fn rendered(&self) -> String {
        let names: Vec<&str> = self.iter().map(|s| s.as_str()).collect();
        format!("{{{}}}", names.join(", "))
    }
}
