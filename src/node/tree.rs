use crate::node::Value;

/// A generic parse tree node: the rule (or alias) name that built it and the
/// filtered children.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tree {
    pub data: String,
    pub children: Vec<Value>,
}

impl Tree {
    pub fn new(data: impl Into<String>, children: Vec<Value>) -> Self {
        Tree { data: data.into(), children }
    }

    /// Multi-line rendering, one node per line, indented by depth. A node
    /// whose only child is a leaf keeps that leaf on its own line after a tab.
    pub fn pretty(&self) -> String {
        let mut accum = String::new();
        self.pretty_into(&mut accum, 0, "  ");
        accum
    }

    fn pretty_into(&self, accum: &mut String, level: usize, indent: &str) {
        if let [leaf] = &self.children[..] {
            if leaf.as_tree().is_none() {
                accum.push_str(&indent.repeat(level));
                accum.push_str(&self.data);
                accum.push('\t');
                accum.push_str(&leaf.to_string());
                accum.push('\n');
                return;
            }
        }
        accum.push_str(&indent.repeat(level));
        accum.push_str(&self.data);
        accum.push('\n');
        for child in &self.children {
            match child {
                Value::Tree(t) => t.pretty_into(accum, level + 1, indent),
                leaf => {
                    accum.push_str(&indent.repeat(level + 1));
                    accum.push_str(&leaf.to_string());
                    accum.push('\n');
                }
            }
        }
    }

    /// All subtrees (this one included) whose `data` is `name`, depth first.
    pub fn find_data<'a>(&'a self, name: &str) -> Vec<&'a Tree> {
        let mut accum = Vec::new();
        self.find_data_into(name, &mut accum);
        accum
    }

    fn find_data_into<'a>(&'a self, name: &str, accum: &mut Vec<&'a Tree>) {
        if self.data == name {
            accum.push(self);
        }
        for child in &self.children {
            if let Value::Tree(t) = child {
                t.find_data_into(name, accum);
            }
        }
    }
}
