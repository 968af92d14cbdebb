// This is actually defined at `crate::tree_builder::tests_for_tree_builder`

use crate::tree_builder::*;
use crate::grammar::{Alias, Expansion, RuleOptions, RuleSet};
use crate::node::{Tree, Value};
use crate::tests::tok;
use crate::GrammarError;

use expect_test::expect;

use std::collections::HashMap;
use std::sync::Arc;

fn compile(rules: &RuleSet) -> CompiledGrammar {
    compile_tree_builder(rules, &NoTransform).unwrap()
}

fn options(keep_all_tokens: bool, expand1: bool) -> Option<RuleOptions> {
    Some(RuleOptions { keep_all_tokens, expand1 })
}

fn run(compiled: &CompiledGrammar, key: &str, children: Vec<Value>) -> Value {
    let handler = compiled.callbacks.get(key).unwrap();
    handler(children)
}

#[test]
fn one_handler_per_expansion_in_order() {
    let mut rules = RuleSet::new();
    rules.define("e", [Expansion::new(["e", "PLUS", "N"]), Expansion::new(["N"])], None);
    rules.define("start", [Expansion::empty()], None);
    let compiled = compile(&rules);

    let keys: Vec<&str> = compiled.callbacks.keys().collect();
    assert_eq!(keys, vec!["e -> e PLUS N", "e -> N", "start -> "]);
    assert_eq!(compiled.rules.len(), 3);
    assert_eq!(compiled.rules[1].to_string(), "e : N");
    match compiled.rules[1].alias() {
        Some(Alias::Name(key)) => assert_eq!(key, "e -> N"),
        other => panic!("unexpected alias {:?}", other),
    }
}

#[test]
fn inlined_terminals_dropped_without_keep_all_tokens() {
    let mut rules = RuleSet::new();
    rules.define("start", [Expansion::new(["_A", "_B"])], options(false, false));
    let compiled = compile(&rules);
    let out = run(&compiled, "start -> _A _B", vec![tok("_A", "a").into(), tok("_B", "b").into()]);
    assert_eq!(out, Value::Tree(Tree::new("start", vec![])));
}

#[test]
fn inlined_terminals_kept_with_keep_all_tokens() {
    let mut rules = RuleSet::new();
    rules.define("start", [Expansion::new(["_A", "_B"])], options(true, false));
    let compiled = compile(&rules);
    let out = run(&compiled, "start -> _A _B", vec![tok("_A", "a").into(), tok("_B", "b").into()]);
    expect![[r#"start("a" "b")"#]].assert_eq(&out.to_string());
}

#[test]
fn plain_terminals_always_kept() {
    let mut rules = RuleSet::new();
    rules.define("pair", [Expansion::new(["A", "_SEP", "B"])], None);
    let compiled = compile(&rules);
    let out = run(&compiled, "pair -> A _SEP B",
                  vec![tok("A", "a").into(), tok("_SEP", ",").into(), tok("B", "b").into()]);
    expect![[r#"pair("a" "b")"#]].assert_eq(&out.to_string());
}

#[test]
fn expand1_returns_a_lone_child() {
    let mut rules = RuleSet::new();
    rules.define("wrap", [Expansion::new(["N"]), Expansion::new(["N", "N"])], options(false, true));
    let compiled = compile(&rules);

    let one = run(&compiled, "wrap -> N", vec![tok("N", "1").into()]);
    assert_eq!(one, Value::Token(tok("N", "1")));

    let two = run(&compiled, "wrap -> N N", vec![tok("N", "1").into(), tok("N", "2").into()]);
    expect![[r#"wrap("1" "2")"#]].assert_eq(&two.to_string());
}

#[test]
fn expand1_does_not_apply_to_aliases() {
    let mut rules = RuleSet::new();
    rules.define("wrap", [Expansion::new(["N"]).alias("single")], options(false, true));
    let compiled = compile(&rules);
    let out = run(&compiled, "wrap -> N", vec![tok("N", "1").into()]);
    expect![[r#"single("1")"#]].assert_eq(&out.to_string());
}

#[test]
fn inlined_nonterminals_are_spliced() {
    let mut rules = RuleSet::new();
    rules.define("list", [Expansion::new(["_LB", "_items", "_RB"])], None);
    let compiled = compile(&rules);

    let items = Tree::new("_items", vec![tok("N", "1").into(), tok("N", "2").into()]);
    let out = run(&compiled, "list -> _LB _items _RB",
                  vec![tok("_LB", "[").into(), items.into(), tok("_RB", "]").into()]);
    expect![[r#"list("1" "2")"#]].assert_eq(&out.to_string());

    // a value that is not a tree is spliced in as itself
    let out = run(&compiled, "list -> _LB _items _RB",
                  vec![tok("_LB", "[").into(), Value::Int(7), tok("_RB", "]").into()]);
    expect!["list(7)"].assert_eq(&out.to_string());
}

#[test]
fn spliced_nonterminals_respect_keep_all_tokens() {
    let mut rules = RuleSet::new();
    rules.define("list", [Expansion::new(["_LB", "_items", "_RB"])], options(true, false));
    let compiled = compile(&rules);
    let items = Tree::new("_items", vec![tok("N", "1").into()]);
    let out = run(&compiled, "list -> _LB _items _RB",
                  vec![tok("_LB", "[").into(), items.into(), tok("_RB", "]").into()]);
    expect![[r#"list("[" "1" "]")"#]].assert_eq(&out.to_string());
}

#[test]
fn transformer_replaces_the_tree_constructor() {
    let transforms = Transforms::new()
        .with("sum", |children| Value::Int(children.len() as i64))
        .with("pair", |_| Value::Str("pair".into()));
    let mut rules = RuleSet::new();
    rules.define("sum", [Expansion::new(["N", "_PLUS", "N"]), Expansion::new(["N", "N"]).alias("pair")], options(false, true));
    rules.define("other", [Expansion::new(["N"]).alias("unknown")], None);
    let compiled = compile_tree_builder(&rules, &transforms).unwrap();

    // filtering still runs in front of the transform
    let out = run(&compiled, "sum -> N _PLUS N",
                  vec![tok("N", "1").into(), tok("_PLUS", "+").into(), tok("N", "2").into()]);
    assert_eq!(out, Value::Int(2));

    let out = run(&compiled, "sum -> N N", vec![tok("N", "1").into(), tok("N", "2").into()]);
    assert_eq!(out, Value::Str("pair".into()));

    let out = run(&compiled, "other -> N", vec![tok("N", "1").into()]);
    expect![[r#"unknown("1")"#]].assert_eq(&out.to_string());
}

#[test]
fn hash_map_transformer() {
    let mut transforms: HashMap<String, Handler> = HashMap::new();
    transforms.insert("atom".into(), handler(|_| Value::Bool(true)));
    let mut rules = RuleSet::new();
    rules.define("atom", [Expansion::new(["N"])], None);
    let compiled = compile_tree_builder(&rules, &transforms).unwrap();
    assert_eq!(run(&compiled, "atom -> N", vec![tok("N", "1").into()]), Value::Bool(true));
}

#[test]
fn unfiltered_expansion_uses_base_handler_itself() {
    let base = handler(|_| Value::Unit);
    let mut rules = RuleSet::new();
    rules.define("a", [Expansion::new(["X", "y"]).handler(base.clone())], None);
    rules.define("b", [Expansion::new(["_X", "y"]).handler(base.clone())], None);
    let compiled = compile(&rules);

    assert!(Arc::ptr_eq(&base, compiled.callbacks.get("a -> X y").unwrap()));
    assert!(!Arc::ptr_eq(&base, compiled.callbacks.get("b -> _X y").unwrap()));
}

#[test]
fn alias_on_inlined_origin_is_rejected() {
    let mut rules = RuleSet::new();
    rules.define("_helper", [Expansion::new(["X"]), Expansion::new(["Y"]).alias("named")], None);
    let err = compile_tree_builder(&rules, &NoTransform).unwrap_err();
    assert_eq!(err, GrammarError::AliasOnInlinedRule { origin: "_helper".into(), alias: "named".into() });

    let mut rules = RuleSet::new();
    rules.define("_helper", [Expansion::new(["X"]).handler(handler(|_| Value::Unit))], None);
    assert_matches!(compile_tree_builder(&rules, &NoTransform),
                    Err(GrammarError::AliasOnInlinedRule { .. }));
}

#[test]
fn duplicate_expansion_is_rejected() {
    let mut rules = RuleSet::new();
    rules.define("a", [Expansion::new(["X", "b"])], None);
    rules.define("a", [Expansion::new(["X", "b"]).alias("again")], None);
    let err = compile_tree_builder(&rules, &NoTransform).unwrap_err();
    assert_eq!(err, GrammarError::DuplicateExpansion { origin: "a".into(), expansion: "X b".into() });
    expect!["rule expansion 'X b' already exists in rule a"].assert_eq(&err.to_string());
}

#[test]
fn empty_alias_falls_back_to_origin() {
    let mut rules = RuleSet::new();
    rules.define("s", [Expansion::new(["X"]).alias("")], None);
    rules.define("wrap", [Expansion::new(["N"]).alias("")], options(false, true));
    rules.define("_helper", [Expansion::new(["Y"]).alias("")], None);
    let compiled = compile(&rules);

    let out = run(&compiled, "s -> X", vec![tok("X", "x").into()]);
    expect![[r#"s("x")"#]].assert_eq(&out.to_string());

    let out = run(&compiled, "wrap -> N", vec![tok("N", "1").into()]);
    assert_eq!(out, Value::Token(tok("N", "1")));
}
