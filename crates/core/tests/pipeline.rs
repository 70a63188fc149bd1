//! End-to-end tests over both pipelines: the table-driven verification
//! path (grammar -> analysis -> table -> drive) and the tree path
//! (grammar -> backtracking parser -> resolver).

use ll1_core::{
    drive, parse_token_stream, Analysis, Grammar, Ll1Table, Resolver, SymbolKind, SymbolTable,
    TreeParser, EPSILON_LEAF, GLOBAL_SCOPE,
};
use std::collections::HashSet;

const TOY: &str = "S -> A B\nA -> a\nB -> b\nB -> ''\n";

fn toy_pipeline() -> (Grammar, Ll1Table) {
    let grammar = Grammar::parse(TOY).unwrap();
    let analysis = Analysis::compute(&grammar);
    let table = Ll1Table::build(&grammar, &analysis);
    (grammar, table)
}

#[test]
fn scenario_a_full_sentence() {
    let (grammar, table) = toy_pipeline();
    let tokens = parse_token_stream("a:x b:y").unwrap();

    let outcome = drive(&grammar, &table, &tokens);
    assert!(outcome.accepted);

    let tree = TreeParser::new(&grammar).parse(&tokens).unwrap();
    let root = tree.node(tree.root());
    assert_eq!(root.label, "S");
    let a = tree.node(root.children[0]);
    let b = tree.node(root.children[1]);
    assert_eq!(a.label, "A");
    assert_eq!(b.label, "B");
    assert_eq!(tree.node(a.children[0]).value.as_deref(), Some("x"));
    assert_eq!(tree.node(b.children[0]).value.as_deref(), Some("y"));
}

#[test]
fn scenario_b_epsilon_derivation() {
    let (grammar, table) = toy_pipeline();
    let tokens = parse_token_stream("a:x").unwrap();

    // Table-driven path accepts via B's epsilon cell under FOLLOW(B) = {$}.
    let outcome = drive(&grammar, &table, &tokens);
    assert!(outcome.accepted);
    assert!(outcome.rows.iter().any(|r| r.rule == "B -> ''"));

    // Tree path leaves B childless; decoration attaches the epsilon leaf.
    let mut tree = TreeParser::new(&grammar).parse(&tokens).unwrap();
    let nonterminals: HashSet<String> = grammar.nonterminals().iter().cloned().collect();
    tree.decorate_epsilon_leaves(&nonterminals);

    let root = tree.node(tree.root());
    let b = tree.node(root.children[1]);
    assert_eq!(b.label, "B");
    assert_eq!(b.children.len(), 1);
    assert_eq!(tree.node(b.children[0]).label, EPSILON_LEAF);
}

#[test]
fn scenario_c_assignment_resolution() {
    // Grammar for `x = 1 + 2` with the resolver's default vocabulary.
    // The EQUALS terminal carries the '@' placeholder, so the extracted
    // value is the concatenation of the right-hand side literals only.
    let grammar = Grammar::parse(
        "ASSIGNMENT -> IDENTIFIER EQUALS EXPR\n\
         EXPR -> num op num\n\
         EXPR -> num\n",
    )
    .unwrap();
    let tokens = parse_token_stream("IDENTIFIER:x EQUALS:@ num:1 op:+ num:2").unwrap();
    let tree = TreeParser::new(&grammar).parse(&tokens).unwrap();

    let mut table = SymbolTable::new();
    Resolver::new().resolve(&tree, &mut table).unwrap();

    assert_eq!(table.len(), 1);
    let x = table.lookup("x").unwrap();
    assert_eq!(x.kind, SymbolKind::Variable);
    assert_eq!(x.scope, GLOBAL_SCOPE);
    assert_eq!(x.value.as_deref(), Some("1+2"));
}

#[test]
fn scenario_d_function_scope_isolation() {
    // `fn f(p) { return p }` in tree form, produced by a grammar whose
    // labels match the resolver defaults.
    let grammar = Grammar::parse(
        "FUNCTION -> fn IDENTIFIER PARAMETERS STATEMENTS\n\
         PARAMETERS -> IDENTIFIER\n\
         STATEMENTS -> RETURN IDENTIFIER\n",
    )
    .unwrap();
    let tokens =
        parse_token_stream("fn:@ IDENTIFIER:f IDENTIFIER:p RETURN:@ IDENTIFIER:p").unwrap();
    let tree = TreeParser::new(&grammar).parse(&tokens).unwrap();

    let mut table = SymbolTable::new();
    Resolver::new().resolve(&tree, &mut table).unwrap();

    let f = table.lookup("f").unwrap();
    assert_eq!(f.kind, SymbolKind::Function);
    assert_eq!(f.scope, GLOBAL_SCOPE);
    assert_eq!(f.parameters.as_deref(), Some(&["p".to_owned()][..]));
    assert_eq!(f.value.as_deref(), Some("p"));

    let p = table.lookup("p").unwrap();
    assert_eq!(p.kind, SymbolKind::Variable);
    assert_eq!(p.scope, "f");
    assert!(table.lookup_in_scope("p", GLOBAL_SCOPE).is_none());
    assert_eq!(table.len(), 2);
}

#[test]
fn tree_leaves_reproduce_consumed_input() {
    let grammar = Grammar::parse(
        "E -> T R\nR -> + T R\nR -> ''\nT -> id\n",
    )
    .unwrap();
    let tokens = parse_token_stream("id:a +:+ id:b +:+ id:c").unwrap();
    let tree = TreeParser::new(&grammar).parse(&tokens).unwrap();
    assert_eq!(tree.leaf_values(), ["a", "+", "b", "+", "c"]);
}

#[test]
fn table_driven_parse_of_expression_grammar() {
    let grammar = Grammar::parse(
        "E -> T R\nR -> + T R\nR -> ''\nT -> id\n",
    )
    .unwrap();
    let analysis = Analysis::compute(&grammar);
    let table = Ll1Table::build(&grammar, &analysis);
    assert!(table.conflicts().is_empty());

    for input in ["id:a", "id:a +:+ id:b", "id:a +:+ id:b +:+ id:c"] {
        let tokens = parse_token_stream(input).unwrap();
        assert!(drive(&grammar, &table, &tokens).accepted, "input: {input}");
    }
    for input in ["+:+", "id:a +:+", "id:a id:b"] {
        let tokens = parse_token_stream(input).unwrap();
        assert!(!drive(&grammar, &table, &tokens).accepted, "input: {input}");
    }
}

#[test]
fn first_follow_stay_within_alphabet() {
    let grammar = Grammar::parse(TOY).unwrap();
    let analysis = Analysis::compute(&grammar);

    let mut alphabet: HashSet<String> = grammar.terminals().iter().cloned().collect();
    alphabet.insert("''".to_owned());
    for nt in grammar.nonterminals() {
        for s in analysis.first(nt) {
            assert!(alphabet.contains(s), "FIRST({nt}) leaked {s}");
        }
    }
    alphabet.insert("$".to_owned());
    for nt in grammar.nonterminals() {
        for s in analysis.follow(nt) {
            assert!(
                alphabet.contains(s) && s != "''",
                "FOLLOW({nt}) leaked {s}"
            );
        }
    }
}

#[test]
fn independent_tables_isolate_resolution_runs() {
    let grammar = Grammar::parse(
        "ASSIGNMENT -> IDENTIFIER EQUALS num\n",
    )
    .unwrap();
    let tokens = parse_token_stream("IDENTIFIER:x EQUALS:@ num:7").unwrap();
    let tree = TreeParser::new(&grammar).parse(&tokens).unwrap();

    let resolver = Resolver::new();
    let mut first_run = SymbolTable::new();
    let mut second_run = SymbolTable::new();
    resolver.resolve(&tree, &mut first_run).unwrap();
    resolver.resolve(&tree, &mut second_run).unwrap();
    assert_eq!(first_run.len(), 1);
    assert_eq!(second_run.len(), 1);
}

#[test]
fn reports_serialize_to_json() {
    let (grammar, table) = toy_pipeline();
    let tokens = parse_token_stream("a:x").unwrap();
    let outcome = drive(&grammar, &table, &tokens);
    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json.get("rows").unwrap().is_array());
    assert_eq!(json.get("accepted").unwrap(), &serde_json::json!(true));

    let tree = TreeParser::new(&grammar).parse(&tokens).unwrap();
    assert!(serde_json::to_value(&tree).unwrap().is_object());
}
