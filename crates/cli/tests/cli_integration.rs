//! CLI integration tests: spawn the `ll1` binary and verify exit codes,
//! stdout content, and stderr content against fixture files written to
//! a temp directory.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const TOY_GRAMMAR: &str = "S -> A B\nA -> a\nB -> b\nB -> ''\n";

fn ll1() -> Command {
    cargo_bin_cmd!("ll1")
}

fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn help_exits_0_with_description() {
    ll1()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("LL(1) front-end toolchain"));
}

#[test]
fn table_prints_csv_and_writes_nonterminals() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", TOY_GRAMMAR);
    let nts = dir.path().join("nonterminals.txt");

    ll1()
        .arg("table")
        .arg(&grammar)
        .arg("--nonterminals-out")
        .arg(&nts)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nonterminal,a,b,$"))
        .stdout(predicate::str::contains("B,,B -> b,B -> ''"));

    assert_eq!(fs::read_to_string(&nts).unwrap(), "S\nA\nB\n");
}

#[test]
fn table_check_fails_on_conflicting_grammar() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", "S -> a b\nS -> a c\n");

    ll1()
        .arg("table")
        .arg(&grammar)
        .arg("--check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("conflict"));
}

#[test]
fn trace_accepts_sentence() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", TOY_GRAMMAR);
    let tokens = fixture(&dir, "tokens.txt", "a:x b:y\n");

    ll1()
        .arg("trace")
        .arg(&grammar)
        .arg(&tokens)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stack,Input,Rule"))
        .stdout(predicate::str::contains("Accept"));
}

#[test]
fn trace_rejects_with_exit_1() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", TOY_GRAMMAR);
    let tokens = fixture(&dir, "tokens.txt", "b:y\n");

    ll1()
        .arg("trace")
        .arg(&grammar)
        .arg(&tokens)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no rule"));
}

#[test]
fn tree_renders_epsilon_decorated_tree() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", TOY_GRAMMAR);
    let tokens = fixture(&dir, "tokens.txt", "a:x\n");

    ll1()
        .arg("tree")
        .arg(&grammar)
        .arg(&tokens)
        .assert()
        .success()
        .stdout(predicate::str::contains("a:x"))
        .stdout(predicate::str::contains("\u{03b5}"));
}

#[test]
fn tree_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", TOY_GRAMMAR);
    let tokens = fixture(&dir, "tokens.txt", "a:x b:y\n");

    let assert = ll1()
        .arg("--output")
        .arg("json")
        .arg("tree")
        .arg(&grammar)
        .arg(&tokens)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(value.get("nodes").unwrap().is_array());
}

#[test]
fn tree_strict_rejects_leftover_input() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", "S -> a\n");
    let tokens = fixture(&dir, "tokens.txt", "a:1 a:2\n");

    ll1()
        .arg("tree")
        .arg(&grammar)
        .arg(&tokens)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unconsumed"));
}

#[test]
fn tree_rejects_mismatched_nonterminal_file() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", TOY_GRAMMAR);
    let tokens = fixture(&dir, "tokens.txt", "a:x\n");
    let nts = fixture(&dir, "nonterminals.txt", "S\nA\n");

    ll1()
        .arg("tree")
        .arg(&grammar)
        .arg(&tokens)
        .arg("--nonterminals")
        .arg(&nts)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn symbols_lists_resolved_variable() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(
        &dir,
        "grammar.txt",
        "ASSIGNMENT -> IDENTIFIER EQUALS EXPR\nEXPR -> num op num\nEXPR -> num\n",
    );
    let tokens = fixture(&dir, "tokens.txt", "IDENTIFIER:x EQUALS:@ num:1 op:+ num:2\n");

    ll1()
        .arg("symbols")
        .arg(&grammar)
        .arg(&tokens)
        .assert()
        .success()
        .stdout(predicate::str::contains("x"))
        .stdout(predicate::str::contains("Variable"))
        .stdout(predicate::str::contains("1+2"))
        .stdout(predicate::str::contains("Global"));
}

#[test]
fn malformed_grammar_reports_typed_error() {
    let dir = TempDir::new().unwrap();
    let grammar = fixture(&dir, "grammar.txt", "S -> a\nnot a rule\n");
    let tokens = fixture(&dir, "tokens.txt", "a:1\n");

    ll1()
        .arg("trace")
        .arg(&grammar)
        .arg(&tokens)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed grammar line 2"));
}
