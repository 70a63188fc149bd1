//! FIRST/FOLLOW computation: classic fixed-point iteration over all
//! non-terminals until no set changes in a full pass. Terminates because
//! each set is bounded by the alphabet and only grows.

use crate::grammar::{Grammar, END_MARKER, EPSILON};
use std::collections::{BTreeMap, BTreeSet};

/// FIRST and FOLLOW sets for every non-terminal of a grammar.
#[derive(Debug, Clone)]
pub struct Analysis {
    first: BTreeMap<String, BTreeSet<String>>,
    follow: BTreeMap<String, BTreeSet<String>>,
}

impl Analysis {
    pub fn compute(grammar: &Grammar) -> Analysis {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        Analysis { first, follow }
    }

    /// FIRST(nt): terminals (possibly + epsilon) that can begin a
    /// derivation of nt. Empty set for unknown names.
    pub fn first(&self, nonterminal: &str) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.first.get(nonterminal).unwrap_or(&EMPTY)
    }

    /// FOLLOW(nt): terminals (possibly + `$`) that can appear right
    /// after nt in some derivation.
    pub fn follow(&self, nonterminal: &str) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.follow.get(nonterminal).unwrap_or(&EMPTY)
    }

    /// FIRST of a symbol sequence, seeded empty: scan left to right, a
    /// terminal stops the scan, a non-terminal contributes FIRST minus
    /// epsilon and lets the scan continue only if it is nullable. When
    /// every symbol is nullable the result also contains epsilon.
    pub fn first_of_sequence(&self, symbols: &[String], grammar: &Grammar) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        for symbol in symbols {
            if !grammar.is_nonterminal(symbol) {
                // Terminal or the epsilon marker itself.
                result.insert(symbol.clone());
                return result;
            }
            let first = self.first(symbol);
            result.extend(first.iter().filter(|s| *s != EPSILON).cloned());
            if !first.contains(EPSILON) {
                return result;
            }
        }
        result.insert(EPSILON.to_owned());
        result
    }
}

fn compute_first(grammar: &Grammar) -> BTreeMap<String, BTreeSet<String>> {
    let mut first: BTreeMap<String, BTreeSet<String>> = grammar
        .nonterminals()
        .iter()
        .map(|nt| (nt.clone(), BTreeSet::new()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.all_productions() {
            if production.is_epsilon() {
                changed |= first
                    .entry(production.lhs.clone())
                    .or_default()
                    .insert(EPSILON.to_owned());
                continue;
            }
            for symbol in &production.symbols {
                if !grammar.is_nonterminal(symbol) {
                    changed |= first
                        .entry(production.lhs.clone())
                        .or_default()
                        .insert(symbol.clone());
                    break;
                }
                let symbol_first = first.get(symbol).cloned().unwrap_or_default();
                let nullable = symbol_first.contains(EPSILON);
                let set = first.entry(production.lhs.clone()).or_default();
                for s in symbol_first {
                    if s != EPSILON {
                        changed |= set.insert(s);
                    }
                }
                if !nullable {
                    break;
                }
            }
        }
    }
    first
}

fn compute_follow(
    grammar: &Grammar,
    first: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut follow: BTreeMap<String, BTreeSet<String>> = grammar
        .nonterminals()
        .iter()
        .map(|nt| (nt.clone(), BTreeSet::new()))
        .collect();
    follow
        .entry(grammar.start_symbol().to_owned())
        .or_default()
        .insert(END_MARKER.to_owned());

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.all_productions() {
            for (i, symbol) in production.symbols.iter().enumerate() {
                if !grammar.is_nonterminal(symbol) {
                    continue;
                }
                // Only the immediate next symbol is consulted; see DESIGN.md.
                let mut lhs_follow_flows = i + 1 == production.symbols.len();
                let mut additions: Vec<String> = Vec::new();
                if let Some(next) = production.symbols.get(i + 1) {
                    if let Some(next_first) = first.get(next) {
                        additions.extend(next_first.iter().filter(|s| *s != EPSILON).cloned());
                        lhs_follow_flows |= next_first.contains(EPSILON);
                    } else {
                        additions.push(next.clone());
                    }
                }
                if lhs_follow_flows {
                    if let Some(lhs_follow) = follow.get(&production.lhs) {
                        additions.extend(lhs_follow.iter().cloned());
                    }
                }
                let set = follow.entry(symbol.clone()).or_default();
                for s in additions {
                    changed |= set.insert(s);
                }
            }
        }
    }
    follow
}
