//! LL(1) decision table: (non-terminal, lookahead terminal or `$`) -> at
//! most one production. Cells are filled from each production's FIRST
//! set, plus FOLLOW(lhs) when the production derives epsilon. A cell
//! written twice keeps the last write (preserved observable behavior);
//! `conflicts()` reports such cells as a separate validation pass.

use crate::analysis::Analysis;
use crate::grammar::{Grammar, Production, END_MARKER, EPSILON};
use std::collections::HashMap;

/// A table cell written by more than one distinct production.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Conflict {
    pub nonterminal: String,
    pub lookahead: String,
    /// Every distinct production that claimed the cell, in write order.
    pub productions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Ll1Table {
    cells: HashMap<(String, String), Production>,
    /// Full write history per cell, kept for conflict reporting.
    writes: HashMap<(String, String), Vec<String>>,
    /// Column order: grammar terminals then `$`.
    columns: Vec<String>,
    /// Row order: grammar non-terminals.
    rows: Vec<String>,
}

impl Ll1Table {
    pub fn build(grammar: &Grammar, analysis: &Analysis) -> Ll1Table {
        let mut cells = HashMap::new();
        let mut writes: HashMap<(String, String), Vec<String>> = HashMap::new();

        let mut write = |cells: &mut HashMap<(String, String), Production>,
                         nt: &str,
                         lookahead: &str,
                         production: &Production| {
            let key = (nt.to_owned(), lookahead.to_owned());
            let history = writes.entry(key.clone()).or_default();
            let text = production.to_string();
            if !history.contains(&text) {
                history.push(text);
            }
            cells.insert(key, production.clone());
        };

        for production in grammar.all_productions() {
            let firsts = analysis.first_of_sequence(&production.symbols, grammar);
            for symbol in &firsts {
                if symbol != EPSILON {
                    write(&mut cells, &production.lhs, symbol, production);
                }
            }
            if firsts.contains(EPSILON) {
                for follow_symbol in analysis.follow(&production.lhs) {
                    write(&mut cells, &production.lhs, follow_symbol, production);
                }
            }
        }

        let mut columns: Vec<String> = grammar.terminals().to_vec();
        columns.push(END_MARKER.to_owned());

        Ll1Table {
            cells,
            writes,
            columns,
            rows: grammar.nonterminals().to_vec(),
        }
    }

    pub fn lookup(&self, nonterminal: &str, lookahead: &str) -> Option<&Production> {
        self.cells
            .get(&(nonterminal.to_owned(), lookahead.to_owned()))
    }

    /// Validation pass: every cell claimed by two or more distinct
    /// productions. Does not change what `lookup` returns.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut found: Vec<Conflict> = Vec::new();
        for nt in &self.rows {
            for col in &self.columns {
                let key = (nt.clone(), col.clone());
                if let Some(history) = self.writes.get(&key) {
                    if history.len() > 1 {
                        found.push(Conflict {
                            nonterminal: nt.clone(),
                            lookahead: col.clone(),
                            productions: history.clone(),
                        });
                    }
                }
            }
        }
        found
    }

    /// Tabular form: header row `Nonterminal, <terminals.., $>`, then one
    /// row per non-terminal where each cell is `LHS -> RHS` or empty.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        let mut header = vec!["Nonterminal".to_owned()];
        header.extend(self.columns.iter().cloned());
        out.push(header);
        for nt in &self.rows {
            let mut row = vec![nt.clone()];
            for col in &self.columns {
                row.push(
                    self.lookup(nt, col)
                        .map(Production::to_string)
                        .unwrap_or_default(),
                );
            }
            out.push(row);
        }
        out
    }
}
