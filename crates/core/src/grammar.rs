//! Grammar model: production lines of the form `LHS -> S1 S2 .. Sn`.
//!
//! A symbol is a non-terminal iff it appears as a left-hand side;
//! everything else on a right-hand side (except epsilon) is a terminal.
//! Production order under a non-terminal is significant: it is the
//! tie-break when the backtracking parser's priority scores are equal.

use crate::error::FrontendError;
use std::collections::HashMap;

/// Empty-production marker, as written in grammar source.
pub const EPSILON: &str = "''";

/// End-of-input marker used by FOLLOW sets and the table-driven parser.
pub const END_MARKER: &str = "$";

/// One right-hand side: an ordered sequence of symbol names.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Production {
    pub lhs: String,
    pub symbols: Vec<String>,
}

impl Production {
    /// True when the production is exactly epsilon.
    pub fn is_epsilon(&self) -> bool {
        self.symbols.len() == 1 && self.symbols[0] == EPSILON
    }
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.symbols.join(" "))
    }
}

/// A context-free grammar: ordered productions grouped by non-terminal.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// Non-terminal -> ordered alternative right-hand sides.
    rules: HashMap<String, Vec<Production>>,
    /// Non-terminals in first-seen order; the first one is the start symbol.
    nonterminals: Vec<String>,
    /// Terminals in first-seen order (alphabet minus non-terminals).
    terminals: Vec<String>,
}

impl Grammar {
    /// Parse grammar source text. Blank lines are skipped; any other line
    /// must contain the `->` separator with a non-empty side on each end.
    pub fn parse(text: &str) -> Result<Grammar, FrontendError> {
        let mut rules: HashMap<String, Vec<Production>> = HashMap::new();
        let mut nonterminals: Vec<String> = Vec::new();
        let mut alphabet: Vec<String> = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (lhs, rhs) = line.split_once("->").ok_or(FrontendError::MalformedGrammar {
                line: i + 1,
                text: line.to_owned(),
            })?;
            let lhs = lhs.trim();
            let symbols: Vec<String> = rhs.split_whitespace().map(str::to_owned).collect();
            if lhs.is_empty() || symbols.is_empty() {
                return Err(FrontendError::MalformedGrammar {
                    line: i + 1,
                    text: line.to_owned(),
                });
            }

            if !rules.contains_key(lhs) {
                nonterminals.push(lhs.to_owned());
            }
            for symbol in &symbols {
                if symbol != EPSILON && !alphabet.contains(symbol) {
                    alphabet.push(symbol.clone());
                }
            }
            rules.entry(lhs.to_owned()).or_default().push(Production {
                lhs: lhs.to_owned(),
                symbols,
            });
        }

        if nonterminals.is_empty() {
            return Err(FrontendError::MalformedGrammar {
                line: 0,
                text: "empty grammar".to_owned(),
            });
        }

        let terminals = alphabet
            .into_iter()
            .filter(|s| !rules.contains_key(s))
            .collect();

        Ok(Grammar {
            rules,
            nonterminals,
            terminals,
        })
    }

    /// The left-hand side of the first production in the source.
    pub fn start_symbol(&self) -> &str {
        &self.nonterminals[0]
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        symbol != EPSILON && !self.is_nonterminal(symbol)
    }

    /// Non-terminals in first-seen order.
    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminals
    }

    /// Terminals in first-seen order.
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    /// Ordered alternatives for a non-terminal.
    pub fn productions(&self, nonterminal: &str) -> Result<&[Production], FrontendError> {
        self.rules
            .get(nonterminal)
            .map(Vec::as_slice)
            .ok_or_else(|| FrontendError::UnknownNonTerminal(nonterminal.to_owned()))
    }

    /// Every production of the grammar, in non-terminal first-seen order.
    pub fn all_productions(&self) -> impl Iterator<Item = &Production> {
        self.nonterminals
            .iter()
            .flat_map(move |nt| self.rules[nt].iter())
    }
}
