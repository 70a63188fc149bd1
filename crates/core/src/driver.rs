//! Table-driven parser: an explicit symbol stack initialized to
//! `[$, start]`, a cursor into the token stream (plus the `$` end
//! marker), and one trace row per step. Failures are recorded into the
//! outcome and stop the machine; they are not raised.

use crate::grammar::{Grammar, END_MARKER};
use crate::table::Ll1Table;
use crate::token::Token;

/// One step of the parse, as persisted in the trace: the stack after
/// the step (space-joined, top last), the remaining input as
/// `TYPE:value` items, and the rule applied or `Accept` or empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TraceRow {
    pub stack: String,
    pub input: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum DriveFailure {
    TerminalMismatch { expected: String, found: String },
    NoRule { nonterminal: String, lookahead: String },
    UnknownSymbol { symbol: String },
}

impl std::fmt::Display for DriveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriveFailure::TerminalMismatch { expected, found } => {
                write!(f, "Error: terminal mismatch: expected '{expected}', found '{found}'")
            }
            DriveFailure::NoRule {
                nonterminal,
                lookahead,
            } => write!(
                f,
                "Error: no rule for nonterminal '{nonterminal}' with token '{lookahead}'"
            ),
            DriveFailure::UnknownSymbol { symbol } => {
                write!(f, "Error: unknown symbol '{symbol}' on stack")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DriveOutcome {
    pub rows: Vec<TraceRow>,
    pub failure: Option<DriveFailure>,
    pub accepted: bool,
}

/// Run the stack machine over the token stream.
pub fn drive(grammar: &Grammar, table: &Ll1Table, tokens: &[Token]) -> DriveOutcome {
    let mut input: Vec<Token> = tokens.to_vec();
    input.push(Token::end());

    let mut stack: Vec<String> = vec![
        END_MARKER.to_owned(),
        grammar.start_symbol().to_owned(),
    ];
    let mut index = 0usize;
    let mut rows: Vec<TraceRow> = Vec::new();
    let mut failure: Option<DriveFailure> = None;

    while let Some(top) = stack.pop() {
        let current = &input[index];
        let mut applied = String::new();

        if top == current.kind {
            // Terminal (or the end marker) matched: consume and advance.
            if top == END_MARKER {
                applied = "Accept".to_owned();
            }
            index += 1;
        } else if grammar.is_terminal(&top) || top == END_MARKER {
            failure = Some(DriveFailure::TerminalMismatch {
                expected: top,
                found: current.kind.clone(),
            });
        } else if grammar.is_nonterminal(&top) {
            match table.lookup(&top, &current.kind) {
                None => {
                    failure = Some(DriveFailure::NoRule {
                        nonterminal: top,
                        lookahead: current.kind.clone(),
                    });
                }
                Some(production) => {
                    applied = production.to_string();
                    if !production.is_epsilon() {
                        stack.extend(production.symbols.iter().rev().cloned());
                    }
                }
            }
        } else {
            failure = Some(DriveFailure::UnknownSymbol { symbol: top });
        }

        let rule = match &failure {
            Some(f) => f.to_string(),
            None => applied,
        };
        rows.push(TraceRow {
            stack: stack.join(" "),
            input: input[index..]
                .iter()
                .map(Token::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            rule,
        });
        if failure.is_some() {
            break;
        }
    }

    let accepted = failure.is_none() && stack.is_empty() && index == input.len();
    DriveOutcome {
        rows,
        failure,
        accepted,
    }
}
