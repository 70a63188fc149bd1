//! Backtracking tree parser: grammar-directed recursive descent with no
//! table and no memoization. Alternatives for a non-terminal are ranked
//! by a lookahead-match score before being attempted in order; each
//! attempt works on a local cursor copy, so a failed alternative leaves
//! the position untouched for the next one.

use crate::error::FrontendError;
use crate::grammar::{Grammar, Production, EPSILON};
use crate::token::Token;
use crate::tree::{NodeId, SyntaxTree};
use std::cmp::Reverse;

/// Ranking heuristic over (production, token stream, position). A higher
/// score is attempted first; ties keep grammar order. This is a
/// heuristic, not a disambiguation guarantee: ambiguous grammars may
/// legitimately parse differently under a different strategy.
pub trait ScoreStrategy {
    fn score(&self, production: &Production, tokens: &[Token], at: usize, grammar: &Grammar)
        -> usize;
}

/// Default strategy: greedily count how many of the production's leading
/// symbols can plausibly match consecutive input. A non-terminal always
/// counts as a potential match; a terminal counts only when its name
/// equals the current token's type. The count stops at the first miss.
pub struct LookaheadScorer;

impl ScoreStrategy for LookaheadScorer {
    fn score(
        &self,
        production: &Production,
        tokens: &[Token],
        at: usize,
        grammar: &Grammar,
    ) -> usize {
        let mut matches = 0usize;
        for symbol in &production.symbols {
            match tokens.get(at + matches) {
                Some(token) if grammar.is_nonterminal(symbol) || *symbol == token.kind => {
                    matches += 1;
                }
                _ => break,
            }
        }
        matches
    }
}

pub struct TreeParser<'g> {
    grammar: &'g Grammar,
    scorer: Box<dyn ScoreStrategy>,
    require_full_input: bool,
}

impl<'g> TreeParser<'g> {
    pub fn new(grammar: &'g Grammar) -> TreeParser<'g> {
        TreeParser {
            grammar,
            scorer: Box::new(LookaheadScorer),
            require_full_input: false,
        }
    }

    pub fn with_strategy(mut self, scorer: Box<dyn ScoreStrategy>) -> TreeParser<'g> {
        self.scorer = scorer;
        self
    }

    /// When set, a parse that leaves tokens unconsumed after the root
    /// fails. Off by default (reference behavior).
    pub fn require_full_input(mut self, strict: bool) -> TreeParser<'g> {
        self.require_full_input = strict;
        self
    }

    /// Parse from the grammar's start symbol at position 0.
    pub fn parse(&self, tokens: &[Token]) -> Result<SyntaxTree, FrontendError> {
        self.parse_from(self.grammar.start_symbol(), tokens)
    }

    /// Parse from an explicit start non-terminal.
    pub fn parse_from(&self, start: &str, tokens: &[Token]) -> Result<SyntaxTree, FrontendError> {
        if !self.grammar.is_nonterminal(start) {
            return Err(FrontendError::UnknownNonTerminal(start.to_owned()));
        }
        let mut work = SyntaxTree::new();
        let (root, end) = self
            .parse_nonterminal(&mut work, start, tokens, 0)
            .ok_or_else(|| {
                FrontendError::ParseFailure(format!("no derivation of '{start}' matches the input"))
            })?;
        if self.require_full_input && end != tokens.len() {
            return Err(FrontendError::ParseFailure(format!(
                "{} of {} tokens left unconsumed",
                tokens.len() - end,
                tokens.len()
            )));
        }
        // Abandoned backtracking attempts leave detached nodes in the
        // working arena; rebuild so only the winning derivation remains.
        let mut tree = SyntaxTree::new();
        let new_root = copy_subtree(&work, root, &mut tree);
        tree.set_root(new_root);
        Ok(tree)
    }

    fn parse_nonterminal(
        &self,
        tree: &mut SyntaxTree,
        nonterminal: &str,
        tokens: &[Token],
        at: usize,
    ) -> Option<(NodeId, usize)> {
        let productions = self.grammar.productions(nonterminal).ok()?;

        let mut ranked: Vec<&Production> = productions.iter().collect();
        // Stable sort: equal scores keep grammar order as the tie-break.
        ranked.sort_by_key(|p| Reverse(self.scorer.score(p, tokens, at, self.grammar)));

        for production in ranked {
            if let Some(found) = self.attempt(tree, production, tokens, at) {
                return Some(found);
            }
        }

        // No alternative matched: an epsilon alternative still allows a
        // successful empty match without consuming input.
        if productions.iter().any(Production::is_epsilon) {
            return Some((tree.push(nonterminal, None), at));
        }
        None
    }

    fn attempt(
        &self,
        tree: &mut SyntaxTree,
        production: &Production,
        tokens: &[Token],
        at: usize,
    ) -> Option<(NodeId, usize)> {
        let mut children: Vec<NodeId> = Vec::new();
        let mut cursor = at;

        for symbol in &production.symbols {
            if self.grammar.is_nonterminal(symbol) {
                let (child, next) = self.parse_nonterminal(tree, symbol, tokens, cursor)?;
                children.push(child);
                cursor = next;
            } else if symbol == EPSILON {
                // Contributes no child and consumes no token.
            } else {
                let token = tokens.get(cursor)?;
                if token.kind != *symbol {
                    return None;
                }
                let leaf = tree.push(symbol.as_str(), Some(token.value.clone()));
                children.push(leaf);
                cursor += 1;
            }
        }

        let node = tree.push(production.lhs.as_str(), None);
        for child in children {
            tree.attach(node, child);
        }
        Some((node, cursor))
    }
}

fn copy_subtree(src: &SyntaxTree, id: NodeId, dst: &mut SyntaxTree) -> NodeId {
    let node = src.node(id);
    let copy = dst.push(node.label.clone(), node.value.clone());
    for &child in &node.children {
        let child_copy = copy_subtree(src, child, dst);
        dst.attach(copy, child_copy);
    }
    copy
}
