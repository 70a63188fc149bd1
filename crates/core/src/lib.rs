//! ll1-core: LL(1) compiler front end.
//!
//! Given a context-free grammar and a token stream, this crate computes
//! FIRST/FOLLOW sets and an LL(1) decision table, parses the stream two
//! independent ways, and resolves symbols over the resulting tree:
//!
//! - [`Grammar`] -- production rules, non-terminal/terminal classification
//! - [`Analysis`] -- FIRST/FOLLOW fixed-point computation
//! - [`Ll1Table`] -- (non-terminal, lookahead) -> production decision table
//! - [`drive()`] -- table-driven stack machine with a step-by-step trace
//! - [`TreeParser`] -- backtracking descent that builds a [`SyntaxTree`]
//! - [`Resolver`] -- scope-aware symbol extraction into a [`SymbolTable`]
//!
//! The two pipelines share the grammar but do not otherwise interact:
//! grammar -> analysis -> table -> drive is the table-driven verification
//! path; grammar -> tree parser -> resolver is the tree path.
//!
//! Everything is single-threaded and synchronous. Each resolution run
//! owns its `SymbolTable`; concurrent runs need separate table values.

pub mod analysis;
pub mod descent;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod symbols;
pub mod table;
pub mod token;
pub mod tree;

pub use analysis::Analysis;
pub use descent::{LookaheadScorer, ScoreStrategy, TreeParser};
pub use driver::{drive, DriveFailure, DriveOutcome, TraceRow};
pub use error::FrontendError;
pub use grammar::{Grammar, Production, END_MARKER, EPSILON};
pub use symbols::{Resolver, ResolverLabels, Symbol, SymbolKind, SymbolTable, GLOBAL_SCOPE};
pub use table::{Conflict, Ll1Table};
pub use token::{parse_token_stream, Token};
pub use tree::{Node, NodeId, SyntaxTree, EPSILON_LEAF};
