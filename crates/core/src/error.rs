/// All errors raised by the LL(1) front end.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrontendError {
    /// A non-blank grammar line that cannot be split into `LHS -> RHS`.
    #[error("malformed grammar line {line}: '{text}'")]
    MalformedGrammar { line: usize, text: String },

    /// A wire token that does not have the `TYPE:value` shape.
    #[error("malformed token '{text}': expected TYPE:value")]
    MalformedToken { text: String },

    /// A referenced non-terminal is not a key of the grammar.
    #[error("unknown non-terminal '{0}'")]
    UnknownNonTerminal(String),

    /// The backtracking parser exhausted every alternative.
    #[error("parse failed: {0}")]
    ParseFailure(String),

    /// A symbol with this name is already declared in the same scope.
    #[error("symbol '{name}' already declared in scope '{scope}'")]
    DuplicateSymbol { name: String, scope: String },

    /// A lookup or type check named a symbol that was never declared.
    #[error("symbol '{0}' is not declared")]
    UndeclaredSymbol(String),

    /// A type check disagreed with the stored symbol kind.
    #[error("type mismatch for '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// A scope was closed (or a local declared) with no scope open.
    #[error("no open scope")]
    ScopeUnderflow,
}
