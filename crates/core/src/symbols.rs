//! Scoped symbol table and the tree-walking resolver that fills it.
//!
//! The table is a flat name -> symbol map plus a stack of open scopes,
//! each recording the names declared locally in it; closing a scope
//! removes those names. The resolver is handed its table explicitly --
//! there is no ambient global state, so isolated runs just use separate
//! table values.

use crate::error::FrontendError;
use crate::tree::{NodeId, SyntaxTree};
use std::collections::{HashMap, HashSet};

/// Scope name for top-level declarations.
pub const GLOBAL_SCOPE: &str = "Global";

/// Literal placeholder that value extraction skips.
pub const PLACEHOLDER: &str = "@";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SymbolKind {
    Function,
    Variable,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "Function"),
            SymbolKind::Variable => write!(f, "Variable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub is_function: bool,
    /// Parameter names, functions only.
    pub parameters: Option<Vec<String>>,
    /// Best-effort textual value, extracted from the tree.
    pub value: Option<String>,
    /// `Global` or the enclosing function's name.
    pub scope: String,
}

impl Symbol {
    pub fn function(
        name: impl Into<String>,
        parameters: Vec<String>,
        value: Option<String>,
        scope: impl Into<String>,
    ) -> Symbol {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Function,
            is_function: true,
            parameters: Some(parameters),
            value,
            scope: scope.into(),
        }
    }

    pub fn variable(
        name: impl Into<String>,
        value: Option<String>,
        scope: impl Into<String>,
    ) -> Symbol {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Variable,
            is_function: false,
            parameters: None,
            value,
            scope: scope.into(),
        }
    }
}

/// Flat name -> symbol map with a stack of open named scopes.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    /// Insertion order, for the listing and for deterministic iteration.
    order: Vec<String>,
    /// Open scopes: (scope name, names declared locally in it).
    scopes: Vec<(String, HashSet<String>)>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Add a symbol. A live symbol with the same name in the same scope
    /// is a duplicate; the same name in another scope is replaced.
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), FrontendError> {
        if let Some(existing) = self.symbols.get(&symbol.name) {
            if existing.scope == symbol.scope {
                return Err(FrontendError::DuplicateSymbol {
                    name: symbol.name,
                    scope: symbol.scope,
                });
            }
        } else {
            self.order.push(symbol.name.clone());
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    /// Scope-filtered lookup: the symbol must be owned by `scope`.
    pub fn lookup_in_scope(&self, name: &str, scope: &str) -> Option<&Symbol> {
        self.symbols.get(name).filter(|s| s.scope == scope)
    }

    /// The innermost open scope, or `Global` when none is open.
    pub fn current_scope(&self) -> &str {
        self.scopes
            .last()
            .map(|(name, _)| name.as_str())
            .unwrap_or(GLOBAL_SCOPE)
    }

    /// Open a named scope (entering a function or block).
    pub fn enter_scope(&mut self, name: impl Into<String>) {
        self.scopes.push((name.into(), HashSet::new()));
    }

    /// Close the innermost scope, removing every name declared locally
    /// in it from the table.
    pub fn exit_scope(&mut self) -> Result<(), FrontendError> {
        let (_, locals) = self.scopes.pop().ok_or(FrontendError::ScopeUnderflow)?;
        for name in locals {
            self.symbols.remove(&name);
            self.order.retain(|n| *n != name);
        }
        Ok(())
    }

    /// Declare a variable local to the innermost open scope. The name is
    /// recorded so that `exit_scope` removes it.
    pub fn declare_local(
        &mut self,
        name: &str,
        value: Option<String>,
    ) -> Result<(), FrontendError> {
        if self.scopes.is_empty() {
            return Err(FrontendError::ScopeUnderflow);
        }
        if let Some(existing) = self.symbols.get(name) {
            return Err(FrontendError::DuplicateSymbol {
                name: name.to_owned(),
                scope: existing.scope.clone(),
            });
        }
        let scope = self.current_scope().to_owned();
        let symbol = Symbol::variable(name, value, scope);
        self.order.push(symbol.name.clone());
        let (_, locals) = self.scopes.last_mut().expect("checked non-empty");
        locals.insert(symbol.name.clone());
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Check a stored symbol against an expected kind.
    pub fn check_kind(&self, name: &str, expected: SymbolKind) -> Result<(), FrontendError> {
        let symbol = self
            .lookup(name)
            .ok_or_else(|| FrontendError::UndeclaredSymbol(name.to_owned()))?;
        if symbol.kind != expected {
            return Err(FrontendError::TypeMismatch {
                name: name.to_owned(),
                expected: expected.to_string(),
                found: symbol.kind.to_string(),
            });
        }
        Ok(())
    }

    /// Symbols in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.symbols.get(name))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Human-readable listing: name, type, function flag, parameters or
    /// `N/A`, value or `N/A`, scope. A reporting surface, not a
    /// machine-parsed format.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        out.push_str(&"=".repeat(50));
        out.push('\n');
        out.push_str(&format!("{:^50}\n", "Symbol Table"));
        out.push_str(&"=".repeat(50));
        out.push('\n');
        for symbol in self.iter() {
            out.push_str(&format!("{:<15} {}\n", "Name:", symbol.name));
            out.push_str(&format!("{:<15} {}\n", "Type:", symbol.kind));
            out.push_str(&format!("{:<15} {}\n", "Is function:", symbol.is_function));
            let parameters = match &symbol.parameters {
                Some(p) if !p.is_empty() => p.join(", "),
                _ => "N/A".to_owned(),
            };
            out.push_str(&format!("{:<15} {}\n", "Parameters:", parameters));
            let value = match &symbol.value {
                Some(v) if !v.is_empty() => v.as_str(),
                _ => "N/A",
            };
            out.push_str(&format!("{:<15} {}\n", "Value:", value));
            out.push_str(&format!("{:<15} {}\n", "Scope:", symbol.scope));
            out.push_str(&"-".repeat(50));
            out.push('\n');
        }
        out
    }
}

/// Node labels the resolver reacts to. The defaults match the reference
/// grammar's vocabulary; grammars with other label names configure their
/// own set.
#[derive(Debug, Clone)]
pub struct ResolverLabels {
    pub function: String,
    pub identifier: String,
    pub parameters: String,
    pub statements: String,
    pub return_: String,
    pub assignment: String,
    pub equals: String,
    pub placeholder: String,
}

impl Default for ResolverLabels {
    fn default() -> ResolverLabels {
        ResolverLabels {
            function: "FUNCTION".to_owned(),
            identifier: "IDENTIFIER".to_owned(),
            parameters: "PARAMETERS".to_owned(),
            statements: "STATEMENTS".to_owned(),
            return_: "RETURN".to_owned(),
            assignment: "ASSIGNMENT".to_owned(),
            equals: "EQUALS".to_owned(),
            placeholder: PLACEHOLDER.to_owned(),
        }
    }
}

/// Single depth-first traversal of a syntax tree, registering functions,
/// parameters and variables into an injected `SymbolTable`.
pub struct Resolver {
    labels: ResolverLabels,
}

impl Resolver {
    pub fn new() -> Resolver {
        Resolver {
            labels: ResolverLabels::default(),
        }
    }

    pub fn with_labels(labels: ResolverLabels) -> Resolver {
        Resolver { labels }
    }

    pub fn resolve(
        &self,
        tree: &SyntaxTree,
        table: &mut SymbolTable,
    ) -> Result<(), FrontendError> {
        self.visit(tree, tree.root(), GLOBAL_SCOPE, table)
    }

    fn visit(
        &self,
        tree: &SyntaxTree,
        id: NodeId,
        scope: &str,
        table: &mut SymbolTable,
    ) -> Result<(), FrontendError> {
        let node = tree.node(id);
        if node.label == self.labels.function {
            return self.visit_function(tree, id, scope, table);
        }
        if node.label == self.labels.assignment {
            self.visit_assignment(tree, id, scope, table)?;
        }
        for &child in &node.children {
            self.visit(tree, child, scope, table)?;
        }
        Ok(())
    }

    /// Function construct: register the function once in the enclosing
    /// scope, register its parameters in its own scope, then walk the
    /// statement list with the function's name as the active scope.
    fn visit_function(
        &self,
        tree: &SyntaxTree,
        id: NodeId,
        scope: &str,
        table: &mut SymbolTable,
    ) -> Result<(), FrontendError> {
        let Some(name) = self
            .find_node(tree, id, &self.labels.identifier)
            .and_then(|n| tree.node(n).value.clone())
        else {
            // A function construct without an identifier leaf registers
            // nothing; its children are still traversed.
            for &child in &tree.node(id).children {
                self.visit(tree, child, scope, table)?;
            }
            return Ok(());
        };

        let value = self.find_return_value(tree, id);
        let parameters = self
            .find_node(tree, id, &self.labels.parameters)
            .map(|p| self.collect_identifiers(tree, p))
            .unwrap_or_default();

        if table.lookup(&name).is_none() {
            table.insert(Symbol::function(name.as_str(), parameters.clone(), value, scope))?;
        }
        for parameter in &parameters {
            if table.lookup(parameter).is_none() {
                table.insert(Symbol::variable(parameter.as_str(), None, name.as_str()))?;
            }
        }

        if let Some(statements) = self.find_node(tree, id, &self.labels.statements) {
            table.enter_scope(name.as_str());
            for &child in &tree.node(statements).children {
                self.visit(tree, child, &name, table)?;
            }
            table.exit_scope()?;
        }
        Ok(())
    }

    /// Assignment construct: a new identifier registers a variable in
    /// the active scope; an existing one gets its value updated in place.
    fn visit_assignment(
        &self,
        tree: &SyntaxTree,
        id: NodeId,
        scope: &str,
        table: &mut SymbolTable,
    ) -> Result<(), FrontendError> {
        let Some(name) = self
            .find_node(tree, id, &self.labels.identifier)
            .and_then(|n| tree.node(n).value.clone())
        else {
            return Ok(());
        };
        let value = self.assignment_value(tree, id);

        match table.lookup_mut(&name) {
            Some(existing) => existing.value = Some(value),
            None => table.insert(Symbol::variable(name.as_str(), Some(value), scope))?,
        }
        Ok(())
    }

    /// First node labeled `label`, checking the node itself before its
    /// children, depth-first.
    fn find_node(&self, tree: &SyntaxTree, id: NodeId, label: &str) -> Option<NodeId> {
        let node = tree.node(id);
        if node.label == label {
            return Some(id);
        }
        node.children
            .iter()
            .find_map(|&child| self.find_node(tree, child, label))
    }

    /// Every identifier-labeled descendant's value, in document order.
    fn collect_identifiers(&self, tree: &SyntaxTree, id: NodeId) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_identifiers_into(tree, id, &mut out);
        out
    }

    fn collect_identifiers_into(&self, tree: &SyntaxTree, id: NodeId, out: &mut Vec<String>) {
        let node = tree.node(id);
        if node.label == self.labels.identifier {
            if let Some(value) = &node.value {
                out.push(value.clone());
            }
        }
        for &child in &node.children {
            self.collect_identifiers_into(tree, child, out);
        }
    }

    /// Concatenated literal values of a subtree, depth-first, skipping
    /// the placeholder marker. A textual reconstruction, not an
    /// evaluator; its exact ordering is a compatibility contract.
    fn render_descendant_literals(&self, tree: &SyntaxTree, id: NodeId, out: &mut String) {
        let node = tree.node(id);
        if let Some(value) = &node.value {
            if value != &self.labels.placeholder {
                out.push_str(value);
            }
        }
        for &child in &node.children {
            self.render_descendant_literals(tree, child, out);
        }
    }

    /// Concatenated literals of every sibling following `id`.
    fn following_sibling_literals(&self, tree: &SyntaxTree, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(parent) = tree.node(id).parent {
            let siblings = &tree.node(parent).children;
            let position = siblings.iter().position(|&c| c == id);
            if let Some(position) = position {
                for &sibling in &siblings[position + 1..] {
                    self.render_descendant_literals(tree, sibling, &mut out);
                }
            }
        }
        out
    }

    /// Locate a return construct among the descendants and render what
    /// follows it. An empty rendering keeps the search going, matching
    /// the reference behavior.
    fn find_return_value(&self, tree: &SyntaxTree, id: NodeId) -> Option<String> {
        let node = tree.node(id);
        if node.label == self.labels.return_ {
            let rendered = self.following_sibling_literals(tree, id);
            return if rendered.is_empty() {
                None
            } else {
                Some(rendered)
            };
        }
        node.children
            .iter()
            .find_map(|&child| self.find_return_value(tree, child))
    }

    /// Concatenated literals of everything after the equals-sign node
    /// inside an assignment construct.
    fn assignment_value(&self, tree: &SyntaxTree, id: NodeId) -> String {
        match self.find_node(tree, id, &self.labels.equals) {
            Some(equals) => self.following_sibling_literals(tree, equals),
            None => String::new(),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}
