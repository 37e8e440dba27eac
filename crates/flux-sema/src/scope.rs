//! Scope tree and symbol table.
//!
//! Scopes live in an arena indexed by [`ScopeId`]; a child refers to its
//! parent by index, never by an owning link. Lookup walks from the given
//! scope outward; insertion targets a single scope and rejects duplicates.

use std::collections::HashMap;

use flux_ast::ast::Visibility;
use flux_ast::span::SourceLocation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Struct,
    Class,
    Enum,
    Trait,
    TypeAlias,
    GenericParam,
    Module,
    EnumVariant,
}

/// A scope-resident record describing a bound name.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    pub qualified_name: String,
    pub loc: SourceLocation,
    pub vis: Visibility,

    // For variables
    pub is_mutable: bool,
    pub is_const: bool,
    /// The declared type rendered as a string, empty when unknown.
    pub type_name: String,

    // For functions
    pub param_types: Vec<String>,
    pub return_type: String,
    pub is_async: bool,

    // For generic types
    pub generic_params: Vec<String>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            qualified_name: name.clone(),
            name,
            loc: SourceLocation::unknown(),
            vis: Visibility::Public,
            is_mutable: false,
            is_const: false,
            type_name: String::new(),
            param_types: Vec::new(),
            return_type: String::new(),
            is_async: false,
            generic_params: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

/// The scope hierarchy for one compilation, rooted at a global scope.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                name: "global".to_string(),
                parent: None,
                children: Vec::new(),
                symbols: HashMap::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Create a child scope and return its id.
    pub fn push_scope(&mut self, name: impl Into<String>, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            symbols: HashMap::new(),
        });
        self.scopes[parent.0].children.push(id);
        id
    }

    /// Insert into a single scope. Returns false (and leaves the existing
    /// binding untouched) when the name is already taken there.
    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> bool {
        let symbols = &mut self.scopes[scope.0].symbols;
        if symbols.contains_key(&symbol.name) {
            return false;
        }
        symbols.insert(symbol.name.clone(), symbol);
        true
    }

    /// Look up a name in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.0].symbols.get(name)
    }

    /// Look up a name walking from `scope` out to the root.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.scopes[id.0].symbols.get(name) {
                return Some(symbol);
            }
            current = self.scopes[id.0].parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let inner = tree.push_scope("f", root);

        assert!(tree.insert(root, Symbol::new(SymbolKind::Function, "outer")));
        assert!(tree.insert(inner, Symbol::new(SymbolKind::Variable, "x")));

        assert!(tree.lookup(inner, "outer").is_some());
        assert!(tree.lookup(inner, "x").is_some());
        assert!(tree.lookup(root, "x").is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = ScopeTree::new();
        let root = tree.root();

        let mut first = Symbol::new(SymbolKind::Function, "f");
        first.return_type = "Int32".to_string();
        assert!(tree.insert(root, first));
        assert!(!tree.insert(root, Symbol::new(SymbolKind::Struct, "f")));

        // The original binding survives.
        let sym = tree.lookup(root, "f").unwrap();
        assert_eq!(sym.kind, SymbolKind::Function);
        assert_eq!(sym.return_type, "Int32");
    }

    #[test]
    fn child_scope_is_a_fresh_namespace() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let inner = tree.push_scope("block", root);

        assert!(tree.insert(root, Symbol::new(SymbolKind::Variable, "x")));
        assert!(tree.insert(inner, Symbol::new(SymbolKind::Variable, "x")));
        assert!(tree.lookup_local(inner, "x").is_some());
        assert_eq!(tree.scope(inner).parent, Some(root));
    }
}
