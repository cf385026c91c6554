//! The symbol-lookup boundary between the host and the analyzer.
//!
//! The analyzer never parses or type-checks. It reads an already resolved tree
//! through `SemanticModel`. All methods are read-only, so one model can be shared
//! by rules running on many threads.

use crate::base::{NodeIndex, SymbolId, TypeId};
use crate::node::Node;
use crate::symbols::{Symbol, SymbolKind};
use crate::types::TypeData;
use wpfa_common::limits::MAX_BASE_TYPE_DEPTH;
use wpfa_common::{FileId, Location};

/// A source unit of the compilation.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub id: FileId,
    pub path: String,
    pub root: NodeIndex,
    /// Set by the host for designer/tool output.
    pub is_generated: bool,
}

/// Read-only symbol lookup over a type-resolved tree.
pub trait SemanticModel: Send + Sync {
    /// Node for an index; `None` for `NodeIndex::NONE` or unknown indices.
    fn node(&self, idx: NodeIndex) -> Option<&Node>;

    fn file(&self, id: FileId) -> Option<&SourceFile>;

    /// All source units, in a stable order.
    fn files(&self) -> &[SourceFile];

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Symbol declared by a declaration node (declarator, property, method, ...).
    fn declared_symbol(&self, node: NodeIndex) -> Option<SymbolId>;

    /// Symbol an expression refers to. For invocations this is the invoked method.
    fn referenced_symbol(&self, node: NodeIndex) -> Option<SymbolId>;

    /// Type of an expression or of a type syntax node.
    fn type_of(&self, node: NodeIndex) -> Option<TypeId>;

    fn type_data(&self, ty: TypeId) -> Option<&TypeData>;

    /// Source-like rendering of a type.
    fn display_type(&self, ty: TypeId) -> String;
}

impl<'m> dyn SemanticModel + 'm {
    pub fn location(&self, idx: NodeIndex) -> Option<Location> {
        self.node(idx).map(Node::location)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.node(idx).and_then(|node| node.parent.into_option())
    }

    /// Type symbol declaring a named type.
    pub fn type_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        match self.type_data(ty)? {
            TypeData::Named { symbol, .. } => symbol.into_option(),
            _ => None,
        }
    }

    /// The type symbol itself followed by its base types, nearest first.
    pub fn self_and_base_types(&self, type_symbol: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut current = type_symbol;
        while current.is_some() && chain.len() < MAX_BASE_TYPE_DEPTH {
            if chain.contains(&current) {
                break;
            }
            chain.push(current);
            current = self
                .symbol(current)
                .map_or(SymbolId::NONE, |symbol| symbol.base_type);
        }
        chain
    }

    /// True when `derived` is `base` or inherits from it.
    pub fn is_same_or_derived(&self, derived: SymbolId, base: SymbolId) -> bool {
        self.self_and_base_types(derived).contains(&base)
    }

    /// Members named `name` declared on `type_symbol` or any of its base types,
    /// nearest declaration first.
    pub fn find_members(&self, type_symbol: SymbolId, name: &str) -> Vec<SymbolId> {
        let mut found = Vec::new();
        for ty in self.self_and_base_types(type_symbol) {
            let Some(symbol) = self.symbol(ty) else {
                continue;
            };
            found.extend(
                symbol
                    .members
                    .iter()
                    .copied()
                    .filter(|member| self.symbol(*member).is_some_and(|m| m.name == name)),
            );
        }
        found
    }

    /// First member of `kind` on the type or its bases.
    pub fn find_member_of_kind(
        &self,
        type_symbol: SymbolId,
        name: &str,
        kind: SymbolKind,
    ) -> Option<SymbolId> {
        self.find_members(type_symbol, name)
            .into_iter()
            .find(|member| self.symbol(*member).is_some_and(|m| m.kind == kind))
    }

    /// True for a type symbol whose fully qualified name is `full_name`.
    pub fn is_type_named(&self, type_symbol: SymbolId, full_name: &str) -> bool {
        self.symbol(type_symbol)
            .is_some_and(|symbol| symbol.kind == SymbolKind::Type && symbol.full_name() == full_name)
    }

    /// True when `ty` is the named type `full_name` or derives from it.
    pub fn type_is_or_derives_from(&self, ty: TypeId, full_name: &str) -> bool {
        self.type_symbol(ty).is_some_and(|sym| {
            self.self_and_base_types(sym)
                .into_iter()
                .any(|candidate| self.is_type_named(candidate, full_name))
        })
    }
}
