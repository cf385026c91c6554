//! Per-pass analysis context shared by every component.
//!
//! `AnalysisContext` bundles the read-only `SemanticModel` with the host's
//! cancellation token. It holds no mutable state, so a single context can be
//! shared by rules running concurrently over different nodes.

use wpfa_common::limits::MAX_TREE_WALK_DEPTH;
use wpfa_common::{CancellationToken, Cancelled};
use wpfa_syntax::{Node, NodeData, NodeIndex, SemanticModel, Symbol, SymbolId, SyntaxKind, TypeId};

#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub model: &'a dyn SemanticModel,
    pub cancellation: &'a CancellationToken,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(model: &'a dyn SemanticModel, cancellation: &'a CancellationToken) -> Self {
        Self {
            model,
            cancellation,
        }
    }

    #[inline]
    pub fn check_cancelled(&self) -> Result<(), Cancelled> {
        self.cancellation.check()
    }

    // =========================================================================
    // Node access
    // =========================================================================

    pub fn node(&self, idx: NodeIndex) -> Option<&'a Node> {
        self.model.node(idx)
    }

    pub fn data(&self, idx: NodeIndex) -> Option<&'a NodeData> {
        self.model.node(idx).map(|node| &node.data)
    }

    pub fn kind(&self, idx: NodeIndex) -> Option<SyntaxKind> {
        self.model.node(idx).map(Node::kind)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.model.node(idx).and_then(|node| node.parent.into_option())
    }

    /// Nearest ancestor (excluding `idx`) of the given kind.
    pub fn ancestor_of_kind(&self, idx: NodeIndex, kind: SyntaxKind) -> Option<NodeIndex> {
        let mut current = self.parent(idx)?;
        for _ in 0..=MAX_TREE_WALK_DEPTH {
            if self.kind(current) == Some(kind) {
                return Some(current);
            }
            current = self.parent(current)?;
        }
        None
    }

    /// Nearest enclosing member declaration: method, constructor, property or indexer.
    pub fn enclosing_member(&self, idx: NodeIndex) -> Option<NodeIndex> {
        let mut current = self.parent(idx)?;
        for _ in 0..=MAX_TREE_WALK_DEPTH {
            if matches!(
                self.kind(current)?,
                SyntaxKind::MethodDeclaration
                    | SyntaxKind::ConstructorDeclaration
                    | SyntaxKind::PropertyDeclaration
                    | SyntaxKind::IndexerDeclaration
            ) {
                return Some(current);
            }
            current = self.parent(current)?;
        }
        None
    }

    /// Type symbol of the type declaration enclosing `idx`.
    pub fn enclosing_type(&self, idx: NodeIndex) -> Option<SymbolId> {
        let decl = self.ancestor_of_kind(idx, SyntaxKind::TypeDeclaration)?;
        self.model.declared_symbol(decl)
    }

    /// Subtree of `root` in pre-order, root first. Stops descending at
    /// `MAX_TREE_WALK_DEPTH`.
    pub fn descendants(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![(root, 0u32)];
        while let Some((idx, depth)) = stack.pop() {
            let Some(node) = self.node(idx) else {
                continue;
            };
            out.push(idx);
            if depth >= MAX_TREE_WALK_DEPTH {
                continue;
            }
            for child in node.data.children().into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Invocation expressions within `root`, in source order.
    pub fn invocations_in(&self, root: NodeIndex) -> Vec<NodeIndex> {
        self.descendants(root)
            .into_iter()
            .filter(|idx| self.kind(*idx) == Some(SyntaxKind::Invocation))
            .collect()
    }

    // =========================================================================
    // Symbol access
    // =========================================================================

    pub fn symbol(&self, id: SymbolId) -> Option<&'a Symbol> {
        self.model.symbol(id)
    }

    pub fn declared(&self, idx: NodeIndex) -> Option<SymbolId> {
        self.model.declared_symbol(idx)
    }

    pub fn referenced(&self, idx: NodeIndex) -> Option<SymbolId> {
        self.model.referenced_symbol(idx)
    }

    pub fn referenced_symbol(&self, idx: NodeIndex) -> Option<&'a Symbol> {
        self.referenced(idx).and_then(|id| self.symbol(id))
    }

    pub fn type_of(&self, idx: NodeIndex) -> Option<TypeId> {
        self.model.type_of(idx)
    }

    /// Body of a method, constructor or accessor declaration.
    pub fn body_of(&self, decl: NodeIndex) -> Option<NodeIndex> {
        match self.data(decl)? {
            NodeData::MethodDeclaration { body, .. }
            | NodeData::ConstructorDeclaration { body, .. }
            | NodeData::Accessor { body, .. } => body.into_option(),
            _ => None,
        }
    }

    /// Bodies of every source declaration of a method-like symbol.
    pub fn bodies_of(&self, method: SymbolId) -> Vec<NodeIndex> {
        self.symbol(method)
            .map(|symbol| {
                symbol
                    .declarations
                    .iter()
                    .filter_map(|decl| self.body_of(*decl))
                    .collect()
            })
            .unwrap_or_default()
    }
}
