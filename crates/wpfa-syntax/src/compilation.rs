//! In-memory compilation implementing `SemanticModel`.
//!
//! Hosts that already own a resolved tree implement `SemanticModel` directly.
//! `Compilation` is the bundled implementation, assembled by `CompilationBuilder`.

use crate::arena::NodeArena;
use crate::base::{NodeIndex, SymbolId, TypeId};
use crate::framework::FrameworkSymbols;
use crate::model::{SemanticModel, SourceFile};
use crate::node::Node;
use crate::symbols::{Symbol, SymbolArena};
use crate::types::{TypeData, TypeTable};
use rustc_hash::FxHashMap;
use wpfa_common::FileId;

#[derive(Debug, Default)]
pub struct Compilation {
    pub arena: NodeArena,
    pub symbols: SymbolArena,
    pub types: TypeTable,
    pub files: Vec<SourceFile>,
    pub framework: FrameworkSymbols,
    /// Declaration node → declared symbol.
    pub(crate) declared: FxHashMap<NodeIndex, SymbolId>,
    /// Expression node → referenced (or invoked) symbol.
    pub(crate) references: FxHashMap<NodeIndex, SymbolId>,
    /// Expression / type syntax node → type.
    pub(crate) node_types: FxHashMap<NodeIndex, TypeId>,
}

impl Compilation {
    pub fn file_by_path(&self, path: &str) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.path == path)
    }
}

impl SemanticModel for Compilation {
    fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.arena.get(idx)
    }

    fn file(&self, id: FileId) -> Option<&SourceFile> {
        if id.is_none() {
            None
        } else {
            self.files.get(id.0 as usize)
        }
    }

    fn files(&self) -> &[SourceFile] {
        &self.files
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    fn declared_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.declared.get(&node).copied()
    }

    fn referenced_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.references.get(&node).copied()
    }

    fn type_of(&self, node: NodeIndex) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    fn type_data(&self, ty: TypeId) -> Option<&TypeData> {
        self.types.get(ty)
    }

    fn display_type(&self, ty: TypeId) -> String {
        self.types.display(ty)
    }
}
