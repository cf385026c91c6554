//! Symbol table.
//!
//! A `Symbol` is a named, typed entity: a type, one of its members, a parameter,
//! or a local. Symbols reference each other only through `SymbolId`, so the graph
//! of "field → initializer → registration call → other field" never forms
//! ownership cycles.

use crate::base::{NodeIndex, SymbolId, TypeId};
use crate::node::{Modifiers, ParameterFlags};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type,
    Field,
    Event,
    Property,
    Indexer,
    Method,
    Constructor,
    Parameter,
    Local,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub modifiers: Modifiers,
    /// Type that declares this symbol; `NONE` for top-level types.
    /// Parameters and locals report the type that declares their member.
    pub containing_type: SymbolId,
    /// Member owning a parameter or local; same as `containing_type` for members.
    pub container: SymbolId,
    /// Declared type. Return type for methods; the declared type itself for types.
    pub ty: TypeId,
    /// Parameters of methods, constructors and indexers. Properties and indexers
    /// carry the implicit setter `value` parameter last.
    pub parameters: Vec<SymbolId>,
    /// Flags of a parameter symbol.
    pub parameter_flags: ParameterFlags,
    /// Position of a parameter symbol in its member's parameter list.
    pub ordinal: u32,
    /// Namespace of a type symbol.
    pub namespace: String,
    /// Direct base type of a type symbol.
    pub base_type: SymbolId,
    /// Members of a type symbol, across all of its declarations.
    pub members: Vec<SymbolId>,
    /// Declaring syntax nodes. Empty for metadata-only symbols.
    pub declarations: SmallVec<[NodeIndex; 1]>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            modifiers: Modifiers::empty(),
            containing_type: SymbolId::NONE,
            container: SymbolId::NONE,
            ty: TypeId::NONE,
            parameters: Vec::new(),
            parameter_flags: ParameterFlags::empty(),
            ordinal: 0,
            namespace: String::new(),
            base_type: SymbolId::NONE,
            members: Vec::new(),
            declarations: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// `static readonly` or `const`: immutable after type initialization.
    pub fn is_static_readonly(&self) -> bool {
        self.modifiers.contains(Modifiers::CONST)
            || self.modifiers.contains(Modifiers::STATIC | Modifiers::READONLY)
    }

    /// Fully qualified name of a type symbol, e.g. `System.Windows.DependencyProperty`.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_method_like(&self) -> bool {
        matches!(self.kind, SymbolKind::Method | SymbolKind::Constructor)
    }
}

/// Arena of symbols, indexed by `SymbolId`.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a symbol; `init` fills in everything except the id.
    pub fn alloc(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        init: impl FnOnce(&mut Symbol),
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        let mut symbol = Symbol::new(id, name, kind);
        init(&mut symbol);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get(id.0 as usize)
        }
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get_mut(id.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}
