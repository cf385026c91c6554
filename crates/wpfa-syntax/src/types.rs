//! Interned type descriptions.
//!
//! `int?` and `Nullable<int>` are different `TypeData` values: the first is the
//! `Nullable` shorthand, the second a named generic instantiation. Consumers that
//! want to treat them as the same shape normalize explicitly.

use crate::base::{SymbolId, TypeId};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// A named type, possibly a generic instantiation.
    Named {
        namespace: String,
        name: String,
        args: Vec<TypeId>,
        /// Declaring type symbol (the generic definition for instantiations).
        symbol: SymbolId,
        /// Language keyword alias such as `int` for `System.Int32`.
        keyword: Option<&'static str>,
    },
    /// `T?` shorthand for a nullable value type.
    Nullable(TypeId),
    Array {
        element: TypeId,
        rank: u32,
    },
    Void,
    /// A type the host could not resolve.
    Error,
}

/// Keyword aliases of the predefined types: (keyword, namespace, metadata name).
pub const KEYWORD_TYPES: &[(&str, &str, &str)] = &[
    ("object", "System", "Object"),
    ("string", "System", "String"),
    ("bool", "System", "Boolean"),
    ("byte", "System", "Byte"),
    ("char", "System", "Char"),
    ("short", "System", "Int16"),
    ("int", "System", "Int32"),
    ("long", "System", "Int64"),
    ("float", "System", "Single"),
    ("double", "System", "Double"),
    ("decimal", "System", "Decimal"),
];

/// Deduplicating type table.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeData>,
    lookup: FxHashMap<TypeData, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.lookup.get(&data) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.lookup.insert(data, id);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeData> {
        if id.is_none() {
            None
        } else {
            self.types.get(id.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Source-like rendering: `int`, `int?`, `int[]`, `Nullable<int>`,
    /// `ObservableCollection<int>`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(TypeData::Named {
                name,
                args,
                keyword,
                ..
            }) => {
                if let Some(keyword) = keyword {
                    return (*keyword).to_string();
                }
                if args.is_empty() {
                    return name.clone();
                }
                let args: Vec<String> = args.iter().map(|arg| self.display(*arg)).collect();
                format!("{name}<{}>", args.join(", "))
            }
            Some(TypeData::Nullable(inner)) => format!("{}?", self.display(*inner)),
            Some(TypeData::Array { element, rank }) => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{commas}]", self.display(*element))
            }
            Some(TypeData::Void) => "void".to_string(),
            Some(TypeData::Error) | None => "?".to_string(),
        }
    }
}
