//! Typed syntax tree and semantic model for the wpfa analyzer.
//!
//! This crate provides:
//! - Index newtypes (`NodeIndex`, `SymbolId`, `TypeId`)
//! - The arena-backed syntax tree (`NodeArena`, `Node`, `NodeData`)
//! - Symbols and interned types
//! - `SemanticModel`, the read-only lookup boundary rules are written against
//! - `Compilation` and `CompilationBuilder`, an in-memory model for hosts and tests

pub mod base;
pub use base::{NodeIndex, SymbolId, TypeId};

// Syntax tree
pub mod node;
pub use node::{
    AccessorKind, BinaryOperator, LiteralKind, Modifiers, Node, NodeData, ParameterFlags,
    SyntaxKind,
};

pub mod arena;
pub use arena::NodeArena;

// Symbols and types
pub mod symbols;
pub use symbols::{Symbol, SymbolArena, SymbolKind};

pub mod types;
pub use types::{TypeData, TypeTable};

// Semantic model boundary
pub mod model;
pub use model::{SemanticModel, SourceFile};

pub mod framework;
pub use framework::FrameworkSymbols;

// In-memory model
pub mod compilation;
pub use compilation::Compilation;

pub mod builder;
pub use builder::{CompilationBuilder, ParamSpec};

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod builder_tests;
