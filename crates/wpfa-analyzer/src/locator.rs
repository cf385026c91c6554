//! Syntax locator: declaring syntax of a symbol, in a deterministic order.
//!
//! A symbol may have several declarations (partial types, partial members).
//! `locate` orders them by source-unit path, then by span start, and callers that
//! need a single site take the first.

use crate::context::AnalysisContext;
use smallvec::SmallVec;
use wpfa_common::{FileId, Location, Span};
use wpfa_syntax::{NodeIndex, SymbolId};

/// A declaring syntax node and where it sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntaxRef {
    pub node: NodeIndex,
    pub location: Location,
}

impl SyntaxRef {
    #[inline]
    pub fn file(&self) -> FileId {
        self.location.file
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.location.span
    }

    /// True when both references are in the same source unit and `self` starts first.
    pub fn precedes_in_same_file(&self, other: &SyntaxRef) -> bool {
        self.file() == other.file() && self.span().precedes(other.span())
    }
}

/// All declaring syntax references of `sym`, ordered by (path, span start).
pub fn locate(ctx: &AnalysisContext<'_>, sym: SymbolId) -> SmallVec<[SyntaxRef; 1]> {
    let Some(symbol) = ctx.symbol(sym) else {
        return SmallVec::new();
    };
    let mut refs: SmallVec<[SyntaxRef; 1]> = symbol
        .declarations
        .iter()
        .filter_map(|decl| {
            ctx.model.location(*decl).map(|location| SyntaxRef {
                node: *decl,
                location,
            })
        })
        .collect();
    refs.sort_by(|a, b| {
        let path_a = ctx.model.file(a.file()).map(|f| f.path.as_str());
        let path_b = ctx.model.file(b.file()).map(|f| f.path.as_str());
        path_a
            .cmp(&path_b)
            .then(a.span().start.cmp(&b.span().start))
    });
    refs
}

/// First declaring syntax reference per the `locate` order.
pub fn first_declaration(ctx: &AnalysisContext<'_>, sym: SymbolId) -> Option<SyntaxRef> {
    locate(ctx, sym).into_iter().next()
}
