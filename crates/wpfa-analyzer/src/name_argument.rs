//! Name-argument resolution.
//!
//! A property name reaches a registration or raise call in several surface forms
//! that all denote the same string:
//!
//! ```csharp
//! OnPropertyChanged("Bar");
//! OnPropertyChanged(nameof(Bar));
//! OnPropertyChanged(nameof(this.Bar));
//! OnPropertyChanged(BarName);          // static readonly string BarName = nameof(Bar);
//! PropertyChanged?.Invoke(this, BarArgs); // static readonly PropertyChangedEventArgs BarArgs = new(nameof(Bar));
//! ```
//!
//! Each form reduces to `NameArgument::Resolved` tagged with the form it came from.
//! Anything else (parameters, method calls, concatenation, `null`) is `Unresolved`.
//! The resolver reports `""` for `string.Empty` and the empty literal and leaves it
//! to each rule to decide what an empty name means.

use crate::classifier::field_initializer;
use crate::context::AnalysisContext;
use tracing::trace;
use wpfa_common::limits::MAX_NAME_INDIRECTION;
use wpfa_syntax::{LiteralKind, NodeData, NodeIndex, SymbolKind};

/// Surface form a resolved name came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameForm {
    /// `"Bar"`
    Literal,
    /// `nameof(Bar)` / `nameof(this.Bar)`
    NameOf,
    /// `string.Empty`
    EmptyConstant,
    /// Read of a `static readonly` field initialized with one of the direct forms.
    CachedField,
    /// Omitted `[CallerMemberName]` argument.
    CallerMemberName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameArgument {
    Resolved { name: String, form: NameForm },
    Unresolved,
}

impl NameArgument {
    pub fn resolved(name: impl Into<String>, form: NameForm) -> Self {
        NameArgument::Resolved {
            name: name.into(),
            form,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            NameArgument::Resolved { name, .. } => Some(name),
            NameArgument::Unresolved => None,
        }
    }

    pub fn form(&self) -> Option<NameForm> {
        match self {
            NameArgument::Resolved { form, .. } => Some(*form),
            NameArgument::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, NameArgument::Resolved { .. })
    }

    fn through_cache(self) -> Self {
        match self {
            NameArgument::Resolved { name, .. } => NameArgument::Resolved {
                name,
                form: NameForm::CachedField,
            },
            NameArgument::Unresolved => NameArgument::Unresolved,
        }
    }
}

/// Resolve a string-valued name argument.
pub fn resolve(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> NameArgument {
    resolve_at(ctx, expr, 0)
}

fn resolve_at(ctx: &AnalysisContext<'_>, expr: NodeIndex, depth: u32) -> NameArgument {
    let Some(data) = ctx.data(expr) else {
        return NameArgument::Unresolved;
    };
    match data {
        NodeData::Literal {
            kind: LiteralKind::String,
            text,
        } => NameArgument::resolved(text.as_str(), NameForm::Literal),
        NodeData::NameOf { operand } => name_of_operand(ctx, *operand),
        NodeData::Identifier { .. } | NodeData::MemberAccess { .. } => {
            let Some(sym) = ctx.referenced(expr) else {
                return NameArgument::Unresolved;
            };
            if ctx.is_string_empty(sym) {
                return NameArgument::resolved("", NameForm::EmptyConstant);
            }
            match cached_field_initializer(ctx, sym, depth) {
                Some(init) => resolve_at(ctx, init, depth + 1).through_cache(),
                None => NameArgument::Unresolved,
            }
        }
        _ => NameArgument::Unresolved,
    }
}

/// Resolve a `PropertyChangedEventArgs` argument to the name it carries.
pub fn resolve_event_args(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> NameArgument {
    resolve_event_args_at(ctx, expr, 0)
}

fn resolve_event_args_at(ctx: &AnalysisContext<'_>, expr: NodeIndex, depth: u32) -> NameArgument {
    match ctx.data(expr) {
        Some(NodeData::ObjectCreation { arguments, .. }) => {
            let is_args_ctor = ctx
                .referenced(expr)
                .is_some_and(|ctor| ctx.is_event_args_constructor(ctor));
            match arguments.first() {
                Some(name) if is_args_ctor => resolve_at(ctx, *name, depth),
                _ => NameArgument::Unresolved,
            }
        }
        Some(NodeData::Identifier { .. } | NodeData::MemberAccess { .. }) => {
            let cached = ctx
                .referenced(expr)
                .and_then(|sym| cached_field_initializer(ctx, sym, depth));
            match cached {
                Some(init) => resolve_event_args_at(ctx, init, depth + 1).through_cache(),
                None => NameArgument::Unresolved,
            }
        }
        _ => NameArgument::Unresolved,
    }
}

/// `nameof(x)` / `nameof(a.b.x)` resolve to the last simple name.
fn name_of_operand(ctx: &AnalysisContext<'_>, operand: NodeIndex) -> NameArgument {
    match ctx.data(operand) {
        Some(NodeData::Identifier { name } | NodeData::MemberAccess { name, .. }) => {
            NameArgument::resolved(name.as_str(), NameForm::NameOf)
        }
        _ => NameArgument::Unresolved,
    }
}

/// Initializer of a `static readonly` (or `const`) field, if another hop is allowed.
fn cached_field_initializer(
    ctx: &AnalysisContext<'_>,
    sym: wpfa_syntax::SymbolId,
    depth: u32,
) -> Option<NodeIndex> {
    let symbol = ctx.symbol(sym)?;
    if symbol.kind != SymbolKind::Field || !symbol.is_static_readonly() {
        return None;
    }
    if depth >= MAX_NAME_INDIRECTION {
        trace!(field = %symbol.name, depth, "name indirection limit reached");
        return None;
    }
    field_initializer(ctx, sym)
}
