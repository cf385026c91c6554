//! `WPF1010` / `WPF1012`: a property whose setter changes a backing field must
//! raise `PropertyChanged`, and must raise it with its own name.
//!
//! Only setters of the change-detecting shape are inspected:
//!
//! ```csharp
//! set
//! {
//!     if (value == this.bar) { return; }
//!     this.bar = value;
//!     this.OnPropertyChanged();
//! }
//! ```
//!
//! A raise inside an instance helper the setter calls counts as the setter's own.
//! Indexers raise with `"Item[]"` (or an empty name). A raise made on another
//! instance notifies for that instance and is ignored here. A raise whose name or
//! receiver cannot be determined is accepted.

use super::Rule;
use crate::context::AnalysisContext;
use crate::invocation_tracer::{self, Receiver};
use tracing::trace;
use wpfa_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use wpfa_common::limits::MAX_TREE_WALK_DEPTH;
use wpfa_common::{Cancelled, Diagnostic};
use wpfa_syntax::framework::names;
use wpfa_syntax::{AccessorKind, BinaryOperator, NodeData, NodeIndex, SymbolId, SymbolKind, SyntaxKind};

const EQUALS: &str = "Equals";
const REFERENCE_EQUALS: &str = "ReferenceEquals";

pub struct PropertyNotifies;

impl Rule for PropertyNotifies {
    fn name(&self) -> &'static str {
        "property-notifies"
    }

    fn codes(&self) -> &'static [&'static str] {
        &[
            diagnostic_codes::PROPERTY_MUST_NOTIFY,
            diagnostic_codes::PROPERTY_MUST_NOTIFY_WITH_OWN_NAME,
        ]
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::PropertyDeclaration, SyntaxKind::IndexerDeclaration]
    }

    #[tracing::instrument(level = "trace", skip(self, ctx), fields(rule = "property-notifies"))]
    fn check(
        &self,
        ctx: &AnalysisContext<'_>,
        node: NodeIndex,
    ) -> Result<Option<Diagnostic>, Cancelled> {
        ctx.check_cancelled()?;
        let (accessors, is_indexer) = match ctx.data(node) {
            Some(NodeData::PropertyDeclaration { accessors, .. }) => (accessors, false),
            Some(NodeData::IndexerDeclaration { accessors, .. }) => (accessors, true),
            _ => return Ok(None),
        };
        let Some(property) = ctx.declared(node) else {
            return Ok(None);
        };
        let Some(symbol) = ctx.symbol(property) else {
            return Ok(None);
        };
        if symbol.is_static() || !has_property_changed_event(ctx, symbol.containing_type) {
            return Ok(None);
        }
        let Some(setter) = setter_body(ctx, accessors) else {
            return Ok(None);
        };
        let value = symbol.parameters.last().copied();
        if !assigns_field(ctx, setter) || !has_equality_guard(ctx, setter, value) {
            return Ok(None);
        }

        let mut mismatch: Option<(NodeIndex, String)> = None;
        for call in ctx.invocations_in(setter) {
            for site in invocation_tracer::trace_through_helpers(ctx, call)? {
                match site.receiver {
                    Receiver::Other(_) => {
                        trace!(call = ?call, "raise for another instance");
                        continue;
                    }
                    Receiver::Unknown => return Ok(None),
                    Receiver::This => {}
                }
                if !site.confirmed {
                    return Ok(None);
                }
                let Some(raised) = site.name.name() else {
                    return Ok(None);
                };
                if notifies_for(raised, &symbol.name, is_indexer) {
                    return Ok(None);
                }
                if mismatch.is_none() {
                    mismatch = Some((call, raised.to_string()));
                }
            }
        }

        let diagnostic = match mismatch {
            Some((call, raised)) => ctx.model.location(call).map(|location| {
                Diagnostic::new(
                    &diagnostic_messages::PROPERTY_MUST_NOTIFY_WITH_OWN_NAME,
                    location,
                    &[&symbol.name, &raised],
                )
            }),
            None => ctx.model.location(node).map(|location| {
                Diagnostic::new(
                    &diagnostic_messages::PROPERTY_MUST_NOTIFY,
                    location,
                    &[&symbol.name],
                )
            }),
        };
        Ok(diagnostic)
    }
}

fn notifies_for(raised: &str, property: &str, is_indexer: bool) -> bool {
    if is_indexer {
        raised == names::INDEXER_NAME || raised.is_empty()
    } else {
        raised == property
    }
}

fn has_property_changed_event(ctx: &AnalysisContext<'_>, owner: SymbolId) -> bool {
    ctx.model
        .find_members(owner, names::PROPERTY_CHANGED_EVENT)
        .into_iter()
        .any(|member| ctx.is_property_changed_event(member))
}

fn setter_body(ctx: &AnalysisContext<'_>, accessors: &[NodeIndex]) -> Option<NodeIndex> {
    accessors.iter().find_map(|accessor| match ctx.data(*accessor)? {
        NodeData::Accessor {
            kind: AccessorKind::Set,
            body,
        } => body.into_option(),
        _ => None,
    })
}

fn is_field(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> bool {
    ctx.referenced_symbol(expr)
        .is_some_and(|symbol| symbol.kind == SymbolKind::Field)
}

fn assigns_field(ctx: &AnalysisContext<'_>, body: NodeIndex) -> bool {
    ctx.descendants(body).into_iter().any(|idx| {
        matches!(ctx.data(idx), Some(NodeData::Assignment { target, .. }) if is_field(ctx, *target))
    })
}

/// An `if` whose condition compares the incoming value or a field:
/// `value == field`, `!Equals(value, field)`, `ReferenceEquals(field, value)`.
fn has_equality_guard(ctx: &AnalysisContext<'_>, body: NodeIndex, value: Option<SymbolId>) -> bool {
    ctx.descendants(body).into_iter().any(|idx| {
        let Some(NodeData::IfStatement { condition, .. }) = ctx.data(idx) else {
            return false;
        };
        let condition = strip_not(ctx, *condition);
        let is_comparison = match ctx.data(condition) {
            Some(NodeData::BinaryExpression { operator, .. }) => {
                matches!(operator, BinaryOperator::Equals | BinaryOperator::NotEquals)
            }
            Some(NodeData::Invocation { .. }) => ctx
                .referenced_symbol(condition)
                .is_some_and(|method| method.name == EQUALS || method.name == REFERENCE_EQUALS),
            _ => false,
        };
        is_comparison
            && ctx.descendants(condition).into_iter().any(|operand| {
                is_field(ctx, operand)
                    || (value.is_some() && ctx.referenced(operand) == value)
            })
    })
}

fn strip_not(ctx: &AnalysisContext<'_>, mut expr: NodeIndex) -> NodeIndex {
    for _ in 0..MAX_TREE_WALK_DEPTH {
        match ctx.data(expr) {
            Some(NodeData::UnaryNot { operand }) => expr = *operand,
            _ => break,
        }
    }
    expr
}
