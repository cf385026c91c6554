//! `WPF1014`: don't raise `PropertyChanged` for a property that does not exist.
//!
//! The name is checked against the type of the instance the event is raised for,
//! which is not the enclosing type for `other.OnPropertyChanged("Value")`.
//! Empty names (all properties changed) and the indexer name are always valid.

use super::Rule;
use crate::context::AnalysisContext;
use crate::invocation_tracer::{self, Receiver};
use tracing::trace;
use wpfa_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use wpfa_common::{Cancelled, Diagnostic};
use wpfa_syntax::framework::names;
use wpfa_syntax::{NodeIndex, SymbolId, SymbolKind, SyntaxKind};

/// Name the compiler passes as `[CallerMemberName]` from inside an indexer.
const INDEXER_MEMBER_NAME: &str = "Item";

pub struct MissingProperty;

impl Rule for MissingProperty {
    fn name(&self) -> &'static str {
        "missing-property"
    }

    fn codes(&self) -> &'static [&'static str] {
        &[diagnostic_codes::DONT_RAISE_CHANGE_FOR_MISSING_PROPERTY]
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::Invocation]
    }

    #[tracing::instrument(level = "trace", skip(self, ctx), fields(rule = "missing-property"))]
    fn check(
        &self,
        ctx: &AnalysisContext<'_>,
        node: NodeIndex,
    ) -> Result<Option<Diagnostic>, Cancelled> {
        let Some(site) = invocation_tracer::trace(ctx, node)? else {
            return Ok(None);
        };
        // Names fixed inside a raiser are reported where the raiser's own event is invoked.
        if !site.confirmed || !site.name_at_call_site {
            return Ok(None);
        }
        let Some(name) = site.name.name() else {
            return Ok(None);
        };
        if name.is_empty() || name == names::INDEXER_NAME {
            return Ok(None);
        }
        let owner = match site.receiver {
            Receiver::This => ctx.enclosing_type(node),
            Receiver::Other(ty) => Some(ty),
            Receiver::Unknown => None,
        };
        let Some(owner) = owner else {
            return Ok(None);
        };
        if has_property(ctx, owner, name) {
            return Ok(None);
        }
        trace!(name, "raised name has no property");

        let Some(owner_symbol) = ctx.symbol(owner) else {
            return Ok(None);
        };
        // The name travels in the event args for `PropertyChanged?.Invoke(this, args)`.
        let name_argument = if ctx.is_property_changed_event(site.target) {
            1
        } else {
            0
        };
        let target = ctx
            .node(node)
            .and_then(|call| call.arguments().get(name_argument).copied())
            .unwrap_or(node);
        let Some(location) = ctx.model.location(target) else {
            return Ok(None);
        };
        let type_name = ctx.model.display_type(owner_symbol.ty);
        Ok(Some(Diagnostic::new(
            &diagnostic_messages::DONT_RAISE_CHANGE_FOR_MISSING_PROPERTY,
            location,
            &[name, &type_name],
        )))
    }
}

fn has_property(ctx: &AnalysisContext<'_>, owner: SymbolId, name: &str) -> bool {
    if ctx
        .model
        .find_member_of_kind(owner, name, SymbolKind::Property)
        .is_some()
    {
        return true;
    }
    name == INDEXER_MEMBER_NAME
        && ctx.model.self_and_base_types(owner).into_iter().any(|ty| {
            ctx.symbol(ty).is_some_and(|symbol| {
                symbol
                    .members
                    .iter()
                    .any(|member| ctx.symbol(*member).is_some_and(|m| m.kind == SymbolKind::Indexer))
            })
        })
}
