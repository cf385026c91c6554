//! `WPF0031`: a `DependencyPropertyKey` field must be declared before the
//! `DependencyProperty` field derived from it.
//!
//! Static fields initialize in textual order, so a descriptor declared above its
//! key reads the key while it is still `null`. Only fields of the same type in the
//! same source unit can be ordered; anything else is out of reach.

use super::Rule;
use crate::classifier;
use crate::context::AnalysisContext;
use crate::locator::first_declaration;
use tracing::trace;
use wpfa_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use wpfa_common::{Cancelled, Diagnostic};
use wpfa_syntax::{NodeData, NodeIndex, SyntaxKind};

pub struct FieldOrder;

impl Rule for FieldOrder {
    fn name(&self) -> &'static str {
        "field-order"
    }

    fn codes(&self) -> &'static [&'static str] {
        &[diagnostic_codes::KEY_FIELD_MUST_COME_BEFORE_PROPERTY_FIELD]
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::FieldDeclaration]
    }

    #[tracing::instrument(level = "trace", skip(self, ctx), fields(rule = "field-order"))]
    fn check(
        &self,
        ctx: &AnalysisContext<'_>,
        node: NodeIndex,
    ) -> Result<Option<Diagnostic>, Cancelled> {
        ctx.check_cancelled()?;
        let Some(NodeData::FieldDeclaration { declarators, .. }) = ctx.data(node) else {
            return Ok(None);
        };

        for &declarator in declarators {
            let Some(field) = ctx.declared(declarator) else {
                continue;
            };
            let Some(info) = classifier::as_descriptor_info(ctx, field) else {
                continue;
            };
            let Some(key) = info.key_field else {
                continue;
            };
            let (Some(field_symbol), Some(key_symbol)) = (ctx.symbol(field), ctx.symbol(key))
            else {
                continue;
            };
            if field_symbol.containing_type != key_symbol.containing_type {
                continue;
            }
            let (Some(field_ref), Some(key_ref)) =
                (first_declaration(ctx, field), first_declaration(ctx, key))
            else {
                continue;
            };
            if field_ref.file() != key_ref.file() {
                trace!(field = %field_symbol.name, key = %key_symbol.name, "key declared in another source unit");
                continue;
            }
            if key_ref.precedes_in_same_file(&field_ref) {
                continue;
            }

            let Some(location) = ctx.model.location(node) else {
                continue;
            };
            return Ok(Some(Diagnostic::new(
                &diagnostic_messages::KEY_FIELD_MUST_COME_BEFORE_PROPERTY_FIELD,
                location,
                &[&key_symbol.name, &field_symbol.name],
            )));
        }
        Ok(None)
    }
}
