//! `WPF0012` / `WPF0013`: the CLR accessors of a dependency property must use the
//! type passed to its registration.
//!
//! ```csharp
//! public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
//!     nameof(Bar), typeof(bool), typeof(FooControl));   // WPF0012 at typeof(bool)
//!
//! public string Bar
//! {
//!     get => (string)this.GetValue(BarProperty);
//!     set => this.SetValue(BarProperty, value);
//! }
//! ```
//!
//! `int?` and `Nullable<int>` both match a registered `int`; arrays match when
//! their element types do.

use super::Rule;
use crate::classifier::{self, AccessorPair, RegistrationInfo};
use crate::context::AnalysisContext;
use tracing::trace;
use wpfa_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use wpfa_common::limits::MAX_TREE_WALK_DEPTH;
use wpfa_common::{Cancelled, Diagnostic, DiagnosticMessage};
use wpfa_syntax::{NodeIndex, SyntaxKind, TypeData, TypeId};

pub struct RegisteredType;

impl Rule for RegisteredType {
    fn name(&self) -> &'static str {
        "registered-type"
    }

    fn codes(&self) -> &'static [&'static str] {
        &[
            diagnostic_codes::CLR_PROPERTY_MUST_MATCH_REGISTERED_TYPE,
            diagnostic_codes::CLR_METHOD_MUST_MATCH_REGISTERED_TYPE,
        ]
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::Invocation]
    }

    #[tracing::instrument(level = "trace", skip(self, ctx), fields(rule = "registered-type"))]
    fn check(
        &self,
        ctx: &AnalysisContext<'_>,
        node: NodeIndex,
    ) -> Result<Option<Diagnostic>, Cancelled> {
        ctx.check_cancelled()?;
        let Some(registration) = classifier::registration_of(ctx, node) else {
            return Ok(None);
        };
        let Some(field) = classifier::registered_field(ctx, node) else {
            trace!("registration does not initialize a field");
            return Ok(None);
        };
        let (descriptor, key) = if classifier::is_key_candidate(ctx, field) {
            (classifier::descriptor_for_key(ctx, field), Some(field))
        } else {
            (Some(field), None)
        };
        let Some(owner) = ctx.symbol(field).map(|symbol| symbol.containing_type) else {
            return Ok(None);
        };

        let accessors = classifier::find_accessors(ctx, owner, descriptor, key, Some(&registration))?;
        if accessors.is_empty() {
            return Ok(None);
        }
        Ok(first_mismatch(ctx, &registration, &accessors)
            .and_then(|(message, accessor_type)| report(ctx, &registration, message, accessor_type)))
    }
}

/// First accessor whose type differs from the registered type: the CLR property,
/// then the attached getter's return type, then the attached setter's value type.
fn first_mismatch(
    ctx: &AnalysisContext<'_>,
    registration: &RegistrationInfo,
    accessors: &AccessorPair,
) -> Option<(&'static DiagnosticMessage, TypeId)> {
    let registered = registration.registered_type;
    let property_type = accessors
        .property
        .and_then(|property| ctx.symbol(property))
        .map(|symbol| symbol.ty);
    if let Some(ty) = property_type
        && !same_type(ctx, registered, ty)
    {
        return Some((&diagnostic_messages::CLR_PROPERTY_MUST_MATCH_REGISTERED_TYPE, ty));
    }

    let getter_type = accessors
        .getter
        .and_then(|getter| ctx.symbol(getter))
        .map(|symbol| symbol.ty);
    let setter_type = accessors
        .setter
        .and_then(|setter| classifier::setter_value_type(ctx, setter));
    [getter_type, setter_type]
        .into_iter()
        .flatten()
        .find(|ty| !same_type(ctx, registered, *ty))
        .map(|ty| (&diagnostic_messages::CLR_METHOD_MUST_MATCH_REGISTERED_TYPE, ty))
}

fn report(
    ctx: &AnalysisContext<'_>,
    registration: &RegistrationInfo,
    message: &'static DiagnosticMessage,
    accessor_type: TypeId,
) -> Option<Diagnostic> {
    let location = ctx.model.location(registration.registered_type_node)?;
    let registered = ctx.model.display_type(registration.registered_type);
    let accessor = ctx.model.display_type(accessor_type);
    Some(Diagnostic::new(message, location, &[&registered, &accessor]))
}

// =============================================================================
// Type shape comparison
// =============================================================================

/// Types match after stripping nullable wrappers at every level. Unresolved types
/// never mismatch.
fn same_type(ctx: &AnalysisContext<'_>, registered: TypeId, accessor: TypeId) -> bool {
    same_shape(ctx, registered, accessor, 0)
}

fn same_shape(ctx: &AnalysisContext<'_>, a: TypeId, b: TypeId, depth: u32) -> bool {
    if depth > MAX_TREE_WALK_DEPTH {
        return true;
    }
    let (a, b) = (strip_nullable(ctx, a), strip_nullable(ctx, b));
    if a == b {
        return true;
    }
    let (Some(left), Some(right)) = (ctx.model.type_data(a), ctx.model.type_data(b)) else {
        return true;
    };
    match (left, right) {
        (TypeData::Error, _) | (_, TypeData::Error) => true,
        (
            TypeData::Array {
                element: left_element,
                rank: left_rank,
            },
            TypeData::Array {
                element: right_element,
                rank: right_rank,
            },
        ) => left_rank == right_rank && same_shape(ctx, *left_element, *right_element, depth + 1),
        (
            TypeData::Named {
                namespace: left_ns,
                name: left_name,
                args: left_args,
                ..
            },
            TypeData::Named {
                namespace: right_ns,
                name: right_name,
                args: right_args,
                ..
            },
        ) => {
            left_ns == right_ns
                && left_name == right_name
                && left_args.len() == right_args.len()
                && left_args
                    .iter()
                    .zip(right_args)
                    .all(|(l, r)| same_shape(ctx, *l, *r, depth + 1))
        }
        _ => false,
    }
}

/// `T?` and `Nullable<T>` reduce to `T`.
fn strip_nullable(ctx: &AnalysisContext<'_>, ty: TypeId) -> TypeId {
    match ctx.model.type_data(ty) {
        Some(TypeData::Nullable(inner)) => *inner,
        Some(TypeData::Named { args, symbol, .. })
            if args.len() == 1 && ctx.is_nullable_definition(*symbol) =>
        {
            args[0]
        }
        _ => ty,
    }
}
