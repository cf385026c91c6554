//! Invocation tracer: confirms that a call raises `PropertyChanged`.
//!
//! Recognized raise forms:
//!
//! ```csharp
//! this.PropertyChanged?.Invoke(this, new PropertyChangedEventArgs(nameof(Bar)));
//! PropertyChanged(this, e);
//!
//! var handler = this.PropertyChanged;
//! handler?.Invoke(this, e);   // or handler(this, e)
//!
//! this.OnPropertyChanged();   // raiser in this type or a base type
//! other.OnPropertyChanged(nameof(Other.Value));
//! ```
//!
//! A raiser is a method whose body invokes the event or forwards its name parameter
//! to another raiser. Other instance helpers in this type or a base type are
//! entered by `trace_through_helpers`, at most `MAX_RAISER_HOPS` deep.

use crate::classifier::{self, NameSource};
use crate::context::AnalysisContext;
use crate::name_argument::{self, NameArgument, NameForm};
use rustc_hash::FxHashSet;
use tracing::trace;
use wpfa_common::Cancelled;
use wpfa_common::limits::MAX_RAISER_HOPS;
use wpfa_syntax::framework::names;
use wpfa_syntax::{NodeData, NodeIndex, ParameterFlags, SymbolId, SymbolKind};

/// Instance a raise is made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// `this`, `base`, or an implicit receiver.
    This,
    /// Another instance, of the given type.
    Other(SymbolId),
    /// The receiver's type could not be determined.
    Unknown,
}

#[derive(Clone, Debug)]
pub struct RaiseSite {
    pub invocation: NodeIndex,
    /// The raiser method, or the event for a direct event invocation.
    pub target: SymbolId,
    pub name: NameArgument,
    /// True when the name was resolved from this call's own arguments (or the
    /// calling member), false when fixed inside the raiser's body.
    pub name_at_call_site: bool,
    pub receiver: Receiver,
    /// Set once the event invocation behind this call has been found.
    pub confirmed: bool,
}

/// A direct invocation of the `PropertyChanged` event.
#[derive(Clone, Copy, Debug)]
pub struct EventInvocation {
    pub event: SymbolId,
    /// The `PropertyChangedEventArgs` argument (`NONE` when missing).
    pub args: NodeIndex,
    pub receiver: Receiver,
}

/// Trace an invocation to a raise of `PropertyChanged`.
///
/// Returns `None` when the call is not a raise. Metadata-only helpers on a type
/// that has the event cannot be confirmed and come back with `confirmed: false`.
pub fn trace(ctx: &AnalysisContext<'_>, call: NodeIndex) -> Result<Option<RaiseSite>, Cancelled> {
    ctx.check_cancelled()?;

    if let Some(event) = event_invocation(ctx, call) {
        let name = if event.args.is_some() {
            name_argument::resolve_event_args(ctx, event.args)
        } else {
            NameArgument::Unresolved
        };
        return Ok(Some(RaiseSite {
            invocation: call,
            target: event.event,
            name,
            name_at_call_site: true,
            receiver: event.receiver,
            confirmed: true,
        }));
    }

    let Some(NodeData::Invocation { callee, .. }) = ctx.data(call) else {
        return Ok(None);
    };
    let Some(method) = ctx.referenced(call) else {
        return Ok(None);
    };
    let Some(symbol) = ctx.symbol(method) else {
        return Ok(None);
    };
    if symbol.kind != SymbolKind::Method {
        return Ok(None);
    }
    let receiver = call_receiver(ctx, *callee);

    let Some(raiser) = classifier::as_raiser_info(ctx, method)? else {
        if symbol.declarations.is_empty() && is_unconfirmable_raiser(ctx, method) {
            trace!(method = %symbol.name, "raiser without source, unconfirmed");
            return Ok(Some(RaiseSite {
                invocation: call,
                target: method,
                name: NameArgument::Unresolved,
                name_at_call_site: true,
                receiver,
                confirmed: false,
            }));
        }
        return Ok(None);
    };
    trace!(method = %symbol.name, "call reaches raiser");

    let (name, name_at_call_site) = match raiser.name_source {
        NameSource::Fixed(name) => (name, false),
        NameSource::Parameter(param) => (argument_name(ctx, call, method, param), true),
    };
    Ok(Some(RaiseSite {
        invocation: call,
        target: method,
        name,
        name_at_call_site,
        receiver,
        confirmed: true,
    }))
}

/// Recognize `PropertyChanged?.Invoke(...)`, `PropertyChanged(...)` and the same
/// through a local copy of the event.
pub fn event_invocation(ctx: &AnalysisContext<'_>, call: NodeIndex) -> Option<EventInvocation> {
    let NodeData::Invocation { callee, arguments } = ctx.data(call)? else {
        return None;
    };
    let invoked = ctx.referenced(call)?;
    if !ctx.is_handler_invoke(invoked) {
        return None;
    }
    // `x.Invoke(...)` binds the member access to `Invoke`; `x(...)` binds the delegate.
    let handler = match ctx.data(*callee)? {
        NodeData::MemberAccess { target, .. } if ctx.referenced(*callee) == Some(invoked) => {
            *target
        }
        _ => *callee,
    };
    let (event, receiver) = event_source(ctx, handler)?;
    Some(EventInvocation {
        event,
        args: arguments.get(1).copied().unwrap_or(NodeIndex::NONE),
        receiver,
    })
}

/// The event a handler expression reads: directly, or through a local initialized
/// from the event.
fn event_source(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> Option<(SymbolId, Receiver)> {
    let sym = ctx.referenced(expr)?;
    if ctx.is_property_changed_event(sym) {
        return Some((sym, access_receiver(ctx, expr)));
    }
    let local = ctx.symbol(sym)?;
    if local.kind != SymbolKind::Local {
        return None;
    }
    let decl = *local.declarations.first()?;
    let NodeData::LocalDeclaration { initializer, .. } = ctx.data(decl)? else {
        return None;
    };
    let event = ctx.referenced(*initializer)?;
    ctx.is_property_changed_event(event)
        .then(|| (event, access_receiver(ctx, *initializer)))
}

/// Receiver of a member read: `this.X`/`base.X`/`X` are this instance.
fn access_receiver(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> Receiver {
    match ctx.data(expr) {
        Some(NodeData::Identifier { .. }) => Receiver::This,
        Some(NodeData::MemberAccess { target, .. }) => instance_receiver(ctx, *target),
        _ => Receiver::Unknown,
    }
}

/// Receiver of a call through its callee.
pub(crate) fn call_receiver(ctx: &AnalysisContext<'_>, callee: NodeIndex) -> Receiver {
    access_receiver(ctx, callee)
}

fn instance_receiver(ctx: &AnalysisContext<'_>, target: NodeIndex) -> Receiver {
    match ctx.data(target) {
        Some(NodeData::ThisExpression | NodeData::BaseExpression) => Receiver::This,
        Some(_) => ctx
            .type_of(target)
            .and_then(|ty| ctx.model.type_symbol(ty))
            .map_or(Receiver::Unknown, Receiver::Other),
        None => Receiver::Unknown,
    }
}

/// Argument node passed for `param` of `method` at `call`.
pub(crate) fn argument_for(
    ctx: &AnalysisContext<'_>,
    call: NodeIndex,
    method: SymbolId,
    param: SymbolId,
) -> Option<NodeIndex> {
    let node = ctx.node(call)?;
    let mut ordinal = ctx.symbol(param)?.ordinal as usize;
    // Extension methods called with instance syntax pass the receiver as `this`.
    let is_extension = ctx
        .symbol(method)
        .and_then(|m| m.parameters.first())
        .and_then(|first| ctx.symbol(*first))
        .is_some_and(|first| first.parameter_flags.contains(ParameterFlags::THIS));
    if is_extension {
        if let NodeData::Invocation { callee, .. } = &node.data
            && matches!(ctx.data(*callee), Some(NodeData::MemberAccess { .. }))
        {
            ordinal = ordinal.saturating_sub(1);
        }
    }
    node.arguments().get(ordinal).copied()
}

/// Name passed for `param` at `call`, or the calling member's name for an omitted
/// `[CallerMemberName]` argument.
fn argument_name(
    ctx: &AnalysisContext<'_>,
    call: NodeIndex,
    method: SymbolId,
    param: SymbolId,
) -> NameArgument {
    let Some(param_symbol) = ctx.symbol(param) else {
        return NameArgument::Unresolved;
    };
    match argument_for(ctx, call, method, param) {
        Some(arg) if ctx.is_event_args_type(param_symbol.ty) => {
            name_argument::resolve_event_args(ctx, arg)
        }
        Some(arg) => name_argument::resolve(ctx, arg),
        None if param_symbol
            .parameter_flags
            .contains(ParameterFlags::CALLER_MEMBER_NAME) =>
        {
            caller_member_name(ctx, call)
        }
        None => NameArgument::Unresolved,
    }
}

/// Name the compiler supplies for `[CallerMemberName]` at `call`.
fn caller_member_name(ctx: &AnalysisContext<'_>, call: NodeIndex) -> NameArgument {
    let Some(member) = ctx.enclosing_member(call) else {
        return NameArgument::Unresolved;
    };
    match ctx.data(member) {
        Some(NodeData::IndexerDeclaration { .. }) => {
            NameArgument::resolved("Item", NameForm::CallerMemberName)
        }
        Some(NodeData::ConstructorDeclaration { .. }) => {
            NameArgument::resolved(".ctor", NameForm::CallerMemberName)
        }
        _ => match ctx.declared(member).and_then(|sym| ctx.symbol(sym)) {
            Some(symbol) => NameArgument::resolved(symbol.name.as_str(), NameForm::CallerMemberName),
            None => NameArgument::Unresolved,
        },
    }
}

/// A metadata-only method taking a name or event args, declared on a type that has
/// a `PropertyChanged` event.
fn is_unconfirmable_raiser(ctx: &AnalysisContext<'_>, method: SymbolId) -> bool {
    let Some(symbol) = ctx.symbol(method) else {
        return false;
    };
    let takes_name = symbol.parameters.iter().any(|param| {
        ctx.symbol(*param)
            .is_some_and(|p| ctx.is_string_type(p.ty) || ctx.is_event_args_type(p.ty))
    });
    takes_name
        && ctx
            .model
            .find_members(symbol.containing_type, names::PROPERTY_CHANGED_EVENT)
            .into_iter()
            .any(|member| ctx.is_property_changed_event(member))
}

// =============================================================================
// Helper hops
// =============================================================================

/// Raises reached from `call`: the call itself when it is a raise, otherwise the
/// raises made inside the instance helper it calls.
///
/// ```csharp
/// set { if (value == this.bar) return; this.bar = value; this.UpdateBar(); }
/// private void UpdateBar() => this.OnPropertyChanged(nameof(Bar));
/// ```
///
/// Entering a helper is one hop. A helper past `MAX_RAISER_HOPS` that may still
/// raise comes back as a single unconfirmed site.
pub fn trace_through_helpers(
    ctx: &AnalysisContext<'_>,
    call: NodeIndex,
) -> Result<Vec<RaiseSite>, Cancelled> {
    let mut sites = Vec::new();
    let mut entered = FxHashSet::default();
    collect_raises(ctx, call, MAX_RAISER_HOPS, &mut entered, &mut sites)?;
    Ok(sites)
}

fn collect_raises(
    ctx: &AnalysisContext<'_>,
    call: NodeIndex,
    hops: u32,
    entered: &mut FxHashSet<SymbolId>,
    sites: &mut Vec<RaiseSite>,
) -> Result<(), Cancelled> {
    if let Some(site) = trace(ctx, call)? {
        sites.push(site);
        return Ok(());
    }
    let Some(helper) = instance_helper(ctx, call) else {
        return Ok(());
    };
    if !entered.insert(helper) {
        return Ok(());
    }
    if hops == 0 {
        if may_raise(ctx, helper)? {
            trace!(call = ?call, "raiser hop limit reached, unconfirmed");
            sites.push(RaiseSite {
                invocation: call,
                target: helper,
                name: NameArgument::Unresolved,
                name_at_call_site: false,
                receiver: Receiver::This,
                confirmed: false,
            });
        }
        return Ok(());
    }
    for body in ctx.bodies_of(helper) {
        for inner in ctx.invocations_in(body) {
            collect_raises(ctx, inner, hops - 1, entered, sites)?;
        }
    }
    Ok(())
}

/// Instance method with a body, called on this instance and declared in the
/// calling type or one of its base types.
fn instance_helper(ctx: &AnalysisContext<'_>, call: NodeIndex) -> Option<SymbolId> {
    let NodeData::Invocation { callee, .. } = ctx.data(call)? else {
        return None;
    };
    let method = ctx.referenced(call)?;
    let symbol = ctx.symbol(method)?;
    if symbol.kind != SymbolKind::Method || symbol.is_static() || symbol.declarations.is_empty() {
        return None;
    }
    if call_receiver(ctx, *callee) != Receiver::This {
        return None;
    }
    let caller_type = ctx.enclosing_type(call)?;
    ctx.model
        .self_and_base_types(caller_type)
        .contains(&symbol.containing_type)
        .then_some(method)
}

/// A helper whose body contains a raise or calls a further helper.
fn may_raise(ctx: &AnalysisContext<'_>, helper: SymbolId) -> Result<bool, Cancelled> {
    for body in ctx.bodies_of(helper) {
        for inner in ctx.invocations_in(body) {
            if trace(ctx, inner)?.is_some() || instance_helper(ctx, inner).is_some() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
