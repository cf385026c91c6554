//! Symbol classifier.
//!
//! Decides which structural role a field or method plays in a dependency-property
//! or change-notification declaration, and extracts the metadata attached to it.
//!
//! ```csharp
//! private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(
//!     nameof(Bar), typeof(int), typeof(FooControl), new PropertyMetadata(default(int)));
//!
//! public static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;
//!
//! public int Bar
//! {
//!     get => (int)this.GetValue(BarProperty);
//!     protected set => this.SetValue(BarPropertyKey, value);
//! }
//! ```
//!
//! Here `BarPropertyKey` is a key field, `BarProperty` a descriptor field derived
//! from it, and `Bar` the CLR accessor property. Classification is recomputed on
//! demand and never cached across passes.

use crate::context::AnalysisContext;
use crate::invocation_tracer::{self, Receiver};
use crate::locator::first_declaration;
use crate::name_argument::{self, NameArgument};
use rustc_hash::FxHashSet;
use tracing::trace;
use wpfa_common::Cancelled;
use wpfa_syntax::{AccessorKind, NodeData, NodeIndex, ParameterFlags, SymbolId, SymbolKind, TypeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorRole {
    None,
    /// `static readonly DependencyProperty` field.
    DescriptorField,
    /// `static readonly DependencyPropertyKey` field.
    KeyField,
    /// Static `GetX(DependencyObject)` accessor of an attached property.
    GetterAccessor,
    /// Static `SetX(DependencyObject, T)` accessor of an attached property.
    SetterAccessor,
    /// Method whose body invokes the `PropertyChanged` event.
    NotificationRaiser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationKind {
    Register,
    RegisterReadOnly,
    RegisterAttached,
    RegisterAttachedReadOnly,
}

impl RegistrationKind {
    pub fn from_method_name(name: &str) -> Option<Self> {
        use wpfa_syntax::framework::names;
        match name {
            names::REGISTER => Some(RegistrationKind::Register),
            names::REGISTER_READ_ONLY => Some(RegistrationKind::RegisterReadOnly),
            names::REGISTER_ATTACHED => Some(RegistrationKind::RegisterAttached),
            names::REGISTER_ATTACHED_READ_ONLY => Some(RegistrationKind::RegisterAttachedReadOnly),
            _ => None,
        }
    }

    pub fn is_attached(self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterAttached | RegistrationKind::RegisterAttachedReadOnly
        )
    }

    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterReadOnly | RegistrationKind::RegisterAttachedReadOnly
        )
    }
}

/// Attributes of a `DependencyProperty.Register*` call.
#[derive(Clone, Debug)]
pub struct RegistrationInfo {
    pub call: NodeIndex,
    pub kind: RegistrationKind,
    /// Registered property name.
    pub name: NameArgument,
    pub registered_type: TypeId,
    /// The `typeof(T)` argument naming the registered type.
    pub registered_type_node: NodeIndex,
    pub owner_type: Option<SymbolId>,
    /// Key field the registration was reached through, for descriptors derived from a key.
    pub key_field: Option<SymbolId>,
    /// Method group passed to the property metadata as change callback.
    pub change_callback: Option<SymbolId>,
}

#[derive(Clone, Debug)]
pub struct DescriptorInfo {
    pub field: SymbolId,
    pub key_field: Option<SymbolId>,
    pub registration: Option<RegistrationInfo>,
}

#[derive(Clone, Debug)]
pub struct KeyFieldInfo {
    pub field: SymbolId,
    /// Descriptor field derived from this key in the same type.
    pub descriptor: Option<SymbolId>,
    pub registration: Option<RegistrationInfo>,
}

/// Where a raiser's notified name comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameSource {
    /// Supplied by the caller through this parameter (a `string` name or a
    /// `PropertyChangedEventArgs`).
    Parameter(SymbolId),
    /// Fixed inside the raiser body.
    Fixed(NameArgument),
}

#[derive(Clone, Debug)]
pub struct RaiserInfo {
    pub method: SymbolId,
    /// The event invocation inside the raiser body.
    pub event_invocation: NodeIndex,
    pub name_source: NameSource,
}

/// CLR accessors paired with a descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessorPair {
    /// Instance property wrapping `GetValue`/`SetValue`.
    pub property: Option<SymbolId>,
    /// Static `GetX(element)` method.
    pub getter: Option<SymbolId>,
    /// Static `SetX(element, value)` method.
    pub setter: Option<SymbolId>,
}

impl AccessorPair {
    pub fn is_empty(&self) -> bool {
        self.property.is_none() && self.getter.is_none() && self.setter.is_none()
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Role of a field or method symbol.
pub fn classify(ctx: &AnalysisContext<'_>, sym: SymbolId) -> Result<DescriptorRole, Cancelled> {
    let Some(symbol) = ctx.symbol(sym) else {
        return Ok(DescriptorRole::None);
    };
    let role = match symbol.kind {
        SymbolKind::Field if is_descriptor_candidate(ctx, sym) => DescriptorRole::DescriptorField,
        SymbolKind::Field if is_key_candidate(ctx, sym) => DescriptorRole::KeyField,
        SymbolKind::Method => match accessor_role(ctx, sym) {
            Some(role) => role,
            None if as_raiser_info(ctx, sym)?.is_some() => DescriptorRole::NotificationRaiser,
            None => DescriptorRole::None,
        },
        _ => DescriptorRole::None,
    };
    Ok(role)
}

/// `static readonly DependencyProperty` field.
pub fn is_descriptor_candidate(ctx: &AnalysisContext<'_>, field: SymbolId) -> bool {
    ctx.symbol(field).is_some_and(|symbol| {
        symbol.kind == SymbolKind::Field
            && symbol.is_static_readonly()
            && ctx.is_dependency_property_type(symbol.ty)
    })
}

/// `static readonly DependencyPropertyKey` field.
pub fn is_key_candidate(ctx: &AnalysisContext<'_>, field: SymbolId) -> bool {
    ctx.symbol(field).is_some_and(|symbol| {
        symbol.kind == SymbolKind::Field
            && symbol.is_static_readonly()
            && ctx.is_dependency_property_key_type(symbol.ty)
    })
}

pub fn as_descriptor_info(ctx: &AnalysisContext<'_>, field: SymbolId) -> Option<DescriptorInfo> {
    if !is_descriptor_candidate(ctx, field) {
        return None;
    }
    Some(DescriptorInfo {
        field,
        key_field: key_field_for(ctx, field),
        registration: registration_for_field(ctx, field),
    })
}

pub fn as_key_field_info(ctx: &AnalysisContext<'_>, field: SymbolId) -> Option<KeyFieldInfo> {
    if !is_key_candidate(ctx, field) {
        return None;
    }
    Some(KeyFieldInfo {
        field,
        descriptor: descriptor_for_key(ctx, field),
        registration: registration_for_field(ctx, field),
    })
}

/// Initializer expression of a field's first declaration.
pub fn field_initializer(ctx: &AnalysisContext<'_>, field: SymbolId) -> Option<NodeIndex> {
    let decl = first_declaration(ctx, field)?;
    match ctx.data(decl.node)? {
        NodeData::VariableDeclarator { initializer, .. } => initializer.into_option(),
        _ => None,
    }
}

// =============================================================================
// Key fields
// =============================================================================

/// Key field a descriptor is derived from.
///
/// Recognizes `Key.DependencyProperty` and one forwarding call taking the key,
/// e.g. `Create(BarPropertyKey)` returning a `DependencyProperty`.
pub fn key_field_for(ctx: &AnalysisContext<'_>, descriptor: SymbolId) -> Option<SymbolId> {
    let init = field_initializer(ctx, descriptor)?;
    match ctx.data(init)? {
        NodeData::MemberAccess { target, .. } => {
            let member = ctx.referenced(init)?;
            if ctx.is_key_descriptor_member(member) {
                key_field_reference(ctx, *target)
            } else {
                None
            }
        }
        NodeData::Invocation { arguments, .. } => {
            let method = ctx.referenced_symbol(init)?;
            if !ctx.is_dependency_property_type(method.ty) {
                return None;
            }
            arguments
                .iter()
                .find_map(|arg| key_field_reference(ctx, *arg))
        }
        _ => None,
    }
}

fn key_field_reference(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> Option<SymbolId> {
    if !matches!(
        ctx.data(expr)?,
        NodeData::Identifier { .. } | NodeData::MemberAccess { .. }
    ) {
        return None;
    }
    ctx.referenced(expr)
        .filter(|sym| is_key_candidate(ctx, *sym))
}

/// Descriptor field of the same type derived from `key`.
pub fn descriptor_for_key(ctx: &AnalysisContext<'_>, key: SymbolId) -> Option<SymbolId> {
    let owner = ctx.symbol(ctx.symbol(key)?.containing_type)?;
    owner.members.iter().copied().find(|member| {
        is_descriptor_candidate(ctx, *member) && key_field_for(ctx, *member) == Some(key)
    })
}

// =============================================================================
// Registrations
// =============================================================================

/// Registration info of a field: its own initializer, or its key's initializer.
pub fn registration_for_field(ctx: &AnalysisContext<'_>, field: SymbolId) -> Option<RegistrationInfo> {
    let init = field_initializer(ctx, field)?;
    if let Some(registration) = registration_of(ctx, init) {
        return Some(registration);
    }
    let key = key_field_for(ctx, field)?;
    let mut registration = registration_of(ctx, field_initializer(ctx, key)?)?;
    registration.key_field = Some(key);
    Some(registration)
}

/// Match a `DependencyProperty.Register*` call against the known overload shapes:
/// `(name, typeof(T), typeof(Owner)[, metadata[, validate]])`.
pub fn registration_of(ctx: &AnalysisContext<'_>, call: NodeIndex) -> Option<RegistrationInfo> {
    let NodeData::Invocation { arguments, .. } = ctx.data(call)? else {
        return None;
    };
    let kind = ctx.registration_kind(ctx.referenced(call)?)?;
    if !(3..=5).contains(&arguments.len()) {
        trace!(call = ?call, arity = arguments.len(), "registration arity does not match");
        return None;
    }

    let name_node = arguments[0];
    if let Some(ty) = ctx.type_of(name_node)
        && !ctx.is_string_type(ty)
    {
        return None;
    }
    let registered_type_node = arguments[1];
    let registered_type = typeof_argument(ctx, registered_type_node)?;
    let owner_type = typeof_argument(ctx, arguments[2])?;

    let metadata = arguments.get(3).copied();
    if let Some(metadata) = metadata {
        let is_metadata = ctx.node(metadata).is_some_and(|node| node.is_null_literal())
            || ctx
                .type_of(metadata)
                .is_some_and(|ty| ctx.is_property_metadata_type(ty));
        if !is_metadata {
            return None;
        }
    }

    Some(RegistrationInfo {
        call,
        kind,
        name: name_argument::resolve(ctx, name_node),
        registered_type,
        registered_type_node,
        owner_type: ctx.model.type_symbol(owner_type),
        key_field: None,
        change_callback: metadata.and_then(|m| change_callback(ctx, m, 0)),
    })
}

fn typeof_argument(ctx: &AnalysisContext<'_>, expr: NodeIndex) -> Option<TypeId> {
    match ctx.data(expr)? {
        NodeData::TypeOf { ty } => ctx.type_of(*ty),
        _ => None,
    }
}

/// Method group passed to the metadata constructor, possibly wrapped in
/// `new PropertyChangedCallback(OnBarChanged)`.
fn change_callback(ctx: &AnalysisContext<'_>, expr: NodeIndex, depth: u32) -> Option<SymbolId> {
    let NodeData::ObjectCreation { arguments, .. } = ctx.data(expr)? else {
        return None;
    };
    arguments.iter().find_map(|arg| match ctx.data(*arg)? {
        NodeData::Identifier { .. } | NodeData::MemberAccess { .. } => ctx
            .referenced(*arg)
            .filter(|sym| ctx.symbol(*sym).is_some_and(|s| s.kind == SymbolKind::Method)),
        NodeData::ObjectCreation { .. } if depth == 0 => change_callback(ctx, *arg, depth + 1),
        _ => None,
    })
}

/// The descriptor or key field a registration call initializes, through a field
/// initializer or an assignment in a static constructor.
pub fn registered_field(ctx: &AnalysisContext<'_>, call: NodeIndex) -> Option<SymbolId> {
    let parent = ctx.parent(call)?;
    match ctx.data(parent)? {
        NodeData::VariableDeclarator { .. } => ctx.declared(parent),
        NodeData::Assignment { target, value } if *value == call => ctx
            .referenced(*target)
            .filter(|sym| ctx.symbol(*sym).is_some_and(|s| s.kind == SymbolKind::Field)),
        _ => None,
    }
}

// =============================================================================
// Accessors
// =============================================================================

const GETTER_PREFIX: &str = "Get";
const SETTER_PREFIX: &str = "Set";

/// Role of a static attached-property accessor method.
fn accessor_role(ctx: &AnalysisContext<'_>, method: SymbolId) -> Option<DescriptorRole> {
    let symbol = ctx.symbol(method)?;
    if !symbol.is_static() {
        return None;
    }
    let element = element_parameter(ctx, method)?;
    for body in ctx.bodies_of(method) {
        for call in ctx.invocations_in(body) {
            let Some(field) = accessed_field(ctx, call, Some(element)) else {
                continue;
            };
            let invoked = ctx.referenced(call)?;
            if ctx.is_get_value(invoked)
                && symbol.parameters.len() == 1
                && symbol.name.starts_with(GETTER_PREFIX)
                && is_descriptor_candidate(ctx, field)
            {
                return Some(DescriptorRole::GetterAccessor);
            }
            if ctx.is_set_value(invoked)
                && symbol.parameters.len() == 2
                && symbol.name.starts_with(SETTER_PREFIX)
                && (is_descriptor_candidate(ctx, field) || is_key_candidate(ctx, field))
            {
                return Some(DescriptorRole::SetterAccessor);
            }
        }
    }
    None
}

/// First parameter of an attached accessor: a `DependencyObject` (possibly `this`).
fn element_parameter(ctx: &AnalysisContext<'_>, method: SymbolId) -> Option<SymbolId> {
    let first = *ctx.symbol(method)?.parameters.first()?;
    let param = ctx.symbol(first)?;
    ctx.is_dependency_object_type(param.ty).then_some(first)
}

/// Field passed as first argument to a `GetValue`/`SetValue` call. With `receiver`,
/// the call must be made on that parameter.
fn accessed_field(
    ctx: &AnalysisContext<'_>,
    call: NodeIndex,
    receiver: Option<SymbolId>,
) -> Option<SymbolId> {
    let NodeData::Invocation { callee, arguments } = ctx.data(call)? else {
        return None;
    };
    let invoked = ctx.referenced(call)?;
    if !ctx.is_get_value(invoked) && !ctx.is_set_value(invoked) {
        return None;
    }
    if let Some(receiver) = receiver {
        let NodeData::MemberAccess { target, .. } = ctx.data(*callee)? else {
            return None;
        };
        if ctx.referenced(*target) != Some(receiver) {
            return None;
        }
    }
    let field = ctx.referenced(*arguments.first()?)?;
    (ctx.symbol(field)?.kind == SymbolKind::Field).then_some(field)
}

/// CLR accessors of a descriptor (and its key) on the descriptor's declaring type.
///
/// Attached accessors are `Get{name}(element)` and `Set{name}(element, value)`.
/// With a `registration`, `{name}` must be the registered name and the change
/// callback is never taken for an accessor.
pub fn find_accessors(
    ctx: &AnalysisContext<'_>,
    owner: SymbolId,
    descriptor: Option<SymbolId>,
    key: Option<SymbolId>,
    registration: Option<&RegistrationInfo>,
) -> Result<AccessorPair, Cancelled> {
    let mut pair = AccessorPair::default();
    let Some(owner) = ctx.symbol(owner) else {
        return Ok(pair);
    };
    let reads = |field: SymbolId| Some(field) == descriptor;
    let writes = |field: SymbolId| Some(field) == descriptor || Some(field) == key;
    let registered_name = registration.and_then(|r| r.name.name());
    let change_callback = registration.and_then(|r| r.change_callback);
    let named = |method: &str, prefix: &str| match registered_name {
        Some(name) => method.strip_prefix(prefix) == Some(name),
        None => method.starts_with(prefix),
    };

    for &member in &owner.members {
        ctx.check_cancelled()?;
        let Some(symbol) = ctx.symbol(member) else {
            continue;
        };
        match symbol.kind {
            SymbolKind::Property if !symbol.is_static() && pair.property.is_none() => {
                for decl in &symbol.declarations {
                    let Some(NodeData::PropertyDeclaration { accessors, .. }) = ctx.data(*decl)
                    else {
                        continue;
                    };
                    for accessor in accessors {
                        let Some(NodeData::Accessor { kind, body }) = ctx.data(*accessor) else {
                            continue;
                        };
                        let matched = ctx.invocations_in(*body).into_iter().any(|call| {
                            accessed_field(ctx, call, None).is_some_and(|field| match kind {
                                AccessorKind::Get => reads(field),
                                AccessorKind::Set | AccessorKind::Init => writes(field),
                            })
                        });
                        if matched {
                            pair.property = Some(member);
                        }
                    }
                }
            }
            SymbolKind::Method if symbol.is_static() && change_callback != Some(member) => {
                let is_getter = symbol.parameters.len() == 1 && named(&symbol.name, GETTER_PREFIX);
                let is_setter = symbol.parameters.len() == 2 && named(&symbol.name, SETTER_PREFIX);
                if !is_getter && !is_setter {
                    continue;
                }
                let Some(element) = element_parameter(ctx, member) else {
                    continue;
                };
                for body in ctx.bodies_of(member) {
                    for call in ctx.invocations_in(body) {
                        let Some(field) = accessed_field(ctx, call, Some(element)) else {
                            continue;
                        };
                        let Some(invoked) = ctx.referenced(call) else {
                            continue;
                        };
                        if is_getter
                            && ctx.is_get_value(invoked)
                            && reads(field)
                            && pair.getter.is_none()
                        {
                            pair.getter = Some(member);
                        } else if is_setter
                            && ctx.is_set_value(invoked)
                            && writes(field)
                            && pair.setter.is_none()
                        {
                            pair.setter = Some(member);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(pair)
}

/// Value type an attached setter accepts: its last parameter.
pub fn setter_value_type(ctx: &AnalysisContext<'_>, setter: SymbolId) -> Option<TypeId> {
    let param = *ctx.symbol(setter)?.parameters.last()?;
    ctx.symbol(param).map(|p| p.ty)
}

// =============================================================================
// Raisers
// =============================================================================

/// Raiser info of a method whose body invokes the `PropertyChanged` event, or
/// forwards one of its own parameters as the name argument of another raiser.
///
/// ```csharp
/// protected void OnPropertyChanged([CallerMemberName] string name = null)
///     => this.OnPropertyChanged(new PropertyChangedEventArgs(name));
///
/// protected virtual void OnPropertyChanged(PropertyChangedEventArgs e)
///     => this.PropertyChanged?.Invoke(this, e);
/// ```
///
/// Forwarding chains are followed to any depth. A method already on the chain is
/// not entered again.
pub fn as_raiser_info(
    ctx: &AnalysisContext<'_>,
    method: SymbolId,
) -> Result<Option<RaiserInfo>, Cancelled> {
    let mut visited = FxHashSet::default();
    raiser_info_within(ctx, method, &mut visited)
}

fn raiser_info_within(
    ctx: &AnalysisContext<'_>,
    method: SymbolId,
    visited: &mut FxHashSet<SymbolId>,
) -> Result<Option<RaiserInfo>, Cancelled> {
    let Some(symbol) = ctx.symbol(method) else {
        return Ok(None);
    };
    if symbol.kind != SymbolKind::Method || !visited.insert(method) {
        return Ok(None);
    }
    for body in ctx.bodies_of(method) {
        for call in ctx.invocations_in(body) {
            ctx.check_cancelled()?;
            if let Some(event) = invocation_tracer::event_invocation(ctx, call) {
                let name_source = name_source(ctx, method, event.args);
                trace!(method = %symbol.name, ?name_source, "found notification raiser");
                return Ok(Some(RaiserInfo {
                    method,
                    event_invocation: call,
                    name_source,
                }));
            }
            let Some(NodeData::Invocation { callee, .. }) = ctx.data(call) else {
                continue;
            };
            if invocation_tracer::call_receiver(ctx, *callee) != Receiver::This {
                continue;
            }
            let Some(inner) = ctx.referenced(call).filter(|inner| !visited.contains(inner)) else {
                continue;
            };
            let Some(forwarded) = raiser_info_within(ctx, inner, visited)? else {
                continue;
            };
            let NameSource::Parameter(inner_param) = forwarded.name_source else {
                continue;
            };
            if let Some(own) = forwarded_parameter(ctx, method, call, inner, inner_param) {
                trace!(method = %symbol.name, "raiser forwards its name parameter");
                return Ok(Some(RaiserInfo {
                    method,
                    event_invocation: forwarded.event_invocation,
                    name_source: NameSource::Parameter(own),
                }));
            }
        }
    }
    Ok(None)
}

/// Own parameter of `method` passed at `call` for the inner raiser's `inner_param`,
/// directly or wrapped in `new PropertyChangedEventArgs(param)`.
fn forwarded_parameter(
    ctx: &AnalysisContext<'_>,
    method: SymbolId,
    call: NodeIndex,
    inner: SymbolId,
    inner_param: SymbolId,
) -> Option<SymbolId> {
    let arg = invocation_tracer::argument_for(ctx, call, inner, inner_param)?;
    let own_parameter = |expr: NodeIndex| {
        ctx.referenced(expr).filter(|sym| {
            ctx.symbol(*sym).is_some_and(|s| {
                s.kind == SymbolKind::Parameter
                    && s.container == method
                    && !s.parameter_flags.contains(ParameterFlags::THIS)
            })
        })
    };
    match ctx.data(arg)? {
        NodeData::ObjectCreation { arguments, .. } => {
            let ty = ctx.type_of(arg)?;
            if !ctx.is_event_args_type(ty) {
                return None;
            }
            own_parameter(*arguments.first()?)
        }
        _ => own_parameter(arg),
    }
}

/// How the event-args argument of a raiser's event invocation gets its name.
fn name_source(ctx: &AnalysisContext<'_>, method: SymbolId, args: NodeIndex) -> NameSource {
    let parameter_of_method = |expr: NodeIndex| {
        ctx.referenced(expr).filter(|sym| {
            ctx.symbol(*sym).is_some_and(|s| {
                s.kind == SymbolKind::Parameter
                    && s.container == method
                    && !s.parameter_flags.contains(ParameterFlags::THIS)
            })
        })
    };
    match ctx.data(args) {
        Some(NodeData::Identifier { .. }) => {
            if let Some(param) = parameter_of_method(args) {
                return NameSource::Parameter(param);
            }
        }
        Some(NodeData::ObjectCreation { arguments, .. }) => {
            if let Some(param) = arguments.first().and_then(|arg| parameter_of_method(*arg)) {
                return NameSource::Parameter(param);
            }
        }
        _ => {}
    }
    NameSource::Fixed(name_argument::resolve_event_args(ctx, args))
}
