//! Shared test fixtures.
//!
//! Builders for the C# shapes the rules match on, written against
//! `CompilationBuilder`, plus helpers that run a rule or the whole analyzer over
//! the finished compilation.

use crate::analyzer::Analyzer;
use crate::context::AnalysisContext;
use crate::options::AnalyzerOptions;
use crate::rules::Rule;
use wpfa_common::{CancellationToken, Diagnostic};
use wpfa_syntax::{
    Compilation, CompilationBuilder, Modifiers, NodeIndex, ParamSpec, SemanticModel, SymbolId,
    TypeId,
};

// =============================================================================
// Runners
// =============================================================================

/// Call `f` with a non-cancelled context over `comp`.
pub fn with_context<R>(comp: &Compilation, f: impl FnOnce(&AnalysisContext<'_>) -> R) -> R {
    let token = CancellationToken::new();
    let ctx = AnalysisContext::new(comp, &token);
    f(&ctx)
}

/// Run `rule` over every node of its trigger kinds, in pre-order.
pub fn check_rule(rule: &dyn Rule, comp: &Compilation) -> Vec<Diagnostic> {
    let token = CancellationToken::new();
    let ctx = AnalysisContext::new(comp, &token);
    let mut out = Vec::new();
    for file in comp.files() {
        for node in ctx.descendants(file.root) {
            let Some(kind) = ctx.kind(node) else {
                continue;
            };
            if !rule.triggers().contains(&kind) {
                continue;
            }
            if let Ok(Some(diagnostic)) = rule.check(&ctx, node) {
                out.push(diagnostic);
            }
        }
    }
    out
}

/// Run every built-in rule sequentially with default options.
pub fn run_all(comp: &Compilation) -> Vec<Diagnostic> {
    let options = AnalyzerOptions {
        parallel: Some(false),
        ..AnalyzerOptions::default()
    };
    Analyzer::new(options)
        .analyze(comp, &CancellationToken::new())
        .diagnostics
}

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics.iter().map(|d| d.code).collect()
}

// =============================================================================
// Dependency properties
// =============================================================================

/// A `DependencyObject`-derived control class.
pub fn control(b: &mut CompilationBuilder, name: &str) -> SymbolId {
    let base = b.framework().framework_element;
    b.add_class(name, base)
}

/// `DependencyProperty.<method>("name", typeof(registered), typeof(owner)[, metadata])`
pub fn register(
    b: &mut CompilationBuilder,
    method: SymbolId,
    name: &str,
    registered: TypeId,
    owner: SymbolId,
    metadata: Option<NodeIndex>,
) -> NodeIndex {
    let name_arg = b.string(name);
    let registered_arg = b.type_of_expr(registered);
    let owner_ty = b.type_of_symbol(owner);
    let owner_arg = b.type_of_expr(owner_ty);
    let mut args = vec![name_arg, registered_arg, owner_arg];
    args.extend(metadata);
    let callee = b.static_member(method);
    b.invoke(callee, args)
}

/// `new PropertyMetadata(default(T))`
pub fn metadata(b: &mut CompilationBuilder, ty: TypeId) -> NodeIndex {
    let ctor = b.framework().property_metadata_ctor;
    let metadata_ty = b.type_of_symbol(b.framework().property_metadata);
    let default = b.default_of(ty);
    b.new_object(metadata_ty, ctor, vec![default])
}

/// `public static readonly DependencyProperty <name> = <init>;`
pub fn descriptor_field(
    b: &mut CompilationBuilder,
    owner: SymbolId,
    name: &str,
    init: NodeIndex,
) -> SymbolId {
    let ty = b.type_of_symbol(b.framework().dependency_property);
    b.field(owner, name, ty, Modifiers::PUBLIC_STATIC_READONLY, init)
}

/// Declare (without syntax) a `private static readonly DependencyPropertyKey`.
pub fn declare_key_field(b: &mut CompilationBuilder, owner: SymbolId, name: &str) -> SymbolId {
    let ty = b.type_of_symbol(b.framework().dependency_property_key);
    b.declare_field(owner, name, ty, Modifiers::PRIVATE_STATIC_READONLY)
}

/// `key.DependencyProperty`
pub fn key_descriptor(b: &mut CompilationBuilder, key: SymbolId) -> NodeIndex {
    let member = b.framework().key_descriptor;
    let target = b.ident(key);
    b.member(target, member)
}

/// `public T <name> { get => (T)this.GetValue(get_field); set => this.SetValue(set_field, value); }`
pub fn clr_property(
    b: &mut CompilationBuilder,
    owner: SymbolId,
    name: &str,
    ty: TypeId,
    get_field: SymbolId,
    set_field: SymbolId,
) -> SymbolId {
    let property = b.declare_property(owner, name, ty, Modifiers::PUBLIC);
    let get_value = b.framework().get_value;
    let set_value = b.framework().set_value;

    let this = b.this_expr(owner);
    let field_arg = b.ident(get_field);
    let read = b.call(Some(this), get_value, vec![field_arg]);
    let getter = b.cast(ty, read);

    let this = b.this_expr(owner);
    let field_arg = b.ident(set_field);
    let value = b.value_param(property);
    let value_arg = b.ident(value);
    let setter = b.call(Some(this), set_value, vec![field_arg, value_arg]);

    b.define_property(property, getter, setter);
    property
}

/// `public static T Get<name>(DependencyObject element) => (T)element.GetValue(descriptor);`
/// and `public static void Set<name>(DependencyObject element, U value) => element.SetValue(descriptor, value);`
pub fn attached_accessors(
    b: &mut CompilationBuilder,
    owner: SymbolId,
    name: &str,
    get_ty: TypeId,
    set_ty: TypeId,
    descriptor: SymbolId,
) -> (SymbolId, SymbolId) {
    let element_ty = b.type_of_symbol(b.framework().dependency_object);
    let get_value = b.framework().get_value;
    let set_value = b.framework().set_value;
    let void = b.keyword_type("void");
    let public_static = Modifiers::PUBLIC | Modifiers::STATIC;

    let getter = b.declare_method(
        owner,
        &format!("Get{name}"),
        get_ty,
        public_static,
        &[ParamSpec::new("element", element_ty)],
    );
    let element = b.param(getter, 0);
    let target = b.ident(element);
    let field_arg = b.ident(descriptor);
    let read = b.call(Some(target), get_value, vec![field_arg]);
    let body = b.cast(get_ty, read);
    b.define_method(getter, body);

    let setter = b.declare_method(
        owner,
        &format!("Set{name}"),
        void,
        public_static,
        &[
            ParamSpec::new("element", element_ty),
            ParamSpec::new("value", set_ty),
        ],
    );
    let element = b.param(setter, 0);
    let value = b.param(setter, 1);
    let target = b.ident(element);
    let field_arg = b.ident(descriptor);
    let value_arg = b.ident(value);
    let body = b.call(Some(target), set_value, vec![field_arg, value_arg]);
    b.define_method(setter, body);

    (getter, setter)
}

// =============================================================================
// Change notification
// =============================================================================

/// A class implementing `INotifyPropertyChanged` with a conventional raiser.
#[derive(Clone, Copy, Debug)]
pub struct ViewModel {
    pub class: SymbolId,
    pub event: SymbolId,
    /// `protected virtual void OnPropertyChanged([CallerMemberName] string propertyName = null)`
    pub raiser: SymbolId,
}

/// ```csharp
/// public class <name> : INotifyPropertyChanged
/// {
///     public event PropertyChangedEventHandler PropertyChanged;
///     protected virtual void OnPropertyChanged([CallerMemberName] string propertyName = null)
///     {
///         this.PropertyChanged?.Invoke(this, new PropertyChangedEventArgs(propertyName));
///     }
/// }
/// ```
pub fn view_model(b: &mut CompilationBuilder, name: &str) -> ViewModel {
    let class = b.add_class(name, SymbolId::NONE);
    let event = b.property_changed_event(class);
    let string = b.keyword_type("string");
    let void = b.keyword_type("void");
    let raiser = b.declare_method(
        class,
        "OnPropertyChanged",
        void,
        Modifiers::PROTECTED | Modifiers::VIRTUAL,
        &[ParamSpec::new("propertyName", string).caller_member_name()],
    );
    let param = b.param(raiser, 0);
    let name_arg = b.ident(param);
    let args = event_args(b, name_arg);
    let invoke = raise_event(b, class, event, args);
    let stmt = b.expr_stmt(invoke);
    let body = b.block(vec![stmt]);
    b.define_method(raiser, body);
    ViewModel {
        class,
        event,
        raiser,
    }
}

/// `new PropertyChangedEventArgs(name)`
pub fn event_args(b: &mut CompilationBuilder, name: NodeIndex) -> NodeIndex {
    let ctor = b.framework().property_changed_event_args_ctor;
    let args_ty = b.type_of_symbol(b.framework().property_changed_event_args);
    b.new_object(args_ty, ctor, vec![name])
}

/// `this.PropertyChanged?.Invoke(this, args)`
pub fn raise_event(
    b: &mut CompilationBuilder,
    class: SymbolId,
    event: SymbolId,
    args: NodeIndex,
) -> NodeIndex {
    let invoke = b.framework().handler_invoke;
    let handler = b.this_member(class, event);
    let callee = b.member_conditional(handler, invoke);
    let sender = b.this_expr(class);
    b.invoke(callee, vec![sender, args])
}

/// `nameof(symbol)`
pub fn name_of(b: &mut CompilationBuilder, symbol: SymbolId) -> NodeIndex {
    let operand = b.ident(symbol);
    b.name_of(operand)
}

/// `this.OnPropertyChanged(args...)`
pub fn call_raiser(b: &mut CompilationBuilder, vm: &ViewModel, args: Vec<NodeIndex>) -> NodeIndex {
    let this = b.this_expr(vm.class);
    b.call(Some(this), vm.raiser, args)
}

/// Declare `private void <name>() { <body>; }` on `class` and return the call
/// `this.<name>()`. `body` builds the statement expressions.
pub fn call_helper(
    b: &mut CompilationBuilder,
    class: SymbolId,
    name: &str,
    body: impl FnOnce(&mut CompilationBuilder) -> Vec<NodeIndex>,
) -> NodeIndex {
    let void = b.keyword_type("void");
    let helper = b.declare_method(class, name, void, Modifiers::PRIVATE, &[]);
    let expressions = body(b);
    let statements = expressions
        .into_iter()
        .map(|expr| b.expr_stmt(expr))
        .collect();
    let block = b.block(statements);
    b.define_method(helper, block);
    let this = b.this_expr(class);
    b.call(Some(this), helper, vec![])
}

/// A property with a backing field and an equality-guarded setter:
///
/// ```csharp
/// private T _name;
/// public T Name
/// {
///     get => this._name;
///     set
///     {
///         if (value == this._name) { return; }
///         this._name = value;
///         <raise>;
///     }
/// }
/// ```
///
/// `raise` receives the property symbol and returns the raise expression, if any.
pub fn notifying_property(
    b: &mut CompilationBuilder,
    class: SymbolId,
    name: &str,
    ty: TypeId,
    raise: impl FnOnce(&mut CompilationBuilder, SymbolId) -> Option<NodeIndex>,
) -> SymbolId {
    let field = b.field(
        class,
        &format!("_{}", name.to_lowercase()),
        ty,
        Modifiers::PRIVATE,
        NodeIndex::NONE,
    );
    let property = b.declare_property(class, name, ty, Modifiers::PUBLIC);
    let getter = b.this_member(class, field);
    let setter = guarded_setter(b, class, property, field, raise);
    b.define_property(property, getter, setter);
    property
}

/// Setter body `{ if (value == this.field) { return; } this.field = value; <raise>; }`.
pub fn guarded_setter(
    b: &mut CompilationBuilder,
    class: SymbolId,
    property: SymbolId,
    field: SymbolId,
    raise: impl FnOnce(&mut CompilationBuilder, SymbolId) -> Option<NodeIndex>,
) -> NodeIndex {
    let value = b.value_param(property);
    let value_read = b.ident(value);
    let field_read = b.this_member(class, field);
    let condition = b.eq(value_read, field_read);
    let early_return = b.ret(NodeIndex::NONE);
    let then_branch = b.block(vec![early_return]);
    let guard = b.if_stmt(condition, then_branch, NodeIndex::NONE);

    let target = b.this_member(class, field);
    let value_read = b.ident(value);
    let assignment = b.assign(target, value_read);
    let assign_stmt = b.expr_stmt(assignment);

    let mut statements = vec![guard, assign_stmt];
    if let Some(call) = raise(b, property) {
        let stmt = b.expr_stmt(call);
        statements.push(stmt);
    }
    b.block(statements)
}
