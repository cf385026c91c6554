use super::*;
use crate::invocation_tracer::{event_invocation, trace, trace_through_helpers};
use crate::test_fixtures::*;
use wpfa_syntax::{CompilationBuilder, Modifiers, NodeIndex, ParamSpec, SymbolId};

fn trace_ok(comp: &wpfa_syntax::Compilation, call: NodeIndex) -> Option<RaiseSite> {
    with_context(comp, |ctx| trace(ctx, call).expect("not cancelled"))
}

#[test]
fn test_conditional_event_invoke_is_confirmed() {
    let mut b = CompilationBuilder::new();
    let vm = view_model(&mut b, "ViewModel");
    let name = b.string("Bar");
    let args = event_args(&mut b, name);
    let call = raise_event(&mut b, vm.class, vm.event, args);
    let comp = b.finish();

    let site = trace_ok(&comp, call).expect("raise");
    assert!(site.confirmed);
    assert!(site.name_at_call_site);
    assert_eq!(site.target, vm.event);
    assert_eq!(site.receiver, Receiver::This);
    assert_eq!(site.name.name(), Some("Bar"));
}

#[test]
fn test_direct_delegate_call_is_confirmed() {
    let mut b = CompilationBuilder::new();
    let vm = view_model(&mut b, "ViewModel");
    let handler = b.this_member(vm.class, vm.event);
    let sender = b.this_expr(vm.class);
    let name = b.string("Bar");
    let args = event_args(&mut b, name);
    let call = b.invoke(handler, vec![sender, args]);
    let comp = b.finish();

    let site = trace_ok(&comp, call).expect("raise");
    assert!(site.confirmed);
    assert_eq!(site.name.name(), Some("Bar"));
    with_context(&comp, |ctx| {
        let event = event_invocation(ctx, call).expect("event invocation");
        assert_eq!(event.event, vm.event);
        assert_eq!(event.args, args);
    });
}

#[test]
fn test_local_copy_of_handler_is_confirmed() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let void = b.keyword_type("void");
    let vm = view_model(&mut b, "ViewModel");
    let method = b.declare_method(vm.class, "RaiseBar", void, Modifiers::PRIVATE, &[]);

    // var handler = this.PropertyChanged;
    let read = b.this_member(vm.class, vm.event);
    let (copy, handler) = b.local(method, "handler", read);

    // handler?.Invoke(this, new PropertyChangedEventArgs("Bar"));
    let target = b.ident(handler);
    let callee = b.member_conditional(target, fw.handler_invoke);
    let sender = b.this_expr(vm.class);
    let name = b.string("Bar");
    let args = event_args(&mut b, name);
    let invoke_call = b.invoke(callee, vec![sender, args]);
    let invoke_stmt = b.expr_stmt(invoke_call);

    // handler(this, new PropertyChangedEventArgs("Bar"));
    let target = b.ident(handler);
    let sender = b.this_expr(vm.class);
    let name = b.string("Bar");
    let args = event_args(&mut b, name);
    let direct_call = b.invoke(target, vec![sender, args]);
    let direct_stmt = b.expr_stmt(direct_call);

    let body = b.block(vec![copy, invoke_stmt, direct_stmt]);
    b.define_method(method, body);
    let comp = b.finish();

    for call in [invoke_call, direct_call] {
        let site = trace_ok(&comp, call).expect("raise");
        assert!(site.confirmed);
        assert_eq!(site.target, vm.event);
        assert_eq!(site.receiver, Receiver::This);
        assert_eq!(site.name.name(), Some("Bar"));
    }
}

#[test]
fn test_omitted_caller_member_name_uses_calling_member() {
    let mut b = CompilationBuilder::new();
    let int = b.keyword_type("int");
    let vm = view_model(&mut b, "ViewModel");
    let mut raise = NodeIndex::NONE;
    notifying_property(&mut b, vm.class, "Bar", int, |b, _| {
        raise = call_raiser(b, &vm, vec![]);
        Some(raise)
    });
    let comp = b.finish();

    let site = trace_ok(&comp, raise).expect("raise");
    assert!(site.confirmed);
    assert_eq!(site.target, vm.raiser);
    assert_eq!(
        site.name,
        NameArgument::resolved("Bar", NameForm::CallerMemberName)
    );
}

#[test]
fn test_inherited_raiser_is_confirmed() {
    let mut b = CompilationBuilder::new();
    let vm = view_model(&mut b, "ViewModelBase");
    let derived = b.add_class("ViewModel", vm.class);
    let this = b.this_expr(derived);
    let name = b.string("Bar");
    let call = b.call(Some(this), vm.raiser, vec![name]);
    let comp = b.finish();

    let site = trace_ok(&comp, call).expect("raise");
    assert!(site.confirmed);
    assert_eq!(site.receiver, Receiver::This);
    assert_eq!(site.name.name(), Some("Bar"));
}

#[test]
fn test_raise_on_other_instance_reports_its_type() {
    let mut b = CompilationBuilder::new();
    let void = b.keyword_type("void");
    let other = view_model(&mut b, "OtherViewModel");
    let other_ty = b.type_of_symbol(other.class);
    let vm = view_model(&mut b, "ViewModel");
    let method = b.declare_method(
        vm.class,
        "Update",
        void,
        Modifiers::PUBLIC,
        &[ParamSpec::new("other", other_ty)],
    );
    let param = b.param(method, 0);
    let receiver = b.ident(param);
    let name = b.string("Value");
    let call = b.call(Some(receiver), other.raiser, vec![name]);
    let stmt = b.expr_stmt(call);
    let body = b.block(vec![stmt]);
    b.define_method(method, body);
    let comp = b.finish();

    let site = trace_ok(&comp, call).expect("raise");
    assert!(site.confirmed);
    assert_eq!(site.receiver, Receiver::Other(other.class));
    assert_eq!(site.name.name(), Some("Value"));
}

#[test]
fn test_metadata_only_raiser_is_unconfirmed() {
    let mut b = CompilationBuilder::new();
    let string = b.keyword_type("string");
    let void = b.keyword_type("void");
    let base = b.add_class("ObservableObject", SymbolId::NONE);
    b.property_changed_event(base);
    let raiser = b.declare_method(
        base,
        "RaisePropertyChanged",
        void,
        Modifiers::PROTECTED,
        &[ParamSpec::new("propertyName", string)],
    );
    let derived = b.add_class("ViewModel", base);
    let this = b.this_expr(derived);
    let name = b.string("Bar");
    let call = b.call(Some(this), raiser, vec![name]);
    let comp = b.finish();

    let site = trace_ok(&comp, call).expect("candidate raise");
    assert!(!site.confirmed);
    assert!(!site.name.is_resolved());
}

#[test]
fn test_unrelated_call_is_not_a_raise() {
    let mut b = CompilationBuilder::new();
    let string = b.keyword_type("string");
    let void = b.keyword_type("void");
    let vm = view_model(&mut b, "ViewModel");
    let log = b.declare_method(
        vm.class,
        "Log",
        void,
        Modifiers::PRIVATE,
        &[ParamSpec::new("message", string)],
    );
    let empty = b.block(vec![]);
    b.define_method(log, empty);
    let this = b.this_expr(vm.class);
    let message = b.string("hello");
    let call = b.call(Some(this), log, vec![message]);
    let comp = b.finish();

    assert!(trace_ok(&comp, call).is_none());
    assert!(trace_ok(&comp, NodeIndex::NONE).is_none());
}

#[test]
fn test_cancelled_trace_unwinds() {
    let mut b = CompilationBuilder::new();
    let vm = view_model(&mut b, "ViewModel");
    let name = b.string("Bar");
    let call = call_raiser(&mut b, &vm, vec![name]);
    let comp = b.finish();

    let token = wpfa_common::CancellationToken::new();
    token.cancel();
    let ctx = AnalysisContext::new(&comp, &token);
    assert!(trace(&ctx, call).is_err());
}

/// `int Bar` on a view model whose setter makes the call `raise` builds.
fn setter_call(
    raise: impl FnOnce(&mut CompilationBuilder, &ViewModel, SymbolId) -> NodeIndex,
) -> (wpfa_syntax::Compilation, ViewModel, NodeIndex) {
    let mut b = CompilationBuilder::new();
    let int = b.keyword_type("int");
    let vm = view_model(&mut b, "ViewModel");
    let mut call = NodeIndex::NONE;
    notifying_property(&mut b, vm.class, "Bar", int, |b, property| {
        call = raise(b, &vm, property);
        Some(call)
    });
    (b.finish(), vm, call)
}

#[test]
fn test_helper_hop_reaches_the_raise_inside() {
    let (comp, vm, call) = setter_call(|b, vm, property| {
        let vm = *vm;
        call_helper(b, vm.class, "UpdateBar", |b| {
            let name = name_of(b, property);
            vec![call_raiser(b, &vm, vec![name])]
        })
    });

    with_context(&comp, |ctx| {
        assert!(trace(ctx, call).expect("not cancelled").is_none());
        let sites = trace_through_helpers(ctx, call).expect("not cancelled");
        assert_eq!(sites.len(), 1);
        assert!(sites[0].confirmed);
        assert_eq!(sites[0].target, vm.raiser);
        assert_eq!(sites[0].receiver, Receiver::This);
        assert_eq!(sites[0].name.name(), Some("Bar"));
    });
}

#[test]
fn test_helper_past_hop_limit_is_unconfirmed() {
    let mut inner_call = NodeIndex::NONE;
    let (comp, _, call) = setter_call(|b, vm, _| {
        let vm = *vm;
        call_helper(b, vm.class, "Outer", |b| {
            inner_call = call_helper(b, vm.class, "Inner", |b| {
                let name = b.string("Baz");
                vec![call_raiser(b, &vm, vec![name])]
            });
            vec![inner_call]
        })
    });

    with_context(&comp, |ctx| {
        let sites = trace_through_helpers(ctx, call).expect("not cancelled");
        assert_eq!(sites.len(), 1);
        assert!(!sites[0].confirmed);
        assert_eq!(sites[0].invocation, inner_call);
        assert_eq!(Some(sites[0].target), ctx.referenced(inner_call));
        assert!(!sites[0].name.is_resolved());
    });
}

#[test]
fn test_helper_without_raises_yields_nothing() {
    let (comp, _, call) = setter_call(|b, vm, _| call_helper(b, vm.class, "Validate", |_| Vec::new()));

    with_context(&comp, |ctx| {
        assert!(trace_through_helpers(ctx, call).expect("not cancelled").is_empty());
    });
}

#[test]
fn test_direct_raise_is_returned_as_is() {
    let (comp, vm, call) = setter_call(|b, vm, _| call_raiser(b, vm, vec![]));

    with_context(&comp, |ctx| {
        let sites = trace_through_helpers(ctx, call).expect("not cancelled");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].invocation, call);
        assert_eq!(sites[0].target, vm.raiser);
        assert_eq!(sites[0].name.name(), Some("Bar"));
    });
}
