use super::*;
use crate::classifier::{
    AccessorPair, NameSource, as_descriptor_info, as_key_field_info, as_raiser_info, classify,
    find_accessors, registration_for_field, registration_of,
};
use crate::locator::{first_declaration, locate};
use crate::test_fixtures::*;
use wpfa_syntax::{CompilationBuilder, Modifiers, NodeIndex, ParamSpec, SemanticModel, SymbolId};

struct ReadOnlyControl {
    class: SymbolId,
    key: SymbolId,
    descriptor: SymbolId,
    registration: NodeIndex,
}

/// ```csharp
/// private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(
///     "Bar", typeof(int), typeof(FooControl), new PropertyMetadata(default(int)));
/// public static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;
/// ```
fn read_only_control(b: &mut CompilationBuilder) -> ReadOnlyControl {
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let class = control(b, "FooControl");
    let key = declare_key_field(b, class, "BarPropertyKey");
    let md = metadata(b, int);
    let registration = register(b, fw.register_read_only, "Bar", int, class, Some(md));
    b.define_field(key, registration);
    let init = key_descriptor(b, key);
    let descriptor = descriptor_field(b, class, "BarProperty", init);
    ReadOnlyControl {
        class,
        key,
        descriptor,
        registration,
    }
}

#[test]
fn test_classify_registered_descriptor_field() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let class = control(&mut b, "FooControl");
    let registration = register(&mut b, fw.register, "Bar", int, class, None);
    let descriptor = descriptor_field(&mut b, class, "BarProperty", registration);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert_eq!(classify(ctx, descriptor), Ok(DescriptorRole::DescriptorField));
        let info = as_descriptor_info(ctx, descriptor).expect("descriptor info");
        assert_eq!(info.key_field, None);
        let registration = info.registration.expect("registration");
        assert_eq!(registration.kind, RegistrationKind::Register);
        assert_eq!(registration.name.name(), Some("Bar"));
        assert_eq!(registration.registered_type, int);
        assert_eq!(registration.owner_type, Some(class));
        assert_eq!(registration.change_callback, None);
    });
}

#[test]
fn test_key_field_and_derived_descriptor_are_linked() {
    let mut b = CompilationBuilder::new();
    let fixture = read_only_control(&mut b);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert_eq!(classify(ctx, fixture.key), Ok(DescriptorRole::KeyField));
        assert_eq!(
            classify(ctx, fixture.descriptor),
            Ok(DescriptorRole::DescriptorField)
        );

        let key_info = as_key_field_info(ctx, fixture.key).expect("key info");
        assert_eq!(key_info.descriptor, Some(fixture.descriptor));
        assert_eq!(
            key_info.registration.map(|r| r.kind),
            Some(RegistrationKind::RegisterReadOnly)
        );

        let descriptor_info = as_descriptor_info(ctx, fixture.descriptor).expect("descriptor info");
        assert_eq!(descriptor_info.key_field, Some(fixture.key));
        // The descriptor reproduces the key's registration.
        let registration = registration_for_field(ctx, fixture.descriptor).expect("registration");
        assert_eq!(registration.call, fixture.registration);
        assert_eq!(registration.key_field, Some(fixture.key));
        assert!(registration.kind.is_read_only());
        assert!(!registration.kind.is_attached());
    });
}

#[test]
fn test_instance_descriptor_field_is_not_classified() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let class = control(&mut b, "FooControl");
    let dp_ty = b.type_of_symbol(fw.dependency_property);
    let registration = register(&mut b, fw.register, "Bar", int, class, None);
    let field = b.field(class, "BarProperty", dp_ty, Modifiers::PUBLIC, registration);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert_eq!(classify(ctx, field), Ok(DescriptorRole::None));
        assert!(as_descriptor_info(ctx, field).is_none());
    });
}

#[test]
fn test_registration_with_unknown_shape_is_rejected() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let class = control(&mut b, "FooControl");
    // Register("Bar", typeof(int)) has no owner type.
    let name = b.string("Bar");
    let registered = b.type_of_expr(int);
    let callee = b.static_member(fw.register);
    let two_args = b.invoke(callee, vec![name, registered]);
    // Register("Bar", typeof(int), typeof(FooControl), 42): not metadata.
    let bad_metadata = {
        let name = b.string("Bar");
        let registered = b.type_of_expr(int);
        let owner_ty = b.type_of_symbol(class);
        let owner = b.type_of_expr(owner_ty);
        let number = b.number("42");
        let callee = b.static_member(fw.register);
        b.invoke(callee, vec![name, registered, owner, number])
    };
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert!(registration_of(ctx, two_args).is_none());
        assert!(registration_of(ctx, bad_metadata).is_none());
        assert!(registration_of(ctx, NodeIndex::NONE).is_none());
        assert_eq!(classify(ctx, SymbolId::NONE), Ok(DescriptorRole::None));
    });
}

#[test]
fn test_change_callback_is_extracted_from_metadata() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let void = b.keyword_type("void");
    let class = control(&mut b, "FooControl");
    let callback = b.declare_method(
        class,
        "OnBarChanged",
        void,
        Modifiers::PRIVATE | Modifiers::STATIC,
        &[],
    );
    let default = b.default_of(int);
    let method_group = b.ident(callback);
    let metadata_ty = b.type_of_symbol(fw.property_metadata);
    let md = b.new_object(
        metadata_ty,
        fw.property_metadata_ctor_callback,
        vec![default, method_group],
    );
    let registration = register(&mut b, fw.register, "Bar", int, class, Some(md));
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let info = registration_of(ctx, registration).expect("registration");
        assert_eq!(info.change_callback, Some(callback));
    });
}

#[test]
fn test_find_accessors_for_clr_property_through_key() {
    let mut b = CompilationBuilder::new();
    let int = b.keyword_type("int");
    let fixture = read_only_control(&mut b);
    let property = clr_property(
        &mut b,
        fixture.class,
        "Bar",
        int,
        fixture.descriptor,
        fixture.key,
    );
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let pair = find_accessors(ctx, fixture.class, Some(fixture.descriptor), Some(fixture.key), None)
            .expect("not cancelled");
        assert_eq!(
            pair,
            AccessorPair {
                property: Some(property),
                getter: None,
                setter: None,
            }
        );
    });
}

#[test]
fn test_attached_accessor_roles() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let class = b.add_class("Attached", SymbolId::NONE);
    let registration = register(&mut b, fw.register_attached, "Bar", int, class, None);
    let descriptor = descriptor_field(&mut b, class, "BarProperty", registration);
    let (getter, setter) = attached_accessors(&mut b, class, "Bar", int, int, descriptor);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert_eq!(classify(ctx, getter), Ok(DescriptorRole::GetterAccessor));
        assert_eq!(classify(ctx, setter), Ok(DescriptorRole::SetterAccessor));
        let pair = find_accessors(ctx, class, Some(descriptor), None, None).expect("not cancelled");
        assert_eq!(pair.getter, Some(getter));
        assert_eq!(pair.setter, Some(setter));
        assert_eq!(pair.property, None);
        assert!(!pair.is_empty());
    });
}

#[test]
fn test_raiser_with_name_parameter() {
    let mut b = CompilationBuilder::new();
    let vm = view_model(&mut b, "ViewModel");
    let param = b.param(vm.raiser, 0);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert_eq!(classify(ctx, vm.raiser), Ok(DescriptorRole::NotificationRaiser));
        let info = as_raiser_info(ctx, vm.raiser)
            .expect("not cancelled")
            .expect("raiser");
        assert_eq!(info.name_source, NameSource::Parameter(param));
    });
}

#[test]
fn test_raiser_with_fixed_name() {
    let mut b = CompilationBuilder::new();
    let int = b.keyword_type("int");
    let void = b.keyword_type("void");
    let vm = view_model(&mut b, "ViewModel");
    let bar = notifying_property(&mut b, vm.class, "Bar", int, |b, p| {
        let name = name_of(b, p);
        Some(call_raiser(b, &vm, vec![name]))
    });
    let on_bar = b.declare_method(vm.class, "OnBarChanged", void, Modifiers::PRIVATE, &[]);
    let name = name_of(&mut b, bar);
    let args = event_args(&mut b, name);
    let invoke = raise_event(&mut b, vm.class, vm.event, args);
    let stmt = b.expr_stmt(invoke);
    let body = b.block(vec![stmt]);
    b.define_method(on_bar, body);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let info = as_raiser_info(ctx, on_bar)
            .expect("not cancelled")
            .expect("raiser");
        assert_eq!(info.event_invocation, invoke);
        assert_eq!(
            info.name_source,
            NameSource::Fixed(NameArgument::resolved("Bar", NameForm::NameOf))
        );
    });
}

#[test]
fn test_helper_forwarding_its_name_parameter_is_a_raiser() {
    let mut b = CompilationBuilder::new();
    let string = b.keyword_type("string");
    let void = b.keyword_type("void");
    let vm = view_model(&mut b, "ViewModel");
    let notify = b.declare_method(
        vm.class,
        "Notify",
        void,
        Modifiers::PRIVATE,
        &[ParamSpec::new("name", string)],
    );
    let name = b.param(notify, 0);
    let name_arg = b.ident(name);
    let forward = call_raiser(&mut b, &vm, vec![name_arg]);
    let stmt = b.expr_stmt(forward);
    let body = b.block(vec![stmt]);
    b.define_method(notify, body);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let info = as_raiser_info(ctx, notify)
            .expect("not cancelled")
            .expect("raiser");
        assert_eq!(info.name_source, NameSource::Parameter(name));
        let inner = as_raiser_info(ctx, vm.raiser)
            .expect("not cancelled")
            .expect("raiser");
        assert_eq!(info.event_invocation, inner.event_invocation);
        assert_eq!(classify(ctx, notify), Ok(DescriptorRole::NotificationRaiser));
    });
}

#[test]
fn test_helper_raising_a_fixed_name_through_a_raiser_is_not_a_raiser() {
    let mut b = CompilationBuilder::new();
    let vm = view_model(&mut b, "ViewModel");
    let call = call_helper(&mut b, vm.class, "UpdateBar", |b| {
        let name = b.string("Bar");
        vec![call_raiser(b, &vm, vec![name])]
    });
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let helper = ctx.referenced(call).expect("helper");
        assert!(as_raiser_info(ctx, helper).expect("not cancelled").is_none());
        assert_eq!(classify(ctx, helper), Ok(DescriptorRole::None));
    });
}

#[test]
fn test_mutually_forwarding_methods_terminate() {
    let mut b = CompilationBuilder::new();
    let string = b.keyword_type("string");
    let void = b.keyword_type("void");
    let class = b.add_class("ViewModel", SymbolId::NONE);
    b.property_changed_event(class);
    let ping = b.declare_method(
        class,
        "Ping",
        void,
        Modifiers::PRIVATE,
        &[ParamSpec::new("name", string)],
    );
    let pong = b.declare_method(
        class,
        "Pong",
        void,
        Modifiers::PRIVATE,
        &[ParamSpec::new("name", string)],
    );
    for (from, to) in [(ping, pong), (pong, ping)] {
        let param = b.param(from, 0);
        let arg = b.ident(param);
        let this = b.this_expr(class);
        let call = b.call(Some(this), to, vec![arg]);
        b.define_method(from, call);
    }
    let comp = b.finish();

    with_context(&comp, |ctx| {
        assert!(as_raiser_info(ctx, ping).expect("not cancelled").is_none());
        assert!(as_raiser_info(ctx, pong).expect("not cancelled").is_none());
    });
}

#[test]
fn test_change_callback_declared_before_accessors_is_not_the_setter() {
    let mut b = CompilationBuilder::new();
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let object = b.keyword_type("object");
    let void = b.keyword_type("void");
    let element_ty = b.type_of_symbol(fw.dependency_object);
    let class = b.add_class("Attached", SymbolId::NONE);
    let callback = b.declare_method(
        class,
        "OnBarChanged",
        void,
        Modifiers::PRIVATE | Modifiers::STATIC,
        &[ParamSpec::new("d", element_ty), ParamSpec::new("e", object)],
    );
    let default = b.default_of(int);
    let method_group = b.ident(callback);
    let metadata_ty = b.type_of_symbol(fw.property_metadata);
    let md = b.new_object(
        metadata_ty,
        fw.property_metadata_ctor_callback,
        vec![default, method_group],
    );
    let registration = register(&mut b, fw.register_attached, "Bar", int, class, Some(md));
    let descriptor = descriptor_field(&mut b, class, "BarProperty", registration);
    let d = b.param(callback, 0);
    let e = b.param(callback, 1);
    let target = b.ident(d);
    let field_arg = b.ident(descriptor);
    let value_arg = b.ident(e);
    let body = b.call(Some(target), fw.set_value, vec![field_arg, value_arg]);
    b.define_method(callback, body);
    let (getter, setter) = attached_accessors(&mut b, class, "Bar", int, int, descriptor);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let info = registration_of(ctx, registration).expect("registration");
        assert_eq!(info.change_callback, Some(callback));
        let pair =
            find_accessors(ctx, class, Some(descriptor), None, Some(&info)).expect("not cancelled");
        assert_eq!(pair.getter, Some(getter));
        assert_eq!(pair.setter, Some(setter));
        assert_eq!(classify(ctx, callback), Ok(DescriptorRole::None));
    });
}

#[test]
fn test_locate_orders_partial_declarations_by_path() {
    let mut b = CompilationBuilder::new();
    let int = b.keyword_type("int");
    b.add_file("b/Foo.cs");
    let class = b.add_class("Foo", SymbolId::NONE);
    b.field(class, "x", int, Modifiers::PRIVATE, NodeIndex::NONE);
    let first_file = b.add_file("a/Foo.cs");
    b.field(class, "y", int, Modifiers::PRIVATE, NodeIndex::NONE);
    let comp = b.finish();

    with_context(&comp, |ctx| {
        let refs = locate(ctx, class);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].file(), first_file);
        assert_eq!(
            comp.file(refs[1].file()).map(|f| f.path.as_str()),
            Some("b/Foo.cs")
        );
        assert!(!refs[0].precedes_in_same_file(&refs[1]));
        assert_eq!(first_declaration(ctx, class), Some(refs[0]));
        assert!(locate(ctx, SymbolId::NONE).is_empty());
    });
}
