//! Analyzer Benchmark
//!
//! Measures whole-compilation analysis over generated view models and controls,
//! sequential against the rayon pool.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use wpfa::syntax::{Modifiers, NodeIndex, ParamSpec, SymbolId};
use wpfa::{Analyzer, AnalyzerOptions, CancellationToken, Compilation, CompilationBuilder};

// =============================================================================
// Generated sources
// =============================================================================

/// `class ViewModel{n} : INotifyPropertyChanged` with `properties` guarded setters,
/// every fourth one raising the wrong name.
fn add_view_model(b: &mut CompilationBuilder, n: usize, properties: usize) {
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let string = b.keyword_type("string");
    let void = b.keyword_type("void");
    let class = b.add_class(&format!("ViewModel{n}"), SymbolId::NONE);
    let event = b.property_changed_event(class);

    let raiser = b.declare_method(
        class,
        "OnPropertyChanged",
        void,
        Modifiers::PROTECTED | Modifiers::VIRTUAL,
        &[ParamSpec::new("propertyName", string).caller_member_name()],
    );
    let param = b.param(raiser, 0);
    let name_arg = b.ident(param);
    let args_ty = b.type_of_symbol(fw.property_changed_event_args);
    let args = b.new_object(args_ty, fw.property_changed_event_args_ctor, vec![name_arg]);
    let handler = b.this_member(class, event);
    let callee = b.member_conditional(handler, fw.handler_invoke);
    let sender = b.this_expr(class);
    let invoke = b.invoke(callee, vec![sender, args]);
    let stmt = b.expr_stmt(invoke);
    let body = b.block(vec![stmt]);
    b.define_method(raiser, body);

    for p in 0..properties {
        let field = b.field(class, &format!("_value{p}"), int, Modifiers::PRIVATE, NodeIndex::NONE);
        let property = b.declare_property(class, &format!("Value{p}"), int, Modifiers::PUBLIC);
        let value = b.value_param(property);

        let value_read = b.ident(value);
        let field_read = b.this_member(class, field);
        let condition = b.eq(value_read, field_read);
        let ret = b.ret(NodeIndex::NONE);
        let then_branch = b.block(vec![ret]);
        let guard = b.if_stmt(condition, then_branch, NodeIndex::NONE);

        let target = b.this_member(class, field);
        let value_read = b.ident(value);
        let assignment = b.assign(target, value_read);
        let assign = b.expr_stmt(assignment);

        let this = b.this_expr(class);
        let raise_args = if p % 4 == 3 {
            vec![b.string("Wrong")]
        } else {
            Vec::new()
        };
        let raise = b.call(Some(this), raiser, raise_args);
        let raise = b.expr_stmt(raise);

        let setter = b.block(vec![guard, assign, raise]);
        let getter = b.this_member(class, field);
        b.define_property(property, getter, setter);
    }
}

/// `class Control{n} : FrameworkElement` with `properties` registered properties.
fn add_control(b: &mut CompilationBuilder, n: usize, properties: usize) {
    let fw = b.framework().clone();
    let int = b.keyword_type("int");
    let dp_ty = b.type_of_symbol(fw.dependency_property);
    let class = b.add_class(&format!("Control{n}"), fw.framework_element);
    let owner_ty = b.type_of_symbol(class);

    for p in 0..properties {
        let name = format!("Value{p}");
        let name_arg = b.string(&name);
        let registered_arg = b.type_of_expr(int);
        let owner_arg = b.type_of_expr(owner_ty);
        let callee = b.static_member(fw.register);
        let registration = b.invoke(callee, vec![name_arg, registered_arg, owner_arg]);
        let descriptor = b.field(
            class,
            &format!("{name}Property"),
            dp_ty,
            Modifiers::PUBLIC_STATIC_READONLY,
            registration,
        );

        let property = b.declare_property(class, &name, int, Modifiers::PUBLIC);
        let this = b.this_expr(class);
        let field_arg = b.ident(descriptor);
        let read = b.call(Some(this), fw.get_value, vec![field_arg]);
        let getter = b.cast(int, read);
        let this = b.this_expr(class);
        let field_arg = b.ident(descriptor);
        let value = b.value_param(property);
        let value_arg = b.ident(value);
        let setter = b.call(Some(this), fw.set_value, vec![field_arg, value_arg]);
        b.define_property(property, getter, setter);
    }
}

fn generate_compilation(files: usize, properties: usize) -> Compilation {
    let mut b = CompilationBuilder::new();
    for n in 0..files {
        b.add_file(format!("ViewModel{n}.cs"));
        add_view_model(&mut b, n, properties);
        b.add_file(format!("Control{n}.cs"));
        add_control(&mut b, n, properties);
    }
    b.finish()
}

fn options(parallel: bool) -> AnalyzerOptions {
    AnalyzerOptions {
        parallel: Some(parallel),
        ..AnalyzerOptions::default()
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_analyze_small(c: &mut Criterion) {
    let comp = generate_compilation(1, 8);
    let analyzer = Analyzer::new(options(false));
    let token = CancellationToken::new();
    c.bench_function("analyze_small", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(&comp), &token)));
    });
}

fn bench_analyze_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_throughput");
    let token = CancellationToken::new();

    for files in [4usize, 16, 64] {
        let comp = generate_compilation(files, 16);
        group.throughput(Throughput::Elements((files * 2) as u64));
        for parallel in [false, true] {
            let analyzer = Analyzer::new(options(parallel));
            let mode = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(mode, files), &comp, |b, comp| {
                b.iter(|| black_box(analyzer.analyze(comp, &token)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_analyze_small, bench_analyze_throughput);
criterion_main!(benches);
