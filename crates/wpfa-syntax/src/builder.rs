//! `CompilationBuilder` assembles a resolved `Compilation` node by node.
//!
//! The builder plays the part of a front end: every node it creates is already
//! bound (declared symbols, referenced symbols and expression types are recorded
//! as the node is allocated). Nodes are laid out in creation order within their
//! source unit, so a member defined later has a later span.
//!
//! Symbols can be declared before their syntax exists (`declare_*`) and given a
//! declaration later (`define_*`). That is how a field initializer can reference a
//! field declared further down the file.

use crate::base::{NodeIndex, SymbolId, TypeId};
use crate::compilation::Compilation;
use crate::framework::FrameworkSymbols;
use crate::model::SourceFile;
use crate::node::{
    AccessorKind, BinaryOperator, LiteralKind, Modifiers, Node, NodeData, ParameterFlags,
};
use crate::symbols::{Symbol, SymbolKind};
use crate::types::{KEYWORD_TYPES, TypeData};
use rustc_hash::FxHashMap;
use wpfa_common::{FileId, Span};

/// Parameter declaration used by `declare_method` and friends.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec<'a> {
    pub name: &'a str,
    pub ty: TypeId,
    pub flags: ParameterFlags,
}

impl<'a> ParamSpec<'a> {
    pub fn new(name: &'a str, ty: TypeId) -> Self {
        Self {
            name,
            ty,
            flags: ParameterFlags::empty(),
        }
    }

    /// `this` parameter of an extension method.
    #[must_use]
    pub fn this_param(mut self) -> Self {
        self.flags |= ParameterFlags::THIS;
        self
    }

    /// `[CallerMemberName] string name = null`.
    #[must_use]
    pub fn caller_member_name(mut self) -> Self {
        self.flags |= ParameterFlags::CALLER_MEMBER_NAME | ParameterFlags::OPTIONAL;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.flags |= ParameterFlags::OPTIONAL;
        self
    }
}

pub struct CompilationBuilder {
    comp: Compilation,
    current_file: FileId,
    cursors: Vec<u32>,
    /// Open declaration of a type within a source unit.
    open_decls: FxHashMap<(SymbolId, FileId), NodeIndex>,
    keywords: FxHashMap<&'static str, SymbolId>,
    void: TypeId,
}

impl CompilationBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            comp: Compilation::default(),
            current_file: FileId::NONE,
            cursors: Vec::new(),
            open_decls: FxHashMap::default(),
            keywords: FxHashMap::default(),
            void: TypeId::NONE,
        };
        builder.install_framework();
        builder
    }

    pub fn finish(self) -> Compilation {
        self.comp
    }

    pub fn framework(&self) -> &FrameworkSymbols {
        &self.comp.framework
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.comp.symbols.get(id)
    }

    // =========================================================================
    // Source units
    // =========================================================================

    /// Add a source unit and make it current.
    pub fn add_file(&mut self, path: impl Into<String>) -> FileId {
        let id = FileId(self.comp.files.len() as u32);
        self.cursors.push(0);
        self.current_file = id;
        let root = self.alloc(NodeData::SourceFile {
            members: Vec::new(),
        });
        self.comp.files.push(SourceFile {
            id,
            path: path.into(),
            root,
            is_generated: false,
        });
        id
    }

    /// Mark a source unit as tool-generated.
    pub fn mark_generated(&mut self, file: FileId) {
        if let Some(source) = self.comp.files.get_mut(file.0 as usize) {
            source.is_generated = true;
        }
    }

    /// Make an existing source unit current.
    pub fn set_current_file(&mut self, file: FileId) {
        if (file.0 as usize) < self.comp.files.len() {
            self.current_file = file;
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Predefined type for a language keyword (`int`, `string`, `void`, ...).
    pub fn keyword_type(&mut self, keyword: &str) -> TypeId {
        if keyword == "void" {
            return self.void;
        }
        self.keywords
            .get(keyword)
            .and_then(|sym| self.comp.symbols.get(*sym))
            .map_or(TypeId::NONE, |symbol| symbol.ty)
    }

    /// Declared type of a type symbol.
    pub fn type_of_symbol(&self, type_symbol: SymbolId) -> TypeId {
        self.comp
            .symbols
            .get(type_symbol)
            .map_or(TypeId::NONE, |symbol| symbol.ty)
    }

    /// `T?`
    pub fn nullable(&mut self, inner: TypeId) -> TypeId {
        self.comp.types.intern(TypeData::Nullable(inner))
    }

    /// `T[]`
    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.comp
            .types
            .intern(TypeData::Array { element, rank: 1 })
    }

    /// Instantiation of a generic definition, e.g. `Nullable<int>`.
    pub fn generic(&mut self, definition: SymbolId, args: &[TypeId]) -> TypeId {
        let Some(symbol) = self.comp.symbols.get(definition) else {
            return TypeId::NONE;
        };
        let data = TypeData::Named {
            namespace: symbol.namespace.clone(),
            name: symbol.name.clone(),
            args: args.to_vec(),
            symbol: definition,
            keyword: None,
        };
        self.comp.types.intern(data)
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    /// Declare a class in the current source unit.
    pub fn add_class(&mut self, name: &str, base: SymbolId) -> SymbolId {
        self.add_class_with("", name, base, Modifiers::PUBLIC)
    }

    pub fn add_class_with(
        &mut self,
        namespace: &str,
        name: &str,
        base: SymbolId,
        modifiers: Modifiers,
    ) -> SymbolId {
        let base = if base.is_none() {
            self.comp.framework.object
        } else {
            base
        };
        let class = self.new_type_symbol(namespace, name, base, None, modifiers);
        self.open_decl(class);
        class
    }

    /// The declaration of `class` in the current source unit, created on first use.
    /// A second source unit declaring members of the same class yields a partial
    /// declaration.
    fn open_decl(&mut self, class: SymbolId) -> NodeIndex {
        self.ensure_file();
        let key = (class, self.current_file);
        if let Some(&decl) = self.open_decls.get(&key) {
            return decl;
        }
        let (name, modifiers) = match self.comp.symbols.get(class) {
            Some(symbol) => (symbol.name.clone(), symbol.modifiers),
            None => (String::new(), Modifiers::empty()),
        };
        let decl = self.alloc(NodeData::TypeDeclaration {
            name,
            modifiers,
            members: Vec::new(),
        });
        self.declare_node(decl, class);
        let root = self.file_root(self.current_file);
        self.attach_child(root, decl);
        self.open_decls.insert(key, decl);
        decl
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn declare_field(
        &mut self,
        owner: SymbolId,
        name: &str,
        ty: TypeId,
        modifiers: Modifiers,
    ) -> SymbolId {
        self.new_member(owner, name, SymbolKind::Field, ty, modifiers)
    }

    /// Give a declared field its declaration in the current source unit.
    pub fn define_field(&mut self, field: SymbolId, initializer: NodeIndex) -> NodeIndex {
        let Some((name, ty, modifiers, owner)) = self.member_parts(field) else {
            return NodeIndex::NONE;
        };
        let ty_node = self.type_syntax(ty);
        let declarator = self.alloc(NodeData::VariableDeclarator { name, initializer });
        self.declare_node(declarator, field);
        let decl = self.alloc(NodeData::FieldDeclaration {
            modifiers,
            ty: ty_node,
            declarators: vec![declarator],
        });
        self.attach_member(owner, decl);
        decl
    }

    /// Declare and define a field in one step.
    pub fn field(
        &mut self,
        owner: SymbolId,
        name: &str,
        ty: TypeId,
        modifiers: Modifiers,
        initializer: NodeIndex,
    ) -> SymbolId {
        let field = self.declare_field(owner, name, ty, modifiers);
        self.define_field(field, initializer);
        field
    }

    /// `public event PropertyChangedEventHandler PropertyChanged;`
    pub fn event_field(&mut self, owner: SymbolId, name: &str, ty: TypeId) -> SymbolId {
        let event = self.new_member(owner, name, SymbolKind::Event, ty, Modifiers::PUBLIC);
        let ty_node = self.type_syntax(ty);
        let declarator = self.alloc(NodeData::VariableDeclarator {
            name: name.to_string(),
            initializer: NodeIndex::NONE,
        });
        self.declare_node(declarator, event);
        let decl = self.alloc(NodeData::EventFieldDeclaration {
            modifiers: Modifiers::PUBLIC,
            ty: ty_node,
            declarators: vec![declarator],
        });
        self.attach_member(owner, decl);
        event
    }

    /// `public event PropertyChangedEventHandler PropertyChanged;` with the framework handler type.
    pub fn property_changed_event(&mut self, owner: SymbolId) -> SymbolId {
        let handler = self.type_of_symbol(self.comp.framework.property_changed_event_handler);
        self.event_field(owner, "PropertyChanged", handler)
    }

    /// Declare a property and its implicit setter `value` parameter.
    pub fn declare_property(
        &mut self,
        owner: SymbolId,
        name: &str,
        ty: TypeId,
        modifiers: Modifiers,
    ) -> SymbolId {
        let property = self.new_member(owner, name, SymbolKind::Property, ty, modifiers);
        self.new_parameter(property, ParamSpec::new("value", ty), 0);
        property
    }

    /// Define a property with optional getter/setter bodies (`NONE` to omit).
    pub fn define_property(
        &mut self,
        property: SymbolId,
        getter: NodeIndex,
        setter: NodeIndex,
    ) -> NodeIndex {
        let Some((name, ty, modifiers, owner)) = self.member_parts(property) else {
            return NodeIndex::NONE;
        };
        let ty_node = self.type_syntax(ty);
        let accessors = self.accessors(getter, setter);
        let decl = self.alloc(NodeData::PropertyDeclaration {
            name,
            modifiers,
            ty: ty_node,
            accessors,
        });
        self.declare_node(decl, property);
        self.attach_member(owner, decl);
        decl
    }

    /// Declare an indexer `this[...]`; the setter `value` parameter is appended.
    pub fn declare_indexer(
        &mut self,
        owner: SymbolId,
        ty: TypeId,
        modifiers: Modifiers,
        params: &[ParamSpec<'_>],
    ) -> SymbolId {
        let indexer = self.new_member(owner, "this[]", SymbolKind::Indexer, ty, modifiers);
        for (ordinal, spec) in params.iter().enumerate() {
            self.new_parameter(indexer, *spec, ordinal as u32);
        }
        self.new_parameter(indexer, ParamSpec::new("value", ty), params.len() as u32);
        indexer
    }

    pub fn define_indexer(
        &mut self,
        indexer: SymbolId,
        getter: NodeIndex,
        setter: NodeIndex,
    ) -> NodeIndex {
        let Some((_, ty, modifiers, owner)) = self.member_parts(indexer) else {
            return NodeIndex::NONE;
        };
        let ty_node = self.type_syntax(ty);
        let mut params = self.parameters_of(indexer);
        // The implicit `value` parameter has no syntax.
        params.pop();
        let parameters = self.parameter_nodes(&params);
        let accessors = self.accessors(getter, setter);
        let decl = self.alloc(NodeData::IndexerDeclaration {
            modifiers,
            ty: ty_node,
            parameters,
            accessors,
        });
        self.declare_node(decl, indexer);
        self.attach_member(owner, decl);
        decl
    }

    pub fn declare_method(
        &mut self,
        owner: SymbolId,
        name: &str,
        return_type: TypeId,
        modifiers: Modifiers,
        params: &[ParamSpec<'_>],
    ) -> SymbolId {
        let method = self.new_member(owner, name, SymbolKind::Method, return_type, modifiers);
        for (ordinal, spec) in params.iter().enumerate() {
            self.new_parameter(method, *spec, ordinal as u32);
        }
        method
    }

    /// Define a method. `body` is a block, an expression (expression-bodied), or `NONE`.
    pub fn define_method(&mut self, method: SymbolId, body: NodeIndex) -> NodeIndex {
        let Some((name, return_type, modifiers, owner)) = self.member_parts(method) else {
            return NodeIndex::NONE;
        };
        let return_node = self.type_syntax(return_type);
        let params = self.parameters_of(method);
        let parameters = self.parameter_nodes(&params);
        let decl = self.alloc(NodeData::MethodDeclaration {
            name,
            modifiers,
            return_type: return_node,
            parameters,
            body,
        });
        self.declare_node(decl, method);
        self.attach_member(owner, decl);
        decl
    }

    pub fn declare_constructor(
        &mut self,
        owner: SymbolId,
        modifiers: Modifiers,
        params: &[ParamSpec<'_>],
    ) -> SymbolId {
        let owner_ty = self.type_of_symbol(owner);
        let ctor = self.new_member(owner, ".ctor", SymbolKind::Constructor, owner_ty, modifiers);
        for (ordinal, spec) in params.iter().enumerate() {
            self.new_parameter(ctor, *spec, ordinal as u32);
        }
        ctor
    }

    pub fn define_constructor(&mut self, ctor: SymbolId, body: NodeIndex) -> NodeIndex {
        let Some((_, _, modifiers, owner)) = self.member_parts(ctor) else {
            return NodeIndex::NONE;
        };
        let params = self.parameters_of(ctor);
        let parameters = self.parameter_nodes(&params);
        let decl = self.alloc(NodeData::ConstructorDeclaration {
            modifiers,
            parameters,
            body,
        });
        self.declare_node(decl, ctor);
        self.attach_member(owner, decl);
        decl
    }

    /// Parameter `index` of a method, constructor, property or indexer.
    pub fn param(&self, member: SymbolId, index: usize) -> SymbolId {
        self.comp
            .symbols
            .get(member)
            .and_then(|symbol| symbol.parameters.get(index).copied())
            .unwrap_or(SymbolId::NONE)
    }

    /// The implicit `value` parameter of a property or indexer setter.
    pub fn value_param(&self, property: SymbolId) -> SymbolId {
        self.comp
            .symbols
            .get(property)
            .and_then(|symbol| symbol.parameters.last().copied())
            .unwrap_or(SymbolId::NONE)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn this_expr(&mut self, class: SymbolId) -> NodeIndex {
        let idx = self.alloc(NodeData::ThisExpression);
        let ty = self.type_of_symbol(class);
        self.set_type(idx, ty);
        idx
    }

    pub fn base_expr(&mut self, class: SymbolId) -> NodeIndex {
        let idx = self.alloc(NodeData::BaseExpression);
        let base = self
            .comp
            .symbols
            .get(class)
            .map_or(SymbolId::NONE, |symbol| symbol.base_type);
        let ty = self.type_of_symbol(base);
        self.set_type(idx, ty);
        idx
    }

    /// Simple name referring to `symbol`.
    pub fn ident(&mut self, symbol: SymbolId) -> NodeIndex {
        let name = self.symbol_name(symbol);
        let idx = self.alloc(NodeData::Identifier { name });
        self.bind_reference(idx, symbol);
        idx
    }

    /// `target.member`
    pub fn member(&mut self, target: NodeIndex, member: SymbolId) -> NodeIndex {
        self.member_access(target, member, false)
    }

    /// `target?.member`
    pub fn member_conditional(&mut self, target: NodeIndex, member: SymbolId) -> NodeIndex {
        self.member_access(target, member, true)
    }

    /// `this.member`
    pub fn this_member(&mut self, class: SymbolId, member: SymbolId) -> NodeIndex {
        let this = self.this_expr(class);
        self.member(this, member)
    }

    /// `Type.member` for a static member.
    pub fn static_member(&mut self, member: SymbolId) -> NodeIndex {
        let owner = self
            .comp
            .symbols
            .get(member)
            .map_or(SymbolId::NONE, |symbol| symbol.containing_type);
        let target = self.ident(owner);
        self.member(target, member)
    }

    fn member_access(&mut self, target: NodeIndex, member: SymbolId, conditional: bool) -> NodeIndex {
        let name = self.symbol_name(member);
        let idx = self.alloc(NodeData::MemberAccess {
            target,
            name,
            conditional,
        });
        self.bind_reference(idx, member);
        idx
    }

    /// `callee(args)`. Binds the invoked method: a method group binds directly,
    /// a delegate-typed value binds its type's `Invoke`.
    pub fn invoke(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        let idx = self.alloc(NodeData::Invocation { callee, arguments });
        let Some(target) = self.comp.references.get(&callee).copied() else {
            return idx;
        };
        let invoked = match self.comp.symbols.get(target) {
            Some(symbol) if symbol.is_method_like() => Some(target),
            Some(symbol) => self.delegate_invoke(symbol.ty),
            None => None,
        };
        if let Some(method) = invoked {
            self.comp.references.insert(idx, method);
            let ret = self
                .comp
                .symbols
                .get(method)
                .map_or(TypeId::NONE, |symbol| symbol.ty);
            if ret != self.void {
                self.set_type(idx, ret);
            }
        }
        idx
    }

    /// `receiver.method(args)`, or `method(args)` without a receiver.
    pub fn call(
        &mut self,
        receiver: Option<NodeIndex>,
        method: SymbolId,
        arguments: Vec<NodeIndex>,
    ) -> NodeIndex {
        let callee = match receiver {
            Some(receiver) => self.member(receiver, method),
            None => self.ident(method),
        };
        self.invoke(callee, arguments)
    }

    pub fn string(&mut self, text: &str) -> NodeIndex {
        let idx = self.alloc(NodeData::Literal {
            kind: LiteralKind::String,
            text: text.to_string(),
        });
        let ty = self.keyword_type("string");
        self.set_type(idx, ty);
        idx
    }

    pub fn null(&mut self) -> NodeIndex {
        self.alloc(NodeData::Literal {
            kind: LiteralKind::Null,
            text: "null".to_string(),
        })
    }

    pub fn number(&mut self, text: &str) -> NodeIndex {
        let idx = self.alloc(NodeData::Literal {
            kind: LiteralKind::Number,
            text: text.to_string(),
        });
        let ty = self.keyword_type("int");
        self.set_type(idx, ty);
        idx
    }

    pub fn boolean(&mut self, value: bool) -> NodeIndex {
        let idx = self.alloc(NodeData::Literal {
            kind: LiteralKind::Boolean,
            text: value.to_string(),
        });
        let ty = self.keyword_type("bool");
        self.set_type(idx, ty);
        idx
    }

    /// `default(T)`
    pub fn default_of(&mut self, ty: TypeId) -> NodeIndex {
        let text = format!("default({})", self.comp.types.display(ty));
        let idx = self.alloc(NodeData::Literal {
            kind: LiteralKind::Default,
            text,
        });
        self.set_type(idx, ty);
        idx
    }

    /// `nameof(operand)`
    pub fn name_of(&mut self, operand: NodeIndex) -> NodeIndex {
        let idx = self.alloc(NodeData::NameOf { operand });
        let ty = self.keyword_type("string");
        self.set_type(idx, ty);
        idx
    }

    /// `typeof(T)`
    pub fn type_of_expr(&mut self, ty: TypeId) -> NodeIndex {
        let ty_node = self.type_syntax(ty);
        let idx = self.alloc(NodeData::TypeOf { ty: ty_node });
        let system_type = self.type_of_symbol(self.comp.framework.system_type);
        self.set_type(idx, system_type);
        idx
    }

    /// `new T(args)` binding constructor `ctor`.
    pub fn new_object(&mut self, ty: TypeId, ctor: SymbolId, arguments: Vec<NodeIndex>) -> NodeIndex {
        let ty_node = self.type_syntax(ty);
        let idx = self.alloc(NodeData::ObjectCreation {
            ty: ty_node,
            arguments,
        });
        if ctor.is_some() {
            self.comp.references.insert(idx, ctor);
        }
        self.set_type(idx, ty);
        idx
    }

    pub fn assign(&mut self, target: NodeIndex, value: NodeIndex) -> NodeIndex {
        let idx = self.alloc(NodeData::Assignment { target, value });
        if let Some(ty) = self.comp.node_types.get(&target).copied() {
            self.set_type(idx, ty);
        }
        idx
    }

    pub fn binary(&mut self, operator: BinaryOperator, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        let idx = self.alloc(NodeData::BinaryExpression {
            operator,
            left,
            right,
        });
        if matches!(
            operator,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::LogicalAnd
                | BinaryOperator::LogicalOr
        ) {
            let ty = self.keyword_type("bool");
            self.set_type(idx, ty);
        }
        idx
    }

    /// `left == right`
    pub fn eq(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(BinaryOperator::Equals, left, right)
    }

    /// `left != right`
    pub fn not_eq(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(BinaryOperator::NotEquals, left, right)
    }

    /// `!operand`
    pub fn not(&mut self, operand: NodeIndex) -> NodeIndex {
        let idx = self.alloc(NodeData::UnaryNot { operand });
        let ty = self.keyword_type("bool");
        self.set_type(idx, ty);
        idx
    }

    /// `(T)operand`
    pub fn cast(&mut self, ty: TypeId, operand: NodeIndex) -> NodeIndex {
        let ty_node = self.type_syntax(ty);
        let idx = self.alloc(NodeData::Cast {
            ty: ty_node,
            operand,
        });
        self.set_type(idx, ty);
        idx
    }

    /// `condition ? when_true : when_false`
    pub fn conditional(
        &mut self,
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    ) -> NodeIndex {
        let idx = self.alloc(NodeData::Conditional {
            condition,
            when_true,
            when_false,
        });
        if let Some(ty) = self.comp.node_types.get(&when_true).copied() {
            self.set_type(idx, ty);
        }
        idx
    }

    pub fn type_syntax(&mut self, ty: TypeId) -> NodeIndex {
        let text = self.comp.types.display(ty);
        let idx = self.alloc(NodeData::TypeSyntax { text });
        self.set_type(idx, ty);
        idx
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.alloc(NodeData::ExpressionStatement { expression })
    }

    /// `return expression;` (`NONE` for a bare `return;`)
    pub fn ret(&mut self, expression: NodeIndex) -> NodeIndex {
        self.alloc(NodeData::ReturnStatement { expression })
    }

    pub fn if_stmt(
        &mut self,
        condition: NodeIndex,
        then_branch: NodeIndex,
        else_branch: NodeIndex,
    ) -> NodeIndex {
        self.alloc(NodeData::IfStatement {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.alloc(NodeData::Block { statements })
    }

    /// `var name = initializer;` inside `member`. Returns the statement and the local.
    pub fn local(
        &mut self,
        member: SymbolId,
        name: &str,
        initializer: NodeIndex,
    ) -> (NodeIndex, SymbolId) {
        let ty = self
            .comp
            .node_types
            .get(&initializer)
            .copied()
            .unwrap_or(TypeId::NONE);
        let containing_type = self
            .comp
            .symbols
            .get(member)
            .map_or(SymbolId::NONE, |symbol| symbol.containing_type);
        let local = self.comp.symbols.alloc(name, SymbolKind::Local, |symbol| {
            symbol.ty = ty;
            symbol.container = member;
            symbol.containing_type = containing_type;
        });
        let stmt = self.alloc(NodeData::LocalDeclaration {
            name: name.to_string(),
            initializer,
        });
        self.declare_node(stmt, local);
        (stmt, local)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_file(&mut self) {
        if self.comp.files.is_empty() {
            self.add_file("Source.cs");
        }
    }

    /// Allocate a node at the end of the current source unit. Its span covers its
    /// own token and every child in the same unit; children get their parent set.
    fn alloc(&mut self, data: NodeData) -> NodeIndex {
        if self.current_file.is_none() {
            self.add_file("Source.cs");
        }
        let file = self.current_file;
        let width = token_width(&data);
        let start = self.cursors.get(file.0 as usize).copied().unwrap_or(0);
        if let Some(cursor) = self.cursors.get_mut(file.0 as usize) {
            *cursor = start + width + 1;
        }
        let children = data.children();
        let mut span = Span::new(start, start + width);
        for child in &children {
            if let Some(node) = self.comp.arena.get(*child)
                && node.file == file
            {
                span = span.cover(node.span);
            }
        }
        let idx = self.comp.arena.add(Node {
            file,
            span,
            parent: NodeIndex::NONE,
            data,
        });
        for child in children {
            if let Some(node) = self.comp.arena.get_mut(child) {
                node.parent = idx;
            }
        }
        idx
    }

    fn file_root(&self, file: FileId) -> NodeIndex {
        self.comp
            .files
            .get(file.0 as usize)
            .map_or(NodeIndex::NONE, |source| source.root)
    }

    /// Append `child` to a container node (`SourceFile` or `TypeDeclaration`).
    fn attach_child(&mut self, container: NodeIndex, child: NodeIndex) {
        let child_span = match self.comp.arena.get_mut(child) {
            Some(node) => {
                node.parent = container;
                node.span
            }
            None => return,
        };
        let mut current = container;
        if let Some(node) = self.comp.arena.get_mut(container) {
            match &mut node.data {
                NodeData::SourceFile { members } | NodeData::TypeDeclaration { members, .. } => {
                    members.push(child);
                }
                _ => return,
            }
        }
        // Grow the container and its ancestors to cover the new child.
        while let Some(node) = self.comp.arena.get_mut(current) {
            node.span = node.span.cover(child_span);
            current = node.parent;
        }
    }

    fn attach_member(&mut self, owner: SymbolId, member: NodeIndex) {
        let decl = self.open_decl(owner);
        self.attach_child(decl, member);
    }

    fn declare_node(&mut self, node: NodeIndex, symbol: SymbolId) {
        self.comp.declared.insert(node, symbol);
        if let Some(sym) = self.comp.symbols.get_mut(symbol) {
            sym.declarations.push(node);
        }
    }

    fn bind_reference(&mut self, node: NodeIndex, symbol: SymbolId) {
        let Some(sym) = self.comp.symbols.get(symbol) else {
            return;
        };
        let ty = match sym.kind {
            SymbolKind::Method | SymbolKind::Constructor => TypeId::NONE,
            _ => sym.ty,
        };
        self.comp.references.insert(node, symbol);
        self.set_type(node, ty);
    }

    fn set_type(&mut self, node: NodeIndex, ty: TypeId) {
        if ty.is_some() {
            self.comp.node_types.insert(node, ty);
        }
    }

    fn symbol_name(&self, symbol: SymbolId) -> String {
        self.comp
            .symbols
            .get(symbol)
            .map(|sym| sym.name.clone())
            .unwrap_or_default()
    }

    fn member_parts(&self, member: SymbolId) -> Option<(String, TypeId, Modifiers, SymbolId)> {
        let symbol = self.comp.symbols.get(member)?;
        Some((
            symbol.name.clone(),
            symbol.ty,
            symbol.modifiers,
            symbol.containing_type,
        ))
    }

    fn parameters_of(&self, member: SymbolId) -> Vec<SymbolId> {
        self.comp
            .symbols
            .get(member)
            .map(|symbol| symbol.parameters.clone())
            .unwrap_or_default()
    }

    fn parameter_nodes(&mut self, params: &[SymbolId]) -> Vec<NodeIndex> {
        let mut nodes = Vec::with_capacity(params.len());
        for &param in params {
            let Some(symbol) = self.comp.symbols.get(param) else {
                continue;
            };
            let (name, ty, flags) = (symbol.name.clone(), symbol.ty, symbol.parameter_flags);
            let ty_node = self.type_syntax(ty);
            let default = if flags.contains(ParameterFlags::OPTIONAL) {
                self.null()
            } else {
                NodeIndex::NONE
            };
            let node = self.alloc(NodeData::Parameter {
                name,
                ty: ty_node,
                flags,
                default,
            });
            self.declare_node(node, param);
            nodes.push(node);
        }
        nodes
    }

    fn accessors(&mut self, getter: NodeIndex, setter: NodeIndex) -> Vec<NodeIndex> {
        let mut accessors = Vec::new();
        if getter.is_some() {
            accessors.push(self.alloc(NodeData::Accessor {
                kind: AccessorKind::Get,
                body: getter,
            }));
        }
        if setter.is_some() {
            accessors.push(self.alloc(NodeData::Accessor {
                kind: AccessorKind::Set,
                body: setter,
            }));
        }
        accessors
    }

    fn delegate_invoke(&self, delegate_ty: TypeId) -> Option<SymbolId> {
        let TypeData::Named { symbol, .. } = self.comp.types.get(delegate_ty)? else {
            return None;
        };
        let delegate = self.comp.symbols.get(*symbol)?;
        delegate.members.iter().copied().find(|member| {
            self.comp
                .symbols
                .get(*member)
                .is_some_and(|m| m.kind == SymbolKind::Method && m.name == "Invoke")
        })
    }

    fn new_type_symbol(
        &mut self,
        namespace: &str,
        name: &str,
        base: SymbolId,
        keyword: Option<&'static str>,
        modifiers: Modifiers,
    ) -> SymbolId {
        let sym = self.comp.symbols.alloc(name, SymbolKind::Type, |symbol| {
            symbol.namespace = namespace.to_string();
            symbol.base_type = base;
            symbol.modifiers = modifiers;
        });
        let ty = self.comp.types.intern(TypeData::Named {
            namespace: namespace.to_string(),
            name: name.to_string(),
            args: Vec::new(),
            symbol: sym,
            keyword,
        });
        if let Some(symbol) = self.comp.symbols.get_mut(sym) {
            symbol.ty = ty;
        }
        sym
    }

    fn new_member(
        &mut self,
        owner: SymbolId,
        name: &str,
        kind: SymbolKind,
        ty: TypeId,
        modifiers: Modifiers,
    ) -> SymbolId {
        let member = self.comp.symbols.alloc(name, kind, |symbol| {
            symbol.ty = ty;
            symbol.modifiers = modifiers;
            symbol.containing_type = owner;
            symbol.container = owner;
        });
        if let Some(owner) = self.comp.symbols.get_mut(owner) {
            owner.members.push(member);
        }
        member
    }

    fn new_parameter(&mut self, member: SymbolId, spec: ParamSpec<'_>, ordinal: u32) -> SymbolId {
        let containing_type = self
            .comp
            .symbols
            .get(member)
            .map_or(SymbolId::NONE, |symbol| symbol.containing_type);
        let param = self
            .comp
            .symbols
            .alloc(spec.name, SymbolKind::Parameter, |symbol| {
                symbol.ty = spec.ty;
                symbol.parameter_flags = spec.flags;
                symbol.ordinal = ordinal;
                symbol.container = member;
                symbol.containing_type = containing_type;
            });
        if let Some(owner) = self.comp.symbols.get_mut(member) {
            owner.parameters.push(param);
        }
        param
    }

    // =========================================================================
    // Framework metadata
    // =========================================================================

    fn metadata_type(&mut self, namespace: &str, name: &str, base: SymbolId) -> SymbolId {
        let keyword = KEYWORD_TYPES
            .iter()
            .find(|(_, ns, metadata_name)| *ns == namespace && *metadata_name == name)
            .map(|(keyword, _, _)| *keyword);
        let sym = self.new_type_symbol(namespace, name, base, keyword, Modifiers::PUBLIC);
        if let Some(keyword) = keyword {
            self.keywords.insert(keyword, sym);
        }
        sym
    }

    fn metadata_member(
        &mut self,
        owner: SymbolId,
        name: &str,
        kind: SymbolKind,
        ty: TypeId,
        modifiers: Modifiers,
        params: &[(&str, TypeId)],
    ) -> SymbolId {
        let member = self.new_member(owner, name, kind, ty, modifiers);
        for (ordinal, (param_name, param_ty)) in params.iter().enumerate() {
            self.new_parameter(member, ParamSpec::new(param_name, *param_ty), ordinal as u32);
        }
        member
    }

    fn install_framework(&mut self) {
        use SymbolKind::{Constructor, Event, Field, Method, Property};

        self.void = self.comp.types.intern(TypeData::Void);
        let public = Modifiers::PUBLIC;
        let public_static = Modifiers::PUBLIC | Modifiers::STATIC;

        let object = self.metadata_type("System", "Object", SymbolId::NONE);
        for (_, namespace, name) in KEYWORD_TYPES.iter().skip(1) {
            self.metadata_type(namespace, name, object);
        }
        let object_ty = self.type_of_symbol(object);
        let string_ty = self.keyword_type("string");
        let void = self.void;

        let mut fw = FrameworkSymbols {
            object,
            string: self.keywords.get("string").copied().unwrap_or(SymbolId::NONE),
            boolean: self.keywords.get("bool").copied().unwrap_or(SymbolId::NONE),
            int32: self.keywords.get("int").copied().unwrap_or(SymbolId::NONE),
            double: self.keywords.get("double").copied().unwrap_or(SymbolId::NONE),
            ..FrameworkSymbols::default()
        };
        fw.system_type = self.metadata_type("System", "Type", object);
        fw.nullable = self.metadata_type("System", "Nullable", object);
        fw.string_empty = self.metadata_member(
            fw.string,
            "Empty",
            Field,
            string_ty,
            Modifiers::PUBLIC_STATIC_READONLY,
            &[],
        );
        let bool_ty = self.keyword_type("bool");
        fw.object_equals = self.metadata_member(
            object,
            "Equals",
            Method,
            bool_ty,
            public_static,
            &[("objA", object_ty), ("objB", object_ty)],
        );
        fw.reference_equals = self.metadata_member(
            object,
            "ReferenceEquals",
            Method,
            bool_ty,
            public_static,
            &[("objA", object_ty), ("objB", object_ty)],
        );
        fw.collection = self.metadata_type("System.Collections.ObjectModel", "Collection", object);
        fw.observable_collection = self.metadata_type(
            "System.Collections.ObjectModel",
            "ObservableCollection",
            fw.collection,
        );
        let system_type_ty = self.type_of_symbol(fw.system_type);

        // System.Windows
        fw.dependency_object = self.metadata_type("System.Windows", "DependencyObject", object);
        fw.ui_element = self.metadata_type("System.Windows", "UIElement", fw.dependency_object);
        fw.framework_element =
            self.metadata_type("System.Windows", "FrameworkElement", fw.ui_element);
        fw.dependency_property = self.metadata_type("System.Windows", "DependencyProperty", object);
        fw.dependency_property_key =
            self.metadata_type("System.Windows", "DependencyPropertyKey", object);
        fw.property_metadata = self.metadata_type("System.Windows", "PropertyMetadata", object);
        fw.dependency_property_changed_event_args =
            self.metadata_type("System.Windows", "DependencyPropertyChangedEventArgs", object);
        let dp_ty = self.type_of_symbol(fw.dependency_property);
        let key_ty = self.type_of_symbol(fw.dependency_property_key);
        let metadata_ty = self.type_of_symbol(fw.property_metadata);

        let register_params = [
            ("name", string_ty),
            ("propertyType", system_type_ty),
            ("ownerType", system_type_ty),
            ("typeMetadata", metadata_ty),
        ];
        fw.register = self.metadata_member(
            fw.dependency_property,
            "Register",
            Method,
            dp_ty,
            public_static,
            &register_params,
        );
        fw.register_read_only = self.metadata_member(
            fw.dependency_property,
            "RegisterReadOnly",
            Method,
            key_ty,
            public_static,
            &register_params,
        );
        fw.register_attached = self.metadata_member(
            fw.dependency_property,
            "RegisterAttached",
            Method,
            dp_ty,
            public_static,
            &register_params,
        );
        fw.register_attached_read_only = self.metadata_member(
            fw.dependency_property,
            "RegisterAttachedReadOnly",
            Method,
            key_ty,
            public_static,
            &register_params,
        );
        fw.key_descriptor = self.metadata_member(
            fw.dependency_property_key,
            "DependencyProperty",
            Property,
            dp_ty,
            public,
            &[],
        );
        fw.get_value = self.metadata_member(
            fw.dependency_object,
            "GetValue",
            Method,
            object_ty,
            public,
            &[("dp", dp_ty)],
        );
        fw.set_value = self.metadata_member(
            fw.dependency_object,
            "SetValue",
            Method,
            void,
            public,
            &[("dp", dp_ty), ("value", object_ty)],
        );
        fw.set_value_key = self.metadata_member(
            fw.dependency_object,
            "SetValue",
            Method,
            void,
            public,
            &[("key", key_ty), ("value", object_ty)],
        );
        fw.set_current_value = self.metadata_member(
            fw.dependency_object,
            "SetCurrentValue",
            Method,
            void,
            public,
            &[("dp", dp_ty), ("value", object_ty)],
        );
        fw.property_metadata_ctor = self.metadata_member(
            fw.property_metadata,
            ".ctor",
            Constructor,
            metadata_ty,
            public,
            &[("defaultValue", object_ty)],
        );
        fw.property_metadata_ctor_callback = self.metadata_member(
            fw.property_metadata,
            ".ctor",
            Constructor,
            metadata_ty,
            public,
            &[("defaultValue", object_ty), ("propertyChangedCallback", object_ty)],
        );

        // System.ComponentModel
        fw.property_changed_event_args = self.metadata_type(
            "System.ComponentModel",
            "PropertyChangedEventArgs",
            object,
        );
        fw.property_changed_event_handler = self.metadata_type(
            "System.ComponentModel",
            "PropertyChangedEventHandler",
            object,
        );
        fw.inotify_property_changed =
            self.metadata_type("System.ComponentModel", "INotifyPropertyChanged", SymbolId::NONE);
        let args_ty = self.type_of_symbol(fw.property_changed_event_args);
        let handler_ty = self.type_of_symbol(fw.property_changed_event_handler);
        fw.property_changed_event_args_ctor = self.metadata_member(
            fw.property_changed_event_args,
            ".ctor",
            Constructor,
            args_ty,
            public,
            &[("propertyName", string_ty)],
        );
        self.metadata_member(
            fw.property_changed_event_args,
            "PropertyName",
            Property,
            string_ty,
            public,
            &[],
        );
        fw.handler_invoke = self.metadata_member(
            fw.property_changed_event_handler,
            "Invoke",
            Method,
            void,
            public,
            &[("sender", object_ty), ("e", args_ty)],
        );
        self.metadata_member(
            fw.inotify_property_changed,
            "PropertyChanged",
            Event,
            handler_ty,
            public,
            &[],
        );

        self.comp.framework = fw;
    }
}

impl Default for CompilationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Width reserved for a node's own token.
fn token_width(data: &NodeData) -> u32 {
    let text_len = match data {
        NodeData::TypeDeclaration { name, .. }
        | NodeData::VariableDeclarator { name, .. }
        | NodeData::PropertyDeclaration { name, .. }
        | NodeData::MethodDeclaration { name, .. }
        | NodeData::Parameter { name, .. }
        | NodeData::LocalDeclaration { name, .. }
        | NodeData::Identifier { name }
        | NodeData::MemberAccess { name, .. } => name.len(),
        NodeData::Literal { text, .. } | NodeData::TypeSyntax { text } => text.len(),
        _ => 1,
    };
    text_len.max(1) as u32
}
