//! Typed syntax nodes.
//!
//! The tree covers the declaration and statement shapes the analyzer matches on:
//! type declarations with fields, events, properties, indexers and methods, plus
//! the statements and expressions that appear in their bodies. Every node carries
//! its source unit, its span and its parent.

use crate::base::NodeIndex;
use bitflags::bitflags;
use serde::Serialize;
use smallvec::SmallVec;
use wpfa_common::{FileId, Location, Span};

/// Kind of a syntax node, used by hosts to register rules per node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    SourceFile,
    TypeDeclaration,
    FieldDeclaration,
    EventFieldDeclaration,
    VariableDeclarator,
    PropertyDeclaration,
    IndexerDeclaration,
    Accessor,
    MethodDeclaration,
    ConstructorDeclaration,
    Parameter,
    TypeSyntax,
    Block,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    LocalDeclaration,
    Identifier,
    ThisExpression,
    BaseExpression,
    MemberAccess,
    Invocation,
    ObjectCreation,
    Literal,
    NameOf,
    TypeOf,
    Assignment,
    BinaryExpression,
    UnaryNot,
    Cast,
    Conditional,
}

bitflags! {
    /// Declaration modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PUBLIC    = 1 << 0;
        const PRIVATE   = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL  = 1 << 3;
        const STATIC    = 1 << 4;
        const READONLY  = 1 << 5;
        const CONST     = 1 << 6;
        const VIRTUAL   = 1 << 7;
        const OVERRIDE  = 1 << 8;
        const ABSTRACT  = 1 << 9;
        const SEALED    = 1 << 10;
        const PARTIAL   = 1 << 11;

        const PUBLIC_STATIC_READONLY = Self::PUBLIC.bits() | Self::STATIC.bits() | Self::READONLY.bits();
        const PRIVATE_STATIC_READONLY = Self::PRIVATE.bits() | Self::STATIC.bits() | Self::READONLY.bits();
    }
}

bitflags! {
    /// Parameter modifiers and well-known parameter attributes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ParameterFlags: u32 {
        /// `this` modifier on the first parameter of an extension method.
        const THIS                = 1 << 0;
        const REF                 = 1 << 1;
        const OUT                 = 1 << 2;
        const PARAMS              = 1 << 3;
        /// `[CallerMemberName]`: the compiler supplies the calling member's name when omitted.
        const CALLER_MEMBER_NAME  = 1 << 4;
        /// The parameter declares a default value.
        const OPTIONAL            = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    String,
    Null,
    Number,
    Boolean,
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    LogicalAnd,
    LogicalOr,
    Add,
    Other,
}

/// Node payload. Child references are `NodeIndex` values; `NodeIndex::NONE` marks
/// an absent optional child.
#[derive(Clone, Debug)]
pub enum NodeData {
    SourceFile {
        members: Vec<NodeIndex>,
    },
    TypeDeclaration {
        name: String,
        modifiers: Modifiers,
        members: Vec<NodeIndex>,
    },
    FieldDeclaration {
        modifiers: Modifiers,
        ty: NodeIndex,
        declarators: Vec<NodeIndex>,
    },
    EventFieldDeclaration {
        modifiers: Modifiers,
        ty: NodeIndex,
        declarators: Vec<NodeIndex>,
    },
    VariableDeclarator {
        name: String,
        initializer: NodeIndex,
    },
    PropertyDeclaration {
        name: String,
        modifiers: Modifiers,
        ty: NodeIndex,
        accessors: Vec<NodeIndex>,
    },
    IndexerDeclaration {
        modifiers: Modifiers,
        ty: NodeIndex,
        parameters: Vec<NodeIndex>,
        accessors: Vec<NodeIndex>,
    },
    /// `get`/`set` accessor. `body` is a `Block` or, for expression-bodied
    /// accessors, the expression itself.
    Accessor {
        kind: AccessorKind,
        body: NodeIndex,
    },
    /// `body` is a `Block`, an expression (expression-bodied), or `NONE` (abstract/extern).
    MethodDeclaration {
        name: String,
        modifiers: Modifiers,
        return_type: NodeIndex,
        parameters: Vec<NodeIndex>,
        body: NodeIndex,
    },
    ConstructorDeclaration {
        modifiers: Modifiers,
        parameters: Vec<NodeIndex>,
        body: NodeIndex,
    },
    Parameter {
        name: String,
        ty: NodeIndex,
        flags: ParameterFlags,
        default: NodeIndex,
    },
    /// A reference to a type in source, e.g. `int?` or `ObservableCollection<int>`.
    TypeSyntax {
        text: String,
    },
    Block {
        statements: Vec<NodeIndex>,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    ReturnStatement {
        expression: NodeIndex,
    },
    IfStatement {
        condition: NodeIndex,
        then_branch: NodeIndex,
        else_branch: NodeIndex,
    },
    LocalDeclaration {
        name: String,
        initializer: NodeIndex,
    },
    Identifier {
        name: String,
    },
    ThisExpression,
    BaseExpression,
    /// `target.name`, or `target?.name` when `conditional` is set.
    MemberAccess {
        target: NodeIndex,
        name: String,
        conditional: bool,
    },
    Invocation {
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
    },
    ObjectCreation {
        ty: NodeIndex,
        arguments: Vec<NodeIndex>,
    },
    Literal {
        kind: LiteralKind,
        text: String,
    },
    NameOf {
        operand: NodeIndex,
    },
    TypeOf {
        ty: NodeIndex,
    },
    Assignment {
        target: NodeIndex,
        value: NodeIndex,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeIndex,
        right: NodeIndex,
    },
    UnaryNot {
        operand: NodeIndex,
    },
    Cast {
        ty: NodeIndex,
        operand: NodeIndex,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
}

impl NodeData {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeData::SourceFile { .. } => SyntaxKind::SourceFile,
            NodeData::TypeDeclaration { .. } => SyntaxKind::TypeDeclaration,
            NodeData::FieldDeclaration { .. } => SyntaxKind::FieldDeclaration,
            NodeData::EventFieldDeclaration { .. } => SyntaxKind::EventFieldDeclaration,
            NodeData::VariableDeclarator { .. } => SyntaxKind::VariableDeclarator,
            NodeData::PropertyDeclaration { .. } => SyntaxKind::PropertyDeclaration,
            NodeData::IndexerDeclaration { .. } => SyntaxKind::IndexerDeclaration,
            NodeData::Accessor { .. } => SyntaxKind::Accessor,
            NodeData::MethodDeclaration { .. } => SyntaxKind::MethodDeclaration,
            NodeData::ConstructorDeclaration { .. } => SyntaxKind::ConstructorDeclaration,
            NodeData::Parameter { .. } => SyntaxKind::Parameter,
            NodeData::TypeSyntax { .. } => SyntaxKind::TypeSyntax,
            NodeData::Block { .. } => SyntaxKind::Block,
            NodeData::ExpressionStatement { .. } => SyntaxKind::ExpressionStatement,
            NodeData::ReturnStatement { .. } => SyntaxKind::ReturnStatement,
            NodeData::IfStatement { .. } => SyntaxKind::IfStatement,
            NodeData::LocalDeclaration { .. } => SyntaxKind::LocalDeclaration,
            NodeData::Identifier { .. } => SyntaxKind::Identifier,
            NodeData::ThisExpression => SyntaxKind::ThisExpression,
            NodeData::BaseExpression => SyntaxKind::BaseExpression,
            NodeData::MemberAccess { .. } => SyntaxKind::MemberAccess,
            NodeData::Invocation { .. } => SyntaxKind::Invocation,
            NodeData::ObjectCreation { .. } => SyntaxKind::ObjectCreation,
            NodeData::Literal { .. } => SyntaxKind::Literal,
            NodeData::NameOf { .. } => SyntaxKind::NameOf,
            NodeData::TypeOf { .. } => SyntaxKind::TypeOf,
            NodeData::Assignment { .. } => SyntaxKind::Assignment,
            NodeData::BinaryExpression { .. } => SyntaxKind::BinaryExpression,
            NodeData::UnaryNot { .. } => SyntaxKind::UnaryNot,
            NodeData::Cast { .. } => SyntaxKind::Cast,
            NodeData::Conditional { .. } => SyntaxKind::Conditional,
        }
    }

    /// Direct children in source order. Absent optional children are skipped.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        let mut push = |idx: NodeIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };
        match self {
            NodeData::SourceFile { members } | NodeData::TypeDeclaration { members, .. } => {
                members.iter().copied().for_each(&mut push);
            }
            NodeData::FieldDeclaration {
                ty, declarators, ..
            }
            | NodeData::EventFieldDeclaration {
                ty, declarators, ..
            } => {
                push(*ty);
                declarators.iter().copied().for_each(&mut push);
            }
            NodeData::VariableDeclarator { initializer, .. }
            | NodeData::LocalDeclaration { initializer, .. } => push(*initializer),
            NodeData::PropertyDeclaration { ty, accessors, .. } => {
                push(*ty);
                accessors.iter().copied().for_each(&mut push);
            }
            NodeData::IndexerDeclaration {
                ty,
                parameters,
                accessors,
                ..
            } => {
                push(*ty);
                parameters.iter().copied().for_each(&mut push);
                accessors.iter().copied().for_each(&mut push);
            }
            NodeData::Accessor { body, .. } => push(*body),
            NodeData::MethodDeclaration {
                return_type,
                parameters,
                body,
                ..
            } => {
                push(*return_type);
                parameters.iter().copied().for_each(&mut push);
                push(*body);
            }
            NodeData::ConstructorDeclaration {
                parameters, body, ..
            } => {
                parameters.iter().copied().for_each(&mut push);
                push(*body);
            }
            NodeData::Parameter { ty, default, .. } => {
                push(*ty);
                push(*default);
            }
            NodeData::Block { statements } => statements.iter().copied().for_each(&mut push),
            NodeData::ExpressionStatement { expression }
            | NodeData::ReturnStatement { expression } => push(*expression),
            NodeData::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => {
                push(*condition);
                push(*then_branch);
                push(*else_branch);
            }
            NodeData::MemberAccess { target, .. } => push(*target),
            NodeData::Invocation { callee, arguments } => {
                push(*callee);
                arguments.iter().copied().for_each(&mut push);
            }
            NodeData::ObjectCreation { ty, arguments } => {
                push(*ty);
                arguments.iter().copied().for_each(&mut push);
            }
            NodeData::NameOf { operand } | NodeData::UnaryNot { operand } => push(*operand),
            NodeData::TypeOf { ty } => push(*ty),
            NodeData::Assignment { target, value } => {
                push(*target);
                push(*value);
            }
            NodeData::BinaryExpression { left, right, .. } => {
                push(*left);
                push(*right);
            }
            NodeData::Cast { ty, operand } => {
                push(*ty);
                push(*operand);
            }
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                push(*condition);
                push(*when_true);
                push(*when_false);
            }
            NodeData::TypeSyntax { .. }
            | NodeData::Identifier { .. }
            | NodeData::ThisExpression
            | NodeData::BaseExpression
            | NodeData::Literal { .. } => {}
        }
        out
    }
}

/// A node in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    pub file: FileId,
    pub span: Span,
    pub parent: NodeIndex,
    pub data: NodeData,
}

impl Node {
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind()
    }

    #[inline]
    pub fn location(&self) -> Location {
        Location::new(self.file, self.span)
    }

    /// Declared name for named declarations and the identifier text for names.
    pub fn name(&self) -> Option<&str> {
        match &self.data {
            NodeData::TypeDeclaration { name, .. }
            | NodeData::VariableDeclarator { name, .. }
            | NodeData::PropertyDeclaration { name, .. }
            | NodeData::MethodDeclaration { name, .. }
            | NodeData::Parameter { name, .. }
            | NodeData::LocalDeclaration { name, .. }
            | NodeData::Identifier { name }
            | NodeData::MemberAccess { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Arguments of an invocation or object creation.
    pub fn arguments(&self) -> &[NodeIndex] {
        match &self.data {
            NodeData::Invocation { arguments, .. } | NodeData::ObjectCreation { arguments, .. } => {
                arguments
            }
            _ => &[],
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(
            self.data,
            NodeData::Literal {
                kind: LiteralKind::Null,
                ..
            }
        )
    }
}
