//! Expression AST nodes.
//!
//! Covers every expression form from the language grammar: literals,
//! variable references, assignment, blocks, `if`/`while`, `let`, `case`,
//! dispatch (dynamic and static), object creation, and the unary/binary
//! operators. Each node is a plain owned tree (`Box`-linked) rather than
//! a CST wrapper, since there is no parser in this crate producing a
//! concrete syntax tree to wrap -- callers construct `Expr` values
//! directly (or a future parser crate would).

use cool_common::Span;

use crate::type_ref::TypeRef;

/// Any expression, tagged with its source span for diagnostics.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i64),
    StrLit(String),
    BoolLit(bool),

    /// Reference to a variable, attribute, or `self`.
    Variable(String),

    Assign {
        name: String,
        value: Box<Expr>,
    },

    /// A `{ e1; e2; ...; en; }` block. Its value is `exprs.last()`'s value.
    Block(Vec<Expr>),

    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    While {
        cond: Box<Expr>,
        body: Box<Expr>,
    },

    Let {
        bindings: Vec<LetBinding>,
        body: Box<Expr>,
    },

    SwitchCase {
        scrutinee: Box<Expr>,
        arms: Vec<CaseArm>,
    },

    /// `receiver.method(args)`, or `receiver@Ancestor.method(args)` when
    /// `static_dispatch` names the ancestor class for static dispatch.
    MethodCall {
        receiver: Box<Expr>,
        static_dispatch: Option<TypeRef>,
        method: String,
        args: Vec<Expr>,
    },

    New(TypeRef),

    /// `not e` (boolean negation).
    Negation(Box<Expr>),
    /// `~e` (integer complement).
    Complement(Box<Expr>),
    IsVoid(Box<Expr>),

    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Plus,
    Minus,
    Star,
    Div,
    LessEqual,
    LessThan,
    Equal,
}

/// One `name : type [<- init]` binding in a `let`. Bindings in the same
/// `let` are introduced sequentially, so each initializer can see the
/// bindings declared before it.
#[derive(Debug, Clone)]
pub struct LetBinding {
    pub name: String,
    pub declared_type: TypeRef,
    pub init: Option<Expr>,
    pub span: Span,
}

/// One `id : type => expr` arm of a `case ... of ... esac`.
#[derive(Debug, Clone)]
pub struct CaseArm {
    pub name: String,
    pub declared_type: TypeRef,
    pub body: Expr,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}
