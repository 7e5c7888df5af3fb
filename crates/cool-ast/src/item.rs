//! Top-level AST nodes: programs, classes, attributes, and methods.

use cool_common::Span;

use crate::expr::Expr;
use crate::type_ref::TypeRef;

#[derive(Debug, Clone)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    /// `None` means "inherits Object", the implicit default.
    pub parent: Option<String>,
    pub attrs: Vec<AttrDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AttrDecl {
    pub name: String,
    pub declared_type: TypeRef,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub declared_type: TypeRef,
    pub span: Span,
}
