//! AST node types for the COOL semantic front-end.
//!
//! This crate defines the tree that semantic analysis consumes. There is
//! no lexer or parser here -- those are external collaborators (see the
//! top-level crate docs) -- so every node is built directly by whatever
//! produces the tree (a parser, or, in tests, hand-written construction).

pub mod expr;
pub mod item;
pub mod type_ref;

pub use expr::{BinOp, CaseArm, Expr, ExprKind, LetBinding};
pub use item::{AttrDecl, ClassDecl, MethodDecl, Param, Program};
pub use type_ref::{TypeRef, TypeRefKind};
