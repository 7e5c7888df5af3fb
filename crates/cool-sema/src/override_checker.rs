//! Fourth semantic pass: checks every user class against its ancestors
//! now that the whole class table is built.
//!
//! Two things can only be checked once every class (including ones that
//! come later in the source) has its own attributes and methods filled
//! in: an attribute can't shadow one declared on an ancestor, and a
//! method with the same name as an ancestor's must repeat that ancestor's
//! signature exactly (COOL has no true overloading).

use cool_ast::Program;

use crate::context::{Context, Type};
use crate::diagnostics::Diagnostics;
use crate::error::SemaError;

pub fn run(ctx: &Context, program: &Program, diags: &mut Diagnostics) {
    for class in &program.classes {
        let Some(id) = ctx.get_type_id(&class.name) else {
            continue;
        };
        let Some(parent_id) = ctx.class(id).parent else {
            continue;
        };

        for (attr_name, _) in &ctx.class(id).attrs {
            if ctx.lookup_attr(parent_id, attr_name).is_some() {
                diags.push(SemaError::AttrAlreadyDefined {
                    name: attr_name.clone(),
                    class: class.name.clone(),
                });
            }
        }

        for method in &ctx.class(id).methods {
            if let Some((_, ancestor_method)) = ctx.lookup_method(parent_id, &method.name) {
                if !same_signature(method, ancestor_method) {
                    diags.push(SemaError::WrongSignature {
                        name: method.name.clone(),
                        class: class.name.clone(),
                    });
                }
            }
        }
    }
}

fn same_signature(a: &crate::context::Method, b: &crate::context::Method) -> bool {
    a.param_types.len() == b.param_types.len()
        && a.param_types
            .iter()
            .zip(&b.param_types)
            .all(|(x, y)| same_shape(*x, *y))
        && same_shape(a.return_type, b.return_type)
}

/// Two types are the "same" for override purposes if an override is
/// allowed to repeat them verbatim. `SELF_TYPE` on an override always
/// reads as `SELF_TYPE` even though the `TypeId` it's anchored to differs
/// between the base class and the override (each is anchored to its own
/// enclosing class), so two `SelfType`s always match regardless of
/// anchor. `Error` matches anything, so one bad declaration doesn't
/// spray a second "wrong signature" diagnostic on top of the first.
fn same_shape(a: Type, b: Type) -> bool {
    match (a, b) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::SelfType(_), Type::SelfType(_)) => true,
        (Type::Class(x), Type::Class(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cool_ast::{ClassDecl, MethodDecl, Param, TypeRef};
    use cool_common::Span;

    fn method(name: &str, params: Vec<&str>, ret: &str) -> MethodDecl {
        MethodDecl {
            name: name.to_string(),
            params: params
                .into_iter()
                .map(|p| Param {
                    name: p.to_string(),
                    declared_type: TypeRef::named("Int", Span::synthetic()),
                    span: Span::synthetic(),
                })
                .collect(),
            return_type: TypeRef::named(ret, Span::synthetic()),
            body: cool_ast::Expr::new(cool_ast::ExprKind::IntLit(0), Span::synthetic()),
            span: Span::synthetic(),
        }
    }

    fn class(name: &str, parent: Option<&str>, methods: Vec<MethodDecl>) -> ClassDecl {
        ClassDecl {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            attrs: vec![],
            methods,
            span: Span::synthetic(),
        }
    }

    fn build(classes: Vec<ClassDecl>) -> Diagnostics {
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let mut program = Program { classes };
        crate::type_collector::run(&mut ctx, &program, &mut diags);
        crate::type_builder::run(&mut ctx, &program, &mut diags);
        crate::topo::run(&mut ctx, &mut program, &mut diags);
        let mut override_diags = Diagnostics::new();
        run(&ctx, &program, &mut override_diags);
        override_diags
    }

    #[test]
    fn matching_override_is_accepted() {
        let diags = build(vec![
            class("A", None, vec![method("f", vec!["x"], "Int")]),
            class("B", Some("A"), vec![method("f", vec!["x"], "Int")]),
        ]);
        assert!(diags.is_empty());
    }

    #[test]
    fn mismatched_return_type_is_rejected() {
        let diags = build(vec![
            class("A", None, vec![method("f", vec!["x"], "Int")]),
            class("B", Some("A"), vec![method("f", vec!["x"], "String")]),
        ]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn mismatched_arity_is_rejected() {
        let diags = build(vec![
            class("A", None, vec![method("f", vec!["x"], "Int")]),
            class("B", Some("A"), vec![method("f", vec!["x", "y"], "Int")]),
        ]);
        assert_eq!(diags.len(), 1);
    }
}
