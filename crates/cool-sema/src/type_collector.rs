//! First semantic pass: gives every class declaration a [`TypeId`], with
//! no attention yet to parents, attributes, or methods. Everything past
//! this point can assume `ctx.get_type_id(name)` works for any class
//! named anywhere in the program, even one declared later in the source.

use cool_ast::Program;

use crate::context::Context;
use crate::diagnostics::Diagnostics;

pub fn run(ctx: &mut Context, program: &Program, diags: &mut Diagnostics) {
    for class in &program.classes {
        if let Err(e) = ctx.create_type(&class.name) {
            diags.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cool_common::Span;

    fn class(name: &str) -> cool_ast::ClassDecl {
        cool_ast::ClassDecl {
            name: name.to_string(),
            parent: None,
            attrs: vec![],
            methods: vec![],
            span: Span::synthetic(),
        }
    }

    #[test]
    fn registers_every_class() {
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let program = Program {
            classes: vec![class("A"), class("B")],
        };
        run(&mut ctx, &program, &mut diags);
        assert!(diags.is_empty());
        assert!(ctx.get_type_id("A").is_some());
        assert!(ctx.get_type_id("B").is_some());
    }

    #[test]
    fn duplicate_class_name_is_reported() {
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let program = Program {
            classes: vec![class("A"), class("A")],
        };
        run(&mut ctx, &program, &mut diags);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn redeclaring_a_builtin_is_reported() {
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let program = Program {
            classes: vec![class("Int")],
        };
        run(&mut ctx, &program, &mut diags);
        assert_eq!(diags.len(), 1);
    }
}
