//! Semantic analysis for COOL.
//!
//! Turns a parsed [`Program`] into a fully resolved class table plus a
//! list of diagnostics, running the fixed pipeline an external parser or
//! driver hands the AST to:
//!
//! ```text
//! AST -> TypeCollector -> TypeBuilder -> TopologicalOrdering
//!      -> OverrideChecker -> InferenceChecker -> TypeChecker
//! ```
//!
//! Each pass appends to a shared [`Diagnostics`] collector and every pass
//! runs unconditionally, regardless of what earlier passes reported --
//! failing `TypeBuilder` does not stop `TypeChecker` from also reporting
//! its own problems. The only thing gated on "are there diagnostics" is
//! running the evaluator at all, and that gate lives one layer up, in
//! `cool::compile_and_run`.
//!
//! The one thing that would make running every pass unconditionally
//! unsafe is a cyclic `parent` link surviving into `Context` -- every
//! ancestor walk (`Context::ancestors`, `lookup_attr`, `lookup_method`)
//! loops forever on one. `TopologicalOrdering` is the pass responsible
//! for breaking that: it reports the cycle *and* repoints the offending
//! classes' `parent` link at `Object`, so by the time `OverrideChecker`,
//! `InferenceChecker`, and `TypeChecker` run, `Context` is guaranteed
//! acyclic no matter what diagnostics are already pending.

mod builtins;
mod context;
mod diagnostics;
mod error;
mod inference;
mod override_checker;
mod scope;
mod topo;
mod ty;
mod type_builder;
mod type_checker;
mod type_collector;

pub use context::{ClassData, Context, Method, Type, TypeId};
pub use diagnostics::Diagnostics;
pub use error::SemaError;
pub use scope::{Scope, VarKind, VariableInfo};
pub use ty::{conforms_to, join, multi_join};

use cool_ast::Program;

/// Run every semantic pass over `program`, in place.
///
/// `program`'s `AUTO_TYPE` slots are rewritten to their inferred concrete
/// types as a side effect (see [`inference`]), so the tree passed in is
/// not the tree a caller should keep printing diagnostics against --
/// inspect the returned [`Diagnostics`] instead.
///
/// Returns the built [`Context`] (useful to a downstream evaluator even
/// when diagnostics are non-empty, e.g. to print a fully-resolved class
/// hierarchy for debugging) and the diagnostics collected across every
/// pass. Callers should treat a non-empty result as "do not execute this
/// program" -- nothing downstream of `TypeChecker` is meaningful once any
/// pass has reported a problem.
pub fn check(program: &mut Program) -> (Context, Diagnostics) {
    let mut ctx = Context::with_builtins();
    let mut diags = Diagnostics::new();

    type_collector::run(&mut ctx, program, &mut diags);
    type_builder::run(&mut ctx, program, &mut diags);
    topo::run(&mut ctx, program, &mut diags);
    override_checker::run(&ctx, program, &mut diags);
    inference::run(&mut ctx, program, &mut diags);
    type_checker::run(&ctx, program, &mut diags);

    (ctx, diags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cool_ast::{ClassDecl, Expr, ExprKind, MethodDecl, TypeRef};
    use cool_common::Span;

    fn main_program(body: ExprKind) -> Program {
        Program {
            classes: vec![ClassDecl {
                name: "Main".to_string(),
                parent: None,
                attrs: vec![],
                methods: vec![MethodDecl {
                    name: "main".to_string(),
                    params: vec![],
                    return_type: TypeRef::named("Object", Span::synthetic()),
                    body: Expr::new(body, Span::synthetic()),
                    span: Span::synthetic(),
                }],
                span: Span::synthetic(),
            }],
        }
    }

    #[test]
    fn well_formed_program_reports_nothing() {
        let mut program = main_program(ExprKind::IntLit(0));
        let (_, diags) = check(&mut program);
        assert!(diags.is_empty());
    }

    #[test]
    fn inheritance_cycle_does_not_halt_later_passes() {
        let mut program = Program {
            classes: vec![
                ClassDecl {
                    name: "A".to_string(),
                    parent: Some("B".to_string()),
                    attrs: vec![],
                    methods: vec![],
                    span: Span::synthetic(),
                },
                ClassDecl {
                    name: "B".to_string(),
                    parent: Some("A".to_string()),
                    attrs: vec![],
                    methods: vec![],
                    span: Span::synthetic(),
                },
            ],
        };
        let (_, diags) = check(&mut program);
        assert!(diags
            .iter()
            .any(|e| matches!(e, SemaError::InheritanceCycle { .. })));
        // Neither A nor B is named Main, so TypeChecker's entry-point
        // check still runs and reports this too -- an earlier pass's
        // diagnostics never skip a later pass.
        assert!(diags
            .iter()
            .any(|e| matches!(e, SemaError::MainClassMissing)));
    }

    #[test]
    fn missing_main_is_reported_on_an_otherwise_clean_program() {
        let mut program = Program {
            classes: vec![ClassDecl {
                name: "A".to_string(),
                parent: None,
                attrs: vec![],
                methods: vec![],
                span: Span::synthetic(),
            }],
        };
        let (_, diags) = check(&mut program);
        assert!(diags
            .iter()
            .any(|e| matches!(e, SemaError::MainClassMissing)));
    }
}
