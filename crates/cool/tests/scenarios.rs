//! The end-to-end scenarios from spec.md §8, each built as a hand-written
//! AST (no parser exists in this workspace) and run through
//! `compile_and_run`.

use cool::compile_and_run;
use cool_ast::{
    AttrDecl, BinOp, CaseArm, ClassDecl, Expr, ExprKind, LetBinding, MethodDecl, Param, Program,
    TypeRef,
};
use cool_common::Span;
use cool_interp::RuntimeErrorKind;

fn sp() -> Span {
    Span::synthetic()
}

fn e(kind: ExprKind) -> Expr {
    Expr::new(kind, sp())
}

fn main_class(attrs: Vec<AttrDecl>, methods: Vec<MethodDecl>) -> ClassDecl {
    ClassDecl {
        name: "Main".to_string(),
        parent: None,
        attrs,
        methods,
        span: sp(),
    }
}

fn method(name: &str, params: Vec<Param>, return_type: TypeRef, body: Expr) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        params,
        return_type,
        body,
        span: sp(),
    }
}

/// 1. Happy path: a single trivial `main` runs to completion with no
/// diagnostics and no runtime error.
#[test]
fn happy_path_runs_to_completion() {
    let program = Program {
        classes: vec![main_class(
            vec![],
            vec![method("main", vec![], TypeRef::named("Object", sp()), e(ExprKind::IntLit(0)))],
        )],
    };
    let (diags, err) = compile_and_run(program, false);
    assert!(diags.is_empty());
    assert!(err.is_none());
}

/// 2. Assignment type mismatch: `let a:Int <- "" in 0` is rejected before
/// execution starts.
#[test]
fn assignment_type_mismatch_is_diagnosed_and_not_run() {
    let body = e(ExprKind::Let {
        bindings: vec![LetBinding {
            name: "a".to_string(),
            declared_type: TypeRef::named("Int", sp()),
            init: Some(e(ExprKind::StrLit(String::new()))),
            span: sp(),
        }],
        body: Box::new(e(ExprKind::IntLit(0))),
    });
    let program = Program {
        classes: vec![main_class(
            vec![],
            vec![method("main", vec![], TypeRef::named("Object", sp()), body)],
        )],
    };
    let (diags, err) = compile_and_run(program, false);
    assert!(diags.iter().any(|d| d == "Cannot convert \"String\" into \"Int\"."));
    assert!(err.is_none());
}

/// 3. Inference of a recursive, Ackermann-shaped method: `AUTO_TYPE` on
/// both parameters and the return type all resolve to `Int` once
/// inference reaches a fixed point, and the program runs cleanly.
///
/// `ackermann(m, n) : AUTO_TYPE { if m = 0 then n + 1 else
///     if n = 0 then self.ackermann(m - 1, 1) else
///     self.ackermann(m - 1, self.ackermann(m, n - 1)) fi fi }`
#[test]
fn recursive_method_auto_type_converges_to_int() {
    let ackermann_body = e(ExprKind::Conditional {
        cond: Box::new(e(ExprKind::Binary {
            op: BinOp::Equal,
            lhs: Box::new(e(ExprKind::Variable("m".to_string()))),
            rhs: Box::new(e(ExprKind::IntLit(0))),
        })),
        then_branch: Box::new(e(ExprKind::Binary {
            op: BinOp::Plus,
            lhs: Box::new(e(ExprKind::Variable("n".to_string()))),
            rhs: Box::new(e(ExprKind::IntLit(1))),
        })),
        else_branch: Box::new(e(ExprKind::Conditional {
            cond: Box::new(e(ExprKind::Binary {
                op: BinOp::Equal,
                lhs: Box::new(e(ExprKind::Variable("n".to_string()))),
                rhs: Box::new(e(ExprKind::IntLit(0))),
            })),
            then_branch: Box::new(e(ExprKind::MethodCall {
                receiver: Box::new(e(ExprKind::Variable("self".to_string()))),
                static_dispatch: None,
                method: "ackermann".to_string(),
                args: vec![
                    e(ExprKind::Binary {
                        op: BinOp::Minus,
                        lhs: Box::new(e(ExprKind::Variable("m".to_string()))),
                        rhs: Box::new(e(ExprKind::IntLit(1))),
                    }),
                    e(ExprKind::IntLit(1)),
                ],
            })),
            else_branch: Box::new(e(ExprKind::MethodCall {
                receiver: Box::new(e(ExprKind::Variable("self".to_string()))),
                static_dispatch: None,
                method: "ackermann".to_string(),
                args: vec![
                    e(ExprKind::Binary {
                        op: BinOp::Minus,
                        lhs: Box::new(e(ExprKind::Variable("m".to_string()))),
                        rhs: Box::new(e(ExprKind::IntLit(1))),
                    }),
                    e(ExprKind::MethodCall {
                        receiver: Box::new(e(ExprKind::Variable("self".to_string()))),
                        static_dispatch: None,
                        method: "ackermann".to_string(),
                        args: vec![
                            e(ExprKind::Variable("m".to_string())),
                            e(ExprKind::Binary {
                                op: BinOp::Minus,
                                lhs: Box::new(e(ExprKind::Variable("n".to_string()))),
                                rhs: Box::new(e(ExprKind::IntLit(1))),
                            }),
                        ],
                    }),
                ],
            })),
        })),
    });

    let ackermann = method(
        "ackermann",
        vec![
            Param {
                name: "m".to_string(),
                declared_type: TypeRef::auto(sp()),
                span: sp(),
            },
            Param {
                name: "n".to_string(),
                declared_type: TypeRef::auto(sp()),
                span: sp(),
            },
        ],
        TypeRef::auto(sp()),
        ackermann_body,
    );

    let main_body = e(ExprKind::MethodCall {
        receiver: Box::new(e(ExprKind::Variable("self".to_string()))),
        static_dispatch: None,
        method: "ackermann".to_string(),
        args: vec![e(ExprKind::IntLit(2)), e(ExprKind::IntLit(3))],
    });

    let program = Program {
        classes: vec![main_class(
            vec![],
            vec![
                method("main", vec![], TypeRef::named("Object", sp()), main_body),
                ackermann,
            ],
        )],
    };
    let (diags, err) = compile_and_run(program, false);
    assert!(diags.is_empty(), "diagnostics: {diags:?}");
    assert!(err.is_none(), "runtime error: {err:?}");
}

/// 4. Dispatch on void: `let a:Main in a.f()` type-checks (an
/// uninitialized `Main`-typed local conforms fine) but evaluating it
/// dispatches on a still-void receiver.
#[test]
fn dispatch_on_void_is_raised_at_runtime() {
    let main_body = e(ExprKind::Let {
        bindings: vec![LetBinding {
            name: "a".to_string(),
            declared_type: TypeRef::named("Main", sp()),
            init: None,
            span: sp(),
        }],
        body: Box::new(e(ExprKind::MethodCall {
            receiver: Box::new(e(ExprKind::Variable("a".to_string()))),
            static_dispatch: None,
            method: "f".to_string(),
            args: vec![],
        })),
    });
    let program = Program {
        classes: vec![main_class(
            vec![AttrDecl {
                name: "x".to_string(),
                declared_type: TypeRef::named("Int", sp()),
                init: None,
                span: sp(),
            }],
            vec![
                method("main", vec![], TypeRef::named("Object", sp()), main_body),
                method("f", vec![], TypeRef::named("Int", sp()), e(ExprKind::IntLit(0))),
            ],
        )],
    };
    let (diags, err) = compile_and_run(program, false);
    assert!(diags.is_empty(), "diagnostics: {diags:?}");
    assert_eq!(err.map(|e| e.kind), Some(RuntimeErrorKind::DispatchOnVoid));
}

/// 5. Case selection: a scrutinee whose static type is the common
/// ancestor `A` but whose runtime type is `C` picks the most specific
/// matching branch (`x:C`), not the shallower `x:B`.
#[test]
fn case_selects_the_most_specific_branch() {
    let a = ClassDecl {
        name: "A".to_string(),
        parent: None,
        attrs: vec![],
        methods: vec![],
        span: sp(),
    };
    let b = ClassDecl {
        name: "B".to_string(),
        parent: Some("A".to_string()),
        attrs: vec![],
        methods: vec![],
        span: sp(),
    };
    let c = ClassDecl {
        name: "C".to_string(),
        parent: Some("B".to_string()),
        attrs: vec![],
        methods: vec![],
        span: sp(),
    };

    let case_body = e(ExprKind::SwitchCase {
        scrutinee: Box::new(e(ExprKind::New(TypeRef::named("C", sp())))),
        arms: vec![
            CaseArm {
                name: "x".to_string(),
                declared_type: TypeRef::named("B", sp()),
                body: e(ExprKind::StrLit("B".to_string())),
                span: sp(),
            },
            CaseArm {
                name: "x".to_string(),
                declared_type: TypeRef::named("C", sp()),
                body: e(ExprKind::StrLit("C".to_string())),
                span: sp(),
            },
        ],
    });

    let program = Program {
        classes: vec![
            a,
            b,
            c,
            main_class(
                vec![],
                vec![method("main", vec![], TypeRef::named("Object", sp()), case_body)],
            ),
        ],
    };
    let (diags, err) = compile_and_run(program, false);
    assert!(diags.is_empty(), "diagnostics: {diags:?}");
    assert!(err.is_none());
}

/// 6. Inheritance cycle: both classes report a cycle diagnostic, and
/// the pipeline does not recurse infinitely in the process.
#[test]
fn inheritance_cycle_reports_both_classes_and_terminates() {
    let program = Program {
        classes: vec![
            ClassDecl {
                name: "A".to_string(),
                parent: Some("B".to_string()),
                attrs: vec![],
                methods: vec![],
                span: sp(),
            },
            ClassDecl {
                name: "B".to_string(),
                parent: Some("A".to_string()),
                attrs: vec![],
                methods: vec![],
                span: sp(),
            },
            main_class(
                vec![],
                vec![method("main", vec![], TypeRef::named("Object", sp()), e(ExprKind::IntLit(0)))],
            ),
        ],
    };
    let (diags, err) = compile_and_run(program, false);
    assert_eq!(diags.len(), 2, "diagnostics: {diags:?}");
    assert!(diags
        .iter()
        .all(|d| d.contains("is involved in an inheritance cycle.")));
    assert!(err.is_none());
}
