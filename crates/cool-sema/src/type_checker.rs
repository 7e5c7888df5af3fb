//! Final semantic pass: the static conformance checker.
//!
//! Runs after `InferenceChecker` has rewritten every `AUTO_TYPE` slot, so
//! every declared type this pass sees is already concrete (or
//! `SELF_TYPE`, or `ErrorType` if an earlier pass already reported a
//! problem with that slot). This is the pass that walks method bodies --
//! nothing before it does, since nothing before it needs to.

use cool_ast::{BinOp, ClassDecl, Expr, ExprKind, MethodDecl, Program};

use crate::context::{Context, Type, TypeId};
use crate::diagnostics::Diagnostics;
use crate::error::SemaError;
use crate::scope::{Scope, VarKind};
use crate::ty::{conforms_to, multi_join};
use crate::type_builder::resolve_type_ref;

pub fn run(ctx: &Context, program: &Program, diags: &mut Diagnostics) {
    for class in &program.classes {
        let Some(id) = ctx.get_type_id(&class.name) else {
            continue;
        };
        check_attr_initializers(ctx, diags, class, id);
        for method in &class.methods {
            check_method(ctx, diags, class, id, method);
        }
    }
    check_entry_point(ctx, diags);
}

fn check_entry_point(ctx: &Context, diags: &mut Diagnostics) {
    match ctx.get_type_id("Main") {
        None => diags.push(SemaError::MainClassMissing),
        Some(id) => match ctx.class(id).find_own_method("main") {
            None => diags.push(SemaError::MainMethodMissing),
            Some(m) if !m.param_types.is_empty() => diags.push(SemaError::MainMethodWrongArity),
            Some(_) => {}
        },
    }
}

fn class_scope(ctx: &Context, id: TypeId) -> Scope {
    let mut scope = Scope::new();
    scope.define("self", Type::SelfType(id), VarKind::SelfVar);
    for ancestor in ctx.ancestors(id) {
        for (name, ty) in &ctx.class(ancestor).attrs {
            scope.define(name.clone(), *ty, VarKind::Attribute);
        }
    }
    scope
}

fn check_attr_initializers(ctx: &Context, diags: &mut Diagnostics, class: &ClassDecl, id: TypeId) {
    for attr in &class.attrs {
        let Some(init) = &attr.init else { continue };
        if attr.name == "self" {
            continue; // already reported by TypeBuilder
        }
        let Some(declared) = ctx.class(id).find_attr(&attr.name) else {
            continue;
        };
        let mut scope = class_scope(ctx, id);
        let init_ty = check_expr(ctx, diags, &mut scope, id, &class.name, init);
        if !conforms_to(ctx, init_ty, declared) {
            diags.push(SemaError::IncompatibleTypes {
                from: type_name(ctx, init_ty),
                to: type_name(ctx, declared),
            });
        }
    }
}

fn check_method(ctx: &Context, diags: &mut Diagnostics, class: &ClassDecl, id: TypeId, method: &MethodDecl) {
    let Some(stored) = ctx.class(id).find_own_method(&method.name) else {
        return;
    };
    let mut scope = class_scope(ctx, id);
    for (param, ty) in method.params.iter().zip(&stored.param_types) {
        scope.define(param.name.clone(), *ty, VarKind::Parameter);
    }
    let return_type = stored.return_type;
    let body_ty = check_expr(ctx, diags, &mut scope, id, &method.name, &method.body);
    if !conforms_to(ctx, body_ty, return_type) {
        diags.push(SemaError::IncompatibleTypes {
            from: type_name(ctx, body_ty),
            to: type_name(ctx, return_type),
        });
    }
}

pub fn type_name(ctx: &Context, ty: Type) -> String {
    match ty {
        Type::Class(id) => ctx.class_name(id).to_string(),
        Type::SelfType(_) => "SELF_TYPE".to_string(),
        Type::Error => "Object".to_string(),
    }
}

fn op_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Plus => "+",
        BinOp::Minus => "-",
        BinOp::Star => "*",
        BinOp::Div => "/",
        BinOp::LessEqual => "<=",
        BinOp::LessThan => "<",
        BinOp::Equal => "=",
    }
}

fn is_primitive(ctx: &Context, ty: Type) -> bool {
    matches!(ty, Type::Class(id) if id == ctx.int_id() || id == ctx.bool_id() || id == ctx.string_id())
}

#[allow(clippy::too_many_arguments)]
fn check_expr(
    ctx: &Context,
    diags: &mut Diagnostics,
    scope: &mut Scope,
    self_class: TypeId,
    method_name: &str,
    expr: &Expr,
) -> Type {
    match &expr.kind {
        ExprKind::IntLit(_) => Type::Class(ctx.int_id()),
        ExprKind::StrLit(_) => Type::Class(ctx.string_id()),
        ExprKind::BoolLit(_) => Type::Class(ctx.bool_id()),

        ExprKind::Variable(name) => {
            if name == "self" {
                return Type::SelfType(self_class);
            }
            match scope.find(name) {
                Some(info) => info.ty,
                None => {
                    diags.push(SemaError::VariableNotDefined {
                        name: name.clone(),
                        context: ctx.class_name(self_class).to_string(),
                    });
                    Type::Error
                }
            }
        }

        ExprKind::Assign { name, value } => {
            let vt = check_expr(ctx, diags, scope, self_class, method_name, value);
            if name == "self" {
                diags.push(SemaError::SelfIsReadonly);
            } else {
                match scope.find(name) {
                    Some(info) => {
                        if !conforms_to(ctx, vt, info.ty) {
                            diags.push(SemaError::IncompatibleTypes {
                                from: type_name(ctx, vt),
                                to: type_name(ctx, info.ty),
                            });
                        }
                    }
                    None => diags.push(SemaError::VariableNotDefined {
                        name: name.clone(),
                        context: ctx.class_name(self_class).to_string(),
                    }),
                }
            }
            vt
        }

        ExprKind::Block(exprs) => {
            let mut last = Type::Class(ctx.object_id());
            for e in exprs {
                last = check_expr(ctx, diags, scope, self_class, method_name, e);
            }
            last
        }

        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            let ct = check_expr(ctx, diags, scope, self_class, method_name, cond);
            if !conforms_to(ctx, ct, Type::Class(ctx.bool_id())) {
                diags.push(SemaError::IncompatibleTypes {
                    from: type_name(ctx, ct),
                    to: "Bool".to_string(),
                });
            }
            let tt = check_expr(ctx, diags, scope, self_class, method_name, then_branch);
            let et = check_expr(ctx, diags, scope, self_class, method_name, else_branch);
            multi_join(ctx, [tt, et])
        }

        ExprKind::While { cond, body } => {
            let ct = check_expr(ctx, diags, scope, self_class, method_name, cond);
            if !conforms_to(ctx, ct, Type::Class(ctx.bool_id())) {
                diags.push(SemaError::IncompatibleTypes {
                    from: type_name(ctx, ct),
                    to: "Bool".to_string(),
                });
            }
            check_expr(ctx, diags, scope, self_class, method_name, body);
            Type::Class(ctx.object_id())
        }

        ExprKind::Let { bindings, body } => {
            let mut child = scope.create_child();
            for binding in bindings {
                if binding.name == "self" {
                    diags.push(SemaError::LocalAlreadyDefined {
                        name: "self".to_string(),
                        method: method_name.to_string(),
                    });
                    continue;
                }
                if child.is_locally_defined(&binding.name) {
                    diags.push(SemaError::LocalAlreadyDefined {
                        name: binding.name.clone(),
                        method: method_name.to_string(),
                    });
                    continue;
                }
                let mut scratch = Diagnostics::new();
                let declared = resolve_type_ref(ctx, &mut scratch, &binding.declared_type, self_class);
                if let Some(init) = &binding.init {
                    let it = check_expr(ctx, diags, &mut child, self_class, method_name, init);
                    if !conforms_to(ctx, it, declared) {
                        diags.push(SemaError::IncompatibleTypes {
                            from: type_name(ctx, it),
                            to: type_name(ctx, declared),
                        });
                    }
                }
                child.define(binding.name.clone(), declared, VarKind::Let);
            }
            check_expr(ctx, diags, &mut child, self_class, method_name, body)
        }

        ExprKind::SwitchCase { scrutinee, arms } => {
            check_expr(ctx, diags, scope, self_class, method_name, scrutinee);
            let mut seen = std::collections::HashSet::new();
            let mut results = Vec::with_capacity(arms.len());
            for arm in arms {
                let branch_key = match &arm.declared_type.kind {
                    cool_ast::TypeRefKind::Named(n) => n.clone(),
                    cool_ast::TypeRefKind::SelfType => "SELF_TYPE".to_string(),
                    cool_ast::TypeRefKind::Auto => "AUTO_TYPE".to_string(),
                };
                if !seen.insert(branch_key.clone()) {
                    diags.push(SemaError::CaseDuplicateBranchType { ty: branch_key });
                }
                let mut child = scope.create_child();
                let mut scratch = Diagnostics::new();
                let arm_ty = resolve_type_ref(ctx, &mut scratch, &arm.declared_type, self_class);
                if arm.name == "self" {
                    diags.push(SemaError::LocalAlreadyDefined {
                        name: "self".to_string(),
                        method: method_name.to_string(),
                    });
                } else {
                    child.define(arm.name.clone(), arm_ty, VarKind::Case);
                }
                let rt = check_expr(ctx, diags, &mut child, self_class, method_name, &arm.body);
                results.push(rt);
            }
            multi_join(ctx, results)
        }

        ExprKind::MethodCall {
            receiver,
            static_dispatch,
            method,
            args,
        } => {
            let rt = check_expr(ctx, diags, scope, self_class, method_name, receiver);
            let target_ty = if let Some(tr) = static_dispatch {
                let mut scratch = Diagnostics::new();
                let resolved = resolve_type_ref(ctx, &mut scratch, tr, self_class);
                if !conforms_to(ctx, rt, resolved) {
                    diags.push(SemaError::StaticDispatchNotAncestor {
                        ty: type_name(ctx, rt),
                        target: type_name(ctx, resolved),
                    });
                }
                resolved
            } else {
                rt
            };
            let target_id = target_ty.anchor().unwrap_or_else(|| ctx.object_id());

            match ctx.lookup_method(target_id, method) {
                Some((_, m)) => {
                    if m.param_types.len() != args.len() {
                        diags.push(SemaError::WrongArgumentCount {
                            name: method.clone(),
                            expected: m.param_types.len(),
                            got: args.len(),
                        });
                    }
                    let param_types = m.param_types.clone();
                    let return_type = m.return_type;
                    for (i, arg) in args.iter().enumerate() {
                        let at = check_expr(ctx, diags, scope, self_class, method_name, arg);
                        if let Some(pt) = param_types.get(i) {
                            if !conforms_to(ctx, at, *pt) {
                                diags.push(SemaError::IncompatibleTypes {
                                    from: type_name(ctx, at),
                                    to: type_name(ctx, *pt),
                                });
                            }
                        }
                    }
                    match return_type {
                        Type::SelfType(_) => target_ty,
                        other => other,
                    }
                }
                None => {
                    for arg in args {
                        check_expr(ctx, diags, scope, self_class, method_name, arg);
                    }
                    diags.push(SemaError::MethodNotDefined {
                        name: method.clone(),
                        ty: type_name(ctx, target_ty),
                    });
                    Type::Error
                }
            }
        }

        ExprKind::New(tr) => {
            let mut scratch = Diagnostics::new();
            resolve_type_ref(ctx, &mut scratch, tr, self_class)
        }

        ExprKind::Negation(e) => {
            let et = check_expr(ctx, diags, scope, self_class, method_name, e);
            if !conforms_to(ctx, et, Type::Class(ctx.bool_id())) {
                diags.push(SemaError::InvalidUnaryOperation {
                    op: "not".to_string(),
                    ty: type_name(ctx, et),
                });
            }
            Type::Class(ctx.bool_id())
        }

        ExprKind::Complement(e) => {
            let et = check_expr(ctx, diags, scope, self_class, method_name, e);
            if !conforms_to(ctx, et, Type::Class(ctx.int_id())) {
                diags.push(SemaError::InvalidUnaryOperation {
                    op: "~".to_string(),
                    ty: type_name(ctx, et),
                });
            }
            Type::Class(ctx.int_id())
        }

        ExprKind::IsVoid(e) => {
            check_expr(ctx, diags, scope, self_class, method_name, e);
            Type::Class(ctx.bool_id())
        }

        ExprKind::Binary { op, lhs, rhs } => {
            let lt = check_expr(ctx, diags, scope, self_class, method_name, lhs);
            let rtt = check_expr(ctx, diags, scope, self_class, method_name, rhs);
            match op {
                BinOp::Plus | BinOp::Minus | BinOp::Star | BinOp::Div => {
                    let int_ty = Type::Class(ctx.int_id());
                    if !conforms_to(ctx, lt, int_ty) || !conforms_to(ctx, rtt, int_ty) {
                        diags.push(SemaError::InvalidBinaryOperation {
                            op: op_str(*op).to_string(),
                            lhs: type_name(ctx, lt),
                            rhs: type_name(ctx, rtt),
                        });
                    }
                    int_ty
                }
                BinOp::LessEqual | BinOp::LessThan => {
                    let int_ty = Type::Class(ctx.int_id());
                    if !conforms_to(ctx, lt, int_ty) || !conforms_to(ctx, rtt, int_ty) {
                        diags.push(SemaError::InvalidBinaryOperation {
                            op: op_str(*op).to_string(),
                            lhs: type_name(ctx, lt),
                            rhs: type_name(ctx, rtt),
                        });
                    }
                    Type::Class(ctx.bool_id())
                }
                BinOp::Equal => {
                    if (is_primitive(ctx, lt) || is_primitive(ctx, rtt)) && lt != rtt {
                        diags.push(SemaError::InvalidBinaryOperation {
                            op: "=".to_string(),
                            lhs: type_name(ctx, lt),
                            rhs: type_name(ctx, rtt),
                        });
                    }
                    Type::Class(ctx.bool_id())
                }
            }
        }
    }
}
