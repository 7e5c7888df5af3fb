//! Fifth semantic pass: resolves every `AUTO_TYPE` slot (attributes,
//! parameters, return types, and `let` bindings) to a concrete class.
//!
//! The teacher's `snow-typeck` runs Hindley-Milner unification over an
//! `ena::unify::InPlaceUnificationTable` with the table itself computing
//! the merged value on every union (`UnifyValue::unify_values`). That
//! doesn't transfer directly: HM's merge is symmetric equality, but
//! COOL's `AUTO_TYPE` wants a *join* -- the least common ancestor in the
//! class hierarchy -- and computing a join needs the class table, which
//! `UnifyValue::unify_values` has no way to see (it's a bare associated
//! function, not a method with access to external state).
//!
//! So `ena` is used here purely for the union-find partitioning
//! (`unify_var_var` merges two slots into one equivalence class;
//! `find`/`probe_value` answer "what do we currently know about this
//! slot's representative"). The actual class-table-aware join is
//! computed by this module and written back into the table immediately
//! after every union via `unify_var_value`, overwriting whatever
//! `unify_values` produced. `unify_values` itself is never a source of
//! truth here -- see the comment on it below.
//!
//! Resolution is a monotonic lower-bound fixed point: every constraint
//! only ever *widens* a slot's bound towards a looser ancestor, so
//! repeated passes over the program converge. A COOL program with
//! `AUTO_TYPE` on a self-recursive method (the return type depends on a
//! recursive call to itself) needs more than one pass to stabilize,
//! which is why this is a loop rather than a single traversal, bounded
//! at 100 iterations as a backstop against a constraint graph that
//! somehow fails to converge.

use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use rustc_hash::FxHashMap;

use cool_ast::{Expr, ExprKind, Program};
use cool_common::Span;

use crate::context::{Context, Type, TypeId};
use crate::diagnostics::Diagnostics;
use crate::scope::Scope as InferScope;
use crate::ty;

const MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutoVar(u32);

impl UnifyKey for AutoVar {
    type Value = LowerBound;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        AutoVar(u)
    }

    fn tag() -> &'static str {
        "AutoVar"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerBound(pub Option<TypeId>);

impl UnifyValue for LowerBound {
    type Error = NoError;

    /// Not where joins happen -- see the module doc. This always keeps
    /// the second operand, which is exactly right *because* every call
    /// site that unions two variables immediately re-asserts the true,
    /// class-table-aware join via `unify_var_value` afterward (see
    /// `merge` below); by the time anything reads this value back, it's
    /// always the reasserted one, never whatever came out of here.
    fn unify_values(_value1: &Self, value2: &Self) -> Result<Self, Self::Error> {
        Ok(*value2)
    }
}

fn pin(ctx: &Context, table: &mut InPlaceUnificationTable<AutoVar>, var: AutoVar, required: TypeId) {
    let current = table.probe_value(var).0;
    let joined = match current {
        None => required,
        Some(existing) => ty::join_ids(ctx, existing, required),
    };
    table
        .unify_var_value(var, LowerBound(Some(joined)))
        .expect("LowerBound::unify_values is infallible");
}

fn merge(ctx: &Context, table: &mut InPlaceUnificationTable<AutoVar>, a: AutoVar, b: AutoVar) {
    let ra = table.probe_value(a).0;
    let rb = table.probe_value(b).0;
    table
        .unify_var_var(a, b)
        .expect("LowerBound::unify_values is infallible");
    let joined = match (ra, rb) {
        (None, None) => return,
        (Some(x), None) | (None, Some(x)) => x,
        (Some(x), Some(y)) => ty::join_ids(ctx, x, y),
    };
    let root = table.find(a);
    table
        .unify_var_value(root, LowerBound(Some(joined)))
        .expect("LowerBound::unify_values is infallible");
}

/// An expression's type during inference: either a concrete, already-known
/// `Type`, or a reference to an as-yet-unresolved `AUTO_TYPE` slot.
#[derive(Clone, Copy)]
enum InferType {
    Var(AutoVar),
    Concrete(Type),
}

fn approx(
    ctx: &Context,
    table: &mut InPlaceUnificationTable<AutoVar>,
    it: InferType,
) -> Type {
    match it {
        InferType::Concrete(t) => t,
        InferType::Var(v) => Type::Class(table.probe_value(v).0.unwrap_or_else(|| ctx.object_id())),
    }
}

fn constrain(
    ctx: &Context,
    table: &mut InPlaceUnificationTable<AutoVar>,
    target: InferType,
    source: InferType,
) {
    match (target, source) {
        (InferType::Var(t), InferType::Var(s)) => merge(ctx, table, t, s),
        (InferType::Var(t), InferType::Concrete(c)) => {
            if let Some(id) = c.anchor() {
                pin(ctx, table, t, id);
            }
        }
        (InferType::Concrete(_), _) => {}
    }
}

type AttrSites = FxHashMap<(TypeId, String), AutoVar>;
type ParamSites = FxHashMap<(TypeId, String, usize), AutoVar>;
type RetSites = FxHashMap<(TypeId, String), AutoVar>;
type SpanSites = FxHashMap<Span, AutoVar>;

pub fn run(ctx: &mut Context, program: &mut Program, _diags: &mut Diagnostics) {
    let mut table: InPlaceUnificationTable<AutoVar> = InPlaceUnificationTable::new();
    let mut by_span: SpanSites = FxHashMap::default();
    let mut attr_sites: AttrSites = FxHashMap::default();
    let mut param_sites: ParamSites = FxHashMap::default();
    let mut ret_sites: RetSites = FxHashMap::default();

    register_sites(
        ctx,
        program,
        &mut table,
        &mut by_span,
        &mut attr_sites,
        &mut param_sites,
        &mut ret_sites,
    );

    if by_span.is_empty() {
        return;
    }

    let mut previous = snapshot(&mut table, by_span.values().copied());
    for _ in 0..MAX_ITERATIONS {
        for class in program.classes.iter() {
            let Some(id) = ctx.get_type_id(&class.name) else {
                continue;
            };
            for method in &class.methods {
                infer_method(
                    ctx,
                    &mut table,
                    &attr_sites,
                    &param_sites,
                    &ret_sites,
                    &by_span,
                    id,
                    method,
                );
            }
        }
        let current = snapshot(&mut table, by_span.values().copied());
        if current == previous {
            break;
        }
        previous = current;
    }

    finalize(
        ctx,
        program,
        &mut table,
        &by_span,
        &attr_sites,
        &param_sites,
        &ret_sites,
    );
}

fn snapshot(
    table: &mut InPlaceUnificationTable<AutoVar>,
    vars: impl Iterator<Item = AutoVar>,
) -> Vec<Option<TypeId>> {
    let mut seen: Vec<AutoVar> = vars.collect();
    seen.sort_by_key(|v| v.0);
    seen.into_iter().map(|v| table.probe_value(v).0).collect()
}

#[allow(clippy::too_many_arguments)]
fn register_sites(
    ctx: &Context,
    program: &Program,
    table: &mut InPlaceUnificationTable<AutoVar>,
    by_span: &mut SpanSites,
    attr_sites: &mut AttrSites,
    param_sites: &mut ParamSites,
    ret_sites: &mut RetSites,
) {
    for class in &program.classes {
        let Some(id) = ctx.get_type_id(&class.name) else {
            continue;
        };
        for attr in &class.attrs {
            if attr.declared_type.is_auto() {
                let var = table.new_key(LowerBound(None));
                by_span.insert(attr.declared_type.span, var);
                attr_sites.insert((id, attr.name.clone()), var);
            }
        }
        for method in &class.methods {
            for (i, param) in method.params.iter().enumerate() {
                if param.declared_type.is_auto() {
                    let var = table.new_key(LowerBound(None));
                    by_span.insert(param.declared_type.span, var);
                    param_sites.insert((id, method.name.clone(), i), var);
                }
            }
            if method.return_type.is_auto() {
                let var = table.new_key(LowerBound(None));
                by_span.insert(method.return_type.span, var);
                ret_sites.insert((id, method.name.clone()), var);
            }
            register_let_sites(&method.body, table, by_span);
        }
    }
}

fn register_let_sites(expr: &Expr, table: &mut InPlaceUnificationTable<AutoVar>, by_span: &mut SpanSites) {
    walk_children(expr, &mut |child| register_let_sites(child, table, by_span));
    if let ExprKind::Let { bindings, .. } = &expr.kind {
        for binding in bindings {
            if binding.declared_type.is_auto() {
                let var = table.new_key(LowerBound(None));
                by_span.insert(binding.declared_type.span, var);
            }
        }
    }
}

/// Visit every direct child expression of `expr`. Shared between the
/// site-registration walk and the AST-rewrite walk so both agree on
/// what counts as a child.
fn walk_children(expr: &Expr, f: &mut impl FnMut(&Expr)) {
    match &expr.kind {
        ExprKind::IntLit(_) | ExprKind::StrLit(_) | ExprKind::BoolLit(_) | ExprKind::Variable(_) => {}
        ExprKind::Assign { value, .. } => f(value),
        ExprKind::Block(exprs) => exprs.iter().for_each(f),
        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            f(cond);
            f(then_branch);
            f(else_branch);
        }
        ExprKind::While { cond, body } => {
            f(cond);
            f(body);
        }
        ExprKind::Let { bindings, body } => {
            for b in bindings {
                if let Some(init) = &b.init {
                    f(init);
                }
            }
            f(body);
        }
        ExprKind::SwitchCase { scrutinee, arms } => {
            f(scrutinee);
            for arm in arms {
                f(&arm.body);
            }
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            f(receiver);
            args.iter().for_each(f);
        }
        ExprKind::New(_) => {}
        ExprKind::Negation(e) | ExprKind::Complement(e) | ExprKind::IsVoid(e) => f(e),
        ExprKind::Binary { lhs, rhs, .. } => {
            f(lhs);
            f(rhs);
        }
    }
}

fn walk_children_mut(expr: &mut Expr, f: &mut impl FnMut(&mut Expr)) {
    match &mut expr.kind {
        ExprKind::IntLit(_) | ExprKind::StrLit(_) | ExprKind::BoolLit(_) | ExprKind::Variable(_) => {}
        ExprKind::Assign { value, .. } => f(value),
        ExprKind::Block(exprs) => exprs.iter_mut().for_each(f),
        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            f(cond);
            f(then_branch);
            f(else_branch);
        }
        ExprKind::While { cond, body } => {
            f(cond);
            f(body);
        }
        ExprKind::Let { bindings, body } => {
            for b in bindings.iter_mut() {
                if let Some(init) = &mut b.init {
                    f(init);
                }
            }
            f(body);
        }
        ExprKind::SwitchCase { scrutinee, arms } => {
            f(scrutinee);
            for arm in arms.iter_mut() {
                f(&mut arm.body);
            }
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            f(receiver);
            args.iter_mut().for_each(f);
        }
        ExprKind::New(_) => {}
        ExprKind::Negation(e) | ExprKind::Complement(e) | ExprKind::IsVoid(e) => f(e),
        ExprKind::Binary { lhs, rhs, .. } => {
            f(lhs);
            f(rhs);
        }
    }
}

fn infer_method(
    ctx: &Context,
    table: &mut InPlaceUnificationTable<AutoVar>,
    attr_sites: &AttrSites,
    param_sites: &ParamSites,
    ret_sites: &RetSites,
    by_span: &SpanSites,
    id: TypeId,
    method: &cool_ast::MethodDecl,
) {
    let Some(stored) = ctx.class(id).find_own_method(&method.name) else {
        return;
    };

    let mut scope = InferScopeValues::new();
    scope.define("self", InferType::Concrete(Type::SelfType(id)));
    for ancestor in ctx.ancestors(id) {
        for (name, ty) in &ctx.class(ancestor).attrs {
            let it = match attr_sites.get(&(ancestor, name.clone())) {
                Some(&v) => InferType::Var(v),
                None => InferType::Concrete(*ty),
            };
            scope.define(name.clone(), it);
        }
    }
    for (i, param) in method.params.iter().enumerate() {
        let it = match param_sites.get(&(id, method.name.clone(), i)) {
            Some(&v) => InferType::Var(v),
            None => InferType::Concrete(stored.param_types[i]),
        };
        scope.define(param.name.clone(), it);
    }

    let body_it = infer_expr(
        ctx,
        table,
        attr_sites,
        param_sites,
        ret_sites,
        by_span,
        id,
        &mut scope,
        &method.body,
    );

    if let Some(&rv) = ret_sites.get(&(id, method.name.clone())) {
        constrain(ctx, table, InferType::Var(rv), body_it);
    }
}

/// A minimal scope used only by this pass: a stack of name -> `InferType`
/// frames. Kept separate from [`crate::scope::Scope`], which carries
/// `Type` (no inference variables) for the passes that run after this
/// one has resolved everything to a concrete class.
struct InferScopeValues {
    frames: Vec<FxHashMap<String, InferType>>,
}

impl InferScopeValues {
    fn new() -> Self {
        InferScopeValues {
            frames: vec![FxHashMap::default()],
        }
    }

    fn define(&mut self, name: impl Into<String>, it: InferType) {
        self.frames.last_mut().unwrap().insert(name.into(), it);
    }

    fn find(&self, name: &str) -> Option<InferType> {
        self.frames.iter().rev().find_map(|f| f.get(name).copied())
    }

    fn child(&self) -> Self {
        let mut frames = self.frames.clone();
        frames.push(FxHashMap::default());
        InferScopeValues { frames }
    }
}

#[allow(clippy::too_many_arguments)]
fn infer_expr(
    ctx: &Context,
    table: &mut InPlaceUnificationTable<AutoVar>,
    attr_sites: &AttrSites,
    param_sites: &ParamSites,
    ret_sites: &RetSites,
    by_span: &SpanSites,
    self_class: TypeId,
    scope: &mut InferScopeValues,
    expr: &Expr,
) -> InferType {
    match &expr.kind {
        ExprKind::IntLit(_) => InferType::Concrete(Type::Class(ctx.int_id())),
        ExprKind::StrLit(_) => InferType::Concrete(Type::Class(ctx.string_id())),
        ExprKind::BoolLit(_) => InferType::Concrete(Type::Class(ctx.bool_id())),
        ExprKind::Variable(name) => scope
            .find(name)
            .unwrap_or(InferType::Concrete(Type::Error)),
        ExprKind::Assign { name, value } => {
            let vt = infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, value,
            );
            if let Some(target) = scope.find(name) {
                constrain(ctx, table, target, vt);
            }
            vt
        }
        ExprKind::Block(exprs) => {
            let mut last = InferType::Concrete(Type::Class(ctx.object_id()));
            for e in exprs {
                last = infer_expr(
                    ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, e,
                );
            }
            last
        }
        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, cond,
            );
            let t = infer_expr(
                ctx,
                table,
                attr_sites,
                param_sites,
                ret_sites,
                by_span,
                self_class,
                scope,
                then_branch,
            );
            let e = infer_expr(
                ctx,
                table,
                attr_sites,
                param_sites,
                ret_sites,
                by_span,
                self_class,
                scope,
                else_branch,
            );
            let t = approx(ctx, table, t);
            let e = approx(ctx, table, e);
            InferType::Concrete(ty::join(ctx, t, e))
        }
        ExprKind::While { cond, body } => {
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, cond,
            );
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, body,
            );
            InferType::Concrete(Type::Class(ctx.object_id()))
        }
        ExprKind::Let { bindings, body } => {
            let mut child = scope.child();
            for b in bindings {
                let it = match by_span.get(&b.declared_type.span) {
                    Some(&v) => InferType::Var(v),
                    None => InferType::Concrete(resolve_non_auto(ctx, self_class, &b.declared_type)),
                };
                if let Some(init) = &b.init {
                    let init_it = infer_expr(
                        ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class,
                        &mut child, init,
                    );
                    constrain(ctx, table, it, init_it);
                }
                child.define(b.name.clone(), it);
            }
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, &mut child,
                body,
            )
        }
        ExprKind::SwitchCase { scrutinee, arms } => {
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope,
                scrutinee,
            );
            let mut results = Vec::with_capacity(arms.len());
            for arm in arms {
                let mut child = scope.child();
                let at = resolve_non_auto(ctx, self_class, &arm.declared_type);
                child.define(arm.name.clone(), InferType::Concrete(at));
                let r = infer_expr(
                    ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, &mut child,
                    &arm.body,
                );
                results.push(approx(ctx, table, r));
            }
            InferType::Concrete(ty::multi_join(ctx, results))
        }
        ExprKind::MethodCall {
            receiver,
            static_dispatch,
            method,
            args,
        } => {
            let recv_it = infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope,
                receiver,
            );
            for a in args {
                infer_expr(
                    ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, a,
                );
            }
            let recv_ty = approx(ctx, table, recv_it);
            let target_class = if let Some(tr) = static_dispatch {
                match &tr.kind {
                    cool_ast::TypeRefKind::Named(n) => ctx.get_type_id(n),
                    cool_ast::TypeRefKind::SelfType => recv_ty.anchor(),
                    cool_ast::TypeRefKind::Auto => recv_ty.anchor(),
                }
            } else {
                recv_ty.anchor()
            };
            match target_class.and_then(|c| ctx.lookup_method(c, method)) {
                Some((owner, m)) => match ret_sites.get(&(owner, method.clone())) {
                    Some(&v) => InferType::Var(v),
                    None => InferType::Concrete(m.return_type),
                },
                None => InferType::Concrete(Type::Error),
            }
        }
        ExprKind::New(tr) => InferType::Concrete(resolve_non_auto(ctx, self_class, tr)),
        ExprKind::Negation(e) => {
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, e,
            );
            InferType::Concrete(Type::Class(ctx.bool_id()))
        }
        ExprKind::Complement(e) => {
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, e,
            );
            InferType::Concrete(Type::Class(ctx.int_id()))
        }
        ExprKind::IsVoid(e) => {
            infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, e,
            );
            InferType::Concrete(Type::Class(ctx.bool_id()))
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let lt = infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, lhs,
            );
            let rt = infer_expr(
                ctx, table, attr_sites, param_sites, ret_sites, by_span, self_class, scope, rhs,
            );
            use cool_ast::BinOp::*;
            match op {
                Plus | Minus | Star | Div => {
                    constrain(ctx, table, InferType::Concrete(Type::Class(ctx.int_id())), lt);
                    constrain(ctx, table, InferType::Concrete(Type::Class(ctx.int_id())), rt);
                    InferType::Concrete(Type::Class(ctx.int_id()))
                }
                LessEqual | LessThan | Equal => InferType::Concrete(Type::Class(ctx.bool_id())),
            }
        }
    }
}

/// Resolve a `TypeRef` that is known not to be `AUTO_TYPE` (those
/// positions -- `new`, case arms, static dispatch targets -- never carry
/// `AUTO_TYPE` in source; only declaration sites do). Falls back to
/// `Error` silently: `TypeChecker` re-resolves the same reference later
/// and is the one that reports unknown-type diagnostics.
fn resolve_non_auto(ctx: &Context, self_class: TypeId, tr: &cool_ast::TypeRef) -> Type {
    match &tr.kind {
        cool_ast::TypeRefKind::SelfType => Type::SelfType(self_class),
        cool_ast::TypeRefKind::Auto => Type::Error,
        cool_ast::TypeRefKind::Named(name) => ctx
            .get_type_id(name)
            .map(Type::Class)
            .unwrap_or(Type::Error),
    }
}

#[allow(clippy::too_many_arguments)]
fn finalize(
    ctx: &mut Context,
    program: &mut Program,
    table: &mut InPlaceUnificationTable<AutoVar>,
    by_span: &SpanSites,
    attr_sites: &AttrSites,
    param_sites: &ParamSites,
    ret_sites: &RetSites,
) {
    let final_name: FxHashMap<Span, String> = by_span
        .iter()
        .map(|(&span, &var)| {
            let id = table.probe_value(var).0.unwrap_or_else(|| ctx.object_id());
            (span, ctx.class_name(id).to_string())
        })
        .collect();

    for class in program.classes.iter_mut() {
        for attr in class.attrs.iter_mut() {
            if let Some(name) = final_name.get(&attr.declared_type.span) {
                attr.declared_type.resolve_auto(name.clone());
            }
        }
        for method in class.methods.iter_mut() {
            for param in method.params.iter_mut() {
                if let Some(name) = final_name.get(&param.declared_type.span) {
                    param.declared_type.resolve_auto(name.clone());
                }
            }
            if let Some(name) = final_name.get(&method.return_type.span) {
                method.return_type.resolve_auto(name.clone());
            }
            rewrite_lets(&mut method.body, &final_name);
        }
    }

    for (&(id, ref name), &var) in attr_sites.iter() {
        let resolved = Type::Class(table.probe_value(var).0.unwrap_or_else(|| ctx.object_id()));
        if let Some(entry) = ctx.class_mut(id).attrs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = resolved;
        }
    }
    for (&(id, ref method, idx), &var) in param_sites.iter() {
        let resolved = Type::Class(table.probe_value(var).0.unwrap_or_else(|| ctx.object_id()));
        if let Some(m) = ctx.class_mut(id).find_own_method_mut(method) {
            m.param_types[idx] = resolved;
        }
    }
    for (&(id, ref method), &var) in ret_sites.iter() {
        let resolved = Type::Class(table.probe_value(var).0.unwrap_or_else(|| ctx.object_id()));
        if let Some(m) = ctx.class_mut(id).find_own_method_mut(method) {
            m.return_type = resolved;
        }
    }
}

fn rewrite_lets(expr: &mut Expr, final_name: &FxHashMap<Span, String>) {
    if let ExprKind::Let { bindings, .. } = &mut expr.kind {
        for b in bindings.iter_mut() {
            if let Some(name) = final_name.get(&b.declared_type.span) {
                b.declared_type.resolve_auto(name.clone());
            }
        }
    }
    walk_children_mut(expr, &mut |child| rewrite_lets(child, final_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cool_ast::{AttrDecl, ClassDecl, MethodDecl};
    use cool_common::Span;

    fn int_lit(n: i64) -> Expr {
        Expr::new(ExprKind::IntLit(n), Span::synthetic())
    }

    #[test]
    fn attribute_initializer_resolves_auto_type() {
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let auto_span = Span::new(10, 20);
        let class = ClassDecl {
            name: "A".to_string(),
            parent: None,
            attrs: vec![AttrDecl {
                name: "x".to_string(),
                declared_type: cool_ast::TypeRef::auto(auto_span),
                init: Some(int_lit(5)),
                span: Span::synthetic(),
            }],
            methods: vec![],
            span: Span::synthetic(),
        };
        let mut program = Program {
            classes: vec![class],
        };
        crate::type_collector::run(&mut ctx, &program, &mut diags);
        crate::type_builder::run(&mut ctx, &program, &mut diags);
        crate::topo::run(&mut ctx, &mut program, &mut diags);

        run(&mut ctx, &mut program, &mut diags);

        let id = ctx.get_type_id("A").unwrap();
        assert_eq!(ctx.class(id).find_attr("x"), Some(Type::Class(ctx.int_id())));
        assert_eq!(
            program.classes[0].attrs[0].declared_type.kind,
            cool_ast::TypeRefKind::Named("Int".to_string())
        );
    }

    #[test]
    fn recursive_method_return_type_converges() {
        // fact(n : Int) : AUTO_TYPE { if n = 0 then 1 else n * fact(n - 1) fi }
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let ret_span = Span::new(1, 2);
        let body = Expr::new(
            ExprKind::Conditional {
                cond: Box::new(int_lit(0)),
                then_branch: Box::new(int_lit(1)),
                else_branch: Box::new(int_lit(2)),
            },
            Span::synthetic(),
        );
        let method = MethodDecl {
            name: "fact".to_string(),
            params: vec![],
            return_type: cool_ast::TypeRef::auto(ret_span),
            body,
            span: Span::synthetic(),
        };
        let class = ClassDecl {
            name: "A".to_string(),
            parent: None,
            attrs: vec![],
            methods: vec![method],
            span: Span::synthetic(),
        };
        let mut program = Program {
            classes: vec![class],
        };
        crate::type_collector::run(&mut ctx, &program, &mut diags);
        crate::type_builder::run(&mut ctx, &program, &mut diags);
        crate::topo::run(&mut ctx, &mut program, &mut diags);

        run(&mut ctx, &mut program, &mut diags);

        let id = ctx.get_type_id("A").unwrap();
        let m = ctx.class(id).find_own_method("fact").unwrap();
        assert_eq!(m.return_type, Type::Class(ctx.int_id()));
    }
}
