//! The tree-walking evaluator.
//!
//! Runs only once every semantic pass has reported zero diagnostics --
//! every `unreachable!()` below is load-bearing on that precondition
//! (a predicate that isn't `Bool`, an arm type that didn't resolve, a
//! method that doesn't exist) having already been ruled out statically.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use cool_ast::{BinOp, Expr, ExprKind, Program, TypeRef, TypeRefKind};
use cool_sema::{Context, TypeId};

use crate::error::RuntimeError;
use crate::scope::EvalScope;
use crate::value::{Instance, Value};

pub struct Executor<'a> {
    ctx: &'a Context,
    method_bodies: FxHashMap<(TypeId, String), &'a Expr>,
    attr_inits: FxHashMap<(TypeId, String), &'a Expr>,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: &'a Context, program: &'a Program) -> Self {
        let mut method_bodies = FxHashMap::default();
        let mut attr_inits = FxHashMap::default();
        for class in &program.classes {
            let Some(id) = ctx.get_type_id(&class.name) else {
                continue;
            };
            for method in &class.methods {
                method_bodies.insert((id, method.name.clone()), &method.body);
            }
            for attr in &class.attrs {
                if let Some(init) = &attr.init {
                    attr_inits.insert((id, attr.name.clone()), init);
                }
            }
        }
        Executor {
            ctx,
            method_bodies,
            attr_inits,
        }
    }

    /// Instantiate `Main` and evaluate `main()`.
    pub fn run(&mut self) -> Result<Value, RuntimeError> {
        let main_id = self
            .ctx
            .get_type_id("Main")
            .expect("TypeChecker guarantees a Main class before Executor runs");
        let main = self.instantiate(main_id);
        let (owner_id, _) = self
            .ctx
            .lookup_method(main_id, "main")
            .expect("TypeChecker guarantees a Main.main method before Executor runs");
        self.call_method(owner_id, "main", &Value::Object(main), Vec::new())
    }

    fn instantiate(&mut self, class: TypeId) -> Rc<RefCell<Instance>> {
        let instance = Rc::new(RefCell::new(Instance::new(class)));
        let mut ancestors = self.ctx.ancestors(class);
        ancestors.reverse(); // root (Object) first, most-derived last

        for &owner in &ancestors {
            for (name, ty) in &self.ctx.class(owner).attrs {
                let default = self.default_for_type(*ty, class);
                instance.borrow_mut().attrs.insert(name.clone(), default);
            }
        }
        for &owner in &ancestors {
            for (name, _) in &self.ctx.class(owner).attrs {
                if let Some(init) = self.attr_inits.get(&(owner, name.clone())).copied() {
                    let mut scope = EvalScope::new();
                    // A bad attribute initializer can't actually raise at
                    // this point (no runtime error kind covers "bad
                    // initializer"); eval still returns Result for the
                    // general case, e.g. a division by zero.
                    let value = self
                        .eval(init, &mut scope, &instance)
                        .unwrap_or(Value::Void);
                    instance.borrow_mut().attrs.insert(name.clone(), value);
                }
            }
        }
        instance
    }

    fn default_for_type(&self, ty: cool_sema::Type, enclosing: TypeId) -> Value {
        let id = match ty.anchor() {
            Some(id) => id,
            None => return Value::Void,
        };
        self.default_for_id(id, enclosing)
    }

    fn default_for_id(&self, id: TypeId, _enclosing: TypeId) -> Value {
        if id == self.ctx.int_id() {
            Value::Int(0)
        } else if id == self.ctx.bool_id() {
            Value::Bool(false)
        } else if id == self.ctx.string_id() {
            Value::Str(Rc::from(""))
        } else {
            Value::Void
        }
    }

    /// Resolve a syntactic `TypeRef` to a concrete class id at runtime.
    /// `SELF_TYPE` resolves against the receiver's *runtime* class, not
    /// the enclosing method's declaring class, since every caller of
    /// this passes the object whose dynamic type `SELF_TYPE` actually
    /// means here.
    fn resolve_type_ref(&self, tr: &TypeRef, self_obj: &Rc<RefCell<Instance>>) -> TypeId {
        match &tr.kind {
            TypeRefKind::Named(name) => self
                .ctx
                .get_type_id(name)
                .unwrap_or_else(|| self.ctx.object_id()),
            TypeRefKind::SelfType => self_obj.borrow().class,
            TypeRefKind::Auto => self.ctx.object_id(),
        }
    }

    fn runtime_type_of(&self, value: &Value) -> TypeId {
        match value {
            Value::Int(_) => self.ctx.int_id(),
            Value::Bool(_) => self.ctx.bool_id(),
            Value::Str(_) => self.ctx.string_id(),
            Value::Object(rc) => rc.borrow().class,
            Value::Void => self.ctx.object_id(),
        }
    }

    pub fn eval(
        &mut self,
        expr: &Expr,
        scope: &mut EvalScope,
        self_obj: &Rc<RefCell<Instance>>,
    ) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::StrLit(s) => Ok(Value::Str(Rc::from(s.as_str()))),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),

            ExprKind::Variable(name) => {
                if name == "self" {
                    Ok(Value::Object(self_obj.clone()))
                } else if let Some(v) = scope.find(name) {
                    Ok(v)
                } else {
                    Ok(self_obj
                        .borrow()
                        .attrs
                        .get(name)
                        .cloned()
                        .unwrap_or(Value::Void))
                }
            }

            ExprKind::Assign { name, value } => {
                let v = self.eval(value, scope, self_obj)?;
                if name != "self" && !scope.assign(name, v.clone()) {
                    self_obj.borrow_mut().attrs.insert(name.clone(), v.clone());
                }
                Ok(v)
            }

            ExprKind::Block(exprs) => {
                let mut last = Value::Void;
                for e in exprs {
                    last = self.eval(e, scope, self_obj)?;
                }
                Ok(last)
            }

            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => match self.eval(cond, scope, self_obj)? {
                Value::Bool(true) => self.eval(then_branch, scope, self_obj),
                Value::Bool(false) => self.eval(else_branch, scope, self_obj),
                _ => unreachable!("if-condition is statically Bool"),
            },

            ExprKind::While { cond, body } => {
                loop {
                    match self.eval(cond, scope, self_obj)? {
                        Value::Bool(true) => {
                            self.eval(body, scope, self_obj)?;
                        }
                        Value::Bool(false) => break,
                        _ => unreachable!("while-condition is statically Bool"),
                    }
                }
                Ok(Value::Void)
            }

            ExprKind::Let { bindings, body } => {
                let mut child = scope.create_child();
                for binding in bindings {
                    let value = match &binding.init {
                        Some(init) => self.eval(init, &mut child, self_obj)?,
                        None => {
                            let id = self.resolve_type_ref(&binding.declared_type, self_obj);
                            self.default_for_id(id, self_obj.borrow().class)
                        }
                    };
                    child.define(binding.name.clone(), value);
                }
                self.eval(body, &mut child, self_obj)
            }

            ExprKind::SwitchCase { scrutinee, arms } => {
                let value = self.eval(scrutinee, scope, self_obj)?;
                if value.is_void() {
                    return Err(RuntimeError::case_on_void());
                }
                let runtime_id = self.runtime_type_of(&value);
                let chain = self.ctx.ancestors(runtime_id);

                let mut selected = None;
                'outer: for ancestor in chain {
                    for arm in arms {
                        if self.resolve_type_ref(&arm.declared_type, self_obj) == ancestor {
                            selected = Some(arm);
                            break 'outer;
                        }
                    }
                }
                let arm = selected
                    .ok_or_else(|| RuntimeError::case_no_match(self.ctx.class_name(runtime_id)))?;

                let mut child = scope.create_child();
                child.define(arm.name.clone(), value);
                self.eval(&arm.body, &mut child, self_obj)
            }

            ExprKind::MethodCall {
                receiver,
                static_dispatch,
                method,
                args,
            } => {
                let recv = self.eval(receiver, scope, self_obj)?;
                if recv.is_void() {
                    return Err(RuntimeError::dispatch_on_void());
                }
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, scope, self_obj)?);
                }
                let target_id = match static_dispatch {
                    Some(tr) => self.resolve_type_ref(tr, self_obj),
                    None => self.runtime_type_of(&recv),
                };
                self.call_method(target_id, method, &recv, arg_values)
            }

            ExprKind::New(tr) => {
                let id = self.resolve_type_ref(tr, self_obj);
                Ok(Value::Object(self.instantiate(id)))
            }

            ExprKind::Negation(e) => match self.eval(e, scope, self_obj)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                _ => unreachable!("not-operand is statically Bool"),
            },

            ExprKind::Complement(e) => match self.eval(e, scope, self_obj)? {
                Value::Int(n) => Ok(Value::Int(-n)),
                _ => unreachable!("~-operand is statically Int"),
            },

            ExprKind::IsVoid(e) => {
                let v = self.eval(e, scope, self_obj)?;
                Ok(Value::Bool(v.is_void()))
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs, scope, self_obj)?;
                let r = self.eval(rhs, scope, self_obj)?;
                eval_binary(*op, l, r)
            }
        }
    }

    fn call_method(
        &mut self,
        target_id: TypeId,
        method_name: &str,
        receiver: &Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let (owner_id, method) = self
            .ctx
            .lookup_method(target_id, method_name)
            .expect("method existence is validated statically");

        if self.ctx.is_builtin(owner_id) {
            return self.call_builtin(method_name, receiver, args);
        }

        let body = *self
            .method_bodies
            .get(&(owner_id, method_name.to_string()))
            .expect("a non-builtin method's owner must have a body registered");
        let param_names = method.param_names.clone();
        let mut call_scope = EvalScope::new();
        for (name, value) in param_names.into_iter().zip(args) {
            call_scope.define(name, value);
        }
        let self_for_call = match receiver {
            Value::Object(rc) => rc.clone(),
            _ => unreachable!("a non-builtin method can only be dispatched on an Object instance"),
        };
        self.eval(body, &mut call_scope, &self_for_call)
    }

    fn call_builtin(
        &mut self,
        method_name: &str,
        receiver: &Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match method_name {
            "abort" => Err(RuntimeError::abort_called()),
            "type_name" => {
                let id = self.runtime_type_of(receiver);
                Ok(Value::Str(Rc::from(self.ctx.class_name(id))))
            }
            "copy" => match receiver {
                Value::Object(rc) => {
                    let inst = rc.borrow();
                    let copy = Instance {
                        class: inst.class,
                        attrs: inst.attrs.clone(),
                    };
                    Ok(Value::Object(Rc::new(RefCell::new(copy))))
                }
                other => Ok(other.clone()),
            },
            "out_string" => {
                if let Some(Value::Str(s)) = args.first() {
                    print!("{s}");
                }
                Ok(receiver.clone())
            }
            "out_int" => {
                if let Some(Value::Int(n)) = args.first() {
                    print!("{n}");
                }
                Ok(receiver.clone())
            }
            "in_string" => {
                let mut line = String::new();
                let _ = std::io::stdin().read_line(&mut line);
                strip_newline(&mut line);
                Ok(Value::Str(Rc::from(line.as_str())))
            }
            "in_int" => {
                let mut line = String::new();
                let _ = std::io::stdin().read_line(&mut line);
                let n: i64 = line.trim().parse().unwrap_or(0);
                Ok(Value::Int(n))
            }
            "length" => match receiver {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                _ => unreachable!("length is only ever dispatched on a String"),
            },
            "concat" => match (receiver, args.first()) {
                (Value::Str(s), Some(Value::Str(other))) => {
                    Ok(Value::Str(Rc::from(format!("{s}{other}").as_str())))
                }
                _ => unreachable!("concat is only ever dispatched on a String with a String argument"),
            },
            "substr" => match (receiver, args.as_slice()) {
                (Value::Str(s), [Value::Int(i), Value::Int(l)]) => {
                    let chars: Vec<char> = s.chars().collect();
                    let (i, l) = (*i, *l);
                    if i < 0 || l < 0 || (i as usize).saturating_add(l as usize) > chars.len() {
                        return Err(RuntimeError::substr_out_of_range());
                    }
                    let out: String = chars[i as usize..(i + l) as usize].iter().collect();
                    Ok(Value::Str(Rc::from(out.as_str())))
                }
                _ => unreachable!("substr is only ever dispatched on a String with two Int arguments"),
            },
            other => unreachable!("unknown built-in method \"{other}\" passed static checking"),
        }
    }
}

fn strip_newline(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

fn eval_binary(op: BinOp, l: Value, r: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Plus | BinOp::Minus | BinOp::Star | BinOp::Div => {
            let (Value::Int(a), Value::Int(b)) = (l, r) else {
                unreachable!("arithmetic operands are statically Int");
            };
            match op {
                BinOp::Plus => Ok(Value::Int(a + b)),
                BinOp::Minus => Ok(Value::Int(a - b)),
                BinOp::Star => Ok(Value::Int(a * b)),
                BinOp::Div => {
                    if b == 0 {
                        Err(RuntimeError::division_by_zero())
                    } else {
                        Ok(Value::Int(a / b))
                    }
                }
                _ => unreachable!(),
            }
        }
        BinOp::LessEqual | BinOp::LessThan => {
            let (Value::Int(a), Value::Int(b)) = (l, r) else {
                unreachable!("order operands are statically Int");
            };
            Ok(Value::Bool(if op == BinOp::LessEqual { a <= b } else { a < b }))
        }
        BinOp::Equal => Ok(Value::Bool(values_equal(&l, &r))),
    }
}

/// `Int`/`Bool`/`String` compare structurally; everything else
/// (including every user-defined object) compares by identity, per the
/// resolved Open Question on equality semantics.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Void, Value::Void) => true,
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}
