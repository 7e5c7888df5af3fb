//! Second semantic pass: resolves each class's parent link and populates
//! its own attributes and methods.
//!
//! Deliberately does *not* check for conflicts with an ancestor's
//! attributes or methods here -- a class can be declared before its
//! parent in the source (that's the whole point of `TypeCollector`
//! pre-registering every name up front), so by the time we're building
//! class `B`, its parent `A` may not have its own attributes built yet.
//! Those cross-class checks wait for [`crate::override_checker`], which
//! runs once every class in the program has been fully built.

use cool_ast::{ClassDecl, MethodDecl, Program};
use rustc_hash::FxHashSet;

use crate::context::{Context, Method, Type, TypeId};
use crate::diagnostics::Diagnostics;
use crate::error::SemaError;

/// Resolve a syntactic `TypeRef` to a semantic `Type`, in the context of
/// class `self_class` (needed to anchor a bare `SELF_TYPE`).
///
/// `AUTO_TYPE` resolves to `Type::Error` here -- a placeholder that
/// `InferenceChecker` overwrites once it has worked out what the slot
/// should actually be. Any pass that runs before inference and sees this
/// placeholder should treat it exactly like any other unresolved type
/// (conforms to everything), which `Type::Error`'s semantics already do.
pub fn resolve_type_ref(
    ctx: &Context,
    diags: &mut Diagnostics,
    type_ref: &cool_ast::TypeRef,
    self_class: TypeId,
) -> Type {
    match &type_ref.kind {
        cool_ast::TypeRefKind::SelfType => Type::SelfType(self_class),
        cool_ast::TypeRefKind::Auto => Type::Error,
        cool_ast::TypeRefKind::Named(name) => match ctx.get_type_id(name) {
            Some(id) => Type::Class(id),
            None => {
                diags.push(SemaError::UnknownType { name: name.clone() });
                Type::Error
            }
        },
    }
}

pub fn run(ctx: &mut Context, program: &Program, diags: &mut Diagnostics) {
    let mut built: FxHashSet<String> = FxHashSet::default();
    for class in &program.classes {
        if !built.insert(class.name.clone()) {
            continue;
        }
        let Some(id) = ctx.get_type_id(&class.name) else {
            continue;
        };
        build_parent(ctx, diags, class, id);
        build_attrs(ctx, diags, class, id);
        build_methods(ctx, diags, class, id);
    }
}

fn build_parent(ctx: &mut Context, diags: &mut Diagnostics, class: &ClassDecl, id: TypeId) {
    let parent_id = match &class.parent {
        None => ctx.object_id(),
        Some(parent_name) => match ctx.get_type_id(parent_name) {
            Some(pid)
                if pid == ctx.int_id() || pid == ctx.bool_id() || pid == ctx.string_id() =>
            {
                diags.push(SemaError::CannotInheritFromBuiltin {
                    class: class.name.clone(),
                    parent: parent_name.clone(),
                });
                ctx.object_id()
            }
            Some(pid) => pid,
            None => {
                diags.push(SemaError::UndefinedParentClass {
                    class: class.name.clone(),
                    parent: parent_name.clone(),
                });
                ctx.object_id()
            }
        },
    };
    ctx.set_parent(id, parent_id);
}

fn build_attrs(ctx: &mut Context, diags: &mut Diagnostics, class: &ClassDecl, id: TypeId) {
    for attr in &class.attrs {
        if attr.name == "self" {
            diags.push(SemaError::SelfInvalidAttributeId);
            continue;
        }
        if ctx.class(id).find_attr(&attr.name).is_some() {
            diags.push(SemaError::AttrAlreadyDefined {
                name: attr.name.clone(),
                class: class.name.clone(),
            });
            continue;
        }
        let ty = resolve_type_ref(ctx, diags, &attr.declared_type, id);
        ctx.class_mut(id).attrs.push((attr.name.clone(), ty));
    }
}

fn build_methods(ctx: &mut Context, diags: &mut Diagnostics, class: &ClassDecl, id: TypeId) {
    for method in &class.methods {
        if ctx.class(id).find_own_method(&method.name).is_some() {
            diags.push(SemaError::MethodAlreadyDefined {
                name: method.name.clone(),
                class: class.name.clone(),
            });
            continue;
        }
        if let Some(m) = build_one_method(ctx, diags, id, method) {
            ctx.class_mut(id).methods.push(m);
        }
    }
}

fn build_one_method(
    ctx: &mut Context,
    diags: &mut Diagnostics,
    id: TypeId,
    method: &MethodDecl,
) -> Option<Method> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut param_names = Vec::with_capacity(method.params.len());
    let mut param_types = Vec::with_capacity(method.params.len());
    for param in &method.params {
        if param.name == "self" {
            diags.push(SemaError::LocalAlreadyDefined {
                name: "self".to_string(),
                method: method.name.clone(),
            });
            return None;
        }
        if !seen.insert(param.name.as_str()) {
            diags.push(SemaError::LocalAlreadyDefined {
                name: param.name.clone(),
                method: method.name.clone(),
            });
            return None;
        }
        param_names.push(param.name.clone());
        param_types.push(resolve_type_ref(ctx, diags, &param.declared_type, id));
    }
    let return_type = resolve_type_ref(ctx, diags, &method.return_type, id);
    Some(Method {
        name: method.name.clone(),
        param_names,
        param_types,
        return_type,
    })
}
