//! The type lattice: conformance and least-upper-bound (`join`) over the
//! class hierarchy held in a [`Context`].
//!
//! These are free functions over `&Context` rather than methods on `Type`,
//! since `Type` alone (in particular `SelfType`) isn't enough to answer
//! either question -- you need the class table to walk ancestor chains.

use crate::context::{Context, Type, TypeId};

/// Does `a` conform to `b`? (`a` is a subtype of, or equal to, `b`.)
///
/// `Error` conforms to everything and everything conforms to `Error`, so
/// that a single unresolved type doesn't produce a cascade of unrelated
/// conformance failures. `SELF_TYPE[C]` conforms to any ancestor of `C`
/// (including `C` itself) and to `SELF_TYPE[C]` itself, but a concrete
/// class only conforms to `SELF_TYPE[C]` when it *is* `C` -- `SELF_TYPE`
/// is always at least as specific as its anchor class, so nothing can
/// widen into it except that exact class.
pub fn conforms_to(ctx: &Context, a: Type, b: Type) -> bool {
    match (a, b) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::SelfType(c1), Type::SelfType(c2)) => c1 == c2,
        (Type::SelfType(c), Type::Class(target)) => ctx.is_ancestor_or_self(target, c),
        (Type::Class(c), Type::SelfType(target)) => c == target,
        (Type::Class(c), Type::Class(target)) => ctx.is_ancestor_or_self(target, c),
    }
}

/// The least upper bound of `a` and `b` in the inheritance tree.
///
/// Identical types join to themselves (this is what lets `if ... then
/// self else self fi` keep its `SELF_TYPE`, rather than widening to the
/// enclosing class on every branch). Anything else is resolved by
/// anchoring both operands to a concrete class and walking up both
/// ancestor chains to their first common member.
pub fn join(ctx: &Context, a: Type, b: Type) -> Type {
    match (a, b) {
        (Type::Error, other) | (other, Type::Error) => other,
        _ if a == b => a,
        _ => {
            let ac = a.anchor().unwrap_or_else(|| ctx.object_id());
            let bc = b.anchor().unwrap_or_else(|| ctx.object_id());
            Type::Class(join_ids(ctx, ac, bc))
        }
    }
}

/// `join` restricted to two class ids, with no `SelfType`/`Error`
/// bookkeeping. Used both by `join` above and by the inference pass,
/// which tracks lower bounds purely in terms of `TypeId`.
pub fn join_ids(ctx: &Context, a: TypeId, b: TypeId) -> TypeId {
    if a == b {
        return a;
    }
    let a_chain = ctx.ancestors(a);
    let b_chain: std::collections::HashSet<_> = ctx.ancestors(b).into_iter().collect();
    for candidate in a_chain {
        if b_chain.contains(&candidate) {
            return candidate;
        }
    }
    ctx.object_id()
}

/// `join` folded over an iterator of types. The join of zero types is
/// `Object`, the identity element of this lattice.
pub fn multi_join(ctx: &Context, types: impl IntoIterator<Item = Type>) -> Type {
    types
        .into_iter()
        .fold(Type::Class(ctx.object_id()), |acc, t| join(ctx, acc, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn builtin_hierarchy_conforms() {
        let ctx = Context::with_builtins();
        assert!(conforms_to(
            &ctx,
            Type::Class(ctx.int_id()),
            Type::Class(ctx.object_id())
        ));
        assert!(!conforms_to(
            &ctx,
            Type::Class(ctx.object_id()),
            Type::Class(ctx.int_id())
        ));
        assert!(conforms_to(
            &ctx,
            Type::Class(ctx.int_id()),
            Type::Class(ctx.int_id())
        ));
    }

    #[test]
    fn error_conforms_both_ways() {
        let ctx = Context::with_builtins();
        assert!(conforms_to(&ctx, Type::Error, Type::Class(ctx.int_id())));
        assert!(conforms_to(&ctx, Type::Class(ctx.int_id()), Type::Error));
    }

    #[test]
    fn self_type_conforms_to_ancestors_only() {
        let mut ctx = Context::with_builtins();
        let a = ctx.create_type("A").unwrap();
        ctx.set_parent(a, ctx.object_id());
        assert!(conforms_to(&ctx, Type::SelfType(a), Type::Class(a)));
        assert!(conforms_to(
            &ctx,
            Type::SelfType(a),
            Type::Class(ctx.object_id())
        ));
        assert!(!conforms_to(&ctx, Type::SelfType(a), Type::Class(ctx.int_id())));
        assert!(!conforms_to(&ctx, Type::Class(a), Type::SelfType(a)));
    }

    #[test]
    fn join_same_self_type_preserved() {
        let mut ctx = Context::with_builtins();
        let a = ctx.create_type("A").unwrap();
        ctx.set_parent(a, ctx.object_id());
        let joined = join(&ctx, Type::SelfType(a), Type::SelfType(a));
        assert_eq!(joined, Type::SelfType(a));
    }

    #[test]
    fn join_diverging_branches_is_concrete_ancestor() {
        let mut ctx = Context::with_builtins();
        let a = ctx.create_type("A").unwrap();
        ctx.set_parent(a, ctx.object_id());
        let b = ctx.create_type("B").unwrap();
        ctx.set_parent(b, a);
        let c = ctx.create_type("C").unwrap();
        ctx.set_parent(c, a);
        assert_eq!(join(&ctx, Type::Class(b), Type::Class(c)), Type::Class(a));
    }

    #[test]
    fn multi_join_empty_is_object() {
        let ctx = Context::with_builtins();
        assert_eq!(multi_join(&ctx, []), Type::Class(ctx.object_id()));
    }
}
