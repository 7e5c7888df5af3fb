//! Registers the methods of the five built-in classes into a freshly
//! created [`Context`]. There is no COOL source text for these -- they're
//! wired in directly, the way a bootstrap compiler hand-registers its
//! runtime's primitive signatures before it ever looks at user code.

use crate::context::{Context, Method, Type};

pub fn register(ctx: &mut Context) {
    let object_id = ctx.object_id();
    let io_id = ctx.io_id();
    let int_id = ctx.int_id();
    let string_id = ctx.string_id();

    let object_self = Type::SelfType(object_id);
    ctx.class_mut(object_id).methods.push(Method {
        name: "abort".to_string(),
        param_names: vec![],
        param_types: vec![],
        return_type: Type::Class(object_id),
    });
    ctx.class_mut(object_id).methods.push(Method {
        name: "type_name".to_string(),
        param_names: vec![],
        param_types: vec![],
        return_type: Type::Class(string_id),
    });
    ctx.class_mut(object_id).methods.push(Method {
        name: "copy".to_string(),
        param_names: vec![],
        param_types: vec![],
        return_type: object_self,
    });

    let io_self = Type::SelfType(io_id);
    ctx.class_mut(io_id).methods.push(Method {
        name: "out_string".to_string(),
        param_names: vec!["x".to_string()],
        param_types: vec![Type::Class(string_id)],
        return_type: io_self,
    });
    ctx.class_mut(io_id).methods.push(Method {
        name: "out_int".to_string(),
        param_names: vec!["x".to_string()],
        param_types: vec![Type::Class(int_id)],
        return_type: io_self,
    });
    ctx.class_mut(io_id).methods.push(Method {
        name: "in_string".to_string(),
        param_names: vec![],
        param_types: vec![],
        return_type: Type::Class(string_id),
    });
    ctx.class_mut(io_id).methods.push(Method {
        name: "in_int".to_string(),
        param_names: vec![],
        param_types: vec![],
        return_type: Type::Class(int_id),
    });

    ctx.class_mut(string_id).methods.push(Method {
        name: "length".to_string(),
        param_names: vec![],
        param_types: vec![],
        return_type: Type::Class(int_id),
    });
    ctx.class_mut(string_id).methods.push(Method {
        name: "concat".to_string(),
        param_names: vec!["s".to_string()],
        param_types: vec![Type::Class(string_id)],
        return_type: Type::Class(string_id),
    });
    ctx.class_mut(string_id).methods.push(Method {
        name: "substr".to_string(),
        param_names: vec!["i".to_string(), "l".to_string()],
        param_types: vec![Type::Class(int_id), Type::Class(int_id)],
        return_type: Type::Class(string_id),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_has_three_builtin_methods() {
        let ctx = Context::with_builtins();
        let (_, m) = ctx.lookup_method(ctx.string_id(), "substr").unwrap();
        assert_eq!(m.param_names, vec!["i", "l"]);
    }

    #[test]
    fn io_out_string_returns_self_type() {
        let ctx = Context::with_builtins();
        let (_, m) = ctx.lookup_method(ctx.io_id(), "out_string").unwrap();
        assert_eq!(m.return_type, Type::SelfType(ctx.io_id()));
    }

    #[test]
    fn int_inherits_object_methods_through_lookup() {
        let ctx = Context::with_builtins();
        let (owner, _) = ctx.lookup_method(ctx.int_id(), "abort").unwrap();
        assert_eq!(owner, ctx.object_id());
    }
}
