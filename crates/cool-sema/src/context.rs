//! The class table: every class known to the program, keyed by name and by
//! a small arena index, plus the attribute and method descriptors hung off
//! each one.
//!
//! This plays the role the teacher's `TypeEnv` plays for lexical scopes,
//! but COOL's "scope" is the (fixed, single-inheritance) class hierarchy
//! rather than a lexical block stack, so the shape is different: a flat
//! arena of classes addressed by `TypeId`, built once by `TypeCollector`
//! and `TypeBuilder` and read by everything downstream.

use rustc_hash::FxHashMap;

use crate::error::SemaError;

/// Arena index into `Context`'s class table. Indices are never reused once
/// assigned, so a `TypeId` captured before an error is always safe to
/// dereference afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// A resolved type, as it appears on an attribute, a parameter, a return
/// type, or an expression's static type once checking has run.
///
/// This is deliberately not the teacher's `Ty` (no type variables, no
/// function types, no generics): COOL's type lattice is a fixed tree of
/// classes, plus two things bolted onto the side -- `SelfType`, which is
/// parameterized by the enclosing class and only resolved at the call
/// site, and `Error`, a bottom/top hybrid that conforms to and is
/// conformed to by everything so a single mistake doesn't cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// A concrete, fully-resolved class.
    Class(TypeId),
    /// `SELF_TYPE` as it reads in the class whose id is carried here.
    SelfType(TypeId),
    /// Stands in for a type that failed to resolve. Conforms to and is
    /// conformed to by anything, so that one bad declaration doesn't
    /// produce a cascade of unrelated diagnostics.
    Error,
}

impl Type {
    /// The class this type is ultimately anchored to, for lattice walks.
    /// `SelfType(c)` walks as `c`; `Error` has none.
    pub fn anchor(self) -> Option<TypeId> {
        match self {
            Type::Class(id) | Type::SelfType(id) => Some(id),
            Type::Error => None,
        }
    }
}

/// A method's signature: parameter types in declaration order (not
/// including an implicit receiver slot -- `self`'s type is always the
/// enclosing class and is looked up through the class table, not stored
/// here) plus a return type.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub param_names: Vec<String>,
    pub param_types: Vec<Type>,
    pub return_type: Type,
}

/// One class's attributes and methods, plus its parent link.
#[derive(Debug, Clone)]
pub struct ClassData {
    pub name: String,
    /// `None` only for `Object`, the root of the hierarchy.
    pub parent: Option<TypeId>,
    pub attrs: Vec<(String, Type)>,
    pub methods: Vec<Method>,
}

impl ClassData {
    pub fn find_attr(&self, name: &str) -> Option<Type> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    pub fn find_own_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_own_method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.iter_mut().find(|m| m.name == name)
    }
}

/// The class table. Owns every class reachable by name, in an arena
/// indexed by `TypeId`.
pub struct Context {
    names: FxHashMap<String, TypeId>,
    classes: Vec<ClassData>,
    object_id: TypeId,
    io_id: TypeId,
    int_id: TypeId,
    bool_id: TypeId,
    string_id: TypeId,
}

/// Names a COOL program may not use for a user class, either because
/// they're built in or because the language reserves them.
const RESERVED_CLASS_NAMES: &[&str] = &["SELF_TYPE"];

impl Context {
    /// Build a fresh class table containing only the five built-in
    /// classes (`Object`, `IO`, `Int`, `Bool`, `String`) and their
    /// built-in methods, with no user classes registered yet.
    pub fn with_builtins() -> Self {
        let mut ctx = Context {
            names: FxHashMap::default(),
            classes: Vec::new(),
            object_id: TypeId(0),
            io_id: TypeId(0),
            int_id: TypeId(0),
            bool_id: TypeId(0),
            string_id: TypeId(0),
        };

        let object_id = ctx.push_class("Object", None);
        let io_id = ctx.push_class("IO", Some(object_id));
        let int_id = ctx.push_class("Int", Some(object_id));
        let bool_id = ctx.push_class("Bool", Some(object_id));
        let string_id = ctx.push_class("String", Some(object_id));

        ctx.object_id = object_id;
        ctx.io_id = io_id;
        ctx.int_id = int_id;
        ctx.bool_id = bool_id;
        ctx.string_id = string_id;

        crate::builtins::register(&mut ctx);
        ctx
    }

    fn push_class(&mut self, name: &str, parent: Option<TypeId>) -> TypeId {
        let id = TypeId(self.classes.len() as u32);
        self.classes.push(ClassData {
            name: name.to_string(),
            parent,
            attrs: Vec::new(),
            methods: Vec::new(),
        });
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn object_id(&self) -> TypeId {
        self.object_id
    }
    pub fn io_id(&self) -> TypeId {
        self.io_id
    }
    pub fn int_id(&self) -> TypeId {
        self.int_id
    }
    pub fn bool_id(&self) -> TypeId {
        self.bool_id
    }
    pub fn string_id(&self) -> TypeId {
        self.string_id
    }

    /// Register a user class. Fails if the name collides with a built-in,
    /// a reserved word, or a class already declared earlier in the
    /// program.
    pub fn create_type(&mut self, name: &str) -> Result<TypeId, SemaError> {
        if RESERVED_CLASS_NAMES.contains(&name) {
            return Err(SemaError::ClassAlreadyDefined {
                name: name.to_string(),
            });
        }
        if self.names.contains_key(name) {
            return Err(SemaError::ClassAlreadyDefined {
                name: name.to_string(),
            });
        }
        Ok(self.push_class(name, None))
    }

    pub fn get_type_id(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn is_builtin(&self, id: TypeId) -> bool {
        id == self.object_id
            || id == self.io_id
            || id == self.int_id
            || id == self.bool_id
            || id == self.string_id
    }

    pub fn class(&self, id: TypeId) -> &ClassData {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: TypeId) -> &mut ClassData {
        &mut self.classes[id.0 as usize]
    }

    pub fn set_parent(&mut self, id: TypeId, parent: TypeId) {
        self.classes[id.0 as usize].parent = Some(parent);
    }

    pub fn class_name(&self, id: TypeId) -> &str {
        &self.classes[id.0 as usize].name
    }

    /// Every user-defined class, in registration order. Built-ins are
    /// excluded since `TopologicalOrdering` only reorders program text.
    pub fn user_classes(&self) -> impl Iterator<Item = TypeId> + '_ {
        let first_user = self.string_id.0 as usize + 1;
        (first_user..self.classes.len()).map(|i| TypeId(i as u32))
    }

    /// Walk the ancestor chain of `id`, starting at `id` itself, ending
    /// at `Object`. Does not terminate if the hierarchy has a cycle --
    /// callers only use this after `TopologicalOrdering` has certified
    /// the hierarchy is acyclic.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        let mut cur = id;
        while let Some(parent) = self.classes[cur.0 as usize].parent {
            chain.push(parent);
            cur = parent;
        }
        chain
    }

    pub fn is_ancestor_or_self(&self, ancestor: TypeId, of: TypeId) -> bool {
        self.ancestors(of).contains(&ancestor)
    }

    /// Look up a method by name, walking from `id` up through its
    /// ancestors. Returns the owning class along with the method.
    pub fn lookup_method(&self, id: TypeId, name: &str) -> Option<(TypeId, &Method)> {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if let Some(m) = self.class(c).find_own_method(name) {
                return Some((c, m));
            }
            cur = self.class(c).parent;
        }
        None
    }

    /// Look up an attribute by name, walking from `id` up through its
    /// ancestors.
    pub fn lookup_attr(&self, id: TypeId, name: &str) -> Option<Type> {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if let Some(t) = self.class(c).find_attr(name) {
                return Some(t);
            }
            cur = self.class(c).parent;
        }
        None
    }
}
