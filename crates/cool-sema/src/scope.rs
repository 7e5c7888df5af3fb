//! Lexical scoping for expression-level names: attributes, method
//! parameters, `let` bindings, and `case` arm binders.
//!
//! Mirrors the teacher's `TypeEnv` push/pop frame stack, generalized from
//! a single flat variable namespace (the teacher has no attribute/local
//! distinction to track) to also remember *why* a name is in scope, since
//! `self` and attributes have different mutability rules than locals.

use rustc_hash::FxHashMap;

use crate::context::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    SelfVar,
    Attribute,
    Parameter,
    Let,
    Case,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableInfo {
    pub ty: Type,
    pub kind: VarKind,
}

/// A stack of frames, innermost last. `let` and `case` each push one
/// frame per binding group; method bodies start with a single frame
/// holding `self` plus the parameters.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<FxHashMap<String, VariableInfo>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            frames: vec![FxHashMap::default()],
        }
    }

    pub fn define(&mut self, name: impl Into<String>, ty: Type, kind: VarKind) {
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .insert(name.into(), VariableInfo { ty, kind });
    }

    /// Whether `name` is already bound in the *current* (innermost)
    /// frame -- used to catch `let x: Int <- 1, x: String <- "" in ...`.
    pub fn is_locally_defined(&self, name: &str) -> bool {
        self.frames
            .last()
            .expect("scope always has at least one frame")
            .contains_key(name)
    }

    pub fn find(&self, name: &str) -> Option<&VariableInfo> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Enter a nested scope (a `let` binding group, a `case` arm, a
    /// block). Returns a new, independent `Scope` -- bindings added in
    /// the child never leak back into `self`.
    pub fn create_child(&self) -> Scope {
        let mut frames = self.frames.clone();
        frames.push(FxHashMap::default());
        Scope { frames }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TypeId;

    #[test]
    fn lookup_finds_through_parent_frames() {
        let mut scope = Scope::new();
        scope.define("self", Type::SelfType(TypeId(0)), VarKind::SelfVar);
        let child = scope.create_child();
        assert!(child.find("self").is_some());
    }

    #[test]
    fn child_bindings_do_not_leak_to_parent() {
        let scope = Scope::new();
        let mut child = scope.create_child();
        child.define("x", Type::Class(TypeId(1)), VarKind::Let);
        assert!(child.find("x").is_some());
        assert!(scope.find("x").is_none());
    }

    #[test]
    fn is_locally_defined_only_checks_innermost_frame() {
        let mut scope = Scope::new();
        scope.define("x", Type::Class(TypeId(1)), VarKind::Attribute);
        let child = scope.create_child();
        assert!(!child.is_locally_defined("x"));
        assert!(child.find("x").is_some());
    }
}
