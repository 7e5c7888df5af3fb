use cool_common::Span;

/// A syntactic type annotation as written by the (external) parser.
///
/// This is the unresolved form: `Named` carries whatever identifier the
/// source used, `SelfType` and `Auto` are the two distinguished markers
/// from the language (`SELF_TYPE` and `AUTO_TYPE`). Semantic analysis
/// resolves every `TypeRef` to a concrete `cool_sema::TypeId`; `Auto` is
/// additionally rewritten in place once `InferenceChecker` has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRefKind {
    Named(String),
    SelfType,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub span: Span,
}

impl TypeRef {
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Named(name.into()),
            span,
        }
    }

    pub fn self_type(span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::SelfType,
            span,
        }
    }

    pub fn auto(span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Auto,
            span,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self.kind, TypeRefKind::Auto)
    }

    /// Rewrite an `AUTO_TYPE` slot in place once inference has resolved it.
    /// Panics if called on a non-`Auto` slot -- callers only invoke this
    /// from `InferenceChecker`'s rewrite pass, which has already checked.
    pub fn resolve_auto(&mut self, name: impl Into<String>) {
        debug_assert!(self.is_auto(), "resolve_auto called on a non-AUTO_TYPE slot");
        self.kind = TypeRefKind::Named(name.into());
    }
}
