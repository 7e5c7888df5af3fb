//! Every diagnostic semantic analysis can raise.
//!
//! One flat enum rather than one per pass: a `Diagnostics` collector
//! doesn't care which pass produced an error, and keeping them together
//! means the message wording lives in exactly one place. Manual `Display`
//! impl, no `thiserror` -- these are user-facing compiler messages, not
//! `std::error::Error` chains meant for `?`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemaError {
    ClassAlreadyDefined {
        name: String,
    },
    UndefinedParentClass {
        class: String,
        parent: String,
    },
    CannotInheritFromBuiltin {
        class: String,
        parent: String,
    },
    InheritanceCycle {
        class: String,
    },
    UnknownType {
        name: String,
    },
    AttrAlreadyDefined {
        name: String,
        class: String,
    },
    SelfInvalidAttributeId,
    SelfIsReadonly,
    MethodAlreadyDefined {
        name: String,
        class: String,
    },
    WrongSignature {
        name: String,
        class: String,
    },
    LocalAlreadyDefined {
        name: String,
        method: String,
    },
    IncompatibleTypes {
        from: String,
        to: String,
    },
    VariableNotDefined {
        name: String,
        context: String,
    },
    InvalidBinaryOperation {
        op: String,
        lhs: String,
        rhs: String,
    },
    InvalidUnaryOperation {
        op: String,
        ty: String,
    },
    MethodNotDefined {
        name: String,
        ty: String,
    },
    WrongArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },
    StaticDispatchNotAncestor {
        ty: String,
        target: String,
    },
    CaseDuplicateBranchType {
        ty: String,
    },
    MainClassMissing,
    MainMethodMissing,
    MainMethodWrongArity,
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaError::ClassAlreadyDefined { name } => {
                write!(f, "Class \"{name}\" is already defined.")
            }
            SemaError::UndefinedParentClass { class, parent } => {
                write!(f, "Class \"{class}\" inherits from undefined class \"{parent}\".")
            }
            SemaError::CannotInheritFromBuiltin { parent, .. } => {
                write!(f, "Cannot inherit from type \"{parent}\".")
            }
            SemaError::InheritanceCycle { class } => {
                write!(f, "Class \"{class}\" is involved in an inheritance cycle.")
            }
            SemaError::UnknownType { name } => write!(f, "Type \"{name}\" is not defined."),
            SemaError::AttrAlreadyDefined { name, class } => {
                write!(f, "Attribute \"{name}\" is already defined in \"{class}\".")
            }
            SemaError::SelfInvalidAttributeId => {
                write!(f, "\"self\" is an invalid attribute identifier.")
            }
            SemaError::SelfIsReadonly => write!(f, "Variable \"self\" is read-only."),
            SemaError::MethodAlreadyDefined { name, class } => {
                write!(f, "Method \"{name}\" is already defined in \"{class}\".")
            }
            SemaError::WrongSignature { name, class } => write!(
                f,
                "Method \"{name}\" already defined in \"{class}\" with a different signature."
            ),
            SemaError::LocalAlreadyDefined { name, method } => write!(
                f,
                "Variable \"{name}\" is already defined in method \"{method}\"."
            ),
            SemaError::IncompatibleTypes { from, to } => {
                write!(f, "Cannot convert \"{from}\" into \"{to}\".")
            }
            SemaError::VariableNotDefined { name, context } => {
                write!(f, "Variable \"{name}\" is not defined in \"{context}\".")
            }
            SemaError::InvalidBinaryOperation { op, lhs, rhs } => write!(
                f,
                "Operation \"{op}\" is not defined between \"{lhs}\" and \"{rhs}\"."
            ),
            SemaError::InvalidUnaryOperation { op, ty } => {
                write!(f, "Operation \"{op}\" is not defined for \"{ty}\".")
            }
            SemaError::MethodNotDefined { name, ty } => {
                write!(f, "Method \"{name}\" is not defined in \"{ty}\".")
            }
            SemaError::WrongArgumentCount {
                name,
                expected,
                got,
            } => write!(
                f,
                "Method \"{name}\" called with {got} argument(s) but expects {expected}."
            ),
            SemaError::StaticDispatchNotAncestor { ty, target } => write!(
                f,
                "Expression type \"{ty}\" does not conform to static dispatch type \"{target}\"."
            ),
            SemaError::CaseDuplicateBranchType { ty } => {
                write!(f, "Duplicate branch \"{ty}\" in case expression.")
            }
            SemaError::MainClassMissing => write!(f, "Class \"Main\" is not defined."),
            SemaError::MainMethodMissing => {
                write!(f, "Method \"main\" is not defined in class \"Main\".")
            }
            SemaError::MainMethodWrongArity => write!(f, "Method \"main\" must take no arguments."),
        }
    }
}
