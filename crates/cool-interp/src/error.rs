//! Runtime errors: the six ways evaluation can stop early.
//!
//! Unlike `SemaError`, these aren't accumulated -- the interpreter halts
//! at the first one and unwinds the call stack via ordinary `?`
//! propagation, per the "runtime errors terminate execution" split
//! between the two diagnostic tiers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    DispatchOnVoid,
    CaseOnVoid,
    CaseNoMatch,
    SubstrOutOfRange,
    DivisionByZero,
    AbortCalled,
}

/// A runtime error as handed back to the caller: a machine-readable
/// `kind` plus a human-readable `message`, per spec's "structured error
/// with kind + message" contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn dispatch_on_void() -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::DispatchOnVoid,
            message: "dispatch on void".to_string(),
        }
    }

    pub fn case_on_void() -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::CaseOnVoid,
            message: "case on void".to_string(),
        }
    }

    pub fn case_no_match(ty: &str) -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::CaseNoMatch,
            message: format!("no case branch matched for type \"{ty}\""),
        }
    }

    pub fn substr_out_of_range() -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::SubstrOutOfRange,
            message: "substr index out of range".to_string(),
        }
    }

    pub fn division_by_zero() -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::DivisionByZero,
            message: "division by zero".to_string(),
        }
    }

    pub fn abort_called() -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::AbortCalled,
            message: "abort".to_string(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RuntimeError {}
