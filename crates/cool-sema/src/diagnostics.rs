//! Diagnostic collection.
//!
//! Every pass takes a `&mut Diagnostics` and pushes onto it rather than
//! returning `Result` and bailing on the first problem -- a single
//! COOL program can have many independent type errors, and a compiler
//! that stops at the first one is much less useful than one that
//! reports all of them in a single run.

use crate::error::SemaError;

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<SemaError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, error: SemaError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemaError> {
        self.errors.iter()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.errors.into_iter().map(|e| e.to_string()).collect()
    }
}
