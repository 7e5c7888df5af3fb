//! Lexical scoping for runtime values, mirroring `cool_sema::Scope`'s
//! frame-stack shape but holding `Value` instead of a static `Type`.

use rustc_hash::FxHashMap;

use crate::value::Value;

#[derive(Debug, Clone)]
pub struct EvalScope {
    frames: Vec<FxHashMap<String, Value>>,
}

impl EvalScope {
    pub fn new() -> Self {
        EvalScope {
            frames: vec![FxHashMap::default()],
        }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .insert(name.into(), value);
    }

    pub fn find(&self, name: &str) -> Option<Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).cloned())
    }

    /// Update an already-bound local in place. Returns `false` if `name`
    /// isn't a local at all, in which case the caller falls back to
    /// treating it as an attribute assignment on `self`.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    pub fn create_child(&self) -> EvalScope {
        let mut frames = self.frames.clone();
        frames.push(FxHashMap::default());
        EvalScope { frames }
    }
}

impl Default for EvalScope {
    fn default() -> Self {
        EvalScope::new()
    }
}
