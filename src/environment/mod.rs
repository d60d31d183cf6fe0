//! Environment Store
//!
//! An insertion-ordered mapping from variable names to values that shadows
//! the ambient process environment:
//! - `get` falls back to `std::env::var` when a name is absent here
//! - `export` writes through to the process environment so children inherit
//! - `unset` removes from both stores
//! - enumeration preserves insertion order so `set`/`env` output is stable
//!
//! The store is bounded (100 entries by default, configurable) and guarded by
//! a single mutex; built-ins running on worker threads share it through
//! `Arc<Environment>`.

use std::sync::Mutex;

use indexmap::IndexMap;

/// Default bound on the number of shell variables.
pub const DEFAULT_CAPACITY: usize = 100;

pub struct Environment {
    vars: Mutex<IndexMap<String, String>>,
    capacity: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vars: Mutex::new(IndexMap::new()),
            capacity,
        }
    }

    /// Look up a variable, falling back to the process environment.
    pub fn get(&self, name: &str) -> Option<String> {
        let vars = self.vars.lock().unwrap();
        if let Some(value) = vars.get(name) {
            return Some(value.clone());
        }
        drop(vars);
        std::env::var(name).ok()
    }

    /// Create or update a shell-local variable. Returns false when the store
    /// is full and the name is not already present.
    pub fn set(&self, name: &str, value: &str) -> bool {
        let mut vars = self.vars.lock().unwrap();
        if !vars.contains_key(name) && vars.len() >= self.capacity {
            return false;
        }
        vars.insert(name.to_string(), value.to_string());
        true
    }

    /// Set a variable and propagate it to the process environment so child
    /// processes inherit it.
    pub fn export(&self, name: &str, value: &str) -> bool {
        if !self.set(name, value) {
            return false;
        }
        std::env::set_var(name, value);
        true
    }

    /// Remove a variable from both the shell store and the process
    /// environment.
    pub fn unset(&self, name: &str) {
        let mut vars = self.vars.lock().unwrap();
        // shift_remove keeps the remaining entries in insertion order
        vars.shift_remove(name);
        drop(vars);
        std::env::remove_var(name);
    }

    /// Snapshot all shell-local variables in insertion order.
    pub fn enumerate(&self) -> Vec<(String, String)> {
        let vars = self.vars.lock().unwrap();
        vars.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Shell-local variable names in insertion order.
    pub fn names(&self) -> Vec<String> {
        let vars = self.vars.lock().unwrap();
        vars.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.vars.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
