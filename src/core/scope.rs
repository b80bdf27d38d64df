//! Shared variable scope.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type Value = Arc<dyn Any + Send + Sync>;

/// Name-to-value mapping shared by reference across a subtree of states.
///
/// Cloning a scope clones the handle, not the contents: every clone sees
/// every insertion. The container is insert-only.
///
/// # Example
///
/// ```rust
/// use emsm::core::VariableScope;
///
/// let scope = VariableScope::new();
/// let shared = scope.clone();
///
/// assert!(scope.insert("interval_ms", 500_u64));
/// assert!(!scope.insert("interval_ms", 250_u64));
/// assert_eq!(shared.get::<u64>("interval_ms"), Some(Ok(500)));
/// ```
#[derive(Clone, Default)]
pub struct VariableScope {
    vars: Arc<RwLock<HashMap<String, Value>>>,
}

/// A variable is present but of another type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch;

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable. Returns `false` without touching the scope if
    /// the name is already taken.
    pub fn insert<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) -> bool {
        let mut vars = self.vars.write().unwrap_or_else(PoisonError::into_inner);
        let name = name.into();
        if vars.contains_key(&name) {
            return false;
        }
        vars.insert(name, Arc::new(value));
        true
    }

    /// Look up a variable by name and clone it out as `T`.
    ///
    /// `None` if absent, `Some(Err(TypeMismatch))` if stored as another type.
    pub fn get<T: Any + Clone>(&self, name: &str) -> Option<Result<T, TypeMismatch>> {
        let vars = self.vars.read().unwrap_or_else(PoisonError::into_inner);
        let value = vars.get(name)?;
        Some(value.downcast_ref::<T>().cloned().ok_or(TypeMismatch))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted variable names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Whether both handles refer to the same underlying scope.
    pub fn ptr_eq(&self, other: &VariableScope) -> bool {
        Arc::ptr_eq(&self.vars, &other.vars)
    }
}

impl fmt::Debug for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableScope")
            .field("names", &self.names())
            .finish()
    }
}
