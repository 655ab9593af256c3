use std::collections::HashMap;
use tlatrace_types::Value;

/// Rewrites record and function entries as they are decoded.
///
/// Called once per entry after its value has been decoded, innermost entries first.
pub trait EntryHook: Send + Sync {
    fn record_entry(&self, key: String, value: Value) -> (String, Value) {
        (key, value)
    }

    fn function_entry(&self, key: Value, value: Value) -> (Value, Value) {
        (key, value)
    }
}

/// Rewrites a state variable after its value has been decoded.
pub trait VariableHook: Send + Sync {
    fn rewrite(&self, name: String, value: Value) -> (String, Value);
}

impl<F> VariableHook for F
where
    F: Fn(String, Value) -> (String, Value) + Send + Sync,
{
    fn rewrite(&self, name: String, value: Value) -> (String, Value) {
        self(name, value)
    }
}

/// Renames state variables, leaving values untouched
#[derive(Debug, Clone, Default)]
pub struct RenameVariables {
    renames: HashMap<String, String>,
}

impl RenameVariables {
    pub fn new(renames: HashMap<String, String>) -> Self {
        Self { renames }
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl VariableHook for RenameVariables {
    fn rewrite(&self, name: String, value: Value) -> (String, Value) {
        match self.renames.get(&name) {
            Some(renamed) => (renamed.clone(), value),
            None => (name, value),
        }
    }
}
