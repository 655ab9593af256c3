use crate::value::{Value, insert_entry};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key under which the action name appears in JSON exports.
pub const ACTION_KEY: &str = "_action";

/// One snapshot of all tracked variables in a trace.
///
/// Variables keep their source order until [`State::canonicalize`] sorts them.
#[derive(Debug, Clone, Default)]
pub struct State {
    vars: Vec<(String, Value)>,
    action: Option<String>,
    pub(crate) canonical: bool,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a variable; a repeated name overwrites the earlier value
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        insert_entry(&mut self.vars, name.into(), value);
        self.canonical = false;
    }

    pub fn with_var(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.vars.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Name of the action that produced this state, when action tracking was on
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn set_action(&mut self, action: Option<String>) {
        self.action = action;
    }

    pub fn take_action(&mut self) -> Option<String> {
        self.action.take()
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    pub(crate) fn vars_mut(&mut self) -> &mut Vec<(String, Value)> {
        &mut self.vars
    }

    pub(crate) fn raw_vars(&self) -> &[(String, Value)] {
        &self.vars
    }
}

/// Equality ignores whether the state has been canonicalized yet.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.vars == other.vars && self.action == other.action
    }
}

impl Eq for State {}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.vars.len() + usize::from(self.action.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (k, v) in &self.vars {
            map.serialize_entry(k, v)?;
        }
        if let Some(action) = &self.action {
            map.serialize_entry(ACTION_KEY, action)?;
        }
        map.end()
    }
}
