use std::fmt;

use itertools::Itertools;

use super::NamedList;

/// Observed values, as a mapping from variable name to value label.
///
/// Insertion order is kept, so that error messages and traces list the evidence the way
/// it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence(NamedList<String>);

impl Evidence {
    pub fn new() -> Self {
        Self(NamedList::new())
    }
    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(var, value);
        self
    }
    /// Set the observed value of `var`, returning the previous one.
    pub fn insert(&mut self, var: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(var.into(), value.into())
    }
    pub fn remove(&mut self, var: &str) -> Option<String> {
        self.0.shift_remove(var)
    }
    pub fn get(&self, var: &str) -> Option<&str> {
        self.0.get(var).map(String::as_str)
    }
    pub fn contains(&self, var: &str) -> bool {
        self.0.contains_key(var)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Evidence {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.iter().map(|(k, v)| format!("{}={}", k, v)).join(", ")
        )
    }
}
