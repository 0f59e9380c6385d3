use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::{Array1, ArrayView1};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Posterior distribution of a query variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    var: String,
    /// Domain of the variable, in domain order.
    labels: Vec<String>,
    /// Same length as `labels`, sums to 1.
    value: Array1<f64>,
}

impl Posterior {
    pub(crate) fn new(var: String, labels: Vec<String>, value: Array1<f64>) -> Self {
        debug_assert_eq!(labels.len(), value.len());
        Self { var, labels, value }
    }
    pub fn var(&self) -> &str {
        &self.var
    }
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
    pub fn value(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }
    /// Probability of the value `label`, `None` if it is not in the domain.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.value[i])
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels().zip(self.value.iter().copied())
    }
    /// The most probable value, the first one in domain order on ties.
    pub fn most_likely(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, p) in self.iter() {
            if best.map_or(true, |(_, best_p)| p > best_p) {
                best = Some((label, p));
            }
        }
        best
    }
    pub fn into_map(self) -> IndexMap<String, f64> {
        self.labels.into_iter().zip(self.value.iter().copied()).collect()
    }
}

/// Probability of a value by label.
///
/// # Panics
///
/// Panics if `label` is not in the domain of the variable, use [`Posterior::get`] for a
/// checked lookup.
impl std::ops::Index<&str> for Posterior {
    type Output = f64;

    fn index(&self, label: &str) -> &f64 {
        let i = self
            .labels
            .iter()
            .position(|l| l == label)
            .unwrap_or_else(|| panic!("{} is not in the domain of {}", label, self.var));
        &self.value[i]
    }
}

impl Serialize for Posterior {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for (label, p) in self.iter() {
            map.serialize_entry(label, &p)?;
        }
        map.end()
    }
}

/// One value per line, sorted by label, with 4 decimals.
impl fmt::Display for Posterior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (label, p) in self.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            writeln!(f, "    {}: {:.4}", label, p)?;
        }
        write!(f, "}}")
    }
}
