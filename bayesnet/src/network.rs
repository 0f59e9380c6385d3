use std::collections::HashMap;

use indexmap::IndexSet;
use itertools::Itertools;
use ndarray::{Array2, ArrayView1};
use thiserror::Error;

use super::{ClassVal, Evidence, NamedList};

pub type VarId = usize;

#[derive(Debug, Clone)]
pub(crate) struct Var {
    pub(crate) domain: IndexSet<String>,
    pub(crate) parents: Vec<VarId>,
    pub(crate) children: Vec<VarId>,
    pub(crate) cpt: Cpt,
}

/// Conditional probability table.
///
/// `rows` maps the values of the parents (in declared parent order) to a row of `probas`,
/// and each row of `probas` is a distribution over the domain of the variable.
/// Root variables have a single row keyed by the empty tuple.
#[derive(Debug, Clone)]
pub(crate) struct Cpt {
    pub(crate) rows: HashMap<Vec<ClassVal>, usize>,
    pub(crate) probas: Array2<f64>,
}

impl Cpt {
    pub(crate) fn row(&self, parent_vals: &[ClassVal]) -> Option<ArrayView1<'_, f64>> {
        self.rows.get(parent_vals).map(|r| self.probas.row(*r))
    }
}

/// A discrete Bayesian network.
///
/// Immutable once built: all queries take `&self`, and the topological order used by the
/// enumeration is computed once at construction.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) vars: NamedList<Var>,
    pub(crate) topo: Vec<VarId>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NetworkError {
    #[error("No variable named {0}.")]
    NoVar(String),
    #[error("Value {value} is not in the domain of {var}.")]
    Domain { var: String, value: String },
    #[error("No CPT row of {var} for parent values ({}).", .parents.join(", "))]
    Lookup { var: String, parents: Vec<String> },
    #[error("{var} has {expected} parents, got {got} parent values.")]
    ParentArity {
        var: String,
        expected: usize,
        got: usize,
    },
}

type Result<T> = std::result::Result<T, NetworkError>;

impl Network {
    pub fn len(&self) -> usize {
        self.vars.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
    pub fn get_varid(&self, var: &str) -> Result<VarId> {
        self.vars
            .get_index_of(var)
            .ok_or_else(|| NetworkError::NoVar(var.to_owned()))
    }
    /// Variable names, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }
    /// Parent names of `var`, in the order used to key its CPT.
    pub fn parents(&self, var: &str) -> Result<Vec<&str>> {
        let var = self.get_varid(var)?;
        Ok(self.names(&self.vars[var].parents))
    }
    pub fn children(&self, var: &str) -> Result<Vec<&str>> {
        let var = self.get_varid(var)?;
        Ok(self.names(&self.vars[var].children))
    }
    pub fn domain(&self, var: &str) -> Result<&IndexSet<String>> {
        Ok(&self.vars[self.get_varid(var)?].domain)
    }
    /// All (parent, child) edges.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().flat_map(move |(child, v)| {
            v.parents
                .iter()
                .map(move |p| (self.name(*p), child.as_str()))
        })
    }
    /// Variables ordered such that every variable comes after its parents.
    pub fn topological_order(&self) -> Vec<&str> {
        self.names(&self.topo)
    }
    /// P(var = value | parents = parent_values), `parent_values` being given in the order
    /// of [`Network::parents`].
    pub fn probability(&self, var: &str, value: &str, parent_values: &[&str]) -> Result<f64> {
        let var_id = self.get_varid(var)?;
        let value = self.value_id(var_id, value)?;
        let parents = &self.vars[var_id].parents;
        if parents.len() != parent_values.len() {
            return Err(NetworkError::ParentArity {
                var: var.to_owned(),
                expected: parents.len(),
                got: parent_values.len(),
            });
        }
        let parent_vals = parents
            .iter()
            .zip(parent_values)
            .map(|(p, v)| self.value_id(*p, v))
            .collect::<Result<Vec<_>>>()?;
        self.proba(var_id, value, &parent_vals)
    }
    /// Number of CPT rows of `var`.
    pub fn cpt_len(&self, var: &str) -> Result<usize> {
        Ok(self.vars[self.get_varid(var)?].cpt.rows.len())
    }
    /// Parent value combinations for which the CPT of `var` has no row.
    pub fn missing_rows(&self, var: &str) -> Result<Vec<Vec<&str>>> {
        let v = &self.vars[self.get_varid(var)?];
        if v.parents.is_empty() {
            return Ok(if v.cpt.rows.is_empty() {
                vec![Vec::new()]
            } else {
                Vec::new()
            });
        }
        Ok(v.parents
            .iter()
            .map(|p| 0..self.card(*p) as ClassVal)
            .multi_cartesian_product()
            .filter(|vals| !v.cpt.rows.contains_key(vals))
            .map(|vals| self.labels(&v.parents, &vals))
            .collect())
    }
    /// Variables that are neither the query nor observed.
    pub fn hidden_variables(&self, query: &str, evidence: &Evidence) -> Result<Vec<&str>> {
        Ok(self.names(&self.hidden_ids(query, evidence)?))
    }
    /// Number of joint assignments of the hidden variables, that is, the number of worlds
    /// enumerated for each value of the query (saturates at `u128::MAX`).
    pub fn world_count(&self, query: &str, evidence: &Evidence) -> Result<u128> {
        Ok(self
            .hidden_ids(query, evidence)?
            .into_iter()
            .fold(1u128, |acc, v| acc.saturating_mul(self.card(v) as u128)))
    }

    fn hidden_ids(&self, query: &str, evidence: &Evidence) -> Result<Vec<VarId>> {
        let mut hidden = vec![true; self.len()];
        hidden[self.get_varid(query)?] = false;
        for (var, _) in evidence.iter() {
            hidden[self.get_varid(var)?] = false;
        }
        Ok(self.topo.iter().copied().filter(|v| hidden[*v]).collect())
    }
    fn names(&self, vars: &[VarId]) -> Vec<&str> {
        vars.iter().map(|v| self.name(*v)).collect()
    }
    fn labels(&self, vars: &[VarId], vals: &[ClassVal]) -> Vec<&str> {
        vars.iter()
            .zip(vals)
            .map(|(var, val)| self.label(*var, *val))
            .collect()
    }

    pub(crate) fn name(&self, var: VarId) -> &str {
        self.vars.get_index(var).map_or("", |(n, _)| n.as_str())
    }
    pub(crate) fn label(&self, var: VarId, value: ClassVal) -> &str {
        self.vars[var]
            .domain
            .get_index(value as usize)
            .map_or("", String::as_str)
    }
    pub(crate) fn card(&self, var: VarId) -> usize {
        self.vars[var].domain.len()
    }
    pub(crate) fn parent_ids(&self, var: VarId) -> &[VarId] {
        &self.vars[var].parents
    }
    pub(crate) fn topo_ids(&self) -> &[VarId] {
        &self.topo
    }
    pub(crate) fn value_id(&self, var: VarId, value: &str) -> Result<ClassVal> {
        self.vars[var]
            .domain
            .get_index_of(value)
            .map(|x| x as ClassVal)
            .ok_or_else(|| NetworkError::Domain {
                var: self.name(var).to_owned(),
                value: value.to_owned(),
            })
    }
    /// CPT entry lookup by identifiers.
    pub(crate) fn proba(
        &self,
        var: VarId,
        value: ClassVal,
        parent_vals: &[ClassVal],
    ) -> Result<f64> {
        let v = &self.vars[var];
        let row = v.cpt.row(parent_vals).ok_or_else(|| NetworkError::Lookup {
            var: self.name(var).to_owned(),
            parents: self
                .labels(&v.parents, parent_vals)
                .into_iter()
                .map(str::to_owned)
                .collect(),
        })?;
        row.get(value as usize)
            .copied()
            .ok_or_else(|| NetworkError::Domain {
                var: self.name(var).to_owned(),
                value: value.to_string(),
            })
    }
}
