use std::collections::HashMap;

use indexmap::IndexSet;
use ndarray::Array2;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::DiGraph;
use thiserror::Error;

use super::net_parser;
use super::network::{self as nw, VarId};
use super::{ClassVal, Config, NamedList};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Invalid network description.\n{0}")]
    Parse(String),
    #[error("Variable {0} declared multiple times.")]
    MultipleVarDecl(String),
    #[error("Variable {0} has an empty domain.")]
    EmptyDomain(String),
    #[error("Value {value} appears multiple times in the domain of {var}.")]
    RepeatedValue { var: String, value: String },
    #[error("Parent {parent} listed multiple times for {var}.")]
    RepeatedParent { var: String, parent: String },
    #[error("Variable {var} has undeclared parent {parent}.")]
    UnknownParent { var: String, parent: String },
    #[error("The network is not acyclic, cycle through {}.", .0.join(", "))]
    Cycle(Vec<String>),
    #[error("CPT row for undeclared variable {0}.")]
    UnknownVar(String),
    #[error("CPT row of {var} has {got} parent values, expected {expected}.")]
    RowParents {
        var: String,
        expected: usize,
        got: usize,
    },
    #[error("CPT row of {var}: value {value} is not in the domain of parent {parent}.")]
    RowDomain {
        var: String,
        parent: String,
        value: String,
    },
    #[error("CPT row of {var} has {got} probabilities, expected {expected}.")]
    RowSize {
        var: String,
        expected: usize,
        got: usize,
    },
    #[error("CPT row of {var} contains invalid probability {proba}.")]
    InvalidProba { var: String, proba: f64 },
    #[error("CPT row of {var} for ({}) sums to {sum}.", .parents.join(", "))]
    RowSum {
        var: String,
        parents: Vec<String>,
        sum: f64,
    },
    #[error("Multiple CPT rows of {var} for parent values ({}).", .parents.join(", "))]
    MultipleRowDecl { var: String, parents: Vec<String> },
}

type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Clone)]
struct VarDecl {
    domain: IndexSet<String>,
    parents: Vec<String>,
}

#[derive(Debug, Clone)]
struct RowDecl {
    var: String,
    parents: Vec<String>,
    probas: Vec<f64>,
}

/// Incremental construction of a [`nw::Network`].
///
/// Variables and CPT rows may be given in any order; cross references (parents, CPT rows)
/// are resolved by [`NetworkBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    config: Config,
    vars: NamedList<VarDecl>,
    rows: Vec<RowDecl>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
    /// Declare a variable with its ordered domain and ordered parents.
    pub fn variable<D, P>(&mut self, name: &str, domain: D, parents: P) -> Result<&mut Self>
    where
        D: IntoIterator,
        D::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        if self.vars.contains_key(name) {
            return Err(BuildError::MultipleVarDecl(name.to_owned()));
        }
        let mut values = IndexSet::new();
        for value in domain {
            let value = value.into();
            if values.contains(&value) {
                return Err(BuildError::RepeatedValue {
                    var: name.to_owned(),
                    value,
                });
            }
            values.insert(value);
        }
        if values.is_empty() {
            return Err(BuildError::EmptyDomain(name.to_owned()));
        }
        let mut parent_list: Vec<String> = Vec::new();
        for parent in parents {
            let parent = parent.into();
            if parent_list.contains(&parent) {
                return Err(BuildError::RepeatedParent {
                    var: name.to_owned(),
                    parent,
                });
            }
            parent_list.push(parent);
        }
        self.vars.insert(
            name.to_owned(),
            VarDecl {
                domain: values,
                parents: parent_list,
            },
        );
        Ok(self)
    }
    /// Add the CPT row P(`var` | parents = `parent_values`), `parent_values` in declared
    /// parent order and `probas` in domain order.
    pub fn row<P>(&mut self, var: &str, parent_values: P, probas: &[f64]) -> &mut Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.rows.push(RowDecl {
            var: var.to_owned(),
            parents: parent_values.into_iter().map(Into::into).collect(),
            probas: probas.to_vec(),
        });
        self
    }
    pub fn build(self) -> Result<nw::Network> {
        let names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        let mut parents: Vec<Vec<VarId>> = Vec::with_capacity(self.vars.len());
        for (name, decl) in self.vars.iter() {
            parents.push(
                decl.parents
                    .iter()
                    .map(|p| {
                        self.vars
                            .get_index_of(p)
                            .ok_or_else(|| BuildError::UnknownParent {
                                var: name.clone(),
                                parent: p.clone(),
                            })
                    })
                    .collect::<Result<_>>()?,
            );
        }
        let topo = topological_order(&names, &parents)?;
        let mut children = vec![Vec::new(); self.vars.len()];
        for (child, ps) in parents.iter().enumerate() {
            for p in ps {
                children[*p].push(child);
            }
        }
        let mut tables: Vec<(HashMap<Vec<ClassVal>, usize>, Vec<Vec<f64>>)> =
            vec![(HashMap::new(), Vec::new()); self.vars.len()];
        for row in self.rows.iter() {
            let var = self
                .vars
                .get_index_of(&row.var)
                .ok_or_else(|| BuildError::UnknownVar(row.var.clone()))?;
            let key = self.check_row(row, &parents[var])?;
            let (keys, probas) = &mut tables[var];
            if keys.contains_key(&key) {
                return Err(BuildError::MultipleRowDecl {
                    var: row.var.clone(),
                    parents: row.parents.clone(),
                });
            }
            keys.insert(key, probas.len());
            probas.push(row.probas.clone());
        }
        let vars = self
            .vars
            .into_iter()
            .zip(parents)
            .zip(children)
            .zip(tables)
            .map(|((((name, decl), parents), children), (rows, probas))| {
                let nc = decl.domain.len();
                let probas = Array2::from_shape_fn((probas.len(), nc), |(i, j)| probas[i][j]);
                (
                    name,
                    nw::Var {
                        domain: decl.domain,
                        parents,
                        children,
                        cpt: nw::Cpt { rows, probas },
                    },
                )
            })
            .collect();
        Ok(nw::Network { vars, topo })
    }

    /// Check a CPT row against the declared variables and return its key.
    fn check_row(&self, row: &RowDecl, parents: &[VarId]) -> Result<Vec<ClassVal>> {
        if row.parents.len() != parents.len() {
            return Err(BuildError::RowParents {
                var: row.var.clone(),
                expected: parents.len(),
                got: row.parents.len(),
            });
        }
        let key = parents
            .iter()
            .zip(row.parents.iter())
            .map(|(p, value)| {
                let (parent, decl) = self
                    .vars
                    .get_index(*p)
                    .expect("parent ids are resolved from declared variables");
                decl.domain
                    .get_index_of(value)
                    .map(|x| x as ClassVal)
                    .ok_or_else(|| BuildError::RowDomain {
                        var: row.var.clone(),
                        parent: parent.clone(),
                        value: value.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let nc = self.vars[&row.var].domain.len();
        if row.probas.len() != nc {
            return Err(BuildError::RowSize {
                var: row.var.clone(),
                expected: nc,
                got: row.probas.len(),
            });
        }
        let tolerance = self.config.tolerance();
        if let Some(proba) = row
            .probas
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0 + tolerance)
        {
            return Err(BuildError::InvalidProba {
                var: row.var.clone(),
                proba: *proba,
            });
        }
        let sum: f64 = row.probas.iter().sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(BuildError::RowSum {
                var: row.var.clone(),
                parents: row.parents.clone(),
                sum,
            });
        }
        Ok(key)
    }
}

/// Order the variables parents first, failing with the members of a cycle if there is one.
fn topological_order(names: &[&str], parents: &[Vec<VarId>]) -> Result<Vec<VarId>> {
    let mut graph = DiGraph::<VarId, ()>::with_capacity(names.len(), 0);
    let nodes: Vec<_> = (0..names.len()).map(|v| graph.add_node(v)).collect();
    for (child, ps) in parents.iter().enumerate() {
        for p in ps {
            graph.add_edge(nodes[*p], nodes[child], ());
        }
    }
    toposort(&graph, None)
        .map(|order| order.into_iter().map(|n| graph[n]).collect())
        .map_err(|cycle| {
            let node = cycle.node_id();
            let mut members: Vec<VarId> = tarjan_scc(&graph)
                .into_iter()
                .find(|scc| scc.contains(&node))
                .unwrap_or_else(|| vec![node])
                .into_iter()
                .map(|n| graph[n])
                .collect();
            members.sort_unstable();
            BuildError::Cycle(members.into_iter().map(|v| names[v].to_owned()).collect())
        })
}

pub(super) fn build_network(
    stmts: &[net_parser::Statement],
    config: &Config,
) -> Result<nw::Network> {
    let mut builder = NetworkBuilder::with_config(config.clone());
    for s in stmts {
        match s {
            net_parser::Statement::VarDecl(decl) => {
                builder.variable(
                    &decl.name,
                    decl.domain.iter().cloned(),
                    decl.parents.iter().cloned(),
                )?;
            }
            net_parser::Statement::CptRow(row) => {
                builder.row(&row.var, row.parents.iter().cloned(), &row.probas);
            }
            net_parser::Statement::Empty | net_parser::Statement::Invalid => {}
        }
    }
    builder.build()
}
