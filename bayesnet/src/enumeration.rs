//! Inference by enumeration.
//!
//! P(X | e) is obtained by computing, for every value x of X, the probability of the
//! extended assignment e ∪ {X = x}, summing the product of CPT entries over all the joint
//! assignments of the hidden variables, and normalizing. The cost is exponential in the
//! number of hidden variables.

use ndarray::Array1;
use rayon::prelude::*;
use thiserror::Error;

use super::network::{Network, NetworkError, VarId};
use super::{ClassVal, Evidence, Posterior};

/// Partial assignment, one slot per variable of the network.
type Assignment = Vec<Option<ClassVal>>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("No query variable named {0}.")]
    UnknownQuery(String),
    #[error("Evidence given for unknown variable {0}.")]
    UnknownEvidence(String),
    #[error("Query variable {0} is also given as evidence.")]
    QueryInEvidence(String),
    #[error("Evidence value {value} is not in the domain of {var}.")]
    EvidenceDomain { var: String, value: String },
    #[error("Evidence ({evidence}) has probability zero, P({query} | {evidence}) is undefined.")]
    Degenerate { query: String, evidence: String },
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// A query variable and the evidence it is conditioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub var: String,
    pub evidence: Evidence,
}

impl Query {
    pub fn new(var: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            var: var.into(),
            evidence,
        }
    }
}

/// Compute P(`query` | `evidence`) in `network`.
pub fn ask(query: &str, evidence: &Evidence, network: &Network) -> Result<Posterior, QueryError> {
    let query_id = network
        .get_varid(query)
        .map_err(|_| QueryError::UnknownQuery(query.to_owned()))?;
    let mut assignment = initial_assignment(query, evidence, network)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        query,
        evidence = %evidence,
        order = ?network.topological_order(),
        "enumeration ask"
    );
    let weights = (0..network.card(query_id) as ClassVal)
        .map(|x| -> Result<f64, NetworkError> {
            assignment[query_id] = Some(x);
            let w = enumerate_all(network, network.topo_ids(), &mut assignment)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                query,
                value = network.label(query_id, x),
                weight = w,
                "unnormalized weight"
            );
            Ok(w)
        })
        .collect::<Result<Array1<f64>, NetworkError>>()?;
    let total = weights.sum();
    if !(total > 0.0) {
        return Err(QueryError::Degenerate {
            query: query.to_owned(),
            evidence: evidence.to_string(),
        });
    }
    let labels = network.vars[query_id].domain.iter().cloned().collect();
    Ok(Posterior::new(query.to_owned(), labels, weights / total))
}

/// Run independent queries in parallel, results are in the order of `queries`.
pub fn ask_batch(queries: &[Query], network: &Network) -> Vec<Result<Posterior, QueryError>> {
    queries
        .par_iter()
        .map(|q| ask(&q.var, &q.evidence, network))
        .collect()
}

/// Validate the evidence and turn it into an assignment.
fn initial_assignment(
    query: &str,
    evidence: &Evidence,
    network: &Network,
) -> Result<Assignment, QueryError> {
    if evidence.contains(query) {
        return Err(QueryError::QueryInEvidence(query.to_owned()));
    }
    let mut assignment = vec![None; network.len()];
    for (var, value) in evidence.iter() {
        let var_id = network
            .get_varid(var)
            .map_err(|_| QueryError::UnknownEvidence(var.to_owned()))?;
        let value = network
            .value_id(var_id, value)
            .map_err(|_| QueryError::EvidenceDomain {
                var: var.to_owned(),
                value: value.to_owned(),
            })?;
        assignment[var_id] = Some(value);
    }
    Ok(assignment)
}

fn parent_values(network: &Network, var: VarId, assignment: &Assignment) -> Vec<ClassVal> {
    network
        .parent_ids(var)
        .iter()
        .map(|p| assignment[*p].expect("parents are assigned before their children"))
        .collect()
}

/// Probability of the assignment restricted to `vars`, summed over the values of the
/// unassigned ones. `vars` is a suffix of the topological order.
fn enumerate_all(
    network: &Network,
    vars: &[VarId],
    assignment: &mut Assignment,
) -> Result<f64, NetworkError> {
    let Some((&y, rest)) = vars.split_first() else {
        return Ok(1.0);
    };
    let parent_vals = parent_values(network, y, assignment);
    if let Some(value) = assignment[y] {
        let p = network.proba(y, value, &parent_vals)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            var = network.name(y),
            value = network.label(y, value),
            p,
            "assigned"
        );
        return Ok(p * enumerate_all(network, rest, assignment)?);
    }
    let total = (0..network.card(y) as ClassVal).try_fold(
        0.0,
        |total, value| -> Result<f64, NetworkError> {
            let p = network.proba(y, value, &parent_vals)?;
            assignment[y] = Some(value);
            let term = p * enumerate_all(network, rest, assignment)?;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                var = network.name(y),
                value = network.label(y, value),
                p,
                term,
                "hidden"
            );
            Ok(total + term)
        },
    );
    assignment[y] = None;
    total
}
