//! Exact inference in discrete Bayesian networks.
//!
//! A [`Network`] is built once, either from a textual description ([`build_network`]) or
//! programmatically with a [`NetworkBuilder`], and is then immutable. Posterior
//! distributions are computed with [`ask`], which sums the factored joint distribution
//! over every assignment of the hidden variables (inference by enumeration).
//!
//! ```text
//! VAR Rain = {true, false}
//! VAR Sprinkler = {true, false} | Rain
//! CPT Rain = [0.2, 0.8]
//! CPT Sprinkler [true] = [0.01, 0.99]
//! CPT Sprinkler [false] = [0.4, 0.6]
//! ```
mod enumeration;
mod evidence;
mod net_build;
mod net_parser;
mod network;
mod posterior;

/// Index of a value in the domain of a variable.
pub type ClassVal = u32;
type NamedList<T> = indexmap::IndexMap<String, T>;

pub use enumeration::{ask, ask_batch, Query, QueryError};
pub use evidence::Evidence;
pub use net_build::{BuildError, NetworkBuilder};
pub use network::{Network, NetworkError, VarId};
pub use posterior::Posterior;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BayesNetError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BayesNetError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Default tolerance on the sum of a CPT row.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Maximum deviation from 1 accepted for the sum of a CPT row.
    tolerance: f64,
}

impl Config {
    pub fn with_default_tolerance() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_default_tolerance()
    }
}

/// Parse a network description and build the corresponding network.
pub fn build_network(description: &str) -> std::result::Result<Network, BuildError> {
    build_network_with_config(description, &Config::default())
}

pub fn build_network_with_config(
    description: &str,
    config: &Config,
) -> std::result::Result<Network, BuildError> {
    let stmts = net_parser::parse(description)
        .map_err(|e| BuildError::Parse(String::from_utf8_lossy(e.as_slice()).into_owned()))?;
    net_build::build_network(stmts.as_slice(), config)
}
