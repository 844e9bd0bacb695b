//! Error taxonomy for the routing solver.
//!
//! Mirrors the failure surface of the search: configuration problems caught
//! before a run starts, instance-parsing problems caught while loading a
//! [`Graph`](crate::instance::Graph), internal invariant violations raised by
//! the mutators in [`model::solution`](crate::model::solution), and the case
//! where a constructive heuristic cannot place every customer.

use thiserror::Error;

/// A parameter or operator catalog is out of its documented domain.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    /// An operator identifier did not resolve in the registry.
    #[error("unknown operator identifier: {0}")]
    UnknownOperator(String),

    /// A catalog (destroy, repair, or local-search) was empty.
    #[error("operator catalog `{0}` must not be empty")]
    EmptyCatalog(&'static str),

    /// A scalar parameter fell outside its required domain.
    #[error("parameter `{name}` = {value} is out of domain ({constraint})")]
    OutOfDomain {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },
}

/// A problem instance could not be parsed into a [`Graph`](crate::instance::Graph).
#[derive(Debug, Error, PartialEq, Clone)]
pub enum InstanceError {
    #[error("missing required column `{column}` in {file}")]
    MissingColumn { file: String, column: &'static str },

    #[error("malformed row {row} in {file}: {reason}")]
    MalformedRow {
        file: String,
        row: usize,
        reason: String,
    },

    #[error("arc matrix is inconsistent: expected {expected} entries, found {found}")]
    InconsistentArcs { expected: usize, found: usize },

    #[error("instance directory `{0}` has no readable node files")]
    EmptyInstance(String),
}

/// Top-level error type returned by the public API.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("instance error: {0}")]
    Instance(#[from] InstanceError),

    /// A defensive internal check failed — this indicates a bug in the
    /// solution mutators (C1), not bad input. The driver aborts the run and
    /// returns the best solution seen so far alongside this error.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// A constructive heuristic could not place every customer (e.g.
    /// capacities are too tight for the given fleet).
    #[error("initial solution is infeasible: {0}")]
    InfeasibleInitial(String),
}
