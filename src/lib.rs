//! `lrp-alns`: a Location Routing Problem solver built around Adaptive Large
//! Neighborhood Search.
//!
//! The solution lives in an arena ([`model::Solution`]) addressed by plain
//! `usize` indices rather than owned pointers, so destroy/repair operators
//! can freely splice customers between routes without fighting the borrow
//! checker. [`distance::DistanceMatrix`] gives every depot and customer a
//! place in one unified node-index space for arc lookups.

pub mod alns;
pub mod config;
pub mod construct;
pub mod destroy;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod instance;
pub mod local_search;
pub mod model;
pub mod relatedness;
pub mod repair;

pub use alns::{run, AlnsResult};
pub use config::AlnsParams;
pub use construct::initial_solution;
pub use distance::{DistanceMatrix, NodeRef};
pub use error::{ConfigError, InstanceError, RoutingError};
pub use evaluation::{evaluate, is_feasible, EvalWeights};
pub use instance::Graph;
pub use model::{CustomerNode, DepotNode, Route, Solution, VehicleNode};
