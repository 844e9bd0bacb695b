//! The solution data model: arena-stored depots, customers, vehicles, and
//! routes, plus the mutators ([`Solution::insert_node`],
//! [`Solution::remove_node`]) that keep every cached aggregate consistent.
//!
//! # Examples
//!
//! ```
//! use lrp_alns::model::{CustomerNode, Solution};
//!
//! let mut sol = Solution::empty_of_size(1, 0);
//! assert_eq!(sol.customers().len(), 0);
//! ```

pub mod customer;
pub mod depot;
pub mod route;
pub mod solution;
pub mod vehicle;

pub use customer::{CustomerNode, TimeWindow};
pub use depot::DepotNode;
pub use route::Route;
pub use solution::Solution;
pub use vehicle::VehicleNode;
