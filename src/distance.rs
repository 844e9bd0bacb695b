//! Dense distance matrix over the union of depot and customer nodes.
//!
//! Node indices are unified into a single space: depot ids occupy
//! `0..num_depots`, customer ids occupy `num_depots..num_depots+num_customers`.
//! [`NodeRef`] hides that offset behind a small enum so callers never
//! compute it by hand.

use serde::{Deserialize, Serialize};

/// A reference to either a depot or a customer node, for arc lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Depot(usize),
    Customer(usize),
}

/// A dense n×n matrix of arc lengths, read-only after instance load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
    num_depots: usize,
}

impl DistanceMatrix {
    /// Creates a zero-initialized matrix over `num_depots + num_customers` nodes.
    pub fn new(num_depots: usize, num_customers: usize) -> Self {
        let size = num_depots + num_customers;
        Self {
            data: vec![0.0; size * size],
            size,
            num_depots,
        }
    }

    /// Builds the matrix from explicit data in the unified node-index space.
    /// Returns `None` if `data.len() != size * size`.
    pub fn from_data(num_depots: usize, num_customers: usize, data: Vec<f64>) -> Option<Self> {
        let size = num_depots + num_customers;
        if data.len() != size * size {
            return None;
        }
        Some(Self {
            data,
            size,
            num_depots,
        })
    }

    fn index(&self, node: NodeRef) -> usize {
        match node {
            NodeRef::Depot(id) => id,
            NodeRef::Customer(id) => self.num_depots + id,
        }
    }

    /// Arc length from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either node's index is out of bounds.
    pub fn get(&self, from: NodeRef, to: NodeRef) -> f64 {
        let i = self.index(from);
        let j = self.index(to);
        self.data[i * self.size + j]
    }

    pub fn set(&mut self, from: NodeRef, to: NodeRef, length: f64) {
        let i = self.index(from);
        let j = self.index(to);
        self.data[i * self.size + j] = length;
    }

    /// Total number of nodes (depots + customers) in the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_depots(&self) -> usize {
        self.num_depots
    }

    /// `true` if the matrix is symmetric within `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.data[i * self.size + j] - self.data[j * self.size + i]).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_index_offsets_customers_past_depots() {
        let mut dm = DistanceMatrix::new(2, 3);
        dm.set(NodeRef::Depot(0), NodeRef::Customer(0), 7.0);
        assert_eq!(dm.get(NodeRef::Depot(0), NodeRef::Customer(0)), 7.0);
        assert_eq!(dm.get(NodeRef::Customer(0), NodeRef::Depot(0)), 0.0);
        assert_eq!(dm.size(), 5);
    }

    #[test]
    fn from_data_rejects_wrong_length() {
        assert!(DistanceMatrix::from_data(1, 1, vec![0.0, 1.0]).is_none());
        assert!(DistanceMatrix::from_data(1, 1, vec![0.0, 1.0, 1.0, 0.0]).is_some());
    }

    #[test]
    fn symmetry_check() {
        let mut dm = DistanceMatrix::new(1, 1);
        dm.set(NodeRef::Depot(0), NodeRef::Customer(0), 3.0);
        dm.set(NodeRef::Customer(0), NodeRef::Depot(0), 3.0);
        assert!(dm.is_symmetric(1e-9));
        dm.set(NodeRef::Customer(0), NodeRef::Depot(0), 4.0);
        assert!(!dm.is_symmetric(1e-9));
    }
}
