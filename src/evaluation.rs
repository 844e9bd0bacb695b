//! Objective evaluator and feasibility predicate (C2).
//!
//! Both read the cached aggregates [`crate::model::solution::Solution`]'s
//! mutators maintain — no route is ever re-walked to compute cost, so a run
//! with a badly maintained cache silently mis-scores rather than crashing
//! (that's why the invariants in C1's tests matter more than these do).

use serde::{Deserialize, Serialize};

use crate::model::Solution;

/// Weights for the three cost components of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalWeights {
    pub fixed: f64,
    pub operational: f64,
    pub penalty: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            fixed: 1.0,
            operational: 1.0,
            penalty: 1.0,
        }
    }
}

/// Sum of fixed costs for every operational depot and vehicle.
pub fn fixed_cost(s: &Solution) -> f64 {
    let depot_fixed: f64 = s
        .depots()
        .iter()
        .filter(|d| d.is_operational())
        .map(|d| d.fixed_cost())
        .sum();
    let vehicle_fixed: f64 = s
        .vehicles()
        .iter()
        .filter(|v| v.is_operational())
        .map(|v| v.fixed_cost())
        .sum();
    depot_fixed + vehicle_fixed
}

/// Sum of distance, time, and depot-operating costs.
pub fn operational_cost(s: &Solution) -> f64 {
    let distance_cost: f64 = s
        .routes()
        .iter()
        .map(|r| r.length() * s.vehicles()[r.vehicle_id()].cost_per_distance())
        .sum();
    let time_cost: f64 = s
        .vehicles()
        .iter()
        .map(|v| v.working_duration() * v.cost_per_time())
        .sum();
    let depot_cost: f64 = s
        .depots()
        .iter()
        .map(|d| d.load() as f64 * d.cost_operational())
        .sum();
    distance_cost + time_cost + depot_cost
}

/// Sum of every constraint-violation magnitude listed in §4.2.
pub fn penalty_total(s: &Solution) -> f64 {
    let num_customers = s.customers().len() as f64;

    let mut total = 0.0;

    for d in s.depots() {
        total += (d.share_min() * num_customers - d.count() as f64).max(0.0);
        total += (d.count() as f64 - d.share_max() * num_customers).max(0.0);
        if d.is_mandatory() && d.count() == 0 {
            total += d.fixed_cost();
        }
        total += (d.load() - d.capacity()).max(0) as f64;
    }

    for r in s.routes() {
        let v = &s.vehicles()[r.vehicle_id()];
        total += (r.load() - v.capacity()).max(0) as f64;
        total += (r.length() - v.range()).max(0.0);
    }

    for v in s.vehicles() {
        let d = &s.depots()[v.depot_id()];
        total += (d.time_window().ready() - v.t_start()).max(0.0);
        total += (v.t_end() - d.time_window().due()).max(0.0);
        total += (v.working_duration() - v.max_working_duration()).max(0.0);
    }

    for c in s.customers() {
        if c.is_open() {
            total += c.demand() as f64;
        } else if let Some(tw) = c.time_window() {
            total += (c.arrival() - tw.due()).max(0.0);
        }
    }

    total
}

/// `f(s; weights)`: the scalar objective the ALNS driver accepts/rejects on.
pub fn evaluate(s: &Solution, weights: &EvalWeights) -> f64 {
    let pf = fixed_cost(s);
    let po = operational_cost(s);
    let pp = penalty_total(s);
    let scale = 10f64.powf((pf + po).max(1.0).log10().ceil());
    weights.fixed * pf + weights.operational * po + weights.penalty * pp * scale
}

/// `true` iff every violation term in [`penalty_total`] is zero.
pub fn is_feasible(s: &Solution) -> bool {
    penalty_total(s) <= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::model::customer::{CustomerNode, TimeWindow};
    use crate::model::depot::DepotNode;
    use crate::model::vehicle::VehicleNode;

    fn minimal_solution() -> Solution {
        let tw = TimeWindow::new(0.0, 1000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 100, 0.0, 10.0, false, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, 50, 1000.0, 1.0, 0.0, 0.0, 0.0, 1000.0, 5, 1.0, 0.0, 0.0);
        let mut s = Solution::empty_of_size(1, 1);
        s.push_depot(depot);
        s.push_vehicle(vehicle);
        s.push_customer(CustomerNode::new(0, 3.0, 4.0, 5, 0.0));
        s
    }

    #[test]
    fn empty_solution_has_zero_penalty_for_no_customers() {
        let mut s = Solution::empty_of_size(1, 0);
        let tw = TimeWindow::new(0.0, 1000.0).expect("valid");
        s.push_depot(DepotNode::new(0, 0.0, 0.0, 100, 0.0, 10.0, false, 0.0, 1.0, tw));
        assert_eq!(penalty_total(&s), 0.0);
        assert!(is_feasible(&s));
    }

    #[test]
    fn open_customer_incurs_demand_penalty() {
        let s = minimal_solution();
        assert!((penalty_total(&s) - 5.0).abs() < 1e-9);
        assert!(!is_feasible(&s));
    }

    #[test]
    fn evaluate_is_nonnegative() {
        let s = minimal_solution();
        assert!(evaluate(&s, &EvalWeights::default()) >= 0.0);
    }
}
