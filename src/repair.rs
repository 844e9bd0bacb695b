//! Repair operators (C6): re-insert every open customer through a
//! try-and-undo evaluation of each candidate position.
//!
//! Every operator is a thin policy wrapped around [`trial_cost`], which
//! inserts a customer through [`Solution::insert_node`], reads the
//! objective, then removes it back through [`Solution::remove_node`] — this
//! is only correct because C1's two mutators are exact inverses (tested in
//! `model::solution`).

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{ConfigError, RoutingError};
use crate::evaluation::{evaluate, EvalWeights};
use crate::model::Solution;

/// Which repair operator [`apply`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOp {
    Best,
    Greedy,
    Regret2,
    Regret3,
}

impl RepairOp {
    pub fn parse(name: &str) -> Result<Self, RoutingError> {
        match name {
            "best" => Ok(Self::Best),
            "greedy" => Ok(Self::Greedy),
            "regret2" => Ok(Self::Regret2),
            "regret3" => Ok(Self::Regret3),
            other => Err(RoutingError::Config(ConfigError::UnknownOperator(other.to_string()))),
        }
    }
}

/// Dispatches to [`best`], [`greedy`], or [`regret_k`] by operator id.
pub fn apply(
    op: RepairOp,
    rng: &mut StdRng,
    s: &mut Solution,
    weights: &EvalWeights,
    perturbed: bool,
) -> Result<(), RoutingError> {
    match op {
        RepairOp::Best => best(rng, s, weights, perturbed),
        RepairOp::Greedy => greedy(rng, s, weights, perturbed),
        RepairOp::Regret2 => regret_k(rng, s, 2, weights, perturbed),
        RepairOp::Regret3 => regret_k(rng, s, 3, weights, perturbed),
    }
}

/// Every gap a customer could be inserted into within `route`: `(tail, head)`
/// pairs, with `None` standing for the route's depot endpoint.
pub fn candidate_positions(s: &Solution, route: usize) -> Vec<(Option<usize>, Option<usize>)> {
    let head = s.routes()[route].head();
    let Some(head) = head else {
        return vec![(None, None)];
    };
    let mut positions = vec![(None, Some(head))];
    let mut cursor = Some(head);
    while let Some(cid) = cursor {
        let next = s.customers()[cid].next();
        positions.push((Some(cid), next));
        cursor = next;
    }
    positions
}

/// Inserts `c` at `(tail, head)` in `route`, evaluates, then removes it back.
/// With `perturbed`, the reported cost is multiplied by `1 + U(-0.2, 0.2)`
/// per §4.5, so "related" noise can occasionally prefer a nominally worse
/// slot.
pub(crate) fn trial_cost(
    rng: &mut StdRng,
    s: &mut Solution,
    c: usize,
    tail: Option<usize>,
    head: Option<usize>,
    route: usize,
    weights: &EvalWeights,
    perturbed: bool,
) -> Result<f64, RoutingError> {
    s.insert_node(c, tail, head, route)?;
    let mut z = evaluate(s, weights);
    s.remove_node(c)?;
    if perturbed {
        z *= 1.0 + rng.random_range(-0.2..0.2);
    }
    Ok(z)
}

pub(crate) type Position = (usize, Option<usize>, Option<usize>);

fn best_position_for(
    rng: &mut StdRng,
    s: &mut Solution,
    c: usize,
    weights: &EvalWeights,
    perturbed: bool,
) -> Result<Option<(Position, f64)>, RoutingError> {
    let mut best: Option<(Position, f64)> = None;
    for route in 0..s.routes().len() {
        for (tail, head) in candidate_positions(s, route) {
            let z = trial_cost(rng, s, c, tail, head, route, weights, perturbed)?;
            if best.as_ref().is_none_or(|(_, bz)| z < *bz) {
                best = Some(((route, tail, head), z));
            }
        }
    }
    Ok(best)
}

/// For each open customer (in index order), insert it at its single best
/// position; repeat until no open customers remain or none can be placed.
pub fn best(
    rng: &mut StdRng,
    s: &mut Solution,
    weights: &EvalWeights,
    perturbed: bool,
) -> Result<(), RoutingError> {
    s.preinsert()?;
    loop {
        let open: Vec<usize> = s.open_customers().collect();
        if open.is_empty() {
            break;
        }
        let mut placed_any = false;
        for c in open {
            if let Some(((route, tail, head), _)) = best_position_for(rng, s, c, weights, perturbed)? {
                s.insert_node(c, tail, head, route)?;
                placed_any = true;
            }
        }
        if !placed_any {
            break;
        }
    }
    s.postinsert()?;
    Ok(())
}

/// Over all (customer, position) pairs, commit the single globally
/// minimizing pair, recompute, and repeat.
pub fn greedy(
    rng: &mut StdRng,
    s: &mut Solution,
    weights: &EvalWeights,
    perturbed: bool,
) -> Result<(), RoutingError> {
    s.preinsert()?;
    loop {
        let open: Vec<usize> = s.open_customers().collect();
        if open.is_empty() {
            break;
        }
        let mut global: Option<(usize, Position, f64)> = None;
        for c in open {
            if let Some((pos, z)) = best_position_for(rng, s, c, weights, perturbed)? {
                if global.as_ref().is_none_or(|(_, _, gz)| z < *gz) {
                    global = Some((c, pos, z));
                }
            }
        }
        match global {
            Some((c, (route, tail, head), _)) => {
                s.insert_node(c, tail, head, route)?;
            }
            None => break,
        }
    }
    s.postinsert()?;
    Ok(())
}

/// For each open customer, computes its `k` best positions' costs and
/// inserts the customer with the largest regret (`Σ(zᵢ − z₁)`) at its
/// cheapest position; repeats until no open customers remain.
pub fn regret_k(
    rng: &mut StdRng,
    s: &mut Solution,
    k: usize,
    weights: &EvalWeights,
    perturbed: bool,
) -> Result<(), RoutingError> {
    s.preinsert()?;
    loop {
        let open: Vec<usize> = s.open_customers().collect();
        if open.is_empty() {
            break;
        }
        let mut chosen: Option<(usize, Position, f64)> = None;
        for c in open {
            let mut costs: Vec<(f64, Position)> = Vec::new();
            for route in 0..s.routes().len() {
                for (tail, head) in candidate_positions(s, route) {
                    let z = trial_cost(rng, s, c, tail, head, route, weights, perturbed)?;
                    costs.push((z, (route, tail, head)));
                }
            }
            if costs.is_empty() {
                continue;
            }
            costs.sort_by_key(|(z, _)| OrderedFloat(*z));
            let kk = k.min(costs.len());
            let z1 = costs[0].0;
            let regret: f64 = costs[..kk].iter().map(|(z, _)| z - z1).sum();
            if chosen.as_ref().is_none_or(|(_, _, best_regret)| regret > *best_regret) {
                chosen = Some((c, costs[0].1, regret));
            }
        }
        match chosen {
            Some((c, (route, tail, head), _)) => {
                s.insert_node(c, tail, head, route)?;
            }
            None => break,
        }
    }
    s.postinsert()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::customer::{CustomerNode, TimeWindow};
    use crate::model::depot::DepotNode;
    use crate::model::vehicle::VehicleNode;
    use crate::DistanceMatrix;
    use rand::SeedableRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn regret3_places_all_ten_customers() {
        let mut rng = seeded();
        let mut s = ten_customer_solution();
        regret_k(&mut rng, &mut s, 3, &EvalWeights::default(), false).expect("regret3");
        assert_eq!(s.open_customers().count(), 0);
    }

    #[test]
    fn best_places_all_customers_on_small_instance() {
        let mut rng = seeded();
        let mut s = ten_customer_solution();
        best(&mut rng, &mut s, &EvalWeights::default(), false).expect("best");
        assert_eq!(s.open_customers().count(), 0);
    }

    fn ten_customer_solution() -> Solution {
        let tw = TimeWindow::new(0.0, 10_000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 1000, 0.1, 10.0, false, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, 1000, 10_000.0, 1.0, 0.0, 0.0, 0.0, 10_000.0, 10, 1.0, 0.0, 0.0);
        let n = 11;
        let mut data = vec![0.0; n * n];
        for a in 0..n {
            for b in 0..n {
                let xa = if a == 0 { 0.0 } else { (a - 1) as f64 };
                let xb = if b == 0 { 0.0 } else { (b - 1) as f64 };
                data[a * n + b] = (xa - xb).abs();
            }
        }
        let arcs = DistanceMatrix::from_data(1, 10, data).expect("square");
        let mut s = Solution::new(vec![depot], Vec::new(), vec![vehicle], Vec::new(), arcs, false);
        for i in 0..10 {
            s.push_customer(CustomerNode::new(i, i as f64, 0.0, 1, 0.0));
        }
        s
    }
}
