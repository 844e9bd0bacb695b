//! Local-search operators (C7): each takes a budget of attempts and keeps
//! only strictly improving moves, routing every mutation through
//! [`Solution::insert_node`]/[`Solution::remove_node`] so a rolled-back
//! attempt leaves every cached aggregate exactly as it was.

use rand::rngs::StdRng;
use rand::Rng;

use crate::distance::NodeRef;
use crate::error::{ConfigError, RoutingError};
use crate::evaluation::{evaluate, EvalWeights};
use crate::model::Solution;
use crate::repair::{self, candidate_positions, Position};

/// Which of the six C7 operators [`apply`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSearchOp {
    Move,
    IntraOpt,
    InterOpt,
    Split,
    SwapCustomers,
    SwapDepots,
}

impl LocalSearchOp {
    pub fn parse(name: &str) -> Result<Self, RoutingError> {
        match name {
            "move" => Ok(Self::Move),
            "intra_opt" => Ok(Self::IntraOpt),
            "inter_opt" => Ok(Self::InterOpt),
            "split" => Ok(Self::Split),
            "swap_customers" => Ok(Self::SwapCustomers),
            "swap_depots" => Ok(Self::SwapDepots),
            other => Err(RoutingError::Config(ConfigError::UnknownOperator(other.to_string()))),
        }
    }
}

/// Runs operator `op` for up to `attempts` tries; `true` iff any attempt
/// strictly improved the objective.
pub fn apply(
    op: LocalSearchOp,
    rng: &mut StdRng,
    s: &mut Solution,
    attempts: usize,
    weights: &EvalWeights,
) -> Result<bool, RoutingError> {
    match op {
        LocalSearchOp::Move => move_customer(rng, s, attempts, weights),
        LocalSearchOp::IntraOpt => intra_opt(rng, s, attempts),
        LocalSearchOp::InterOpt => inter_opt(rng, s, attempts, weights),
        LocalSearchOp::Split => split(rng, s, attempts, weights),
        LocalSearchOp::SwapCustomers => swap_customers(rng, s, attempts, weights),
        LocalSearchOp::SwapDepots => swap_depots(rng, s, attempts, weights),
    }
}

fn route_customers(s: &Solution, route: usize) -> Vec<usize> {
    let mut seq = Vec::new();
    let mut cursor = s.routes()[route].head();
    while let Some(c) = cursor {
        seq.push(c);
        cursor = s.customers()[c].next();
    }
    seq
}

fn best_position_in_depot(
    rng: &mut StdRng,
    s: &mut Solution,
    c: usize,
    depot: usize,
    weights: &EvalWeights,
) -> Result<Option<Position>, RoutingError> {
    let mut best: Option<(Position, f64)> = None;
    let routes: Vec<usize> = (0..s.routes().len())
        .filter(|&r| s.routes()[r].depot_id() == depot)
        .collect();
    for route in routes {
        for (tail, head) in candidate_positions(s, route) {
            let z = repair::trial_cost(rng, s, c, tail, head, route, weights, false)?;
            if best.as_ref().is_none_or(|(_, bz)| z < *bz) {
                best = Some(((route, tail, head), z));
            }
        }
    }
    Ok(best.map(|(pos, _)| pos))
}

/// **move**: relocate a random closed customer to a random position; keep
/// only if it strictly lowers the objective.
pub fn move_customer(
    rng: &mut StdRng,
    s: &mut Solution,
    attempts: usize,
    weights: &EvalWeights,
) -> Result<bool, RoutingError> {
    let mut improved_any = false;
    for _ in 0..attempts {
        let closed: Vec<usize> = (0..s.customers().len())
            .filter(|&c| !s.customers()[c].is_open())
            .collect();
        if closed.is_empty() || s.routes().is_empty() {
            break;
        }
        let c = closed[rng.random_range(0..closed.len())];
        let old_route = s.customers()[c].route().expect("closed customer has a route");
        let old_tail = s.customers()[c].prev();
        let old_head = s.customers()[c].next();

        let before = evaluate(s, weights);
        s.remove_node(c)?;
        let route = rng.random_range(0..s.routes().len());
        let positions = candidate_positions(s, route);
        let (tail, head) = positions[rng.random_range(0..positions.len())];
        s.insert_node(c, tail, head, route)?;
        let after = evaluate(s, weights);

        if after < before - 1e-9 {
            improved_any = true;
        } else {
            s.remove_node(c)?;
            s.insert_node(c, old_tail, old_head, old_route)?;
        }
    }
    Ok(improved_any)
}

/// **intra-opt**: 2-opt within a single route — reverse a random subsegment
/// and keep the reversal iff it shortens the two boundary edges.
pub fn intra_opt(rng: &mut StdRng, s: &mut Solution, attempts: usize) -> Result<bool, RoutingError> {
    let mut improved_any = false;
    for _ in 0..attempts {
        let operational: Vec<usize> = (0..s.routes().len())
            .filter(|&r| s.routes()[r].is_operational())
            .collect();
        if operational.is_empty() {
            break;
        }
        let route = operational[rng.random_range(0..operational.len())];
        let seq = route_customers(s, route);
        if seq.len() < 2 {
            continue;
        }
        let i = rng.random_range(0..seq.len());
        let j = rng.random_range(0..seq.len());
        let (lo, hi) = (i.min(j), i.max(j));
        if lo == hi {
            continue;
        }

        let depot_id = s.routes()[route].depot_id();
        let tail_ref = if lo == 0 {
            NodeRef::Depot(depot_id)
        } else {
            NodeRef::Customer(seq[lo - 1])
        };
        let head_ref = if hi == seq.len() - 1 {
            NodeRef::Depot(depot_id)
        } else {
            NodeRef::Customer(seq[hi + 1])
        };
        let old_cost = s.arcs().get(tail_ref, NodeRef::Customer(seq[lo]))
            + s.arcs().get(NodeRef::Customer(seq[hi]), head_ref);
        let new_cost = s.arcs().get(tail_ref, NodeRef::Customer(seq[hi]))
            + s.arcs().get(NodeRef::Customer(seq[lo]), head_ref);

        if new_cost < old_cost - 1e-9 {
            for &c in &seq[lo..=hi] {
                s.remove_node(c)?;
            }
            let head = if hi == seq.len() - 1 { None } else { Some(seq[hi + 1]) };
            let mut tail = if lo == 0 { None } else { Some(seq[lo - 1]) };
            for &c in seq[lo..=hi].iter().rev() {
                s.insert_node(c, tail, head, route)?;
                tail = Some(c);
            }
            improved_any = true;
        }
    }
    Ok(improved_any)
}

/// **inter-opt**: 2-opt across two distinct routes — swap their tails.
pub fn inter_opt(
    rng: &mut StdRng,
    s: &mut Solution,
    attempts: usize,
    weights: &EvalWeights,
) -> Result<bool, RoutingError> {
    let mut improved_any = false;
    for _ in 0..attempts {
        let operational: Vec<usize> = (0..s.routes().len())
            .filter(|&r| s.routes()[r].is_operational())
            .collect();
        if operational.len() < 2 {
            break;
        }
        let ra = operational[rng.random_range(0..operational.len())];
        let rb = operational[rng.random_range(0..operational.len())];
        if ra == rb {
            continue;
        }
        let seq_a = route_customers(s, ra);
        let seq_b = route_customers(s, rb);
        let ia = rng.random_range(0..seq_a.len());
        let ib = rng.random_range(0..seq_b.len());

        let before = evaluate(s, weights);
        let suffix_a: Vec<usize> = seq_a[ia..].to_vec();
        let suffix_b: Vec<usize> = seq_b[ib..].to_vec();
        for &c in &suffix_a {
            s.remove_node(c)?;
        }
        for &c in &suffix_b {
            s.remove_node(c)?;
        }
        let mut tail_a = if ia == 0 { None } else { Some(seq_a[ia - 1]) };
        for &c in &suffix_b {
            s.insert_node(c, tail_a, None, ra)?;
            tail_a = Some(c);
        }
        let mut tail_b = if ib == 0 { None } else { Some(seq_b[ib - 1]) };
        for &c in &suffix_a {
            s.insert_node(c, tail_b, None, rb)?;
            tail_b = Some(c);
        }
        let after = evaluate(s, weights);

        if after < before - 1e-9 {
            improved_any = true;
        } else {
            let cur_a = route_customers(s, ra);
            let cur_b = route_customers(s, rb);
            for &c in &cur_a[ia..] {
                s.remove_node(c)?;
            }
            for &c in &cur_b[ib..] {
                s.remove_node(c)?;
            }
            let mut tail_a2 = if ia == 0 { None } else { Some(seq_a[ia - 1]) };
            for &c in &suffix_a {
                s.insert_node(c, tail_a2, None, ra)?;
                tail_a2 = Some(c);
            }
            let mut tail_b2 = if ib == 0 { None } else { Some(seq_b[ib - 1]) };
            for &c in &suffix_b {
                s.insert_node(c, tail_b2, None, rb)?;
                tail_b2 = Some(c);
            }
        }
    }
    Ok(improved_any)
}

/// **split**: close a random operational route and redistribute its
/// customers with the greedy repair operator.
pub fn split(
    rng: &mut StdRng,
    s: &mut Solution,
    attempts: usize,
    weights: &EvalWeights,
) -> Result<bool, RoutingError> {
    let mut improved_any = false;
    for _ in 0..attempts {
        let operational: Vec<usize> = (0..s.routes().len())
            .filter(|&r| s.routes()[r].is_operational())
            .collect();
        if operational.is_empty() {
            break;
        }
        let route = operational[rng.random_range(0..operational.len())];
        let vehicle_id = s.routes()[route].vehicle_id();
        let seq = route_customers(s, route);

        let before = evaluate(s, weights);
        for &c in &seq {
            s.remove_node(c)?;
        }
        repair::greedy(rng, s, weights, false)?;
        let after = evaluate(s, weights);

        if after < before - 1e-9 && s.open_customers().count() == 0 {
            improved_any = true;
        } else {
            for &c in &seq {
                if !s.customers()[c].is_open() {
                    s.remove_node(c)?;
                }
            }
            let restored = s.add_route(vehicle_id)?;
            let mut tail = None;
            for &c in &seq {
                s.insert_node(c, tail, None, restored)?;
                tail = Some(c);
            }
        }
    }
    Ok(improved_any)
}

/// **swap-customers**: exchange two closed customers' positions, possibly
/// across routes.
pub fn swap_customers(
    rng: &mut StdRng,
    s: &mut Solution,
    attempts: usize,
    weights: &EvalWeights,
) -> Result<bool, RoutingError> {
    let mut improved_any = false;
    for _ in 0..attempts {
        let closed: Vec<usize> = (0..s.customers().len())
            .filter(|&c| !s.customers()[c].is_open())
            .collect();
        if closed.len() < 2 {
            break;
        }
        let a = closed[rng.random_range(0..closed.len())];
        let b = closed[rng.random_range(0..closed.len())];
        if a == b {
            continue;
        }
        let ra = s.customers()[a].route().expect("closed");
        let rb = s.customers()[b].route().expect("closed");
        let ta = s.customers()[a].prev();
        let ha = s.customers()[a].next();
        let tb = s.customers()[b].prev();
        let hb = s.customers()[b].next();
        if ra == rb && (ta == Some(b) || ha == Some(b)) {
            continue;
        }

        let before = evaluate(s, weights);
        s.remove_node(a)?;
        s.remove_node(b)?;
        s.insert_node(b, ta, ha, ra)?;
        s.insert_node(a, tb, hb, rb)?;
        let after = evaluate(s, weights);

        if after < before - 1e-9 {
            improved_any = true;
        } else {
            s.remove_node(a)?;
            s.remove_node(b)?;
            s.insert_node(a, ta, ha, ra)?;
            s.insert_node(b, tb, hb, rb)?;
        }
    }
    Ok(improved_any)
}

/// **swap-depots**: move every customer served from `src` to `dst`'s fleet,
/// keeping the move only if it strictly improves the objective and every
/// customer could still be placed.
pub fn swap_depots(
    rng: &mut StdRng,
    s: &mut Solution,
    attempts: usize,
    weights: &EvalWeights,
) -> Result<bool, RoutingError> {
    let mut improved_any = false;
    for _ in 0..attempts {
        let num_depots = s.depots().len();
        if num_depots < 2 {
            break;
        }
        let src = rng.random_range(0..num_depots);
        let dst = rng.random_range(0..num_depots);
        if src == dst || !s.depots()[src].is_operational() {
            continue;
        }

        let before = evaluate(s, weights);
        let customers: Vec<usize> = (0..s.routes().len())
            .filter(|&r| s.routes()[r].depot_id() == src)
            .flat_map(|r| route_customers(s, r))
            .collect();
        if customers.is_empty() {
            continue;
        }

        for &c in &customers {
            s.remove_node(c)?;
        }
        s.preinsert()?;
        for &c in &customers {
            if let Some((route, tail, head)) = best_position_in_depot(rng, s, c, dst, weights)? {
                s.insert_node(c, tail, head, route)?;
            }
        }
        s.postinsert()?;
        let all_placed = customers.iter().all(|&c| !s.customers()[c].is_open());
        let after = evaluate(s, weights);

        if all_placed && after < before - 1e-9 {
            improved_any = true;
        } else {
            for &c in &customers {
                if !s.customers()[c].is_open() {
                    s.remove_node(c)?;
                }
            }
            s.preinsert()?;
            for &c in &customers {
                if let Some((route, tail, head)) = best_position_in_depot(rng, s, c, src, weights)? {
                    s.insert_node(c, tail, head, route)?;
                }
            }
            s.postinsert()?;
        }
    }
    Ok(improved_any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::customer::{CustomerNode, TimeWindow};
    use crate::model::depot::DepotNode;
    use crate::model::vehicle::VehicleNode;
    use crate::DistanceMatrix;
    use rand::SeedableRng;

    fn crossing_route_solution() -> (Solution, usize) {
        let tw = TimeWindow::new(0.0, 10_000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 1000, 0.1, 10.0, false, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, 1000, 10_000.0, 1.0, 0.0, 0.0, 0.0, 10_000.0, 10, 1.0, 0.0, 0.0);
        let coords = [(1.0, 1.0), (2.0, 0.0), (1.0, -1.0)];
        let n = coords.len() + 1;
        let mut data = vec![0.0; n * n];
        let all: Vec<(f64, f64)> = std::iter::once((0.0, 0.0)).chain(coords.iter().copied()).collect();
        for a in 0..n {
            for b in 0..n {
                let (ax, ay) = all[a];
                let (bx, by) = all[b];
                data[a * n + b] = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
            }
        }
        let arcs = DistanceMatrix::from_data(1, coords.len(), data).expect("square");
        let mut s = Solution::new(vec![depot], Vec::new(), vec![vehicle], Vec::new(), arcs, false);
        for (i, (x, y)) in coords.iter().enumerate() {
            s.push_customer(CustomerNode::new(i, *x, *y, 1, 0.0));
        }
        let route = s.add_route(0).expect("route");
        // crossing order: 0 (1,1) -> 2 (1,-1) -> 1 (2,0)
        s.insert_node(0, None, None, route).expect("insert 0");
        s.insert_node(2, Some(0), None, route).expect("insert 2");
        s.insert_node(1, Some(2), None, route).expect("insert 1");
        (s, route)
    }

    #[test]
    fn intra_opt_never_worsens_route_length() {
        let (mut s, route) = crossing_route_solution();
        let before = s.routes()[route].length();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        for _ in 0..20 {
            intra_opt(&mut rng, &mut s, 10).expect("intra_opt");
        }
        assert!(s.routes()[route].length() <= before + 1e-9);
    }

    #[test]
    fn swap_customers_is_a_noop_when_no_improvement_exists() {
        let (mut s, _) = crossing_route_solution();
        let before = s.vectorize();
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        // Force a swap attempt and confirm structural consistency either way.
        swap_customers(&mut rng, &mut s, 1, &EvalWeights::default()).expect("swap");
        let after = s.vectorize();
        assert_eq!(before[0].len(), after[0].len());
    }
}
