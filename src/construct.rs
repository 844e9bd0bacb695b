//! Initial-solution builders (C4): Clarke-Wright, nearest-neighbor, random,
//! regret-k, and cluster, each producing a solution with every customer
//! placed (or surfacing [`RoutingError::InfeasibleInitial`] if it can't).
//!
//! Every builder drives the same arena through [`Solution::add_route`]/
//! [`Solution::add_vehicle`]/[`Solution::insert_node`] the repair and
//! local-search operators use; they just control fleet growth directly
//! instead of going through `can_add_route`/`can_add_vehicle`.

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::distance::NodeRef;
use crate::error::RoutingError;
use crate::evaluation::EvalWeights;
use crate::instance::Graph;
use crate::model::Solution;
use crate::repair;

/// Which builder [`build`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    ClarkeWright,
    NearestNeighbor,
    Random,
    Regret2,
    Regret3,
    Cluster,
}

impl Method {
    pub fn parse(name: &str) -> Result<Self, RoutingError> {
        match name {
            "cw" => Ok(Self::ClarkeWright),
            "nn" => Ok(Self::NearestNeighbor),
            "random" => Ok(Self::Random),
            "regret2" => Ok(Self::Regret2),
            "regret3" => Ok(Self::Regret3),
            "cluster" => Ok(Self::Cluster),
            other => Err(RoutingError::Config(crate::error::ConfigError::UnknownOperator(
                other.to_string(),
            ))),
        }
    }
}

/// Nearest depot to customer `c` by arc length, falling back to depot 0 when
/// the instance has none (should not happen for a valid graph).
fn nearest_depot(s: &Solution, c: usize) -> usize {
    (0..s.depots().len())
        .min_by(|&a, &b| {
            let da = s.arcs().get(NodeRef::Customer(c), NodeRef::Depot(a));
            let db = s.arcs().get(NodeRef::Customer(c), NodeRef::Depot(b));
            da.partial_cmp(&db).expect("arc length is never NaN")
        })
        .unwrap_or(0)
}

/// Returns an empty route at `depot`, reusing one if any of its vehicles
/// already has a non-operational trailing route, otherwise growing the
/// fleet (a fresh vehicle, cloned from the depot's first template, or a
/// fresh route on an existing vehicle).
fn ensure_route(s: &mut Solution, depot: usize) -> Result<usize, RoutingError> {
    let fleet: Vec<usize> = s.depots()[depot].vehicles().to_vec();
    for &v in &fleet {
        match s.vehicles()[v].routes().last() {
            Some(&r) if s.routes()[r].count() == 0 => return Ok(r),
            None => return s.add_route(v),
            _ => continue,
        }
    }
    match fleet.first() {
        Some(&template) => {
            let type_id = s.vehicles()[template].type_id();
            let new_vehicle = s.add_vehicle(depot, type_id)?;
            s.add_route(new_vehicle)
        }
        None => Err(RoutingError::InfeasibleInitial(format!(
            "depot {depot} has no vehicle template to instantiate from"
        ))),
    }
}

fn vehicle_capacity_of(s: &Solution, depot: usize) -> i32 {
    s.depots()[depot]
        .vehicles()
        .first()
        .map(|&v| s.vehicles()[v].capacity())
        .unwrap_or(i32::MAX)
}

/// Clarke-Wright savings: each customer starts on its own single-customer
/// route at its nearest depot, then routes at the *same* depot are merged
/// in decreasing order of savings `s(i,j) = d(depot,i) + d(depot,j) - d(i,j)`
/// while capacity allows.
fn clarke_wright(s: &mut Solution) -> Result<(), RoutingError> {
    let customers: Vec<usize> = (0..s.customers().len()).collect();
    if customers.is_empty() {
        return Ok(());
    }

    struct Saving {
        i: usize,
        j: usize,
        value: f64,
    }

    let depot_of: Vec<usize> = customers.iter().map(|&c| nearest_depot(s, c)).collect();

    let mut savings = Vec::new();
    for (ia, &ci) in customers.iter().enumerate() {
        for &cj in &customers[ia + 1..] {
            if depot_of[ci] != depot_of[cj] {
                continue;
            }
            let d = depot_of[ci];
            let value = s.arcs().get(NodeRef::Depot(d), NodeRef::Customer(ci))
                + s.arcs().get(NodeRef::Depot(d), NodeRef::Customer(cj))
                - s.arcs().get(NodeRef::Customer(ci), NodeRef::Customer(cj));
            if value > 0.0 {
                savings.push(Saving { i: ci, j: cj, value });
            }
        }
    }
    savings.sort_by_key(|sv| std::cmp::Reverse(OrderedFloat(sv.value)));

    // route_of[c]: the route c currently belongs to (in a depot-local chain
    // representation kept outside the arena until flushed).
    let mut chain: Vec<Vec<usize>> = customers.iter().map(|&c| vec![c]).collect();
    let mut chain_of = vec![0usize; s.customers().len()];
    for (idx, &c) in customers.iter().enumerate() {
        chain_of[c] = idx;
    }
    let mut load: Vec<i32> = customers.iter().map(|&c| s.customers()[c].demand()).collect();
    let mut dead = vec![false; chain.len()];

    for saving in &savings {
        let ci = chain_of[saving.i];
        let cj = chain_of[saving.j];
        if ci == cj || dead[ci] || dead[cj] {
            continue;
        }
        let depot = depot_of[saving.i];
        let cap = vehicle_capacity_of(s, depot);
        let combined = load[ci] + load[cj];
        if combined > cap {
            continue;
        }
        let i_at_end = chain[ci].last() == Some(&saving.i);
        let j_at_start = chain[cj].first() == Some(&saving.j);
        let i_at_start = chain[ci].first() == Some(&saving.i);
        let j_at_end = chain[cj].last() == Some(&saving.j);

        let (from, into, reverse_from, reverse_into) = if i_at_end && j_at_start {
            (cj, ci, false, false)
        } else if j_at_end && i_at_start {
            (ci, cj, false, false)
        } else if i_at_end && j_at_end {
            (cj, ci, true, false)
        } else if i_at_start && j_at_start {
            (cj, ci, false, true)
        } else {
            continue;
        };

        let mut moved = std::mem::take(&mut chain[from]);
        if reverse_from {
            moved.reverse();
        }
        if reverse_into {
            chain[into].reverse();
        }
        chain[into].append(&mut moved);
        load[into] = combined;
        load[from] = 0;
        dead[from] = true;
        for &c in &chain[into] {
            chain_of[c] = into;
        }
    }

    for (idx, members) in chain.into_iter().enumerate() {
        if dead[idx] || members.is_empty() {
            continue;
        }
        let depot = depot_of[members[0]];
        let route = ensure_route(s, depot)?;
        let mut tail = None;
        for c in members {
            s.insert_node(c, tail, None, route)?;
            tail = Some(c);
        }
    }
    Ok(())
}

/// Nearest-neighbor: greedily extend each depot's current route with the
/// closest unvisited customer that still fits capacity; opens a new route
/// when nothing fits.
fn nearest_neighbor(s: &mut Solution) -> Result<(), RoutingError> {
    let mut unvisited: Vec<usize> = (0..s.customers().len()).collect();
    while let Some(&seed) = unvisited.first() {
        let depot = nearest_depot(s, seed);
        let cap = vehicle_capacity_of(s, depot);
        let route = ensure_route(s, depot)?;
        let mut current = NodeRef::Depot(depot);
        let mut load = 0;
        let mut tail = None;
        loop {
            let best = unvisited
                .iter()
                .copied()
                .filter(|&c| nearest_depot(s, c) == depot)
                .filter(|&c| load + s.customers()[c].demand() <= cap)
                .min_by(|&a, &b| {
                    let da = s.arcs().get(current, NodeRef::Customer(a));
                    let db = s.arcs().get(current, NodeRef::Customer(b));
                    da.partial_cmp(&db).expect("arc length is never NaN")
                });
            match best {
                Some(c) => {
                    s.insert_node(c, tail, None, route)?;
                    load += s.customers()[c].demand();
                    current = NodeRef::Customer(c);
                    tail = Some(c);
                    unvisited.retain(|&x| x != c);
                }
                None => break,
            }
        }
        // A seed whose demand alone exceeds the depot's vehicle capacity
        // never gets selected above; drop it so the outer loop terminates.
        // It surfaces to the caller as an unplaced customer.
        unvisited.retain(|&c| c != seed);
    }
    Ok(())
}

/// Random: shuffle customers, then append each to its nearest depot's
/// current route (opening a new one whenever capacity would overflow).
fn random_construct(rng: &mut StdRng, s: &mut Solution) -> Result<(), RoutingError> {
    let mut order: Vec<usize> = (0..s.customers().len()).collect();
    order.shuffle(rng);

    use std::collections::HashMap;
    let mut open_route: HashMap<usize, (usize, Option<usize>, i32)> = HashMap::new();

    for c in order {
        let depot = nearest_depot(s, c);
        let cap = vehicle_capacity_of(s, depot);
        let demand = s.customers()[c].demand();
        let (route, tail, load) = match open_route.get(&depot) {
            Some(&(r, t, l)) if l + demand <= cap => (r, t, l),
            _ => (ensure_route(s, depot)?, None, 0),
        };
        s.insert_node(c, tail, None, route)?;
        open_route.insert(depot, (route, Some(c), load + demand));
    }
    Ok(())
}

/// Regret-k: delegates entirely to the repair operator of the same name
/// once every customer starts open — `regret_k` already handles ordering,
/// `preinsert!`/`postinsert!`, and fleet growth.
fn regret(rng: &mut StdRng, s: &mut Solution, k: usize) -> Result<(), RoutingError> {
    repair::regret_k(rng, s, k, &EvalWeights::default(), false)
}

/// Cluster: partitions customers into depot-local angular sectors (as in
/// the sweep heuristic) sized to vehicle capacity, one route per sector.
fn cluster(s: &mut Solution) -> Result<(), RoutingError> {
    let mut by_depot: Vec<Vec<usize>> = vec![Vec::new(); s.depots().len()];
    for c in 0..s.customers().len() {
        by_depot[nearest_depot(s, c)].push(c);
    }

    for (depot, mut members) in by_depot.into_iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        let (dx, dy) = (s.depots()[depot].x(), s.depots()[depot].y());
        members.sort_by(|&a, &b| {
            let pa = (s.customers()[a].y() - dy).atan2(s.customers()[a].x() - dx);
            let pb = (s.customers()[b].y() - dy).atan2(s.customers()[b].x() - dx);
            pa.partial_cmp(&pb).expect("angle is never NaN")
        });

        let cap = vehicle_capacity_of(s, depot);
        let mut route = ensure_route(s, depot)?;
        let mut load = 0;
        let mut tail = None;
        for c in members {
            let demand = s.customers()[c].demand();
            if load + demand > cap && s.routes()[route].count() > 0 {
                route = ensure_route(s, depot)?;
                load = 0;
                tail = None;
            }
            s.insert_node(c, tail, None, route)?;
            load += demand;
            tail = Some(c);
        }
    }
    Ok(())
}

/// Builds an initial solution on `s` (every customer assumed open on
/// entry) using `method`. Returns [`RoutingError::InfeasibleInitial`] if
/// any customer remains open afterward.
pub fn build(rng: &mut StdRng, s: &mut Solution, method: Method) -> Result<(), RoutingError> {
    match method {
        Method::ClarkeWright => clarke_wright(s)?,
        Method::NearestNeighbor => nearest_neighbor(s)?,
        Method::Random => random_construct(rng, s)?,
        Method::Regret2 => regret(rng, s, 2)?,
        Method::Regret3 => regret(rng, s, 3)?,
        Method::Cluster => cluster(s)?,
    }
    s.postinsert()?;
    let unplaced = s.open_customers().count();
    if unplaced > 0 {
        return Err(RoutingError::InfeasibleInitial(format!(
            "{unplaced} customer(s) could not be placed by {method:?}"
        )));
    }
    Ok(())
}

/// `initial_solution(rng, instance, method)` (§6): turns a parsed [`Graph`]
/// into a fully-placed [`Solution`] by `method`.
pub fn initial_solution(rng: &mut StdRng, graph: Graph, method_name: &str) -> Result<Solution, RoutingError> {
    let method = Method::parse(method_name)?;
    let mut s = graph.into_solution();
    build(rng, &mut s, method)?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::customer::{CustomerNode, TimeWindow};
    use crate::model::depot::DepotNode;
    use crate::model::vehicle::VehicleNode;
    use crate::DistanceMatrix;
    use rand::SeedableRng;

    fn line_solution(capacity: i32) -> Solution {
        let tw = TimeWindow::new(0.0, 10_000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 10_000, 0.0, 10.0, false, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, capacity, 10_000.0, 1.0, 0.0, 0.0, 0.0, 10_000.0, 10, 1.0, 0.0, 0.0);
        let n = 5;
        let mut data = vec![0.0; n * n];
        for a in 0..n {
            for b in 0..n {
                data[a * n + b] = (a as f64 - b as f64).abs();
            }
        }
        let arcs = DistanceMatrix::from_data(1, 4, data).expect("square");
        let mut s = Solution::new(vec![depot], Vec::new(), vec![vehicle], Vec::new(), arcs, false);
        for i in 0..4 {
            s.push_customer(CustomerNode::new(i, (i + 1) as f64, 0.0, 10, 0.0));
        }
        s
    }

    #[test]
    fn clarke_wright_places_every_customer_on_a_line() {
        let mut s = line_solution(1000);
        let mut rng = StdRng::seed_from_u64(1);
        build(&mut rng, &mut s, Method::ClarkeWright).expect("cw");
        assert_eq!(s.open_customers().count(), 0);
    }

    #[test]
    fn nearest_neighbor_places_every_customer() {
        let mut s = line_solution(1000);
        let mut rng = StdRng::seed_from_u64(2);
        build(&mut rng, &mut s, Method::NearestNeighbor).expect("nn");
        assert_eq!(s.open_customers().count(), 0);
    }

    #[test]
    fn random_construct_places_every_customer_with_tight_capacity() {
        let mut s = line_solution(10);
        let mut rng = StdRng::seed_from_u64(3);
        build(&mut rng, &mut s, Method::Random).expect("random");
        assert_eq!(s.open_customers().count(), 0);
    }

    #[test]
    fn regret3_builder_places_every_customer() {
        let mut s = line_solution(1000);
        let mut rng = StdRng::seed_from_u64(4);
        build(&mut rng, &mut s, Method::Regret3).expect("regret3");
        assert_eq!(s.open_customers().count(), 0);
    }

    #[test]
    fn cluster_places_every_customer() {
        let mut s = line_solution(1000);
        let mut rng = StdRng::seed_from_u64(5);
        build(&mut rng, &mut s, Method::Cluster).expect("cluster");
        assert_eq!(s.open_customers().count(), 0);
    }

    #[test]
    fn unknown_method_name_is_a_config_error() {
        assert!(Method::parse("bogus").is_err());
    }
}
