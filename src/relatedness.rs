//! Scalar similarity used as a sampling weight by the "related" destroy
//! policies (C3). Higher means more similar; self-relatedness is `+∞` and
//! any pair touching a non-operational route/vehicle is `−∞` so it is never
//! sampled.

use crate::distance::NodeRef;
use crate::model::customer::CustomerNode;
use crate::model::vehicle::VehicleNode;
use crate::model::Solution;

fn tw_bounds(c: &CustomerNode) -> (f64, f64) {
    c.time_window().map(|tw| (tw.ready(), tw.due())).unwrap_or((0.0, 0.0))
}

/// Relatedness between two customers.
pub fn customer_customer(s: &Solution, c1: usize, c2: usize) -> f64 {
    if c1 == c2 {
        return f64::INFINITY;
    }
    let a = &s.customers()[c1];
    let b = &s.customers()[c2];
    let dq = (a.demand() - b.demand()).unsigned_abs() as f64;
    let same_depot = f64::from(a.depot().is_some() && a.depot() == b.depot());
    let same_vehicle = f64::from(a.vehicle().is_some() && a.vehicle() == b.vehicle());
    let same_route = f64::from(a.route().is_some() && a.route() == b.route());
    let numerator = dq + 1.0 + same_depot + same_vehicle + same_route;

    let arc = s.arcs().get(NodeRef::Customer(c1), NodeRef::Customer(c2));
    let (ready1, due1) = tw_bounds(a);
    let (ready2, due2) = tw_bounds(b);
    let denom = arc + (ready1 - ready2).abs() + (due1 - due2).abs();
    numerator / denom.max(f64::EPSILON)
}

/// Relatedness between a customer and a candidate depot.
pub fn customer_depot(s: &Solution, c: usize, d: usize) -> f64 {
    let cust = &s.customers()[c];
    let same = f64::from(cust.depot() == Some(d));
    let numerator = 1.0 + same;
    let arc = s.arcs().get(NodeRef::Customer(c), NodeRef::Depot(d));
    numerator / arc.max(f64::EPSILON)
}

/// Relatedness between two routes. `-∞` if either is non-operational.
pub fn route_route(s: &Solution, r1: usize, r2: usize) -> f64 {
    if r1 == r2 {
        return f64::INFINITY;
    }
    let a = &s.routes()[r1];
    let b = &s.routes()[r2];
    if !a.is_operational() || !b.is_operational() {
        return f64::NEG_INFINITY;
    }
    let dq = (a.load() - b.load()).unsigned_abs() as f64;
    let same_depot = f64::from(a.depot_id() == b.depot_id());
    let same_vehicle = f64::from(a.vehicle_id() == b.vehicle_id());
    let numerator = dq + 1.0 + same_depot + same_vehicle;

    let (ax, ay) = a.centroid();
    let (bx, by) = b.centroid();
    let euclid = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
    let denom = euclid + (a.t_start() - b.t_start()).abs() + (a.t_end() - b.t_end()).abs();
    numerator / denom.max(f64::EPSILON)
}

/// Demand-weighted centroid of a vehicle's routes (origin if the vehicle
/// owns no loaded routes).
fn weighted_centroid(s: &Solution, v: &VehicleNode) -> (f64, f64) {
    let (mut wx, mut wy, mut wsum) = (0.0, 0.0, 0.0);
    for &rid in v.routes() {
        let r = &s.routes()[rid];
        let w = r.load() as f64;
        wx += r.centroid().0 * w;
        wy += r.centroid().1 * w;
        wsum += w;
    }
    if wsum <= 0.0 {
        (0.0, 0.0)
    } else {
        (wx / wsum, wy / wsum)
    }
}

/// Relatedness between two vehicles. `-∞` if either is non-operational.
pub fn vehicle_vehicle(s: &Solution, v1: usize, v2: usize) -> f64 {
    if v1 == v2 {
        return f64::INFINITY;
    }
    let a = &s.vehicles()[v1];
    let b = &s.vehicles()[v2];
    if !a.is_operational() || !b.is_operational() {
        return f64::NEG_INFINITY;
    }
    let dq = (a.load() - b.load()).unsigned_abs() as f64;
    let same_depot = f64::from(a.depot_id() == b.depot_id());
    let numerator = dq + 1.0 + same_depot;

    let ca = weighted_centroid(s, a);
    let cb = weighted_centroid(s, b);
    let euclid = ((ca.0 - cb.0).powi(2) + (ca.1 - cb.1).powi(2)).sqrt();
    let denom = euclid + (a.t_start() - b.t_start()).abs() + (a.t_end() - b.t_end()).abs();
    numerator / denom.max(f64::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::model::customer::TimeWindow;
    use crate::model::depot::DepotNode;
    use crate::model::vehicle::VehicleNode;

    fn sample() -> Solution {
        let tw = TimeWindow::new(0.0, 1000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 100, 0.0, 10.0, false, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, 50, 1000.0, 1.0, 0.0, 0.0, 0.0, 1000.0, 5, 1.0, 0.0, 0.0);
        let mut s = Solution::empty_of_size(1, 2);
        s.push_depot(depot);
        s.push_vehicle(vehicle);
        s.push_customer(CustomerNode::new(0, 3.0, 0.0, 5, 0.0));
        s.push_customer(CustomerNode::new(1, 6.0, 0.0, 5, 0.0));
        s
    }

    #[test]
    fn self_relatedness_is_infinite() {
        let s = sample();
        assert_eq!(customer_customer(&s, 0, 0), f64::INFINITY);
        assert_eq!(route_route(&s, 0, 0), f64::INFINITY);
        assert_eq!(vehicle_vehicle(&s, 0, 0), f64::INFINITY);
    }

    #[test]
    fn nonoperational_route_pair_is_negative_infinite() {
        let mut s = sample();
        let r0 = s.add_route(0).expect("route 0");
        let r1 = s.add_route(0).expect("route 1");
        assert_eq!(route_route(&s, r0, r1), f64::NEG_INFINITY);
    }

    #[test]
    fn customer_customer_relatedness_is_positive() {
        let s = sample();
        assert!(customer_customer(&s, 0, 1) > 0.0);
    }
}
