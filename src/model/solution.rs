//! The solution arena: owns every depot, customer, vehicle, and route, and
//! is the only place allowed to mutate their live/cached fields.
//!
//! All structural change goes through [`Solution::insert_node`] and
//! [`Solution::remove_node`], which are exact inverses of each other and
//! keep route/vehicle/depot aggregates (count, load, length, centroid, and,
//! when time tracking is on, the arrival/departure/fuel schedule) consistent
//! in a single pass. `add_route`/`add_vehicle`/`delete_route`/`delete_vehicle`
//! grow and shrink the fleet; `preinsert`/`postinsert`/`preremove` are the
//! bracketing hooks destroy/repair operators call around a batch of moves.

use crate::distance::{DistanceMatrix, NodeRef};
use crate::error::RoutingError;
use crate::model::customer::CustomerNode;
use crate::model::depot::DepotNode;
use crate::model::route::Route;
use crate::model::vehicle::VehicleNode;

/// The full routing solution: an arena of depots, customers, vehicles, and
/// routes, plus the arc-length matrix over the unified node space.
#[derive(Debug, Clone)]
pub struct Solution {
    depots: Vec<DepotNode>,
    customers: Vec<CustomerNode>,
    vehicles: Vec<VehicleNode>,
    routes: Vec<Route>,
    arcs: DistanceMatrix,

    /// Explicit stand-in for the spec's global mutable time-tracking flag:
    /// when `false`, `insert_node`/`remove_node` skip the forward/backward
    /// time-and-fuel pass entirely (useful for pure-capacity instances).
    time_tracking: bool,
}

fn endpoint_ref(depot_id: usize, customer: Option<usize>) -> NodeRef {
    match customer {
        Some(c) => NodeRef::Customer(c),
        None => NodeRef::Depot(depot_id),
    }
}

impl Solution {
    pub fn new(
        depots: Vec<DepotNode>,
        customers: Vec<CustomerNode>,
        vehicles: Vec<VehicleNode>,
        routes: Vec<Route>,
        arcs: DistanceMatrix,
        time_tracking: bool,
    ) -> Self {
        Self {
            depots,
            customers,
            vehicles,
            routes,
            arcs,
            time_tracking,
        }
    }

    /// An empty solution shell: `num_depots` depots with no vehicles and no
    /// routes, zero customers beyond `num_customers` placeholder slots is
    /// *not* what this builds — it simply allocates the arc matrix and
    /// leaves `depots`/`customers`/`vehicles`/`routes` empty, for tests and
    /// builders that push nodes in afterwards.
    pub fn empty_of_size(num_depots: usize, num_customers: usize) -> Self {
        Self {
            depots: Vec::new(),
            customers: Vec::new(),
            vehicles: Vec::new(),
            routes: Vec::new(),
            arcs: DistanceMatrix::new(num_depots, num_customers),
            time_tracking: false,
        }
    }

    pub fn depots(&self) -> &[DepotNode] {
        &self.depots
    }

    pub fn customers(&self) -> &[CustomerNode] {
        &self.customers
    }

    pub fn vehicles(&self) -> &[VehicleNode] {
        &self.vehicles
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn arcs(&self) -> &DistanceMatrix {
        &self.arcs
    }

    pub fn time_tracking(&self) -> bool {
        self.time_tracking
    }

    pub fn set_time_tracking(&mut self, on: bool) {
        self.time_tracking = on;
    }

    pub fn push_depot(&mut self, depot: DepotNode) {
        self.depots.push(depot);
    }

    pub fn push_customer(&mut self, customer: CustomerNode) {
        self.customers.push(customer);
    }

    pub fn push_vehicle(&mut self, vehicle: VehicleNode) {
        self.vehicles.push(vehicle);
    }

    /// Customer ids not currently assigned to any route.
    pub fn open_customers(&self) -> impl Iterator<Item = usize> + '_ {
        self.customers
            .iter()
            .filter(|c| c.is_open())
            .map(|c| c.id())
    }

    // -- structural mutators -------------------------------------------

    /// Splices customer `c` into `route` between `tail` and `head` (either
    /// end `None` means the depot), updates every cached aggregate, and, if
    /// time tracking is on, re-propagates the vehicle's schedule.
    pub fn insert_node(
        &mut self,
        c: usize,
        tail: Option<usize>,
        head: Option<usize>,
        route: usize,
    ) -> Result<(), RoutingError> {
        if !self.customers[c].is_open() {
            return Err(RoutingError::Invariant(format!(
                "customer {c} is already assigned to a route"
            )));
        }

        let route_depot = self.routes[route].depot_id();
        let route_vehicle = self.routes[route].vehicle_id();

        let tail_ref = endpoint_ref(route_depot, tail);
        let head_ref = endpoint_ref(route_depot, head);
        let c_ref = NodeRef::Customer(c);
        let delta_l = self.arcs.get(tail_ref, c_ref) + self.arcs.get(c_ref, head_ref)
            - self.arcs.get(tail_ref, head_ref);

        match tail {
            Some(t) => self.customers[t].set_next(Some(c)),
            None => self.routes[route].set_head(Some(c)),
        }
        match head {
            Some(h) => self.customers[h].set_prev(Some(c)),
            None => self.routes[route].set_tail(Some(c)),
        }
        self.customers[c].set_prev(tail);
        self.customers[c].set_next(head);
        self.customers[c].set_route(Some(route));
        self.customers[c].set_depot(Some(route_depot));
        self.customers[c].set_vehicle(Some(route_vehicle));

        let count_before = self.routes[route].count();
        let (cx, cy) = (self.customers[c].x(), self.customers[c].y());
        self.routes[route].add_to_centroid(cx, cy, count_before);

        let demand = self.customers[c].demand();
        self.routes[route].adjust_count(1);
        self.routes[route].adjust_load(demand);
        self.routes[route].adjust_length(delta_l);

        self.vehicles[route_vehicle].adjust_aggregates(1, demand, delta_l);
        self.depots[route_depot].adjust_aggregates(1, demand, delta_l);

        if self.time_tracking {
            self.propagate_vehicle_times(route_vehicle)?;
        }
        Ok(())
    }

    /// The exact inverse of [`insert_node`](Self::insert_node): unsplices
    /// `c` from its route, reverses every aggregate it contributed, and
    /// resets it to the open-customer sentinel state.
    pub fn remove_node(&mut self, c: usize) -> Result<(), RoutingError> {
        let route = self.customers[c]
            .route()
            .ok_or_else(|| RoutingError::Invariant(format!("customer {c} is already open")))?;
        let tail = self.customers[c].prev();
        let head = self.customers[c].next();
        let route_depot = self.routes[route].depot_id();
        let route_vehicle = self.routes[route].vehicle_id();

        let tail_ref = endpoint_ref(route_depot, tail);
        let head_ref = endpoint_ref(route_depot, head);
        let c_ref = NodeRef::Customer(c);
        let delta_l = self.arcs.get(tail_ref, head_ref)
            - self.arcs.get(tail_ref, c_ref)
            - self.arcs.get(c_ref, head_ref);

        match tail {
            Some(t) => self.customers[t].set_next(head),
            None => self.routes[route].set_head(head),
        }
        match head {
            Some(h) => self.customers[h].set_prev(tail),
            None => self.routes[route].set_tail(tail),
        }

        let count_before = self.routes[route].count();
        let (cx, cy) = (self.customers[c].x(), self.customers[c].y());
        self.routes[route].remove_from_centroid(cx, cy, count_before);

        let demand = self.customers[c].demand();
        self.routes[route].adjust_count(-1);
        self.routes[route].adjust_load(-demand);
        self.routes[route].adjust_length(delta_l);

        self.vehicles[route_vehicle].adjust_aggregates(-1, -demand, delta_l);
        self.depots[route_depot].adjust_aggregates(-1, -demand, delta_l);

        self.customers[c].clear_live();

        if self.time_tracking {
            self.propagate_vehicle_times(route_vehicle)?;
        }
        Ok(())
    }

    /// Forward pass (fuel then time, causally chained across the vehicle's
    /// routes in slot order) followed by a backward pass computing slack.
    fn propagate_vehicle_times(&mut self, vehicle: usize) -> Result<(), RoutingError> {
        let route_ids: Vec<usize> = self.vehicles[vehicle].routes().to_vec();
        let depot_id = self.vehicles[vehicle].depot_id();
        let speed = self.vehicles[vehicle].speed();
        let range = self.vehicles[vehicle].range();
        let refuel_rate = self.vehicles[vehicle].refuel_time_per_unit();
        let load_rate = self.vehicles[vehicle].load_time_per_unit();
        let service_overhead = self.vehicles[vehicle].service_overhead();

        let depot_ready = self.depots[depot_id].time_window().ready();
        let depot_due = self.depots[depot_id].time_window().due();

        let mut prev_t_end = depot_ready;
        let mut prev_fuel_end = range;
        let vehicle_start = if route_ids.is_empty() {
            depot_ready
        } else {
            prev_t_end
        };

        for &rid in &route_ids {
            let t_init = prev_t_end;
            let fuel_init = prev_fuel_end;

            if self.routes[rid].count() == 0 {
                self.routes[rid].set_times(t_init, t_init, t_init);
                self.routes[rid].set_fuel(fuel_init, fuel_init, fuel_init);
                prev_t_end = t_init;
                prev_fuel_end = fuel_init;
                continue;
            }

            let route_len = self.routes[rid].length();
            let fuel_start = fuel_init + (route_len / range - fuel_init).max(0.0);
            let t_start = t_init
                + refuel_rate * (fuel_start - fuel_init)
                + load_rate * self.routes[rid].load() as f64;

            let mut current_time = t_start;
            let mut prev_node = NodeRef::Depot(depot_id);
            let mut cursor = self.routes[rid].head();
            while let Some(cid) = cursor {
                let travel = self.arcs.get(prev_node, NodeRef::Customer(cid)) / speed;
                let arrival = current_time + travel;
                let ready = self.customers[cid]
                    .time_window()
                    .map(|tw| tw.ready())
                    .unwrap_or(arrival);
                let wait = (ready - arrival - service_overhead).max(0.0);
                let departure =
                    arrival + service_overhead + wait + self.customers[cid].service_duration();
                self.customers[cid].set_times(arrival, departure);
                current_time = departure;
                prev_node = NodeRef::Customer(cid);
                cursor = self.customers[cid].next();
            }
            let return_leg = self.arcs.get(prev_node, NodeRef::Depot(depot_id)) / speed;
            let t_end = current_time + return_leg;
            let fuel_end = fuel_start - route_len / range;

            self.routes[rid].set_times(t_init, t_start, t_end);
            self.routes[rid].set_fuel(fuel_init, fuel_start, fuel_end);

            prev_t_end = t_end;
            prev_fuel_end = fuel_end;
        }

        let vehicle_end = if route_ids.is_empty() {
            depot_ready
        } else {
            prev_t_end
        };
        self.vehicles[vehicle].set_times(vehicle_start, vehicle_end);

        // backward pass: slack bounded above by the depot's closing time.
        let mut next_slack = depot_due - vehicle_end;
        for &rid in route_ids.iter().rev() {
            let mut route_slack = next_slack;
            let mut cursor = self.routes[rid].head();
            while let Some(cid) = cursor {
                if let Some(tw) = self.customers[cid].time_window() {
                    let margin = tw.due() - self.customers[cid].arrival() - service_overhead;
                    route_slack = route_slack.min(margin);
                }
                cursor = self.customers[cid].next();
            }
            self.routes[rid].set_slack(route_slack);
            next_slack = route_slack;
        }
        self.vehicles[vehicle].set_slack(next_slack);
        self.refresh_depot_slack(depot_id);
        Ok(())
    }

    fn refresh_depot_slack(&mut self, depot: usize) {
        let slack = self.depots[depot]
            .vehicles()
            .iter()
            .map(|&vid| self.vehicles[vid].slack())
            .fold(f64::INFINITY, f64::min);
        self.depots[depot].set_slack(slack);
    }

    // -- fleet growth/shrink predicates ---------------------------------

    /// Conservative predicate: is it safe to append a fresh empty route to
    /// `vehicle` right now?
    pub fn can_add_route(&self, vehicle: usize) -> bool {
        let v = &self.vehicles[vehicle];
        if v.routes().len() >= v.max_routes() {
            return false;
        }
        if v.routes().iter().any(|&r| !self.routes[r].is_operational()) {
            return false;
        }
        let depot = &self.depots[v.depot_id()];
        if depot.load() >= depot.capacity() {
            return false;
        }
        if v.t_end() > depot.time_window().due() {
            return false;
        }
        if v.working_duration() > v.max_working_duration() {
            return false;
        }
        v.count() == 0
            || v.routes().iter().any(|&r| self.routes[r].load() > v.capacity())
            || depot.load() > depot.capacity()
    }

    /// Conservative predicate: is it safe to instantiate another vehicle of
    /// `type_id` at `depot`?
    pub fn can_add_vehicle(&self, depot: usize, type_id: usize) -> bool {
        let d = &self.depots[depot];
        if d.load() >= d.capacity() {
            return false;
        }
        let fleet: Vec<&VehicleNode> = d.vehicles().iter().map(|&vid| &self.vehicles[vid]).collect();
        let has_empty_identical = fleet
            .iter()
            .any(|v| v.type_id() == type_id && !v.is_operational());
        if has_empty_identical {
            return false;
        }
        fleet
            .iter()
            .any(|v| v.load() >= v.capacity() || v.working_duration() >= v.max_working_duration())
    }

    pub fn can_delete_route(&self, route: usize) -> bool {
        !self.routes[route].is_operational()
    }

    pub fn can_delete_vehicle(&self, vehicle: usize) -> bool {
        let v = &self.vehicles[vehicle];
        if v.is_operational() {
            return false;
        }
        self.depots[v.depot_id()]
            .vehicles()
            .iter()
            .any(|&vid| vid != vehicle && self.vehicles[vid].type_id() == v.type_id())
    }

    /// Appends an empty route to `vehicle`.
    pub fn add_route(&mut self, vehicle: usize) -> Result<usize, RoutingError> {
        let depot = self.vehicles[vehicle].depot_id();
        let slot = self.vehicles[vehicle].routes().len();
        let new_id = self.routes.len();
        self.routes.push(Route::new(new_id, depot, vehicle, slot));
        self.vehicles[vehicle].push_route(new_id);
        if self.time_tracking {
            self.propagate_vehicle_times(vehicle)?;
        }
        Ok(new_id)
    }

    /// Instantiates a new vehicle of `type_id` at `depot`, cloning its
    /// static parameters from an existing same-type vehicle there.
    pub fn add_vehicle(&mut self, depot: usize, type_id: usize) -> Result<usize, RoutingError> {
        let template_id = self.depots[depot]
            .vehicles()
            .iter()
            .copied()
            .find(|&vid| self.vehicles[vid].type_id() == type_id)
            .ok_or_else(|| {
                RoutingError::Invariant(format!(
                    "no vehicle template of type {type_id} at depot {depot}"
                ))
            })?;
        let t = &self.vehicles[template_id];
        let new_id = self.vehicles.len();
        let v = VehicleNode::new(
            new_id,
            depot,
            type_id,
            t.capacity(),
            t.range(),
            t.speed(),
            t.refuel_time_per_unit(),
            t.load_time_per_unit(),
            t.service_overhead(),
            t.max_working_duration(),
            t.max_routes(),
            t.cost_per_distance(),
            t.cost_per_time(),
            t.fixed_cost(),
        );
        self.vehicles.push(v);
        self.depots[depot].add_vehicle_id(new_id);
        Ok(new_id)
    }

    // -- batch-operator hooks --------------------------------------------

    /// Called before a batch of repair moves: grows every vehicle/depot that
    /// has room to grow, so repair operators always see a spare route/
    /// vehicle to insert into.
    pub fn preinsert(&mut self) -> Result<(), RoutingError> {
        for vid in 0..self.vehicles.len() {
            if self.can_add_route(vid) {
                self.add_route(vid)?;
            }
        }
        for did in 0..self.depots.len() {
            if let Some(&template) = self.depots[did].vehicles().first() {
                let type_id = self.vehicles[template].type_id();
                if self.can_add_vehicle(did, type_id) {
                    self.add_vehicle(did, type_id)?;
                }
            }
        }
        Ok(())
    }

    /// Called after a batch of repair moves: garbage-collects empty routes
    /// and deletable vehicles, renumbers what's left densely, and refreshes
    /// every surviving customer's cached `(route, vehicle, depot)`.
    pub fn postinsert(&mut self) -> Result<(), RoutingError> {
        self.garbage_collect()
    }

    /// Called before a batch of destroy moves: refreshes cached customer
    /// back-references without changing arena membership.
    pub fn preremove(&mut self) -> Result<(), RoutingError> {
        for rid in 0..self.routes.len() {
            let depot_id = self.routes[rid].depot_id();
            let vehicle_id = self.routes[rid].vehicle_id();
            let mut cursor = self.routes[rid].head();
            while let Some(cid) = cursor {
                self.customers[cid].set_route(Some(rid));
                self.customers[cid].set_depot(Some(depot_id));
                self.customers[cid].set_vehicle(Some(vehicle_id));
                cursor = self.customers[cid].next();
            }
        }
        Ok(())
    }

    /// Called after a batch of destroy moves: same garbage collection as
    /// [`postinsert`](Self::postinsert), since destroy moves can also leave
    /// routes/vehicles empty and deletable.
    pub fn postremove(&mut self) -> Result<(), RoutingError> {
        self.garbage_collect()
    }

    fn garbage_collect(&mut self) -> Result<(), RoutingError> {
        let route_keep: Vec<usize> = (0..self.routes.len())
            .filter(|&r| self.routes[r].is_operational())
            .collect();

        let vehicle_keep: Vec<usize> = (0..self.vehicles.len())
            .filter(|&v| !self.can_delete_vehicle(v))
            .collect();
        let mut vehicle_remap = vec![usize::MAX; self.vehicles.len()];
        for (new_id, &old_id) in vehicle_keep.iter().enumerate() {
            vehicle_remap[old_id] = new_id;
        }

        let mut new_routes = Vec::with_capacity(route_keep.len());
        for &old_id in &route_keep {
            let mut r = self.routes[old_id].clone();
            let new_vid = vehicle_remap[r.vehicle_id()];
            debug_assert_ne!(new_vid, usize::MAX, "operational route's vehicle was dropped");
            r.set_id(new_routes.len());
            r.set_vehicle_id(new_vid);
            new_routes.push(r);
        }

        let mut new_vehicles = Vec::with_capacity(vehicle_keep.len());
        for &old_id in &vehicle_keep {
            let mut v = self.vehicles[old_id].clone();
            let new_vid = vehicle_remap[old_id];
            v.set_id(new_vid);
            let mut routes_for_v: Vec<(usize, usize)> = new_routes
                .iter()
                .enumerate()
                .filter(|(_, r)| r.vehicle_id() == new_vid)
                .map(|(i, r)| (r.id(), i))
                .collect();
            routes_for_v.sort_by_key(|&(route_id, _)| route_id);
            for (slot, &(route_id, _)) in routes_for_v.iter().enumerate() {
                new_routes[route_id].set_slot(slot);
            }
            v.set_routes(routes_for_v.iter().map(|&(route_id, _)| route_id).collect());
            new_vehicles.push(v);
        }

        for depot in &mut self.depots {
            let remapped: Vec<usize> = depot
                .vehicles()
                .iter()
                .filter_map(|&vid| {
                    let new_vid = vehicle_remap[vid];
                    (new_vid != usize::MAX).then_some(new_vid)
                })
                .collect();
            depot.set_vehicle_ids(remapped);
        }

        for r in &new_routes {
            let depot_id = r.depot_id();
            let vehicle_id = r.vehicle_id();
            let mut cursor = r.head();
            while let Some(cid) = cursor {
                self.customers[cid].set_route(Some(r.id()));
                self.customers[cid].set_depot(Some(depot_id));
                self.customers[cid].set_vehicle(Some(vehicle_id));
                cursor = self.customers[cid].next();
            }
        }

        self.routes = new_routes;
        self.vehicles = new_vehicles;
        Ok(())
    }

    /// Canonical per-depot visit sequence: for each depot, the concatenation
    /// of its vehicles' routes' customer ids in slot order. Used for
    /// hashing/dedup and for deterministic test assertions.
    pub fn vectorize(&self) -> Vec<Vec<usize>> {
        self.depots
            .iter()
            .map(|d| {
                let mut seq = Vec::new();
                let mut route_ids: Vec<usize> = d
                    .vehicles()
                    .iter()
                    .flat_map(|&vid| self.vehicles[vid].routes().iter().copied())
                    .collect();
                route_ids.sort_by_key(|&rid| (self.routes[rid].vehicle_id(), self.routes[rid].slot()));
                for rid in route_ids {
                    let mut cursor = self.routes[rid].head();
                    while let Some(cid) = cursor {
                        seq.push(cid);
                        cursor = self.customers[cid].next();
                    }
                }
                seq
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::customer::TimeWindow;
    use proptest::prelude::*;

    fn basic_solution() -> Solution {
        let tw = TimeWindow::new(0.0, 1000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 100, 0.1, 10.0, true, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, 50, 1000.0, 1.0, 0.0, 0.0, 0.0, 1000.0, 5, 1.0, 0.0, 0.0);
        let c0 = CustomerNode::new(0, 3.0, 0.0, 5, 0.0);
        let c1 = CustomerNode::new(1, 3.0, 4.0, 5, 0.0);

        let mut sol = Solution::empty_of_size(1, 2);
        sol.push_depot(depot);
        sol.push_vehicle(vehicle);
        sol.push_customer(c0);
        sol.push_customer(c1);

        let mut data = vec![0.0; 3 * 3];
        let d = |i: usize, j: usize, v: f64| {
            data[i * 3 + j] = v;
        };
        d(0, 1, 3.0);
        d(1, 0, 3.0);
        d(0, 2, 5.0);
        d(2, 0, 5.0);
        d(1, 2, 4.0);
        d(2, 1, 4.0);
        sol.arcs = DistanceMatrix::from_data(1, 2, data).expect("square");
        sol
    }

    #[test]
    fn insert_then_remove_round_trips_aggregates() {
        let mut sol = basic_solution();
        let route = sol.add_route(0).expect("add_route");

        sol.insert_node(0, None, None, route).expect("insert c0");
        assert_eq!(sol.routes()[route].count(), 1);
        assert_eq!(sol.routes()[route].load(), 5);
        assert!((sol.routes()[route].length() - 6.0).abs() < 1e-9);

        sol.insert_node(1, Some(0), None, route).expect("insert c1");
        assert_eq!(sol.routes()[route].count(), 2);
        assert_eq!(sol.routes()[route].load(), 10);

        sol.remove_node(1).expect("remove c1");
        assert_eq!(sol.routes()[route].count(), 1);
        assert!((sol.routes()[route].length() - 6.0).abs() < 1e-9);
        assert!(sol.customers()[1].is_open());

        sol.remove_node(0).expect("remove c0");
        assert_eq!(sol.routes()[route].count(), 0);
        assert_eq!(sol.routes()[route].load(), 0);
        assert!((sol.routes()[route].length()).abs() < 1e-9);
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut sol = basic_solution();
        let route = sol.add_route(0).expect("add_route");
        sol.insert_node(0, None, None, route).expect("insert");
        assert!(sol.insert_node(0, None, None, route).is_err());
    }

    #[test]
    fn garbage_collect_drops_empty_routes_and_renumbers() {
        let mut sol = basic_solution();
        let r0 = sol.add_route(0).expect("r0");
        let r1 = sol.add_route(0).expect("r1");
        sol.insert_node(0, None, None, r1).expect("insert");
        assert_eq!(sol.routes().len(), 2);

        sol.postinsert().expect("postinsert");
        assert_eq!(sol.routes().len(), 1);
        assert_eq!(sol.routes()[0].count(), 1);
        assert_eq!(sol.customers()[0].route(), Some(0));
        let _ = r0;
    }

    #[test]
    fn vectorize_lists_customers_in_visit_order() {
        let mut sol = basic_solution();
        let route = sol.add_route(0).expect("add_route");
        sol.insert_node(0, None, None, route).expect("insert c0");
        sol.insert_node(1, Some(0), None, route).expect("insert c1");
        assert_eq!(sol.vectorize(), vec![vec![0, 1]]);
    }

    proptest! {
        #[test]
        fn insert_then_remove_is_exact_inverse(first_customer in 0usize..2) {
            let mut sol = basic_solution();
            let route = sol.add_route(0).expect("add_route");
            let (c_first, c_second) = if first_customer == 0 { (0, 1) } else { (1, 0) };

            sol.insert_node(c_first, None, None, route).expect("insert first");
            sol.insert_node(c_second, Some(c_first), None, route).expect("insert second");

            sol.remove_node(c_second).expect("remove second");
            sol.remove_node(c_first).expect("remove first");

            prop_assert_eq!(sol.routes()[route].count(), 0);
            prop_assert_eq!(sol.routes()[route].load(), 0);
            prop_assert!(sol.routes()[route].length().abs() < 1e-9);
            prop_assert!(sol.customers()[0].is_open());
            prop_assert!(sol.customers()[1].is_open());
            prop_assert_eq!(sol.vectorize(), vec![Vec::<usize>::new()]);
        }
    }
}
