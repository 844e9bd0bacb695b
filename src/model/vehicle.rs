//! Vehicles: the fleet owned by a depot.

/// A vehicle type instance, owning an ordered list of [`Route`](super::route::Route)
/// slots at a single depot.
#[derive(Debug, Clone)]
pub struct VehicleNode {
    id: usize,
    depot_id: usize,
    type_id: usize,
    capacity: i32,
    range: f64,
    speed: f64,
    refuel_time_per_unit: f64,
    load_time_per_unit: f64,
    service_overhead: f64,
    max_working_duration: f64,
    max_routes: usize,
    cost_per_distance: f64,
    cost_per_time: f64,
    fixed_cost: f64,

    routes: Vec<usize>,

    // Cached aggregates.
    count: usize,
    load: i32,
    length: f64,
    t_start: f64,
    t_end: f64,
    slack: f64,
}

impl VehicleNode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        depot_id: usize,
        type_id: usize,
        capacity: i32,
        range: f64,
        speed: f64,
        refuel_time_per_unit: f64,
        load_time_per_unit: f64,
        service_overhead: f64,
        max_working_duration: f64,
        max_routes: usize,
        cost_per_distance: f64,
        cost_per_time: f64,
        fixed_cost: f64,
    ) -> Self {
        Self {
            id,
            depot_id,
            type_id,
            capacity,
            range,
            speed,
            refuel_time_per_unit,
            load_time_per_unit,
            service_overhead,
            max_working_duration,
            max_routes,
            cost_per_distance,
            cost_per_time,
            fixed_cost,
            routes: Vec::new(),
            count: 0,
            load: 0,
            length: 0.0,
            t_start: 0.0,
            t_end: 0.0,
            slack: f64::INFINITY,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn depot_id(&self) -> usize {
        self.depot_id
    }

    pub fn type_id(&self) -> usize {
        self.type_id
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn refuel_time_per_unit(&self) -> f64 {
        self.refuel_time_per_unit
    }

    pub fn load_time_per_unit(&self) -> f64 {
        self.load_time_per_unit
    }

    pub fn service_overhead(&self) -> f64 {
        self.service_overhead
    }

    pub fn max_working_duration(&self) -> f64 {
        self.max_working_duration
    }

    pub fn max_routes(&self) -> usize {
        self.max_routes
    }

    pub fn cost_per_distance(&self) -> f64 {
        self.cost_per_distance
    }

    pub fn cost_per_time(&self) -> f64 {
        self.cost_per_time
    }

    pub fn fixed_cost(&self) -> f64 {
        self.fixed_cost
    }

    pub fn routes(&self) -> &[usize] {
        &self.routes
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn load(&self) -> i32 {
        self.load
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn working_duration(&self) -> f64 {
        self.t_end - self.t_start
    }

    pub fn slack(&self) -> f64 {
        self.slack
    }

    /// `true` iff at least one owned route currently serves a customer.
    pub fn is_operational(&self) -> bool {
        self.count > 0
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub(crate) fn push_route(&mut self, route: usize) {
        self.routes.push(route);
    }

    pub(crate) fn set_routes(&mut self, routes: Vec<usize>) {
        self.routes = routes;
    }

    pub(crate) fn adjust_aggregates(&mut self, d_count: isize, d_load: i32, d_length: f64) {
        self.count = (self.count as isize + d_count).max(0) as usize;
        self.load += d_load;
        self.length += d_length;
    }

    pub(crate) fn set_times(&mut self, start: f64, end: f64) {
        self.t_start = start;
        self.t_end = end;
    }

    pub(crate) fn set_slack(&mut self, slack: f64) {
        self.slack = slack;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VehicleNode {
        VehicleNode::new(0, 0, 0, 200, 500.0, 40.0, 1.0, 0.1, 5.0, 480.0, 3, 1.0, 0.2, 50.0)
    }

    #[test]
    fn fresh_vehicle_has_no_routes_and_is_not_operational() {
        let v = sample();
        assert!(v.routes().is_empty());
        assert!(!v.is_operational());
    }

    #[test]
    fn push_route_and_adjust_aggregates() {
        let mut v = sample();
        v.push_route(7);
        assert_eq!(v.routes(), &[7]);
        v.adjust_aggregates(1, 20, 15.0);
        assert!(v.is_operational());
        assert_eq!(v.load(), 20);
    }
}
