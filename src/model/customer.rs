//! Customer nodes and their time-window constraint.

use serde::{Deserialize, Serialize};

/// A delivery time window `[ready, due]` at a customer.
///
/// The vehicle may arrive early (and wait), but arriving after `due` is a
/// constraint violation priced by the evaluator rather than rejected
/// outright (spec §4.2, §7).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window. Returns `None` if `ready > due` or either
    /// bound is non-finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || !due.is_finite() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    pub fn ready(&self) -> f64 {
        self.ready
    }

    pub fn due(&self) -> f64 {
        self.due
    }

    /// `true` if `time` falls within `[ready, due]`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// Waiting time incurred by arriving at `arrival` (zero if not early).
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.ready - arrival).max(0.0)
    }

    /// `true` if arriving at `arrival` violates `due`.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }
}

/// A customer node in the routing graph.
///
/// Beyond the static attributes (coordinates, demand, service duration, time
/// window), a `CustomerNode` carries the *live* cached fields that
/// [`insert_node`](crate::model::solution::Solution::insert_node) and
/// [`remove_node`](crate::model::solution::Solution::remove_node) maintain:
/// the owning route, the previous/next customer in that route's intrusive
/// list, and the arrival/departure times. A customer is *open* iff
/// `route().is_none()`.
#[derive(Debug, Clone)]
pub struct CustomerNode {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
    time_window: Option<TimeWindow>,

    // Live fields maintained exclusively by Solution's mutators.
    route: Option<usize>,
    depot: Option<usize>,
    vehicle: Option<usize>,
    prev: Option<usize>,
    next: Option<usize>,
    arrival: f64,
    departure: f64,
}

impl CustomerNode {
    pub fn new(id: usize, x: f64, y: f64, demand: i32, service_duration: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration,
            time_window: None,
            route: None,
            depot: None,
            vehicle: None,
            prev: None,
            next: None,
            arrival: f64::INFINITY,
            departure: f64::INFINITY,
        }
    }

    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn demand(&self) -> i32 {
        self.demand
    }

    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Euclidean distance to another node's coordinates.
    pub fn distance_to(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// `true` iff this customer is not currently assigned to any route.
    pub fn is_open(&self) -> bool {
        self.route.is_none()
    }

    pub fn route(&self) -> Option<usize> {
        self.route
    }

    pub fn depot(&self) -> Option<usize> {
        self.depot
    }

    pub fn vehicle(&self) -> Option<usize> {
        self.vehicle
    }

    pub fn prev(&self) -> Option<usize> {
        self.prev
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn arrival(&self) -> f64 {
        self.arrival
    }

    pub fn departure(&self) -> f64 {
        self.departure
    }

    pub(crate) fn set_route(&mut self, route: Option<usize>) {
        self.route = route;
    }

    pub(crate) fn set_depot(&mut self, depot: Option<usize>) {
        self.depot = depot;
    }

    pub(crate) fn set_vehicle(&mut self, vehicle: Option<usize>) {
        self.vehicle = vehicle;
    }

    pub(crate) fn set_prev(&mut self, prev: Option<usize>) {
        self.prev = prev;
    }

    pub(crate) fn set_next(&mut self, next: Option<usize>) {
        self.next = next;
    }

    pub(crate) fn set_times(&mut self, arrival: f64, departure: f64) {
        self.arrival = arrival;
        self.departure = departure;
    }

    /// Resets the live fields to the open-customer sentinel state.
    pub(crate) fn clear_live(&mut self) {
        self.route = None;
        self.depot = None;
        self.vehicle = None;
        self.prev = None;
        self.next = None;
        self.arrival = f64::INFINITY;
        self.departure = f64::INFINITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_window_rejects_inverted_or_nonfinite() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn time_window_waiting_and_violation() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!((tw.waiting_time(5.0) - 5.0).abs() < 1e-12);
        assert_eq!(tw.waiting_time(15.0), 0.0);
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.1));
    }

    #[test]
    fn fresh_customer_is_open_with_infinite_times() {
        let c = CustomerNode::new(1, 0.0, 0.0, 5, 1.0);
        assert!(c.is_open());
        assert_eq!(c.arrival(), f64::INFINITY);
        assert_eq!(c.departure(), f64::INFINITY);
        assert!(c.route().is_none());
    }

    #[test]
    fn distance_to_is_euclidean() {
        let a = CustomerNode::new(0, 0.0, 0.0, 0, 0.0);
        assert!((a.distance_to(3.0, 4.0) - 5.0).abs() < 1e-12);
    }
}
