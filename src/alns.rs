//! The ALNS driver (C8): ties [`construct`], [`destroy`], [`repair`], and
//! [`local_search`] together under simulated-annealing acceptance and
//! segment-based adaptive operator weighting.
//!
//! Each iteration works on a full deep copy of the current solution — the
//! arena's `usize` indices make an undo-log attractive, but destroy/repair
//! routinely touch dozens of routes per iteration, and a wrong partial
//! revert would corrupt the cached aggregates silently. Cloning `Solution`
//! is O(n) and n here is small enough that this is never the bottleneck.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::config::AlnsParams;
use crate::destroy::{self, DestroyOp};
use crate::error::RoutingError;
use crate::evaluation::evaluate;
use crate::local_search::{self, LocalSearchOp};
use crate::model::Solution;
use crate::repair::{self, RepairOp};

/// Per-operator adaptive weight bookkeeping for one catalog.
struct Weights {
    ids: Vec<String>,
    w: Vec<f64>,
    score: Vec<f64>,
    uses: Vec<usize>,
    floor: f64,
}

impl Weights {
    fn new(ids: Vec<String>, floor: f64) -> Self {
        let n = ids.len();
        Self {
            ids,
            w: vec![1.0; n],
            score: vec![0.0; n],
            uses: vec![0; n],
            floor,
        }
    }

    /// Samples an index with probability proportional to its weight.
    fn sample(&self, rng: &mut StdRng) -> usize {
        let total: f64 = self.w.iter().sum();
        let mut pick = rng.random_range(0.0..total);
        for (i, &w) in self.w.iter().enumerate() {
            if pick < w {
                return i;
            }
            pick -= w;
        }
        self.w.len() - 1
    }

    fn reward(&mut self, idx: usize, sigma: f64) {
        self.score[idx] += sigma;
        self.uses[idx] += 1;
    }

    /// Segment-boundary update: `w ← ρ·(score/uses) + (1−ρ)·w`, floored so no
    /// operator becomes permanently unselectable, then resets the segment
    /// tally.
    fn react(&mut self, rho: f64) {
        for i in 0..self.w.len() {
            let pi = if self.uses[i] > 0 {
                self.score[i] / self.uses[i] as f64
            } else {
                0.0
            };
            self.w[i] = (rho * pi + (1.0 - rho) * self.w[i]).max(self.floor);
            self.score[i] = 0.0;
            self.uses[i] = 0;
        }
    }
}

/// Outcome of a finished run: the best solution found and the sequence of
/// best-seen objective values, one per iteration, for diagnostics.
pub struct AlnsResult {
    pub best: Solution,
    pub best_objective: f64,
    pub history: Vec<f64>,
}

/// Runs the full ALNS loop from `initial` for `params.iterations` iterations.
#[instrument(skip(rng, initial, params))]
pub fn run(rng: &mut StdRng, initial: Solution, params: &AlnsParams) -> Result<AlnsResult, RoutingError> {
    params.validate()?;

    let destroy_ids: Vec<DestroyOp> = params
        .destroy_catalog
        .iter()
        .map(|s| DestroyOp::parse(s))
        .collect::<Result<_, _>>()?;
    let repair_ids: Vec<RepairOp> = params
        .repair_catalog
        .iter()
        .map(|s| RepairOp::parse(s))
        .collect::<Result<_, _>>()?;
    let ls_ids: Vec<LocalSearchOp> = params
        .local_search_catalog
        .iter()
        .map(|s| LocalSearchOp::parse(s))
        .collect::<Result<_, _>>()?;

    let mut destroy_w = Weights::new(params.destroy_catalog.clone(), params.weight_floor);
    let mut repair_w = Weights::new(params.repair_catalog.clone(), params.weight_floor);

    let mut current = initial;
    let mut current_z = evaluate(&current, &params.eval_weights);

    let mut best = current.clone();
    let mut best_z = current_z;

    let mut seen: std::collections::HashSet<Vec<Vec<usize>>> = std::collections::HashSet::new();
    seen.insert(current.vectorize());

    let mut temperature = params.annealing.initial_temperature(best_z.max(1.0));
    let floor_temperature = params.annealing.floor_temperature(best_z.max(1.0));

    let num_customers = current.customers().len();
    let mut history = Vec::with_capacity(params.iterations);

    for iter in 0..params.iterations {
        let eta: f64 = rng.random_range(0.0..1.0);
        let lower = (params.destroy_size.min_count as f64).min(params.destroy_size.min_fraction * num_customers as f64);
        let upper = (params.destroy_size.max_count as f64).min(params.destroy_size.max_fraction * num_customers as f64);
        let q = (((1.0 - eta) * lower + eta * upper).floor() as usize).max(1);

        let mut candidate = current.clone();
        let d_idx = destroy_w.sample(rng);
        let r_idx = repair_w.sample(rng);

        destroy::apply(destroy_ids[d_idx], rng, q, &mut candidate)?;
        repair::apply(repair_ids[r_idx], rng, &mut candidate, &params.eval_weights, true)?;

        let candidate_z = evaluate(&candidate, &params.eval_weights);
        let fingerprint = candidate.vectorize();
        let is_new = seen.insert(fingerprint);

        let accept = candidate_z < current_z || {
            let delta = candidate_z - current_z;
            let threshold = (-delta / temperature.max(1e-12)).exp();
            rng.random_range(0.0..1.0) < threshold
        };

        let sigma = if is_new && candidate_z < best_z {
            debug!(iter, candidate_z, "new best");
            best = candidate.clone();
            best_z = candidate_z;
            params.scores.new_best
        } else if is_new && candidate_z < current_z {
            params.scores.improved
        } else if is_new && accept {
            params.scores.accepted
        } else {
            0.0
        };

        if accept {
            current = candidate;
            current_z = candidate_z;
        }

        destroy_w.reward(d_idx, sigma);
        repair_w.reward(r_idx, sigma);

        if (iter + 1) % params.segment_size == 0 {
            destroy_w.react(params.reaction_factor);
            repair_w.react(params.reaction_factor);
            debug!(iter, "operator weights updated");
        }

        if (iter + 1) % params.local_search_cadence == 0 {
            for &op in &ls_ids {
                local_search::apply(op, rng, &mut current, params.local_search_budget, &params.eval_weights)?;
            }
            current_z = evaluate(&current, &params.eval_weights);
            if current_z < best_z {
                best = current.clone();
                best_z = current_z;
            }
        }

        temperature = (temperature * params.annealing.cooling).max(floor_temperature);
        history.push(best_z);
    }

    info!(best_z, iterations = params.iterations, "alns run finished");
    Ok(AlnsResult {
        best,
        best_objective: best_z,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::customer::{CustomerNode, TimeWindow};
    use crate::model::depot::DepotNode;
    use crate::model::vehicle::VehicleNode;
    use crate::DistanceMatrix;
    use rand::SeedableRng;

    fn small_solution() -> Solution {
        let tw = TimeWindow::new(0.0, 10_000.0).expect("valid");
        let depot = DepotNode::new(0, 0.0, 0.0, 1000, 0.1, 10.0, false, 0.0, 1.0, tw);
        let vehicle = VehicleNode::new(0, 0, 0, 1000, 10_000.0, 1.0, 0.0, 0.0, 0.0, 10_000.0, 10, 1.0, 0.0, 0.0);
        let n = 9;
        let mut data = vec![0.0; n * n];
        for a in 0..n {
            for b in 0..n {
                let xa = if a == 0 { 0.0 } else { (a - 1) as f64 };
                let xb = if b == 0 { 0.0 } else { (b - 1) as f64 };
                data[a * n + b] = (xa - xb).abs();
            }
        }
        let arcs = DistanceMatrix::from_data(1, 8, data).expect("square");
        let mut s = Solution::new(vec![depot], Vec::new(), vec![vehicle], Vec::new(), arcs, false);
        for i in 0..8 {
            s.push_customer(CustomerNode::new(i, i as f64, 0.0, 1, 0.0));
        }
        s
    }

    fn tiny_params() -> AlnsParams {
        let mut p = AlnsParams::default();
        p.iterations = 20;
        p.segment_size = 5;
        p.local_search_cadence = 10;
        p.local_search_budget = 5;
        p.destroy_size.min_count = 1;
        p.destroy_size.max_count = 3;
        p
    }

    #[test]
    fn run_never_leaves_customers_unplaced_given_feasible_capacity() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut initial = small_solution();
        repair::greedy(&mut rng, &mut initial, &tiny_params().eval_weights, false).expect("initial repair");
        let result = run(&mut rng, initial, &tiny_params()).expect("run");
        assert_eq!(result.best.open_customers().count(), 0);
    }

    #[test]
    fn run_never_worsens_the_best_objective_across_iterations() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut initial = small_solution();
        let params = tiny_params();
        repair::greedy(&mut rng, &mut initial, &params.eval_weights, false).expect("initial repair");
        let start_z = evaluate(&initial, &params.eval_weights);
        let result = run(&mut rng, initial, &params).expect("run");
        assert!(result.best_objective <= start_z + 1e-6);
    }

    #[test]
    fn invalid_params_are_rejected_before_any_iteration_runs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut params = tiny_params();
        params.destroy_catalog.clear();
        let err = run(&mut rng, small_solution(), &params).unwrap_err();
        assert!(matches!(err, RoutingError::Config(_)));
    }
}
