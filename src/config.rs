//! ALNS run configuration (§4.7, §6 "Parameters record").
//!
//! `AlnsParams` is plain data — `serde`-round-trippable like the teacher's
//! domain structs — plus a [`validate`](AlnsParams::validate) gate so a
//! malformed config surfaces as a [`ConfigError`] before the driver ever
//! touches a `Solution`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluation::EvalWeights;

/// Reward given to both operators in a (destroy, repair) pair on acceptance,
/// scaled by how good the outcome was (§4.7: `σ₁ > σ₂ > σ₃`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// New global best.
    pub new_best: f64,
    /// Improves on current, or is a new-unseen equal/better solution.
    pub improved: f64,
    /// Worse than current but accepted by simulated annealing, and unseen.
    pub accepted: f64,
}

impl Default for Scores {
    fn default() -> Self {
        Self {
            new_best: 33.0,
            improved: 9.0,
            accepted: 1.0,
        }
    }
}

/// Simulated-annealing schedule: `T₀ = ω·z⋆ / ln(1/τ)`, floor `T_min` from
/// `ω̲, τ̲` the same way, cooling `T ← max(T·θ, T_min)` each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingSchedule {
    pub omega_start: f64,
    pub tau_start: f64,
    pub omega_floor: f64,
    pub tau_floor: f64,
    pub cooling: f64,
}

impl Default for AnnealingSchedule {
    fn default() -> Self {
        Self {
            omega_start: 0.05,
            tau_start: 0.5,
            omega_floor: 0.0,
            tau_floor: 0.5,
            cooling: 0.9997,
        }
    }
}

impl AnnealingSchedule {
    pub(crate) fn initial_temperature(&self, z_star: f64) -> f64 {
        self.omega_start * z_star / (1.0 / self.tau_start).ln()
    }

    pub(crate) fn floor_temperature(&self, z_star: f64) -> f64 {
        if self.omega_floor <= 0.0 {
            return 0.0;
        }
        self.omega_floor * z_star / (1.0 / self.tau_floor).ln()
    }
}

/// Bounds on the destroy size `q` drawn each iteration (§4.7): `q =
/// ⌊(1−η)·min(C̲,μ̲|C|) + η·min(C̅,μ̅|C|)⌋`, `η ~ U(0,1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DestroySizeBounds {
    pub min_count: usize,
    pub max_count: usize,
    pub min_fraction: f64,
    pub max_fraction: f64,
}

impl Default for DestroySizeBounds {
    fn default() -> Self {
        Self {
            min_count: 2,
            max_count: 60,
            min_fraction: 0.05,
            max_fraction: 0.4,
        }
    }
}

/// The full parameter record an ALNS run needs (§4.7, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlnsParams {
    /// Total iterations `k̅`.
    pub iterations: usize,
    /// Segment size `k̲`: operator weights update every this-many iterations.
    pub segment_size: usize,
    /// Local-search cadence `l̲`: run local search every this-many iterations.
    pub local_search_cadence: usize,
    /// Local-search budget `l̅`: attempts per operator per cadence tick.
    pub local_search_budget: usize,

    /// Destroy operator identifiers (`Ψᵣ`), e.g. `"node_random"`.
    pub destroy_catalog: Vec<String>,
    /// Repair operator identifiers (`Ψᵢ`), e.g. `"regret3"`.
    pub repair_catalog: Vec<String>,
    /// Local-search operator identifiers (`Ψₗ`), e.g. `"intra_opt"`.
    pub local_search_catalog: Vec<String>,

    pub scores: Scores,
    pub annealing: AnnealingSchedule,
    pub destroy_size: DestroySizeBounds,
    /// Reaction factor `ρ` for the segment weight update.
    pub reaction_factor: f64,
    /// Weight floor so no operator becomes permanently unselectable.
    pub weight_floor: f64,

    pub eval_weights: EvalWeights,
}

impl Default for AlnsParams {
    fn default() -> Self {
        Self {
            iterations: 1000,
            segment_size: 100,
            local_search_cadence: 100,
            local_search_budget: 200,
            destroy_catalog: vec![
                "node_random".into(),
                "node_related".into(),
                "node_worst".into(),
                "route_random".into(),
                "route_related".into(),
                "route_worst".into(),
                "vehicle_random".into(),
                "vehicle_related".into(),
                "vehicle_worst".into(),
                "depot_random".into(),
                "depot_related".into(),
                "depot_worst".into(),
            ],
            repair_catalog: vec!["best".into(), "greedy".into(), "regret2".into(), "regret3".into()],
            local_search_catalog: vec![
                "move".into(),
                "intra_opt".into(),
                "inter_opt".into(),
                "split".into(),
                "swap_customers".into(),
                "swap_depots".into(),
            ],
            scores: Scores::default(),
            annealing: AnnealingSchedule::default(),
            destroy_size: DestroySizeBounds::default(),
            reaction_factor: 0.1,
            weight_floor: 1e-3,
            eval_weights: EvalWeights::default(),
        }
    }
}

impl AlnsParams {
    /// Checks every domain constraint from §6: `0 < θ < 1`, `0 < μ̲ ≤ μ̅ ≤ 1`,
    /// `0 ≤ ρ ≤ 1`, every `σᵢ ≥ 0`, non-empty catalogs, and that
    /// `segment_size`/`local_search_cadence` are nonzero (both gate a modulo
    /// in the driver).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_open_unit = |name: &'static str, v: f64| -> Result<(), ConfigError> {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfDomain {
                    name,
                    value: v,
                    constraint: "0 < x < 1",
                })
            }
        };
        in_open_unit("annealing.cooling", self.annealing.cooling)?;

        if !(0.0 < self.destroy_size.min_fraction
            && self.destroy_size.min_fraction <= self.destroy_size.max_fraction
            && self.destroy_size.max_fraction <= 1.0)
        {
            return Err(ConfigError::OutOfDomain {
                name: "destroy_size.min_fraction/max_fraction",
                value: self.destroy_size.min_fraction,
                constraint: "0 < min_fraction <= max_fraction <= 1",
            });
        }

        if !(0.0..=1.0).contains(&self.reaction_factor) {
            return Err(ConfigError::OutOfDomain {
                name: "reaction_factor",
                value: self.reaction_factor,
                constraint: "0 <= rho <= 1",
            });
        }

        for (name, value) in [
            ("scores.new_best", self.scores.new_best),
            ("scores.improved", self.scores.improved),
            ("scores.accepted", self.scores.accepted),
        ] {
            if value < 0.0 {
                return Err(ConfigError::OutOfDomain {
                    name,
                    value,
                    constraint: "sigma >= 0",
                });
            }
        }

        if self.destroy_catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog("destroy"));
        }
        if self.repair_catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog("repair"));
        }
        if self.iterations == 0 {
            return Err(ConfigError::OutOfDomain {
                name: "iterations",
                value: 0.0,
                constraint: "iterations > 0",
            });
        }
        if self.segment_size == 0 {
            return Err(ConfigError::OutOfDomain {
                name: "segment_size",
                value: 0.0,
                constraint: "segment_size > 0",
            });
        }
        if self.local_search_cadence == 0 {
            return Err(ConfigError::OutOfDomain {
                name: "local_search_cadence",
                value: 0.0,
                constraint: "local_search_cadence > 0",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(AlnsParams::default().validate().is_ok());
    }

    #[test]
    fn empty_destroy_catalog_is_rejected() {
        let mut p = AlnsParams::default();
        p.destroy_catalog.clear();
        assert_eq!(p.validate(), Err(ConfigError::EmptyCatalog("destroy")));
    }

    #[test]
    fn cooling_out_of_unit_interval_is_rejected() {
        let mut p = AlnsParams::default();
        p.annealing.cooling = 1.5;
        assert!(p.validate().is_err());
    }

    #[test]
    fn zero_local_search_cadence_is_rejected() {
        let mut p = AlnsParams::default();
        p.local_search_cadence = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn json_round_trip_preserves_params() {
        let p = AlnsParams::default();
        let json = serde_json::to_string(&p).expect("serialize");
        let back: AlnsParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(p, back);
    }
}
