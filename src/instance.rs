//! Instance loading (`build`, §6): reads `depot_nodes.csv`,
//! `customer_nodes.csv`, `vehicles.csv`, and `arcs.csv` from an instance
//! directory into a [`Graph`], the plain data the constructive builders
//! (`construct`) turn into an initial [`Solution`].
//!
//! Malformed rows surface as [`InstanceError`], never a panic — a bad CSV is
//! the caller's problem, not this crate's bug.

use std::path::Path;

use serde::Deserialize;

use crate::distance::{DistanceMatrix, NodeRef};
use crate::error::InstanceError;
use crate::model::customer::{CustomerNode, TimeWindow};
use crate::model::depot::DepotNode;
use crate::model::vehicle::VehicleNode;
use crate::model::Solution;

#[derive(Debug, Deserialize)]
struct DepotRow {
    id: usize,
    x: f64,
    y: f64,
    capacity: i32,
    cost_operational: f64,
    fixed_cost: f64,
    mandatory: bool,
    share_min: f64,
    share_max: f64,
    tw_ready: f64,
    tw_due: f64,
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
    tw_ready: Option<f64>,
    tw_due: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VehicleRow {
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
    count: usize,
}

/// Node kind tag used in `arcs.csv`'s `from_kind`/`to_kind` columns.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Kind {
    Depot,
    Customer,
}

#[derive(Debug, Deserialize)]
struct ArcRow {
    from_kind: Kind,
    from_id: usize,
    to_kind: Kind,
    to_id: usize,
    length: f64,
}

/// Parsed instance data: every depot, customer, and vehicle template, plus
/// the arc-length matrix over the unified node space. Still needs a
/// constructive builder (`construct::build`) to become a routed [`Solution`].
#[derive(Debug, Clone)]
pub struct Graph {
    pub depots: Vec<DepotNode>,
    pub customers: Vec<CustomerNode>,
    /// One [`VehicleNode`] template per (depot, type) pair; `construct`
    /// instantiates copies as it grows the fleet.
    pub vehicle_templates: Vec<VehicleNode>,
    pub arcs: DistanceMatrix,
}

fn read_csv<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, InstanceError> {
    let file = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut reader = csv::Reader::from_path(path).map_err(|e| InstanceError::MalformedRow {
        file: file.clone(),
        row: 0,
        reason: e.to_string(),
    })?;
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|e| InstanceError::MalformedRow {
            file: file.clone(),
            row: idx + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Loads the instance at `dir` into a [`Graph`]. `dir` must contain
/// `depot_nodes.csv`, `customer_nodes.csv`, `vehicles.csv`, and `arcs.csv`.
pub fn build(dir: &Path) -> Result<Graph, InstanceError> {
    if !dir.is_dir() {
        return Err(InstanceError::EmptyInstance(dir.display().to_string()));
    }

    let depot_rows: Vec<DepotRow> = read_csv(&dir.join("depot_nodes.csv"))?;
    let customer_rows: Vec<CustomerRow> = read_csv(&dir.join("customer_nodes.csv"))?;
    let vehicle_rows: Vec<VehicleRow> = read_csv(&dir.join("vehicles.csv"))?;
    let arc_rows: Vec<ArcRow> = read_csv(&dir.join("arcs.csv"))?;

    if depot_rows.is_empty() && customer_rows.is_empty() {
        return Err(InstanceError::EmptyInstance(dir.display().to_string()));
    }

    let depots: Vec<DepotNode> = depot_rows
        .iter()
        .map(|r| {
            let tw = TimeWindow::new(r.tw_ready, r.tw_due).ok_or_else(|| InstanceError::MalformedRow {
                file: "depot_nodes.csv".into(),
                row: r.id,
                reason: "tw_ready must be <= tw_due and both finite".into(),
            })?;
            Ok(DepotNode::new(
                r.id,
                r.x,
                r.y,
                r.capacity,
                r.cost_operational,
                r.fixed_cost,
                r.mandatory,
                r.share_min,
                r.share_max,
                tw,
            ))
        })
        .collect::<Result<_, InstanceError>>()?;

    let customers: Vec<CustomerNode> = customer_rows
        .iter()
        .map(|r| {
            let base = CustomerNode::new(r.id, r.x, r.y, r.demand, r.service_duration);
            match (r.tw_ready, r.tw_due) {
                (Some(ready), Some(due)) => {
                    let tw = TimeWindow::new(ready, due).ok_or_else(|| InstanceError::MalformedRow {
                        file: "customer_nodes.csv".into(),
                        row: r.id,
                        reason: "tw_ready must be <= tw_due and both finite".into(),
                    })?;
                    Ok(base.with_time_window(tw))
                }
                (None, None) => Ok(base),
                _ => Err(InstanceError::MalformedRow {
                    file: "customer_nodes.csv".into(),
                    row: r.id,
                    reason: "tw_ready and tw_due must both be present or both absent".into(),
                }),
            }
        })
        .collect::<Result<_, InstanceError>>()?;

    let mut vehicle_templates = Vec::new();
    let mut next_id = 0usize;
    for r in &vehicle_rows {
        if r.depot_id >= depots.len() {
            return Err(InstanceError::MalformedRow {
                file: "vehicles.csv".into(),
                row: r.depot_id,
                reason: format!("depot_id {} has no matching depot_nodes.csv row", r.depot_id),
            });
        }
        for _ in 0..r.count {
            vehicle_templates.push(VehicleNode::new(
                next_id,
                r.depot_id,
                r.type_id,
                r.capacity,
                r.range,
                r.speed,
                r.refuel_time_per_unit,
                r.load_time_per_unit,
                r.service_overhead,
                r.max_working_duration,
                r.max_routes,
                r.cost_per_distance,
                r.cost_per_time,
                r.fixed_cost,
            ));
            next_id += 1;
        }
    }

    let num_depots = depots.len();
    let num_customers = customers.len();
    let mut arcs = DistanceMatrix::new(num_depots, num_customers);
    let expected = (num_depots + num_customers) * (num_depots + num_customers);
    if arc_rows.len() > expected {
        return Err(InstanceError::InconsistentArcs {
            expected,
            found: arc_rows.len(),
        });
    }
    for row in &arc_rows {
        let from = match row.from_kind {
            Kind::Depot => NodeRef::Depot(row.from_id),
            Kind::Customer => NodeRef::Customer(row.from_id),
        };
        let to = match row.to_kind {
            Kind::Depot => NodeRef::Depot(row.to_id),
            Kind::Customer => NodeRef::Customer(row.to_id),
        };
        arcs.set(from, to, row.length);
    }

    Ok(Graph {
        depots,
        customers,
        vehicle_templates,
        arcs,
    })
}

impl Graph {
    /// Builds an empty-routed [`Solution`] shell: every depot, customer, and
    /// vehicle present but no customer placed yet. `construct::build` fills
    /// in routes from here.
    pub fn into_solution(self) -> Solution {
        let mut by_depot: Vec<Vec<usize>> = vec![Vec::new(); self.depots.len()];
        for v in &self.vehicle_templates {
            by_depot[v.depot_id()].push(v.id());
        }

        let mut depots = self.depots;
        for (depot_id, vehicle_ids) in by_depot.into_iter().enumerate() {
            depots[depot_id].set_vehicle_ids(vehicle_ids);
        }

        Solution::new(depots, self.customers, self.vehicle_templates, Vec::new(), self.arcs, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = std::fs::File::create(dir.join(name)).expect("create");
        f.write_all(contents.as_bytes()).expect("write");
    }

    fn tiny_instance_dir() -> tempfile_like::TempDir {
        let dir = tempfile_like::TempDir::new();
        write_file(
            dir.path(),
            "depot_nodes.csv",
            "id,x,y,capacity,cost_operational,fixed_cost,mandatory,share_min,share_max,tw_ready,tw_due\n\
             0,0.0,0.0,100,0.1,10.0,false,0.0,1.0,0.0,1000.0\n",
        );
        write_file(
            dir.path(),
            "customer_nodes.csv",
            "id,x,y,demand,service_duration,tw_ready,tw_due\n\
             0,1.0,0.0,5,0.0,,\n\
             1,2.0,0.0,5,0.0,,\n",
        );
        write_file(
            dir.path(),
            "vehicles.csv",
            "depot_id,type_id,capacity,range,speed,refuel_time_per_unit,load_time_per_unit,service_overhead,max_working_duration,max_routes,cost_per_distance,cost_per_time,fixed_cost,count\n\
             0,0,50,1000.0,1.0,0.0,0.0,0.0,1000.0,5,1.0,0.0,0.0,2\n",
        );
        write_file(
            dir.path(),
            "arcs.csv",
            "from_kind,from_id,to_kind,to_id,length\n\
             depot,0,customer,0,1.0\n\
             customer,0,depot,0,1.0\n\
             depot,0,customer,1,2.0\n\
             customer,1,depot,0,2.0\n\
             customer,0,customer,1,1.0\n\
             customer,1,customer,0,1.0\n",
        );
        dir
    }

    #[test]
    fn build_loads_every_row() {
        let dir = tiny_instance_dir();
        let graph = build(dir.path()).expect("build");
        assert_eq!(graph.depots.len(), 1);
        assert_eq!(graph.customers.len(), 2);
        assert_eq!(graph.vehicle_templates.len(), 2);
    }

    #[test]
    fn into_solution_wires_vehicles_to_their_depot() {
        let dir = tiny_instance_dir();
        let graph = build(dir.path()).expect("build");
        let solution = graph.into_solution();
        assert_eq!(solution.depots()[0].vehicles().len(), 2);
        assert_eq!(solution.customers().len(), 2);
    }

    #[test]
    fn missing_directory_is_an_instance_error() {
        let err = build(Path::new("/nonexistent/instance/dir")).unwrap_err();
        assert!(matches!(err, InstanceError::EmptyInstance(_)));
    }

    /// Minimal drop-cleanup temp-dir helper so tests don't depend on an
    /// extra dev-dependency just for this module.
    mod tempfile_like {
        use std::path::{Path, PathBuf};

        pub struct TempDir(PathBuf);

        impl TempDir {
            pub fn new() -> Self {
                let mut dir = std::env::temp_dir();
                let unique = format!("lrp-alns-instance-test-{:?}", std::thread::current().id());
                dir.push(unique);
                std::fs::create_dir_all(&dir).expect("create temp dir");
                Self(dir)
            }

            pub fn path(&self) -> &Path {
                &self.0
            }
        }

        impl Drop for TempDir {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.0);
            }
        }
    }
}
