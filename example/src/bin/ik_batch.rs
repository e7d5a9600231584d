// Batch solver: reads a JSON job and writes one report per target as JSON.
//
// Usage: ik_batch JOB.json
//
// {
//   "model": "Irb1660Id",
//   "config": { "singularity_tolerance": 0.0005 },
//   "targets": [
//     { "origin": [900, 250, 600], "x_axis": [1, 0, 0], "y_axis": [0, -1, 0] }
//   ]
// }

use std::env;
use std::error::Error;
use std::fs;

use arm_ik::{ArmKinematics, IkReport, Plane, RobotConfig, RobotModel, SolverConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Deserialize, Debug)]
struct Job {
    #[serde(default)]
    model: RobotModel,
    #[serde(default)]
    config: SolverConfig,
    targets: Vec<Plane>,
}

#[derive(Serialize, Debug)]
struct Outcome {
    target: Plane,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<IkReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let path = env::args().nth(1).ok_or("usage: ik_batch JOB.json")?;
    let job: Job = serde_json::from_str(&fs::read_to_string(&path)?)?;
    info!(model = %job.model, targets = job.targets.len(), "Loaded job from {}", path);

    let geometry = RobotConfig::from_model(job.model).link_geometry();
    let kinematics = ArmKinematics::new(&geometry, job.config)?;

    let outcomes: Vec<Outcome> = job
        .targets
        .into_iter()
        .map(|target| match kinematics.compute_plane(&target) {
            Ok(report) => Outcome {
                target,
                report: Some(report),
                error: None,
            },
            Err(e) => {
                // A bad plane only spoils its own entry
                warn!("Target {:?} rejected: {}", target.origin, e);
                Outcome {
                    target,
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
