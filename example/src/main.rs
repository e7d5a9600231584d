// Solve one target for a preset arm and print every configuration slot.
//
// Usage: ik_demo [MODEL] [X Y Z [RX RY RZ]]
//
// Position in millimeters, orientation as roll/pitch/yaw in degrees.
// Without arguments the IRB 2400 is asked to reach forward with the tool
// pointing straight down. Set RUST_LOG=debug to see the solver trace.

use std::env;
use std::process::ExitCode;

use arm_ik::{ArmKinematics, Cfx, JointAngles, RobotConfig, RobotModel, SolverConfig};
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use tracing::{error, info};

const DEFAULT_TARGET: [f64; 6] = [1100.0, 150.0, 700.0, 180.0, 0.0, 0.0];

fn parse_target(args: &[String]) -> Result<Isometry3<f64>, String> {
    let mut values = DEFAULT_TARGET;
    if !args.is_empty() && args.len() != 3 && args.len() != 6 {
        return Err(format!("expected 3 or 6 numbers, got {}", args.len()));
    }
    for (slot, arg) in values.iter_mut().zip(args.iter()) {
        *slot = arg.parse::<f64>().map_err(|e| format!("{}: {}", arg, e))?;
    }

    let [x, y, z, rx, ry, rz] = values;
    Ok(Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_euler_angles(rx.to_radians(), ry.to_radians(), rz.to_radians()),
    ))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (model, rest) = match args.first().map(|s| s.parse::<RobotModel>()) {
        Some(Ok(model)) => (model, &args[1..]),
        // First argument is a coordinate, keep the default arm
        Some(Err(_)) if args[0].parse::<f64>().is_ok() => (RobotModel::default(), &args[..]),
        Some(Err(e)) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
        None => (RobotModel::default(), &args[..]),
    };

    let target = match parse_target(rest) {
        Ok(target) => target,
        Err(e) => {
            error!("Bad target: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let geometry = RobotConfig::from_model(model).link_geometry();
    let kinematics = match ArmKinematics::new(&geometry, SolverConfig::default()) {
        Ok(kinematics) => kinematics,
        Err(e) => {
            error!("Failed to set up {}: {}", model.display_name(), e);
            return ExitCode::FAILURE;
        }
    };
    info!("Solving for {}", model.display_name());

    let report = match kinematics.compute(&target) {
        Ok(report) => report,
        Err(e) => {
            error!("Solve failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let t = target.translation.vector;
    println!("Target ({:.1}, {:.1}, {:.1}) mm: {} candidates\n", t.x, t.y, t.z, report.count);
    if report.count == 0 {
        println!("Target is out of reach.");
        return ExitCode::SUCCESS;
    }

    for cfx in Cfx::all() {
        match report.slot(cfx) {
            Some(joints) => {
                let a = JointAngles::from(*joints);
                println!(
                    "Cfx {} [{:8.2} {:8.2} {:8.2} {:8.2} {:8.2} {:8.2}] {:?}",
                    cfx, a.j1, a.j2, a.j3, a.j4, a.j5, a.j6,
                    report.kind(cfx)
                );
            }
            None => println!("Cfx {} -", cfx),
        }
    }
    ExitCode::SUCCESS
}
