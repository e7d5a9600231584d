/// Reports cross to host layers as JSON or bincode
use arm_ik::{
    ArmKinematics, Cfx, IkError, IkReport, JointAngles, OpwParameters, RobotConfig, SingularityKind,
    SolverConfig,
};

fn sample_report() -> IkReport {
    let geometry = RobotConfig::irb2400_10().link_geometry();
    let kinematics = ArmKinematics::new(&geometry, SolverConfig::default()).unwrap();
    // J5 at zero: every slot is wrist-singular
    let target = kinematics.tcp_pose(&[0.3, 0.2, -0.4, 0.5, 0.0, -0.6]);
    kinematics.compute(&target).unwrap()
}

#[test]
fn test_report_json_roundtrip() {
    let report = sample_report();
    let json = serde_json::to_string_pretty(&report).unwrap();
    println!("{}", json);

    let back: IkReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.count, report.count);
    assert_eq!(back.singularities, report.singularities);
    for slot in 0..8 {
        match (back.solutions.slot(slot), report.solutions.slot(slot)) {
            (Some(a), Some(b)) => {
                assert!(a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12));
            }
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[test]
fn test_report_json_shape() {
    let report = sample_report();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["count"].as_u64(), Some(report.count as u64));
    assert_eq!(value["solutions"]["slots"].as_array().map(|a| a.len()), Some(8));
    assert_eq!(value["singularities"]["no_result"].as_array().map(|a| a.len()), Some(8));

    // Missing slots are null, never a magic number
    for (slot, entry) in value["solutions"]["slots"].as_array().unwrap().iter().enumerate() {
        assert_eq!(entry.is_null(), report.solutions.slot(slot).is_none());
    }
}

#[test]
fn test_report_bincode_roundtrip() {
    let report = sample_report();
    let enc = bincode::serialize(&report).unwrap();
    let dec: IkReport = bincode::deserialize(&enc).unwrap();
    assert_eq!(dec, report);
    println!("bincode report: {} bytes", enc.len());
}

#[test]
fn test_wrist_singular_report_codes() {
    let report = sample_report();
    for (cfx, _) in report.present() {
        assert_eq!(report.kind(cfx), SingularityKind::Wrist);
        assert_eq!(report.singularities.codes()[cfx.index()], 1);
    }
}

#[test]
fn test_joint_angles_json_uses_host_names() {
    let angles = JointAngles::from([0.0, std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0, 0.0]);
    let json = serde_json::to_string(&angles).unwrap();
    assert!(json.contains("\"J2\":90.0"));
}

#[test]
fn test_parameters_and_errors_serialize() {
    let geometry = RobotConfig::irb1660id().link_geometry();
    let parameters = OpwParameters::from_geometry(&geometry, 0.001).unwrap();
    let enc = bincode::serialize(&parameters).unwrap();
    let dec: OpwParameters = bincode::deserialize(&enc).unwrap();
    assert_eq!(dec, parameters);

    let err = IkError::WristCenterNotFound { slot: 3 };
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(serde_json::from_str::<IkError>(&json).unwrap(), err);

    let cfx: Cfx = serde_json::from_str("6").unwrap();
    assert!(cfx.cf1() && cfx.cf4() && !cfx.cf6());
}
