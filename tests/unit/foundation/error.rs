use super::*;
use crate::process::outcome::RunFailure;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FfError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(FfError::probe("x").to_string().contains("probe error:"));
    let spawn = FfError::spawn("ffmpeg", std::io::Error::from(std::io::ErrorKind::NotFound));
    assert!(spawn.to_string().starts_with("failed to spawn 'ffmpeg'"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FfError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn runtime_failure_is_reachable_from_error() {
    let failure = RunFailure {
        exit_code: Some(1),
        pump_faults: Vec::new(),
        diagnostics: "Unknown encoder 'nope'".to_string(),
    };
    let err = FfError::from(failure);
    let got = err.run_failure().expect("runtime failure");
    assert_eq!(got.exit_code, Some(1));
    assert!(err.to_string().contains("Unknown encoder"));
}
