use std::process::Command;

#[test]
fn wimax_uplink_runs_a_short_grant_schedule() {
    let output = Command::new(env!("CARGO_BIN_EXE_wimax_uplink"))
        .args([
            "--frames",
            "5",
            "--symbols-per-frame",
            "100",
            "--modulation",
            "qpsk34",
            "--frame-ms",
            "5",
        ])
        .output()
        .expect("run wimax_uplink");
    assert!(
        output.status.success(),
        "wimax_uplink failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("done @"), "stdout: {stdout}");
    assert!(stdout.contains("bursts="), "stdout: {stdout}");
    assert!(stdout.contains("poll_me=false"), "stdout: {stdout}");
}

#[test]
fn wimax_uplink_rejects_unknown_modulations() {
    let output = Command::new(env!("CARGO_BIN_EXE_wimax_uplink"))
        .args(["--modulation", "qam256"])
        .output()
        .expect("run wimax_uplink");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown modulation"), "stderr: {stderr}");
}
