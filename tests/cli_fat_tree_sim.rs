use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("wsim-rs-{prefix}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn fat_tree_sim_writes_stats_json_for_a_tiny_run() {
    let dir = unique_temp_dir("fat-tree-sim");
    let out_json = dir.join("stats.json");

    let output = Command::new(env!("CARGO_BIN_EXE_fat_tree_sim"))
        .args([
            "--racks",
            "2",
            "--servers-per-rack",
            "2",
            "--agg",
            "2",
            "--core",
            "1",
            "--server-gbps",
            "1",
            "--switch-gbps",
            "4",
            "--background-load",
            "0.05",
            "--incast-load",
            "0",
            "--duration-ms",
            "150",
            "--seed",
            "3",
            "--stats-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run fat_tree_sim");
    assert!(
        output.status.success(),
        "fat_tree_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("delivered_pkts="), "stdout: {stdout}");

    let raw = fs::read_to_string(&out_json).expect("read stats.json");
    let v: Value = serde_json::from_str(&raw).expect("parse stats.json");
    assert_eq!(v.get("servers").and_then(|x| x.as_u64()), Some(4));
    assert_eq!(v.get("racks").and_then(|x| x.as_u64()), Some(2));
    assert!(
        v.get("background_flows").and_then(|x| x.as_u64()).unwrap_or(0) >= 1,
        "expected at least one background flow: {raw}"
    );
    assert!(v.get("stats").is_some(), "missing stats block: {raw}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn fat_tree_sim_is_quiet_before_traffic_starts() {
    let output = Command::new(env!("CARGO_BIN_EXE_fat_tree_sim"))
        .args([
            "--racks",
            "2",
            "--servers-per-rack",
            "2",
            "--agg",
            "2",
            "--core",
            "1",
            // Traffic generation begins at 100 ms; stop before that.
            "--duration-ms",
            "50",
        ])
        .output()
        .expect("run fat_tree_sim");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("flows=0") && stdout.contains("delivered_pkts=0"),
        "stdout: {stdout}"
    );
}
