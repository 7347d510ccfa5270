// Shared test helpers: kBucketTable lines and node directory fixtures

#![allow(dead_code)]

use std::path::Path;

/// A `kBucketTable` log line with `full` saturated buckets followed by partial buckets
/// holding `partial` occupants in total. Estimates to `(partial + 1) * 2^full`.
pub fn bucket_line(full: u32, partial: u64) -> String {
    let mut buckets = Vec::new();
    let mut depth = 0u32;
    for _ in 0..full {
        buckets.push(format!("({depth}, 20, 20)"));
        depth += 1;
    }
    let mut remaining = partial;
    while remaining > 0 {
        let n = remaining.min(19);
        buckets.push(format!("({depth}, {n}, 20)"));
        remaining -= n;
        depth += 1;
    }
    format!(
        "[2024-05-01T12:00:00.000000Z INFO sn_networking::driver] kBucketTable stats: [{}]",
        buckets.join(", ")
    )
}

/// Line whose estimate is exactly `estimate`, using only partial buckets.
pub fn line_for_estimate(estimate: u64) -> String {
    assert!(estimate >= 1);
    bucket_line(0, estimate - 1)
}

pub fn write_node(base: &Path, name: &str, log_lines: &[String]) {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    let mut content = String::new();
    for line in log_lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(dir.join("safenode.log"), content).unwrap();
}

/// Node directory whose log ends with a routing table estimating to `estimate`.
pub fn write_node_with_estimate(base: &Path, name: &str, estimate: u64) {
    write_node(
        base,
        name,
        &[
            "[2024-05-01T11:59:00Z INFO sn_node] Node started".to_string(),
            line_for_estimate(estimate),
            "[2024-05-01T12:00:01Z DEBUG sn_networking] Dialing peer".to_string(),
        ],
    );
}
