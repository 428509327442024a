mod common;

use common::read_lines;
use ducat_sim::flush::flush_to_jsonl;

#[test]
fn flush_produces_valid_jsonl_files() {
    let world = common::build_test_world();
    let dir = tempfile::tempdir().unwrap();

    flush_to_jsonl(&world, dir.path()).unwrap();

    let citizens_path = dir.path().join("citizens.jsonl");
    let buildings_path = dir.path().join("buildings.jsonl");
    let stacks_path = dir.path().join("resource_stacks.jsonl");
    let activities_path = dir.path().join("activities.jsonl");
    let contracts_path = dir.path().join("contracts.jsonl");
    let stratagems_path = dir.path().join("stratagems.jsonl");

    assert!(citizens_path.exists());
    assert!(buildings_path.exists());
    assert!(stacks_path.exists());
    assert!(activities_path.exists());
    assert!(contracts_path.exists());
    assert!(stratagems_path.exists());

    let citizens = read_lines(&citizens_path);
    let buildings = read_lines(&buildings_path);
    let stacks = read_lines(&stacks_path);
    let activities = read_lines(&activities_path);
    let contracts = read_lines(&contracts_path);
    let stratagems = read_lines(&stratagems_path);

    assert_eq!(citizens.len(), 2, "expected 2 citizens");
    assert_eq!(buildings.len(), 3, "expected 3 buildings");
    assert_eq!(stacks.len(), 2, "expected 2 stacks");
    assert_eq!(activities.len(), 3, "expected 3 activities");
    assert_eq!(contracts.len(), 1, "expected 1 contract");
    assert_eq!(stratagems.len(), 1, "expected 1 stratagem");

    for line in &citizens {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v.get("id").is_some());
        assert!(v.get("name").is_some());
        assert!(v.get("ducats").is_some());
        assert!(v.get("position").is_some());
    }

    for line in &activities {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v.get("id").is_some());
        // Internally tagged kind payload.
        assert!(v["kind"].get("type").is_some());
        assert_eq!(v["status"], "created");
        // Packed timestamp representation.
        assert!(v["start"].get("day").is_some());
    }

    for line in &stacks {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["holder"].get("kind").is_some());
        assert!(v["holder"].get("id").is_some());
        assert!(v.get("owner").is_some());
    }

    for line in &stratagems {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(v["kind"]["type"], "monopoly_pricing");
        assert_eq!(v["status"], "active");
        assert!(v["progress"].get("spent").is_some());
    }
}

#[test]
fn flush_creates_missing_directories() {
    let world = common::build_test_world();
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out").join("cycle_000001");

    flush_to_jsonl(&world, &nested).unwrap();
    assert!(nested.join("contracts.jsonl").exists());
}
