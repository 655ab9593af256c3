use tlatrace_testing::fixtures::{DIEHARD_LOG, DIEHARD_PREFIX_TRACE};
use tlatrace_testing::{TestWorld, assertions};

#[test]
fn test_read_prints_compact_json() -> anyhow::Result<()> {
    let world = TestWorld::new().with_sample(DIEHARD_PREFIX_TRACE, "trace_1");
    let trace = world.trace_dir().join("trace_1").to_string_lossy().to_string();

    let result = world.run(&["read", &trace])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    assert_eq!(result.stdout().lines().count(), 1);

    let json = result.json()?;
    assertions::assert_state_array(&json, 3)?;
    assert_eq!(assertions::actions(&json)?, vec!["Initial", "FillBig", "BigToSmall"]);
    assert_eq!(json[2]["big"], 2);
    assert_eq!(json[2]["small"], 3);
    Ok(())
}

#[test]
fn test_read_log_to_indented_file() -> anyhow::Result<()> {
    let world = TestWorld::new().with_sample(DIEHARD_LOG, "MC.out");
    let log = world.trace_dir().join("MC.out").to_string_lossy().to_string();
    let out = world.temp_dir().join("states.json");
    let out_arg = out.to_string_lossy().to_string();

    let result = world.run(&["read", &log, "-o", &out_arg, "-i", "2"])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().is_empty());

    let text = std::fs::read_to_string(&out)?;
    assert!(text.starts_with("[\n  {"));
    assert!(text.ends_with("]\n"));
    let json: serde_json::Value = serde_json::from_str(&text)?;
    assertions::assert_state_array(&json, 7)?;
    Ok(())
}

#[test]
fn test_read_without_actions() -> anyhow::Result<()> {
    let world = TestWorld::new().with_sample(DIEHARD_PREFIX_TRACE, "trace_1");
    let trace = world.trace_dir().join("trace_1").to_string_lossy().to_string();

    let result = world.run(&["read", &trace, "--no-actions"])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(!result.stdout().contains("_action"));
    assertions::assert_state_array(&result.json()?, 3)?;
    Ok(())
}

#[test]
fn test_read_config_renames_variables() -> anyhow::Result<()> {
    let world = TestWorld::new()
        .with_config("[decoder.rename]\nbig = \"jug5\"\n")
        .with_sample(DIEHARD_PREFIX_TRACE, "trace_1");
    let trace = world.trace_dir().join("trace_1").to_string_lossy().to_string();

    let result = world.run(&["read", &trace])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    let json = result.json()?;
    assert_eq!(json[1]["jug5"], 5);
    assert!(json[1].get("big").is_none());
    Ok(())
}
