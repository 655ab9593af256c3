use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tlatrace_testing::TestWorld;
use tlatrace_testing::fixtures::{DIEHARD_LOG, DIEHARD_PREFIX_TRACE, DIEHARD_TRACE};

fn world() -> TestWorld {
    TestWorld::new()
        .with_sample(DIEHARD_TRACE, "trace_1")
        .with_sample(DIEHARD_LOG, "trace_2")
        .with_sample(DIEHARD_PREFIX_TRACE, "trace_3")
}

#[test]
fn test_count_produces_and_reduces() -> anyhow::Result<()> {
    let world = world();
    let dir = world.trace_dir().to_string_lossy().to_string();

    let result = world.run(&["count", &dir])?;
    assert!(result.success(), "stderr: {}", result.stderr());

    let stdout = result.stdout();
    assert!(stdout.contains("Submit finished\n"));
    assert!(stdout.contains("Map finished\n"));
    assert!(stdout.contains("unique/processed/total traces: 2/3/3"));
    assert!(stdout.contains("distinct/total states: 7/17"));
    assert_eq!(stdout.lines().last(), Some("Reduce finished"));

    // default hash file lands in the working directory
    let hashes = std::fs::read_to_string(world.temp_dir().join("hashfile"))?;
    assert_eq!(hashes.lines().count(), 3);
    Ok(())
}

#[test]
fn test_count_reduce_only_reads_existing_hash_file() -> anyhow::Result<()> {
    let world = world();
    let hash_file = world.temp_dir().join("hashes.txt");

    let mut produce = cargo_bin_cmd!("tlatrace");
    world
        .configure_command(&mut produce)
        .arg("count")
        .arg(world.trace_dir())
        .arg("-f")
        .arg(&hash_file);
    produce.assert().success();

    let mut reduce = cargo_bin_cmd!("tlatrace");
    world
        .configure_command(&mut reduce)
        .arg("count")
        .arg("--reduce-only")
        .arg("-f")
        .arg(&hash_file);
    reduce
        .assert()
        .success()
        .stdout(predicate::str::contains("Submit finished").not())
        .stdout(predicate::str::contains("unique/processed/total traces: 2/3/3"));
    Ok(())
}

#[test]
fn test_count_reduce_only_missing_hash_file_fails() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("tlatrace");
    world
        .configure_command(&mut cmd)
        .arg("count")
        .arg("--reduce-only")
        .arg("-f")
        .arg(world.temp_dir().join("nope"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("counting"));
}
