//! Runtime operations over the shared samples, end to end.

use tlatrace_runtime::{Config, CountService, PathsService, SummaryProgress, SummaryService};
use tlatrace_testing::TestWorld;
use tlatrace_testing::fixtures::{DIAMOND_DOT, DIEHARD_LOG, DIEHARD_PREFIX_TRACE, DIEHARD_TRACE};

fn config(toml: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(toml)?)
}

#[test]
fn test_summary_mixes_traces_and_finish_log() -> anyhow::Result<()> {
    let world = TestWorld::new()
        .with_sample(DIEHARD_TRACE, "trace_1")
        .with_sample(DIEHARD_PREFIX_TRACE, "trace_2")
        .with_sample(DIEHARD_LOG, "MC.out");

    let config = config("[pool]\nworkers = 2\n[ingest]\ndelete_processed = true\n")?;
    let mut report = None;
    let stats = SummaryService::new(&config)?.run(world.trace_dir(), |event| {
        if let SummaryProgress::Finished(r) = event {
            report = Some(r);
        }
    })?;

    assert_eq!(stats.processed(), 3);
    assert_eq!(stats.total_states(), 17);
    assert_eq!(stats.distinct_states(), 7);
    assert_eq!(world.trace_files(), vec!["MC.out"]);

    let report = report.ok_or_else(|| anyhow::anyhow!("no final report"))?;
    assert_eq!(report.diameters.get(&7), Some(&2));
    assert_eq!(report.actions.get("BigToSmall"), Some(&(3, 7)));
    Ok(())
}

#[test]
fn test_count_over_samples() -> anyhow::Result<()> {
    let world = TestWorld::new()
        .with_sample(DIEHARD_TRACE, "trace_1")
        .with_sample(DIEHARD_LOG, "trace_2")
        .with_sample(DIEHARD_PREFIX_TRACE, "trace_3");
    let hash_file = world.temp_dir().join("hashfile");

    let service = CountService::new(&Config::default())?;
    let submitted = service.produce(world.trace_dir(), &hash_file, |_| {})?;
    let totals = service.reduce(&hash_file, Some(submitted), |_| {})?;

    assert_eq!(totals.processed, 3);
    // the log converts to the same trace as the trace file
    assert_eq!(totals.unique_traces, 2);
    assert_eq!(totals.distinct_states, 7);
    assert_eq!(totals.total_states, 17);
    Ok(())
}

#[test]
fn test_paths_over_diamond_sample() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let save_dir = world.temp_dir().join("generated");

    let line = PathsService::new(&Config::default()).run(
        &world.samples().path(DIAMOND_DOT),
        Some(&save_dir),
        |_| {},
    )?;

    assert_eq!(line.all, 1);
    assert_eq!(line.paths, 2);
    assert!(save_dir.join("trace_0_0").exists());
    assert!(save_dir.join("trace_0_1").exists());
    Ok(())
}
