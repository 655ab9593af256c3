//! Aggregation and path rendering over the shared samples.

use tlatrace_engine::{AggregateStats, PartialStats, StateGraph, SummaryReport, trace_file_name};
use tlatrace_parser::{ReaderOptions, TraceReader, read_dot_file, read_trace};
use tlatrace_testing::SampleFiles;
use tlatrace_testing::fixtures::{DIAMOND_DOT, DIEHARD_PREFIX_TRACE, DIEHARD_TRACE};

#[test]
fn test_summary_over_diehard_samples() -> anyhow::Result<()> {
    let samples = SampleFiles::new();
    let mut stats = AggregateStats::new();
    for name in [DIEHARD_TRACE, DIEHARD_PREFIX_TRACE] {
        let states = read_trace(samples.path(name), ReaderOptions::default())?;
        stats.merge(PartialStats::from_states(name, &states));
    }
    stats.finalize();

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.total_states(), 10);
    assert_eq!(stats.distinct_states(), 7);
    assert_eq!(stats.diameters().get(&7), Some(&1));
    assert_eq!(stats.diameters().get(&3), Some(&1));

    let report = SummaryReport::new(&stats, 2);
    assert_eq!(report.actions.get("BigToSmall"), Some(&(3, 4)));
    assert_eq!(report.actions.get("FillBig"), Some(&(2, 3)));
    assert_eq!(report.actions.get("Initial"), Some(&(1, 2)));

    let text = report.to_string();
    assert!(text.starts_with("Processed: 2/2 (100%), distinct/total states: 7/10 (70%)"));
    assert!(text.contains("Diameters:\n  3 : 1\n  7 : 1\n"));
    assert!(text.contains("  EmptySmall : 1 / 1"));
    Ok(())
}

#[test]
fn test_diamond_paths_round_trip_as_traces() -> anyhow::Result<()> {
    let samples = SampleFiles::new();
    let graph = StateGraph::from_dot(read_dot_file(samples.path(DIAMOND_DOT), true)?);

    assert_eq!(graph.pairs(), vec![(1, 4)]);
    let paths: Vec<_> = graph.all_simple_paths(1, 4).collect();
    assert_eq!(paths.len(), 2);

    let dir = tempfile::tempdir()?;
    for (idx, path) in paths.iter().enumerate() {
        let name = trace_file_name(0, idx);
        let text = graph.render_trace(&name, path)?;
        std::fs::write(dir.path().join(&name), text)?;
    }

    let left = read_trace(dir.path().join("trace_0_0"), ReaderOptions::default())?;
    assert_eq!(left.len(), 3);
    let actions: Vec<_> = left.iter().map(|s| s.action()).collect();
    assert_eq!(actions, vec![None, Some("Left"), Some("Join")]);

    let right = TraceReader::open(dir.path().join("trace_0_1"), ReaderOptions::default())?
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(right.len(), 3);
    assert_eq!(right[0], left[0]);
    assert_eq!(right[2].get("pc"), left[2].get("pc"));
    assert_ne!(right[1].digest(), left[1].digest());
    Ok(())
}
