//! Reading the shared sample traces, logs and graphs end to end.

use tlatrace_parser::{ReadError, ReaderOptions, TraceReader, Value, read_dot_file, read_trace};
use tlatrace_testing::SampleFiles;
use tlatrace_testing::fixtures::{BROKEN_TRACE, DIAMOND_DOT, DIEHARD_LOG, DIEHARD_TRACE};

#[test]
fn test_diehard_trace() -> anyhow::Result<()> {
    let samples = SampleFiles::new();
    let states = read_trace(samples.path(DIEHARD_TRACE), ReaderOptions::default())?;

    assert_eq!(states.len(), 7);
    assert_eq!(states[6].get("big"), Some(&Value::Int(4)));
    let actions: Vec<_> = states.iter().filter_map(|s| s.action()).collect();
    assert_eq!(
        actions,
        vec!["Initial", "FillBig", "BigToSmall", "EmptySmall", "BigToSmall", "FillBig", "BigToSmall"]
    );
    Ok(())
}

#[test]
fn test_raw_log_matches_trace_file() -> anyhow::Result<()> {
    let samples = SampleFiles::new();
    let from_trace = read_trace(samples.path(DIEHARD_TRACE), ReaderOptions::default())?;
    let from_log = read_trace(samples.path(DIEHARD_LOG), ReaderOptions::default())?;

    assert_eq!(from_trace, from_log);
    let digests = |states: &[tlatrace_parser::State]| states.iter().map(|s| s.digest()).collect::<Vec<_>>();
    assert_eq!(digests(&from_trace), digests(&from_log));
    Ok(())
}

#[test]
fn test_broken_trace_reports_line() -> anyhow::Result<()> {
    let samples = SampleFiles::new();
    let mut reader = TraceReader::open(samples.path(BROKEN_TRACE), ReaderOptions::default())?;

    assert!(reader.next().is_some_and(|r| r.is_ok()));
    match reader.next() {
        Some(Err(ReadError::Decode { line, variable, .. })) => {
            assert_eq!(line, 7);
            assert_eq!(variable, "big");
        }
        other => panic!("expected decode error, got {:?}", other),
    }
    assert!(reader.next().is_none());
    Ok(())
}

#[test]
fn test_diamond_graph_labels_decode() -> anyhow::Result<()> {
    let samples = SampleFiles::new();
    let graph = read_dot_file(samples.path(DIAMOND_DOT), true)?;

    assert_eq!(graph.nodes, vec![1, 2, 3, 4]);
    assert_eq!(graph.edges.len(), 4);
    for label in graph.labels.values() {
        let trace = format!("---- MODULE T ----\nSTATE_1 ==\n{}\n====\n", label);
        let states: Vec<_> = TraceReader::new(trace.as_bytes(), ReaderOptions::default())
            .collect::<Result<_, _>>()?;
        assert_eq!(states.len(), 1);
        assert!(states[0].get("pc").is_some());
    }
    Ok(())
}
