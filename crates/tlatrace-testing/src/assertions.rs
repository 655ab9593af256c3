//! Custom assertions over `tlatrace` output.
//!
//! Reports are line-oriented; these helpers pick out the last report line with
//! a given prefix and compare its counters.

use anyhow::{Context, Result};
use serde_json::Value;

/// Last line of `output` that starts with `prefix`.
pub fn last_line_with<'a>(output: &'a str, prefix: &str) -> Result<&'a str> {
    output
        .lines()
        .rev()
        .find(|line| line.starts_with(prefix))
        .with_context(|| format!("no line starting with '{}' in output:\n{}", prefix, output))
}

/// Parse the `a/b` counter that follows `label` in `line`.
pub fn counter_pair(line: &str, label: &str) -> Result<(u64, u64)> {
    let start = line
        .find(label)
        .with_context(|| format!("'{}' not found in '{}'", label, line))?
        + label.len();
    let field = line[start..]
        .split_whitespace()
        .next()
        .context("missing counter")?
        .trim_end_matches(',');
    let (a, b) = field
        .split_once('/')
        .with_context(|| format!("malformed counter '{}'", field))?;
    Ok((a.parse()?, b.parse()?))
}

/// Assert the final summary report counted `distinct` of `total` states.
pub fn assert_state_counts(output: &str, distinct: u64, total: u64) -> Result<()> {
    let line = last_line_with(output, "Processed:")?;
    let actual = counter_pair(line, "distinct/total states:")?;
    if actual != (distinct, total) {
        anyhow::bail!(
            "Expected {}/{} distinct/total states, got {}/{} in '{}'",
            distinct,
            total,
            actual.0,
            actual.1,
            line
        );
    }
    Ok(())
}

/// Assert the final summary report processed `processed` of `submitted` files.
pub fn assert_processed(output: &str, processed: u64, submitted: u64) -> Result<()> {
    let line = last_line_with(output, "Processed:")?;
    let actual = counter_pair(line, "Processed:")?;
    if actual != (processed, submitted) {
        anyhow::bail!(
            "Expected {}/{} processed files, got {}/{} in '{}'",
            processed,
            submitted,
            actual.0,
            actual.1,
            line
        );
    }
    Ok(())
}

/// Assert that JSON output is an array of `expected` states.
pub fn assert_state_array(json: &Value, expected: usize) -> Result<()> {
    let states = json.as_array().context("Expected a JSON array of states")?;
    if states.len() != expected {
        anyhow::bail!("Expected {} states, got {}", expected, states.len());
    }
    Ok(())
}

/// Action names of a JSON state array, in order.
pub fn actions(json: &Value) -> Result<Vec<String>> {
    json.as_array()
        .context("Expected a JSON array of states")?
        .iter()
        .enumerate()
        .map(|(i, state)| {
            state["_action"]
                .as_str()
                .map(str::to_string)
                .with_context(|| format!("State {} has no _action", i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_pair() -> Result<()> {
        let line = "Processed: 2/3 (66.7%), distinct/total states: 7/10 (70%)";
        assert_eq!(counter_pair(line, "Processed:")?, (2, 3));
        assert_eq!(counter_pair(line, "distinct/total states:")?, (7, 10));
        Ok(())
    }

    #[test]
    fn test_last_line_wins() -> Result<()> {
        let output = "Processed: 1/2 (50%), distinct/total states: 1/1 (100%)\n\
                      Processed: 2/2 (100%), distinct/total states: 3/4 (75%)\n";
        assert_state_counts(output, 3, 4)?;
        assert_processed(output, 2, 2)?;
        Ok(())
    }
}
