//! Reader for the state graph TLC writes with `-dump dot`.
//!
//! Only numeric node and edge statements are read; graph attributes, clusters
//! and the action legend are skipped.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

/// TLC state fingerprint as printed in the graph
pub type NodeId = i64;

static EDGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+)\s*->\s*(-?\d+)\s*(?:\[(.*)\])?\s*;?\s*$").unwrap()
});
static NODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+)\s*\[(.*)\]\s*;?\s*$").unwrap());
static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"label\s*=\s*"((?:[^"\\]|\\.)*)""#).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotEdge {
    pub from: NodeId,
    pub to: NodeId,
    /// Edge label, present when TLC ran with `-actionlabels`
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DotGraph {
    /// Nodes in order of first appearance, from node or edge statements
    pub nodes: Vec<NodeId>,
    /// State text per node, one `/\ var = value` conjunct per line
    pub labels: HashMap<NodeId, String>,
    pub edges: Vec<DotEdge>,
}

impl DotGraph {
    fn note(&mut self, id: NodeId, seen: &mut HashSet<NodeId>) {
        if seen.insert(id) {
            self.nodes.push(id);
        }
    }
}

/// Parse a DOT dump. Labels are only kept when `keep_labels` is set.
pub fn read_dot<R: BufRead>(reader: R, keep_labels: bool) -> Result<DotGraph> {
    let mut graph = DotGraph::default();
    let mut seen = HashSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;

        if let Some(caps) = EDGE_REGEX.captures(&line) {
            let from = parse_id(&caps[1], line_no)?;
            let to = parse_id(&caps[2], line_no)?;
            let action = caps
                .get(3)
                .and_then(|attrs| label_of(attrs.as_str()))
                .filter(|label| !label.is_empty());
            graph.note(from, &mut seen);
            graph.note(to, &mut seen);
            graph.edges.push(DotEdge { from, to, action });
        } else if let Some(caps) = NODE_REGEX.captures(&line) {
            let id = parse_id(&caps[1], line_no)?;
            graph.note(id, &mut seen);
            if keep_labels && let Some(label) = label_of(&caps[2]) {
                graph.labels.insert(id, label);
            }
        }
    }

    log::debug!(
        "read dot graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(graph)
}

pub fn read_dot_file(path: impl AsRef<Path>, keep_labels: bool) -> Result<DotGraph> {
    let file = File::open(path.as_ref())?;
    read_dot(BufReader::new(file), keep_labels)
}

fn parse_id(text: &str, line: usize) -> Result<NodeId> {
    text.parse().map_err(|_| Error::Parse {
        line,
        message: format!("node id out of range: {}", text),
    })
}

fn label_of(attrs: &str) -> Option<String> {
    LABEL_REGEX.captures(attrs).map(|caps| unescape_label(&caps[1]))
}

fn unescape_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('l') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
