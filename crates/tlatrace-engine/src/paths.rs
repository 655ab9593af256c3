//! Simple root-to-leaf paths of a TLC state graph, and their rendering as
//! trace files.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use tlatrace_parser::format::{action_annotation, module_footer, module_header};
use tlatrace_parser::{DotGraph, NodeId};

/// Adjacency view of a DOT dump.
///
/// Parallel edges are collapsed; the first label seen for an edge is kept.
/// Self-loops count toward both degrees, so a node with only a self-loop is
/// neither a root nor a leaf.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    nodes: Vec<NodeId>,
    successors: HashMap<NodeId, Vec<NodeId>>,
    in_degree: HashMap<NodeId, usize>,
    actions: HashMap<(NodeId, NodeId), String>,
    labels: HashMap<NodeId, String>,
}

impl StateGraph {
    pub fn from_dot(dot: DotGraph) -> Self {
        let mut graph = StateGraph {
            nodes: dot.nodes,
            labels: dot.labels,
            ..Self::default()
        };
        let mut seen = HashSet::new();
        for edge in dot.edges {
            if !seen.insert((edge.from, edge.to)) {
                continue;
            }
            graph.successors.entry(edge.from).or_default().push(edge.to);
            *graph.in_degree.entry(edge.to).or_default() += 1;
            if let Some(action) = edge.action {
                graph.actions.insert((edge.from, edge.to), action);
            }
        }
        graph
    }

    pub fn vertices(&self) -> usize {
        self.nodes.len()
    }

    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        self.successors.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes without incoming edges, in order of appearance
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .copied()
            .filter(|n| !self.in_degree.contains_key(n))
            .collect()
    }

    /// Nodes without outgoing edges, in order of appearance
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .copied()
            .filter(|n| self.successors(*n).is_empty())
            .collect()
    }

    /// Every (root, leaf) combination, roots outermost
    pub fn pairs(&self) -> Vec<(NodeId, NodeId)> {
        let leaves = self.leaves();
        self.roots()
            .into_iter()
            .flat_map(|root| leaves.iter().map(move |leaf| (root, *leaf)))
            .collect()
    }

    pub fn action(&self, from: NodeId, to: NodeId) -> Option<&str> {
        self.actions.get(&(from, to)).map(String::as_str)
    }

    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(&node).map(String::as_str)
    }

    /// Paths from `root` to `leaf` that never revisit a node.
    ///
    /// When `root == leaf` the single one-node path is produced.
    pub fn all_simple_paths(&self, root: NodeId, leaf: NodeId) -> SimplePaths<'_> {
        if root == leaf {
            return SimplePaths {
                graph: self,
                leaf,
                path: Vec::new(),
                on_path: HashSet::new(),
                stack: Vec::new(),
                single: Some(root),
            };
        }
        SimplePaths {
            graph: self,
            leaf,
            path: vec![root],
            on_path: HashSet::from([root]),
            stack: vec![self.successors(root).iter()],
            single: None,
        }
    }

    /// Trace-file text for one path: each node's label under its own state
    /// marker, preceded by the action of the edge that reached it.
    pub fn render_trace(&self, module: &str, path: &[NodeId]) -> Result<String> {
        let header = module_header(module);
        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');

        for (idx, node) in path.iter().enumerate() {
            let label = self.label(*node).ok_or(Error::UnknownNode(*node))?;
            if idx > 0
                && let Some(action) = self.action(path[idx - 1], *node)
            {
                out.push_str(&action_annotation(action));
                out.push('\n');
            }
            out.push_str(&format!("STATE {} ==\n", idx + 1));
            for line in label.lines() {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(&module_footer(header.len()));
        out.push('\n');
        Ok(out)
    }
}

/// Iterative depth-first enumeration; see [`StateGraph::all_simple_paths`]
pub struct SimplePaths<'g> {
    graph: &'g StateGraph,
    leaf: NodeId,
    path: Vec<NodeId>,
    on_path: HashSet<NodeId>,
    stack: Vec<std::slice::Iter<'g, NodeId>>,
    single: Option<NodeId>,
}

impl Iterator for SimplePaths<'_> {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node) = self.single.take() {
            return Some(vec![node]);
        }
        while let Some(children) = self.stack.last_mut() {
            match children.next() {
                None => {
                    self.stack.pop();
                    if let Some(node) = self.path.pop() {
                        self.on_path.remove(&node);
                    }
                }
                Some(&child) if child == self.leaf => {
                    let mut found = self.path.clone();
                    found.push(child);
                    return Some(found);
                }
                Some(&child) => {
                    if self.on_path.insert(child) {
                        self.path.push(child);
                        self.stack.push(self.graph.successors(child).iter());
                    }
                }
            }
        }
        None
    }
}

/// `trace_<pair>_<path>`; also the module name inside the file
pub fn trace_file_name(pair: usize, path: usize) -> String {
    format!("trace_{}_{}", pair, path)
}
