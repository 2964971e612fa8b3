use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::error::{FlowError, PrepareError};
use crate::graph::{FlowNetwork, NodeId};

type Result<T> = std::result::Result<T, PrepareError>;

/// Graph description read from a text file:
///
/// ```text
/// <node count N, even, >= 2>
/// <name of node 1>
/// ...
/// <name of node N>
/// <edge count E, >= 1>
/// <node> <node>      (E lines)
/// ```
///
/// Nodes `1..=N/2` form the left partition, `N/2+1..=N` the right one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPrepare {
    nodes: usize,
    // names[i] names node i + 1
    names: Vec<String>,
    // always oriented left -> right
    edges: Vec<(NodeId, NodeId)>,
}

impl GraphPrepare {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let prepared = Self::parse(&text)?;
        info!(
            "read {} nodes and {} edges from {}",
            prepared.nodes,
            prepared.edges.len(),
            path.display()
        );
        Ok(prepared)
    }

    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(PrepareError::EmptyFile);
        }
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

        let count = read_count(&mut lines, "number of nodes")?;
        if count < 2 || count % 2 != 0 {
            return Err(PrepareError::OddNodeCount { count });
        }
        let nodes = usize::try_from(count).map_err(|_| FlowError::InvalidSize { size: count })?;

        let mut names = Vec::with_capacity(nodes);
        for _ in 0..nodes {
            let (line, raw) = lines.next().ok_or(PrepareError::UnexpectedEnd {
                expected: "node name",
            })?;
            let name = cleanse_name(raw);
            if name.is_empty() {
                return Err(PrepareError::InvalidName { line });
            }
            names.push(name);
        }

        let count = read_count(&mut lines, "number of edges")?;
        if count < 1 {
            return Err(PrepareError::NonPositiveEdgeCount { count });
        }

        let half = nodes / 2;
        let mut edges = Vec::new();
        for _ in 0..count {
            let (line, raw) = lines
                .next()
                .ok_or(PrepareError::UnexpectedEnd { expected: "edge" })?;
            let (from, into) = parse_edge(raw).ok_or_else(|| PrepareError::InvalidEdge {
                line,
                text: raw.to_string(),
            })?;
            let from = check_endpoint(line, from, nodes)?;
            let into = check_endpoint(line, into, nodes)?;
            match (from <= half, into <= half) {
                (true, false) => edges.push((from, into)),
                (false, true) => {
                    warn!("line {line}: edge {from} {into} runs right to left, reversing it");
                    edges.push((into, from));
                }
                _ => return Err(PrepareError::SameSide { line, from, into }),
            }
        }

        Ok(GraphPrepare {
            nodes,
            names,
            edges,
        })
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Unit-capacity network holding the bipartite edges; source and sink are not attached yet.
    pub fn build_network(&self) -> Result<FlowNetwork> {
        let mut network = FlowNetwork::new(self.nodes)?;
        for (from, into) in &self.edges {
            network.add_edge(*from, *into, 1)?;
        }
        Ok(network)
    }
}

fn read_count<'a, I>(lines: &mut I, expected: &'static str) -> Result<i64>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line, text) = lines
        .next()
        .ok_or(PrepareError::UnexpectedEnd { expected })?;
    text.trim()
        .parse()
        .map_err(|_| PrepareError::InvalidCount {
            line,
            text: text.to_string(),
        })
}

/// First two integers on the line; anything after them is ignored.
fn parse_edge(text: &str) -> Option<(i64, i64)> {
    let mut parts = text.split_whitespace();
    let from = parts.next()?.parse().ok()?;
    let into = parts.next()?.parse().ok()?;
    Some((from, into))
}

fn check_endpoint(line: usize, node: i64, node_count: usize) -> Result<NodeId> {
    match usize::try_from(node) {
        Ok(id) if (1..=node_count).contains(&id) => Ok(id),
        _ => Err(PrepareError::EdgeOutOfRange {
            line,
            node,
            node_count,
        }),
    }
}

/// Keeps ASCII letters and digits, and single spaces between them.
pub fn cleanse_name(raw: &str) -> String {
    let mut clean = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || (ch == ' ' && !clean.is_empty() && !clean.ends_with(' ')) {
            clean.push(ch);
        }
    }
    clean.truncate(clean.trim_end().len());
    clean
}
