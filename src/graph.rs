use genawaiter::sync::*;
use std::fmt::{self, Display};
use std::ops::RangeInclusive;

use crate::error::FlowError;

pub type NodeId = usize;
pub type Capacity = u32;

type Result<T> = std::result::Result<T, FlowError>;

/// Dense residual-capacity network over the bipartite nodes `1..=partition_size`,
/// plus the synthetic source `0` and sink `partition_size + 1`.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    partition_size: usize,
    // square, (partition_size + 2) rows; capacity[u][v] > 0 is a residual arc u -> v
    capacity: Vec<Vec<Capacity>>,
}

impl<'g> FlowNetwork {
    pub fn new(partition_size: usize) -> Result<Self> {
        if partition_size == 0 || partition_size % 2 != 0 {
            return Err(FlowError::InvalidSize {
                size: i64::try_from(partition_size).unwrap_or(i64::MAX),
            });
        }
        let node_count = partition_size + 2;
        Ok(FlowNetwork {
            partition_size,
            capacity: vec![vec![0; node_count]; node_count],
        })
    }

    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    /// Bipartite nodes plus source and sink.
    pub fn node_count(&self) -> usize {
        self.capacity.len()
    }

    pub fn source(&self) -> NodeId {
        0
    }

    pub fn sink(&self) -> NodeId {
        self.partition_size + 1
    }

    pub fn left_nodes(&self) -> RangeInclusive<NodeId> {
        1..=self.partition_size / 2
    }

    pub fn right_nodes(&self) -> RangeInclusive<NodeId> {
        self.partition_size / 2 + 1..=self.partition_size
    }

    pub fn is_node_in(&self, node: NodeId) -> bool {
        node < self.node_count()
    }

    pub fn check_node(&self, node: NodeId) -> Result<()> {
        if !self.is_node_in(node) {
            return Err(FlowError::OutOfRange {
                node,
                node_count: self.node_count(),
            });
        }
        Ok(())
    }

    /// Sets the capacity of `from -> into`. Overwrites, never accumulates.
    pub fn add_edge(&mut self, from: NodeId, into: NodeId, capacity: Capacity) -> Result<()> {
        self.check_node(from)?;
        self.check_node(into)?;
        self.capacity[from][into] = capacity;
        Ok(())
    }

    /// Unit arcs from `source` into every left node and from every right node into `sink`.
    pub fn attach_source_and_sink(&mut self, source: NodeId, sink: NodeId) -> Result<()> {
        self.check_node(source)?;
        self.check_node(sink)?;
        for node in self.left_nodes() {
            self.add_edge(source, node, 1)?;
        }
        for node in self.right_nodes() {
            self.add_edge(node, sink, 1)?;
        }
        Ok(())
    }

    /// Residual neighbours of `node` in ascending index order.
    /// A node outside the network has none.
    pub fn neighbors(&'g self, node: NodeId) -> impl Iterator<Item = NodeId> + 'g {
        Gen::new(move |co| async move {
            let Some(row) = self.capacity.get(node) else {
                return;
            };
            for (next, capacity) in row.iter().enumerate() {
                if *capacity > 0 {
                    co.yield_(next).await;
                }
            }
        })
        .into_iter()
    }

    pub fn capacity(&self, from: NodeId, into: NodeId) -> Capacity {
        self.capacity
            .get(from)
            .and_then(|row| row.get(into))
            .copied()
            .unwrap_or(0)
    }

    pub fn residual_view(&self) -> &[Vec<Capacity>] {
        &self.capacity
    }

    /// Moves `amount` units of residual capacity from `from -> into` onto `into -> from`.
    pub fn push_flow(&mut self, from: NodeId, into: NodeId, amount: Capacity) -> Result<()> {
        self.check_node(from)?;
        self.check_node(into)?;
        let forward = self.capacity[from][into]
            .checked_sub(amount)
            .ok_or(FlowError::ResidualUnderflow { from, into })?;
        self.capacity[from][into] = forward;
        self.capacity[into][from] += amount;
        Ok(())
    }

    /// `(left, right)` pairs whose residual arc `right -> left` holds exactly one unit,
    /// i.e. one unit of flow crossed the original arc `left -> right`.
    pub fn matched_nodes(&self) -> Vec<(NodeId, NodeId)> {
        let mut matched = Vec::new();
        for left in self.left_nodes() {
            for right in self.right_nodes() {
                if self.capacity[right][left] == 1 {
                    matched.push((left, right));
                }
            }
        }
        matched
    }

    /// `names[i]` names node `i + 1`.
    pub fn extract_matching(&self, names: &[String]) -> Result<Matching> {
        let name_of = |node: NodeId| {
            names
                .get(node - 1)
                .cloned()
                .ok_or(FlowError::MissingName { node })
        };
        let mut pairs = Vec::new();
        for (left, right) in self.matched_nodes() {
            pairs.push(MatchedPair {
                left,
                right,
                left_name: name_of(left)?,
                right_name: name_of(right)?,
            });
        }
        Ok(Matching { pairs })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub left: NodeId,
    pub right: NodeId,
    pub left_name: String,
    pub right_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    pub pairs: Vec<MatchedPair>,
}

impl Matching {
    pub fn total(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in &self.pairs {
            writeln!(f, "{} / {}", pair.left_name, pair.right_name)?;
        }
        write!(f, "{} total matches", self.total())
    }
}
