use thiserror::Error;

use crate::graph::NodeId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("a flow network needs a positive even number of partition nodes, got {size}")]
    InvalidSize { size: i64 },
    #[error("network has {node_count} nodes, but node {node} was accessed")]
    OutOfRange { node: NodeId, node_count: usize },
    #[error("residual capacity of {from} -> {into} would drop below zero")]
    ResidualUnderflow { from: NodeId, into: NodeId },
    #[error("no name was given for node {node}")]
    MissingName { node: NodeId },
}

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("error opening the file: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty file")]
    EmptyFile,
    #[error("input ended early, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("line {line}: {text:?} is not a valid count")]
    InvalidCount { line: usize, text: String },
    #[error("there should be a positive even number of nodes, got {count}")]
    OddNodeCount { count: i64 },
    #[error("edges must be greater than 0, got {count}")]
    NonPositiveEdgeCount { count: i64 },
    #[error("line {line}: name is invalid")]
    InvalidName { line: usize },
    #[error("line {line}: edge {text:?} is invalid")]
    InvalidEdge { line: usize, text: String },
    #[error("line {line}: edge endpoint {node} is outside 1..={node_count}")]
    EdgeOutOfRange { line: usize, node: i64, node_count: usize },
    #[error("line {line}: edge {from} - {into} does not cross the partitions")]
    SameSide { line: usize, from: NodeId, into: NodeId },
    #[error(transparent)]
    Network(#[from] FlowError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read the graph: {0}")]
    Prepare(#[from] PrepareError),
    #[error("failed during solving process: {0}")]
    Flow(#[from] FlowError),
}

pub type Result<T> = std::result::Result<T, Error>;
