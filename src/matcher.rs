use log::info;
use std::fmt::{self, Display};
use std::path::Path;

use crate::dinic::BlockingFlowSolver;
use crate::error::Result;
use crate::graph::{Capacity, Matching};
use crate::prepare::GraphPrepare;

/// Loads a bipartite graph and matches it through a unit-capacity flow network.
#[derive(Debug, Clone)]
pub struct BipartiteMatcher {
    graph: GraphPrepare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub flow: Capacity,
    pub matching: Matching,
}

impl Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.matching, f)
    }
}

impl BipartiteMatcher {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(GraphPrepare::read_file(path)?))
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::new(GraphPrepare::parse(text)?))
    }

    pub fn new(graph: GraphPrepare) -> Self {
        BipartiteMatcher { graph }
    }

    pub fn graph(&self) -> &GraphPrepare {
        &self.graph
    }

    pub fn solve(&self) -> Result<Solution> {
        let mut network = self.graph.build_network()?;
        let (source, sink) = (network.source(), network.sink());
        network.attach_source_and_sink(source, sink)?;

        let flow = BlockingFlowSolver::new(&mut network).max_flow(source, sink)?;
        let matching = network.extract_matching(self.graph.names())?;
        info!(
            "max flow {flow}, {} of {} left nodes matched",
            matching.total(),
            self.graph.nodes() / 2
        );
        Ok(Solution { flow, matching })
    }
}
