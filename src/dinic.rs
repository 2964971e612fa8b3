use log::{debug, trace};
use std::collections::VecDeque;

use crate::error::FlowError;
use crate::graph::{Capacity, FlowNetwork, NodeId};

type Result<T> = std::result::Result<T, FlowError>;

/// Blocking-flow (Dinic) max flow over a borrowed [`FlowNetwork`].
/// The network is left in its final residual state.
#[derive(Debug)]
pub struct BlockingFlowSolver<'g> {
    network: &'g mut FlowNetwork,
    // BFS layer of every node in the current level graph, None if unreached
    depth: Vec<Option<usize>>,
    // per-phase copy of the residual capacities; dead ends are closed here only
    flow_remaining: Vec<Vec<Capacity>>,
}

impl<'g> BlockingFlowSolver<'g> {
    pub fn new(network: &'g mut FlowNetwork) -> Self {
        let node_count = network.node_count();
        BlockingFlowSolver {
            network,
            depth: vec![None; node_count],
            flow_remaining: vec![vec![0; node_count]; node_count],
        }
    }

    pub fn network(&self) -> &FlowNetwork {
        &*self.network
    }

    pub fn depth(&self, node: NodeId) -> Option<usize> {
        self.depth.get(node).copied().flatten()
    }

    /// Runs phases until the sink drops out of the level graph and returns the total flow pushed.
    pub fn max_flow(&mut self, source: NodeId, sink: NodeId) -> Result<Capacity> {
        self.network.check_node(source)?;
        self.network.check_node(sink)?;

        let mut total: Capacity = 0;
        let mut phase = 0;
        while self.build_level_graph(source, sink) {
            phase += 1;
            debug!(
                "phase {phase}: sink reached at depth {:?}",
                self.depth(sink)
            );
            self.snapshot();
            let mut phase_flow = 0;
            while let Some(path) = self.find_path(source, sink) {
                phase_flow += self.augment(&path)?;
            }
            debug!("phase {phase}: blocking flow of {phase_flow}");
            total += phase_flow;
        }
        debug!("sink unreachable after {phase} phases, max flow {total}");
        Ok(total)
    }

    /// Layers the residual graph by BFS distance from `source`.
    /// Stops as soon as `sink` gets a depth; false if it never does.
    pub fn build_level_graph(&mut self, source: NodeId, sink: NodeId) -> bool {
        self.depth.fill(None);
        let Some(slot) = self.depth.get_mut(source) else {
            return false;
        };
        *slot = Some(0);

        let mut queue = VecDeque::with_capacity(self.depth.len());
        queue.push_back((source, 0));
        while let Some((node, node_depth)) = queue.pop_front() {
            for next in self.network.neighbors(node) {
                if self.depth[next].is_some() {
                    continue;
                }
                self.depth[next] = Some(node_depth + 1);
                if next == sink {
                    return true;
                }
                queue.push_back((next, node_depth + 1));
            }
        }
        false
    }

    fn snapshot(&mut self) {
        for (remaining, live) in self
            .flow_remaining
            .iter_mut()
            .zip(self.network.residual_view())
        {
            remaining.copy_from_slice(live);
        }
    }

    /// Next level-graph arc out of `node` with capacity left in this phase.
    fn advance(&self, node: NodeId) -> Option<NodeId> {
        let next_depth = self.depth[node]? + 1;
        let remaining = &self.flow_remaining[node];
        self.network
            .neighbors(node)
            .find(|next| self.depth[*next] == Some(next_depth) && remaining[*next] > 0)
    }

    /// Closes every arc into a dead end for the rest of the phase.
    fn close_node(&mut self, node: NodeId) {
        for row in self.flow_remaining.iter_mut() {
            row[node] = 0;
        }
    }

    /// Depth-first walk along the level graph, retreating out of dead ends.
    /// The returned path starts at `source` and ends at `sink`.
    pub fn find_path(&mut self, source: NodeId, sink: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![source];
        loop {
            let node = *path.last()?;
            if node == sink {
                return Some(path);
            }
            match self.advance(node) {
                Some(next) => path.push(next),
                None if node == source => return None,
                None => {
                    trace!("dead end at {node}");
                    self.close_node(node);
                    path.pop();
                }
            }
        }
    }

    /// Pushes the path's bottleneck along it, on both the snapshot and the network.
    fn augment(&mut self, path: &[NodeId]) -> Result<Capacity> {
        let bottleneck = path
            .windows(2)
            .map(|arc| self.flow_remaining[arc[0]][arc[1]])
            .min()
            .unwrap_or(0);
        for arc in path.windows(2) {
            let (from, into) = (arc[0], arc[1]);
            self.network.push_flow(from, into, bottleneck)?;
            self.flow_remaining[from][into] -= bottleneck;
            self.flow_remaining[into][from] += bottleneck;
        }
        trace!("augmented {bottleneck} along {path:?}");
        Ok(bottleneck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// partition size, bipartite edges (left, right)
    fn bipartite(size: usize, edges: &[(NodeId, NodeId)]) -> FlowNetwork {
        let mut network = FlowNetwork::new(size).unwrap();
        for (left, right) in edges {
            network.add_edge(*left, *right, 1).unwrap();
        }
        network.attach_source_and_sink(0, size + 1).unwrap();
        network
    }

    fn solve(network: &mut FlowNetwork) -> Capacity {
        let sink = network.sink();
        BlockingFlowSolver::new(network).max_flow(0, sink).unwrap()
    }

    /// Largest matching by trying every subset of edges.
    fn brute_force_matching(edges: &[(NodeId, NodeId)]) -> usize {
        let mut best = 0;
        for mask in 0u32..(1 << edges.len()) {
            let chosen: Vec<_> = (0..edges.len())
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| edges[i])
                .collect();
            let mut lefts: Vec<_> = chosen.iter().map(|e| e.0).collect();
            let mut rights: Vec<_> = chosen.iter().map(|e| e.1).collect();
            lefts.sort();
            lefts.dedup();
            rights.sort();
            rights.dedup();
            if lefts.len() == chosen.len() && rights.len() == chosen.len() {
                best = best.max(chosen.len());
            }
        }
        best
    }

    #[test]
    fn test_single_edge() {
        init();
        let mut network = bipartite(2, &[(1, 2)]);
        assert_eq!(solve(&mut network), 1);
        assert_eq!(network.matched_nodes(), vec![(1, 2)]);
    }

    #[test]
    fn test_no_edges() {
        init();
        let mut network = bipartite(2, &[]);
        assert_eq!(solve(&mut network), 0);
        assert!(network.matched_nodes().is_empty());
    }

    #[test]
    fn test_two_by_two() {
        init();
        let mut network = bipartite(4, &[(1, 3), (1, 4), (2, 3)]);
        assert_eq!(solve(&mut network), 2);
        assert_eq!(network.matched_nodes(), vec![(1, 4), (2, 3)]);
    }

    #[test]
    fn test_needs_flow_cancellation() {
        init();
        // the first phase takes 1-4, which blocks 2; the second phase reroutes through 4 -> 1
        let mut network = bipartite(6, &[(1, 4), (1, 5), (2, 4), (3, 6)]);
        assert_eq!(solve(&mut network), 3);
        let matched = network.matched_nodes();
        assert_eq!(matched.len(), 3);
        assert!(matched.contains(&(2, 4)));
        assert!(matched.contains(&(1, 5)));
    }

    #[test]
    fn test_complete_graph_is_perfect() {
        init();
        let half = 5;
        let edges: Vec<_> = (1..=half)
            .flat_map(|l| (half + 1..=2 * half).map(move |r| (l, r)))
            .collect();
        let mut network = bipartite(2 * half, &edges);
        assert_eq!(solve(&mut network), half as Capacity);
    }

    #[test]
    fn test_out_of_range() {
        let mut network = bipartite(2, &[(1, 2)]);
        let mut solver = BlockingFlowSolver::new(&mut network);
        assert_eq!(
            solver.max_flow(0, 4).unwrap_err(),
            FlowError::OutOfRange {
                node: 4,
                node_count: 4
            }
        );
        assert!(solver.max_flow(7, 3).is_err());
        // nothing was touched
        assert_eq!(network.capacity(0, 1), 1);
    }

    #[test]
    fn test_level_graph_depths() {
        let mut network = bipartite(4, &[(1, 3), (2, 4)]);
        let mut solver = BlockingFlowSolver::new(&mut network);
        assert!(solver.build_level_graph(0, 5));
        assert_eq!(solver.depth(0), Some(0));
        assert_eq!(solver.depth(1), Some(1));
        assert_eq!(solver.depth(3), Some(2));
        assert_eq!(solver.depth(5), Some(3));
    }

    #[test]
    fn test_level_graph_unreachable_after_solve() {
        let mut network = bipartite(4, &[(1, 3), (1, 4), (2, 3)]);
        let mut solver = BlockingFlowSolver::new(&mut network);
        solver.max_flow(0, 5).unwrap();
        assert!(!solver.build_level_graph(0, 5));
        assert!(!solver.build_level_graph(0, 5));
        assert_eq!(solver.max_flow(0, 5).unwrap(), 0);
    }

    #[test]
    fn test_general_capacities() {
        let mut network = FlowNetwork::new(4).unwrap();
        for (from, into, capacity) in [
            (0, 1, 10),
            (0, 2, 10),
            (1, 3, 4),
            (1, 4, 8),
            (2, 4, 9),
            (3, 5, 10),
            (4, 3, 6),
            (4, 5, 10),
        ] {
            network.add_edge(from, into, capacity).unwrap();
        }
        assert_eq!(solve(&mut network), 19);
    }

    #[test]
    fn test_random_graphs_match_brute_force() {
        init();
        let mut rng = rand::rng();
        for _ in 0..100 {
            let half: usize = rng.random_range(1..=5);
            let mut edges = Vec::new();
            for left in 1..=half {
                for right in half + 1..=2 * half {
                    if edges.len() < 12 && rng.random_bool(0.4) {
                        edges.push((left, right));
                    }
                }
            }
            let mut network = bipartite(2 * half, &edges);
            let flow = solve(&mut network) as usize;
            assert_eq!(flow, brute_force_matching(&edges), "edges: {edges:?}");

            let matched = network.matched_nodes();
            assert_eq!(matched.len(), flow);
            for pair in &matched {
                assert!(edges.contains(pair), "{pair:?} is not an input edge");
            }
            let mut lefts: Vec<_> = matched.iter().map(|p| p.0).collect();
            let mut rights: Vec<_> = matched.iter().map(|p| p.1).collect();
            lefts.dedup();
            rights.sort();
            rights.dedup();
            assert_eq!(lefts.len(), flow);
            assert_eq!(rights.len(), flow);
        }
    }

    #[test]
    fn test_deterministic() {
        let edges = [(1, 5), (1, 6), (2, 5), (3, 7), (3, 8), (4, 8), (4, 5)];
        let mut first = bipartite(8, &edges);
        let mut second = bipartite(8, &edges);
        assert_eq!(solve(&mut first), solve(&mut second));
        assert_eq!(first.residual_view(), second.residual_view());
        assert_eq!(first.matched_nodes(), second.matched_nodes());
    }
}
