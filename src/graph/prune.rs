use log::debug;

use super::planar_graph::{EdgeId, NodeId, PlanarGraph};

/// Edges removed by `PlanarGraph::prune`, in removal order.
#[derive(Debug, Default, Clone)]
pub struct PruneOutcome {
    pub dangles: Vec<EdgeId>,
    pub cut_edges: Vec<EdgeId>,
}

impl PlanarGraph {
    /// Alternates dangle and cut-edge removal until neither changes the graph.
    pub fn prune(&mut self) -> PruneOutcome {
        let mut outcome = PruneOutcome::default();
        loop {
            outcome.dangles.extend(self.prune_dangles());
            let cut_edges = self.prune_cut_edges();
            if cut_edges.is_empty() {
                break;
            }
            outcome.cut_edges.extend(cut_edges);
        }
        debug!(
            "pruned {} dangles and {} cut edges",
            outcome.dangles.len(),
            outcome.cut_edges.len()
        );
        outcome
    }

    /// Prunes dangles (nodes with degree 1) from the graph iteratively.
    /// Returns the removed edges.
    pub fn prune_dangles(&mut self) -> Vec<EdgeId> {
        let mut removed = Vec::new();
        let mut to_process: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_removed && n.degree() == 1)
            .map(|(i, _)| i)
            .collect();

        while let Some(node_idx) = to_process.pop() {
            let node = &self.nodes[node_idx];
            if node.is_removed || node.degree() != 1 {
                continue;
            }

            let de = &self.directed_edges[node.outgoing_edges[0]];
            let edge_idx = de.edge_idx;
            let neighbor_idx = de.dst;

            self.remove_edge(edge_idx);
            removed.push(edge_idx);

            // Removing the edge can expose a new free end.
            let neighbor = &self.nodes[neighbor_idx];
            if !neighbor.is_removed && neighbor.degree() == 1 {
                to_process.push(neighbor_idx);
            }
        }
        removed
    }

    /// Removes every bridge: an edge whose removal disconnects its endpoints.
    ///
    /// Uses an iterative DFS with discovery/low-link numbering. The tree edge
    /// into a child is skipped by edge id rather than by parent node, so
    /// parallel edges count as cycles. Self-loops are never bridges.
    pub fn prune_cut_edges(&mut self) -> Vec<EdgeId> {
        let n = self.nodes.len();
        // 0 means undiscovered
        let mut disc = vec![0usize; n];
        let mut low = vec![0usize; n];
        let mut timer = 0;
        let mut bridges = Vec::new();

        // Frames: (node, edge used to reach it, next outgoing position)
        let mut stack: Vec<(NodeId, Option<EdgeId>, usize)> = Vec::new();

        for root in 0..n {
            if self.nodes[root].is_removed || disc[root] != 0 {
                continue;
            }

            timer += 1;
            disc[root] = timer;
            low[root] = timer;
            stack.push((root, None, 0));

            while let Some(&(node_idx, parent_edge, pos)) = stack.last() {
                let outgoing = &self.nodes[node_idx].outgoing_edges;
                if pos < outgoing.len() {
                    if let Some(top) = stack.last_mut() {
                        top.2 += 1;
                    }

                    let de = &self.directed_edges[outgoing[pos]];
                    if Some(de.edge_idx) == parent_edge {
                        continue;
                    }

                    let next = de.dst;
                    if disc[next] == 0 {
                        timer += 1;
                        disc[next] = timer;
                        low[next] = timer;
                        stack.push((next, Some(de.edge_idx), 0));
                    } else {
                        low[node_idx] = low[node_idx].min(disc[next]);
                    }
                } else {
                    stack.pop();
                    if let Some(&(parent_idx, _, _)) = stack.last() {
                        low[parent_idx] = low[parent_idx].min(low[node_idx]);
                        if low[node_idx] > disc[parent_idx] {
                            if let Some(edge_idx) = parent_edge {
                                bridges.push(edge_idx);
                            }
                        }
                    }
                }
            }
        }

        for &edge_idx in &bridges {
            self.remove_edge(edge_idx);
        }
        bridges
    }
}
