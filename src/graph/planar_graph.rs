use geo_types::{Coord, LineString};
use log::{debug, warn};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::edge_ring::EdgeRing;
use crate::error::{PolygonizerError, Result};
use crate::utils::parallel::iterate_mut;

// Type aliases for indices to ensure we don't mix them up
pub type NodeId = usize;
pub type EdgeId = usize;
pub type DirEdgeId = usize;
pub type RingId = usize;
pub type ComponentId = usize;

#[derive(Clone, Debug)]
pub struct Node {
    pub coordinate: Coord<f64>,
    /// Indices of live outgoing DirectedEdges.
    /// CRITICAL INVARIANT: Sorted by polar angle (CCW) once `sort_edges` has run.
    pub outgoing_edges: SmallVec<[DirEdgeId; 4]>,
    /// Connected component of the pruned graph, set by `label_components`.
    pub component: Option<ComponentId>,
    pub is_removed: bool,
}

impl Node {
    pub fn degree(&self) -> usize {
        self.outgoing_edges.len()
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    /// Full input geometry; interior vertices are carried into the rings.
    pub line: LineString<f64>,
    /// Indices of the two directed edges associated with this undirected edge.
    pub dir_edges: [DirEdgeId; 2],
    pub is_removed: bool,
}

#[derive(Clone, Debug)]
pub struct DirectedEdge {
    pub src: NodeId,
    pub dst: NodeId,
    /// Reference to the parent geometry (undirected edge)
    pub edge_idx: EdgeId,
    /// Index of the symmetric (reverse) edge
    pub sym_idx: DirEdgeId,
    /// Precomputed angle for efficient sorting
    pub angle: f64,
    /// Traversal state: has this edge been processed into a ring?
    pub is_visited: bool,
    pub is_removed: bool,
    /// Orientation in the parent LineString (true: same direction, false: opposite)
    pub edge_direction: bool,
    /// Ring this edge was traced into.
    pub ring: Option<RingId>,
}

pub struct PlanarGraph {
    /// All nodes in the graph. Index is `NodeId`.
    pub nodes: Vec<Node>,
    /// All undirected edges (geometry owners). Index is `EdgeId`.
    pub edges: Vec<Edge>,
    /// All directed half-edges. Index is `DirEdgeId`.
    pub directed_edges: Vec<DirectedEdge>,
    /// Lookup map to merge nodes sharing a coordinate.
    pub node_map: HashMap<NodeKey, NodeId>,
}

/// Exact-match key for a coordinate (f64 is not Hash).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NodeKey(u64, u64);

impl From<Coord<f64>> for NodeKey {
    fn from(c: Coord<f64>) -> Self {
        // -0.0 and 0.0 compare equal, so they must share a key.
        let x = if c.x == 0.0 { 0.0 } else { c.x };
        let y = if c.y == 0.0 { 0.0 } else { c.y };
        NodeKey(x.to_bits(), y.to_bits())
    }
}

impl Default for PlanarGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            directed_edges: Vec::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph with one edge per input line and sorts every node's
    /// outgoing edges, ready for pruning.
    pub fn build<I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = LineString<f64>>,
    {
        let mut graph = Self::new();
        for line in lines {
            graph.add_line_string(line)?;
        }
        graph.sort_edges();
        debug!(
            "built planar graph: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    pub fn add_node(&mut self, coord: Coord<f64>) -> NodeId {
        let key = NodeKey::from(coord);
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            coordinate: coord,
            outgoing_edges: SmallVec::new(),
            component: None,
            is_removed: false,
        });
        self.node_map.insert(key, id);
        id
    }

    /// Adds a line string as a single edge between its first and last coordinate.
    /// Assumes the line string is properly noded.
    ///
    /// Returns `Ok(None)` when the line is skipped: it has zero length, or it
    /// duplicates an edge that is already present.
    pub fn add_line_string(&mut self, line: LineString<f64>) -> Result<Option<EdgeId>> {
        if line.0.len() < 2 {
            return Err(PolygonizerError::TopologyError(format!(
                "a line needs at least 2 coordinates, found {}",
                line.0.len()
            )));
        }

        let mut coords = line.0;
        coords.dedup();
        if coords.len() < 2 {
            warn!("skipping zero-length line at {:?}", coords[0]);
            return Ok(None);
        }

        let p0 = coords[0];
        let p1 = coords[coords.len() - 1];
        let u = self.add_node(p0);
        let v = self.add_node(p1);

        if self.has_duplicate_edge(u, v, &coords) {
            debug!("skipping duplicate line between {:?} and {:?}", p0, p1);
            return Ok(None);
        }

        let edge_idx = self.edges.len();
        let de_u_v_idx = self.directed_edges.len();
        let de_v_u_idx = self.directed_edges.len() + 1;

        // Angles follow the first segment leaving each end.
        let q0 = coords[1];
        let q1 = coords[coords.len() - 2];
        let angle_u = (q0.y - p0.y).atan2(q0.x - p0.x);
        let angle_v = (q1.y - p1.y).atan2(q1.x - p1.x);

        self.directed_edges.push(DirectedEdge {
            src: u,
            dst: v,
            edge_idx,
            sym_idx: de_v_u_idx,
            angle: angle_u,
            is_visited: false,
            is_removed: false,
            edge_direction: true,
            ring: None,
        });

        self.directed_edges.push(DirectedEdge {
            src: v,
            dst: u,
            edge_idx,
            sym_idx: de_u_v_idx,
            angle: angle_v,
            is_visited: false,
            is_removed: false,
            edge_direction: false,
            ring: None,
        });

        self.edges.push(Edge {
            line: LineString::new(coords),
            dir_edges: [de_u_v_idx, de_v_u_idx],
            is_removed: false,
        });

        self.nodes[u].outgoing_edges.push(de_u_v_idx);
        self.nodes[v].outgoing_edges.push(de_v_u_idx);

        Ok(Some(edge_idx))
    }

    fn has_duplicate_edge(&self, u: NodeId, v: NodeId, coords: &[Coord<f64>]) -> bool {
        self.nodes[u].outgoing_edges.iter().any(|&de_idx| {
            let de = &self.directed_edges[de_idx];
            if de.dst != v {
                return false;
            }
            let existing = &self.edges[de.edge_idx].line.0;
            if existing.len() != coords.len() {
                return false;
            }
            if de.edge_direction {
                existing.as_slice() == coords
            } else {
                existing.iter().rev().eq(coords.iter())
            }
        })
    }

    /// Sorts all outgoing edges of all nodes by angle.
    /// Ties keep insertion order since the sort is stable.
    pub fn sort_edges(&mut self) {
        let directed_edges = &self.directed_edges;
        iterate_mut(&mut self.nodes, |node| {
            node.outgoing_edges.sort_by(|&a_idx, &b_idx| {
                directed_edges[a_idx]
                    .angle
                    .total_cmp(&directed_edges[b_idx].angle)
            });
        });
    }

    /// Removes an edge and both of its directed edges. Nodes left without
    /// edges are removed as well. Angular order at the endpoints is preserved.
    pub fn remove_edge(&mut self, edge_idx: EdgeId) {
        if self.edges[edge_idx].is_removed {
            return;
        }
        self.edges[edge_idx].is_removed = true;

        for de_idx in self.edges[edge_idx].dir_edges {
            self.directed_edges[de_idx].is_removed = true;
            let src = self.directed_edges[de_idx].src;
            let node = &mut self.nodes[src];
            node.outgoing_edges.retain(|idx| *idx != de_idx);
            if node.outgoing_edges.is_empty() {
                node.is_removed = true;
            }
        }
    }

    /// Iterates over the edges that survived pruning.
    pub fn live_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().filter(|(_, e)| !e.is_removed)
    }

    /// Coordinates of a directed edge in traversal order.
    pub fn directed_coords(&self, de_idx: DirEdgeId) -> Box<dyn Iterator<Item = Coord<f64>> + '_> {
        let de = &self.directed_edges[de_idx];
        let coords = self.edges[de.edge_idx].line.0.iter().copied();
        if de.edge_direction {
            Box::new(coords)
        } else {
            Box::new(coords.rev())
        }
    }

    /// Labels every live node with its connected component and returns the
    /// number of components.
    pub fn label_components(&mut self) -> usize {
        for node in &mut self.nodes {
            node.component = None;
        }

        let mut count = 0;
        let mut stack = Vec::new();
        for root in 0..self.nodes.len() {
            if self.nodes[root].is_removed || self.nodes[root].component.is_some() {
                continue;
            }

            self.nodes[root].component = Some(count);
            stack.push(root);
            while let Some(node_idx) = stack.pop() {
                for i in 0..self.nodes[node_idx].outgoing_edges.len() {
                    let dst = self.directed_edges[self.nodes[node_idx].outgoing_edges[i]].dst;
                    if self.nodes[dst].component.is_none() {
                        self.nodes[dst].component = Some(count);
                        stack.push(dst);
                    }
                }
            }
            count += 1;
        }
        count
    }

    /// Extracts rings from the graph using the Next-CCW rule.
    ///
    /// Bounded faces come out clockwise, the outer boundary of each connected
    /// component counter-clockwise. Every live directed edge ends up in
    /// exactly one ring.
    pub fn get_edge_rings(&mut self) -> Result<Vec<EdgeRing>> {
        let mut rings = Vec::new();
        let components = self.label_components();

        // Reset traversal state
        for de in &mut self.directed_edges {
            de.is_visited = false;
            de.ring = None;
        }

        for start_de_idx in 0..self.directed_edges.len() {
            if self.directed_edges[start_de_idx].is_visited
                || self.directed_edges[start_de_idx].is_removed
            {
                continue;
            }

            let ring_id = rings.len();
            let mut ring_edges = Vec::new();
            let mut curr_de_idx = start_de_idx;

            loop {
                let curr_de = &mut self.directed_edges[curr_de_idx];
                curr_de.is_visited = true;
                curr_de.ring = Some(ring_id);
                ring_edges.push(curr_de_idx);

                let next_de_idx = self.next_ring_edge(curr_de_idx)?;
                if next_de_idx == start_de_idx {
                    break; // Ring closed
                }

                if self.directed_edges[next_de_idx].is_visited {
                    let node = &self.nodes[self.directed_edges[next_de_idx].src];
                    return Err(PolygonizerError::TopologyError(format!(
                        "ring tracing re-entered a used edge at {:?}; input is not correctly noded",
                        node.coordinate
                    )));
                }
                curr_de_idx = next_de_idx;
            }

            rings.push(self.build_ring(ring_id, ring_edges));
        }

        debug!(
            "traced {} edge rings over {} components",
            rings.len(),
            components
        );
        Ok(rings)
    }

    /// The continuation of `de_idx`: the outgoing edge that follows its
    /// symmetric edge in the destination's angular order.
    fn next_ring_edge(&self, de_idx: DirEdgeId) -> Result<DirEdgeId> {
        let de = &self.directed_edges[de_idx];
        let dst_node = &self.nodes[de.dst];

        let idx_in_list = dst_node
            .outgoing_edges
            .iter()
            .position(|&idx| idx == de.sym_idx)
            .ok_or_else(|| {
                PolygonizerError::TopologyError(format!(
                    "no continuation edge at {:?}",
                    dst_node.coordinate
                ))
            })?;

        let len = dst_node.outgoing_edges.len();
        Ok(dst_node.outgoing_edges[(idx_in_list + 1) % len])
    }

    fn build_ring(&self, ring_id: RingId, ring_edges: Vec<DirEdgeId>) -> EdgeRing {
        let mut coords = Vec::with_capacity(ring_edges.len() + 1);
        for (i, &de_idx) in ring_edges.iter().enumerate() {
            // Each edge starts where the previous one ended.
            let skip = usize::from(i > 0);
            coords.extend(self.directed_coords(de_idx).skip(skip));
        }

        let start_node = self.directed_edges[ring_edges[0]].src;
        let component = self.nodes[start_node].component.unwrap_or(0);
        EdgeRing::new(ring_id, component, ring_edges, LineString::new(coords))
    }
}
