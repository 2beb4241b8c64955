pub mod planar_graph;
mod prune;

#[cfg(test)]
mod tests;

pub use planar_graph::{
    ComponentId, DirEdgeId, DirectedEdge, Edge, EdgeId, Node, NodeId, NodeKey, PlanarGraph,
    RingId,
};
pub use prune::PruneOutcome;
