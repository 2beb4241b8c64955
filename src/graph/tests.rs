use crate::error::PolygonizerError;
use crate::graph::planar_graph::{NodeKey, PlanarGraph};
use geo_types::{Coord, LineString};

fn node_at(graph: &PlanarGraph, x: f64, y: f64) -> usize {
    graph.node_map[&NodeKey::from(Coord::from((x, y)))]
}

fn graph_from(lines: Vec<Vec<(f64, f64)>>) -> PlanarGraph {
    PlanarGraph::build(lines.into_iter().map(LineString::from)).unwrap()
}

fn unit_square() -> Vec<Vec<(f64, f64)>> {
    vec![
        vec![(0.0, 0.0), (0.0, 1.0)],
        vec![(0.0, 1.0), (1.0, 1.0)],
        vec![(1.0, 1.0), (1.0, 0.0)],
        vec![(1.0, 0.0), (0.0, 0.0)],
    ]
}

#[test]
fn test_graph_construction() {
    let mut graph = PlanarGraph::new();
    let l1 = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
    let l2 = LineString::from(vec![(0.0, 0.0), (0.0, 10.0)]);

    graph.add_line_string(l1).unwrap();
    graph.add_line_string(l2).unwrap();

    assert_eq!(graph.nodes.len(), 3); // (0,0), (10,0), (0,10)
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.directed_edges.len(), 4);

    // Node at (0,0) should have 2 outgoing edges
    let center_node_idx = node_at(&graph, 0.0, 0.0);
    assert_eq!(graph.nodes[center_node_idx].degree(), 2);
}

#[test]
fn test_symmetric_pairs() {
    let graph = graph_from(unit_square());
    for (i, de) in graph.directed_edges.iter().enumerate() {
        let sym = &graph.directed_edges[de.sym_idx];
        assert_eq!(sym.sym_idx, i);
        assert_eq!(sym.src, de.dst);
        assert_eq!(sym.dst, de.src);
        assert_eq!(sym.edge_idx, de.edge_idx);
    }
}

#[test]
fn test_interior_vertices_are_kept() {
    let graph = graph_from(vec![vec![(0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)]]);
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges[0].line.0.len(), 4);

    // The reverse edge leaves (4,0) toward (3,2), not toward (0,0).
    let reverse = &graph.directed_edges[graph.edges[0].dir_edges[1]];
    let expected = (2.0f64).atan2(-1.0);
    assert!((reverse.angle - expected).abs() < 1e-12);
}

#[test]
fn test_short_line_is_rejected() {
    let mut graph = PlanarGraph::new();
    let err = graph
        .add_line_string(LineString::from(vec![(1.0, 1.0)]))
        .unwrap_err();
    assert!(matches!(err, PolygonizerError::TopologyError(_)));
}

#[test]
fn test_zero_length_line_is_skipped() {
    let mut graph = PlanarGraph::new();
    let added = graph
        .add_line_string(LineString::from(vec![(1.0, 1.0), (1.0, 1.0)]))
        .unwrap();
    assert!(added.is_none());
    assert!(graph.edges.is_empty());
}

#[test]
fn test_duplicate_line_is_skipped() {
    let mut graph = PlanarGraph::new();
    let first = graph
        .add_line_string(LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]))
        .unwrap();
    let reversed = graph
        .add_line_string(LineString::from(vec![(2.0, 0.0), (1.0, 1.0), (0.0, 0.0)]))
        .unwrap();
    let other_path = graph
        .add_line_string(LineString::from(vec![(0.0, 0.0), (1.0, -1.0), (2.0, 0.0)]))
        .unwrap();

    assert!(first.is_some());
    assert!(reversed.is_none());
    assert!(other_path.is_some());
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn test_negative_zero_merges_with_zero() {
    let graph = graph_from(vec![
        vec![(0.0, 0.0), (1.0, 0.0)],
        vec![(1.0, 0.0), (-0.0, -0.0)],
    ]);
    assert_eq!(graph.nodes.len(), 2);
}

#[test]
fn test_edge_sorting() {
    let mut graph = PlanarGraph::new();
    // Add 4 edges radiating from (0,0)
    // 1. Right (0 degrees) -> dx=10, dy=0
    graph.add_line_string(LineString::from(vec![(0.0, 0.0), (10.0, 0.0)])).unwrap();
    // 2. Up (90 degrees) -> dx=0, dy=10
    graph.add_line_string(LineString::from(vec![(0.0, 0.0), (0.0, 10.0)])).unwrap();
    // 3. Left (180 degrees) -> dx=-10, dy=0
    graph.add_line_string(LineString::from(vec![(0.0, 0.0), (-10.0, 0.0)])).unwrap();
    // 4. Down (-90 degrees) -> dx=0, dy=-10
    graph.add_line_string(LineString::from(vec![(0.0, 0.0), (0.0, -10.0)])).unwrap();

    graph.sort_edges();

    let center_node_idx = node_at(&graph, 0.0, 0.0);
    let edges = &graph.nodes[center_node_idx].outgoing_edges;
    assert_eq!(edges.len(), 4);

    // Ascending angle from the +X axis: Down, Right, Up, Left
    let get_dst = |idx: usize| -> Coord<f64> {
        let dst_node_idx = graph.directed_edges[idx].dst;
        graph.nodes[dst_node_idx].coordinate
    };

    assert_eq!(get_dst(edges[0]), Coord { x: 0.0, y: -10.0 });
    assert_eq!(get_dst(edges[1]), Coord { x: 10.0, y: 0.0 });
    assert_eq!(get_dst(edges[2]), Coord { x: 0.0, y: 10.0 });
    assert_eq!(get_dst(edges[3]), Coord { x: -10.0, y: 0.0 });
}

#[test]
fn test_dangle_pruning() {
    let mut graph = graph_from(vec![
        // Triangle with a dangle
        vec![(0.0, 0.0), (10.0, 0.0)],
        vec![(10.0, 0.0), (0.0, 10.0)],
        vec![(0.0, 10.0), (0.0, 0.0)],
        // Dangle at B
        vec![(10.0, 0.0), (20.0, 0.0)],
    ]);

    let dangles = graph.prune_dangles();
    assert_eq!(dangles, vec![3]);

    let b_idx = node_at(&graph, 10.0, 0.0);
    assert_eq!(graph.nodes[b_idx].degree(), 2);
    assert!(graph.nodes[node_at(&graph, 20.0, 0.0)].is_removed);

    // A second pass has nothing left to do.
    assert!(graph.prune_dangles().is_empty());
}

#[test]
fn test_dangle_chain_is_pruned_to_fixed_point() {
    let mut lines = unit_square();
    lines.push(vec![(1.0, 1.0), (2.0, 2.0)]);
    lines.push(vec![(2.0, 2.0), (3.0, 2.0)]);
    lines.push(vec![(3.0, 2.0), (4.0, 3.0)]);
    let mut graph = graph_from(lines);

    let dangles = graph.prune_dangles();
    assert_eq!(dangles.len(), 3);
    assert_eq!(graph.live_edges().count(), 4);
    assert_eq!(graph.nodes[node_at(&graph, 1.0, 1.0)].degree(), 2);
}

#[test]
fn test_isolated_line_is_pruned() {
    let mut graph = graph_from(vec![vec![(0.0, 0.0), (5.0, 5.0)]]);
    assert_eq!(graph.prune_dangles().len(), 1);
    assert!(graph.nodes.iter().all(|n| n.is_removed));
}

#[test]
fn test_cut_edge_pruning() {
    // Two squares joined by a bridge from (1,0) to (3,0)
    let mut lines = unit_square();
    lines.push(vec![(3.0, 0.0), (3.0, 1.0)]);
    lines.push(vec![(3.0, 1.0), (4.0, 1.0)]);
    lines.push(vec![(4.0, 1.0), (4.0, 0.0)]);
    lines.push(vec![(4.0, 0.0), (3.0, 0.0)]);
    lines.push(vec![(1.0, 0.0), (3.0, 0.0)]);
    let mut graph = graph_from(lines);

    assert!(graph.prune_dangles().is_empty());
    let bridges = graph.prune_cut_edges();
    assert_eq!(bridges, vec![8]);
    assert_eq!(graph.nodes[node_at(&graph, 1.0, 0.0)].degree(), 2);
    assert_eq!(graph.nodes[node_at(&graph, 3.0, 0.0)].degree(), 2);
}

#[test]
fn test_parallel_edges_are_not_bridges() {
    // A lens: two different paths between the same nodes
    let mut graph = graph_from(vec![
        vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)],
        vec![(0.0, 0.0), (1.0, -1.0), (2.0, 0.0)],
    ]);
    assert!(graph.prune_cut_edges().is_empty());
}

#[test]
fn test_self_loop_is_not_a_bridge() {
    let mut graph = graph_from(vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]]);
    assert!(graph.prune_dangles().is_empty());
    assert!(graph.prune_cut_edges().is_empty());
    assert_eq!(graph.get_edge_rings().unwrap().len(), 2);
}

#[test]
fn test_bridge_removal_alternates_with_dangles() {
    // Square, bridge to a square, plus a tail hanging off the bridge's middle
    let mut lines = unit_square();
    lines.push(vec![(3.0, 0.0), (3.0, 1.0)]);
    lines.push(vec![(3.0, 1.0), (4.0, 1.0)]);
    lines.push(vec![(4.0, 1.0), (4.0, 0.0)]);
    lines.push(vec![(4.0, 0.0), (3.0, 0.0)]);
    lines.push(vec![(1.0, 0.0), (2.0, 0.0)]);
    lines.push(vec![(2.0, 0.0), (3.0, 0.0)]);
    lines.push(vec![(2.0, 0.0), (2.0, -1.0)]);
    let mut graph = graph_from(lines);

    let outcome = graph.prune();
    assert_eq!(outcome.dangles, vec![10]);
    assert_eq!(outcome.cut_edges.len(), 2);
    assert_eq!(graph.live_edges().count(), 8);
    assert!(graph.nodes[node_at(&graph, 2.0, 0.0)].is_removed);
}

#[test]
fn test_simple_cycle() {
    let mut graph = graph_from(vec![
        // Triangle
        vec![(0.0, 0.0), (10.0, 0.0)],
        vec![(10.0, 0.0), (0.0, 10.0)],
        vec![(0.0, 10.0), (0.0, 0.0)],
    ]);

    let rings = graph.get_edge_rings().unwrap();
    assert_eq!(rings.len(), 2);

    // One face ring and one outer boundary
    let holes = rings.iter().filter(|r| r.is_hole()).count();
    assert_eq!(holes, 1);
    assert!(rings.iter().all(|r| (r.area() - 50.0).abs() < 1e-9));
}

#[test]
fn test_every_directed_edge_gets_one_ring() {
    let mut graph = graph_from(unit_square());
    let rings = graph.get_edge_rings().unwrap();

    let traced: usize = rings.iter().map(|r| r.dir_edges.len()).sum();
    assert_eq!(traced, graph.directed_edges.len());
    for ring in &rings {
        for &de in &ring.dir_edges {
            assert_eq!(graph.directed_edges[de].ring, Some(ring.id));
        }
    }
}

#[test]
fn test_shared_edge_sides_belong_to_different_rings() {
    let mut lines = unit_square();
    lines.push(vec![(1.0, 0.0), (2.0, 0.0)]);
    lines.push(vec![(2.0, 0.0), (2.0, 1.0)]);
    lines.push(vec![(2.0, 1.0), (1.0, 1.0)]);
    let mut graph = graph_from(lines);

    let rings = graph.get_edge_rings().unwrap();
    // Two faces plus the outer boundary
    assert_eq!(rings.len(), 3);

    // The shared edge is (1,1)-(1,0), the third input line.
    let [forward, backward] = graph.edges[2].dir_edges;
    let a = graph.directed_edges[forward].ring;
    let b = graph.directed_edges[backward].ring;
    assert!(a.is_some() && b.is_some());
    assert_ne!(a, b);
}

#[test]
fn test_rings_reproduce_line_shapes() {
    let mut graph = graph_from(vec![
        vec![(0.0, 0.0), (2.0, -1.0), (4.0, 0.0)],
        vec![(4.0, 0.0), (4.0, 4.0)],
        vec![(4.0, 4.0), (2.0, 5.0), (0.0, 4.0), (0.0, 0.0)],
    ]);

    let rings = graph.get_edge_rings().unwrap();
    for ring in &rings {
        // 6 distinct vertices plus the closing one
        assert_eq!(ring.ring().0.len(), 7);
        assert_eq!(ring.ring().0.first(), ring.ring().0.last());
    }
}

#[test]
fn test_components_are_labelled() {
    let mut lines = unit_square();
    lines.push(vec![(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]);
    let mut graph = graph_from(lines);

    assert_eq!(graph.label_components(), 2);
    let a = graph.nodes[node_at(&graph, 0.0, 0.0)].component;
    let b = graph.nodes[node_at(&graph, 1.0, 1.0)].component;
    let c = graph.nodes[node_at(&graph, 5.0, 5.0)].component;
    assert_eq!(a, b);
    assert_ne!(a, c);
}
