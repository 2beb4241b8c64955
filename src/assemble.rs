use geo::algorithm::winding_order::Winding;
use geo_types::{LineString, Polygon};
use log::{debug, trace};
use rstar::{Envelope, RTree, RTreeObject, AABB};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::edge_ring::EdgeRing;
use crate::graph::ComponentId;
use crate::utils::parallel;

// Wrapper for a shell envelope to be indexable by rstar
struct IndexedShell {
    envelope: AABB<[f64; 2]>,
    index: usize,
}

impl RTreeObject for IndexedShell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Result of turning traced rings into polygons.
#[derive(Debug, Default)]
pub struct Assembly {
    pub polygons: Vec<Polygon<f64>>,
    /// Rings dropped for being degenerate or self-touching.
    pub invalid_rings: Vec<LineString<f64>>,
}

/// Relative tolerance when comparing a component's exterior with its face.
const SAME_AREA_TOLERANCE: f64 = 1e-9;

/// Classifies rings into shells and holes, nests each hole into its
/// innermost enclosing shell and emits one polygon per solid shell.
///
/// A component that is a single simple loop (one face, its exterior the same
/// ring reversed) flips between solid and void with nesting, so two nested
/// loops give a single polygon with a hole. Components with several faces are
/// always solid: every face is emitted and the component's exterior becomes a
/// hole of the enclosing face, so the output partitions the enclosed area.
///
/// Nesting is only known through valid exterior rings. When a component's
/// exterior is dropped (a self-touching outline with `allow_self_touching`
/// off), its faces are emitted without punching a hole in the enclosing
/// polygon, and the output polygons overlap there.
pub fn assemble(rings: Vec<EdgeRing>, allow_self_touching: bool) -> Assembly {
    let mut invalid_rings = Vec::new();
    let mut shells = Vec::new();
    let mut holes = Vec::new();

    for ring in rings {
        if !ring.is_valid(allow_self_touching) {
            trace!("dropping invalid ring {} (area {})", ring.id, ring.area());
            if !ring.is_degenerate() {
                invalid_rings.push(ring.ring().clone());
            }
            continue;
        }
        if ring.is_hole() {
            holes.push(ring);
        } else {
            shells.push(ring);
        }
    }

    let mut face_areas: HashMap<ComponentId, Vec<f64>> = HashMap::new();
    for shell in &shells {
        face_areas.entry(shell.component).or_default().push(shell.area());
    }
    let simple_loops: HashSet<ComponentId> = holes
        .iter()
        .filter(|hole| match face_areas.get(&hole.component).map(Vec::as_slice) {
            Some(&[face]) => same_area(face, hole.area()),
            _ => false,
        })
        .map(|hole| hole.component)
        .collect();

    // A hole whose own component yielded no usable face still encloses area.
    let (orphans, holes): (Vec<_>, Vec<_>) = holes
        .into_iter()
        .partition(|hole| !face_areas.contains_key(&hole.component));
    for orphan in orphans {
        debug!("promoting orphaned hole ring {} to a shell", orphan.id);
        shells.push(orphan);
    }

    let containers = find_containing_shells(&shells, &holes);

    // Each component has a single outer boundary, so it has at most one parent.
    let mut parent: HashMap<ComponentId, ComponentId> = HashMap::new();
    for (hole, container) in holes.iter().zip(&containers) {
        if let Some(shell_idx) = container {
            parent.insert(hole.component, shells[*shell_idx].component);
        }
    }
    let is_void = |component: ComponentId| component_is_void(component, &parent, &simple_loops);

    let mut shell_holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
    for (hole, container) in holes.iter().zip(&containers) {
        match container {
            Some(shell_idx) if !is_void(shells[*shell_idx].component) => {
                let mut interior = hole.ring().clone();
                interior.make_cw_winding();
                shell_holes[*shell_idx].push(interior);
            }
            Some(_) => trace!("hole ring {} sits in a void face", hole.id),
            None => trace!("hole ring {} is an outer boundary", hole.id),
        }
    }

    let mut polygons = Vec::with_capacity(shells.len());
    for (shell, interiors) in shells.iter().zip(shell_holes) {
        if is_void(shell.component) {
            trace!("shell ring {} bounds a void", shell.id);
            continue;
        }
        let mut exterior = shell.ring().clone();
        exterior.make_ccw_winding();
        polygons.push(Polygon::new(exterior, interiors));
    }

    debug!(
        "assembled {} polygons from {} shells and {} holes",
        polygons.len(),
        shells.len(),
        holes.len()
    );

    Assembly {
        polygons,
        invalid_rings,
    }
}

fn same_area(a: f64, b: f64) -> bool {
    (a - b).abs() <= SAME_AREA_TOLERANCE * a.max(b)
}

/// For each hole, the index of the smallest shell from another component
/// that contains it.
fn find_containing_shells(shells: &[EdgeRing], holes: &[EdgeRing]) -> Vec<Option<usize>> {
    let indexed_shells = shells
        .iter()
        .enumerate()
        .map(|(index, shell)| IndexedShell {
            envelope: shell.aabb(),
            index,
        })
        .collect();
    let tree = RTree::bulk_load(indexed_shells);

    parallel::map(holes, |hole| {
        let hole_aabb = hole.aabb();
        tree.locate_in_envelope_intersecting(&hole_aabb)
            .filter(|cand| cand.envelope.contains_envelope(&hole_aabb))
            .map(|cand| (cand.index, &shells[cand.index]))
            .filter(|(_, shell)| shell.component != hole.component && shell.contains_ring(hole))
            .min_by(|(a_idx, a), (b_idx, b)| {
                a.area()
                    .partial_cmp(&b.area())
                    .unwrap_or(Ordering::Equal)
                    .then(a_idx.cmp(b_idx))
            })
            .map(|(idx, _)| idx)
    })
}

/// Whether a component's faces are empty space.
///
/// Simple loops alternate with each level of nesting; the alternation starts
/// solid at the outermost component or at the nearest multi-face component.
fn component_is_void(
    component: ComponentId,
    parent: &HashMap<ComponentId, ComponentId>,
    simple_loops: &HashSet<ComponentId>,
) -> bool {
    let mut void = false;
    let mut current = component;
    let mut steps = 0;
    while simple_loops.contains(&current) {
        match parent.get(&current) {
            Some(&next) => {
                void = !void;
                current = next;
            }
            None => break,
        }
        steps += 1;
        // Containment is strict, so a longer chain means a cycle.
        if steps > parent.len() {
            break;
        }
    }
    void
}
