use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Area, BoundingRect};
use geo_types::{Coord, LineString, Polygon, Rect};
use rstar::AABB;
use std::collections::HashSet;

use crate::graph::{ComponentId, DirEdgeId, NodeKey, RingId};

/// Rings whose area is below this fraction of their squared envelope diagonal
/// count as zero-area.
const AREA_TOLERANCE: f64 = 1e-12;

/// A closed cycle of directed edges traced around one face of the graph.
///
/// Clockwise rings bound faces and are shell candidates. Counter-clockwise
/// rings are the outer boundary of a connected component and are hole
/// candidates.
#[derive(Clone, Debug)]
pub struct EdgeRing {
    pub id: RingId,
    pub component: ComponentId,
    pub dir_edges: Vec<DirEdgeId>,
    // The ring wrapped as a polygon exterior so geo's area and position
    // algorithms apply directly.
    polygon: Polygon<f64>,
    signed_area: f64,
    envelope: Rect<f64>,
    distinct_vertices: usize,
    is_self_touching: bool,
}

impl EdgeRing {
    /// Wraps a closed coordinate sequence. `ring` must end on its first coordinate.
    pub fn new(
        id: RingId,
        component: ComponentId,
        dir_edges: Vec<DirEdgeId>,
        ring: LineString<f64>,
    ) -> Self {
        let open = ring.0.split_last().map_or(&[][..], |(_, rest)| rest);
        let distinct: HashSet<NodeKey> = open.iter().map(|&c| NodeKey::from(c)).collect();
        let distinct_vertices = distinct.len();
        let is_self_touching = distinct_vertices < open.len();

        let origin = ring.0.first().copied().unwrap_or(Coord { x: 0.0, y: 0.0 });
        let envelope = ring
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(origin, origin));

        let polygon = Polygon::new(ring, vec![]);
        let signed_area = polygon.signed_area();

        Self {
            id,
            component,
            dir_edges,
            polygon,
            signed_area,
            envelope,
            distinct_vertices,
            is_self_touching,
        }
    }

    /// The closed coordinate sequence, in traversal order.
    pub fn ring(&self) -> &LineString<f64> {
        self.polygon.exterior()
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    pub fn is_hole(&self) -> bool {
        self.signed_area > 0.0
    }

    pub fn envelope(&self) -> Rect<f64> {
        self.envelope
    }

    pub fn aabb(&self) -> AABB<[f64; 2]> {
        let min = self.envelope.min();
        let max = self.envelope.max();
        AABB::from_corners([min.x, min.y], [max.x, max.y])
    }

    /// Fewer than three distinct vertices, or no measurable area.
    pub fn is_degenerate(&self) -> bool {
        if self.distinct_vertices < 3 {
            return true;
        }
        let w = self.envelope.width();
        let h = self.envelope.height();
        self.area() <= AREA_TOLERANCE * (w * w + h * h)
    }

    /// The ring passes through some vertex more than once.
    pub fn is_self_touching(&self) -> bool {
        self.is_self_touching
    }

    pub fn is_valid(&self, allow_self_touching: bool) -> bool {
        !self.is_degenerate() && (allow_self_touching || !self.is_self_touching)
    }

    pub fn locate(&self, coord: Coord<f64>) -> CoordPos {
        self.polygon.coordinate_position(&coord)
    }

    /// Whether `other` lies inside this ring.
    ///
    /// Tests the first vertex of `other` that is not on this ring's boundary.
    /// A ring whose vertices all lie on this boundary is not contained.
    pub fn contains_ring(&self, other: &EdgeRing) -> bool {
        if !rect_contains(&self.envelope, &other.envelope) {
            return false;
        }
        for &coord in other.ring().coords() {
            match self.locate(coord) {
                CoordPos::Inside => return true,
                CoordPos::Outside => return false,
                CoordPos::OnBoundary => continue,
            }
        }
        false
    }
}

fn rect_contains(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}
