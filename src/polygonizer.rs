use geo_types::{Geometry, LineString, Polygon};
use log::debug;

use crate::assemble::assemble;
use crate::error::{PolygonizerError, Result};
use crate::graph::PlanarGraph;

/// Builds polygons from correctly noded linework.
///
/// Lines are buffered by `add_geometry` and the graph is rebuilt on every
/// call to `polygonize`, so a polygonizer can be fed more lines and run again.
/// After a run, the lines that could not bound any area are available from
/// `dangles`, `cut_edges` and `invalid_ring_lines`.
pub struct Polygonizer {
    /// Drop rings that pass through a vertex twice (figure-eights).
    pub check_valid_rings: bool,

    lines: Vec<LineString<f64>>,
    dangles: Vec<LineString<f64>>,
    cut_edges: Vec<LineString<f64>>,
    invalid_rings: Vec<LineString<f64>>,
}

impl Default for Polygonizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygonizer {
    pub fn new() -> Self {
        Self {
            check_valid_rings: true,
            lines: Vec::new(),
            dangles: Vec::new(),
            cut_edges: Vec::new(),
            invalid_rings: Vec::new(),
        }
    }

    /// Adds a lineal geometry. Collections are flattened here; anything that
    /// is not a line is rejected and nothing from `geom` is kept.
    pub fn add_geometry(&mut self, geom: Geometry<f64>) -> Result<()> {
        let mut lines = Vec::new();
        extract_lines(geom, &mut lines)?;
        self.lines.extend(lines);
        Ok(())
    }

    pub fn add_line_string(&mut self, line: LineString<f64>) {
        self.lines.push(line);
    }

    /// Computes the polygons.
    /// This is the main entry point.
    pub fn polygonize(&mut self) -> Result<Vec<Polygon<f64>>> {
        self.dangles.clear();
        self.cut_edges.clear();
        self.invalid_rings.clear();

        // 1. Build the graph and sort edges around nodes
        let mut graph = PlanarGraph::build(self.lines.iter().cloned())?;

        // 2. Prune dangles and cut edges
        let pruned = graph.prune();
        self.dangles = pruned
            .dangles
            .iter()
            .map(|&e| graph.edges[e].line.clone())
            .collect();
        self.cut_edges = pruned
            .cut_edges
            .iter()
            .map(|&e| graph.edges[e].line.clone())
            .collect();

        // 3. Find rings
        let rings = graph.get_edge_rings()?;

        // 4. Assign holes
        let assembly = assemble(rings, !self.check_valid_rings);
        self.invalid_rings = assembly.invalid_rings;

        debug!(
            "polygonized {} lines into {} polygons",
            self.lines.len(),
            assembly.polygons.len()
        );
        Ok(assembly.polygons)
    }

    /// Lines removed because one of their ends was free.
    pub fn dangles(&self) -> &[LineString<f64>] {
        &self.dangles
    }

    /// Lines removed because they lie on no cycle.
    pub fn cut_edges(&self) -> &[LineString<f64>] {
        &self.cut_edges
    }

    /// Rings that enclose area but were dropped as invalid.
    pub fn invalid_ring_lines(&self) -> &[LineString<f64>] {
        &self.invalid_rings
    }
}

/// Polygonizes a set of noded lines in one call.
pub fn polygonize<I>(lines: I) -> Result<Vec<Polygon<f64>>>
where
    I: IntoIterator<Item = LineString<f64>>,
{
    let mut polygonizer = Polygonizer::new();
    for line in lines {
        polygonizer.add_line_string(line);
    }
    polygonizer.polygonize()
}

fn extract_lines(geom: Geometry<f64>, out: &mut Vec<LineString<f64>>) -> Result<()> {
    match geom {
        Geometry::LineString(ls) => out.push(ls),
        Geometry::Line(line) => out.push(LineString::from(vec![line.start, line.end])),
        Geometry::MultiLineString(mls) => out.extend(mls.0),
        Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                extract_lines(g, out)?;
            }
        }
        other => {
            return Err(PolygonizerError::InputTypeError(format!(
                "expected LineString, MultiLineString or a collection of them, found {}",
                geometry_type_name(&other)
            )))
        }
    }
    Ok(())
}

fn geometry_type_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
