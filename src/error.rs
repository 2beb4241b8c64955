use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolygonizerError {
    /// The input is not lineal (points, polygons, unparseable GeoJSON...).
    #[error("Input type error: {0}")]
    InputTypeError(String),

    /// Malformed lines, or ring tracing could not continue.
    #[error("Topology error: {0}")]
    TopologyError(String),
}

pub type Result<T> = std::result::Result<T, PolygonizerError>;
