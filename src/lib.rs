pub mod assemble;
pub mod edge_ring;
pub mod error;
pub mod geojson_io;
pub mod graph;
pub mod polygonizer;
pub mod utils;
#[cfg(target_arch = "wasm32")]
pub mod wasm;


pub use error::{PolygonizerError, Result};
pub use polygonizer::{polygonize, Polygonizer};
