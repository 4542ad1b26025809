//! Input normalization for zonal statistics.
//!
//! - [`features`]: turn paths, mappings, JSON/WKT/WKB, geometries and
//!   geo-interface objects into a lazy stream of GeoJSON features.
//! - [`affine`] and [`boundless`]: pixel/geographic arithmetic and raster
//!   window reads that may run past the array's edges.
//! - [`raster`]: a georeferenced in-memory band built on the two above.

pub mod affine;
pub mod boundless;
pub mod error;
pub mod features;
pub mod input;
pub mod raster;
pub mod source;

pub use affine::{bounds_window, rowcol, window_bounds, Affine, Bounds, Rounding, Window};
pub use boundless::{boundless_array, boundless_masked_array, MaskedArray};
pub use error::{Error, Result};
pub use features::{read_featurecollection, read_features, Features, Normalizer};
pub use input::{GeoInterface, VectorInput};
pub use raster::Raster;
pub use source::{GeoJsonDriver, Layer, VectorDriver};
