//! The vector input shapes accepted by the feature normalizer.

use std::fmt;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};

/// Objects that can describe themselves as a GeoJSON-like mapping
/// (a Feature, a Geometry or a FeatureCollection).
pub trait GeoInterface {
    /// `None` when the object has no geographic representation.
    fn geo_interface(&self) -> Option<JsonObject>;
}

impl GeoInterface for Feature {
    fn geo_interface(&self) -> Option<JsonObject> {
        Some(JsonObject::from(self))
    }
}

impl GeoInterface for geojson::Geometry {
    fn geo_interface(&self) -> Option<JsonObject> {
        Some(JsonObject::from(self))
    }
}

impl GeoInterface for FeatureCollection {
    fn geo_interface(&self) -> Option<JsonObject> {
        Some(JsonObject::from(self))
    }
}

impl GeoInterface for GeoJson {
    fn geo_interface(&self) -> Option<JsonObject> {
        Some(JsonObject::from(self))
    }
}

/// Any vector input, classified by what it is rather than what it claims.
pub enum VectorInput {
    /// A location for a [`VectorDriver`](crate::source::VectorDriver).
    Path(PathBuf),
    /// A path, JSON document, WKT, or hex-encoded WKB.
    Text(String),
    /// A GeoJSON-like mapping.
    Mapping(JsonObject),
    /// Well-known binary.
    Wkb(Vec<u8>),
    Geometry(geo::Geometry<f64>),
    Object(Box<dyn GeoInterface>),
    Sequence(Vec<VectorInput>),
}

impl VectorInput {
    pub fn object(object: impl GeoInterface + 'static) -> Self {
        VectorInput::Object(Box::new(object))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VectorInput::Path(_) => "path",
            VectorInput::Text(_) => "text",
            VectorInput::Mapping(_) => "mapping",
            VectorInput::Wkb(_) => "wkb",
            VectorInput::Geometry(_) => "geometry",
            VectorInput::Object(_) => "object",
            VectorInput::Sequence(_) => "sequence",
        }
    }
}

impl fmt::Debug for VectorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorInput::Path(path) => f.debug_tuple("Path").field(path).finish(),
            VectorInput::Text(text) => f.debug_tuple("Text").field(text).finish(),
            VectorInput::Mapping(map) => f.debug_tuple("Mapping").field(map).finish(),
            VectorInput::Wkb(bytes) => write!(f, "Wkb({} bytes)", bytes.len()),
            VectorInput::Geometry(geom) => f.debug_tuple("Geometry").field(geom).finish(),
            VectorInput::Object(_) => f.write_str("Object(..)"),
            VectorInput::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
        }
    }
}

/// A JSON scalar that is not a string has no geographic meaning.
struct Opaque;

impl GeoInterface for Opaque {
    fn geo_interface(&self) -> Option<JsonObject> {
        None
    }
}

impl From<JsonValue> for VectorInput {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => VectorInput::Mapping(map),
            JsonValue::String(text) => VectorInput::Text(text),
            JsonValue::Array(items) => {
                VectorInput::Sequence(items.into_iter().map(VectorInput::from).collect())
            }
            _ => VectorInput::object(Opaque),
        }
    }
}

impl From<JsonObject> for VectorInput {
    fn from(map: JsonObject) -> Self {
        VectorInput::Mapping(map)
    }
}

impl From<&str> for VectorInput {
    fn from(text: &str) -> Self {
        VectorInput::Text(text.to_string())
    }
}

impl From<String> for VectorInput {
    fn from(text: String) -> Self {
        VectorInput::Text(text)
    }
}

impl From<&Path> for VectorInput {
    fn from(path: &Path) -> Self {
        VectorInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for VectorInput {
    fn from(path: PathBuf) -> Self {
        VectorInput::Path(path)
    }
}

impl From<&[u8]> for VectorInput {
    fn from(bytes: &[u8]) -> Self {
        VectorInput::Wkb(bytes.to_vec())
    }
}

impl From<Vec<u8>> for VectorInput {
    fn from(bytes: Vec<u8>) -> Self {
        VectorInput::Wkb(bytes)
    }
}

impl From<geo::Geometry<f64>> for VectorInput {
    fn from(geometry: geo::Geometry<f64>) -> Self {
        VectorInput::Geometry(geometry)
    }
}

impl From<geo::Polygon<f64>> for VectorInput {
    fn from(polygon: geo::Polygon<f64>) -> Self {
        VectorInput::Geometry(geo::Geometry::Polygon(polygon))
    }
}

impl From<geo::Point<f64>> for VectorInput {
    fn from(point: geo::Point<f64>) -> Self {
        VectorInput::Geometry(geo::Geometry::Point(point))
    }
}

impl From<Feature> for VectorInput {
    fn from(feature: Feature) -> Self {
        VectorInput::Mapping(JsonObject::from(&feature))
    }
}

impl From<geojson::Geometry> for VectorInput {
    fn from(geometry: geojson::Geometry) -> Self {
        VectorInput::Mapping(JsonObject::from(&geometry))
    }
}

impl From<FeatureCollection> for VectorInput {
    fn from(collection: FeatureCollection) -> Self {
        VectorInput::Mapping(JsonObject::from(&collection))
    }
}

impl From<Box<dyn GeoInterface>> for VectorInput {
    fn from(object: Box<dyn GeoInterface>) -> Self {
        VectorInput::Object(object)
    }
}

impl From<Vec<VectorInput>> for VectorInput {
    fn from(items: Vec<VectorInput>) -> Self {
        VectorInput::Sequence(items)
    }
}

impl<T: Into<VectorInput>> FromIterator<T> for VectorInput {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        VectorInput::Sequence(iter.into_iter().map(Into::into).collect())
    }
}
