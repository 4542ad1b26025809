//! Normalization of heterogeneous vector input into GeoJSON features.
//!
//! Every input is classified in a fixed order, first match wins:
//!
//! 1. [`VectorInput::Path`], or text naming something the driver can open,
//!    streams the (selected layer of the) source.
//! 2. A mapping with `type: "FeatureCollection"` recurses into `features`.
//! 3. A mapping with `type: "Feature"` passes through unchanged.
//! 4. A mapping with a geometry `type` is wrapped in a Feature.
//! 5. Other text is tried as JSON, then WKT, then hex-encoded WKB.
//! 6. WKB bytes and in-memory geometries are wrapped in a Feature.
//! 7. A [`GeoInterface`](crate::input::GeoInterface) object is classified by
//!    its mapping, starting at step 2.
//! 8. A sequence classifies each element in order and flattens the results.
//!
//! Anything else is an [`Error::ValueShape`]. Classification is lazy: the
//! first bad element ends iteration with that error.

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use geozero::wkb::Wkb;
use geozero::ToGeo;
use tracing::{debug, trace};
use wkt::TryFromWkt;

use crate::error::{Error, Result};
use crate::input::VectorInput;
use crate::source::{FeatureIter, GeoJsonDriver, Layer, VectorDriver};

const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Lazily yield one Feature per feature found in `input`.
///
/// `layer` selects a layer of any multi-layer path source encountered.
pub fn read_features(input: impl Into<VectorInput>, layer: Option<Layer>) -> Features {
    let mut normalizer = Normalizer::new();
    normalizer.layer = layer;
    normalizer.features(input)
}

/// Collect [`read_features`] into a FeatureCollection.
pub fn read_featurecollection(
    input: impl Into<VectorInput>,
    layer: Option<Layer>,
) -> Result<FeatureCollection> {
    let mut normalizer = Normalizer::new();
    normalizer.layer = layer;
    normalizer.feature_collection(input)
}

/// Per-call configuration for normalization.
#[derive(Clone, Debug)]
pub struct Normalizer {
    layer: Option<Layer>,
    driver: Arc<dyn VectorDriver>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            layer: None,
            driver: Arc::new(GeoJsonDriver),
        }
    }

    pub fn layer(mut self, layer: impl Into<Layer>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn driver(mut self, driver: impl VectorDriver + 'static) -> Self {
        self.driver = Arc::new(driver);
        self
    }

    pub fn features(&self, input: impl Into<VectorInput>) -> Features {
        Features {
            normalizer: self.clone(),
            stack: vec![Frame::Inputs(vec![input.into()].into_iter())],
            done: false,
        }
    }

    pub fn feature_collection(&self, input: impl Into<VectorInput>) -> Result<FeatureCollection> {
        let features = self.features(input).collect::<Result<Vec<_>>>()?;
        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    fn classify(&self, input: VectorInput) -> Result<Step> {
        trace!(kind = input.kind(), "classifying input");
        match input {
            VectorInput::Path(path) => self.open(&path),
            VectorInput::Text(text) => self.classify_text(text),
            VectorInput::Mapping(map) => classify_mapping(map),
            VectorInput::Wkb(bytes) => Ok(Step::Yield(wrap_geometry(parse_wkb(&bytes)?))),
            VectorInput::Geometry(geometry) => Ok(Step::Yield(wrap_geometry(
                geojson::Geometry::new(geojson::Value::from(&geometry)),
            ))),
            VectorInput::Object(object) => match object.geo_interface() {
                Some(map) => classify_mapping(map),
                None => Err(Error::ValueShape(
                    "object has no geo interface, geometry or collection representation".into(),
                )),
            },
            VectorInput::Sequence(items) => Ok(Step::Descend(Frame::Inputs(items.into_iter()))),
        }
    }

    fn open(&self, path: &Path) -> Result<Step> {
        debug!(path = %path.display(), layer = ?self.layer, "reading features from source");
        let source = self.driver.open(path, self.layer.as_ref())?;
        Ok(Step::Descend(Frame::Source(source)))
    }

    fn classify_text(&self, text: String) -> Result<Step> {
        let path = PathBuf::from(&text);
        if self.driver.can_open(&path) {
            return self.open(&path);
        }
        if let Ok(value) = serde_json::from_str::<JsonValue>(&text) {
            if value.is_object() || value.is_array() {
                trace!("text parsed as JSON");
                return self.classify(VectorInput::from(value));
            }
        }
        if let Ok(geometry) = geo::Geometry::<f64>::try_from_wkt_str(&text) {
            trace!("text parsed as WKT");
            return self.classify(VectorInput::Geometry(geometry));
        }
        if let Some(bytes) = decode_hex(&text) {
            if let Ok(geometry) = parse_wkb(&bytes) {
                trace!("text parsed as hex WKB");
                return Ok(Step::Yield(wrap_geometry(geometry)));
            }
        }
        Err(Error::ValueShape(format!(
            "{} is not a path, JSON, WKT or WKB",
            excerpt(&text)
        )))
    }
}

fn classify_mapping(mut map: JsonObject) -> Result<Step> {
    let kind = map.get("type").and_then(JsonValue::as_str).map(str::to_owned);
    match kind.as_deref() {
        Some("FeatureCollection") => match map.remove("features") {
            Some(JsonValue::Array(members)) => {
                Ok(Step::Descend(Frame::Members(members.into_iter())))
            }
            _ => Err(Error::ValueShape(
                "FeatureCollection without a features array".into(),
            )),
        },
        Some("Feature") => {
            // an absent geometry is read as a null one
            map.entry("geometry").or_insert(JsonValue::Null);
            Feature::from_json_object(map)
                .map(Step::Yield)
                .map_err(|e| Error::ValueShape(format!("malformed Feature: {e}")))
        }
        Some(t) if GEOMETRY_TYPES.contains(&t) => geojson::Geometry::from_json_object(map)
            .map(|geometry| Step::Yield(wrap_geometry(geometry)))
            .map_err(|e| Error::ValueShape(format!("malformed {t}: {e}"))),
        Some(t) => Err(Error::ValueShape(format!("unrecognized mapping type {t:?}"))),
        None => Err(Error::ValueShape("mapping has no type member".into())),
    }
}

fn wrap_geometry(geometry: geojson::Geometry) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    }
}

fn parse_wkb(bytes: &[u8]) -> Result<geojson::Geometry> {
    let geometry = Wkb(bytes.to_vec())
        .to_geo()
        .map_err(|e| Error::ValueShape(format!("invalid WKB: {e}")))?;
    Ok(geojson::Geometry::new(geojson::Value::from(&geometry)))
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() || text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

fn excerpt(text: &str) -> String {
    const MAX: usize = 60;
    match text.char_indices().nth(MAX) {
        Some((end, _)) => format!("{:?}...", &text[..end]),
        None => format!("{text:?}"),
    }
}

enum Step {
    Yield(Feature),
    Descend(Frame),
}

enum Frame {
    Inputs(std::vec::IntoIter<VectorInput>),
    Members(std::vec::IntoIter<JsonValue>),
    Source(FeatureIter),
}

enum Pending {
    Input(VectorInput),
    Sourced(Result<Feature>),
}

/// Single-pass iterator over normalized features.
///
/// Open sources are released when exhausted, on the first error, or when
/// the iterator is dropped.
pub struct Features {
    normalizer: Normalizer,
    stack: Vec<Frame>,
    done: bool,
}

impl Iterator for Features {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let pending = match self.stack.last_mut() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Frame::Inputs(items)) => items.next().map(Pending::Input),
                Some(Frame::Members(members)) => {
                    members.next().map(|m| Pending::Input(VectorInput::from(m)))
                }
                Some(Frame::Source(source)) => source.next().map(Pending::Sourced),
            };
            let Some(pending) = pending else {
                self.stack.pop();
                continue;
            };
            let step = match pending {
                Pending::Input(input) => self.normalizer.classify(input),
                Pending::Sourced(result) => result.map(Step::Yield),
            };
            match step {
                Ok(Step::Yield(feature)) => return Some(Ok(feature)),
                Ok(Step::Descend(frame)) => self.stack.push(frame),
                Err(e) => {
                    self.done = true;
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl FusedIterator for Features {}
