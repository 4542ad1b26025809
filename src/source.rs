//! Vector data sources addressed by filesystem path.
//!
//! Parsing vector formats is delegated to a [`VectorDriver`]. The crate ships
//! [`GeoJsonDriver`], which reads GeoJSON files and treats a directory of
//! GeoJSON files as a multi-layer source.

use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureReader};
use tracing::debug;

use crate::error::{Error, Result};

/// Selects one layer of a multi-layer source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layer {
    Index(usize),
    Name(String),
}

impl Layer {
    /// Digits select by index, anything else by name.
    pub fn parse(s: &str) -> Layer {
        match s.parse::<usize>() {
            Ok(index) => Layer::Index(index),
            Err(_) => Layer::Name(s.to_string()),
        }
    }
}

impl From<usize> for Layer {
    fn from(index: usize) -> Self {
        Layer::Index(index)
    }
}

impl From<&str> for Layer {
    fn from(name: &str) -> Self {
        Layer::Name(name.to_string())
    }
}

impl From<String> for Layer {
    fn from(name: String) -> Self {
        Layer::Name(name)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Index(index) => write!(f, "#{index}"),
            Layer::Name(name) => f.write_str(name),
        }
    }
}

/// Features of one opened layer. Dropping it releases the source.
pub type FeatureIter = Box<dyn Iterator<Item = Result<Feature>>>;

pub trait VectorDriver: Send + Sync + fmt::Debug {
    /// Whether `path` names something this driver can open.
    fn can_open(&self, path: &Path) -> bool;

    /// Layer names in index order.
    fn layers(&self, path: &Path) -> Result<Vec<String>>;

    /// Open a layer (the first one when `layer` is `None`).
    fn open(&self, path: &Path, layer: Option<&Layer>) -> Result<FeatureIter>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GeoJsonDriver;

const EXTENSIONS: [&str; 2] = ["geojson", "json"];

fn is_geojson_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

impl GeoJsonDriver {
    /// (layer name, file) pairs sorted by name.
    fn layer_files(&self, path: &Path) -> Result<Vec<(String, PathBuf)>> {
        if !path.is_dir() {
            return Ok(vec![(layer_name(path), path.to_path_buf())]);
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file = entry?.path();
            if is_geojson_file(&file) {
                files.push((layer_name(&file), file));
            }
        }
        files.sort();
        Ok(files)
    }

    fn resolve(&self, path: &Path, layer: Option<&Layer>) -> Result<PathBuf> {
        let files = self.layer_files(path)?;
        let found = match layer {
            None => files.into_iter().next(),
            Some(Layer::Index(index)) => files.into_iter().nth(*index),
            Some(Layer::Name(name)) => files.into_iter().find(|(n, _)| n == name),
        };
        match found {
            Some((_, file)) => Ok(file),
            None => Err(Error::LayerNotFound(format!(
                "{} in {}",
                layer.map(|l| l.to_string()).unwrap_or_else(|| "#0".into()),
                path.display()
            ))),
        }
    }
}

impl VectorDriver for GeoJsonDriver {
    fn can_open(&self, path: &Path) -> bool {
        if path.is_dir() {
            return self
                .layer_files(path)
                .map(|files| !files.is_empty())
                .unwrap_or(false);
        }
        is_geojson_file(path)
    }

    fn layers(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self
            .layer_files(path)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn open(&self, path: &Path, layer: Option<&Layer>) -> Result<FeatureIter> {
        let file_path = self.resolve(path, layer)?;
        let file = File::open(&file_path)?;
        debug!(path = %file_path.display(), "opened vector source");
        let features = FeatureReader::from_reader(BufReader::new(file)).features();
        Ok(Box::new(SourceFeatures {
            inner: features,
            path: file_path,
        }))
    }
}

/// Streams features from an open file; the handle lives as long as this.
struct SourceFeatures<I> {
    inner: I,
    path: PathBuf,
}

impl<I> Iterator for SourceFeatures<I>
where
    I: Iterator<Item = geojson::Result<Feature>>,
{
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|r| r.map_err(Error::from))
    }
}

impl<I> Drop for SourceFeatures<I> {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "closed vector source");
    }
}
