use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The input has no acceptable representation at this layer.
    #[error("Invalid value shape: {0}")]
    ValueShape(String),

    #[error("Singular affine transform (determinant is zero)")]
    SingularTransform,

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
}

impl Error {
    pub fn is_value_shape(&self) -> bool {
        matches!(self, Error::ValueShape(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
