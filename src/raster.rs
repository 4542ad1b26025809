//! A single in-memory raster band with its georeferencing.

use ndarray::{Array2, Array3, Axis, Ix2};

use crate::affine::{bounds_window, rowcol, window_bounds, Affine, Bounds, Rounding, Window};
use crate::boundless::{boundless_array, boundless_masked_array, MaskedArray};
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    pub array: Array2<T>,
    pub transform: Affine,
    pub nodata: T,
}

impl<T: Clone + PartialEq> Raster<T> {
    pub fn new(array: Array2<T>, transform: Affine, nodata: T) -> Self {
        Self { array, transform, nodata }
    }

    /// Select one band (0-based) of a `(bands, rows, cols)` array.
    pub fn from_bands(bands: &Array3<T>, band: usize, transform: Affine, nodata: T) -> Result<Self> {
        if band >= bands.len_of(Axis(0)) {
            return Err(Error::ValueShape(format!(
                "band {band} out of range for {} bands",
                bands.len_of(Axis(0))
            )));
        }
        Ok(Self::new(bands.index_axis(Axis(0), band).to_owned(), transform, nodata))
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.array.dim()
    }

    pub fn bounds(&self) -> Bounds {
        let (rows, cols) = self.shape();
        window_bounds(&Window::new((0, rows as i64), (0, cols as i64)), &self.transform)
    }

    /// Pixel (row, col) containing geographic `(x, y)`.
    pub fn index(&self, x: f64, y: f64) -> Result<(i64, i64)> {
        rowcol(x, y, &self.transform, Rounding::Floor)
    }

    /// Boundless read of `window`; the result carries its own transform.
    pub fn read_window(&self, window: &Window) -> Result<Raster<T>> {
        let data = boundless_array(&self.array.view().into_dyn(), window, self.nodata.clone())?;
        let array = data
            .into_dimensionality::<Ix2>()
            .map_err(|e| Error::ValueShape(e.to_string()))?;
        Ok(Raster {
            array,
            transform: self.transform.for_window(window),
            nodata: self.nodata.clone(),
        })
    }

    /// Boundless read of the window covering `bounds`.
    pub fn read_bounds(&self, bounds: &Bounds) -> Result<Raster<T>> {
        let window = bounds_window(bounds, &self.transform)?;
        self.read_window(&window)
    }

    /// Boundless read with nodata cells masked.
    pub fn read_window_masked(&self, window: &Window) -> Result<MaskedArray<T>> {
        boundless_masked_array(&self.array.view().into_dyn(), window, self.nodata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn raster() -> Raster<i32> {
        Raster::new(
            array![[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            Affine::new(10.0, 0.0, 100.0, 0.0, -10.0, 200.0),
            -1,
        )
    }

    #[test]
    fn test_bounds_and_index() {
        let r = raster();
        assert_eq!(r.bounds(), Bounds::new(100.0, 170.0, 130.0, 200.0));
        assert_eq!(r.index(101.0, 199.0).unwrap(), (0, 0));
        assert_eq!(r.index(125.0, 175.0).unwrap(), (2, 2));
        assert_eq!(r.index(95.0, 205.0).unwrap(), (-1, -1));
    }

    #[test]
    fn test_read_window_partial() {
        let sub = raster().read_window(&Window::new((-1, 1), (2, 4))).unwrap();
        assert_eq!(sub.array, array![[-1, -1], [3, -1]]);
        assert_relative_eq!(sub.transform.c, 120.0);
        assert_relative_eq!(sub.transform.f, 210.0);
    }

    #[test]
    fn test_read_bounds() {
        let sub = raster().read_bounds(&Bounds::new(111.0, 181.0, 119.0, 189.0)).unwrap();
        assert_eq!(sub.array, array![[5]]);
        assert_eq!(sub.bounds(), Bounds::new(110.0, 180.0, 120.0, 190.0));
    }

    #[test]
    fn test_read_window_masked() {
        let masked = raster().read_window_masked(&Window::new((2, 4), (2, 4))).unwrap();
        assert_eq!(masked.compressed(), vec![9]);
    }

    #[test]
    fn test_from_bands() {
        let bands = Array3::from_shape_fn((2, 2, 2), |(b, r, c)| (b * 4 + r * 2 + c) as i32);
        let aff = Affine::new(1.0, 0.0, 0.0, 0.0, -1.0, 2.0);
        let second = Raster::from_bands(&bands, 1, aff, -1).unwrap();
        assert_eq!(second.array, array![[4, 5], [6, 7]]);
        assert!(Raster::from_bands(&bands, 2, aff, -1).unwrap_err().is_value_shape());
    }
}
