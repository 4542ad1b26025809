//! Pixel/geographic coordinate arithmetic.
//!
//! Windows and bounds are plain value types. Windows are half-open row and
//! column ranges that may lie partly or wholly outside a raster, bounds are
//! `(minx, miny, maxx, maxy)` boxes in the transform's coordinate space.

use geo::BoundingRect;

use crate::error::{Error, Result};

/// A 2D affine transform representing a geotransform.
///
/// Maps pixel coordinates (col, row) to geographic coordinates (x, y):
///   x = a * col + b * row + c
///   y = d * col + e * row + f
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create from a GDAL-style geotransform array [c, a, b, f, d, e].
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        Self {
            a: gt[1],
            b: gt[2],
            c: gt[0],
            d: gt[4],
            e: gt[5],
            f: gt[3],
        }
    }

    /// Apply the forward transform: (col, row) -> (x, y).
    pub fn forward(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.a * col + self.b * row + self.c;
        let y = self.d * col + self.e * row + self.f;
        (x, y)
    }

    /// True when pixel axes are aligned with the coordinate axes.
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// Compute the inverse affine transform.
    pub fn inverse(&self) -> Result<Affine> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < f64::EPSILON {
            return Err(Error::SingularTransform);
        }
        let inv_det = 1.0 / det;
        Ok(Affine {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.e * self.c) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.d * self.c - self.a * self.f) * inv_det,
        })
    }

    /// Map (x, y) back to fractional (col, row).
    ///
    /// North-up transforms divide directly so that coordinates landing on
    /// pixel edges map to exact integers.
    pub fn reverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if self.is_rectilinear() {
            if self.a == 0.0 || self.e == 0.0 {
                return Err(Error::SingularTransform);
            }
            return Ok(((x - self.c) / self.a, (y - self.f) / self.e));
        }
        Ok(self.inverse()?.forward(x, y))
    }

    /// The transform of a window read: same pixel size, origin moved to the
    /// window's upper-left pixel.
    pub fn for_window(&self, window: &Window) -> Affine {
        let (c, f) = self.forward(window.cols.0 as f64, window.rows.0 as f64);
        Affine { c, f, ..*self }
    }
}

/// Rounding applied to fractional pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Rounding {
    #[default]
    Floor,
    Ceil,
    Round,
    Trunc,
}

impl Rounding {
    pub fn apply(self, value: f64) -> i64 {
        let rounded = match self {
            Rounding::Floor => value.floor(),
            Rounding::Ceil => value.ceil(),
            Rounding::Round => value.round(),
            Rounding::Trunc => value.trunc(),
        };
        rounded as i64
    }
}

/// Half-open pixel ranges `((row_start, row_stop), (col_start, col_stop))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub rows: (i64, i64),
    pub cols: (i64, i64),
}

impl Window {
    pub fn new(rows: (i64, i64), cols: (i64, i64)) -> Self {
        Self { rows, cols }
    }

    /// Number of rows, `None` if it does not fit in an `i64`.
    pub fn height(&self) -> Option<i64> {
        self.rows.1.checked_sub(self.rows.0)
    }

    pub fn width(&self) -> Option<i64> {
        self.cols.1.checked_sub(self.cols.0)
    }

    /// Whether any part of the window falls outside an array of `shape`
    /// `(rows, cols)`.
    pub fn beyond_extent(&self, shape: (usize, usize)) -> bool {
        self.rows.0 < 0
            || self.cols.0 < 0
            || self.rows.1 > shape.0 as i64
            || self.cols.1 > shape.1 as i64
    }
}

impl From<((i64, i64), (i64, i64))> for Window {
    fn from((rows, cols): ((i64, i64), (i64, i64))) -> Self {
        Self { rows, cols }
    }
}

impl From<Window> for ((i64, i64), (i64, i64)) {
    fn from(window: Window) -> Self {
        (window.rows, window.cols)
    }
}

/// A geographic bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Bounds {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self { minx, miny, maxx, maxy }
    }

    /// Bounds of a geometry, `None` for empty geometries.
    pub fn of_geometry(geometry: &geo::Geometry<f64>) -> Option<Bounds> {
        geometry.bounding_rect().map(|rect| Bounds {
            minx: rect.min().x,
            miny: rect.min().y,
            maxx: rect.max().x,
            maxy: rect.max().y,
        })
    }
}

impl From<(f64, f64, f64, f64)> for Bounds {
    fn from((minx, miny, maxx, maxy): (f64, f64, f64, f64)) -> Self {
        Self { minx, miny, maxx, maxy }
    }
}

impl From<Bounds> for (f64, f64, f64, f64) {
    fn from(b: Bounds) -> Self {
        (b.minx, b.miny, b.maxx, b.maxy)
    }
}

/// Pixel (row, col) containing geographic `(x, y)`, with `op` applied to the
/// fractional row and column independently.
pub fn rowcol(x: f64, y: f64, transform: &Affine, op: Rounding) -> Result<(i64, i64)> {
    let (col, row) = transform.reverse(x, y)?;
    Ok((op.apply(row), op.apply(col)))
}

/// The smallest window covering `bounds`.
///
/// The upper-left corner is floored and the lower-right corner ceiled so
/// partially covered pixels are included.
pub fn bounds_window(bounds: &Bounds, transform: &Affine) -> Result<Window> {
    let (row_start, col_start) = rowcol(bounds.minx, bounds.maxy, transform, Rounding::Floor)?;
    let (row_stop, col_stop) = rowcol(bounds.maxx, bounds.miny, transform, Rounding::Ceil)?;
    Ok(Window::new((row_start, row_stop), (col_start, col_stop)))
}

/// Geographic bounds of the pixel corners of `window`.
pub fn window_bounds(window: &Window, transform: &Affine) -> Bounds {
    let (minx, miny) = transform.forward(window.cols.0 as f64, window.rows.1 as f64);
    let (maxx, maxy) = transform.forward(window.cols.1 as f64, window.rows.0 as f64);
    Bounds { minx, miny, maxx, maxy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // 10m resolution, top-left at (500000, 6000000), north-up
    fn utm() -> Affine {
        Affine::new(10.0, 0.0, 500000.0, 0.0, -10.0, 6000000.0)
    }

    #[test]
    fn test_forward_with_offset_and_scale() {
        let (x, y) = utm().forward(100.0, 100.0);
        assert_relative_eq!(x, 501000.0);
        assert_relative_eq!(y, 5999000.0);
    }

    #[test]
    fn test_reverse_matches_inverse() {
        let aff = utm();
        let (col, row) = aff.reverse(501005.0, 5999005.0).unwrap();
        let (icol, irow) = aff.inverse().unwrap().forward(501005.0, 5999005.0);
        assert_relative_eq!(col, icol, epsilon = 1e-9);
        assert_relative_eq!(row, irow, epsilon = 1e-9);
    }

    #[test]
    fn test_reverse_rotated() {
        let aff = Affine::new(0.0, 2.0, 10.0, 2.0, 0.0, 20.0);
        let (x, y) = aff.forward(3.0, 4.0);
        let (col, row) = aff.reverse(x, y).unwrap();
        assert_relative_eq!(col, 3.0, epsilon = 1e-10);
        assert_relative_eq!(row, 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_singular_affine() {
        let aff = Affine::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(aff.inverse(), Err(Error::SingularTransform)));
        assert!(rowcol(1.0, 1.0, &aff, Rounding::Floor).is_err());
    }

    #[test]
    fn test_rowcol_floor_and_ceil() {
        let aff = utm();
        let x = 500000.0 + 1.0;
        let y = 6000000.0 - 1.0;
        assert_eq!(rowcol(x, y, &aff, Rounding::Floor).unwrap(), (0, 0));
        assert_eq!(rowcol(x, y, &aff, Rounding::Ceil).unwrap(), (1, 1));
    }

    #[test]
    fn test_rowcol_round_and_trunc() {
        let aff = utm();
        // half a pixel past col 1 / row 1, and half a pixel before col -1 / row -1
        let (inside, outside) = ((500015.0, 5999985.0), (499985.0, 6000015.0));
        assert_eq!(rowcol(inside.0, inside.1, &aff, Rounding::Round).unwrap(), (2, 2));
        assert_eq!(rowcol(inside.0, inside.1, &aff, Rounding::Trunc).unwrap(), (1, 1));
        assert_eq!(rowcol(outside.0, outside.1, &aff, Rounding::Round).unwrap(), (-2, -2));
        assert_eq!(rowcol(outside.0, outside.1, &aff, Rounding::Trunc).unwrap(), (-1, -1));
        assert_eq!(rowcol(outside.0, outside.1, &aff, Rounding::Floor).unwrap(), (-2, -2));
    }

    #[test]
    fn test_rowcol_outside_is_negative() {
        let aff = utm();
        assert_eq!(
            rowcol(499995.0, 6000005.0, &aff, Rounding::Floor).unwrap(),
            (-1, -1)
        );
    }

    #[test]
    fn test_full_extent_roundtrip() {
        let aff = utm();
        let full = Window::new((0, 100), (0, 200));
        let bounds = window_bounds(&full, &aff);
        assert_eq!(bounds, Bounds::new(500000.0, 5999000.0, 502000.0, 6000000.0));
        assert_eq!(bounds_window(&bounds, &aff).unwrap(), full);
    }

    #[test]
    fn test_window_covers_partial_pixels() {
        let aff = utm();
        let bounds = Bounds::new(500015.0, 5999975.0, 500031.0, 5999991.0);
        let win = bounds_window(&bounds, &aff).unwrap();
        assert_eq!(win, Window::new((0, 3), (1, 4)));
    }

    #[test]
    fn test_window_bounds_inner() {
        let bounds = window_bounds(&Window::new((5, 10), (5, 10)), &utm());
        assert_eq!(bounds, Bounds::new(500050.0, 5999900.0, 500100.0, 5999950.0));
    }

    #[test]
    fn test_extent_overflow_is_none() {
        assert_eq!(Window::new((i64::MIN, 1), (0, 1)).height(), None);
        assert_eq!(Window::new((0, 1), (-1, i64::MAX)).width(), None);
        assert_eq!(Window::new((-2, 3), (0, 1)).height(), Some(5));
    }

    #[test]
    fn test_beyond_extent() {
        assert!(!Window::new((0, 3), (0, 3)).beyond_extent((3, 3)));
        assert!(Window::new((-1, 2), (0, 3)).beyond_extent((3, 3)));
        assert!(Window::new((0, 3), (1, 4)).beyond_extent((3, 3)));
    }

    #[test]
    fn test_for_window_moves_origin() {
        let moved = utm().for_window(&Window::new((2, 4), (3, 5)));
        assert_relative_eq!(moved.c, 500030.0);
        assert_relative_eq!(moved.f, 5999980.0);
        assert_relative_eq!(moved.a, 10.0);
    }

    #[test]
    fn test_gdal_order() {
        let aff = Affine::from_gdal(&[500000.0, 10.0, 0.0, 6000000.0, 0.0, -10.0]);
        assert_eq!(aff, utm());
    }

    #[test]
    fn test_bounds_of_geometry() {
        let ring = geo::LineString::from(vec![(1.0, 2.0), (4.0, 2.0), (4.0, 6.0), (1.0, 2.0)]);
        let poly = geo::Geometry::Polygon(geo::Polygon::new(ring, vec![]));
        assert_eq!(Bounds::of_geometry(&poly), Some(Bounds::new(1.0, 2.0, 4.0, 6.0)));
    }
}
