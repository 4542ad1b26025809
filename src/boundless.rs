//! Windowed reads that may run past the edges of the backing array.

use ndarray::{ArrayD, ArrayViewD, IxDyn, Slice};
use tracing::trace;

use crate::affine::Window;
use crate::error::{Error, Result};

/// An array paired with a validity mask; `true` marks a masked cell.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedArray<T> {
    pub data: ArrayD<T>,
    pub mask: ArrayD<bool>,
}

impl<T: Clone> MaskedArray<T> {
    /// Values of all unmasked cells in logical order.
    pub fn compressed(&self) -> Vec<T> {
        self.data
            .iter()
            .zip(self.mask.iter())
            .filter(|&(_, &masked)| !masked)
            .map(|(v, _)| v.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&masked| !masked).count()
    }
}

/// Read `window` out of `arr`, filling cells that fall outside with `nodata`.
///
/// The last two axes of `arr` are rows and columns; any leading axes (bands)
/// are carried through unchanged. The output always has the window's shape.
pub fn boundless_array<T: Clone>(
    arr: &ArrayViewD<'_, T>,
    window: &Window,
    nodata: T,
) -> Result<ArrayD<T>> {
    let ndim = arr.ndim();
    if ndim < 2 {
        return Err(Error::ValueShape(format!(
            "boundless read needs at least 2 dimensions, got {ndim}"
        )));
    }
    let (height, width) = match (window.height(), window.width()) {
        (Some(height), Some(width)) if height >= 0 && width >= 0 => (height, width),
        _ => {
            return Err(Error::ValueShape(format!(
                "window {:?} has a negative or overflowing extent",
                window
            )))
        }
    };

    let shape = arr.shape();
    let (nrows, ncols) = (shape[ndim - 2] as i64, shape[ndim - 1] as i64);

    let mut out_shape = shape[..ndim - 2].to_vec();
    out_shape.push(height as usize);
    out_shape.push(width as usize);
    let mut out = ArrayD::from_elem(IxDyn(&out_shape), nodata);

    let row_start = window.rows.0.max(0);
    let row_stop = window.rows.1.min(nrows);
    let col_start = window.cols.0.max(0);
    let col_stop = window.cols.1.min(ncols);
    if row_start >= row_stop || col_start >= col_stop {
        trace!(?window, "window does not overlap array");
        return Ok(out);
    }

    // Source ranges in array space, destination ranges in window space.
    let src_rows = row_start..row_stop;
    let src_cols = col_start..col_stop;
    let dst_rows = (row_start - window.rows.0)..(row_stop - window.rows.0);
    let dst_cols = (col_start - window.cols.0)..(col_stop - window.cols.0);

    let src = arr.slice_each_axis(|ax| spatial_slice(ax.axis.index(), ndim, &src_rows, &src_cols));
    out.slice_each_axis_mut(|ax| spatial_slice(ax.axis.index(), ndim, &dst_rows, &dst_cols))
        .assign(&src);
    Ok(out)
}

/// Like [`boundless_array`], additionally masking every cell equal to `nodata`.
pub fn boundless_masked_array<T: Clone + PartialEq>(
    arr: &ArrayViewD<'_, T>,
    window: &Window,
    nodata: T,
) -> Result<MaskedArray<T>> {
    let data = boundless_array(arr, window, nodata.clone())?;
    let mask = data.mapv(|v| v == nodata);
    Ok(MaskedArray { data, mask })
}

fn spatial_slice(
    axis: usize,
    ndim: usize,
    rows: &std::ops::Range<i64>,
    cols: &std::ops::Range<i64>,
) -> Slice {
    if axis == ndim - 2 {
        Slice::from(rows.start as isize..rows.end as isize)
    } else if axis == ndim - 1 {
        Slice::from(cols.start as isize..cols.end as isize)
    } else {
        Slice::from(..)
    }
}
