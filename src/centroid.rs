//! Centroid extraction from geometric moments.
//!
//! The centroid of a region is `(m10 / m00, m01 / m00)` where `m00` is its
//! area and `m10`, `m01` are the first moments. Moments integrate over the
//! region's interior, so the point is not pulled toward densely sampled
//! stretches of an irregular boundary the way a mean of contour vertices is.

use crate::error::MeasureError;
use crate::mask::{MaskAccess, Region};
use crate::types::Point;

/// Zeroth and first order moments of a binary region.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    /// Area (pixel count for raster regions).
    pub m00: f64,
    /// Sum of x over the region.
    pub m10: f64,
    /// Sum of y over the region.
    pub m01: f64,
}

impl Moments {
    /// Area moments of the polygon enclosed by a closed contour.
    ///
    /// Uses Green's theorem over the polygon edges. The result is normalised
    /// to positive area regardless of winding direction. Fewer than three
    /// vertices enclose nothing.
    pub fn of_contour(points: &[Point]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut a = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        let n = points.len();

        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            a += cross;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }

        let m = Self {
            m00: a / 2.0,
            m10: cx / 6.0,
            m01: cy / 6.0,
        };
        if m.m00 < 0.0 {
            Self {
                m00: -m.m00,
                m10: -m.m10,
                m01: -m.m01,
            }
        } else {
            m
        }
    }

    /// Moments of a set of unit pixels sampled at their integer coordinates.
    pub fn of_pixels<I>(pixels: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        pixels
            .into_iter()
            .fold(Self::default(), |acc, (x, y)| Self {
                m00: acc.m00 + 1.0,
                m10: acc.m10 + f64::from(x),
                m01: acc.m01 + f64::from(y),
            })
    }

    /// Moments of every foreground pixel of a raster mask.
    pub fn of_mask<M: MaskAccess>(mask: &M) -> Self {
        let (w, h) = (mask.width(), mask.height());
        Self::of_pixels(
            (0..h)
                .flat_map(|y| (0..w).map(move |x| (x, y)))
                .filter(|&(x, y)| mask.is_set(x, y)),
        )
    }

    pub fn of_region(region: &Region) -> Self {
        match region {
            Region::Contour(points) => Self::of_contour(points),
            Region::Pixels(pixels) => Self::of_pixels(pixels.iter().map(|&[x, y]| (x, y))),
            Region::Bitmap(mask) => Self::of_mask(mask),
        }
    }

    /// The centroid, or [`MeasureError::DegenerateRegion`] when the area is not
    /// strictly positive.
    pub fn centroid(&self) -> Result<Point, MeasureError> {
        if self.m00.is_nan() || self.m00 <= 0.0 {
            return Err(MeasureError::DegenerateRegion);
        }
        Ok(Point::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Compute the centroid of a region.
pub fn centroid(region: &Region) -> Result<Point, MeasureError> {
    Moments::of_region(region).centroid()
}
