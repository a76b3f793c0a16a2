//! Binary region representations.
//!
//! Segmentation collaborators hand over eye and body regions as boundary
//! contours, explicit foreground pixel lists or rasterised bitmaps. All three
//! describe the same thing, a set of foreground pixels, and the centroid
//! extractor accepts any of them.

use crate::error::{Error, Result};
use crate::types::{BoundingBox, Point};

/// Trait for reading foreground membership from a raster mask.
pub trait MaskAccess {
    /// Whether pixel (x, y) belongs to the region. Out-of-bounds pixels do not.
    fn is_set(&self, x: u32, y: u32) -> bool;

    /// Mask dimensions.
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A raster mask where any non-zero byte is foreground.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl BinaryMask {
    /// Wrap a row-major buffer, checking it holds exactly `width * height` bytes.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize).checked_mul(height as usize);
        if expected != Some(data.len()) {
            return Err(Error::InvalidMask(format!(
                "{}x{} mask needs {} bytes, got {}",
                width,
                height,
                u128::from(width) * u128::from(height),
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(u8::from(f(x, y)));
            }
        }
        Self { data, width, height }
    }

    /// Copy foreground membership out of any raster.
    pub fn from_mask<M: MaskAccess>(mask: &M) -> Self {
        Self::from_fn(mask.width(), mask.height(), |x, y| mask.is_set(x, y))
    }

    /// Threshold a grayscale image: any non-zero luma is foreground.
    pub fn from_luma(image: &image::GrayImage) -> Self {
        Self::from_mask(image)
    }

    /// Iterate the coordinates of every foreground pixel in row-major order.
    pub fn foreground(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }
}

impl MaskAccess for BinaryMask {
    fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize] != 0
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl MaskAccess for image::GrayImage {
    fn is_set(&self, x: u32, y: u32) -> bool {
        self.get_pixel_checked(x, y).is_some_and(|p| p.0[0] != 0)
    }

    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

/// One binary region in whichever encoding the producer used.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Closed boundary polygon; the region is its interior.
    Contour(Vec<Point>),
    /// Explicit list of foreground pixel coordinates.
    Pixels(Vec<[u32; 2]>),
    /// Rasterised mask.
    Bitmap(BinaryMask),
}

impl Region {
    /// Bounding box of the region's support, `None` when it has no points.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Region::Contour(points) => BoundingBox::enclosing(points),
            Region::Pixels(pixels) => {
                let points: Vec<Point> = pixels
                    .iter()
                    .map(|&[x, y]| Point::new(f64::from(x), f64::from(y)))
                    .collect();
                BoundingBox::enclosing(&points)
            }
            Region::Bitmap(mask) => {
                let points: Vec<Point> = mask
                    .foreground()
                    .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
                    .collect();
                BoundingBox::enclosing(&points)
            }
        }
    }
}
