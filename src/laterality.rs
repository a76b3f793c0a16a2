//! Left/right assignment of eye centroids.
//!
//! Laterality here is a camera-frame convention: the centroid with the larger
//! x coordinate is the "right" eye, the smaller one the "left" eye. This is
//! *not* the animal's anatomical left and right. For an animal facing the
//! camera the labels are swapped relative to its anatomy, and a horizontally
//! mirrored image swaps them again.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Eye centroids of one individual with camera-frame labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum EyeLayout {
    /// No valid eye centroid.
    None,
    /// A single valid centroid. It is the individual's right eye by default.
    Single { right: Point },
    /// Two valid centroids ordered by x.
    Pair { left: Point, right: Point },
}

impl EyeLayout {
    /// Label centroids by ascending x.
    ///
    /// On equal x the centroid listed later is the right eye. Only the
    /// outermost two are kept if more than two are given.
    pub fn from_centroids(centroids: &[Point]) -> Self {
        let mut sorted = centroids.to_vec();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
        match sorted.as_slice() {
            [] => EyeLayout::None,
            [only] => EyeLayout::Single { right: *only },
            [left, .., right] => EyeLayout::Pair {
                left: *left,
                right: *right,
            },
        }
    }

    /// The point used for right-eye-to-right-eye measurement.
    pub fn right(&self) -> Option<Point> {
        match self {
            EyeLayout::None => None,
            EyeLayout::Single { right } | EyeLayout::Pair { right, .. } => Some(*right),
        }
    }

    pub fn left(&self) -> Option<Point> {
        match self {
            EyeLayout::Pair { left, .. } => Some(*left),
            _ => None,
        }
    }

    /// Number of labelled centroids.
    pub fn len(&self) -> usize {
        match self {
            EyeLayout::None => 0,
            EyeLayout::Single { .. } => 1,
            EyeLayout::Pair { .. } => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, EyeLayout::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn larger_x_is_right() {
        let a = Point::new(120.0, 40.0);
        let b = Point::new(80.0, 45.0);
        let layout = EyeLayout::from_centroids(&[a, b]);
        assert_eq!(layout, EyeLayout::Pair { left: b, right: a });
        assert_eq!(layout.right(), Some(a));
        assert_eq!(layout.left(), Some(b));
        assert_eq!(layout.len(), 2);

        // Input order does not matter.
        assert_eq!(EyeLayout::from_centroids(&[b, a]), layout);
    }

    #[test]
    fn single_centroid_is_right_eye() {
        let p = Point::new(10.0, 10.0);
        let layout = EyeLayout::from_centroids(&[p]);
        assert_eq!(layout, EyeLayout::Single { right: p });
        assert_eq!(layout.right(), Some(p));
        assert_eq!(layout.left(), None);
    }

    #[test]
    fn no_centroids() {
        let layout = EyeLayout::from_centroids(&[]);
        assert!(layout.is_empty());
        assert_eq!(layout.right(), None);
        assert_eq!(layout.len(), 0);
    }

    #[test]
    fn equal_x_keeps_document_order() {
        let first = Point::new(50.0, 10.0);
        let second = Point::new(50.0, 90.0);
        assert_eq!(
            EyeLayout::from_centroids(&[first, second]),
            EyeLayout::Pair {
                left: first,
                right: second
            }
        );
    }
}
