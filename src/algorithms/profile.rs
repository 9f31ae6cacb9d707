//! Radial profile extraction.
//!
//! A profile samples a circle at `N` equal angular steps starting at angle 0
//! (the +x axis). Image rows grow downwards, so increasing sample index walks
//! the circle clockwise on screen.

use crate::data::{Channel, Image};
use crate::AlignError;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A circle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: (f64, f64),
    pub radius: f64,
}

impl Circle {
    pub fn new(center: (f64, f64), radius: f64) -> Self {
        Self { center, radius }
    }

    /// Nearest pixel to the point at `angle` radians on the circle.
    pub fn pixel_at(&self, angle: f64) -> (i64, i64) {
        let (sin_a, cos_a) = angle.sin_cos();
        (
            (self.center.0 + self.radius * cos_a).round() as i64,
            (self.center.1 + self.radius * sin_a).round() as i64,
        )
    }
}

/// Fixed-length circular sequence of intensities around a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularProfile {
    samples: Vec<f64>,
}

impl AngularProfile {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Rotate the profile by `shift` samples with wraparound.
    ///
    /// Element `i` of the result is `self[(i - shift) mod N]`; a shift of
    /// `N` (or any multiple) returns the profile unchanged.
    pub fn circular_shift(&self, shift: usize) -> Self {
        Self::new(circular_shift(&self.samples, shift))
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / self.samples.len() as f64
    }

    /// Element-wise `self - other`.
    pub fn difference(&self, other: &AngularProfile) -> crate::Result<Vec<f64>> {
        if self.len() != other.len() {
            return Err(AlignError::ShapeMismatch {
                inner: self.len(),
                outer: other.len(),
            });
        }
        Ok(self.samples.iter().zip(&other.samples).map(|(a, b)| a - b).collect())
    }

    /// Forward first differences, `N - 1` values.
    pub fn derivative(&self) -> Vec<f64> {
        self.samples.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// `out[i] = samples[(i - shift) mod N]`.
pub fn circular_shift(samples: &[f64], shift: usize) -> Vec<f64> {
    let mut out = samples.to_vec();
    if !out.is_empty() {
        let k = shift % out.len();
        out.rotate_right(k);
    }
    out
}

/// Sample `num_points` nearest-pixel intensities around `circle`.
///
/// No interpolation is applied; points outside the image read `0`.
pub fn sample_profile(
    image: &Image,
    circle: Circle,
    num_points: usize,
    channel: Channel,
) -> crate::Result<AngularProfile> {
    if num_points == 0 {
        return Err(AlignError::InvalidConfig("num_points must be positive".into()));
    }

    let samples = (0..num_points)
        .map(|k| {
            let angle = TAU * k as f64 / num_points as f64;
            let (x, y) = circle.pixel_at(angle);
            image.get_pixel(x, y, channel)
        })
        .collect();

    Ok(AngularProfile::new(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_circular_shift_identity() {
        let p = AngularProfile::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(p.circular_shift(0), p);
        assert_eq!(p.circular_shift(5), p);
        assert_eq!(p.circular_shift(12), p.circular_shift(2));
    }

    #[test]
    fn test_circular_shift_direction() {
        let p = AngularProfile::new(vec![10.0, 20.0, 30.0, 40.0]);
        // out[i] = p[i - 1]
        assert_eq!(p.circular_shift(1).samples(), &[40.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_sample_walks_clockwise_from_positive_x() {
        let mut img = GrayImage::new(21, 21);
        img.put_pixel(15, 10, Luma([10])); // angle 0
        img.put_pixel(10, 15, Luma([20])); // 90 deg, below the center
        img.put_pixel(5, 10, Luma([30])); // 180 deg
        img.put_pixel(10, 5, Luma([40])); // 270 deg
        let image = Image::from_gray(img);

        let circle = Circle::new((10.0, 10.0), 5.0);
        let profile = sample_profile(&image, circle, 4, Channel::Gray).unwrap();
        assert_eq!(profile.samples(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_sample_out_of_bounds_is_zero() {
        let image = Image::from_gray(GrayImage::from_pixel(10, 10, Luma([255])));
        let circle = Circle::new((5.0, 5.0), 50.0);
        let profile = sample_profile(&image, circle, 36, Channel::Gray).unwrap();
        assert!(profile.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sample_is_deterministic_and_channel_aware() {
        let image = Image::from_rgb(RgbImage::from_fn(40, 40, |x, y| Rgb([x as u8, y as u8, 200])));
        let circle = Circle::new((20.0, 20.0), 12.0);
        let a = sample_profile(&image, circle, 360, Channel::R).unwrap();
        let b = sample_profile(&image, circle, 360, Channel::R).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 360);

        let blue = sample_profile(&image, circle, 90, Channel::B).unwrap();
        assert!(blue.samples().iter().all(|&v| v == 200.0));
    }

    #[test]
    fn test_zero_points_rejected() {
        let image = Image::from_gray(GrayImage::new(4, 4));
        assert!(sample_profile(&image, Circle::new((2.0, 2.0), 1.0), 0, Channel::Gray).is_err());
    }

    #[test]
    fn test_difference_and_derivative() {
        let inner = AngularProfile::new(vec![5.0, 7.0, 4.0]);
        let outer = AngularProfile::new(vec![1.0, 1.0, 1.0]);
        assert_eq!(inner.difference(&outer).unwrap(), vec![4.0, 6.0, 3.0]);
        assert_eq!(inner.derivative(), vec![2.0, -3.0]);
        assert!(inner.difference(&AngularProfile::new(vec![1.0])).is_err());
        assert!((inner.mean() - 16.0 / 3.0).abs() < 1e-12);
        assert_eq!(outer.variance(), 0.0);
    }
}
