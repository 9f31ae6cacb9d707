//! Block-wise ring/disk comparison over angular sectors.
//!
//! Point sampling can miss thin pattern edges by a pixel. Here each sector
//! of the annulus is compared with the matching wedge of the inner disk as a
//! whole block. Blocks live in a wedge-local polar frame: rows step radially
//! away from the disk edge, columns step through the wedge angle. Registering
//! the disk against sector `i` (rotating it by `-start_angle`) is the same as
//! reading the disk at `start_angle + local_angle`.

use crate::algorithms::correlation::normalized_score;
use crate::algorithms::profile::Circle;
use crate::data::{Channel, Image};
use crate::{AlignError, AlignmentResult};
use ndarray::{Array2, Zip};
use rayon::prelude::*;

/// Pixels at or below this intensity count as background.
pub const DARK_LEVEL: f64 = 10.0;

/// Blocks with fewer foreground pixels than this score `0`.
pub const MIN_VALID_SAMPLES: usize = 10;

/// Radial gap kept on both sides of the disk edge.
const SEAM_GAP: f64 = 1.5;

/// One sector of the comparison: the ring wedge and the registered disk wedge.
#[derive(Debug, Clone)]
pub struct SectorBlocks {
    pub start_degrees: f64,
    pub outer: Array2<f64>,
    pub inner: Array2<f64>,
}

/// Compares the annulus and the disk sector by sector.
#[derive(Debug, Clone)]
pub struct SectorComparator {
    center: (f64, f64),
    inner_radius: f64,
    outer_radius: f64,
    sector_count: usize,
    channel: Channel,
    samples_per_degree: usize,
}

impl SectorComparator {
    pub fn new(
        center: (f64, f64),
        inner_radius: f64,
        outer_radius: f64,
        sector_count: usize,
    ) -> crate::Result<Self> {
        if sector_count == 0 || 360 % sector_count != 0 {
            return Err(AlignError::InvalidSectorCount(sector_count));
        }
        if !(inner_radius > 0.0) || !(outer_radius > inner_radius) {
            return Err(AlignError::InvalidConfig(format!(
                "sector radii must satisfy 0 < inner ({inner_radius}) < outer ({outer_radius})"
            )));
        }

        Ok(Self {
            center,
            inner_radius,
            outer_radius,
            sector_count,
            channel: Channel::Gray,
            samples_per_degree: 2,
        })
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_samples_per_degree(mut self, samples_per_degree: usize) -> Self {
        self.samples_per_degree = samples_per_degree.max(1);
        self
    }

    pub fn sector_count(&self) -> usize {
        self.sector_count
    }

    pub fn sector_degrees(&self) -> f64 {
        360.0 / self.sector_count as f64
    }

    /// Number of radial rows in every block.
    pub fn band_rows(&self) -> usize {
        let depth = (self.outer_radius - self.inner_radius).min(self.inner_radius) - SEAM_GAP;
        if depth < 0.0 {
            1
        } else {
            depth.floor() as usize + 1
        }
    }

    pub fn band_cols(&self) -> usize {
        (360 / self.sector_count) * self.samples_per_degree
    }

    /// Extract the sector set with the disk read `offset_degrees` further clockwise.
    pub fn extract_sectors(&self, image: &Image, offset_degrees: f64) -> Vec<SectorBlocks> {
        (0..self.sector_count)
            .map(|i| {
                let start = i as f64 * self.sector_degrees();
                SectorBlocks {
                    start_degrees: start,
                    outer: self.outer_block(image, start),
                    inner: self.inner_block(image, start + offset_degrees),
                }
            })
            .collect()
    }

    /// Per-sector similarity of the image as it is.
    pub fn compare_sectors(&self, image: &Image) -> Vec<f64> {
        self.compare_at(image, 0.0)
    }

    /// Per-sector similarity with the disk hypothetically turned clockwise
    /// by `offset_degrees`.
    pub fn compare_at(&self, image: &Image, offset_degrees: f64) -> Vec<f64> {
        self.extract_sectors(image, offset_degrees)
            .iter()
            .map(|s| block_similarity(&s.inner, &s.outer))
            .collect()
    }

    /// Score `hypotheses` evenly spaced disk rotations.
    ///
    /// Hypothesis `s` assumes the disk is turned `360 * s / hypotheses`
    /// degrees clockwise; its score is the mean sector similarity. The result
    /// follows the same selection rules as the profile scorers.
    pub fn sweep(
        &self,
        image: &Image,
        hypotheses: usize,
        keep_curve: bool,
    ) -> crate::Result<AlignmentResult> {
        if hypotheses == 0 {
            return Err(AlignError::InvalidConfig("hypothesis count must be positive".into()));
        }

        let outer_blocks: Vec<Array2<f64>> = (0..self.sector_count)
            .map(|i| self.outer_block(image, i as f64 * self.sector_degrees()))
            .collect();

        let curve: Vec<f64> = (0..hypotheses)
            .into_par_iter()
            .map(|s| {
                let offset = 360.0 * s as f64 / hypotheses as f64;
                let scores: Vec<f64> = outer_blocks
                    .iter()
                    .enumerate()
                    .map(|(i, outer)| {
                        let start = i as f64 * self.sector_degrees() + offset;
                        let inner = self.inner_block(image, start);
                        block_similarity(&inner, outer)
                    })
                    .collect();
                mean_score(&scores)
            })
            .collect();

        Ok(AlignmentResult::from_curve(curve, keep_curve))
    }

    fn outer_block(&self, image: &Image, start_degrees: f64) -> Array2<f64> {
        self.polar_block(image, start_degrees, |row| self.inner_radius + SEAM_GAP + row as f64)
    }

    fn inner_block(&self, image: &Image, start_degrees: f64) -> Array2<f64> {
        self.polar_block(image, start_degrees, |row| self.inner_radius - SEAM_GAP - row as f64)
    }

    fn polar_block<F>(&self, image: &Image, start_degrees: f64, radius_of_row: F) -> Array2<f64>
    where
        F: Fn(usize) -> f64,
    {
        let step = 1.0 / self.samples_per_degree as f64;
        Array2::from_shape_fn((self.band_rows(), self.band_cols()), |(row, col)| {
            let circle = Circle::new(self.center, radius_of_row(row).max(0.0));
            let angle = (start_degrees + col as f64 * step).to_radians();
            let (x, y) = circle.pixel_at(angle);
            image.get_pixel(x, y, self.channel)
        })
    }
}

/// Normalised template match (`TM_CCOEFF_NORMED` style) of two equal blocks.
///
/// Blocks of different shape, flat blocks and blocks with fewer than
/// [`MIN_VALID_SAMPLES`] pixels above [`DARK_LEVEL`] score `0`.
pub fn block_similarity(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    if a.dim() != b.dim() || a.is_empty() {
        return 0.0;
    }
    let valid = |block: &Array2<f64>| block.iter().filter(|&&v| v > DARK_LEVEL).count();
    if valid(a) < MIN_VALID_SAMPLES || valid(b) < MIN_VALID_SAMPLES {
        return 0.0;
    }

    let mean_a = a.mean().unwrap_or(0.0);
    let mean_b = b.mean().unwrap_or(0.0);
    let (mut cross, mut energy_a, mut energy_b) = (0.0, 0.0, 0.0);
    Zip::from(a).and(b).for_each(|&x, &y| {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cross += dx * dy;
        energy_a += dx * dx;
        energy_b += dy * dy;
    });
    normalized_score(cross, energy_a, energy_b)
}

/// Overall score of a sector set.
pub fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Angular pattern shared by disk and ring, so an untouched image is aligned.
    fn angular_pattern(size: u32) -> Image {
        let c = (size / 2) as f64;
        Image::from_gray(GrayImage::from_fn(size, size, |x, y| {
            let phi = (y as f64 - c).atan2(x as f64 - c);
            let v = 128.0
                + 60.0 * phi.cos()
                + 35.0 * (2.0 * phi + 0.5).sin()
                + 25.0 * (5.0 * phi).sin();
            Luma([v.round().clamp(0.0, 255.0) as u8])
        }))
    }

    #[test]
    fn test_sector_count_validation() {
        assert!(SectorComparator::new((50.0, 50.0), 20.0, 40.0, 12).is_ok());
        assert!(matches!(
            SectorComparator::new((50.0, 50.0), 20.0, 40.0, 7),
            Err(AlignError::InvalidSectorCount(7))
        ));
        assert!(matches!(
            SectorComparator::new((50.0, 50.0), 20.0, 40.0, 0),
            Err(AlignError::InvalidSectorCount(0))
        ));
        assert!(SectorComparator::new((50.0, 50.0), 40.0, 20.0, 12).is_err());
    }

    #[test]
    fn test_compare_sectors_returns_one_score_per_sector() {
        let image = angular_pattern(131);
        let comparator = SectorComparator::new(image.center(), 40.0, 60.0, 12).unwrap();
        let scores = comparator.compare_sectors(&image);
        assert_eq!(scores.len(), 12);
        assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(mean_score(&scores) > 0.7, "aligned image scored {scores:?}");
    }

    #[test]
    fn test_block_shapes() {
        let image = angular_pattern(131);
        let comparator = SectorComparator::new(image.center(), 40.0, 60.0, 6)
            .unwrap()
            .with_samples_per_degree(1);
        let sectors = comparator.extract_sectors(&image, 0.0);
        assert_eq!(sectors.len(), 6);
        assert_eq!(sectors[1].start_degrees, 60.0);
        for s in &sectors {
            assert_eq!(s.outer.dim(), (comparator.band_rows(), 60));
            assert_eq!(s.inner.dim(), s.outer.dim());
        }
    }

    #[test]
    fn test_flat_image_scores_zero() {
        let image = Image::from_gray(GrayImage::from_pixel(80, 80, Luma([200])));
        let comparator = SectorComparator::new(image.center(), 15.0, 35.0, 4).unwrap();
        assert!(comparator.compare_sectors(&image).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_dark_blocks_score_zero() {
        let a = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64 * 0.5);
        assert_eq!(block_similarity(&a, &a), 0.0);
        let b = Array2::from_shape_fn((4, 4), |(r, c)| 20.0 + (r * 4 + c) as f64);
        assert!((block_similarity(&b, &b) - 1.0).abs() < 1e-12);
        assert_eq!(block_similarity(&b, &Array2::zeros((2, 8))), 0.0);
    }

    #[test]
    fn test_sweep_on_aligned_image_prefers_zero() {
        let image = angular_pattern(131);
        let comparator = SectorComparator::new(image.center(), 40.0, 60.0, 12).unwrap();
        let result = comparator.sweep(&image, 72, true).unwrap();
        assert_eq!(result.best_shift, 0);
        assert_eq!(result.score_curve.map(|c| c.len()), Some(72));
        assert!(comparator.sweep(&image, 0, false).is_err());
    }
}
