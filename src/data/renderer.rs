use crate::data::{fixture_file_name, Image};
use crate::AlignError;
use std::f64::consts::FRAC_1_SQRT_2;
use std::path::{Path, PathBuf};

/// Synthesises captcha fixtures with a known inner-disk rotation.
///
/// The outer region of the source is left untouched; only the disk of
/// `radius` around `center` is rotated. Positive angles turn the disk
/// clockwise on screen, the same sense in which profile sample indices grow.
pub struct RotationRenderer<'a> {
    source: &'a Image,
    center: (i64, i64),
    radius: u32,
}

impl<'a> RotationRenderer<'a> {
    /// Renderer centered on the image center.
    pub fn new(source: &'a Image, radius: u32) -> crate::Result<Self> {
        let (cx, cy) = source.center();
        Self::with_center(source, (cx as u32, cy as u32), radius)
    }

    pub fn with_center(source: &'a Image, center: (u32, u32), radius: u32) -> crate::Result<Self> {
        let (cx, cy) = (center.0 as i64, center.1 as i64);
        let r = radius as i64;
        if radius == 0 {
            return Err(AlignError::InvalidConfig("disk radius must be positive".into()));
        }
        if cx - r < 0
            || cy - r < 0
            || cx + r > source.width() as i64
            || cy + r > source.height() as i64
        {
            return Err(AlignError::InvalidConfig(format!(
                "disk of radius {} at ({}, {}) does not fit a {}x{} image",
                radius,
                center.0,
                center.1,
                source.width(),
                source.height()
            )));
        }

        Ok(Self {
            source,
            center: (cx, cy),
            radius,
        })
    }

    /// Render the source with its disk rotated by `angle_degrees`.
    pub fn render(&self, angle_degrees: f64) -> Image {
        let (sin_a, cos_a) = angle_degrees.to_radians().sin_cos();
        // Every pixel a nearest-pixel sampler can land on for a circle of
        // the disk radius belongs to the disk.
        let limit = self.radius as f64 + FRAC_1_SQRT_2;
        let limit_sq = limit * limit;

        self.source.map_pixels(|x, y| {
            let dx = (x as i64 - self.center.0) as f64;
            let dy = (y as i64 - self.center.1) as f64;
            if dx * dx + dy * dy > limit_sq {
                return self.source.raw_pixel(x, y);
            }

            // Inverse mapping: destination -> source position in the crop.
            let src_x = dx * cos_a + dy * sin_a;
            let src_y = -dx * sin_a + dy * cos_a;
            self.bilinear_crop(src_x, src_y)
        })
    }

    /// All fixtures from 0° up to 359° in `step_degrees` increments.
    ///
    /// A step of 360° or more yields only the 0° fixture. The iterator is
    /// lazy and holds no state beyond the angle counter, so calling this
    /// again restarts the sequence.
    pub fn generate(
        &self,
        step_degrees: u32,
    ) -> crate::Result<impl Iterator<Item = (u32, Image)> + '_> {
        if step_degrees == 0 {
            return Err(AlignError::InvalidConfig(
                "rotation step must be positive".to_string(),
            ));
        }
        Ok((0..360u32)
            .step_by(step_degrees as usize)
            .map(move |angle| (angle, self.render(angle as f64))))
    }

    /// Render every fixture into `dir` using [`fixture_file_name`].
    pub fn write_fixtures<P: AsRef<Path>>(
        &self,
        dir: P,
        step_degrees: u32,
    ) -> crate::Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for (angle, image) in self.generate(step_degrees)? {
            let path = dir.join(fixture_file_name(angle));
            image.save(&path)?;
            tracing::debug!(angle, path = %path.display(), "Wrote rotation fixture");
            written.push(path);
        }
        Ok(written)
    }

    /// Bilinear sample of the square disk crop at an offset from the center.
    ///
    /// Positions outside the crop (or the image) read as black.
    fn bilinear_crop(&self, src_x: f64, src_y: f64) -> [u8; 3] {
        let x0 = src_x.floor();
        let y0 = src_y.floor();
        let fx = src_x - x0;
        let fy = src_y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let p00 = self.crop_pixel(x0, y0);
        let p10 = self.crop_pixel(x0 + 1, y0);
        let p01 = self.crop_pixel(x0, y0 + 1);
        let p11 = self.crop_pixel(x0 + 1, y0 + 1);

        let mut out = [0u8; 3];
        for c in 0..3 {
            let value = p00[c] as f64 * (1.0 - fx) * (1.0 - fy)
                + p10[c] as f64 * fx * (1.0 - fy)
                + p01[c] as f64 * (1.0 - fx) * fy
                + p11[c] as f64 * fx * fy;
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        out
    }

    fn crop_pixel(&self, dx: i64, dy: i64) -> [u8; 3] {
        let half = self.radius as i64 + 1;
        if dx.abs() > half || dy.abs() > half {
            return [0; 3];
        }
        let (x, y) = (self.center.0 + dx, self.center.1 + dy);
        if x < 0 || y < 0 || x >= self.source.width() as i64 || y >= self.source.height() as i64 {
            return [0; 3];
        }
        self.source.raw_pixel(x as u32, y as u32)
    }
}
